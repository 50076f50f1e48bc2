#![forbid(unsafe_code)]

pub mod keys;
pub mod menus;
pub mod render;
pub mod term;
pub mod toasts;
pub mod updates;

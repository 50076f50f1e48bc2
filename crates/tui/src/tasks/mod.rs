#![forbid(unsafe_code)]

pub mod actions;
pub mod fetch;
pub mod refresh;

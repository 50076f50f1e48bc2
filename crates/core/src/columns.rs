//! Table columns for the resource tree and application list.
//!
//! Widths are relative weights; frontends translate them to their own layout units.

#![forbid(unsafe_code)]

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnKind {
    Kind,
    Name,
    Health,
    Sync,
    Namespace,
    Project,
    Commit,
    LastActivity,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ColumnSpec {
    pub kind: ColumnKind,
    pub label: &'static str,
    pub width: u16,
}

const fn col(kind: ColumnKind, label: &'static str, width: u16) -> ColumnSpec {
    ColumnSpec { kind, label, width }
}

pub const RESOURCE_COLUMNS: [ColumnSpec; 5] = [
    col(ColumnKind::Kind, "Kind", 30),
    col(ColumnKind::Name, "Name", 30),
    col(ColumnKind::Health, "Health", 12),
    col(ColumnKind::Sync, "SyncStatus", 12),
    col(ColumnKind::Namespace, "Namespace", 16),
];

pub const APPLICATION_COLUMNS: [ColumnSpec; 6] = [
    col(ColumnKind::Name, "Name", 24),
    col(ColumnKind::Health, "Health", 12),
    col(ColumnKind::Sync, "Sync", 12),
    col(ColumnKind::Project, "Project", 14),
    col(ColumnKind::Commit, "Commit", 14),
    col(ColumnKind::LastActivity, "Last Activity", 20),
];

/// Render the application cell for a column.
pub fn application_cell(app: &crate::Application, kind: ColumnKind) -> &str {
    match kind {
        ColumnKind::Name => &app.name,
        ColumnKind::Health => &app.health,
        ColumnKind::Sync => &app.sync,
        ColumnKind::Project => &app.project,
        ColumnKind::Commit => short_commit(&app.sync_commit),
        ColumnKind::LastActivity => &app.last_activity,
        ColumnKind::Kind | ColumnKind::Namespace => "",
    }
}

/// Git revisions are shown abbreviated; anything else passes through.
pub fn short_commit(rev: &str) -> &str {
    if rev.len() > 8 && rev.chars().all(|c| c.is_ascii_hexdigit()) { &rev[..8] } else { rev }
}

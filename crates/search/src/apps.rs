//! Application list filtering: project, then health, then sync, then free text.

#![forbid(unsafe_code)]

use std::time::Instant;

use argonaut_core::{Application, FilterDimension, FilterState};
use serde::Serialize;
use tracing::debug;

/// Working-set size after each stage.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct AppFilterDebug {
    pub total: usize,
    pub after_project: usize,
    pub after_health: usize,
    pub after_sync: usize,
    pub after_search: usize,
}

#[derive(Debug, Clone, Default)]
pub struct AppFilterOutcome {
    pub apps: Vec<Application>,
    pub debug: AppFilterDebug,
}

pub fn filter_applications(apps: &[Application], filters: &FilterState, search: &str) -> AppFilterOutcome {
    let t0 = Instant::now();
    let mut dbg = AppFilterDebug { total: apps.len(), ..Default::default() };
    let mut work: Vec<&Application> = apps.iter().collect();

    if let Some(project) = filters.get(FilterDimension::Project) {
        work.retain(|a| a.project == project);
    }
    dbg.after_project = work.len();

    if let Some(health) = filters.get(FilterDimension::Health) {
        work.retain(|a| a.health.eq_ignore_ascii_case(health));
    }
    dbg.after_health = work.len();

    if let Some(sync) = filters.get(FilterDimension::Sync) {
        work.retain(|a| a.sync.eq_ignore_ascii_case(sync));
    }
    dbg.after_sync = work.len();

    let q = search.trim().to_lowercase();
    if !q.is_empty() {
        work.retain(|a| a.search_string().contains(&q));
    }
    dbg.after_search = work.len();

    metrics::histogram!("app_filter_ms", t0.elapsed().as_secs_f64() * 1000.0);
    debug!(total = dbg.total, kept = dbg.after_search, filters = %filters.description(), "filter: applications");
    AppFilterOutcome { apps: work.into_iter().cloned().collect(), debug: dbg }
}

/// Distinct projects in first-seen order, for the filter menu.
pub fn projects(apps: &[Application]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for a in apps {
        if !a.project.is_empty() && !out.contains(&a.project) {
            out.push(a.project.clone());
        }
    }
    out
}

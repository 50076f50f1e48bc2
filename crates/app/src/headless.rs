#![forbid(unsafe_code)]

//! One-shot commands that print what the TUI would show.

use anyhow::{Context, Result};
use argonaut_api::ArgoApi;
use argonaut_core::{Application, FilterDimension, FilterState, TreeRow};
use argonaut_search::filter_applications;
use argonaut_store::TreeViewState;
use tracing::{info, warn};

use crate::Output;

#[derive(Debug, Default, Clone)]
pub struct AppsQuery {
    pub project: Option<String>,
    pub health: Option<String>,
    pub sync: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct TreeQuery {
    pub kind: Option<String>,
    pub health: Option<String>,
    pub sync: Option<String>,
    pub search: Option<String>,
    pub collapsed: bool,
}

pub async fn apps(api: &dyn ArgoApi, q: &AppsQuery, output: Output) -> Result<String> {
    let all = api.list_applications().await.context("list applications")?;
    let mut filters = FilterState::new();
    for (dim, v) in [
        (FilterDimension::Project, &q.project),
        (FilterDimension::Health, &q.health),
        (FilterDimension::Sync, &q.sync),
    ] {
        if let Some(v) = v {
            filters.set(dim, v.as_str());
        }
    }
    let outcome = filter_applications(&all, &filters, q.search.as_deref().unwrap_or(""));
    info!(total = outcome.debug.total, shown = outcome.apps.len(), "apps: filtered");
    match output {
        Output::Json => Ok(serde_json::to_string_pretty(&outcome.apps)?),
        Output::Human => Ok(apps_table(&outcome.apps)),
    }
}

pub async fn tree(api: &dyn ArgoApi, app: &str, q: &TreeQuery, output: Output) -> Result<String> {
    let records = api.resource_tree(app).await.with_context(|| format!("resource tree for {}", app))?;
    let mut view = TreeViewState::from_records(records);
    for (dim, v) in [
        (FilterDimension::Kind, &q.kind),
        (FilterDimension::Health, &q.health),
        (FilterDimension::Sync, &q.sync),
    ] {
        if let Some(v) = v {
            view.set_filter(dim, v.as_str());
        }
    }
    if let Some(s) = &q.search {
        view.set_search(s.as_str());
    }
    if q.collapsed {
        view.collapse_all();
    }
    let rows = view.rows();
    if let Some(n) = view.notice() {
        warn!(notice = %n, "tree: filter fell back to full view");
        eprintln!("note: {}", n);
    }
    match output {
        Output::Json => Ok(serde_json::to_string_pretty(&rows)?),
        Output::Human => Ok(tree_table(&rows)),
    }
}

pub fn apps_table(apps: &[Application]) -> String {
    let mut out = format!("{:<32} {:<12} {:<12} {:<16} {:<10} {}\n", "NAME", "HEALTH", "SYNC", "PROJECT", "COMMIT", "LAST ACTIVITY");
    for a in apps {
        out.push_str(&format!(
            "{:<32} {:<12} {:<12} {:<16} {:<10} {}\n",
            a.name,
            a.health,
            a.sync,
            a.project,
            argonaut_core::columns::short_commit(&a.sync_commit),
            a.last_activity
        ));
    }
    out
}

pub fn tree_table(rows: &[TreeRow]) -> String {
    let mut out = format!("{:<48} {:<32} {:<12} {:<12} {}\n", "KIND", "NAME", "HEALTH", "SYNC", "NAMESPACE");
    for r in rows {
        out.push_str(&format!("{:<48} {:<32} {:<12} {:<12} {}\n", r.kind_label(), r.name, r.health, r.sync, r.namespace));
    }
    out
}

#[cfg(test)]
mod tests {
    use argonaut_api::MockApi;
    use argonaut_core::ResourceRecord;

    use super::*;

    fn app(name: &str, health: &str, project: &str) -> Application {
        Application { name: name.into(), health: health.into(), sync: "Synced".into(), project: project.into(), ..Default::default() }
    }

    fn rec(uid: &str, kind: &str, name: &str, parents: &[&str]) -> ResourceRecord {
        ResourceRecord {
            uid: uid.into(),
            kind: kind.into(),
            name: name.into(),
            parent_refs: parents.iter().map(|p| p.to_string()).collect(),
            ..Default::default()
        }
    }

    fn mock() -> MockApi {
        MockApi::with_apps(vec![app("web", "Healthy", "shop"), app("jobs", "Degraded", "batch")]).with_tree(
            "web",
            vec![rec("d", "Deployment", "web", &[]), rec("rs", "ReplicaSet", "web-1", &["d"]), rec("s", "Service", "web", &[])],
        )
    }

    #[tokio::test]
    async fn apps_filters_by_health() {
        let q = AppsQuery { health: Some("degraded".into()), ..Default::default() };
        let out = apps(&mock(), &q, Output::Human).await.expect("apps");
        assert!(out.contains("jobs"));
        assert!(!out.contains("web"), "web is healthy: {}", out);
    }

    #[tokio::test]
    async fn apps_json_is_an_array() {
        let out = apps(&mock(), &AppsQuery::default(), Output::Json).await.expect("apps");
        let v: serde_json::Value = serde_json::from_str(&out).expect("json");
        assert_eq!(v.as_array().map(|a| a.len()), Some(2));
    }

    #[tokio::test]
    async fn tree_prints_prefixes() {
        let out = tree(&mock(), "web", &TreeQuery::default(), Output::Human).await.expect("tree");
        assert!(out.contains("▼ Deployment"), "{}", out);
        assert!(out.contains("└─  ReplicaSet"), "{}", out);
    }

    #[tokio::test]
    async fn tree_kind_filter_keeps_matching_roots() {
        let q = TreeQuery { kind: Some("Service".into()), ..Default::default() };
        let out = tree(&mock(), "web", &q, Output::Json).await.expect("tree");
        let rows: Vec<TreeRow> = serde_json::from_str(&out).expect("rows");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].kind, "Service");
    }

    #[tokio::test]
    async fn unknown_app_is_an_error() {
        assert!(tree(&mock(), "nope", &TreeQuery::default(), Output::Human).await.is_err());
    }
}

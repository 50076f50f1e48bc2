//! Server JSON payloads and their projection into core types.
//!
//! Only the fields the client reads are modelled; everything else is ignored.
//! The server reports empty lists as `null`, hence the `Option<Vec<_>>` fields.

use argonaut_core::{Application, ResourceRecord};
use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;
use serde::Deserialize;

const NOT_AVAILABLE: &str = "n/a";
const ACTIVITY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicationList {
    #[serde(default)]
    pub items: Option<Vec<WireApplication>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireApplication {
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub spec: AppSpec,
    #[serde(default)]
    pub status: AppStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppSpec {
    #[serde(default)]
    pub project: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppStatus {
    #[serde(default)]
    pub health: StatusField,
    #[serde(default)]
    pub sync: StatusField,
    #[serde(default)]
    pub operation_state: Option<OperationState>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusField {
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationState {
    #[serde(default)]
    pub sync_result: Option<SyncResult>,
    #[serde(default)]
    pub finished_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SyncResult {
    #[serde(default)]
    pub revision: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResourceTree {
    #[serde(default)]
    pub nodes: Option<Vec<WireNode>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireNode {
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub parent_refs: Option<Vec<ParentRef>>,
    #[serde(default)]
    pub health: Option<StatusField>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParentRef {
    #[serde(default)]
    pub uid: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ManagedResources {
    #[serde(default)]
    pub items: Option<Vec<ResourceDiff>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResourceDiff {
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub diff: Option<String>,
}

impl From<WireApplication> for Application {
    fn from(w: WireApplication) -> Self {
        let op = w.status.operation_state;
        let sync_commit = op
            .as_ref()
            .and_then(|o| o.sync_result.as_ref())
            .map(|r| r.revision.clone())
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());
        let last_activity = op
            .as_ref()
            .and_then(|o| o.finished_at.as_deref())
            .and_then(format_activity)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());
        Application {
            name: w.metadata.name,
            health: w.status.health.status.unwrap_or_default(),
            sync: w.status.sync.status.unwrap_or_default(),
            project: w.spec.project,
            sync_commit,
            last_activity,
        }
    }
}

/// RFC 3339 timestamp to `YYYY-MM-DD HH:MM:SS` in UTC. Unparseable input yields `None`.
pub fn format_activity(ts: &str) -> Option<String> {
    let t = DateTime::parse_from_rfc3339(ts).ok()?;
    Some(t.with_timezone(&Utc).format(ACTIVITY_FORMAT).to_string())
}

pub fn applications(list: ApplicationList) -> Vec<Application> {
    list.items.unwrap_or_default().into_iter().map(Application::from).collect()
}

fn resource_key(group: &str, kind: &str, namespace: &str, name: &str) -> String {
    format!("{}/{}/{}/{}", group, kind, namespace, name)
}

/// Tree nodes become records; sync comes from the managed-resource diff of the
/// same group/kind/namespace/name. Nodes the server does not manage keep no sync.
pub fn resource_records(tree: ResourceTree, managed: ManagedResources) -> Vec<ResourceRecord> {
    let mut sync_by_key: FxHashMap<String, &'static str> = FxHashMap::default();
    for m in managed.items.unwrap_or_default() {
        let out_of_sync = m.diff.as_deref().map(|d| !d.is_empty()).unwrap_or(false);
        let status = if out_of_sync { "OutOfSync" } else { "Synced" };
        sync_by_key.entry(resource_key(&m.group, &m.kind, &m.namespace, &m.name)).or_insert(status);
    }
    tree.nodes
        .unwrap_or_default()
        .into_iter()
        .map(|n| {
            let sync = sync_by_key.get(&resource_key(&n.group, &n.kind, &n.namespace, &n.name)).map(|s| s.to_string());
            ResourceRecord {
                health: n.health.and_then(|h| h.status),
                sync,
                parent_refs: n.parent_refs.unwrap_or_default().into_iter().map(|p| p.uid).collect(),
                uid: n.uid,
                kind: n.kind,
                name: n.name,
                namespace: n.namespace,
                group: n.group,
            }
        })
        .collect()
}

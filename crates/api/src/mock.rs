use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use argonaut_core::{Application, ResourceRecord};

use crate::{ApiError, ApiResult, ArgoApi, RefreshKind};

/// In-memory implementation for tests. Deleting an application removes it from `apps`.
#[derive(Default)]
pub struct MockApi {
    pub apps: Mutex<Vec<Application>>,
    pub trees: Mutex<HashMap<String, Vec<ResourceRecord>>>,
    /// When set, every call fails with a transport error.
    pub fail: AtomicBool,
    calls: Mutex<Vec<String>>,
}

impl MockApi {
    pub fn new() -> Self { Self::default() }

    pub fn with_apps(apps: Vec<Application>) -> Self {
        Self { apps: Mutex::new(apps), ..Self::default() }
    }

    pub fn with_tree(self, app: &str, records: Vec<ResourceRecord>) -> Self {
        if let Ok(mut t) = self.trees.lock() {
            t.insert(app.to_string(), records);
        }
        self
    }

    pub fn set_fail(&self, fail: bool) { self.fail.store(fail, Ordering::SeqCst); }

    /// Calls made so far, e.g. `"sync:web"`, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: String) -> ApiResult<()> {
        if let Ok(mut c) = self.calls.lock() {
            c.push(call);
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(ApiError::Transport("mock failure".into()));
        }
        Ok(())
    }

    fn has_app(&self, app: &str) -> bool {
        self.apps.lock().map(|a| a.iter().any(|x| x.name == app)).unwrap_or(false)
    }
}

#[async_trait::async_trait]
impl ArgoApi for MockApi {
    async fn list_applications(&self) -> ApiResult<Vec<Application>> {
        self.record("list".into())?;
        Ok(self.apps.lock().map(|a| a.clone()).unwrap_or_default())
    }

    async fn resource_tree(&self, app: &str) -> ApiResult<Vec<ResourceRecord>> {
        self.record(format!("tree:{}", app))?;
        let trees = self.trees.lock().map_err(|e| ApiError::Transport(e.to_string()))?;
        trees.get(app).cloned().ok_or_else(|| ApiError::NotFound(app.to_string()))
    }

    async fn sync_application(&self, app: &str) -> ApiResult<()> {
        self.record(format!("sync:{}", app))?;
        if !self.has_app(app) {
            return Err(ApiError::NotFound(app.to_string()));
        }
        Ok(())
    }

    async fn delete_application(&self, app: &str) -> ApiResult<()> {
        self.record(format!("delete:{}", app))?;
        let mut apps = self.apps.lock().map_err(|e| ApiError::Transport(e.to_string()))?;
        let before = apps.len();
        apps.retain(|a| a.name != app);
        if apps.len() == before {
            return Err(ApiError::NotFound(app.to_string()));
        }
        Ok(())
    }

    async fn refresh_application(&self, app: &str, kind: RefreshKind) -> ApiResult<()> {
        self.record(format!("refresh:{}:{}", app, kind))?;
        if !self.has_app(app) {
            return Err(ApiError::NotFound(app.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(name: &str) -> Application {
        Application { name: name.into(), health: "Healthy".into(), sync: "Synced".into(), project: "default".into(), ..Default::default() }
    }

    #[tokio::test]
    async fn records_calls_and_mutates_on_delete() {
        let api = MockApi::with_apps(vec![app("web"), app("api")]);
        api.sync_application("web").await.expect("sync");
        api.refresh_application("api", RefreshKind::Hard).await.expect("refresh");
        api.delete_application("web").await.expect("delete");
        let left: Vec<_> = api.list_applications().await.expect("list").into_iter().map(|a| a.name).collect();
        assert_eq!(left, vec!["api"]);
        assert_eq!(api.calls(), vec!["sync:web", "refresh:api:hard", "delete:web", "list"]);
    }

    #[tokio::test]
    async fn fail_toggle_and_unknown_app() {
        let api = MockApi::with_apps(vec![app("web")]);
        assert_eq!(api.resource_tree("web").await, Err(ApiError::NotFound("web".into())));
        api.set_fail(true);
        assert!(matches!(api.list_applications().await, Err(ApiError::Transport(_))));
        api.set_fail(false);
        assert!(matches!(api.delete_application("nope").await, Err(ApiError::NotFound(_))));
    }
}

//! REST implementation over reqwest.

use std::time::{Duration, Instant};

use argonaut_core::{Application, ResourceRecord};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::config::{ApiConfig, Instance};
use crate::wire::{self, ApplicationList, ManagedResources, ResourceTree};
use crate::{ApiError, ApiResult, ArgoApi, RefreshKind};

pub struct HttpApi {
    base: String,
    instance: String,
    client: reqwest::Client,
}

impl HttpApi {
    pub fn new(inst: &Instance, cfg: ApiConfig) -> ApiResult<Self> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", inst.token))
            .map_err(|e| ApiError::Config(format!("token for {}: {}", inst.name, e)))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        if inst.insecure_skip_verify {
            warn!(instance = %inst.name, "api: TLS certificate verification disabled");
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .danger_accept_invalid_certs(inst.insecure_skip_verify)
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;
        Ok(Self { base: inst.base_url(), instance: inst.name.clone(), client })
    }

    pub fn base_url(&self) -> &str { &self.base }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, format!("{}{}", self.base, path))
    }

    async fn send(&self, op: &'static str, req: RequestBuilder) -> ApiResult<reqwest::Response> {
        metrics::counter!("api_requests_total", 1u64, "op" => op);
        let resp = req.send().await.map_err(|e| {
            metrics::counter!("api_errors_total", 1u64, "op" => op);
            ApiError::Transport(e.to_string())
        })?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        metrics::counter!("api_errors_total", 1u64, "op" => op);
        let body = resp.text().await.unwrap_or_default();
        debug!(op, code = status.as_u16(), body = %body, "api: non-success status");
        Err(status_error(status, body))
    }

    async fn get_json<T: DeserializeOwned>(&self, op: &'static str, path: &str) -> ApiResult<T> {
        let resp = self.send(op, self.request(Method::GET, path)).await?;
        let bytes = resp.bytes().await.map_err(|e| ApiError::Transport(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(format!("{}: {}", op, e)))
    }
}

/// Error body is `{"error": .., "message": ..}` on this server; fall back to raw text.
fn status_error(status: StatusCode, body: String) -> ApiError {
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or(body);
    if status == StatusCode::NOT_FOUND {
        return ApiError::NotFound(message);
    }
    ApiError::Status { code: status.as_u16(), message }
}

fn app_path(app: &str) -> String { format!("/api/v1/applications/{}", app) }

#[async_trait::async_trait]
impl ArgoApi for HttpApi {
    async fn list_applications(&self) -> ApiResult<Vec<Application>> {
        let t0 = Instant::now();
        let list: ApplicationList = self.get_json("list_applications", "/api/v1/applications").await?;
        let apps = wire::applications(list);
        metrics::histogram!("api_list_applications_ms", t0.elapsed().as_secs_f64() * 1000.0);
        info!(instance = %self.instance, count = apps.len(), took_ms = %t0.elapsed().as_millis(), "api: list_applications ok");
        Ok(apps)
    }

    async fn resource_tree(&self, app: &str) -> ApiResult<Vec<ResourceRecord>> {
        let t0 = Instant::now();
        let tree_path = format!("{}/resource-tree", app_path(app));
        let managed_path = format!("{}/managed-resources", app_path(app));
        let (tree, managed) = futures::future::try_join(
            self.get_json::<ResourceTree>("resource_tree", &tree_path),
            self.get_json::<ManagedResources>("managed_resources", &managed_path),
        )
        .await?;
        let records = wire::resource_records(tree, managed);
        metrics::histogram!("api_resource_tree_ms", t0.elapsed().as_secs_f64() * 1000.0);
        info!(app = %app, records = records.len(), took_ms = %t0.elapsed().as_millis(), "api: resource_tree ok");
        Ok(records)
    }

    async fn sync_application(&self, app: &str) -> ApiResult<()> {
        let t0 = Instant::now();
        let body = serde_json::json!({ "name": app });
        let req = self.request(Method::POST, &format!("{}/sync", app_path(app))).json(&body);
        self.send("sync_application", req).await?;
        info!(app = %app, took_ms = %t0.elapsed().as_millis(), "api: sync_application ok");
        Ok(())
    }

    async fn delete_application(&self, app: &str) -> ApiResult<()> {
        let t0 = Instant::now();
        self.send("delete_application", self.request(Method::DELETE, &app_path(app))).await?;
        info!(app = %app, took_ms = %t0.elapsed().as_millis(), "api: delete_application ok");
        Ok(())
    }

    async fn refresh_application(&self, app: &str, kind: RefreshKind) -> ApiResult<()> {
        let t0 = Instant::now();
        let req = self.request(Method::GET, &app_path(app)).query(&[("refresh", kind.as_str())]);
        self.send("refresh_application", req).await?;
        info!(app = %app, kind = %kind, took_ms = %t0.elapsed().as_millis(), "api: refresh_application ok");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inst(url: &str) -> Instance {
        Instance { name: "t".into(), url: url.into(), token: "tok".into(), insecure_skip_verify: true }
    }

    #[test]
    fn client_builds_with_bare_host() {
        let api = HttpApi::new(&inst("localhost:8080"), ApiConfig::default()).expect("client");
        assert_eq!(api.base_url(), "https://localhost:8080");
    }

    #[test]
    fn token_with_newline_is_a_config_error() {
        let mut i = inst("http://x");
        i.token = "bad\ntoken".into();
        assert!(matches!(HttpApi::new(&i, ApiConfig::default()), Err(ApiError::Config(_))));
    }

    #[test]
    fn status_error_prefers_server_message() {
        let e = status_error(StatusCode::FORBIDDEN, r#"{"error":"x","code":7,"message":"permission denied"}"#.into());
        assert_eq!(e, ApiError::Status { code: 403, message: "permission denied".into() });
        let e = status_error(StatusCode::NOT_FOUND, "gone".into());
        assert_eq!(e, ApiError::NotFound("gone".into()));
    }

    #[tokio::test]
    async fn unreachable_server_is_transport_error() {
        let mut cfg = ApiConfig::default();
        cfg.timeout_secs = 2;
        let api = HttpApi::new(&inst("http://127.0.0.1:9"), cfg).expect("client");
        let err = api.list_applications().await.expect_err("no server on discard port");
        assert!(matches!(err, ApiError::Transport(_)), "got {:?}", err);
    }
}

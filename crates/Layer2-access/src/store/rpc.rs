//! Remote template store (BaaS REST / RPC)
//!
//! 호스팅 백엔드의 REST 인터페이스를 사용한다:
//! - `POST /rest/v1/rpc/get_role_template` `{ p_role }`
//! - `POST /rest/v1/rpc/upsert_role_template` `{ p_role, p_menu_permissions, ... }`
//! - `GET  /rest/v1/role_permission_templates`
//! - `GET  /rest/v1/project_permission_overrides?project_id=eq.<id>`
//! - `GET/POST /rest/v1/permission_catalog_baseline`
//!
//! 타임아웃은 HTTP 클라이언트에 위임한다.

use super::TemplateStore;
use async_trait::async_trait;
use freight_foundation::{
    BackendConfig, Error, PermissionKey, ProjectOverride, Result, Role, RolePermissionTemplate,
};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::{debug, trace};

const REST_PREFIX: &str = "rest/v1";
const BASELINE_ROW_ID: i32 = 1;

/// BaaS 원격 저장소
pub struct RpcTemplateStore {
    client: Client,
    base_url: String,
    anon_key: Option<String>,
    access_token: Option<String>,
}

impl RpcTemplateStore {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: None,
            access_token: None,
        })
    }

    pub fn from_config(config: &BackendConfig) -> Result<Self> {
        let base_url = config
            .base_url
            .as_deref()
            .ok_or_else(|| Error::Config("backend.baseUrl is not set".to_string()))?;
        let mut store = Self::new(base_url, config.timeout())?;
        store.anon_key = config.anon_key.clone();
        // 로그인 사용자 JWT가 있으면 행 수준 보안이 그 사용자 기준으로 적용된다
        store.access_token = config.access_token.clone();
        Ok(store)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}/{}", self.base_url, REST_PREFIX, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let mut request = request;
        if let Some(key) = &self.anon_key {
            request = request.header("apikey", key);
        }
        match self.access_token.as_ref().or(self.anon_key.as_ref()) {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, procedure: &str, request: RequestBuilder) -> Result<Response> {
        let response = self.authorize(request).send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout(format!("{}: {}", procedure, e))
            } else {
                Error::Http(format!("{}: {}", procedure, e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::rpc(procedure, status.as_u16(), body));
        }
        trace!(procedure, status = status.as_u16(), "RPC ok");
        Ok(response)
    }

    async fn json<T: DeserializeOwned>(&self, procedure: &str, response: Response) -> Result<T> {
        let body = response
            .text()
            .await
            .map_err(|e| Error::Http(format!("{}: {}", procedure, e)))?;
        // 역직렬화 실패 = 경계 검증 실패
        serde_json::from_str(&body)
            .map_err(|e| Error::Validation(format!("{} returned invalid data: {}", procedure, e)))
    }
}

#[derive(Serialize)]
struct GetTemplateArgs {
    p_role: Role,
}

#[derive(Serialize)]
struct UpsertTemplateArgs<'a> {
    p_role: Role,
    p_menu_permissions: &'a BTreeSet<PermissionKey>,
    p_function_permissions: &'a BTreeSet<PermissionKey>,
    p_project_permissions: &'a BTreeSet<PermissionKey>,
    p_data_permissions: &'a BTreeSet<PermissionKey>,
}

#[derive(Serialize, Deserialize)]
struct BaselineRow {
    id: i32,
    keys: BTreeSet<PermissionKey>,
}

/// RPC 결과는 단일 객체, 배열, null 중 하나로 올 수 있다
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(Option<T>),
}

impl<T> OneOrMany<T> {
    fn first(self) -> Option<T> {
        match self {
            OneOrMany::Many(items) => items.into_iter().next(),
            OneOrMany::One(item) => item,
        }
    }
}

#[async_trait]
impl TemplateStore for RpcTemplateStore {
    fn name(&self) -> &str {
        "rpc"
    }

    async fn get_template(&self, role: Role) -> Result<Option<RolePermissionTemplate>> {
        const PROC: &str = "get_role_template";
        let request = self
            .client
            .post(self.url(&format!("rpc/{}", PROC)))
            .json(&GetTemplateArgs { p_role: role });
        let response = self.send(PROC, request).await?;
        let result: OneOrMany<RolePermissionTemplate> = self.json(PROC, response).await?;
        Ok(result.first())
    }

    async fn upsert_template(&self, template: &RolePermissionTemplate) -> Result<()> {
        const PROC: &str = "upsert_role_template";
        let args = UpsertTemplateArgs {
            p_role: template.role,
            p_menu_permissions: &template.menu_permissions,
            p_function_permissions: &template.function_permissions,
            p_project_permissions: &template.project_permissions,
            p_data_permissions: &template.data_permissions,
        };
        let request = self
            .client
            .post(self.url(&format!("rpc/{}", PROC)))
            .json(&args);
        self.send(PROC, request).await?;
        debug!(role = %template.role, "Template upserted");
        Ok(())
    }

    async fn list_templates(&self) -> Result<Vec<RolePermissionTemplate>> {
        const TABLE: &str = "role_permission_templates";
        let request = self
            .client
            .get(self.url(TABLE))
            .query(&[("select", "*"), ("order", "role")]);
        let response = self.send(TABLE, request).await?;
        self.json(TABLE, response).await
    }

    async fn get_project_override(&self, project_id: &str) -> Result<Option<ProjectOverride>> {
        const TABLE: &str = "project_permission_overrides";
        let filter = format!("eq.{}", project_id);
        let request = self
            .client
            .get(self.url(TABLE))
            .query(&[("select", "*"), ("project_id", filter.as_str()), ("limit", "1")]);
        let response = self.send(TABLE, request).await?;
        let rows: Vec<ProjectOverride> = self.json(TABLE, response).await?;
        Ok(rows.into_iter().next())
    }

    async fn catalog_baseline(&self) -> Result<Option<BTreeSet<PermissionKey>>> {
        const TABLE: &str = "permission_catalog_baseline";
        let filter = format!("eq.{}", BASELINE_ROW_ID);
        let request = self
            .client
            .get(self.url(TABLE))
            .query(&[("select", "*"), ("id", filter.as_str())]);
        let response = self.send(TABLE, request).await?;
        let rows: Vec<BaselineRow> = self.json(TABLE, response).await?;
        Ok(rows.into_iter().next().map(|r| r.keys))
    }

    async fn record_catalog_baseline(&self, keys: &BTreeSet<PermissionKey>) -> Result<()> {
        const TABLE: &str = "permission_catalog_baseline";
        let row = BaselineRow {
            id: BASELINE_ROW_ID,
            keys: keys.clone(),
        };
        let request = self
            .client
            .post(self.url(TABLE))
            .header("Prefer", "resolution=merge-duplicates")
            .json(&row);
        self.send(TABLE, request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_building() {
        let store = RpcTemplateStore::new("https://api.example.co/", Duration::from_secs(5)).unwrap();
        assert_eq!(
            store.url("rpc/get_role_template"),
            "https://api.example.co/rest/v1/rpc/get_role_template"
        );
    }

    #[test]
    fn test_from_config() {
        let config = BackendConfig {
            base_url: Some("https://api.example.co".to_string()),
            anon_key: Some("anon".to_string()),
            access_token: Some("jwt".to_string()),
            timeout_secs: Some(3),
        };
        let store = RpcTemplateStore::from_config(&config).unwrap();
        assert_eq!(store.anon_key.as_deref(), Some("anon"));
        assert_eq!(store.access_token.as_deref(), Some("jwt"));

        let missing = BackendConfig::default();
        assert!(RpcTemplateStore::from_config(&missing).is_err());
    }

    #[test]
    fn test_one_or_many() {
        let many: OneOrMany<RolePermissionTemplate> =
            serde_json::from_str(r#"[{ "role": "admin" }]"#).unwrap();
        assert_eq!(many.first().unwrap().role, Role::Admin);

        let one: OneOrMany<RolePermissionTemplate> =
            serde_json::from_str(r#"{ "role": "viewer" }"#).unwrap();
        assert_eq!(one.first().unwrap().role, Role::Viewer);

        let none: OneOrMany<RolePermissionTemplate> = serde_json::from_str("null").unwrap();
        assert!(none.first().is_none());

        let empty: OneOrMany<RolePermissionTemplate> = serde_json::from_str("[]").unwrap();
        assert!(empty.first().is_none());
    }

    #[test]
    fn test_upsert_args_shape() {
        let template = RolePermissionTemplate::new(Role::Finance).with_menus(["menu.finance"]);
        let args = UpsertTemplateArgs {
            p_role: template.role,
            p_menu_permissions: &template.menu_permissions,
            p_function_permissions: &template.function_permissions,
            p_project_permissions: &template.project_permissions,
            p_data_permissions: &template.data_permissions,
        };
        let value = serde_json::to_value(&args).unwrap();
        assert_eq!(value["p_role"], "finance");
        assert_eq!(value["p_menu_permissions"][0], "menu.finance");
        assert!(value["p_function_permissions"].as_array().unwrap().is_empty());
    }
}

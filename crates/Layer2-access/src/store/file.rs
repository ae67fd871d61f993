//! JSON 파일 템플릿 저장소
//!
//! 원격 백엔드 없이 역할 템플릿을 관리할 때 사용. 파일 하나에 템플릿,
//! 프로젝트 override, 카탈로그 baseline을 모두 담는다.

use super::TemplateStore;
use async_trait::async_trait;
use chrono::Utc;
use freight_foundation::{
    JsonStore, PermissionKey, ProjectOverride, Result, Role, RolePermissionTemplate,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use tokio::sync::Mutex;
use tracing::debug;

/// 기본 파일명
pub const TEMPLATES_FILE: &str = "role_templates.json";

/// 파일 내용
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateFile {
    #[serde(default)]
    pub templates: Vec<RolePermissionTemplate>,

    #[serde(default)]
    pub project_overrides: Vec<ProjectOverride>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_baseline: Option<BTreeSet<PermissionKey>>,
}

/// JSON 파일 기반 저장소
#[derive(Debug)]
pub struct FileTemplateStore {
    store: JsonStore,
    filename: String,
    // read-modify-write 직렬화
    lock: Mutex<()>,
}

impl FileTemplateStore {
    pub fn new(store: JsonStore, filename: impl Into<String>) -> Self {
        Self {
            store,
            filename: filename.into(),
            lock: Mutex::new(()),
        }
    }

    /// 경로로 열기 (디렉토리 + 파일명 분리)
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| TEMPLATES_FILE.to_string());
        Self::new(JsonStore::new(dir), filename)
    }

    fn read(&self) -> Result<TemplateFile> {
        Ok(self
            .store
            .load_optional::<TemplateFile>(&self.filename)?
            .unwrap_or_default())
    }

    fn write(&self, file: &TemplateFile) -> Result<()> {
        self.store.save(&self.filename, file)
    }
}

#[async_trait]
impl TemplateStore for FileTemplateStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn get_template(&self, role: Role) -> Result<Option<RolePermissionTemplate>> {
        let _guard = self.lock.lock().await;
        Ok(self.read()?.templates.into_iter().find(|t| t.role == role))
    }

    async fn upsert_template(&self, template: &RolePermissionTemplate) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut file = self.read()?;

        let mut stored = template.clone();
        stored.updated_at = Some(Utc::now());
        match file.templates.iter_mut().find(|t| t.role == template.role) {
            Some(existing) => *existing = stored,
            None => file.templates.push(stored),
        }
        file.templates.sort_by_key(|t| t.role);

        self.write(&file)?;
        debug!(role = %template.role, file = %self.filename, "Template written");
        Ok(())
    }

    async fn list_templates(&self) -> Result<Vec<RolePermissionTemplate>> {
        let _guard = self.lock.lock().await;
        Ok(self.read()?.templates)
    }

    async fn get_project_override(&self, project_id: &str) -> Result<Option<ProjectOverride>> {
        let _guard = self.lock.lock().await;
        Ok(self
            .read()?
            .project_overrides
            .into_iter()
            .find(|o| o.project_id == project_id))
    }

    async fn catalog_baseline(&self) -> Result<Option<BTreeSet<PermissionKey>>> {
        let _guard = self.lock.lock().await;
        Ok(self.read()?.catalog_baseline)
    }

    async fn record_catalog_baseline(&self, keys: &BTreeSet<PermissionKey>) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut file = self.read()?;
        file.catalog_baseline = Some(keys.clone());
        self.write(&file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTemplateStore::open(dir.path().join("templates.json"));
        assert!(store.list_templates().await.unwrap().is_empty());
        assert!(store.get_template(Role::Admin).await.unwrap().is_none());
        assert!(store.catalog_baseline().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_replaces_role_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("templates.json");
        let store = FileTemplateStore::open(&path);

        store
            .upsert_template(&RolePermissionTemplate::new(Role::Viewer).with_menus(["menu.dashboard"]))
            .await
            .unwrap();
        store
            .upsert_template(
                &RolePermissionTemplate::new(Role::Viewer)
                    .with_menus(["menu.dashboard", "menu.business"]),
            )
            .await
            .unwrap();
        store
            .upsert_template(&RolePermissionTemplate::new(Role::Admin))
            .await
            .unwrap();

        // 새 인스턴스로 다시 읽기
        let reopened = FileTemplateStore::open(&path);
        let all = reopened.list_templates().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].role, Role::Admin);
        let viewer = reopened.get_template(Role::Viewer).await.unwrap().unwrap();
        assert_eq!(viewer.menu_permissions.len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("templates.json");
        std::fs::write(&path, r#"{ "templates": [ { "role": "root" } ] }"#).unwrap();

        let store = FileTemplateStore::open(&path);
        assert!(store.list_templates().await.is_err());
    }
}

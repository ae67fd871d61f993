//! In-memory template store

use super::TemplateStore;
use async_trait::async_trait;
use chrono::Utc;
use freight_foundation::{PermissionKey, ProjectOverride, Result, Role, RolePermissionTemplate};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// 프로세스 내 템플릿 저장소
#[derive(Debug, Default)]
pub struct MemoryTemplateStore {
    templates: RwLock<BTreeMap<Role, RolePermissionTemplate>>,
    overrides: RwLock<HashMap<String, ProjectOverride>>,
    baseline: RwLock<Option<BTreeSet<PermissionKey>>>,
    writes: AtomicUsize,
}

impl MemoryTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_templates(templates: impl IntoIterator<Item = RolePermissionTemplate>) -> Self {
        let map = templates.into_iter().map(|t| (t.role, t)).collect();
        Self {
            templates: RwLock::new(map),
            ..Default::default()
        }
    }

    pub async fn insert_override(&self, ov: ProjectOverride) {
        self.overrides.write().await.insert(ov.project_id.clone(), ov);
    }

    /// upsert 호출 횟수 (템플릿 + baseline)
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TemplateStore for MemoryTemplateStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get_template(&self, role: Role) -> Result<Option<RolePermissionTemplate>> {
        Ok(self.templates.read().await.get(&role).cloned())
    }

    async fn upsert_template(&self, template: &RolePermissionTemplate) -> Result<()> {
        let mut stored = template.clone();
        stored.updated_at = Some(Utc::now());
        self.templates.write().await.insert(stored.role, stored);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn list_templates(&self) -> Result<Vec<RolePermissionTemplate>> {
        Ok(self.templates.read().await.values().cloned().collect())
    }

    async fn get_project_override(&self, project_id: &str) -> Result<Option<ProjectOverride>> {
        Ok(self.overrides.read().await.get(project_id).cloned())
    }

    async fn catalog_baseline(&self) -> Result<Option<BTreeSet<PermissionKey>>> {
        Ok(self.baseline.read().await.clone())
    }

    async fn record_catalog_baseline(&self, keys: &BTreeSet<PermissionKey>) -> Result<()> {
        *self.baseline.write().await = Some(keys.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upsert_and_get() {
        let store = MemoryTemplateStore::new();
        assert!(store.get_template(Role::Finance).await.unwrap().is_none());

        let template = RolePermissionTemplate::new(Role::Finance).with_menus(["menu.finance"]);
        store.upsert_template(&template).await.unwrap();

        let loaded = store.get_template(Role::Finance).await.unwrap().unwrap();
        assert!(loaded.grants_menu("menu.finance"));
        assert!(loaded.updated_at.is_some());
        assert_eq!(store.write_count(), 1);
        assert_eq!(store.list_templates().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_overrides_and_baseline() {
        let store = MemoryTemplateStore::new();
        store
            .insert_override(ProjectOverride::new("p-1").with_menus(["menu.dashboard"]))
            .await;
        assert!(store.get_project_override("p-1").await.unwrap().is_some());
        assert!(store.get_project_override("p-2").await.unwrap().is_none());

        assert!(store.catalog_baseline().await.unwrap().is_none());
        let keys: BTreeSet<_> = [PermissionKey::new("menu.dashboard")].into();
        store.record_catalog_baseline(&keys).await.unwrap();
        assert_eq!(store.catalog_baseline().await.unwrap(), Some(keys));
    }
}

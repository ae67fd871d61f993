//! 세션 컨텍스트 / 유효 권한 집합
//!
//! 전역 조회 대신 불변 스냅샷을 resolver에 명시적으로 넘긴다.
//! 스냅샷은 로그인, 역할 변경, 명시적 무효화 시 새로 계산되고 통째로 교체된다.

use super::catalog::PermissionCatalog;
use super::template::{DataScope, ProjectOverride, RolePermissionTemplate};
use super::types::{PermissionKey, Role};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;
use uuid::Uuid;

/// 외부 인증 컨텍스트가 넘겨주는 값
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub role: Role,
    /// 프로젝트 한정 세션
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
}

impl AuthContext {
    pub fn new(user_id: Uuid, role: Role) -> Self {
        Self {
            user_id,
            role,
            project_id: None,
        }
    }

    pub fn with_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }
}

// ============================================================================
// EffectivePermissionSet
// ============================================================================

/// 세션 단위 유효 권한 (저장되지 않음)
///
/// 항상 카탈로그의 부분집합이다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectivePermissionSet {
    menus: BTreeSet<PermissionKey>,
    functions: BTreeSet<PermissionKey>,
    projects: BTreeSet<PermissionKey>,
    data_scope: DataScope,
}

impl EffectivePermissionSet {
    /// 템플릿 ∩ 카탈로그 (∩ 프로젝트 override)
    pub fn resolve(
        template: &RolePermissionTemplate,
        project_override: Option<&ProjectOverride>,
        catalog: &PermissionCatalog,
    ) -> Self {
        let known = |key: &&PermissionKey| {
            let ok = catalog.contains(key.as_str());
            if !ok {
                debug!(role = %template.role, key = %key, "Dropping key unknown to catalog");
            }
            ok
        };

        let mut menus: BTreeSet<_> = template.menu_permissions.iter().filter(known).cloned().collect();
        let mut functions: BTreeSet<_> = template
            .function_permissions
            .iter()
            .filter(known)
            .cloned()
            .collect();

        if let Some(ov) = project_override {
            menus.retain(|k| ov.menu_permissions.contains(k));
            functions.retain(|k| ov.function_permissions.contains(k));
        }

        Self {
            menus,
            functions,
            projects: template.project_permissions.clone(),
            data_scope: DataScope::from_keys(&template.data_permissions),
        }
    }

    pub fn has_menu(&self, key: &str) -> bool {
        self.menus.contains(key)
    }

    pub fn has_function(&self, key: &str) -> bool {
        self.functions.contains(key)
    }

    pub fn has_project(&self, project_id: &str) -> bool {
        super::template::project_granted(&self.projects, project_id)
    }

    pub fn data_scope(&self) -> DataScope {
        self.data_scope
    }

    pub fn menus(&self) -> &BTreeSet<PermissionKey> {
        &self.menus
    }

    pub fn functions(&self) -> &BTreeSet<PermissionKey> {
        &self.functions
    }

    pub fn len(&self) -> usize {
        self.menus.len() + self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.menus.is_empty() && self.functions.is_empty()
    }
}

// ============================================================================
// SessionContext
// ============================================================================

/// 로드된 세션 (불변 스냅샷)
#[derive(Debug, Clone)]
pub struct SessionContext {
    auth: AuthContext,
    template: RolePermissionTemplate,
    effective: EffectivePermissionSet,
    catalog_version: u32,
    loaded_at: DateTime<Utc>,
}

impl SessionContext {
    /// 세션 생성
    ///
    /// 템플릿 역할이 세션 역할과 다르면 검증 에러.
    /// override는 세션의 project_id와 같은 프로젝트일 때만 적용된다.
    pub fn new(
        auth: AuthContext,
        template: RolePermissionTemplate,
        project_override: Option<&ProjectOverride>,
        catalog: &PermissionCatalog,
    ) -> Result<Self> {
        if template.role != auth.role {
            return Err(Error::Validation(format!(
                "template role {} does not match session role {}",
                template.role, auth.role
            )));
        }

        let project_override = project_override
            .filter(|ov| auth.project_id.as_deref() == Some(ov.project_id.as_str()));
        let effective = EffectivePermissionSet::resolve(&template, project_override, catalog);

        debug!(
            user = %auth.user_id,
            role = %auth.role,
            menus = effective.menus().len(),
            functions = effective.functions().len(),
            "Resolved effective permissions"
        );

        Ok(Self {
            auth,
            template,
            effective,
            catalog_version: catalog.version,
            loaded_at: Utc::now(),
        })
    }

    pub fn auth(&self) -> &AuthContext {
        &self.auth
    }

    pub fn user_id(&self) -> Uuid {
        self.auth.user_id
    }

    pub fn role(&self) -> Role {
        self.auth.role
    }

    pub fn project_id(&self) -> Option<&str> {
        self.auth.project_id.as_deref()
    }

    pub fn template(&self) -> &RolePermissionTemplate {
        &self.template
    }

    pub fn effective(&self) -> &EffectivePermissionSet {
        &self.effective
    }

    pub fn catalog_version(&self) -> u32 {
        self.catalog_version
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> PermissionCatalog {
        PermissionCatalog::from_keys(1, ["menu.dashboard", "menu.settings", "fn.export", "fn.edit"])
    }

    #[test]
    fn test_effective_is_subset_of_catalog() {
        let template = RolePermissionTemplate::new(Role::Admin)
            .with_menus(["menu.dashboard", "menu.legacy"])
            .with_functions(["fn.export", "fn.removed"]);

        let effective = EffectivePermissionSet::resolve(&template, None, &catalog());
        assert!(effective.has_menu("menu.dashboard"));
        assert!(!effective.has_menu("menu.legacy"));
        assert!(!effective.has_function("fn.removed"));
        assert!(effective
            .menus()
            .iter()
            .chain(effective.functions())
            .all(|k| catalog().contains(k.as_str())));
    }

    #[test]
    fn test_project_override_intersects() {
        let template = RolePermissionTemplate::new(Role::Business)
            .with_menus(["menu.dashboard", "menu.settings"])
            .with_functions(["fn.export", "fn.edit"]);
        let ov = ProjectOverride::new("p-1")
            .with_menus(["menu.dashboard"])
            .with_functions(["fn.export", "fn.unknown"]);

        let auth = AuthContext::new(Uuid::new_v4(), Role::Business).with_project("p-1");
        let session = SessionContext::new(auth, template.clone(), Some(&ov), &catalog()).unwrap();
        assert!(session.effective().has_menu("menu.dashboard"));
        assert!(!session.effective().has_menu("menu.settings"));
        assert!(session.effective().has_function("fn.export"));
        assert!(!session.effective().has_function("fn.edit"));

        // 다른 프로젝트 override는 무시
        let auth = AuthContext::new(Uuid::new_v4(), Role::Business).with_project("p-2");
        let session = SessionContext::new(auth, template, Some(&ov), &catalog()).unwrap();
        assert!(session.effective().has_function("fn.edit"));
    }

    #[test]
    fn test_role_mismatch_rejected() {
        let auth = AuthContext::new(Uuid::new_v4(), Role::Viewer);
        let template = RolePermissionTemplate::new(Role::Admin);
        assert!(matches!(
            SessionContext::new(auth, template, None, &catalog()),
            Err(Error::Validation(_))
        ));
    }
}

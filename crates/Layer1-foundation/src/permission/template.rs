//! 역할 권한 템플릿 (원격 저장 레코드)
//!
//! 집합에 포함 = 허용, 없음 = 거부.

use super::catalog::{DATA_ALL, DATA_OWN, DATA_TEAM, PROJECT_ALL};
use super::types::{PermissionKey, Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// 역할별 권한 템플릿
///
/// 관리자가 역할을 정의할 때 생성되고, 템플릿 편집으로 변경된다.
/// 역할이 참조되는 동안 삭제되지 않는다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePermissionTemplate {
    pub role: Role,

    #[serde(default)]
    pub menu_permissions: BTreeSet<PermissionKey>,

    #[serde(default)]
    pub function_permissions: BTreeSet<PermissionKey>,

    /// 프로젝트 id 또는 `project.all`
    #[serde(default)]
    pub project_permissions: BTreeSet<PermissionKey>,

    /// `data.all` / `data.team` / `data.own`
    #[serde(default)]
    pub data_permissions: BTreeSet<PermissionKey>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl RolePermissionTemplate {
    /// 빈 템플릿 (모두 거부)
    pub fn new(role: Role) -> Self {
        Self {
            role,
            menu_permissions: BTreeSet::new(),
            function_permissions: BTreeSet::new(),
            project_permissions: BTreeSet::new(),
            data_permissions: BTreeSet::new(),
            updated_at: None,
        }
    }

    pub fn with_menus<'a>(mut self, keys: impl IntoIterator<Item = &'a str>) -> Self {
        self.menu_permissions
            .extend(keys.into_iter().map(PermissionKey::new));
        self
    }

    pub fn with_functions<'a>(mut self, keys: impl IntoIterator<Item = &'a str>) -> Self {
        self.function_permissions
            .extend(keys.into_iter().map(PermissionKey::new));
        self
    }

    pub fn with_projects<'a>(mut self, ids: impl IntoIterator<Item = &'a str>) -> Self {
        self.project_permissions
            .extend(ids.into_iter().map(PermissionKey::new));
        self
    }

    pub fn with_data<'a>(mut self, keys: impl IntoIterator<Item = &'a str>) -> Self {
        self.data_permissions
            .extend(keys.into_iter().map(PermissionKey::new));
        self
    }

    pub fn grants_menu(&self, key: &str) -> bool {
        self.menu_permissions.contains(key)
    }

    pub fn grants_function(&self, key: &str) -> bool {
        self.function_permissions.contains(key)
    }

    /// 다른 템플릿의 모든 키를 포함하는지 (동기화 후 검증용)
    pub fn is_superset_of(&self, other: &RolePermissionTemplate) -> bool {
        self.menu_permissions.is_superset(&other.menu_permissions)
            && self
                .function_permissions
                .is_superset(&other.function_permissions)
            && self
                .project_permissions
                .is_superset(&other.project_permissions)
            && self.data_permissions.is_superset(&other.data_permissions)
    }
}

// ============================================================================
// Project Override
// ============================================================================

/// 프로젝트 단위 권한 제한
///
/// 세션이 이 프로젝트로 한정되면 유효 권한 = 템플릿 ∩ override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectOverride {
    pub project_id: String,

    #[serde(default)]
    pub menu_permissions: BTreeSet<PermissionKey>,

    #[serde(default)]
    pub function_permissions: BTreeSet<PermissionKey>,
}

impl ProjectOverride {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            menu_permissions: BTreeSet::new(),
            function_permissions: BTreeSet::new(),
        }
    }

    pub fn with_menus<'a>(mut self, keys: impl IntoIterator<Item = &'a str>) -> Self {
        self.menu_permissions
            .extend(keys.into_iter().map(PermissionKey::new));
        self
    }

    pub fn with_functions<'a>(mut self, keys: impl IntoIterator<Item = &'a str>) -> Self {
        self.function_permissions
            .extend(keys.into_iter().map(PermissionKey::new));
        self
    }
}

// ============================================================================
// Data Scope
// ============================================================================

/// 데이터 조회 범위
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DataScope {
    #[default]
    None,
    Own,
    Team,
    All,
}

impl DataScope {
    /// `data_permissions`에서 가장 넓은 범위
    pub fn from_keys(keys: &BTreeSet<PermissionKey>) -> Self {
        if keys.contains(DATA_ALL) {
            DataScope::All
        } else if keys.contains(DATA_TEAM) {
            DataScope::Team
        } else if keys.contains(DATA_OWN) {
            DataScope::Own
        } else {
            DataScope::None
        }
    }
}

/// 프로젝트 접근 여부 (`project.all` 또는 id 포함)
pub(crate) fn project_granted(keys: &BTreeSet<PermissionKey>, project_id: &str) -> bool {
    keys.contains(PROJECT_ALL) || keys.contains(project_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_json_roundtrip_shape() {
        let json = r#"{
            "role": "finance",
            "menu_permissions": ["menu.finance", "menu.finance.reconciliation"],
            "function_permissions": ["fn.finance.reconcile"],
            "data_permissions": ["data.all"]
        }"#;
        let template: RolePermissionTemplate = serde_json::from_str(json).unwrap();
        assert_eq!(template.role, Role::Finance);
        assert!(template.grants_menu("menu.finance.reconciliation"));
        assert!(template.grants_function("fn.finance.reconcile"));
        assert!(template.project_permissions.is_empty());
        assert!(template.updated_at.is_none());
    }

    #[test]
    fn test_template_rejects_bad_input() {
        let bad_role = r#"{ "role": "root" }"#;
        assert!(serde_json::from_str::<RolePermissionTemplate>(bad_role).is_err());

        let bad_key = r#"{ "role": "viewer", "menu_permissions": ["menu dashboard"] }"#;
        assert!(serde_json::from_str::<RolePermissionTemplate>(bad_key).is_err());
    }

    #[test]
    fn test_superset() {
        let before = RolePermissionTemplate::new(Role::Admin).with_menus(["menu.dashboard"]);
        let after = before.clone().with_menus(["menu.settings"]);
        assert!(after.is_superset_of(&before));
        assert!(!before.is_superset_of(&after));
    }

    #[test]
    fn test_data_scope() {
        let t = RolePermissionTemplate::new(Role::Business).with_data(["data.own", "data.team"]);
        assert_eq!(DataScope::from_keys(&t.data_permissions), DataScope::Team);
        assert_eq!(DataScope::from_keys(&BTreeSet::new()), DataScope::None);
        assert!(DataScope::All > DataScope::Own);
    }

    #[test]
    fn test_project_granted() {
        let t = RolePermissionTemplate::new(Role::Operator).with_projects(["p-100"]);
        assert!(project_granted(&t.project_permissions, "p-100"));
        assert!(!project_granted(&t.project_permissions, "p-200"));

        let all = RolePermissionTemplate::new(Role::Finance).with_projects([PROJECT_ALL]);
        assert!(project_granted(&all.project_permissions, "p-200"));
    }
}

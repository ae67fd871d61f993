//! Sync delta computation

use freight_foundation::{PermissionCatalog, PermissionKey, Role, RolePermissionTemplate};
use std::collections::BTreeSet;

/// 카탈로그에는 있고 템플릿에는 없는 키 (동기화 대상)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncDelta {
    pub role: Role,
    pub missing_menus: BTreeSet<PermissionKey>,
    pub missing_functions: BTreeSet<PermissionKey>,
}

impl SyncDelta {
    /// delta = catalog − template − baseline
    ///
    /// `baseline`은 이전 동기화에서 이미 배포한 키. 그 키가 템플릿에 없다면
    /// 관리자가 회수한 것이므로 다시 추가하지 않는다.
    pub fn compute(
        template: &RolePermissionTemplate,
        catalog: &PermissionCatalog,
        baseline: Option<&BTreeSet<PermissionKey>>,
    ) -> Self {
        let missing = |catalog_keys: BTreeSet<PermissionKey>, granted: &BTreeSet<PermissionKey>| {
            catalog_keys
                .into_iter()
                .filter(|k| !granted.contains(k))
                .filter(|k| baseline.map(|b| !b.contains(k)).unwrap_or(true))
                .collect::<BTreeSet<_>>()
        };

        Self {
            role: template.role,
            missing_menus: missing(catalog.menu_keys(), &template.menu_permissions),
            missing_functions: missing(catalog.function_keys(), &template.function_permissions),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.missing_menus.is_empty() && self.missing_functions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.missing_menus.len() + self.missing_functions.len()
    }

    /// 템플릿에 delta 합치기 (추가만)
    pub fn apply(&self, template: &RolePermissionTemplate) -> RolePermissionTemplate {
        let mut updated = template.clone();
        updated
            .menu_permissions
            .extend(self.missing_menus.iter().cloned());
        updated
            .function_permissions
            .extend(self.missing_functions.iter().cloned());
        updated
    }
}

//! Permission resolver
//!
//! 세션 스냅샷에 대한 순수 조회. 세션이 없으면 모든 검사가 `false` (fail-closed).
//! 거부는 에러가 아니라 결과값이며, 호출자는 대체 화면을 보여준다.

use super::catalog::PermissionCatalog;
use super::session::SessionContext;
use super::template::DataScope;
use super::types::{PermissionKey, PermissionKind, Role, RoleRequirement};

/// Read-only permission checks over an optional session snapshot.
#[derive(Debug, Clone, Copy)]
pub struct PermissionResolver<'a> {
    session: Option<&'a SessionContext>,
}

impl<'a> PermissionResolver<'a> {
    pub fn new(session: Option<&'a SessionContext>) -> Self {
        Self { session }
    }

    /// 세션 없음 (모든 검사 거부)
    pub fn anonymous() -> Self {
        Self { session: None }
    }

    pub fn role(&self) -> Option<Role> {
        self.session.map(SessionContext::role)
    }

    pub fn is_loaded(&self) -> bool {
        self.session.is_some()
    }

    pub fn has_menu_access(&self, key: &str) -> bool {
        self.session
            .map(|s| s.effective().has_menu(key))
            .unwrap_or(false)
    }

    pub fn has_function_access(&self, key: &str) -> bool {
        self.session
            .map(|s| s.effective().has_function(key))
            .unwrap_or(false)
    }

    /// 여러 기능 중 하나라도 허용되면 true
    pub fn has_any_function(&self, keys: &[&str]) -> bool {
        keys.iter().any(|k| self.has_function_access(k))
    }

    pub fn has_role(&self, required: impl Into<RoleRequirement>) -> bool {
        self.session.is_some() && required.into().allows(self.role())
    }

    pub fn has_project_access(&self, project_id: &str) -> bool {
        self.session
            .map(|s| s.effective().has_project(project_id))
            .unwrap_or(false)
    }

    pub fn data_scope(&self) -> DataScope {
        self.session
            .map(|s| s.effective().data_scope())
            .unwrap_or(DataScope::None)
    }

    /// 카탈로그 순서대로 접근 가능한 메뉴
    pub fn accessible_menus<'c>(&self, catalog: &'c PermissionCatalog) -> Vec<&'c PermissionKey> {
        catalog
            .by_kind(PermissionKind::Menu)
            .filter(|e| self.has_menu_access(e.key.as_str()))
            .map(|e| &e.key)
            .collect()
    }

    /// 복합 조건 검사 (모든 조건 AND)
    pub fn check(&self, requirement: &AccessRequirement) -> AccessDecision {
        if self.session.is_none() {
            return AccessDecision::Denied(DenyReason::NoSession);
        }
        if !requirement.roles.allows(self.role()) {
            return AccessDecision::Denied(DenyReason::RoleNotAllowed);
        }
        if let Some(menu) = &requirement.menu {
            if !self.has_menu_access(menu.as_str()) {
                return AccessDecision::Denied(DenyReason::MenuDenied(menu.clone()));
            }
        }
        if let Some(function) = &requirement.function {
            if !self.has_function_access(function.as_str()) {
                return AccessDecision::Denied(DenyReason::FunctionDenied(function.clone()));
            }
        }
        AccessDecision::Granted
    }

    pub fn allows(&self, requirement: &AccessRequirement) -> bool {
        self.check(requirement).is_granted()
    }
}

// ============================================================================
// AccessRequirement
// ============================================================================

/// 화면/동작 보호 조건
///
/// 설정된 조건은 모두 AND로 결합된다. 아무 조건도 없으면 세션만 있으면 허용.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessRequirement {
    pub menu: Option<PermissionKey>,
    pub function: Option<PermissionKey>,
    pub roles: RoleRequirement,
}

impl AccessRequirement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn menu(mut self, key: impl Into<String>) -> Self {
        self.menu = Some(PermissionKey::new(key));
        self
    }

    pub fn function(mut self, key: impl Into<String>) -> Self {
        self.function = Some(PermissionKey::new(key));
        self
    }

    pub fn roles(mut self, roles: impl Into<RoleRequirement>) -> Self {
        self.roles = roles.into();
        self
    }
}

/// 검사 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Granted,
    Denied(DenyReason),
}

impl AccessDecision {
    pub fn is_granted(&self) -> bool {
        matches!(self, AccessDecision::Granted)
    }
}

/// 거부 사유 (진단용)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    NoSession,
    RoleNotAllowed,
    MenuDenied(PermissionKey),
    FunctionDenied(PermissionKey),
}

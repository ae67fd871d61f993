//! 권한 카탈로그 (코드에 정의된 정적 목록)
//!
//! 애플리케이션의 라우트/기능 레지스트리가 알고 있는 모든 메뉴/기능 키.
//! 원격 데이터와 무관하게 빌드 시점에 결정되며 `version`으로 구분한다.
//! 동기화기는 이 목록과 저장된 역할 템플릿을 비교한다.

use super::template::RolePermissionTemplate;
use super::types::{PermissionKey, PermissionKind, Role};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// 내장 카탈로그 버전
pub const CATALOG_VERSION: u32 = 3;

/// 카탈로그 항목
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    /// 키 (예: "menu.finance.reconciliation")
    pub key: PermissionKey,

    /// 메뉴 / 기능
    pub kind: PermissionKind,

    /// 표시 이름
    pub label: String,

    /// 기본 부여 역할 (관리자는 항상 포함)
    #[serde(default)]
    pub default_roles: Vec<Role>,
}

impl CatalogEntry {
    pub fn menu(key: &str) -> Self {
        Self::new(key, PermissionKind::Menu)
    }

    pub fn function(key: &str) -> Self {
        Self::new(key, PermissionKind::Function)
    }

    fn new(key: &str, kind: PermissionKind) -> Self {
        Self {
            key: PermissionKey::new(key),
            kind,
            label: String::new(),
            default_roles: Vec::new(),
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn roles(mut self, roles: &[Role]) -> Self {
        self.default_roles = roles.to_vec();
        self
    }

    /// 역할이 기본으로 받는 항목인지
    pub fn is_default_for(&self, role: Role) -> bool {
        role.is_admin() || self.default_roles.contains(&role)
    }
}

/// 권한 카탈로그
///
/// 항목은 선언 순서를 유지한다 (메뉴 렌더링 순서).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PermissionCatalog {
    pub version: u32,
    entries: Vec<CatalogEntry>,
}

impl PermissionCatalog {
    pub fn new(version: u32) -> Self {
        Self {
            version,
            entries: Vec::new(),
        }
    }

    /// 항목 추가 (같은 키가 있으면 교체)
    pub fn register(&mut self, entry: CatalogEntry) {
        if let Some(existing) = self.entries.iter_mut().find(|e| e.key == entry.key) {
            *existing = entry;
        } else {
            self.entries.push(entry);
        }
    }

    pub fn register_all(&mut self, entries: Vec<CatalogEntry>) {
        for entry in entries {
            self.register(entry);
        }
    }

    /// 키 목록으로 간단히 구성 (접두사로 메뉴/기능 구분)
    pub fn from_keys<'a>(version: u32, keys: impl IntoIterator<Item = &'a str>) -> Self {
        let mut catalog = Self::new(version);
        for key in keys {
            let entry = if key.starts_with("fn.") {
                CatalogEntry::function(key)
            } else {
                CatalogEntry::menu(key)
            };
            catalog.register(entry);
        }
        catalog
    }

    /// 내장 카탈로그 (`catalog::builtin()`)
    pub fn builtin() -> Self {
        builtin()
    }

    pub fn get(&self, key: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.key.as_str() == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn by_kind(&self, kind: PermissionKind) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter().filter(move |e| e.kind == kind)
    }

    pub fn menu_keys(&self) -> BTreeSet<PermissionKey> {
        self.by_kind(PermissionKind::Menu).map(|e| e.key.clone()).collect()
    }

    pub fn function_keys(&self) -> BTreeSet<PermissionKey> {
        self.by_kind(PermissionKind::Function)
            .map(|e| e.key.clone())
            .collect()
    }

    pub fn all_keys(&self) -> BTreeSet<PermissionKey> {
        self.entries.iter().map(|e| e.key.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 역할 기본 템플릿 (신규 역할 생성/누락 역할 시딩용)
    pub fn default_template(&self, role: Role) -> RolePermissionTemplate {
        let mut template = RolePermissionTemplate::new(role);
        for entry in self.entries.iter().filter(|e| e.is_default_for(role)) {
            match entry.kind {
                PermissionKind::Menu => template.menu_permissions.insert(entry.key.clone()),
                PermissionKind::Function => template.function_permissions.insert(entry.key.clone()),
            };
        }
        let data = match role {
            Role::Admin | Role::Finance => DATA_ALL,
            Role::Business => DATA_TEAM,
            Role::Operator | Role::Partner | Role::Viewer => DATA_OWN,
        };
        if matches!(role, Role::Admin | Role::Finance | Role::Business) {
            template
                .project_permissions
                .insert(PermissionKey::new(PROJECT_ALL));
        }
        template.data_permissions.insert(PermissionKey::new(data));
        template
    }
}

/// 모든 프로젝트 접근
pub const PROJECT_ALL: &str = "project.all";
/// 전체 데이터
pub const DATA_ALL: &str = "data.all";
/// 팀 데이터
pub const DATA_TEAM: &str = "data.team";
/// 본인 데이터
pub const DATA_OWN: &str = "data.own";

// ============================================================
// 내장 카탈로그
// ============================================================

/// 애플리케이션 라우트/기능 레지스트리
pub fn builtin() -> PermissionCatalog {
    use Role::*;

    let mut catalog = PermissionCatalog::new(CATALOG_VERSION);
    catalog.register_all(vec![
        // 대시보드
        CatalogEntry::menu("menu.dashboard")
            .label("Dashboard")
            .roles(&[Finance, Business, Operator, Partner, Viewer]),
        CatalogEntry::menu("menu.dashboard.transport")
            .label("Transport overview")
            .roles(&[Business, Operator, Partner, Viewer]),
        CatalogEntry::menu("menu.dashboard.financial")
            .label("Financial overview")
            .roles(&[Finance]),
        CatalogEntry::menu("menu.dashboard.project")
            .label("Project overview")
            .roles(&[Business, Viewer]),
        // 기초 정보
        CatalogEntry::menu("menu.maintenance")
            .label("Master data")
            .roles(&[Business]),
        CatalogEntry::menu("menu.maintenance.projects")
            .label("Projects")
            .roles(&[Business]),
        CatalogEntry::menu("menu.maintenance.drivers")
            .label("Drivers")
            .roles(&[Business, Operator]),
        CatalogEntry::menu("menu.maintenance.locations")
            .label("Locations")
            .roles(&[Business, Operator]),
        CatalogEntry::menu("menu.maintenance.partners")
            .label("Partners")
            .roles(&[Business, Finance]),
        // 업무
        CatalogEntry::menu("menu.business")
            .label("Operations")
            .roles(&[Business, Operator]),
        CatalogEntry::menu("menu.business.waybills")
            .label("Waybills")
            .roles(&[Business, Operator, Finance]),
        CatalogEntry::menu("menu.business.scale_records")
            .label("Scale records")
            .roles(&[Business, Operator]),
        CatalogEntry::menu("menu.business.invoice_requests")
            .label("Invoice requests")
            .roles(&[Business, Finance]),
        CatalogEntry::menu("menu.business.payment_requests")
            .label("Payment requests")
            .roles(&[Business, Finance]),
        // 재무
        CatalogEntry::menu("menu.finance")
            .label("Finance")
            .roles(&[Finance]),
        CatalogEntry::menu("menu.finance.reconciliation")
            .label("Reconciliation")
            .roles(&[Finance]),
        CatalogEntry::menu("menu.finance.invoice_audit")
            .label("Invoice audit")
            .roles(&[Finance]),
        CatalogEntry::menu("menu.finance.payment_audit")
            .label("Payment audit")
            .roles(&[Finance]),
        // 계약
        CatalogEntry::menu("menu.contracts")
            .label("Contracts")
            .roles(&[Business, Finance]),
        CatalogEntry::menu("menu.contracts.list")
            .label("Contract list")
            .roles(&[Business, Finance]),
        // 설정 (관리자 전용)
        CatalogEntry::menu("menu.settings").label("Settings"),
        CatalogEntry::menu("menu.settings.users").label("Users"),
        CatalogEntry::menu("menu.settings.permissions").label("Permissions"),
        CatalogEntry::menu("menu.settings.role_templates").label("Role templates"),
        CatalogEntry::menu("menu.settings.audit_log").label("Audit log"),
        // 기능
        CatalogEntry::function("fn.waybill.create")
            .label("Create waybill")
            .roles(&[Business, Operator]),
        CatalogEntry::function("fn.waybill.edit")
            .label("Edit waybill")
            .roles(&[Business, Operator]),
        CatalogEntry::function("fn.waybill.delete")
            .label("Delete waybill")
            .roles(&[Business]),
        CatalogEntry::function("fn.waybill.import")
            .label("Import waybills")
            .roles(&[Business, Operator]),
        CatalogEntry::function("fn.waybill.export")
            .label("Export waybills")
            .roles(&[Business, Finance]),
        CatalogEntry::function("fn.project.create")
            .label("Create project")
            .roles(&[Business]),
        CatalogEntry::function("fn.project.edit")
            .label("Edit project")
            .roles(&[Business]),
        CatalogEntry::function("fn.finance.reconcile")
            .label("Reconcile")
            .roles(&[Finance]),
        CatalogEntry::function("fn.finance.approve_invoice")
            .label("Approve invoice")
            .roles(&[Finance]),
        CatalogEntry::function("fn.finance.approve_payment")
            .label("Approve payment")
            .roles(&[Finance]),
        CatalogEntry::function("fn.finance.export")
            .label("Export financial report")
            .roles(&[Finance]),
        CatalogEntry::function("fn.contract.create")
            .label("Create contract")
            .roles(&[Business]),
        CatalogEntry::function("fn.contract.view_sensitive")
            .label("View contract amounts")
            .roles(&[Finance]),
        CatalogEntry::function("fn.user.manage").label("Manage users"),
        CatalogEntry::function("fn.role.manage").label("Manage role templates"),
    ]);
    catalog
}

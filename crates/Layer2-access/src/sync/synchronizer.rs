//! Menu-permission synchronizer
//!
//! 정적 카탈로그와 저장된 역할 템플릿을 맞춘다. 추가만 하고 삭제는 하지 않는다.
//!
//! ## 실패 처리
//!
//! - 역할 하나의 쓰기 실패는 로그로 남기고 나머지 역할은 계속 처리
//! - 재시도 없음 (다음 관리자 로그인에서 같은 delta가 다시 계산됨)
//! - 모든 쓰기가 성공했을 때만 baseline 기록 (실패한 역할이 다음에 다시 받도록)

use super::delta::SyncDelta;
use crate::store::TemplateStore;
use freight_foundation::{
    PermissionCatalog, PermissionKey, Role, RolePermissionTemplate, SessionContext, SyncSettings,
};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 동기화 옵션
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// 템플릿 행이 없는 역할을 카탈로그 기본값으로 생성
    pub seed_missing_roles: bool,
}

impl From<&SyncSettings> for SyncOptions {
    fn from(settings: &SyncSettings) -> Self {
        Self {
            seed_missing_roles: settings.seeds_missing_roles(),
        }
    }
}

/// 건너뛴 이유
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoSession,
    NotAdmin,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoSession => write!(f, "no authenticated session"),
            SkipReason::NotAdmin => write!(f, "session role is not admin"),
        }
    }
}

/// 역할 단위 실패
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncFailure {
    pub role: Role,
    pub error: String,
}

/// 동기화 결과 요약
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub catalog_version: u32,
    pub roles_checked: usize,
    pub roles_updated: Vec<Role>,
    pub roles_seeded: Vec<Role>,
    /// 템플릿 행이 없어 건너뛴 역할
    pub roles_missing: Vec<Role>,
    pub keys_added: usize,
    pub failures: Vec<SyncFailure>,
    pub skipped: Option<SkipReason>,
    /// 템플릿 목록 자체를 읽지 못함
    pub load_error: Option<String>,
    /// 카탈로그 baseline 기록 실패 (다음 동기화에서 회수 권한이 되살아날 수 있음)
    pub baseline_error: Option<String>,
}

impl SyncReport {
    fn skipped(reason: SkipReason) -> Self {
        Self {
            skipped: Some(reason),
            ..Default::default()
        }
    }

    pub fn is_noop(&self) -> bool {
        self.roles_updated.is_empty() && self.roles_seeded.is_empty()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty() || self.load_error.is_some() || self.baseline_error.is_some()
    }
}

/// 쓰기 전 계획 (dry run)
#[derive(Debug, Clone, Default)]
pub struct SyncPlan {
    pub deltas: Vec<SyncDelta>,
    /// 저장 전 템플릿 (`deltas`와 같은 순서)
    pub current: Vec<RolePermissionTemplate>,
    pub missing_roles: Vec<Role>,
    pub baseline: Option<BTreeSet<PermissionKey>>,
}

impl SyncPlan {
    pub fn pending(&self) -> impl Iterator<Item = &SyncDelta> {
        self.deltas.iter().filter(|d| !d.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.pending().next().is_none()
    }
}

/// 메뉴 권한 동기화기
pub struct MenuPermissionSynchronizer {
    store: Arc<dyn TemplateStore>,
    catalog: Arc<PermissionCatalog>,
    options: SyncOptions,
}

impl MenuPermissionSynchronizer {
    pub fn new(store: Arc<dyn TemplateStore>, catalog: Arc<PermissionCatalog>) -> Self {
        Self {
            store,
            catalog,
            options: SyncOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    pub fn catalog(&self) -> &PermissionCatalog {
        &self.catalog
    }

    /// 관리자 세션에서만 실행. 실패는 보고서에 담고 에러로 올리지 않는다.
    pub async fn smart_sync_menu_permissions(&self, session: Option<&SessionContext>) -> SyncReport {
        let Some(session) = session else {
            debug!("Menu permission sync skipped: no session");
            return SyncReport::skipped(SkipReason::NoSession);
        };
        if !session.role().is_admin() {
            debug!(role = %session.role(), "Menu permission sync skipped: not admin");
            return SyncReport::skipped(SkipReason::NotAdmin);
        }

        let plan = match self.plan().await {
            Ok(plan) => plan,
            Err(e) => {
                warn!(store = self.store.name(), error = %e, "Failed to load role templates for sync");
                return SyncReport {
                    catalog_version: self.catalog.version,
                    load_error: Some(e.to_string()),
                    ..Default::default()
                };
            }
        };

        let report = self.execute(plan).await;
        info!(
            catalog_version = report.catalog_version,
            roles_checked = report.roles_checked,
            roles_updated = report.roles_updated.len(),
            roles_seeded = report.roles_seeded.len(),
            keys_added = report.keys_added,
            failures = report.failures.len(),
            "Menu permission sync finished"
        );
        report
    }

    /// 저장된 템플릿을 읽고 delta 계산 (쓰기 없음)
    pub async fn plan(&self) -> freight_foundation::Result<SyncPlan> {
        let templates = self.store.list_templates().await?;
        let baseline = self.store.catalog_baseline().await?;

        let deltas = templates
            .iter()
            .map(|t| SyncDelta::compute(t, &self.catalog, baseline.as_ref()))
            .collect();
        let missing_roles = Role::ALL
            .iter()
            .copied()
            .filter(|r| !templates.iter().any(|t| t.role == *r))
            .collect();

        Ok(SyncPlan {
            deltas,
            current: templates,
            missing_roles,
            baseline,
        })
    }

    /// 계획 실행
    pub async fn execute(&self, plan: SyncPlan) -> SyncReport {
        let mut report = SyncReport {
            catalog_version: self.catalog.version,
            roles_checked: plan.current.len(),
            ..Default::default()
        };

        for (template, delta) in plan.current.iter().zip(plan.deltas.iter()) {
            if delta.is_empty() {
                continue;
            }
            debug!(
                role = %delta.role,
                menus = delta.missing_menus.len(),
                functions = delta.missing_functions.len(),
                "Adding missing catalog keys"
            );
            let updated = delta.apply(template);
            match self.store.upsert_template(&updated).await {
                Ok(()) => {
                    report.roles_updated.push(delta.role);
                    report.keys_added += delta.len();
                }
                Err(e) => {
                    warn!(role = %delta.role, error = %e, "Failed to update role template");
                    report.failures.push(SyncFailure {
                        role: delta.role,
                        error: e.to_string(),
                    });
                }
            }
        }

        for role in plan.missing_roles {
            if !self.options.seed_missing_roles {
                debug!(role = %role, "No template row for role, skipping");
                report.roles_missing.push(role);
                continue;
            }
            let seeded = self.catalog.default_template(role);
            match self.store.upsert_template(&seeded).await {
                Ok(()) => {
                    report.keys_added += seeded.menu_permissions.len() + seeded.function_permissions.len();
                    report.roles_seeded.push(role);
                }
                Err(e) => {
                    warn!(role = %role, error = %e, "Failed to seed role template");
                    report.failures.push(SyncFailure {
                        role,
                        error: e.to_string(),
                    });
                }
            }
        }

        if report.failures.is_empty() {
            let keys = self.catalog.all_keys();
            if plan.baseline.as_ref() != Some(&keys) {
                if let Err(e) = self.store.record_catalog_baseline(&keys).await {
                    warn!(error = %e, "Failed to record catalog baseline");
                    report.baseline_error = Some(e.to_string());
                }
            }
        }

        report
    }
}

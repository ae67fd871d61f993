//! # freight-foundation
//!
//! Foundation layer for FreightDesk:
//! - Permission: 역할/카탈로그/템플릿 모델, 세션 스냅샷, resolver, 캐시
//! - Config: 통합 설정 (FreightConfig)
//! - Storage: JsonStore (설정, 로컬 템플릿 파일)
//! - Error: 공통 에러 타입
//!
//! ## 아키텍처
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Session (Layer3)  login / invalidate / logout          │
//! │        │                     │                          │
//! │        ▼                     ▼                          │
//! │  PermissionCache      Delayed Sync (admin only)         │
//! │        │                     │                          │
//! │        ▼                     ▼                          │
//! │  PermissionResolver   MenuPermissionSynchronizer        │
//! │        │                     │                          │
//! │        └──── Catalog ────────┤                          │
//! │                              ▼                          │
//! │                        TemplateStore (RPC / File)       │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod permission;
pub mod storage;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, Result};

// ============================================================================
// Config (설정)
// ============================================================================
pub use config::{BackendConfig, FreightConfig, SyncSettings, FREIGHT_CONFIG_FILE};

// ============================================================================
// Permission (권한 시스템)
// ============================================================================
pub use permission::{
    // Catalog
    CatalogEntry,
    PermissionCatalog,
    CATALOG_VERSION,
    // Types
    PermissionKey,
    PermissionKind,
    Role,
    RoleRequirement,
    // Templates (원격 레코드)
    DataScope,
    ProjectOverride,
    RolePermissionTemplate,
    // Session (스냅샷)
    AuthContext,
    EffectivePermissionSet,
    SessionContext,
    // Runtime (검사)
    AccessDecision,
    AccessRequirement,
    DenyReason,
    PermissionCache,
    PermissionResolver,
};

// ============================================================================
// Storage (저장소)
// ============================================================================
pub use storage::JsonStore;

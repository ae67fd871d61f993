//! Permission system for FreightDesk
//!
//! - `types`: 역할/권한 키 기본 타입 (Role, PermissionKey, RoleRequirement)
//! - `catalog`: 코드에 정의된 메뉴/기능 카탈로그 (PermissionCatalog)
//! - `template`: 원격 저장 역할 템플릿 (RolePermissionTemplate, ProjectOverride)
//! - `session`: 세션 스냅샷과 유효 권한 (SessionContext, EffectivePermissionSet)
//! - `resolver`: 권한 검사 (PermissionResolver)
//! - `cache`: 현재 세션 스냅샷 보관 (PermissionCache)
//!
//! ## 사용 예시
//!
//! ```rust,ignore
//! use freight_foundation::permission::{catalog, AuthContext, PermissionCache, SessionContext};
//!
//! let catalog = catalog::builtin();
//! let session = SessionContext::new(auth, template, None, &catalog)?;
//!
//! let cache = PermissionCache::new();
//! cache.install(session);
//!
//! if cache.has_function_access("fn.waybill.export") {
//!     // 내보내기 버튼 표시
//! }
//! ```

mod cache;
pub mod catalog;
mod resolver;
mod session;
mod template;
mod types;

pub use cache::PermissionCache;
pub use catalog::{CatalogEntry, PermissionCatalog, CATALOG_VERSION};
pub use resolver::{AccessDecision, AccessRequirement, DenyReason, PermissionResolver};
pub use session::{AuthContext, EffectivePermissionSet, SessionContext};
pub use template::{DataScope, ProjectOverride, RolePermissionTemplate};
pub use types::{PermissionKey, PermissionKind, Role, RoleRequirement};

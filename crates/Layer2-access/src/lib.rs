//! # freight-access
//!
//! 권한 템플릿 저장소와 메뉴 권한 동기화:
//! - Store: `TemplateStore` trait + Memory / File / RPC 구현
//! - Sync: 정적 카탈로그를 역할 템플릿에 추가 전용으로 반영

pub mod store;
pub mod sync;

pub use store::{
    from_config as store_from_config, FileTemplateStore, MemoryTemplateStore, RpcTemplateStore,
    TemplateFile, TemplateStore, TEMPLATES_FILE,
};
pub use sync::{
    MenuPermissionSynchronizer, SkipReason, SyncDelta, SyncFailure, SyncOptions, SyncPlan,
    SyncReport,
};

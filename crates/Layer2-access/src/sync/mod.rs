//! Menu-permission synchronization
//!
//! - `delta`: 카탈로그 − 템플릿 계산 (SyncDelta)
//! - `synchronizer`: 역할별 추가 전용 갱신 (MenuPermissionSynchronizer)

mod delta;
mod synchronizer;

pub use delta::SyncDelta;
pub use synchronizer::{
    MenuPermissionSynchronizer, SkipReason, SyncFailure, SyncOptions, SyncPlan, SyncReport,
};

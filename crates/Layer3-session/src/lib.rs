//! # freight-session
//!
//! 세션 수명 관리
//!
//! ```text
//! login(auth) ──► TemplateStore ──► SessionContext ──► PermissionCache
//!                                         │
//!                                  (admin only)
//!                                         ▼
//!                           ScheduledSync (delay, CancellationToken)
//!                                         │
//!                                         ▼
//!                           MenuPermissionSynchronizer
//! ```
//!
//! `logout()`이나 `SessionManager` drop 시 대기 중인 동기화는 쓰기 없이 취소된다.

pub mod manager;
pub mod schedule;

pub use manager::{load_session, SessionManager};
pub use schedule::{ScheduledSync, SyncConfig};

//! Delayed one-shot menu sync
//!
//! 관리자 로그인 직후 `delay`만큼 기다렸다가 동기화를 한 번 실행한다.
//! 대기 중 토큰이 취소되면 아무것도 쓰지 않고 끝난다. 대기가 끝나 실행이
//! 시작된 동기화는 끝까지 진행된다.

use freight_access::{MenuPermissionSynchronizer, SyncOptions, SyncReport};
use freight_foundation::{PermissionCache, SessionContext, SyncSettings};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// 예약 동기화 설정
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub enabled: bool,
    pub delay: Duration,
    pub options: SyncOptions,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::from(&SyncSettings::default())
    }
}

impl From<&SyncSettings> for SyncConfig {
    fn from(settings: &SyncSettings) -> Self {
        Self {
            enabled: settings.is_enabled(),
            delay: settings.delay(),
            options: SyncOptions::from(settings),
        }
    }
}

impl SyncConfig {
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

/// 예약된 동기화 핸들
///
/// drop 되면 토큰이 취소된다.
#[derive(Debug)]
pub struct ScheduledSync {
    token: CancellationToken,
    handle: Option<JoinHandle<Option<SyncReport>>>,
}

impl ScheduledSync {
    /// 동기화 예약
    ///
    /// `after_sync`는 실제로 실행된 동기화의 보고서를 받는다 (세션 재적재용).
    pub fn spawn<F, Fut>(
        synchronizer: MenuPermissionSynchronizer,
        session: Arc<SessionContext>,
        delay: Duration,
        token: CancellationToken,
        after_sync: F,
    ) -> Self
    where
        F: FnOnce(SyncReport) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let cancel = token.clone();
        let handle = tokio::spawn(async move {
            debug!(delay_ms = delay.as_millis() as u64, "Menu sync scheduled");

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("Scheduled menu sync cancelled before firing");
                    None
                }
                _ = tokio::time::sleep(delay) => {
                    let report = synchronizer
                        .smart_sync_menu_permissions(Some(session.as_ref()))
                        .await;
                    info!(
                        updated = report.roles_updated.len(),
                        keys = report.keys_added,
                        "Scheduled menu sync finished"
                    );
                    after_sync(report.clone()).await;
                    Some(report)
                }
            }
        });

        Self {
            token,
            handle: Some(handle),
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map(|h| h.is_finished()).unwrap_or(true)
    }

    /// 완료 대기. 취소되었으면 `None`.
    pub async fn join(mut self) -> Option<SyncReport> {
        let handle = self.handle.take()?;
        match handle.await {
            Ok(report) => report,
            Err(e) => {
                warn!("Scheduled menu sync task failed: {}", e);
                None
            }
        }
    }
}

impl Drop for ScheduledSync {
    fn drop(&mut self) {
        // join()으로 소비된 경우는 이미 끝난 작업
        if self.handle.is_some() {
            self.token.cancel();
        }
    }
}

/// 동기화 후 관리자 세션 재적재
///
/// 로그인 이후 세대가 바뀌었다면(로그아웃/재로그인) 버린다.
pub(crate) async fn refresh_after_sync(
    cache: Arc<PermissionCache>,
    generation: u64,
    reload: impl Future<Output = freight_foundation::Result<SessionContext>>,
) {
    match reload.await {
        Ok(session) => {
            cache.install_if_current(generation, session);
        }
        Err(e) => warn!("Failed to reload session after menu sync: {}", e),
    }
}

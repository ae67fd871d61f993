//! Session manager
//!
//! 로그인 → 템플릿 적재 → 캐시 설치 → (관리자면) 지연 동기화 예약.
//! 적재 실패 시 캐시를 비워 모든 검사가 거부되도록 한다.

use crate::schedule::{refresh_after_sync, ScheduledSync, SyncConfig};
use freight_access::{store_from_config, MenuPermissionSynchronizer, TemplateStore};
use freight_foundation::{
    AuthContext, Error, FreightConfig, PermissionCache, PermissionCatalog, Result, Role,
    SessionContext,
};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// 세션 템플릿 적재
///
/// 프로젝트 한정 세션이면 해당 프로젝트 오버라이드도 함께 읽는다.
pub async fn load_session(
    store: &dyn TemplateStore,
    catalog: &PermissionCatalog,
    auth: AuthContext,
) -> Result<SessionContext> {
    let template = store
        .get_template(auth.role)
        .await?
        .ok_or_else(|| Error::TemplateNotFound(auth.role.to_string()))?;

    let project_override = match auth.project_id.as_deref() {
        Some(project_id) => store.get_project_override(project_id).await?,
        None => None,
    };

    SessionContext::new(auth, template, project_override.as_ref(), catalog)
}

/// 세션 수명 관리자
pub struct SessionManager {
    store: Arc<dyn TemplateStore>,
    catalog: Arc<PermissionCatalog>,
    cache: Arc<PermissionCache>,
    sync: SyncConfig,
    shutdown: CancellationToken,
    scheduled: Mutex<Option<ScheduledSync>>,
}

impl SessionManager {
    pub fn new(store: Arc<dyn TemplateStore>, catalog: Arc<PermissionCatalog>) -> Self {
        Self {
            store,
            catalog,
            cache: Arc::new(PermissionCache::new()),
            sync: SyncConfig::default(),
            shutdown: CancellationToken::new(),
            scheduled: Mutex::new(None),
        }
    }

    /// 설정 파일 기반 생성 (내장 카탈로그 사용)
    pub fn from_config(config: &FreightConfig) -> Result<Self> {
        let store = store_from_config(config)?;
        Ok(Self::new(store, Arc::new(PermissionCatalog::builtin()))
            .with_sync_config(SyncConfig::from(&config.sync)))
    }

    pub fn with_sync_config(mut self, sync: SyncConfig) -> Self {
        self.sync = sync;
        self
    }

    /// 외부와 공유하는 캐시 사용
    pub fn with_cache(mut self, cache: Arc<PermissionCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn cache(&self) -> &Arc<PermissionCache> {
        &self.cache
    }

    pub fn catalog(&self) -> &Arc<PermissionCatalog> {
        &self.catalog
    }

    pub fn store(&self) -> &Arc<dyn TemplateStore> {
        &self.store
    }

    pub fn current(&self) -> Option<Arc<SessionContext>> {
        self.cache.snapshot()
    }

    pub fn synchronizer(&self) -> MenuPermissionSynchronizer {
        MenuPermissionSynchronizer::new(self.store.clone(), self.catalog.clone())
            .with_options(self.sync.options.clone())
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// 로그인
    ///
    /// 이전 세션에 걸려 있던 예약 동기화는 취소한다.
    pub async fn login(&self, auth: AuthContext) -> Result<Arc<SessionContext>> {
        self.cancel_scheduled();

        let role = auth.role;
        let session = match load_session(self.store.as_ref(), &self.catalog, auth).await {
            Ok(session) => session,
            Err(e) => {
                warn!(role = %role, "Failed to load permissions, denying all: {}", e);
                self.cache.clear();
                return Err(e);
            }
        };

        let generation = self.cache.install(session);
        let session = self
            .cache
            .snapshot()
            .ok_or_else(|| Error::Internal("session vanished after install".to_string()))?;
        info!(
            role = %role,
            menus = session.effective().menus().len(),
            functions = session.effective().functions().len(),
            "Session loaded"
        );

        if role == Role::Admin {
            self.schedule_sync(session.clone(), generation);
        }

        Ok(session)
    }

    /// 역할 변경 (같은 사용자, 새 템플릿)
    pub async fn change_role(&self, role: Role) -> Result<Arc<SessionContext>> {
        let current = self
            .current()
            .ok_or_else(|| Error::NotFound("no active session".to_string()))?;
        let mut auth = current.auth().clone();
        auth.role = role;
        self.login(auth).await
    }

    /// 현재 세션 권한 재계산 (명시적 무효화)
    ///
    /// 세션이 없으면 `Ok(None)`. 재적재 도중 세션이 바뀌었으면 결과를 버린다.
    pub async fn invalidate(&self) -> Result<Option<Arc<SessionContext>>> {
        let Some(current) = self.current() else {
            return Ok(None);
        };
        let generation = self.cache.generation();

        match load_session(self.store.as_ref(), &self.catalog, current.auth().clone()).await {
            Ok(session) => {
                if self.cache.install_if_current(generation, session).is_none() {
                    debug!("Session changed during invalidation, keeping newer snapshot");
                }
                Ok(self.current())
            }
            Err(e) => {
                if self.cache.clear_if_current(generation) {
                    warn!("Failed to reload permissions, denying all: {}", e);
                } else {
                    debug!("Reload failed after session changed, keeping newer snapshot: {}", e);
                }
                Err(e)
            }
        }
    }

    /// 로그아웃: 예약 동기화 취소 후 캐시 비움
    pub fn logout(&self) {
        self.cancel_scheduled();
        self.cache.clear();
        debug!("Session closed");
    }

    /// 모든 예약 작업 취소 (앱 종료)
    pub fn shutdown(&self) {
        self.shutdown.cancel();
        self.logout();
    }

    // ========================================================================
    // Scheduled sync
    // ========================================================================

    pub fn has_pending_sync(&self) -> bool {
        self.lock_scheduled()
            .as_ref()
            .map(|s| !s.is_finished() && !s.is_cancelled())
            .unwrap_or(false)
    }

    /// 예약 동기화 완료 대기. 예약이 없거나 취소되었으면 `None`.
    pub async fn wait_for_sync(&self) -> Option<freight_access::SyncReport> {
        let scheduled = self.lock_scheduled().take()?;
        scheduled.join().await
    }

    fn schedule_sync(&self, session: Arc<SessionContext>, generation: u64) {
        if !self.sync.enabled {
            debug!("Menu sync disabled by configuration");
            return;
        }
        if self.shutdown.is_cancelled() {
            return;
        }

        let store = self.store.clone();
        let catalog = self.catalog.clone();
        let cache = self.cache.clone();
        let auth = session.auth().clone();

        let scheduled = ScheduledSync::spawn(
            self.synchronizer(),
            session,
            self.sync.delay,
            self.shutdown.child_token(),
            move |report| async move {
                if !report.roles_updated.contains(&auth.role) {
                    return;
                }
                let reload = async { load_session(store.as_ref(), &catalog, auth).await };
                refresh_after_sync(cache, generation, reload).await;
            },
        );

        *self.lock_scheduled() = Some(scheduled);
    }

    fn cancel_scheduled(&self) {
        if let Some(scheduled) = self.lock_scheduled().take() {
            scheduled.cancel();
        }
    }

    fn lock_scheduled(&self) -> std::sync::MutexGuard<'_, Option<ScheduledSync>> {
        match self.scheduled.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

//! Permission cache
//!
//! 현재 세션 스냅샷을 보관한다. 변경은 항상 통째 교체(install/clear)이므로
//! 읽는 쪽은 반쯤 갱신된 상태를 볼 수 없다.

use super::catalog::PermissionCatalog;
use super::resolver::PermissionResolver;
use super::session::SessionContext;
use super::types::PermissionKey;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tracing::debug;

/// 세션 권한 캐시
#[derive(Debug, Default)]
pub struct PermissionCache {
    current: RwLock<Option<Arc<SessionContext>>>,
    generation: AtomicU64,
}

impl PermissionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 새 스냅샷 설치, 새 세대 번호 반환
    pub fn install(&self, session: SessionContext) -> u64 {
        let session = Arc::new(session);
        let mut current = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *current = Some(session);
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(generation, "Installed permission snapshot");
        generation
    }

    /// `expected` 세대가 그대로일 때만 교체
    ///
    /// 비동기 재적재 도중 로그아웃/재로그인이 일어났다면 `None`.
    pub fn install_if_current(&self, expected: u64, session: SessionContext) -> Option<u64> {
        let mut current = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if self.generation.load(Ordering::SeqCst) != expected || current.is_none() {
            debug!(expected, "Stale snapshot refresh discarded");
            return None;
        }
        *current = Some(Arc::new(session));
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(generation, "Refreshed permission snapshot");
        Some(generation)
    }

    /// 세션 제거 (로그아웃)
    pub fn clear(&self) {
        let mut current = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if current.take().is_some() {
            self.generation.fetch_add(1, Ordering::SeqCst);
            debug!("Cleared permission snapshot");
        }
    }

    /// `expected` 세대가 그대로일 때만 제거
    ///
    /// 실패한 재적재가 그 사이 설치된 새 세션을 지우지 않도록 한다.
    pub fn clear_if_current(&self, expected: u64) -> bool {
        let mut current = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if self.generation.load(Ordering::SeqCst) != expected {
            debug!(expected, "Stale snapshot clear discarded");
            return false;
        }
        if current.take().is_some() {
            self.generation.fetch_add(1, Ordering::SeqCst);
            debug!("Cleared permission snapshot");
        }
        true
    }

    pub fn snapshot(&self) -> Option<Arc<SessionContext>> {
        self.current.read().ok().and_then(|c| c.clone())
    }

    pub fn is_loaded(&self) -> bool {
        self.current.read().map(|c| c.is_some()).unwrap_or(false)
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// 현재 스냅샷으로 검사
    ///
    /// 스냅샷은 호출 동안 고정된다.
    pub fn with_resolver<R>(&self, f: impl FnOnce(PermissionResolver<'_>) -> R) -> R {
        let snapshot = self.snapshot();
        f(PermissionResolver::new(snapshot.as_deref()))
    }

    pub fn has_menu_access(&self, key: &str) -> bool {
        self.with_resolver(|r| r.has_menu_access(key))
    }

    pub fn has_function_access(&self, key: &str) -> bool {
        self.with_resolver(|r| r.has_function_access(key))
    }

    /// 카탈로그 전체 키 -> 허용 여부 (UI 소비용)
    pub fn flags(&self, catalog: &PermissionCatalog) -> BTreeMap<PermissionKey, bool> {
        self.with_resolver(|r| {
            catalog
                .entries()
                .iter()
                .map(|e| {
                    let granted = match e.kind {
                        super::types::PermissionKind::Menu => r.has_menu_access(e.key.as_str()),
                        super::types::PermissionKind::Function => {
                            r.has_function_access(e.key.as_str())
                        }
                    };
                    (e.key.clone(), granted)
                })
                .collect()
        })
    }
}

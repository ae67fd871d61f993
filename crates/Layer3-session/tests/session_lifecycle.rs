//! Session lifecycle integration tests

use async_trait::async_trait;
use freight_access::{MemoryTemplateStore, TemplateStore};
use freight_foundation::{
    AccessRequirement, AuthContext, Error, PermissionCatalog, PermissionKey, Result, Role,
    RolePermissionTemplate,
};
use freight_session::{SessionManager, SyncConfig};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

fn catalog() -> Arc<PermissionCatalog> {
    Arc::new(PermissionCatalog::from_keys(
        2,
        [
            "menu.dashboard",
            "menu.waybills",
            "menu.finance.reconciliation",
            "fn.waybill.create",
            "fn.waybill.export",
        ],
    ))
}

fn store() -> Arc<MemoryTemplateStore> {
    Arc::new(MemoryTemplateStore::with_templates([
        RolePermissionTemplate::new(Role::Admin).with_menus(["menu.dashboard"]),
        RolePermissionTemplate::new(Role::Viewer).with_menus(["menu.dashboard"]),
        RolePermissionTemplate::new(Role::Operator)
            .with_menus(["menu.dashboard", "menu.waybills"])
            .with_functions(["fn.waybill.create"]),
    ]))
}

fn manager(store: Arc<MemoryTemplateStore>) -> SessionManager {
    SessionManager::new(store, catalog())
        .with_sync_config(SyncConfig::default().with_delay(Duration::from_secs(3)))
}

fn login_as(role: Role) -> AuthContext {
    AuthContext::new(Uuid::new_v4(), role)
}

#[tokio::test(start_paused = true)]
async fn admin_login_syncs_after_delay() {
    let store = store();
    let manager = manager(store.clone());

    let session = manager.login(login_as(Role::Admin)).await.unwrap();
    assert!(!session.effective().has_menu("menu.waybills"));
    assert!(manager.has_pending_sync());
    assert_eq!(store.write_count(), 0);

    let report = manager.wait_for_sync().await.unwrap();
    assert!(report.roles_updated.contains(&Role::Admin));
    assert!(store.write_count() > 0);

    // 동기화 후 관리자 세션 재적재
    assert!(manager.cache().has_menu_access("menu.waybills"));
    assert!(manager.cache().has_function_access("fn.waybill.export"));

    let viewer = store.get_template(Role::Viewer).await.unwrap().unwrap();
    assert!(viewer.grants_menu("menu.finance.reconciliation"));
}

#[tokio::test(start_paused = true)]
async fn logout_before_delay_never_writes() {
    let store = store();
    let manager = manager(store.clone());

    manager.login(login_as(Role::Admin)).await.unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;
    manager.logout();

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(store.write_count(), 0);
    assert!(!manager.cache().is_loaded());
    assert!(manager.wait_for_sync().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn dropping_manager_cancels_sync() {
    let store = store();
    let manager = manager(store.clone());

    manager.login(login_as(Role::Admin)).await.unwrap();
    drop(manager);

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(store.write_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn non_admin_never_schedules() {
    let store = store();
    let manager = manager(store.clone());

    manager.login(login_as(Role::Operator)).await.unwrap();
    assert!(!manager.has_pending_sync());

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(store.write_count(), 0);
    assert!(manager.wait_for_sync().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn disabled_sync_is_not_scheduled() {
    let store = store();
    let manager = SessionManager::new(store.clone(), catalog()).with_sync_config(SyncConfig::disabled());

    manager.login(login_as(Role::Admin)).await.unwrap();
    assert!(!manager.has_pending_sync());
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(store.write_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn second_admin_login_issues_no_writes() {
    let store = store();
    let manager = manager(store.clone());

    manager.login(login_as(Role::Admin)).await.unwrap();
    manager.wait_for_sync().await.unwrap();
    let writes = store.write_count();

    manager.logout();
    manager.login(login_as(Role::Admin)).await.unwrap();
    let report = manager.wait_for_sync().await.unwrap();

    assert!(report.is_noop());
    assert_eq!(store.write_count(), writes);
}

#[tokio::test(start_paused = true)]
async fn revoked_key_stays_revoked_after_next_login() {
    let store = store();
    let manager = manager(store.clone());

    manager.login(login_as(Role::Admin)).await.unwrap();
    manager.wait_for_sync().await.unwrap();

    // 관리자가 뷰어에게서 메뉴 회수
    let mut viewer = store.get_template(Role::Viewer).await.unwrap().unwrap();
    viewer
        .menu_permissions
        .remove(&PermissionKey::new("menu.finance.reconciliation"));
    store.upsert_template(&viewer).await.unwrap();

    manager.login(login_as(Role::Admin)).await.unwrap();
    manager.wait_for_sync().await.unwrap();

    let viewer = store.get_template(Role::Viewer).await.unwrap().unwrap();
    assert!(!viewer.grants_menu("menu.finance.reconciliation"));
}

#[tokio::test(start_paused = true)]
async fn relogin_as_viewer_cancels_admin_sync() {
    let store = store();
    let manager = manager(store.clone());

    manager.login(login_as(Role::Admin)).await.unwrap();
    manager.login(login_as(Role::Viewer)).await.unwrap();

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn viewer_scenario() {
    let manager = manager(store());
    manager.login(login_as(Role::Viewer)).await.unwrap();

    let session = manager.current().unwrap();
    manager.cache().with_resolver(|r| {
        assert!(r.has_menu_access("menu.dashboard"));
        assert!(!r.has_menu_access("menu.waybills"));
        assert!(!r.has_function_access("fn.waybill.create"));
        assert!(r.has_role([Role::Viewer, Role::Admin]));
        assert!(!r.has_role(Role::Finance));
        assert!(!r.allows(&AccessRequirement::new().function("fn.waybill.create")));
    });
    assert_eq!(session.role(), Role::Viewer);

    manager.logout();
    assert!(!manager.cache().has_menu_access("menu.dashboard"));
}

/// 장애 스위치가 켜지면 재무 템플릿 조회가 5초 걸린 뒤 503으로 실패하는 저장소
struct OutageStore {
    inner: MemoryTemplateStore,
    failing: AtomicBool,
}

#[async_trait]
impl TemplateStore for OutageStore {
    fn name(&self) -> &str {
        "outage"
    }

    async fn get_template(&self, role: Role) -> Result<Option<RolePermissionTemplate>> {
        if role == Role::Finance && self.failing.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_secs(5)).await;
            return Err(Error::rpc("get_role_template", 503, "service unavailable"));
        }
        self.inner.get_template(role).await
    }

    async fn upsert_template(&self, template: &RolePermissionTemplate) -> Result<()> {
        self.inner.upsert_template(template).await
    }

    async fn list_templates(&self) -> Result<Vec<RolePermissionTemplate>> {
        self.inner.list_templates().await
    }
}

#[tokio::test(start_paused = true)]
async fn failed_reload_keeps_session_installed_meanwhile() {
    let store = Arc::new(OutageStore {
        inner: MemoryTemplateStore::with_templates([
            RolePermissionTemplate::new(Role::Finance).with_menus(["menu.finance.reconciliation"]),
            RolePermissionTemplate::new(Role::Viewer).with_menus(["menu.dashboard"]),
        ]),
        failing: AtomicBool::new(false),
    });
    let manager = SessionManager::new(store.clone(), catalog());

    manager.login(login_as(Role::Finance)).await.unwrap();
    store.failing.store(true, Ordering::SeqCst);

    let (reload, viewer) = tokio::join!(manager.invalidate(), async {
        tokio::time::sleep(Duration::from_secs(1)).await;
        manager.login(login_as(Role::Viewer)).await
    });

    assert!(reload.is_err());
    assert_eq!(viewer.unwrap().role(), Role::Viewer);
    assert_eq!(manager.current().unwrap().role(), Role::Viewer);
    assert!(manager.cache().has_menu_access("menu.dashboard"));
}

#[tokio::test(start_paused = true)]
async fn failed_reload_denies_all_when_session_unchanged() {
    let store = Arc::new(OutageStore {
        inner: MemoryTemplateStore::with_templates([
            RolePermissionTemplate::new(Role::Finance).with_menus(["menu.finance.reconciliation"]),
        ]),
        failing: AtomicBool::new(false),
    });
    let manager = SessionManager::new(store.clone(), catalog());

    manager.login(login_as(Role::Finance)).await.unwrap();
    store.failing.store(true, Ordering::SeqCst);

    assert!(manager.invalidate().await.is_err());
    assert!(!manager.cache().is_loaded());
    assert!(!manager.cache().has_menu_access("menu.finance.reconciliation"));
}

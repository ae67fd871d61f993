//! Subcommand implementations
//!
//! 출력은 `Write`로 받아 테스트에서 버퍼로 검사한다.

use freight_access::{MenuPermissionSynchronizer, SyncOptions, SyncPlan, SyncReport, TemplateStore};
use freight_foundation::{
    AccessDecision, AccessRequirement, AuthContext, PermissionCache, PermissionCatalog,
    PermissionKind, PermissionResolver, Role, SessionContext,
};
use freight_session::load_session;
use std::io::Write;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

// ============================================================================
// catalog
// ============================================================================

pub fn catalog(
    catalog: &PermissionCatalog,
    kind: Option<PermissionKind>,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    writeln!(out, "Permission catalog v{} ({} keys)", catalog.version, catalog.len())?;
    for entry in catalog.entries() {
        if kind.is_some_and(|k| k != entry.kind) {
            continue;
        }
        let kind = match entry.kind {
            PermissionKind::Menu => "menu",
            PermissionKind::Function => "fn",
        };
        let roles: Vec<&str> = entry.default_roles.iter().map(|r| r.as_str()).collect();
        writeln!(
            out,
            "  {:<4} {:<40} {:<24} [{}]",
            kind,
            entry.key.as_str(),
            entry.label,
            roles.join(", ")
        )?;
    }
    Ok(())
}

// ============================================================================
// check
// ============================================================================

async fn role_session(
    store: &dyn TemplateStore,
    catalog: &PermissionCatalog,
    role: Role,
    project: Option<String>,
) -> anyhow::Result<SessionContext> {
    let mut auth = AuthContext::new(Uuid::nil(), role);
    if let Some(project_id) = project {
        auth = auth.with_project(project_id);
    }
    Ok(load_session(store, catalog, auth).await?)
}

pub async fn check(
    store: &dyn TemplateStore,
    catalog: &PermissionCatalog,
    role: Role,
    key: &str,
    project: Option<String>,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let Some(entry) = catalog.get(key) else {
        writeln!(out, "{} {}: denied (not in catalog v{})", role, key, catalog.version)?;
        return Ok(());
    };

    let session = role_session(store, catalog, role, project).await?;

    let requirement = match entry.kind {
        PermissionKind::Menu => AccessRequirement::new().menu(key),
        PermissionKind::Function => AccessRequirement::new().function(key),
    };
    let decision = PermissionResolver::new(Some(&session)).check(&requirement);

    let scope = session
        .project_id()
        .map(|p| format!(" (project {})", p))
        .unwrap_or_default();
    match decision {
        AccessDecision::Granted => writeln!(out, "{} {}{}: granted", role, key, scope)?,
        AccessDecision::Denied(reason) => {
            writeln!(out, "{} {}{}: denied ({:?})", role, key, scope, reason)?
        }
    }
    Ok(())
}

/// 카탈로그 전체 키를 화면이 받는 그대로(캐시 플래그) 출력
pub async fn check_all(
    store: &dyn TemplateStore,
    catalog: &PermissionCatalog,
    role: Role,
    project: Option<String>,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let session = role_session(store, catalog, role, project).await?;
    let scope = session
        .project_id()
        .map(|p| format!(" in project {}", p))
        .unwrap_or_default();

    let cache = PermissionCache::new();
    cache.install(session);
    let flags = cache.flags(catalog);
    let granted = flags.values().filter(|g| **g).count();

    writeln!(out, "{}{}: {}/{} key(s) granted", role, scope, granted, flags.len())?;
    for (key, granted) in &flags {
        let mark = if *granted { "granted" } else { "denied" };
        writeln!(out, "  {:<40} {}", key.as_str(), mark)?;
    }
    Ok(())
}

// ============================================================================
// sync
// ============================================================================

pub async fn sync(
    store: Arc<dyn TemplateStore>,
    catalog: PermissionCatalog,
    options: SyncOptions,
    dry_run: bool,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let catalog = Arc::new(catalog);
    let synchronizer =
        MenuPermissionSynchronizer::new(store.clone(), catalog.clone()).with_options(options);

    if dry_run {
        let plan = synchronizer.plan().await?;
        print_plan(&plan, catalog.version, out)?;
        return Ok(());
    }

    let session = admin_session(store.as_ref(), &catalog).await?;
    let report = synchronizer.smart_sync_menu_permissions(Some(&session)).await;
    print_report(&report, out)?;

    if let Some(e) = &report.load_error {
        anyhow::bail!("failed to load role templates: {}", e);
    }
    if !report.failures.is_empty() {
        anyhow::bail!("{} role(s) failed to update", report.failures.len());
    }
    if let Some(e) = &report.baseline_error {
        anyhow::bail!("failed to record catalog baseline: {}", e);
    }
    Ok(())
}

/// CLI 운영자는 관리자로 동기화한다
async fn admin_session(
    store: &dyn TemplateStore,
    catalog: &PermissionCatalog,
) -> anyhow::Result<SessionContext> {
    let auth = AuthContext::new(Uuid::nil(), Role::Admin);
    let template = match store.get_template(Role::Admin).await? {
        Some(template) => template,
        None => {
            warn!("No admin template stored, using catalog defaults for the sync session");
            catalog.default_template(Role::Admin)
        }
    };
    Ok(SessionContext::new(auth, template, None, catalog)?)
}

fn print_plan(plan: &SyncPlan, version: u32, out: &mut impl Write) -> anyhow::Result<()> {
    writeln!(out, "Dry run against catalog v{}", version)?;
    if plan.is_empty() {
        writeln!(out, "  All role templates are up to date")?;
    }
    for delta in plan.pending() {
        writeln!(out, "  {} (+{})", delta.role, delta.len())?;
        for key in delta.missing_menus.iter().chain(delta.missing_functions.iter()) {
            writeln!(out, "    + {}", key)?;
        }
    }
    for role in &plan.missing_roles {
        writeln!(out, "  {} (no template row)", role)?;
    }
    Ok(())
}

fn print_report(report: &SyncReport, out: &mut impl Write) -> anyhow::Result<()> {
    writeln!(
        out,
        "Synced catalog v{}: {} role(s) checked, {} updated, {} key(s) added",
        report.catalog_version,
        report.roles_checked,
        report.roles_updated.len(),
        report.keys_added
    )?;
    for role in &report.roles_seeded {
        writeln!(out, "  seeded {}", role)?;
    }
    for role in &report.roles_missing {
        writeln!(out, "  skipped {} (no template row)", role)?;
    }
    for failure in &report.failures {
        writeln!(out, "  failed {}: {}", failure.role, failure.error)?;
    }
    if let Some(e) = &report.baseline_error {
        writeln!(out, "  baseline not recorded: {}", e)?;
    }
    Ok(())
}

// ============================================================================
// roles
// ============================================================================

pub async fn roles(store: &dyn TemplateStore, out: &mut impl Write) -> anyhow::Result<()> {
    let templates = store.list_templates().await?;
    writeln!(out, "{} role template(s) in {}", templates.len(), store.name())?;
    for t in templates {
        let updated = t
            .updated_at
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        writeln!(
            out,
            "  {:<10} menus {:>3}  functions {:>3}  projects {:>3}  data {:>2}  updated {}",
            t.role.as_str(),
            t.menu_permissions.len(),
            t.function_permissions.len(),
            t.project_permissions.len(),
            t.data_permissions.len(),
            updated
        )?;
    }
    Ok(())
}

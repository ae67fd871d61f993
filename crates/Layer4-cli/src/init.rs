//! FreightDesk init command
//!
//! 현재 디렉토리에 .freightdesk/ 를 만들고 로컬 템플릿 파일을 카탈로그 기본값으로 채운다.
//! 백엔드 없이 권한 구성을 시험할 때 쓴다.

use freight_access::{FileTemplateStore, TemplateStore, TEMPLATES_FILE};
use freight_foundation::{FreightConfig, JsonStore, PermissionCatalog, Role, FREIGHT_CONFIG_FILE};
use std::io::Write;
use std::path::Path;

/// Initialize FreightDesk configuration in the current directory
pub async fn init_project(
    catalog: &PermissionCatalog,
    force: bool,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    init_at(&cwd, catalog, force, out).await
}

pub async fn init_at(
    root: &Path,
    catalog: &PermissionCatalog,
    force: bool,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let store = JsonStore::project(root);

    // Check if already initialized
    if store.exists(FREIGHT_CONFIG_FILE) && !force {
        writeln!(out, "✓ FreightDesk already initialized in this directory.")?;
        writeln!(out, "  Use --force to reinitialize.")?;
        return Ok(());
    }

    writeln!(out, "Initializing FreightDesk...")?;

    let templates_path = store.file_path(TEMPLATES_FILE);
    let config = FreightConfig::new().templates_file(&templates_path);
    store.save(FREIGHT_CONFIG_FILE, &config)?;
    writeln!(out, "  Created .freightdesk/{}", FREIGHT_CONFIG_FILE)?;

    let templates = FileTemplateStore::new(store.clone(), TEMPLATES_FILE);
    for role in Role::ALL {
        templates
            .upsert_template(&catalog.default_template(role))
            .await?;
    }
    templates
        .record_catalog_baseline(&catalog.all_keys())
        .await?;
    writeln!(
        out,
        "  Created .freightdesk/{} ({} roles, catalog v{})",
        TEMPLATES_FILE,
        Role::ALL.len(),
        catalog.version
    )?;

    writeln!(out, "\n✓ FreightDesk initialized!")?;
    Ok(())
}

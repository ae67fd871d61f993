//! Template storage
//!
//! 역할 권한 템플릿은 외부 데이터 플랫폼에 저장된다. 이 모듈은 그 경계를
//! trait로 정의하고 구현 세 가지를 제공한다.
//!
//! - `memory`: 프로세스 내 저장 (테스트, 데모)
//! - `file`: JSON 파일 (`JsonStore` 기반, 오프라인 관리용)
//! - `rpc`: BaaS REST/RPC 엔드포인트 (`reqwest`)

mod file;
mod memory;
mod rpc;

pub use file::{FileTemplateStore, TemplateFile, TEMPLATES_FILE};
pub use memory::MemoryTemplateStore;
pub use rpc::RpcTemplateStore;

use async_trait::async_trait;
use freight_foundation::{
    FreightConfig, PermissionKey, ProjectOverride, Result, Role, RolePermissionTemplate,
};
use std::collections::BTreeSet;
use std::sync::Arc;

/// 역할 템플릿 저장소
///
/// 읽기는 역직렬화 단계에서 검증된다 (모르는 역할/잘못된 키는 에러).
#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// 저장소 이름 (로그용)
    fn name(&self) -> &str;

    /// 역할 템플릿 조회 (행이 없으면 `None`)
    async fn get_template(&self, role: Role) -> Result<Option<RolePermissionTemplate>>;

    /// 역할 템플릿 저장 (네 가지 집합 전체를 교체)
    async fn upsert_template(&self, template: &RolePermissionTemplate) -> Result<()>;

    /// 저장된 모든 템플릿
    async fn list_templates(&self) -> Result<Vec<RolePermissionTemplate>>;

    /// 프로젝트 단위 제한
    async fn get_project_override(&self, _project_id: &str) -> Result<Option<ProjectOverride>> {
        Ok(None)
    }

    /// 동기화기가 이미 배포한 카탈로그 키 목록
    ///
    /// 이 목록에 있는데 템플릿에 없는 키는 관리자가 회수한 것으로 본다.
    async fn catalog_baseline(&self) -> Result<Option<BTreeSet<PermissionKey>>> {
        Ok(None)
    }

    async fn record_catalog_baseline(&self, _keys: &BTreeSet<PermissionKey>) -> Result<()> {
        Ok(())
    }
}

/// 설정에 맞는 저장소 생성
///
/// `templatesFile`이 있으면 파일 저장소, 아니면 원격 백엔드.
pub fn from_config(config: &FreightConfig) -> Result<Arc<dyn TemplateStore>> {
    if let Some(path) = &config.templates_file {
        return Ok(Arc::new(FileTemplateStore::open(path)));
    }
    Ok(Arc::new(RpcTemplateStore::from_config(&config.backend)?))
}

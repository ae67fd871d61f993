//! Freight Config - 통합 설정
//!
//! 백엔드 연결 정보, 권한 동기화 옵션, 로컬 템플릿 파일 경로

use crate::storage::JsonStore;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// 설정 파일명
pub const FREIGHT_CONFIG_FILE: &str = "config.json";

// ============================================================================
// Freight Config (통합)
// ============================================================================

/// FreightDesk 통합 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreightConfig {
    /// 버전 (마이그레이션용)
    #[serde(default = "default_version")]
    pub version: u32,

    /// 백엔드(BaaS) 연결
    #[serde(default)]
    pub backend: BackendConfig,

    /// 메뉴 권한 동기화
    #[serde(default)]
    pub sync: SyncSettings,

    /// 로컬 권한 템플릿 파일 (설정 시 원격 백엔드 대신 사용)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub templates_file: Option<PathBuf>,
}

impl FreightConfig {
    pub fn new() -> Self {
        Self {
            version: default_version(),
            ..Default::default()
        }
    }

    // ========================================================================
    // Load / Save
    // ========================================================================

    /// 글로벌 + 프로젝트 병합 로드
    pub fn load() -> Result<Self> {
        let mut config = Self::new();

        // 1. 글로벌 설정
        if let Ok(global) = JsonStore::global() {
            if let Some(global_config) = global.load_optional::<FreightConfig>(FREIGHT_CONFIG_FILE)? {
                config.merge(global_config);
            }
        }

        // 2. 프로젝트 설정
        if let Ok(project) = JsonStore::current_project() {
            if let Some(project_config) =
                project.load_optional::<FreightConfig>(FREIGHT_CONFIG_FILE)?
            {
                config.merge(project_config);
            }
        }

        config.apply_env();
        Ok(config)
    }

    /// 특정 저장소에서만 로드
    pub fn load_from(store: &JsonStore) -> Result<Self> {
        let mut config = Self::new();
        if let Some(loaded) = store.load_optional::<FreightConfig>(FREIGHT_CONFIG_FILE)? {
            config.merge(loaded);
        }
        Ok(config)
    }

    /// 환경 변수 우선 적용 (FREIGHT_BACKEND_URL, FREIGHT_ANON_KEY, FREIGHT_ACCESS_TOKEN)
    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("FREIGHT_BACKEND_URL") {
            self.backend.base_url = Some(url);
        }
        if let Ok(key) = std::env::var("FREIGHT_ANON_KEY") {
            self.backend.anon_key = Some(key);
        }
        if let Ok(token) = std::env::var("FREIGHT_ACCESS_TOKEN") {
            self.backend.access_token = Some(token);
        }
    }

    // ========================================================================
    // Merge
    // ========================================================================

    /// 다른 설정과 병합 (other가 우선)
    pub fn merge(&mut self, other: FreightConfig) {
        if other.version > self.version {
            self.version = other.version;
        }
        self.backend.merge(other.backend);
        self.sync.merge(other.sync);
        if other.templates_file.is_some() {
            self.templates_file = other.templates_file;
        }
    }

    // ========================================================================
    // Builder
    // ========================================================================

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.backend.base_url = Some(url.into());
        self
    }

    pub fn templates_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.templates_file = Some(path.into());
        self
    }
}

// ============================================================================
// Backend Config
// ============================================================================

/// 백엔드 연결 설정
///
/// 모든 필드는 "설정된 쪽이 이긴다" 병합을 위해 Option. 기본값은 접근자에서 채운다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendConfig {
    /// REST 엔드포인트 루트 (예: https://xyz.example.co)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// 공개(anon) API 키
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anon_key: Option<String>,

    /// 로그인 사용자 JWT (RLS 적용 요청용)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    /// 요청 타임아웃 (초, 기본 15)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    fn merge(&mut self, other: BackendConfig) {
        if other.base_url.is_some() {
            self.base_url = other.base_url;
        }
        if other.anon_key.is_some() {
            self.anon_key = other.anon_key;
        }
        if other.access_token.is_some() {
            self.access_token = other.access_token;
        }
        if other.timeout_secs.is_some() {
            self.timeout_secs = other.timeout_secs;
        }
    }
}

// ============================================================================
// Sync Settings
// ============================================================================

/// 메뉴 권한 동기화 설정
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSettings {
    /// 관리자 로그인 시 자동 동기화 (기본 true)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    /// 로그인 후 동기화까지 지연 (ms, 기본 3000)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_ms: Option<u64>,

    /// 템플릿 행이 없는 역할을 기본값으로 생성 (기본 false)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed_missing_roles: Option<bool>,
}

impl SyncSettings {
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms.unwrap_or(DEFAULT_SYNC_DELAY_MS))
    }

    pub fn seeds_missing_roles(&self) -> bool {
        self.seed_missing_roles.unwrap_or(false)
    }

    fn merge(&mut self, other: SyncSettings) {
        if other.enabled.is_some() {
            self.enabled = other.enabled;
        }
        if other.delay_ms.is_some() {
            self.delay_ms = other.delay_ms;
        }
        if other.seed_missing_roles.is_some() {
            self.seed_missing_roles = other.seed_missing_roles;
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

const DEFAULT_TIMEOUT_SECS: u64 = 15;
const DEFAULT_SYNC_DELAY_MS: u64 = 3_000;

fn default_version() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_freight_config_default() {
        let config = FreightConfig::new();
        assert_eq!(config.version, 1);
        assert!(config.backend.base_url.is_none());
        assert!(config.sync.is_enabled());
        assert!(!config.sync.seeds_missing_roles());
        assert_eq!(config.sync.delay(), Duration::from_secs(3));
        assert_eq!(config.backend.timeout(), Duration::from_secs(15));
    }

    #[test]
    fn test_config_merge() {
        let mut base = FreightConfig::new().base_url("https://old.example.co");
        base.backend.anon_key = Some("anon-old".to_string());

        let mut overlay = FreightConfig::new().base_url("https://new.example.co");
        overlay.sync.delay_ms = Some(500);

        base.merge(overlay);

        assert_eq!(base.backend.base_url.as_deref(), Some("https://new.example.co"));
        assert_eq!(base.backend.anon_key.as_deref(), Some("anon-old"));
        assert_eq!(base.sync.delay(), Duration::from_millis(500));
    }

    #[test]
    fn test_parse_camel_case() {
        let json = r#"{
            "backend": { "baseUrl": "https://x.example.co", "timeoutSecs": 5 },
            "sync": { "delayMs": 1000, "seedMissingRoles": true },
            "templatesFile": "templates.json"
        }"#;
        let config: FreightConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.backend.timeout(), Duration::from_secs(5));
        assert!(config.sync.seeds_missing_roles());
        assert!(config.sync.is_enabled());
        assert_eq!(config.templates_file, Some(PathBuf::from("templates.json")));
    }

    #[test]
    fn test_load_from_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path());
        let config = FreightConfig::new().templates_file("t.json");
        store.save(FREIGHT_CONFIG_FILE, &config).unwrap();

        let loaded = FreightConfig::load_from(&store).unwrap();
        assert_eq!(loaded.templates_file, Some(PathBuf::from("t.json")));
    }

    #[test]
    fn test_project_without_sync_section_keeps_global_values() {
        let global: FreightConfig = serde_json::from_str(
            r#"{ "sync": { "enabled": false, "seedMissingRoles": true },
                 "backend": { "timeoutSecs": 60 } }"#,
        )
        .unwrap();
        let project: FreightConfig =
            serde_json::from_str(r#"{ "templatesFile": "t.json" }"#).unwrap();

        let mut config = FreightConfig::new();
        config.merge(global);
        config.merge(project);

        assert!(!config.sync.is_enabled());
        assert!(config.sync.seeds_missing_roles());
        assert_eq!(config.backend.timeout(), Duration::from_secs(60));
        assert_eq!(config.templates_file, Some(PathBuf::from("t.json")));
    }

    #[test]
    fn test_project_can_reset_values_to_defaults() {
        let global: FreightConfig = serde_json::from_str(
            r#"{ "sync": { "enabled": false, "seedMissingRoles": true },
                 "backend": { "timeoutSecs": 60 } }"#,
        )
        .unwrap();
        let project: FreightConfig = serde_json::from_str(
            r#"{ "sync": { "enabled": true, "seedMissingRoles": false },
                 "backend": { "timeoutSecs": 15 } }"#,
        )
        .unwrap();

        let mut config = FreightConfig::new();
        config.merge(global);
        config.merge(project);

        assert!(config.sync.is_enabled());
        assert!(!config.sync.seeds_missing_roles());
        assert_eq!(config.backend.timeout(), Duration::from_secs(15));
    }
}

//! Error types for FreightDesk
//!
//! 모든 에러를 중앙에서 관리
//!
//! 권한 거부(AuthorizationDenied)와 세션 없음(SessionAbsent)은 에러가 아니라
//! resolver의 `false` 결과로 표현된다. 여기 있는 에러는 저장소/설정/입력 검증용.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// FreightDesk 에러 타입
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // 설정 관련
    // ========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    // ========================================================================
    // 입력 검증 (외부 데이터 경계)
    // ========================================================================
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Invalid permission key: {0:?}")]
    InvalidPermissionKey(String),

    // ========================================================================
    // 저장소 관련
    // ========================================================================
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Template not found for role: {0}")]
    TemplateNotFound(String),

    // ========================================================================
    // 원격 백엔드 (RPC / REST)
    // ========================================================================
    #[error("RPC error: {procedure} ({status}) - {message}")]
    Rpc {
        procedure: String,
        status: u16,
        message: String,
    },

    #[error("HTTP error: {0}")]
    Http(String),

    // ========================================================================
    // 실행 관련
    // ========================================================================
    #[error("Timeout: {0}")]
    Timeout(String),

    // ========================================================================
    // 일반
    // ========================================================================
    #[error("Not found: {0}")]
    NotFound(String),

    // ========================================================================
    // 외부 에러 변환
    // ========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ========================================================================
    // 기타
    // ========================================================================
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// 재시도 가능한 에러인지 확인
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Timeout(_) | Error::Http(_) => true,
            Error::Rpc { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// 외부 입력이 잘못된 경우
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::Validation(_) | Error::UnknownRole(_) | Error::InvalidPermissionKey(_)
        )
    }

    /// RPC 에러 생성 헬퍼
    pub fn rpc(procedure: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Error::Rpc {
            procedure: procedure.into(),
            status,
            message: message.into(),
        }
    }
}

// ============================================================================
// From 구현 (추가 변환)
// ============================================================================

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Internal(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Internal(s.to_string())
    }
}

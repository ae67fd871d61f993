//! Storage module for FreightDesk
//!
//! - `json`: JSON - 설정/권한 템플릿 파일 저장/로드
//!
//! 업무 데이터는 전부 외부 백엔드(RPC)에 위임한다. 로컬 저장은 설정과
//! 오프라인 템플릿 파일뿐.

mod json;

// JSON Storage (범용)
pub use json::JsonStore;

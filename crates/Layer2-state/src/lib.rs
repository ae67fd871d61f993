//! # freight-state
//!
//! 목록 화면 공통 상태:
//! - `filter`: 초안/확정 2단계 필터 (FilterState)
//! - `selection`: 개별 id 선택 vs "필터 결과 전체" 선택 (SelectionState)
//! - `pagination`: 페이지 경계 (Pagination)

pub mod filter;
pub mod pagination;
pub mod selection;

pub use filter::FilterState;
pub use pagination::Pagination;
pub use selection::{SelectionMode, SelectionState};

//! Pagination bounds

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// 기본 페이지 크기
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// 페이지 상태 (1부터 시작)
///
/// 페이지 번호는 항상 `[1, total_pages]` 안에 있다. 역직렬화한 값도 같은 경계로 맞춘다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredPagination")]
pub struct Pagination {
    page: usize,
    page_size: usize,
    total: usize,
}

/// 저장된 원시 값 (검증 전)
#[derive(Deserialize)]
struct StoredPagination {
    #[serde(default)]
    page: usize,
    #[serde(default)]
    page_size: usize,
    #[serde(default)]
    total: usize,
}

impl From<StoredPagination> for Pagination {
    fn from(stored: StoredPagination) -> Self {
        let mut pagination = Self::new(stored.page_size);
        pagination.set_total(stored.total);
        pagination.set_page(stored.page);
        pagination
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Pagination {
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            total: 0,
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// 전체 페이지 수 (결과가 없어도 1)
    pub fn total_pages(&self) -> usize {
        self.total.div_ceil(self.page_size).max(1)
    }

    /// 범위 밖 값은 경계로 맞춘다
    pub fn set_page(&mut self, page: usize) {
        self.page = page.clamp(1, self.total_pages());
    }

    /// 페이지 크기 변경 시 첫 페이지로
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.page = 1;
    }

    /// 조회 결과 건수 반영
    pub fn set_total(&mut self, total: usize) {
        self.total = total;
        self.page = self.page.clamp(1, self.total_pages());
    }

    pub fn next(&mut self) {
        self.set_page(self.page + 1);
    }

    pub fn prev(&mut self) {
        self.set_page(self.page.saturating_sub(1));
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// 0부터 시작하는 첫 행 위치
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }

    /// 현재 페이지 행 범위 (테이블 질의용, 끝은 total로 잘림)
    pub fn range(&self) -> Range<usize> {
        let start = self.offset().min(self.total);
        let end = start.saturating_add(self.page_size).min(self.total);
        start..end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages() {
        let mut p = Pagination::new(20);
        assert_eq!(p.total_pages(), 1);
        p.set_total(41);
        assert_eq!(p.total_pages(), 3);
        p.set_total(40);
        assert_eq!(p.total_pages(), 2);
    }

    #[test]
    fn test_page_clamped() {
        let mut p = Pagination::new(10);
        p.set_total(35);
        p.set_page(99);
        assert_eq!(p.page(), 4);
        p.set_page(0);
        assert_eq!(p.page(), 1);

        p.set_page(4);
        p.set_total(12);
        assert_eq!(p.page(), 2);
        p.set_total(0);
        assert_eq!(p.page(), 1);
    }

    #[test]
    fn test_page_size_resets_page() {
        let mut p = Pagination::new(10);
        p.set_total(100);
        p.set_page(5);
        p.set_page_size(50);
        assert_eq!(p.page(), 1);
        assert_eq!(p.total_pages(), 2);

        p.set_page_size(0);
        assert_eq!(p.page_size(), 1);
    }

    #[test]
    fn test_navigation_and_range() {
        let mut p = Pagination::new(10);
        p.set_total(25);
        assert!(!p.has_prev());
        p.next();
        p.next();
        p.next();
        assert_eq!(p.page(), 3);
        assert!(!p.has_next());
        assert_eq!(p.offset(), 20);
        assert_eq!(p.range(), 20..25);
        p.prev();
        assert_eq!(p.range(), 10..20);
    }

    #[test]
    fn test_serde_shape() {
        let p = Pagination::default();
        let json = serde_json::to_value(p).unwrap();
        assert_eq!(json["page"], 1);
        assert_eq!(json["page_size"], DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_deserialize_clamps_out_of_range_values() {
        let p: Pagination =
            serde_json::from_str(r#"{"page":0,"page_size":0,"total":5}"#).unwrap();
        assert_eq!(p.page(), 1);
        assert_eq!(p.page_size(), 1);
        assert_eq!(p.total_pages(), 5);
        assert_eq!(p.offset(), 0);
        assert_eq!(p.range(), 0..1);

        let p: Pagination =
            serde_json::from_str(r#"{"page":9,"page_size":10,"total":25}"#).unwrap();
        assert_eq!(p.page(), 3);
        assert_eq!(p.range(), 20..25);
    }

    #[test]
    fn test_range_with_huge_page_size() {
        let mut p = Pagination::new(usize::MAX);
        p.set_total(7);
        assert_eq!(p.total_pages(), 1);
        assert_eq!(p.range(), 0..7);
    }
}

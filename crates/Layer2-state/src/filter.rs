//! Filter state (two-phase commit)
//!
//! `ui_filters`는 편집 중인 초안, `active_filters`는 마지막으로 확정된 값이며
//! 조회는 확정값으로만 한다. 초안 편집은 조회를 일으키지 않는다.

use serde::{Deserialize, Serialize};
use tracing::trace;

/// 초안/확정 필터 상태
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterState<F> {
    initial: F,
    ui_filters: F,
    active_filters: F,
    #[serde(default)]
    commits: u64,
}

impl<F: Clone + PartialEq> FilterState<F> {
    pub fn new(initial: F) -> Self {
        Self {
            ui_filters: initial.clone(),
            active_filters: initial.clone(),
            initial,
            commits: 0,
        }
    }

    /// 편집 중인 초안
    pub fn ui_filters(&self) -> &F {
        &self.ui_filters
    }

    /// 조회에 쓰이는 확정값
    pub fn active_filters(&self) -> &F {
        &self.active_filters
    }

    /// 초안 교체
    pub fn set_ui_filters(&mut self, filters: F) {
        self.ui_filters = filters;
    }

    /// 초안 일부 수정
    pub fn update(&mut self, edit: impl FnOnce(&mut F)) {
        edit(&mut self.ui_filters);
    }

    /// 표시 중인 결과가 현재 초안을 반영하지 않는지
    pub fn is_stale(&self) -> bool {
        self.ui_filters != self.active_filters
    }

    /// 검색 (초안 → 확정)
    pub fn handle_search(&mut self) -> &F {
        self.active_filters = self.ui_filters.clone();
        self.commits += 1;
        trace!(commits = self.commits, "Filters committed");
        &self.active_filters
    }

    /// 초기화 (초안과 확정값을 한 번에 초기값으로)
    pub fn handle_clear(&mut self) {
        let initial = self.initial.clone();
        *self = Self {
            ui_filters: initial.clone(),
            active_filters: initial.clone(),
            initial,
            commits: self.commits + 1,
        };
    }

    /// 확정 횟수 (재조회 트리거 감지용)
    pub fn commit_count(&self) -> u64 {
        self.commits
    }
}

impl<F: Clone + PartialEq + Default> Default for FilterState<F> {
    fn default() -> Self {
        Self::new(F::default())
    }
}

//! Row selection state
//!
//! 두 가지 선택 방식은 섞이지 않는다.
//! - `None` + `selected_ids`: 명시적 id 목록
//! - `AllFiltered`: 현재 필터에 맞는 전체 (id 목록은 항상 비어 있음)

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::hash::Hash;

/// 선택 모드
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    #[default]
    None,
    AllFiltered,
}

/// 목록 선택 상태
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionState<Id: Eq + Hash> {
    mode: SelectionMode,
    selected_ids: HashSet<Id>,
}

impl<Id: Eq + Hash> Default for SelectionState<Id> {
    fn default() -> Self {
        Self {
            mode: SelectionMode::None,
            selected_ids: HashSet::new(),
        }
    }
}

impl<Id: Eq + Hash + Clone> SelectionState<Id> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn selected_ids(&self) -> &HashSet<Id> {
        &self.selected_ids
    }

    /// id 하나 토글
    ///
    /// 결과 집합이 비면 모드는 `None`으로 돌아간다.
    pub fn handle_toggle(&mut self, id: Id) {
        if !self.selected_ids.remove(&id) {
            self.selected_ids.insert(id);
        }
        if self.selected_ids.is_empty() {
            self.mode = SelectionMode::None;
        }
    }

    /// "필터 결과 전체" 모드 토글 (개별 id는 항상 비움)
    pub fn handle_select_all(&mut self) {
        self.mode = match self.mode {
            SelectionMode::None => SelectionMode::AllFiltered,
            SelectionMode::AllFiltered => SelectionMode::None,
        };
        self.selected_ids.clear();
    }

    /// 현재 페이지 행 전체 선택/해제
    ///
    /// 페이지의 모든 id가 이미 선택되어 있으면 해제, 아니면 모두 추가.
    /// "전체" 모드였다면 명시적 id 방식으로 전환한다.
    pub fn toggle_page(&mut self, page_ids: &[Id]) {
        if page_ids.is_empty() {
            return;
        }
        self.mode = SelectionMode::None;
        let all_selected = page_ids.iter().all(|id| self.selected_ids.contains(id));
        if all_selected {
            for id in page_ids {
                self.selected_ids.remove(id);
            }
        } else {
            self.selected_ids.extend(page_ids.iter().cloned());
        }
    }

    pub fn clear_selection(&mut self) {
        *self = Self::default();
    }

    pub fn is_selected(&self, id: &Id) -> bool {
        match self.mode {
            SelectionMode::AllFiltered => true,
            SelectionMode::None => self.selected_ids.contains(id),
        }
    }

    /// 선택된 행 수 (`total_filtered`는 현재 필터의 전체 건수)
    pub fn selected_count(&self, total_filtered: usize) -> usize {
        match self.mode {
            SelectionMode::AllFiltered => total_filtered,
            SelectionMode::None => self.selected_ids.len(),
        }
    }

    pub fn has_selection(&self) -> bool {
        self.mode == SelectionMode::AllFiltered || !self.selected_ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_flips_membership() {
        let mut sel = SelectionState::new();
        sel.handle_toggle("w-1");
        sel.handle_toggle("w-2");
        assert!(sel.is_selected(&"w-1"));
        assert_eq!(sel.selected_count(100), 2);

        sel.handle_toggle("w-1");
        assert!(!sel.is_selected(&"w-1"));
        assert_eq!(sel.selected_ids().len(), 1);
    }

    #[test]
    fn test_empty_after_toggles_forces_none() {
        let mut sel = SelectionState::new();
        sel.handle_select_all();
        assert_eq!(sel.mode(), SelectionMode::AllFiltered);

        // 전체 모드에서 토글 후 다시 비우면 모드가 None
        sel.handle_toggle(7u32);
        sel.handle_toggle(7u32);
        assert!(sel.selected_ids().is_empty());
        assert_eq!(sel.mode(), SelectionMode::None);
    }

    #[test]
    fn test_select_all_clears_ids() {
        let mut sel = SelectionState::new();
        sel.handle_toggle(1);
        sel.handle_toggle(2);

        sel.handle_select_all();
        assert_eq!(sel.mode(), SelectionMode::AllFiltered);
        assert!(sel.selected_ids().is_empty());
        assert_eq!(sel.selected_count(42), 42);
        assert!(sel.is_selected(&999));

        sel.handle_select_all();
        assert_eq!(sel.mode(), SelectionMode::None);
        assert!(!sel.has_selection());
    }

    #[test]
    fn test_clear_selection() {
        let mut sel = SelectionState::new();
        sel.handle_toggle(1);
        sel.handle_select_all();
        sel.clear_selection();
        assert_eq!(sel, SelectionState::default());
    }

    #[test]
    fn test_toggle_page() {
        let mut sel = SelectionState::new();
        sel.toggle_page(&[1, 2, 3]);
        assert_eq!(sel.selected_count(10), 3);

        sel.handle_toggle(2);
        sel.toggle_page(&[1, 2, 3]);
        assert_eq!(sel.selected_count(10), 3);

        sel.toggle_page(&[1, 2, 3]);
        assert!(!sel.has_selection());
        assert_eq!(sel.mode(), SelectionMode::None);
    }
}

//! 历史启发表

use shisan_core::{Move, SQUARE_COUNT};

/// 历史启发表：(起点, 终点) 在截断时累加 depth²
#[derive(Debug, Clone)]
pub struct HistoryTable {
    scores: Vec<i32>,
}

impl HistoryTable {
    pub fn new() -> Self {
        Self {
            scores: vec![0; SQUARE_COUNT * SQUARE_COUNT],
        }
    }

    fn index(mv: Move) -> usize {
        mv.from.to_index() * SQUARE_COUNT + mv.to.to_index()
    }

    /// 记录一次截断
    pub fn record(&mut self, mv: Move, depth: u8) {
        let bonus = depth as i32 * depth as i32;
        let slot = &mut self.scores[Self::index(mv)];
        *slot = slot.saturating_add(bonus);
    }

    pub fn score(&self, mv: Move) -> i32 {
        self.scores[Self::index(mv)]
    }

    pub fn clear(&mut self) {
        self.scores.fill(0);
    }
}

impl Default for HistoryTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shisan_core::Position;

    #[test]
    fn test_history_accumulates_depth_squared() {
        let mut history = HistoryTable::new();
        let mv = Move::new(Position::new_unchecked(0, 0), Position::new_unchecked(12, 12));

        history.record(mv, 3);
        history.record(mv, 2);
        assert_eq!(history.score(mv), 13);

        let other = Move::new(Position::new_unchecked(12, 12), Position::new_unchecked(0, 0));
        assert_eq!(history.score(other), 0);

        history.clear();
        assert_eq!(history.score(mv), 0);
    }
}

//! 置换表
//!
//! 用于缓存已搜索过的局面，避免重复计算。键是规范化的局面字符串，
//! 每次顶层搜索开始时清空。

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use shisan_core::Move;

/// 置换表条目类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    /// 精确值
    Exact,
    /// 下界（Beta 截断）
    LowerBound,
    /// 上界（没有走法超过 Alpha）
    UpperBound,
}

/// 置换表条目
#[derive(Debug, Clone, Copy)]
pub struct TTEntry {
    /// 评估分数
    pub value: i32,
    /// 搜索深度
    pub depth: u8,
    /// 条目类型
    pub entry_type: EntryType,
    /// 最佳走法（编码见 [`Move::encode`]，0 表示无）
    pub best_move: u16,
}

impl TTEntry {
    /// 创建新条目
    pub fn new(value: i32, depth: u8, entry_type: EntryType, best_move: Option<Move>) -> Self {
        Self {
            value,
            depth,
            entry_type,
            best_move: best_move.map(|mv| mv.encode()).unwrap_or(0),
        }
    }

    /// 解码最佳走法
    pub fn decode_move(&self) -> Option<Move> {
        Move::decode(self.best_move)
    }
}

/// 置换表
#[derive(Debug, Default)]
pub struct TranspositionTable {
    entries: HashMap<String, TTEntry>,
    /// 命中次数
    hits: AtomicU64,
    /// 查询次数
    probes: AtomicU64,
}

impl TranspositionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 查询条目
    pub fn probe(&self, key: &str) -> Option<&TTEntry> {
        self.probes.fetch_add(1, Ordering::Relaxed);

        let entry = self.entries.get(key);
        if entry.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
        entry
    }

    /// 存储条目；已有更深的条目时保留旧条目
    pub fn store(
        &mut self,
        key: String,
        value: i32,
        depth: u8,
        entry_type: EntryType,
        best_move: Option<Move>,
    ) {
        let entry = TTEntry::new(value, depth, entry_type, best_move);
        self.entries
            .entry(key)
            .and_modify(|existing| {
                if depth >= existing.depth {
                    *existing = entry;
                }
            })
            .or_insert(entry);
    }

    /// 清空表
    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.probes.store(0, Ordering::Relaxed);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 获取统计信息
    pub fn stats(&self) -> TTStats {
        TTStats {
            entries: self.entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            probes: self.probes.load(Ordering::Relaxed),
        }
    }
}

/// 置换表统计信息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TTStats {
    pub entries: usize,
    pub hits: u64,
    pub probes: u64,
}

impl TTStats {
    pub fn hit_rate(&self) -> f64 {
        if self.probes == 0 {
            0.0
        } else {
            self.hits as f64 / self.probes as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shisan_core::Position;

    #[test]
    fn test_tt_store_and_probe() {
        let mut tt = TranspositionTable::new();
        let mv = Move::new(Position::new_unchecked(3, 0), Position::new_unchecked(5, 0));

        tt.store("kr0006|r".to_string(), 100, 5, EntryType::Exact, Some(mv));

        let entry = tt.probe("kr0006|r").unwrap();
        assert_eq!(entry.value, 100);
        assert_eq!(entry.depth, 5);
        assert_eq!(entry.entry_type, EntryType::Exact);
        assert_eq!(entry.decode_move(), Some(mv));
    }

    #[test]
    fn test_tt_miss() {
        let tt = TranspositionTable::new();
        assert!(tt.probe("nothing").is_none());

        let stats = tt.stats();
        assert_eq!(stats.probes, 1);
        assert_eq!(stats.hits, 0);
    }

    #[test]
    fn test_tt_replacement() {
        let mut tt = TranspositionTable::new();

        // 存储深度 3 的条目
        tt.store("key".to_string(), 50, 3, EntryType::Exact, None);
        // 用深度 5 的条目替换
        tt.store("key".to_string(), 100, 5, EntryType::LowerBound, None);
        // 更浅的条目不覆盖
        tt.store("key".to_string(), 7, 2, EntryType::Exact, None);

        let entry = tt.probe("key").unwrap();
        assert_eq!(entry.depth, 5);
        assert_eq!(entry.value, 100);
        assert_eq!(entry.decode_move(), None);
    }

    #[test]
    fn test_tt_clear() {
        let mut tt = TranspositionTable::new();
        tt.store("key".to_string(), 1, 1, EntryType::Exact, None);
        tt.probe("key");
        assert_eq!(tt.stats().hit_rate(), 1.0);

        tt.clear();
        assert!(tt.is_empty());
        assert_eq!(tt.stats().probes, 0);
    }
}

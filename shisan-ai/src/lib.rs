//! 十三路象棋 AI 引擎
//!
//! 包含:
//! - 棋局评估函数
//! - Negamax + Alpha-Beta 搜索
//! - 迭代加深与时间控制
//! - 置换表与历史启发
//! - 后台线程异步搜索

mod controller;
mod error;
mod evaluate;
mod history;
mod ordering;
mod search;
mod transposition;

pub use controller::{AsyncSearch, BestMoveSlot};
pub use error::AiError;
pub use evaluate::Evaluator;
pub use history::HistoryTable;
pub use ordering::{order_moves, score_move};
pub use search::{AiConfig, AiEngine, Deadline, Difficulty, SearchResult};
pub use transposition::{EntryType, TTEntry, TTStats, TranspositionTable};

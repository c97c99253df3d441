//! 十三路象棋规则库
//!
//! 包含:
//! - 棋子、棋盘、位置等核心数据结构
//! - 十三种棋子的走法生成和吃子结算
//! - 将军、将死、胜负判定
//! - 对局管理（走棋、悔棋、计时）

mod board;
mod clock;
mod config;
mod constants;
mod effects;
mod error;
mod game;
mod moves;
mod piece;
mod rules;

pub use board::{Board, BoardState};
pub use clock::GameClock;
pub use config::RuleConfig;
pub use constants::*;
pub use effects::{
    apply_move, armor_line_victims, play, revert_move, spike_exchange_victim, MoveEffects,
};
pub use error::{ConfigError, Result, RulesError};
pub use game::{GameState, MoveRecord};
pub use moves::{Destinations, Move, MoveGenerator};
pub use piece::{Piece, PieceKind, Position, Side};
pub use rules::{DrawReason, GameOutcome, Rules, WinReason};

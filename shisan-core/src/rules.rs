//! 规则判定：合法性、将军、将死、胜负

use serde::{Deserialize, Serialize};

use crate::board::{Board, BoardState};
use crate::config::RuleConfig;
use crate::effects::{self, MoveEffects};
use crate::error::{Result, RulesError};
use crate::moves::{Destinations, Move, MoveGenerator};
use crate::piece::{PieceKind, Position, Side};

/// 胜利原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WinReason {
    /// 将死
    Checkmate,
    /// 困毙（无子可动判负）
    Stalemate,
    /// 吃掉对方帅/将
    GeneralCaptured,
    /// 帅/将进入对方九宫
    PalaceEntry,
    /// 对方造成两将照面
    GeneralsFacing,
    /// 对方帅/将不在棋盘上
    GeneralMissing,
}

/// 和棋原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrawReason {
    /// 连续无吃子步数达到上限
    QuietMoveLimit,
}

/// 对局结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOutcome {
    Win(Side, WinReason),
    Draw(DrawReason),
}

impl GameOutcome {
    /// 胜方；和棋返回 None
    pub fn winner(&self) -> Option<Side> {
        match self {
            GameOutcome::Win(side, _) => Some(*side),
            GameOutcome::Draw(_) => None,
        }
    }
}

/// 规则引擎，持有不可变的规则配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rules {
    config: RuleConfig,
}

impl Rules {
    pub fn new(config: RuleConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RuleConfig {
        &self.config
    }

    /// 某个棋子的伪合法目标格
    pub fn generate_moves(&self, board: &Board, from: Position) -> Destinations {
        MoveGenerator::generate_piece_moves(board, from, &self.config)
    }

    /// 某方所有伪合法走法
    pub fn pseudo_legal_moves(&self, board: &Board, side: Side) -> Vec<Move> {
        MoveGenerator::generate_pseudo_legal(board, side, &self.config)
    }

    /// 走法是否符合棋子规则（不考虑自将）
    pub fn is_legal(&self, board: &Board, from: Position, to: Position) -> bool {
        from.is_valid() && to.is_valid() && self.generate_moves(board, from).contains(to)
    }

    /// 走完后己方是否被将军，或两将照面
    pub fn would_self_check(&self, board: &Board, from: Position, to: Position) -> bool {
        let mut scratch = board.clone();
        let Some(effects) = effects::apply_move(&mut scratch, from, to) else {
            return true;
        };

        scratch.generals_facing() || self.is_in_check(&scratch, effects.piece.side)
    }

    /// `side` 是否被将军：对方有伪合法走法能移除 `side` 的帅/将
    ///
    /// 被冻结的棋子不产生将军；帅/将不在棋盘上时返回 false
    pub fn is_in_check(&self, board: &Board, side: Side) -> bool {
        let Some(general) = board.find_general(side) else {
            return false;
        };

        board
            .pieces(side.opponent())
            .into_iter()
            .any(|(from, _)| self.attacks(board, from, general))
    }

    /// `from` 上的棋子走一步能否移除 `target` 上的棋子（含夹吃和同归于尽）
    pub fn attacks(&self, board: &Board, from: Position, target: Position) -> bool {
        let Some(piece) = board.get(from) else {
            return false;
        };

        match piece.kind {
            PieceKind::Armor | PieceKind::Spike => {
                // 受害者必须在落点或出发点附近
                let near = |p: Position| {
                    (p.row as i8 - target.row as i8).abs() <= 2
                        && (p.col as i8 - target.col as i8).abs() <= 2
                };
                if piece.kind == PieceKind::Spike && !near(from) {
                    return false;
                }
                let dest = self.generate_moves(board, from);
                dest.captures
                    .iter()
                    .filter(|&&to| near(to) || piece.kind == PieceKind::Spike)
                    .any(|&to| {
                        let mut scratch = board.clone();
                        effects::apply_move(&mut scratch, from, to)
                            .is_some_and(|e| e.captured.iter().any(|(pos, _)| *pos == target))
                    })
            }
            _ => self.generate_moves(board, from).captures.contains(&target),
        }
    }

    /// 某方所有完全合法的走法
    pub fn legal_moves_for(&self, board: &Board, side: Side) -> Vec<Move> {
        self.pseudo_legal_moves(board, side)
            .into_iter()
            .filter(|mv| !self.would_self_check(board, mv.from, mv.to))
            .collect()
    }

    /// 当前走子方所有完全合法的走法
    pub fn legal_moves(&self, state: &BoardState) -> Vec<Move> {
        self.legal_moves_for(&state.board, state.current_turn)
    }

    /// 某方是否至少有一步合法走法
    pub fn has_legal_move(&self, board: &Board, side: Side) -> bool {
        self.pseudo_legal_moves(board, side)
            .into_iter()
            .any(|mv| !self.would_self_check(board, mv.from, mv.to))
    }

    /// 检查是否被将死
    pub fn is_checkmate(&self, board: &Board, side: Side) -> bool {
        self.is_in_check(board, side) && !self.has_legal_move(board, side)
    }

    /// 不需要生成走法就能判定的结果（帅/将缺失、入宫、照面）
    pub fn immediate_outcome(&self, board: &Board, mover: Side) -> Option<GameOutcome> {
        let opponent = mover.opponent();

        let Some(own_general) = board.find_general(mover) else {
            return Some(GameOutcome::Win(opponent, WinReason::GeneralMissing));
        };
        if board.find_general(opponent).is_none() {
            return Some(GameOutcome::Win(mover, WinReason::GeneralCaptured));
        }
        if own_general.is_in_palace(opponent) {
            return Some(GameOutcome::Win(mover, WinReason::PalaceEntry));
        }
        if board.generals_facing() {
            return Some(GameOutcome::Win(opponent, WinReason::GeneralsFacing));
        }

        None
    }

    /// `mover` 刚走完一步后判定对局是否结束
    pub fn is_game_over(&self, state: &BoardState, mover: Side) -> Option<GameOutcome> {
        if let Some(outcome) = self.immediate_outcome(&state.board, mover) {
            return Some(outcome);
        }

        let opponent = mover.opponent();
        if !self.has_legal_move(&state.board, opponent) {
            let reason = if self.is_in_check(&state.board, opponent) {
                WinReason::Checkmate
            } else {
                WinReason::Stalemate
            };
            return Some(GameOutcome::Win(mover, reason));
        }

        if let Some(limit) = self.config.draw_after_quiet_plies {
            if state.quiet_plies >= limit {
                return Some(GameOutcome::Draw(DrawReason::QuietMoveLimit));
            }
        }

        None
    }

    /// 检查当前走子方能否走这一步，返回具体原因
    pub fn validate(&self, state: &BoardState, from: Position, to: Position) -> Result<()> {
        if !from.is_valid() {
            return Err(RulesError::InvalidPosition {
                row: from.row,
                col: from.col,
            });
        }
        if !to.is_valid() {
            return Err(RulesError::InvalidPosition { row: to.row, col: to.col });
        }

        let piece = state.board.get(from).ok_or(RulesError::NoPiece {
            row: from.row,
            col: from.col,
        })?;
        if piece.side != state.current_turn {
            return Err(RulesError::NotYourTurn);
        }
        if !self.is_legal(&state.board, from, to) {
            return Err(RulesError::IllegalMove {
                from_row: from.row,
                from_col: from.col,
                to_row: to.row,
                to_col: to.col,
            });
        }
        if self.would_self_check(&state.board, from, to) {
            return Err(RulesError::SelfCheck);
        }

        Ok(())
    }

    /// 在状态上执行走法（不检查合法性），结算效果并切换走子方
    pub fn play(&self, state: &mut BoardState, mv: Move) -> Option<MoveEffects> {
        effects::play(state, mv.from, mv.to)
    }
}

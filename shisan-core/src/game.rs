//! 对局管理
//!
//! 交互方和 AI 都通过 [`GameState`] 走棋、悔棋、查询局面

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::board::BoardState;
use crate::clock::GameClock;
use crate::config::RuleConfig;
use crate::effects::{self, MoveEffects};
use crate::error::{Result, RulesError};
use crate::moves::Move;
use crate::piece::{Piece, Position, Side};
use crate::rules::{GameOutcome, Rules};

/// 一步棋的完整记录（足够精确悔棋）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    /// 走子造成的全部变化
    pub effects: MoveEffects,
    /// 走棋前的无吃子计数
    pub prev_quiet_plies: u32,
    /// 走棋前的将军标记
    pub prev_is_check: bool,
}

impl MoveRecord {
    pub fn as_move(&self) -> Move {
        Move::new(self.effects.from, self.effects.to)
    }
}

/// 对局状态
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    state: BoardState,
    history: Vec<MoveRecord>,
    /// 双方被吃的棋子，按原持有方索引
    captured: [Vec<Piece>; 2],
    /// 当前走子方是否被将军
    is_check: bool,
    outcome: Option<GameOutcome>,
    clock: GameClock,
    rules: Rules,
}

impl GameState {
    /// 使用默认规则开局
    pub fn new() -> Self {
        Self::with_config(RuleConfig::default())
    }

    /// 使用指定规则开局
    pub fn with_config(config: RuleConfig) -> Self {
        Self {
            state: BoardState::initial(),
            history: Vec::new(),
            captured: [Vec::new(), Vec::new()],
            is_check: false,
            outcome: None,
            clock: GameClock::new(),
            rules: Rules::new(config),
        }
    }

    /// 从任意局面开始（用于残局和测试）
    pub fn from_state(state: BoardState, config: RuleConfig) -> Self {
        let rules = Rules::new(config);
        let is_check = rules.is_in_check(&state.board, state.current_turn);
        let mut clock = GameClock::new();
        clock.start_turn(state.current_turn);
        Self {
            state,
            history: Vec::new(),
            captured: [Vec::new(), Vec::new()],
            is_check,
            outcome: None,
            clock,
            rules,
        }
    }

    /// 重新开局（保留规则配置）
    pub fn reset(&mut self) {
        *self = Self::with_config(self.rules.config().clone());
        info!("新对局开始");
    }

    /// 走棋；失败时返回 false，状态不变
    pub fn apply_move(&mut self, from: Position, to: Position) -> bool {
        self.try_apply_move(from, to).is_ok()
    }

    /// 走棋并返回记录
    pub fn try_apply_move(&mut self, from: Position, to: Position) -> Result<MoveRecord> {
        if self.outcome.is_some() {
            return Err(RulesError::GameOver);
        }
        if let Err(e) = self.rules.validate(&self.state, from, to) {
            debug!("拒绝走法 {} -> {}: {}", from, to, e);
            return Err(e);
        }

        let prev_quiet_plies = self.state.quiet_plies;
        let prev_is_check = self.is_check;
        let effects = effects::play(&mut self.state, from, to).ok_or(RulesError::NoPiece {
            row: from.row,
            col: from.col,
        })?;
        let mover = effects.piece.side;

        for (_, piece) in &effects.captured {
            self.captured[piece.side.index()].push(*piece);
        }

        let record = MoveRecord {
            effects,
            prev_quiet_plies,
            prev_is_check,
        };
        self.history.push(record.clone());

        self.is_check = self.rules.is_in_check(&self.state.board, mover.opponent());
        info!(
            "{:?} 走棋 {} -> {}，吃子 {} 枚{}",
            mover,
            from,
            to,
            record.effects.captured.len(),
            if self.is_check { "，将军" } else { "" }
        );

        if let Some(outcome) = self.rules.is_game_over(&self.state, mover) {
            info!("对局结束: {:?}", outcome);
            // 对局结束时不换手
            self.state.current_turn = mover;
            self.outcome = Some(outcome);
            self.clock.pause();
        } else {
            self.clock.switch_turn();
        }

        Ok(record)
    }

    /// 悔棋；没有可悔的棋时返回 false
    pub fn undo(&mut self) -> bool {
        self.try_undo().is_ok()
    }

    /// 悔一步棋，返回被撤销的记录
    pub fn try_undo(&mut self) -> Result<MoveRecord> {
        let record = self.history.pop().ok_or(RulesError::NothingToUndo)?;

        // 棋子放回原处，被吃的棋子（包括同归于尽的刺）重新上盘
        effects::revert_move(&mut self.state.board, &record.effects);
        for (_, piece) in &record.effects.captured {
            let lost = &mut self.captured[piece.side.index()];
            if let Some(index) = lost.iter().rposition(|p| p.id == piece.id) {
                lost.remove(index);
            }
        }

        self.state.current_turn = record.effects.piece.side;
        self.state.quiet_plies = record.prev_quiet_plies;
        self.is_check = record.prev_is_check;
        self.outcome = None;
        self.clock.resume();
        self.clock.start_turn(record.effects.piece.side);

        info!("悔棋 {}", record.as_move());
        Ok(record)
    }

    /// 获取指定格子上的棋子
    pub fn get_piece_at(&self, row: u8, col: u8) -> Option<Piece> {
        Position::new(row, col).and_then(|pos| self.state.board.get(pos))
    }

    /// 指定格子上己方棋子的所有合法落点；对局结束或不是走子方时为空
    pub fn legal_destinations(&self, row: u8, col: u8) -> Vec<Position> {
        let Some(from) = Position::new(row, col) else {
            return Vec::new();
        };
        if self.outcome.is_some() {
            return Vec::new();
        }
        match self.state.board.get(from) {
            Some(piece) if piece.side == self.state.current_turn => {}
            _ => return Vec::new(),
        }

        self.rules
            .generate_moves(&self.state.board, from)
            .all()
            .filter(|&to| !self.rules.would_self_check(&self.state.board, from, to))
            .collect()
    }

    /// 当前走子方的所有合法走法
    pub fn legal_moves(&self) -> Vec<Move> {
        if self.outcome.is_some() {
            return Vec::new();
        }
        self.rules.legal_moves(&self.state)
    }

    pub fn current_turn(&self) -> Side {
        self.state.current_turn
    }

    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    /// `side` 被吃掉的棋子
    pub fn captured(&self, side: Side) -> &[Piece] {
        &self.captured[side.index()]
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn is_check(&self) -> bool {
        self.is_check
    }

    pub fn elapsed_ms(&self, side: Side) -> u64 {
        self.clock.elapsed_ms(side)
    }

    pub fn clock(&self) -> &GameClock {
        &self.clock
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// 当前局面（借用）
    pub fn board_state(&self) -> &BoardState {
        &self.state
    }

    /// 当前局面的独立副本，交给搜索线程使用
    pub fn snapshot(&self) -> BoardState {
        self.state.clone()
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

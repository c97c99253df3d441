//! 搜索引擎
//!
//! 实现 Negamax + Alpha-Beta 剪枝 + 迭代加深 + 置换表 + 历史启发

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use shisan_core::{BoardState, ConfigError, GameOutcome, Move, Rules, Side, WIN_SCORE};
use tracing::{debug, info, warn};

use crate::controller::BestMoveSlot;
use crate::error::AiError;
use crate::evaluate::Evaluator;
use crate::history::HistoryTable;
use crate::ordering::order_moves;
use crate::transposition::{EntryType, TranspositionTable};

/// 搜索窗口边界
const INFINITY: i32 = WIN_SCORE * 2;
/// 根节点 alpha 超过该值时不再扫描剩余走法
const DECISIVE_SCORE: i32 = 5000;
/// 已用时间超过预算的该比例后不再开始新一层
const NEW_DEPTH_CUTOFF: f64 = 0.8;

/// AI 难度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// AI 配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub difficulty: Difficulty,
    /// 迭代加深的最大深度
    pub max_depth: u8,
    /// 每步思考时间（毫秒）
    pub time_limit_ms: u64,
    /// 迭代深度不超过该值时才计算机动性
    pub mobility_depth_limit: u8,
    /// 随机走一步的概率（0.0 - 1.0）
    pub blunder_chance: f64,
    /// 随机数种子；None 时使用系统熵
    pub seed: Option<u64>,
}

impl AiConfig {
    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => Self {
                difficulty,
                max_depth: 3,
                time_limit_ms: 1000,
                mobility_depth_limit: 2,
                blunder_chance: 0.3,
                seed: None,
            },
            Difficulty::Medium => Self {
                difficulty,
                max_depth: 4,
                time_limit_ms: 3000,
                mobility_depth_limit: 3,
                blunder_chance: 0.0,
                seed: None,
            },
            Difficulty::Hard => Self {
                difficulty,
                max_depth: 6,
                time_limit_ms: 5000,
                mobility_depth_limit: 3,
                blunder_chance: 0.0,
                seed: None,
            },
        }
    }

    /// 从 JSON 字符串解析（缺省字段取 Medium 预设）
    pub fn from_json(json: &str) -> Result<Self, AiError> {
        serde_json::from_str(json).map_err(|e| AiError::Config(ConfigError::Json(e)))
    }

    /// 从文件加载
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AiError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| AiError::Config(ConfigError::Io(e)))?;
        Self::from_json(&content)
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self::from_difficulty(Difficulty::Medium)
    }
}

/// 搜索截止时间，显式传入每一层递归
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    start: Instant,
    budget: Duration,
}

impl Deadline {
    /// 从现在开始计时
    pub fn after_ms(budget_ms: u64) -> Self {
        Self {
            start: Instant::now(),
            budget: Duration::from_millis(budget_ms),
        }
    }

    pub fn expired(&self) -> bool {
        self.start.elapsed() >= self.budget
    }

    /// 已用时间占预算的比例
    pub fn fraction_elapsed(&self) -> f64 {
        if self.budget.is_zero() {
            return 1.0;
        }
        self.start.elapsed().as_secs_f64() / self.budget.as_secs_f64()
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

/// 搜索结果（随搜索不断更新）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchResult {
    pub best_move: Option<Move>,
    pub best_value: i32,
}

/// AI 引擎
///
/// 置换表和历史表只属于一次搜索，每次 `select_move` 开始时清空
pub struct AiEngine {
    config: AiConfig,
    rules: Rules,
    tt: TranspositionTable,
    history: HistoryTable,
    rng: ChaCha8Rng,
    nodes_searched: u64,
    /// 当前迭代是否计算机动性
    use_mobility: bool,
    /// 最近一次搜索的结果
    result: SearchResult,
    /// 发布中间结果的位置（异步搜索时使用）
    publisher: Option<Arc<BestMoveSlot>>,
}

impl AiEngine {
    /// 创建新的 AI 引擎
    pub fn new(config: AiConfig, rules: Rules) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            config,
            rules,
            tt: TranspositionTable::new(),
            history: HistoryTable::new(),
            rng,
            nodes_searched: 0,
            use_mobility: false,
            result: SearchResult::default(),
            publisher: None,
        }
    }

    /// 从难度创建（默认规则）
    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        Self::new(AiConfig::from_difficulty(difficulty), Rules::default())
    }

    /// 每次找到更优走法时写入 `slot`
    pub fn with_publisher(mut self, slot: Arc<BestMoveSlot>) -> Self {
        self.publisher = Some(slot);
        self
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    /// 使用配置的时间限制搜索
    pub fn search(&mut self, state: &BoardState) -> Option<Move> {
        self.select_move(state, self.config.time_limit_ms)
    }

    /// 在给定时间内选择走法；只有走子方无合法走法时返回 None
    pub fn select_move(&mut self, state: &BoardState, time_budget_ms: u64) -> Option<Move> {
        let deadline = Deadline::after_ms(time_budget_ms);
        self.nodes_searched = 0;
        self.tt.clear();
        self.history.clear();
        self.result = SearchResult::default();

        let moves = self.rules.legal_moves(state);
        if moves.is_empty() {
            warn!("没有合法走法");
            return None;
        }

        // 按概率随机走一步
        let blunder = self.config.blunder_chance.clamp(0.0, 1.0);
        if blunder > 0.0 && self.rng.gen_bool(blunder) {
            let mv = self.random_move(&moves);
            debug!("随机走法: {:?}", mv);
            return mv;
        }

        // 如果只有一个走法，直接返回
        if moves.len() == 1 {
            self.publish(moves[0], 0);
            return Some(moves[0]);
        }

        let mover = state.current_turn;
        let mut best: Option<(Move, i32)> = None;

        for depth in 1..=self.config.max_depth.max(1) {
            let late = depth > 1 && deadline.fraction_elapsed() >= NEW_DEPTH_CUTOFF;
            if deadline.expired() || late {
                break;
            }
            self.use_mobility = depth <= self.config.mobility_depth_limit;

            let previous_best = best.map(|(mv, _)| mv);
            let ordered =
                order_moves(state, moves.clone(), &self.rules, &self.history, previous_best);
            let mut alpha = -INFINITY;
            let mut depth_best: Option<(Move, i32)> = None;
            let mut completed = true;

            for mv in ordered {
                if deadline.expired() {
                    completed = false;
                    break;
                }

                let mut child = state.clone();
                if self.rules.play(&mut child, mv).is_none() {
                    continue;
                }
                let score = match self.terminal_score(&child, mover) {
                    Some(score) => score,
                    None => -self.negamax(&child, depth - 1, -INFINITY, -alpha, &deadline),
                };

                // 超时返回的是静态评估，更深的层不采用
                if deadline.expired() && depth > 1 {
                    completed = false;
                    break;
                }

                if depth_best.map_or(true, |(_, s)| score > s) {
                    depth_best = Some((mv, score));
                    self.publish(mv, score);
                }
                alpha = alpha.max(score);

                if alpha > DECISIVE_SCORE {
                    debug!("找到决定性走法，停止扫描: {:?} ({})", mv, score);
                    break;
                }
            }

            if let Some(found) = depth_best {
                best = Some(found);
            }

            let stats = self.tt.stats();
            debug!(
                "深度 {} {}: best={:?}, nodes={}, tt={} 命中率 {:.2}, 用时 {}ms",
                depth,
                if completed { "完成" } else { "中断" },
                best,
                self.nodes_searched,
                stats.entries,
                stats.hit_rate(),
                deadline.elapsed_ms()
            );

            if !completed || best.is_some_and(|(_, s)| s > DECISIVE_SCORE) {
                break;
            }
        }

        let chosen = match best {
            Some((mv, score)) => {
                self.publish(mv, score);
                Some(mv)
            }
            None => {
                warn!("时间内未完成任何搜索，随机选择走法");
                self.random_move(&moves)
            }
        };

        info!(
            "搜索结束: {:?}, 分数 {}, 节点 {}, 用时 {}ms",
            chosen,
            self.result.best_value,
            self.nodes_searched,
            deadline.elapsed_ms()
        );
        chosen
    }

    /// Negamax + Alpha-Beta
    ///
    /// 内部节点使用伪合法走法：走后被吃掉帅/将会直接得到终局分
    fn negamax(
        &mut self,
        state: &BoardState,
        depth: u8,
        mut alpha: i32,
        mut beta: i32,
        deadline: &Deadline,
    ) -> i32 {
        self.nodes_searched += 1;

        // 超时返回静态评估
        if deadline.expired() || depth == 0 {
            return self.evaluate(state);
        }

        let key = state.canonical_key();
        let alpha_orig = alpha;
        let mut hash_move = None;
        if let Some(entry) = self.tt.probe(&key) {
            hash_move = entry.decode_move();
            if entry.depth >= depth {
                match entry.entry_type {
                    EntryType::Exact => return entry.value,
                    EntryType::LowerBound => alpha = alpha.max(entry.value),
                    EntryType::UpperBound => beta = beta.min(entry.value),
                }
                if alpha >= beta {
                    return entry.value;
                }
            }
        }

        let mover = state.current_turn;
        let moves = self.rules.pseudo_legal_moves(&state.board, mover);
        // 无子可动判负
        if moves.is_empty() {
            return -WIN_SCORE;
        }

        let ordered = order_moves(state, moves, &self.rules, &self.history, hash_move);
        let mut best_value = -INFINITY;
        let mut best_move = None;

        for mv in ordered {
            let mut child = state.clone();
            if self.rules.play(&mut child, mv).is_none() {
                continue;
            }
            let score = match self.terminal_score(&child, mover) {
                Some(score) => score,
                None => -self.negamax(&child, depth - 1, -beta, -alpha, deadline),
            };

            if score > best_value {
                best_value = score;
                best_move = Some(mv);
            }
            alpha = alpha.max(score);
            if alpha >= beta {
                self.history.record(mv, depth);
                break;
            }
        }

        // 超时得到的分数不可靠，不写入置换表
        if !deadline.expired() {
            let entry_type = if best_value <= alpha_orig {
                EntryType::UpperBound
            } else if best_value >= beta {
                EntryType::LowerBound
            } else {
                EntryType::Exact
            };
            self.tt.store(key, best_value, depth, entry_type, best_move);
        }

        best_value
    }

    /// `mover` 走完后局面已分胜负时，返回 `mover` 视角的分数
    fn terminal_score(&self, child: &BoardState, mover: Side) -> Option<i32> {
        if let Some(outcome) = self.rules.immediate_outcome(&child.board, mover) {
            return Some(Self::outcome_score(outcome, mover));
        }
        match self.rules.config().draw_after_quiet_plies {
            Some(limit) if child.quiet_plies >= limit => Some(0),
            _ => None,
        }
    }

    fn outcome_score(outcome: GameOutcome, mover: Side) -> i32 {
        match outcome.winner() {
            Some(winner) if winner == mover => WIN_SCORE,
            Some(_) => -WIN_SCORE,
            None => 0,
        }
    }

    /// 评估当前局面（走子方视角）
    fn evaluate(&self, state: &BoardState) -> i32 {
        Evaluator::evaluate(state, &self.rules, self.use_mobility)
    }

    fn random_move(&mut self, moves: &[Move]) -> Option<Move> {
        let mv = moves.choose(&mut self.rng).copied()?;
        self.publish(mv, 0);
        Some(mv)
    }

    fn publish(&mut self, mv: Move, value: i32) {
        self.result = SearchResult {
            best_move: Some(mv),
            best_value: value,
        };
        if let Some(slot) = &self.publisher {
            slot.publish(mv, value);
        }
    }

    /// 最近一次搜索的结果
    pub fn last_result(&self) -> SearchResult {
        self.result
    }

    /// 获取搜索的节点数
    pub fn nodes_searched(&self) -> u64 {
        self.nodes_searched
    }
}

//! 异步搜索控制
//!
//! 搜索在独立线程上运行，前台只通过一个原子变量读取当前最佳走法

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use shisan_core::{BoardState, Move, Rules};
use tracing::{debug, info, warn};

use crate::error::AiError;
use crate::search::{AiConfig, AiEngine, SearchResult};

/// 最佳走法发布槽
///
/// 高 32 位为分数，低 16 位为走法编码；0 表示尚无结果
#[derive(Debug, Default)]
pub struct BestMoveSlot {
    packed: AtomicU64,
}

impl BestMoveSlot {
    pub fn new() -> Self {
        Self::default()
    }

    fn pack(mv: Move, value: i32) -> u64 {
        ((value as u32 as u64) << 32) | mv.encode() as u64
    }

    fn unpack(packed: u64) -> SearchResult {
        let best_move = Move::decode((packed & 0xFFFF) as u16);
        SearchResult {
            best_move,
            best_value: if best_move.is_some() { (packed >> 32) as u32 as i32 } else { 0 },
        }
    }

    /// 写入新的最佳走法
    pub fn publish(&self, mv: Move, value: i32) {
        self.packed.store(Self::pack(mv, value), Ordering::Release);
    }

    /// 读取当前最佳走法
    pub fn load(&self) -> SearchResult {
        Self::unpack(self.packed.load(Ordering::Acquire))
    }
}

/// 线程退出时（包括 panic）设置完成标记
struct DoneGuard(Arc<AtomicBool>);

impl Drop for DoneGuard {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Release);
    }
}

/// 异步搜索
///
/// 同一时间只有一个搜索在运行。再次 `start` 时旧线程被分离，
/// 它写入的是旧的发布槽，不会再被读取。
pub struct AsyncSearch {
    config: AiConfig,
    rules: Rules,
    slot: Arc<BestMoveSlot>,
    done: Arc<AtomicBool>,
    handle: Option<JoinHandle<Option<Move>>>,
}

impl AsyncSearch {
    pub fn new(config: AiConfig, rules: Rules) -> Self {
        Self {
            config,
            rules,
            slot: Arc::new(BestMoveSlot::new()),
            done: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    /// 复制局面并在后台线程开始搜索，使用配置的时间限制
    pub fn start(&mut self, state: &BoardState) -> Result<(), AiError> {
        self.start_with_budget(state, self.config.time_limit_ms)
    }

    /// 复制局面并在后台线程开始搜索
    pub fn start_with_budget(
        &mut self,
        state: &BoardState,
        time_budget_ms: u64,
    ) -> Result<(), AiError> {
        if let Some(previous) = self.handle.take() {
            if !previous.is_finished() {
                warn!("上一次搜索尚未结束，丢弃其结果");
            }
        }

        let slot = Arc::new(BestMoveSlot::new());
        let done = Arc::new(AtomicBool::new(false));
        self.slot = Arc::clone(&slot);
        self.done = Arc::clone(&done);

        let state = state.clone();
        let config = self.config.clone();
        let rules = self.rules.clone();

        let handle = thread::Builder::new()
            .name("shisan-search".to_string())
            .spawn(move || {
                let _guard = DoneGuard(done);
                let mut engine = AiEngine::new(config, rules).with_publisher(slot);
                engine.select_move(&state, time_budget_ms)
            })
            .map_err(AiError::Spawn)?;

        info!("后台搜索开始，时间预算 {}ms", time_budget_ms);
        self.handle = Some(handle);
        Ok(())
    }

    /// 搜索是否已结束（没有进行中的搜索时也返回 true）
    pub fn is_done(&self) -> bool {
        self.handle.is_none() || self.done.load(Ordering::Acquire)
    }

    /// 不阻塞地读取当前最佳走法；任何时候都可以调用
    pub fn poll_best_guess(&self) -> Option<Move> {
        self.slot.load().best_move
    }

    /// 等待搜索结束并返回走法
    pub fn try_result(&mut self) -> Result<Option<Move>, AiError> {
        let handle = self.handle.take().ok_or(AiError::NotStarted)?;
        let mv = handle.join().map_err(|_| AiError::WorkerPanicked)?;
        debug!("后台搜索结束: {:?}", mv);
        Ok(mv.or_else(|| self.poll_best_guess()))
    }

    /// 等待搜索结束并返回走法；出错时退回到当前最佳走法
    pub fn result(&mut self) -> Option<Move> {
        match self.try_result() {
            Ok(mv) => mv,
            Err(e) => {
                warn!("获取搜索结果失败: {}", e);
                self.poll_best_guess()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shisan_core::{Board, PieceKind, Position, Side};
    use std::time::{Duration, Instant};

    fn config() -> AiConfig {
        AiConfig {
            max_depth: 2,
            seed: Some(3),
            ..AiConfig::default()
        }
    }

    #[test]
    fn test_slot_pack_roundtrip() {
        let slot = BestMoveSlot::new();
        assert_eq!(slot.load(), SearchResult::default());

        let mv = Move::new(Position::new_unchecked(3, 0), Position::new_unchecked(5, 0));
        slot.publish(mv, -1234);
        assert_eq!(
            slot.load(),
            SearchResult {
                best_move: Some(mv),
                best_value: -1234
            }
        );
    }

    #[test]
    fn test_poll_before_start() {
        let search = AsyncSearch::new(config(), Rules::default());
        assert!(search.is_done());
        assert_eq!(search.poll_best_guess(), None);
    }

    #[test]
    fn test_result_without_start() {
        let mut search = AsyncSearch::new(config(), Rules::default());
        assert!(matches!(search.try_result(), Err(AiError::NotStarted)));
        assert_eq!(search.result(), None);
    }

    #[test]
    fn test_async_search_completes() {
        let state = BoardState::initial();
        let mut search = AsyncSearch::new(config(), Rules::default());
        search.start_with_budget(&state, 300).unwrap();

        let started = Instant::now();
        while !search.is_done() {
            assert!(started.elapsed() < Duration::from_secs(30), "搜索应该按时结束");
            thread::sleep(Duration::from_millis(10));
        }

        let guess = search.poll_best_guess();
        let mv = search.result().unwrap();
        assert_eq!(guess, Some(mv));
        assert!(Rules::default().legal_moves(&state).contains(&mv));
    }

    #[test]
    fn test_best_guess_available_while_searching() {
        let state = BoardState::initial();
        let config = AiConfig {
            max_depth: 8,
            seed: Some(5),
            ..AiConfig::default()
        };
        let mut search = AsyncSearch::new(config, Rules::default());
        search.start_with_budget(&state, 500).unwrap();

        // 先读走法再读完成标记：两者同时成立说明走法是搜索途中发布的
        let mut mid_search = None;
        while !search.is_done() {
            if let Some(guess) = search.poll_best_guess() {
                if !search.is_done() {
                    mid_search = Some(guess);
                    break;
                }
            }
            thread::sleep(Duration::from_millis(1));
        }

        let guess = mid_search.expect("搜索途中应该能读到当前最佳走法");
        assert!(Rules::default().legal_moves(&state).contains(&guess));

        let mv = search.result().unwrap();
        assert!(Rules::default().legal_moves(&state).contains(&mv));
    }

    #[test]
    fn test_restart_discards_previous() {
        let state = BoardState::initial();
        let mut search = AsyncSearch::new(config(), Rules::default());
        search.start_with_budget(&state, 2000).unwrap();

        let mut board = Board::empty();
        board.place(Position::new_unchecked(9, 6), PieceKind::General, Side::Red);
        board.place(Position::new_unchecked(12, 0), PieceKind::General, Side::Black);
        let endgame = BoardState::from_board(board, Side::Red);
        search.start_with_budget(&endgame, 2000).unwrap();

        let mv = search.result().unwrap();
        assert_eq!(mv.from, Position::new_unchecked(9, 6), "结果来自新的搜索");
    }
}

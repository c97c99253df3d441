//! 对局计时

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::piece::Side;

/// 对局计时器：记录双方累计用时
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameClock {
    /// 红方已用时间（毫秒，不含当前回合）
    red_elapsed_ms: u64,
    /// 黑方已用时间（毫秒，不含当前回合）
    black_elapsed_ms: u64,
    /// 当前计时方
    current_turn: Side,
    /// 当前回合开始时间；暂停时为 None
    #[serde(skip)]
    turn_start: Option<Instant>,
    /// 是否暂停
    paused: bool,
}

impl GameClock {
    /// 创建新计时器，红方先走
    pub fn new() -> Self {
        Self {
            red_elapsed_ms: 0,
            black_elapsed_ms: 0,
            current_turn: Side::Red,
            turn_start: Some(Instant::now()),
            paused: false,
        }
    }

    /// 当前计时方
    pub fn current_turn(&self) -> Side {
        self.current_turn
    }

    /// 是否暂停
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// 当前回合已用时间（毫秒）
    pub fn turn_elapsed_ms(&self) -> u64 {
        self.turn_start
            .map(|start| start.elapsed().as_millis() as u64)
            .unwrap_or(0)
    }

    /// 某方累计用时（毫秒，含进行中的回合）
    pub fn elapsed_ms(&self, side: Side) -> u64 {
        let banked = match side {
            Side::Red => self.red_elapsed_ms,
            Side::Black => self.black_elapsed_ms,
        };
        if side == self.current_turn {
            banked + self.turn_elapsed_ms()
        } else {
            banked
        }
    }

    /// 把当前回合的用时计入当前方
    fn bank_current_turn(&mut self) {
        let elapsed = self.turn_elapsed_ms();
        match self.current_turn {
            Side::Red => self.red_elapsed_ms += elapsed,
            Side::Black => self.black_elapsed_ms += elapsed,
        }
    }

    /// 切换走子方
    pub fn switch_turn(&mut self) {
        self.start_turn(self.current_turn.opponent());
    }

    /// 结算当前回合，并从现在开始为 `side` 计时（悔棋时使用）
    pub fn start_turn(&mut self, side: Side) {
        self.bank_current_turn();
        self.current_turn = side;
        self.turn_start = if self.paused { None } else { Some(Instant::now()) };
    }

    /// 暂停计时器
    pub fn pause(&mut self) {
        if !self.paused {
            self.bank_current_turn();
            self.turn_start = None;
            self.paused = true;
        }
    }

    /// 恢复计时器
    pub fn resume(&mut self) {
        if self.paused {
            self.turn_start = Some(Instant::now());
            self.paused = false;
        }
    }
}

impl Default for GameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_clock_initial() {
        let clock = GameClock::new();
        assert_eq!(clock.current_turn(), Side::Red);
        assert_eq!(clock.elapsed_ms(Side::Black), 0);
        assert!(!clock.is_paused());
    }

    #[test]
    fn test_clock_switch() {
        let mut clock = GameClock::new();
        thread::sleep(Duration::from_millis(50));

        clock.switch_turn();
        assert_eq!(clock.current_turn(), Side::Black);

        // 红方时间固定
        let red = clock.elapsed_ms(Side::Red);
        assert!(red >= 50);
        thread::sleep(Duration::from_millis(20));
        assert_eq!(clock.elapsed_ms(Side::Red), red);
    }

    #[test]
    fn test_clock_pause_resume() {
        let mut clock = GameClock::new();
        thread::sleep(Duration::from_millis(30));
        clock.pause();

        let at_pause = clock.elapsed_ms(Side::Red);
        thread::sleep(Duration::from_millis(30));
        assert_eq!(clock.elapsed_ms(Side::Red), at_pause, "暂停期间时间不变");
        assert_eq!(clock.turn_elapsed_ms(), 0);

        clock.resume();
        assert!(!clock.is_paused());
    }

    #[test]
    fn test_clock_serde_skips_instant() {
        let mut clock = GameClock::new();
        clock.switch_turn();
        let json = serde_json::to_string(&clock).unwrap();
        let restored: GameClock = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.current_turn(), Side::Black);
        assert_eq!(restored.turn_elapsed_ms(), 0);
    }
}

//! 十三路象棋自对弈
//!
//! 用法: `shisan-selfplay [ai-config.json] [rules.json]`

use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use shisan_ai::{AiConfig, AsyncSearch};
use shisan_core::{GameState, RuleConfig, Side};
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// 自对弈的最大半回合数
const MAX_PLIES: usize = 400;

/// 轮询搜索线程的间隔
const POLL_INTERVAL: Duration = Duration::from_millis(20);

fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("shisan_selfplay=info".parse()?))
        .init();

    let mut args = std::env::args().skip(1);
    let ai_config = match args.next() {
        Some(path) => AiConfig::load(&path)
            .with_context(|| format!("读取 AI 配置失败: {}", path))?,
        None => AiConfig::default(),
    };
    let rule_config = match args.next() {
        Some(path) => RuleConfig::load(&path)
            .with_context(|| format!("读取规则配置失败: {}", path))?,
        None => RuleConfig::default(),
    };

    info!("十三路象棋自对弈启动: {:?}", ai_config.difficulty);

    let mut game = GameState::with_config(rule_config);
    let mut search = AsyncSearch::new(ai_config, game.rules().clone());

    while !game.is_over() && game.history().len() < MAX_PLIES {
        let side = game.current_turn();
        search.start(&game.snapshot()).context("启动搜索失败")?;

        while !search.is_done() {
            thread::sleep(POLL_INTERVAL);
            if let Some(guess) = search.poll_best_guess() {
                debug!("当前最佳: {}", guess);
            }
        }

        let Some(mv) = search.result() else {
            warn!("{:?} 没有可走的棋", side);
            break;
        };

        if !game.apply_move(mv.from, mv.to) {
            warn!("搜索返回了非法走法: {}", mv);
            break;
        }

        info!(
            "第 {} 步 {:?}: {}{}",
            game.history().len(),
            side,
            mv,
            if game.is_check() { " 将军" } else { "" }
        );
    }

    println!("{}", game.board_state().board);

    match game.outcome() {
        Some(outcome) => info!("对局结束: {:?}", outcome),
        None => info!("达到 {} 步上限，对局中止", MAX_PLIES),
    }
    info!(
        "用时 红方 {}ms 黑方 {}ms",
        game.elapsed_ms(Side::Red),
        game.elapsed_ms(Side::Black)
    );

    Ok(())
}

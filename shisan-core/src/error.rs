//! 错误类型定义

use thiserror::Error;

/// 规则错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RulesError {
    /// 无效的位置
    #[error("Invalid position: ({row}, {col})")]
    InvalidPosition { row: u8, col: u8 },

    /// 没有棋子
    #[error("No piece at position ({row}, {col})")]
    NoPiece { row: u8, col: u8 },

    /// 不是你的回合
    #[error("Not your turn")]
    NotYourTurn,

    /// 无效的走法
    #[error("Illegal move: from ({from_row}, {from_col}) to ({to_row}, {to_col})")]
    IllegalMove {
        from_row: u8,
        from_col: u8,
        to_row: u8,
        to_col: u8,
    },

    /// 走法会导致己方被将军（或两将照面）
    #[error("Move would leave own general in check")]
    SelfCheck,

    /// 游戏已结束
    #[error("Game is already over")]
    GameOver,

    /// 没有可悔的棋
    #[error("Nothing to undo")]
    NothingToUndo,
}

/// 配置加载错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON 解析错误
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// 规则操作结果类型
pub type Result<T> = std::result::Result<T, RulesError>;

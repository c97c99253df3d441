//! AI 错误类型

use shisan_core::ConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AiError {
    /// 配置加载失败
    #[error("AI config error: {0}")]
    Config(#[from] ConfigError),

    /// 无法启动搜索线程
    #[error("Failed to spawn search worker: {0}")]
    Spawn(#[source] std::io::Error),

    /// 搜索线程崩溃
    #[error("Search worker panicked")]
    WorkerPanicked,

    /// 没有进行中的搜索
    #[error("No search in flight")]
    NotStarted,
}

//! 错误类型定义
//!
//! 缓存核心本身不抛错：数据缺失用结构化的 `None` 表达（集合未初始化、
//! cursor 未知、实体未入缓存）。错误只发生在异步边界（节点拉取、事件循环）。

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PandriveSDKError {
    /// 传输层错误（节点拉取失败等，由查询层上报）
    #[error("Transport error: {0}")]
    Transport(String),

    /// 序列化/反序列化错误
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// 无效数据错误（payload 缺字段、身份无法解析等）
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// 事件通道已关闭
    #[error("Channel closed: {0}")]
    ChannelClosed(String),

    /// 其他错误
    #[error("Other error: {0}")]
    Other(String),
}

impl From<serde_json::Error> for PandriveSDKError {
    fn from(error: serde_json::Error) -> Self {
        PandriveSDKError::Serialization(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PandriveSDKError>;

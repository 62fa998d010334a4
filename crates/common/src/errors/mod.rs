//! 统一错误类型定义

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    /// 输入数据不合法（分数越界、时间戳非递增等）
    #[error("数据校验错误: {0}")]
    Validation(String),

    /// 分析参数配置错误（桶宽与价格采样间隔不匹配等）
    #[error("配置错误: {0}")]
    Configuration(String),

    #[error("解析错误: {0}")]
    Parse(String),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        AppError::Configuration(msg.into())
    }
}

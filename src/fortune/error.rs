//! Voronoi 构建过程中的错误类型

use thiserror::Error;

/// Fortune 扫描线算法的错误
///
/// 所有错误对本次计算都是致命的：海滩线一旦不一致就无法局部修复，
/// 因此不存在部分结果或重试语义。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VoronoiError {
    /// 非法输入：重复站点、非有限坐标、退化的三点组合等
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    /// 海滩线内部不变量被破坏（树结构损坏）
    #[error("Beachline invariant violated in {operation}: {detail}")]
    InvariantViolation {
        operation: &'static str,
        detail: String,
    },

    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("Cannot parse vector from '{input}': {reason}")]
    ParseVector { input: String, reason: String },
}

impl VoronoiError {
    pub(crate) fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    pub(crate) fn invariant(operation: &'static str, detail: impl Into<String>) -> Self {
        Self::InvariantViolation {
            operation,
            detail: detail.into(),
        }
    }
}

pub type VoronoiResult<T> = Result<T, VoronoiError>;

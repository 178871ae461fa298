//! 扫描线计算的配置
//!
//! 精度不是全局常量，而是每次计算各自携带的参数，
//! 这样并行运行的多个独立计算互不干扰。

use super::error::{VoronoiError, VoronoiResult};
use serde::{Deserialize, Serialize};

/// 默认保留的小数位数（容差 1e-10）
pub const DEFAULT_DECIMALS: u8 = 10;

/// `f64` 能够精确表示的最大小数位数
const MAX_DECIMALS: u8 = 15;

/// 超过该量级的数值已经是整数，无法再保留小数位
const ROUNDING_LIMIT: f64 = 4.5e15;

/// 坐标舍入精度
///
/// 所有坐标在写入时按该精度舍入（银行家舍入），
/// 比较时的容差为 `10^-decimals`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Precision {
    decimals: u8,
}

impl Default for Precision {
    fn default() -> Self {
        Self {
            decimals: DEFAULT_DECIMALS,
        }
    }
}

impl Precision {
    /// 创建指定小数位数的精度，范围 `0..=15`
    pub fn new(decimals: u8) -> VoronoiResult<Self> {
        if decimals > MAX_DECIMALS {
            return Err(VoronoiError::InvalidConfiguration {
                message: format!(
                    "precision of {} decimals exceeds the supported maximum of {}",
                    decimals, MAX_DECIMALS
                ),
            });
        }
        Ok(Self { decimals })
    }

    pub fn decimals(self) -> u8 {
        self.decimals
    }

    /// 比较容差
    pub fn epsilon(self) -> f64 {
        10f64.powi(-i32::from(self.decimals))
    }

    /// 按精度舍入
    ///
    /// 非有限值原样返回；`-0.0` 统一为 `+0.0`，保证哈希与相等一致。
    pub fn round(self, value: f64) -> f64 {
        let scale = 10f64.powi(i32::from(self.decimals));
        let scaled = value * scale;
        if !(scaled.abs() < ROUNDING_LIMIT) {
            return value + 0.0;
        }
        scaled.round_ties_even() / scale + 0.0
    }

    /// 两个数值在容差内是否相等
    pub fn approx_eq(self, a: f64, b: f64) -> bool {
        (a - b).abs() < self.epsilon()
    }
}

/// Fortune 扫描的配置
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FortuneConfig {
    /// 坐标舍入精度
    pub precision: Precision,
    /// 站点事件后，作废外接圆严格包含新站点的待处理圆事件
    pub guard_enclosed_circles: bool,
}

impl Default for FortuneConfig {
    fn default() -> Self {
        Self {
            precision: Precision::default(),
            guard_enclosed_circles: true,
        }
    }
}

impl FortuneConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_enclosed_circle_guard(mut self, enabled: bool) -> Self {
        self.guard_enclosed_circles = enabled;
        self
    }

    /// 校验配置（反序列化得到的精度可能越界）
    pub fn validate(&self) -> VoronoiResult<()> {
        Precision::new(self.precision.decimals).map(|_| ())
    }
}

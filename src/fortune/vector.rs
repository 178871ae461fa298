//! 按精度舍入的 n 维向量
//!
//! 站点坐标与 Voronoi 顶点都使用 [`Vector`] 表示。
//! 每个分量在**写入时**按所携带的 [`Precision`] 舍入，
//! 而不是在比较时舍入，这样 `Eq` 与 `Hash` 始终一致，可以直接放进 `HashSet`。

use super::config::Precision;
use super::error::{VoronoiError, VoronoiResult};
use rand::Rng;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Index, Mul, Sub};
use std::str::FromStr;

/// 平面点
pub type Vector2 = Vector<2>;

/// 舍入后的 `D` 维坐标
#[derive(Debug, Clone, Copy)]
pub struct Vector<const D: usize> {
    coords: [f64; D],
    precision: Precision,
}

impl<const D: usize> Vector<D> {
    /// 创建向量，所有分量按 `precision` 舍入
    pub fn new(coords: [f64; D], precision: Precision) -> Self {
        Self {
            coords: coords.map(|c| precision.round(c)),
            precision,
        }
    }

    /// 使用默认精度创建向量
    pub fn from_coords(coords: [f64; D]) -> Self {
        Self::new(coords, Precision::default())
    }

    /// 各分量在 `[min, max)` 内均匀随机
    pub fn random<R: Rng>(rng: &mut R, min: f64, max: f64, precision: Precision) -> Self {
        let mut coords = [0.0; D];
        for c in coords.iter_mut() {
            *c = min + (max - min) * rng.random::<f64>();
        }
        Self::new(coords, precision)
    }

    pub fn dim(&self) -> usize {
        D
    }

    pub fn coords(&self) -> [f64; D] {
        self.coords
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// 写入单个分量（同样舍入）
    pub fn set(&mut self, index: usize, value: f64) {
        self.coords[index] = self.precision.round(value);
    }

    /// 以另一精度重新舍入
    pub fn with_precision(&self, precision: Precision) -> Self {
        Self::new(self.coords, precision)
    }

    pub fn dot(&self, other: &Self) -> f64 {
        self.coords
            .iter()
            .zip(other.coords.iter())
            .map(|(a, b)| a * b)
            .sum()
    }

    pub fn squared_length(&self) -> f64 {
        self.dot(self)
    }

    pub fn length(&self) -> f64 {
        self.squared_length().sqrt()
    }

    pub fn element_sum(&self) -> f64 {
        self.coords.iter().sum()
    }

    pub fn distance_squared(&self, other: &Self) -> f64 {
        self.coords
            .iter()
            .zip(other.coords.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum()
    }

    pub fn distance(&self, other: &Self) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// 单位向量；零向量原样返回
    pub fn normalized(&self) -> Self {
        let length = self.length();
        if length == 0.0 {
            return *self;
        }
        *self * (1.0 / length)
    }

    /// 各分量在精度容差内相等
    pub fn approx_eq(&self, other: &Self) -> bool {
        self.coords
            .iter()
            .zip(other.coords.iter())
            .all(|(a, b)| self.precision.approx_eq(*a, *b))
    }

    pub fn is_finite(&self) -> bool {
        self.coords.iter().all(|c| c.is_finite())
    }
}

impl Vector<2> {
    pub fn xy(x: f64, y: f64, precision: Precision) -> Self {
        Self::new([x, y], precision)
    }

    pub fn x(&self) -> f64 {
        self.coords[0]
    }

    pub fn y(&self) -> f64 {
        self.coords[1]
    }

    /// 逆时针旋转 90°
    pub fn perpendicular(&self) -> Self {
        Self::new([-self.coords[1], self.coords[0]], self.precision)
    }

    /// 二维叉积 `self × other`
    pub fn cross(&self, other: &Self) -> f64 {
        self.coords[0] * other.coords[1] - self.coords[1] * other.coords[0]
    }
}

impl<const D: usize> From<[f64; D]> for Vector<D> {
    fn from(coords: [f64; D]) -> Self {
        Self::from_coords(coords)
    }
}

impl<const D: usize> Index<usize> for Vector<D> {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.coords[index]
    }
}

impl<const D: usize> Add for Vector<D> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        let mut coords = self.coords;
        for (c, r) in coords.iter_mut().zip(rhs.coords.iter()) {
            *c += r;
        }
        Self::new(coords, self.precision)
    }
}

impl<const D: usize> Sub for Vector<D> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        let mut coords = self.coords;
        for (c, r) in coords.iter_mut().zip(rhs.coords.iter()) {
            *c -= r;
        }
        Self::new(coords, self.precision)
    }
}

impl<const D: usize> Mul<f64> for Vector<D> {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.coords.map(|c| c * rhs), self.precision)
    }
}

// 相等与哈希基于舍入后的位模式；精度本身不参与比较
impl<const D: usize> PartialEq for Vector<D> {
    fn eq(&self, other: &Self) -> bool {
        self.coords
            .iter()
            .zip(other.coords.iter())
            .all(|(a, b)| a.to_bits() == b.to_bits())
    }
}

impl<const D: usize> Eq for Vector<D> {}

impl<const D: usize> Hash for Vector<D> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for c in &self.coords {
            c.to_bits().hash(state);
        }
    }
}

/// 先比较模长平方，再按分量字典序
impl<const D: usize> Ord for Vector<D> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.squared_length()
            .total_cmp(&other.squared_length())
            .then_with(|| {
                self.coords
                    .iter()
                    .zip(other.coords.iter())
                    .map(|(a, b)| a.total_cmp(b))
                    .find(|o| o.is_ne())
                    .unwrap_or(Ordering::Equal)
            })
    }
}

impl<const D: usize> PartialOrd for Vector<D> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// 文本格式 `(x;y;...)`，可由 [`FromStr`] 还原
impl<const D: usize> fmt::Display for Vector<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, c) in self.coords.iter().enumerate() {
            if i > 0 {
                write!(f, ";")?;
            }
            write!(f, "{c}")?;
        }
        write!(f, ")")
    }
}

impl<const D: usize> FromStr for Vector<D> {
    type Err = VoronoiError;

    fn from_str(s: &str) -> VoronoiResult<Self> {
        let parse_error = |reason: String| VoronoiError::ParseVector {
            input: s.to_string(),
            reason,
        };

        let inner = s
            .trim()
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| parse_error("expected the form (x;y;...)".to_string()))?;

        let parts: Vec<&str> = inner.split(';').collect();
        if parts.len() != D {
            return Err(parse_error(format!(
                "expected {} components, found {}",
                D,
                parts.len()
            )));
        }

        let mut coords = [0.0; D];
        for (c, part) in coords.iter_mut().zip(parts) {
            *c = part
                .trim()
                .parse::<f64>()
                .map_err(|e| parse_error(format!("component '{}': {e}", part.trim())))?;
        }
        Ok(Self::from_coords(coords))
    }
}

//! 几何内核
//!
//! 扫描线算法用到的无状态几何计算：
//! - 两条抛物线在扫描线位置下的交点（断点）
//! - 三点外接圆圆心
//! - 方向测试
//!
//! 扫描线沿 +y 方向推进。所有返回的坐标都按内核精度舍入，
//! 保证后续的相等比较稳定。

use super::config::Precision;
use super::error::{VoronoiError, VoronoiResult};
use super::vector::Vector2;

/// 三点的转向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    CounterClockwise,
    Collinear,
    Clockwise,
}

impl Orientation {
    /// `+1` / `0` / `-1`
    pub fn sign(self) -> i32 {
        match self {
            Orientation::CounterClockwise => 1,
            Orientation::Collinear => 0,
            Orientation::Clockwise => -1,
        }
    }
}

/// 共线且同向（夹角为 0°）时的判定规则
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollinearTieBreak {
    /// 视为共线
    Strict,
    /// `p2` 比 `p1` 更远时视为逆时针（线段延长线上的点）
    Extend,
}

/// 几何内核，携带本次计算的精度
#[derive(Debug, Clone, Copy, Default)]
pub struct GeometryKernel {
    precision: Precision,
}

impl GeometryKernel {
    pub fn new(precision: Precision) -> Self {
        Self { precision }
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    pub fn epsilon(&self) -> f64 {
        self.precision.epsilon()
    }

    /// 两站点抛物线的断点 x 坐标
    ///
    /// 抛物线以站点为焦点、扫描线 `y = sweep_y` 为准线。
    /// 返回 `left` 的弧在左、`right` 的弧在右时的那个交点。
    ///
    /// # 错误
    /// 两站点在容差内重合时返回 [`VoronoiError::InvalidInput`]。
    pub fn parabolic_cut(&self, left: &Vector2, right: &Vector2, sweep_y: f64) -> VoronoiResult<f64> {
        let eps = self.epsilon();
        let (x1, y1) = (left.x(), left.y());
        let (x2, y2) = (right.x(), right.y());

        if (x1 - x2).abs() < eps && (y1 - y2).abs() < eps {
            return Err(VoronoiError::invalid_input(format!(
                "identical sites {left} and {right} are not allowed"
            )));
        }

        let left_on_line = (y1 - sweep_y).abs() < eps;
        let right_on_line = (y2 - sweep_y).abs() < eps;
        match (left_on_line, right_on_line) {
            (true, true) => return Ok(self.precision.round((x1 + x2) / 2.0)),
            (true, false) => return Ok(x1),
            (false, true) => return Ok(x2),
            (false, false) => {}
        }

        // 焦点高度相同，两条抛物线形状一致，交点在正中
        if (y1 - y2).abs() < eps {
            return Ok(self.precision.round((x1 + x2) / 2.0));
        }

        // y = a_i (x - x_i)^2 + (y_i + sweep_y) / 2
        let a1 = 1.0 / (2.0 * (y1 - sweep_y));
        let a2 = 1.0 / (2.0 * (y2 - sweep_y));
        let b = a1 * x1 - a2 * x2;
        let discriminant =
            (a1 * a2 * (x1 - x2) * (x1 - x2) - (a1 - a2) * (y1 - y2) / 2.0).max(0.0);
        let root = discriminant.sqrt();

        let xs1 = self.precision.round((b + root) / (a1 - a2));
        let xs2 = self.precision.round((b - root) / (a1 - a2));
        let (lo, hi) = if xs1 > xs2 { (xs2, xs1) } else { (xs1, xs2) };

        // 离扫描线更近的焦点抛物线更窄，决定哪个根是真正的断点
        Ok(if y1 >= y2 { hi } else { lo })
    }

    /// 三点外接圆圆心
    ///
    /// 通过 `ac` 与 `bc` 两条中垂线求交，竖直边单独处理以避免除零。
    ///
    /// # 错误
    /// 任意两点重合或三点共线时返回 [`VoronoiError::InvalidInput`]。
    pub fn circumcenter(&self, a: &Vector2, b: &Vector2, c: &Vector2) -> VoronoiResult<Vector2> {
        if a.approx_eq(b) || b.approx_eq(c) || a.approx_eq(c) {
            return Err(VoronoiError::invalid_input(format!(
                "circumcenter needs three different points, got {a}, {b}, {c}"
            )));
        }

        let eps = self.epsilon();
        let (tx, ty) = ((a.x() + c.x()) / 2.0, (a.y() + c.y()) / 2.0);
        let (vx, vy) = ((b.x() + c.x()) / 2.0, (b.y() + c.y()) / 2.0);

        let (ux, uy) = if (a.x() - c.x()).abs() < eps {
            (1.0, 0.0)
        } else {
            ((c.y() - a.y()) / (a.x() - c.x()), 1.0)
        };
        let (wx, wy) = if (b.x() - c.x()).abs() < eps {
            (-1.0, 0.0)
        } else {
            ((b.y() - c.y()) / (b.x() - c.x()), -1.0)
        };

        let denominator = ux * wy - wx * uy;
        if denominator == 0.0 {
            return Err(VoronoiError::invalid_input(format!(
                "points {a}, {b}, {c} are collinear"
            )));
        }
        let alpha = (wy * (vx - tx) - wx * (vy - ty)) / denominator;

        let center = Vector2::xy(tx + alpha * ux, ty + alpha * uy, self.precision);
        if !center.is_finite() {
            return Err(VoronoiError::invalid_input(format!(
                "points {a}, {b}, {c} have no finite circumcenter"
            )));
        }
        Ok(center)
    }

    /// 方向测试：`p0 -> p1 -> p2` 的转向
    ///
    /// 叉积在容差内为零时：`p1`、`p2` 位于 `p0` 两侧返回 `Clockwise`；
    /// 同侧时由 `tie_break` 决定。
    pub fn orientation(
        &self,
        p0: &Vector2,
        p1: &Vector2,
        p2: &Vector2,
        tie_break: CollinearTieBreak,
    ) -> Orientation {
        let eps = self.epsilon();
        let (dx1, dy1) = (p1.x() - p0.x(), p1.y() - p0.y());
        let (dx2, dy2) = (p2.x() - p0.x(), p2.y() - p0.y());

        let cross = dx1 * dy2 - dy1 * dx2;
        if cross > eps {
            return Orientation::CounterClockwise;
        }
        if cross < -eps {
            return Orientation::Clockwise;
        }
        if dx1 * dx2 < 0.0 || dy1 * dy2 < 0.0 {
            return Orientation::Clockwise;
        }
        if tie_break == CollinearTieBreak::Extend
            && dx1 * dx1 + dy1 * dy1 < dx2 * dx2 + dy2 * dy2
        {
            return Orientation::CounterClockwise;
        }
        Orientation::Collinear
    }

    /// 两条闭线段是否相交（含端点接触）
    pub fn segments_intersect(
        &self,
        p11: &Vector2,
        p12: &Vector2,
        p21: &Vector2,
        p22: &Vector2,
    ) -> bool {
        let turn = |a: &Vector2, b: &Vector2, c: &Vector2| {
            self.orientation(a, b, c, CollinearTieBreak::Extend).sign()
        };
        turn(p11, p12, p21) * turn(p11, p12, p22) <= 0
            && turn(p21, p22, p11) * turn(p21, p22, p12) <= 0
    }

    pub fn distance(&self, a: &Vector2, b: &Vector2) -> f64 {
        a.distance(b)
    }
}

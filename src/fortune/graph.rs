//! Voronoi 图输出结构
//!
//! - [`Site`]: 带标签的输入站点
//! - [`Vertex`]: 边的端点，有限点或无穷远
//! - [`VoronoiEdge`]: 两个站点之间的垂直平分线段（或射线、直线）
//! - [`VoronoiGraph`]: 去重的顶点集合与边集合，构建完成后不可变
//!
//! 扫描过程中使用的可变边记录 `EdgeRecord` 与 `GraphBuilder` 仅在 crate 内可见。

use super::config::Precision;
use super::error::{VoronoiError, VoronoiResult};
use super::vector::Vector2;
use std::collections::HashSet;

// ============================================================================
// 站点与顶点
// ============================================================================

/// 站点在输入序列中的索引
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SiteId(pub(crate) usize);

impl SiteId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// 输入站点
///
/// `tag` 由调用方附带，用于把站点对应回自己的领域对象（例如所属国家）。
#[derive(Debug, Clone, PartialEq)]
pub struct Site<T = ()> {
    pub position: Vector2,
    pub tag: T,
}

impl<T> Site<T> {
    pub fn new(position: Vector2, tag: T) -> Self {
        Self { position, tag }
    }

    pub fn x(&self) -> f64 {
        self.position.x()
    }

    pub fn y(&self) -> f64 {
        self.position.y()
    }
}

impl From<[f64; 2]> for Site {
    fn from(coords: [f64; 2]) -> Self {
        Self::new(Vector2::from(coords), ())
    }
}

impl From<Vector2> for Site {
    fn from(position: Vector2) -> Self {
        Self::new(position, ())
    }
}

/// 边的端点
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vertex {
    Finite(Vector2),
    /// 射线或直线延伸到无穷远的一端
    Infinite,
}

impl Vertex {
    pub fn is_finite(&self) -> bool {
        matches!(self, Vertex::Finite(_))
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self, Vertex::Infinite)
    }

    pub fn point(&self) -> Option<Vector2> {
        match self {
            Vertex::Finite(p) => Some(*p),
            Vertex::Infinite => None,
        }
    }
}

// ============================================================================
// 输出边与图
// ============================================================================

/// Voronoi 边
///
/// `left_site` 位于方向向量的逆时针一侧。
#[derive(Debug, Clone, PartialEq)]
pub struct VoronoiEdge<T = ()> {
    left_site: Site<T>,
    right_site: Site<T>,
    vertex_a: Vertex,
    vertex_b: Vertex,
}

impl<T> VoronoiEdge<T> {
    pub fn left_site(&self) -> &Site<T> {
        &self.left_site
    }

    pub fn right_site(&self) -> &Site<T> {
        &self.right_site
    }

    pub fn vertex_a(&self) -> Vertex {
        self.vertex_a
    }

    pub fn vertex_b(&self) -> Vertex {
        self.vertex_b
    }

    /// 两端都在无穷远（只有两个站点，或全部站点共线时）
    pub fn is_infinite(&self) -> bool {
        self.vertex_a.is_infinite() && self.vertex_b.is_infinite()
    }

    /// 至少一端在无穷远
    pub fn is_partly_infinite(&self) -> bool {
        self.vertex_a.is_infinite() || self.vertex_b.is_infinite()
    }

    /// 边上一个确定的点：有限端点，或两端都无穷时取两站点中点
    pub fn fixed_point(&self) -> Vector2 {
        match (self.vertex_a, self.vertex_b) {
            (Vertex::Finite(a), _) => a,
            (Vertex::Infinite, Vertex::Finite(b)) => b,
            (Vertex::Infinite, Vertex::Infinite) => {
                (self.left_site.position + self.right_site.position) * 0.5
            }
        }
    }

    /// 单位方向向量
    ///
    /// 有界边为 `b - a` 方向；否则为站点连线的垂线，
    /// 朝向使左站点位于其逆时针一侧。
    pub fn direction_vector(&self) -> Vector2 {
        if let (Vertex::Finite(a), Vertex::Finite(b)) = (self.vertex_a, self.vertex_b) {
            return (b - a).normalized();
        }
        (self.right_site.position - self.left_site.position)
            .perpendicular()
            .normalized()
    }

    /// 有界边的欧氏长度，否则为 `+inf`
    pub fn length(&self) -> f64 {
        match (self.vertex_a, self.vertex_b) {
            (Vertex::Finite(a), Vertex::Finite(b)) => a.distance(&b),
            _ => f64::INFINITY,
        }
    }

    /// 两站点间距
    pub fn site_separation(&self) -> f64 {
        self.left_site.position.distance(&self.right_site.position)
    }
}

/// Voronoi 图
#[derive(Debug, Clone)]
pub struct VoronoiGraph<T = ()> {
    vertices: HashSet<Vector2>,
    edges: Vec<VoronoiEdge<T>>,
}

impl<T> Default for VoronoiGraph<T> {
    fn default() -> Self {
        Self {
            vertices: HashSet::new(),
            edges: Vec::new(),
        }
    }
}

impl<T> VoronoiGraph<T> {
    pub fn vertices(&self) -> &HashSet<Vector2> {
        &self.vertices
    }

    pub fn edges(&self) -> &[VoronoiEdge<T>] {
        &self.edges
    }

    /// 按 [`Vector`](super::vector::Vector) 的全序排列的顶点，便于确定性输出
    pub fn sorted_vertices(&self) -> Vec<Vector2> {
        let mut vertices: Vec<Vector2> = self.vertices.iter().copied().collect();
        vertices.sort();
        vertices
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty() && self.vertices.is_empty()
    }
}

/// 只保留两站点间距不小于 `min_site_separation` 的边
///
/// 顶点集合由保留边的有限端点重新生成。
pub fn filter_graph<T: Clone>(graph: &VoronoiGraph<T>, min_site_separation: f64) -> VoronoiGraph<T> {
    let edges: Vec<VoronoiEdge<T>> = graph
        .edges
        .iter()
        .filter(|edge| edge.site_separation() >= min_site_separation)
        .cloned()
        .collect();

    let vertices = edges
        .iter()
        .flat_map(|edge| [edge.vertex_a.point(), edge.vertex_b.point()])
        .flatten()
        .collect();

    VoronoiGraph { vertices, edges }
}

// ============================================================================
// 扫描期间的可变记录
// ============================================================================

/// 边记录在构建器中的索引
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct EdgeId(pub(crate) usize);

/// 扫描期间的边
///
/// 端点槽位 `None` 表示尚未确定。
#[derive(Debug, Clone)]
pub(crate) struct EdgeRecord {
    pub left: SiteId,
    pub right: SiteId,
    pub vertex_a: Option<Vertex>,
    pub vertex_b: Option<Vertex>,
    pub done: bool,
}

impl EdgeRecord {
    fn new(left: SiteId, right: SiteId) -> Self {
        Self {
            left,
            right,
            vertex_a: None,
            vertex_b: None,
            done: false,
        }
    }

    /// 依次填充 `a`、`b` 槽位；第三个顶点说明海滩线已经损坏
    pub fn add_vertex(&mut self, vertex: Vertex) -> VoronoiResult<()> {
        if self.vertex_a.is_none() {
            self.vertex_a = Some(vertex);
        } else if self.vertex_b.is_none() {
            self.vertex_b = Some(vertex);
        } else {
            return Err(VoronoiError::invariant(
                "add_vertex",
                format!(
                    "edge between sites {} and {} already has two vertices",
                    self.left.0, self.right.0
                ),
            ));
        }
        Ok(())
    }

    /// 把所有未确定的槽位填为无穷远
    pub fn close_with_infinity(&mut self) {
        self.vertex_a.get_or_insert(Vertex::Infinite);
        self.vertex_b.get_or_insert(Vertex::Infinite);
    }

    pub fn swap_sites(&mut self) {
        std::mem::swap(&mut self.left, &mut self.right);
    }

    fn is_minute(&self) -> bool {
        match (self.vertex_a, self.vertex_b) {
            (Some(Vertex::Finite(a)), Some(Vertex::Finite(b))) => a.approx_eq(&b),
            _ => false,
        }
    }
}

/// 扫描期间累积的顶点与边
#[derive(Debug, Default)]
pub(crate) struct GraphBuilder {
    vertices: HashSet<Vector2>,
    edges: Vec<EdgeRecord>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_edge(&mut self, left: SiteId, right: SiteId) -> EdgeId {
        self.edges.push(EdgeRecord::new(left, right));
        EdgeId(self.edges.len() - 1)
    }

    pub fn edge(&self, id: EdgeId) -> VoronoiResult<&EdgeRecord> {
        self.edges
            .get(id.0)
            .ok_or_else(|| VoronoiError::invariant("edge", format!("unknown edge {}", id.0)))
    }

    pub fn edge_mut(&mut self, id: EdgeId) -> VoronoiResult<&mut EdgeRecord> {
        self.edges
            .get_mut(id.0)
            .ok_or_else(|| VoronoiError::invariant("edge", format!("unknown edge {}", id.0)))
    }

    pub fn add_vertex(&mut self, vertex: Vector2) {
        self.vertices.insert(vertex);
    }

    #[cfg(test)]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// 处理离开海滩线时只拿到一个顶点的边
    ///
    /// 剩余槽位填为无穷远；同一水平线上的两个站点按 x 降序排列，
    /// 使射线朝下（-y）延伸。
    pub fn close_open_edges(&mut self, positions: &[Vector2], precision: Precision) {
        for edge in self.edges.iter_mut().filter(|e| !e.done) {
            if edge.vertex_b.is_some() {
                continue;
            }
            edge.close_with_infinity();

            let (left, right) = (positions[edge.left.0], positions[edge.right.0]);
            if precision.approx_eq(left.y(), right.y()) && left.x() < right.x() {
                edge.swap_sites();
            }
        }
    }

    /// 删除长度为零的有界边
    ///
    /// 删除前把其他边上与之近似相等的端点统一到同一个代表顶点，
    /// 避免舍入误差在相邻边之间留下缝隙。
    pub fn remove_minute_edges(&mut self) -> usize {
        let representatives: Vec<Vector2> = self
            .edges
            .iter()
            .filter(|e| e.is_minute())
            .filter_map(|e| e.vertex_a.and_then(|v| v.point()))
            .collect();

        for rep in &representatives {
            for edge in &mut self.edges {
                for slot in [&mut edge.vertex_a, &mut edge.vertex_b] {
                    if let Some(Vertex::Finite(p)) = slot {
                        if p.approx_eq(rep) {
                            *p = *rep;
                        }
                    }
                }
            }
            self.vertices.retain(|v| v == rep || !v.approx_eq(rep));
            self.vertices.insert(*rep);
        }

        let before = self.edges.len();
        self.edges.retain(|e| !e.is_minute());
        before - self.edges.len()
    }

    /// 生成不可变的输出图；仍未确定的槽位视为无穷远
    pub fn build<T: Clone>(self, sites: &[Site<T>]) -> VoronoiGraph<T> {
        let edges = self
            .edges
            .into_iter()
            .map(|record| VoronoiEdge {
                left_site: sites[record.left.0].clone(),
                right_site: sites[record.right.0].clone(),
                vertex_a: record.vertex_a.unwrap_or(Vertex::Infinite),
                vertex_b: record.vertex_b.unwrap_or(Vertex::Infinite),
            })
            .collect();

        VoronoiGraph {
            vertices: self.vertices,
            edges,
        }
    }
}

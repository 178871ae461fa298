//! Fortune 扫描线 Voronoi 图模块
//!
//! 直接由站点集合构造 Voronoi 图，不经过 Delaunay 三角剖分：
//! - **扫描线**: 沿 +y 方向推进，依次处理站点事件与圆事件
//! - **海滩线**: 扫描线之上可见抛物线段组成的二叉树
//! - **Voronoi 图**: 去重的顶点集合与边集合
//!
//! # 架构概览
//!
//! ```text
//! 输入站点 (Vec<Site<T>>)
//!        │
//!        ▼
//! ┌──────────────────┐
//! │   EventQueue     │  ── 站点事件 / 圆事件，按 (y, x) 排序
//! └────────┬─────────┘
//!          │ pop
//!          ▼
//! ┌──────────────────┐      ┌──────────────────┐
//! │   FortuneSweep   │ ───▶ │    Beachline     │  ── 插入 / 移除弧
//! └────────┬─────────┘      └────────┬─────────┘
//!          │                         │
//!          │                         ▼
//!          │                ┌──────────────────┐
//!          │                │  GeometryKernel  │  ── 断点、外接圆、方向测试
//!          │                └──────────────────┘
//!          ▼
//!   VoronoiGraph<T>
//! ```
//!
//! # 使用示例
//!
//! ```
//! use sekai_voronoi::fortune::{compute_voronoi_points, filter_graph};
//!
//! let graph = compute_voronoi_points(&[[0.0, 0.0], [4.0, 0.0], [0.0, 4.0]]).unwrap();
//! assert_eq!(graph.edge_count(), 3);
//! assert_eq!(graph.vertex_count(), 1);
//!
//! // 只保留站点间距不小于 5 的边
//! let far = filter_graph(&graph, 5.0);
//! assert_eq!(far.edge_count(), 1);
//! ```
//!
//! # 模块结构
//!
//! - `config`: 精度与扫描配置
//! - `vector`: 按精度舍入的向量
//! - `kernel`: 几何计算
//! - `event`: 事件与事件队列
//! - `beachline`: 海滩线
//! - `sweep`: 扫描主循环
//! - `graph`: 输出图与过滤
//! - `border`: 区域之间的边界通道

mod beachline;
mod border;
mod config;
mod error;
mod event;
mod graph;
mod kernel;
mod sweep;
mod vector;


// ============================================================================
// 公开 API
// ============================================================================

pub use border::{closest_crossing, find_gateway, find_gateways, Gateway, RegionPair};
pub use config::{FortuneConfig, Precision, DEFAULT_DECIMALS};
pub use error::{VoronoiError, VoronoiResult};
pub use event::EventQueue;
pub use graph::{filter_graph, Site, SiteId, Vertex, VoronoiEdge, VoronoiGraph};
pub use kernel::{CollinearTieBreak, GeometryKernel, Orientation};
pub use vector::{Vector, Vector2};

/// 计算带标签站点的 Voronoi 图
///
/// 站点顺序不影响结果。空输入返回空图。
///
/// # 错误
/// - 两个站点按配置精度舍入后重合，或坐标非有限：[`VoronoiError::InvalidInput`]
/// - 配置精度越界：[`VoronoiError::InvalidConfiguration`]
/// - 海滩线内部不一致：[`VoronoiError::InvariantViolation`]
pub fn compute_voronoi_graph<T: Clone>(
    sites: &[Site<T>],
    config: &FortuneConfig,
) -> VoronoiResult<VoronoiGraph<T>> {
    sweep::sweep_sites(sites, config)
}

/// 使用默认配置计算坐标点的 Voronoi 图
pub fn compute_voronoi_points(points: &[[f64; 2]]) -> VoronoiResult<VoronoiGraph> {
    let sites: Vec<Site> = points.iter().map(|&p| Site::from(p)).collect();
    compute_voronoi_graph(&sites, &FortuneConfig::default())
}

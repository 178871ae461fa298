//! 区域之间的边界通道
//!
//! 两组站点（例如相邻两国的城市）合并计算 Voronoi 图后，
//! 两侧站点共享的边就是跨越边界的候选通道；其中站点间距最小的一条
//! 即为两组之间最近的连接。
//!
//! 批量计算时每一对区域都使用独立的扫描实例，通过 rayon 并行执行。

use super::config::FortuneConfig;
use super::error::VoronoiResult;
use super::graph::{Site, VoronoiEdge, VoronoiGraph};
use super::sweep::sweep_sites;
use log::warn;
use rayon::prelude::*;

/// 一对相邻区域的站点
#[derive(Debug, Clone)]
pub struct RegionPair<T> {
    pub first: Vec<Site<T>>,
    pub second: Vec<Site<T>>,
}

impl<T> RegionPair<T> {
    pub fn new(first: Vec<Site<T>>, second: Vec<Site<T>>) -> Self {
        Self { first, second }
    }
}

/// 站点所属的区域
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Side {
    First,
    Second,
}

/// 两区域之间最近的一对站点
#[derive(Debug, Clone, PartialEq)]
pub struct Gateway<T> {
    /// 第一个区域一侧的站点
    pub first: Site<T>,
    /// 第二个区域一侧的站点
    pub second: Site<T>,
    /// 两站点间距
    pub separation: f64,
}

/// 两侧站点属于不同分组的边中，站点间距最小的一条
///
/// 间距相同时取先出现的边。
pub fn closest_crossing<T, G, F>(graph: &VoronoiGraph<T>, group_of: F) -> Option<&VoronoiEdge<T>>
where
    G: PartialEq,
    F: Fn(&Site<T>) -> G,
{
    graph
        .edges()
        .iter()
        .filter(|edge| group_of(edge.left_site()) != group_of(edge.right_site()))
        .min_by(|a, b| a.site_separation().total_cmp(&b.site_separation()))
}

/// 计算一对区域之间的通道
///
/// 任一区域为空，或两区域在图中没有共享边时返回 `Ok(None)`。
pub fn find_gateway<T: Clone>(
    pair: &RegionPair<T>,
    config: &FortuneConfig,
) -> VoronoiResult<Option<Gateway<T>>> {
    if pair.first.is_empty() || pair.second.is_empty() {
        return Ok(None);
    }

    let sites: Vec<Site<(Side, T)>> = pair
        .first
        .iter()
        .map(|s| Site::new(s.position, (Side::First, s.tag.clone())))
        .chain(
            pair.second
                .iter()
                .map(|s| Site::new(s.position, (Side::Second, s.tag.clone()))),
        )
        .collect();

    let graph = sweep_sites(&sites, config)?;
    let Some(edge) = closest_crossing(&graph, |site| site.tag.0) else {
        return Ok(None);
    };

    let (first, second) = match edge.left_site().tag.0 {
        Side::First => (edge.left_site(), edge.right_site()),
        Side::Second => (edge.right_site(), edge.left_site()),
    };
    Ok(Some(Gateway {
        first: Site::new(first.position, first.tag.1.clone()),
        second: Site::new(second.position, second.tag.1.clone()),
        separation: edge.site_separation(),
    }))
}

/// 并行计算多对区域的通道，结果与输入一一对应
///
/// 单对失败不影响其他区域对，错误按位置返回。
pub fn find_gateways<T>(
    pairs: &[RegionPair<T>],
    config: &FortuneConfig,
) -> Vec<VoronoiResult<Option<Gateway<T>>>>
where
    T: Clone + Send + Sync,
{
    pairs
        .par_iter()
        .enumerate()
        .map(|(i, pair)| {
            let result = find_gateway(pair, config);
            if let Err(e) = &result {
                warn!("gateway computation for region pair {} failed: {}", i, e);
            }
            result
        })
        .collect()
}

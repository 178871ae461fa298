//! 随机站点的 Voronoi 图统计
//!
//! 用法: `voronoi_stats [站点数] [种子]`，设置 `RUST_LOG=debug` 查看扫描日志。

use rand::rngs::StdRng;
use rand::SeedableRng;
use sekai_voronoi::fortune::{
    compute_voronoi_graph, filter_graph, FortuneConfig, Precision, Site, Vector2,
};
use std::collections::HashSet;
use std::time::Instant;

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let count: usize = args.next().and_then(|s| s.parse().ok()).unwrap_or(5000);
    let seed: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);

    let config = FortuneConfig::default();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut seen = HashSet::new();
    let mut sites = Vec::with_capacity(count);
    while sites.len() < count {
        let p = Vector2::random(&mut rng, 0.0, 1000.0, Precision::default());
        if seen.insert(p) {
            sites.push(Site::from(p));
        }
    }
    println!("Generated {} sites (seed {})", sites.len(), seed);

    let start = Instant::now();
    let graph = match compute_voronoi_graph(&sites, &config) {
        Ok(graph) => graph,
        Err(e) => {
            eprintln!("Voronoi computation failed: {}", e);
            std::process::exit(1);
        }
    };
    println!("Computed in {:?}", start.elapsed());

    let bounded: Vec<f64> = graph
        .edges()
        .iter()
        .filter(|e| !e.is_partly_infinite())
        .map(|e| e.length())
        .collect();
    let rays = graph.edge_count() - bounded.len();
    let total: f64 = bounded.iter().sum();

    println!("Voronoi stats:");
    println!("  Vertices: {}", graph.vertex_count());
    println!("  Edges: {} ({} bounded, {} rays)", graph.edge_count(), bounded.len(), rays);
    if !bounded.is_empty() {
        let min = bounded.iter().copied().fold(f64::INFINITY, f64::min);
        let max = bounded.iter().copied().fold(0.0, f64::max);
        println!(
            "  Bounded length: min {:.4}, max {:.4}, avg {:.4}",
            min,
            max,
            total / bounded.len() as f64
        );
    }

    for threshold in [5.0, 10.0, 20.0, 40.0] {
        let filtered = filter_graph(&graph, threshold);
        println!(
            "  Edges with site separation >= {}: {}",
            threshold,
            filtered.edge_count()
        );
    }
}

// Fortune 扫描线 Voronoi 图的性质验证
use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use sekai_voronoi::fortune::{
    compute_voronoi_graph, compute_voronoi_points, filter_graph, find_gateway, find_gateways,
    FortuneConfig, Precision, RegionPair, Site, Vector2, VoronoiError, VoronoiGraph,
};
use std::collections::HashSet;

fn random_points(seed: u64, n: usize, size: f64) -> Vec<Vector2> {
    let mut rng = StdRng::seed_from_u64(seed);
    let precision = Precision::default();
    let mut seen = HashSet::new();
    let mut points = Vec::with_capacity(n);
    while points.len() < n {
        let p = Vector2::random(&mut rng, 0.0, size, precision);
        if seen.insert(p) {
            points.push(p);
        }
    }
    points
}

fn untagged(points: &[Vector2]) -> Vec<Site> {
    points.iter().map(|&p| Site::from(p)).collect()
}

fn edge_keys<T>(graph: &VoronoiGraph<T>) -> HashSet<(Vector2, Vector2)> {
    graph
        .edges()
        .iter()
        .map(|e| (e.left_site().position, e.right_site().position))
        .collect()
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-6 * (1.0 + a.abs().max(b.abs()))
}

#[test]
fn test_sites_are_preserved() {
    let points = random_points(1, 300, 1000.0);
    let graph = compute_voronoi_graph(&untagged(&points), &FortuneConfig::default()).unwrap();
    let inputs: HashSet<Vector2> = points.iter().copied().collect();

    assert!(graph.edge_count() > 0);
    for edge in graph.edges() {
        assert!(inputs.contains(&edge.left_site().position));
        assert!(inputs.contains(&edge.right_site().position));
        assert_ne!(edge.left_site().position, edge.right_site().position);
    }
}

#[test]
fn test_two_sites_perpendicular_bisector() {
    let graph = compute_voronoi_points(&[[1.0, 2.0], [5.0, -1.0]]).unwrap();
    assert_eq!(graph.edge_count(), 1);

    let edge = &graph.edges()[0];
    assert!(edge.is_infinite());
    let midpoint = edge.fixed_point();
    assert_relative_eq!(midpoint.x(), 3.0, epsilon = 1e-9);
    assert_relative_eq!(midpoint.y(), 0.5, epsilon = 1e-9);

    let direction = edge.direction_vector();
    assert_relative_eq!(direction.dot(&Vector2::from([4.0, -3.0])), 0.0, epsilon = 1e-9);
}

#[test]
fn test_three_sites_share_circumcenter() {
    let graph = compute_voronoi_points(&[[0.0, 0.0], [4.0, 0.0], [0.0, 4.0]]).unwrap();
    assert_eq!(graph.edge_count(), 3);
    assert_eq!(graph.vertex_count(), 1);

    for edge in graph.edges() {
        assert!(edge.is_partly_infinite());
        let vertex = edge.fixed_point();
        assert_relative_eq!(vertex.x(), 2.0, epsilon = 1e-9);
        assert_relative_eq!(vertex.y(), 2.0, epsilon = 1e-9);
    }
}

#[test]
fn test_collinear_sites_have_no_vertices() {
    let points: Vec<[f64; 2]> = (0..6).map(|i| [i as f64, 0.0]).collect();
    let graph = compute_voronoi_points(&points).unwrap();

    assert_eq!(graph.vertex_count(), 0);
    assert_eq!(graph.edge_count(), 5);
    assert!(graph.edges().iter().all(|e| e.is_partly_infinite()));
}

#[test]
fn test_duplicate_sites_are_rejected() {
    let result = compute_voronoi_points(&[[0.0, 0.0], [3.0, 1.0], [3.0, 1.0]]);
    assert!(matches!(result, Err(VoronoiError::InvalidInput { .. })));

    // 同一组输入每次都得到同样的错误
    let again = compute_voronoi_points(&[[0.0, 0.0], [3.0, 1.0], [3.0, 1.0]]);
    assert_eq!(result.unwrap_err(), again.unwrap_err());
}

#[test]
fn test_order_invariance() {
    let config = FortuneConfig::default();
    let mut points = random_points(2, 400, 1000.0);
    let reference = compute_voronoi_graph(&untagged(&points), &config).unwrap();

    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..3 {
        points.shuffle(&mut rng);
        let shuffled = compute_voronoi_graph(&untagged(&points), &config).unwrap();
        assert_eq!(shuffled.sorted_vertices(), reference.sorted_vertices());
        assert_eq!(edge_keys(&shuffled), edge_keys(&reference));
    }
}

#[test]
fn test_matches_delaunay_dual() {
    let points = random_points(3, 250, 1000.0);
    let graph = compute_voronoi_graph(&untagged(&points), &FortuneConfig::default()).unwrap();

    let delaunay_points: Vec<delaunator::Point> = points
        .iter()
        .map(|p| delaunator::Point { x: p.x(), y: p.y() })
        .collect();
    let triangulation = delaunator::triangulate(&delaunay_points);
    let triangle_count = triangulation.triangles.len() / 3;

    // 一般位置下：Voronoi 顶点与 Delaunay 三角形一一对应，Voronoi 边与 Delaunay 边一一对应
    assert_eq!(graph.vertex_count(), triangle_count);
    assert_eq!(
        graph.edge_count(),
        (triangulation.triangles.len() + triangulation.hull.len()) / 2
    );

    let vertices = graph.sorted_vertices();
    for t in triangulation.triangles.chunks(3) {
        let (a, b, c) = (
            &delaunay_points[t[0]],
            &delaunay_points[t[1]],
            &delaunay_points[t[2]],
        );
        let d = 2.0 * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y));
        let a2 = a.x * a.x + a.y * a.y;
        let b2 = b.x * b.x + b.y * b.y;
        let c2 = c.x * c.x + c.y * c.y;
        let ux = (a2 * (b.y - c.y) + b2 * (c.y - a.y) + c2 * (a.y - b.y)) / d;
        let uy = (a2 * (c.x - b.x) + b2 * (a.x - c.x) + c2 * (b.x - a.x)) / d;

        assert!(
            vertices.iter().any(|v| close(v.x(), ux) && close(v.y(), uy)),
            "外心 ({}, {}) 不在 Voronoi 顶点中",
            ux,
            uy
        );
    }
}

#[test]
fn test_vertices_are_empty_circle_centers() {
    let points = random_points(4, 200, 1000.0);
    let graph = compute_voronoi_graph(&untagged(&points), &FortuneConfig::default()).unwrap();

    for edge in graph.edges() {
        for vertex in [edge.vertex_a(), edge.vertex_b()] {
            let Some(v) = vertex.point() else { continue };
            let radius = v.distance(&edge.left_site().position);
            let scale = 1e-6 * (1.0 + radius);

            assert_relative_eq!(
                radius,
                v.distance(&edge.right_site().position),
                epsilon = scale
            );
            for p in &points {
                assert!(
                    v.distance(p) >= radius - scale,
                    "站点 {} 位于顶点 {} 的空圆内",
                    p,
                    v
                );
            }
        }
    }
}

#[test]
fn test_small_inputs_keep_empty_circles() {
    let config = FortuneConfig::default();
    for n in 4..=12 {
        for seed in 0..200 {
            let points = random_points(1000 * n as u64 + seed, n, 1000.0);
            let graph = compute_voronoi_graph(&untagged(&points), &config).unwrap();

            for v in graph.vertices() {
                let radius = graph
                    .edges()
                    .iter()
                    .filter(|e| e.vertex_a().point() == Some(*v) || e.vertex_b().point() == Some(*v))
                    .map(|e| v.distance(&e.left_site().position))
                    .fold(f64::INFINITY, f64::min);
                for p in &points {
                    assert!(
                        v.distance(p) >= radius - 1e-6,
                        "n = {}, seed = {}: 站点 {} 位于顶点 {} 的空圆内",
                        n,
                        seed,
                        p,
                        v
                    );
                }
            }
        }
    }
}

#[test]
fn test_enclosed_circle_guard_is_redundant_on_random_input() {
    let guarded = FortuneConfig::default();
    let unguarded = FortuneConfig::default().with_enclosed_circle_guard(false);

    for seed in 10..15 {
        let sites = untagged(&random_points(seed, 300, 500.0));
        let a = compute_voronoi_graph(&sites, &guarded).unwrap();
        let b = compute_voronoi_graph(&sites, &unguarded).unwrap();
        assert_eq!(a.sorted_vertices(), b.sorted_vertices(), "seed {}", seed);
        assert_eq!(edge_keys(&a), edge_keys(&b), "seed {}", seed);
    }
}

#[test]
fn test_filter_graph_is_monotonic() {
    let points = random_points(5, 300, 1000.0);
    let graph = compute_voronoi_graph(&untagged(&points), &FortuneConfig::default()).unwrap();

    let mut previous = usize::MAX;
    for threshold in [0.0, 10.0, 25.0, 50.0, 75.0, 100.0, 200.0, 1e6] {
        let filtered = filter_graph(&graph, threshold);
        assert!(filtered.edge_count() <= previous);
        previous = filtered.edge_count();

        for edge in filtered.edges() {
            assert!(edge.site_separation() >= threshold);
        }
        for v in filtered.vertices() {
            assert!(graph.vertices().contains(v));
        }
    }
    assert_eq!(filter_graph(&graph, 0.0).edge_count(), graph.edge_count());
    assert_eq!(previous, 0);
}

#[test]
fn test_custom_precision() {
    let config = FortuneConfig::default().with_precision(Precision::new(4).unwrap());
    let graph = compute_voronoi_points(&[[0.0, 0.0], [3.0, 0.0], [0.0, 3.0]]).unwrap();
    let coarse = compute_voronoi_graph(
        &[
            Site::from([0.0, 0.0]),
            Site::from([3.0, 0.0]),
            Site::from([0.0, 3.00001]),
        ],
        &config,
    )
    .unwrap();

    // 4 位小数下 3.00001 与 3 重合
    assert_eq!(coarse.sorted_vertices(), graph.sorted_vertices());
    assert_eq!(coarse.sorted_vertices(), vec![Vector2::from([1.5, 1.5])]);
}

// ============================================================================
// 边界通道
// ============================================================================

fn closest_pair(first: &[Vector2], second: &[Vector2]) -> f64 {
    first
        .iter()
        .flat_map(|a| second.iter().map(move |b| a.distance(b)))
        .fold(f64::INFINITY, f64::min)
}

#[test]
fn test_gateway_is_closest_bichromatic_pair() {
    let points = random_points(6, 120, 1000.0);
    let (west, east): (Vec<Vector2>, Vec<Vector2>) = points.iter().partition(|p| p.x() < 500.0);

    let pair = RegionPair::new(
        west.iter().enumerate().map(|(i, &p)| Site::new(p, format!("W{}", i))).collect(),
        east.iter().enumerate().map(|(i, &p)| Site::new(p, format!("E{}", i))).collect(),
    );
    let gateway = find_gateway(&pair, &FortuneConfig::default())
        .unwrap()
        .expect("相邻区域之间应当存在通道");

    assert!(gateway.first.tag.starts_with('W'));
    assert!(gateway.second.tag.starts_with('E'));
    assert_relative_eq!(gateway.separation, closest_pair(&west, &east), epsilon = 1e-9);
    assert_relative_eq!(
        gateway.separation,
        gateway.first.position.distance(&gateway.second.position),
        epsilon = 1e-12
    );
}

#[test]
fn test_gateways_in_parallel() {
    let config = FortuneConfig::default();
    let pairs: Vec<RegionPair<usize>> = (0..8)
        .map(|seed| {
            let points = random_points(100 + seed, 60, 100.0);
            let (first, second): (Vec<Vector2>, Vec<Vector2>) =
                points.iter().partition(|p| p.y() < 50.0);
            RegionPair::new(
                first.into_iter().map(|p| Site::new(p, 0)).collect(),
                second.into_iter().map(|p| Site::new(p, 1)).collect(),
            )
        })
        .collect();

    let mut broken = pairs[3].clone();
    broken.second.push(broken.first[0].clone());
    let mut all = pairs.clone();
    all.push(broken);
    all.push(RegionPair::new(Vec::new(), pairs[0].second.clone()));

    let results = find_gateways(&all, &config);
    assert_eq!(results.len(), all.len());

    for (pair, result) in pairs.iter().zip(&results) {
        let sequential = find_gateway(pair, &config).unwrap();
        assert_eq!(result.as_ref().unwrap(), &sequential);
        assert!(sequential.is_some());
    }
    // 重复站点只让自己这一对失败
    assert!(matches!(results[8], Err(VoronoiError::InvalidInput { .. })));
    // 空区域没有通道
    assert_eq!(results[9], Ok(None));
}

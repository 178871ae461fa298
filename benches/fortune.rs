use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::Rng;
use sekai_voronoi::fortune::{
    compute_voronoi_graph, filter_graph, find_gateways, FortuneConfig, RegionPair, Site,
    Vector2,
};

fn generate_random_sites(n: usize, width: f64, height: f64) -> Vec<Site> {
    let mut rng = rand::rng();
    let mut sites = Vec::with_capacity(n);

    for _ in 0..n {
        let x = rng.random_range(0.0..width);
        let y = rng.random_range(0.0..height);
        sites.push(Site::from(Vector2::from([x, y])));
    }

    sites
}

fn bench_fortune(c: &mut Criterion) {
    let mut group = c.benchmark_group("Fortune Sweep");
    let config = FortuneConfig::default();

    for &n in &[100, 1000, 10000] {
        group.bench_function(format!("voronoi_{}", n), |b| {
            let sites = generate_random_sites(n, 1000.0, 1000.0);
            b.iter(|| {
                black_box(compute_voronoi_graph(&sites, &config).ok());
            });
        });

        group.bench_function(format!("filter_{}", n), |b| {
            let sites = generate_random_sites(n, 1000.0, 1000.0);
            let Ok(graph) = compute_voronoi_graph(&sites, &config) else {
                return;
            };
            b.iter(|| {
                black_box(filter_graph(&graph, 10.0));
            });
        });
    }

    group.finish();
}

fn bench_gateways(c: &mut Criterion) {
    let mut group = c.benchmark_group("Border Gateways");
    let config = FortuneConfig::default();

    let pairs: Vec<RegionPair<()>> = (0..64)
        .map(|_| {
            let (first, second): (Vec<Site>, Vec<Site>) = generate_random_sites(200, 1000.0, 1000.0)
                .into_iter()
                .partition(|s| s.x() < 500.0);
            RegionPair::new(first, second)
        })
        .collect();

    group.bench_function("gateways_64x200", |b| {
        b.iter(|| {
            black_box(find_gateways(&pairs, &config));
        });
    });

    group.finish();
}

criterion_group!(benches, bench_fortune, bench_gateways);
criterion_main!(benches);

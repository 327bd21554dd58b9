use criterion::{criterion_group, criterion_main, Criterion};
use dggrs::{GridSystem, H3Grid, ZoneCoder, ZoneId};
use geo::geometry::Coord;
use std::sync::Arc;
use zonal::{Band, ColumnCoverage, Evaluator, GridGeometry, ZoneList, ZoneRange};

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

const MT_WASHINGTON: Coord = Coord {
    y: 44.2705,
    x: -71.30325,
};

/// An H3-backed coverage over a patch of cells around Mt Washington.
fn h3_patch() -> ColumnCoverage {
    let grid = Arc::new(H3Grid);
    let mut coder = grid.coder();
    coder.set_level(9).unwrap();
    let mut zones: Vec<ZoneId> = Vec::new();
    for lat_step in 0..64 {
        for lng_step in 0..64 {
            let coord = Coord {
                x: MT_WASHINGTON.x + f64::from(lng_step) * 0.002,
                y: MT_WASHINGTON.y + f64::from(lat_step) * 0.002,
            };
            zones.push(coder.encode(coord).unwrap());
        }
    }
    zones.sort_unstable();
    zones.dedup();
    #[allow(clippy::cast_precision_loss)]
    let column: Vec<f64> = (0..zones.len()).map(|i| i as f64).collect();
    let geometry = GridGeometry::new(grid, ZoneList::new(zones).unwrap(), 9..=9).unwrap();
    ColumnCoverage::new(geometry, vec![Band::new("elevation")], vec![column]).unwrap()
}

fn point_evaluation(c: &mut Criterion) {
    let mut group = c.benchmark_group("Point Evaluation");

    let coverage = h3_patch();
    group.bench_function("hit", |b| {
        let mut evaluator = Evaluator::new(&coverage);
        b.iter(|| evaluator.evaluate(MT_WASHINGTON, true).unwrap())
    });
    group.bench_function("miss", |b| {
        let mut evaluator = Evaluator::new(&coverage);
        let nowhere = Coord { x: 10.0, y: 10.0 };
        b.iter(|| evaluator.evaluate(nowhere, true).unwrap())
    });
}

fn computed_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("Computed Index");

    let range = ZoneRange::new(0x8000, 7, 1_000_000).unwrap();
    let id = range.get(765_432).unwrap();
    group.bench_function("position_of", |b| b.iter(|| range.position_of(id)));
}

criterion_group!(benches, point_evaluation, computed_index);
criterion_main!(benches);

//! # Nearest Point Query Benchmark

use criterion::{criterion_group, criterion_main, Criterion};

use nalgebra::Vector2;
use track_model::{
    segment::{self, SegmentSpec},
    spatial::{LinearScan, NearestIndex, UniformGrid},
    TrackModel,
};

fn nearest_benchmark(c: &mut Criterion) {
    // ---- Build the club circuit ----

    let samples = segment::generate(
        &[
            SegmentSpec::Straight { length_m: 40.0 },
            SegmentSpec::Arc {
                radius_m: 10.0,
                angle_deg: 90.0,
            },
            SegmentSpec::Straight { length_m: 20.0 },
            SegmentSpec::Arc {
                radius_m: 10.0,
                angle_deg: 90.0,
            },
            SegmentSpec::Straight { length_m: 40.0 },
            SegmentSpec::Arc {
                radius_m: 10.0,
                angle_deg: 90.0,
            },
            SegmentSpec::Straight { length_m: 20.0 },
            SegmentSpec::Arc {
                radius_m: 10.0,
                angle_deg: 90.0,
            },
        ],
        Vector2::new(0.0, 0.0),
        0.0,
        5.0,
    )
    .unwrap();

    let track = TrackModel::build(samples.clone(), 5.0).unwrap();

    // A lap of query points just off the centreline
    let queries: Vec<Vector2<f64>> = track
        .centre_line()
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let angle = i as f64 * 0.37;
            point + 1.5 * Vector2::new(angle.cos(), angle.sin())
        })
        .collect();

    let linear = LinearScan::new(track.centre_line().to_vec());
    let grid = UniformGrid::build(track.centre_line().to_vec(), 2.0);

    // The same track with the grid accelerator swapped in
    let grid_track = TrackModel::build(samples, 5.0)
        .unwrap()
        .with_index(Box::new(UniformGrid::build(track.centre_line().to_vec(), 2.0)));

    c.bench_function("LinearScan::nearest", |b| {
        b.iter(|| {
            for query in queries.iter() {
                linear.nearest(*query);
            }
        })
    });

    c.bench_function("UniformGrid::nearest", |b| {
        b.iter(|| {
            for query in queries.iter() {
                grid.nearest(*query);
            }
        })
    });

    c.bench_function("TrackModel::get_track_distance::linear", |b| {
        b.iter(|| {
            for query in queries.iter() {
                track.get_track_distance(*query);
            }
        })
    });

    c.bench_function("TrackModel::get_track_distance::grid", |b| {
        b.iter(|| {
            for query in queries.iter() {
                grid_track.get_track_distance(*query);
            }
        })
    });
}

criterion_group!(benches, nearest_benchmark);
criterion_main!(benches);

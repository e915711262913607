//! Response curve benchmarks

use ce_core::{Band, BandKind, BandParams, CurveSettings, EntityId, EqVariant};
use ce_dsp::{BiquadOracle, ControlPoint, ResponseModel};
use criterion::{Criterion, black_box, criterion_group, criterion_main};

fn bands(count: usize) -> Vec<Band> {
    (0..count)
        .map(|i| {
            let freq = 40.0 * 1.9_f64.powi(i as i32);
            let gain = if i % 2 == 0 { 4.0 } else { -3.0 };
            Band::new(EntityId(i as u64), BandKind::Peaking, BandParams::new(freq, gain, 1.4))
        })
        .collect()
}

fn bench_band_combination(c: &mut Criterion) {
    let bands = bands(8);
    let curve = CurveSettings::default();

    let analytic = ResponseModel::default();
    c.bench_function("response_analytic_8_bands", |b| {
        b.iter(|| analytic.compute(EqVariant::Parametric, black_box(&bands), None, &curve))
    });

    let oracle = ResponseModel::default().with_oracle(Box::new(BiquadOracle::default()));
    c.bench_function("response_biquad_8_bands", |b| {
        b.iter(|| oracle.compute(EqVariant::Parametric, black_box(&bands), None, &curve))
    });
}

fn bench_point_interpolation(c: &mut Criterion) {
    let mut points = bands(10);
    for point in &mut points {
        point.set_kind(BandKind::Point);
    }
    let model = ResponseModel::default();
    let curve = CurveSettings::new(0.2, None);
    let anchor = Some(ControlPoint::new(1000.0, 0.0));

    c.bench_function("response_points_10", |b| {
        b.iter(|| model.compute(EqVariant::Points, black_box(&points), anchor, &curve))
    });
    c.bench_function("response_curve_10", |b| {
        b.iter(|| model.compute(EqVariant::Curve, black_box(&points), None, &curve))
    });
}

criterion_group!(benches, bench_band_combination, bench_point_interpolation);
criterion_main!(benches);

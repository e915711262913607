// ============================================================================
// Contour response model tests
// Band combination, oracle fallback and point interpolation end to end
// ============================================================================

use approx::assert_abs_diff_eq;
use ce_core::{Band, BandKind, BandParams, CurveSettings, EntityId, EqVariant, FrequencyRange};
use ce_dsp::{BiquadOracle, ControlPoint, FilterResponseOracle, OracleError, ResponseModel};

// ============================================================================
// TEST UTILITIES
// ============================================================================

fn band(id: u64, kind: BandKind, freq: f64, gain: f64, q: f64) -> Band {
    Band::new(EntityId(id), kind, BandParams::new(freq, gain, q))
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn models() -> Vec<(&'static str, ResponseModel)> {
    init_logging();
    vec![
        ("analytic", ResponseModel::default()),
        (
            "biquad",
            ResponseModel::default().with_oracle(Box::new(BiquadOracle::default())),
        ),
    ]
}

/// Oracle that only knows peaking bands
struct PeakingOnlyOracle;

impl FilterResponseOracle for PeakingOnlyOracle {
    fn evaluate(
        &self,
        kind: BandKind,
        frequency: f64,
        q: f64,
        gain_db: f64,
        query: &[f64],
    ) -> Result<Vec<f64>, OracleError> {
        if kind != BandKind::Peaking {
            return Err(OracleError::Unavailable("peaking only".into()));
        }
        BiquadOracle::default().evaluate(kind, frequency, q, gain_db, query)
    }
}

// ============================================================================
// SCENARIOS
// ============================================================================

#[test]
fn test_empty_model_is_flat() {
    for (name, model) in models() {
        assert_eq!(model.response_at(&[], 1000.0), 0.0, "{name}");
        let curve = model.compute(EqVariant::Parametric, &[], None, &CurveSettings::default());
        assert_eq!(curve.len(), 500);
        assert!(curve.iter().all(|s| s.magnitude == 0.0), "{name}");
    }
}

#[test]
fn test_single_peaking_band() {
    for (name, model) in models() {
        let bands = [band(1, BandKind::Peaking, 1000.0, 6.0, 1.0)];
        let center = model.response_at(&bands, 1000.0);
        assert_abs_diff_eq!(center, 6.0, epsilon = 0.1);

        // Decays monotonically away from the center on both sides
        let above: Vec<f64> = [1000.0, 2000.0, 4000.0, 16000.0]
            .iter()
            .map(|&f| model.response_at(&bands, f))
            .collect();
        assert!(above.windows(2).all(|w| w[0] > w[1]), "{name}: {above:?}");
        let below: Vec<f64> = [1000.0, 500.0, 250.0, 30.0]
            .iter()
            .map(|&f| model.response_at(&bands, f))
            .collect();
        assert!(below.windows(2).all(|w| w[0] > w[1]), "{name}: {below:?}");
        assert!(model.response_at(&bands, 20.0).abs() < 0.3, "{name}");
    }
}

#[test]
fn test_two_separated_bands() {
    for (name, model) in models() {
        let bands = [
            band(1, BandKind::Peaking, 200.0, 3.0, 1.0),
            band(2, BandKind::Peaking, 5000.0, -3.0, 1.0),
        ];
        assert_abs_diff_eq!(model.response_at(&bands, 200.0), 3.0, epsilon = 0.25);
        assert_abs_diff_eq!(model.response_at(&bands, 5000.0), -3.0, epsilon = 0.25);
        let mid = model.response_at(&bands, 1000.0);
        assert!(mid.abs() < 0.25, "{name}: {mid}");
    }
}

// ============================================================================
// PROPERTIES
// ============================================================================

#[test]
fn test_superposition() {
    let bands = [
        band(1, BandKind::Peaking, 120.0, 4.0, 0.8),
        band(2, BandKind::LowShelf, 90.0, -2.5, 0.7),
        band(3, BandKind::HighShelf, 8000.0, 3.0, 0.7),
        band(4, BandKind::Notch, 3150.0, 0.0, 4.0),
        band(5, BandKind::HighPass, 30.0, 0.0, 0.7),
    ];
    for (name, model) in models() {
        let combined = model.compute(EqVariant::Parametric, &bands, None, &CurveSettings::default());
        let isolated: Vec<Vec<f64>> = bands.iter().map(|b| model.isolated_response(b)).collect();
        for (i, sample) in combined.iter().enumerate() {
            let sum: f64 = isolated.iter().map(|r| r[i]).sum();
            assert_abs_diff_eq!(sample.magnitude, sum, epsilon = 1e-9);
        }
        assert!(combined.iter().all(|s| s.magnitude.is_finite()), "{name}");
    }
}

#[test]
fn test_oracle_failure_only_affects_that_band() {
    init_logging();
    let model = ResponseModel::default().with_oracle(Box::new(PeakingOnlyOracle));
    let exact = ResponseModel::default().with_oracle(Box::new(BiquadOracle::default()));
    let analytic = ResponseModel::default();

    let bell = band(1, BandKind::Peaking, 1000.0, 6.0, 2.0);
    let shelf = band(2, BandKind::LowShelf, 150.0, 4.0, 0.7);

    assert_eq!(model.isolated_response(&bell), exact.isolated_response(&bell));
    assert_eq!(model.isolated_response(&shelf), analytic.isolated_response(&shelf));
}

#[test]
fn test_grid_respects_range() {
    let model = ResponseModel::new(FrequencyRange::new(50.0, 5000.0), 64);
    assert_eq!(model.grid().len(), 64);
    assert_abs_diff_eq!(model.grid()[0], 50.0, epsilon = 1e-9);
    assert_eq!(model.grid()[63], 5000.0);
}

// ============================================================================
// POINT VARIANTS
// ============================================================================

#[test]
fn test_point_interpolation_through_anchor() {
    let model = ResponseModel::default();
    let points = [
        band(1, BandKind::Point, 250.0, 6.0, 1.0),
        band(2, BandKind::Point, 4000.0, -6.0, 1.0),
    ];
    let anchor = Some(ControlPoint::new(1000.0, 0.0));
    let curve = CurveSettings::default();
    let samples = model.compute(EqVariant::Points, &points, anchor, &curve);

    for sample in samples.iter() {
        if sample.frequency <= 250.0 {
            assert_eq!(sample.magnitude, 6.0);
        } else if sample.frequency >= 4000.0 {
            assert_eq!(sample.magnitude, -6.0);
        } else {
            assert!(sample.magnitude <= 6.0 && sample.magnitude >= -6.0);
        }
    }
    assert_abs_diff_eq!(model.value_at(EqVariant::Points, &points, anchor, &curve, 1000.0), 0.0);
    assert_abs_diff_eq!(
        model.value_at(EqVariant::Points, &points, anchor, &curve, 500.0),
        3.0,
        epsilon = 1e-9
    );
}

#[test]
fn test_curve_shape_bends_segments() {
    let model = ResponseModel::default();
    let points = [
        band(1, BandKind::Point, 100.0, 0.0, 1.0),
        band(2, BandKind::Point, 10000.0, 12.0, 1.0),
    ];
    let linear = model.value_at(EqVariant::Curve, &points, None, &CurveSettings::new(0.5, None), 1000.0);
    let concave = model.value_at(EqVariant::Curve, &points, None, &CurveSettings::new(0.0, None), 1000.0);
    let convex = model.value_at(EqVariant::Curve, &points, None, &CurveSettings::new(1.0, None), 1000.0);

    assert_abs_diff_eq!(linear, 6.0, epsilon = 1e-9);
    assert_abs_diff_eq!(concave, 12.0 * 0.5_f64.powi(3), epsilon = 1e-9);
    assert_abs_diff_eq!(convex, 12.0 * 0.5_f64.powf(1.0 / 3.0), epsilon = 1e-9);
}

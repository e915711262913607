//! ce-dsp: Frequency-response synthesis for the Contour EQ editor
//!
//! - RBJ biquad coefficients evaluated on the unit circle
//! - `FilterResponseOracle` seam with a biquad reference implementation
//! - Analytic per-band approximations used when no oracle answers
//! - Log-frequency interpolation for the point-based variants
//! - `ResponseModel`, which turns an entity list into a plottable curve

pub mod analytic;
pub mod biquad;
pub mod interpolate;
pub mod oracle;
pub mod response;

pub use biquad::BiquadCoeffs;
pub use interpolate::ControlPoint;
pub use oracle::{BiquadOracle, FilterResponseOracle, OracleError};
pub use response::{ResponseCurve, ResponseModel, ResponseSample, log_grid};

//! Least-squares polynomial fitting
//!
//! The abscissa is centred and scaled before building the normal equations, so a fit over
//! engine speeds in the thousands of RPM stays well conditioned for the usual low orders.

use crate::core::error::{SimError, SimResult};
use ndarray::*;

/// Polynomial `p(x) = Σ c_i·((x - shift)/scale)^i`, coefficients in ascending power.
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial {
    coeffs: Array1<f64>,
    shift: f64,
    scale: f64,
}

impl Polynomial {
    pub fn order(&self) -> usize {
        self.coeffs.len() - 1
    }

    /// Evaluates the polynomial with Horner's scheme.
    pub fn eval(&self, x: f64) -> f64 {
        let t = (x - self.shift) / self.scale;
        self.coeffs.iter().rev().fold(0.0, |acc, c| acc * t + c)
    }
}

/// Fits a polynomial of degree `order` through `(x, y)` in the least-squares sense.
///
/// With exactly `order + 1` distinct points the polynomial interpolates them.
pub fn polyfit(x: &[f64], y: &[f64], order: usize) -> SimResult<Polynomial> {
    if x.len() != y.len() {
        return Err(SimError::Calibration(format!(
            "abscissa and ordinate lengths differ: {} != {}",
            x.len(),
            y.len()
        )));
    }
    let required = order + 1;
    if x.len() < required {
        return Err(SimError::InsufficientCalibrationData {
            points: x.len(),
            required,
        });
    }
    if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
        return Err(SimError::Calibration("calibration points must be finite".to_string()));
    }

    let n = x.len() as f64;
    let shift = x.iter().sum::<f64>() / n;
    let spread = x.iter().map(|v| (v - shift).abs()).fold(0.0, f64::max);
    let scale = if spread > 0.0 { spread } else { 1.0 };

    // Vandermonde matrix in the scaled abscissa
    let mut vander = Array2::<f64>::zeros((x.len(), required));
    for (i, xi) in x.iter().enumerate() {
        let t = (xi - shift) / scale;
        let mut power = 1.0;
        for j in 0..required {
            vander[[i, j]] = power;
            power *= t;
        }
    }
    let rhs = Array1::from(y.to_vec());
    let normal = vander.t().dot(&vander);
    let projected = vander.t().dot(&rhs);

    let coeffs = solve(normal, projected).ok_or_else(|| {
        SimError::Calibration(format!(
            "singular fit of order {}: calibration speeds are not distinct enough",
            order
        ))
    })?;
    Ok(Polynomial {
        coeffs,
        shift,
        scale,
    })
}

/// Fits and evaluates in one call.
pub fn get_mapped_value(x: &[f64], y: &[f64], order: usize, value: f64) -> SimResult<f64> {
    Ok(polyfit(x, y, order)?.eval(value))
}

/// Gaussian elimination with partial pivoting. Returns `None` for a singular system.
fn solve(mut a: Array2<f64>, mut b: Array1<f64>) -> Option<Array1<f64>> {
    let n = b.len();
    let norm = a.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    let tol = 1e-12 * norm.max(1.0);
    for col in 0..n {
        let pivot = (col..n).max_by(|&i, &j| {
            a[[i, col]]
                .abs()
                .partial_cmp(&a[[j, col]].abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })?;
        if a[[pivot, col]].abs() <= tol {
            return None;
        }
        if pivot != col {
            for k in 0..n {
                a.swap([pivot, k], [col, k]);
            }
            b.swap(pivot, col);
        }
        for row in (col + 1)..n {
            let factor = a[[row, col]] / a[[col, col]];
            for k in col..n {
                a[[row, k]] -= factor * a[[col, k]];
            }
            b[row] -= factor * b[col];
        }
    }
    let mut x = Array1::<f64>::zeros(n);
    for row in (0..n).rev() {
        let mut sum = b[row];
        for k in (row + 1)..n {
            sum -= a[[row, k]] * x[k];
        }
        x[row] = sum / a[[row, row]];
    }
    Some(x)
}

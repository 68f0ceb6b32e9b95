use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid geometry at {angle:.2} CA deg: crank/rod ratio {ratio} gives a negative square root argument")]
    InvalidGeometry { angle: f64, ratio: f64 },

    #[error("Insufficient calibration data: {points} points given, {required} required")]
    InsufficientCalibrationData { points: usize, required: usize },

    #[error("Calibration error: {0}")]
    Calibration(String),

    #[error("Non-physical {quantity} = {value} at {angle:.2} CA deg")]
    NonPhysicalState {
        angle: f64,
        quantity: &'static str,
        value: f64,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SimResult<T> = Result<T, SimError>;

/// Returns `Err(SimError::Config)` unless `value` is finite and strictly positive.
pub(crate) fn ensure_positive(name: &str, value: f64) -> SimResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimError::Config(format!("{} must be a positive value, got {}", name, value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_check_rejects_zero_negative_and_nan() {
        assert!(ensure_positive("bore", 0.07).is_ok());
        assert!(ensure_positive("bore", 0.0).is_err());
        assert!(ensure_positive("bore", -1.0).is_err());
        assert!(ensure_positive("bore", f64::NAN).is_err());
    }

    #[test]
    fn non_physical_state_reports_angle() {
        let err = SimError::NonPhysicalState {
            angle: 361.5,
            quantity: "pressure",
            value: -12.0,
        };
        let msg = err.to_string();
        assert!(msg.contains("pressure"));
        assert!(msg.contains("361.50"));
    }
}

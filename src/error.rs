use thiserror::Error;

/// Errors that can occur while setting up or running a fixed-step integration.
#[derive(Debug, Error)]
pub enum OdeErrors {
    #[error("invalid time span: start ({t0}) must be less than end ({tf})")]
    InvalidTspan { t0: f64, tf: f64 },
    #[error("invalid step size: dt ({dt}) must be positive and finite")]
    InvalidStep { dt: f64 },
    #[error("derivative is not finite at t = {t}")]
    NonFiniteDerivative { t: f64 },
    #[error("model error: {0}")]
    Model(String),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

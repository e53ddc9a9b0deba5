use thiserror::Error;

/// Failure modes of the calibration engine.
///
/// The first three variants are the engine's own failure kinds; the rest wrap
/// failures of the on-disk ingestion layer. Every error is raised eagerly at
/// the boundary of the component that would otherwise divide by zero or fit
/// an underdetermined model, and none is retried.
#[derive(Debug, Error)]
pub enum Error {
    /// A physical or sensor constant on which the conversion formulas are
    /// undefined.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The sample collection cannot determine a regression line.
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    /// A derived quantity would require dividing by zero.
    #[error("division by zero: {0}")]
    DivisionByZero(String),

    /// The height and count columns are not aligned.
    #[error("mismatched sample columns: {heights} heights, {counts} counts")]
    MismatchedColumns { heights: usize, counts: usize },

    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse sample file: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to parse configuration: {0}")]
    Config(#[from] toml::de::Error),
}

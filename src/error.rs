use thiserror::Error;

/// Failures specific to crash-table loading and analysis.
///
/// I/O and parse failures travel as [`anyhow::Error`] with context; these are
/// the conditions the analysis itself detects.
#[derive(Debug, Error)]
pub enum CrashDataError {
    #[error("missing required column '{0}'")]
    MissingColumn(String),

    #[error("no rows flagged for {0}; severity percentages are undefined")]
    EmptySubset(&'static str),
}

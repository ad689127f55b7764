//! Typed failures for the characterization pipeline.
//!
//! Every stage fails fast with one of these variants; the job layer only
//! cleans up the working directory and attaches diagnostics before
//! propagating. No variant is ever swallowed or replaced by a fallback
//! numeric result.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum BenchError {
    /// A bundled symbol artifact is missing from the embedded resource set.
    /// Packaging defect; never retried.
    #[error("bundled dependency not found: {0}")]
    MissingDependency(String),

    /// The external simulator failed to translate the schematic into a
    /// netlist, or the expected netlist file never appeared.
    #[error("netlist compilation failed: {0}")]
    Compilation(String),

    /// The simulator run produced no usable waveform file. Carries the
    /// simulator log verbatim for diagnostics.
    #[error("simulation produced no output: {reason}")]
    SimulationFailed { reason: String, log: String },

    /// None of the candidate trace spellings matched the waveform file.
    #[error("trace not found for {signal}; tried: {}", .attempted.join(", "))]
    TraceNotFound {
        signal: String,
        attempted: Vec<String>,
    },

    /// The waveform file violates its own format contract, or a sample
    /// could not be coerced to a finite float.
    #[error("malformed waveform data: {0}")]
    MalformedWaveform(String),

    /// The drain-current samples are not monotonic inside the search
    /// window, so interpolation would pick an arbitrary crossing.
    #[error("non-monotonic device data: {0}")]
    NonMonotonicData(String),

    /// The reference current never crosses the sampled Id range.
    #[error(
        "reference current {reference:.3e} A outside sampled range [{low:.3e}, {high:.3e}]"
    )]
    TargetCurrentOutOfRange {
        reference: f64,
        low: f64,
        high: f64,
    },

    /// Cooperative cancellation observed between pipeline stages.
    #[error("job cancelled")]
    Cancelled,

    /// The schematic template violates its placeholder invariant.
    #[error("invalid schematic template: {0}")]
    Template(String),

    /// Model record rejected before any simulator invocation.
    #[error(transparent)]
    InvalidModel(#[from] bench_models::ModelError),

    #[error("{context} ({}): {source}", .path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BenchError {
    pub(crate) fn io(context: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            context,
            path: path.into(),
            source,
        }
    }

    /// Single-string rendering for reports, keeping the attached simulator
    /// log when one exists.
    pub fn diagnostic(&self) -> String {
        match self {
            BenchError::SimulationFailed { reason, log } if !log.is_empty() => {
                format!("{}; simulator log:\n{}", reason, log)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BenchError>;

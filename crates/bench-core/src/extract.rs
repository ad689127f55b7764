//! Fixed-current threshold extraction over Id(Vgs) samples.
//!
//! The threshold is the gate voltage at which drain current crosses the
//! reference current, found by linear interpolation inside the first
//! crossing segment. Conduction onset is physically monotonic, so the
//! samples from the sweep start through the crossing must be strictly
//! increasing; anything else is treated as invalid device data rather than
//! smoothed over. Later crossings are convergence noise and are ignored.

use serde::Serialize;

use crate::error::{BenchError, Result};
use crate::raw::RawFile;
use crate::traces::ResolvedTrace;

/// Trace spellings that were actually matched for one extraction.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedNames {
    pub gate_voltage: String,
    pub drain_current: String,
}

/// Outcome of one characterization. Immutable once returned.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    /// Threshold at the report step.
    pub threshold_voltage: f64,
    /// One threshold per sweep step, in step order.
    pub per_step: Vec<f64>,
    /// Which step supplied `threshold_voltage`.
    pub report_step: usize,
    pub resolved_traces: ResolvedNames,
}

/// Threshold of a single step's samples.
///
/// `vgs` and `id` must be equal-length, finite, with `vgs` strictly
/// increasing (it is the sweep axis) and `id` strictly increasing from the
/// first sample through the crossing segment.
pub fn threshold_from_samples(vgs: &[f64], id: &[f64], reference_current: f64) -> Result<f64> {
    if vgs.len() != id.len() {
        return Err(BenchError::MalformedWaveform(format!(
            "voltage and current traces differ in length ({} vs {})",
            vgs.len(),
            id.len()
        )));
    }
    if vgs.len() < 2 {
        return Err(BenchError::MalformedWaveform(format!(
            "{} samples are not enough to interpolate",
            vgs.len()
        )));
    }
    if !reference_current.is_finite() || reference_current <= 0.0 {
        return Err(BenchError::MalformedWaveform(format!(
            "reference current must be a positive finite value, got {}",
            reference_current
        )));
    }
    for &v in vgs.iter().chain(id.iter()) {
        if !v.is_finite() {
            return Err(BenchError::MalformedWaveform(
                "non-finite sample in input traces".to_string(),
            ));
        }
    }
    for w in vgs.windows(2) {
        if w[1] <= w[0] {
            return Err(BenchError::NonMonotonicData(format!(
                "gate-voltage axis not strictly increasing at {} -> {}",
                w[0], w[1]
            )));
        }
    }

    if id[0] >= reference_current {
        return Err(BenchError::TargetCurrentOutOfRange {
            reference: reference_current,
            low: id[0],
            high: id[id.len() - 1],
        });
    }

    // First crossing in increasing-voltage order.
    let crossing = id
        .windows(2)
        .position(|w| w[0] < reference_current && w[1] >= reference_current);
    let Some(c) = crossing else {
        let high = id.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        return Err(BenchError::TargetCurrentOutOfRange {
            reference: reference_current,
            low: id[0],
            high,
        });
    };

    // The window from the sweep start through the crossing segment must be
    // strictly increasing, or interpolation would pick an arbitrary point.
    for (i, w) in id[..=c + 1].windows(2).enumerate() {
        if w[1] <= w[0] {
            return Err(BenchError::NonMonotonicData(format!(
                "drain current not strictly increasing at sample {} ({} -> {})",
                i, w[0], w[1]
            )));
        }
    }

    let frac = (reference_current - id[c]) / (id[c + 1] - id[c]);
    Ok(vgs[c] + frac * (vgs[c + 1] - vgs[c]))
}

/// Per-step thresholds, preserving step order. Aggregation across steps is
/// the caller's concern.
pub fn thresholds_per_step(
    raw: &RawFile,
    vgs: &ResolvedTrace<'_>,
    id: &ResolvedTrace<'_>,
    reference_current: f64,
) -> Result<Vec<f64>> {
    let steps = raw.step_count();
    let mut out = Vec::with_capacity(steps);
    for step in 0..steps {
        let vgs_samples = raw.step_slice(vgs.trace, step)?;
        let id_samples = raw.step_slice(id.trace, step)?;
        out.push(threshold_from_samples(
            vgs_samples,
            id_samples,
            reference_current,
        )?);
    }
    Ok(out)
}

//! Trace resolution: mapping logical signals onto the trace names the
//! waveform file actually contains.
//!
//! Model libraries disagree on pin spelling and the simulator renames the
//! DUT between stages, so each logical signal gets an ordered list of
//! candidate spellings, evaluated in priority order. Silent fallback to a
//! wrong trace would corrupt the extracted parameter, so exhausting the
//! list is a hard failure that names every attempted candidate.

use bench_models::{ModelRecord, PinRole};

use crate::error::{BenchError, Result};
use crate::naming::{transform_instance_name, InstanceNames};
use crate::raw::{RawFile, Trace};
use crate::template::{DUT_INSTANCE, GATE_NET};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalSignal {
    DrainCurrent,
    GateVoltage,
}

impl LogicalSignal {
    fn describe(self) -> &'static str {
        match self {
            LogicalSignal::DrainCurrent => "drain current of the device under test",
            LogicalSignal::GateVoltage => "gate-source voltage",
        }
    }
}

/// A successfully matched trace: the spelling that hit plus the trace.
#[derive(Debug)]
pub struct ResolvedTrace<'a> {
    pub name: String,
    pub trace: &'a Trace,
}

pub struct TraceResolver<'a> {
    raw: &'a RawFile,
    model: &'a ModelRecord,
    dut: InstanceNames,
}

impl<'a> TraceResolver<'a> {
    pub fn new(raw: &'a RawFile, model: &'a ModelRecord) -> Self {
        Self {
            raw,
            model,
            dut: transform_instance_name(DUT_INSTANCE),
        }
    }

    /// Candidate spellings for `signal`, highest priority first.
    pub fn candidates(&self, signal: LogicalSignal) -> Vec<String> {
        let wf = &self.dut.waveform;
        match signal {
            LogicalSignal::DrainCurrent => {
                let mut out = Vec::new();
                for pin in self.model.pin_candidates(PinRole::Drain) {
                    out.push(format!("Ix({}:{})", wf, pin));
                }
                out.push(format!("Id({})", wf));
                // Fallback for libraries modeling the device as a bare M card.
                out.push("Id(m1)".to_string());
                out
            }
            LogicalSignal::GateVoltage => {
                let mut out = vec![format!("V({})", GATE_NET)];
                for pin in self.model.pin_candidates(PinRole::Gate) {
                    out.push(format!("Vx({}:{})", wf, pin));
                }
                out
            }
        }
    }

    /// First candidate present in the waveform wins.
    pub fn resolve(&self, signal: LogicalSignal) -> Result<ResolvedTrace<'a>> {
        let candidates = self.candidates(signal);
        for candidate in &candidates {
            if let Some(trace) = self.raw.trace(candidate) {
                return Ok(ResolvedTrace {
                    name: trace.name.clone(),
                    trace,
                });
            }
        }
        Err(BenchError::TraceNotFound {
            signal: signal.describe().to_string(),
            attempted: candidates,
        })
    }
}

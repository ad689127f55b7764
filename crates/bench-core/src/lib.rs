//! MOSFET characterization pipeline.
//!
//! Drives an external circuit simulator through a fixed
//! schematic→netlist→run→waveform flow and extracts a threshold-voltage
//! figure from the resulting traces:
//!
//! 1. [`provision`] places the template's symbol artifacts in the job's
//!    working directory.
//! 2. [`spice::Simulator::compile_schematic`] translates the schematic to a
//!    flat netlist (delegated to the tool; only it applies the
//!    topology-to-netlist transform correctly).
//! 3. [`netlist::NetlistDoc`] injects the model reference and the sweep
//!    directives.
//! 4. [`spice::Simulator::run_netlist`] executes the netlist; success is
//!    inferred from the waveform artifact, not the exit code.
//! 5. [`raw::RawFile`] parses the waveform, [`traces::TraceResolver`] maps
//!    logical signals onto its trace names, and [`extract`] computes one
//!    threshold per sweep step.
//!
//! [`job::CharacterizationJob`] sequences the stages and owns the working
//! directory.

pub mod analysis;
pub mod error;
pub mod extract;
pub mod job;
pub mod naming;
pub mod netlist;
pub mod provision;
pub mod raw;
pub mod spice;
pub mod template;
pub mod traces;

pub use analysis::{GateSweep, SweepPlan, TemperatureStep};
pub use error::{BenchError, Result};
pub use extract::ExtractionResult;
pub use job::{CancelToken, CharacterizationJob, JobConfig};
pub use spice::{RunArtifacts, Simulator, SpiceCli};
pub use template::SchematicTemplate;

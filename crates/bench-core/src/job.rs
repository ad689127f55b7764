//! One characterization job: the sequential pipeline from schematic
//! template to extracted threshold values.
//!
//! A job owns its working directory for its whole lifetime. Stages run
//! strictly in order, each confirming the previous stage's artifact before
//! starting; cancellation is cooperative and only observed between stages
//! because the external tool has no interrupt hook. Concurrent jobs are
//! fine as long as every job gets its own working directory; the simulator
//! writes fixed-name outputs into whatever directory it runs in.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{info, info_span, warn};

use bench_models::ModelRecord;

use crate::analysis::SweepPlan;
use crate::error::{BenchError, Result};
use crate::extract::{self, ExtractionResult, ResolvedNames};
use crate::naming::transform_instance_name;
use crate::netlist::NetlistDoc;
use crate::provision;
use crate::raw::RawFile;
use crate::spice::Simulator;
use crate::template::{SchematicTemplate, DUT_INSTANCE};
use crate::traces::{LogicalSignal, TraceResolver};

static NEXT_JOB_ID: AtomicU64 = AtomicU64::new(1);

/// Cooperative cancellation flag, checked between pipeline stages.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(BenchError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct JobConfig {
    /// Retain the working directory (netlist, waveform, log) for debugging.
    pub keep_artifacts: bool,
    /// Run in this directory instead of a fresh temporary one. The caller
    /// must guarantee no other job shares it.
    pub workdir: Option<PathBuf>,
}

enum WorkDir {
    Temp(tempfile::TempDir),
    Fixed(PathBuf),
}

impl WorkDir {
    fn acquire(config: &JobConfig) -> Result<Self> {
        match &config.workdir {
            Some(dir) => {
                std::fs::create_dir_all(dir)
                    .map_err(|err| BenchError::io("create working directory", dir, err))?;
                Ok(WorkDir::Fixed(dir.clone()))
            }
            None => {
                let temp = tempfile::Builder::new()
                    .prefix("mosbench-job-")
                    .tempdir()
                    .map_err(|err| {
                        BenchError::io("create working directory", std::env::temp_dir(), err)
                    })?;
                Ok(WorkDir::Temp(temp))
            }
        }
    }

    fn path(&self) -> &Path {
        match self {
            WorkDir::Temp(dir) => dir.path(),
            WorkDir::Fixed(path) => path,
        }
    }

    fn finish(self, keep_artifacts: bool) {
        match self {
            WorkDir::Temp(dir) => {
                if keep_artifacts {
                    let retained = dir.keep();
                    info!(dir = %retained.display(), "artifacts retained");
                } else if let Err(err) = dir.close() {
                    warn!(error = %err, "working directory cleanup failed");
                }
            }
            WorkDir::Fixed(path) => {
                if keep_artifacts {
                    info!(dir = %path.display(), "artifacts retained");
                } else if let Err(err) = std::fs::remove_dir_all(&path) {
                    warn!(dir = %path.display(), error = %err, "working directory cleanup failed");
                }
            }
        }
    }
}

#[derive(Debug)]
pub struct CharacterizationJob {
    template: SchematicTemplate,
    model: ModelRecord,
    plan: SweepPlan,
    config: JobConfig,
}

impl CharacterizationJob {
    /// Validates the model record and template before anything touches the
    /// filesystem or the simulator.
    pub fn new(
        template: SchematicTemplate,
        model: ModelRecord,
        plan: SweepPlan,
        config: JobConfig,
    ) -> Result<Self> {
        template.validate()?;
        model.validate()?;
        Ok(Self {
            template,
            model,
            plan,
            config,
        })
    }

    pub fn model(&self) -> &ModelRecord {
        &self.model
    }

    /// Run the pipeline to completion. The working directory is purged on
    /// every exit path unless artifact retention was requested.
    pub fn run(&self, simulator: &dyn Simulator, cancel: &CancelToken) -> Result<ExtractionResult> {
        let job_id = NEXT_JOB_ID.fetch_add(1, Ordering::Relaxed);
        let span = info_span!("job", id = job_id, model = %self.model.name);
        let _guard = span.enter();

        let workdir = WorkDir::acquire(&self.config)?;
        info!(dir = %workdir.path().display(), "starting characterization");
        let result = self.run_stages(simulator, cancel, workdir.path());
        if let Err(err) = &result {
            warn!(error = %err, "characterization failed");
        }
        workdir.finish(self.config.keep_artifacts);
        result
    }

    fn run_stages(
        &self,
        simulator: &dyn Simulator,
        cancel: &CancelToken,
        dir: &Path,
    ) -> Result<ExtractionResult> {
        cancel.check()?;
        provision::provision(dir, self.template.symbols())?;
        let schematic = self.template.write_to(dir)?;

        cancel.check()?;
        let netlist_path = simulator.compile_schematic(&schematic)?;

        cancel.check()?;
        let dut = transform_instance_name(DUT_INSTANCE);
        let mut doc = NetlistDoc::open(netlist_path)?;
        doc.set_model_reference(&dut.netlist, &self.model.name)?;
        doc.add_directives(self.plan.directives(&self.model.library_path));
        let edited = doc.save()?;

        cancel.check()?;
        let artifacts = simulator.run_netlist(&edited)?;

        cancel.check()?;
        let raw = RawFile::open(&artifacts.raw)?;
        info!(
            traces = raw.trace_names().len(),
            steps = raw.step_count(),
            points = raw.points,
            "waveform loaded"
        );

        let resolver = TraceResolver::new(&raw, &self.model);
        let vgs = resolver.resolve(LogicalSignal::GateVoltage)?;
        let id = resolver.resolve(LogicalSignal::DrainCurrent)?;
        info!(vgs = %vgs.name, id = %id.name, "traces resolved");

        let per_step =
            extract::thresholds_per_step(&raw, &vgs, &id, self.plan.reference_current)?;
        let report_step = self.plan.report_step(per_step.len());
        let threshold_voltage = per_step.get(report_step).copied().ok_or_else(|| {
            BenchError::MalformedWaveform("waveform contains no sweep steps".to_string())
        })?;
        info!(vth = threshold_voltage, steps = per_step.len(), "threshold extracted");

        Ok(ExtractionResult {
            threshold_voltage,
            per_step,
            report_step,
            resolved_traces: ResolvedNames {
                gate_voltage: vgs.name,
                drain_current: id.name,
            },
        })
    }
}

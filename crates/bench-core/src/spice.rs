//! The external simulator boundary.
//!
//! Two invocation modes are consumed: schematic-to-netlist translation and
//! batch execution of an edited netlist. The tool exposes no reliable exit
//! code contract, so both modes infer success from the presence of the
//! expected output artifact. Everything else about the tool is opaque.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::error::{BenchError, Result};

/// Output artifacts of one batch run.
#[derive(Debug, Clone)]
pub struct RunArtifacts {
    pub raw: PathBuf,
    pub log: PathBuf,
}

/// Opaque simulator boundary. Tests substitute scripted implementations;
/// production uses [`SpiceCli`].
pub trait Simulator: Send + Sync {
    /// Translate a schematic into a flat netlist, returning the netlist path.
    /// The schematic's symbol dependencies must already sit in its directory.
    fn compile_schematic(&self, schematic: &Path) -> Result<PathBuf>;

    /// Execute an edited netlist, returning the waveform and log paths.
    fn run_netlist(&self, netlist: &Path) -> Result<RunArtifacts>;
}

/// Drives the simulator executable as a subprocess.
#[derive(Debug, Clone)]
pub struct SpiceCli {
    executable: PathBuf,
    timeout: Duration,
}

impl SpiceCli {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            timeout: Duration::from_secs(300),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn invoke(&self, args: &[&Path], workdir: &Path) -> Result<bool> {
        let mut cmd = Command::new(&self.executable);
        cmd.args(args)
            .current_dir(workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        debug!(exe = %self.executable.display(), ?args, "invoking simulator");
        let mut child = cmd
            .spawn()
            .map_err(|err| BenchError::io("spawn simulator", &self.executable, err))?;

        let deadline = Instant::now() + self.timeout;
        loop {
            match child
                .try_wait()
                .map_err(|err| BenchError::io("wait for simulator", &self.executable, err))?
            {
                Some(_status) => return Ok(true),
                None if Instant::now() >= deadline => {
                    warn!(timeout = ?self.timeout, "simulator exceeded timeout, killing");
                    child.kill().ok();
                    child.wait().ok();
                    return Ok(false);
                }
                None => std::thread::sleep(Duration::from_millis(25)),
            }
        }
    }
}

fn file_non_empty(path: &Path) -> bool {
    std::fs::metadata(path).map(|m| m.len() > 0).unwrap_or(false)
}

fn read_log(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap_or_default()
}

impl Simulator for SpiceCli {
    fn compile_schematic(&self, schematic: &Path) -> Result<PathBuf> {
        let workdir = schematic
            .parent()
            .ok_or_else(|| BenchError::Compilation("schematic has no parent directory".into()))?;
        let netlist = schematic.with_extension("net");
        // Stale output from an earlier attempt would defeat the
        // presence-based success check.
        std::fs::remove_file(&netlist).ok();

        let netlist_flag = Path::new("-netlist");
        let completed = self.invoke(&[netlist_flag, schematic], workdir)?;
        if !completed {
            return Err(BenchError::Compilation(format!(
                "netlisting timed out after {:?}",
                self.timeout
            )));
        }
        if !file_non_empty(&netlist) {
            return Err(BenchError::Compilation(format!(
                "simulator produced no netlist at {}",
                netlist.display()
            )));
        }
        info!(netlist = %netlist.display(), "schematic compiled");
        Ok(netlist)
    }

    fn run_netlist(&self, netlist: &Path) -> Result<RunArtifacts> {
        let workdir = netlist
            .parent()
            .ok_or_else(|| BenchError::Compilation("netlist has no parent directory".into()))?;
        let raw = netlist.with_extension("raw");
        let log = netlist.with_extension("log");
        std::fs::remove_file(&raw).ok();

        let batch_flag = Path::new("-b");
        let completed = self.invoke(&[batch_flag, netlist], workdir)?;
        if !completed {
            return Err(BenchError::SimulationFailed {
                reason: format!("run timed out after {:?}", self.timeout),
                log: read_log(&log),
            });
        }
        if !file_non_empty(&raw) {
            return Err(BenchError::SimulationFailed {
                reason: format!("no waveform file at {}", raw.display()),
                log: read_log(&log),
            });
        }
        info!(raw = %raw.display(), "simulation run complete");
        Ok(RunArtifacts { raw, log })
    }
}

//! Schematic template store.
//!
//! The characterization circuit is a fixed diode-connected topology kept as
//! a schematic text blob with two placeholder slots. The template itself is
//! never edited: the simulator's netlisting step carries the placeholders
//! into the compiled netlist, where the netlist editor substitutes the real
//! model reference and appends the `.lib` include.

use std::path::{Path, PathBuf};

use crate::error::{BenchError, Result};

/// Placeholder slot for the device model's subcircuit name.
pub const MODEL_NAME_SLOT: &str = "{MODEL_NAME}";
/// Placeholder slot for the model library's absolute path.
pub const MODEL_PATH_SLOT: &str = "{MODEL_PATH}";
/// Schematic-stage name of the device under test. Fixed by contract so the
/// netlist and waveform renames stay deterministic.
pub const DUT_INSTANCE: &str = "U1";
/// Net label of the tied gate/drain node in the bundled topology.
pub const GATE_NET: &str = "v_g_d";

const VTH_TEMPLATE: &str = include_str!("../assets/vth_test.asc");
const VTH_TEMPLATE_FILE: &str = "vth_test.asc";

/// Symbol artifacts the bundled template depends on; provisioned into the
/// working directory before netlisting (the simulator resolves symbols by
/// directory proximity).
pub const VTH_TEMPLATE_SYMBOLS: &[&str] = &["generic_nmos.asy"];

#[derive(Debug, Clone)]
pub struct SchematicTemplate {
    text: String,
    file_name: String,
    symbols: Vec<&'static str>,
}

impl SchematicTemplate {
    /// The bundled threshold-voltage test circuit.
    pub fn vth_test() -> Self {
        Self {
            text: VTH_TEMPLATE.to_string(),
            file_name: VTH_TEMPLATE_FILE.to_string(),
            symbols: VTH_TEMPLATE_SYMBOLS.to_vec(),
        }
    }

    /// Build a template from caller-supplied schematic text, enforcing the
    /// placeholder invariant: both slots present exactly once, and the DUT
    /// instance declared.
    pub fn from_text(text: impl Into<String>, file_name: impl Into<String>) -> Result<Self> {
        let template = Self {
            text: text.into(),
            file_name: file_name.into(),
            symbols: Vec::new(),
        };
        template.validate()?;
        Ok(template)
    }

    /// Bundled symbol artifacts this template depends on.
    pub fn symbols(&self) -> &[&'static str] {
        &self.symbols
    }

    pub fn validate(&self) -> Result<()> {
        for slot in [MODEL_NAME_SLOT, MODEL_PATH_SLOT] {
            match self.text.matches(slot).count() {
                1 => {}
                0 => {
                    return Err(BenchError::Template(format!(
                        "placeholder {} missing",
                        slot
                    )))
                }
                n => {
                    return Err(BenchError::Template(format!(
                        "placeholder {} appears {} times, expected exactly one",
                        slot, n
                    )))
                }
            }
        }
        let dut_card = format!("InstName {}", DUT_INSTANCE);
        if !self.text.contains(&dut_card) {
            return Err(BenchError::Template(format!(
                "device instance {} not declared",
                DUT_INSTANCE
            )));
        }
        Ok(())
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Write the template, untouched, into the job's working directory.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.text)
            .map_err(|err| BenchError::io("write schematic template", &path, err))?;
        Ok(path)
    }
}

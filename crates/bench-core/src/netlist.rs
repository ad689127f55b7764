//! Line-oriented editing of the compiled netlist.
//!
//! The netlist comes back from the simulator's netlisting step with the
//! device under test carrying its netlist-stage name (see [`crate::naming`])
//! and the template placeholders still in place. The editor rewrites the
//! DUT's subcircuit reference and appends simulation directives; it does not
//! re-validate netlist syntax. Malformed directives surface later as a
//! simulation failure.

use std::path::{Path, PathBuf};

use crate::error::{BenchError, Result};

/// A compiled netlist plus the directive lines queued for injection.
/// Consumed exactly once by [`save`](NetlistDoc::save), which hands the
/// written path to the simulation runner.
#[derive(Debug)]
pub struct NetlistDoc {
    path: PathBuf,
    lines: Vec<String>,
    directives: Vec<String>,
}

impl NetlistDoc {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|err| BenchError::io("read compiled netlist", &path, err))?;
        Ok(Self {
            lines: content.lines().map(str::to_string).collect(),
            directives: Vec::new(),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rewrite the subcircuit reference on `instance`'s element card.
    ///
    /// `instance` is the netlist-stage name (prefixed, case preserved); the
    /// reference is the last bare token on the card, after any `key=value`
    /// parameters are excluded. A missing instance means the template or the
    /// provisioning step is broken, which is unrecoverable here.
    pub fn set_model_reference(&mut self, instance: &str, model: &str) -> Result<()> {
        for line in &mut self.lines {
            let mut tokens: Vec<&str> = line.split_whitespace().collect();
            match tokens.first() {
                Some(first) if *first == instance => {}
                _ => continue,
            }
            let Some(ref_idx) = tokens.iter().rposition(|t| !t.contains('=')) else {
                continue;
            };
            if ref_idx == 0 {
                return Err(BenchError::Compilation(format!(
                    "instance {} has no subcircuit reference field",
                    instance
                )));
            }
            tokens[ref_idx] = model;
            let rebuilt = tokens.join(" ");
            *line = rebuilt;
            return Ok(());
        }
        Err(BenchError::Compilation(format!(
            "instance {} not present in compiled netlist",
            instance
        )))
    }

    /// Queue simulation-control statements, preserving the given order.
    /// Later directives override earlier ones with the same effect, so the
    /// order is part of the contract.
    pub fn add_directives<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.directives.extend(lines.into_iter().map(Into::into));
    }

    pub fn directives(&self) -> &[String] {
        &self.directives
    }

    /// Current document text with queued directives spliced in ahead of the
    /// final `.end` card.
    pub fn render(&self) -> String {
        let end_idx = self
            .lines
            .iter()
            .rposition(|line| line.trim().eq_ignore_ascii_case(".end"));
        let mut out = Vec::with_capacity(self.lines.len() + self.directives.len());
        match end_idx {
            Some(idx) => {
                out.extend(self.lines[..idx].iter().cloned());
                out.extend(self.directives.iter().cloned());
                out.extend(self.lines[idx..].iter().cloned());
            }
            None => {
                out.extend(self.lines.iter().cloned());
                out.extend(self.directives.iter().cloned());
            }
        }
        let mut text = out.join("\n");
        text.push('\n');
        text
    }

    /// Write the edited netlist back and release the path to the runner.
    pub fn save(self) -> Result<PathBuf> {
        std::fs::write(&self.path, self.render())
            .map_err(|err| BenchError::io("write edited netlist", &self.path, err))?;
        Ok(self.path)
    }
}

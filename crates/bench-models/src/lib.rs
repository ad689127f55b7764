//! Model-library records for MOSFET characterization.
//!
//! A [`ModelRecord`] names a device model, the library file that defines it,
//! and the pin ordering of its subcircuit. Records are stored as a JSON array
//! on disk (see [`library::ModelLibrary`]) and consumed by the netlist editor
//! and the trace resolver.

pub mod library;
pub mod pins;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub use library::ModelLibrary;
pub use pins::{synonyms_for, PinRole};

#[derive(Debug, Clone, thiserror::Error)]
pub enum ModelError {
    #[error("model library path must be absolute: {}", .0.display())]
    RelativeLibraryPath(PathBuf),
    #[error("model {0} declares no subcircuit pins")]
    EmptyPinOrder(String),
    #[error("model name must not be empty")]
    EmptyName,
    #[error("model {0} already exists in the library")]
    DuplicateName(String),
    #[error("no .subckt definition found in {}", .0.display())]
    NoSubcktDefinition(PathBuf),
    #[error("{context}: {message}")]
    Io { context: String, message: String },
}

/// One entry of the model library.
///
/// `library_path` must be absolute: the simulator process resolves `.lib`
/// includes without any notion of the caller's working directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRecord {
    pub name: String,
    pub library_path: PathBuf,
    pub subckt_pin_order: Vec<String>,
}

impl ModelRecord {
    pub fn new(
        name: impl Into<String>,
        library_path: impl Into<PathBuf>,
        subckt_pin_order: Vec<String>,
    ) -> Result<Self, ModelError> {
        let record = Self {
            name: name.into(),
            library_path: library_path.into(),
            subckt_pin_order,
        };
        record.validate()?;
        Ok(record)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.name.is_empty() {
            return Err(ModelError::EmptyName);
        }
        if !self.library_path.is_absolute() {
            return Err(ModelError::RelativeLibraryPath(self.library_path.clone()));
        }
        if self.subckt_pin_order.is_empty() {
            return Err(ModelError::EmptyPinOrder(self.name.clone()));
        }
        Ok(())
    }

    /// Pin name declared for `role`, if the record has one.
    pub fn pin(&self, role: PinRole) -> Option<&str> {
        self.subckt_pin_order
            .iter()
            .map(String::as_str)
            .find(|pin| pins::role_of(pin) == Some(role))
    }

    /// Declared pin name for `role` followed by its remaining synonyms,
    /// deduplicated, in priority order.
    pub fn pin_candidates(&self, role: PinRole) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        if let Some(declared) = self.pin(role) {
            out.push(declared.to_string());
        }
        for syn in synonyms_for(role) {
            if !out.iter().any(|p| p.eq_ignore_ascii_case(syn)) {
                out.push((*syn).to_string());
            }
        }
        out
    }
}

/// Pull the subcircuit name out of a `.lib`/`.mod` file so a record can be
/// created from a bare file path. Returns the first `.subckt` card's name.
pub fn sniff_subckt_name(path: &Path) -> Result<String, ModelError> {
    let content = std::fs::read_to_string(path).map_err(|err| ModelError::Io {
        context: format!("read model library {}", path.display()),
        message: err.to_string(),
    })?;
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.to_ascii_lowercase().starts_with(".subckt") {
            if let Some(name) = trimmed.split_whitespace().nth(1) {
                return Ok(name.to_string());
            }
        }
    }
    Err(ModelError::NoSubcktDefinition(path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abs(path: &str) -> PathBuf {
        if cfg!(windows) {
            PathBuf::from(format!("C:{}", path))
        } else {
            PathBuf::from(path)
        }
    }

    #[test]
    fn record_rejects_relative_library_path() {
        let err = ModelRecord::new("NMOS_A", "models/a.lib", vec!["D".into()])
            .expect_err("relative path accepted");
        assert!(matches!(err, ModelError::RelativeLibraryPath(_)));
    }

    #[test]
    fn record_rejects_empty_pin_order() {
        let err = ModelRecord::new("NMOS_A", abs("/models/a.lib"), Vec::new())
            .expect_err("empty pins accepted");
        assert!(matches!(err, ModelError::EmptyPinOrder(_)));
    }

    #[test]
    fn record_finds_declared_pin_by_role() {
        let record = ModelRecord::new(
            "NMOS_A",
            abs("/models/a.lib"),
            vec!["DRAIN".into(), "GATE".into(), "SOURCE".into()],
        )
        .expect("record");
        assert_eq!(record.pin(PinRole::Drain), Some("DRAIN"));
        assert_eq!(record.pin(PinRole::Gate), Some("GATE"));
        assert_eq!(record.pin(PinRole::Bulk), None);
    }

    #[test]
    fn pin_candidates_start_with_declared_name() {
        let record = ModelRecord::new(
            "NMOS_A",
            abs("/models/a.lib"),
            vec!["D".into(), "G".into(), "S".into()],
        )
        .expect("record");
        let candidates = record.pin_candidates(PinRole::Drain);
        assert_eq!(candidates[0], "D");
        assert!(candidates.iter().any(|c| c == "DRAIN"));
        let dupes = candidates
            .iter()
            .filter(|c| c.eq_ignore_ascii_case("d"))
            .count();
        assert_eq!(dupes, 1);
    }
}

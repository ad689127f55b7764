//! On-disk model library: a JSON array of [`ModelRecord`]s.

use std::path::{Path, PathBuf};

use crate::{ModelError, ModelRecord};

#[derive(Debug, Clone, Default)]
pub struct ModelLibrary {
    records: Vec<ModelRecord>,
}

impl ModelLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let content = std::fs::read_to_string(path).map_err(|err| ModelError::Io {
            context: format!("read model library {}", path.display()),
            message: err.to_string(),
        })?;
        let records: Vec<ModelRecord> =
            serde_json::from_str(&content).map_err(|err| ModelError::Io {
                context: format!("parse model library {}", path.display()),
                message: err.to_string(),
            })?;
        for record in &records {
            record.validate()?;
        }
        Ok(Self { records })
    }

    pub fn save(&self, path: &Path) -> Result<(), ModelError> {
        let content =
            serde_json::to_string_pretty(&self.records).map_err(|err| ModelError::Io {
                context: format!("serialize model library {}", path.display()),
                message: err.to_string(),
            })?;
        std::fs::write(path, content).map_err(|err| ModelError::Io {
            context: format!("write model library {}", path.display()),
            message: err.to_string(),
        })
    }

    /// Add a record, rejecting duplicate names.
    pub fn add(&mut self, record: ModelRecord) -> Result<(), ModelError> {
        record.validate()?;
        if self.records.iter().any(|r| r.name == record.name) {
            return Err(ModelError::DuplicateName(record.name));
        }
        self.records.push(record);
        Ok(())
    }

    /// Register a model from a bare library file, sniffing the subcircuit
    /// name out of the file when no explicit name is given. Returns the
    /// resolved model name.
    pub fn add_from_file(
        &mut self,
        library_path: impl Into<PathBuf>,
        name: Option<String>,
        subckt_pin_order: Vec<String>,
    ) -> Result<String, ModelError> {
        let library_path = library_path.into();
        let name = match name {
            Some(name) => name,
            None => crate::sniff_subckt_name(&library_path)?,
        };
        self.add(ModelRecord::new(name.clone(), library_path, subckt_pin_order)?)?;
        Ok(name)
    }

    pub fn get(&self, name: &str) -> Option<&ModelRecord> {
        self.records.iter().find(|r| r.name == name)
    }

    pub fn records(&self) -> &[ModelRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

//! Dependency provisioner: places bundled symbol artifacts next to the
//! schematic before netlisting.
//!
//! The simulator resolves symbol references by directory proximity, not by
//! search path, so every symbol the template uses must sit in the working
//! directory. Assets are embedded at build time; asking for a name outside
//! the embedded set is a packaging defect and fails fast.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{BenchError, Result};

const GENERIC_NMOS_SYMBOL: &str = include_str!("../assets/generic_nmos.asy");

const BUNDLED_ASSETS: &[(&str, &str)] = &[("generic_nmos.asy", GENERIC_NMOS_SYMBOL)];

fn bundled_asset(name: &str) -> Result<&'static str> {
    BUNDLED_ASSETS
        .iter()
        .find(|(asset, _)| *asset == name)
        .map(|(_, contents)| *contents)
        .ok_or_else(|| BenchError::MissingDependency(name.to_string()))
}

/// Copy the named symbol artifacts into `dir`, creating it if absent.
///
/// Idempotent: an existing copy with identical contents is left alone; a
/// stale copy is overwritten. Returns the provisioned paths.
pub fn provision(dir: &Path, symbols: &[&str]) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .map_err(|err| BenchError::io("create working directory", dir, err))?;

    let mut provisioned = Vec::with_capacity(symbols.len());
    for &name in symbols {
        let contents = bundled_asset(name)?;
        let dest = dir.join(name);
        let up_to_date = std::fs::read_to_string(&dest)
            .map(|existing| existing == contents)
            .unwrap_or(false);
        if !up_to_date {
            std::fs::write(&dest, contents)
                .map_err(|err| BenchError::io("provision symbol", &dest, err))?;
            debug!(symbol = name, dir = %dir.display(), "provisioned symbol artifact");
        }
        provisioned.push(dest);
    }
    Ok(provisioned)
}

//! Cleaning configuration stored in `inspections.toml`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use chain::io::dir_sink::ArtifactFormat;
use serde::{Deserialize, Serialize};

/// Default config file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "inspections.toml";

/// Cleaning configuration (TOML).
///
/// Missing fields default to a `data/` layout relative to the working directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct InspectionsConfig {
    /// Extracted Food Inspections CSV.
    pub input: PathBuf,

    /// Output directory for explore artifacts. Cleared on every explore.
    pub explore_dir: PathBuf,

    /// Output directory for the cleaned table. Cleared on every apply.
    pub clean_dir: PathBuf,

    /// Encoding of written tables.
    pub format: ArtifactFormat,

    /// Assertions left out of the chain, by name.
    pub disabled: Vec<String>,

    /// Per-assertion operation overrides (`"drop"` or `"apply"`), by name.
    pub operations: BTreeMap<String, String>,
}

impl Default for InspectionsConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("data/raw/Food_Inspections.csv"),
            explore_dir: PathBuf::from("data/explore"),
            clean_dir: PathBuf::from("data/clean"),
            format: ArtifactFormat::Csv,
            disabled: Vec::new(),
            operations: BTreeMap::new(),
        }
    }
}

impl InspectionsConfig {
    pub fn validate(&self) -> Result<()> {
        if self.input.as_os_str().is_empty() {
            return Err(anyhow!("input must not be empty"));
        }
        if self.explore_dir.as_os_str().is_empty() {
            return Err(anyhow!("explore_dir must not be empty"));
        }
        if self.clean_dir.as_os_str().is_empty() {
            return Err(anyhow!("clean_dir must not be empty"));
        }
        // Each output directory is wiped before its pass.
        let explore_dir = normalized(&self.explore_dir)?;
        let clean_dir = normalized(&self.clean_dir)?;
        if explore_dir.starts_with(&clean_dir) || clean_dir.starts_with(&explore_dir) {
            return Err(anyhow!(
                "explore_dir {} and clean_dir {} must not overlap",
                self.explore_dir.display(),
                self.clean_dir.display()
            ));
        }
        let input = normalized(&self.input)?;
        let working_dir = normalized(Path::new("."))?;
        for (key, dir, resolved) in [
            ("explore_dir", &self.explore_dir, &explore_dir),
            ("clean_dir", &self.clean_dir, &clean_dir),
        ] {
            if input.starts_with(resolved) {
                return Err(anyhow!(
                    "{key} {} must not contain input {}",
                    dir.display(),
                    self.input.display()
                ));
            }
            if working_dir.starts_with(resolved) {
                return Err(anyhow!(
                    "{key} {} must not contain the working directory",
                    dir.display()
                ));
            }
        }
        Ok(())
    }
}

/// Absolute form of `path` with `.` and `..` folded, without touching the
/// filesystem.
fn normalized(path: &Path) -> Result<PathBuf> {
    let absolute =
        std::path::absolute(path).with_context(|| format!("resolve {}", path.display()))?;
    let mut resolved = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            other => resolved.push(other),
        }
    }
    Ok(resolved)
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `InspectionsConfig::default()`.
pub fn load_config(path: &Path) -> Result<InspectionsConfig> {
    if !path.exists() {
        let cfg = InspectionsConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: InspectionsConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Command-line overrides applied on top of the loaded config.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub input: Option<PathBuf>,
    pub explore_dir: Option<PathBuf>,
    pub clean_dir: Option<PathBuf>,
    pub format: Option<ArtifactFormat>,
}

/// Apply command-line overrides to the base config.
pub fn apply_overrides(
    mut base: InspectionsConfig,
    overrides: &ConfigOverrides,
) -> Result<InspectionsConfig> {
    if let Some(input) = &overrides.input {
        base.input = input.clone();
    }
    if let Some(explore_dir) = &overrides.explore_dir {
        base.explore_dir = explore_dir.clone();
    }
    if let Some(clean_dir) = &overrides.clean_dir {
        base.clean_dir = clean_dir.clone();
    }
    if let Some(format) = overrides.format {
        base.format = format;
    }
    base.validate()?;
    Ok(base)
}

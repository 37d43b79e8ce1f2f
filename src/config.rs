//! Configuration management for nbacross
//!
//! Layers, lowest precedence first:
//! 1. built-in defaults (the stock nbadet test matrix)
//! 2. global config: <config dir>/nbacross/config.toml
//! 3. project config: ./nbacross.toml or --config
//! 4. command-line flags
//!
//! Relative `driver`/`tool` paths are anchored at the directory of the file
//! that set them.

use crate::matrix::{Matrix, MatrixStep};
use crate::paths;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_DRIVER: &str = "./autcrossw.rb";
pub const DEFAULT_BASELINE: &str = "autfilt -D -P --high";
pub const DEFAULT_TOOL: &str = "nbadet";

/// One config file as written on disk
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Differential-testing driver
    pub driver: Option<String>,
    /// Arguments placed right after the driver, before any template
    pub driver_args: Option<Vec<String>>,
    /// Reference translator every variant is compared against
    pub baseline: Option<String>,
    /// Tool under test
    pub tool: Option<String>,
    /// Where the driver should write its report and statistics
    pub output_dir: Option<PathBuf>,
    pub matrix: Option<Vec<MatrixStep>>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Load a config file if it exists
    pub fn load_optional(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        Self::load(path).map(Some)
    }
}

/// A config file together with the directory its relative paths refer to
#[derive(Debug, Clone)]
pub struct Layer {
    pub file: ConfigFile,
    pub base: PathBuf,
}

impl Layer {
    fn from_path(path: &Path, file: ConfigFile) -> Self {
        let base = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self { file, base }
    }
}

/// Values given on the command line
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub driver: Option<String>,
    pub tool: Option<String>,
    pub baseline: Option<String>,
    pub output_dir: Option<PathBuf>,
}

/// Fully merged settings for one run
#[derive(Debug, Clone)]
pub struct Settings {
    pub driver: PathBuf,
    pub driver_args: Vec<String>,
    pub baseline: String,
    tool: String,
    tool_base: PathBuf,
    pub output_dir: Option<PathBuf>,
    pub matrix: Matrix,
}

impl Settings {
    /// Built-in defaults, with relative paths anchored at `cwd`
    pub fn defaults(cwd: &Path) -> Self {
        Self {
            driver: paths::anchor_program(DEFAULT_DRIVER, cwd),
            driver_args: Vec::new(),
            baseline: DEFAULT_BASELINE.to_string(),
            tool: DEFAULT_TOOL.to_string(),
            tool_base: cwd.to_path_buf(),
            output_dir: None,
            matrix: Matrix::default(),
        }
    }

    /// Read the global and project config files and merge them over the defaults
    pub fn load(explicit: Option<&Path>, cwd: &Path) -> Result<Self> {
        Self::load_with_global(paths::global_config_file().as_deref(), explicit, cwd)
    }

    /// Like `load`, with the global config file given explicitly
    pub fn load_with_global(
        global: Option<&Path>,
        explicit: Option<&Path>,
        cwd: &Path,
    ) -> Result<Self> {
        let mut layers = Vec::new();

        if let Some(global) = global {
            if let Some(file) = ConfigFile::load_optional(global)? {
                tracing::debug!(path = %global.display(), "loaded global config");
                layers.push(Layer::from_path(global, file));
            }
        }

        match explicit {
            Some(path) => {
                let path = cwd.join(path);
                if !path.is_file() {
                    bail!("Config file not found: {}", path.display());
                }
                layers.push(Layer::from_path(&path, ConfigFile::load(&path)?));
                tracing::debug!(path = %path.display(), "loaded project config");
            }
            None => {
                let path = cwd.join(paths::PROJECT_CONFIG);
                if let Some(file) = ConfigFile::load_optional(&path)? {
                    tracing::debug!(path = %path.display(), "loaded project config");
                    layers.push(Layer::from_path(&path, file));
                }
            }
        }

        Ok(Self::from_layers(cwd, &layers))
    }

    /// Merge layers over the defaults; later layers win
    pub fn from_layers(cwd: &Path, layers: &[Layer]) -> Self {
        let mut settings = Self::defaults(cwd);

        for Layer { file, base } in layers {
            if let Some(driver) = &file.driver {
                settings.driver = paths::anchor_program(driver, base);
            }
            if let Some(args) = &file.driver_args {
                settings.driver_args = args.clone();
            }
            if let Some(baseline) = &file.baseline {
                settings.baseline = baseline.clone();
            }
            if let Some(tool) = &file.tool {
                settings.tool = tool.clone();
                settings.tool_base = base.clone();
            }
            if let Some(dir) = &file.output_dir {
                settings.output_dir = Some(base.join(dir));
            }
            if let Some(steps) = &file.matrix {
                settings.matrix = Matrix::new(steps.clone());
            }
        }

        settings
    }

    /// Apply command-line flags; relative paths refer to `cwd`
    pub fn apply(&mut self, overrides: &Overrides, cwd: &Path) {
        if let Some(driver) = &overrides.driver {
            self.driver = paths::anchor_program(driver, cwd);
        }
        if let Some(tool) = &overrides.tool {
            self.tool = tool.clone();
            self.tool_base = cwd.to_path_buf();
        }
        if let Some(baseline) = &overrides.baseline {
            self.baseline = baseline.clone();
        }
        if let Some(dir) = &overrides.output_dir {
            self.output_dir = Some(cwd.join(dir));
        }
    }

    /// Locate the tool under test
    pub fn resolve_tool(&self) -> Result<PathBuf> {
        match paths::resolve_program(&self.tool, &self.tool_base) {
            Some(path) => Ok(path),
            None => bail!(
                "Tool under test not found: {}\nSet `tool` in {} or pass --tool <PATH>",
                self.tool,
                paths::PROJECT_CONFIG
            ),
        }
    }
}

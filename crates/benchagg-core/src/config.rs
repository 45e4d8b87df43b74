//! Aggregation configuration.
//!
//! Built once at process start and passed by reference to every component.

use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the machine name.
pub const MACHINE_NAME_ENV: &str = "VIXEN_MACHINE_NAME";

/// Subdirectory of the debug screenshots the harness writes next to results.
pub const DEBUG_IMAGES_DIR: &str = "debug_images";

/// Optional YAML settings file. Every field is optional; unset fields keep
/// the project-root defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SettingsFile {
    pub store: Option<PathBuf>,
    pub benchmarks_dir: Option<PathBuf>,
    pub results_dir: Option<PathBuf>,
    pub machine_name: Option<String>,
}

impl SettingsFile {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings: {}", path.display()))?;
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&text)
            .with_context(|| format!("failed to parse settings: {}", path.display()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregateConfig {
    pub project_root: PathBuf,
    /// Root holding one subfolder per run (`data/benchmarks`).
    pub benchmarks_dir: PathBuf,
    /// Default input for single-folder aggregation.
    pub results_dir: PathBuf,
    pub store_path: PathBuf,
    /// Explicit machine name (CLI flag); beats every other source.
    pub machine_name_override: Option<String>,
    /// `machine_name` from the settings file; ranks below the environment.
    pub settings_machine_name: Option<String>,
    /// Purge raw inputs after a persisted merge.
    pub cleanup: bool,
}

impl AggregateConfig {
    pub fn from_project_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let data = root.join("data");
        Self {
            benchmarks_dir: data.join("benchmarks"),
            results_dir: root.join("benchmark_results"),
            store_path: data.join("benchmark_results.db"),
            machine_name_override: None,
            settings_machine_name: None,
            cleanup: false,
            project_root: root,
        }
    }

    /// Overlay a settings file. Relative paths resolve against the project root.
    pub fn with_settings(mut self, settings: &SettingsFile) -> Self {
        if let Some(p) = &settings.store {
            self.store_path = self.project_root.join(p);
        }
        if let Some(p) = &settings.benchmarks_dir {
            self.benchmarks_dir = self.project_root.join(p);
        }
        if let Some(p) = &settings.results_dir {
            self.results_dir = self.project_root.join(p);
        }
        if let Some(name) = settings.machine_name.as_ref().filter(|n| !n.is_empty()) {
            self.settings_machine_name = Some(name.clone());
        }
        self
    }

    /// Harness suite configuration, consulted for `suite.machine_name`.
    pub fn benchmark_config_path(&self) -> PathBuf {
        self.project_root
            .join("application")
            .join("benchmark")
            .join("benchmark_config.json")
    }

    /// Machine name with precedence: override > environment > settings file >
    /// harness config file > hostname.
    pub fn resolve_machine_name(&self) -> String {
        resolve_machine_name(
            self.machine_name_override.as_deref(),
            std::env::var(MACHINE_NAME_ENV).ok().as_deref(),
            self.settings_machine_name.as_deref(),
            &self.benchmark_config_path(),
        )
    }
}

pub fn resolve_machine_name(
    explicit: Option<&str>,
    env_value: Option<&str>,
    settings_value: Option<&str>,
    benchmark_config: &Path,
) -> String {
    for name in [explicit, env_value, settings_value].into_iter().flatten() {
        if !name.is_empty() {
            return name.to_string();
        }
    }
    if let Some(name) = machine_name_from_benchmark_config(benchmark_config) {
        return name;
    }
    sysinfo::System::host_name().unwrap_or_else(|| "unknown".to_string())
}

/// `suite.machine_name` from the harness config. A missing or malformed file
/// is treated as "not configured".
fn machine_name_from_benchmark_config(path: &Path) -> Option<String> {
    let text = std::fs::read_to_string(path).ok()?;
    let v: serde_json::Value = match serde_json::from_str(&text) {
        Ok(v) => v,
        Err(e) => {
            tracing::debug!("ignoring malformed {}: {}", path.display(), e);
            return None;
        }
    };
    v.get("suite")?
        .get("machine_name")?
        .as_str()
        .filter(|s| !s.is_empty())
        .map(String::from)
}

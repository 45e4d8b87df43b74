//! Builds the one `AggregateConfig` a command runs with.
//!
//! Precedence, lowest first: project-root defaults, the settings file, flags.
//! A settings-file `machine_name` still ranks below `VIXEN_MACHINE_NAME`.

use super::super::args::{GlobalArgs, StoreArgs};
use anyhow::Context;
use benchagg_core::config::SettingsFile;
use benchagg_core::AggregateConfig;

pub fn load_config(global: &GlobalArgs, store: Option<&StoreArgs>) -> anyhow::Result<AggregateConfig> {
    let mut cfg = AggregateConfig::from_project_root(&global.project_root);

    if let Some(path) = &global.config {
        let settings = SettingsFile::load(path)
            .with_context(|| format!("settings file {} is unusable", path.display()))?;
        cfg = cfg.with_settings(&settings);
    }
    if let Some(dir) = &global.benchmarks_dir {
        cfg.benchmarks_dir = dir.clone();
    }
    if let Some(store) = store {
        if let Some(out) = &store.output {
            cfg.store_path = out.clone();
        }
        if let Some(name) = store.machine_name.as_ref().filter(|n| !n.is_empty()) {
            cfg.machine_name_override = Some(name.clone());
        }
        cfg.cleanup = store.cleanup;
    }
    tracing::debug!("effective config: {:?}", cfg);
    Ok(cfg)
}

//! Project workspace resolution
//!
//! Merges stored settings with command-line overrides and wires up the
//! source provider and reconciler used by every command.

use accessmap_core::{ConfigStore, FsSource, Reconciler};
use accessmap_foundation::{AccessConfig, Settings};
use std::path::{Path, PathBuf};

/// Command-line overrides applied on top of stored settings
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub source_root: Option<PathBuf>,
    pub config_file: Option<PathBuf>,
    pub extensions: Vec<String>,
}

/// Everything a command needs to talk to one project
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    settings: Settings,
    reconciler: Reconciler,
}

impl Workspace {
    pub fn open(root: &Path, overrides: Overrides) -> anyhow::Result<Self> {
        let mut settings = Settings::load(root)?;
        if let Some(source_root) = overrides.source_root {
            settings = settings.source_root(source_root);
        }
        if let Some(config_file) = overrides.config_file {
            settings = settings.config_file(config_file);
        }
        if !overrides.extensions.is_empty() {
            settings = settings.extensions(overrides.extensions);
        }
        Ok(Self::with_settings(root, settings))
    }

    pub fn with_settings(root: &Path, settings: Settings) -> Self {
        let reconciler = Reconciler::new(ConfigStore::from_settings(root, &settings));
        Self {
            root: root.to_path_buf(),
            settings,
            reconciler,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    pub fn source(&self) -> FsSource {
        FsSource::from_settings(&self.root, &self.settings)
    }

    pub fn config_path(&self) -> PathBuf {
        self.reconciler.store().path()
    }

    /// Load the access document, logging why a baseline was used if so
    pub fn load_config(&self) -> AccessConfig {
        let (config, outcome) = self.reconciler.load();
        if outcome.is_bootstrap() {
            tracing::info!("Access config {}", outcome.describe());
        }
        config
    }
}

use anyhow::{Context as _, Result};
use log::{debug, info};
use std::path::Path;

use crate::engine::{DefaultEngine, Engine};
use crate::enumerate::Enumeration;
use crate::loader::load_config;
use crate::output::{OutputFiles, write_outputs};
use crate::registry::ModuleRegistry;
use crate::settings::Settings;

/// Loads a config, resolves it, enumerates the context and writes the lists.
#[derive(Debug)]
pub struct ExportOrchestrator<E = DefaultEngine> {
    settings: Settings,
    engine: E,
}

impl ExportOrchestrator {
    pub fn new(settings: Settings) -> Self {
        Self::with_engine(settings, DefaultEngine)
    }
}

impl<E: Engine> ExportOrchestrator<E> {
    pub fn with_engine(settings: Settings, engine: E) -> Self {
        Self { settings, engine }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Enumerate the classes and variants `config_path` generates, without writing anything
    pub fn enumerate(&self, config_path: &Path) -> Result<Enumeration> {
        let loaded = load_config(config_path)?;

        let registry = ModuleRegistry::from_settings(&self.settings);
        debug!("Module registry: {:?}", registry);

        let resolved = self
            .engine
            .resolve_config(&loaded, &registry)
            .with_context(|| format!("Failed to resolve config {:?}", loaded.path))?;
        let context = self
            .engine
            .create_context(&resolved)
            .context("Failed to create context")?;

        Ok(Enumeration::from_context(
            &context,
            self.settings.ordering,
            self.settings.modifiers,
        ))
    }

    /// Enumerate `config_path` and write the lists into the configured output directory
    pub fn export(&self, config_path: &Path) -> Result<OutputFiles> {
        let enumeration = self.enumerate(config_path)?;
        let files = write_outputs(&self.settings.out_dir, &enumeration)?;
        info!(
            "Exported {} classes and {} variants to {:?}",
            enumeration.classes.len(),
            enumeration.variants.len(),
            self.settings.out_dir
        );
        Ok(files)
    }
}

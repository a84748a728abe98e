pub mod combine;
pub mod config;
pub mod dirs;
pub mod engine;
pub mod enumerate;
pub mod loader;
pub mod orchestrator;
pub mod output;
pub mod registry;
pub mod settings;

pub use enumerate::{Enumeration, OrderingStrategy};
pub use loader::ConfigNotFound;
pub use orchestrator::ExportOrchestrator;
pub use settings::Settings;

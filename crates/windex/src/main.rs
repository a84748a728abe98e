use clap::Parser;
use env_logger::Env;
use log::{debug, info};
use std::path::PathBuf;
use std::process::ExitCode;

use windex::ConfigNotFound;
use windex::enumerate::OrderingStrategy;
use windex::orchestrator::ExportOrchestrator;
use windex::settings::{Settings, SettingsLayer};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Framework configuration document (.toml or .json)
    config: PathBuf,

    /// Directory receiving classes.txt and variants.txt
    out_dir: Option<PathBuf>,

    /// Increase verbosity (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// How the class list is ordered
    #[arg(long, value_enum)]
    ordering: Option<OrderingStrategy>,

    /// Tool settings file, taking precedence over discovered windex.toml files
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Resolve framework modules on disk instead of using the bundled copies
    #[arg(long)]
    no_standalone: bool,

    /// Also list opacity modifier forms such as bg-red-500/50
    #[arg(long)]
    modifiers: bool,
}

impl Cli {
    fn settings_overrides(&self) -> SettingsLayer {
        SettingsLayer {
            out_dir: self.out_dir.clone(),
            ordering: self.ordering,
            standalone: self.no_standalone.then_some(false),
            module_dirs: None,
            modifiers: self.modifiers.then_some(true),
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let settings = Settings::load(cli.settings.as_deref(), cli.settings_overrides())?;
    debug!("Settings: {:?}", settings);

    let orchestrator = ExportOrchestrator::new(settings);
    let files = orchestrator.export(&cli.config)?;
    info!(
        "Wrote {} and {}",
        files.classes.display(),
        files.variants.display()
    );
    Ok(())
}

#[allow(clippy::print_stderr)]
fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let log_level = match cli.verbose {
        0 => "warn",  // Default: warnings and errors only
        1 => "info",  // -v: informational messages
        2 => "debug", // -vv: debug messages
        _ => "trace", // -vvv or more: trace messages
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    debug!(
        "Verbosity level: {} (log level: {})",
        cli.verbose, log_level
    );
    info!("Starting windex");

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:?}");
            let missing_config = err
                .chain()
                .any(|cause| cause.downcast_ref::<ConfigNotFound>().is_some());
            if missing_config {
                ExitCode::from(ConfigNotFound::EXIT_CODE)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

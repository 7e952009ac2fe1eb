//! Veneer command line

use std::{
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

use clap::{Args, Parser, Subcommand};
use thiserror::Error;
use tracing::{error, warn};

use veneer::{
    cart::CartStore,
    catalog::{Catalog, CatalogError},
    config::{self, ConfigError, I18nConfig, LoggingConfig},
    i18n::{LoadOutcome, Locale, LocaleChange, Namespace},
    observability,
};

#[derive(Debug, Parser)]
#[command(name = "veneer", about = "Veneer storefront tools", long_about = None)]
struct Cli {
    #[command(flatten)]
    logging: LoggingConfig,

    #[command(flatten)]
    i18n: I18nConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Look up a translation
    Translate(TranslateArgs),

    /// Price a cart from catalog selections
    Quote(QuoteArgs),
}

#[derive(Debug, Args)]
struct TranslateArgs {
    /// Dotted key, e.g. `nav.home`
    key: String,

    /// Namespace the key lives in
    #[arg(long, short, default_value = "common")]
    namespace: Namespace,

    /// Switch to this locale (and remember it) before looking up
    #[arg(long)]
    locale: Option<Locale>,
}

#[derive(Debug, Args)]
struct QuoteArgs {
    /// Catalog YAML file
    #[arg(long, env = "VENEER_CATALOG", default_value = "./fixtures/catalog.yml")]
    catalog: PathBuf,

    /// Selections as `PRODUCT:SIZE:FINISH`; repeat a selection to add more units
    #[arg(required = true)]
    selections: Vec<String>,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("invalid selection {0:?}, expected PRODUCT:SIZE:FINISH")]
    InvalidSelection(String),

    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    config::load_dotenv();

    let cli = Cli::parse();

    if let Err(error) = observability::init_logging(&cli.logging) {
        #[expect(
            clippy::print_stderr,
            reason = "logging failed to initialise, must use eprintln"
        )]
        {
            eprintln!("{error}");
        }

        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!(%error, "command failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Translate(args) => translate(&cli.i18n, args).await,
        Commands::Quote(args) => quote(&args),
    }
}

async fn translate(config: &I18nConfig, args: TranslateArgs) -> Result<(), CliError> {
    let controller = config.controller()?;

    let mut outcome = controller.initialize().await;

    if let Some(locale) = args.locale {
        if let LocaleChange::Switched(switched) = controller.set_locale(locale).await {
            outcome = switched;
        }
    }

    if let LoadOutcome::Degraded(failed) = &outcome {
        warn!(locale = %controller.locale(), failed = ?failed, "some namespaces failed to load");
    }

    let text = controller.translate(&args.key, args.namespace);

    writeln!(io::stdout().lock(), "{text}")?;

    Ok(())
}

fn quote(args: &QuoteArgs) -> Result<(), CliError> {
    let catalog = Catalog::load(&args.catalog)?;
    let store = CartStore::new(catalog.currency());

    for selection in &args.selections {
        let mut parts = selection.splitn(3, ':');

        let (Some(product), Some(size), Some(finish)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(CliError::InvalidSelection(selection.clone()));
        };

        store.add_item(catalog.line_item(product, size, finish)?);
    }

    let state = store.snapshot();
    let mut out = io::stdout().lock();

    for line in state.items() {
        let item = line.details();

        writeln!(
            out,
            "{quantity} x {name} [{code}] {finish}, {size} @ {price} = {subtotal}",
            quantity = line.quantity(),
            name = item.name,
            code = item.code,
            finish = item.finish,
            size = item.size,
            price = item.price,
            subtotal = line.subtotal(),
        )?;
    }

    writeln!(out, "items: {}", state.item_count())?;
    writeln!(out, "total: {}", state.total())?;

    Ok(())
}

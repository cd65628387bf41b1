use clap::Parser;
use ledger_view::args::{Args, Command};
use ledger_view::view::SystemClock;
use ledger_view::{commands, Config, Mode, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().home().path();
    let token = args.common().token();
    let output = args.common().output();

    // When LEDGER_VIEW_IN_TEST_MODE is set and non-empty the mode is Mode::Test and no network
    // calls are made, otherwise it is Mode::Http.
    let mode = Mode::from_env();

    let _: () = match args.command() {
        Command::Init(init_args) => commands::init(home, init_args.api_host(), init_args.user_id())
            .await?
            .print(output)?,

        Command::Categories(range_args) => {
            let config = Config::load(home).await?;
            let range = range_args.resolve(&SystemClock)?;
            commands::categories(config, mode, token, range)
                .await?
                .print(output)?
        }

        Command::Transactions(transactions_args) => {
            let config = Config::load(home).await?;
            let range = transactions_args.range().resolve(&SystemClock)?;
            commands::transactions(
                config,
                mode,
                token,
                range,
                transactions_args.category(),
                transactions_args.sort(),
            )
            .await?
            .print(output)?
        }

        Command::View(view_args) => {
            let config = Config::load(home).await?;
            let range = view_args.range().resolve(&SystemClock)?;
            commands::view(config, mode, token, range, view_args.id())
                .await?
                .print(output)?
        }

        Command::Delete(delete_args) => {
            let config = Config::load(home).await?;
            let range = delete_args.range().resolve(&SystemClock)?;
            commands::delete(
                config,
                mode,
                token,
                range,
                delete_args.id(),
                delete_args.yes(),
            )
            .await?
            .print(output)?
        }
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => EnvFilter::from_default_env(),
        // The binary and the library share the crate name, so one directive covers both
        None => EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), level)),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

use clap::Parser;
use pilar::args::{Args, Command, CurrencyCommand, GoalCommand};
use pilar::{commands, Config, Result};
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
            error!("Exiting with error: {e}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().pilar_home().path();

    // Route to appropriate command handler
    let _: () = match args.command() {
        Command::Init(init_args) => commands::init(home, init_args).await?.print(),

        Command::Insert(insert_args) => {
            let config = Config::load(home).await?;
            commands::insert(config, insert_args).await?.print()
        }

        Command::Update(update_args) => {
            let config = Config::load(home).await?;
            commands::update(config, update_args).await?.print()
        }

        Command::Delete(delete_args) => {
            let config = Config::load(home).await?;
            commands::delete(config, delete_args).await?.print()
        }

        Command::List(list_args) => {
            let config = Config::load(home).await?;
            commands::list(config, list_args).await?.print()
        }

        Command::Dashboard => {
            let config = Config::load(home).await?;
            commands::dashboard(config).await?.print()
        }

        Command::Goal(goal_args) => {
            let config = Config::load(home).await?;
            match goal_args.command() {
                GoalCommand::Add(args) => commands::goal_add(config, args).await?.print(),
                GoalCommand::Update(args) => commands::goal_update(config, args).await?.print(),
                GoalCommand::List => {
                    let today = chrono::Utc::now().date_naive();
                    commands::goal_list(config, today).await?.print()
                }
                GoalCommand::Delete(args) => commands::goal_delete(config, args).await?.print(),
            }
        }

        Command::Simulate(simulate_args) => {
            let config = Config::load(home).await?;
            commands::simulate(config, simulate_args).await?.print()
        }

        Command::Currency(currency_args) => {
            let config = Config::load(home).await?;
            match currency_args.command() {
                CurrencyCommand::Show => commands::currency_show(config).await?.print(),
                CurrencyCommand::Set(args) => {
                    commands::currency_set(config, args.currency()).await?.print()
                }
            }
        }
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

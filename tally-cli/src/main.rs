use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tally_core::Session;
use tally_interpret::{Interpreter, LlmInterpreter, Provider};
use tracing_subscriber::{EnvFilter, filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod auth;
mod config;
mod render;
mod shell;
mod state;
mod time;
mod worker;

#[derive(Parser, Debug)]
#[command(name = "tally", version, about = "Track income and expenses, with free-text entry")]
struct Cli {
    /// Log more (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Config file (default: ~/.tally/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive session (the default)
    Shell,

    /// Interpret one free-text entry and print the fields as JSON
    Parse {
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },

    /// Manage ~/.tally/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Store API keys in ~/.tally/auth.json
    Auth {
        #[command(subcommand)]
        command: AuthCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config file if none exists
    Init,
    /// Print the effective config
    Show,
}

#[derive(Subcommand, Debug)]
enum AuthCommand {
    /// Prompt for an API key (gemini, openai or anthropic)
    SetKey { provider: Provider },
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    };
    tracing_subscriber::registry()
        .with(
            EnvFilter::builder()
                .with_default_directive(default.into())
                .from_env_lossy(),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn build_interpreter(cfg: &config::Config) -> Result<LlmInterpreter> {
    let settings = cfg.llm.settings();
    let key = auth::load_auth()?.api_key(settings.provider);
    if key.is_none() {
        tracing::info!(provider = %settings.provider, "no API key configured; parse will fail until one is set");
    }
    LlmInterpreter::new(settings, key).context("create interpreter")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = config::resolve_path(cli.config.as_deref())?;

    match cli.command.unwrap_or(Command::Shell) {
        Command::Shell => {
            let cfg = config::load_config(&config_path)?;
            let clock = time::zone_clock(&cfg.display.timezone)?;
            let today = clock();
            let interpreter = build_interpreter(&cfg)?;
            tracing::info!(%today, provider = %interpreter.settings().provider, "starting shell");

            let shell = shell::Shell::new(Session::new(today), cfg.display.clone(), std::io::stdout())
                .with_clock(clock);
            shell::run(shell, interpreter).await?;
        }

        Command::Parse { text } => {
            let cfg = config::load_config(&config_path)?;
            let interpreter = build_interpreter(&cfg)?;
            let parsed = interpreter
                .interpret(&text.join(" "))
                .await
                .context("interpreting text")?;
            println!("{}", serde_json::to_string_pretty(&parsed)?);
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config(&config_path)?,
            ConfigCommand::Show => {
                let cfg = config::load_config(&config_path)?;
                println!("# {}", config_path.display());
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },

        Command::Auth { command } => match command {
            AuthCommand::SetKey { provider } => auth::set_key(provider)?,
        },
    }

    Ok(())
}

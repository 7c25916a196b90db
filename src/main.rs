use clap::Parser;
use colored::*;
use std::io::{self, Write};
use std::process;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use factcheck::agent::Agent;
use factcheck::bridge::run_turn;
use factcheck::cli::Args;
use factcheck::config::{Config, FileConfig};
use factcheck::session::{ChatSession, CommandOutcome};
use factcheck::ui::{self, TerminalRenderer};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    if args.config_init {
        init_config();
        return;
    }

    if args.list_models {
        ui::print_models(args.provider.unwrap_or_default());
        return;
    }

    let config = match Config::from_env_and_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red(), e);
            process::exit(1);
        }
    };

    init_tracing(config.verbose);
    tracing::debug!(?config, "configuration resolved");

    let agent = match Agent::from_config(&config) {
        Ok(agent) => agent,
        Err(e) => {
            ui::print_error(&e);
            process::exit(1);
        }
    };

    let mut session = ChatSession::new(config.provider, &config.model);

    if !args.claim.is_empty() {
        let claim = args.claim.join(" ");
        let mut renderer = TerminalRenderer::new();
        let run = session.run_config();
        if let Err(e) = run_turn(&agent, session.conversation_mut(), &claim, run, &mut renderer).await {
            println!();
            ui::print_error(&e);
            process::exit(1);
        }
        return;
    }

    if let Err(e) = repl(&agent, &mut session).await {
        ui::print_error(&e);
        process::exit(1);
    }
}

async fn repl(agent: &Agent, session: &mut ChatSession) -> io::Result<()> {
    ui::print_banner(session.provider(), session.model());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("{} ", "factcheck>".bold().blue());
        io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            return Ok(());
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match session.handle_command(input) {
            CommandOutcome::NotACommand => {}
            CommandOutcome::Info(message) => {
                ui::print_info(&message);
                continue;
            }
            CommandOutcome::Invalid(message) => {
                ui::print_error(&message);
                continue;
            }
            CommandOutcome::ShowModels => {
                ui::print_models(session.provider());
                continue;
            }
            CommandOutcome::ShowHistory => {
                ui::print_history(session.conversation());
                continue;
            }
            CommandOutcome::Quit => return Ok(()),
        }

        println!();
        let mut renderer = TerminalRenderer::new();
        let run = session.run_config();
        if let Err(e) = run_turn(agent, session.conversation_mut(), input, run, &mut renderer).await {
            println!();
            ui::print_error(&e);
        }
    }
}

fn init_config() {
    let Some(dir) = dirs::config_dir() else {
        ui::print_error(&"could not determine the config directory");
        process::exit(1);
    };
    let path = dir.join("factcheck").join("factcheck.yaml");
    match FileConfig::write_example(&path) {
        Ok(()) => println!(
            "{} {}",
            "Wrote example config to".green(),
            path.display()
        ),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red(), e);
            process::exit(1);
        }
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "factcheck=debug" } else { "factcheck=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

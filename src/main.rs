//! relay CLI binary entry point.

use std::io::Write;

use agent_relay::agent::AgentSessionManager;
use agent_relay::cli::{render, Cli, Commands, Interrupt, ReplCommand, RunOutcome};
use agent_relay::config::RelayConfig;
use agent_relay::error::RelayError;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    let mut config = match RelayConfig::load(cli.options.config.as_deref()) {
        Ok(config) => config,
        Err(e) => exit_with_config_error(&e),
    };
    cli.options.apply(&mut config);
    init_tracing(config.debug);

    if config.tool_token.is_none() {
        warn!("No Slack token configured (SLACK_BOT_TOKEN or SLACK_USER_TOKEN); the MCP server must supply its own");
    }

    let command = cli.command();
    let mut manager = AgentSessionManager::from_config(config);
    let mut interrupt = Interrupt::ctrl_c();

    if *command == Commands::Status {
        println!(
            "{}",
            render::status(manager.config(), manager.descriptor(), manager.state())
        );
        return;
    }

    match interrupt.guard(manager.initialize()).await {
        Some(Ok(_)) => {}
        Some(Err(e)) => {
            eprintln!("Error: {e}");
            eprintln!("Suggestion: {:?}", e.recovery_suggestion());
            std::process::exit(1);
        }
        None => {
            // An interrupted create may still have landed remotely; nothing to delete locally.
            eprintln!("Interrupted.");
            std::process::exit(RunOutcome::Interrupted.exit_code());
        }
    }

    let outcome = match command {
        Commands::Ask(args) => ask(&mut manager, &mut interrupt, &args.text()).await,
        Commands::Demo => run_demo(&mut manager, &mut interrupt).await,
        Commands::Chat | Commands::Status => run_chat(&mut manager, &mut interrupt).await,
    };

    manager.shutdown().await;
    if outcome != RunOutcome::Completed {
        std::process::exit(outcome.exit_code());
    }
}

fn init_tracing(debug: bool) {
    let default_filter = if debug {
        "agent_relay=debug"
    } else {
        "agent_relay=info"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn exit_with_config_error(err: &RelayError) -> ! {
    match err {
        RelayError::MissingConfig { fields } => {
            eprintln!("Error: missing required configuration:");
            for field in fields {
                eprintln!("  - {field} ({})", field.env_var());
            }
            eprintln!("Set them in the environment, a .env file, or relay.toml.");
        }
        other => eprintln!("Error: {other}"),
    }
    std::process::exit(1);
}

/// Send one question and print the result. Errors are printed, not fatal.
async fn ask(
    manager: &mut AgentSessionManager,
    interrupt: &mut Interrupt,
    question: &str,
) -> RunOutcome {
    let streaming = manager.streaming();
    if streaming {
        print!("Assistant: ");
        let _ = std::io::stdout().flush();
    }

    let result = interrupt
        .guard(manager.ask_with(question, |delta| {
            print!("{delta}");
            let _ = std::io::stdout().flush();
        }))
        .await;

    if streaming {
        println!();
    }

    match result {
        Some(Ok(classified)) => {
            println!("{}", render::response(&classified, streaming));
            RunOutcome::Completed
        }
        Some(Err(e)) => {
            eprintln!("Error: {e}");
            if e.is_retryable() {
                eprintln!("The request can be retried.");
            }
            RunOutcome::Failed
        }
        None => {
            eprintln!("Interrupted.");
            RunOutcome::Interrupted
        }
    }
}

/// Individual failures are reported and the demo moves on.
async fn run_demo(manager: &mut AgentSessionManager, interrupt: &mut Interrupt) -> RunOutcome {
    for (i, question) in render::DEMO_QUESTIONS.iter().enumerate() {
        println!("\n[{}/{}] You: {question}", i + 1, render::DEMO_QUESTIONS.len());
        if ask(manager, interrupt, question).await == RunOutcome::Interrupted {
            return RunOutcome::Interrupted;
        }
    }
    RunOutcome::Completed
}

/// Ctrl-C at the prompt or during a query ends the session normally.
async fn run_chat(manager: &mut AgentSessionManager, interrupt: &mut Interrupt) -> RunOutcome {
    println!("Connected. Type /help for commands, quit to leave.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("\nYou: ");
        let _ = std::io::stdout().flush();

        let Some(line) = interrupt.guard(lines.next_line()).await else {
            println!();
            break;
        };
        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => {
                println!();
                break;
            }
            Err(e) => {
                eprintln!("Error reading input: {e}");
                break;
            }
        };

        match ReplCommand::parse(&line) {
            ReplCommand::Empty => {}
            ReplCommand::Quit => break,
            ReplCommand::Clear => {
                manager.clear();
                println!("Chat cleared.");
            }
            ReplCommand::Reset => match interrupt.guard(manager.reinitialize()).await {
                Some(Ok(descriptor)) => println!(
                    "New session {} with agent {} version {}.",
                    manager.state().context().short_id(),
                    descriptor.name,
                    descriptor.version
                ),
                Some(Err(e)) => eprintln!("Error: {e}"),
                None => break,
            },
            ReplCommand::Status => println!(
                "{}",
                render::status(manager.config(), manager.descriptor(), manager.state())
            ),
            ReplCommand::Samples => println!("{}", render::samples()),
            ReplCommand::Help => println!("{}", render::help()),
            ReplCommand::Unknown(cmd) => println!("Unknown command {cmd}. Type /help."),
            ReplCommand::Ask(question) => {
                if !manager.is_ready() {
                    eprintln!("No agent is live; use /reset to create one.");
                    continue;
                }
                if ask(manager, interrupt, &question).await == RunOutcome::Interrupted {
                    break;
                }
            }
        }
    }
    RunOutcome::Completed
}

use anyhow::{Context, Result};
use chrono::Local;
use parlance::messages::Message;
use parlance::services::LocalProvider;
use parlance::{AppCommand, AppEvent, Orchestrator, ParlanceConfig, SharedAppState, LANGUAGES};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const HELP: &str = "\
Type text to send it. Commands:
  /translate N [lang]  translate message N (defaults to the selected language)
  /summarize N         summarize message N
  /lang CODE           select the target language
  /languages           list languages
  /status              show capability status
  /export              print the current state as JSON
  /clear               clear the conversation
  /quit                exit";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parlance=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting Parlance");

    let config = match std::env::args().nth(1) {
        Some(path) => ParlanceConfig::load(&path).with_context(|| format!("loading {}", path))?,
        None => ParlanceConfig::default(),
    };

    let provider = LocalProvider::new(config.local.clone());
    let orchestrator = Orchestrator::initialize(config, Some(provider.environment())).await?;
    print_status(orchestrator.state());

    let events = orchestrator.event_receiver();
    let state = orchestrator.state().clone();
    std::thread::spawn(move || {
        let mut last_percentage = None;
        while let Ok(event) = events.recv() {
            match event {
                AppEvent::Error(message) => println!("! {}", message),
                AppEvent::ResultMerged { id } => {
                    if let Some(message) = state.message(id) {
                        print_results(&message);
                    }
                }
                AppEvent::StateChanged => {
                    let percentage = state.download_progress().map(|p| p.percentage);
                    if percentage.is_some() && percentage != last_percentage {
                        if let Some(p) = percentage {
                            println!("  downloading model... {}%", p);
                        }
                    }
                    last_percentage = percentage;
                }
            }
        }
    });

    println!("{}", HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let Some(command) = line.strip_prefix('/') else {
            if let Some(task) = orchestrator.dispatch(AppCommand::SendText(line.to_string())) {
                task.await?;
            }
            let messages = orchestrator.state().messages();
            if let Some(message) = messages.last().filter(|m| m.text() == line) {
                print_message(messages.len(), message);
            }
            continue;
        };

        let mut parts = command.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some("quit"), ..) => break,
            (Some("help"), ..) => println!("{}", HELP),
            (Some("languages"), ..) => {
                let selected = orchestrator.state().selected_language();
                for language in LANGUAGES {
                    let marker = if selected == language.code { "*" } else { " " };
                    println!("{} {}  {}", marker, language.code, language.name);
                }
            }
            (Some("lang"), Some(code), _) => {
                orchestrator.dispatch(AppCommand::SelectLanguage(code.into()));
                println!("Target language: {}", orchestrator.state().selected_language().name());
            }
            (Some("status"), ..) => print_status(orchestrator.state()),
            (Some("export"), ..) => {
                println!("{}", serde_json::to_string_pretty(&orchestrator.state().snapshot())?)
            }
            (Some("clear"), ..) => {
                orchestrator.dispatch(AppCommand::Clear);
                println!("Conversation cleared");
            }
            (Some("translate"), Some(n), target) => {
                let Some(id) = message_at(orchestrator.state(), n) else {
                    println!("No message {}", n);
                    continue;
                };
                let command = match target {
                    Some(code) => AppCommand::Translate { id, target: code.into() },
                    None => AppCommand::TranslateSelected(id),
                };
                if orchestrator.dispatch(command).is_none() {
                    println!("Translation is not available right now");
                }
            }
            (Some("summarize"), Some(n), _) => {
                let Some(id) = message_at(orchestrator.state(), n) else {
                    println!("No message {}", n);
                    continue;
                };
                if orchestrator.dispatch(AppCommand::Summarize(id)).is_none() {
                    println!("Summary is not available for message {}", n);
                }
            }
            _ => {
                warn!("Unknown command: /{}", command);
                println!("{}", HELP);
            }
        }
    }

    info!("Parlance stopped");
    Ok(())
}

/// Resolve a 1-based message position typed by the user
fn message_at(state: &SharedAppState, position: &str) -> Option<parlance::messages::MessageId> {
    let index = position.parse::<usize>().ok()?.checked_sub(1)?;
    state.messages().get(index).map(|m| m.id())
}

fn print_message(position: usize, message: &Message) {
    println!(
        "[{}] {} ({}) {}",
        position,
        message.timestamp().with_timezone(&Local).format("%H:%M:%S"),
        message.language().name(),
        message.text()
    );
}

fn print_results(message: &Message) {
    if let Some(result) = message.processed().last() {
        println!("  #{} -> {}", message.id(), result.content());
    }
}

fn print_status(state: &SharedAppState) {
    let report = state.capabilities();
    println!(
        "detection: {}  translation: {}  summarization: {}",
        report.detection, report.translation, report.summarization
    );
}

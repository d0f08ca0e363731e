use anyhow::Result;
use housing_chat::api::{HttpBackend, PropertyFilter};
use housing_chat::chat::{ChatSession, RejectReason, SendOutcome, QUICK_ACTIONS};
use housing_chat::comparison::{Comparison, Verdict};
use housing_chat::format;
use housing_chat::models::{Message, PropertyId, Role};
use housing_chat::selection::Toggle;
use housing_chat::{ClientConfig, Coordinator};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::Path;
use std::sync::{mpsc as std_mpsc, Arc};
use std::thread;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const PROMPT: &str = "housing> ";
const HISTORY_FILE: &str = ".housing_chat_history";

const HELP: &str = "\
Type a question to chat, or a command:
  /list                      all properties
  /search key=value ...      location, min_price, max_price, bedrooms,
                             bathrooms, min_size, amenities=a,b
  /select <id>               toggle a property for comparison
  /compare                   compare the two selected properties
  /save <id>                 save a property
  /saved                     saved properties
  /predict <id>              price prediction
  /history                   chat history
  /clear                     clear chat history
  /quick <n>                 send a suggested query
  /quit";

#[derive(Debug, PartialEq)]
enum Command {
    Chat(String),
    List,
    Search(PropertyFilter),
    Select(PropertyId),
    Compare,
    Save(PropertyId),
    Saved,
    Predict(PropertyId),
    History,
    Clear,
    Quick(usize),
    Help,
    Quit,
    Invalid(String),
}

fn parse_id(arg: Option<&str>, usage: &str) -> Result<PropertyId, String> {
    arg.and_then(|s| s.parse().ok())
        .ok_or_else(|| format!("usage: {}", usage))
}

fn parse_filter<'a>(args: impl Iterator<Item = &'a str>) -> Result<PropertyFilter, String> {
    let mut filter = PropertyFilter::default();
    for arg in args {
        let (key, value) = arg
            .split_once('=')
            .ok_or_else(|| format!("expected key=value, got {:?}", arg))?;
        let bad = || format!("bad value for {}: {:?}", key, value);
        match key {
            "location" => filter.location = Some(value.replace('_', " ")),
            "min_price" => filter.min_price = Some(value.parse().map_err(|_| bad())?),
            "max_price" => filter.max_price = Some(value.parse().map_err(|_| bad())?),
            "bedrooms" => filter.bedrooms = Some(value.parse().map_err(|_| bad())?),
            "bathrooms" => filter.bathrooms = Some(value.parse().map_err(|_| bad())?),
            "min_size" => filter.min_size = Some(value.parse().map_err(|_| bad())?),
            "amenities" => {
                filter.amenities = Some(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(|s| s.replace('_', " "))
                        .collect(),
                )
            }
            other => return Err(format!("unknown filter {:?}", other)),
        }
    }
    Ok(filter)
}

fn parse(line: &str) -> Command {
    let line = line.trim();
    let Some(rest) = line.strip_prefix('/') else {
        return Command::Chat(line.to_string());
    };

    let mut words = rest.split_whitespace();
    let name = words.next().unwrap_or_default();
    let arg = words.clone().next();
    let parsed = match name {
        "list" => Ok(Command::List),
        "search" => parse_filter(words).and_then(|filter| {
            if filter.is_empty() {
                Err("usage: /search key=value ...".to_string())
            } else {
                Ok(Command::Search(filter))
            }
        }),
        "select" => parse_id(arg, "/select <id>").map(Command::Select),
        "compare" => Ok(Command::Compare),
        "save" => parse_id(arg, "/save <id>").map(Command::Save),
        "saved" => Ok(Command::Saved),
        "predict" => parse_id(arg, "/predict <id>").map(Command::Predict),
        "history" => Ok(Command::History),
        "clear" => Ok(Command::Clear),
        "quick" => arg
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|n| (1..=QUICK_ACTIONS.len()).contains(n))
            .map(Command::Quick)
            .ok_or_else(|| format!("usage: /quick <1-{}>", QUICK_ACTIONS.len())),
        "help" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(format!("unknown command /{}", other)),
    };
    parsed.unwrap_or_else(Command::Invalid)
}

fn print_message(message: &Message) {
    let who = match (message.role, message.is_error) {
        (Role::User, _) => "you",
        (Role::Bot, true) => "bot (error)",
        (Role::Bot, false) => "bot",
    };
    println!("[{}] {}: {}", message.timestamp.format("%H:%M"), who, message.text);
    for property in &message.properties {
        println!("   {}", format::property_card(property));
    }
}

fn print_comparison(comparison: &Comparison) {
    println!(
        "{:<16} {:<28} {:<28}",
        "", comparison.first.title, comparison.second.title
    );
    for row in &comparison.fields {
        let (mark_a, mark_b) = match row.verdict {
            Verdict::ABetter => (" ✓", ""),
            Verdict::BBetter => ("", " ✓"),
            _ => ("", ""),
        };
        let diff = if !row.a.is_known() && !row.b.is_known() {
            "  (no data)"
        } else if row.differs && matches!(row.verdict, Verdict::NonComparable) {
            "  (differs)"
        } else {
            ""
        };
        println!(
            "{:<16} {:<28} {:<28}{}",
            row.field.label,
            format!("{}{}", row.display_a(), mark_a),
            format!("{}{}", row.display_b(), mark_b),
            diff
        );
    }
    println!(
        "{:<16} {:<28} {:<28}",
        "Amenities",
        format::amenity_summary(&comparison.first.amenities, usize::MAX),
        format::amenity_summary(&comparison.second.amenities, usize::MAX),
    );
}

async fn chat(session: &ChatSession, text: &str) {
    match session.send(text).await {
        SendOutcome::Rejected(RejectReason::Busy) => println!("Still waiting for the last reply"),
        SendOutcome::Rejected(RejectReason::TooLong) => println!("Message is too long"),
        SendOutcome::Rejected(RejectReason::Blank) => {}
        SendOutcome::Replied { suggestions, .. } => {
            if let Some(last) = session.history().last() {
                print_message(last);
            }
            if !suggestions.is_empty() {
                println!("   try: {}", suggestions.join(" | "));
            }
        }
        SendOutcome::Failed => {
            if let Some(last) = session.history().last() {
                print_message(last);
            }
        }
    }
}

/// Run the line editor on its own thread. Each line is sent to the async
/// side, and the next prompt waits until `ready` fires so command output is
/// not interleaved with it. The channel closes on EOF.
fn spawn_prompt() -> (mpsc::UnboundedReceiver<String>, std_mpsc::Sender<()>, thread::JoinHandle<()>) {
    let (lines_tx, lines_rx) = mpsc::unbounded_channel();
    let (ready_tx, ready_rx) = std_mpsc::channel::<()>();

    let handle = thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                warn!("Could not start line editor: {}", e);
                return;
            }
        };
        if Path::new(HISTORY_FILE).exists() {
            let _ = rl.load_history(HISTORY_FILE);
        }

        loop {
            match rl.readline(PROMPT) {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(line.as_str());
                    if lines_tx.send(line).is_err() || ready_rx.recv().is_err() {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => break,
                Err(e) => {
                    warn!("Input error: {}", e);
                    break;
                }
            }
        }

        let _ = rl.save_history(HISTORY_FILE);
    });

    (lines_rx, ready_tx, handle)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ClientConfig::from_env()?;
    let backend = Arc::new(HttpBackend::new(&config)?);
    let session = ChatSession::start(backend.clone(), config.session_id.clone()).await;
    info!("🏠 Housing Chat - {} (session {})", config.base_url, session.session_id());
    let mut found = session.subscribe();
    let mut view = Coordinator::new(backend, config.session_id.clone());

    if let Err(e) = view.refresh_properties().await {
        warn!("Could not load properties: {}", e);
    }
    if let Err(e) = view.refresh_saved().await {
        warn!("Could not load saved properties: {}", e);
    }

    let history = session.history();
    if history.is_empty() {
        println!("Start a conversation to find your perfect property. Suggestions:");
        for (i, action) in QUICK_ACTIONS.iter().enumerate() {
            println!("  /quick {}  {}", i + 1, action.label);
        }
    } else {
        history.iter().for_each(print_message);
    }
    println!("Type /help for commands.");

    let (mut lines, ready, prompt) = spawn_prompt();
    while let Some(line) = lines.recv().await {
        match parse(&line) {
            Command::Chat(text) => chat(&session, &text).await,
            Command::Quick(n) => {
                let action = QUICK_ACTIONS[n - 1];
                println!("you: {}", action.query);
                chat(&session, action.query).await;
            }
            Command::List => match view.refresh_properties().await {
                Ok(_) => view
                    .properties()
                    .iter()
                    .for_each(|p| println!("{}", format::property_card(p))),
                Err(e) => println!("Could not load properties: {}", e),
            },
            Command::Search(filter) => match view.search(&filter).await {
                Ok(n) => {
                    println!("{} matches", n);
                    view.properties()
                        .iter()
                        .for_each(|p| println!("{}", format::property_card(p)));
                }
                Err(e) => println!("Search failed: {}", e),
            },
            Command::Select(id) => match view.toggle_selection(id) {
                Ok(Toggle::Added) => println!("Selected {}", id),
                Ok(Toggle::Removed) => println!("Deselected {}", id),
                Ok(Toggle::Replaced { evicted }) => {
                    println!("Selected {} (replaced {})", id, evicted)
                }
                Err(e) => println!("{}", e),
            },
            Command::Compare => match view.open_compare().await {
                Ok(comparison) => print_comparison(&comparison),
                Err(e) => println!("{}", e),
            },
            Command::Save(id) => match view.save(id).await {
                Ok(receipt) => println!("{} ({} saved)", receipt.message, receipt.saved_ids.len()),
                Err(e) => println!("Could not save: {}", e),
            },
            Command::Saved => match view.refresh_saved().await {
                Ok(0) => println!("No saved properties yet. Save properties to compare them!"),
                Ok(_) => view
                    .saved()
                    .iter()
                    .for_each(|p| println!("{}", format::property_card(p))),
                Err(e) => println!("Could not load saved properties: {}", e),
            },
            Command::Predict(id) => match view.predict(id).await {
                Ok(_) => match view.property(id) {
                    Some(property) => println!("{}", format::property_card(&property)),
                    None => {
                        if let Some(p) = view.prediction(id) {
                            println!("#{} predicted {}", id, format::currency(p.predicted_price));
                        }
                    }
                },
                Err(e) => println!("Prediction failed: {}", e),
            },
            Command::History => session.history().iter().for_each(print_message),
            Command::Clear => {
                session.clear().await;
                println!("Chat cleared");
            }
            Command::Help => println!("{}", HELP),
            Command::Quit => break,
            Command::Invalid(msg) => println!("{}", msg),
        }

        while let Ok(properties) = found.try_recv() {
            view.show_found(properties);
        }
        if ready.send(()).is_err() {
            break;
        }
    }

    drop(ready);
    let _ = tokio::task::spawn_blocking(move || prompt.join()).await;
    info!("👋 Bye");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_chat() {
        assert_eq!(
            parse("  homes near the park "),
            Command::Chat("homes near the park".to_string())
        );
    }

    #[test]
    fn parses_id_commands() {
        assert_eq!(parse("/select 12"), Command::Select(12));
        assert_eq!(parse("/save 3"), Command::Save(3));
        assert_eq!(parse("/predict 7"), Command::Predict(7));
        assert!(matches!(parse("/select"), Command::Invalid(_)));
        assert!(matches!(parse("/select abc"), Command::Invalid(_)));
    }

    #[test]
    fn parses_search_filters() {
        let Command::Search(filter) =
            parse("/search location=San_Francisco max_price=500000 bedrooms=3 amenities=pool,garage")
        else {
            panic!("expected search");
        };
        assert_eq!(filter.location.as_deref(), Some("San Francisco"));
        assert_eq!(filter.max_price, Some(500_000.0));
        assert_eq!(filter.bedrooms, Some(3));
        assert_eq!(
            filter.amenities,
            Some(vec!["pool".to_string(), "garage".to_string()])
        );
        assert!(matches!(parse("/search color=red"), Command::Invalid(_)));
        assert!(matches!(parse("/search"), Command::Invalid(_)));
        assert!(matches!(parse("/search bedrooms=many"), Command::Invalid(_)));
    }

    #[test]
    fn quick_actions_are_one_based() {
        assert_eq!(parse("/quick 1"), Command::Quick(1));
        assert!(matches!(parse("/quick 0"), Command::Invalid(_)));
        assert!(matches!(parse("/quick 99"), Command::Invalid(_)));
    }

    #[test]
    fn unknown_commands_are_reported() {
        assert!(matches!(parse("/dance"), Command::Invalid(_)));
        assert_eq!(parse("/exit"), Command::Quit);
    }
}

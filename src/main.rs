//! voxroute CLI: drive the assistant routing core from a terminal.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use voxroute::config::AssistantSetup;
use voxroute::nlu::{IntentEngine, PatternStore};
use voxroute::orchestrator::Orchestrator;
use voxroute::plugin::CommandRegistry;
use voxroute::plugin::builtin::default_plugins;

#[derive(Parser)]
#[command(name = "voxroute", version, about = "Voice assistant intent routing core")]
struct Cli {
    /// Config file (default: $XDG_CONFIG_HOME/voxroute/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Pattern file (default: from config, else $XDG_DATA_HOME/voxroute/patterns.json).
    #[arg(long, global = true)]
    patterns: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write default config and pattern files if they are missing.
    Init,

    /// Read utterances from stdin, one per line, until a stop command.
    Repl,

    /// Classify a single utterance without dispatching it.
    Classify {
        /// The utterance.
        text: String,

        /// Print the full result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Teach an intent a new pattern and persist it.
    Learn {
        /// Intent id (created if unknown).
        intent: String,
        /// Regular expression to add.
        pattern: String,
    },

    /// List intents and their patterns.
    Patterns,

    /// List registered plugins and their keywords.
    Commands,
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let resolved = AssistantSetup::resolve(cli.config.as_deref(), cli.patterns.as_deref())?;

    match cli.command {
        Commands::Init => {
            if resolved.config_path.exists() {
                println!("Config already exists at {}", resolved.config_path.display());
            } else {
                resolved.config.save(&resolved.config_path)?;
                println!("Wrote config to {}", resolved.config_path.display());
            }

            let store = PatternStore::new(&resolved.patterns_path);
            if resolved.patterns_path.exists() {
                println!("Patterns already exist at {}", resolved.patterns_path.display());
            } else {
                // Loading a missing file writes the default table back.
                let table = store.load();
                println!(
                    "Wrote {} intents to {}",
                    table.len(),
                    resolved.patterns_path.display()
                );
            }
        }

        Commands::Repl => {
            let mut assistant = Orchestrator::from_config(&resolved.config, &resolved.patterns_path);
            let stdin = std::io::stdin();
            let mut stdout = std::io::stdout();

            print!("> ");
            stdout.flush().into_diagnostic()?;
            for line in stdin.lock().lines() {
                let line = line.into_diagnostic()?;
                if line.trim().is_empty() {
                    print!("> ");
                    stdout.flush().into_diagnostic()?;
                    continue;
                }

                let turn = assistant.handle(&line)?;
                for segment in &turn.segments {
                    println!("{segment}");
                }
                if !turn.keep_running {
                    break;
                }
                print!("> ");
                stdout.flush().into_diagnostic()?;
            }
        }

        Commands::Classify { text, json } => {
            let mut engine = IntentEngine::new(
                PatternStore::new(&resolved.patterns_path).load(),
                resolved.config.response_seed,
            );
            let result = engine.analyze(&text);

            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&result).into_diagnostic()?
                );
            } else {
                match &result.intent {
                    Some(intent) => println!(
                        "intent: {intent} (confidence: {:.2}, pattern: {})",
                        result.confidence,
                        result.matched_pattern.as_deref().unwrap_or("-")
                    ),
                    None => println!("intent: none"),
                }
                println!("emotion: {}", result.emotion);
                for (key, value) in &result.entities {
                    println!(
                        "entity {key}: {}",
                        serde_json::to_string(value).into_diagnostic()?
                    );
                }
                println!("response: {}", result.response);
            }
        }

        Commands::Learn { intent, pattern } => {
            let mut engine = IntentEngine::with_store(
                PatternStore::new(&resolved.patterns_path),
                resolved.config.response_seed,
            );
            engine.learn(&intent, &pattern)?;
            println!(
                "Learned pattern \"{pattern}\" for intent \"{intent}\" ({})",
                resolved.patterns_path.display()
            );
        }

        Commands::Patterns => {
            let table = PatternStore::new(&resolved.patterns_path).load();
            println!("Intents ({}):", table.len());
            for intent in table.iter() {
                println!("  {} ({} patterns)", intent.id, intent.patterns.len());
                for pattern in &intent.patterns {
                    println!("    {pattern}");
                }
            }
        }

        Commands::Commands => {
            let registry = CommandRegistry::from_plugins(
                default_plugins(&resolved.config),
                resolved.config.keyword_matching,
            );
            println!("Plugins ({}):", registry.len());
            for plugin in registry.plugins() {
                println!("  {}: {}", plugin.id(), plugin.description());
            }
            println!("Keywords (scan order):");
            for (keyword, route) in registry.keywords() {
                println!("  {keyword} -> {}/{}", route.plugin_id, route.command_id);
            }
            for collision in registry.collisions() {
                println!(
                    "  note: \"{}\" moved from {}/{} to {}/{}",
                    collision.keyword,
                    collision.previous.plugin_id,
                    collision.previous.command_id,
                    collision.replacement.plugin_id,
                    collision.replacement.command_id
                );
            }
        }
    }

    Ok(())
}

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::Result;
use campus_assistant::{AssistantError, CampusAssistant};
use campus_core::{classify, ChatInput, Intent};
use campus_observability::{init_tracing_with_writer, AppMetrics};
use campus_storage::{sample_courses, seed_catalog, SeedOutcome, Store};
use clap::{Parser, Subcommand};
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "campus")]
#[command(about = "Campus assistant CLI")]
struct Cli {
    /// SQLite URL; omitted means a throwaway in-memory catalog.
    #[arg(long, env = "CAMPUS_DATABASE_URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Chat {
        #[arg(long)]
        session_id: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    Classify {
        message: String,
    },
    Courses {
        #[command(subcommand)]
        command: CoursesCommand,
    },
    Seed,
    History {
        email: String,
    },
}

#[derive(Debug, Subcommand)]
enum CoursesCommand {
    List,
    Search { keyword: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries command output, including JSON, so logs go to stderr.
    init_tracing_with_writer("campus_cli", io::stderr);
    let cli = Cli::parse();

    if let Command::Classify { message } = &cli.command {
        println!("{}", classify(message));
        return Ok(());
    }

    if let Command::Seed = cli.command {
        let store = open_store(cli.database_url.as_deref()).await?;
        match seed_catalog(&store, &sample_courses()).await? {
            SeedOutcome::Seeded(count) => println!("Database initialized with {count} sample courses."),
            SeedOutcome::AlreadyPresent(_) => println!("Courses already exist in the database."),
        }
        return Ok(());
    }

    let assistant = open_assistant(cli.database_url.as_deref()).await?;

    match cli.command {
        Command::Chat { session_id, email } => run_chat(assistant, session_id, email).await?,
        Command::Courses { command } => match command {
            CoursesCommand::List => {
                let courses = assistant.list_courses().await?;
                println!("{}", serde_json::to_string_pretty(&courses)?);
            }
            CoursesCommand::Search { keyword } => match assistant.search_catalog(&keyword).await {
                Ok(courses) => println!("{}", serde_json::to_string_pretty(&courses)?),
                Err(AssistantError::NoMatchingCourses(_)) => {
                    println!("No courses found matching that keyword.")
                }
                Err(error) => return Err(error.into()),
            },
        },
        Command::History { email } => match assistant.chat_history(&email).await {
            Ok(messages) => println!("{}", serde_json::to_string_pretty(&messages)?),
            Err(AssistantError::NoSessionsForEmail(_)) => {
                println!("No sessions found for this email.")
            }
            Err(error) => return Err(error.into()),
        },
        Command::Classify { .. } | Command::Seed => {}
    }

    Ok(())
}

async fn open_store(database_url: Option<&str>) -> Result<Store> {
    match database_url {
        Some(database_url) => Store::sqlite(database_url).await,
        None => Ok(Store::memory()),
    }
}

/// Opens the store and seeds the sample catalog when it is empty, on either
/// backend.
async fn open_assistant(database_url: Option<&str>) -> Result<CampusAssistant<Store>> {
    let store = open_store(database_url).await?;
    seed_catalog(&store, &sample_courses()).await?;
    Ok(CampusAssistant::new(Arc::new(store), AppMetrics::shared()))
}

async fn run_chat(
    assistant: CampusAssistant<Store>,
    session_id: Option<String>,
    email: Option<String>,
) -> Result<()> {
    let session_id = session_id.unwrap_or_else(|| Uuid::new_v4().to_string());
    assistant.start_session(&session_id, email).await?;

    println!("Campus assistant chat ({session_id}). Say 'bye' to leave.");

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }

        let message = line.trim();
        if message.is_empty() {
            continue;
        }

        let reply = assistant
            .handle_chat(ChatInput {
                session_id: session_id.clone(),
                user_message: message.to_string(),
            })
            .await?;

        println!("\n{}\n", reply.bot_response);

        if reply.intent == Intent::Exit {
            break;
        }
    }

    Ok(())
}

use anyhow::Result;
use clap::{Parser, Subcommand};
use classroom_core::session::Privacy;
use std::path::PathBuf;

mod app;
mod commands;

#[derive(Parser)]
#[command(name = "classroom")]
#[command(about = "Classroom CLI - shared coding sessions with role-based membership", long_about = None)]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Entity snapshot file, overriding `state_file` from the config
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    /// Workspace root, overriding `workspace_root` from the config
    #[arg(long, global = true)]
    workspace_root: Option<PathBuf>,

    /// Print captured audit events as JSON lines on stderr
    #[arg(long, global = true)]
    audit: bool,

    /// Username the command is performed as
    #[arg(long = "as", global = true, value_name = "USER")]
    caller: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Create, list and manage sessions
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },
    /// Manage session tasks
    Task {
        #[command(subcommand)]
        action: TaskAction,
    },
    /// List grades of a session
    Grades {
        session_id: String,
        #[arg(long)]
        user: Option<String>,
        #[arg(long)]
        task: Option<u32>,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Register a user
    Add { username: String },
}

#[derive(Subcommand)]
enum SessionAction {
    /// Create a session owned by the caller
    Create {
        name: String,
        #[arg(long)]
        privacy: Option<Privacy>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        hidden: bool,
    },
    /// List sessions that are not hidden
    List,
    /// List sessions the caller has joined
    Joined,
    /// List sessions the caller is invited to
    Invited,
    /// Join a session
    Join { session_id: String },
    /// Invite a user to a session
    Invite { session_id: String, username: String },
    /// Assign a role to a session member
    SetPermission {
        session_id: String,
        username: String,
        role: String,
    },
}

#[derive(Subcommand)]
enum TaskAction {
    /// Create a task from a JSON test-case file
    Create {
        session_id: String,
        #[arg(long)]
        cases_file: PathBuf,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long = "hint")]
        hints: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let overrides = app::Overrides {
        config: cli.config,
        state: cli.state,
        workspace_root: cli.workspace_root,
    };
    let config = app::load_config(&overrides)?;
    let audit_events = app::init_tracing(&config, cli.audit)?;
    let app = app::App::bootstrap(&config)?;

    let caller = cli.caller.as_deref();
    let outcome = match cli.command {
        Commands::User { action } => match action {
            UserAction::Add { username } => commands::user::add(&app, &username).await,
        },
        Commands::Session { action } => match action {
            SessionAction::Create {
                name,
                privacy,
                description,
                hidden,
            } => {
                commands::session::create(&app, caller, name, privacy, description, hidden).await
            }
            SessionAction::List => commands::session::list(&app).await,
            SessionAction::Joined => commands::session::joined(&app, caller).await,
            SessionAction::Invited => commands::session::invited(&app, caller).await,
            SessionAction::Join { session_id } => {
                commands::session::join(&app, caller, &session_id).await
            }
            SessionAction::Invite {
                session_id,
                username,
            } => commands::session::invite(&app, caller, &session_id, &username).await,
            SessionAction::SetPermission {
                session_id,
                username,
                role,
            } => {
                commands::session::set_permission(&app, caller, &session_id, &username, &role)
                    .await
            }
        },
        Commands::Task { action } => match action {
            TaskAction::Create {
                session_id,
                cases_file,
                name,
                description,
                hints,
            } => {
                let input = commands::task::TaskInput {
                    cases_file,
                    name,
                    description,
                    hints,
                };
                commands::task::create(&app, caller, &session_id, input).await
            }
        },
        Commands::Grades {
            session_id,
            user,
            task,
        } => commands::grades::list(&app, caller, &session_id, user, task).await,
    };

    // State is written back even when the command failed: earlier steps
    // of a failed command may already have committed.
    app.finish().await?;

    if let Some(mut receiver) = audit_events {
        while let Ok(event) = receiver.try_recv() {
            eprintln!("{}", serde_json::to_string(&event)?);
        }
    }

    outcome
}

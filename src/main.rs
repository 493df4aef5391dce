//! Timesheet CLI
//!
//! Command-line front end for the timesheet client:
//! - Store the access token
//! - Clock in and out, watch the running timer
//! - List, add, update and delete timesheets

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use timesheet::board::render_reference;
use timesheet::config::{generate_default_config, Config};
use timesheet::timer::{format_elapsed_ms, TimerPhase};
use timesheet::{
    BackendClient, Clock, EntryForm, FileStore, KeyValueStore, ManualEntry, OutputFormat,
    StartOutcome, StopOutcome, SystemClock, TimeTracker, TimerStore, TimesheetBoard,
    ACCESS_TOKEN_KEY,
};

#[derive(Parser)]
#[command(name = "timesheet")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Track work time and submit timesheets")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: <config dir>/timesheet/config.toml or ./timesheet.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (table, json, csv)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage the access token
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Show the signed-in user
    Whoami,

    /// List task categories
    Categories,

    /// List shifts
    Shifts,

    /// List users (admins only)
    Users,

    /// List timesheets
    List,

    /// Time in: start the timer
    In,

    /// Show the timer
    Status,

    /// Follow the running timer until Ctrl+C
    Watch,

    /// Time out: stop the timer and submit the interval
    Out {
        #[command(flatten)]
        entry: EntryArgs,
    },

    /// Resubmit the timesheet a failed time out left behind
    Retry,

    /// Add a timesheet by hand (admins only)
    Add {
        /// Hours worked (HH:MM)
        #[arg(long)]
        hours: String,
        #[command(flatten)]
        entry: EntryArgs,
        /// File the timesheet under this user id (admins)
        #[arg(long)]
        user: Option<i64>,
    },

    /// Update a timesheet (admins only)
    Update {
        /// Timesheet id
        id: i64,
        /// Hours worked (HH:MM)
        #[arg(long)]
        hours: String,
        #[command(flatten)]
        entry: EntryArgs,
        /// File the timesheet under this user id
        #[arg(long)]
        user: Option<i64>,
    },

    /// Delete a timesheet (admins only)
    Delete {
        /// Timesheet id
        id: i64,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum TokenAction {
    /// Save the bearer token used for backend calls
    Set { token: String },
    /// Forget the saved token
    Clear,
}

/// Timesheet form fields
#[derive(Args)]
pub struct EntryArgs {
    /// What was worked on
    #[arg(short, long)]
    details: Option<String>,
    /// Task category id
    #[arg(short, long)]
    category: Option<i64>,
    /// Shift id
    #[arg(short, long)]
    shift: Option<i64>,
    /// Work date (YYYY-MM-DD, default: today)
    #[arg(long)]
    date: Option<NaiveDate>,
}

impl EntryArgs {
    fn form(&self, today: NaiveDate) -> EntryForm {
        let mut form = EntryForm::new(self.date.unwrap_or(today));
        if let Some(details) = &self.details {
            form = form.details(details.as_str());
        }
        if let Some(category) = self.category {
            form = form.category(category);
        }
        if let Some(shift) = self.shift {
            form = form.shift(shift);
        }
        form
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    timesheet::logging::init(&config.logging).context("Failed to open log file")?;

    let format = cli.format;

    match cli.command {
        Commands::Config { output } => {
            let config = generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }

        Commands::Token { action } => {
            let kv = open_store(&config)?;
            match action {
                TokenAction::Set { token } => {
                    let token = token.trim();
                    if token.is_empty() {
                        bail!("Token must not be empty");
                    }
                    kv.set(ACCESS_TOKEN_KEY, token)?;
                    println!("Token saved");
                }
                TokenAction::Clear => {
                    kv.remove(ACCESS_TOKEN_KEY)?;
                    println!("Token cleared");
                }
            }
        }

        Commands::Status => {
            let kv = open_store(&config)?;
            let mut tracker = TimeTracker::new(TimerStore::new(kv), Arc::new(SystemClock));
            tracker.rehydrate().await?;

            let display = tracker.tick().await;
            let state = tracker.state().await;
            match (state.phase(), state.time_in()) {
                (TimerPhase::Running, Some(time_in)) => {
                    println!("Running since {}", time_in.format("%Y-%m-%d %H:%M:%S UTC"));
                    println!("Elapsed: {}", display.unwrap_or_default());
                }
                _ => println!("Idle"),
            }
            for entry in tracker.pending() {
                println!(
                    "Pending submission: {} on {} (run `timesheet retry`)",
                    entry.hours_worked, entry.work_date
                );
            }
            tracker.shutdown();
        }

        command => {
            let kv = open_store(&config)?;
            let token = kv.get(ACCESS_TOKEN_KEY)?;
            let client = BackendClient::new(config.backend.client_config(), token)?;
            if !client.has_token() {
                bail!("No authentication token found. Run `timesheet token set <TOKEN>` first.");
            }

            let tracker = TimeTracker::new(TimerStore::new(kv), Arc::new(SystemClock));
            let mut board = TimesheetBoard::new(Arc::new(client), tracker);
            let result = run(&mut board, command, format).await;
            board.unmount();
            result?;
        }
    }

    Ok(())
}

/// Commands that talk to the backend through a mounted board
async fn run(
    board: &mut TimesheetBoard,
    command: Commands,
    format: OutputFormat,
) -> anyhow::Result<()> {
    board.mount().await?;
    let Some(identity) = board.identity().cloned() else {
        bail!(board
            .last_error()
            .unwrap_or("User ID not available. Please log in again.")
            .to_string());
    };
    if let Some(err) = board.last_error() {
        eprintln!("Warning: {}", err);
    }
    let today = board.tracker().clock().today();

    match command {
        Commands::Whoami => {
            println!("Account id: {}", identity.account_id);
            match identity.profile_user_id {
                Some(id) => println!("User id:    {}", id),
                None => println!("User id:    (no profile)"),
            }
            println!("Role:       {}", identity.role);
        }

        Commands::Categories => println!("{}", render_reference(board.categories(), format)?),

        Commands::Shifts => println!("{}", render_reference(board.shifts(), format)?),

        Commands::Users => {
            if !board.is_admin() && !board.refresh_users().await {
                bail!(board.last_error().unwrap_or_default().to_string());
            }
            println!("{}", render_reference(board.users(), format)?);
        }

        Commands::List => println!("{}", board.render(format)?),

        Commands::In => match board.time_in().await? {
            StartOutcome::Started { time_in } => {
                println!("Timed in at {}", time_in.format("%H:%M:%S UTC"));
            }
            StartOutcome::AlreadyRunning { time_in } => {
                println!(
                    "Already timed in since {}",
                    time_in.format("%Y-%m-%d %H:%M:%S UTC")
                );
            }
        },

        Commands::Watch => watch(board).await?,

        Commands::Out { entry } => match board.time_out(&entry.form(today)).await? {
            StopOutcome::NotRunning => println!("Timer is not running"),
            StopOutcome::Submitted {
                entry, resubmitted, ..
            } => {
                if !resubmitted.is_empty() {
                    println!("Sent {} earlier pending timesheet(s) first", resubmitted.len());
                }
                println!(
                    "{} ({} on {})",
                    board.notice().unwrap_or_default(),
                    entry.hours_worked,
                    entry.work_date
                );
            }
        },

        Commands::Retry => {
            let echoes = board.retry().await?;
            if echoes.is_empty() {
                println!("Nothing to resubmit");
            } else {
                println!(
                    "{} ({} resubmitted)",
                    board.notice().unwrap_or_default(),
                    echoes.len()
                );
            }
        }

        Commands::Add { hours, entry, user } => {
            let manual = ManualEntry {
                form: entry.form(today),
                hours,
                user_id: user,
            };
            let saved = board.add_manual(&manual).await?;
            println!(
                "{} (id {})",
                board.notice().unwrap_or_default(),
                saved
                    .timesheet_id
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "-".to_string())
            );
        }

        Commands::Update { id, hours, entry, user } => {
            let manual = ManualEntry {
                form: entry.form(today),
                hours,
                user_id: user,
            };
            board.update_manual(id, &manual).await?;
            println!("{}", board.notice().unwrap_or_default());
        }

        Commands::Delete { id } => {
            board.delete(id).await?;
            println!("{}", board.notice().unwrap_or_default());
        }

        Commands::Token { .. } | Commands::Status | Commands::Config { .. } => {}
    }

    Ok(())
}

/// Print the elapsed display as it ticks, until Ctrl+C
async fn watch(board: &mut TimesheetBoard) -> anyhow::Result<()> {
    let Some(time_in) = board.tracker().state().await.time_in() else {
        println!("Timer is not running. Start it with `timesheet in`.");
        return Ok(());
    };

    let mut display = board.tracker().subscribe();
    let now = board.tracker().clock().now();
    println!(
        "Timed in at {} (Ctrl+C to stop watching, the timer keeps running)",
        time_in.format("%H:%M:%S UTC")
    );
    print!("\r{}", format_elapsed_ms((now - time_in).num_milliseconds()));
    flush_stdout();

    loop {
        tokio::select! {
            changed = display.changed() => {
                if changed.is_err() {
                    break;
                }
                let elapsed = display.borrow_and_update().clone();
                print!("\r{}", elapsed);
                flush_stdout();
            }
            _ = tokio::signal::ctrl_c() => {
                break;
            }
        }
    }
    println!();
    board.unmount();
    Ok(())
}

fn flush_stdout() {
    use std::io::Write;
    if let Err(e) = std::io::stdout().flush() {
        tracing::debug!(error = %e, "Failed to flush stdout");
    }
}

fn open_store(config: &Config) -> anyhow::Result<Arc<FileStore>> {
    let path = expand_home(&config.store.path);
    let store = FileStore::open(&path)
        .with_context(|| format!("Failed to open store at {:?}", path))?;
    Ok(Arc::new(store))
}

fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

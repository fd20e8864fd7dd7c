//! AccessMap CLI - Main entry point

mod commands;
mod output;
mod tui;
mod workspace;

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use commands::TreeOptions;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use workspace::{Overrides, Workspace};

/// AccessMap - discover access markers in source and manage role grants
#[derive(Parser, Debug)]
#[command(name = "accessmap")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Project root (defaults to the current directory)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Source directory to scan, relative to the project root
    #[arg(long, global = true)]
    src: Option<PathBuf>,

    /// Access document path, relative to the project root
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// File extension to scan (repeatable)
    #[arg(long = "ext", global = true)]
    extensions: Vec<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan sources and reconcile the access document
    Scan {
        /// Print the raw scan report as JSON
        #[arg(long)]
        json: bool,
    },
    /// List roles with grant counters
    Roles {
        /// Filter roles by id or label
        #[arg(short, long)]
        query: Option<String>,
    },
    /// Print the marker tree
    Tree {
        /// Show check marks for this role
        #[arg(short, long)]
        role: Option<String>,

        /// Filter markers by name
        #[arg(short, long)]
        query: Option<String>,

        /// Only show root markers
        #[arg(long)]
        collapsed: bool,
    },
    /// Grant (or revoke) markers for a role, including descendants
    Grant {
        #[arg(short, long)]
        role: String,

        /// Marker ids
        #[arg(required = true)]
        markers: Vec<String>,

        /// Revoke instead of grant
        #[arg(long)]
        off: bool,
    },
    /// Grant every marker or clear all grants for a role
    Preset {
        #[arg(short, long)]
        role: String,

        #[arg(value_enum)]
        preset: Preset,
    },
    /// Manage roles
    Role(RoleArgs),
    /// List grants that point at markers no longer in the source
    Stale,
    /// Interactive browser (default)
    Browse,
}

#[derive(ClapArgs, Debug)]
struct RoleArgs {
    #[command(subcommand)]
    command: RoleCommand,
}

#[derive(Subcommand, Debug)]
enum RoleCommand {
    /// Add a role with an empty grant list
    Add { id: String },
    /// List role ids
    List,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Preset {
    All,
    None,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let command = args.command.unwrap_or(Command::Browse);

    // Initialize logging (quiet while the browser owns the screen)
    let log_level = match (&command, args.debug) {
        (_, true) => "debug",
        (Command::Browse, false) => "warn",
        _ => "info",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();

    let root = match args.root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };
    let overrides = Overrides {
        source_root: args.src,
        config_file: args.config,
        extensions: args.extensions,
    };
    let ws = Workspace::open(&root, overrides)?;
    tracing::debug!(
        "Project {} (sources {}, config {})",
        ws.root().display(),
        ws.settings().source_root_in(ws.root()).display(),
        ws.config_path().display()
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match command {
        Command::Scan { json } => commands::scan(&ws, json, &mut out),
        Command::Roles { query } => commands::roles(&ws, query.as_deref(), &mut out),
        Command::Tree {
            role,
            query,
            collapsed,
        } => {
            let opts = TreeOptions {
                role,
                query,
                collapsed,
            };
            commands::tree(&ws, &opts, &mut out)
        }
        Command::Grant { role, markers, off } => {
            commands::grant(&ws, &role, &markers, !off, &mut out)
        }
        Command::Preset { role, preset } => {
            commands::preset(&ws, &role, matches!(preset, Preset::All), &mut out)
        }
        Command::Role(RoleArgs { command }) => match command {
            RoleCommand::Add { id } => commands::role_add(&ws, &id, &mut out),
            RoleCommand::List => commands::role_list(&ws, &mut out),
        },
        Command::Stale => commands::stale(&ws, &mut out),
        Command::Browse => {
            drop(out);
            tui::run(&ws)
        }
    }
}

//! # tb - Department Task Board Client
//!
//! A command-line client for a role-based task board used by directors,
//! managers and their teams, with an interactive terminal board for
//! department progress.
//!
//! ## Key Features
//!
//! - **Department Progress**: A task assigned to several departments carries one
//!   status per department; the task's progress is its slowest department
//! - **Deadline Highlighting**: Overdue and due-within-6-hours tasks are marked and
//!   ordered first
//! - **Recurring Groups**: Task instances are grouped under the recurring definition
//!   that generated them
//! - **Board TUI**: Kanban view of one task's departments with in-place status changes
//!
//! ## Quick Start
//!
//! ```bash
//! # Log in as a user from the snapshot
//! tb login 3
//!
//! # My tasks, overdue first
//! tb list --mine
//!
//! # Mark the Legal department as waiting on task 12
//! tb dept-status 12 20 waiting --reason "Awaiting signed contract"
//!
//! # Open the department board
//! tb board 12
//! ```
//!
//! Data lives in `~/.taskboard/` (or `$TB_DIR`): the backend snapshot
//! `tasks_snapshot.json`, the session `session.json` and uploaded attachments.
//! Set `TB_LOG=debug` for diagnostic output on stderr.

use clap::Parser;

pub mod auth;
pub mod board;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod db;
pub mod deadline;
pub mod error;
pub mod fields;
pub mod recurrence;
pub mod service;
pub mod sorter;
pub mod status;
pub mod task;
pub mod tui {
    pub mod board;
    pub mod board_run;
    pub mod colors;
    pub mod input;
}

use auth::AuthContext;
use chrono::Utc;
use cli::Cli;
use cmd::*;
use config::Config;
use db::SnapshotService;
use error::AppError;

fn main() {
    let cli = Cli::parse();
    config::init_logging(cli.verbose);

    if let Commands::Completions { shell } = &cli.command {
        cmd_completions(*shell);
        return;
    }

    let cfg = Config::resolve(cli.dir.as_deref(), cli.db.as_deref());
    if let Err(e) = cfg.ensure_dirs() {
        eprintln!("Failed to create data directory {}: {}", cfg.data_dir.display(), e);
        std::process::exit(1);
    }
    tracing::debug!(snapshot = %cfg.snapshot_path.display(), "resolved config");

    let mut auth = match AuthContext::load(&cfg.session_path) {
        Ok(auth) => auth,
        Err(e) => {
            tracing::warn!(error = %e, "ignoring unreadable session");
            AuthContext::default()
        }
    };

    let result = match cli.command {
        Commands::Logout => cmd_logout(&mut auth, &cfg),
        Commands::Whoami => cmd_whoami(&auth),
        command => {
            debug_assert!(needs_snapshot(&command));
            SnapshotService::open(&cfg.snapshot_path, cfg.attachment_dir.clone())
                .and_then(|mut service| run(command, &mut service, &mut auth, &cfg))
        }
    };

    if let Err(e) = result {
        if let AppError::Api(api) = &e {
            if api.is_unauthorized() {
                auth.handle_unauthorized();
                if let Err(save_err) = auth.save(&cfg.session_path) {
                    tracing::warn!(error = %save_err, "failed to clear session");
                }
            }
        }
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(command: Commands, service: &mut SnapshotService, auth: &mut AuthContext, cfg: &Config) -> Result<(), AppError> {
    let now = Utc::now();
    match command {
        Commands::Login { user_id } => cmd_login(service, auth, cfg, user_id),
        Commands::Logout => cmd_logout(auth, cfg),
        Commands::Whoami => cmd_whoami(auth),

        Commands::List { status, variant, mine, limit } =>
            cmd_list(service, auth, status, variant, mine, limit, now),

        Commands::Groups { status } => cmd_groups(service, status, now),

        Commands::View { id } => cmd_view(service, auth, id, now),

        Commands::Status { id, status, reason } => cmd_status(service, auth, id, status, reason),

        Commands::DeptStatus { id, department, status, reason } =>
            cmd_dept_status(service, auth, id, department, status, reason),

        Commands::Create { title, desc, start, end, departments, users, attachments } =>
            cmd_create(service, auth, title, desc, start, end, departments, users, attachments, now),

        Commands::Attach { id, files } => cmd_attach(service, auth, id, files),
        Commands::Detach { attachment_id } => cmd_detach(service, auth, attachment_id),

        Commands::Comment { id, text } => cmd_comment(service, auth, id, text),
        Commands::Uncomment { comment_id } => cmd_uncomment(service, auth, comment_id),

        Commands::Recurring { action } => cmd_recurring(service, auth, action),

        Commands::Board { id } => cmd_board(service, auth, id),

        Commands::Completions { shell } => {
            cmd_completions(shell);
            Ok(())
        }
    }
}

//! Operator CLI for the attendance tracker.
//!
//! # Responsibility
//! - Map one subcommand to each dashboard page and mutation.
//! - Render core views as plain text or JSON.
//! - Turn failures into a destructive notice and exit code 1.

mod commands;
mod error;
mod output;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use commands::Context;
use error::CliError;
use log::error;
use rollcall_core::{
    init_logging, open_db, ActivityStatus, ActivityType, AttendanceStatus, CoreConfig, Notice,
    MANUAL_ENTRY_METHOD,
};
use std::path::PathBuf;
use std::process::ExitCode;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "rollcall")]
#[command(about = "University attendance tracker")]
struct Cli {
    /// Record store path; overrides ROLLCALL_DB_PATH.
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Today's numbers and latest marks.
    Dashboard,
    Students {
        #[command(subcommand)]
        command: StudentsCommand,
    },
    Attendance {
        #[command(subcommand)]
        command: AttendanceCommand,
    },
    Activities {
        #[command(subcommand)]
        command: ActivitiesCommand,
    },
    /// Attendance statistics with a per-department breakdown.
    Analytics {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Effective configuration.
    Settings,
    Version,
}

#[derive(Subcommand)]
enum StudentsCommand {
    List {
        #[arg(long)]
        search: Option<String>,
    },
    Add(AddStudentArgs),
    Delete {
        id: Uuid,
        /// Skip the confirmation prompt.
        #[arg(long, default_value_t = false)]
        yes: bool,
    },
}

#[derive(Args)]
struct AddStudentArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    code: String,
    #[arg(long)]
    department: String,
    #[arg(long)]
    year: String,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    avatar: Option<String>,
}

#[derive(Subcommand)]
enum AttendanceCommand {
    /// Marked records for a day, earliest first.
    List {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Every student with their mark, or a placeholder.
    Roster {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    Mark {
        student_id: Uuid,
        status: AttendanceStatus,
        #[arg(long, default_value = MANUAL_ENTRY_METHOD)]
        method: String,
    },
    /// Runs one simulated recognition capture.
    Scan,
}

#[derive(Subcommand)]
enum ActivitiesCommand {
    List {
        #[arg(long = "type")]
        kind: Option<ActivityType>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        status: Option<ActivityStatus>,
    },
    Add(AddActivityArgs),
    Status {
        id: Uuid,
        status: ActivityStatus,
    },
    Delete {
        id: Uuid,
        #[arg(long, default_value_t = false)]
        yes: bool,
    },
}

#[derive(Args)]
struct AddActivityArgs {
    #[arg(long)]
    title: String,
    #[arg(long = "type")]
    kind: ActivityType,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    due: Option<NaiveDate>,
    #[arg(long, default_value_t = rollcall_core::model::activity::DEFAULT_MAX_SCORE)]
    max_score: u32,
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_command module=cli status=error error={err}");
            output::print_failure(&Notice::from_error(&err));
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = CoreConfig::from_env()?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    if let Some(log_dir) = config.log_dir.clone() {
        let log_dir = if log_dir.is_absolute() {
            log_dir
        } else {
            std::env::current_dir()?.join(log_dir)
        };
        init_logging(&config.log_level, &log_dir)?;
    }

    if matches!(cli.command, Command::Version) {
        return commands::version(cli.json);
    }

    let conn = open_db(&config.db_path)?;
    let ctx = Context::new(&conn, config, cli.json);

    match cli.command {
        Command::Dashboard => commands::dashboard(&ctx),
        Command::Students { command } => match command {
            StudentsCommand::List { search } => commands::list_students(&ctx, search.as_deref()),
            StudentsCommand::Add(args) => commands::add_student(&ctx, args.into_new_student()),
            StudentsCommand::Delete { id, yes } => commands::delete_student(&ctx, id, yes),
        },
        Command::Attendance { command } => match command {
            AttendanceCommand::List { date } => commands::list_attendance(&ctx, date),
            AttendanceCommand::Roster { date } => commands::roster(&ctx, date),
            AttendanceCommand::Mark {
                student_id,
                status,
                method,
            } => commands::mark(&ctx, student_id, status, method),
            AttendanceCommand::Scan => commands::scan(&ctx),
        },
        Command::Activities { command } => match command {
            ActivitiesCommand::List {
                kind,
                search,
                status,
            } => commands::list_activities(&ctx, kind, search, status),
            ActivitiesCommand::Add(args) => commands::add_activity(&ctx, args.into_new_activity()),
            ActivitiesCommand::Status { id, status } => {
                commands::set_activity_status(&ctx, id, status)
            }
            ActivitiesCommand::Delete { id, yes } => commands::delete_activity(&ctx, id, yes),
        },
        Command::Analytics { date } => commands::analytics(&ctx, date),
        Command::Settings => commands::settings(&ctx),
        Command::Version => commands::version(cli.json),
    }
}

impl AddStudentArgs {
    fn into_new_student(self) -> rollcall_core::NewStudent {
        rollcall_core::NewStudent {
            name: self.name,
            student_code: self.code,
            email: self.email,
            department: self.department,
            year: self.year,
            avatar_url: self.avatar,
        }
    }
}

impl AddActivityArgs {
    fn into_new_activity(self) -> rollcall_core::NewActivity {
        rollcall_core::NewActivity {
            description: self.description,
            due_date: self.due,
            max_score: self.max_score,
            ..rollcall_core::NewActivity::new(self.title, self.kind)
        }
    }
}

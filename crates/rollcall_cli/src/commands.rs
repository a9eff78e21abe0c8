//! Subcommand handlers.
//!
//! Each handler builds the services it needs over the shared connection and
//! cache, runs one use case and hands the result to `output`.

use crate::error::CliError;
use crate::output::{self, Output};
use chrono::NaiveDate;
use log::info;
use rollcall_core::db::migrations::{current_version, latest_version};
use rollcall_core::view::{
    ActivityListView, AnalyticsView, AttendanceRow, DashboardView, StudentListView,
};
use rollcall_core::{
    core_version, logging_status, ActivityFilter, ActivityService, ActivityStatus, ActivityType,
    AttendanceService, AttendanceStatus, CoreConfig, MarkAttendanceRequest, NewActivity,
    NewStudent, Notice, QueryCache, ScanOutcome, SimulatedRecognizer, SqliteActivityRepository,
    SqliteAttendanceRepository, SqliteStudentRepository, StudentService, SystemClock,
};
use rusqlite::Connection;
use serde_json::json;
use std::io::{BufRead, Write};
use std::sync::Arc;
use uuid::Uuid;

pub struct Context<'conn> {
    conn: &'conn Connection,
    cache: Arc<QueryCache>,
    config: CoreConfig,
    out: Output,
}

impl<'conn> Context<'conn> {
    pub fn new(conn: &'conn Connection, config: CoreConfig, json: bool) -> Self {
        Self {
            conn,
            cache: QueryCache::shared(),
            config,
            out: Output::new(json),
        }
    }

    fn students(&self) -> StudentService<SqliteStudentRepository<'conn>> {
        StudentService::new(
            SqliteStudentRepository::new(self.conn),
            Arc::clone(&self.cache),
        )
    }

    fn attendance(
        &self,
    ) -> AttendanceService<
        SqliteStudentRepository<'conn>,
        SqliteAttendanceRepository<'conn>,
        SystemClock,
    > {
        AttendanceService::new(
            SqliteStudentRepository::new(self.conn),
            SqliteAttendanceRepository::new(self.conn),
            SystemClock,
            Arc::clone(&self.cache),
        )
    }

    fn activities(&self) -> ActivityService<SqliteActivityRepository<'conn>, SystemClock> {
        ActivityService::new(
            SqliteActivityRepository::new(self.conn),
            SystemClock,
            Arc::clone(&self.cache),
        )
    }
}

pub fn dashboard(ctx: &Context<'_>) -> Result<(), CliError> {
    let attendance = ctx.attendance();
    let today = attendance.today();
    let view = DashboardView::build(
        today,
        attendance.stats_for(today)?,
        ctx.activities().summary()?,
        &attendance.list_for_date(today)?,
    );
    ctx.out.emit(&view, output::render_dashboard)
}

pub fn list_students(ctx: &Context<'_>, search: Option<&str>) -> Result<(), CliError> {
    let students = ctx.students().search_students(search.unwrap_or_default())?;
    let view = StudentListView::build(students, search);
    ctx.out.emit(&view, output::render_students)
}

pub fn add_student(ctx: &Context<'_>, input: NewStudent) -> Result<(), CliError> {
    let student = ctx.students().create_student(&input)?;
    ctx.out.notice(&Notice::student_added(), &student)
}

pub fn delete_student(ctx: &Context<'_>, id: Uuid, yes: bool) -> Result<(), CliError> {
    let students = ctx.students();
    let student = students.get_student(id)?;
    confirm(
        yes,
        &format!("Delete student {} ({})?", student.name, student.student_code),
    )?;
    students.delete_student(id)?;
    ctx.out.notice(&Notice::student_deleted(), &json!({ "id": id }))
}

pub fn list_attendance(ctx: &Context<'_>, date: Option<NaiveDate>) -> Result<(), CliError> {
    let attendance = ctx.attendance();
    let date = date.unwrap_or_else(|| attendance.today());
    let rows: Vec<AttendanceRow> = attendance
        .list_for_date(date)?
        .iter()
        .map(AttendanceRow::from_entry)
        .collect();
    ctx.out.emit(rows.as_slice(), output::render_attendance_rows)
}

pub fn roster(ctx: &Context<'_>, date: Option<NaiveDate>) -> Result<(), CliError> {
    let attendance = ctx.attendance();
    let date = date.unwrap_or_else(|| attendance.today());
    let rows: Vec<AttendanceRow> = attendance
        .roster_for(date)?
        .iter()
        .map(AttendanceRow::from_roster)
        .collect();
    ctx.out.emit(rows.as_slice(), output::render_attendance_rows)
}

pub fn mark(
    ctx: &Context<'_>,
    student_id: Uuid,
    status: AttendanceStatus,
    method: String,
) -> Result<(), CliError> {
    let request = MarkAttendanceRequest::new(student_id, status).with_method(method);
    let entry = ctx.attendance().mark_attendance(&request)?;
    ctx.out.notice(
        &Notice::attendance_marked(&entry),
        &AttendanceRow::from_entry(&entry),
    )
}

pub fn scan(ctx: &Context<'_>) -> Result<(), CliError> {
    let mut recognizer = SimulatedRecognizer::new(&ctx.config.scan);
    if !ctx.out.is_json() {
        println!("Scanning...");
    }
    let outcome = ctx.attendance().scan(&mut recognizer)?;
    info!(
        "event=cli_scan module=cli status={}",
        if outcome.is_marked() { "marked" } else { "not_recognized" }
    );
    let notice = Notice::scan_result(&outcome);
    let row = match &outcome {
        ScanOutcome::Marked(entry) => Some(AttendanceRow::from_entry(entry)),
        ScanOutcome::NotRecognized(_) => None,
    };
    ctx.out.notice(&notice, &row)
}

pub fn list_activities(
    ctx: &Context<'_>,
    kind: Option<ActivityType>,
    search: Option<String>,
    status: Option<ActivityStatus>,
) -> Result<(), CliError> {
    let activities = ctx.activities();
    let filter = ActivityFilter {
        kind,
        search,
        status,
    };
    let view = ActivityListView::build(&activities.filter_activities(&filter)?, activities.today());
    ctx.out.emit(&view, output::render_activities)
}

pub fn add_activity(ctx: &Context<'_>, input: NewActivity) -> Result<(), CliError> {
    let activity = ctx.activities().create_activity(&input)?;
    ctx.out.notice(&Notice::activity_created(), &activity)
}

pub fn set_activity_status(
    ctx: &Context<'_>,
    id: Uuid,
    status: ActivityStatus,
) -> Result<(), CliError> {
    let activities = ctx.activities();
    let activity = activities.set_status(id, status)?;
    ctx.out.notice(
        &Notice::activity_updated(&activity, activities.today()),
        &activity,
    )
}

pub fn delete_activity(ctx: &Context<'_>, id: Uuid, yes: bool) -> Result<(), CliError> {
    let activities = ctx.activities();
    let activity = activities.get_activity(id)?;
    confirm(yes, &format!("Delete activity \"{}\"?", activity.title))?;
    activities.delete_activity(id)?;
    ctx.out.notice(&Notice::activity_deleted(), &json!({ "id": id }))
}

pub fn analytics(ctx: &Context<'_>, date: Option<NaiveDate>) -> Result<(), CliError> {
    let attendance = ctx.attendance();
    let date = date.unwrap_or_else(|| attendance.today());
    let view = AnalyticsView {
        date,
        stats: attendance.stats_for(date)?,
        departments: attendance.department_breakdown_for(date)?,
    };
    ctx.out.emit(&view, output::render_analytics)
}

pub fn settings(ctx: &Context<'_>) -> Result<(), CliError> {
    let config = &ctx.config;
    let logging = logging_status();
    let report = json!({
        "db_path": config.db_path.display().to_string(),
        "schema_version": current_version(ctx.conn)?,
        "latest_schema_version": latest_version(),
        "log_level": config.log_level,
        "log_dir": logging.map(|status| status.log_dir.display().to_string()),
        "scan_delay_ms": u64::try_from(config.scan.delay.as_millis()).unwrap_or(u64::MAX),
        "scan_success_rate": config.scan.success_rate,
    });
    ctx.out.emit(&report, output::render_key_values)
}

pub fn version(json: bool) -> Result<(), CliError> {
    Output::new(json).emit(
        &json!({ "rollcall_core": core_version(), "rollcall": env!("CARGO_PKG_VERSION") }),
        output::render_key_values,
    )
}

/// Asks on stdin unless `yes` was passed; anything but `y`/`yes` aborts.
fn confirm(yes: bool, prompt: &str) -> Result<(), CliError> {
    if yes {
        return Ok(());
    }
    print!("{prompt} [y/N] ");
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    match answer.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Ok(()),
        _ => Err(CliError::Aborted),
    }
}

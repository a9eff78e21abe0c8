//! Text and JSON rendering.

use crate::error::CliError;
use rollcall_core::view::{
    ActivityListView, AnalyticsView, AttendanceRow, DashboardView, EmptyState, StudentListView,
};
use rollcall_core::Notice;
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt::Write;

pub struct Output {
    json: bool,
}

impl Output {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    pub fn is_json(&self) -> bool {
        self.json
    }

    /// Prints `value` as pretty JSON or through `render`.
    pub fn emit<T>(&self, value: &T, render: impl Fn(&T) -> String) -> Result<(), CliError>
    where
        T: Serialize + ?Sized,
    {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            print!("{}", render(value));
        }
        Ok(())
    }

    /// Prints a mutation outcome with its payload.
    pub fn notice<T: Serialize>(&self, notice: &Notice, data: &T) -> Result<(), CliError> {
        if self.json {
            let body = json!({ "notice": notice, "data": data });
            println!("{}", serde_json::to_string_pretty(&body)?);
        } else {
            print!("{}", render_notice(notice));
            if let Value::Object(fields) = serde_json::to_value(data)? {
                if let Some(Value::String(id)) = fields.get("id") {
                    println!("  id: {id}");
                }
            }
        }
        Ok(())
    }
}

/// Failure notices always go to stderr as text.
pub fn print_failure(notice: &Notice) {
    eprint!("{}", render_notice(notice));
}

pub fn render_notice(notice: &Notice) -> String {
    let marker = if notice.is_destructive() { "!" } else { "*" };
    format!("{marker} {}: {}\n", notice.title, notice.description)
}

pub fn render_attendance_rows(rows: &[AttendanceRow]) -> String {
    if rows.is_empty() {
        return "No attendance records\n".to_string();
    }
    let mut out = format!(
        "{:<24} {:<12} {:<8} {:<9} {}\n",
        "Name", "Student ID", "Status", "Time", "Method"
    );
    for row in rows {
        let _ = writeln!(
            out,
            "{:<24} {:<12} {:<8} {:<9} {}",
            row.student_name, row.student_code, row.status_label, row.time_label, row.method
        );
    }
    out
}

pub fn render_students(view: &StudentListView) -> String {
    if let Some(empty) = &view.empty_state {
        return render_empty(empty);
    }
    let mut out = format!(
        "{:<36}  {:<24} {:<12} {:<24} {}\n",
        "Id", "Name", "Student ID", "Department", "Year"
    );
    for student in &view.students {
        let _ = writeln!(
            out,
            "{:<36}  {:<24} {:<12} {:<24} {}",
            student.id, student.name, student.student_code, student.department, student.year
        );
    }
    out
}

pub fn render_activities(view: &ActivityListView) -> String {
    if let Some(empty) = &view.empty_state {
        return render_empty(empty);
    }
    let mut out = String::new();
    for card in &view.cards {
        let _ = writeln!(out, "{} [{}] {}", card.title, card.type_label, card.status_label);
        let _ = writeln!(
            out,
            "  due {}{} | max score {} | id {}",
            card.due_label,
            if card.overdue { " (past due)" } else { "" },
            card.max_score,
            card.id
        );
        if let Some(description) = &card.description {
            let _ = writeln!(out, "  {description}");
        }
    }
    out
}

pub fn render_dashboard(view: &DashboardView) -> String {
    let stats = &view.stats;
    let mut out = format!("Dashboard for {}\n", view.date);
    let _ = writeln!(
        out,
        "Students {} | Present {} | Late {} | Absent {} | Attendance {}%",
        stats.total_students, stats.present, stats.late, stats.absent, stats.percentage
    );
    let _ = writeln!(
        out,
        "Activities {} | Active {} | Completed {} | Cancelled {}\n",
        view.activities.total,
        view.activities.active,
        view.activities.completed,
        view.activities.cancelled
    );
    out.push_str(&render_attendance_rows(&view.recent));
    out
}

pub fn render_analytics(view: &AnalyticsView) -> String {
    let stats = &view.stats;
    let mut out = format!(
        "Attendance on {}: {}% ({} present, {} late, {} absent of {})\n",
        view.date, stats.percentage, stats.present, stats.late, stats.absent, stats.total_students
    );
    for department in &view.departments {
        let _ = writeln!(
            out,
            "  {:<28} {:>3}%  {}/{}",
            department.department,
            department.percentage,
            department.attended,
            department.total_students
        );
    }
    out
}

pub fn render_key_values(value: &Value) -> String {
    let mut out = String::new();
    if let Value::Object(fields) = value {
        for (key, field) in fields {
            let text = match field {
                Value::String(text) => text.clone(),
                Value::Null => "-".to_string(),
                other => other.to_string(),
            };
            let _ = writeln!(out, "{key}: {text}");
        }
    }
    out
}

fn render_empty(empty: &EmptyState) -> String {
    format!("{}\n{}\n", empty.title, empty.hint)
}

use chrono::{NaiveDate, NaiveTime};
use rollcall_core::{
    open_db, open_db_in_memory, AttendanceService, AttendanceServiceError, AttendanceStatus, FixedClock,
    MarkAttendanceRequest, NewStudent, QueryCache, QueryKey, SqliteAttendanceRepository,
    SqliteStudentRepository, Student, StudentService, MANUAL_ENTRY_METHOD,
};
use rusqlite::Connection;
use std::sync::Arc;
use uuid::Uuid;

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 12, 27).unwrap()
}

fn attendance_at<'conn>(
    conn: &'conn Connection,
    cache: &Arc<QueryCache>,
    hour: u32,
    minute: u32,
) -> AttendanceService<
    SqliteStudentRepository<'conn>,
    SqliteAttendanceRepository<'conn>,
    FixedClock,
> {
    AttendanceService::new(
        SqliteStudentRepository::new(conn),
        SqliteAttendanceRepository::new(conn),
        FixedClock::at(day(), hour, minute, 0).unwrap(),
        Arc::clone(cache),
    )
}

fn enroll(conn: &Connection, cache: &Arc<QueryCache>, name: &str, code: &str) -> Student {
    StudentService::new(SqliteStudentRepository::new(conn), Arc::clone(cache))
        .create_student(&NewStudent {
            name: name.to_string(),
            student_code: code.to_string(),
            department: "Computer Science".to_string(),
            year: "2nd Year".to_string(),
            ..NewStudent::default()
        })
        .unwrap()
}

fn row_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM attendance;", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn manual_mark_returns_joined_entry() {
    let conn = open_db_in_memory().unwrap();
    let cache = QueryCache::shared();
    let emma = enroll(&conn, &cache, "Emma Wilson", "CS2024001");

    let entry = attendance_at(&conn, &cache, 9, 5)
        .mark_attendance(
            &MarkAttendanceRequest::new(emma.id, AttendanceStatus::Present)
                .with_method(MANUAL_ENTRY_METHOD),
        )
        .unwrap();

    assert_eq!(entry.student_name, "Emma Wilson");
    assert_eq!(entry.student_code, "CS2024001");
    assert_eq!(entry.record.date, day());
    assert_eq!(entry.record.time, NaiveTime::from_hms_opt(9, 5, 0).unwrap());
    assert_eq!(entry.record.status, AttendanceStatus::Present);
    assert_eq!(entry.record.method, "Manual Entry");
}

#[test]
fn repeated_marks_keep_one_row_with_last_write() {
    let conn = open_db_in_memory().unwrap();
    let cache = QueryCache::shared();
    let emma = enroll(&conn, &cache, "Emma Wilson", "CS2024001");

    let first = attendance_at(&conn, &cache, 9, 5)
        .mark_attendance(&MarkAttendanceRequest::new(emma.id, AttendanceStatus::Present))
        .unwrap();
    let second = attendance_at(&conn, &cache, 9, 40)
        .mark_attendance(
            &MarkAttendanceRequest::new(emma.id, AttendanceStatus::Late)
                .with_method(MANUAL_ENTRY_METHOD),
        )
        .unwrap();

    assert_eq!(row_count(&conn), 1);
    assert_eq!(second.record.id, first.record.id);
    assert_eq!(second.record.status, AttendanceStatus::Late);
    assert_eq!(second.record.method, MANUAL_ENTRY_METHOD);
    assert_eq!(second.record.time, NaiveTime::from_hms_opt(9, 40, 0).unwrap());

    let listed = attendance_at(&conn, &cache, 10, 0).list_today().unwrap();
    assert_eq!(listed, vec![second]);
}

#[test]
fn identical_marks_are_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let cache = QueryCache::shared();
    let emma = enroll(&conn, &cache, "Emma Wilson", "CS2024001");
    let service = attendance_at(&conn, &cache, 9, 5);
    let request = MarkAttendanceRequest::new(emma.id, AttendanceStatus::Present);

    let first = service.mark_attendance(&request).unwrap();
    let again = service.mark_attendance(&request).unwrap();

    assert_eq!(first, again);
    assert_eq!(row_count(&conn), 1);
}

#[test]
fn missing_method_defaults_to_face_recognition() {
    let conn = open_db_in_memory().unwrap();
    let cache = QueryCache::shared();
    let emma = enroll(&conn, &cache, "Emma Wilson", "CS2024001");

    let entry = attendance_at(&conn, &cache, 9, 5)
        .mark_attendance(
            &MarkAttendanceRequest::new(emma.id, AttendanceStatus::Present).with_method("  "),
        )
        .unwrap();
    assert_eq!(entry.record.method, "Face Recognition");
}

#[test]
fn unknown_student_writes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let cache = QueryCache::shared();
    let ghost = Uuid::new_v4();

    let err = attendance_at(&conn, &cache, 9, 5)
        .mark_attendance(&MarkAttendanceRequest::new(ghost, AttendanceStatus::Present))
        .unwrap_err();

    assert!(matches!(err, AttendanceServiceError::StudentNotFound(id) if id == ghost));
    assert_eq!(row_count(&conn), 0);
}

#[test]
fn mark_invalidates_attendance_and_stats_only() {
    let conn = open_db_in_memory().unwrap();
    let cache = QueryCache::shared();
    let emma = enroll(&conn, &cache, "Emma Wilson", "CS2024001");
    enroll(&conn, &cache, "Liam Chen", "CS2024002");
    let service = attendance_at(&conn, &cache, 9, 5);

    let before = service.stats_today().unwrap();
    assert_eq!(before.total_students, 2);
    assert_eq!(before.percentage, 0);
    assert!(service.list_today().unwrap().is_empty());
    assert!(service.roster_for(day()).is_ok());
    assert!(cache.contains(QueryKey::Students));
    assert!(cache.contains(QueryKey::AttendanceStats(day())));

    service
        .mark_attendance(&MarkAttendanceRequest::new(emma.id, AttendanceStatus::Present))
        .unwrap();

    assert!(!cache.contains(QueryKey::Attendance(day())));
    assert!(!cache.contains(QueryKey::AttendanceStats(day())));
    assert!(cache.contains(QueryKey::Students));

    let after = service.stats_today().unwrap();
    assert_eq!(after.present, 1);
    assert_eq!(after.absent, 1);
    assert_eq!(after.percentage, 50);
    assert_eq!(service.list_today().unwrap().len(), 1);
}

#[test]
fn roster_pairs_every_student_with_their_mark() {
    let conn = open_db_in_memory().unwrap();
    let cache = QueryCache::shared();
    let emma = enroll(&conn, &cache, "Emma Wilson", "CS2024001");
    let liam = enroll(&conn, &cache, "Liam Chen", "CS2024002");
    let service = attendance_at(&conn, &cache, 9, 5);

    service
        .mark_attendance(&MarkAttendanceRequest::new(emma.id, AttendanceStatus::Late))
        .unwrap();

    let roster = service.roster_for(day()).unwrap();
    assert_eq!(roster.len(), 2);
    let emma_row = roster.iter().find(|row| row.student.id == emma.id).unwrap();
    let liam_row = roster.iter().find(|row| row.student.id == liam.id).unwrap();
    assert_eq!(emma_row.status(), AttendanceStatus::Late);
    assert!(liam_row.entry.is_none());
    assert_eq!(liam_row.status(), AttendanceStatus::Absent);

    let departments = service.department_breakdown_for(day()).unwrap();
    assert_eq!(departments.len(), 1);
    assert_eq!(departments[0].department, "Computer Science");
    assert_eq!(departments[0].attended, 1);
    assert_eq!(departments[0].percentage, 50);
}

#[test]
fn marks_on_other_days_do_not_count_today() {
    let conn = open_db_in_memory().unwrap();
    let cache = QueryCache::shared();
    let emma = enroll(&conn, &cache, "Emma Wilson", "CS2024001");

    attendance_at(&conn, &cache, 9, 5)
        .mark_attendance(&MarkAttendanceRequest::new(emma.id, AttendanceStatus::Present))
        .unwrap();

    let next_day = AttendanceService::new(
        SqliteStudentRepository::new(&conn),
        SqliteAttendanceRepository::new(&conn),
        FixedClock::at(day().succ_opt().unwrap(), 9, 0, 0).unwrap(),
        Arc::clone(&cache),
    );
    let stats = next_day.stats_today().unwrap();
    assert_eq!(stats.present, 0);
    assert_eq!(stats.absent, 1);
    assert!(next_day.list_today().unwrap().is_empty());
}

#[test]
fn marks_from_two_connections_share_one_row() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rollcall.sqlite3");
    let front_desk = open_db(&path).unwrap();
    let lecture_hall = open_db(&path).unwrap();
    let front_cache = QueryCache::shared();
    let hall_cache = QueryCache::shared();
    let emma = enroll(&front_desk, &front_cache, "Emma Wilson", "CS2024001");

    attendance_at(&front_desk, &front_cache, 9, 5)
        .mark_attendance(&MarkAttendanceRequest::new(emma.id, AttendanceStatus::Present))
        .unwrap();
    let late = attendance_at(&lecture_hall, &hall_cache, 9, 20)
        .mark_attendance(&MarkAttendanceRequest::new(emma.id, AttendanceStatus::Late))
        .unwrap();

    assert_eq!(row_count(&front_desk), 1);
    let seen = attendance_at(&front_desk, &QueryCache::shared(), 12, 0)
        .list_for_date(day())
        .unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].record.id, late.record.id);
    assert_eq!(seen[0].record.status, AttendanceStatus::Late);
}

#[test]
fn concurrent_writers_never_duplicate_a_day() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rollcall.sqlite3");
    let setup = open_db(&path).unwrap();
    let emma = enroll(&setup, &QueryCache::shared(), "Emma Wilson", "CS2024001");

    std::thread::scope(|scope| {
        for (minute, status) in [(5, AttendanceStatus::Present), (6, AttendanceStatus::Late)] {
            let path = &path;
            scope.spawn(move || {
                let conn = open_db(path).unwrap();
                let cache = QueryCache::shared();
                for _ in 0..20 {
                    attendance_at(&conn, &cache, 9, minute)
                        .mark_attendance(&MarkAttendanceRequest::new(emma.id, status))
                        .unwrap();
                }
            });
        }
    });

    assert_eq!(row_count(&setup), 1);
}

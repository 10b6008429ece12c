use migration::ledger::{self, Unit};
use migration::runner::{self, UnitEvent};
use migration::LedgerError;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use sea_orm_migration::prelude::*;

async fn memory_db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).min_connections(1).sqlx_logging(false);
    Database::connect(opts)
        .await
        .expect("Failed to connect to in-memory db")
}

struct CreatesThenFails;

impl MigrationName for CreatesThenFails {
    fn name(&self) -> &str {
        "m_creates_then_fails"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreatesThenFails {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("half_done"))
                    .col(ColumnDef::new(Alias::new("id")).integer().primary_key())
                    .to_owned(),
            )
            .await?;
        manager
            .alter_table(
                Table::alter()
                    .table(Alias::new("table_that_does_not_exist"))
                    .add_column(ColumnDef::new(Alias::new("x")).integer().null())
                    .to_owned(),
            )
            .await
    }
}

struct CreatesMarker;

impl MigrationName for CreatesMarker {
    fn name(&self) -> &str {
        "m_creates_marker"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreatesMarker {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("marker"))
                    .col(ColumnDef::new(Alias::new("id")).integer().primary_key())
                    .to_owned(),
            )
            .await
    }
}

#[tokio::test]
async fn applies_every_unit_once() {
    let db = memory_db().await;

    let first = runner::apply_pending(&db).await.expect("first run");
    assert_eq!(first.len(), ledger::units().len());

    let second = runner::apply_pending(&db).await.expect("second run");
    assert!(second.is_empty(), "re-applying must be a no-op");

    let status = runner::status(&db).await.unwrap();
    assert!(status.iter().all(|s| s.applied));
}

#[tokio::test]
async fn every_declared_table_exists_after_apply() {
    let db = memory_db().await;
    runner::apply_pending(&db).await.unwrap();

    let manager = SchemaManager::new(&db);
    for table in [
        "users",
        "subjects",
        "student_profiles",
        "teacher_profiles",
        "courses",
        "course_enrollments",
        "assessments",
        "student_answers",
        "assignments",
        "assignment_submissions",
        "system_settings",
        "accessibility_preferences",
        "exams",
        "exam_attempts",
    ] {
        assert!(manager.has_table(table).await.unwrap(), "missing table {table}");
    }

    assert!(manager.has_column("student_answers", "ai_detection_result").await.unwrap());
    assert!(manager.has_column("assignment_submissions", "submission_file_size").await.unwrap());
    assert!(manager.has_column("teacher_profiles", "approval_status").await.unwrap());
    assert!(manager.has_column("course_enrollments", "approved_at").await.unwrap());

    for (table, index) in [
        ("course_enrollments", "idx_course_enrollments_course_student"),
        ("student_answers", "idx_student_answers_assessment_student"),
        ("assignment_submissions", "idx_assignment_submissions_assignment_student"),
        ("exam_attempts", "idx_exam_attempts_open"),
    ] {
        assert!(manager.has_index(table, index).await.unwrap(), "missing index {index}");
    }
}

#[tokio::test]
async fn failing_unit_is_rolled_back_and_not_recorded() {
    let db = memory_db().await;
    let units = vec![
        Unit::new(CreatesMarker, &[]),
        Unit::new(CreatesThenFails, &["m_creates_marker"]),
    ];
    let units = ledger::resolve(units).unwrap();

    let mut events = Vec::new();
    let err = runner::apply_units(&db, &units, |e| {
        events.push(match e {
            UnitEvent::Started(n) => format!("start:{n}"),
            UnitEvent::Applied(n, _) => format!("applied:{n}"),
            UnitEvent::Failed(n, _) => format!("failed:{n}"),
            UnitEvent::Skipped(n) => format!("skipped:{n}"),
        })
    })
    .await
    .unwrap_err();

    assert!(matches!(err, LedgerError::Apply { ref unit, .. } if unit == "m_creates_then_fails"));
    assert_eq!(
        events,
        vec![
            "start:m_creates_marker",
            "applied:m_creates_marker",
            "start:m_creates_then_fails",
            "failed:m_creates_then_fails",
        ]
    );

    let manager = SchemaManager::new(&db);
    assert!(manager.has_table("marker").await.unwrap());
    assert!(!manager.has_table("half_done").await.unwrap());

    let applied = runner::applied_versions(&db).await.unwrap();
    assert!(applied.contains("m_creates_marker"));
    assert!(!applied.contains("m_creates_then_fails"));
}

#[tokio::test]
async fn table_created_outside_the_ledger_aborts_the_run() {
    let db = memory_db().await;
    db.execute(Statement::from_string(
        db.get_database_backend(),
        "CREATE TABLE users (id INTEGER PRIMARY KEY)".to_owned(),
    ))
    .await
    .unwrap();

    let err = runner::apply_pending(&db).await.unwrap_err();
    assert!(matches!(err, LedgerError::Apply { ref unit, .. } if unit == "m202510010001_create_users"));

    let applied = runner::applied_versions(&db).await.unwrap();
    assert!(applied.is_empty());
}

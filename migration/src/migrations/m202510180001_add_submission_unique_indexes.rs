use sea_orm_migration::prelude::*;

pub const DEPENDS_ON: &[&str] = &[
    "m202510010007_create_student_answers",
    "m202510010009_create_assignment_submissions",
    "m202510120002_create_exam_attempts",
];

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m202510180001_add_submission_unique_indexes"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name("idx_student_answers_assessment_student")
                    .table(Alias::new("student_answers"))
                    .col(Alias::new("assessment_id"))
                    .col(Alias::new("student_id"))
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_assignment_submissions_assignment_student")
                    .table(Alias::new("assignment_submissions"))
                    .col(Alias::new("assignment_id"))
                    .col(Alias::new("student_id"))
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Closed attempts may repeat; only one open attempt per student and exam.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX idx_exam_attempts_open \
                 ON exam_attempts (exam_id, student_id) WHERE submitted_at IS NULL",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, table) in [
            ("idx_exam_attempts_open", "exam_attempts"),
            ("idx_assignment_submissions_assignment_student", "assignment_submissions"),
            ("idx_student_answers_assessment_student", "student_answers"),
        ] {
            manager
                .drop_index(Index::drop().name(name).table(Alias::new(table)).to_owned())
                .await?;
        }
        Ok(())
    }
}

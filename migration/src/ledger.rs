//! Dependency-linked ledger of schema-change units.
//!
//! Every unit names the units it builds on. The apply order is a topological
//! sort of that graph; among units that are ready at the same time the one
//! declared first wins, so the order is stable across runs.

use crate::migrations::*;
use sea_orm_migration::prelude::*;
use std::collections::HashSet;

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("migration `{0}` is declared more than once")]
    DuplicateUnit(String),

    #[error("migration `{unit}` depends on unknown migration `{dependency}`")]
    MissingDependency { unit: String, dependency: String },

    #[error("dependency cycle between migrations: {}", .0.join(", "))]
    Cycle(Vec<String>),

    #[error("migration `{unit}` failed: {source}")]
    Apply {
        unit: String,
        #[source]
        source: DbErr,
    },

    #[error(transparent)]
    Db(#[from] DbErr),
}

/// One schema-change declaration together with its predecessors.
pub struct Unit {
    name: String,
    depends_on: &'static [&'static str],
    migration: Box<dyn MigrationTrait>,
}

impl Unit {
    pub fn new<M>(migration: M, depends_on: &'static [&'static str]) -> Self
    where
        M: MigrationTrait + 'static,
    {
        Self {
            name: migration.name().to_string(),
            depends_on,
            migration: Box::new(migration),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn depends_on(&self) -> &'static [&'static str] {
        self.depends_on
    }

    pub fn migration(&self) -> &dyn MigrationTrait {
        self.migration.as_ref()
    }

    pub fn into_migration(self) -> Box<dyn MigrationTrait> {
        self.migration
    }
}

impl std::fmt::Debug for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Unit")
            .field("name", &self.name)
            .field("depends_on", &self.depends_on)
            .finish()
    }
}

/// All declared units, in declaration order.
pub fn units() -> Vec<Unit> {
    vec![
        Unit::new(
            m202510010001_create_users::Migration,
            m202510010001_create_users::DEPENDS_ON,
        ),
        Unit::new(
            m202510010002_create_subjects::Migration,
            m202510010002_create_subjects::DEPENDS_ON,
        ),
        Unit::new(
            m202510010003_create_profiles::Migration,
            m202510010003_create_profiles::DEPENDS_ON,
        ),
        Unit::new(
            m202510010004_create_courses::Migration,
            m202510010004_create_courses::DEPENDS_ON,
        ),
        Unit::new(
            m202510010005_create_course_enrollments::Migration,
            m202510010005_create_course_enrollments::DEPENDS_ON,
        ),
        Unit::new(
            m202510010006_create_assessments::Migration,
            m202510010006_create_assessments::DEPENDS_ON,
        ),
        Unit::new(
            m202510010007_create_student_answers::Migration,
            m202510010007_create_student_answers::DEPENDS_ON,
        ),
        Unit::new(
            m202510010008_create_assignments::Migration,
            m202510010008_create_assignments::DEPENDS_ON,
        ),
        Unit::new(
            m202510010009_create_assignment_submissions::Migration,
            m202510010009_create_assignment_submissions::DEPENDS_ON,
        ),
        Unit::new(
            m202510010010_create_system_settings::Migration,
            m202510010010_create_system_settings::DEPENDS_ON,
        ),
        Unit::new(
            m202510010011_create_accessibility_preferences::Migration,
            m202510010011_create_accessibility_preferences::DEPENDS_ON,
        ),
        Unit::new(
            m202510080001_add_assessment_questions_file::Migration,
            m202510080001_add_assessment_questions_file::DEPENDS_ON,
        ),
        Unit::new(
            m202510080002_add_student_answer_file_and_ai_detection::Migration,
            m202510080002_add_student_answer_file_and_ai_detection::DEPENDS_ON,
        ),
        Unit::new(
            m202510080003_add_assignment_files_and_ai_detection::Migration,
            m202510080003_add_assignment_files_and_ai_detection::DEPENDS_ON,
        ),
        Unit::new(
            m202510120001_create_exams::Migration,
            m202510120001_create_exams::DEPENDS_ON,
        ),
        Unit::new(
            m202510120002_create_exam_attempts::Migration,
            m202510120002_create_exam_attempts::DEPENDS_ON,
        ),
        Unit::new(
            m202510150001_add_teacher_approval_status::Migration,
            m202510150001_add_teacher_approval_status::DEPENDS_ON,
        ),
        Unit::new(
            m202510150002_add_enrollment_approved_at::Migration,
            m202510150002_add_enrollment_approved_at::DEPENDS_ON,
        ),
        Unit::new(
            m202510180001_add_submission_unique_indexes::Migration,
            m202510180001_add_submission_unique_indexes::DEPENDS_ON,
        ),
    ]
}

/// Orders `units` so that every unit comes after all of its predecessors.
pub fn resolve(units: Vec<Unit>) -> Result<Vec<Unit>, LedgerError> {
    let mut declared = HashSet::new();
    for unit in &units {
        if !declared.insert(unit.name.clone()) {
            return Err(LedgerError::DuplicateUnit(unit.name.clone()));
        }
    }

    for unit in &units {
        if let Some(missing) = unit.depends_on.iter().find(|d| !declared.contains(**d)) {
            return Err(LedgerError::MissingDependency {
                unit: unit.name.clone(),
                dependency: ToString::to_string(missing),
            });
        }
    }

    let total = units.len();
    let mut pending: Vec<Option<Unit>> = units.into_iter().map(Some).collect();
    let mut emitted: HashSet<String> = HashSet::with_capacity(total);
    let mut ordered = Vec::with_capacity(total);

    while ordered.len() < total {
        let ready = pending.iter_mut().find(|slot| match slot {
            Some(unit) => unit.depends_on.iter().all(|d| emitted.contains(*d)),
            None => false,
        });

        match ready.and_then(Option::take) {
            Some(unit) => {
                emitted.insert(unit.name.clone());
                ordered.push(unit);
            }
            None => {
                let stuck = pending.iter().flatten().map(|u| u.name.clone()).collect();
                return Err(LedgerError::Cycle(stuck));
            }
        }
    }

    Ok(ordered)
}

/// The declared ledger in apply order.
pub fn ordered() -> Result<Vec<Unit>, LedgerError> {
    resolve(units())
}

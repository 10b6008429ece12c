use crate::seed::Seeder;
use async_trait::async_trait;
use db::models::subject;
use sea_orm::{DatabaseConnection, DbErr};

/// Reference subjects as `(code, name, description)`.
pub const SUBJECTS: [(&str, &str, &str); 10] = [
    ("MATH", "Mathematics", "Algebra, geometry, calculus and statistics"),
    ("PHYS", "Physics", "Mechanics, waves, electricity and modern physics"),
    ("CHEM", "Chemistry", "Matter, reactions and laboratory practice"),
    ("BIO", "Biology", "Living systems from cells to ecosystems"),
    ("ENG", "English", "Reading, writing and literature"),
    ("HIST", "History", "World and regional history"),
    ("GEO", "Geography", "Physical and human geography"),
    ("CS", "Computer Science", "Programming, algorithms and computing systems"),
    ("ECON", "Economics", "Markets, money and economic policy"),
    ("ART", "Art", "Visual arts, design and art history"),
];

#[derive(Debug, Default, Clone, PartialEq)]
pub struct SeedReport {
    pub created_count: usize,
    /// Codes that were already present and left untouched.
    pub existing: Vec<String>,
}

/// Inserts every reference subject whose code is not stored yet. Existing
/// rows are never modified, so running it again is harmless.
pub async fn seed_subjects(db: &DatabaseConnection) -> Result<SeedReport, DbErr> {
    let mut report = SeedReport::default();

    for (code, name, description) in SUBJECTS {
        let (_, created) = subject::Model::insert_if_absent(db, code, name, description).await?;
        if created {
            report.created_count += 1;
        } else {
            tracing::warn!(code, "Subject already exists, skipping");
            report.existing.push(code.to_string());
        }
    }

    Ok(report)
}

pub struct SubjectSeeder;

#[async_trait]
impl Seeder for SubjectSeeder {
    async fn seed(&self, db: &DatabaseConnection) -> Result<String, DbErr> {
        let report = seed_subjects(db).await?;
        Ok(format!(
            "{} created, {} already present",
            report.created_count,
            report.existing.len()
        ))
    }
}

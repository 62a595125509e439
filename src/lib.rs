pub mod batch;
pub mod cache;
pub mod embedding;
pub mod error;
pub mod logging;
pub mod matching;
pub mod skill_normalizer;

pub use error::MatchError;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Seniority band declared on a job or inferred from a candidate's history.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ExperienceLevel {
    Entry,
    Mid,
    Senior,
    Lead,
    Executive,
}

impl ExperienceLevel {
    /// Position on the entry→executive ladder, for ordinal comparison.
    pub fn ordinal(self) -> u8 {
        match self {
            ExperienceLevel::Entry => 0,
            ExperienceLevel::Mid => 1,
            ExperienceLevel::Senior => 2,
            ExperienceLevel::Lead => 3,
            ExperienceLevel::Executive => 4,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum EmploymentType {
    FullTime,
    PartTime,
    Contract,
    Internship,
    Temporary,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum JobStatus {
    #[default]
    Open,
    Paused,
    Closed,
}

/// Self-reported proficiency on a candidate skill.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SkillProficiency {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl SkillProficiency {
    pub fn weight(self) -> f64 {
        match self {
            SkillProficiency::Beginner => 0.4,
            SkillProficiency::Intermediate => 0.6,
            SkillProficiency::Advanced => 0.8,
            SkillProficiency::Expert => 1.0,
        }
    }
}

/// Annual salary band, currency-agnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryRange {
    pub min: u32,
    pub max: u32,
}

impl SalaryRange {
    pub fn width(&self) -> u32 {
        self.max.saturating_sub(self.min)
    }
}

/// Job posting as synced from the listings subsystem. Read-only input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: i64,
    pub title: String,
    pub company: Option<String>,
    pub description: String,
    pub requirements: Option<String>,
    pub skills: Vec<String>,
    pub location: Option<String>,
    pub employment_type: Option<EmploymentType>,
    pub experience_level: Option<ExperienceLevel>,
    pub salary_range: Option<SalaryRange>,
    pub status: JobStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateSkill {
    pub name: String,
    pub category: Option<String>,
    pub proficiency: Option<SkillProficiency>,
    pub years: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub company: String,
    pub position: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub is_current: bool,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EducationEntry {
    pub institution: String,
    pub degree: String,
    pub field: Option<String>,
    pub graduated: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidatePreferences {
    pub locations: Vec<String>,
    pub employment_types: Vec<EmploymentType>,
    pub salary_range: Option<SalaryRange>,
    pub remote_ok: bool,
}

/// Candidate profile assembled by the extraction/embedding subsystem.
/// Never mutated here; the embedding vector is optional and may lag the
/// rest of the profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub user_id: i64,
    pub summary: Option<String>,
    pub skills: Vec<CandidateSkill>,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
    pub embedding: Option<Vec<f32>>,
    pub preferences: Option<CandidatePreferences>,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Skill overlap between a job's requirements and a candidate's stack.
/// `matched` and `missing` hold canonical (normalized) skill names;
/// together they cover the job's normalized skill set exactly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillsAlignment {
    pub matched: Vec<String>,
    pub missing: Vec<String>,
    pub match_ratio: f64,
    pub proficiency_score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceMatch {
    pub level_alignment: f64,
    pub domain_relevance: f64,
    pub recency_boost: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtherFactors {
    pub location_match: f64,
    pub employment_type_match: f64,
    pub salary_alignment: f64,
    pub company_fit: f64,
}

/// The raw factor values behind a score, each in [0, 1]. Computed fresh
/// on every engine call; never cached standalone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchFactors {
    pub semantic_similarity: f64,
    pub skills_alignment: SkillsAlignment,
    pub experience_match: ExperienceMatch,
    pub other_factors: OtherFactors,
}

/// The weighted 0-100 score. `overall` is the weighted combination of the
/// four component scores; each component is rounded independently for
/// display.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchScore {
    pub overall: u8,
    pub semantic: u8,
    pub skills: u8,
    pub experience: u8,
    pub other: u8,
    pub confidence: f64,
}

/// The cacheable unit: one scored (job, candidate) pair. Becomes stale
/// when the profile or embedding changes; staleness is signaled by the
/// caller via cache invalidation, never tracked here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobCandidateMatch {
    pub job_id: i64,
    pub user_id: i64,
    pub score: MatchScore,
    pub factors: MatchFactors,
    pub calculated_at: DateTime<Utc>,
    pub reasoning: Vec<String>,
}

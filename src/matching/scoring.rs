use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use chrono::{NaiveDate, Utc};
use tracing::{debug, error};

use super::experience::{infer_level, score_experience, total_experience_years};
use super::factors::{
    ExperienceMatch, JobCandidateMatch, MatchFactors, MatchScore, OtherFactors, SkillsAlignment,
};
use super::preferences::score_other_factors;
use super::skills::score_skills;
use super::stats::{EngineStats, StatsRecorder};
use super::weights::MatchWeights;
use crate::embedding::{cosine_similarity, JobEmbeddingSource, UnavailableJobEmbeddings};
use crate::error::MatchError;
use crate::skill_normalizer::SkillNormalizer;
use crate::{CandidateProfile, Job};

// Component weights inside each factor group (out of 100).
const SKILLS_RATIO_SHARE: f64 = 70.0;
const SKILLS_PROFICIENCY_SHARE: f64 = 30.0;
const EXPERIENCE_LEVEL_SHARE: f64 = 50.0;
const EXPERIENCE_DOMAIN_SHARE: f64 = 30.0;
const EXPERIENCE_RECENCY_SHARE: f64 = 20.0;
const OTHER_LOCATION_SHARE: f64 = 30.0;
const OTHER_EMPLOYMENT_SHARE: f64 = 25.0;
const OTHER_SALARY_SHARE: f64 = 25.0;
const OTHER_COMPANY_SHARE: f64 = 20.0;

/// Per-call overrides for [`MatchingEngine::calculate_match`].
#[derive(Debug, Clone, Default)]
pub struct MatchOptions {
    pub weights: Option<MatchWeights>,
}

/// Combines the four weighted factor groups into a 0-100 score with
/// reasoning and confidence.
///
/// Deterministic arithmetic over the supplied inputs: the only external
/// capability is the injected [`JobEmbeddingSource`], and its unavailable
/// state zeroes the semantic factor rather than erroring. The engine is
/// `Send + Sync`; the only interior mutation is the stats recorder.
pub struct MatchingEngine {
    normalizer: SkillNormalizer,
    job_embeddings: Box<dyn JobEmbeddingSource>,
    weights: MatchWeights,
    stats: StatsRecorder,
}

impl MatchingEngine {
    pub fn new(job_embeddings: Box<dyn JobEmbeddingSource>) -> Self {
        Self {
            normalizer: SkillNormalizer::new(),
            job_embeddings,
            weights: MatchWeights::default(),
            stats: StatsRecorder::new(),
        }
    }

    /// Engine with no job-embedding pipeline: semantic similarity is 0
    /// for every pair, and the remaining factors carry the score.
    pub fn without_semantic() -> Self {
        Self::new(Box::new(UnavailableJobEmbeddings))
    }

    /// Replace the default weights for every subsequent call.
    pub fn with_weights(mut self, weights: MatchWeights) -> Self {
        self.weights = weights;
        self
    }

    /// The engine's skill dictionary, e.g. for runtime `add_mapping`.
    pub fn normalizer(&self) -> &SkillNormalizer {
        &self.normalizer
    }

    /// Score one (job, candidate) pair.
    ///
    /// Never panics across this boundary: factor computation runs under
    /// `catch_unwind` and an unexpected panic surfaces as
    /// [`MatchError::Internal`]. Successful calls update the running
    /// statistics.
    pub fn calculate_match(
        &self,
        job: &Job,
        candidate: &CandidateProfile,
        options: Option<&MatchOptions>,
    ) -> Result<JobCandidateMatch, MatchError> {
        let started = Instant::now();
        let weights = options
            .and_then(|opts| opts.weights)
            .unwrap_or(self.weights);
        // Options can be built literally, so the sum invariant is
        // re-checked at the call boundary.
        weights.validate()?;

        let computed = panic::catch_unwind(AssertUnwindSafe(|| {
            self.compute(job, candidate, &weights)
        }));

        match computed {
            Ok(result) => {
                let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
                self.stats.record(latency_ms, result.score.overall);
                debug!(
                    job_id = job.id,
                    user_id = candidate.user_id,
                    overall = result.score.overall,
                    confidence = result.score.confidence,
                    latency_ms,
                    "match calculated"
                );
                Ok(result)
            }
            Err(payload) => {
                let message = panic_message(payload);
                error!(
                    job_id = job.id,
                    user_id = candidate.user_id,
                    panic_message = %message,
                    "match computation panicked"
                );
                Err(MatchError::Internal(message))
            }
        }
    }

    pub fn stats(&self) -> EngineStats {
        self.stats.snapshot()
    }

    pub fn reset_stats(&self) {
        self.stats.reset();
    }

    fn compute(
        &self,
        job: &Job,
        candidate: &CandidateProfile,
        weights: &MatchWeights,
    ) -> JobCandidateMatch {
        let today = Utc::now().date_naive();

        let semantic_similarity = self.semantic_similarity(job, candidate);
        let skills_alignment = score_skills(&job.skills, candidate, &self.normalizer);
        let experience_match = score_experience(job, candidate, today);
        let other_factors = score_other_factors(job, candidate);

        let semantic_component = semantic_similarity * 100.0;
        let skills_component = skills_alignment.match_ratio * SKILLS_RATIO_SHARE
            + skills_alignment.proficiency_score * SKILLS_PROFICIENCY_SHARE;
        let experience_component = experience_match.level_alignment * EXPERIENCE_LEVEL_SHARE
            + experience_match.domain_relevance * EXPERIENCE_DOMAIN_SHARE
            + experience_match.recency_boost * EXPERIENCE_RECENCY_SHARE;
        let other_component = other_factors.location_match * OTHER_LOCATION_SHARE
            + other_factors.employment_type_match * OTHER_EMPLOYMENT_SHARE
            + other_factors.salary_alignment * OTHER_SALARY_SHARE
            + other_factors.company_fit * OTHER_COMPANY_SHARE;

        let overall = weights.semantic * semantic_component
            + weights.skills * skills_component
            + weights.experience * experience_component
            + weights.other * other_component;

        let score = MatchScore {
            overall: round_component(overall),
            semantic: round_component(semantic_component),
            skills: round_component(skills_component),
            experience: round_component(experience_component),
            other: round_component(other_component),
            confidence: confidence(semantic_similarity, &skills_alignment, &experience_match),
        };

        let reasoning = build_reasoning(
            &score,
            &skills_alignment,
            &experience_match,
            &other_factors,
            job,
            candidate,
            today,
        );

        JobCandidateMatch {
            job_id: job.id,
            user_id: candidate.user_id,
            score,
            factors: MatchFactors {
                semantic_similarity,
                skills_alignment,
                experience_match,
                other_factors,
            },
            calculated_at: Utc::now(),
            reasoning,
        }
    }

    /// Semantic factor in [0, 1]. Zero whenever either side of the
    /// comparison is missing: no candidate embedding, or the job source
    /// reports unavailable.
    fn semantic_similarity(&self, job: &Job, candidate: &CandidateProfile) -> f64 {
        let Some(candidate_vector) = candidate.embedding.as_deref().filter(|v| !v.is_empty())
        else {
            return 0.0;
        };
        let Some(job_embedding) = self.job_embeddings.embed_job(job) else {
            return 0.0;
        };
        cosine_similarity(candidate_vector, &job_embedding.vector).clamp(0.0, 1.0)
    }
}

fn round_component(value: f64) -> u8 {
    value.clamp(0.0, 100.0).round() as u8
}

fn confidence(
    semantic_similarity: f64,
    skills: &SkillsAlignment,
    experience: &ExperienceMatch,
) -> f64 {
    let mut confidence: f64 = 0.5;
    if semantic_similarity > 0.0 {
        confidence += 0.2;
    }
    if !skills.matched.is_empty() {
        confidence += 0.2;
    }
    if experience.level_alignment > 0.5 {
        confidence += 0.1;
    }
    confidence.min(1.0)
}

fn band_label(overall: u8) -> &'static str {
    if overall >= 80 {
        "Excellent overall fit for this role"
    } else if overall >= 60 {
        "Good overall fit for this role"
    } else if overall >= 40 {
        "Moderate overall fit for this role"
    } else {
        "Poor overall fit for this role"
    }
}

fn summarize_skills(skills: &[String]) -> String {
    const SHOWN: usize = 3;
    let head = skills
        .iter()
        .take(SHOWN)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if skills.len() > SHOWN {
        format!("{head}, ...")
    } else {
        head
    }
}

// Ordered, display-only strings. Nothing here feeds back into scoring.
fn build_reasoning(
    score: &MatchScore,
    skills: &SkillsAlignment,
    experience: &ExperienceMatch,
    other: &OtherFactors,
    job: &Job,
    candidate: &CandidateProfile,
    today: NaiveDate,
) -> Vec<String> {
    let mut reasoning = Vec::with_capacity(5);
    reasoning.push(band_label(score.overall).to_string());

    if !skills.matched.is_empty() {
        reasoning.push(format!(
            "Matches key skills: {}",
            summarize_skills(&skills.matched)
        ));
    }
    if !skills.missing.is_empty() {
        reasoning.push(format!(
            "Missing skills: {}",
            summarize_skills(&skills.missing)
        ));
    }

    let candidate_level = infer_level(total_experience_years(&candidate.experience, today));
    reasoning.push(match job.experience_level {
        None => format!("Role declares no experience level; candidate profiles as {candidate_level}"),
        Some(required) if experience.level_alignment >= 1.0 => {
            format!("Experience level {candidate_level} matches the {required} role")
        }
        Some(required) if experience.level_alignment >= 0.7 => {
            format!("Experience level {candidate_level} is within one step of the {required} role")
        }
        Some(required) => {
            format!("Experience level {candidate_level} is distant from the {required} role")
        }
    });

    reasoning.push(if other.location_match >= 1.0 {
        "Location fits the candidate's preferences".to_string()
    } else {
        "Location fit is uncertain".to_string()
    });

    reasoning
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".into())
}

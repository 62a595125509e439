use std::collections::{HashMap, HashSet};

use super::defaults;
use super::factors::SkillsAlignment;
use crate::skill_normalizer::SkillNormalizer;
use crate::CandidateProfile;

/// Lexical skill alignment between a job's free-text skill list and a
/// candidate's stack. Both sides are normalized first; matching is over
/// canonical names, case-insensitive.
///
/// A job with no listed skills scores a full match ratio: the absence of
/// requirements is not held against the candidate.
pub fn score_skills(
    job_skills: &[String],
    candidate: &CandidateProfile,
    normalizer: &SkillNormalizer,
) -> SkillsAlignment {
    let job_normalized = normalizer.normalize_all(job_skills);

    // Candidate canonical → strongest stated proficiency weight.
    let mut candidate_weights: HashMap<String, f64> = HashMap::new();
    for skill in &candidate.skills {
        let canonical = fold(&normalizer.normalize(&skill.name).canonical);
        if canonical.is_empty() {
            continue;
        }
        let weight = skill
            .proficiency
            .map(|p| p.weight())
            .unwrap_or(defaults::PROFICIENCY_UNSTATED);
        let entry = candidate_weights.entry(canonical).or_insert(weight);
        if weight > *entry {
            *entry = weight;
        }
    }

    let mut seen: HashSet<String> = HashSet::new();
    let mut matched = Vec::new();
    let mut missing = Vec::new();
    let mut matched_weights = Vec::new();

    for skill in &job_normalized {
        let key = fold(&skill.canonical);
        if key.is_empty() || !seen.insert(key.clone()) {
            continue;
        }
        match candidate_weights.get(&key) {
            Some(weight) => {
                matched.push(skill.canonical.clone());
                matched_weights.push(*weight);
            }
            None => missing.push(skill.canonical.clone()),
        }
    }

    let required = matched.len() + missing.len();
    let match_ratio = if required == 0 {
        1.0
    } else {
        matched.len() as f64 / required as f64
    };
    let proficiency_score = if matched_weights.is_empty() {
        0.0
    } else {
        matched_weights.iter().sum::<f64>() / matched_weights.len() as f64
    };

    SkillsAlignment {
        matched,
        missing,
        match_ratio,
        proficiency_score,
    }
}

fn fold(canonical: &str) -> String {
    canonical.to_lowercase()
}

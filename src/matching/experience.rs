use chrono::NaiveDate;

use super::defaults;
use super::factors::ExperienceMatch;
use crate::{CandidateProfile, ExperienceLevel, ExperienceEntry, Job};

const DAYS_PER_YEAR: f64 = 365.25;
const DAYS_PER_MONTH: f64 = 30.44;

// Fixed industry vocabulary for domain relevance. Matching is plain
// substring presence on lowercased text from both sides.
const INDUSTRY_KEYWORDS: &[&str] = &[
    "fintech",
    "banking",
    "payments",
    "insurance",
    "healthcare",
    "biotech",
    "e-commerce",
    "retail",
    "logistics",
    "saas",
    "gaming",
    "education",
    "media",
    "advertising",
    "telecom",
    "automotive",
    "security",
    "analytics",
];

/// Total professional years across all entries. Current roles (or roles
/// with no end date) run through `today`; inverted date ranges contribute
/// nothing.
pub fn total_experience_years(entries: &[ExperienceEntry], today: NaiveDate) -> f64 {
    entries
        .iter()
        .map(|entry| {
            let end = effective_end(entry, today);
            let days = (end - entry.start_date).num_days();
            if days > 0 {
                days as f64 / DAYS_PER_YEAR
            } else {
                0.0
            }
        })
        .sum()
}

fn effective_end(entry: &ExperienceEntry, today: NaiveDate) -> NaiveDate {
    if entry.is_current {
        return today;
    }
    entry.end_date.unwrap_or(today)
}

/// Seniority band inferred from total years.
pub fn infer_level(total_years: f64) -> ExperienceLevel {
    if total_years < 2.0 {
        ExperienceLevel::Entry
    } else if total_years < 5.0 {
        ExperienceLevel::Mid
    } else if total_years < 8.0 {
        ExperienceLevel::Senior
    } else if total_years < 12.0 {
        ExperienceLevel::Lead
    } else {
        ExperienceLevel::Executive
    }
}

/// Ordinal alignment between the job's declared level and the candidate's
/// inferred one. A job with no declared level scores neutrally.
pub fn level_alignment(job_level: Option<ExperienceLevel>, candidate_level: ExperienceLevel) -> f64 {
    let Some(job_level) = job_level else {
        return defaults::LEVEL_UNDECLARED;
    };
    match job_level.ordinal().abs_diff(candidate_level.ordinal()) {
        0 => 1.0,
        1 => 0.7,
        2 => 0.4,
        _ => 0.2,
    }
}

/// Industry overlap between the job posting and the candidate's history.
/// An exact employer-name match short-circuits to full relevance.
pub fn domain_relevance(job: &Job, candidate: &CandidateProfile) -> f64 {
    if let Some(company) = job.company.as_deref().filter(|c| !c.trim().is_empty()) {
        let worked_there = candidate
            .experience
            .iter()
            .any(|entry| entry.company.trim().eq_ignore_ascii_case(company.trim()));
        if worked_there {
            return 1.0;
        }
    }

    let job_text = lower_join(&[
        Some(job.title.as_str()),
        Some(job.description.as_str()),
        job.requirements.as_deref(),
    ]);
    let job_keywords: Vec<&str> = INDUSTRY_KEYWORDS
        .iter()
        .copied()
        .filter(|kw| job_text.contains(kw))
        .collect();
    if job_keywords.is_empty() {
        return 0.0;
    }

    let mut candidate_parts: Vec<Option<&str>> = vec![candidate.summary.as_deref()];
    for entry in &candidate.experience {
        candidate_parts.push(Some(entry.position.as_str()));
        candidate_parts.push(Some(entry.company.as_str()));
        candidate_parts.push(entry.description.as_deref());
    }
    let candidate_text = lower_join(&candidate_parts);

    let shared = job_keywords
        .iter()
        .filter(|kw| candidate_text.contains(*kw))
        .count();
    shared as f64 / job_keywords.len() as f64
}

/// Reward candidates whose most recent role ended recently: full boost
/// under six months (or still employed), linear 0.8 → 0.5 out to two
/// years, floor beyond.
pub fn recency_boost(entries: &[ExperienceEntry], today: NaiveDate) -> f64 {
    if entries.is_empty() {
        return defaults::RECENCY_FLOOR;
    }
    if entries
        .iter()
        .any(|entry| entry.is_current || entry.end_date.is_none())
    {
        return 1.0;
    }

    let latest_end = entries
        .iter()
        .filter_map(|entry| entry.end_date)
        .max()
        .unwrap_or(today);
    let months = (today - latest_end).num_days().max(0) as f64 / DAYS_PER_MONTH;

    if months < 6.0 {
        1.0
    } else if months <= 24.0 {
        0.8 - (months - 6.0) / 18.0 * 0.3
    } else {
        defaults::RECENCY_FLOOR
    }
}

/// Full experience factor group for one (job, candidate) pair.
pub fn score_experience(job: &Job, candidate: &CandidateProfile, today: NaiveDate) -> ExperienceMatch {
    let total_years = total_experience_years(&candidate.experience, today);
    let candidate_level = infer_level(total_years);

    ExperienceMatch {
        level_alignment: level_alignment(job.experience_level, candidate_level),
        domain_relevance: domain_relevance(job, candidate),
        recency_boost: recency_boost(&candidate.experience, today),
    }
}

fn lower_join(parts: &[Option<&str>]) -> String {
    parts
        .iter()
        .flatten()
        .map(|s| s.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

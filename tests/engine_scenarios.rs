//! End-to-end scenarios over the public surface: engine, cache, batch.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use talentmatch::batch::BatchMatcher;
use talentmatch::cache::{InMemoryMatchCache, MatchCache};
use talentmatch::matching::{MatchOptions, MatchWeights, MatchingEngine};
use talentmatch::{
    CandidatePreferences, CandidateProfile, CandidateSkill, ExperienceEntry, ExperienceLevel, Job,
    SalaryRange, SkillProficiency,
};

fn job() -> Job {
    Job {
        id: 100,
        title: "Senior Full-Stack Engineer".into(),
        company: Some("Initech".into()),
        description: "e-commerce checkout team".into(),
        requirements: Some("ship reliable services".into()),
        skills: vec!["React".into(), "Node.js".into(), "MongoDB".into()],
        location: Some("Berlin".into()),
        experience_level: Some(ExperienceLevel::Senior),
        salary_range: Some(SalaryRange {
            min: 120_000,
            max: 180_000,
        }),
        ..Job::default()
    }
}

fn candidate() -> CandidateProfile {
    let today = Utc::now().date_naive();
    CandidateProfile {
        user_id: 7,
        summary: Some("full-stack engineer, e-commerce background".into()),
        skills: ["JavaScript", "React", "Node.js"]
            .iter()
            .map(|name| CandidateSkill {
                name: name.to_string(),
                proficiency: Some(SkillProficiency::Advanced),
                ..CandidateSkill::default()
            })
            .collect(),
        experience: vec![ExperienceEntry {
            company: "Shopline".into(),
            position: "Full-Stack Engineer".into(),
            start_date: today - chrono::Duration::days((9.0 * 365.25) as i64),
            end_date: None,
            is_current: true,
            description: Some("checkout and payments work".into()),
        }],
        preferences: Some(CandidatePreferences {
            locations: vec!["Berlin, Germany".into()],
            employment_types: vec![],
            salary_range: Some(SalaryRange {
                min: 130_000,
                max: 190_000,
            }),
            remote_ok: true,
        }),
        ..CandidateProfile::default()
    }
}

#[test]
fn skills_scenario_two_of_three_match() {
    let engine = MatchingEngine::without_semantic();
    let result = engine.calculate_match(&job(), &candidate(), None).unwrap();

    let alignment = &result.factors.skills_alignment;
    assert!((alignment.match_ratio - 2.0 / 3.0).abs() < 1e-9);
    assert_eq!(alignment.missing, vec!["mongodb"]);

    let mut union: Vec<String> = alignment
        .matched
        .iter()
        .chain(alignment.missing.iter())
        .map(|s| s.to_lowercase())
        .collect();
    union.sort();
    assert_eq!(union, vec!["mongodb", "nodejs", "react"]);
}

#[test]
fn missing_embedding_zeroes_semantic_regardless_of_job() {
    let engine = MatchingEngine::without_semantic();

    for posting in [job(), Job::default()] {
        let result = engine.calculate_match(&posting, &candidate(), None).unwrap();
        assert_eq!(result.factors.semantic_similarity, 0.0);
        assert_eq!(result.score.semantic, 0);
    }
}

#[test]
fn nine_year_candidate_is_one_step_above_a_senior_role() {
    let engine = MatchingEngine::without_semantic();
    let result = engine.calculate_match(&job(), &candidate(), None).unwrap();

    // 9 continuous years infer "lead", one ordinal step from "senior".
    assert!((result.factors.experience_match.level_alignment - 0.7).abs() < 1e-9);
}

#[test]
fn overlapping_salary_bands_align_fully() {
    let engine = MatchingEngine::without_semantic();
    let result = engine.calculate_match(&job(), &candidate(), None).unwrap();

    assert_eq!(result.factors.other_factors.salary_alignment, 1.0);
    assert_eq!(result.factors.other_factors.location_match, 1.0);
}

#[test]
fn overall_stays_in_range_for_any_unit_weight_vector() {
    let engine = MatchingEngine::without_semantic();
    let weight_vectors = [
        MatchWeights::default(),
        MatchWeights::new(1.0, 0.0, 0.0, 0.0).unwrap(),
        MatchWeights::new(0.0, 0.0, 0.0, 1.0).unwrap(),
        MatchWeights::new(0.25, 0.25, 0.25, 0.25).unwrap(),
        MatchWeights::new(0.1, 0.6, 0.2, 0.1).unwrap(),
    ];

    for weights in weight_vectors {
        let options = MatchOptions {
            weights: Some(weights),
        };
        let result = engine
            .calculate_match(&job(), &candidate(), Some(&options))
            .unwrap();

        assert!(result.score.overall <= 100);

        let factors = &result.factors;
        let expected = weights.semantic * (factors.semantic_similarity * 100.0)
            + weights.skills
                * (factors.skills_alignment.match_ratio * 70.0
                    + factors.skills_alignment.proficiency_score * 30.0)
            + weights.experience
                * (factors.experience_match.level_alignment * 50.0
                    + factors.experience_match.domain_relevance * 30.0
                    + factors.experience_match.recency_boost * 20.0)
            + weights.other
                * (factors.other_factors.location_match * 30.0
                    + factors.other_factors.employment_type_match * 25.0
                    + factors.other_factors.salary_alignment * 25.0
                    + factors.other_factors.company_fit * 20.0);
        assert!(
            (result.score.overall as f64 - expected).abs() <= 1.0,
            "overall {} deviates from weighted sum {expected}",
            result.score.overall
        );
    }
}

#[test]
fn repeated_calls_are_idempotent() {
    let engine = MatchingEngine::without_semantic();
    let job = job();
    let candidate = candidate();

    let first = engine.calculate_match(&job, &candidate, None).unwrap();
    let second = engine.calculate_match(&job, &candidate, None).unwrap();

    assert_eq!(first.score, second.score);
    assert_eq!(first.factors, second.factors);
}

#[test]
fn cache_round_trip_expires_and_counts() {
    let engine = MatchingEngine::without_semantic();
    let cache = InMemoryMatchCache::new(Duration::from_millis(10));
    let result = engine.calculate_match(&job(), &candidate(), None).unwrap();

    cache.set(7, 100, result.clone());
    assert_eq!(cache.get(7, 100), Some(result));

    std::thread::sleep(Duration::from_millis(30));
    assert_eq!(cache.get(7, 100), None);

    let stats = cache.stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.expired, 1);
    assert_eq!(stats.size, 0);
}

#[tokio::test]
async fn batch_merges_cache_hits_with_fresh_computation() {
    let engine = Arc::new(MatchingEngine::without_semantic());
    let cache: Arc<dyn MatchCache> = Arc::new(InMemoryMatchCache::new(Duration::from_secs(60)));
    let matcher = BatchMatcher::new(Arc::clone(&engine), Arc::clone(&cache));
    let candidate = candidate();

    let mut second_job = job();
    second_job.id = 101;
    let mut third_job = job();
    third_job.id = 102;

    // Pre-warm one of the three.
    let warmed = engine.calculate_match(&second_job, &candidate, None).unwrap();
    cache.set(candidate.user_id, second_job.id, warmed.clone());

    let results = matcher
        .match_jobs(&candidate, &[job(), second_job, third_job], None)
        .await;

    assert_eq!(results.len(), 3);
    let ids: Vec<i64> = results.iter().map(|r| r.job_id).collect();
    assert_eq!(ids, vec![100, 101, 102]);
    assert_eq!(results[1], warmed);

    // Everything is now cached for the follow-up call.
    let again = matcher
        .match_jobs(&candidate, &[job()], None)
        .await;
    assert_eq!(again[0].job_id, 100);
    assert_eq!(again[0], results[0]);
}

#[test]
fn confidence_reflects_available_signals() {
    let engine = MatchingEngine::without_semantic();
    let scored = engine.calculate_match(&job(), &candidate(), None).unwrap();
    // No semantic signal (+0.0), skills matched (+0.2), level within one
    // step (0.7 > 0.5, +0.1).
    assert!((scored.score.confidence - 0.8).abs() < 1e-9);

    let empty = CandidateProfile {
        user_id: 1,
        ..CandidateProfile::default()
    };
    let bare = engine.calculate_match(&job(), &empty, None).unwrap();
    assert!((bare.score.confidence - 0.5).abs() < 1e-9);
}

#[test]
fn engine_stats_track_successful_calls() {
    let engine = MatchingEngine::without_semantic();
    engine.calculate_match(&job(), &candidate(), None).unwrap();
    engine.calculate_match(&job(), &candidate(), None).unwrap();

    let stats = engine.stats();
    assert_eq!(stats.count, 2);
    assert!(stats.avg_score > 0.0);
    assert!(stats.max_score > 0);

    engine.reset_stats();
    assert_eq!(engine.stats().count, 0);
}

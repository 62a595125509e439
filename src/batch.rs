use std::collections::HashMap;
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::cache::MatchCache;
use crate::matching::{JobCandidateMatch, MatchOptions, MatchingEngine};
use crate::{CandidateProfile, Job};

/// Cache-first fan-out over many jobs for one candidate.
///
/// Cached scores are served as-is; only misses are computed, one task per
/// job, awaited concurrently. A failing job is logged and dropped from
/// the output — partial success is normal and the batch never aborts.
/// No internal timeout: callers impose their own deadlines.
pub struct BatchMatcher {
    engine: Arc<MatchingEngine>,
    cache: Arc<dyn MatchCache>,
}

impl BatchMatcher {
    pub fn new(engine: Arc<MatchingEngine>, cache: Arc<dyn MatchCache>) -> Self {
        Self { engine, cache }
    }

    /// Single-job convenience: serve from cache or compute and
    /// write through.
    pub fn match_job(
        &self,
        candidate: &CandidateProfile,
        job: &Job,
        options: Option<&MatchOptions>,
    ) -> Result<JobCandidateMatch, crate::MatchError> {
        if let Some(cached) = self.cache.get(candidate.user_id, job.id) {
            return Ok(cached);
        }
        let result = self.engine.calculate_match(job, candidate, options)?;
        self.cache.set(candidate.user_id, job.id, result.clone());
        Ok(result)
    }

    /// Score `jobs` for one candidate, merging cached and freshly
    /// computed results in the input job order.
    pub async fn match_jobs(
        &self,
        candidate: &CandidateProfile,
        jobs: &[Job],
        options: Option<&MatchOptions>,
    ) -> Vec<JobCandidateMatch> {
        let job_ids: Vec<i64> = jobs.iter().map(|job| job.id).collect();
        let mut cached = self.cache.get_many(candidate.user_id, &job_ids);
        let cache_hits = cached.values().filter(|v| v.is_some()).count();

        let mut tasks = JoinSet::new();
        for job in jobs {
            if cached.get(&job.id).is_some_and(|hit| hit.is_some()) {
                continue;
            }
            let engine = Arc::clone(&self.engine);
            let job = job.clone();
            let candidate = candidate.clone();
            let options = options.cloned();
            tasks.spawn(async move {
                engine
                    .calculate_match(&job, &candidate, options.as_ref())
                    .map_err(|err| (job.id, err))
            });
        }

        let mut fresh: Vec<JobCandidateMatch> = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(result)) => fresh.push(result),
                Ok(Err((job_id, err))) => {
                    warn!(
                        user_id = candidate.user_id,
                        job_id,
                        code = err.code(),
                        error = %err,
                        "batch match failed for job; skipping"
                    );
                }
                Err(join_err) => {
                    warn!(
                        user_id = candidate.user_id,
                        error = %join_err,
                        "batch match task did not complete; skipping"
                    );
                }
            }
        }

        debug!(
            user_id = candidate.user_id,
            requested = jobs.len(),
            cache_hits,
            computed = fresh.len(),
            "batch match merged"
        );

        if !fresh.is_empty() {
            self.cache.set_many(candidate.user_id, fresh.clone());
        }
        for result in fresh {
            cached.insert(result.job_id, Some(result));
        }

        // Merge back into the caller's job order.
        jobs.iter()
            .filter_map(|job| cached.remove(&job.id).flatten())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryMatchCache;
    use crate::embedding::{Embedding, JobEmbeddingSource};
    use std::time::Duration;

    fn jobs(ids: &[i64]) -> Vec<Job> {
        ids.iter()
            .map(|&id| Job {
                id,
                title: format!("Engineer {id}"),
                description: "backend work".into(),
                skills: vec!["Rust".into()],
                ..Job::default()
            })
            .collect()
    }

    fn candidate() -> CandidateProfile {
        CandidateProfile {
            user_id: 5,
            skills: vec![crate::CandidateSkill {
                name: "rust".into(),
                ..crate::CandidateSkill::default()
            }],
            ..CandidateProfile::default()
        }
    }

    fn matcher() -> BatchMatcher {
        BatchMatcher::new(
            Arc::new(MatchingEngine::without_semantic()),
            Arc::new(InMemoryMatchCache::new(Duration::from_secs(60))),
        )
    }

    #[tokio::test]
    async fn computes_all_jobs_and_preserves_input_order() {
        let matcher = matcher();
        let jobs = jobs(&[3, 1, 2]);

        let results = matcher.match_jobs(&candidate(), &jobs, None).await;

        let ids: Vec<i64> = results.iter().map(|r| r.job_id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[tokio::test]
    async fn second_batch_is_served_from_cache() {
        let matcher = matcher();
        let jobs = jobs(&[1, 2]);
        let candidate = candidate();

        let first = matcher.match_jobs(&candidate, &jobs, None).await;
        let second = matcher.match_jobs(&candidate, &jobs, None).await;

        // calculated_at survives the cache round trip unchanged.
        assert_eq!(first, second);
        let stats = matcher.cache.stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 2);
    }

    /// Panics for one specific job id; exercises failure isolation.
    struct ExplodingOnJob(i64);
    impl JobEmbeddingSource for ExplodingOnJob {
        fn name(&self) -> &'static str {
            "exploding"
        }
        fn dimension(&self) -> usize {
            2
        }
        fn embed_job(&self, job: &Job) -> Option<Embedding> {
            if job.id == self.0 {
                panic!("boom for job {}", job.id);
            }
            Some(Embedding {
                vector: vec![1.0, 0.0],
                created_at: chrono::Utc::now(),
            })
        }
    }

    #[tokio::test]
    async fn one_failing_job_does_not_abort_the_batch() {
        let matcher = BatchMatcher::new(
            Arc::new(MatchingEngine::new(Box::new(ExplodingOnJob(2)))),
            Arc::new(InMemoryMatchCache::new(Duration::from_secs(60))),
        );
        let mut candidate = candidate();
        candidate.embedding = Some(vec![1.0, 0.0]);

        let results = matcher.match_jobs(&candidate, &jobs(&[1, 2, 3]), None).await;

        let ids: Vec<i64> = results.iter().map(|r| r.job_id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn single_job_path_writes_through() {
        let matcher = matcher();
        let job = &jobs(&[9])[0];
        let candidate = candidate();

        let computed = matcher.match_job(&candidate, job, None).unwrap();
        let cached = matcher.match_job(&candidate, job, None).unwrap();

        assert_eq!(computed, cached);
        assert_eq!(matcher.cache.stats().hits, 1);
    }
}

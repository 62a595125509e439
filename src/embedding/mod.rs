pub mod hash_source;
pub mod similarity;

pub use hash_source::HashJobEmbedder;
pub use similarity::{cosine_similarity, normalize};

use crate::Job;

/// A job-side embedding vector plus provenance timestamp.
#[derive(Debug, Clone)]
pub struct Embedding {
    pub vector: Vec<f32>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Capability that supplies job-side embedding vectors.
///
/// The semantic factor only makes sense when the job vector lives in the
/// same space as the candidate's resume embedding. A source therefore has
/// an explicit unavailable state: `embed_job` returning `None` forces the
/// semantic similarity factor to 0 instead of comparing against noise.
pub trait JobEmbeddingSource: Send + Sync {
    /// Implementation name recorded in logs ("none", "hash").
    fn name(&self) -> &'static str;

    /// Output dimensionality; 0 when the source never produces vectors.
    fn dimension(&self) -> usize;

    /// Embedding for `job`, or `None` when unavailable.
    fn embed_job(&self, job: &Job) -> Option<Embedding>;
}

/// The explicit off state: no job embedding pipeline is wired up, so the
/// engine scores semantic similarity as 0 for every job.
pub struct UnavailableJobEmbeddings;

impl JobEmbeddingSource for UnavailableJobEmbeddings {
    fn name(&self) -> &'static str {
        "none"
    }

    fn dimension(&self) -> usize {
        0
    }

    fn embed_job(&self, _job: &Job) -> Option<Embedding> {
        None
    }
}

/// Build a source by name; unknown names fall back to the off state.
pub fn create_source(name: &str, dimension: usize) -> Box<dyn JobEmbeddingSource> {
    match name {
        "hash" => Box::new(HashJobEmbedder::new(dimension)),
        "none" => Box::new(UnavailableJobEmbeddings),
        other => {
            tracing::warn!(requested = other, "unknown job embedder; semantic factor disabled");
            Box::new(UnavailableJobEmbeddings)
        }
    }
}

/// Resolve the source from `TM_JOB_EMBEDDER` / `TM_JOB_EMBED_DIMENSION`.
/// Defaults to the off state.
pub fn source_from_env() -> Box<dyn JobEmbeddingSource> {
    let name = std::env::var("TM_JOB_EMBEDDER").unwrap_or_else(|_| "none".into());
    let dimension = std::env::var("TM_JOB_EMBED_DIMENSION")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(256);
    create_source(&name, dimension)
}

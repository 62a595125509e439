use std::hash::{Hash, Hasher};

use siphasher::sip::SipHasher13;

use super::{Embedding, JobEmbeddingSource};
use crate::Job;

// Fixed seed for deterministic hashing. Changing these values changes every
// produced vector, so bump the embedder name/version wherever it is logged.
const HASH_SEED_K0: u64 = 0x7a1e_44c0_9d3b_5f12;
const HASH_SEED_K1: u64 = 0x2c86_f0de_1b49_a773;

/// Deterministic feature-hashing job embedder.
///
/// Learning-free: tokens from the job's title, skill list, and description
/// are sign-hashed into a fixed-dimension vector and L2-normalized. Only
/// meaningful when the candidate embedding came from the same hasher;
/// production deployments with a real embedding model use their own
/// [`JobEmbeddingSource`] instead.
pub struct HashJobEmbedder {
    dimension: usize,
}

struct WeightedToken {
    token: String,
    weight: f32,
}

impl HashJobEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn hash_token(&self, token: &str) -> usize {
        let mut hasher = SipHasher13::new_with_keys(HASH_SEED_K0, HASH_SEED_K1);
        token.hash(&mut hasher);
        (hasher.finish() as usize) % self.dimension
    }

    fn tokenize(job: &Job) -> Vec<WeightedToken> {
        let mut tokens = Vec::new();

        // Declared skills carry the strongest signal, then the title.
        for skill in &job.skills {
            push_words(&mut tokens, skill, 2.0);
        }
        push_words(&mut tokens, &job.title, 1.5);
        push_words(&mut tokens, &job.description, 1.0);
        if let Some(requirements) = &job.requirements {
            push_words(&mut tokens, requirements, 1.0);
        }

        tokens
    }
}

fn push_words(out: &mut Vec<WeightedToken>, text: &str, weight: f32) {
    for word in text
        .split(|c: char| !c.is_alphanumeric() && c != '#' && c != '+')
        .filter(|w| w.len() >= 2)
    {
        out.push(WeightedToken {
            token: word.to_lowercase(),
            weight,
        });
    }
}

impl JobEmbeddingSource for HashJobEmbedder {
    fn name(&self) -> &'static str {
        "hash"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed_job(&self, job: &Job) -> Option<Embedding> {
        let tokens = Self::tokenize(job);
        if tokens.is_empty() {
            return None;
        }

        let mut vector = vec![0.0f32; self.dimension];
        for wt in &tokens {
            let idx = self.hash_token(&wt.token);
            // Sign hashing keeps expected dot products unbiased.
            let sign = if self.hash_token(&format!("{}_sign", wt.token)) % 2 == 0 {
                1.0
            } else {
                -1.0
            };
            vector[idx] += sign * wt.weight;
        }

        Some(Embedding {
            vector: super::similarity::normalize(&vector),
            created_at: chrono::Utc::now(),
        })
    }
}

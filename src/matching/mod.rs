pub mod experience;
pub mod factors;
pub mod preferences;
pub mod scoring;
pub mod skills;
pub mod stats;
pub mod weights;

pub use factors::{
    ExperienceMatch, JobCandidateMatch, MatchFactors, MatchScore, OtherFactors, SkillsAlignment,
};
pub use scoring::{MatchOptions, MatchingEngine};
pub use stats::EngineStats;
pub use weights::MatchWeights;

/// Default policy for absent optional inputs, in one place. Factor code
/// never invents its own fallback values.
pub(crate) mod defaults {
    /// Unknown or unverifiable input scores neutrally.
    pub const NEUTRAL: f64 = 0.5;
    /// Level alignment when the job declares no experience level.
    pub const LEVEL_UNDECLARED: f64 = 0.5;
    /// Employment-type factor when the candidate states no preference.
    pub const EMPLOYMENT_NO_PREFERENCE: f64 = 0.7;
    /// Employment-type factor on an outright mismatch.
    pub const EMPLOYMENT_MISMATCH: f64 = 0.3;
    /// Salary factor when the ranges do not overlap at all.
    pub const SALARY_NO_OVERLAP: f64 = 0.1;
    /// Company-fit placeholder until a real signal exists.
    pub const COMPANY_FIT: f64 = 0.5;
    /// Recency floor for long-idle candidates.
    pub const RECENCY_FLOOR: f64 = 0.5;
    /// Proficiency weight for a matched skill with no stated proficiency.
    pub const PROFICIENCY_UNSTATED: f64 = 0.6;
}

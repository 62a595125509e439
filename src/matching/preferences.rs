use super::defaults;
use super::factors::OtherFactors;
use crate::{CandidatePreferences, CandidateProfile, Job, SalaryRange};

/// Soft preference factors: location, employment type, salary, company
/// fit. All gaps resolve to the centralized neutral defaults; these
/// signals temper a score, they never veto one.
pub fn score_other_factors(job: &Job, candidate: &CandidateProfile) -> OtherFactors {
    let prefs = candidate.preferences.as_ref();

    OtherFactors {
        location_match: location_match(job.location.as_deref(), prefs),
        employment_type_match: employment_type_match(job, prefs),
        salary_alignment: salary_alignment(job.salary_range.as_ref(), prefs),
        company_fit: defaults::COMPANY_FIT,
    }
}

/// 1.0 when the job has no location, when a stated preference overlaps
/// the job location (substring either direction), or when a remote job
/// meets a remote-accepting candidate; 0.5 otherwise.
fn location_match(job_location: Option<&str>, prefs: Option<&CandidatePreferences>) -> f64 {
    let Some(job_location) = job_location.map(str::trim).filter(|l| !l.is_empty()) else {
        return 1.0;
    };
    let Some(prefs) = prefs else {
        return defaults::NEUTRAL;
    };

    let job_lower = job_location.to_lowercase();
    let overlap = prefs.locations.iter().any(|preferred| {
        let preferred = preferred.trim().to_lowercase();
        !preferred.is_empty()
            && (job_lower.contains(&preferred) || preferred.contains(&job_lower))
    });
    if overlap {
        return 1.0;
    }
    if prefs.remote_ok && job_lower.contains("remote") {
        return 1.0;
    }
    defaults::NEUTRAL
}

/// 1.0 on an exact type match (or an unconstrained job), 0.3 on a
/// mismatch, 0.7 when the candidate states no preference.
fn employment_type_match(job: &Job, prefs: Option<&CandidatePreferences>) -> f64 {
    let Some(job_type) = job.employment_type else {
        return 1.0;
    };
    let stated = prefs
        .map(|p| p.employment_types.as_slice())
        .unwrap_or_default();
    if stated.is_empty() {
        return defaults::EMPLOYMENT_NO_PREFERENCE;
    }
    if stated.contains(&job_type) {
        1.0
    } else {
        defaults::EMPLOYMENT_MISMATCH
    }
}

/// Overlap of the job's band with the candidate's desired band, measured
/// against the narrower of the two once both are clipped to the shared
/// span. Neutral when either side has no range; floored when the bands
/// miss each other entirely.
fn salary_alignment(job_range: Option<&SalaryRange>, prefs: Option<&CandidatePreferences>) -> f64 {
    let Some(job_range) = job_range else {
        return defaults::NEUTRAL;
    };
    let Some(pref_range) = prefs.and_then(|p| p.salary_range.as_ref()) else {
        return defaults::NEUTRAL;
    };

    let start = job_range.min.max(pref_range.min);
    let end = job_range.max.min(pref_range.max);
    if end < start {
        return defaults::SALARY_NO_OVERLAP;
    }

    let overlap = (end - start) as f64;
    let narrower = overlap
        .min(job_range.width() as f64)
        .min(pref_range.width() as f64);
    if narrower == 0.0 {
        return 1.0;
    }
    (overlap / narrower).min(1.0)
}

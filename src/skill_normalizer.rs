use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use strsim::damerau_levenshtein;
use strum::{Display, EnumString};
use unicode_normalization::UnicodeNormalization;

/// Confidence attached to a dictionary hit (exact or alias).
pub const CONFIDENCE_EXACT: f64 = 1.0;
/// Confidence attached to a fuzzy hit (containment or one edit away).
pub const CONFIDENCE_FUZZY: f64 = 0.8;
/// Confidence attached to a guessed normalization (dictionary miss).
pub const CONFIDENCE_GUESSED: f64 = 0.5;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SkillCategory {
    Language,
    Frontend,
    Backend,
    Database,
    Cloud,
    Devops,
    Mobile,
    Data,
    Testing,
    Other,
}

/// A free-text skill string resolved to its canonical, categorized form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedSkill {
    pub original: String,
    pub canonical: String,
    pub category: Option<SkillCategory>,
    pub confidence: f64,
}

// Seed dictionary: canonical → category + aliases. Aliases are matched
// after NFKC folding and separator compaction, so "React JS" and
// "react.js" both land on "react".
const SEED: &[(&str, SkillCategory, &[&str])] = &[
    // Languages
    ("javascript", SkillCategory::Language, &["js", "ecmascript", "es6", "es2015"]),
    ("typescript", SkillCategory::Language, &["ts"]),
    ("python", SkillCategory::Language, &["py", "python3", "python 3"]),
    ("java", SkillCategory::Language, &["java8", "java11", "java17", "openjdk"]),
    ("csharp", SkillCategory::Language, &["c#", "c sharp", ".net", "dotnet"]),
    ("cplusplus", SkillCategory::Language, &["c++", "cpp", "c plus plus"]),
    ("golang", SkillCategory::Language, &["go", "go lang"]),
    ("rust", SkillCategory::Language, &["rust lang"]),
    ("php", SkillCategory::Language, &["php7", "php8"]),
    ("ruby", SkillCategory::Language, &["ruby lang"]),
    ("swift", SkillCategory::Language, &["ios swift"]),
    ("kotlin", SkillCategory::Language, &["kotlin jvm"]),
    // Frontend
    ("react", SkillCategory::Frontend, &["reactjs", "react.js", "react js", "react18"]),
    ("vue", SkillCategory::Frontend, &["vue.js", "vuejs", "vue3"]),
    ("angular", SkillCategory::Frontend, &["angularjs", "angular.js"]),
    ("svelte", SkillCategory::Frontend, &["sveltejs", "svelte.js"]),
    ("nextjs", SkillCategory::Frontend, &["next.js", "next js"]),
    ("css", SkillCategory::Frontend, &["css3", "cascading style sheets"]),
    ("sass", SkillCategory::Frontend, &["scss"]),
    ("tailwind", SkillCategory::Frontend, &["tailwindcss", "tailwind css"]),
    // Backend
    ("nodejs", SkillCategory::Backend, &["node.js", "node js", "node"]),
    ("spring", SkillCategory::Backend, &["spring boot", "springboot", "spring framework"]),
    ("django", SkillCategory::Backend, &["django rest framework", "drf"]),
    ("flask", SkillCategory::Backend, &["python flask"]),
    ("express", SkillCategory::Backend, &["express.js", "expressjs"]),
    ("fastapi", SkillCategory::Backend, &["fast api"]),
    ("laravel", SkillCategory::Backend, &["php laravel"]),
    ("rails", SkillCategory::Backend, &["ruby on rails", "ror"]),
    ("graphql", SkillCategory::Backend, &["graph ql"]),
    // Databases
    ("postgresql", SkillCategory::Database, &["postgres", "pg", "postgre sql"]),
    ("mysql", SkillCategory::Database, &["my sql", "mariadb"]),
    ("mongodb", SkillCategory::Database, &["mongo", "mongo db"]),
    ("redis", SkillCategory::Database, &["redis cache"]),
    ("elasticsearch", SkillCategory::Database, &["elastic search"]),
    ("sqlite", SkillCategory::Database, &["sqlite3"]),
    // Cloud
    ("aws", SkillCategory::Cloud, &["amazon web services", "aws cloud"]),
    ("gcp", SkillCategory::Cloud, &["google cloud platform", "google cloud"]),
    ("azure", SkillCategory::Cloud, &["microsoft azure", "ms azure"]),
    ("firebase", SkillCategory::Cloud, &["google firebase"]),
    // DevOps
    ("docker", SkillCategory::Devops, &["docker container"]),
    ("kubernetes", SkillCategory::Devops, &["k8s", "kube"]),
    ("jenkins", SkillCategory::Devops, &["jenkins ci"]),
    ("git", SkillCategory::Devops, &["github", "gitlab"]),
    ("terraform", SkillCategory::Devops, &["infrastructure as code", "iac"]),
    ("ansible", SkillCategory::Devops, &[]),
    // Data
    ("kafka", SkillCategory::Data, &["apache kafka"]),
    ("spark", SkillCategory::Data, &["apache spark"]),
    ("pandas", SkillCategory::Data, &["python pandas"]),
    ("numpy", SkillCategory::Data, &[]),
    ("tensorflow", SkillCategory::Data, &["tensor flow", "tf"]),
    ("pytorch", SkillCategory::Data, &["torch"]),
    // Testing
    ("jest", SkillCategory::Testing, &["jest testing"]),
    ("cypress", SkillCategory::Testing, &["cypress testing"]),
    ("selenium", SkillCategory::Testing, &["selenium webdriver"]),
    ("pytest", SkillCategory::Testing, &["py test"]),
    ("junit", SkillCategory::Testing, &[]),
    // Mobile
    ("reactnative", SkillCategory::Mobile, &["react native", "react-native"]),
    ("flutter", SkillCategory::Mobile, &["dart flutter"]),
    ("ionic", SkillCategory::Mobile, &["ionic framework"]),
];

// Qualifiers that add no signal; stripped before lookup.
const NOISE_SUFFIXES: &[&str] = &[
    " programming language",
    " programming",
    " language",
    " framework",
    " development",
    " developer",
];

struct Dictionary {
    // Keyed by both the plain lowercase alias and its compacted form.
    alias_to_canonical: HashMap<String, String>,
    category_of: HashMap<String, SkillCategory>,
}

impl Dictionary {
    fn seeded() -> Self {
        let mut dict = Dictionary {
            alias_to_canonical: HashMap::new(),
            category_of: HashMap::new(),
        };
        for (canonical, category, aliases) in SEED {
            dict.register(canonical, aliases, *category);
        }
        dict
    }

    // Append-only: existing alias targets and canonical categories win.
    fn register(&mut self, canonical: &str, aliases: &[&str], category: SkillCategory) {
        let canonical = nfkc_lower_trim(canonical);
        if canonical.is_empty() {
            return;
        }
        self.category_of.entry(canonical.clone()).or_insert(category);

        let mut keys: Vec<String> = vec![canonical.clone(), compact_key(&canonical)];
        for alias in aliases {
            let alias = nfkc_lower_trim(alias);
            keys.push(compact_key(&alias));
            keys.push(alias);
        }
        for key in keys {
            if !key.is_empty() {
                self.alias_to_canonical
                    .entry(key)
                    .or_insert_with(|| canonical.clone());
            }
        }
    }

    fn lookup_exact(&self, cleaned: &str) -> Option<&str> {
        if let Some(canonical) = self.alias_to_canonical.get(cleaned) {
            return Some(canonical.as_str());
        }
        self.alias_to_canonical
            .get(&compact_key(cleaned))
            .map(String::as_str)
    }

    /// Fuzzy tier: substring containment either direction, plus a single
    /// Damerau-Levenshtein edit. Length guards keep short tokens ("go",
    /// "ts") from matching inside unrelated words. The most specific
    /// (longest) matching alias wins; ties break lexicographically so
    /// repeated calls stay deterministic.
    fn lookup_fuzzy(&self, cleaned: &str) -> Option<&str> {
        let compact = compact_key(cleaned);

        let mut best: Option<(&str, usize)> = None;
        for (alias, canonical) in &self.alias_to_canonical {
            let contains = (alias.len() >= 4 && compact.contains(alias.as_str()))
                || (compact.len() >= 4 && alias.contains(compact.as_str()));
            let near_miss = !contains
                && alias.len() >= 5
                && compact.len() >= 5
                && damerau_levenshtein(&compact, alias) <= 1;
            if !contains && !near_miss {
                continue;
            }
            match best {
                None => best = Some((canonical.as_str(), alias.len())),
                Some((best_canonical, best_len)) => {
                    if alias.len() > best_len
                        || (alias.len() == best_len && canonical.as_str() < best_canonical)
                    {
                        best = Some((canonical.as_str(), alias.len()));
                    }
                }
            }
        }
        best.map(|(canonical, _)| canonical)
    }

    fn skills_by_category(&self, category: SkillCategory) -> Vec<String> {
        let mut skills: Vec<String> = self
            .category_of
            .iter()
            .filter(|(_, c)| **c == category)
            .map(|(name, _)| name.clone())
            .collect();
        skills.sort();
        skills
    }
}

fn nfkc_lower_trim(input: &str) -> String {
    input.nfkc().collect::<String>().trim().to_lowercase()
}

fn compact_key(input: &str) -> String {
    input
        .chars()
        .filter(|c| !matches!(c, ' ' | '.' | '-' | '_' | '/' | ','))
        .collect()
}

fn strip_noise_suffixes(cleaned: &str) -> &str {
    for suffix in NOISE_SUFFIXES {
        if let Some(stripped) = cleaned.strip_suffix(suffix) {
            if !stripped.trim().is_empty() {
                return stripped.trim_end();
            }
        }
    }
    cleaned
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

// Dictionary misses still get a category guess from surface features.
fn guess_category(name: &str) -> SkillCategory {
    const DATABASE_HINTS: &[&str] = &["sql", "db", "database", "store"];
    const CLOUD_HINTS: &[&str] = &["cloud", "serverless", "lambda"];
    const TESTING_HINTS: &[&str] = &["test", "qa", "e2e"];
    const DEVOPS_HINTS: &[&str] = &["ops", "ci", "cd", "pipeline", "infra"];
    const DATA_HINTS: &[&str] = &["data", "analytics", "ml", "ai", "etl"];
    const FRONTEND_HINTS: &[&str] = &["ui", "css", "frontend", "front end"];
    const BACKEND_HINTS: &[&str] = &["api", "backend", "back end", "server"];
    const MOBILE_HINTS: &[&str] = &["mobile", "android", "ios"];

    let groups: &[(&[&str], SkillCategory)] = &[
        (DATABASE_HINTS, SkillCategory::Database),
        (CLOUD_HINTS, SkillCategory::Cloud),
        (TESTING_HINTS, SkillCategory::Testing),
        (DEVOPS_HINTS, SkillCategory::Devops),
        (DATA_HINTS, SkillCategory::Data),
        (FRONTEND_HINTS, SkillCategory::Frontend),
        (BACKEND_HINTS, SkillCategory::Backend),
        (MOBILE_HINTS, SkillCategory::Mobile),
    ];

    for (hints, category) in groups {
        if hints.iter().any(|hint| name.contains(hint)) {
            return *category;
        }
    }
    SkillCategory::Other
}

/// Maps free-text skill strings to canonical name + category + confidence.
///
/// Seeded with the built-in alias table; `add_mapping` extends it at
/// runtime (append-only), so lookups go through an interior `RwLock`.
pub struct SkillNormalizer {
    dict: RwLock<Dictionary>,
}

impl Default for SkillNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl SkillNormalizer {
    pub fn new() -> Self {
        Self {
            dict: RwLock::new(Dictionary::seeded()),
        }
    }

    /// Resolve one raw skill string. Empty or whitespace-only input
    /// normalizes to an empty canonical with no category.
    pub fn normalize(&self, raw: &str) -> NormalizedSkill {
        let cleaned = nfkc_lower_trim(raw);
        if cleaned.is_empty() {
            return NormalizedSkill {
                original: raw.to_string(),
                canonical: String::new(),
                category: None,
                confidence: CONFIDENCE_GUESSED,
            };
        }
        let cleaned = strip_noise_suffixes(&cleaned).to_string();

        let dict = self.dict.read().unwrap_or_else(PoisonError::into_inner);

        if let Some(canonical) = dict.lookup_exact(&cleaned) {
            return NormalizedSkill {
                original: raw.to_string(),
                canonical: canonical.to_string(),
                category: dict.category_of.get(canonical).copied(),
                confidence: CONFIDENCE_EXACT,
            };
        }

        if let Some(canonical) = dict.lookup_fuzzy(&cleaned) {
            return NormalizedSkill {
                original: raw.to_string(),
                canonical: canonical.to_string(),
                category: dict.category_of.get(canonical).copied(),
                confidence: CONFIDENCE_FUZZY,
            };
        }

        NormalizedSkill {
            original: raw.to_string(),
            canonical: capitalize(&cleaned),
            category: Some(guess_category(&cleaned)),
            confidence: CONFIDENCE_GUESSED,
        }
    }

    /// Resolve a list, preserving input order.
    pub fn normalize_all(&self, raws: &[String]) -> Vec<NormalizedSkill> {
        raws.iter().map(|raw| self.normalize(raw)).collect()
    }

    /// Reverse lookup: canonical skills registered under `category`,
    /// sorted. Empty when the category has no entries.
    pub fn skills_by_category(&self, category: SkillCategory) -> Vec<String> {
        self.dict
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .skills_by_category(category)
    }

    /// Register a canonical skill and its aliases at runtime.
    /// Append-only: existing aliases and categories are never overwritten.
    pub fn add_mapping(&self, canonical: &str, aliases: &[&str], category: SkillCategory) {
        self.dict
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .register(canonical, aliases, category);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_and_alias_hits_have_full_confidence() {
        let normalizer = SkillNormalizer::new();

        let js = normalizer.normalize("JavaScript");
        assert_eq!(js.canonical, "javascript");
        assert_eq!(js.category, Some(SkillCategory::Language));
        assert_eq!(js.confidence, CONFIDENCE_EXACT);

        let k8s = normalizer.normalize("K8s");
        assert_eq!(k8s.canonical, "kubernetes");
        assert_eq!(k8s.confidence, CONFIDENCE_EXACT);

        let node = normalizer.normalize("Node.js");
        assert_eq!(node.canonical, "nodejs");
        assert_eq!(node.category, Some(SkillCategory::Backend));
    }

    #[test]
    fn separators_and_fullwidth_fold_to_the_same_key() {
        let normalizer = SkillNormalizer::new();
        assert_eq!(normalizer.normalize("React JS").canonical, "react");
        assert_eq!(normalizer.normalize("ＡＷＳ").canonical, "aws");
        assert_eq!(normalizer.normalize("  mongo db ").canonical, "mongodb");
    }

    #[test]
    fn noise_suffixes_are_stripped_before_lookup() {
        let normalizer = SkillNormalizer::new();
        assert_eq!(normalizer.normalize("Rust programming").canonical, "rust");
        assert_eq!(normalizer.normalize("Python language").canonical, "python");
        assert_eq!(normalizer.normalize("React framework").canonical, "react");
    }

    #[test]
    fn containment_and_typos_hit_the_fuzzy_tier() {
        let normalizer = SkillNormalizer::new();

        let contained = normalizer.normalize("postgres database administration");
        assert_eq!(contained.canonical, "postgresql");
        assert_eq!(contained.confidence, CONFIDENCE_FUZZY);

        let typo = normalizer.normalize("javascirpt");
        assert_eq!(typo.canonical, "javascript");
        assert_eq!(typo.confidence, CONFIDENCE_FUZZY);
    }

    #[test]
    fn short_tokens_never_fuzzy_match() {
        let normalizer = SkillNormalizer::new();
        let out = normalizer.normalize("ab");
        assert_eq!(out.canonical, "Ab");
        assert_eq!(out.confidence, CONFIDENCE_GUESSED);
    }

    #[test]
    fn misses_are_capitalized_and_category_guessed() {
        let normalizer = SkillNormalizer::new();

        let guessed = normalizer.normalize("frobodb");
        assert_eq!(guessed.canonical, "Frobodb");
        assert_eq!(guessed.category, Some(SkillCategory::Database));
        assert_eq!(guessed.confidence, CONFIDENCE_GUESSED);

        let unknown = normalizer.normalize("zorblux");
        assert_eq!(unknown.canonical, "Zorblux");
        assert_eq!(unknown.category, Some(SkillCategory::Other));
    }

    #[test]
    fn empty_input_normalizes_to_empty() {
        let normalizer = SkillNormalizer::new();
        let out = normalizer.normalize("   ");
        assert_eq!(out.canonical, "");
        assert_eq!(out.category, None);
    }

    #[test]
    fn normalize_all_preserves_order() {
        let normalizer = SkillNormalizer::new();
        let out = normalizer.normalize_all(&[
            "MongoDB".to_string(),
            "js".to_string(),
            "zorblux".to_string(),
        ]);
        let canonicals: Vec<&str> = out.iter().map(|s| s.canonical.as_str()).collect();
        assert_eq!(canonicals, vec!["mongodb", "javascript", "Zorblux"]);
    }

    #[test]
    fn skills_by_category_is_a_reverse_lookup() {
        let normalizer = SkillNormalizer::new();
        let databases = normalizer.skills_by_category(SkillCategory::Database);
        assert!(databases.contains(&"postgresql".to_string()));
        assert!(databases.contains(&"mongodb".to_string()));
        assert!(!databases.contains(&"react".to_string()));
    }

    #[test]
    fn add_mapping_registers_new_canonicals_at_runtime() {
        let normalizer = SkillNormalizer::new();
        assert_eq!(normalizer.normalize("htmx").confidence, CONFIDENCE_GUESSED);

        normalizer.add_mapping("htmx", &["html extensions"], SkillCategory::Frontend);

        let hit = normalizer.normalize("htmx");
        assert_eq!(hit.canonical, "htmx");
        assert_eq!(hit.category, Some(SkillCategory::Frontend));
        assert_eq!(hit.confidence, CONFIDENCE_EXACT);
        assert_eq!(normalizer.normalize("HTML Extensions").canonical, "htmx");
    }

    #[test]
    fn add_mapping_is_append_only() {
        let normalizer = SkillNormalizer::new();
        // "js" already resolves to javascript; re-registering must not steal it.
        normalizer.add_mapping("jsonnet", &["js"], SkillCategory::Other);
        assert_eq!(normalizer.normalize("js").canonical, "javascript");
        assert_eq!(normalizer.normalize("jsonnet").canonical, "jsonnet");
    }
}

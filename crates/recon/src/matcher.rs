//! Best-candidate search over clinical descriptions.

use serde::{Deserialize, Serialize};

use crate::normalize::{normalize, sorted_tokens};

/// Similarity function used to score a (query, candidate) pair on 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scorer {
    /// Indel ratio over whitespace tokens sorted alphabetically.
    #[default]
    TokenSort,
    /// Indel ratio over the normalized text as-is.
    Ratio,
    /// Normalized Levenshtein similarity.
    Levenshtein,
    /// Jaro-Winkler similarity.
    JaroWinkler,
}

impl Scorer {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TokenSort => "token_sort",
            Self::Ratio => "ratio",
            Self::Levenshtein => "levenshtein",
            Self::JaroWinkler => "jaro_winkler",
        }
    }

    /// Score two already-prepared strings.
    pub fn score(&self, query: &Prepared, candidate: &Prepared) -> u8 {
        // An empty side has nothing to agree with.
        if query.normalized.is_empty() || candidate.normalized.is_empty() {
            return 0;
        }
        let similarity = match self {
            Self::TokenSort => indel_similarity(&query.sorted, &candidate.sorted),
            Self::Ratio => indel_similarity(&query.normalized, &candidate.normalized),
            Self::Levenshtein => strsim::normalized_levenshtein(&query.normalized, &candidate.normalized),
            Self::JaroWinkler => strsim::jaro_winkler(&query.normalized, &candidate.normalized),
        };
        to_percent(similarity)
    }
}

impl std::fmt::Display for Scorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A string in both comparison forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prepared {
    pub normalized: String,
    pub sorted: String,
}

impl Prepared {
    pub fn new(text: &str) -> Self {
        let normalized = normalize(text);
        let sorted = sorted_tokens(&normalized);
        Self { normalized, sorted }
    }
}

/// `1 - indel_distance / (len_a + len_b)`, where the indel distance only
/// counts insertions and deletions. Equals `2 * LCS / (len_a + len_b)`.
pub fn indel_similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 0.0;
    }
    let lcs = lcs_len(&a, &b);
    (2 * lcs) as f64 / total as f64
}

fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut cur = vec![0usize; b.len() + 1];
    for ca in a {
        for (j, cb) in b.iter().enumerate() {
            cur[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(cur[j])
            };
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev[b.len()]
}

fn to_percent(similarity: f64) -> u8 {
    (similarity * 100.0).round_ties_even().clamp(0.0, 100.0) as u8
}

/// Token-order-insensitive similarity of two raw strings, 0..=100.
pub fn token_sort_ratio(a: &str, b: &str) -> u8 {
    Scorer::TokenSort.score(&Prepared::new(a), &Prepared::new(b))
}

// ---------------------------------------------------------------------------
// Candidate search
// ---------------------------------------------------------------------------

/// Winner of a candidate search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BestMatch<'a> {
    /// Position in the candidate list, `None` when the list was empty.
    pub index: Option<usize>,
    /// Original (not normalized) candidate text.
    pub candidate: Option<&'a str>,
    pub score: u8,
}

impl BestMatch<'_> {
    pub const NONE: BestMatch<'static> = BestMatch { index: None, candidate: None, score: 0 };
}

/// Candidates prepared once and reused for every query.
#[derive(Debug, Clone)]
pub struct CandidateSet<'a> {
    originals: Vec<&'a str>,
    prepared: Vec<Prepared>,
    scorer: Scorer,
}

impl<'a> CandidateSet<'a> {
    pub fn new<S: AsRef<str>>(candidates: &'a [S], scorer: Scorer) -> Self {
        Self::from_strs(candidates.iter().map(|c| c.as_ref()), scorer)
    }

    pub fn from_strs(candidates: impl IntoIterator<Item = &'a str>, scorer: Scorer) -> Self {
        let originals: Vec<&'a str> = candidates.into_iter().collect();
        let prepared = originals.iter().map(|c| Prepared::new(c)).collect();
        Self { originals, prepared, scorer }
    }

    pub fn len(&self) -> usize {
        self.originals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.originals.is_empty()
    }

    pub fn scorer(&self) -> Scorer {
        self.scorer
    }

    /// Highest-scoring candidate. The earliest one wins a tie.
    pub fn best_match(&self, query: &str) -> BestMatch<'a> {
        let query = Prepared::new(query);
        let mut best = BestMatch::NONE;

        for (i, candidate) in self.prepared.iter().enumerate() {
            let score = self.scorer.score(&query, candidate);
            if best.index.is_none() || score > best.score {
                best = BestMatch {
                    index: Some(i),
                    candidate: Some(self.originals[i]),
                    score,
                };
                if score == 100 {
                    break;
                }
            }
        }

        best
    }
}

/// One-shot search with the default token-sort scorer.
pub fn best_match<'a, S: AsRef<str>>(query: &str, candidates: &'a [S]) -> BestMatch<'a> {
    CandidateSet::new(candidates, Scorer::default()).best_match(query)
}

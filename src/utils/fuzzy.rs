//! Fuzzy matching utilities
//!
//! Sequence-similarity scoring used to recover misheard website names.
//! The ratio follows the Ratcliff/Obershelp "gestalt" approach: find the
//! longest common run, recurse on both sides, and score `2*M / T`.

/// A candidate key with its similarity score in [0, 1]
#[derive(Debug, Clone, PartialEq)]
pub struct MatchCandidate {
    pub key: String,
    pub score: f64,
}

/// Similarity ratio between two strings, in [0, 1]
///
/// Two empty strings are considered identical.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

/// Total size of all matching blocks between `a` and `b`
fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut matched = 0;
    let mut queue = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
        let (i, j, k) = longest_match(a, b, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        matched += k;
        if alo < i && blo < j {
            queue.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            queue.push((i + k, ahi, j + k, bhi));
        }
    }

    matched
}

/// Longest common run in `a[alo..ahi]` and `b[blo..bhi]`
///
/// Ties resolve to the earliest start in `a`, then the earliest in `b`.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_k) = (alo, blo, 0);
    let width = bhi - blo;
    let mut prev = vec![0usize; width + 1];

    for i in alo..ahi {
        let mut curr = vec![0usize; width + 1];
        for j in blo..bhi {
            if a[i] == b[j] {
                let k = prev[j - blo] + 1;
                curr[j - blo + 1] = k;
                if k > best_k {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_k = k;
                }
            }
        }
        prev = curr;
    }

    (best_i, best_j, best_k)
}

/// Score `term` against every candidate
///
/// Returns up to `max_results` candidates scoring at least `cutoff`,
/// best first. Equal scores keep the candidates' input order.
pub fn find_matches<'a, I>(
    term: &str,
    candidates: I,
    max_results: usize,
    cutoff: f64,
) -> Vec<MatchCandidate>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut matches: Vec<MatchCandidate> = candidates
        .into_iter()
        .filter_map(|key| {
            let score = similarity(term, key);
            (score >= cutoff).then(|| MatchCandidate {
                key: key.to_string(),
                score,
            })
        })
        .collect();

    matches.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    matches.truncate(max_results);

    matches
}

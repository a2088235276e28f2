//! String similarity scorers on a 0–100 scale.

use crate::config::ScorerKind;

/// A string similarity function returning a score in `[0, 100]`.
pub trait Scorer: Send + Sync {
    fn score(&self, query: &str, choice: &str) -> f64;
}

impl<S: Scorer + ?Sized> Scorer for &S {
    fn score(&self, query: &str, choice: &str) -> f64 { (**self).score(query, choice) }
}

impl<S: Scorer + ?Sized> Scorer for Box<S> {
    fn score(&self, query: &str, choice: &str) -> f64 { (**self).score(query, choice) }
}

impl ScorerKind {
    pub fn build(self) -> Box<dyn Scorer> {
        match self {
            ScorerKind::Weighted => Box::new(WeightedRatio),
            ScorerKind::Ratio => Box::new(Ratio),
            ScorerKind::Levenshtein => Box::new(Levenshtein),
            ScorerKind::JaroWinkler => Box::new(JaroWinkler),
        }
    }
}

/// Normalized indel similarity: `100 * (1 - indel / (|a| + |b|))`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ratio;

impl Scorer for Ratio {
    fn score(&self, query: &str, choice: &str) -> f64 { ratio(query, choice) }
}

/// Normalized Levenshtein similarity.
#[derive(Debug, Clone, Copy, Default)]
pub struct Levenshtein;

impl Scorer for Levenshtein {
    fn score(&self, query: &str, choice: &str) -> f64 {
        100.0 * strsim::normalized_levenshtein(query, choice)
    }
}

/// Jaro-Winkler similarity; favours shared prefixes.
#[derive(Debug, Clone, Copy, Default)]
pub struct JaroWinkler;

impl Scorer for JaroWinkler {
    fn score(&self, query: &str, choice: &str) -> f64 {
        100.0 * strsim::jaro_winkler(query, choice)
    }
}

/// Best of several ratios, weighted by how comparable the string lengths are.
///
/// For strings of similar length this is the indel ratio, lifted by
/// token-order-insensitive ratios (scaled by 0.95). When one string is at
/// least 1.5x longer, substring alignment (partial ratios, scaled by 0.9, or
/// 0.6 beyond 8x) can also contribute.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedRatio;

const TOKEN_SCALE: f64 = 0.95;

impl Scorer for WeightedRatio {
    fn score(&self, query: &str, choice: &str) -> f64 {
        if query.is_empty() || choice.is_empty() { return 0.0 }

        let (la, lb) = (query.chars().count() as f64, choice.chars().count() as f64);
        let len_ratio = la.max(lb) / la.min(lb);
        let base = ratio(query, choice);

        if len_ratio < 1.5 {
            let tokens = token_sort_ratio(query, choice).max(token_set_ratio(query, choice));
            return base.max(tokens * TOKEN_SCALE);
        }

        let partial_scale = if len_ratio < 8.0 { 0.9 } else { 0.6 };
        base.max(partial_ratio(query, choice) * partial_scale)
            .max(partial_token_ratio(query, choice) * TOKEN_SCALE * partial_scale)
    }
}

/// Length of the longest common subsequence of two char slices.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() { return 0 }
    let mut prev = vec![0usize; b.len() + 1];
    let mut cur = vec![0usize; b.len() + 1];
    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            cur[j + 1] = if ca == cb { prev[j] + 1 } else { cur[j].max(prev[j + 1]) };
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev[b.len()]
}

fn ratio_chars(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 { return 100.0 }
    100.0 * (2 * lcs_len(a, b)) as f64 / total as f64
}

pub(crate) fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    ratio_chars(&a, &b)
}

/// Best ratio of the shorter string against any equally long window of the
/// longer one, including windows clipped at either end.
pub(crate) fn partial_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (short, long) = if a.len() <= b.len() { (&a, &b) } else { (&b, &a) };
    if short.is_empty() { return if long.is_empty() { 100.0 } else { 0.0 } }

    let m = short.len();
    let mut best = 0.0f64;
    for start in 0..=long.len() - m {
        best = best.max(ratio_chars(short, &long[start..start + m]));
        if best == 100.0 { return best }
    }
    for k in 1..m {
        best = best.max(ratio_chars(short, &long[..k]));
        best = best.max(ratio_chars(short, &long[long.len() - k..]));
    }
    best
}

fn sorted_tokens(s: &str) -> Vec<&str> {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens
}

pub(crate) fn token_sort_ratio(a: &str, b: &str) -> f64 {
    ratio(&sorted_tokens(a).join(" "), &sorted_tokens(b).join(" "))
}

/// Splits two token sets into (intersection, only-in-a, only-in-b), each sorted.
fn token_sets<'s>(a: &'s str, b: &'s str) -> (Vec<&'s str>, Vec<&'s str>, Vec<&'s str>) {
    let mut ta = sorted_tokens(a);
    let mut tb = sorted_tokens(b);
    ta.dedup();
    tb.dedup();
    let common: Vec<&str> = ta.iter().copied().filter(|t| tb.contains(t)).collect();
    let only_a = ta.iter().copied().filter(|t| !common.contains(t)).collect();
    let only_b = tb.iter().copied().filter(|t| !common.contains(t)).collect();
    (common, only_a, only_b)
}

pub(crate) fn token_set_ratio(a: &str, b: &str) -> f64 {
    let (common, only_a, only_b) = token_sets(a, b);
    if !common.is_empty() && (only_a.is_empty() || only_b.is_empty()) { return 100.0 }

    let sect = common.join(" ");
    let join = |rest: &[&str]| {
        if sect.is_empty() { rest.join(" ") }
        else if rest.is_empty() { sect.clone() }
        else { format!("{} {}", sect, rest.join(" ")) }
    };
    let (combined_a, combined_b) = (join(&only_a), join(&only_b));

    let mut best = ratio(&combined_a, &combined_b);
    if !sect.is_empty() {
        best = best.max(ratio(&sect, &combined_a)).max(ratio(&sect, &combined_b));
    }
    best
}

pub(crate) fn partial_token_ratio(a: &str, b: &str) -> f64 {
    let (common, only_a, only_b) = token_sets(a, b);
    if !common.is_empty() { return 100.0 }
    partial_ratio(&only_a.join(" "), &only_b.join(" "))
}

//! Maximal Marginal Relevance keyword selection.
//!
//! Candidates are scored against the documents they were drawn from (mean
//! cosine similarity, the *relevance*) and against each other (the
//! *redundancy* matrix). Selection is greedy: the most relevant candidate
//! first, then repeatedly the candidate maximising
//! `(1 - diversity) * relevance - diversity * max_similarity_to_selected`.
//!
//! Every argmax resolves ties to the earliest candidate in input order, so
//! identical inputs always give identical output.

#[cfg(test)]
mod tests;

use serde::Serialize;
use tracing::debug;

use crate::{KeywordsError, Result};

/// Maximum number of suggestions `find_similar` returns
pub const SIMILAR_RESULT_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredTerm {
    pub term: String,
    pub score: f32,
}

/// Cosine similarity of two equal-length vectors; 0 when either has zero norm.
///
/// Sums are taken in `f64` so large finite components cannot overflow the
/// norms.
#[inline]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let (dot, norm_a, norm_b) = a.iter().zip(b).fold(
        (0.0_f64, 0.0_f64, 0.0_f64),
        |(dot, na, nb), (&x, &y)| {
            let (x, y) = (f64::from(x), f64::from(y));
            (dot + x * y, na + x * x, nb + y * y)
        },
    );

    let denominator = norm_a.sqrt() * norm_b.sqrt();
    if denominator == 0.0 {
        0.0
    } else {
        (dot / denominator).clamp(-1.0, 1.0) as f32
    }
}

/// Mean cosine similarity of each candidate to every document
#[inline]
pub fn relevance_scores(doc_embeddings: &[Vec<f32>], candidate_embeddings: &[Vec<f32>]) -> Vec<f32> {
    let doc_count = doc_embeddings.len().max(1) as f32;

    candidate_embeddings
        .iter()
        .map(|candidate| {
            doc_embeddings
                .iter()
                .map(|doc| cosine_similarity(candidate, doc))
                .sum::<f32>()
                / doc_count
        })
        .collect()
}

/// Pairwise cosine similarity between all candidates
#[inline]
pub fn similarity_matrix(embeddings: &[Vec<f32>]) -> Vec<Vec<f32>> {
    embeddings
        .iter()
        .map(|a| embeddings.iter().map(|b| cosine_similarity(a, b)).collect())
        .collect()
}

/// Position of the largest score, the first one on ties. NaN scores never win.
fn argmax_first(scores: impl IntoIterator<Item = f32>) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (index, score) in scores.into_iter().enumerate() {
        if score.is_nan() {
            continue;
        }
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((index, score)),
        }
    }
    best.map(|(index, _)| index)
}

fn validate_embeddings(
    doc_embeddings: &[Vec<f32>],
    candidate_embeddings: &[Vec<f32>],
    candidate_terms: &[String],
) -> Result<()> {
    if candidate_terms.is_empty() {
        return Err(KeywordsError::InvalidParameter(
            "candidate set is empty".to_string(),
        ));
    }

    if candidate_embeddings.len() != candidate_terms.len() {
        return Err(KeywordsError::InvalidParameter(format!(
            "{} candidate embeddings for {} candidate terms",
            candidate_embeddings.len(),
            candidate_terms.len()
        )));
    }

    if doc_embeddings.is_empty() {
        return Err(KeywordsError::InvalidParameter(
            "no document embeddings".to_string(),
        ));
    }

    let dimension = candidate_embeddings[0].len();
    let all = doc_embeddings.iter().chain(candidate_embeddings);
    for vector in all {
        if vector.len() != dimension {
            return Err(KeywordsError::InvalidParameter(format!(
                "embedding dimensions differ: {} vs {}",
                vector.len(),
                dimension
            )));
        }
        if vector.iter().any(|v| !v.is_finite()) {
            return Err(KeywordsError::InvalidParameter(
                "embedding contains a non-finite value".to_string(),
            ));
        }
    }

    Ok(())
}

/// Pick up to `top_n` keywords balancing relevance against redundancy.
///
/// `diversity` is in `[0, 1]`: 0 ranks purely by relevance, 1 ignores
/// relevance after the first pick. A `top_n` above the candidate count
/// returns every candidate.
#[inline]
pub fn select_keywords(
    doc_embeddings: &[Vec<f32>],
    candidate_embeddings: &[Vec<f32>],
    candidate_terms: &[String],
    top_n: usize,
    diversity: f32,
) -> Result<Vec<String>> {
    if top_n == 0 {
        return Err(KeywordsError::InvalidParameter(
            "top_n must be at least 1".to_string(),
        ));
    }
    if !(0.0..=1.0).contains(&diversity) {
        return Err(KeywordsError::InvalidParameter(format!(
            "diversity must be between 0 and 1, got {diversity}"
        )));
    }
    validate_embeddings(doc_embeddings, candidate_embeddings, candidate_terms)?;

    let relevance = relevance_scores(doc_embeddings, candidate_embeddings);
    let redundancy = similarity_matrix(candidate_embeddings);
    let top_n = top_n.min(candidate_terms.len());

    let Some(seed) = argmax_first(relevance.iter().copied()) else {
        return Ok(Vec::new());
    };

    let mut selected = vec![seed];
    let mut remaining: Vec<usize> = (0..candidate_terms.len()).filter(|&i| i != seed).collect();

    while selected.len() < top_n {
        let scores = remaining.iter().map(|&candidate| {
            let max_redundancy = selected
                .iter()
                .map(|&chosen| redundancy[candidate][chosen])
                .fold(f32::NEG_INFINITY, f32::max);
            (1.0 - diversity) * relevance[candidate] - diversity * max_redundancy
        });

        let Some(position) = argmax_first(scores) else {
            break;
        };
        selected.push(remaining.remove(position));
    }

    let keywords: Vec<String> = selected
        .into_iter()
        .map(|index| candidate_terms[index].clone())
        .collect();

    debug!(
        "Selected {} of {} candidates (diversity {}): {:?}",
        keywords.len(),
        candidate_terms.len(),
        diversity,
        keywords
    );

    Ok(keywords)
}

/// Rank the `top_n` most document-relevant candidates by similarity to
/// `query_embedding`, returning at most [`SIMILAR_RESULT_LIMIT`] of them.
#[inline]
pub fn find_similar(
    query_embedding: &[f32],
    doc_embeddings: &[Vec<f32>],
    candidate_embeddings: &[Vec<f32>],
    candidate_terms: &[String],
    top_n: usize,
) -> Result<Vec<ScoredTerm>> {
    if top_n == 0 {
        return Err(KeywordsError::InvalidParameter(
            "top_n must be at least 1".to_string(),
        ));
    }
    validate_embeddings(doc_embeddings, candidate_embeddings, candidate_terms)?;
    if query_embedding.len() != candidate_embeddings[0].len() {
        return Err(KeywordsError::InvalidParameter(format!(
            "query embedding has {} dimensions, candidates have {}",
            query_embedding.len(),
            candidate_embeddings[0].len()
        )));
    }

    let relevance = relevance_scores(doc_embeddings, candidate_embeddings);

    let mut shortlist: Vec<usize> = (0..candidate_terms.len()).collect();
    shortlist.sort_by(|&a, &b| relevance[b].total_cmp(&relevance[a]));
    shortlist.truncate(top_n);

    let mut scored: Vec<ScoredTerm> = shortlist
        .into_iter()
        .map(|index| ScoredTerm {
            term: candidate_terms[index].clone(),
            score: cosine_similarity(query_embedding, &candidate_embeddings[index]),
        })
        .collect();
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(SIMILAR_RESULT_LIMIT);

    Ok(scored)
}

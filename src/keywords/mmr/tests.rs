use super::*;

fn terms(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| (*w).to_string()).collect()
}

/// Two service-like terms that nearly coincide, one food term, one unrelated term
fn restaurant_fixture() -> (Vec<Vec<f32>>, Vec<Vec<f32>>, Vec<String>) {
    let docs = vec![
        vec![1.0, 0.0, 0.0],
        vec![0.9, 0.2, 0.0],
        vec![0.2, 1.0, 0.0],
    ];
    let candidates = vec![
        vec![1.0, 0.0, 0.0],
        vec![0.98, 0.15, 0.0],
        vec![0.0, 1.0, 0.0],
        vec![0.0, 0.0, 1.0],
    ];
    (
        docs,
        candidates,
        terms(&["service", "staff", "cheesecake", "parking"]),
    )
}

#[test]
fn cosine_similarity_basics() {
    assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
    assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
    assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
    assert!((cosine_similarity(&[3.0, 4.0], &[6.0, 8.0]) - 1.0).abs() < 1e-6);
    assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
}

#[test]
fn relevance_is_mean_over_documents() {
    let docs = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
    let candidates = vec![vec![1.0, 0.0], vec![1.0, 1.0]];
    let scores = relevance_scores(&docs, &candidates);
    assert!((scores[0] - 0.5).abs() < 1e-6);
    assert!((scores[1] - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
}

#[test]
fn similarity_matrix_is_symmetric() {
    let (_, candidates, _) = restaurant_fixture();
    let matrix = similarity_matrix(&candidates);
    assert_eq!(matrix.len(), 4);
    for (i, row) in matrix.iter().enumerate() {
        assert!((row[i] - 1.0).abs() < 1e-6);
        for (j, value) in row.iter().enumerate() {
            assert_eq!(*value, matrix[j][i]);
        }
    }
}

#[test]
fn argmax_prefers_first_on_ties() {
    assert_eq!(argmax_first([0.5, 0.9, 0.9, 0.1]), Some(1));
    assert_eq!(argmax_first([0.0, 0.0]), Some(0));
    assert_eq!(argmax_first(Vec::<f32>::new()), None);
}

#[test]
fn argmax_skips_nan() {
    assert_eq!(argmax_first([f32::NAN, 0.2, 0.2]), Some(1));
    assert_eq!(argmax_first([0.1, f32::NAN, 0.3, f32::NAN]), Some(2));
    assert_eq!(argmax_first([f32::NAN]), None);
}

#[test]
fn large_components_do_not_overflow() {
    let near = cosine_similarity(&[1e20, 0.0], &[1e20, 1e18]);
    assert!(near.is_finite());
    assert!((near - 0.99995).abs() < 1e-4);
    assert!((cosine_similarity(&[3e30, 4e30], &[6e30, 8e30]) - 1.0).abs() < 1e-6);
}

#[test]
fn large_embeddings_keep_the_most_relevant_seed() {
    let docs = vec![vec![1e20, 0.0], vec![1e20, 0.0]];
    let candidates = vec![vec![0.0, 1e20], vec![1e20, 1e18], vec![0.0, 2e20]];
    let names = terms(&["far", "close", "far2"]);

    let relevance = relevance_scores(&docs, &candidates);
    assert!(relevance.iter().all(|r| r.is_finite()));

    let seed = select_keywords(&docs, &candidates, &names, 1, 0.5).expect("selection works");
    assert_eq!(seed, vec!["close"]);

    let ranked = select_keywords(&docs, &candidates, &names, 3, 0.0).expect("selection works");
    assert_eq!(ranked, vec!["close", "far", "far2"]);
}

#[test]
fn zero_diversity_ranks_by_relevance() {
    let (docs, candidates, names) = restaurant_fixture();
    let selected = select_keywords(&docs, &candidates, &names, 4, 0.0).expect("selection works");

    let relevance = relevance_scores(&docs, &candidates);
    let mut by_relevance: Vec<usize> = (0..names.len()).collect();
    by_relevance.sort_by(|&a, &b| relevance[b].total_cmp(&relevance[a]));
    let expected: Vec<String> = by_relevance.iter().map(|&i| names[i].clone()).collect();

    assert_eq!(selected, expected);
    assert_eq!(selected, terms(&["staff", "service", "cheesecake", "parking"]));
}

#[test]
fn diversity_avoids_near_duplicates() {
    let (docs, candidates, names) = restaurant_fixture();

    let balanced = select_keywords(&docs, &candidates, &names, 3, 0.5).expect("selection works");
    assert_eq!(balanced, terms(&["staff", "cheesecake", "parking"]));
    assert!(!balanced.contains(&"service".to_string()));

    let spread = select_keywords(&docs, &candidates, &names, 3, 1.0).expect("selection works");
    assert_eq!(spread, terms(&["staff", "parking", "cheesecake"]));
}

#[test]
fn seed_does_not_depend_on_diversity() {
    let (docs, candidates, names) = restaurant_fixture();
    for diversity in [0.0, 0.25, 0.5, 0.75, 1.0] {
        let selected =
            select_keywords(&docs, &candidates, &names, 2, diversity).expect("selection works");
        assert_eq!(selected[0], "staff");
    }
}

#[test]
fn returns_min_of_top_n_and_candidates_without_duplicates() {
    let (docs, candidates, names) = restaurant_fixture();
    for top_n in 1..=6 {
        for diversity in [0.0, 0.5, 1.0] {
            let selected = select_keywords(&docs, &candidates, &names, top_n, diversity)
                .expect("selection works");
            assert_eq!(selected.len(), top_n.min(names.len()));

            let mut unique = selected.clone();
            unique.sort();
            unique.dedup();
            assert_eq!(unique.len(), selected.len());
        }
    }
}

#[test]
fn selection_is_deterministic() {
    let (docs, candidates, names) = restaurant_fixture();
    let first = select_keywords(&docs, &candidates, &names, 3, 0.4).expect("selection works");
    for _ in 0..10 {
        let again = select_keywords(&docs, &candidates, &names, 3, 0.4).expect("selection works");
        assert_eq!(again, first);
    }
}

#[test]
fn ties_resolve_to_input_order() {
    let docs = vec![vec![1.0, 1.0]];
    let candidates = vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 0.0]];
    let names = terms(&["a", "b", "c"]);

    let selected = select_keywords(&docs, &candidates, &names, 3, 0.0).expect("selection works");
    assert_eq!(selected, terms(&["a", "b", "c"]));

    let reversed = terms(&["c", "b", "a"]);
    let selected =
        select_keywords(&docs, &candidates, &reversed, 1, 0.0).expect("selection works");
    assert_eq!(selected, terms(&["c"]));
}

#[test]
fn invalid_parameters_are_rejected() {
    let (docs, candidates, names) = restaurant_fixture();

    for (top_n, diversity) in [(0, 0.5), (3, -0.1), (3, 1.1), (3, f32::NAN)] {
        assert!(matches!(
            select_keywords(&docs, &candidates, &names, top_n, diversity),
            Err(KeywordsError::InvalidParameter(_))
        ));
    }

    assert!(matches!(
        select_keywords(&docs, &[], &[], 3, 0.5),
        Err(KeywordsError::InvalidParameter(_))
    ));
    assert!(matches!(
        select_keywords(&docs, &candidates[..2], &names, 3, 0.5),
        Err(KeywordsError::InvalidParameter(_))
    ));
    assert!(matches!(
        select_keywords(&[], &candidates, &names, 3, 0.5),
        Err(KeywordsError::InvalidParameter(_))
    ));
    assert!(matches!(
        select_keywords(&[vec![1.0, 0.0]], &candidates, &names, 3, 0.5),
        Err(KeywordsError::InvalidParameter(_))
    ));

    let mut poisoned = candidates;
    poisoned[1][0] = f32::INFINITY;
    assert!(matches!(
        select_keywords(&docs, &poisoned, &names, 3, 0.5),
        Err(KeywordsError::InvalidParameter(_))
    ));
}

#[test]
fn find_similar_ranks_shortlist_by_query() {
    let (docs, candidates, names) = restaurant_fixture();

    // Shortlist of the two most relevant: staff, service
    let similar =
        find_similar(&[0.0, 1.0, 0.0], &docs, &candidates, &names, 2).expect("lookup works");
    let found: Vec<&str> = similar.iter().map(|s| s.term.as_str()).collect();
    assert_eq!(found, vec!["staff", "service"]);

    let similar =
        find_similar(&[0.0, 1.0, 0.0], &docs, &candidates, &names, 4).expect("lookup works");
    assert_eq!(similar[0].term, "cheesecake");
    assert!((similar[0].score - 1.0).abs() < 1e-6);
    assert!(similar.windows(2).all(|w| w[0].score >= w[1].score));
}

#[test]
fn find_similar_caps_results() {
    let docs = vec![vec![1.0, 1.0]];
    let candidates: Vec<Vec<f32>> = (0..15u8).map(|i| vec![1.0, f32::from(i)]).collect();
    let names: Vec<String> = (0..15).map(|i| format!("term{i}")).collect();

    let similar = find_similar(&[1.0, 0.0], &docs, &candidates, &names, 15).expect("lookup works");
    assert_eq!(similar.len(), SIMILAR_RESULT_LIMIT);
}

#[test]
fn find_similar_rejects_mismatched_query() {
    let (docs, candidates, names) = restaurant_fixture();
    assert!(find_similar(&[1.0], &docs, &candidates, &names, 2).is_err());
    assert!(find_similar(&[1.0, 0.0, 0.0], &docs, &candidates, &names, 0).is_err());
}

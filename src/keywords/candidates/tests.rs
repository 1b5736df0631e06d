use super::*;

fn docs(texts: &[&str]) -> Vec<String> {
    texts.iter().map(|t| (*t).to_string()).collect()
}

#[test]
fn unigrams_drop_stop_words_and_short_tokens() {
    let generator = NgramCandidates::default();
    let candidates = generator.candidates(&docs(&[
        "tasty cheesecake",
        "Cheesecake was great!",
        "quiet and intimate room, a 5 star",
    ]));

    assert_eq!(
        candidates,
        vec!["cheesecake", "great", "intimate", "quiet", "room", "star", "tasty"]
    );
}

#[test]
fn candidates_are_unique_and_sorted() {
    let generator = NgramCandidates::default();
    let candidates = generator.candidates(&docs(&["steak steak STEAK", "Steak"]));
    assert_eq!(candidates, vec!["steak"]);
}

#[test]
fn bigrams_skip_removed_stop_words() {
    let generator = NgramCandidates::new(1, 2).expect("range is valid");
    let candidates = generator.candidates(&docs(&["the wagyu was perfectly cooked"]));

    assert!(candidates.contains(&"wagyu".to_string()));
    assert!(candidates.contains(&"wagyu perfectly".to_string()));
    assert!(candidates.contains(&"perfectly cooked".to_string()));
    assert!(!candidates.iter().any(|c| c.contains("the")));
}

#[test]
fn ngrams_do_not_cross_documents() {
    let generator = NgramCandidates::new(2, 2).expect("range is valid");
    let candidates = generator.candidates(&docs(&["great steak", "dim lights"]));
    assert_eq!(candidates, vec!["dim lights", "great steak"]);
}

#[test]
fn empty_input_yields_nothing() {
    let generator = NgramCandidates::default();
    assert!(generator.candidates(&[]).is_empty());
    assert!(generator.candidates(&docs(&["", "the and of"])).is_empty());
}

#[test]
fn unicode_words_are_kept() {
    let generator = NgramCandidates::default();
    let candidates = generator.candidates(&docs(&["Crème brûlée"]));
    assert_eq!(candidates, vec!["brûlée", "crème"]);
}

#[test]
fn invalid_range_is_rejected() {
    assert!(NgramCandidates::new(0, 1).is_err());
    assert!(NgramCandidates::new(3, 2).is_err());

    let generator = NgramCandidates::new(1, 3).expect("range is valid");
    let candidates = generator.candidates(&docs(&["juicy wagyu burger"]));
    assert_eq!(candidates.len(), 6);
    assert!(candidates.contains(&"juicy wagyu burger".to_string()));
}

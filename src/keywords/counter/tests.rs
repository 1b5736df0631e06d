use super::*;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

#[test]
fn custom_keywords_appear_with_zero() {
    let counts = count_keywords(
        &strings(&["steak"]),
        &strings(&["waygu"]),
        &strings(&["great steak, loved it"]),
    );

    assert_eq!(counts.get("steak"), Some(1));
    assert_eq!(counts.get("waygu"), Some(0));
    assert_eq!(counts.keys().collect::<Vec<_>>(), vec!["steak", "waygu"]);
}

#[test]
fn matching_is_case_insensitive() {
    let counts = count_keywords(
        &strings(&["Cheesecake"]),
        &[],
        &strings(&["CHEESECAKE was great", "best cheesecake"]),
    );
    assert_eq!(counts.get("cheesecake"), Some(2));
}

#[test]
fn selection_order_then_custom_order() {
    let counts = count_keywords(
        &strings(&["room", "tasty"]),
        &strings(&["dim", "tasty", "intimate"]),
        &strings(&["tasty food in a dim room"]),
    );

    let ordered: Vec<(&str, usize)> = counts.iter().collect();
    assert_eq!(
        ordered,
        vec![("room", 1), ("tasty", 1), ("dim", 1), ("intimate", 0)]
    );
}

#[test]
fn duplicate_keywords_count_once() {
    let texts = strings(&["steak steak and more steak"]);
    let once = count_keywords(&strings(&["steak"]), &[], &texts);
    let twice = count_keywords(&strings(&["steak", "steak", "STEAK "]), &[], &texts);

    assert_eq!(once, twice);
    assert_eq!(twice.len(), 1);
    assert_eq!(twice.get("steak"), Some(3));
}

#[test]
fn substring_matches_are_counted() {
    let counts = count_keywords(&strings(&["dim"]), &[], &strings(&["dimly lit, dim room"]));
    assert_eq!(counts.get("dim"), Some(2));
}

#[test]
fn phrases_and_overlaps() {
    assert_eq!(count_occurrences("aaaa", "aa"), 2);
    assert_eq!(count_occurrences("great steak. great steak", "great steak"), 2);
    assert_eq!(count_occurrences("anything", ""), 0);
}

#[test]
fn snippets_are_joined_with_a_space() {
    let counts = count_keywords(&strings(&["great steak"]), &[], &strings(&["great", "steak"]));
    assert_eq!(counts.get("great steak"), Some(1));
}

#[test]
fn empty_corpus_keeps_custom_keywords() {
    let counts = count_keywords(&[], &strings(&["quiet", "", "  "]), &[]);
    assert_eq!(counts.iter().collect::<Vec<_>>(), vec![("quiet", 0)]);
}

#[test]
fn serializes_as_ordered_object() {
    let counts = count_keywords(
        &strings(&["zebra", "apple"]),
        &strings(&["mango"]),
        &strings(&["apple zebra apple"]),
    );
    let json = serde_json::to_string(&counts).expect("counts serialize");
    assert_eq!(json, r#"{"zebra":1,"apple":2,"mango":0}"#);
}

#[test]
fn insert_if_absent_keeps_first() {
    let mut counts = KeywordCounts::new();
    assert!(counts.is_empty());
    assert!(counts.insert_if_absent("steak", 3));
    assert!(!counts.insert_if_absent("steak", 9));
    assert_eq!(counts.get("steak"), Some(3));
    assert_eq!(counts.get("fish"), None);
}

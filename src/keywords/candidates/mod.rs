#[cfg(test)]
mod tests;

use std::collections::HashSet;
use std::sync::LazyLock;

use fancy_regex::Regex;
use itertools::Itertools;
use tracing::debug;

use crate::{KeywordsError, Result};

/// Produces the unique candidate terms keyword selection chooses from
pub trait CandidateGenerator {
    fn candidates(&self, texts: &[String]) -> Vec<String>;
}

static TOKEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w\w+\b").expect("valid regex"));

pub const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "above", "across", "after", "afterwards", "again", "against", "all", "almost",
    "alone", "along", "already", "also", "although", "always", "am", "among", "amongst", "an",
    "and", "another", "any", "anyhow", "anyone", "anything", "anyway", "anywhere", "are",
    "around", "as", "at", "back", "be", "became", "because", "become", "becomes", "been",
    "before", "beforehand", "behind", "being", "below", "beside", "besides", "between", "beyond",
    "both", "but", "by", "can", "cannot", "could", "did", "do", "does", "done", "down", "due",
    "during", "each", "either", "else", "elsewhere", "enough", "etc", "even", "ever", "every",
    "everyone", "everything", "everywhere", "except", "few", "for", "former", "formerly", "from",
    "further", "get", "give", "go", "had", "has", "hasnt", "have", "he", "hence", "her", "here",
    "hereafter", "hereby", "herein", "hers", "herself", "him", "himself", "his", "how",
    "however", "ie", "if", "in", "indeed", "into", "is", "it", "its", "itself", "just", "keep",
    "last", "latter", "least", "less", "ltd", "made", "many", "may", "me", "meanwhile", "might",
    "mine", "more", "moreover", "most", "mostly", "much", "must", "my", "myself", "namely",
    "neither", "never", "nevertheless", "next", "no", "nobody", "none", "nor", "not", "nothing",
    "now", "nowhere", "of", "off", "often", "on", "once", "one", "only", "onto", "or", "other",
    "others", "otherwise", "our", "ours", "ourselves", "out", "over", "own", "per", "perhaps",
    "please", "put", "rather", "re", "same", "see", "seem", "seemed", "seeming", "seems",
    "several", "she", "should", "since", "so", "some", "somehow", "someone", "something",
    "sometime", "sometimes", "somewhere", "still", "such", "than", "that", "the", "their",
    "them", "themselves", "then", "thence", "there", "thereafter", "thereby", "therefore",
    "therein", "thereupon", "these", "they", "this", "those", "though", "through", "throughout",
    "thru", "thus", "to", "together", "too", "toward", "towards", "un", "under", "until", "up",
    "upon", "us", "very", "via", "was", "we", "well", "were", "what", "whatever", "when",
    "whence", "whenever", "where", "whereafter", "whereas", "whereby", "wherein", "whereupon",
    "wherever", "whether", "which", "while", "whither", "who", "whoever", "whole", "whom",
    "whose", "why", "will", "with", "within", "without", "would", "yet", "you", "your", "yours",
    "yourself", "yourselves",
];

/// Word n-grams over lower-cased tokens with English stop words removed.
///
/// Tokens are runs of two or more word characters. N-grams never span two
/// documents. Output is unique and sorted.
#[derive(Debug, Clone)]
pub struct NgramCandidates {
    min_n: usize,
    max_n: usize,
    stop_words: HashSet<&'static str>,
}

impl Default for NgramCandidates {
    #[inline]
    fn default() -> Self {
        Self {
            min_n: 1,
            max_n: 1,
            stop_words: ENGLISH_STOP_WORDS.iter().copied().collect(),
        }
    }
}

impl NgramCandidates {
    /// `min_n..=max_n` word n-grams
    #[inline]
    pub fn new(min_n: usize, max_n: usize) -> Result<Self> {
        if min_n == 0 || min_n > max_n {
            return Err(KeywordsError::InvalidParameter(format!(
                "invalid n-gram range ({min_n}, {max_n})"
            )));
        }

        Ok(Self {
            min_n,
            max_n,
            ..Self::default()
        })
    }

    /// Lower-cased tokens of `text` minus stop words
    #[inline]
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        TOKEN_REGEX
            .find_iter(&lowered)
            .filter_map(std::result::Result::ok)
            .map(|m| m.as_str())
            .filter(|token| !self.stop_words.contains(*token))
            .map(String::from)
            .collect()
    }

    fn document_ngrams(&self, text: &str) -> Vec<String> {
        let tokens = self.tokenize(text);
        (self.min_n..=self.max_n)
            .flat_map(|n| tokens.windows(n).map(|window| window.join(" ")))
            .collect()
    }
}

impl CandidateGenerator for NgramCandidates {
    #[inline]
    fn candidates(&self, texts: &[String]) -> Vec<String> {
        let candidates: Vec<String> = texts
            .iter()
            .flat_map(|text| self.document_ngrams(text))
            .sorted()
            .dedup()
            .collect();

        debug!(
            "Generated {} candidates from {} documents",
            candidates.len(),
            texts.len()
        );
        candidates
    }
}

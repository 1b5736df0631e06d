// Keywords module
// Candidate generation, diversified selection and occurrence counting

pub mod candidates;
pub mod counter;
pub mod mmr;
pub mod pipeline;

pub use candidates::{CandidateGenerator, NgramCandidates};
pub use counter::{KeywordCounts, count_keywords, count_occurrences};
pub use mmr::{SIMILAR_RESULT_LIMIT, ScoredTerm, cosine_similarity, find_similar, select_keywords};
pub use pipeline::{ExtractionOutcome, ExtractionParams, KeywordExtractor};

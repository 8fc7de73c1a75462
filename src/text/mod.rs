//! Text processing: tokenization, similarity strategies, and span cleanup.

mod refine;
mod similarity;
mod tokenize;

pub use refine::{truncate_with_ellipsis, TextRefiner, ELLIPSIS};
pub use similarity::{CosineSimilarity, JaccardSimilarity, SimilarityMode, TextSimilarity};
pub use tokenize::{is_stop_word, keyword_set, tokenize, MIN_TOKEN_CHARS};

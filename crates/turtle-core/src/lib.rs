pub mod cache;
pub mod checker;
pub mod error;
pub mod parser;
pub mod preprocess;
pub mod source;

pub use cache::{LoadState, UsedWordSet, WordListCache};
pub use checker::{AnswerChecker, Verdict};
pub use error::{CheckError, ParseError, WordListError};
pub use parser::parse_word_list;
pub use source::{CorpusSource, HttpCorpusSource};

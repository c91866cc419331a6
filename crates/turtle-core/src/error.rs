/// Word list HTML did not have the expected shape
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Could not find #{0} element")]
    MissingContainer(String),
}

/// Failure to populate the used-word cache
///
/// Cloned to every caller waiting on the same load.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WordListError {
    #[error("Failed to fetch word list: {0}")]
    Fetch(String),

    #[error("Failed to fetch word list: HTTP {0}")]
    Status(u16),

    #[error("Failed to parse word list: {0}")]
    Parse(#[from] ParseError),

    #[error("Word list load was cancelled")]
    Cancelled,
}

impl From<reqwest::Error> for WordListError {
    fn from(e: reqwest::Error) -> Self {
        WordListError::Fetch(e.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckError {
    #[error("Invalid word '{word}': expected {expected} letters")]
    InvalidWord { word: String, expected: usize },

    #[error(transparent)]
    WordList(#[from] WordListError),
}

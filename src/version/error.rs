use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Empty version string")]
    EmptyVersion,

    #[error("Error parsing version range {0}")]
    MissingVersion(String),

    #[error("Cannot bump '{version}' version index {index}, not an int")]
    NotNumeric { version: String, index: usize },
}

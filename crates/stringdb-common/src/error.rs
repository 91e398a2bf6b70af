//! Error types shared by stringdb crates

use thiserror::Error;

/// Result type alias for common operations
pub type Result<T> = std::result::Result<T, CommonError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommonError {
    #[error("Identifier list is empty: add at least one gene or protein identifier before building a request")]
    EmptyIdentifiers,

    #[error("Invalid taxon id '{0}': expected a positive NCBI taxonomy number such as 9606")]
    InvalidTaxon(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_fix() {
        assert!(CommonError::EmptyIdentifiers.to_string().contains("at least one"));
        assert!(CommonError::InvalidTaxon("human".to_string())
            .to_string()
            .contains("'human'"));
    }
}

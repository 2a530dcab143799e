use std::path::{Path, PathBuf};

use models::errors::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("corrupt store format: {0}")]
    CorruptFormat(String),
    #[error("cannot encode store document: {0}")]
    Encode(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("user id space exhausted")]
    IdSpaceExhausted,
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    pub fn user_not_found(id: models::UserId) -> Self { Self::not_found(&format!("user {id}")) }

    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io { path: path.to_path_buf(), source }
    }

    /// Short label used for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Io { .. } => "io",
            Self::CorruptFormat(_) => "corrupt_format",
            Self::Encode(_) => "encode",
            Self::NotFound(_) => "not_found",
            Self::IdSpaceExhausted => "id_space_exhausted",
        }
    }
}

impl From<ModelError> for ServiceError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::IdSpaceExhausted(_) => Self::IdSpaceExhausted,
            ModelError::IdAboveCounter { .. } => Self::CorruptFormat(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_distinct_per_variant() {
        let errs = [
            ServiceError::io(Path::new("users.json"), std::io::Error::other("disk full")),
            ServiceError::CorruptFormat("eof".into()),
            ServiceError::Encode("key must be a string".into()),
            ServiceError::user_not_found(1),
            ServiceError::IdSpaceExhausted,
        ];
        let kinds: Vec<_> = errs.iter().map(ServiceError::kind).collect();
        assert_eq!(kinds, ["io", "corrupt_format", "encode", "not_found", "id_space_exhausted"]);
    }

    #[test]
    fn model_errors_map_to_service_errors() {
        let exhausted: ServiceError = ModelError::IdSpaceExhausted(models::UserId::MAX).into();
        assert!(matches!(exhausted, ServiceError::IdSpaceExhausted));
        let above: ServiceError = ModelError::IdAboveCounter { id: 3, increment: 2 }.into();
        assert!(matches!(above, ServiceError::CorruptFormat(_)));
    }
}

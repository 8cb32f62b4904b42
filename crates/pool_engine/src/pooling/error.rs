//! Pool errors

use super::prototype::TypeKey;
use super::slot::SlotRef;
use thiserror::Error;

/// Broad category of a pool failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request or the registry was set up wrongly
    Configuration,
    /// Bookkeeping expected to exist could not be found
    Lookup,
}

/// Errors that can occur while acquiring or releasing pooled objects
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PoolError {
    /// Prototype has no pooling metadata and so no type key
    #[error("Prototype '{prototype}' was not configured with pooling metadata")]
    MissingMetadata {
        /// Name of the offending prototype
        prototype: String,
    },

    /// Registry has not been initialized yet
    #[error("Object pool registry is not initialized")]
    NotInitialized,

    /// Release delay is NaN or infinite
    #[error("Invalid release delay: {0}")]
    InvalidDelay(f32),

    /// No bucket exists where one was expected
    #[error("Repository for type key '{0}' not found")]
    BucketNotFound(TypeKey),

    /// Slot reference points outside its bucket, or at a bucket this
    /// registry does not own
    #[error("Pooled slot {slot:?} not found")]
    SlotNotFound {
        /// The dangling reference
        slot: SlotRef,
    },
}

impl PoolError {
    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingMetadata { .. } | Self::NotInitialized | Self::InvalidDelay(_) => {
                ErrorKind::Configuration
            }
            Self::BucketNotFound(_) | Self::SlotNotFound { .. } => ErrorKind::Lookup,
        }
    }
}

/// Result type for pool operations
pub type PoolResult<T> = Result<T, PoolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let missing = PoolError::MissingMetadata { prototype: "crate".to_string() };
        assert_eq!(missing.kind(), ErrorKind::Configuration);
        assert_eq!(PoolError::NotInitialized.kind(), ErrorKind::Configuration);
        assert_eq!(PoolError::InvalidDelay(f32::NAN).kind(), ErrorKind::Configuration);
        assert_eq!(PoolError::BucketNotFound(TypeKey::from("bullet")).kind(), ErrorKind::Lookup);
    }

    #[test]
    fn test_error_messages_name_the_culprit() {
        let missing = PoolError::MissingMetadata { prototype: "crate".to_string() };
        assert!(missing.to_string().contains("crate"));

        let lookup = PoolError::BucketNotFound(TypeKey::from("bullet"));
        assert_eq!(lookup.to_string(), "Repository for type key 'bullet' not found");
    }
}

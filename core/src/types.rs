use thiserror::Error;

use crate::choice::{ChoiceError, RegistrationError};
use crate::codec::{DecodeError, EncodingError};
use crate::extensions::ExtensionError;
use crate::profile::ProfileError;
use crate::validation::ValidationError;

/// Umbrella error for callers that drive several layers at once.
/// - Every layer error converts with `?`.
/// - Display forwards to the wrapped error, prefixed by the layer.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("registration error: {0}")]
    Registration(#[from] RegistrationError),

    #[error("type choice error: {0}")]
    Choice(#[from] ChoiceError),

    #[error("extension error: {0}")]
    Extension(#[from] ExtensionError),

    #[error("profile error: {0}")]
    Profile(#[from] ProfileError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("encode error: {0}")]
    Encode(#[from] EncodingError),
}

impl ManifestError {
    /// Whether the failure came from input data rather than from setup.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            ManifestError::Validation(_) | ManifestError::Decode(_) | ManifestError::Encode(_)
        )
    }
}

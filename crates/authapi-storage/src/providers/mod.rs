//! Storage backend implementations.

pub mod local;
pub mod memory;
#[cfg(feature = "s3")]
pub mod s3;

pub use local::LocalFileStorage;
pub use memory::InMemoryFileStorage;
#[cfg(feature = "s3")]
pub use s3::S3FileStorage;

use authapi_core::error::AppError;

/// Reject bucket or object names that could escape their directory.
pub(crate) fn check_segment(kind: &str, name: &str) -> Result<(), AppError> {
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0')
    {
        return Err(AppError::validation(format!("Invalid {kind} name: '{name}'")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_segment() {
        assert!(check_segment("object", "report.pdf").is_ok());
        assert!(check_segment("object", "").is_err());
        assert!(check_segment("object", "..").is_err());
        assert!(check_segment("object", "a/b").is_err());
        assert!(check_segment("bucket", "a\\b").is_err());
    }
}

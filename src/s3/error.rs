use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::primitives::ByteStreamError;
use thiserror::Error;

/// Failure taxonomy for upload operations. Rejections reported by the S3
/// service itself are kept apart from everything else (dispatch failures,
/// timeouts, local I/O), and the two arms render with the two prefixes the
/// binary prints to the console.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("ERROR:{0}")]
    Service(String),
    #[error("NETWORK_ERROR: {0}")]
    Network(String),
}

impl UploadError {
    /// Sorts an SDK failure into the service/network split.
    pub fn from_sdk<E, R>(err: SdkError<E, R>) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
        R: std::fmt::Debug,
    {
        let msg = DisplayErrorContext(&err).to_string();
        match err {
            SdkError::ServiceError(_) => UploadError::Service(msg),
            _ => UploadError::Network(msg),
        }
    }
}

impl From<std::io::Error> for UploadError {
    fn from(err: std::io::Error) -> Self {
        UploadError::Network(err.to_string())
    }
}

impl From<ByteStreamError> for UploadError {
    fn from(err: ByteStreamError) -> Self {
        UploadError::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_errors_use_error_prefix() {
        let err = UploadError::Service("access denied".into());
        assert!(err.to_string().starts_with("ERROR:"));
    }

    #[test]
    fn everything_else_uses_network_prefix() {
        let err = UploadError::Network("connection reset".into());
        assert!(err.to_string().starts_with("NETWORK_ERROR:"));
    }

    #[test]
    fn io_errors_classify_as_network() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        assert!(matches!(UploadError::from(io), UploadError::Network(_)));
    }
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to upload to s3: {message}")]
    Put { key: String, message: String },

    #[error("failed to list objects under {prefix:?}: {message}")]
    List { prefix: String, message: String },

    #[error("cannot reach bucket {bucket:?}: {message}")]
    Connection { bucket: String, message: String },

    #[error("Invalid object key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn put(key: &str, message: impl ToString) -> Self {
        StoreError::Put {
            key: key.to_string(),
            message: message.to_string(),
        }
    }

    pub fn list(prefix: &str, message: impl ToString) -> Self {
        StoreError::List {
            prefix: prefix.to_string(),
            message: message.to_string(),
        }
    }
}

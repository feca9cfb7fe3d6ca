pub mod error;
pub mod local;
pub mod provider;
pub mod s3;

pub use error::StoreError;
pub use provider::ObjectStore;

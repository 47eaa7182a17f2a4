pub mod backend;
pub mod error;
pub mod testing;

pub use backend::NdaBackend;
pub use error::BackendError;

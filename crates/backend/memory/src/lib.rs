mod store;

pub use store::{MemoryBackend, hash_password};

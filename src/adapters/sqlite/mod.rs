//! SQLite adapters: connection pool, vec0 registration, food record
//! source, and the embedding vector store.

pub mod connection;
pub mod extensions;
pub mod food_source;
pub mod vector_store;

pub use connection::create_pool;
pub use food_source::SqliteFoodSource;
pub use vector_store::{SqliteVectorStore, VectorBackend};

pub mod memory;
#[cfg(feature = "qdrant")]
pub mod qdrant;
pub mod traits;

pub use memory::MemoryStore;
#[cfg(feature = "qdrant")]
pub use qdrant::QdrantStore;
pub use traits::{AgentStore, StoreProvider};

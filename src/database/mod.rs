pub mod memory;
pub mod models;
pub mod mongo;
pub mod store;

pub use memory::InMemoryItemStore;
pub use mongo::MongoItemStore;
pub use store::{ItemFilter, ItemStore, StoreError};

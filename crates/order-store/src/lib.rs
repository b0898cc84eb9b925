pub mod error;
pub mod memory;
pub mod order;
pub mod store;

pub use error::{DecodeError, Result};
pub use memory::InMemoryOrderStore;
pub use order::Order;
pub use store::{OrderStore, OrderStoreExt};

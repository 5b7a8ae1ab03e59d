pub mod contacts;
pub mod invoices;
pub mod payments;
pub mod pool;
pub mod search;
pub mod users;

pub use pool::{create_pool, run_migrations};

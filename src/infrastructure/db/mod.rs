pub mod postgres;

pub use postgres::{Storage, StorageStatus};

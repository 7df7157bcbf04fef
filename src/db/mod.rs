pub mod connection;
pub mod pause_ledger;
pub mod photos;
pub mod settings;
pub mod snapshots;

pub use connection::Database;

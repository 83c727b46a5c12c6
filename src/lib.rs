pub mod config;
pub mod error;
pub mod fetch;
pub mod retry;
pub mod transport;

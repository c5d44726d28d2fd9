pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod session;
pub mod storage;
pub mod types;
pub mod views;

#[cfg(test)]
pub mod testing;

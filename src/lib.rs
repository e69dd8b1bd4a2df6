//! Library side of dayplan: the task store, its persistence slot, the derived
//! progress values, and the CLI/TUI front ends built on them.

pub mod commands;
pub mod error;
pub mod models;
pub mod progress;
pub mod storage;
pub mod store;
pub mod tui;

pub use error::{Result, StoreError};
pub use store::TaskStore;

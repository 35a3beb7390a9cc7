//! FoodDel Core — error type and configuration shared by the store and server.

pub mod config;
pub mod error;

pub use config::{DataPaths, FoodDelConfig};
pub use error::{Error, Result};

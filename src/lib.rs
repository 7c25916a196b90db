pub mod agent;
pub mod bridge;
pub mod cli;
pub mod config;
pub mod conversation;
pub mod error;
pub mod llm;
pub mod models;
pub mod session;
pub mod tools;
pub mod ui;

pub use error::{FactCheckError, Result};

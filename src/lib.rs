pub mod builder;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod git;
pub mod logging;
pub mod record;
pub mod resolver;
pub mod ui;

pub use error::{Result, TagVersionError};
pub use resolver::TagResolver;

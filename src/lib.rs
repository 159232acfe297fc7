pub mod app;
pub mod cli;
pub mod collection;
pub mod error;
pub mod host;
pub mod render;
pub mod surfaces;
pub mod types;
pub mod utils;
pub mod validation;
pub mod workout;

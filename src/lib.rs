pub mod cli;
pub mod codec;
pub mod config;
pub mod model;
pub mod store;

mod api;
mod flock;

pub use api::{ModCache, ModCacheBuilder};
pub use cli::command_handlers::VerifyReport;

pub mod config;
pub mod models;
pub mod utils;

pub use config::*;
pub use models::*;
pub use utils::*;

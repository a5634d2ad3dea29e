pub mod errors;
pub mod models;
pub mod repo;

pub use errors::*;
pub use models::*;
pub use repo::*;

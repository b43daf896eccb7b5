//! Database schema, models, read queries and seeding

pub mod dimensions;
pub mod init;
pub mod models;
pub mod seed;

pub use dimensions::*;
pub use init::*;
pub use models::*;
pub use seed::*;

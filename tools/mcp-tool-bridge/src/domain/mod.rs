pub mod error;
pub mod result;
pub mod schema;
pub mod server;

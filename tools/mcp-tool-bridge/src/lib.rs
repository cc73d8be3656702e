pub mod adapters;
pub mod app;
pub mod domain;
pub mod infra;
pub mod shared;

pub mod adapters;
pub mod client;
pub mod config;
pub mod model;
pub mod util;

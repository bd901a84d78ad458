pub mod constants;
pub mod engine;
pub mod rng;
pub mod server_protocol;
pub mod server_utils;
pub mod settings;
pub mod sync;
pub mod types;

pub mod config;
pub mod document;
pub mod engine;
pub mod log;
pub mod model;
pub mod remote;
pub mod store;
pub mod tags;
pub mod transport;

pub mod config;
pub mod events;
pub mod fetch;
pub mod flow;
pub mod geo;
pub mod loader;
pub mod output;
pub mod parser;
pub mod render;
pub mod schema;
pub mod selection;
pub mod server;
pub mod stats;
pub mod zone;

#[cfg(test)]
pub(crate) mod test_logs;

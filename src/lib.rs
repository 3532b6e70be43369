pub mod app;
pub mod clock;
pub mod command;
pub mod config;
pub mod filter;
pub mod ingest;
pub mod lanes;
pub mod logging;
pub mod palette;
pub mod poster;
pub mod render;
pub mod status;
pub mod time;

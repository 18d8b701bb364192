pub mod clock;
pub mod command;
pub mod config;
pub mod engine;
pub mod runner;

pub mod config;
pub mod export;
pub mod interactive;
pub mod logging;
pub mod simulation;

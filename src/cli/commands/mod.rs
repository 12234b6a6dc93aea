pub mod config;
pub mod generate;
pub mod github;
pub mod local;

pub mod agent;
pub mod config;
pub mod db;
pub mod errors;
pub mod model;
pub mod pipeline;
pub mod prompt;
pub mod providers;
pub mod report;
pub mod tools;

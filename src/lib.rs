pub mod audit;
pub mod backup;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod scanner;

pub mod api;
pub mod app;
pub mod browse;
pub mod cli;
pub mod config;
pub mod controller;
pub mod output;
pub mod pagination;
pub mod query;
pub mod render;
pub mod runner;

#[cfg(test)]
mod tests;

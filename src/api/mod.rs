mod client;
mod error;
mod models;

use async_trait::async_trait;

pub use client::{ApiClient, ClientOptions, CarQuery, DEFAULT_LIMIT, MAX_LIMIT};
pub use error::ApiError;
pub use models::{parse_timestamp, Car, CarStats, CarsPage, MakeCount, ScraperAck};

/// Backend the controller pulls cars and statistics from.
#[async_trait]
pub trait CarSource: Send + Sync {
    async fn cars(&self, query: &CarQuery) -> Result<CarsPage, ApiError>;

    async fn stats(&self) -> Result<CarStats, ApiError>;

    async fn car(&self, id: &str) -> Result<Car, ApiError>;

    async fn run_scraper(&self, pages: u32) -> Result<ScraperAck, ApiError>;
}

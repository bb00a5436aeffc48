use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{RequestBuilder, Url};
use serde::de::DeserializeOwned;

use super::error::ApiError;
use super::models::{Car, CarStats, CarsPage, ScraperAck};
use super::CarSource;
use crate::query::{CarFilters, QueryState, SortOrder};

pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

const CARS_PATH: &str = "api/v1/cars";
const STATS_PATH: &str = "api/v1/cars/stats";
const SCRAPER_PATH: &str = "api/v1/scraper/run";

#[derive(Clone, Debug)]
pub struct ClientOptions {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub proxy: Option<String>,
    pub header: Option<String>,
    pub user_agent: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_seconds: 10,
            proxy: None,
            header: None,
            user_agent: format!("carview/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Parameters of one `GET /api/v1/cars` request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CarQuery {
    pub page: u32,
    pub limit: u32,
    pub sort: SortOrder,
    pub filters: CarFilters,
}

impl CarQuery {
    pub fn from_state(state: &QueryState, limit: u32) -> Self {
        Self {
            page: state.page(),
            limit,
            sort: state.sort().clone(),
            filters: state.filters().clone(),
        }
    }

    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut out = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
            ("sort_by", self.sort.field.clone()),
            ("sort_order", self.sort.direction.as_i8().to_string()),
        ];
        out.extend(self.filters.query_pairs());
        out
    }
}

fn parse_header(raw: &str) -> Result<(HeaderName, HeaderValue), ApiError> {
    let invalid = || ApiError::InvalidHeader {
        header: raw.to_string(),
    };
    let (name, value) = raw.split_once(':').ok_or_else(invalid)?;
    let name = HeaderName::from_bytes(name.trim().as_bytes()).map_err(|_| invalid())?;
    let value = HeaderValue::from_str(value.trim()).map_err(|_| invalid())?;
    Ok((name, value))
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(options: &ClientOptions) -> Result<Self, ApiError> {
        let base_url = options.base_url.trim().trim_end_matches('/').to_string();
        match Url::parse(&base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => {
                return Err(ApiError::InvalidUrl {
                    url: options.base_url.clone(),
                })
            }
        }

        let mut headers = HeaderMap::new();
        let user_agent = HeaderValue::from_str(&options.user_agent).map_err(|_| {
            ApiError::InvalidHeader {
                header: format!("User-Agent: {}", options.user_agent),
            }
        })?;
        headers.insert(reqwest::header::USER_AGENT, user_agent);
        if let Some(raw) = options.header.as_deref().filter(|h| !h.trim().is_empty()) {
            let (name, value) = parse_header(raw)?;
            headers.insert(name, value);
        }

        let builder = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(options.timeout_seconds.max(1)));
        let builder = match options.proxy.as_deref().filter(|p| !p.trim().is_empty()) {
            Some(proxy) => {
                let proxy_cfg =
                    reqwest::Proxy::all(proxy).map_err(|source| ApiError::ProxySetup {
                        proxy: proxy.to_string(),
                        source,
                    })?;
                builder.proxy(proxy_cfg)
            }
            None => builder.no_proxy(),
        };
        let http = builder
            .build()
            .map_err(|source| ApiError::ClientBuild { source })?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        let raw = format!("{}/{}", self.base_url, path);
        Url::parse(&raw).map_err(|_| ApiError::InvalidUrl { url: raw })
    }

    pub fn cars_url(&self, query: &CarQuery) -> Result<Url, ApiError> {
        let mut url = self.endpoint(CARS_PATH)?;
        url.query_pairs_mut().extend_pairs(query.pairs());
        Ok(url)
    }

    pub fn scraper_url(&self, pages: u32) -> Result<Url, ApiError> {
        let mut url = self.endpoint(SCRAPER_PATH)?;
        url.query_pairs_mut()
            .append_pair("pages", &pages.to_string());
        Ok(url)
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        url: &Url,
    ) -> Result<T, ApiError> {
        let url_str = url.to_string();
        let response = request.send().await.map_err(|source| ApiError::Transport {
            url: url_str.clone(),
            source,
        })?;
        let status = response.status();
        if !status.is_success() {
            tracing::debug!(url = %url_str, status = status.as_u16(), "non-success response");
            return Err(ApiError::Status {
                status: status.as_u16(),
                url: url_str,
            });
        }
        let body = response
            .bytes()
            .await
            .map_err(|source| ApiError::Transport {
                url: url_str.clone(),
                source,
            })?;
        serde_json::from_slice::<T>(&body).map_err(|source| ApiError::Decode {
            url: url_str,
            source,
        })
    }
}

#[async_trait]
impl CarSource for ApiClient {
    async fn cars(&self, query: &CarQuery) -> Result<CarsPage, ApiError> {
        let url = self.cars_url(query)?;
        tracing::info!(url = %url, "requesting cars");
        self.fetch_json(self.http.get(url.clone()), &url).await
    }

    async fn stats(&self) -> Result<CarStats, ApiError> {
        let url = self.endpoint(STATS_PATH)?;
        self.fetch_json(self.http.get(url.clone()), &url).await
    }

    async fn car(&self, id: &str) -> Result<Car, ApiError> {
        let mut url = self.endpoint(CARS_PATH)?;
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl {
                url: self.base_url.clone(),
            })?
            .push(id);
        self.fetch_json(self.http.get(url.clone()), &url).await
    }

    async fn run_scraper(&self, pages: u32) -> Result<ScraperAck, ApiError> {
        let url = self.scraper_url(pages)?;
        tracing::info!(url = %url, pages, "starting scraper");
        self.fetch_json(self.http.post(url.clone()), &url).await
    }
}

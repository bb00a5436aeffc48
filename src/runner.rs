//! Library entry point: validated options in, a ready controller out.

use std::time::Duration;

use thiserror::Error;

use crate::api::{ApiClient, ApiError, ClientOptions, MAX_LIMIT};
use crate::cli::validation::MAX_SCRAPE_PAGES;
use crate::controller::{Controller, ControllerOptions, DEFAULT_SCRAPE_PAGES, DEFAULT_SCRAPE_REFRESH_DELAY};
use crate::query::{FilterForm, QueryState, SortOrder};
use crate::render::{Renderer, ViewMode};

#[derive(Clone, Debug)]
pub struct Options {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub proxy: Option<String>,
    pub header: Option<String>,
    pub page_size: u32,
    pub max_visible_pages: u32,
    pub sort: SortOrder,
    pub filters: FilterForm,
    pub view: ViewMode,
    pub scrape_pages: u32,
    pub scrape_refresh_delay: Duration,
}

impl Default for Options {
    fn default() -> Self {
        let client = ClientOptions::default();
        let controller = ControllerOptions::default();
        Self {
            base_url: client.base_url,
            timeout_seconds: client.timeout_seconds,
            proxy: None,
            header: None,
            page_size: controller.page_size,
            max_visible_pages: controller.max_visible_pages,
            sort: SortOrder::default(),
            filters: FilterForm::default(),
            view: controller.view,
            scrape_pages: DEFAULT_SCRAPE_PAGES,
            scrape_refresh_delay: DEFAULT_SCRAPE_REFRESH_DELAY,
        }
    }
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("invalid page size {value}, expected 1-{MAX_LIMIT}")]
    InvalidPageSize { value: u32 },

    #[error("invalid max_visible_pages {value}, expected positive integer")]
    InvalidMaxVisiblePages { value: u32 },

    #[error("invalid scrape_pages {value}, expected 1-{MAX_SCRAPE_PAGES}")]
    InvalidScrapePages { value: u32 },

    #[error(transparent)]
    Api(#[from] ApiError),
}

pub struct Runner {
    client: ApiClient,
    options: Options,
}

impl Runner {
    pub fn new(options: Options) -> Result<Self, RunnerError> {
        if options.page_size == 0 || options.page_size > MAX_LIMIT {
            return Err(RunnerError::InvalidPageSize {
                value: options.page_size,
            });
        }
        if options.max_visible_pages == 0 {
            return Err(RunnerError::InvalidMaxVisiblePages {
                value: options.max_visible_pages,
            });
        }
        if options.scrape_pages == 0 || options.scrape_pages > MAX_SCRAPE_PAGES {
            return Err(RunnerError::InvalidScrapePages {
                value: options.scrape_pages,
            });
        }
        let client = ApiClient::new(&ClientOptions {
            base_url: options.base_url.clone(),
            timeout_seconds: options.timeout_seconds,
            proxy: options.proxy.clone(),
            header: options.header.clone(),
            ..ClientOptions::default()
        })?;
        Ok(Self { client, options })
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Starting state: configured filters and sort, page 1.
    pub fn initial_state(&self) -> QueryState {
        QueryState::new(self.options.filters.to_filters(), self.options.sort.clone())
    }

    pub fn controller<R: Renderer>(&self, renderer: R) -> Controller<ApiClient, R> {
        Controller::with_state(
            self.client.clone(),
            renderer,
            ControllerOptions {
                page_size: self.options.page_size,
                max_visible_pages: self.options.max_visible_pages,
                scrape_refresh_delay: self.options.scrape_refresh_delay,
                view: self.options.view,
            },
            self.initial_state(),
        )
    }
}

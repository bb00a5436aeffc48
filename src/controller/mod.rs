//! Pagination and query-state controller.
//!
//! Owns the single [`QueryState`] of a session, drives a [`CarSource`] and
//! reports every outcome to a [`Renderer`]. Cars fetches are tagged with a
//! [`LoadTicket`]; only the most recently issued ticket may update state.

use std::time::Duration;

use crate::api::{ApiError, CarQuery, CarSource, CarStats, CarsPage, DEFAULT_LIMIT};
use crate::pagination::{PaginationBar, DEFAULT_MAX_VISIBLE};
use crate::query::{FilterForm, QueryState, SortDirection};
use crate::render::{Notice, Renderer, ViewMode};

pub const DEFAULT_SCRAPE_PAGES: u32 = 3;
pub const DEFAULT_SCRAPE_REFRESH_DELAY: Duration = Duration::from_secs(5);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadPhase {
    Idle,
    Loading,
    Loaded,
    Error,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct LoadTicket(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    Failed,
    /// A newer fetch was issued after this one; the response was dropped.
    Stale,
    /// The backend answered a page beyond its own total. The page was clamped
    /// and nothing was rendered; the caller should load again.
    OutOfRange,
}

#[derive(Clone, Debug)]
pub struct ControllerOptions {
    pub page_size: u32,
    pub max_visible_pages: u32,
    pub scrape_refresh_delay: Duration,
    pub view: ViewMode,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_LIMIT,
            max_visible_pages: DEFAULT_MAX_VISIBLE,
            scrape_refresh_delay: DEFAULT_SCRAPE_REFRESH_DELAY,
            view: ViewMode::Grid,
        }
    }
}

pub struct Controller<S, R> {
    source: S,
    renderer: R,
    options: ControllerOptions,
    state: QueryState,
    view: ViewMode,
    phase: LoadPhase,
    last_ticket: u64,
    loaded: Option<CarsPage>,
    stats: Option<CarStats>,
}

impl<S: CarSource, R: Renderer> Controller<S, R> {
    pub fn new(source: S, renderer: R, options: ControllerOptions) -> Self {
        Self::with_state(source, renderer, options, QueryState::default())
    }

    pub fn with_state(source: S, renderer: R, options: ControllerOptions, state: QueryState) -> Self {
        let view = options.view;
        Self {
            source,
            renderer,
            options,
            state,
            view,
            phase: LoadPhase::Idle,
            last_ticket: 0,
            loaded: None,
            stats: None,
        }
    }

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn loaded(&self) -> Option<&CarsPage> {
        self.loaded.as_ref()
    }

    pub fn stats(&self) -> Option<&CarStats> {
        self.stats.as_ref()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn pagination(&self) -> Option<PaginationBar> {
        PaginationBar::build(
            self.state.page(),
            self.state.total_pages(),
            self.options.max_visible_pages,
        )
    }

    /// Issues a new ticket and the query it should run. Any ticket issued
    /// earlier becomes stale.
    pub fn begin_load(&mut self) -> (LoadTicket, CarQuery) {
        self.last_ticket += 1;
        self.phase = LoadPhase::Loading;
        self.renderer.render_loading();
        let query = CarQuery::from_state(&self.state, self.options.page_size);
        (LoadTicket(self.last_ticket), query)
    }

    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<CarsPage, ApiError>,
    ) -> LoadOutcome {
        if ticket.0 != self.last_ticket {
            tracing::debug!(
                ticket = ticket.0,
                latest = self.last_ticket,
                "discarding stale cars response"
            );
            return LoadOutcome::Stale;
        }
        match result {
            Ok(page) if page.total_pages >= 1 && page.page > page.total_pages => {
                tracing::info!(
                    page = page.page,
                    total_pages = page.total_pages,
                    "requested page no longer exists, reloading last page"
                );
                self.state = self.state.with_page_info(page.page, page.total_pages);
                self.loaded = Some(page);
                LoadOutcome::OutOfRange
            }
            Ok(page) => {
                self.state = self.state.with_page_info(page.page, page.total_pages);
                self.phase = LoadPhase::Loaded;
                tracing::debug!(
                    page = self.state.page(),
                    total_pages = self.state.total_pages(),
                    total = page.total,
                    "cars loaded"
                );
                self.loaded = Some(page);
                self.show_loaded();
                LoadOutcome::Applied
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to load cars");
                self.phase = LoadPhase::Error;
                self.renderer.render_error(&e);
                LoadOutcome::Failed
            }
        }
    }

    fn show_loaded(&mut self) {
        let bar = self.pagination();
        match self.loaded.as_ref() {
            Some(page) if !page.data.is_empty() => {
                self.renderer.render_cars(page, self.view);
            }
            _ => self.renderer.render_empty(),
        }
        self.renderer.render_pagination(bar.as_ref());
    }

    /// Fetches the current page. A page that disappeared since it was
    /// chosen (for example after the filters shrank the result) is reloaded
    /// once as the last existing page.
    pub async fn load_cars(&mut self) -> LoadOutcome {
        match self.fetch_cars().await {
            LoadOutcome::OutOfRange => {}
            outcome => return outcome,
        }
        match self.fetch_cars().await {
            LoadOutcome::OutOfRange => {
                self.phase = LoadPhase::Loaded;
                self.show_loaded();
                LoadOutcome::Applied
            }
            outcome => outcome,
        }
    }

    async fn fetch_cars(&mut self) -> LoadOutcome {
        let (ticket, query) = self.begin_load();
        let result = self.source.cars(&query).await;
        self.complete_load(ticket, result)
    }

    pub async fn retry(&mut self) -> LoadOutcome {
        self.load_cars().await
    }

    /// Statistics are non-critical: failures are logged and nothing is shown.
    pub async fn load_stats(&mut self) -> bool {
        match self.source.stats().await {
            Ok(stats) => {
                self.renderer.render_stats(&stats);
                self.stats = Some(stats);
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to load stats");
                false
            }
        }
    }

    /// `None` when the request was rejected and nothing was fetched.
    pub async fn go_to_page(&mut self, requested: i64) -> Option<LoadOutcome> {
        let next = self.state.go_to_page(requested)?;
        Some(self.adopt_page(next).await)
    }

    pub async fn next_page(&mut self) -> Option<LoadOutcome> {
        let next = self.state.next_page()?;
        Some(self.adopt_page(next).await)
    }

    pub async fn previous_page(&mut self) -> Option<LoadOutcome> {
        let next = self.state.previous_page()?;
        Some(self.adopt_page(next).await)
    }

    async fn adopt_page(&mut self, next: QueryState) -> LoadOutcome {
        self.state = next;
        let outcome = self.load_cars().await;
        self.renderer.scroll_to_content();
        outcome
    }

    pub async fn apply_filters(&mut self, form: &FilterForm) -> LoadOutcome {
        self.state = self.state.apply_filters(form);
        tracing::info!(filters = ?self.state.filters().summary(), "filters applied");
        self.load_cars().await
    }

    pub async fn clear_filters(&mut self) -> LoadOutcome {
        self.state = self.state.clear_filters();
        self.load_cars().await
    }

    pub async fn set_sort(
        &mut self,
        field: Option<&str>,
        direction: Option<SortDirection>,
    ) -> LoadOutcome {
        self.state = self.state.set_sort(field, direction);
        self.load_cars().await
    }

    /// Switches grid/list and redraws the page already loaded, without a fetch.
    pub fn set_view(&mut self, view: ViewMode) {
        self.view = view;
        if self.loaded.is_some() {
            self.show_loaded();
        }
    }

    /// Shows the full record of the `position`-th (1-based) car on the page.
    pub fn show_car(&mut self, position: usize) -> bool {
        let car = self
            .loaded
            .as_ref()
            .and_then(|page| page.data.get(position.checked_sub(1)?))
            .cloned();
        match car {
            Some(car) => {
                self.renderer.render_car_detail(&car);
                true
            }
            None => {
                self.renderer
                    .render_notice(&Notice::danger(format!("No car #{position} on this page")));
                false
            }
        }
    }

    pub async fn show_car_by_id(&mut self, id: &str) -> bool {
        match self.source.car(id).await {
            Ok(car) => {
                self.renderer.render_car_detail(&car);
                true
            }
            Err(e) => {
                tracing::warn!(id, error = %e, "failed to load car");
                self.renderer
                    .render_notice(&Notice::danger(format!("Failed to load car {id}: {e}")));
                false
            }
        }
    }

    /// Kicks off the backend scraper, then reloads cars and stats once the
    /// configured delay has passed.
    pub async fn run_scraper(&mut self, pages: u32) -> bool {
        self.renderer.render_notice(&Notice::info("Starting scraper..."));
        match self.source.run_scraper(pages).await {
            Ok(ack) => {
                self.renderer.render_notice(&Notice::success(ack.message));
                let delay = self.options.scrape_refresh_delay;
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                self.load_cars().await;
                self.load_stats().await;
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to start scraper");
                self.renderer
                    .render_notice(&Notice::danger(format!("Failed to start scraper: {e}")));
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::ParsedInt;
    use crate::tests::fakes::{cars_page, Event, FakeSource, RecordingRenderer};

    fn controller(source: FakeSource) -> Controller<FakeSource, RecordingRenderer> {
        Controller::new(
            source,
            RecordingRenderer::default(),
            ControllerOptions {
                scrape_refresh_delay: Duration::ZERO,
                ..ControllerOptions::default()
            },
        )
    }

    #[tokio::test]
    async fn initial_load_adopts_server_paging() {
        let source = FakeSource::default();
        source.push_cars(Ok(cars_page(1, 10, 3)));
        let mut c = controller(source);
        assert_eq!(c.phase(), LoadPhase::Idle);

        assert_eq!(c.load_cars().await, LoadOutcome::Applied);
        assert_eq!(c.phase(), LoadPhase::Loaded);
        assert_eq!(c.state().total_pages(), 10);
        assert_eq!(
            c.renderer().events,
            vec![
                Event::Loading,
                Event::Cars { count: 3, view: ViewMode::Grid },
                Event::Pagination(Some(vec![1, 2, 3, 4, 5])),
            ]
        );
    }

    #[tokio::test]
    async fn go_to_page_noops_do_not_fetch() {
        let source = FakeSource::default();
        source.push_cars(Ok(cars_page(1, 4, 1)));
        let mut c = controller(source);
        c.load_cars().await;

        assert!(c.go_to_page(1).await.is_none());
        assert!(c.go_to_page(0).await.is_none());
        assert!(c.go_to_page(5).await.is_none());
        assert_eq!(c.source.queries().len(), 1);
    }

    #[tokio::test]
    async fn go_to_page_fetches_and_scrolls() {
        let source = FakeSource::default();
        source.push_cars(Ok(cars_page(1, 4, 1)));
        source.push_cars(Ok(cars_page(3, 4, 1)));
        let mut c = controller(source);
        c.load_cars().await;

        assert_eq!(c.go_to_page(3).await, Some(LoadOutcome::Applied));
        assert_eq!(c.source.queries()[1].page, 3);
        assert_eq!(c.state().page(), 3);
        assert_eq!(c.renderer().events.last(), Some(&Event::Scroll));
    }

    #[tokio::test]
    async fn filters_reset_page_but_clear_and_sort_keep_it() {
        let source = FakeSource::default();
        for page in [1, 2, 1, 1, 1] {
            source.push_cars(Ok(cars_page(page, 5, 2)));
        }
        let mut c = controller(source);
        c.load_cars().await;
        c.go_to_page(2).await;

        let form = FilterForm {
            make: "Toyota".to_string(),
            max_price: "5000".to_string(),
            ..FilterForm::default()
        };
        c.apply_filters(&form).await;
        let q = &c.source.queries()[2];
        assert_eq!(q.page, 1);
        assert_eq!(q.filters.max_price, Some(ParsedInt::Number(5000)));

        c.set_sort(Some("price"), Some(SortDirection::Ascending)).await;
        assert_eq!(c.source.queries()[3].sort.field, "price");

        c.clear_filters().await;
        let q = &c.source.queries()[4];
        assert!(q.filters.is_empty());
        assert_eq!(q.sort.field, "price");
    }

    #[tokio::test]
    async fn vanished_page_is_reloaded_as_last_page() {
        let source = FakeSource::default();
        source.push_cars(Ok(cars_page(1, 5, 2)));
        source.push_cars(Ok(cars_page(5, 5, 2)));
        source.push_cars(Ok(cars_page(5, 2, 0)));
        source.push_cars(Ok(cars_page(2, 2, 2)));
        source.push_cars(Ok(cars_page(1, 2, 2)));
        let mut c = controller(source);
        c.load_cars().await;
        c.go_to_page(5).await;
        c.renderer_mut().events.clear();

        assert_eq!(c.clear_filters().await, LoadOutcome::Applied);
        let queries = c.source.queries();
        assert_eq!(queries[2].page, 5);
        assert_eq!(queries[3].page, 2);
        assert_eq!(c.state().page(), 2);
        assert_eq!(c.state().total_pages(), 2);
        assert_eq!(c.loaded().map(|p| p.page), Some(2));
        assert_eq!(c.phase(), LoadPhase::Loaded);
        assert_eq!(
            c.renderer().events,
            vec![
                Event::Loading,
                Event::Loading,
                Event::Cars { count: 2, view: ViewMode::Grid },
                Event::Pagination(Some(vec![1, 2])),
            ]
        );

        assert_eq!(c.go_to_page(1).await, Some(LoadOutcome::Applied));
        assert_eq!(c.state().page(), 1);
    }

    #[tokio::test]
    async fn failure_enters_error_and_retry_recovers() {
        let source = FakeSource::default();
        source.push_cars(Err(FakeSource::server_error()));
        source.push_cars(Ok(cars_page(1, 1, 2)));
        let mut c = controller(source);

        assert_eq!(c.load_cars().await, LoadOutcome::Failed);
        assert_eq!(c.phase(), LoadPhase::Error);
        assert!(matches!(c.renderer().events.last(), Some(Event::Error(_))));

        assert_eq!(c.retry().await, LoadOutcome::Applied);
        assert_eq!(c.phase(), LoadPhase::Loaded);
        assert_eq!(c.renderer().events.last(), Some(&Event::Pagination(None)));
    }

    #[tokio::test]
    async fn empty_result_shows_empty_panel() {
        let source = FakeSource::default();
        source.push_cars(Ok(cars_page(1, 0, 0)));
        let mut c = controller(source);
        c.load_cars().await;
        assert_eq!(c.state().page(), 1);
        assert!(c.renderer().events.contains(&Event::Empty));
    }

    #[test]
    fn stale_responses_are_discarded() {
        let mut c = controller(FakeSource::default());
        let (first, _) = c.begin_load();
        let (second, _) = c.begin_load();

        assert_eq!(c.complete_load(second, Ok(cars_page(2, 6, 1))), LoadOutcome::Applied);
        assert_eq!(c.complete_load(first, Ok(cars_page(1, 9, 1))), LoadOutcome::Stale);
        assert_eq!(c.state().page(), 2);
        assert_eq!(c.state().total_pages(), 6);
        assert_eq!(c.phase(), LoadPhase::Loaded);
    }

    #[test]
    fn stale_failure_does_not_flip_to_error() {
        let mut c = controller(FakeSource::default());
        let (first, _) = c.begin_load();
        let (second, _) = c.begin_load();
        c.complete_load(second, Ok(cars_page(1, 2, 1)));
        assert_eq!(
            c.complete_load(first, Err(FakeSource::server_error())),
            LoadOutcome::Stale
        );
        assert_eq!(c.phase(), LoadPhase::Loaded);
    }

    #[tokio::test]
    async fn set_view_redraws_without_fetching() {
        let source = FakeSource::default();
        source.push_cars(Ok(cars_page(1, 1, 2)));
        let mut c = controller(source);
        c.load_cars().await;
        c.set_view(ViewMode::List);
        assert_eq!(c.source.queries().len(), 1);
        assert!(c
            .renderer()
            .events
            .contains(&Event::Cars { count: 2, view: ViewMode::List }));
    }

    #[tokio::test]
    async fn stats_failure_is_silent() {
        let source = FakeSource::default();
        source.push_stats(Err(FakeSource::server_error()));
        let mut c = controller(source);
        assert!(!c.load_stats().await);
        assert!(c.renderer().events.is_empty());
    }

    #[tokio::test]
    async fn scraper_success_reloads_cars_and_stats() {
        let source = FakeSource::default();
        source.push_cars(Ok(cars_page(1, 1, 1)));
        source.push_stats(Ok(CarStats::default()));
        let mut c = controller(source);

        assert!(c.run_scraper(3).await);
        assert_eq!(c.source.scrapes(), vec![3]);
        let events = &c.renderer().events;
        assert_eq!(events[0], Event::Notice("Starting scraper...".to_string()));
        assert!(events.contains(&Event::Stats));
        assert_eq!(c.phase(), LoadPhase::Loaded);
    }

    #[tokio::test]
    async fn scraper_failure_is_a_notice() {
        let source = FakeSource::default();
        source.fail_scraper();
        let mut c = controller(source);
        assert!(!c.run_scraper(1).await);
        assert!(matches!(
            c.renderer().events.last(),
            Some(Event::Notice(msg)) if msg.starts_with("Failed to start scraper")
        ));
        assert!(c.source.queries().is_empty());
    }

    #[tokio::test]
    async fn show_car_uses_loaded_page() {
        let source = FakeSource::default();
        source.push_cars(Ok(cars_page(1, 1, 2)));
        let mut c = controller(source);
        c.load_cars().await;
        assert!(c.show_car(2));
        assert!(!c.show_car(3));
        assert!(!c.show_car(0));
    }

    #[tokio::test]
    async fn show_car_by_id_renders_detail_or_notice() {
        let mut c = controller(FakeSource::default());
        assert!(c.show_car_by_id("abc123").await);
        assert_eq!(
            c.renderer().events,
            vec![Event::Detail("abc123".to_string())]
        );

        assert!(!c.show_car_by_id("missing").await);
        match c.renderer().events.last() {
            Some(Event::Notice(message)) => {
                assert!(message.starts_with("Failed to load car missing"));
                assert!(message.contains("404"));
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert!(c.source.queries().is_empty());
        assert_eq!(c.phase(), LoadPhase::Idle);
    }
}

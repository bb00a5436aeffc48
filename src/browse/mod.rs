//! Interactive browsing: one command per input line, each mapped onto a
//! controller operation.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::api::CarSource;
use crate::cli::validation::MAX_SCRAPE_PAGES;
use crate::controller::Controller;
use crate::query::{FilterForm, SortDirection};
use crate::render::{Notice, Renderer, ViewMode};

pub const HELP: &str = "commands: n|next, p|prev, g|page N, f|filter key=value..., c|clear, \
s|sort FIELD [asc|desc], o|order asc|desc, v|view grid|list, d|detail N, car ID, \
r|retry, refresh, stats, scrape [N], h|help, q|quit";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Next,
    Previous,
    Page(i64),
    Filter(Vec<(String, String)>),
    Clear,
    Sort {
        field: Option<String>,
        direction: Option<SortDirection>,
    },
    View(ViewMode),
    Detail(usize),
    Car(String),
    Retry,
    Refresh,
    Stats,
    Scrape(Option<u32>),
    Help,
    Quit,
    Nothing,
}

/// Splits `key=value` pairs; bare words extend the previous value, so
/// `make=Land Rover max_price=9000` keeps the space in the make.
fn parse_assignments(rest: &str) -> Result<Vec<(String, String)>, String> {
    let mut out: Vec<(String, String)> = Vec::new();
    for token in rest.split_whitespace() {
        match token.split_once('=') {
            Some((key, value)) if !key.is_empty() => {
                out.push((key.to_string(), value.to_string()));
            }
            _ => match out.last_mut() {
                Some((_, value)) => {
                    value.push(' ');
                    value.push_str(token);
                }
                None => return Err(format!("expected key=value, got '{token}'")),
            },
        }
    }
    if out.is_empty() {
        return Err("expected at least one key=value".to_string());
    }
    Ok(out)
}

fn parse_number<T: std::str::FromStr>(raw: Option<&str>, what: &str) -> Result<T, String> {
    let raw = raw.ok_or_else(|| format!("missing {what}"))?;
    raw.parse::<T>()
        .map_err(|_| format!("invalid {what} '{raw}'"))
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (line, ""),
        };
        let arg = rest.split_whitespace().next();
        match head.to_lowercase().as_str() {
            "" => Ok(Command::Nothing),
            "n" | "next" => Ok(Command::Next),
            "p" | "prev" | "previous" => Ok(Command::Previous),
            "g" | "page" | "goto" => Ok(Command::Page(parse_number(arg, "page number")?)),
            "f" | "filter" => Ok(Command::Filter(parse_assignments(rest)?)),
            "c" | "clear" => Ok(Command::Clear),
            "s" | "sort" => {
                let mut parts = rest.split_whitespace();
                let field = parts.next().map(str::to_string);
                let direction = match parts.next() {
                    Some(raw) => Some(
                        SortDirection::parse(raw)
                            .ok_or_else(|| format!("invalid sort direction '{raw}'"))?,
                    ),
                    None => None,
                };
                if field.is_none() {
                    return Err("missing sort field".to_string());
                }
                Ok(Command::Sort { field, direction })
            }
            "o" | "order" => {
                let raw = arg.ok_or_else(|| "missing sort direction".to_string())?;
                let direction = SortDirection::parse(raw)
                    .ok_or_else(|| format!("invalid sort direction '{raw}'"))?;
                Ok(Command::Sort {
                    field: None,
                    direction: Some(direction),
                })
            }
            "v" | "view" => {
                let raw = arg.ok_or_else(|| "missing view (grid or list)".to_string())?;
                ViewMode::parse(raw)
                    .map(Command::View)
                    .ok_or_else(|| format!("invalid view '{raw}'"))
            }
            "d" | "detail" | "details" => Ok(Command::Detail(parse_number(arg, "car number")?)),
            "car" => arg
                .map(|id| Command::Car(id.to_string()))
                .ok_or_else(|| "missing car id".to_string()),
            "r" | "retry" => Ok(Command::Retry),
            "refresh" => Ok(Command::Refresh),
            "stats" => Ok(Command::Stats),
            "scrape" => match arg {
                Some(_) => {
                    let pages: u32 = parse_number(arg, "page count")?;
                    if !(1..=MAX_SCRAPE_PAGES).contains(&pages) {
                        return Err(format!(
                            "invalid page count {pages}, expected 1-{MAX_SCRAPE_PAGES}"
                        ));
                    }
                    Ok(Command::Scrape(Some(pages)))
                }
                None => Ok(Command::Scrape(None)),
            },
            "h" | "help" | "?" => Ok(Command::Help),
            "q" | "quit" | "exit" => Ok(Command::Quit),
            other => Err(format!("unknown command '{other}'")),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Browsing session state that outlives single commands: the filter form
/// keeps its contents between `filter` commands the way a page form does.
#[derive(Clone, Debug)]
pub struct Session {
    form: FilterForm,
    scrape_pages: u32,
}

impl Session {
    pub fn new(form: FilterForm, scrape_pages: u32) -> Self {
        Self { form, scrape_pages }
    }

    pub fn form(&self) -> &FilterForm {
        &self.form
    }

    pub async fn execute<S: CarSource, R: Renderer>(
        &mut self,
        controller: &mut Controller<S, R>,
        command: Command,
    ) -> Flow {
        match command {
            Command::Nothing => {}
            Command::Next => {
                controller.next_page().await;
            }
            Command::Previous => {
                controller.previous_page().await;
            }
            Command::Page(n) => {
                if controller.go_to_page(n).await.is_none() {
                    tracing::debug!(requested = n, "page request ignored");
                }
            }
            Command::Filter(assignments) => {
                let mut form = self.form.clone();
                for (key, value) in assignments.iter() {
                    if !form.set(key, value) {
                        controller
                            .renderer_mut()
                            .render_notice(&Notice::danger(format!("unknown filter '{key}'")));
                        return Flow::Continue;
                    }
                }
                self.form = form;
                controller.apply_filters(&self.form).await;
            }
            Command::Clear => {
                self.form = FilterForm::default();
                controller.clear_filters().await;
            }
            Command::Sort { field, direction } => {
                controller.set_sort(field.as_deref(), direction).await;
            }
            Command::View(view) => controller.set_view(view),
            Command::Detail(n) => {
                controller.show_car(n);
            }
            Command::Car(id) => {
                controller.show_car_by_id(&id).await;
            }
            Command::Retry => {
                controller.retry().await;
            }
            Command::Refresh => {
                controller.load_cars().await;
            }
            Command::Stats => {
                controller.load_stats().await;
            }
            Command::Scrape(pages) => {
                controller
                    .run_scraper(pages.unwrap_or(self.scrape_pages))
                    .await;
            }
            Command::Help => controller.renderer_mut().render_notice(&Notice::info(HELP)),
            Command::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    /// Reads commands until `quit` or end of input.
    pub async fn run<S, R, In>(
        &mut self,
        controller: &mut Controller<S, R>,
        input: In,
    ) -> std::io::Result<()>
    where
        S: CarSource,
        R: Renderer,
        In: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            let command = match Command::parse(&line) {
                Ok(command) => command,
                Err(e) => {
                    controller
                        .renderer_mut()
                        .render_notice(&Notice::danger(format!("{e} (type 'help')")));
                    continue;
                }
            };
            if self.execute(controller, command).await == Flow::Quit {
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::ControllerOptions;
    use crate::query::ParsedInt;
    use crate::tests::fakes::{cars_page, Event, FakeSource, RecordingRenderer};
    use std::time::Duration;

    #[test]
    fn parses_navigation() {
        assert_eq!(Command::parse("n").unwrap(), Command::Next);
        assert_eq!(Command::parse("  prev ").unwrap(), Command::Previous);
        assert_eq!(Command::parse("g 7").unwrap(), Command::Page(7));
        assert_eq!(Command::parse("page -1").unwrap(), Command::Page(-1));
        assert_eq!(Command::parse("").unwrap(), Command::Nothing);
        assert!(Command::parse("g seven").is_err());
        assert!(Command::parse("fly").is_err());
    }

    #[test]
    fn parses_filters_with_spaces() {
        assert_eq!(
            Command::parse("f make=Land Rover max_price=9000").unwrap(),
            Command::Filter(vec![
                ("make".to_string(), "Land Rover".to_string()),
                ("max_price".to_string(), "9000".to_string()),
            ])
        );
        assert!(Command::parse("filter Toyota").is_err());
        assert!(Command::parse("filter").is_err());
    }

    #[test]
    fn parses_sort_and_view() {
        assert_eq!(
            Command::parse("s price asc").unwrap(),
            Command::Sort {
                field: Some("price".to_string()),
                direction: Some(SortDirection::Ascending)
            }
        );
        assert_eq!(
            Command::parse("order -1").unwrap(),
            Command::Sort {
                field: None,
                direction: Some(SortDirection::Descending)
            }
        );
        assert!(Command::parse("s").is_err());
        assert_eq!(Command::parse("v list").unwrap(), Command::View(ViewMode::List));
        assert_eq!(Command::parse("scrape").unwrap(), Command::Scrape(None));
        assert_eq!(Command::parse("scrape 2").unwrap(), Command::Scrape(Some(2)));
        assert_eq!(Command::parse("scrape 10").unwrap(), Command::Scrape(Some(10)));
    }

    #[test]
    fn scrape_page_count_is_bounded() {
        assert!(Command::parse("scrape 0").is_err());
        assert!(Command::parse("scrape 11").is_err());
        assert!(Command::parse("scrape 50").is_err());
        assert!(Command::parse("scrape -1").is_err());
    }

    #[tokio::test]
    async fn rejected_filter_command_leaves_form_untouched() {
        let source = FakeSource::default();
        source.push_cars(Ok(cars_page(1, 1, 1)));
        let mut controller = Controller::new(
            source,
            RecordingRenderer::default(),
            ControllerOptions::default(),
        );
        let mut session = Session::new(FilterForm::default(), 3);
        let input = b"f make=Toyota colour=red\nf max_price=5000\n".as_slice();
        session.run(&mut controller, input).await.unwrap();

        assert_eq!(session.form().make, "");
        let filters = controller.state().filters().clone();
        assert_eq!(filters.make, None);
        assert_eq!(filters.max_price, Some(ParsedInt::Number(5000)));
    }

    #[tokio::test]
    async fn session_keeps_form_between_filter_commands() {
        let source = FakeSource::default();
        for _ in 0..3 {
            source.push_cars(Ok(cars_page(1, 3, 2)));
        }
        let mut controller = Controller::new(
            source,
            RecordingRenderer::default(),
            ControllerOptions {
                scrape_refresh_delay: Duration::ZERO,
                ..ControllerOptions::default()
            },
        );
        let mut session = Session::new(FilterForm::default(), 3);
        let input = b"f make=Toyota\nf max_price=5000\nbogus\nq\nn\n".as_slice();
        session.run(&mut controller, input).await.unwrap();

        let filters = controller.state().filters().clone();
        assert_eq!(filters.make.as_deref(), Some("Toyota"));
        assert_eq!(filters.max_price, Some(ParsedInt::Number(5000)));
        assert!(controller
            .renderer()
            .events
            .iter()
            .any(|e| matches!(e, Event::Notice(m) if m.contains("unknown command 'bogus'"))));
        assert_eq!(controller.state().page(), 1);
    }

    #[tokio::test]
    async fn unknown_filter_key_is_reported_without_fetching() {
        let mut controller = Controller::new(
            FakeSource::default(),
            RecordingRenderer::default(),
            ControllerOptions::default(),
        );
        let mut session = Session::new(FilterForm::default(), 3);
        let flow = session
            .execute(
                &mut controller,
                Command::Filter(vec![("colour".to_string(), "red".to_string())]),
            )
            .await;
        assert_eq!(flow, Flow::Continue);
        assert_eq!(
            controller.renderer().events,
            vec![Event::Notice("unknown filter 'colour'".to_string())]
        );
    }

    #[tokio::test]
    async fn clear_resets_form() {
        let source = FakeSource::default();
        source.push_cars(Ok(cars_page(1, 1, 1)));
        let mut controller = Controller::new(
            source,
            RecordingRenderer::default(),
            ControllerOptions::default(),
        );
        let form = FilterForm {
            make: "Opel".to_string(),
            ..FilterForm::default()
        };
        let mut session = Session::new(form, 3);
        session.execute(&mut controller, Command::Clear).await;
        assert_eq!(session.form(), &FilterForm::default());
    }
}

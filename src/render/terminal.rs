use std::io::Write;

use colored::Colorize;

use super::format::{format_date, format_decimal, format_engine, format_number};
use super::{Notice, NoticeKind, Renderer, ViewMode};
use crate::api::{ApiError, Car, CarStats, CarsPage};
use crate::pagination::PaginationBar;

const CARD_WIDTH: usize = 30;
const CARDS_PER_ROW: usize = 3;
const NO_PHOTO: &str = "(no photo)";

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut out: String = value.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn card_lines(index: usize, car: &Car) -> Vec<String> {
    let w = CARD_WIDTH;
    vec![
        format!("{:<w$}", truncate(&format!("#{} {}", index + 1, car.title()), w)),
        format!("{:<w$}", format!("{} · ${}", car.year, format_number(car.price))),
        format!("{:<w$}", truncate(&format!("{} km", format_number(car.mileage)), w)),
        format!(
            "{:<w$}",
            truncate(&format_engine(&car.engine_type, car.engine_volume), w)
        ),
        format!("{:<w$}", truncate(&car.transmission, w)),
        format!("{:<w$}", truncate(&car.location, w)),
    ]
}

/// Writes plain-text views to any sink, stdout by default.
pub struct TerminalRenderer<W: Write> {
    out: W,
}

impl TerminalRenderer<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, text: &str) {
        if let Err(e) = self
            .out
            .write_all(text.as_bytes())
            .and_then(|_| self.out.flush())
        {
            tracing::warn!(error = %e, "failed to write to terminal");
        }
    }

    fn grid_text(cars: &[Car]) -> String {
        let mut out = String::new();
        let cards: Vec<Vec<String>> = cars
            .iter()
            .enumerate()
            .map(|(i, car)| card_lines(i, car))
            .collect();
        for row in cards.chunks(CARDS_PER_ROW) {
            let height = row.iter().map(|c| c.len()).max().unwrap_or(0);
            for line in 0..height {
                let cells: Vec<String> = row
                    .iter()
                    .map(|card| {
                        let cell = card.get(line).cloned().unwrap_or_default();
                        if line == 0 {
                            cell.bold().to_string()
                        } else {
                            cell
                        }
                    })
                    .collect();
                out.push_str("  ");
                out.push_str(cells.join("  │  ").trim_end());
                out.push('\n');
            }
            out.push('\n');
        }
        out
    }

    fn list_text(cars: &[Car]) -> String {
        let mut out = String::new();
        for (i, car) in cars.iter().enumerate() {
            out.push_str(&format!(
                "{:>3}. {} ({})  {}\n",
                i + 1,
                car.title().bold(),
                car.year,
                format!("${}", format_number(car.price)).green()
            ));
            out.push_str(&format!(
                "     {} km · {} · {} · {}\n",
                format_number(car.mileage),
                format_engine(&car.engine_type, car.engine_volume),
                car.transmission,
                car.location
            ));
            if !car.url.is_empty() {
                out.push_str(&format!("     {}\n", car.url.dimmed()));
            }
        }
        out
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn render_loading(&mut self) {
        self.emit(&format!("{}\n", ":: Loading data...".dimmed()));
    }

    fn render_cars(&mut self, page: &CarsPage, view: ViewMode) {
        let mut text = format!(
            "\n{} {}\n\n",
            ":: Found:".bold(),
            format_number(page.total as i64)
        );
        let body = match view {
            ViewMode::Grid => Self::grid_text(&page.data),
            ViewMode::List => Self::list_text(&page.data),
        };
        text.push_str(&body);
        self.emit(&text);
    }

    fn render_empty(&mut self) {
        self.emit(&format!(
            "\n{}\n{}\n",
            "[i] No cars found.".cyan(),
            "    Type 'clear' to reset the filters."
        ));
    }

    fn render_pagination(&mut self, bar: Option<&PaginationBar>) {
        let Some(bar) = bar else {
            return;
        };
        let mut parts: Vec<String> = Vec::new();
        parts.push(if bar.has_previous() {
            "«".to_string()
        } else {
            "«".dimmed().to_string()
        });
        for link in &bar.links {
            if link.active {
                parts.push(format!("[{}]", link.page).bold().to_string());
            } else {
                parts.push(link.page.to_string());
            }
        }
        parts.push(if bar.has_next() {
            "»".to_string()
        } else {
            "»".dimmed().to_string()
        });
        self.emit(&format!(
            "  {}   (page {} of {})\n",
            parts.join(" "),
            bar.current_page,
            bar.total_pages
        ));
    }

    fn render_error(&mut self, error: &ApiError) {
        self.emit(&format!(
            "\n{} {}\n    Type 'retry' to try again.\n",
            "[!] Failed to load data:".bold().red(),
            error
        ));
    }

    fn render_stats(&mut self, stats: &CarStats) {
        let mut text = format!(
            "{} cars: {} · avg price: ${} · avg year: {} · avg mileage: {} km\n",
            "::".bold(),
            format_number(stats.total_cars as i64),
            format_decimal(stats.avg_price),
            stats.avg_year.round() as i64,
            format_decimal(stats.avg_mileage)
        );
        if !stats.popular_makes.is_empty() {
            let makes: Vec<String> = stats
                .popular_makes
                .iter()
                .map(|m| format!("{} ({})", m.make.as_deref().unwrap_or("?"), m.count))
                .collect();
            text.push_str(&format!("{} popular: {}\n", "::".bold(), makes.join(", ")));
        }
        self.emit(&text);
    }

    fn render_notice(&mut self, notice: &Notice) {
        let tag = match notice.kind {
            NoticeKind::Info => "INF".bold().cyan(),
            NoticeKind::Success => "OK".bold().green(),
            NoticeKind::Danger => "ERR".bold().red(),
        };
        self.emit(&format!(
            "{}{}{} {}\n",
            "[".bold().white(),
            tag,
            "]".bold().white(),
            notice.message
        ));
    }

    fn render_car_detail(&mut self, car: &Car) {
        let mut text = format!(
            "\n{} ({})\n{}\n",
            car.title().bold(),
            car.year,
            format!("${}", format_number(car.price)).green().bold()
        );
        let mut row = |label: &str, value: String| {
            text.push_str(&format!("  {:<13} {}\n", format!("{label}:"), value));
        };
        row("Mileage", format!("{} km", format_number(car.mileage)));
        row("Engine", format_engine(&car.engine_type, car.engine_volume));
        row("Transmission", car.transmission.clone());
        row("Location", car.location.clone());
        row(
            "Added",
            car.created_at
                .as_ref()
                .map(format_date)
                .unwrap_or_else(|| "-".to_string()),
        );
        row(
            "Photo",
            car.image_url
                .clone()
                .filter(|u| !u.is_empty())
                .unwrap_or_else(|| NO_PHOTO.to_string()),
        );
        row("Listing", car.url.clone());
        self.emit(&text);
    }

    fn scroll_to_content(&mut self) {
        self.emit("\n");
    }
}

//! Presentation seam. The controller only talks to [`Renderer`].

pub mod format;
mod terminal;

use serde::Serialize;

use crate::api::{ApiError, Car, CarStats, CarsPage};
use crate::pagination::PaginationBar;

pub use terminal::TerminalRenderer;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

impl ViewMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "grid" | "g" | "cards" => Some(Self::Grid),
            "list" | "l" | "rows" => Some(Self::List),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ViewMode::Grid => "grid",
            ViewMode::List => "list",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Danger,
}

/// Transient, dismissible message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Danger,
            message: message.into(),
        }
    }
}

pub trait Renderer {
    fn render_loading(&mut self);

    fn render_cars(&mut self, page: &CarsPage, view: ViewMode);

    /// Shown instead of cars when the result set is empty.
    fn render_empty(&mut self);

    /// `None` clears the navigation bar.
    fn render_pagination(&mut self, bar: Option<&PaginationBar>);

    /// Inline error panel with a retry affordance.
    fn render_error(&mut self, error: &ApiError);

    fn render_stats(&mut self, stats: &CarStats);

    fn render_notice(&mut self, notice: &Notice);

    fn render_car_detail(&mut self, car: &Car);

    fn scroll_to_content(&mut self) {}
}

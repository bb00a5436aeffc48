//! Query state driving the next cars fetch: page, filters and sort order.
//!
//! Every transition takes `&self` and hands back a fresh [`QueryState`];
//! the controller decides whether to adopt it and refetch.

use std::fmt;

use serde::Serialize;

pub const DEFAULT_SORT_FIELD: &str = "created_at";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// Wire value used by the backend (`1` or `-1`).
    pub fn as_i8(self) -> i8 {
        match self {
            SortDirection::Ascending => 1,
            SortDirection::Descending => -1,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "1" | "asc" | "ascending" | "up" => Some(Self::Ascending),
            "-1" | "desc" | "descending" | "down" => Some(Self::Descending),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SortOrder {
    pub field: String,
    pub direction: SortDirection,
}

impl Default for SortOrder {
    fn default() -> Self {
        Self {
            field: DEFAULT_SORT_FIELD.to_string(),
            direction: SortDirection::Descending,
        }
    }
}

/// Integer parsed from free-form input.
///
/// Parsing takes an optional sign and the leading run of digits, so
/// `"12abc"` yields 12. Input without leading digits is kept as
/// `NotANumber` and never sent to the backend. Digit runs beyond `i64`
/// saturate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParsedInt {
    Number(i64),
    NotANumber(String),
}

impl ParsedInt {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let (negative, rest) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
        if digits.is_empty() {
            return ParsedInt::NotANumber(trimmed.to_string());
        }
        let magnitude = digits.parse::<i64>().unwrap_or(i64::MAX);
        if negative {
            ParsedInt::Number(-magnitude)
        } else {
            ParsedInt::Number(magnitude)
        }
    }

    pub fn value(&self) -> Option<i64> {
        match self {
            ParsedInt::Number(n) => Some(*n),
            ParsedInt::NotANumber(_) => None,
        }
    }
}

impl fmt::Display for ParsedInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParsedInt::Number(n) => write!(f, "{n}"),
            ParsedInt::NotANumber(_) => f.write_str("NaN"),
        }
    }
}

/// Active filters. Absent keys are `None`, never empty strings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CarFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<ParsedInt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<ParsedInt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_year: Option<ParsedInt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_year: Option<ParsedInt>,
}

impl CarFilters {
    pub fn is_empty(&self) -> bool {
        self.make.is_none()
            && self.min_price.is_none()
            && self.max_price.is_none()
            && self.min_year.is_none()
            && self.max_year.is_none()
    }

    /// Query pairs for the backend, skipping zeros and values that failed to
    /// parse.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut out: Vec<(&'static str, String)> = Vec::new();
        if let Some(make) = self.make.as_ref() {
            out.push(("make", make.clone()));
        }
        let numeric = [
            ("min_price", &self.min_price),
            ("max_price", &self.max_price),
            ("min_year", &self.min_year),
            ("max_year", &self.max_year),
        ];
        for (key, value) in numeric {
            match value {
                Some(ParsedInt::Number(0)) => {
                    tracing::debug!(filter = key, "zero filter left out of query");
                }
                Some(ParsedInt::Number(n)) => out.push((key, n.to_string())),
                Some(ParsedInt::NotANumber(raw)) => {
                    tracing::warn!(filter = key, value = %raw, "dropping non-numeric filter");
                }
                None => {}
            }
        }
        out
    }

    pub fn summary(&self) -> Option<String> {
        let mut parts: Vec<String> = Vec::new();
        if let Some(make) = self.make.as_ref() {
            parts.push(format!("make={make}"));
        }
        if let Some(v) = self.min_price.as_ref() {
            parts.push(format!("min_price={v}"));
        }
        if let Some(v) = self.max_price.as_ref() {
            parts.push(format!("max_price={v}"));
        }
        if let Some(v) = self.min_year.as_ref() {
            parts.push(format!("min_year={v}"));
        }
        if let Some(v) = self.max_year.as_ref() {
            parts.push(format!("max_year={v}"));
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

/// Raw filter input as typed by the user; empty strings mean "absent".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterForm {
    pub make: String,
    pub min_price: String,
    pub max_price: String,
    pub min_year: String,
    pub max_year: String,
}

impl FilterForm {
    /// Sets a field by its form or wire name. Returns false for unknown keys.
    pub fn set(&mut self, key: &str, value: &str) -> bool {
        let slot = match key.trim().to_lowercase().replace('-', "_").as_str() {
            "make" => &mut self.make,
            "min_price" | "minprice" => &mut self.min_price,
            "max_price" | "maxprice" => &mut self.max_price,
            "min_year" | "minyear" => &mut self.min_year,
            "max_year" | "maxyear" => &mut self.max_year,
            _ => return false,
        };
        *slot = value.to_string();
        true
    }

    pub fn to_filters(&self) -> CarFilters {
        fn text(raw: &str) -> Option<String> {
            let trimmed = raw.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        fn number(raw: &str) -> Option<ParsedInt> {
            text(raw).map(|v| ParsedInt::parse(&v))
        }
        CarFilters {
            make: text(&self.make),
            min_price: number(&self.min_price),
            max_price: number(&self.max_price),
            min_year: number(&self.min_year),
            max_year: number(&self.max_year),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QueryState {
    page: u32,
    total_pages: u32,
    filters: CarFilters,
    sort: SortOrder,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            page: 1,
            total_pages: 0,
            filters: CarFilters::default(),
            sort: SortOrder::default(),
        }
    }
}

impl QueryState {
    pub fn new(filters: CarFilters, sort: SortOrder) -> Self {
        Self {
            filters,
            sort,
            ..Self::default()
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn filters(&self) -> &CarFilters {
        &self.filters
    }

    pub fn sort(&self) -> &SortOrder {
        &self.sort
    }

    /// Requests page `requested`. `None` means no-op: the page is already
    /// current or lies outside `[1, total_pages]`.
    pub fn go_to_page(&self, requested: i64) -> Option<QueryState> {
        if requested == i64::from(self.page)
            || requested < 1
            || requested > i64::from(self.total_pages)
        {
            return None;
        }
        Some(QueryState {
            page: requested as u32,
            ..self.clone()
        })
    }

    pub fn next_page(&self) -> Option<QueryState> {
        self.go_to_page(i64::from(self.page) + 1)
    }

    pub fn previous_page(&self) -> Option<QueryState> {
        self.go_to_page(i64::from(self.page) - 1)
    }

    /// Replaces the filters with the parsed form and returns to page 1.
    pub fn apply_filters(&self, form: &FilterForm) -> QueryState {
        QueryState {
            page: 1,
            filters: form.to_filters(),
            ..self.clone()
        }
    }

    /// Drops every filter. The current page is left as is.
    pub fn clear_filters(&self) -> QueryState {
        QueryState {
            filters: CarFilters::default(),
            ..self.clone()
        }
    }

    /// Updates whichever sort parts are given. The current page is kept.
    pub fn set_sort(&self, field: Option<&str>, direction: Option<SortDirection>) -> QueryState {
        let mut sort = self.sort.clone();
        if let Some(field) = field.map(str::trim).filter(|f| !f.is_empty()) {
            sort.field = field.to_string();
        }
        if let Some(direction) = direction {
            sort.direction = direction;
        }
        QueryState {
            sort,
            ..self.clone()
        }
    }

    /// Adopts paging info reported by the backend, keeping `page` within
    /// `[1, total_pages]` (or at 1 for an empty result).
    pub fn with_page_info(&self, page: u32, total_pages: u32) -> QueryState {
        let page = if total_pages == 0 {
            1
        } else {
            page.clamp(1, total_pages)
        };
        QueryState {
            page,
            total_pages,
            ..self.clone()
        }
    }
}

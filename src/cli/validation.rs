use crate::api::MAX_LIMIT;
use crate::cli::args::CliArgs;
use crate::query::SortDirection;
use crate::render::ViewMode;

pub const MAX_SCRAPE_PAGES: u32 = 10;

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if let Some(limit) = args.limit {
        if limit == 0 || limit > MAX_LIMIT {
            return Err(format!("invalid --limit {limit}, expected 1-{MAX_LIMIT}"));
        }
    }
    if let Some(n) = args.max_visible_pages {
        if n == 0 {
            return Err("invalid --max-visible-pages, expected positive integer".to_string());
        }
    }
    if let Some(pages) = args.scrape {
        // 0 stands for "flag given without a value"
        if pages > MAX_SCRAPE_PAGES {
            return Err(format!(
                "invalid --scrape {pages}, expected 1-{MAX_SCRAPE_PAGES}"
            ));
        }
    }
    if let Some(raw) = args.sort_order.as_deref() {
        SortDirection::parse(raw)
            .ok_or_else(|| format!("invalid --sort-order '{raw}', expected asc or desc"))?;
    }
    if let Some(raw) = args.view.as_deref() {
        ViewMode::parse(raw)
            .ok_or_else(|| format!("invalid --view '{raw}', expected grid or list"))?;
    }
    if let Some(timeout) = args.timeout {
        if timeout == 0 {
            return Err("invalid --timeout, expected positive integer".to_string());
        }
    }
    if let Some(header) = args.header.as_deref() {
        if !header.contains(':') {
            return Err(format!("invalid --header '{header}', expected 'Name: value'"));
        }
    }
    if args.stats && args.no_stats {
        return Err("use either --stats or --no-stats, not both".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(argv: &[&str]) -> CliArgs {
        let mut full = vec!["carview"];
        full.extend_from_slice(argv);
        CliArgs::parse_from(full)
    }

    #[test]
    fn accepts_defaults() {
        assert!(validate(&parse(&[])).is_ok());
    }

    #[test]
    fn rejects_out_of_range_limit() {
        assert!(validate(&parse(&["--limit", "0"])).is_err());
        assert!(validate(&parse(&["--limit", "101"])).is_err());
        assert!(validate(&parse(&["--limit", "100"])).is_ok());
    }

    #[test]
    fn rejects_bad_sort_and_view() {
        assert!(validate(&parse(&["--sort-order", "up-ish"])).is_err());
        assert!(validate(&parse(&["--sort-order", "-1"])).is_ok());
        assert!(validate(&parse(&["--view", "table"])).is_err());
    }

    #[test]
    fn scrape_pages_are_bounded() {
        assert!(validate(&parse(&["--scrape"])).is_ok());
        assert!(validate(&parse(&["--scrape", "10"])).is_ok());
        assert!(validate(&parse(&["--scrape", "11"])).is_err());
    }

    #[test]
    fn conflicting_stats_flags() {
        assert!(validate(&parse(&["--stats", "--no-stats"])).is_err());
    }
}

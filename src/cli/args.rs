use clap::{ArgAction, Parser};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "carview",
    version,
    about = "terminal client for a car-listing REST service",
    long_about = "carview browses the cars collected by the listing backend: paginated, filtered and sorted listings, aggregate statistics, and on-demand scraper runs.\n\nExamples:\n  carview -u http://localhost:8000\n  carview --make Toyota --max-price 5000 --view list\n  carview -i --sort-by price --sort-order asc\n  carview --scrape 3\n\nTip: Use --config to persist settings and keep invocations short."
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        help_heading = "Output",
        help = "Increase log verbosity (-v, -vv, -vvv). RUST_LOG takes precedence."
    )]
    pub verbose: u8,

    #[arg(
        short = 'c',
        long = "color",
        help_heading = "Output",
        help = "Enable colored output (overrides --no-color)."
    )]
    pub color: bool,

    #[arg(long = "no-color", help_heading = "Output", help = "Disable colored output.")]
    pub no_color: bool,

    #[arg(
        long = "view",
        value_name = "MODE",
        help_heading = "Output",
        help = "Listing layout: grid or list."
    )]
    pub view: Option<String>,

    #[arg(
        short = 'o',
        long = "output",
        value_name = "FILE",
        help_heading = "Output",
        help = "Export the loaded page to a file."
    )]
    pub output: Option<String>,

    #[arg(
        long = "output-format",
        visible_alias = "of",
        value_name = "FORMAT",
        help_heading = "Output",
        help = "Export format: text, json or xml (inferred from the file extension when omitted)."
    )]
    pub output_format: Option<String>,

    #[arg(
        short = 'u',
        long = "url",
        visible_alias = "base-url",
        value_name = "URL",
        help_heading = "Backend",
        help = "Base URL of the listing API (default http://localhost:8000)."
    )]
    pub url: Option<String>,

    #[arg(
        short = 'C',
        long = "config",
        value_name = "FILE",
        help_heading = "Backend",
        help = "Path to config file (defaults to ~/.carview/config.yml)."
    )]
    pub config: Option<String>,

    #[arg(
        long = "init-config",
        help_heading = "Backend",
        help = "Write a commented default config file if none exists, then exit."
    )]
    pub init_config: bool,

    #[arg(
        long = "timeout",
        value_name = "SECONDS",
        help_heading = "Backend",
        help = "Request timeout in seconds."
    )]
    pub timeout: Option<u64>,

    #[arg(
        long = "proxy",
        value_name = "URL",
        help_heading = "Backend",
        help = "Send requests through this proxy."
    )]
    pub proxy: Option<String>,

    #[arg(
        short = 'H',
        long = "header",
        value_name = "HEADER",
        help_heading = "Backend",
        help = "Extra request header, e.g. \"Authorization: Bearer x\"."
    )]
    pub header: Option<String>,

    #[arg(
        short = 'l',
        long = "limit",
        visible_alias = "page-size",
        value_name = "N",
        help_heading = "Listing",
        help = "Cars per page (1-100)."
    )]
    pub limit: Option<u32>,

    #[arg(
        long = "max-visible-pages",
        value_name = "N",
        help_heading = "Listing",
        help = "Page links shown in the navigation bar."
    )]
    pub max_visible_pages: Option<u32>,

    #[arg(
        short = 's',
        long = "sort-by",
        value_name = "FIELD",
        help_heading = "Listing",
        help = "Sort field (default created_at)."
    )]
    pub sort_by: Option<String>,

    #[arg(
        long = "sort-order",
        value_name = "ORDER",
        allow_hyphen_values = true,
        help_heading = "Listing",
        help = "Sort order: asc, desc, 1 or -1 (default desc)."
    )]
    pub sort_order: Option<String>,

    #[arg(long = "make", value_name = "MAKE", help_heading = "Filters", help = "Filter by make.")]
    pub make: Option<String>,

    #[arg(
        long = "min-price",
        value_name = "USD",
        allow_hyphen_values = true,
        help_heading = "Filters",
        help = "Minimum price."
    )]
    pub min_price: Option<String>,

    #[arg(
        long = "max-price",
        value_name = "USD",
        allow_hyphen_values = true,
        help_heading = "Filters",
        help = "Maximum price."
    )]
    pub max_price: Option<String>,

    #[arg(
        long = "min-year",
        value_name = "YEAR",
        allow_hyphen_values = true,
        help_heading = "Filters",
        help = "Minimum model year."
    )]
    pub min_year: Option<String>,

    #[arg(
        long = "max-year",
        value_name = "YEAR",
        allow_hyphen_values = true,
        help_heading = "Filters",
        help = "Maximum model year."
    )]
    pub max_year: Option<String>,

    #[arg(
        short = 'i',
        long = "interactive",
        help_heading = "Actions",
        help = "Keep reading browse commands from stdin after the first page."
    )]
    pub interactive: bool,

    #[arg(
        long = "stats",
        help_heading = "Actions",
        help = "Only show aggregate statistics."
    )]
    pub stats: bool,

    #[arg(
        long = "no-stats",
        help_heading = "Actions",
        help = "Skip the statistics summary."
    )]
    pub no_stats: bool,

    #[arg(
        long = "scrape",
        value_name = "PAGES",
        num_args = 0..=1,
        default_missing_value = "0",
        help_heading = "Actions",
        help = "Start the backend scraper (1-10 pages, default from config or 3)."
    )]
    pub scrape: Option<u32>,

    #[arg(
        long = "scrape-refresh-delay",
        value_name = "SECONDS",
        help_heading = "Actions",
        help = "Seconds to wait after starting the scraper before reloading."
    )]
    pub scrape_refresh_delay: Option<u64>,

    #[arg(
        long = "car",
        value_name = "ID",
        help_heading = "Actions",
        help = "Show a single car by id."
    )]
    pub car: Option<String>,
}

use std::time::Duration;

use clap::{error::ErrorKind, CommandFactory, Parser};
use colored::Colorize;
use tokio::io::{stdin, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::browse::Session;
use crate::cli::args::CliArgs;
use crate::cli::validation;
use crate::config::{self, ConfigFile};
use crate::controller::{LoadOutcome, DEFAULT_SCRAPE_PAGES};
use crate::output::{self, OutputFormat};
use crate::query::{FilterForm, SortDirection, SortOrder, DEFAULT_SORT_FIELD};
use crate::render::{TerminalRenderer, ViewMode};
use crate::runner::{Options, Runner};

fn print_banner() {
    const BANNER: &str = r#"
                        _
   ___ __ _ _ ____   _(_) _____      __
  / __/ _` | '__\ \ / / |/ _ \ \ /\ / /
 | (_| (_| | |   \ V /| |  __/\ V  V /
  \___\__,_|_|    \_/ |_|\___| \_/\_/
"#;
    print!("{}", BANNER);
    println!("       v{} - car listing browser", env!("CARGO_PKG_VERSION"));
    println!();
}

fn format_kv_line(label: &str, value: &str) {
    println!(":: {:<10}: {}", label, value);
}

fn render_custom_help() -> String {
    let cmd = CliArgs::command();
    let mut out = String::new();

    out.push_str(cmd.get_name());
    if let Some(version) = cmd.get_version() {
        out.push(' ');
        out.push_str(version);
    }
    out.push('\n');
    if let Some(long_about) = cmd.get_long_about().or(cmd.get_about()) {
        out.push_str(&long_about.to_string());
        out.push('\n');
    }
    out.push_str(&format!("\nUsage: {} [OPTIONS]\n", cmd.get_name()));

    let mut current_heading: Option<String> = None;
    for arg in cmd.get_arguments().filter(|a| !a.is_hide_set()) {
        let heading = arg.get_help_heading().unwrap_or("Options").to_string();
        if current_heading.as_deref() != Some(heading.as_str()) {
            out.push_str(&format!("\n{heading}:\n"));
            current_heading = Some(heading);
        }

        let mut names: Vec<String> = Vec::new();
        if let Some(short) = arg.get_short() {
            names.push(format!("-{short}"));
        }
        if let Some(long) = arg.get_long() {
            names.push(format!("--{long}"));
        }
        for alias in arg.get_visible_aliases().unwrap_or_default() {
            names.push(format!("--{alias}"));
        }
        let mut flags = names.join(", ");
        if arg.get_action().takes_values() {
            let value_name = arg
                .get_value_names()
                .and_then(|names| names.first())
                .map(|name| name.as_str())
                .unwrap_or("VALUE");
            let optional = arg.get_num_args().map(|r| r.min_values() == 0).unwrap_or(false);
            if optional {
                flags.push_str(&format!(" [<{value_name}>]"));
            } else {
                flags.push_str(&format!(" <{value_name}>"));
            }
        }
        out.push_str(&format!("  {flags}\n"));
        if let Some(help) = arg.get_help() {
            out.push_str(&format!("          {}\n", help.to_string().trim()));
        }
    }
    out
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("carview={level}")));
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init();
}

#[derive(Clone, Debug)]
struct RunConfig {
    options: Options,
    output: Option<String>,
    output_format: OutputFormat,
    color: Option<bool>,
    interactive: bool,
    stats_only: bool,
    show_stats: bool,
    scrape: Option<u32>,
    car: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let color = if args.color {
        Some(true)
    } else if args.no_color || cfg.no_color.unwrap_or(false) {
        Some(false)
    } else {
        None
    };

    let defaults = Options::default();
    let base_url = non_empty(args.url.or(cfg.base_url))
        .map(|u| u.trim().to_string())
        .unwrap_or(defaults.base_url);
    let timeout_seconds = args.timeout.or(cfg.timeout).unwrap_or(defaults.timeout_seconds);
    let page_size = args.limit.or(cfg.limit).unwrap_or(defaults.page_size);
    let max_visible_pages = args
        .max_visible_pages
        .or(cfg.max_visible_pages)
        .unwrap_or(defaults.max_visible_pages);

    let sort_field = non_empty(args.sort_by.or(cfg.sort_by))
        .map(|f| f.trim().to_string())
        .unwrap_or_else(|| DEFAULT_SORT_FIELD.to_string());
    let direction = match args.sort_order.or(cfg.sort_order) {
        Some(raw) => SortDirection::parse(&raw)
            .ok_or_else(|| format!("invalid sort_order '{raw}', expected asc or desc"))?,
        None => SortDirection::Descending,
    };

    let view = match args.view.or(cfg.view) {
        Some(raw) => {
            ViewMode::parse(&raw).ok_or_else(|| format!("invalid view '{raw}', expected grid or list"))?
        }
        None => defaults.view,
    };

    let filters = FilterForm {
        make: args.make.or(cfg.make).unwrap_or_default(),
        min_price: args.min_price.or(cfg.min_price).unwrap_or_default(),
        max_price: args.max_price.or(cfg.max_price).unwrap_or_default(),
        min_year: args.min_year.or(cfg.min_year).unwrap_or_default(),
        max_year: args.max_year.or(cfg.max_year).unwrap_or_default(),
    };

    let scrape_pages = cfg.scrape_pages.unwrap_or(DEFAULT_SCRAPE_PAGES);
    let scrape = args
        .scrape
        .map(|pages| if pages == 0 { scrape_pages } else { pages });
    let scrape_refresh_delay = args
        .scrape_refresh_delay
        .or(cfg.scrape_refresh_delay)
        .map(Duration::from_secs)
        .unwrap_or(defaults.scrape_refresh_delay);

    let output = non_empty(args.output.or(cfg.output)).map(|p| config::expand_tilde_string(&p));
    let output_format = match non_empty(args.output_format.or(cfg.output_format)) {
        Some(raw) => OutputFormat::parse(&raw)
            .ok_or_else(|| format!("invalid output format '{raw}', expected text, json or xml"))?,
        None => output
            .as_deref()
            .and_then(output::infer_format_from_path)
            .unwrap_or(OutputFormat::Text),
    };

    Ok(RunConfig {
        options: Options {
            base_url,
            timeout_seconds,
            proxy: non_empty(args.proxy.or(cfg.proxy)),
            header: non_empty(args.header.or(cfg.header)),
            page_size,
            max_visible_pages,
            sort: SortOrder {
                field: sort_field,
                direction,
            },
            filters,
            view,
            scrape_pages,
            scrape_refresh_delay,
        },
        output,
        output_format,
        color,
        interactive: args.interactive,
        stats_only: args.stats,
        show_stats: !args.no_stats,
        scrape,
        car: non_empty(args.car).map(|id| id.trim().to_string()),
    })
}

async fn run_async(run: RunConfig) -> Result<(), String> {
    if let Some(color) = run.color {
        colored::control::set_override(color);
    }

    let runner = Runner::new(run.options.clone()).map_err(|e| e.to_string())?;

    let options = runner.options();
    print_banner();
    format_kv_line("URL", runner.client().base_url());
    format_kv_line("Limit", &options.page_size.to_string());
    format_kv_line(
        "Sort",
        &format!(
            "{} {}",
            options.sort.field,
            options.sort.direction.label()
        ),
    );
    let filters = runner
        .initial_state()
        .filters()
        .summary()
        .unwrap_or_else(|| "none".to_string());
    format_kv_line("Filters", &filters);
    format_kv_line("View", options.view.label());
    if let Some(path) = run.output.as_deref() {
        format_kv_line("Output", path);
    }
    println!();

    let mut controller = runner.controller(TerminalRenderer::stdout());

    if let Some(id) = run.car.as_deref() {
        if !controller.show_car_by_id(id).await {
            return Err(format!("failed to load car '{id}'"));
        }
        return Ok(());
    }

    if run.stats_only {
        if !controller.load_stats().await {
            return Err("failed to load statistics".to_string());
        }
        return Ok(());
    }

    if let Some(pages) = run.scrape {
        tracing::info!(pages, "starting scraper");
        if !controller.run_scraper(pages).await && !run.interactive {
            return Err("failed to start scraper".to_string());
        }
    } else {
        let outcome = controller.load_cars().await;
        if outcome == LoadOutcome::Failed && !run.interactive {
            return Err("failed to load cars".to_string());
        }
        if run.show_stats {
            controller.load_stats().await;
        }
    }

    if run.interactive {
        println!("{}", ":: type 'help' for commands, 'quit' to exit".dimmed());
        let mut session = Session::new(run.options.filters.clone(), run.options.scrape_pages);
        session
            .run(&mut controller, BufReader::new(stdin()))
            .await
            .map_err(|e| format!("failed to read commands: {e}"))?;
    }

    if let Some(path) = run.output.as_deref() {
        match controller.loaded() {
            Some(page) => {
                let bytes = output::render(page, run.output_format);
                tokio::fs::write(path, bytes)
                    .await
                    .map_err(|e| format!("failed to write output '{path}': {e}"))?;
                tracing::info!(path, cars = page.data.len(), "exported page");
            }
            None => tracing::warn!(path, "nothing loaded, skipping export"),
        }
    }

    Ok(())
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp => {
                print!("{}", render_custom_help());
                return Ok(());
            }
            ErrorKind::DisplayVersion => {
                let cmd = CliArgs::command();
                print!("{}", cmd.render_version());
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    init_logging(args.verbose);

    let user_config_path = args.config.clone().map(|p| config::expand_tilde(&p));
    if args.init_config {
        let path = user_config_path
            .or_else(config::default_config_path)
            .ok_or_else(|| "cannot determine home directory for config".to_string())?;
        config::ensure_default_config_file(&path)?;
        println!(":: config file at {}", path.display());
        return Ok(());
    }

    let cfg = match user_config_path.as_ref() {
        Some(path) => config::load_config(path, false)?,
        None => match config::default_config_path() {
            Some(path) => config::load_config(&path, true)?,
            None => ConfigFile::default(),
        },
    };

    let run = build_run_config(args, cfg)?;

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_async(run))
}

#[cfg(test)]
mod cli_tests {
    use super::*;
    use crate::query::ParsedInt;

    fn parse(argv: &[&str]) -> CliArgs {
        let mut full = vec!["carview"];
        full.extend_from_slice(argv);
        CliArgs::parse_from(full)
    }

    #[test]
    fn defaults_without_config() {
        let run = build_run_config(parse(&[]), ConfigFile::default()).unwrap();
        assert_eq!(run.options.base_url, "http://localhost:8000");
        assert_eq!(run.options.page_size, 10);
        assert_eq!(run.options.sort, SortOrder::default());
        assert_eq!(run.options.view, ViewMode::Grid);
        assert_eq!(run.output_format, OutputFormat::Text);
        assert!(run.show_stats);
        assert!(run.scrape.is_none());
        assert!(run.color.is_none());
    }

    #[test]
    fn cli_overrides_config() {
        let cfg = config::parse_config(
            "base_url: http://cfg:9000\nlimit: 20\nmake: Kia\nsort_order: asc\nno_color: true\n",
        )
        .unwrap();
        let run = build_run_config(
            parse(&["-u", "http://cli:8000", "--make", "Toyota", "--color"]),
            cfg,
        )
        .unwrap();
        assert_eq!(run.options.base_url, "http://cli:8000");
        assert_eq!(run.options.page_size, 20);
        assert_eq!(run.options.filters.make, "Toyota");
        assert_eq!(run.options.sort.direction, SortDirection::Ascending);
        assert_eq!(run.color, Some(true));
    }

    #[test]
    fn bare_scrape_uses_configured_pages() {
        let cfg = config::parse_config("scrape_pages: 7\n").unwrap();
        let run = build_run_config(parse(&["--scrape"]), cfg).unwrap();
        assert_eq!(run.scrape, Some(7));

        let run = build_run_config(parse(&["--scrape", "2"]), ConfigFile::default()).unwrap();
        assert_eq!(run.scrape, Some(2));
    }

    #[test]
    fn output_format_inferred_from_extension() {
        let run = build_run_config(parse(&["-o", "cars.json"]), ConfigFile::default()).unwrap();
        assert_eq!(run.output_format, OutputFormat::Json);

        let run = build_run_config(
            parse(&["-o", "cars.json", "--output-format", "xml"]),
            ConfigFile::default(),
        )
        .unwrap();
        assert_eq!(run.output_format, OutputFormat::Xml);

        assert!(build_run_config(
            parse(&["--output-format", "csv"]),
            ConfigFile::default()
        )
        .is_err());
    }

    #[test]
    fn config_filters_reach_initial_state() {
        let cfg = config::parse_config("min_year: \"2015\"\nmax_price: abc\n").unwrap();
        let run = build_run_config(parse(&[]), cfg).unwrap();
        let filters = run.options.filters.to_filters();
        assert_eq!(filters.min_year, Some(ParsedInt::Number(2015)));
        assert!(matches!(filters.max_price, Some(ParsedInt::NotANumber(_))));
    }

    #[test]
    fn help_lists_headings() {
        let help = render_custom_help();
        assert!(help.contains("Filters:"));
        assert!(help.contains("--scrape [<PAGES>]"));
        assert!(help.contains("-u, --url, --base-url <URL>"));
    }
}

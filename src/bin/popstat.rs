use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use popstat_rs::format::{fmt_opt, format_population};
use popstat_rs::views::{self, CitiesView, CompareView, CountryView, ExploreView, Load};
use popstat_rs::{Client, Country, Direction, RankKey, SortState, chart, storage};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "popstat",
    version,
    about = "Search countries, rank cities & compare population series (CountriesNow API)"
)]
struct Cli {
    /// API base URL.
    #[arg(long, global = true, env = "POPSTAT_API_URL", default_value = popstat_rs::api::DEFAULT_BASE_URL)]
    api_url: String,
    /// Total request timeout in seconds.
    #[arg(long, global = true, default_value_t = 30)]
    timeout: u64,
    /// More log output (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List countries, optionally filtered by name.
    Countries(CountriesArgs),
    /// Show a country's population (and optionally save, plot, and print stats).
    Country(CountryArgs),
    /// Rank a country's cities by name or population.
    Cities(CitiesArgs),
    /// Compare two countries' population series year by year.
    Compare(CompareArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OutFormat {
    Csv,
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SortKey {
    Name,
    Population,
}

impl From<SortKey> for RankKey {
    fn from(k: SortKey) -> Self {
        match k {
            SortKey::Name => RankKey::Name,
            SortKey::Population => RankKey::Population,
        }
    }
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Save results to file (format inferred by --format or extension).
    #[arg(long)]
    out: Option<PathBuf>,
    /// Output format (csv or json). If omitted, inferred from --out extension.
    #[arg(long, value_enum)]
    format: Option<OutFormat>,
}

#[derive(Args, Debug)]
struct PlotArgs {
    /// Create a chart at the given path (.svg or .png).
    #[arg(long)]
    plot: Option<PathBuf>,
    /// Width of the plot (default 1000).
    #[arg(long, default_value_t = 1000)]
    width: u32,
    /// Height of the plot (default 600).
    #[arg(long, default_value_t = 600)]
    height: u32,
}

#[derive(Args, Debug)]
struct CountriesArgs {
    /// Case-insensitive name filter.
    #[arg(short, long)]
    search: Option<String>,
    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args, Debug)]
struct CountryArgs {
    /// ISO2 country code (e.g., DE)
    iso2: String,
    /// Print summary statistics.
    #[arg(long, default_value_t = false)]
    stats: bool,
    /// Locale for number formatting (en, de, fr, es, it, pt, nl).
    #[arg(long, default_value = "en")]
    locale: String,
    #[command(flatten)]
    plot: PlotArgs,
    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args, Debug)]
struct CitiesArgs {
    /// ISO2 country code (e.g., DE)
    iso2: String,
    /// Ranking column.
    #[arg(long, value_enum, default_value = "name")]
    sort: SortKey,
    /// Rank in descending order.
    #[arg(long, default_value_t = false)]
    desc: bool,
    /// Case-insensitive city name filter.
    #[arg(short, long)]
    search: Option<String>,
    /// Print at most this many rows.
    #[arg(long)]
    limit: Option<usize>,
    /// Locale for number formatting (en, de, fr, es, it, pt, nl).
    #[arg(long, default_value = "en")]
    locale: String,
    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args, Debug)]
struct CompareArgs {
    /// Primary country (ISO2); its years drive the comparison.
    first: String,
    /// Second country (ISO2).
    second: String,
    /// Locale for number formatting (en, de, fr, es, it, pt, nl).
    #[arg(long, default_value = "en")]
    locale: String,
    #[command(flatten)]
    plot: PlotArgs,
    #[command(flatten)]
    output: OutputArgs,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let client = Client::new(cli.api_url.as_str(), Duration::from_secs(cli.timeout))
        .context("build http client")?;
    match cli.cmd {
        Command::Countries(args) => cmd_countries(&client, args),
        Command::Country(args) => cmd_country(&client, args),
        Command::Cities(args) => cmd_cities(&client, args),
        Command::Compare(args) => cmd_compare(&client, args),
    }
}

/// Resolve the output format from `--format` or the file extension.
fn out_format(path: &Path, format: Option<OutFormat>) -> Result<OutFormat> {
    let fmt = match format {
        Some(f) => return Ok(f),
        None => path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("csv")
            .to_ascii_lowercase(),
    };
    match fmt.as_str() {
        "csv" => Ok(OutFormat::Csv),
        "json" => Ok(OutFormat::Json),
        other => bail!("unsupported format: {}", other),
    }
}

/// Unwrap a loaded view or fail with its generic message.
fn ready<T>(load: Load<T>) -> Result<T> {
    match load {
        Load::Ready(v) => Ok(v),
        Load::Failed(msg) => bail!("Not Found: {msg}"),
        Load::Loading => bail!("Not Found: nothing was loaded"),
    }
}

fn cmd_countries(client: &Client, args: CountriesArgs) -> Result<()> {
    let mut view = ExploreView::load(client);
    if let Some(msg) = view.countries.failure() {
        bail!("Not Found: {msg}");
    }
    view.search = args.search.unwrap_or_default();
    let visible: Vec<Country> = view.visible().into_iter().cloned().collect();

    if let Some(path) = args.output.out.as_ref() {
        match out_format(path, args.output.format)? {
            OutFormat::Csv => storage::save_countries_csv(&visible, path)?,
            OutFormat::Json => storage::save_json(&visible, path)?,
        }
        eprintln!("Saved {} rows to {}", visible.len(), path.display());
    }

    if visible.is_empty() {
        eprintln!("No countries found matching your search.");
    }
    for c in &visible {
        println!("{}  {}", c.iso2, c.name);
    }
    Ok(())
}

fn cmd_country(client: &Client, args: CountryArgs) -> Result<()> {
    let view = CountryView::load(client, &args.iso2);
    let latest = view.latest();
    let summary = view.summary();
    let chart_points = view.chart_points();
    let detail = ready(view.detail)?;

    println!("{} ({})", detail.country.name, detail.country.iso2);
    if let Some(p) = latest {
        println!(
            "Latest population: {} ({})",
            format_population(p.value, &args.locale),
            p.year
        );
    }

    if args.stats
        && let Some(s) = summary
    {
        println!(
            "years={}..{}  count={}  min={} max={} mean={} median={}",
            s.first_year,
            s.last_year,
            s.count,
            format_population(s.min, &args.locale),
            format_population(s.max, &args.locale),
            format_population(s.mean.round() as u64, &args.locale),
            format_population(s.median.round() as u64, &args.locale),
        );
    }

    if let Some(path) = args.output.out.as_ref() {
        match out_format(path, args.output.format)? {
            OutFormat::Csv => storage::save_series_csv(&detail.series, path)?,
            OutFormat::Json => storage::save_json(&detail.series, path)?,
        }
        eprintln!("Saved {} rows to {}", detail.series.points.len(), path.display());
    }

    if let Some(plot_path) = args.plot.plot.as_ref() {
        let mut recent = detail.series.clone();
        recent.points = chart_points;
        chart::plot_series(&recent, plot_path, args.plot.width, args.plot.height)?;
        eprintln!("Wrote plot to {}", plot_path.display());
    }
    Ok(())
}

fn cmd_cities(client: &Client, args: CitiesArgs) -> Result<()> {
    let mut view = CitiesView::load(client, &args.iso2);
    view.sort = SortState {
        key: args.sort.into(),
        direction: if args.desc {
            Direction::Descending
        } else {
            Direction::Ascending
        },
    };
    view.search = args.search.unwrap_or_default();
    let rows = view.rows();
    let table = ready(view.table)?;

    if let Some(path) = args.output.out.as_ref() {
        match out_format(path, args.output.format)? {
            OutFormat::Csv => storage::save_cities_csv(&rows, path)?,
            OutFormat::Json => storage::save_json(&rows, path)?,
        }
        eprintln!("Saved {} rows to {}", rows.len(), path.display());
    }

    println!("Cities in {}", table.country_name);
    let limit = args.limit.unwrap_or(rows.len());
    for city in rows.iter().take(limit) {
        let latest = city.latest_count();
        println!(
            "{:<40} {:>15} {}",
            city.city_name,
            format_population(city.latest_value(), &args.locale),
            latest.map(|c| c.year.to_string()).unwrap_or_default()
        );
    }
    Ok(())
}

fn cmd_compare(client: &Client, args: CompareArgs) -> Result<()> {
    let mut view = CompareView::load(client);
    let countries = ready(view.countries.clone())?;
    for iso2 in [&args.first, &args.second] {
        let country = countries
            .iter()
            .find(|c| c.iso2.eq_ignore_ascii_case(iso2.trim()))
            .ok_or_else(|| anyhow!("Not Found: {}", views::MSG_COUNTRY))?;
        view.toggle_selection(&country.name);
    }
    if !view.can_compare() {
        bail!("select two different countries to compare");
    }

    view.compare(client);
    let cmp = match view.comparison {
        Some(load) => ready(load)?,
        None => bail!("Not Found: {}", views::MSG_COMPARE),
    };

    println!("{}", cmp.title());
    if let Some((first, last)) = cmp.year_range() {
        println!("Population comparison from {first} to {last}");
    }
    for r in &cmp.merged {
        println!(
            "{}  {:>15}  {:>15}",
            r.year,
            fmt_opt(r.value_a, &args.locale),
            fmt_opt(r.value_b, &args.locale)
        );
    }

    if let Some(path) = args.output.out.as_ref() {
        match out_format(path, args.output.format)? {
            OutFormat::Csv => storage::save_comparison_csv(&cmp, path)?,
            OutFormat::Json => storage::save_json(&cmp.merged, path)?,
        }
        eprintln!("Saved {} rows to {}", cmp.merged.len(), path.display());
    }

    if let Some(plot_path) = args.plot.plot.as_ref() {
        chart::plot_comparison(&cmp, plot_path, args.plot.width, args.plot.height)?;
        eprintln!("Wrote plot to {}", plot_path.display());
    }
    Ok(())
}

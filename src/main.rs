//! Apparel Dash - command line front end
//!
//! Prints the dashboard view models for the product catalogue and renders
//! static charts.

use anyhow::{bail, Context};
use apparel_dash::charts::ChartRenderer;
use apparel_dash::config::DashboardConfig;
use apparel_dash::data::{Collection, DatasetLoader, DatasetStatus, LoadReport, Product};
use apparel_dash::stats::{
    average_price_by_color, category_metrics, monthly_series, rank_category_metrics,
    synthesize_sales, Metric, StockStatus, TimeRange,
};
use apparel_dash::view::{
    Dashboard, ProductTable, SortColumn, SortDirection, SortState, PAGE_SIZE_OPTIONS,
};
use chrono::{Local, NaiveDate};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "apparel-dash")]
#[command(about = "Inventory, sales and category analytics for the product catalogue")]
struct Cli {
    /// Product CSV (overrides the configured dataset path)
    #[arg(long, global = true)]
    data: Option<PathBuf>,
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[arg(long, global = true, default_value_t = false)]
    quiet: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summary cards and dataset status
    Summary {
        #[arg(long)]
        top: Option<usize>,
    },
    /// Category metrics, largest first
    Categories {
        #[arg(long, default_value = "stock")]
        metric: Metric,
    },
    /// Average price per colour
    Colors,
    /// Monthly collection series
    Monthly {
        #[arg(long, default_value = "all")]
        range: TimeRange,
        #[arg(long, default_value = "stock")]
        metric: Metric,
    },
    /// One page of the product table
    Table {
        #[arg(long)]
        collection: Option<Collection>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        sort: Option<SortColumn>,
        #[arg(long, default_value_t = false)]
        desc: bool,
        /// 1-based page number
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Rows per page: 10, 20, 30, 40 or 50
        #[arg(long, value_parser = parse_page_size)]
        page_size: Option<usize>,
    },
    /// Product details with a synthesized sales history
    Product {
        id: i64,
        /// Seed for reproducible sales figures
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Render a chart to .svg or .png
    Chart {
        #[arg(long)]
        out: PathBuf,
        #[arg(long, value_enum, default_value_t = ChartKind::Monthly)]
        kind: ChartKind,
        #[arg(long, default_value = "stock")]
        metric: Metric,
        #[arg(long, default_value = "all")]
        range: TimeRange,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ChartKind {
    Monthly,
    Categories,
}

fn parse_page_size(value: &str) -> Result<usize, String> {
    let size: usize = value.parse().map_err(|_| format!("not a number: {value}"))?;
    if PAGE_SIZE_OPTIONS.contains(&size) {
        Ok(size)
    } else {
        Err(format!("page size must be one of {PAGE_SIZE_OPTIONS:?}"))
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let default_level = match (quiet, verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_level.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let mut config = DashboardConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(path) = &cli.data {
        config.dataset.path = path.clone();
    }

    let report = DatasetLoader::new()
        .with_default_currency(config.dataset.default_currency.clone())
        .load_or_empty(&config.dataset.path);
    if report.status() == DatasetStatus::Failed {
        tracing::warn!(path = %config.dataset.path.display(), "no usable product rows; showing empty dashboard");
    }

    let today = Local::now().date_naive();
    run(cli.command, cli.json, &config, report, today)
}

fn run(
    command: Commands,
    json: bool,
    config: &DashboardConfig,
    report: LoadReport,
    today: NaiveDate,
) -> anyhow::Result<()> {
    match command {
        Commands::Summary { top } => {
            let mut config = config.clone();
            if let Some(top) = top {
                config.dashboard.top_n = top;
            }
            let dashboard = Dashboard::build(&report.products, &config);
            if json {
                return print_json(&json!({
                    "status": report.status(),
                    "rejected": report.rejected,
                    "dashboard": dashboard,
                }));
            }
            print_summary(&report, &dashboard);
        }
        Commands::Categories { metric } => {
            let metrics = rank_category_metrics(category_metrics(&report.products), metric);
            if json {
                return print_json(&metrics);
            }
            println!("{:<16} {:>10} {:>14} {:>8}", "Category", "Stock", "Revenue", "Count");
            for m in &metrics {
                println!(
                    "{:<16} {:>10} {:>14} {:>8}",
                    m.category,
                    Metric::Stock.format_value(m.stock as f64),
                    Metric::Revenue.format_value(m.revenue),
                    m.count
                );
            }
        }
        Commands::Colors => {
            let colors = average_price_by_color(&report.products);
            if json {
                return print_json(&colors);
            }
            println!("{:<20} {:>8} {:>10} {:>6}", "Color", "Swatch", "Avg price", "Count");
            for c in &colors {
                println!(
                    "{:<20} {:>8} {:>10.2} {:>6}",
                    c.color,
                    apparel_dash::data::color_hex(&c.color),
                    c.average_price,
                    c.count
                );
            }
        }
        Commands::Monthly { range, metric } => {
            let series = monthly_series(&report.products);
            let window = range.apply(&series);
            if json {
                return print_json(&window);
            }
            println!("{} ({range})", metric.title());
            println!("{:<10} {:>14} {:>14} {:>14}", "Month", "Oversized", "Fitted", "Classic");
            for bucket in window {
                let [oversized, fitted, classic] = bucket.values(metric);
                println!(
                    "{:<10} {:>14} {:>14} {:>14}",
                    bucket.display,
                    metric.format_value(oversized),
                    metric.format_value(fitted),
                    metric.format_value(classic)
                );
            }
        }
        Commands::Table {
            collection,
            category,
            search,
            sort,
            desc,
            page,
            page_size,
        } => {
            let page_size = page_size.unwrap_or(config.table.page_size);
            let mut table = ProductTable::new(report.into_products(), page_size, config.thresholds);
            table.set_collection(collection);
            table.set_category(category);
            if let Some(query) = search {
                table.set_search(query);
            }
            table.set_sort(sort.map(|column| SortState {
                column,
                direction: if desc {
                    SortDirection::Descending
                } else {
                    SortDirection::Ascending
                },
            }));
            table.go_to_page(page.saturating_sub(1));

            let rows = table.visible_rows(today);
            if json {
                return print_json(&json!({
                    "page": table.page_index() + 1,
                    "page_count": table.page_count(),
                    "row_count": table.row_count(),
                    "rows": rows,
                }));
            }
            println!(
                "{:>4}  {:<28} {:<14} {:<18} {:>12} {:>6}  {}",
                "ID", "Product", "Category", "Color", "Price", "Stock", "Release"
            );
            for row in &rows {
                let p = row.product;
                println!(
                    "{:>4}  {:<28} {:<14} {:<18} {:>12} {:>6}  {}{}",
                    p.product_id,
                    p.name,
                    p.category,
                    p.color,
                    row.formatted_price,
                    p.stock,
                    p.released().format("%-d %b %Y"),
                    if row.upcoming { " (upcoming)" } else { "" }
                );
            }
            println!(
                "Page {} of {} ({} products)",
                table.page_index() + 1,
                table.page_count(),
                table.row_count()
            );
        }
        Commands::Product { id, seed } => {
            let Some(product) = report.products.iter().find(|p| p.product_id == id) else {
                bail!("no product with id {id}");
            };
            match seed {
                Some(seed) => print_product(product, config, today, &mut StdRng::seed_from_u64(seed), json)?,
                None => print_product(product, config, today, &mut rand::thread_rng(), json)?,
            }
        }
        Commands::Chart {
            out,
            kind,
            metric,
            range,
        } => {
            let size = (config.chart.width, config.chart.height);
            let rendered = match kind {
                ChartKind::Monthly => {
                    let series = monthly_series(&report.products);
                    ChartRenderer::render_monthly(range.apply(&series), metric, &out, size)
                }
                ChartKind::Categories => {
                    let metrics = rank_category_metrics(category_metrics(&report.products), metric);
                    ChartRenderer::render_categories(&metrics, metric, &out, size)
                }
            };
            rendered.with_context(|| format!("rendering {}", out.display()))?;
            println!("Wrote {}", out.display());
        }
    }
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_summary(report: &LoadReport, dashboard: &Dashboard) {
    println!("Dataset: {:?} ({} products)", report.status(), dashboard.product_count);
    for rejection in &report.rejected {
        println!(
            "  skipped row {} (product_id {}): {}",
            rejection.row,
            rejection.product_id.as_deref().unwrap_or("?"),
            rejection.reason
        );
    }

    println!(
        "Total Revenue:  {} [{:?}]",
        Metric::Revenue.format_value(dashboard.revenue.total),
        dashboard.revenue.tier
    );
    match &dashboard.top_product {
        Some(card) => println!(
            "Top Product:    {} ({}) - {} units [{:?}]",
            card.product.name, card.product.category, card.product.stock, card.status
        ),
        None => println!("Top Product:    -"),
    }
    match &dashboard.top_category {
        Some(card) => println!(
            "Top Category:   {} - {} units [{:?}]",
            card.category.category, card.category.stock, card.status
        ),
        None => println!("Top Category:   -"),
    }
    match &dashboard.top_color {
        Some(color) => println!(
            "Top Color:      {} - {:.2} avg, {} products",
            color.color, color.average_price, color.count
        ),
        None => println!("Top Color:      -"),
    }
    if !dashboard.top_products.is_empty() {
        println!("Most stocked:");
        for (rank, top) in dashboard.top_products.iter().enumerate() {
            println!("  {}. {} ({}) - {} units", rank + 1, top.name, top.category, top.stock);
        }
    }
}

fn print_product<R: Rng>(
    product: &Product,
    config: &DashboardConfig,
    today: NaiveDate,
    rng: &mut R,
    json: bool,
) -> anyhow::Result<()> {
    let sales = synthesize_sales(product, today, rng);
    let status = StockStatus::classify(u64::from(product.stock), &config.thresholds);

    if json {
        return print_json(&json!({
            "product": product,
            "sizes": product.sizes(),
            "formatted_price": product.formatted_price(),
            "color_hex": product.color_hex(),
            "status": status,
            "upcoming": product.is_upcoming(today),
            "collection": product.collection(),
            "sales": sales,
        }));
    }

    println!("{} [{}]", product.name, product.category);
    println!("  Price:    {}", product.formatted_price());
    println!("  Color:    {} ({})", product.color, product.color_hex());
    println!("  Sizes:    {}", product.sizes().join(", "));
    println!("  Stock:    {} [{:?}]", product.stock, status);
    println!(
        "  Released: {}{}",
        product.released().format("%-d %b %Y"),
        if product.is_upcoming(today) { " (upcoming)" } else { "" }
    );
    println!("  Sales history:");
    for month in &sales {
        println!("    {:<4} sales {:>5}  returns {:>4}", month.month, month.sales, month.returns);
    }
    Ok(())
}

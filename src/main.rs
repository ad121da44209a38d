use anyhow::Result;
use catalog::{
    load_titles_csv, save_reports_json, save_titles_csv, save_update_rows_csv, ListingClient,
    ListingConfig, LookupStatus, Progress, TitleEntry, TitleReport,
};
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use updates::UpdateClient;

/// PS Vita catalog scraper and update-link collector.
#[derive(Parser)]
#[command(version, about = "PS Vita catalog scraper and update-link collector")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl the listing site into a titles CSV
    Scrape {
        /// First page to visit (ignored with --resume)
        #[arg(long, default_value = "1")]
        start_page: u32,
        /// Last page to visit
        #[arg(long, default_value = "39")]
        max_pages: u32,
        /// Resume from the saved progress file
        #[arg(long)]
        resume: bool,
        /// Output titles CSV
        #[arg(long, default_value = "psvita_titles.csv")]
        out: PathBuf,
        /// Progress checkpoint file
        #[arg(long, default_value = "psvita_titles_progress.json")]
        progress: PathBuf,
    },
    /// Look up update links for a single media id
    Lookup {
        /// Media id, e.g. PCSE00491
        media_id: String,
    },
    /// Look up update links for every title in a CSV
    Batch {
        /// Input titles CSV
        #[arg(long, default_value = "psvita_titles.csv")]
        titles: PathBuf,
        /// Only process the first N titles
        #[arg(long)]
        limit: Option<usize>,
        /// Pause between titles, in milliseconds
        #[arg(long, default_value = "1000")]
        delay_ms: u64,
        /// Output JSON report
        #[arg(long, default_value = "psvita_updates.json")]
        out_json: PathBuf,
        /// Output flat CSV (one row per update)
        #[arg(long, default_value = "psvita_updates.csv")]
        out_csv: PathBuf,
    },
    /// Print region statistics for a titles CSV
    Stats {
        /// Input titles CSV
        #[arg(long, default_value = "psvita_titles.csv")]
        titles: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    match cli.command {
        Commands::Scrape {
            start_page,
            max_pages,
            resume,
            out,
            progress,
        } => run_scrape(start_page, max_pages, resume, out, progress).await,
        Commands::Lookup { media_id } => run_lookup(&media_id).await,
        Commands::Batch {
            titles,
            limit,
            delay_ms,
            out_json,
            out_csv,
        } => run_batch(titles, limit, delay_ms, out_json, out_csv).await,
        Commands::Stats { titles } => run_stats(titles),
    }
}

async fn run_scrape(
    start_page: u32,
    max_pages: u32,
    resume: bool,
    out: PathBuf,
    progress: PathBuf,
) -> Result<()> {
    let start_page = if resume {
        let saved = Progress::load(&progress)?;
        info!(
            page = saved.current_page,
            titles = saved.total_titles,
            "resuming listing crawl"
        );
        saved.current_page + 1
    } else {
        start_page
    };

    let config = ListingConfig {
        max_pages,
        ..ListingConfig::default()
    };
    let client = ListingClient::new(config)?;

    let titles = client.scrape_all(start_page, Some(&progress)).await?;
    save_titles_csv(&out, &titles)?;
    info!(count = titles.len(), out = %out.display(), "titles saved");
    Ok(())
}

async fn run_lookup(media_id: &str) -> Result<()> {
    let client = UpdateClient::builder().build()?;
    let records = client.lookup(media_id).await?;

    if records.is_empty() {
        info!(media_id, "no updates published");
    } else {
        println!("{}", serde_json::to_string_pretty(&records)?);
    }
    Ok(())
}

async fn run_batch(
    titles_path: PathBuf,
    limit: Option<usize>,
    delay_ms: u64,
    out_json: PathBuf,
    out_csv: PathBuf,
) -> Result<()> {
    let mut titles = load_titles_csv(&titles_path)?;
    if let Some(limit) = limit {
        titles.truncate(limit);
    }
    let total = titles.len();
    info!(total, "starting batch lookup");

    let client = UpdateClient::builder().build()?;
    let delay = Duration::from_millis(delay_ms);
    let mut reports: Vec<TitleReport> = Vec::with_capacity(total);

    for (index, entry) in titles.iter().enumerate() {
        let report = lookup_title(&client, entry).await;
        match report.status {
            LookupStatus::Success => info!(
                media_id = %report.media_id,
                title = %report.title,
                updates = report.updates.len(),
                size = report.total_size(),
                "updates found"
            ),
            LookupStatus::NoUpdates => debug!(media_id = %report.media_id, "no updates"),
            LookupStatus::Error => warn!(
                media_id = %report.media_id,
                error = report.error.as_deref().unwrap_or(""),
                "title skipped"
            ),
        }
        reports.push(report);

        let done = index + 1;
        if done % 50 == 0 {
            save_reports_json(&out_json, &reports)?;
            info!(done, total, "progress saved");
        }
        if done < total {
            tokio::time::sleep(delay).await;
        }
    }

    save_reports_json(&out_json, &reports)?;
    save_update_rows_csv(&out_csv, &reports)?;

    let with_updates = count_status(&reports, LookupStatus::Success);
    let without = count_status(&reports, LookupStatus::NoUpdates);
    let errors = count_status(&reports, LookupStatus::Error);
    info!(total, with_updates, without, errors, "batch finished");
    Ok(())
}

async fn lookup_title(client: &UpdateClient, entry: &TitleEntry) -> TitleReport {
    match client.lookup(&entry.media_id).await {
        Ok(records) if records.is_empty() => TitleReport::no_updates(entry),
        Ok(records) => TitleReport::success(entry, records),
        // A bad identifier skips the title, never the batch.
        Err(err) => TitleReport::failed(entry, err.to_string()),
    }
}

fn count_status(reports: &[TitleReport], status: LookupStatus) -> usize {
    reports
        .iter()
        .filter(|report| report.status == status)
        .count()
}

fn run_stats(titles_path: PathBuf) -> Result<()> {
    let titles = load_titles_csv(&titles_path)?;

    let mut regions: BTreeMap<String, usize> = BTreeMap::new();
    for title in &titles {
        *regions.entry(title.region.clone()).or_default() += 1;
    }

    println!("Total titles: {}", titles.len());
    println!("Regions:");
    for (region, count) in &regions {
        println!("  {region}: {count}");
    }
    Ok(())
}

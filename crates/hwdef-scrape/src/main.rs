//! Hwdef Scrape - Main entry point
//!
//! Walks a hardware definition tree, parses every board folder and writes the
//! board catalog as JSON.

use anyhow::{Context, Result};
use clap::Parser;
use hwdef_core::{BatchReport, BoardIdTable, BoardOutcome, BoardScraper, LocalTree, ScraperConfig, SummaryRow};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "hwdef-scrape")]
#[command(about = "Scrape hardware definition folders into a board catalog")]
#[command(version)]
struct Args {
    /// Root of the hardware definition tree (one folder per board)
    #[arg(long)]
    hwdef_root: PathBuf,

    /// Board ID table mapping symbolic names to numeric IDs
    #[arg(long)]
    board_types: Option<PathBuf>,

    /// Path to configuration file
    #[arg(short, long, default_value = "hwdef-scrape.toml")]
    config: PathBuf,

    /// Output JSON document
    #[arg(short, long, default_value = "boards-scraped.json")]
    output: PathBuf,

    /// Only scrape these board folders (comma separated)
    #[arg(long, value_delimiter = ',')]
    boards_only: Vec<String>,

    /// Only scrape priority boards
    #[arg(long)]
    priority_only: bool,

    /// Number of boards parsed concurrently
    #[arg(short, long, default_value_t = 1)]
    jobs: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Hwdef Scrape v{}", env!("CARGO_PKG_VERSION"));

    let config = ScraperConfig::load_or_default(&args.config)
        .with_context(|| format!("Failed to load config {}", args.config.display()))?;
    let board_ids = load_board_ids(args.board_types.as_deref());

    info!(
        root = %args.hwdef_root.display(),
        board_ids = board_ids.len(),
        priority = config.priority_boards.len(),
        "Configuration loaded"
    );

    let scraper = Arc::new(BoardScraper::new(config, board_ids, LocalTree));
    let folders = select_folders(&scraper, &args)?;
    info!(count = folders.len(), jobs = args.jobs, "Scraping boards");

    let report = if args.jobs > 1 {
        scrape_parallel(scraper.clone(), folders, args.jobs).await?
    } else {
        scraper.scrape_folders(&folders)
    };

    report
        .save(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    info!(path = %args.output.display(), boards = report.total_boards, "Wrote board catalog");

    print_summary(&report, &args.output);
    Ok(())
}

/// A missing table only leaves symbolic board IDs unresolved
fn load_board_ids(path: Option<&Path>) -> BoardIdTable {
    let Some(path) = path else {
        return BoardIdTable::new();
    };
    match BoardIdTable::from_file(path) {
        Ok(table) => table,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Board ID table unavailable, IDs stay unresolved");
            BoardIdTable::new()
        }
    }
}

fn select_folders(scraper: &BoardScraper, args: &Args) -> Result<Vec<PathBuf>> {
    let folders = scraper
        .board_folders(&args.hwdef_root)
        .with_context(|| format!("Failed to list {}", args.hwdef_root.display()))?;

    Ok(folders
        .into_iter()
        .filter(|folder| {
            let name = folder.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
            let listed = args.boards_only.is_empty() || args.boards_only.iter().any(|b| b.as_str() == name);
            listed && (!args.priority_only || scraper.config().is_priority(&name))
        })
        .collect())
}

/// Split the folders into `jobs` contiguous chunks, each parsed on the
/// blocking pool against the same scraper and include cache.
async fn scrape_parallel(scraper: Arc<BoardScraper>, folders: Vec<PathBuf>, jobs: usize) -> Result<BatchReport> {
    let chunk_size = folders.len().div_ceil(jobs).max(1);
    let mut tasks = JoinSet::new();

    for (chunk_index, chunk) in folders.chunks(chunk_size).enumerate() {
        let scraper = scraper.clone();
        let chunk = chunk.to_vec();
        tasks.spawn_blocking(move || {
            let outcomes: Vec<BoardOutcome> = chunk.iter().map(|f| scraper.scrape_folder(f)).collect();
            (chunk_index, outcomes)
        });
    }

    let mut chunks = Vec::new();
    while let Some(result) = tasks.join_next().await {
        chunks.push(result.context("Board worker failed")?);
    }
    chunks.sort_by_key(|(index, _)| *index);

    let report = BatchReport::from_outcomes(chunks.into_iter().flat_map(|(_, outcomes)| outcomes));
    info!(
        boards = report.total_boards,
        priority = report.priority_boards,
        failures = report.failures.len(),
        "Batch complete"
    );
    Ok(report)
}

fn print_summary(report: &BatchReport, output: &Path) {
    let rows = report.summary_rows();

    println!(
        "{:<28} {:<12} {:>6} {:>5} {:>4}  {:<30} {:<4} {:<3}",
        "Board", "MCU", "ID", "UARTs", "PWM", "IMU", "OSD", "SD"
    );
    for row in &rows {
        println!("{}", format_row(row));
    }

    println!();
    println!(
        "{} boards ({} priority), {} bootloader skipped, {} without SERIAL_ORDER, {} failed",
        report.total_boards,
        report.priority_boards,
        report.skipped_bootloader,
        report.skipped_no_serial_order.len(),
        report.failures.len()
    );
    for failure in &report.failures {
        println!("  FAILED {}: {}", failure.board, failure.message);
    }
    if !report.diagnostics.is_empty() {
        println!("{} diagnostics, see {}", report.diagnostics.len(), output.display());
    }
}

fn format_row(row: &SummaryRow) -> String {
    let name = if row.is_priority {
        format!("*{}", row.folder_name)
    } else {
        row.folder_name.clone()
    };
    let id = row.board_id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string());
    let imu = if row.imu.is_empty() {
        "-".to_string()
    } else {
        row.imu.join(",")
    };
    format!(
        "{:<28} {:<12} {:>6} {:>5} {:>4}  {:<30} {:<4} {:<3}",
        name,
        row.mcu_type,
        id,
        row.uart_count,
        row.pwm_count,
        imu,
        if row.osd { "yes" } else { "no" },
        if row.sdcard { "yes" } else { "no" }
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> SummaryRow {
        SummaryRow {
            folder_name: "MatekH743".to_string(),
            mcu_type: "STM32H743xx".to_string(),
            board_id: Some(1013),
            uart_count: 7,
            pwm_count: 13,
            imu: vec!["MPU6000".to_string(), "ICM42688".to_string()],
            osd: true,
            sdcard: true,
            is_priority: true,
        }
    }

    #[test]
    fn test_format_row() {
        let line = format_row(&row());
        assert!(line.starts_with("*MatekH743"));
        assert!(line.contains("STM32H743xx"));
        assert!(line.contains("1013"));
        assert!(line.contains("MPU6000,ICM42688"));
    }

    #[test]
    fn test_format_row_without_id() {
        let mut row = row();
        row.board_id = None;
        row.imu.clear();
        row.is_priority = false;
        let line = format_row(&row);
        assert!(line.starts_with("MatekH743 "));
        assert!(line.contains(" - "));
    }

    #[test]
    fn test_args_parse() {
        let args = Args::parse_from([
            "hwdef-scrape",
            "--hwdef-root",
            "libraries/AP_HAL_ChibiOS/hwdef",
            "--boards-only",
            "MatekH743,KakuteH7",
            "--jobs",
            "4",
        ]);
        assert_eq!(args.boards_only, vec!["MatekH743", "KakuteH7"]);
        assert_eq!(args.jobs, 4);
        assert_eq!(args.output, PathBuf::from("boards-scraped.json"));
        assert!(!args.priority_only);
    }

    #[test]
    fn test_missing_board_ids_is_empty() {
        let table = load_board_ids(Some(Path::new("/nonexistent/board_types.txt")));
        assert!(table.is_empty());
        assert!(load_board_ids(None).is_empty());
    }
}

//! Board folder parsing and batch driving
//!
//! [`BoardScraper`] owns the reference data for a batch (configuration, board
//! ID table) and the include cache shared by every board it parses. Boards are
//! independent, so a scraper can be shared across threads and folders parsed
//! in any order.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::board::BoardDescription;
use crate::board_ids::BoardIdTable;
use crate::config::ScraperConfig;
use crate::defaults::parse_defaults;
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::directive::DirectiveProcessor;
use crate::include::{IncludeCache, IncludeResolver};
use crate::outputs::output_groups;
use crate::rcin::detect_rc_input;
use crate::report::BatchReport;
use crate::sensors::detect_sensors;
use crate::source::SourceTree;
use crate::uart::enrich_uarts;

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("No board definition in {0}")]
    NoDefinition(PathBuf),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// A parsed board before acceptance checks
#[derive(Debug, Clone)]
pub struct ParsedBoard {
    pub board: BoardDescription,
    pub diagnostics: Vec<Diagnostic>,
}

/// Why a board folder was left out of the batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Folder has no definition file
    NoDefinition,
    /// Bootloader-only variant
    Bootloader,
    /// No SERIAL_ORDER: a fragment or shared config, not a board
    NoSerialOrder,
}

#[derive(Debug, Clone)]
pub enum BoardStatus {
    Accepted(Box<BoardDescription>),
    Skipped(SkipReason),
    Failed(String),
}

/// Result of scraping one folder
#[derive(Debug, Clone)]
pub struct BoardOutcome {
    pub folder_name: String,
    pub status: BoardStatus,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct BoardScraper {
    config: ScraperConfig,
    board_ids: BoardIdTable,
    tree: Box<dyn SourceTree>,
    cache: IncludeCache,
}

impl BoardScraper {
    pub fn new(config: ScraperConfig, board_ids: BoardIdTable, tree: impl SourceTree + 'static) -> Self {
        Self {
            config,
            board_ids,
            tree: Box::new(tree),
            cache: IncludeCache::new(),
        }
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    pub fn cache(&self) -> &IncludeCache {
        &self.cache
    }

    /// Board folders under `root` holding a definition file, sorted by name
    pub fn board_folders(&self, root: &Path) -> Result<Vec<PathBuf>, ScrapeError> {
        let mut folders: Vec<PathBuf> = self
            .tree
            .list_dirs(root)?
            .into_iter()
            .filter(|dir| self.tree.is_file(&dir.join(&self.config.definition_file)))
            .collect();
        folders.sort();
        Ok(folders)
    }

    /// Parse one board folder into a record; never rejects on content
    pub fn parse_board(&self, folder: &Path) -> Result<ParsedBoard, ScrapeError> {
        let definition = folder.join(&self.config.definition_file);
        if !self.tree.is_file(&definition) {
            return Err(ScrapeError::NoDefinition(folder.to_path_buf()));
        }

        let folder_name = folder_name(folder);
        let mut board = BoardDescription::new(&folder_name);
        board.is_bootloader = self.config.is_bootloader(&folder_name);
        board.is_priority = self.config.is_priority(&folder_name);

        let resolved = IncludeResolver::new(self.tree.as_ref(), &self.cache)
            .with_max_depth(self.config.max_include_depth)
            .resolve(&definition);
        board.header_comments = header_comments(&resolved.lines, self.config.header_comment_lines);
        board.includes = resolved.includes;

        let processed = DirectiveProcessor::new(board, &self.config.chips).process(&resolved.lines);
        let mut board = processed.board;
        let mut diagnostics = resolved.diagnostics;
        diagnostics.extend(processed.diagnostics);

        board.output_groups = output_groups(&board.pwm_outputs);
        detect_sensors(&processed.spi_devices, &self.config.chips, &mut board.sensors);
        board.rc_input = detect_rc_input(&board, &resolved.lines);
        enrich_uarts(&mut board, &resolved.lines);
        self.board_ids.resolve(&mut board);

        let defaults = folder.join(&self.config.defaults_file);
        if self.tree.is_file(&defaults) {
            match self.tree.read_text(&defaults) {
                Ok(content) => board.default_params = parse_defaults(&content),
                Err(e) => {
                    warn!(path = %defaults.display(), error = %e, "Cannot read defaults file");
                    diagnostics.push(Diagnostic::new(
                        DiagnosticKind::UnreadableFile,
                        format!("cannot read {}: {}", defaults.display(), e),
                    ));
                }
            }
        }

        debug!(
            board = %board.folder_name,
            uarts = board.uarts.len(),
            outputs = board.pwm_outputs.len(),
            diagnostics = diagnostics.len(),
            "Parsed board"
        );
        Ok(ParsedBoard { board, diagnostics })
    }

    /// Parse a folder and decide whether it belongs in the batch.
    /// Failures, including panics, are captured in the outcome.
    pub fn scrape_folder(&self, folder: &Path) -> BoardOutcome {
        let folder_name = folder_name(folder);
        if self.config.is_bootloader(&folder_name) {
            debug!(board = %folder_name, "Skipping bootloader-only definition");
            return BoardOutcome {
                folder_name,
                status: BoardStatus::Skipped(SkipReason::Bootloader),
                diagnostics: Vec::new(),
            };
        }

        let (status, diagnostics) = match catch_unwind(AssertUnwindSafe(|| self.parse_board(folder))) {
            Ok(Ok(parsed)) if parsed.board.serial_order.is_empty() => {
                debug!(board = %folder_name, "No SERIAL_ORDER, skipping");
                (BoardStatus::Skipped(SkipReason::NoSerialOrder), parsed.diagnostics)
            }
            Ok(Ok(parsed)) => (BoardStatus::Accepted(Box::new(parsed.board)), parsed.diagnostics),
            Ok(Err(ScrapeError::NoDefinition(_))) => (BoardStatus::Skipped(SkipReason::NoDefinition), Vec::new()),
            Ok(Err(e)) => {
                warn!(board = %folder_name, error = %e, "Failed to parse board");
                (BoardStatus::Failed(e.to_string()), Vec::new())
            }
            Err(panic) => {
                let message = panic
                    .downcast_ref::<String>()
                    .cloned()
                    .or_else(|| panic.downcast_ref::<&str>().map(|s| s.to_string()))
                    .unwrap_or_else(|| "parser panicked".to_string());
                warn!(board = %folder_name, error = %message, "Parser panicked");
                (BoardStatus::Failed(message), Vec::new())
            }
        };

        BoardOutcome {
            folder_name,
            status,
            diagnostics,
        }
    }

    /// Scrape the given folders in order
    pub fn scrape_folders(&self, folders: &[PathBuf]) -> BatchReport {
        let outcomes: Vec<BoardOutcome> = folders.iter().map(|f| self.scrape_folder(f)).collect();
        let report = BatchReport::from_outcomes(outcomes);
        info!(
            boards = report.total_boards,
            priority = report.priority_boards,
            failures = report.failures.len(),
            "Batch complete"
        );
        report
    }

    /// Scrape every board folder under `root`
    pub fn scrape_all(&self, root: &Path) -> Result<BatchReport, ScrapeError> {
        let folders = self.board_folders(root)?;
        info!(root = %root.display(), count = folders.len(), "Found board directories");
        Ok(self.scrape_folders(&folders))
    }
}

fn folder_name(folder: &Path) -> String {
    folder
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| folder.display().to_string())
}

/// Leading `#` lines before the first directive, markers stripped
fn header_comments<S: AsRef<str>>(lines: &[S], max_lines: usize) -> String {
    lines
        .iter()
        .map(AsRef::as_ref)
        .take_while(|line| line.is_empty() || line.starts_with('#'))
        .filter(|line| !line.is_empty())
        .map(|line| line.trim_start_matches('#').trim())
        .take(max_lines)
        .collect::<Vec<_>>()
        .join("\n")
}

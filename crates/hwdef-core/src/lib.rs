//! Hwdef Core - Board definition parsing for autopilot hardware
//!
//! This crate turns a tree of hardware definition folders into structured
//! board descriptions:
//! - Include expansion with a content-tracked cache
//! - Directive interpretation into MCU, UART, PWM, sensor and feature data
//! - Board ID, default parameter and RC input resolution
//! - Batch reports for the whole tree

pub mod board;
pub mod board_ids;
pub mod config;
pub mod defaults;
pub mod diagnostics;
pub mod directive;
pub mod include;
pub mod outputs;
pub mod rcin;
pub mod report;
pub mod scraper;
pub mod sensors;
pub mod source;
pub mod uart;

pub use board::{
    BatteryMonitorConfig, BoardDescription, Capability, Features, McuInfo, OutputGroup, OutputPin, RcInputConfig,
    RcInputKind, SensorSet, SpiDevice, UartChannel,
};
pub use board_ids::{BoardIdError, BoardIdTable};
pub use config::{ChipCatalog, ConfigError, ScraperConfig};
pub use diagnostics::{Diagnostic, DiagnosticKind};
pub use directive::{Directive, DirectiveError, DirectiveProcessor, ProcessedBoard};
pub use include::{IncludeCache, IncludeResolver, ResolvedLines};
pub use report::{BatchReport, BoardDiagnostic, BoardFailure, ReportError, SummaryRow};
pub use scraper::{BoardOutcome, BoardScraper, BoardStatus, ParsedBoard, ScrapeError, SkipReason};
pub use source::{LocalTree, MemoryTree, SourceTree};

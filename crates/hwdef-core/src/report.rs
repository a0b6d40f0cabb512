//! Batch results: accepted boards, skips, failures and diagnostics

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::board::BoardDescription;
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::scraper::{BoardOutcome, BoardStatus, SkipReason};

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// A board whose parse failed outright
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardFailure {
    pub board: String,
    pub message: String,
}

/// A diagnostic tagged with the board it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardDiagnostic {
    pub board: String,
    pub kind: DiagnosticKind,
    pub message: String,
}

/// The interchange document for one batch
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub scraped_at: DateTime<Utc>,
    pub total_boards: usize,
    pub priority_boards: usize,
    pub skipped_bootloader: usize,
    pub skipped_no_serial_order: Vec<String>,
    pub failures: Vec<BoardFailure>,
    pub diagnostics: Vec<BoardDiagnostic>,
    /// Priority boards first, then by folder name ignoring case
    pub boards: Vec<BoardDescription>,
}

/// One line of the summary table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub folder_name: String,
    pub mcu_type: String,
    pub board_id: Option<u32>,
    pub uart_count: usize,
    pub pwm_count: usize,
    /// At most three IMUs
    pub imu: Vec<String>,
    pub osd: bool,
    pub sdcard: bool,
    pub is_priority: bool,
}

impl BatchReport {
    pub fn from_outcomes(outcomes: impl IntoIterator<Item = BoardOutcome>) -> Self {
        let mut report = Self {
            scraped_at: Utc::now(),
            total_boards: 0,
            priority_boards: 0,
            skipped_bootloader: 0,
            skipped_no_serial_order: Vec::new(),
            failures: Vec::new(),
            diagnostics: Vec::new(),
            boards: Vec::new(),
        };

        for outcome in outcomes {
            let BoardOutcome {
                folder_name,
                status,
                diagnostics,
            } = outcome;

            report
                .diagnostics
                .extend(diagnostics.into_iter().map(|Diagnostic { kind, message }| BoardDiagnostic {
                    board: folder_name.clone(),
                    kind,
                    message,
                }));

            match status {
                BoardStatus::Accepted(board) => report.boards.push(*board),
                BoardStatus::Skipped(SkipReason::Bootloader) => report.skipped_bootloader += 1,
                BoardStatus::Skipped(SkipReason::NoSerialOrder) => report.skipped_no_serial_order.push(folder_name),
                BoardStatus::Skipped(SkipReason::NoDefinition) => {}
                BoardStatus::Failed(message) => report.failures.push(BoardFailure {
                    board: folder_name,
                    message,
                }),
            }
        }

        report
            .boards
            .sort_by_key(|b| (!b.is_priority, b.folder_name.to_lowercase()));
        report.total_boards = report.boards.len();
        report.priority_boards = report.boards.iter().filter(|b| b.is_priority).count();
        report
    }

    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the document, creating parent directories as needed
    pub fn save(&self, path: &Path) -> Result<(), ReportError> {
        let content = self.to_json()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn from_file(path: &Path) -> Result<Self, ReportError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn summary_rows(&self) -> Vec<SummaryRow> {
        self.boards
            .iter()
            .map(|b| SummaryRow {
                folder_name: b.folder_name.clone(),
                mcu_type: b.mcu.mcu_type.clone(),
                board_id: b.apj_board_id,
                uart_count: b.hardware_uarts().count(),
                pwm_count: b.pwm_outputs.len(),
                imu: b.sensors.imu.iter().take(3).cloned().collect(),
                osd: b.sensors.osd.is_some(),
                sdcard: b.sensors.sdcard,
                is_priority: b.is_priority,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::UartChannel;
    use tempfile::TempDir;

    fn accepted(name: &str, priority: bool) -> BoardOutcome {
        let mut board = BoardDescription::new(name);
        board.is_priority = priority;
        board.uarts = ["OTG1", "USART1", "EMPTY", "UART4"]
            .iter()
            .enumerate()
            .map(|(i, t)| UartChannel::from_token(i, t))
            .collect();
        BoardOutcome {
            folder_name: name.to_string(),
            status: BoardStatus::Accepted(Box::new(board)),
            diagnostics: Vec::new(),
        }
    }

    fn outcomes() -> Vec<BoardOutcome> {
        vec![
            accepted("zeta", false),
            accepted("Alpha", false),
            accepted("MatekH743", true),
            BoardOutcome {
                folder_name: "Broken".to_string(),
                status: BoardStatus::Failed("boom".to_string()),
                diagnostics: vec![Diagnostic::new(DiagnosticKind::MissingFile, "file not found: x.inc")],
            },
            BoardOutcome {
                folder_name: "MatekH743-bl".to_string(),
                status: BoardStatus::Skipped(SkipReason::Bootloader),
                diagnostics: Vec::new(),
            },
        ]
    }

    #[test]
    fn test_from_outcomes() {
        let report = BatchReport::from_outcomes(outcomes());

        let names: Vec<&str> = report.boards.iter().map(|b| b.folder_name.as_str()).collect();
        assert_eq!(names, vec!["MatekH743", "Alpha", "zeta"]);
        assert_eq!(report.total_boards, 3);
        assert_eq!(report.priority_boards, 1);
        assert_eq!(report.skipped_bootloader, 1);
        assert_eq!(
            report.failures,
            vec![BoardFailure {
                board: "Broken".to_string(),
                message: "boom".to_string()
            }]
        );
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].board, "Broken");
    }

    #[test]
    fn test_summary_rows() {
        let report = BatchReport::from_outcomes(outcomes());
        let rows = report.summary_rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].uart_count, 2);
        assert!(rows[0].is_priority);
        assert!(!rows[0].osd);
    }

    #[test]
    fn test_save_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out").join("boards.json");

        let report = BatchReport::from_outcomes(outcomes());
        report.save(&path).unwrap();

        let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["totalBoards"], 3);
        assert_eq!(json["boards"][0]["folderName"], "MatekH743");
        assert_eq!(json["boards"][0]["uarts"][1]["uartName"], "USART1");

        let reloaded = BatchReport::from_file(&path).unwrap();
        assert_eq!(reloaded.boards, report.boards);
    }
}

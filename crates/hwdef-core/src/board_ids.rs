//! Symbolic board ID table (`board_types.txt`)
//!
//! One `NAME NUMBER` pair per line, `#` comments and blank lines ignored.

use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

use crate::board::BoardDescription;

#[derive(Error, Debug)]
pub enum BoardIdError {
    #[error("Failed to read board ID table: {0}")]
    IoError(#[from] std::io::Error),
}

/// Maps names like `AP_HW_MATEKH743` to their numeric APJ board ID
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardIdTable {
    ids: HashMap<String, u32>,
}

impl BoardIdTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the table from a file
    pub fn from_file(path: &Path) -> Result<Self, BoardIdError> {
        let content = std::fs::read_to_string(path)?;
        let table = Self::parse(&content);
        info!(path = %path.display(), count = table.len(), "Loaded board ID table");
        Ok(table)
    }

    /// Parse table text. Lines without a numeric second field are skipped.
    pub fn parse(content: &str) -> Self {
        let mut ids = HashMap::new();
        for line in content.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.split_whitespace();
            let (Some(name), Some(value)) = (parts.next(), parts.next()) else {
                continue;
            };
            match value.parse::<u32>() {
                Ok(id) => {
                    ids.insert(name.to_string(), id);
                }
                Err(_) => debug!(line, "Skipping board ID line with non-numeric value"),
            }
        }
        Self { ids }
    }

    pub fn get(&self, name: &str) -> Option<u32> {
        self.ids.get(name).copied()
    }

    pub fn insert(&mut self, name: impl Into<String>, id: u32) {
        self.ids.insert(name.into(), id);
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Fill in the numeric board ID from the symbolic name when it was not
    /// given directly: table lookup first, then the name itself as a number.
    pub fn resolve(&self, board: &mut BoardDescription) {
        if board.apj_board_id.is_some() || board.apj_board_id_name.is_empty() {
            return;
        }
        board.apj_board_id = self
            .get(&board.apj_board_id_name)
            .or_else(|| board.apj_board_id_name.parse().ok());
    }
}

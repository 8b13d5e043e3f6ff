//! Symbol grid produced by one spin

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::symbols::Symbol;

/// Spin grid stored column-major: `columns[reel][row]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grid {
    columns: Vec<Vec<Symbol>>,
}

impl Grid {
    /// Build from reels (columns)
    pub fn from_columns(columns: Vec<Vec<Symbol>>) -> Self {
        Self { columns }
    }

    /// Build from visible rows, top to bottom
    pub fn from_rows(rows: &[Vec<Symbol>]) -> Self {
        let reels = rows.first().map(Vec::len).unwrap_or(0);
        let columns = (0..reels)
            .map(|reel| rows.iter().filter_map(|row| row.get(reel).copied()).collect())
            .collect();
        Self { columns }
    }

    pub fn columns(&self) -> &[Vec<Symbol>] {
        &self.columns
    }

    pub fn reel_count(&self) -> usize {
        self.columns.len()
    }

    /// Rows of the shortest reel
    pub fn row_count(&self) -> usize {
        self.columns.iter().map(Vec::len).min().unwrap_or(0)
    }

    pub fn get(&self, reel: usize, row: usize) -> Option<Symbol> {
        self.columns.get(reel).and_then(|c| c.get(row)).copied()
    }

    /// Symbols across all reels at `row`
    pub fn row(&self, row: usize) -> Vec<Symbol> {
        self.columns.iter().filter_map(|c| c.get(row).copied()).collect()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.row_count() {
            let cells: Vec<&str> = self.row(row).iter().map(Symbol::label).collect();
            writeln!(f, "{}", cells.join(" | "))?;
        }
        Ok(())
    }
}

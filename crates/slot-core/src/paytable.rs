//! Payline evaluation

use serde::{Deserialize, Serialize};

use crate::grid::Grid;
use crate::symbols::{Symbol, SymbolTable};

/// One checked payline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineCheck {
    /// Payline number (1-based)
    pub line: u32,
    /// Symbols read left to right, up to and including the first mismatch
    pub symbols: Vec<Symbol>,
    /// Matched symbol when the line wins
    pub winning_symbol: Option<Symbol>,
    /// value × bet-per-line (saturating), 0 when lost
    pub payout: u64,
}

impl LineCheck {
    pub fn is_win(&self) -> bool {
        self.winning_symbol.is_some()
    }
}

/// Result of evaluating a grid
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Total win amount
    pub total_winnings: u64,
    /// Winning payline numbers, ascending
    pub winning_lines: Vec<u32>,
    /// Every checked line, in order
    pub lines: Vec<LineCheck>,
}

impl Evaluation {
    pub fn is_win(&self) -> bool {
        !self.winning_lines.is_empty()
    }

    /// Checked rows as displayed after a spin
    pub fn checked_rows(&self) -> Vec<Vec<Symbol>> {
        self.lines.iter().map(|l| l.symbols.clone()).collect()
    }
}

/// Straight-line paytable over a symbol value table
#[derive(Debug, Clone, Copy)]
pub struct PayTable<'a> {
    symbols: &'a SymbolTable,
}

impl<'a> PayTable<'a> {
    pub fn new(symbols: &'a SymbolTable) -> Self {
        Self { symbols }
    }

    /// Total winnings and winning line numbers
    pub fn evaluate(&self, grid: &Grid, active_lines: u32, bet_per_line: u64) -> (u64, Vec<u32>) {
        let eval = self.evaluate_detailed(grid, active_lines, bet_per_line);
        (eval.total_winnings, eval.winning_lines)
    }

    /// Full evaluation including the symbols read on each line
    ///
    /// Line `L` reads row `L - 1` on every reel and wins when all reels show
    /// the symbol of the first reel. Lines past the grid's last row are not
    /// checked.
    pub fn evaluate_detailed(&self, grid: &Grid, active_lines: u32, bet_per_line: u64) -> Evaluation {
        let mut eval = Evaluation::default();
        let checkable = active_lines.min(grid.row_count() as u32);

        for line in 1..=checkable {
            if let Some(check) = self.check_line(grid, line, bet_per_line) {
                if check.is_win() {
                    eval.total_winnings = eval.total_winnings.saturating_add(check.payout);
                    eval.winning_lines.push(line);
                }
                eval.lines.push(check);
            }
        }

        eval
    }

    fn check_line(&self, grid: &Grid, line: u32, bet_per_line: u64) -> Option<LineCheck> {
        let row = (line - 1) as usize;
        let first = grid.get(0, row)?;

        let mut symbols = Vec::with_capacity(grid.reel_count());
        let mut matched = true;
        for column in grid.columns() {
            let symbol = column[row];
            symbols.push(symbol);
            if symbol != first {
                matched = false;
                break;
            }
        }

        let (winning_symbol, payout) = if matched {
            (Some(first), self.symbols.value(first).saturating_mul(bet_per_line))
        } else {
            (None, 0)
        };

        Some(LineCheck {
            line,
            symbols,
            winning_symbol,
            payout,
        })
    }
}

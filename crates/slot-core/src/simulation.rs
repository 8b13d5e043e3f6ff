//! Headless batch simulation

use std::collections::BTreeMap;
use std::fmt;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::config::MachineConfig;
use crate::error::{ConfigError, SlotError, SlotResult};
use crate::paytable::PayTable;
use crate::spin::SpinPolicy;
use crate::symbols::Symbol;

/// Aggregate results of a batch run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub policy: String,
    pub seed: u64,
    pub spins: u64,
    pub lines: u32,
    pub bet_per_line: u64,
    pub total_wagered: u64,
    pub total_winnings: u64,
    pub winning_spins: u64,
    pub max_win: u64,
    /// Hits per payline, index 0 = line 1
    pub line_hits: Vec<u64>,
    /// Cells showing each symbol across all grids
    pub symbol_cells: BTreeMap<Symbol, u64>,
}

impl SimulationReport {
    /// Return to player, in percent
    pub fn rtp(&self) -> f64 {
        if self.total_wagered > 0 {
            (self.total_winnings as f64 / self.total_wagered as f64) * 100.0
        } else {
            0.0
        }
    }

    pub fn hit_rate(&self) -> f64 {
        if self.spins > 0 {
            (self.winning_spins as f64 / self.spins as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Share of all drawn cells that showed `symbol`
    pub fn symbol_frequency(&self, symbol: Symbol) -> f64 {
        let total: u64 = self.symbol_cells.values().sum();
        if total == 0 {
            return 0.0;
        }
        self.symbol_cells.get(&symbol).copied().unwrap_or(0) as f64 / total as f64
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Policy:        {}", self.policy)?;
        writeln!(f, "Seed:          {}", self.seed)?;
        writeln!(f, "Spins:         {}", self.spins)?;
        writeln!(f, "Lines x bet:   {} x ${}", self.lines, self.bet_per_line)?;
        writeln!(f, "Wagered:       ${}", self.total_wagered)?;
        writeln!(f, "Won:           ${}", self.total_winnings)?;
        writeln!(f, "RTP:           {:.2}%", self.rtp())?;
        writeln!(f, "Hit rate:      {:.2}%", self.hit_rate())?;
        writeln!(f, "Max win:       ${}", self.max_win)?;
        for (i, hits) in self.line_hits.iter().enumerate() {
            writeln!(f, "Line {} hits:   {}", i + 1, hits)?;
        }
        for symbol in self.symbol_cells.keys() {
            writeln!(
                f,
                "Symbol {}:      {:.2}%",
                symbol,
                self.symbol_frequency(*symbol) * 100.0
            )?;
        }
        Ok(())
    }
}

/// Seeded batch simulator
pub struct Simulator {
    config: MachineConfig,
    policy: Box<dyn SpinPolicy>,
    rng: ChaCha8Rng,
    seed: u64,
}

impl Simulator {
    pub fn new(config: MachineConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let policy = config.policy.build();
        Ok(Self {
            config,
            policy,
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        })
    }

    /// Run `spins` spins at a fixed line count and bet
    pub fn run(&mut self, spins: u64, lines: u32, bet_per_line: u64) -> SlotResult<SimulationReport> {
        let limits = self.config.limits;
        if !limits.lines_in_range(lines) {
            return Err(SlotError::InvalidLineCount {
                input: lines.to_string(),
                max: limits.max_lines,
            });
        }
        if !limits.bet_in_range(bet_per_line) {
            return Err(SlotError::InvalidBetAmount {
                input: bet_per_line.to_string(),
                min: limits.min_bet,
                max: limits.max_bet,
            });
        }

        let paytable = PayTable::new(&self.config.symbols);
        let total_bet = lines as u64 * bet_per_line;
        let mut report = SimulationReport {
            policy: self.policy.name().to_string(),
            seed: self.seed,
            spins,
            lines,
            bet_per_line,
            total_wagered: 0,
            total_winnings: 0,
            winning_spins: 0,
            max_win: 0,
            line_hits: vec![0; lines as usize],
            symbol_cells: self.config.symbols.keys().into_iter().map(|s| (s, 0)).collect(),
        };

        log::info!(
            "Simulating {} spins ({} policy, {} lines x {})",
            spins,
            report.policy,
            lines,
            bet_per_line
        );

        for _ in 0..spins {
            let grid = self
                .policy
                .generate(self.config.grid, &self.config.symbols, &mut self.rng)?;
            let eval = paytable.evaluate_detailed(&grid, lines, bet_per_line);

            report.total_wagered = report.total_wagered.saturating_add(total_bet);
            report.total_winnings = report.total_winnings.saturating_add(eval.total_winnings);
            report.max_win = report.max_win.max(eval.total_winnings);
            if eval.is_win() {
                report.winning_spins += 1;
            }
            for line in &eval.winning_lines {
                report.line_hits[(*line - 1) as usize] += 1;
            }
            for symbol in grid.columns().iter().flatten() {
                *report.symbol_cells.entry(*symbol).or_insert(0) += 1;
            }
        }

        log::debug!("Simulation finished: RTP {:.2}%", report.rtp());
        Ok(report)
    }
}

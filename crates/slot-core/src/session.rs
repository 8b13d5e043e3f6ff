//! Player session: balance, settings and spin sequencing

use std::fmt;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::config::MachineConfig;
use crate::error::{ConfigError, SlotError, SlotResult};
use crate::grid::Grid;
use crate::input::{Prompter, parse_whole_number, prompt_until_valid};
use crate::paytable::{LineCheck, PayTable};
use crate::spin::SpinPolicy;

/// Outcome of one accepted spin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpinOutcome {
    /// 1-based spin counter
    pub spin_number: u64,
    pub grid: Grid,
    pub lines: u32,
    pub bet_per_line: u64,
    /// lines × bet-per-line
    pub total_bet: u64,
    pub winnings: u64,
    /// Winning payline numbers, ascending
    pub winning_lines: Vec<u32>,
    /// Symbols read on each active line
    pub checked_lines: Vec<LineCheck>,
    /// Balance after settling this spin
    pub balance: u64,
}

impl SpinOutcome {
    pub fn is_win(&self) -> bool {
        self.winnings > 0
    }

    /// Net balance change (may be negative)
    pub fn net(&self) -> i128 {
        self.winnings as i128 - self.total_bet as i128
    }
}

impl fmt::Display for SpinOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "You won ${}.", self.winnings)?;
        if !self.winning_lines.is_empty() {
            let lines: Vec<String> = self.winning_lines.iter().map(u32::to_string).collect();
            write!(f, " You won on line(s): {}", lines.join(", "))?;
        }
        Ok(())
    }
}

/// Session statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub total_spins: u64,
    pub total_wagered: u64,
    pub total_winnings: u64,
    pub winning_spins: u64,
}

impl SessionStats {
    /// Return to player, in percent
    pub fn rtp(&self) -> f64 {
        if self.total_wagered > 0 {
            (self.total_winnings as f64 / self.total_wagered as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Share of spins that won something, in percent
    pub fn hit_rate(&self) -> f64 {
        if self.total_spins > 0 {
            (self.winning_spins as f64 / self.total_spins as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// Read-only view for rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub balance: u64,
    pub lines: u32,
    pub bet: u64,
    pub total_spins: u64,
    pub total_winnings: u64,
    pub last_grid: Option<Grid>,
    pub last_winning_lines: Vec<u32>,
}

/// Slot session
///
/// Owns every piece of mutable game state. Each operation either applies in
/// full or returns an error and leaves the session untouched.
pub struct SlotSession<R: RngCore = StdRng> {
    config: MachineConfig,
    policy: Box<dyn SpinPolicy>,
    rng: R,
    balance: u64,
    lines: u32,
    bet: u64,
    stats: SessionStats,
    last: Option<SpinOutcome>,
}

impl SlotSession<StdRng> {
    /// Session drawing from an OS-seeded generator
    pub fn new(config: MachineConfig) -> Result<Self, ConfigError> {
        Self::with_rng(config, StdRng::from_os_rng())
    }
}

impl SlotSession<ChaCha8Rng> {
    /// Reproducible session for a given seed
    pub fn seeded(config: MachineConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(config, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: RngCore> SlotSession<R> {
    /// Session with an injected random source
    pub fn with_rng(config: MachineConfig, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        let policy = config.policy.build();
        let balance = config.starting_balance;
        let bet = config.limits.min_bet;

        log::debug!(
            "New session: {}x{} grid, policy {}, balance {}",
            config.grid.reels,
            config.grid.rows,
            policy.name(),
            balance
        );

        Ok(Self {
            config,
            policy,
            rng,
            balance,
            lines: 1,
            bet,
            stats: SessionStats::default(),
            last: None,
        })
    }

    /// Replace the draw policy
    pub fn with_policy(mut self, policy: Box<dyn SpinPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    pub fn balance(&self) -> u64 {
        self.balance
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn bet(&self) -> u64 {
        self.bet
    }

    /// Cost of the next spin
    pub fn total_bet(&self) -> u64 {
        (self.lines as u64).saturating_mul(self.bet)
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn last_outcome(&self) -> Option<&SpinOutcome> {
        self.last.as_ref()
    }

    pub fn state(&self) -> SessionSnapshot {
        SessionSnapshot {
            balance: self.balance,
            lines: self.lines,
            bet: self.bet,
            total_spins: self.stats.total_spins,
            total_winnings: self.stats.total_winnings,
            last_grid: self.last.as_ref().map(|o| o.grid.clone()),
            last_winning_lines: self
                .last
                .as_ref()
                .map(|o| o.winning_lines.clone())
                .unwrap_or_default(),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SETTINGS
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn set_lines(&mut self, lines: u32) -> SlotResult<()> {
        if !self.config.limits.lines_in_range(lines) {
            return Err(self.invalid_lines(lines.to_string()));
        }
        self.lines = lines;
        Ok(())
    }

    pub fn set_bet(&mut self, bet: u64) -> SlotResult<()> {
        if !self.config.limits.bet_in_range(bet) {
            return Err(self.invalid_bet(bet.to_string()));
        }
        self.bet = bet;
        Ok(())
    }

    /// Add funds, returning the new balance
    pub fn add_funds(&mut self, amount: i64) -> SlotResult<u64> {
        if amount <= 0 {
            return Err(SlotError::InvalidTopUpAmount {
                input: amount.to_string(),
            });
        }
        self.credit(amount as u64, amount.to_string())
    }

    pub fn set_lines_input(&mut self, raw: &str) -> SlotResult<()> {
        let lines = parse_whole_number(raw)
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| self.invalid_lines(raw.trim().to_string()))?;
        self.set_lines(lines)
    }

    pub fn set_bet_input(&mut self, raw: &str) -> SlotResult<()> {
        let bet = parse_whole_number(raw).ok_or_else(|| self.invalid_bet(raw.trim().to_string()))?;
        self.set_bet(bet)
    }

    pub fn add_funds_input(&mut self, raw: &str) -> SlotResult<u64> {
        match parse_whole_number(raw) {
            Some(amount) if amount > 0 => self.credit(amount, raw.trim().to_string()),
            _ => Err(SlotError::InvalidTopUpAmount {
                input: raw.trim().to_string(),
            }),
        }
    }

    /// Ask for a line count until a valid one is entered
    pub fn prompt_lines<P: Prompter + ?Sized>(&mut self, prompter: &mut P) -> Option<u32> {
        let prompt = format!(
            "Enter the number of lines to bet on (1-{}):",
            self.config.limits.max_lines
        );
        prompt_until_valid(prompter, &prompt, |raw| {
            self.set_lines_input(raw).map(|()| self.lines)
        })
    }

    /// Ask for a bet-per-line until a valid one is entered
    pub fn prompt_bet<P: Prompter + ?Sized>(&mut self, prompter: &mut P) -> Option<u64> {
        let prompt = format!(
            "Enter the bet per line ({}-{}):",
            self.config.limits.min_bet, self.config.limits.max_bet
        );
        prompt_until_valid(prompter, &prompt, |raw| {
            self.set_bet_input(raw).map(|()| self.bet)
        })
    }

    /// Ask for a top-up amount until a valid one is entered
    pub fn prompt_top_up<P: Prompter + ?Sized>(&mut self, prompter: &mut P) -> Option<u64> {
        prompt_until_valid(prompter, "Enter amount to add:", |raw| self.add_funds_input(raw))
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SPIN EXECUTION
    // ═══════════════════════════════════════════════════════════════════════════

    /// Charge the bet, spin, evaluate and settle
    pub fn spin(&mut self) -> SlotResult<SpinOutcome> {
        let total_bet = self.total_bet();
        if total_bet > self.balance {
            log::warn!(
                "Spin rejected: total bet {} exceeds balance {}",
                total_bet,
                self.balance
            );
            return Err(SlotError::InsufficientBalance {
                required: total_bet,
                balance: self.balance,
            });
        }

        let grid = self
            .policy
            .generate(self.config.grid, &self.config.symbols, &mut self.rng)?;
        let eval = PayTable::new(&self.config.symbols).evaluate_detailed(&grid, self.lines, self.bet);

        // Settle before mutating
        let balance = (self.balance - total_bet)
            .checked_add(eval.total_winnings)
            .ok_or(SlotError::BalanceOverflow {
                balance: self.balance,
                required: total_bet,
                winnings: eval.total_winnings,
            })?;

        self.balance = balance;
        self.stats.total_spins += 1;
        self.stats.total_wagered = self.stats.total_wagered.saturating_add(total_bet);
        self.stats.total_winnings = self.stats.total_winnings.saturating_add(eval.total_winnings);
        if eval.is_win() {
            self.stats.winning_spins += 1;
        }

        let outcome = SpinOutcome {
            spin_number: self.stats.total_spins,
            grid,
            lines: self.lines,
            bet_per_line: self.bet,
            total_bet,
            winnings: eval.total_winnings,
            winning_lines: eval.winning_lines,
            checked_lines: eval.lines,
            balance: self.balance,
        };

        log::debug!(
            "Spin {}: bet {}, won {} on {:?}, balance {}",
            outcome.spin_number,
            total_bet,
            outcome.winnings,
            outcome.winning_lines,
            self.balance
        );

        self.last = Some(outcome.clone());
        Ok(outcome)
    }

    fn credit(&mut self, amount: u64, input: String) -> SlotResult<u64> {
        let balance = self
            .balance
            .checked_add(amount)
            .ok_or(SlotError::InvalidTopUpAmount { input })?;
        self.balance = balance;
        log::info!("Added ${amount}, balance is now ${balance}");
        Ok(balance)
    }

    fn invalid_lines(&self, input: String) -> SlotError {
        SlotError::InvalidLineCount {
            input,
            max: self.config.limits.max_lines,
        }
    }

    fn invalid_bet(&self, input: String) -> SlotError {
        SlotError::InvalidBetAmount {
            input,
            min: self.config.limits.min_bet,
            max: self.config.limits.max_bet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GridSpec;
    use crate::error::SpinError;
    use crate::input::ScriptedPrompter;
    use crate::symbols::{Symbol, SymbolTable};
    use Symbol::*;

    /// Always returns the same grid
    struct FixedGrid(Grid);

    impl SpinPolicy for FixedGrid {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn generate(
            &self,
            _spec: GridSpec,
            _symbols: &SymbolTable,
            _rng: &mut dyn RngCore,
        ) -> Result<Grid, SpinError> {
            Ok(self.0.clone())
        }
    }

    fn session(balance: u64) -> SlotSession<ChaCha8Rng> {
        let config = MachineConfig {
            starting_balance: balance,
            ..MachineConfig::default()
        };
        SlotSession::seeded(config, 1).unwrap()
    }

    #[test]
    fn test_defaults() {
        let s = session(0);
        assert_eq!(s.balance(), 0);
        assert_eq!(s.lines(), 1);
        assert_eq!(s.bet(), 1);
        assert!(s.state().last_grid.is_none());
    }

    #[test]
    fn test_line_bounds() {
        let mut s = session(0);
        assert!(matches!(s.set_lines(0), Err(SlotError::InvalidLineCount { .. })));
        assert!(matches!(s.set_lines(4), Err(SlotError::InvalidLineCount { .. })));
        assert_eq!(s.lines(), 1);
        s.set_lines(3).unwrap();
        assert_eq!(s.lines(), 3);
    }

    #[test]
    fn test_bet_bounds() {
        let mut s = session(0);
        assert!(matches!(s.set_bet(0), Err(SlotError::InvalidBetAmount { .. })));
        assert!(matches!(s.set_bet(1001), Err(SlotError::InvalidBetAmount { .. })));
        s.set_bet(1000).unwrap();
        assert_eq!(s.bet(), 1000);
    }

    #[test]
    fn test_text_inputs() {
        let mut s = session(0);
        assert!(s.set_lines_input("two").is_err());
        assert!(s.set_lines_input("99999999999").is_err());
        s.set_lines_input(" 2 ").unwrap();
        assert_eq!(s.lines(), 2);

        assert!(s.set_bet_input("-3").is_err());
        s.set_bet_input("25").unwrap();
        assert_eq!(s.bet(), 25);

        assert!(s.add_funds_input("0").is_err());
        assert!(s.add_funds_input("5.0").is_err());
        assert_eq!(s.add_funds_input("40"), Ok(40));
    }

    #[test]
    fn test_add_funds_overflow_rejected() {
        let mut s = session(u64::MAX - 1);
        assert!(matches!(s.add_funds(5), Err(SlotError::InvalidTopUpAmount { .. })));
        assert_eq!(s.balance(), u64::MAX - 1);
    }

    #[test]
    fn test_spin_overflowing_balance_is_rejected() {
        let grid = Grid::from_rows(&[vec![A, A, A], vec![B, C, D], vec![C, D, A]]);
        let mut s = session(u64::MAX - 1).with_policy(Box::new(FixedGrid(grid)));
        s.set_bet(10).unwrap();
        let before = s.state();

        let err = s.spin().unwrap_err();
        assert_eq!(
            err,
            SlotError::BalanceOverflow {
                balance: u64::MAX - 1,
                required: 10,
                winnings: 50,
            }
        );
        assert_eq!(s.state(), before);
        assert_eq!(s.stats().total_wagered, 0);
    }

    #[test]
    fn test_losing_spin_near_max_balance_settles() {
        let grid = Grid::from_rows(&[vec![A, B, C], vec![B, C, D], vec![C, D, A]]);
        let mut s = session(u64::MAX).with_policy(Box::new(FixedGrid(grid)));
        let outcome = s.spin().unwrap();
        assert_eq!(outcome.balance, u64::MAX - 1);
    }

    #[test]
    fn test_losing_spin_charges_bet() {
        let grid = Grid::from_rows(&[vec![A, B, C], vec![B, C, D], vec![C, D, A]]);
        let mut s = session(100).with_policy(Box::new(FixedGrid(grid.clone())));
        s.set_lines(3).unwrap();
        s.set_bet(5).unwrap();

        let outcome = s.spin().unwrap();
        assert_eq!(outcome.winnings, 0);
        assert_eq!(outcome.net(), -15);
        assert_eq!(outcome.to_string(), "You won $0.");
        assert_eq!(s.balance(), 85);

        let state = s.state();
        assert_eq!(state.total_spins, 1);
        assert_eq!(state.last_grid, Some(grid));
        assert!(state.last_winning_lines.is_empty());
    }

    #[test]
    fn test_winning_spin_message() {
        let grid = Grid::from_rows(&[vec![D, D, D], vec![B, C, D], vec![C, C, C]]);
        let mut s = session(100).with_policy(Box::new(FixedGrid(grid)));
        s.set_lines(3).unwrap();

        let outcome = s.spin().unwrap();
        assert_eq!(outcome.winnings, 2 + 3);
        assert_eq!(outcome.to_string(), "You won $5. You won on line(s): 1, 3");
        assert_eq!(s.balance(), 100 - 3 + 5);
        assert_eq!(s.stats().winning_spins, 1);
    }

    #[test]
    fn test_stats_rtp() {
        let stats = SessionStats {
            total_spins: 4,
            total_wagered: 200,
            total_winnings: 150,
            winning_spins: 1,
        };
        assert!((stats.rtp() - 75.0).abs() < 1e-9);
        assert!((stats.hit_rate() - 25.0).abs() < 1e-9);
        assert_eq!(SessionStats::default().rtp(), 0.0);
    }

    #[test]
    fn test_prompt_lines_retries() {
        let mut s = session(0);
        let mut prompter = ScriptedPrompter::new(["0", "x", "4", "2"]);
        assert_eq!(s.prompt_lines(&mut prompter), Some(2));
        assert_eq!(prompter.rejections.len(), 3);
        assert_eq!(prompter.prompts[0], "Enter the number of lines to bet on (1-3):");
        assert_eq!(s.lines(), 2);
    }

    #[test]
    fn test_prompt_cancel_commits_nothing() {
        let mut s = session(10);
        let mut prompter = ScriptedPrompter::new(["abc"]);
        assert_eq!(s.prompt_top_up(&mut prompter), None);
        assert_eq!(s.balance(), 10);

        let mut prompter = ScriptedPrompter::new(Vec::<String>::new());
        assert_eq!(s.prompt_bet(&mut prompter), None);
        assert_eq!(s.bet(), 1);
    }
}

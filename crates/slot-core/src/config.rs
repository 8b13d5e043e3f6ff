//! Machine configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::spin::PolicyKind;
use crate::symbols::SymbolTable;

/// Grid specification (reels × rows)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSpec {
    /// Number of reels (columns)
    pub reels: usize,
    /// Number of visible rows per reel
    pub rows: usize,
}

impl GridSpec {
    /// Classic 3×3
    pub fn classic_3x3() -> Self {
        Self { reels: 3, rows: 3 }
    }

    /// Total grid positions
    pub fn total_positions(&self) -> usize {
        self.reels * self.rows
    }
}

impl Default for GridSpec {
    fn default() -> Self {
        Self::classic_3x3()
    }
}

/// Line and bet bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetLimits {
    pub max_lines: u32,
    pub min_bet: u64,
    pub max_bet: u64,
}

impl BetLimits {
    pub fn lines_in_range(&self, lines: u32) -> bool {
        (1..=self.max_lines).contains(&lines)
    }

    pub fn bet_in_range(&self, bet: u64) -> bool {
        (self.min_bet..=self.max_bet).contains(&bet)
    }
}

impl Default for BetLimits {
    fn default() -> Self {
        Self {
            max_lines: 3,
            min_bet: 1,
            max_bet: 1000,
        }
    }
}

/// Complete machine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    pub grid: GridSpec,
    pub limits: BetLimits,
    pub symbols: SymbolTable,
    pub policy: PolicyKind,
    /// Balance a new session starts with
    pub starting_balance: u64,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            grid: GridSpec::default(),
            limits: BetLimits::default(),
            symbols: SymbolTable::reference(),
            policy: PolicyKind::UniformKeys,
            starting_balance: 0,
        }
    }
}

impl MachineConfig {
    /// Reference machine with an explicit draw policy
    pub fn with_policy(policy: PolicyKind) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Parse and validate a JSON config
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a YAML config
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.json`, `.yaml` or `.yml` file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        let text = std::fs::read_to_string(path)?;

        let config = match ext.as_str() {
            "json" => Self::from_json_str(&text)?,
            "yaml" | "yml" => Self::from_yaml_str(&text)?,
            other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
        };
        log::debug!("Loaded machine config from {}", path.display());
        Ok(config)
    }

    /// Check structural invariants
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Validation(msg));

        if self.grid.reels == 0 || self.grid.rows == 0 {
            return invalid(format!(
                "grid must be at least 1x1, got {}x{}",
                self.grid.reels, self.grid.rows
            ));
        }

        if self.symbols.is_empty() {
            return invalid("symbol table is empty".into());
        }

        let mut seen = Vec::with_capacity(self.symbols.len());
        for def in self.symbols.entries() {
            if def.weight == 0 {
                return invalid(format!("symbol {} has zero weight", def.symbol));
            }
            if seen.contains(&def.symbol) {
                return invalid(format!("symbol {} listed twice", def.symbol));
            }
            seen.push(def.symbol);
        }

        let limits = &self.limits;
        if limits.max_lines == 0 || limits.max_lines as usize > self.grid.rows {
            return invalid(format!(
                "max_lines must be within 1-{}, got {}",
                self.grid.rows, limits.max_lines
            ));
        }
        if limits.min_bet == 0 || limits.min_bet > limits.max_bet {
            return invalid(format!(
                "bet range {}-{} is empty or starts at zero",
                limits.min_bet, limits.max_bet
            ));
        }

        // Largest possible spin payout must fit in a balance
        let max_value = self.symbols.entries().iter().map(|d| d.value).max().unwrap_or(0);
        let max_payout = max_value
            .checked_mul(limits.max_bet)
            .and_then(|v| v.checked_mul(limits.max_lines as u64));
        if max_payout.is_none() {
            return invalid(format!(
                "top payout {} x bet {} x {} lines overflows",
                max_value, limits.max_bet, limits.max_lines
            ));
        }

        if self.policy == PolicyKind::WeightedPool && self.grid.rows > self.symbols.total_weight() {
            return invalid(format!(
                "weighted-pool needs rows ({}) <= total weight ({})",
                self.grid.rows,
                self.symbols.total_weight()
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::{Symbol, SymbolDef};

    #[test]
    fn test_default_is_reference_machine() {
        let config = MachineConfig::default();
        assert_eq!(config.grid, GridSpec { reels: 3, rows: 3 });
        assert_eq!(config.limits.max_lines, 3);
        assert_eq!(config.limits.min_bet, 1);
        assert_eq!(config.limits.max_bet, 1000);
        assert_eq!(config.starting_balance, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_limits_ranges() {
        let limits = BetLimits::default();
        assert!(!limits.lines_in_range(0));
        assert!(limits.lines_in_range(3));
        assert!(!limits.lines_in_range(4));
        assert!(!limits.bet_in_range(0));
        assert!(limits.bet_in_range(1000));
        assert!(!limits.bet_in_range(1001));
    }

    #[test]
    fn test_validate_rejects_more_lines_than_rows() {
        let mut config = MachineConfig::default();
        config.limits.max_lines = 4;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_validate_rejects_small_pool() {
        let mut config = MachineConfig::with_policy(PolicyKind::WeightedPool);
        config.symbols = SymbolTable::new(vec![SymbolDef::new(Symbol::A, 2, 5)]);
        assert!(config.validate().is_err());

        // Same table is fine when drawing with replacement
        config.policy = PolicyKind::UniformKeys;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_duplicate_and_zero_weight() {
        let mut config = MachineConfig::default();
        config.symbols = SymbolTable::new(vec![
            SymbolDef::new(Symbol::A, 2, 5),
            SymbolDef::new(Symbol::A, 3, 5),
        ]);
        assert!(config.validate().is_err());

        config.symbols = SymbolTable::new(vec![SymbolDef::new(Symbol::B, 0, 4)]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_overflowing_payout() {
        let json = r#"{"symbols": [{"symbol": "A", "weight": 1, "value": 18446744073709551615}]}"#;
        assert!(matches!(
            MachineConfig::from_json_str(json),
            Err(ConfigError::Validation(_))
        ));

        // Exactly at the limit is still accepted
        let mut config = MachineConfig::default();
        config.limits.max_lines = 1;
        config.limits.max_bet = 1;
        config.symbols = SymbolTable::new(vec![SymbolDef::new(Symbol::A, 3, u64::MAX)]);
        assert!(config.validate().is_ok());

        config.limits.max_bet = 2;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = MachineConfig::from_json_str(r#"{"policy": "weighted-pool", "starting_balance": 250}"#)
            .unwrap();
        assert_eq!(config.policy, PolicyKind::WeightedPool);
        assert_eq!(config.starting_balance, 250);
        assert_eq!(config.symbols, SymbolTable::reference());
    }
}

//! Symbol definitions and the weight/value table

use std::fmt;

use serde::{Deserialize, Serialize};

/// Reel symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Symbol {
    A = 0,
    B = 1,
    C = 2,
    D = 3,
}

impl Symbol {
    /// All symbols, highest paying first
    pub const ALL: [Symbol; 4] = [Symbol::A, Symbol::B, Symbol::C, Symbol::D];

    /// Single-letter label used on screen
    pub fn label(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of the symbol table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolDef {
    pub symbol: Symbol,
    /// Population weight (copies in the weighted draw pool)
    pub weight: u32,
    /// Payout multiplier applied to the bet-per-line on a winning line
    pub value: u64,
}

impl SymbolDef {
    pub fn new(symbol: Symbol, weight: u32, value: u64) -> Self {
        Self {
            symbol,
            weight,
            value,
        }
    }
}

/// Symbol table: population weights and payout values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolTable {
    entries: Vec<SymbolDef>,
}

impl SymbolTable {
    pub fn new(entries: Vec<SymbolDef>) -> Self {
        Self { entries }
    }

    /// Reference machine: rarer symbols pay more
    pub fn reference() -> Self {
        Self::new(vec![
            SymbolDef::new(Symbol::A, 2, 5),
            SymbolDef::new(Symbol::B, 4, 4),
            SymbolDef::new(Symbol::C, 6, 3),
            SymbolDef::new(Symbol::D, 8, 2),
        ])
    }

    pub fn entries(&self) -> &[SymbolDef] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, symbol: Symbol) -> Option<&SymbolDef> {
        self.entries.iter().find(|d| d.symbol == symbol)
    }

    /// Distinct symbol keys in table order
    pub fn keys(&self) -> Vec<Symbol> {
        self.entries.iter().map(|d| d.symbol).collect()
    }

    /// Payout value, 0 for symbols missing from the table
    pub fn value(&self, symbol: Symbol) -> u64 {
        self.get(symbol).map(|d| d.value).unwrap_or(0)
    }

    pub fn weight(&self, symbol: Symbol) -> u32 {
        self.get(symbol).map(|d| d.weight).unwrap_or(0)
    }

    /// Sum of all population weights
    pub fn total_weight(&self) -> usize {
        self.entries.iter().map(|d| d.weight as usize).sum()
    }

    /// Draw pool with each symbol repeated `weight` times
    pub fn pool(&self) -> Vec<Symbol> {
        let mut pool = Vec::with_capacity(self.total_weight());
        for def in &self.entries {
            pool.extend(std::iter::repeat_n(def.symbol, def.weight as usize));
        }
        pool
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::reference()
    }
}

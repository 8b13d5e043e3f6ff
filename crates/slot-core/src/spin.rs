//! Spin generation policies
//!
//! Two draw policies exist for the same machine:
//!
//! - [`UniformKeys`] draws every cell independently from the distinct symbol
//!   keys. Population weights are ignored.
//! - [`WeightedPool`] builds a pool holding each symbol `weight` times and
//!   draws each reel without replacement from its own fresh copy of the pool.
//!
//! Note that [`WeightedPool`] caps symbol counts per reel, not per grid. A
//! table reading "2 of A" still allows up to two A on every reel of the same
//! spin.

use rand::RngCore;
use rand::seq::{IndexedRandom, SliceRandom};
use serde::{Deserialize, Serialize};

use crate::config::GridSpec;
use crate::error::SpinError;
use crate::grid::Grid;
use crate::symbols::SymbolTable;

/// Strategy producing a fresh grid for one spin
pub trait SpinPolicy {
    /// Short identifier for logs
    fn name(&self) -> &'static str;

    /// Produce `spec.reels` reels of `spec.rows` symbols each
    fn generate(
        &self,
        spec: GridSpec,
        symbols: &SymbolTable,
        rng: &mut dyn RngCore,
    ) -> Result<Grid, SpinError>;
}

/// With replacement, uniform over distinct symbol keys
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformKeys;

impl SpinPolicy for UniformKeys {
    fn name(&self) -> &'static str {
        "uniform-keys"
    }

    fn generate(
        &self,
        spec: GridSpec,
        symbols: &SymbolTable,
        rng: &mut dyn RngCore,
    ) -> Result<Grid, SpinError> {
        let keys = symbols.keys();
        let mut columns = Vec::with_capacity(spec.reels);

        for _ in 0..spec.reels {
            let mut column = Vec::with_capacity(spec.rows);
            for _ in 0..spec.rows {
                let symbol = keys.choose(rng).ok_or(SpinError::EmptySymbolTable)?;
                column.push(*symbol);
            }
            columns.push(column);
        }

        Ok(Grid::from_columns(columns))
    }
}

/// Without replacement from a weighted pool, one fresh pool per reel
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedPool;

impl SpinPolicy for WeightedPool {
    fn name(&self) -> &'static str {
        "weighted-pool"
    }

    fn generate(
        &self,
        spec: GridSpec,
        symbols: &SymbolTable,
        rng: &mut dyn RngCore,
    ) -> Result<Grid, SpinError> {
        if symbols.is_empty() {
            return Err(SpinError::EmptySymbolTable);
        }
        let pool = symbols.pool();
        if spec.rows > pool.len() {
            return Err(SpinError::PoolExhausted {
                rows: spec.rows,
                pool: pool.len(),
            });
        }

        let mut columns = Vec::with_capacity(spec.reels);
        for _ in 0..spec.reels {
            let mut reel_pool = pool.clone();
            let (drawn, _) = reel_pool.partial_shuffle(rng, spec.rows);
            columns.push(drawn.to_vec());
        }

        Ok(Grid::from_columns(columns))
    }
}

/// Selectable draw policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyKind {
    /// With replacement, every symbol equally likely per cell
    #[default]
    UniformKeys,
    /// Without replacement, weighted by population, per reel
    WeightedPool,
}

impl PolicyKind {
    pub fn build(&self) -> Box<dyn SpinPolicy> {
        match self {
            Self::UniformKeys => Box::new(UniformKeys),
            Self::WeightedPool => Box::new(WeightedPool),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UniformKeys => "uniform-keys",
            Self::WeightedPool => "weighted-pool",
        }
    }
}

impl std::str::FromStr for PolicyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uniform-keys" | "with-replacement" => Ok(Self::UniformKeys),
            "weighted-pool" | "without-replacement" => Ok(Self::WeightedPool),
            other => Err(format!("unknown spin policy '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::{Symbol, SymbolDef};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn count(grid: &Grid, symbol: Symbol) -> usize {
        grid.columns().iter().flatten().filter(|&&s| s == symbol).count()
    }

    #[test]
    fn test_uniform_keys_shape() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let grid = UniformKeys
            .generate(GridSpec { reels: 5, rows: 4 }, &SymbolTable::reference(), &mut rng)
            .unwrap();
        assert_eq!(grid.reel_count(), 5);
        assert!(grid.columns().iter().all(|c| c.len() == 4));
    }

    #[test]
    fn test_uniform_keys_ignores_weights() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let table = SymbolTable::reference();
        let spec = GridSpec::classic_3x3();
        let spins = 20_000;

        let mut counts = [0usize; 4];
        for _ in 0..spins {
            let grid = UniformKeys.generate(spec, &table, &mut rng).unwrap();
            for symbol in Symbol::ALL {
                counts[symbol as usize] += count(&grid, symbol);
            }
        }

        let cells = (spins * spec.total_positions()) as f64;
        for c in counts {
            let freq = c as f64 / cells;
            assert!((freq - 0.25).abs() < 0.01, "frequency {freq} not near 1/4");
        }
    }

    #[test]
    fn test_weighted_pool_respects_weights_per_reel() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let table = SymbolTable::reference();
        let spec = GridSpec { reels: 3, rows: 10 };

        for _ in 0..500 {
            let grid = WeightedPool.generate(spec, &table, &mut rng).unwrap();
            for column in grid.columns() {
                assert_eq!(column.len(), 10);
                for def in table.entries() {
                    let n = column.iter().filter(|&&s| s == def.symbol).count();
                    assert!(n <= def.weight as usize);
                }
            }
        }
    }

    #[test]
    fn test_weighted_pool_exact_pool_is_permutation() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let table = SymbolTable::new(vec![
            SymbolDef::new(Symbol::A, 1, 5),
            SymbolDef::new(Symbol::B, 1, 4),
            SymbolDef::new(Symbol::C, 1, 3),
        ]);

        let grid = WeightedPool
            .generate(GridSpec::classic_3x3(), &table, &mut rng)
            .unwrap();
        for column in grid.columns() {
            let mut sorted = column.clone();
            sorted.sort();
            assert_eq!(sorted, vec![Symbol::A, Symbol::B, Symbol::C]);
        }
    }

    #[test]
    fn test_weighted_pool_counts_are_per_reel_not_per_grid() {
        // One A in the pool, three reels: A may land on every reel at once
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let table = SymbolTable::new(vec![
            SymbolDef::new(Symbol::A, 1, 5),
            SymbolDef::new(Symbol::B, 1, 4),
        ]);
        let spec = GridSpec { reels: 3, rows: 2 };
        let grid = WeightedPool.generate(spec, &table, &mut rng).unwrap();
        assert_eq!(count(&grid, Symbol::A), 3);
    }

    #[test]
    fn test_weighted_pool_exhausted() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let table = SymbolTable::new(vec![SymbolDef::new(Symbol::A, 2, 5)]);
        let err = WeightedPool
            .generate(GridSpec::classic_3x3(), &table, &mut rng)
            .unwrap_err();
        assert_eq!(err, SpinError::PoolExhausted { rows: 3, pool: 2 });
    }

    #[test]
    fn test_empty_table() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let table = SymbolTable::new(Vec::new());
        for kind in [PolicyKind::UniformKeys, PolicyKind::WeightedPool] {
            let err = kind
                .build()
                .generate(GridSpec::classic_3x3(), &table, &mut rng)
                .unwrap_err();
            assert_eq!(err, SpinError::EmptySymbolTable);
        }
    }

    #[test]
    fn test_seeded_generation_is_deterministic() {
        let table = SymbolTable::reference();
        for kind in [PolicyKind::UniformKeys, PolicyKind::WeightedPool] {
            let policy = kind.build();
            let mut a = ChaCha8Rng::seed_from_u64(99);
            let mut b = ChaCha8Rng::seed_from_u64(99);
            for _ in 0..50 {
                let ga = policy.generate(GridSpec::classic_3x3(), &table, &mut a).unwrap();
                let gb = policy.generate(GridSpec::classic_3x3(), &table, &mut b).unwrap();
                assert_eq!(ga, gb);
            }
        }
    }

    #[test]
    fn test_policy_kind_parse() {
        assert_eq!("weighted-pool".parse::<PolicyKind>(), Ok(PolicyKind::WeightedPool));
        assert_eq!("with-replacement".parse::<PolicyKind>(), Ok(PolicyKind::UniformKeys));
        assert!("fair".parse::<PolicyKind>().is_err());
        assert_eq!(PolicyKind::WeightedPool.build().name(), "weighted-pool");
    }
}

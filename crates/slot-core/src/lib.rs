//! # slot-core — Slot machine simulation core
//!
//! Spin generation, payline evaluation and the player session that sequences
//! them. Rendering and input handling live in the front-end; the core only
//! needs a [`Prompter`] for text entry.
//!
//! ## Architecture
//!
//! ```text
//! SlotSession
//!     │
//!     ├── MachineConfig (grid, bet limits, symbol table, policy)
//!     ├── SpinPolicy    (UniformKeys | WeightedPool)
//!     └── PayTable      (straight-line evaluation)
//!           │
//!           v
//!     SpinOutcome → SessionSnapshot
//! ```

pub mod config;
pub mod error;
pub mod grid;
pub mod input;
pub mod paytable;
pub mod session;
pub mod simulation;
pub mod spin;
pub mod symbols;

pub use config::*;
pub use error::*;
pub use grid::*;
pub use input::*;
pub use paytable::*;
pub use session::*;
pub use simulation::*;
pub use spin::*;
pub use symbols::*;

//! Slot machine console
//!
//! Usage:
//!   slot play                 - Interactive session
//!   slot simulate --spins N   - Headless batch run

mod console;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use slot_core::{MachineConfig, PolicyKind, SlotSession, Simulator};

#[derive(Parser)]
#[command(name = "slot", about = "Three-reel slot machine", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play interactively
    Play {
        #[command(flatten)]
        machine: MachineArgs,

        /// Starting balance (overrides the config)
        #[arg(long)]
        balance: Option<u64>,

        /// Choose the line count before the first spin
        #[arg(long)]
        guided: bool,
    },
    /// Run many spins and report RTP and hit rate
    Simulate {
        #[command(flatten)]
        machine: MachineArgs,

        /// Number of spins
        #[arg(short = 'n', long, default_value_t = 100_000)]
        spins: u64,

        /// Active lines
        #[arg(short, long, default_value_t = 3)]
        lines: u32,

        /// Bet per line
        #[arg(short, long, default_value_t = 1)]
        bet: u64,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct MachineArgs {
    /// Machine config file (.json, .yaml, .yml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Symbol draw policy (overrides the config)
    #[arg(short, long, value_enum)]
    policy: Option<PolicyArg>,

    /// Random seed for reproducible spins
    #[arg(short, long)]
    seed: Option<u64>,
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    /// With replacement, every symbol equally likely
    UniformKeys,
    /// Without replacement from the weighted pool, per reel
    WeightedPool,
}

impl From<PolicyArg> for PolicyKind {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::UniformKeys => PolicyKind::UniformKeys,
            PolicyArg::WeightedPool => PolicyKind::WeightedPool,
        }
    }
}

impl MachineArgs {
    fn load(&self) -> Result<MachineConfig> {
        let mut config = match &self.config {
            Some(path) => MachineConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => MachineConfig::default(),
        };
        if let Some(policy) = self.policy {
            config.policy = policy.into();
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Play {
            machine,
            balance,
            guided,
        } => {
            let mut config = machine.load()?;
            if let Some(balance) = balance {
                config.starting_balance = balance;
            }
            match machine.seed {
                Some(seed) => {
                    let session = SlotSession::seeded(config, seed).context("invalid machine config")?;
                    console::play(session, guided)
                }
                None => {
                    let session = SlotSession::new(config).context("invalid machine config")?;
                    console::play(session, guided)
                }
            }
        }
        Commands::Simulate {
            machine,
            spins,
            lines,
            bet,
            json,
        } => {
            let config = machine.load()?;
            let seed = machine.seed.unwrap_or_else(rand::random);
            let mut simulator = Simulator::new(config, seed).context("invalid machine config")?;
            let report = simulator.run(spins, lines, bet)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{report}");
            }
            Ok(())
        }
    }
}

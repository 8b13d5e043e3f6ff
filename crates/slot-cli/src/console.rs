//! Line-oriented front-end: reads commands, renders session state

use std::io::{self, BufRead, Write};

use anyhow::Result;
use rand::RngCore;

use slot_core::{Prompter, SlotError, SlotSession, SpinOutcome};

const HELP: &str = "Commands: [s]pin, [l]ines, [b]et, [a]dd money, [i]nfo, [q]uit";

/// Prompter over any line reader / writer pair
pub struct LinePrompter<I, O> {
    input: I,
    output: O,
}

impl<I: BufRead, O: Write> LinePrompter<I, O> {
    pub fn new(input: I, output: O) -> Self {
        Self { input, output }
    }

    fn say(&mut self, text: &str) {
        self.emit(format_args!("{text}\n"));
    }

    // Output failures surface on the next read as EOF
    fn emit(&mut self, args: std::fmt::Arguments<'_>) {
        if let Err(err) = self.output.write_fmt(args).and_then(|()| self.output.flush()) {
            log::debug!("Failed to write output: {err}");
        }
    }

    fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
            Err(err) => {
                log::error!("Failed to read input: {err}");
                None
            }
        }
    }
}

impl<I: BufRead, O: Write> Prompter for LinePrompter<I, O> {
    fn request(&mut self, prompt: &str) -> Option<String> {
        self.emit(format_args!("{prompt} "));
        let line = self.read_line()?;
        if line.trim().eq_ignore_ascii_case("q") {
            return None;
        }
        Some(line)
    }

    fn rejected(&mut self, error: &SlotError) {
        self.say(&format!("{error}. Please try again."));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Spin,
    Lines,
    Bet,
    AddMoney,
    Info,
    Quit,
}

impl Command {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "s" | "spin" => Some(Self::Spin),
            "l" | "lines" => Some(Self::Lines),
            "b" | "bet" => Some(Self::Bet),
            "a" | "add" => Some(Self::AddMoney),
            "i" | "info" => Some(Self::Info),
            "q" | "quit" | "exit" => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Run an interactive session on stdin/stdout
pub fn play<R: RngCore>(session: SlotSession<R>, guided: bool) -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut prompter = LinePrompter::new(stdin.lock(), stdout.lock());
    run(session, guided, &mut prompter);
    Ok(())
}

/// Command loop; returns the session once the player quits
pub fn run<R, I, O>(
    mut session: SlotSession<R>,
    guided: bool,
    prompter: &mut LinePrompter<I, O>,
) -> SlotSession<R>
where
    R: RngCore,
    I: BufRead,
    O: Write,
{
    log::info!("Session started with policy {}", session.policy_name());

    if guided && session.prompt_lines(prompter).is_none() {
        return session;
    }

    render_status(&session, prompter);
    prompter.say(HELP);

    loop {
        let Some(raw) = prompter.request(">") else {
            break;
        };
        let Some(command) = Command::parse(&raw) else {
            prompter.say(HELP);
            continue;
        };

        match command {
            Command::Spin => match session.spin() {
                Ok(outcome) => render_outcome(&outcome, prompter),
                Err(err @ SlotError::InsufficientBalance { .. }) => {
                    prompter.say(&err.to_string());
                }
                Err(err) => {
                    log::error!("Spin failed: {err}");
                    prompter.say(&err.to_string());
                }
            },
            Command::Lines => {
                if session.prompt_lines(prompter).is_none() {
                    break;
                }
            }
            Command::Bet => {
                if session.prompt_bet(prompter).is_none() {
                    break;
                }
            }
            Command::AddMoney => {
                if session.prompt_top_up(prompter).is_none() {
                    break;
                }
            }
            Command::Info => {}
            Command::Quit => break,
        }

        render_status(&session, prompter);
    }

    let stats = session.stats();
    prompter.say(&format!(
        "Played {} spins, won ${}, leaving with ${}.",
        stats.total_spins,
        stats.total_winnings,
        session.balance()
    ));
    session
}

fn render_outcome<I: BufRead, O: Write>(outcome: &SpinOutcome, prompter: &mut LinePrompter<I, O>) {
    let grid = outcome.grid.to_string();
    prompter.say(grid.trim_end());
    prompter.say(&outcome.to_string());
}

fn render_status<R: RngCore, I: BufRead, O: Write>(
    session: &SlotSession<R>,
    prompter: &mut LinePrompter<I, O>,
) {
    let state = session.state();
    prompter.say(&format!(
        "Balance: ${} | Lines: {} | Bet: ${} per line (total ${}) | Spins: {} | Won: ${}",
        state.balance,
        state.lines,
        state.bet,
        session.total_bet(),
        state.total_spins,
        state.total_winnings
    ));
}

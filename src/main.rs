mod config;
mod game;
mod logging;
mod term;
mod snake;

use std::process::exit;

use anyhow::{Context, Result};
use tracing::{error, info};

use config::{Palette, Settings};
use game::{Outcome, SnakeGame};
use term::TermManager;

pub type TermInt = u16;

fn main() {
    let code = match run() {
        Ok(outcome) => {
            info!(?outcome, "session finished");
            0
        }
        Err(err) => {
            // The terminal has been restored by the time we get here
            error!("{:#}", err);
            eprintln!("snake: {:#}", err);
            1
        }
    };

    println!("Thanks for playing Snake!");
    exit(code);
}

fn run() -> Result<Outcome> {
    logging::init().context("failed to set up logging")?;

    let mut term = TermManager::new().context("failed to query the terminal")?;
    term.setup().context("failed to initialize the terminal")?;

    let outcome = {
        let mut game = SnakeGame::new(&mut term, rand::thread_rng(), Settings::default(), Palette::default())?;
        let outcome = game.run()?;
        info!(length = game.state().snake().len(), "final snake");
        outcome
    };

    term.restore().context("failed to restore the terminal")?;
    Ok(outcome)
}

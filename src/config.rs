use std::time::Duration;

use crossterm::style::Color;

use crate::TermInt;

/// Gameplay constants. There is no user-facing way to change these.
#[derive(Clone, Debug)]
pub struct Settings {
    /// One game step per tick; the input poll waits at most this long.
    pub tick: Duration,
    /// How long the instructions stay up before play starts.
    pub intro_delay: Duration,
    pub initial_length: usize,
    pub min_width: TermInt,
    pub min_height: TermInt,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            tick: Duration::from_millis(100),
            intro_delay: Duration::from_secs(2),
            initial_length: 3,
            min_width: 30,
            min_height: 10,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Palette {
    pub snake: Color,
    pub food: Color,
    pub text: Color,
    pub alert: Color,
    pub body_char: char,
    pub head_char: char,
    pub food_char: char,
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            snake: Color::Green,
            food: Color::Red,
            text: Color::Yellow,
            alert: Color::Red,
            body_char: '█',
            head_char: '▒',
            food_char: 'π',
        }
    }
}

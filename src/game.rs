use std::time::{Duration, Instant};

use crate::TermInt;
use crate::config::{Palette, Settings};
use crate::term::Screen;
use crate::snake::{Board, Cell, Snake, Direction::{*, self}, MoveResult};

use anyhow::{bail, Context, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::style::Color;
use rand::{Rng, seq::SliceRandom};
use tracing::{debug, info};

/// Longest single wait on the keyboard, so interrupts are noticed promptly.
const POLL_SLICE: Duration = Duration::from_millis(25);
/// Random picks to try before falling back to scanning the free cells.
const FOOD_ATTEMPTS: usize = 64;
const SCORE_COL: TermInt = 2;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Intro,
    Running,
    GameOver,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Quit,
    Turn(Direction),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Quit,
    GameOver { score: u64, won: bool },
}

/// What a single tick did to the board.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Step {
    Moved { new_head: Cell, old_head: Cell, old_tail: Option<Cell>, ate: bool },
    Crashed,
    /// The last free cell was just eaten.
    Filled { new_head: Cell, old_head: Cell },
    /// The game is not running.
    Halted,
}

pub fn direction_for_key(code: KeyCode) -> Option<Direction> {
    match code {
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Some(Up),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Some(Down),
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(Left),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(Right),
        _ => None,
    }
}

pub fn command_for_key(ev: &KeyEvent) -> Option<Command> {
    match ev.code {
        KeyCode::Char('c') if ev.modifiers.contains(KeyModifiers::CONTROL) => Some(Command::Quit),
        KeyCode::Char('q') | KeyCode::Char('Q') => Some(Command::Quit),
        code => direction_for_key(code).map(Command::Turn),
    }
}

/// Picks an interior cell the snake does not occupy, or `None` when the
/// snake fills the whole interior.
pub fn place_food<R: Rng + ?Sized>(board: &Board, snake: &Snake, rng: &mut R) -> Option<Cell> {
    if snake.len() >= board.interior_len() {
        return None;
    }

    for _ in 0..FOOD_ATTEMPTS {
        let cell = Cell::new(rng.gen_range(1..board.height - 1), rng.gen_range(1..board.width - 1));
        if !snake.contains(&cell) {
            return Some(cell);
        }
    }

    let free: Vec<Cell> = board.interior().filter(|cell| !snake.contains(cell)).collect();
    free.choose(rng).copied()
}

/// Everything that changes while playing. Drawing lives in [`SnakeGame`].
#[derive(Debug, Clone)]
pub struct GameState {
    board: Board,
    snake: Snake,
    food: Cell,
    score: u64,
    phase: Phase,
    won: bool,
}

impl GameState {
    /// Snake in the left half of the screen heading right, food straight
    /// ahead in the middle.
    pub fn new(board: Board, initial_length: usize) -> Self {
        let head = Cell::new(board.height / 2, board.width / 4);
        let food = Cell::new(board.height / 2, board.width / 2);
        let snake = Snake::new(head, initial_length, Right);
        GameState { board, snake, food, score: 0, phase: Phase::Intro, won: false }
    }

    #[cfg(test)]
    pub fn with_parts(board: Board, snake: Snake, food: Cell) -> Self {
        GameState { board, snake, food, score: 0, phase: Phase::Running, won: false }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn food(&self) -> Cell {
        self.food
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn won(&self) -> bool {
        self.won
    }

    pub fn start(&mut self) {
        if self.phase == Phase::Intro {
            self.phase = Phase::Running;
        }
    }

    /// Applies at most one turn, then moves the snake one cell.
    pub fn step<R: Rng + ?Sized>(&mut self, turn: Option<Direction>, rng: &mut R) -> Step {
        if self.phase != Phase::Running {
            return Step::Halted;
        }

        if let Some(dir) = turn {
            if self.snake.set_direction(dir) {
                debug!(direction = ?dir, "turned");
            }
        }

        let food = self.food;
        match self.snake.move_step(&self.board, |head| head == food) {
            MoveResult::Crashed => {
                self.phase = Phase::GameOver;
                info!(
                    score = self.score,
                    length = self.snake.len(),
                    direction = ?self.snake.get_direction(),
                    "snake crashed"
                );
                Step::Crashed
            }
            MoveResult::Moved { new_head, old_head, old_tail: Some(tail) } => {
                Step::Moved { new_head, old_head, old_tail: Some(tail), ate: false }
            }
            MoveResult::Moved { new_head, old_head, old_tail: None } => {
                self.score += 1;
                match place_food(&self.board, &self.snake, rng) {
                    Some(cell) => {
                        self.food = cell;
                        debug!(score = self.score, row = cell.row, col = cell.col, "food eaten");
                        Step::Moved { new_head, old_head, old_tail: None, ate: true }
                    }
                    None => {
                        self.phase = Phase::GameOver;
                        self.won = true;
                        info!(score = self.score, "board filled");
                        Step::Filled { new_head, old_head }
                    }
                }
            }
        }
    }
}

enum TickInput {
    Quit,
    Continue(Option<Direction>),
}

pub struct SnakeGame<'a, S: Screen, R: Rng> {
    screen: &'a mut S,
    rng: R,
    settings: Settings,
    palette: Palette,
    state: GameState,
}

impl<'a, S: Screen, R: Rng> SnakeGame<'a, S, R> {
    pub fn new(screen: &'a mut S, rng: R, settings: Settings, palette: Palette) -> Result<Self> {
        let (width, height) = screen.size();
        if width < settings.min_width || height < settings.min_height {
            bail!(
                "terminal is {}x{}, snake needs at least {}x{}",
                width, height, settings.min_width, settings.min_height
            );
        }

        let state = GameState::new(Board::new(height, width), settings.initial_length);
        info!(width, height, "new game");
        Ok(SnakeGame { screen, rng, settings, palette, state })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn run(&mut self) -> Result<Outcome> {
        if !self.show_intro().context("failed to draw the intro")? {
            info!("quit during intro");
            return Ok(Outcome::Quit);
        }

        self.play()
    }

    ///////////////////////////////////////////////////////////////////////////

    /// Returns `false` if the player asked to leave.
    fn show_intro(&mut self) -> Result<bool> {
        self.draw_board()?;

        let text = self.palette.text;
        let lines = [
            ("SNAKE GAME", true),
            ("Use WASD or Arrows to move", false),
            ("Press Q to quit", false),
        ];
        for (i, (line, bold)) in lines.iter().enumerate() {
            let col = self.centered(line);
            self.screen.print_text(2 + i as TermInt, col, line, text, *bold)?;
        }
        self.screen.flush()?;

        let started = Instant::now();
        loop {
            if self.screen.interrupted() {
                return Ok(false);
            }

            let left = self.settings.intro_delay.saturating_sub(started.elapsed());
            if let Some(key) = self.screen.poll_key(left.min(POLL_SLICE))? {
                if command_for_key(&key) == Some(Command::Quit) {
                    return Ok(false);
                }
            }

            if started.elapsed() >= self.settings.intro_delay {
                return Ok(true);
            }
        }
    }

    fn play(&mut self) -> Result<Outcome> {
        self.state.start();
        self.draw_board().context("failed to draw the board")?;

        loop {
            let turn = match self.read_tick_input()? {
                TickInput::Quit => {
                    info!(score = self.state.score(), "player quit");
                    return Ok(Outcome::Quit);
                }
                TickInput::Continue(turn) => turn,
            };

            let step = self.state.step(turn, &mut self.rng);
            self.render_step(&step)?;

            if self.state.phase() == Phase::GameOver {
                self.game_over()?;
                return Ok(Outcome::GameOver { score: self.state.score(), won: self.state.won() });
            }
        }
    }

    /// Waits out one tick, draining every key that arrives. Only the last
    /// movement key counts.
    fn read_tick_input(&mut self) -> Result<TickInput> {
        let deadline = Instant::now() + self.settings.tick;
        let mut turn = None;

        loop {
            if self.screen.interrupted() {
                info!("interrupted");
                return Ok(TickInput::Quit);
            }

            let left = deadline.saturating_duration_since(Instant::now());
            let key = self.screen.poll_key(left.min(POLL_SLICE)).context("failed to read input")?;

            match key.as_ref().and_then(command_for_key) {
                Some(Command::Quit) => return Ok(TickInput::Quit),
                Some(Command::Turn(dir)) => turn = Some(dir),
                None => {}
            }

            if Instant::now() >= deadline {
                return Ok(TickInput::Continue(turn));
            }
        }
    }

    fn game_over(&mut self) -> Result<()> {
        let (width, height) = self.screen.size();
        let mid = height / 2;
        let heading = if self.state.won() { "YOU WIN!" } else { "GAME OVER!" };
        let score = format!("Final Score: {}", self.state.score());
        let exit = "Press any key to exit...";

        self.screen.clear()?;
        self.screen.print_text(mid - 2, centered_col(width, heading), heading, self.palette.alert, true)?;
        self.screen.print_text(mid, centered_col(width, &score), &score, self.palette.text, true)?;
        self.screen.print_text(mid + 2, centered_col(width, exit), exit, Color::Reset, false)?;
        self.screen.flush()?;

        while !self.screen.interrupted() {
            if self.screen.poll_key(POLL_SLICE)?.is_some() {
                break;
            }
        }

        Ok(())
    }

    fn draw_board(&mut self) -> Result<()> {
        self.screen.clear()?;
        self.draw_borders()?;

        let (snake, head, body) = (self.palette.snake, self.palette.head_char, self.palette.body_char);
        for (i, pos) in self.state.snake().body().iter().enumerate() {
            let ch = if i == 0 { head } else { body };
            self.screen.print_at(*pos, ch, snake)?;
        }

        self.screen.print_at(self.state.food(), self.palette.food_char, self.palette.food)?;
        self.draw_score()?;
        self.screen.flush()?;
        Ok(())
    }

    fn draw_borders(&mut self) -> Result<()> {
        let Board { width, height } = *self.state.board();
        let (end_x, end_y) = (width - 1, height - 1);

        for x in 0..width {
            let ch = if x == 0 || x == end_x { '+' } else { '-' };
            self.screen.print_at(Cell::new(0, x), ch, Color::Reset)?;
            self.screen.print_at(Cell::new(end_y, x), ch, Color::Reset)?;
        }

        for y in 1..end_y {
            self.screen.print_at(Cell::new(y, 0), '|', Color::Reset)?;
            self.screen.print_at(Cell::new(y, end_x), '|', Color::Reset)?;
        }

        Ok(())
    }

    fn draw_score(&mut self) -> Result<()> {
        let text = format!(" Score: {} ", self.state.score());
        self.screen.print_text(0, SCORE_COL, &text, self.palette.text, false)?;
        Ok(())
    }

    fn render_step(&mut self, step: &Step) -> Result<()> {
        let color = self.palette.snake;

        match *step {
            Step::Moved { new_head, old_head, old_tail, ate } => {
                if let Some(tail) = old_tail {
                    self.screen.print_at(tail, ' ', Color::Reset)?;
                }
                self.screen.print_at(old_head, self.palette.body_char, color)?;
                self.screen.print_at(new_head, self.palette.head_char, color)?;

                if ate {
                    self.screen.print_at(self.state.food(), self.palette.food_char, self.palette.food)?;
                    self.draw_score()?;
                }
            }
            Step::Filled { new_head, old_head } => {
                self.screen.print_at(old_head, self.palette.body_char, color)?;
                self.screen.print_at(new_head, self.palette.head_char, color)?;
                self.draw_score()?;
            }
            Step::Crashed | Step::Halted => return Ok(()),
        }

        self.screen.flush()?;
        Ok(())
    }

    fn centered(&self, text: &str) -> TermInt {
        centered_col(self.state.board().width, text)
    }
}

fn centered_col(width: TermInt, text: &str) -> TermInt {
    width.saturating_sub(text.chars().count() as TermInt) / 2
}

use std::io::{self, Stdout, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{ExecutableCommand, QueueableCommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use unicode_width::UnicodeWidthStr;

use escape_game::event::dispatch_audio;
use escape_game::rng;
use escape_game::{
    AudioNotifier, Command, Dir, Game, GameConfig, GameStatus, GameView, ItemKind, MonsterKind,
    Pos, Renderer, Tile,
};

const CELL_W: usize = 2;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Seed for a reproducible run; random when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Write tracing output to this file (filtered by RUST_LOG).
    #[arg(long)]
    log_file: Option<PathBuf>,
    /// Turn nests into dirt once they have spawned a chaser.
    #[arg(long)]
    convert_nests: bool,
}

#[derive(Clone, Copy, PartialEq)]
enum Glyph {
    Player,
    Seeker,
    Chaser,
    Fuel,
    Potion,
    GhostItem,
    Car,
    Dirt,
    Grass,
    Road,
    Wall,
}

#[derive(Clone, Copy, PartialEq)]
struct Cell {
    glyph: Glyph,
    color: Color,
}

/// crossterm front end: diff renderer for the grid plus the bell and HUD
/// track indicator standing in for audio.
struct Terminal<'a> {
    out: &'a mut Stdout,
    last: Vec<Cell>,
    last_hud: String,
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
    track: Option<u32>,
}

impl<'a> Terminal<'a> {
    fn new(out: &'a mut Stdout, width: usize, height: usize) -> Self {
        Self {
            out,
            last: vec![
                Cell {
                    glyph: Glyph::Dirt,
                    color: Color::Reset,
                };
                width * height
            ],
            last_hud: String::new(),
            needs_full: true,
            origin_x: 0,
            origin_y: 1,
            track: None,
        }
    }

    fn draw_cell(&mut self, x: usize, y: usize, cell: Cell) -> io::Result<()> {
        let text = match cell.glyph {
            Glyph::Player => "🙂",
            Glyph::Seeker => "👾",
            Glyph::Chaser => "🐺",
            Glyph::Fuel => "⛽",
            Glyph::Potion => "🧪",
            Glyph::GhostItem => "👻",
            Glyph::Car => "🚗",
            Glyph::Dirt => "··",
            Glyph::Grass => "\"\"",
            Glyph::Road => "==",
            Glyph::Wall => "██",
        };
        let x_pos = self.origin_x + (x * CELL_W) as u16;
        let y_pos = self.origin_y + y as u16;
        self.out.queue(MoveTo(x_pos, y_pos))?;
        self.out.queue(SetForegroundColor(cell.color))?;
        self.out.queue(Print(text))?;
        let w = UnicodeWidthStr::width(text);
        if w < CELL_W {
            for _ in 0..(CELL_W - w) {
                self.out.queue(Print(' '))?;
            }
        }
        self.out.queue(ResetColor)?;
        Ok(())
    }

    fn game_over(&mut self, game: &Game) -> io::Result<()> {
        let height = game.grid().height() as u16;
        self.out.queue(MoveTo(self.origin_x, self.origin_y + height))?;
        self.out.queue(Print(format!(
            "GAME OVER - levels cleared: {} (press q to quit)",
            game.cleared()
        )))?;
        self.out.flush()?;
        loop {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && key.code == KeyCode::Char('q') {
                    return Ok(());
                }
            }
        }
    }
}

impl Renderer for Terminal<'_> {
    type Error = io::Error;

    fn update(&mut self, view: &GameView<'_>) -> io::Result<()> {
        let width = view.grid.width();
        let height = view.grid.height();
        let needed_h = (height + 2) as u16;
        let needed_w = (width * CELL_W) as u16;

        self.out.queue(MoveTo(0, 0))?;
        let (term_w, term_h) = terminal::size()?;
        if term_w < needed_w || term_h < needed_h {
            self.out.queue(Clear(ClearType::All))?;
            let msg = format!(
                "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
                needed_w, needed_h, term_w, term_h
            );
            self.out.queue(Print(msg))?;
            self.out.flush()?;
            self.needs_full = true;
            return Ok(());
        }

        let origin_x = (term_w - needed_w) / 2;
        let origin_y = (term_h - needed_h) / 2 + 1;
        if origin_x != self.origin_x || origin_y != self.origin_y {
            self.origin_x = origin_x;
            self.origin_y = origin_y;
            self.needs_full = true;
        }

        let hud = match view.player {
            Some(player) => format!(
                "HP: {}/{}  Level: {}  Turn: {}  Fuel: {}  Ghost: {}  Track: {}  (hjkl/arrows, q quits)",
                player.health,
                player.max_health,
                view.cleared,
                view.turn,
                if view.fuel_collected { "yes" } else { "no" },
                if player.ghost { "on" } else { "off" },
                self.track.map_or_else(|| "-".to_string(), |t| t.to_string()),
            ),
            None => format!("Dead on level {}", view.cleared),
        };
        if self.needs_full || hud != self.last_hud {
            self.out.queue(MoveTo(self.origin_x, self.origin_y - 1))?;
            self.out.queue(SetForegroundColor(Color::White))?;
            self.out.queue(Clear(ClearType::CurrentLine))?;
            self.out.queue(Print(&hud))?;
            self.out.queue(ResetColor)?;
            self.last_hud = hud;
        }

        for y in 0..height {
            for x in 0..width {
                let cell = cell_for(view, Pos::new(x, y));
                let idx = y * width + x;
                if self.needs_full || cell != self.last[idx] {
                    self.last[idx] = cell;
                    self.draw_cell(x, y, cell)?;
                }
            }
        }
        self.needs_full = false;

        self.out.flush()
    }
}

impl AudioNotifier for Terminal<'_> {
    fn play_level_track(&mut self, level: u32) {
        // Only one track plays; the new level's music replaces the old.
        self.track = Some(level);
        tracing::debug!(level, "background track switched");
    }

    fn play_hit_effect(&mut self) {
        if self.out.queue(Print('\x07')).is_err() {
            tracing::warn!("failed to ring terminal bell");
        }
    }
}

fn cell_for(view: &GameView<'_>, pos: Pos) -> Cell {
    if let Some(player) = view.player {
        if player.pos == pos {
            let color = if player.ghost { Color::Cyan } else { Color::Yellow };
            return Cell {
                glyph: Glyph::Player,
                color,
            };
        }
    }
    let monster = view
        .seekers
        .iter()
        .chain(view.chasers.iter())
        .find(|m| m.alive && m.pos == pos);
    if let Some(monster) = monster {
        return match monster.kind {
            MonsterKind::Seeker => Cell {
                glyph: Glyph::Seeker,
                color: Color::Magenta,
            },
            MonsterKind::Chaser => Cell {
                glyph: Glyph::Chaser,
                color: Color::Red,
            },
        };
    }
    if let Some(item) = view.items().find(|i| i.pos == pos) {
        let glyph = match item.kind {
            ItemKind::Fuel => Glyph::Fuel,
            ItemKind::HealthPotion => Glyph::Potion,
            ItemKind::GhostPowerUp => Glyph::GhostItem,
        };
        return Cell {
            glyph,
            color: Color::White,
        };
    }
    match view.grid.get(pos) {
        Tile::Car => Cell {
            glyph: Glyph::Car,
            color: Color::Reset,
        },
        // Nests are drawn as dirt on purpose; the player cannot tell them apart.
        Tile::Dirt | Tile::Nest => Cell {
            glyph: Glyph::Dirt,
            color: Color::DarkYellow,
        },
        Tile::Grass => Cell {
            glyph: Glyph::Grass,
            color: Color::Green,
        },
        Tile::Road => Cell {
            glyph: Glyph::Road,
            color: Color::Grey,
        },
        Tile::Wall => Cell {
            glyph: Glyph::Wall,
            color: Color::DarkGrey,
        },
    }
}

fn dir_for(code: KeyCode) -> Option<Dir> {
    match code {
        KeyCode::Char('k') | KeyCode::Up => Some(Dir::Up),
        KeyCode::Char('j') | KeyCode::Down => Some(Dir::Down),
        KeyCode::Char('h') | KeyCode::Left => Some(Dir::Left),
        KeyCode::Char('l') | KeyCode::Right => Some(Dir::Right),
        _ => None,
    }
}

fn init_logging(path: &Path) -> anyhow::Result<tracing_appender::non_blocking::WorkerGuard> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .context("log file path has no file name")?;
    std::fs::create_dir_all(dir)?;

    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    // File only: anything on stderr would tear the alternate screen.
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking_file)
                .with_ansi(false),
        )
        .init();
    Ok(guard)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = match cli.log_file.as_deref() {
        Some(path) => Some(init_logging(path)?),
        None => None,
    };

    let mut config = GameConfig::from_env();
    if cli.convert_nests {
        config.convert_nests = true;
    }
    let seed = cli.seed.unwrap_or_else(rng::entropy_seed);
    tracing::info!(seed, ?config, "starting");

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(Hide)?;

    let result = run(&mut stdout, config, seed);

    stdout.execute(Show)?;
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result
}

fn run(stdout: &mut Stdout, config: GameConfig, seed: u64) -> anyhow::Result<()> {
    let mut events = Vec::new();
    let mut game = Game::new(config, seed, &mut events)?;
    let mut term = Terminal::new(stdout, game.grid().width(), game.grid().height());
    dispatch_audio(&events, &mut term);
    events.clear();
    term.update(&game.view())?;

    loop {
        if !event::poll(Duration::from_millis(250))? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if key.code == KeyCode::Char('q') {
                    return Ok(());
                }
                let Some(dir) = dir_for(key.code) else {
                    continue;
                };
                let outcome = game.apply(Command::Move(dir), &mut events)?;
                dispatch_audio(&events, &mut term);
                events.clear();
                term.update(&game.view())?;
                if outcome.status == GameStatus::Dead {
                    term.game_over(&game)?;
                    return Ok(());
                }
            }
            Event::Resize(_, _) => {
                term.needs_full = true;
                term.update(&game.view())?;
            }
            _ => {}
        }
    }
}

use crate::animator::Animator;
use crate::clock::{impulse_for, ClockDigits, Ticker};
use crate::config::{save_settings_atomic, settings_on_exit, Settings};
use crate::glyphs::{tile_count, GlyphField};
use crate::input::{collect_input, Action};
use crate::render::{clock_width, draw_clock, draw_text, Cell, Terminal, DIGIT_H};
use crate::search::{open_url, SearchBar};
use crossterm::style::Color;
use std::path::PathBuf;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

// background tiles are two columns wide so double-width glyphs don't collide
const TILE_W: u16 = 2;
const TILE_H: u16 = 1;
const STATUS_TTL: Duration = Duration::from_secs(3);

struct StatusLine {
    text: String,
    until: Instant,
}

impl StatusLine {
    fn show(&mut self, text: impl Into<String>, now: Instant) {
        self.text = text.into();
        self.until = now + STATUS_TTL;
    }

    fn current(&self, now: Instant) -> Option<&str> {
        (now < self.until && !self.text.is_empty()).then_some(self.text.as_str())
    }
}

struct Palette {
    background: Color,
    clock: Color,
    wave: Color,
    engine: Color,
    query: Color,
    status: Color,
}

impl Palette {
    fn new(enable_color: bool) -> Self {
        if enable_color {
            Self {
                background: Color::DarkGrey,
                clock: Color::White,
                wave: Color::Cyan,
                engine: Color::Yellow,
                query: Color::White,
                status: Color::Grey,
            }
        } else {
            Self {
                background: Color::Reset,
                clock: Color::Reset,
                wave: Color::Reset,
                engine: Color::Reset,
                query: Color::Reset,
                status: Color::Reset,
            }
        }
    }
}

pub(crate) struct App {
    settings: Settings,
    palette: Palette,
    term: Terminal,
    animator: Animator,
    ticker: Ticker,
    background: GlyphField,
    search: SearchBar,
    clock: ClockDigits,
    status: StatusLine,
    show_hud: bool,
    fps_est: f32,
    should_quit: bool,
}

impl App {
    fn init(settings: Settings) -> anyhow::Result<Self> {
        let now = Instant::now();
        let seed = settings.seed.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or(Duration::from_secs(0))
                .as_nanos() as u64
        });

        let term = Terminal::begin()?;
        let mut ticker = Ticker::new(seed, now);
        let mut background = GlyphField::new(settings.glyphs);
        background.fit(
            tile_count(term.cols, term.rows, TILE_W, TILE_H),
            ticker.rng(),
        );
        let animator = Animator::start(settings.wave, now, term.cols as usize);
        let search = SearchBar::new(settings.engines.clone(), settings.default_engine);

        Ok(Self {
            palette: Palette::new(settings.enable_color),
            settings,
            term,
            animator,
            ticker,
            background,
            search,
            clock: ClockDigits::from_time(&chrono::Local::now()),
            status: StatusLine {
                text: String::new(),
                until: now,
            },
            show_hud: false,
            fps_est: 0.0,
            should_quit: false,
        })
    }

    fn run(&mut self) -> anyhow::Result<()> {
        let fps = self.settings.fps_cap.clamp(10, 240);
        let frame_dt = Duration::from_secs_f32(1.0 / fps as f32);
        let mut last_frame = Instant::now();

        while !self.should_quit {
            let frame_start = Instant::now();

            if self.term.resize_if_needed()? {
                self.relayout();
            }

            // a paused wave only needs the clock, so wake for ticks and keys
            let wait = if self.animator.is_running() {
                Duration::from_millis(1).min(frame_dt)
            } else {
                self.ticker
                    .until_next(frame_start)
                    .min(Duration::from_millis(250))
            };
            for action in collect_input(wait)? {
                self.apply(action, Instant::now());
                if self.should_quit {
                    break;
                }
            }

            let now = Instant::now();
            if self.ticker.due(now) {
                self.on_tick();
            }

            if self.animator.update(now) {
                let real_dt = now.saturating_duration_since(last_frame).as_secs_f32();
                if real_dt > 0.0 {
                    let inst = 1.0 / real_dt;
                    self.fps_est = if self.fps_est == 0.0 {
                        inst
                    } else {
                        self.fps_est * 0.9 + inst * 0.1
                    };
                }
                last_frame = now;
            }

            self.render_frame(now)?;

            if self.animator.is_running() {
                spin_sleep(frame_dt, frame_start);
            }
        }

        self.animator.stop();
        Ok(())
    }

    fn apply(&mut self, action: Action, now: Instant) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::Type(ch) => self.search.push(ch),
            Action::Backspace => self.search.backspace(),
            Action::ClearQuery => self.search.clear(),
            Action::CycleEngine(d) => self.search.cycle_engine(d),
            Action::HudToggle => self.show_hud = !self.show_hud,
            Action::Submit => {
                if let Some(url) = self.search.submit() {
                    match open_url(&url) {
                        Ok(()) => self.status.show(format!("opening {url}"), now),
                        Err(e) => self.status.show(format!("{e:#}"), now),
                    }
                }
            }
            Action::Hidden => {
                if self.animator.pause() {
                    self.status.show("paused", now);
                }
            }
            Action::Shown => {
                if self.animator.resume(now) {
                    self.status.show("resumed", now);
                }
            }
            // size is re-read at the top of every loop
            Action::Resized => {}
        }
    }

    fn relayout(&mut self) {
        let count = tile_count(self.term.cols, self.term.rows, TILE_W, TILE_H);
        self.background.fit(count, self.ticker.rng());
        self.animator.resize(self.term.cols as usize);
    }

    fn on_tick(&mut self) {
        self.clock = ClockDigits::from_time(&chrono::Local::now());
        let spec = impulse_for(self.clock.most_significant_change());
        let len = self.animator.line().len();
        if let Some((pos, strength)) = self.ticker.pluck(spec, len) {
            self.animator.impulse(pos, spec.radius, strength);
        }
    }

    fn render_frame(&mut self, now: Instant) -> anyhow::Result<()> {
        let cols = self.term.cols;
        let rows = self.term.rows;
        let pal = &self.palette;
        let buf = &mut self.term.cur;
        buf.clear(Color::Reset);

        if self.settings.show_background && cols >= TILE_W {
            let per_row = (cols / TILE_W) as usize;
            for (i, &ch) in self.background.glyphs().iter().enumerate() {
                let x = (i % per_row) as u16 * TILE_W;
                let y = (i / per_row) as u16 * TILE_H;
                buf.set(
                    x,
                    y,
                    Cell {
                        ch,
                        fg: pal.background,
                        bg: Color::Reset,
                        bold: false,
                    },
                );
                // blank the spill-over column so wide glyphs render cleanly
                buf.set(
                    x + 1,
                    y,
                    Cell {
                        ch: ' ',
                        fg: pal.background,
                        bg: Color::Reset,
                        bold: false,
                    },
                );
            }
        }

        // clock, gap, wave, gap, search
        let block_h = DIGIT_H + 1 + 1 + 2 + 1;
        let top = rows.saturating_sub(block_h) / 2;
        let clock_x = cols.saturating_sub(clock_width()) / 2;
        blank_rows(buf, top, DIGIT_H, clock_x, clock_width());
        draw_clock(buf, clock_x, top, &self.clock.0, pal.clock);

        let wave_y = top + DIGIT_H + 1;
        let wave = self.animator.text(self.settings.wave_style);
        draw_text(buf, 0, wave_y, &wave, pal.wave, Color::Reset);

        let search_y = wave_y + 3;
        let bar_w = cols.saturating_sub(4).min(64);
        let bar_x = (cols - bar_w) / 2;
        blank_rows(buf, search_y, 1, bar_x, bar_w);
        let label = format!("[{}] ", self.search.engine().name);
        draw_text(buf, bar_x, search_y, &label, pal.engine, Color::Reset);
        let room = (bar_w as usize).saturating_sub(label.chars().count() + 3);
        let input = self.search.input();
        let skip = input.chars().count().saturating_sub(room);
        let shown: String = input.chars().skip(skip).collect();
        draw_text(
            buf,
            bar_x + label.chars().count() as u16,
            search_y,
            &format!("> {shown}_"),
            pal.query,
            Color::Reset,
        );

        if self.show_hud {
            let line = self.animator.line();
            let hud = format!(
                " fps:{:<5.1} len:{:<4} state:{:<8} energy:{:.3e}  (F1 hud) (Tab engine) (Esc quit) ",
                self.fps_est,
                line.len(),
                self.animator.state().name(),
                line.energy(),
            );
            blank_rows(buf, 0, 1, 0, cols);
            draw_text(buf, 0, 0, &hud, pal.status, Color::Reset);
        }

        if let Some(text) = self.status.current(now) {
            let y = rows.saturating_sub(1);
            let text = format!(" {text} ");
            blank_rows(buf, y, 1, 0, text.chars().count() as u16);
            draw_text(buf, 0, y, &text, pal.status, Color::Reset);
        }

        self.term.present(true)?;
        Ok(())
    }
}

fn blank_rows(buf: &mut crate::render::CellBuffer, y0: u16, h: u16, x0: u16, w: u16) {
    for y in y0..y0.saturating_add(h) {
        for x in x0..x0.saturating_add(w) {
            buf.set(x, y, Cell::default());
        }
    }
}

/// Where the settings came from, so the exit save leaves flag overrides out.
pub(crate) struct SettingsFile {
    pub(crate) path: PathBuf,
    pub(crate) loaded: Settings,
}

pub(crate) fn run(settings: Settings, file: SettingsFile) -> anyhow::Result<()> {
    let mut app = App::init(settings)?;
    let result = app.run();
    // restore the terminal and save even when the loop failed
    let ended = app.term.end();
    let remembered = settings_on_exit(&file.loaded, app.search.active());
    let saved = save_settings_atomic(&file.path, &remembered);
    first_error([result, ended, saved])
}

/// Earliest failure wins, so cleanup errors never hide the loop's own.
fn first_error(steps: [anyhow::Result<()>; 3]) -> anyhow::Result<()> {
    steps.into_iter().collect()
}

/* -----------------------------
   Frame pacing helper
------------------------------ */

fn spin_sleep(target: Duration, now: Instant) {
    let end = now + target;
    loop {
        let t = Instant::now();
        if t >= end {
            break;
        }
        let left = end - t;
        if left > Duration::from_millis(2) {
            std::thread::sleep(Duration::from_millis(1));
        } else {
            std::hint::spin_loop();
        }
    }
}

use crate::backdrop::{Backdrop, BackdropKind};
use crate::config::AppConfig;
use crate::feed::{LogFeed, Severity};
use crate::graphics::{Canvas, Rgb};
use crate::math::approach;
use crate::nav::{Navigator, Transition, ViewGroup, ViewKind};
use crate::sequence::{ScanController, ScanEvent, ScanPhase};
use crate::state::FrameInput;
use crate::terminal::{is_narrow, Frame};
use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Instant;
use tracing::{debug, info};

const NAV_BG: Rgb = Rgb::new(10, 12, 18);
const TEXT: Rgb = Rgb::new(200, 210, 220);
const DIM: Rgb = Rgb::new(120, 130, 140);
const INK: Rgb = Rgb::new(5, 6, 10);
const SCROLL_SMOOTHING: f64 = 0.15;
const MAX_INPUT: usize = 256;

/// Rows taken by the nav bar (top) and the status line (bottom)
const CHROME_ROWS: u16 = 2;

/// Builds a generator; a fixed seed gives every stream its own reproducible sequence
fn make_rng(seed: Option<u64>, stream: u64) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(stream)),
        None => StdRng::from_entropy(),
    }
}

/// Whole-screen widget: backdrop, navigation, scanner and log feed
pub struct NeonWidget {
    config: AppConfig,
    seed: Option<u64>,
    canvas: Canvas,
    backdrop: Backdrop,
    nav: Navigator,
    scan: ScanController,
    feed: LogFeed,
    input: String,
    frame_input: FrameInput,
    scroll_target: f64,
    cols: u16,
    rows: u16,
    nav_spans: Vec<(u16, u16, usize)>,
    button_row: Option<u16>,
    debug: bool,
    paused: bool,
    quit: bool,
    frames_since_last_update: usize,
    last_fps_calculation: Instant,
    fps: f64,
}

impl NeonWidget {
    pub fn new(config: AppConfig, backdrop: BackdropKind, seed: Option<u64>) -> Self {
        let canvas = Canvas::new(
            0,
            0,
            config.canvas.units_per_pixel,
            config.canvas.background,
        );
        NeonWidget {
            backdrop: Backdrop::new(backdrop, &config, make_rng(seed, 1)),
            nav: Navigator::new(&config.navigation),
            scan: ScanController::new(config.scan.clone(), make_rng(seed, 2)),
            feed: LogFeed::new(config.feed.initial_count),
            config,
            seed,
            canvas,
            input: String::new(),
            frame_input: FrameInput::default(),
            scroll_target: 0.0,
            cols: 0,
            rows: 0,
            nav_spans: Vec::new(),
            button_row: None,
            debug: false,
            paused: false,
            quit: false,
            frames_since_last_update: 0,
            last_fps_calculation: Instant::now(),
            fps: 0.0,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn navigator(&self) -> &Navigator {
        &self.nav
    }

    pub fn feed(&self) -> &LogFeed {
        &self.feed
    }

    pub fn scan(&self) -> &ScanController {
        &self.scan
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn frame_input(&self) -> FrameInput {
        self.frame_input
    }

    pub fn backdrop_kind(&self) -> BackdropKind {
        self.backdrop.kind()
    }

    /// Initial view from a location fragment
    pub fn open(&mut self, fragment: Option<&str>) {
        let transition = self.nav.from_fragment(fragment);
        self.apply(transition);
        // The first screen should not animate in from the top
        self.frame_input.scroll_y = self.scroll_target;
    }

    fn play_rows(&self) -> u16 {
        self.rows.saturating_sub(CHROME_ROWS)
    }

    /// Height of one informational section in logical units
    fn section_height(&self) -> f64 {
        self.canvas.logical_size().1
    }

    fn max_scroll(&self) -> f64 {
        let sections = self.nav.sections().count().max(1);
        (sections - 1) as f64 * self.section_height()
    }

    /// Logical units per terminal row
    fn row_height(&self) -> f64 {
        2.0 * self.canvas.units_per_pixel()
    }

    /// Sizes the canvas to the terminal and rebuilds size-dependent backdrop state
    pub fn layout(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
        let play_rows = self.play_rows() as usize;
        self.canvas.resize(cols as usize, play_rows * 2);
        let (w, h) = self.canvas.logical_size();
        self.backdrop.resize(w, h);

        if let Transition::ScrollTo { section } = self.current_transition() {
            self.scroll_target = section as f64 * self.section_height();
            self.frame_input.scroll_y = self.scroll_target;
        }
        info!(cols, rows, width = w, height = h, "layout");
    }

    fn current_transition(&self) -> Transition {
        if self.nav.active().group == ViewGroup::Informational {
            let section = self
                .nav
                .sections()
                .position(|v| v.id == self.nav.active().id)
                .unwrap_or(0);
            Transition::ScrollTo { section }
        } else {
            Transition::Switch
        }
    }

    fn apply(&mut self, transition: Transition) {
        if let Transition::ScrollTo { section } = transition {
            self.scroll_target = (section as f64 * self.section_height()).min(self.max_scroll());
        }
    }

    fn scroll_by(&mut self, delta: f64) {
        self.scroll_target = (self.scroll_target + delta).clamp(0.0, self.max_scroll());
    }

    fn cycle_backdrop(&mut self) {
        let kind = self.backdrop.kind().next();
        self.backdrop = Backdrop::new(kind, &self.config, make_rng(self.seed, 1));
        let (w, h) = self.canvas.logical_size();
        self.backdrop.resize(w, h);
        info!(backdrop = %kind, "backdrop switched");
    }

    fn start_scan(&mut self, now_ms: u64) {
        if self.scan.trigger(&self.input, now_ms) {
            debug!(len = self.input.len(), "scan triggered");
        }
    }

    fn editing(&self) -> bool {
        self.nav.active().kind == ViewKind::Scanner
    }

    /// Handles one terminal event; `now_ms` is the session clock
    pub fn event(&mut self, event: &Event, now_ms: u64) {
        match event {
            Event::Key(key) => self.key(key, now_ms),
            Event::Mouse(mouse) => self.mouse(mouse, now_ms),
            Event::Resize(cols, rows) => self.layout(*cols, *rows),
            _ => {}
        }
    }

    fn key(&mut self, key: &KeyEvent, now_ms: u64) {
        if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
            return;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.quit = true;
            return;
        }

        match key.code {
            KeyCode::Tab => {
                let t = self.nav.next();
                self.apply(t);
                return;
            }
            KeyCode::BackTab => {
                let t = self.nav.previous();
                self.apply(t);
                return;
            }
            _ => {}
        }

        if self.editing() {
            match key.code {
                KeyCode::Enter => self.start_scan(now_ms),
                KeyCode::Backspace => {
                    self.input.pop();
                }
                KeyCode::Esc => {
                    let t = self.nav.from_fragment(None);
                    self.apply(t);
                }
                KeyCode::Char(c) if is_narrow(c) && self.input.chars().count() < MAX_INPUT => {
                    self.input.push(c)
                }
                _ => {}
            }
            return;
        }

        let page = self.section_height();
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.quit = true,
            KeyCode::Char('d') | KeyCode::Char('D') => self.debug = !self.debug,
            KeyCode::Char('p') | KeyCode::Char('P') => self.paused = !self.paused,
            KeyCode::Char('b') | KeyCode::Char('B') => self.cycle_backdrop(),
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                let t = self.nav.navigate_index(index);
                self.apply(t);
            }
            KeyCode::PageDown => self.scroll_by(page),
            KeyCode::PageUp => self.scroll_by(-page),
            KeyCode::Down => self.scroll_by(page / 4.0),
            KeyCode::Up => self.scroll_by(-page / 4.0),
            _ => {}
        }
    }

    fn mouse(&mut self, mouse: &MouseEvent, now_ms: u64) {
        match mouse.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                let row = mouse.row.saturating_sub(1);
                self.frame_input.pointer =
                    FrameInput::normalise_pointer(mouse.column, row, self.cols, self.play_rows());
            }
            MouseEventKind::ScrollDown => self.scroll_by(self.section_height() / 4.0),
            MouseEventKind::ScrollUp => self.scroll_by(-self.section_height() / 4.0),
            MouseEventKind::Down(MouseButton::Left) => {
                if mouse.row == 0 {
                    let hit = self
                        .nav_spans
                        .iter()
                        .find(|(start, end, _)| (*start..*end).contains(&mouse.column))
                        .map(|(_, _, index)| *index);
                    if let Some(index) = hit {
                        let t = self.nav.navigate_index(index);
                        self.apply(t);
                    }
                } else if self.editing() && Some(mouse.row) == self.button_row {
                    self.start_scan(now_ms);
                }
            }
            _ => {}
        }
    }

    /// Advances timers, scrolling and the backdrop by one frame
    pub fn update(&mut self, now_ms: u64) {
        for event in self.scan.advance(now_ms) {
            match event {
                ScanEvent::LogAppended(entry) => self.feed.append(entry),
                ScanEvent::ReportReady => debug!("report reveal started"),
                ScanEvent::RevealFinished => debug!("report fully revealed"),
            }
        }

        let scroll = approach(self.frame_input.scroll_y, self.scroll_target, SCROLL_SMOOTHING);
        self.frame_input.scroll_y = if (scroll - self.scroll_target).abs() < 0.5 {
            self.scroll_target
        } else {
            scroll
        };

        if !self.paused {
            self.backdrop.tick(&self.frame_input);
        }

        self.frames_since_last_update += 1;
        let now = Instant::now();
        let duration = now.duration_since(self.last_fps_calculation);
        if duration.as_secs_f64() >= 1.0 {
            self.fps = self.frames_since_last_update as f64 / duration.as_secs_f64();
            self.frames_since_last_update = 0;
            self.last_fps_calculation = now;
        }
    }

    /// Composes the next frame
    pub fn paint(&mut self) -> Frame {
        let background = self.config.canvas.background;
        let mut frame = Frame::new(self.cols as usize, self.rows as usize, background);
        if self.cols == 0 || self.rows == 0 {
            return frame;
        }

        self.canvas.clear();
        self.backdrop.paint(&mut self.canvas, &self.frame_input);
        frame.blit_canvas(&self.canvas, 1);

        self.paint_nav(&mut frame);
        self.button_row = None;
        match self.nav.active().group {
            ViewGroup::Informational => self.paint_sections(&mut frame),
            ViewGroup::Application => match self.nav.active().kind {
                ViewKind::Scanner => self.paint_scanner(&mut frame),
                ViewKind::Logs => self.paint_logs(&mut frame),
                ViewKind::Page => self.paint_headline(&mut frame),
            },
        }
        self.paint_status(&mut frame);

        if self.paused {
            let text = "PAUSED";
            let x = (self.cols as usize).saturating_sub(text.len()) / 2;
            let y = self.rows as usize / 2;
            frame.put_str_on(x, y, text, INK, TEXT);
        }
        frame
    }

    fn paint_nav(&mut self, frame: &mut Frame) {
        let theme = self.nav.theme();
        frame.fill_row(0, NAV_BG);
        self.nav_spans.clear();

        let mut x = 1usize;
        for (index, view) in self.nav.views().iter().enumerate() {
            let label = format!(" {} {} ", index + 1, view.label);
            let width = label.chars().count();
            if self.nav.is_control_active(index) {
                frame.put_str_on(x, 0, &label, INK, theme.primary);
            } else {
                frame.put_str_on(x, 0, &label, TEXT, NAV_BG);
            }
            self.nav_spans.push((x as u16, (x + width) as u16, index));
            x += width + 1;
        }

        let brand = "NEONSCAN";
        let brand_x = (self.cols as usize).saturating_sub(brand.len() + 1);
        if brand_x > x {
            frame.put_str_on(brand_x, 0, brand, theme.secondary, NAV_BG);
        }
    }

    fn paint_sections(&self, frame: &mut Frame) {
        let theme = self.nav.theme();
        let play_rows = self.play_rows() as f64;
        let row_height = self.row_height();
        let scroll_rows = self.frame_input.scroll_y / row_height;
        let scanner = self
            .nav
            .views()
            .iter()
            .position(|v| v.kind == ViewKind::Scanner)
            .filter(|&i| i < 9);

        for (section, view) in self.nav.sections().enumerate() {
            let top = 1.0 + section as f64 * play_rows - scroll_rows;
            let title_row = top + (play_rows / 3.0).floor();
            if title_row < 1.0 || title_row >= 1.0 + play_rows {
                continue;
            }
            let row = title_row as usize;
            self.centered(frame, row, &format!("// {}", view.label), theme.secondary);
            self.centered(frame, row + 2, &view.headline, theme.primary);
            if section == 0 {
                if let Some(index) = scanner {
                    let hint = format!("press {} to open the scanner", index + 1);
                    self.centered(frame, row + 4, &hint, DIM);
                }
            }
        }
    }

    fn paint_headline(&self, frame: &mut Frame) {
        let view = self.nav.active();
        let row = 1 + self.play_rows() as usize / 3;
        self.centered(frame, row, &view.label, self.nav.theme().primary);
        self.centered(frame, row + 2, &view.headline, TEXT);
    }

    fn paint_scanner(&mut self, frame: &mut Frame) {
        let theme = self.nav.theme();
        let left = 2usize;
        let mut row = 2usize;

        frame.put_str(left, row, "> TARGET PAYLOAD:", theme.secondary);
        row += 1;
        let cursor = if self.scan.is_busy() { "" } else { "_" };
        frame.put_str_on(
            left,
            row,
            &format!(" {}{} ", self.input, cursor),
            TEXT,
            NAV_BG,
        );
        row += 2;

        let button = if self.scan.is_busy() {
            "[ SCANNING... ]"
        } else {
            "[ RUN DIAGNOSTICS ]"
        };
        let (fg, bg) = if self.scan.is_busy() {
            (DIM, NAV_BG)
        } else {
            (INK, theme.primary)
        };
        frame.put_str_on(left, row, button, fg, bg);
        self.button_row = Some(row as u16);
        row += 2;

        if self.scan.analysis().is_none() && self.scan.phase() == ScanPhase::Idle {
            return;
        }
        let bottom = self.rows.saturating_sub(1) as usize;
        let visible = bottom.saturating_sub(row + 1);
        frame.put_str(left, row, "-- ANALYSIS OUTPUT --", DIM);
        row += 1;
        for line in self.scan.display_tail(visible) {
            frame.put_str(left, row, line, theme.secondary);
            row += 1;
        }
    }

    fn paint_logs(&self, frame: &mut Frame) {
        let theme = self.nav.theme();
        let left = 2usize;
        frame.put_str(
            left,
            2,
            &format!("EVENTS LOGGED: {}", self.feed.counter()),
            theme.secondary,
        );
        let bottom = self.rows.saturating_sub(1) as usize;
        for (row, entry) in (4..bottom).zip(self.feed.entries()) {
            let color = match entry.severity {
                Severity::High => self.config.navigation.app_primary,
                Severity::Low => self.config.navigation.info_primary,
                Severity::Info => TEXT,
            };
            frame.put_str(left, row, &entry.to_string(), color);
        }
        if self.feed.is_empty() {
            frame.put_str(left, 4, "no events this session", DIM);
        }
    }

    fn paint_status(&self, frame: &mut Frame) {
        let y = self.rows.saturating_sub(1) as usize;
        frame.fill_row(y, NAV_BG);
        let line = if self.debug {
            let yaw = match &self.backdrop {
                Backdrop::Wave(field) => field.state().yaw,
                _ => 0.0,
            };
            format!(
                " {} {} | FPS: {:.2} | backdrop: {} | yaw: {:+.3} | scroll: {:.0} | events: {}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION"),
                self.fps,
                self.backdrop.kind(),
                yaw,
                self.frame_input.scroll_y,
                self.feed.counter()
            )
        } else if self.editing() {
            " type a payload | Enter scan | Esc leave | Tab next view | Ctrl-C quit".to_string()
        } else {
            " 1-5 views | Tab cycle | PgUp/PgDn scroll | b backdrop | d debug | p pause | q quit"
                .to_string()
        };
        frame.put_str_on(0, y, &line, DIM, NAV_BG);
    }

    fn centered(&self, frame: &mut Frame, row: usize, text: &str, color: Rgb) {
        let x = (self.cols as usize).saturating_sub(text.chars().count()) / 2;
        frame.put_str(x, row, text, color);
    }
}

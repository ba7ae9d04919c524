use anyhow::Result;
use crossterm::event::{DisableFocusChange, EnableFocusChange, KeyCode, KeyEvent, KeyEventKind};
use crossterm::execute;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    DefaultTerminal, Frame,
};
use rusqlite::Connection;
use std::fmt::Display;
use std::time::Duration;

use crate::clock::{Clock, SystemClock};
use crate::config::AppConfig;
use crate::db::repository::{day_key, SessionRepo};
use crate::db::store::{KeyValueStore, MetaStore};
use crate::engine::{
    DistractionTracker, ProgressionEngine, Purchase, SessionKind, SessionReward, SessionTimer, Shop,
    TimerEvent,
};
use crate::models::{SessionRecord, WeeklyGrid, CATALOG};
use crate::tui::events::{Event, EventHandler};
use crate::tui::theme;
use crate::tui::widgets::{boosts, header, profile, shop, statusbar, streak, timer};
use crate::utils::format::{format_minutes, pad_to};

const TASK_MAX_CHARS: usize = 48;
/// How long a notice stays in the status line.
const NOTICE_TICKS: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Dashboard,
    Setup,
    Session,
    Break,
    Shop,
    Stats,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Minutes,
    Task,
}

/// Launch straight into a focus session (`focusforge focus`).
#[derive(Debug, Clone)]
pub struct QuickStart {
    pub minutes: u32,
    pub task: Option<String>,
}

struct Notice {
    text: String,
    style: Style,
    ticks_left: u32,
}

/// The focus session currently on screen.
struct ActiveFocus {
    minutes: u32,
    task: Option<String>,
}

pub struct App<'a> {
    conn: &'a Connection,
    config: AppConfig,
    engine: ProgressionEngine<'a>,
    shop: Shop<'a>,
    distractions: DistractionTracker<'a>,

    pub view: View,
    pub input_mode: InputMode,
    pub should_quit: bool,
    /// Index into the presets; `presets.len()` selects "Custom".
    preset_idx: usize,
    minutes_buffer: String,
    task_buffer: String,
    input_error: Option<String>,

    timer: Option<SessionTimer>,
    focus: Option<ActiveFocus>,
    confirm_cancel: bool,
    shop_idx: usize,

    reward: Option<SessionReward>,
    notice: Option<Notice>,

    // Cached stats, refreshed after each session
    weekly: WeeklyGrid,
    best_streak: u32,
    recent: Vec<SessionRecord>,
}

impl<'a> App<'a> {
    pub fn new(
        conn: &'a Connection,
        store: &'a dyn KeyValueStore,
        clock: &'a dyn Clock,
        config: AppConfig,
    ) -> Result<Self> {
        let engine = ProgressionEngine::load(store, clock)?;
        let shop = Shop::load(store)?;
        let distractions = DistractionTracker::load(store, &config.blocking)?;
        let preset_idx = config
            .focus
            .presets
            .iter()
            .position(|&m| m == config.focus.default_minutes)
            .unwrap_or(0);

        let mut app = App {
            conn,
            config,
            engine,
            shop,
            distractions,
            view: View::Dashboard,
            input_mode: InputMode::Normal,
            should_quit: false,
            preset_idx,
            minutes_buffer: String::new(),
            task_buffer: String::new(),
            input_error: None,
            timer: None,
            focus: None,
            confirm_cancel: false,
            shop_idx: 0,
            reward: None,
            notice: None,
            weekly: WeeklyGrid::default(),
            best_streak: 0,
            recent: Vec::new(),
        };
        app.refresh_stats()?;
        Ok(app)
    }

    fn refresh_stats(&mut self) -> Result<()> {
        let today = self.engine.clock().today();
        self.weekly = SessionRepo::weekly_grid(self.conn, today)?;
        self.best_streak = SessionRepo::best_streak(self.conn)?;
        self.recent = SessionRepo::recent(self.conn, 8)?;
        Ok(())
    }

    fn notify(&mut self, text: impl Into<String>, style: Style) {
        self.notice = Some(Notice {
            text: text.into(),
            style,
            ticks_left: NOTICE_TICKS,
        });
    }

    fn report(&mut self, err: impl Display) {
        log::error!("{}", err);
        self.notify(format!("✗ {}", err), theme::red());
    }

    // ── Session flow ────────────────────────────────────────────────────

    pub fn start_focus(&mut self, minutes: u32, task: Option<String>) -> Result<()> {
        let minutes = self.config.focus.validate_minutes(minutes)?;
        let mut timer = SessionTimer::from_minutes(SessionKind::Focus, minutes)?;
        if let Some(ev) = timer.start() {
            log::debug!("{:?}", ev);
        }
        self.distractions.start();
        self.timer = Some(timer);
        self.focus = Some(ActiveFocus {
            minutes,
            task: task.filter(|t| !t.trim().is_empty()),
        });
        self.confirm_cancel = false;
        self.view = View::Session;
        Ok(())
    }

    fn start_break(&mut self) {
        let minutes = self.config.focus.break_minutes;
        match SessionTimer::from_minutes(SessionKind::Break, minutes) {
            Ok(mut timer) => {
                timer.start();
                self.timer = Some(timer);
                self.view = View::Break;
            }
            Err(_) => {
                // break_minutes = 0 disables breaks
                self.timer = None;
                self.view = View::Dashboard;
            }
        }
    }

    fn finish_focus(&mut self) {
        self.confirm_cancel = false;
        let distractions = self.distractions.stop();
        let Some(focus) = self.focus.take() else {
            return;
        };

        let reward = match self.engine.complete_session(focus.minutes) {
            Ok(reward) => reward,
            Err(e) => {
                self.report(e);
                self.timer = None;
                self.view = View::Dashboard;
                return;
            }
        };

        let record = SessionRecord {
            id: None,
            date: day_key(self.engine.clock().today()),
            minutes: focus.minutes,
            task: focus.task,
            xp_earned: reward.xp_earned,
            coins_earned: reward.coins_earned,
            distractions,
        };
        if let Err(e) = SessionRepo::record(self.conn, &record).and_then(|_| self.refresh_stats()) {
            self.report(e);
        }

        self.reward = Some(reward);
        self.start_break();
    }

    fn cancel_session(&mut self) {
        if let Some(timer) = self.timer.as_mut() {
            if let Some(ev) = timer.cancel() {
                log::debug!("{:?}", ev);
            }
        }
        if self.focus.take().is_some() {
            self.distractions.stop();
            self.notify("Session cancelled, no rewards earned", theme::dim());
        }
        self.timer = None;
        self.confirm_cancel = false;
        self.view = View::Dashboard;
    }

    fn on_timer_event(&mut self, event: TimerEvent) {
        log::debug!("{:?}", event);
        if let TimerEvent::Completed { kind, .. } = event {
            match kind {
                SessionKind::Focus => self.finish_focus(),
                SessionKind::Break => {
                    self.timer = None;
                    self.view = View::Dashboard;
                    self.notify("Break over, ready for another round?", theme::blue());
                }
            }
        }
    }

    // ── Events ──────────────────────────────────────────────────────────

    pub fn tick(&mut self) {
        match self.engine.sweep_expired_boosts() {
            Ok(ended) => {
                for boost in ended {
                    self.notify(format!("{} has ended", boost.name), theme::gold());
                }
            }
            Err(e) => self.report(e),
        }

        if let Some(notice) = self.notice.as_mut() {
            notice.ticks_left = notice.ticks_left.saturating_sub(1);
            if notice.ticks_left == 0 {
                self.notice = None;
            }
        }

        let event = self.timer.as_mut().and_then(SessionTimer::tick);
        if let Some(ev) = event {
            self.on_timer_event(ev);
        }
    }

    pub fn on_focus_lost(&mut self) {
        if self.view != View::Session {
            return;
        }
        match self.distractions.record_focus_lost() {
            Ok(true) => self.notify("Distraction noted, come back!", theme::red()),
            Ok(false) => {}
            Err(e) => self.report(e),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        // Only handle actual key presses; some terminals also report release/repeat
        if key.kind != KeyEventKind::Press {
            return;
        }
        // Any key dismisses the reward popup
        if self.reward.is_some() {
            self.reward = None;
            return;
        }
        match self.input_mode {
            InputMode::Minutes => self.handle_minutes_input(key),
            InputMode::Task => self.handle_task_input(key),
            InputMode::Normal => match self.view {
                View::Dashboard => self.handle_dashboard_key(key),
                View::Setup => self.handle_setup_key(key),
                View::Session => self.handle_session_key(key),
                View::Break => self.handle_break_key(key),
                View::Shop => self.handle_shop_key(key),
                View::Stats | View::Help => {
                    if matches!(key.code, KeyCode::Esc | KeyCode::Char('s') | KeyCode::Char('?')) {
                        self.view = View::Dashboard;
                    }
                }
            },
        }
    }

    fn handle_dashboard_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('f') | KeyCode::Enter => {
                self.input_error = None;
                self.view = View::Setup;
            }
            KeyCode::Char('b') => self.view = View::Shop,
            KeyCode::Char('s') => self.view = View::Stats,
            KeyCode::Char('?') => self.view = View::Help,
            _ => {}
        }
    }

    fn handle_setup_key(&mut self, key: KeyEvent) {
        let options = self.config.focus.presets.len() + 1;
        match key.code {
            KeyCode::Esc => self.view = View::Dashboard,
            KeyCode::Up | KeyCode::Left => {
                self.preset_idx = (self.preset_idx + options - 1) % options;
            }
            KeyCode::Down | KeyCode::Right => {
                self.preset_idx = (self.preset_idx + 1) % options;
            }
            KeyCode::Char('t') => self.input_mode = InputMode::Task,
            KeyCode::Char('c') => {
                self.preset_idx = options - 1;
                self.minutes_buffer.clear();
                self.input_mode = InputMode::Minutes;
            }
            KeyCode::Enter => match self.config.focus.presets.get(self.preset_idx).copied() {
                Some(minutes) => self.launch_from_setup(minutes),
                None => {
                    self.minutes_buffer.clear();
                    self.input_mode = InputMode::Minutes;
                }
            },
            _ => {}
        }
    }

    fn launch_from_setup(&mut self, minutes: u32) {
        let task = Some(self.task_buffer.trim().to_string());
        match self.start_focus(minutes, task) {
            Ok(()) => {
                self.input_error = None;
                self.task_buffer.clear();
            }
            Err(e) => self.input_error = Some(e.to_string()),
        }
    }

    fn handle_minutes_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                self.minutes_buffer.clear();
                self.input_error = None;
            }
            KeyCode::Enter => {
                let trimmed = self.minutes_buffer.trim().to_string();
                match trimmed.parse::<u32>() {
                    Ok(minutes) => {
                        self.input_mode = InputMode::Normal;
                        self.launch_from_setup(minutes);
                        if self.input_error.is_some() {
                            self.input_mode = InputMode::Minutes;
                        }
                    }
                    Err(_) => {
                        self.input_error = Some(format!(
                            "Enter a number between 1 and {}",
                            self.config.focus.max_minutes
                        ));
                    }
                }
            }
            KeyCode::Backspace => {
                self.minutes_buffer.pop();
                self.input_error = None;
            }
            KeyCode::Char(c) if c.is_ascii_digit() && self.minutes_buffer.len() < 3 => {
                self.minutes_buffer.push(c);
                self.input_error = None;
            }
            _ => {}
        }
    }

    fn handle_task_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Enter => self.input_mode = InputMode::Normal,
            KeyCode::Backspace => {
                self.task_buffer.pop();
            }
            KeyCode::Char(c) if self.task_buffer.chars().count() < TASK_MAX_CHARS => {
                self.task_buffer.push(c);
            }
            _ => {}
        }
    }

    fn handle_session_key(&mut self, key: KeyEvent) {
        if self.confirm_cancel {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => self.cancel_session(),
                _ => self.confirm_cancel = false,
            }
            return;
        }
        match key.code {
            KeyCode::Char(' ') | KeyCode::Char('p') => self.toggle_pause(),
            KeyCode::Esc | KeyCode::Char('c') => self.confirm_cancel = true,
            _ => {}
        }
    }

    fn handle_break_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(' ') | KeyCode::Char('p') => self.toggle_pause(),
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('s') => {
                self.timer = None;
                self.view = View::Dashboard;
            }
            _ => {}
        }
    }

    fn toggle_pause(&mut self) {
        let Some(timer) = self.timer.as_mut() else {
            return;
        };
        let event = if timer.is_paused() {
            timer.resume()
        } else {
            timer.pause()
        };
        if let Some(ev) = event {
            log::debug!("{:?}", ev);
        }
    }

    fn handle_shop_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('b') => self.view = View::Dashboard,
            KeyCode::Up => self.shop_idx = self.shop_idx.saturating_sub(1),
            KeyCode::Down => self.shop_idx = (self.shop_idx + 1).min(CATALOG.len() - 1),
            KeyCode::Enter => self.buy_selected(),
            _ => {}
        }
    }

    fn buy_selected(&mut self) {
        let Some(item) = CATALOG.get(self.shop_idx) else {
            return;
        };
        match self.shop.purchase(&mut self.engine, item.id) {
            Ok(purchase) => {
                let text = match purchase {
                    Purchase::Boost(boost) => format!("⚡ {} activated", boost.name),
                    Purchase::StreakFreeze { freezes } => {
                        format!("❄ Streak freeze added ({} in reserve)", freezes)
                    }
                    Purchase::Xp { awarded } => format!("+{} XP", awarded),
                    Purchase::Medal => format!("You've acquired {}!", item.name),
                };
                self.notify(text, theme::green());
            }
            Err(e) => self.report(e),
        }
    }

    // ── Drawing ─────────────────────────────────────────────────────────

    pub fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(theme::base()), area);

        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5), // header
                Constraint::Min(0),    // body
                Constraint::Length(1), // status bar
            ])
            .split(area);

        header::render(frame, outer[0], self.engine.profile(), self.engine.clock().now());

        match self.view {
            View::Dashboard | View::Help => self.draw_dashboard(frame, outer[1]),
            View::Setup => self.draw_setup(frame, outer[1]),
            View::Session | View::Break => self.draw_session(frame, outer[1]),
            View::Shop => shop::render(
                frame,
                outer[1],
                &self.shop,
                self.engine.profile().coins,
                self.shop_idx,
            ),
            View::Stats => self.draw_stats(frame, outer[1]),
        }

        self.draw_status(frame, outer[2]);

        if self.view == View::Help {
            self.draw_help_overlay(frame);
        }
        if self.confirm_cancel {
            self.draw_confirm_cancel(frame);
        }
        if let Some(reward) = &self.reward {
            self.draw_reward(frame, reward);
        }
    }

    fn draw_status(&self, frame: &mut Frame, area: Rect) {
        if let Some(notice) = &self.notice {
            let line = Line::from(Span::styled(notice.text.as_str(), notice.style));
            frame.render_widget(Paragraph::new(line).centered(), area);
            return;
        }
        let hints: &[(&str, &str)] = match (self.view, self.input_mode) {
            (_, InputMode::Minutes) => &[("[0-9]", "minutes"), ("[Enter]", "start"), ("[Esc]", "back")],
            (_, InputMode::Task) => &[("[Enter]", "done"), ("[Esc]", "done")],
            (View::Dashboard, _) => &[
                ("[f]", "focus"),
                ("[b]", "shop"),
                ("[s]", "stats"),
                ("[?]", "help"),
                ("[q]", "quit"),
            ],
            (View::Setup, _) => &[
                ("[↑ ↓]", "duration"),
                ("[c]", "custom"),
                ("[t]", "task"),
                ("[Enter]", "start"),
                ("[Esc]", "back"),
            ],
            (View::Session, _) => &[("[space]", "pause/resume"), ("[c]", "cancel")],
            (View::Break, _) => &[("[space]", "pause/resume"), ("[s]", "skip break")],
            (View::Shop, _) => &[("[↑ ↓]", "select"), ("[Enter]", "buy"), ("[Esc]", "back")],
            (View::Stats, _) | (View::Help, _) => &[("[Esc]", "back")],
        };
        statusbar::render(frame, area, hints);
    }

    fn draw_dashboard(&self, frame: &mut Frame, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(area);

        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(7), Constraint::Min(7)])
            .split(columns[0]);
        profile::render(frame, left[0], self.engine.profile());
        streak::render(
            frame,
            left[1],
            self.engine.profile(),
            &self.weekly,
            self.config.focus.daily_goal_minutes,
        );

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(7), Constraint::Min(0)])
            .split(columns[1]);
        let now = self.engine.clock().now_utc();
        boosts::render(
            frame,
            right[0],
            self.engine.boosts().active(now),
            self.engine.active_xp_multiplier(),
            now,
        );
        self.draw_today(frame, right[1]);
    }

    fn draw_today(&self, frame: &mut Frame, area: Rect) {
        let today = self.weekly.days.last();
        let minutes = today.map(|d| d.minutes).unwrap_or(0);
        let sessions = today.map(|d| d.sessions).unwrap_or(0);

        let mut lines = vec![
            Line::from(""),
            Line::from(vec![
                Span::styled("  Focused today  ", theme::dim()),
                Span::styled(format_minutes(u64::from(minutes)), theme::bold()),
                Span::styled(format!("  ·  {} session(s)", sessions), theme::dim()),
            ]),
        ];
        if let Some(last) = self.recent.first() {
            lines.push(Line::from(Span::styled(
                format!(
                    "  Last: {} min{}",
                    last.minutes,
                    last.task
                        .as_deref()
                        .map(|t| format!(" on {}", t))
                        .unwrap_or_default()
                ),
                theme::dim(),
            )));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("  [f] ", theme::ember()),
            Span::styled(
                format!("start a {} min session", self.config.focus.default_minutes),
                theme::dim(),
            ),
        ]));

        let block = Block::default()
            .title(Span::styled(" Today ", theme::ember()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border())
            .style(theme::surface());
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn draw_setup(&self, frame: &mut Frame, area: Rect) {
        let mut lines = vec![
            Line::from(""),
            Line::from(Span::styled("  How long do you want to focus?", theme::bold())),
            Line::from(""),
        ];

        let presets = &self.config.focus.presets;
        for (idx, minutes) in presets.iter().enumerate() {
            lines.push(self.option_line(idx, format!("{} minutes", minutes)));
        }
        let custom = if self.input_mode == InputMode::Minutes {
            format!("Custom: {}█", self.minutes_buffer)
        } else {
            format!("Custom (1-{})", self.config.focus.max_minutes)
        };
        lines.push(self.option_line(presets.len(), custom));

        lines.push(Line::from(""));
        let cursor = if self.input_mode == InputMode::Task { "█" } else { "" };
        let task = if self.task_buffer.is_empty() && self.input_mode != InputMode::Task {
            Span::styled("(none, press [t])", theme::dim())
        } else {
            Span::styled(format!("{}{}", self.task_buffer, cursor), theme::gold())
        };
        lines.push(Line::from(vec![Span::styled("  Task: ", theme::dim()), task]));

        let multiplier = self.engine.active_xp_multiplier();
        if multiplier > 1 {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!("  ⚡ x{} XP boost active", multiplier),
                theme::gold(),
            )));
        }

        if let Some(err) = &self.input_error {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(format!("  ✗ {}", err), theme::red())));
        }

        let block = Block::default()
            .title(Span::styled(" New Session ", theme::ember()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::ember())
            .style(theme::surface());
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn option_line(&self, idx: usize, label: String) -> Line<'static> {
        if idx == self.preset_idx {
            Line::from(Span::styled(
                format!("  ▸ {}", label),
                theme::ember().add_modifier(Modifier::BOLD),
            ))
        } else {
            Line::from(Span::styled(format!("    {}", label), theme::dim()))
        }
    }

    fn draw_session(&self, frame: &mut Frame, area: Rect) {
        let Some(t) = &self.timer else {
            return;
        };
        let focus = self.focus.as_ref();
        let motivation = (self.config.ui.show_motivation && t.kind() == SessionKind::Focus)
            .then(|| timer::motivation_for(t.elapsed_secs()));
        let distractions = (self.distractions.is_enabled() && t.kind() == SessionKind::Focus)
            .then(|| self.distractions.session_count());
        let info = timer::SessionInfo {
            task: focus.and_then(|f| f.task.as_deref()),
            distractions,
            motivation,
        };
        timer::render(frame, area, t, &info);
    }

    fn draw_stats(&self, frame: &mut Frame, area: Rect) {
        let p = self.engine.profile();
        let goal = self.config.focus.daily_goal_minutes;

        let mut lines = vec![
            Line::from(""),
            Line::from(vec![
                Span::styled("  Streak (current):  ", theme::dim()),
                Span::styled(
                    format!("{} days", p.streak),
                    theme::ember().add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(vec![
                Span::styled("  Streak (best):     ", theme::dim()),
                Span::styled(format!("{} days", self.best_streak.max(p.streak)), theme::ember()),
            ]),
            Line::from(vec![
                Span::styled("  Focus time:        ", theme::dim()),
                Span::styled(format_minutes(p.total_focus_minutes), theme::gold()),
            ]),
            Line::from(vec![
                Span::styled("  Sessions:          ", theme::dim()),
                Span::styled(format!("{}", p.total_sessions), theme::gold()),
            ]),
            Line::from(""),
            Line::from(Span::styled("  Last 7 Days", theme::ember())),
            Line::from(""),
        ];

        for day in &self.weekly.days {
            let filled = (day.goal_ratio(goal) * 12.0).round() as usize;
            let style = if day.goal_ratio(goal) >= 1.0 {
                theme::green()
            } else if day.sessions > 0 {
                theme::gold()
            } else {
                theme::dim()
            };
            lines.push(Line::from(vec![
                Span::styled(
                    format!("  {}{}  ", "█".repeat(filled), "░".repeat(12 - filled)),
                    style,
                ),
                Span::styled(format!("{}  {}m", day.date, day.minutes), theme::dim()),
            ]));
        }

        if !self.recent.is_empty() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled("  Recent Sessions", theme::ember())));
            lines.push(Line::from(""));
            for s in &self.recent {
                lines.push(Line::from(vec![
                    Span::styled(format!("  {}  ", s.date), theme::dim()),
                    Span::styled(pad_to(&format!("{}m", s.minutes), 6), theme::bold()),
                    Span::styled(
                        pad_to(&format!("+{} XP", s.xp_earned), 10),
                        theme::ember(),
                    ),
                    Span::styled(
                        s.task.clone().unwrap_or_default(),
                        theme::dim(),
                    ),
                ]));
            }
        }

        let block = Block::default()
            .title(Span::styled(" Stats ", theme::ember()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border())
            .style(theme::surface());
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn draw_help_overlay(&self, frame: &mut Frame) {
        let popup_area = popup(frame.area(), 50, 16);
        frame.render_widget(Clear, popup_area);

        let bindings = [
            ("[f] / Enter", "Set up a focus session"),
            ("[space]", "Pause / resume the timer"),
            ("[c]", "Cancel the session (no rewards)"),
            ("[s]", "Stats view / skip break"),
            ("[b]", "Shop"),
            ("[t]", "Name the task (setup)"),
            ("[?]", "Toggle help"),
            ("[q] / Esc", "Quit"),
        ];
        let mut help_text = vec![
            Line::from(Span::styled(
                "  Keybindings",
                theme::ember().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];
        for (key, label) in bindings {
            help_text.push(Line::from(vec![
                Span::styled(format!("  {}", pad_to(key, 14)), theme::ember()),
                Span::styled(label, theme::dim()),
            ]));
        }
        help_text.push(Line::from(""));
        help_text.push(Line::from(Span::styled(
            "  Each focused minute earns 2 XP and 2 coins.",
            theme::dim(),
        )));

        let block = Block::default()
            .title(Span::styled(" Help ", theme::ember()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::ember())
            .style(theme::surface());
        frame.render_widget(Paragraph::new(help_text).block(block), popup_area);
    }

    fn draw_confirm_cancel(&self, frame: &mut Frame) {
        let popup_area = popup(frame.area(), 46, 6);
        frame.render_widget(Clear, popup_area);

        let text = vec![
            Line::from(""),
            Line::from(Span::styled("  Give up this session?", theme::bold())),
            Line::from(Span::styled(
                "  [y] cancel, no rewards  ·  [any key] keep going",
                theme::dim(),
            )),
        ];
        let block = Block::default()
            .title(Span::styled(" Cancel ", theme::red()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::red())
            .style(theme::surface());
        frame.render_widget(Paragraph::new(text).block(block), popup_area);
    }

    fn draw_reward(&self, frame: &mut Frame, reward: &SessionReward) {
        let popup_area = popup(frame.area(), 44, 12);
        frame.render_widget(Clear, popup_area);

        let xp = if reward.multiplier > 1 {
            format!("+{} XP  (x{} boost)", reward.xp_earned, reward.multiplier)
        } else {
            format!("+{} XP", reward.xp_earned)
        };
        let mut lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("  {} minutes forged", reward.minutes),
                theme::bold(),
            )),
            Line::from(""),
            Line::from(Span::styled(format!("  {}", xp), theme::ember())),
            Line::from(Span::styled(
                format!("  +{} coins", reward.coins_earned),
                theme::gold(),
            )),
            Line::from(Span::styled(
                format!("  🔥 {} day streak", reward.streak),
                theme::ember(),
            )),
        ];
        if reward.freeze_used {
            lines.push(Line::from(Span::styled(
                "  ❄ A streak freeze saved your streak",
                theme::blue(),
            )));
        }
        if let Some(level) = reward.new_level {
            lines.push(Line::from(Span::styled(
                format!("  ▲ Level {}!", level),
                theme::green().add_modifier(Modifier::BOLD),
            )));
        }
        if let Some(rank) = reward.new_rank {
            lines.push(Line::from(Span::styled(
                format!("  ★ New rank: {}", rank),
                theme::gold().add_modifier(Modifier::BOLD),
            )));
        }

        let block = Block::default()
            .title(Span::styled(" Session Complete ", theme::green()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::green())
            .style(theme::surface());
        frame.render_widget(Paragraph::new(lines).block(block), popup_area);
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let events = EventHandler::new(Duration::from_secs(1));
        loop {
            terminal.draw(|frame| self.draw(frame))?;

            match events.next()? {
                Event::Key(key) => {
                    self.handle_key(key);
                    if self.should_quit {
                        break;
                    }
                }
                Event::FocusLost => self.on_focus_lost(),
                Event::Tick => self.tick(),
            }
        }
        Ok(())
    }
}

fn popup(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Run the TUI event loop.
pub fn run(conn: &Connection, config: AppConfig, quick_start: Option<QuickStart>) -> Result<()> {
    let store = MetaStore::new(conn);
    let clock = SystemClock;
    let mut app = App::new(conn, &store, &clock, config)?;
    if let Some(qs) = quick_start {
        app.start_focus(qs.minutes, qs.task)?;
    }

    let mut terminal = ratatui::init();
    if let Err(e) = execute!(std::io::stdout(), EnableFocusChange) {
        log::warn!("Terminal focus events unavailable: {}", e);
    }

    let result = app.run_loop(&mut terminal);

    let _ = execute!(std::io::stdout(), DisableFocusChange);
    ratatui::restore();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::db::migrations::run_migrations;
    use crate::db::store::MemoryStore;
    use crossterm::event::KeyModifiers;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn press(app: &mut App<'_>, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn blocking_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.blocking.enabled = true;
        config
    }

    #[test]
    fn completed_session_pays_out_and_starts_break() {
        let conn = conn();
        let store = MemoryStore::new();
        let clock = FixedClock::at(2026, 3, 10);
        let mut app = App::new(&conn, &store, &clock, AppConfig::default()).unwrap();

        app.start_focus(1, Some("inbox zero".to_string())).unwrap();
        for _ in 0..60 {
            app.tick();
        }

        assert_eq!(app.view, View::Break);
        let reward = app.reward.clone().unwrap();
        assert_eq!(reward.xp_earned, 2);
        assert_eq!(reward.streak, 1);
        assert_eq!(app.engine.profile().coins, 2);

        let log = SessionRepo::recent(&conn, 5).unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].task.as_deref(), Some("inbox zero"));
        assert_eq!(app.weekly.total_minutes(), 1);

        // First key only closes the popup
        press(&mut app, KeyCode::Char('s'));
        assert!(app.reward.is_none());
        assert_eq!(app.view, View::Break);
        press(&mut app, KeyCode::Char('s'));
        assert_eq!(app.view, View::Dashboard);
    }

    #[test]
    fn cancel_requires_confirmation_and_awards_nothing() {
        let conn = conn();
        let store = MemoryStore::new();
        let clock = FixedClock::at(2026, 3, 10);
        let mut app = App::new(&conn, &store, &clock, AppConfig::default()).unwrap();

        app.start_focus(25, None).unwrap();
        app.tick();
        press(&mut app, KeyCode::Char('c'));
        assert!(app.confirm_cancel);
        press(&mut app, KeyCode::Char('n'));
        assert!(!app.confirm_cancel);
        assert_eq!(app.view, View::Session);

        press(&mut app, KeyCode::Char('c'));
        press(&mut app, KeyCode::Char('y'));
        assert_eq!(app.view, View::Dashboard);
        assert!(app.timer.is_none());
        assert_eq!(app.engine.profile().xp, 0);
        assert!(SessionRepo::recent(&conn, 5).unwrap().is_empty());
    }

    #[test]
    fn completion_closes_pending_cancel_prompt() {
        let conn = conn();
        let store = MemoryStore::new();
        let clock = FixedClock::at(2026, 3, 10);
        let mut app = App::new(&conn, &store, &clock, AppConfig::default()).unwrap();

        app.start_focus(1, None).unwrap();
        for _ in 0..59 {
            app.tick();
        }
        press(&mut app, KeyCode::Char('c'));
        assert!(app.confirm_cancel);

        app.tick();
        assert_eq!(app.view, View::Break);
        assert!(!app.confirm_cancel);
        assert_eq!(app.engine.profile().total_sessions, 1);
    }

    #[test]
    fn paused_session_does_not_count_down() {
        let conn = conn();
        let store = MemoryStore::new();
        let clock = FixedClock::at(2026, 3, 10);
        let mut app = App::new(&conn, &store, &clock, AppConfig::default()).unwrap();

        app.start_focus(1, None).unwrap();
        press(&mut app, KeyCode::Char(' '));
        for _ in 0..120 {
            app.tick();
        }
        assert_eq!(app.view, View::Session);
        assert_eq!(app.timer.as_ref().unwrap().remaining_secs(), 60);
    }

    #[test]
    fn setup_preset_and_custom_minutes() {
        let conn = conn();
        let store = MemoryStore::new();
        let clock = FixedClock::at(2026, 3, 10);
        let mut app = App::new(&conn, &store, &clock, AppConfig::default()).unwrap();

        press(&mut app, KeyCode::Char('f'));
        assert_eq!(app.view, View::Setup);
        // Default 25 is preset index 1
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.view, View::Session);
        assert_eq!(app.timer.as_ref().unwrap().total_secs(), 25 * 60);
        press(&mut app, KeyCode::Char('c'));
        press(&mut app, KeyCode::Char('y'));

        press(&mut app, KeyCode::Char('f'));
        press(&mut app, KeyCode::Char('c'));
        assert_eq!(app.input_mode, InputMode::Minutes);
        for c in ['2', '0', '0'] {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Enter);
        assert!(app.input_error.is_some());
        assert_eq!(app.view, View::Setup);

        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.view, View::Session);
        assert_eq!(app.timer.as_ref().unwrap().total_secs(), 2 * 60);
    }

    #[test]
    fn focus_loss_counts_only_during_focus() {
        let conn = conn();
        let store = MemoryStore::new();
        let clock = FixedClock::at(2026, 3, 10);
        let mut app = App::new(&conn, &store, &clock, blocking_config()).unwrap();

        app.on_focus_lost();
        assert_eq!(app.distractions.count(), 0);

        app.start_focus(1, None).unwrap();
        app.on_focus_lost();
        app.on_focus_lost();
        assert_eq!(app.distractions.session_count(), 2);

        for _ in 0..60 {
            app.tick();
        }
        assert_eq!(app.view, View::Break);
        app.on_focus_lost();
        assert_eq!(app.distractions.count(), 2);
        assert_eq!(SessionRepo::recent(&conn, 1).unwrap()[0].distractions, 2);
    }

    #[test]
    fn shop_purchase_from_keys() {
        let conn = conn();
        let store = MemoryStore::new();
        let clock = FixedClock::at(2026, 3, 10);
        let mut app = App::new(&conn, &store, &clock, AppConfig::default()).unwrap();
        app.engine.add_coins(100).unwrap();

        press(&mut app, KeyCode::Char('b'));
        assert_eq!(app.view, View::Shop);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.engine.profile().coins, 0);
        assert_eq!(app.engine.active_xp_multiplier(), 2);

        // Second purchase fails without changing the balance
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.engine.profile().coins, 0);
        assert!(app.notice.is_some());
    }

    #[test]
    fn expired_boost_is_announced_on_tick() {
        let conn = conn();
        let store = MemoryStore::new();
        let clock = FixedClock::at(2026, 3, 10);
        let mut app = App::new(&conn, &store, &clock, AppConfig::default()).unwrap();
        app.engine
            .purchase_boost("double_xp_30", "2x XP Boost", 2, 30)
            .unwrap();

        clock.advance(chrono::Duration::minutes(31));
        app.tick();
        assert!(app.engine.boosts().all().is_empty());
        assert!(app.notice.as_ref().unwrap().text.contains("ended"));
    }
}

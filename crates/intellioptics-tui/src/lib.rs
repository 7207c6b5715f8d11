// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod present;

pub use present::{
    BarDetail, CardList, ChartBar, DetailRenderer, GaugeDetail, ListRenderer, TableList,
    card_lines, chart_bars, detail_lines, detail_renderer, detail_title, list_renderer,
};

use anyhow::{Context, Result, anyhow};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use intellioptics_app::{
    AppCommand, AppEvent, BodyView, DashboardState, DetailKind, Detector, InputMode, LayoutKind,
    LiveEvent, LiveStatus, LoadError, SnapshotSource,
};
use log::{debug, info, warn};
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use time::OffsetDateTime;
use time::macros::format_description;

pub const DEFAULT_APP_NAME: &str = "IntelliOptics Dashboard";

const POLL_INTERVAL: Duration = Duration::from_millis(120);
const STATUS_CLEAR_DELAY: Duration = Duration::from_secs(4);

/// Presentation settings handed to the view at mount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewConfig {
    pub app_name: String,
    pub layout: LayoutKind,
    pub detail: DetailKind,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_owned(),
            layout: LayoutKind::default(),
            detail: DetailKind::default(),
        }
    }
}

/// Handle on an open push channel. Dropping it closes the channel.
pub trait LiveFeed {
    /// Returns false once the channel has gone away.
    fn request_update(&self) -> bool;
}

pub trait DashboardRuntime {
    fn fetch_detectors(&mut self) -> Result<Vec<Detector>, LoadError>;

    /// Delivers the fetch result as `InternalEvent::Fetched`. The default
    /// fetches inline; runtimes backed by the network move it off the UI
    /// thread.
    fn spawn_fetch(&mut self, tx: Sender<InternalEvent>) -> Result<()> {
        let result = self.fetch_detectors();
        tx.send(InternalEvent::Fetched(result))
            .map_err(|_| anyhow!("dashboard event channel closed"))?;
        Ok(())
    }

    /// Opens the push channel, forwarding its events as
    /// `InternalEvent::Live`. `None` means live updates are off.
    fn subscribe(&mut self, _tx: Sender<InternalEvent>) -> Result<Option<Box<dyn LiveFeed>>> {
        Ok(None)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
    Fetched(Result<Vec<Detector>, LoadError>),
    Live(LiveEvent),
}

#[derive(Default)]
struct ViewData {
    status_token: u64,
    feed: Option<Box<dyn LiveFeed>>,
}

pub fn run_app<R: DashboardRuntime>(
    state: &mut DashboardState,
    config: &ViewConfig,
    runtime: &mut R,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    if let Err(error) = execute!(stdout, terminal::EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(error).context("enter alternate screen");
    }

    let backend = CrosstermBackend::new(stdout);
    let result = Terminal::new(backend)
        .context("create terminal")
        .and_then(|mut terminal| {
            let (internal_tx, internal_rx) = mpsc::channel();
            let mut view_data = mount_view(state, runtime, &internal_tx);
            let outcome = event_loop(
                &mut terminal,
                state,
                config,
                &mut view_data,
                &internal_tx,
                &internal_rx,
            );
            // Closes the push channel before the terminal is handed back.
            drop(view_data);
            outcome
        });

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn event_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    state: &mut DashboardState,
    config: &ViewConfig,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    internal_rx: &Receiver<InternalEvent>,
) -> Result<()> {
    loop {
        process_internal_events(state, view_data, internal_tx, internal_rx);

        terminal
            .draw(|frame| render(frame, state, config))
            .context("draw frame")?;

        if event::poll(POLL_INTERVAL).context("poll event")?
            && let Event::Key(key) = event::read().context("read event")?
            && handle_key_event(state, view_data, internal_tx, key)
        {
            return Ok(());
        }
    }
}

/// Opens the push channel and starts the initial fetch. Both report back
/// through `tx`.
fn mount_view<R: DashboardRuntime>(
    state: &mut DashboardState,
    runtime: &mut R,
    tx: &Sender<InternalEvent>,
) -> ViewData {
    let mut view_data = ViewData::default();

    match runtime.subscribe(tx.clone()) {
        Ok(Some(feed)) => {
            state.dispatch(AppCommand::SetLiveStatus(LiveStatus::Connecting));
            view_data.feed = Some(feed);
        }
        Ok(None) => {
            state.dispatch(AppCommand::SetLiveStatus(LiveStatus::Disabled));
        }
        Err(error) => {
            warn!("push channel unavailable: {error:#}");
            state.dispatch(AppCommand::SetLiveStatus(LiveStatus::Closed(Some(format!(
                "{error:#}"
            )))));
        }
    }

    if let Err(error) = runtime.spawn_fetch(tx.clone()) {
        warn!("detector fetch did not start: {error:#}");
        state.dispatch(AppCommand::FailLoad(LoadError::Network(format!("{error:#}"))));
    }
    view_data
}

fn process_internal_events(
    state: &mut DashboardState,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::Fetched(Ok(detectors)) => {
                apply_snapshot(state, detectors, SnapshotSource::Fetch);
            }
            InternalEvent::Fetched(Err(error)) => {
                dispatch_with_status(state, view_data, tx, AppCommand::FailLoad(error));
            }
            InternalEvent::Live(event) => handle_live_event(state, event),
        }
    }
}

fn handle_live_event(state: &mut DashboardState, event: LiveEvent) {
    match event {
        LiveEvent::Connected => {
            state.dispatch(AppCommand::SetLiveStatus(LiveStatus::Connected));
        }
        LiveEvent::Snapshot(detectors) => {
            apply_snapshot(state, detectors, SnapshotSource::Push);
        }
        LiveEvent::Closed(reason) => {
            info!("push channel closed: {}", reason.as_deref().unwrap_or("clean"));
            state.dispatch(AppCommand::SetLiveStatus(LiveStatus::Closed(reason)));
        }
    }
}

fn apply_snapshot(state: &mut DashboardState, detectors: Vec<Detector>, source: SnapshotSource) {
    let events = state.dispatch(AppCommand::ApplySnapshot {
        detectors,
        source,
        received_at: OffsetDateTime::now_utc(),
    });
    debug!("snapshot applied: {events:?}");
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_DELAY);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    state: &mut DashboardState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    dispatch_with_status(
        state,
        view_data,
        internal_tx,
        AppCommand::SetStatus(message.into()),
    );
}

/// Dispatches `command` and arms the status-clear timer when it set a
/// status message.
fn dispatch_with_status(
    state: &mut DashboardState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: AppCommand,
) {
    let events = state.dispatch(command);
    if events
        .iter()
        .any(|event| matches!(event, AppEvent::StatusUpdated(_)))
    {
        view_data.status_token = view_data.status_token.saturating_add(1);
        schedule_status_clear(internal_tx, view_data.status_token);
    }
}

/// Returns true when the view should unmount.
fn handle_key_event(
    state: &mut DashboardState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => return true,
            KeyCode::Char('u') => {
                state.dispatch(AppCommand::ClearSearch);
            }
            _ => {}
        }
        return false;
    }

    if state.mode == InputMode::Search {
        let command = match key.code {
            KeyCode::Esc | KeyCode::Enter => AppCommand::LeaveSearch,
            KeyCode::Backspace => AppCommand::PopSearchChar,
            KeyCode::Char(value) => AppCommand::PushSearchChar(value),
            _ => return false,
        };
        state.dispatch(command);
        return false;
    }

    if state.detail_open() {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                state.dispatch(AppCommand::CloseDetail);
            }
            KeyCode::Char('r') => request_update(state, view_data, internal_tx),
            _ => {}
        }
        return false;
    }

    let command = match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('/') => AppCommand::EnterSearch,
        KeyCode::Enter => AppCommand::OpenDetail,
        KeyCode::Char('j') | KeyCode::Down => AppCommand::MoveCursor(1),
        KeyCode::Char('k') | KeyCode::Up => AppCommand::MoveCursor(-1),
        KeyCode::Char('g') | KeyCode::Home => AppCommand::CursorFirst,
        KeyCode::Char('G') | KeyCode::End => AppCommand::CursorLast,
        KeyCode::Char('t') => AppCommand::ToggleLayout,
        KeyCode::Char('r') => {
            request_update(state, view_data, internal_tx);
            return false;
        }
        _ => return false,
    };
    dispatch_with_status(state, view_data, internal_tx, command);
    false
}

fn request_update(
    state: &mut DashboardState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let message = match &view_data.feed {
        None => "live updates are off",
        Some(feed) if feed.request_update() => "update requested",
        Some(_) => "live channel closed",
    };
    emit_status(state, view_data, internal_tx, message);
}

fn body_message(state: &DashboardState) -> Option<String> {
    match state.body() {
        BodyView::Loading => Some("Loading detectors...".to_owned()),
        BodyView::Error(error) => Some(format!("Error: {error}")),
        BodyView::Empty => Some("No detectors found".to_owned()),
        BodyView::List(_) => None,
    }
}

fn header_text(state: &DashboardState, config: &ViewConfig) -> String {
    let updated = state.last_snapshot.as_ref().map_or_else(
        || "waiting for data".to_owned(),
        |snapshot| {
            let clock = snapshot
                .received_at
                .format(format_description!("[hour]:[minute]:[second]"))
                .unwrap_or_default();
            format!("updated {clock} UTC ({})", snapshot.source.as_str())
        },
    );
    format!("{} | {} | {updated}", config.app_name, state.live.label())
}

fn search_text(state: &DashboardState) -> String {
    match state.mode {
        InputMode::Search => format!("search: {}_", state.search_text),
        InputMode::Navigate if state.search_text.is_empty() => "search: (press /)".to_owned(),
        InputMode::Navigate => format!("search: {}", state.search_text),
    }
}

fn status_text(state: &DashboardState) -> String {
    let (mode, hints) = match state.mode {
        InputMode::Search => ("SEARCH", "type to filter | enter/esc done | ctrl+u clear"),
        InputMode::Navigate if state.detail_open() => ("DETAIL", "esc/q close | r refresh"),
        InputMode::Navigate => (
            "NAV",
            "j/k g/G | enter detail | / search | t layout | r refresh | q quit",
        ),
    };
    let counts = format!(
        "{}/{} detectors",
        state.visible_detectors().len(),
        state.detectors().len()
    );
    match &state.status_line {
        Some(status) => format!("{mode} | {status} | {counts} | {hints}"),
        None => format!("{mode} | {counts} | {hints}"),
    }
}

fn live_color(status: &LiveStatus) -> Color {
    match status {
        LiveStatus::Connected => Color::Green,
        LiveStatus::Connecting => Color::Yellow,
        LiveStatus::Disabled => Color::DarkGray,
        LiveStatus::Closed(_) => Color::Red,
    }
}

fn render(frame: &mut ratatui::Frame<'_>, state: &DashboardState, config: &ViewConfig) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            header_text(state, config),
            Style::default()
                .fg(live_color(&state.live))
                .add_modifier(Modifier::BOLD),
        ),
    ]));
    frame.render_widget(header, chunks[0]);

    let search_style = if state.mode == InputMode::Search {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Gray)
    };
    frame.render_widget(
        Paragraph::new(search_text(state)).style(search_style),
        chunks[1],
    );

    render_body(frame, state, chunks[2]);

    frame.render_widget(
        Paragraph::new(status_text(state)).style(Style::default().fg(Color::DarkGray)),
        chunks[3],
    );

    if let Some(detector) = state.selected_detector() {
        render_detail(frame, config, detector, chunks[2]);
    }
}

fn render_body(frame: &mut ratatui::Frame<'_>, state: &DashboardState, area: Rect) {
    if let Some(message) = body_message(state) {
        let style = if matches!(state.body(), BodyView::Error(_)) {
            Style::default().fg(Color::Red)
        } else {
            Style::default()
        };
        let body = Paragraph::new(message)
            .style(style)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(body, area);
        return;
    }

    let visible = state.visible_detectors();
    list_renderer(state.layout).render(frame, area, &visible, state.cursor);
}

fn render_detail(
    frame: &mut ratatui::Frame<'_>,
    config: &ViewConfig,
    detector: &Detector,
    area: Rect,
) {
    let popup = centered_rect(70, 80, area);
    frame.render_widget(Clear, popup);
    let block = Block::default()
        .title(detail_title(detector))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);
    detail_renderer(config.detail).render(frame, inner, detector);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::{
        DashboardRuntime, InternalEvent, LiveFeed, ViewConfig, ViewData, body_message,
        handle_key_event, header_text, mount_view, process_internal_events, render,
        status_text,
    };
    use anyhow::Result;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use intellioptics_app::{
        DashboardState, DetailKind, Detector, InputMode, LayoutKind, LiveEvent, LiveStatus,
        LoadError,
    };
    use intellioptics_testkit::{detector, detector_with_accuracy};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use std::cell::Cell;
    use std::rc::Rc;
    use std::sync::mpsc::{self, Receiver, Sender};

    struct TestFeed {
        requests: Rc<Cell<usize>>,
        open: bool,
    }

    impl LiveFeed for TestFeed {
        fn request_update(&self) -> bool {
            if self.open {
                self.requests.set(self.requests.get() + 1);
            }
            self.open
        }
    }

    #[derive(Default)]
    struct TestRuntime {
        result: Option<Result<Vec<Detector>, LoadError>>,
        fetches: usize,
        live: Option<Rc<Cell<usize>>>,
    }

    impl TestRuntime {
        fn returning(result: Result<Vec<Detector>, LoadError>) -> Self {
            Self {
                result: Some(result),
                ..Self::default()
            }
        }

        fn with_live(mut self, requests: Rc<Cell<usize>>) -> Self {
            self.live = Some(requests);
            self
        }
    }

    impl DashboardRuntime for TestRuntime {
        fn fetch_detectors(&mut self) -> Result<Vec<Detector>, LoadError> {
            self.fetches += 1;
            self.result.clone().unwrap_or_else(|| Ok(Vec::new()))
        }

        fn subscribe(&mut self, _tx: Sender<InternalEvent>) -> Result<Option<Box<dyn LiveFeed>>> {
            Ok(self.live.clone().map(|requests| {
                Box::new(TestFeed {
                    requests,
                    open: true,
                }) as Box<dyn LiveFeed>
            }))
        }
    }

    struct Harness {
        state: DashboardState,
        view_data: ViewData,
        tx: Sender<InternalEvent>,
        rx: Receiver<InternalEvent>,
    }

    impl Harness {
        fn mount(runtime: &mut TestRuntime) -> Self {
            let (tx, rx) = mpsc::channel();
            let mut state = DashboardState::default();
            let view_data = mount_view(&mut state, runtime, &tx);
            Self {
                state,
                view_data,
                tx,
                rx,
            }
        }

        fn pump(&mut self) {
            process_internal_events(&mut self.state, &mut self.view_data, &self.tx, &self.rx);
        }

        fn send(&mut self, event: InternalEvent) {
            self.tx.send(event).expect("channel should be open");
            self.pump();
        }

        fn key(&mut self, code: KeyCode) -> bool {
            self.key_with(code, KeyModifiers::NONE)
        }

        fn key_with(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
            handle_key_event(
                &mut self.state,
                &mut self.view_data,
                &self.tx,
                KeyEvent::new(code, modifiers),
            )
        }

        fn type_text(&mut self, text: &str) {
            for value in text.chars() {
                self.key(KeyCode::Char(value));
            }
        }

        fn visible_names(&self) -> Vec<String> {
            self.state
                .visible_detectors()
                .iter()
                .map(|detector| detector.name.clone())
                .collect()
        }
    }

    fn render_text(state: &DashboardState, config: &ViewConfig, width: u16, height: u16) -> String {
        let mut terminal =
            Terminal::new(TestBackend::new(width, height)).expect("test backend should initialize");
        terminal
            .draw(|frame| render(frame, state, config))
            .expect("dashboard should render");

        let buffer = terminal.backend().buffer();
        let mut lines = Vec::with_capacity(usize::from(height));
        for y in 0..height {
            let mut line = String::new();
            for x in 0..width {
                if let Some(cell) = buffer.cell((x, y)) {
                    line.push_str(cell.symbol());
                }
            }
            lines.push(line.trim_end().to_owned());
        }
        lines.join("\n")
    }

    #[test]
    fn body_shows_loading_until_first_result_arrives() {
        let mut runtime = TestRuntime::returning(Ok(vec![detector(1, "Cam1")]));
        let mut harness = Harness::mount(&mut runtime);
        assert_eq!(runtime.fetches, 1);
        assert_eq!(
            body_message(&harness.state).as_deref(),
            Some("Loading detectors...")
        );

        harness.pump();
        assert_eq!(body_message(&harness.state), None);
        assert_eq!(harness.visible_names(), vec!["Cam1"]);
    }

    #[test]
    fn empty_results_show_no_detectors_found() {
        let mut runtime = TestRuntime::returning(Ok(Vec::new()));
        let mut harness = Harness::mount(&mut runtime);
        harness.pump();
        assert_eq!(
            body_message(&harness.state).as_deref(),
            Some("No detectors found")
        );
    }

    #[test]
    fn failed_fetch_shows_error_message() {
        let mut runtime =
            TestRuntime::returning(Err(LoadError::http(500, Some("db down".to_owned()))));
        let mut harness = Harness::mount(&mut runtime);
        harness.pump();
        assert_eq!(
            body_message(&harness.state).as_deref(),
            Some("Error: db down")
        );
    }

    #[test]
    fn push_snapshot_replaces_list_and_clears_error() {
        let mut runtime = TestRuntime::returning(Err(LoadError::Format));
        let mut harness = Harness::mount(&mut runtime);
        harness.pump();
        assert_eq!(
            body_message(&harness.state).as_deref(),
            Some("Error: unexpected API response format")
        );

        let mut pushed = Detector::new(1, "Cam1");
        pushed.status = Some("ON".to_owned());
        pushed.confidence_threshold = Some(0.9);
        harness.send(InternalEvent::Live(LiveEvent::Snapshot(vec![pushed.clone()])));

        assert_eq!(body_message(&harness.state), None);
        assert_eq!(harness.state.detectors(), &[pushed]);
    }

    #[test]
    fn live_events_drive_live_status() {
        let requests = Rc::new(Cell::new(0));
        let mut runtime = TestRuntime::returning(Ok(Vec::new())).with_live(requests);
        let mut harness = Harness::mount(&mut runtime);
        assert_eq!(harness.state.live, LiveStatus::Connecting);

        harness.send(InternalEvent::Live(LiveEvent::Connected));
        assert_eq!(harness.state.live, LiveStatus::Connected);

        harness.send(InternalEvent::Live(LiveEvent::Closed(Some("reset".to_owned()))));
        assert_eq!(
            harness.state.live,
            LiveStatus::Closed(Some("reset".to_owned()))
        );
        assert_eq!(
            body_message(&harness.state).as_deref(),
            Some("No detectors found")
        );
    }

    #[test]
    fn mount_without_live_channel_reports_live_off() {
        let mut runtime = TestRuntime::default();
        let harness = Harness::mount(&mut runtime);
        assert_eq!(harness.state.live, LiveStatus::Disabled);
    }

    #[test]
    fn typing_a_search_filters_live() {
        let mut runtime =
            TestRuntime::returning(Ok(vec![detector(1, "Cam1"), detector(2, "Sensor2")]));
        let mut harness = Harness::mount(&mut runtime);
        harness.pump();

        assert!(!harness.key(KeyCode::Char('/')));
        assert_eq!(harness.state.mode, InputMode::Search);
        harness.type_text("cam");
        assert_eq!(harness.visible_names(), vec!["Cam1"]);

        harness.key(KeyCode::Backspace);
        harness.key(KeyCode::Backspace);
        harness.key(KeyCode::Backspace);
        assert_eq!(harness.visible_names(), vec!["Cam1", "Sensor2"]);
    }

    #[test]
    fn q_is_search_text_while_searching() {
        let mut runtime = TestRuntime::returning(Ok(vec![detector(1, "Cam1")]));
        let mut harness = Harness::mount(&mut runtime);
        harness.pump();

        harness.key(KeyCode::Char('/'));
        assert!(!harness.key(KeyCode::Char('q')));
        assert_eq!(harness.state.search_text, "q");
        assert_eq!(
            body_message(&harness.state).as_deref(),
            Some("No detectors found")
        );

        harness.key_with(KeyCode::Char('u'), KeyModifiers::CONTROL);
        assert_eq!(harness.state.search_text, "");
    }

    #[test]
    fn enter_opens_detail_and_escape_clears_selection() {
        let mut runtime = TestRuntime::returning(Ok(vec![
            detector(1, "Sensor2"),
            detector_with_accuracy(2, "Cam1", 80.0, 94.0, 67.0),
        ]));
        let mut harness = Harness::mount(&mut runtime);
        harness.pump();

        harness.key(KeyCode::Char('/'));
        harness.type_text("cam");
        harness.key(KeyCode::Enter);
        assert_eq!(harness.state.mode, InputMode::Navigate);
        assert_eq!(harness.state.search_text, "cam");

        harness.key(KeyCode::Enter);
        let selected = harness
            .state
            .selected_detector()
            .expect("detail should be open");
        assert_eq!(selected.name, "Cam1");
        let accuracy = selected.accuracy_breakdown();
        assert_eq!(
            (accuracy.projected, accuracy.yes, accuracy.no),
            (Some(80.0), Some(94.0), Some(67.0))
        );

        assert!(!harness.key(KeyCode::Esc));
        assert_eq!(harness.state.selected, None);
    }

    #[test]
    fn q_closes_detail_before_quitting() {
        let mut runtime = TestRuntime::returning(Ok(vec![detector(1, "Cam1")]));
        let mut harness = Harness::mount(&mut runtime);
        harness.pump();

        harness.key(KeyCode::Enter);
        assert!(harness.state.detail_open());
        assert!(!harness.key(KeyCode::Char('q')));
        assert!(!harness.state.detail_open());
        assert!(harness.key(KeyCode::Char('q')));
    }

    #[test]
    fn ctrl_c_quits_from_any_mode() {
        let mut runtime = TestRuntime::default();
        let mut harness = Harness::mount(&mut runtime);
        harness.key(KeyCode::Char('/'));
        assert!(harness.key_with(KeyCode::Char('c'), KeyModifiers::CONTROL));
    }

    #[test]
    fn cursor_keys_stay_in_bounds() {
        let mut runtime = TestRuntime::returning(Ok(vec![
            detector(1, "Cam1"),
            detector(2, "Cam2"),
            detector(3, "Cam3"),
        ]));
        let mut harness = Harness::mount(&mut runtime);
        harness.pump();

        harness.key(KeyCode::Char('k'));
        assert_eq!(harness.state.cursor, 0);
        harness.key(KeyCode::Char('G'));
        assert_eq!(harness.state.cursor, 2);
        harness.key(KeyCode::Down);
        assert_eq!(harness.state.cursor, 2);
        harness.key(KeyCode::Char('g'));
        assert_eq!(harness.state.cursor, 0);
    }

    #[test]
    fn refresh_key_requests_update_over_live_channel() {
        let requests = Rc::new(Cell::new(0));
        let mut runtime =
            TestRuntime::returning(Ok(Vec::new())).with_live(Rc::clone(&requests));
        let mut harness = Harness::mount(&mut runtime);

        harness.key(KeyCode::Char('r'));
        assert_eq!(requests.get(), 1);
        assert_eq!(
            harness.state.status_line.as_deref(),
            Some("update requested")
        );
        assert_eq!(runtime.fetches, 1);
    }

    #[test]
    fn refresh_key_without_live_channel_reports_it() {
        let mut runtime = TestRuntime::default();
        let mut harness = Harness::mount(&mut runtime);
        harness.key(KeyCode::Char('r'));
        assert_eq!(
            harness.state.status_line.as_deref(),
            Some("live updates are off")
        );
    }

    #[test]
    fn stale_status_clear_is_ignored() {
        let mut runtime = TestRuntime::returning(Ok(vec![detector(1, "Cam1")]));
        let mut harness = Harness::mount(&mut runtime);
        harness.pump();

        harness.key(KeyCode::Char('t'));
        harness.key(KeyCode::Char('t'));
        assert_eq!(harness.view_data.status_token, 2);

        harness.send(InternalEvent::ClearStatus { token: 1 });
        assert_eq!(harness.state.status_line.as_deref(), Some("layout: cards"));

        harness.send(InternalEvent::ClearStatus { token: 2 });
        assert_eq!(harness.state.status_line, None);
    }

    #[test]
    fn fetch_failure_after_snapshot_goes_to_status_line() {
        let mut runtime = TestRuntime::returning(Ok(vec![detector(1, "Cam1")]));
        let mut harness = Harness::mount(&mut runtime);
        harness.pump();

        harness.send(InternalEvent::Fetched(Err(LoadError::Network(
            "connection reset".to_owned(),
        ))));
        assert_eq!(harness.visible_names(), vec!["Cam1"]);
        assert_eq!(
            harness.state.status_line.as_deref(),
            Some("load failed: connection reset")
        );
        assert_eq!(harness.view_data.status_token, 1);
    }

    #[test]
    fn status_text_tracks_mode_and_counts() {
        let mut runtime =
            TestRuntime::returning(Ok(vec![detector(1, "Cam1"), detector(2, "Sensor2")]));
        let mut harness = Harness::mount(&mut runtime);
        harness.pump();
        assert!(status_text(&harness.state).starts_with("NAV | 2/2 detectors"));

        harness.key(KeyCode::Char('/'));
        harness.type_text("sen");
        assert!(status_text(&harness.state).starts_with("SEARCH | 1/2 detectors"));
    }

    #[test]
    fn header_shows_app_name_live_status_and_snapshot_source() {
        let mut runtime = TestRuntime::returning(Ok(vec![detector(1, "Cam1")]));
        let mut harness = Harness::mount(&mut runtime);
        let config = ViewConfig {
            app_name: "Plant 7".to_owned(),
            ..ViewConfig::default()
        };
        assert_eq!(
            header_text(&harness.state, &config),
            "Plant 7 | live off | waiting for data"
        );

        harness.pump();
        let header = header_text(&harness.state, &config);
        assert!(header.starts_with("Plant 7 | live off | updated "), "{header}");
        assert!(header.ends_with("UTC (fetch)"), "{header}");
    }

    #[test]
    fn card_layout_renders_detector_fields() {
        let mut runtime =
            TestRuntime::returning(Ok(vec![detector(1, "Cam1"), detector(2, "Sensor2")]));
        let mut harness = Harness::mount(&mut runtime);
        harness.pump();

        let text = render_text(&harness.state, &ViewConfig::default(), 100, 30);
        assert!(text.contains("IntelliOptics Dashboard"));
        assert!(text.contains("Cam1"));
        assert!(text.contains("Sensor2"));
        assert!(text.contains("ID: 1"));
        assert!(text.contains("Confidence: 90.00%"));
        assert!(text.contains("Status: ON"));
    }

    #[test]
    fn table_layout_renders_header_row() {
        let mut runtime = TestRuntime::returning(Ok(vec![detector(1, "Cam1")]));
        let mut harness = Harness::mount(&mut runtime);
        harness.pump();
        harness.key(KeyCode::Char('t'));
        assert_eq!(harness.state.layout, LayoutKind::Table);

        let text = render_text(&harness.state, &ViewConfig::default(), 100, 20);
        assert!(text.contains("Name"));
        assert!(text.contains("Confidence"));
        assert!(text.contains("90.00%"));
    }

    #[test]
    fn body_message_renders_in_place_of_list() {
        let mut runtime =
            TestRuntime::returning(Err(LoadError::http(500, Some("db down".to_owned()))));
        let mut harness = Harness::mount(&mut runtime);
        harness.pump();

        let text = render_text(&harness.state, &ViewConfig::default(), 80, 12);
        assert!(text.contains("Error: db down"));
    }

    #[test]
    fn detail_dialog_renders_accuracy_numbers() {
        let mut runtime = TestRuntime::returning(Ok(vec![detector_with_accuracy(
            "det_1", "Dock", 80.0, 94.0, 67.0,
        )]));
        let mut harness = Harness::mount(&mut runtime);
        harness.pump();
        harness.key(KeyCode::Enter);

        let text = render_text(&harness.state, &ViewConfig::default(), 100, 40);
        assert!(text.contains("Dock - Accuracy Details"));
        assert!(text.contains("Projected Accuracy: 80%"));
        assert!(text.contains("Confidence Threshold: 90.00%"));

        let gauges = ViewConfig {
            detail: DetailKind::Gauges,
            ..ViewConfig::default()
        };
        let text = render_text(&harness.state, &gauges, 100, 40);
        assert!(text.contains("ML Accuracy for \"NO\": 67%"));
        assert!(text.contains("PROJECTED"));
    }

    #[test]
    fn detail_without_accuracy_shows_placeholder_chart() {
        let mut runtime = TestRuntime::returning(Ok(vec![detector(1, "Cam1")]));
        let mut harness = Harness::mount(&mut runtime);
        harness.pump();
        harness.key(KeyCode::Enter);

        let text = render_text(&harness.state, &ViewConfig::default(), 100, 40);
        assert!(text.contains("No accuracy data"));
        assert!(text.contains("Projected Accuracy: N/A"));
    }
}

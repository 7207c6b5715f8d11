// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::OffsetDateTime;

use crate::{Detector, DetectorId, LayoutKind, LoadError, filter_detectors};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Failed(LoadError),
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Navigate,
    Search,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotSource {
    Fetch,
    Push,
}

impl SnapshotSource {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fetch => "fetch",
            Self::Push => "push",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveStatus {
    Disabled,
    Connecting,
    Connected,
    Closed(Option<String>),
}

impl LiveStatus {
    pub fn label(&self) -> String {
        match self {
            Self::Disabled => "live off".to_owned(),
            Self::Connecting => "live connecting".to_owned(),
            Self::Connected => "live".to_owned(),
            Self::Closed(None) => "live closed".to_owned(),
            Self::Closed(Some(reason)) => format!("live unavailable: {reason}"),
        }
    }
}

/// What the push subscriber reports back to the view.
#[derive(Debug, Clone, PartialEq)]
pub enum LiveEvent {
    Connected,
    Snapshot(Vec<Detector>),
    Closed(Option<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotInfo {
    pub source: SnapshotSource,
    pub received_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardState {
    detectors: Vec<Detector>,
    pub load: LoadState,
    pub search_text: String,
    pub selected: Option<DetectorId>,
    pub cursor: usize,
    pub mode: InputMode,
    pub live: LiveStatus,
    pub layout: LayoutKind,
    pub status_line: Option<String>,
    pub last_snapshot: Option<SnapshotInfo>,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            detectors: Vec::new(),
            load: LoadState::Loading,
            search_text: String::new(),
            selected: None,
            cursor: 0,
            mode: InputMode::Navigate,
            live: LiveStatus::Disabled,
            layout: LayoutKind::default(),
            status_line: None,
            last_snapshot: None,
        }
    }
}

/// Exactly one of these is rendered in the body of the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyView<'a> {
    Loading,
    Error(&'a LoadError),
    Empty,
    List(Vec<&'a Detector>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    ApplySnapshot {
        detectors: Vec<Detector>,
        source: SnapshotSource,
        received_at: OffsetDateTime,
    },
    FailLoad(LoadError),
    SetLiveStatus(LiveStatus),
    EnterSearch,
    LeaveSearch,
    PushSearchChar(char),
    PopSearchChar,
    ClearSearch,
    MoveCursor(isize),
    CursorFirst,
    CursorLast,
    OpenDetail,
    CloseDetail,
    ToggleLayout,
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    ListReplaced { count: usize, source: SnapshotSource },
    LoadFailed(String),
    SelectionCleared,
    DetailOpened(DetectorId),
    DetailClosed,
    SearchChanged(String),
    ModeChanged(InputMode),
    CursorMoved(usize),
    LiveStatusChanged(LiveStatus),
    LayoutChanged(LayoutKind),
    StatusUpdated(String),
    StatusCleared,
}

impl DashboardState {
    pub fn with_layout(layout: LayoutKind) -> Self {
        Self {
            layout,
            ..Self::default()
        }
    }

    pub fn detectors(&self) -> &[Detector] {
        &self.detectors
    }

    pub fn visible_detectors(&self) -> Vec<&Detector> {
        filter_detectors(&self.detectors, &self.search_text)
    }

    pub fn cursor_detector(&self) -> Option<&Detector> {
        self.visible_detectors().get(self.cursor).copied()
    }

    pub fn selected_detector(&self) -> Option<&Detector> {
        let id = self.selected.as_ref()?;
        self.detectors.iter().find(|detector| &detector.id == id)
    }

    pub fn detail_open(&self) -> bool {
        self.selected.is_some()
    }

    pub fn body(&self) -> BodyView<'_> {
        match &self.load {
            LoadState::Loading => BodyView::Loading,
            LoadState::Failed(error) => BodyView::Error(error),
            LoadState::Ready => {
                let visible = self.visible_detectors();
                if visible.is_empty() {
                    BodyView::Empty
                } else {
                    BodyView::List(visible)
                }
            }
        }
    }

    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::ApplySnapshot {
                detectors,
                source,
                received_at,
            } => self.apply_snapshot(detectors, source, received_at),
            AppCommand::FailLoad(error) => self.fail_load(error),
            AppCommand::SetLiveStatus(status) => {
                if self.live == status {
                    return Vec::new();
                }
                self.live = status.clone();
                vec![AppEvent::LiveStatusChanged(status)]
            }
            AppCommand::EnterSearch => self.set_mode(InputMode::Search),
            AppCommand::LeaveSearch => self.set_mode(InputMode::Navigate),
            AppCommand::PushSearchChar(value) => {
                self.search_text.push(value);
                self.search_changed()
            }
            AppCommand::PopSearchChar => {
                if self.search_text.pop().is_none() {
                    return Vec::new();
                }
                self.search_changed()
            }
            AppCommand::ClearSearch => {
                if self.search_text.is_empty() {
                    return Vec::new();
                }
                self.search_text.clear();
                self.search_changed()
            }
            AppCommand::MoveCursor(delta) => {
                let len = self.visible_detectors().len();
                if len == 0 {
                    return Vec::new();
                }
                let next = (self.cursor as isize + delta).clamp(0, len as isize - 1) as usize;
                self.move_cursor_to(next)
            }
            AppCommand::CursorFirst => self.move_cursor_to(0),
            AppCommand::CursorLast => {
                let len = self.visible_detectors().len();
                self.move_cursor_to(len.saturating_sub(1))
            }
            AppCommand::OpenDetail => {
                let Some(id) = self.cursor_detector().map(|detector| detector.id.clone()) else {
                    return vec![self.set_status("no detector selected")];
                };
                self.selected = Some(id.clone());
                vec![AppEvent::DetailOpened(id)]
            }
            AppCommand::CloseDetail => {
                if self.selected.take().is_none() {
                    return Vec::new();
                }
                vec![AppEvent::DetailClosed]
            }
            AppCommand::ToggleLayout => {
                self.layout = self.layout.toggled();
                vec![
                    AppEvent::LayoutChanged(self.layout),
                    self.set_status(&format!("layout: {}", self.layout.as_str())),
                ]
            }
            AppCommand::SetStatus(message) => vec![self.set_status(&message)],
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    fn apply_snapshot(
        &mut self,
        detectors: Vec<Detector>,
        source: SnapshotSource,
        received_at: OffsetDateTime,
    ) -> Vec<AppEvent> {
        let count = detectors.len();
        self.detectors = detectors;
        self.load = LoadState::Ready;
        self.last_snapshot = Some(SnapshotInfo {
            source,
            received_at,
        });

        let mut events = vec![AppEvent::ListReplaced { count, source }];
        let stale = self
            .selected
            .as_ref()
            .is_some_and(|id| !self.detectors.iter().any(|detector| &detector.id == id));
        if stale {
            self.selected = None;
            events.push(AppEvent::SelectionCleared);
        }
        self.clamp_cursor();
        events
    }

    /// A failed fetch only takes over the body when no snapshot has landed
    /// yet; otherwise the list stays and the failure goes to the status line.
    fn fail_load(&mut self, error: LoadError) -> Vec<AppEvent> {
        let message = error.to_string();
        if self.last_snapshot.is_some() {
            return vec![
                AppEvent::LoadFailed(message.clone()),
                self.set_status(&format!("load failed: {message}")),
            ];
        }
        self.load = LoadState::Failed(error);
        vec![AppEvent::LoadFailed(message)]
    }

    fn set_mode(&mut self, mode: InputMode) -> Vec<AppEvent> {
        if self.mode == mode {
            return Vec::new();
        }
        self.mode = mode;
        vec![AppEvent::ModeChanged(mode)]
    }

    fn search_changed(&mut self) -> Vec<AppEvent> {
        self.clamp_cursor();
        vec![AppEvent::SearchChanged(self.search_text.clone())]
    }

    fn move_cursor_to(&mut self, index: usize) -> Vec<AppEvent> {
        let len = self.visible_detectors().len();
        let next = index.min(len.saturating_sub(1));
        if next == self.cursor {
            return Vec::new();
        }
        self.cursor = next;
        vec![AppEvent::CursorMoved(next)]
    }

    fn clamp_cursor(&mut self) {
        let len = self.visible_detectors().len();
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }

    fn set_status(&mut self, message: &str) -> AppEvent {
        self.status_line = Some(message.to_owned());
        AppEvent::StatusUpdated(message.to_owned())
    }
}

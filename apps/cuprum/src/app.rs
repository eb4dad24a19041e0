use crate::logging::SharedLogStore;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use cuprum_application::presentation::Presentation;
use cuprum_application::training::TrainingOutcome;

const PAGE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabId {
    Data,
    Trend,
    Logs,
}

impl TabId {
    pub const ALL: [TabId; 3] = [TabId::Data, TabId::Trend, TabId::Logs];

    pub fn title(self) -> &'static str {
        match self {
            TabId::Data => "Data Overview",
            TabId::Trend => "Price Trend",
            TabId::Logs => "Logs",
        }
    }

    pub fn index(self) -> usize {
        match self {
            TabId::Data => 0,
            TabId::Trend => 1,
            TabId::Logs => 2,
        }
    }

    fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

pub struct App {
    pub presentation: Presentation,
    pub outcome: Option<TrainingOutcome>,
    pub active_tab: TabId,
    /// First visible table row.
    pub table_scroll: usize,
    /// Lines hidden below the visible log window, counted from the newest.
    pub log_scroll: usize,
    pub logs: SharedLogStore,
    pub dirty: bool,
    seen_log_lines: u64,
}

impl App {
    pub fn new(
        presentation: Presentation,
        outcome: Option<TrainingOutcome>,
        logs: SharedLogStore,
    ) -> Self {
        Self {
            presentation,
            outcome,
            active_tab: TabId::Data,
            table_scroll: 0,
            log_scroll: 0,
            logs,
            dirty: true,
            seen_log_lines: 0,
        }
    }

    /// Marks the frame dirty when new log lines arrived.
    pub fn on_tick(&mut self) {
        let total = self.logs.lock().total();
        if total != self.seen_log_lines {
            self.seen_log_lines = total;
            if self.active_tab == TabId::Logs {
                self.dirty = true;
            }
        }
    }

    /// Returns `true` when the dashboard should close.
    pub fn on_key(&mut self, key: KeyEvent) -> bool {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Tab | KeyCode::Right => self.active_tab = self.active_tab.next(),
            KeyCode::BackTab | KeyCode::Left => self.active_tab = self.active_tab.prev(),
            KeyCode::Up => self.scroll_back(1),
            KeyCode::Down => self.scroll_forward(1),
            KeyCode::PageUp => self.scroll_back(PAGE),
            KeyCode::PageDown => self.scroll_forward(PAGE),
            KeyCode::Home => self.scroll_back(usize::MAX),
            KeyCode::End => self.scroll_forward(usize::MAX),
            _ => return false,
        }
        self.dirty = true;
        false
    }

    fn scroll_back(&mut self, by: usize) {
        match self.active_tab {
            TabId::Data => self.table_scroll = self.table_scroll.saturating_sub(by),
            TabId::Logs => {
                let max = self.logs.lock().len().saturating_sub(1);
                self.log_scroll = self.log_scroll.saturating_add(by).min(max);
            }
            TabId::Trend => {}
        }
    }

    fn scroll_forward(&mut self, by: usize) {
        match self.active_tab {
            TabId::Data => {
                let max = self.presentation.table.len().saturating_sub(1);
                self.table_scroll = self.table_scroll.saturating_add(by).min(max);
            }
            TabId::Logs => self.log_scroll = self.log_scroll.saturating_sub(by),
            TabId::Trend => {}
        }
    }
}

//! Event loop and state for the report viewer.

use crate::view::{self, ViewSnap};
use anyhow::Result;
use credo_crawler::{CrawlLimits, CrawlRequest, CreatorRow, CreatorSource, crawl_and_write, report};
use crossterm::{
    event::{self, Event as CtEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{self, Stdout};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

const BRAILLE_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Result of an in-process crawl, delivered back to the UI loop.
#[derive(Debug)]
pub enum CrawlOutcome {
    Finished { rows: usize },
    Failed { message: String },
}

pub struct ViewerConfig {
    pub report_path: PathBuf,
    pub request: CrawlRequest,
    pub limits: CrawlLimits,
}

pub struct ViewerApp {
    source: Arc<dyn CreatorSource>,
    config: ViewerConfig,

    // terminal
    term: Terminal<CrosstermBackend<Stdout>>,

    // ui state
    rows: Option<Vec<CreatorRow>>,
    selected: usize,
    status: String,
    status_is_error: bool,
    busy: bool,
    spin_idx: usize,
    dirty: bool,

    // crawl completion channel
    tx: mpsc::Sender<CrawlOutcome>,
    rx: mpsc::Receiver<CrawlOutcome>,
}

impl ViewerApp {
    pub fn new(source: Arc<dyn CreatorSource>, config: ViewerConfig) -> Result<Self> {
        let mut stdout = io::stdout();
        enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut term = Terminal::new(backend)?;
        term.clear()?;

        let (tx, rx) = mpsc::channel(4);
        Ok(Self {
            source,
            config,
            term,
            rows: None,
            selected: 0,
            status: String::new(),
            status_is_error: false,
            busy: false,
            spin_idx: 0,
            dirty: true,
            tx,
            rx,
        })
    }

    /// Load the report, then pump events until the operator quits.
    pub async fn run(mut self) -> Result<()> {
        self.reload_report();
        let result = self.event_loop().await;
        restore_terminal();
        result
    }

    async fn event_loop(&mut self) -> Result<()> {
        loop {
            while event::poll(Duration::ZERO)? {
                if let CtEvent::Key(key) = event::read()? {
                    if self.handle_key(key) {
                        return Ok(());
                    }
                }
            }

            while let Ok(outcome) = self.rx.try_recv() {
                self.apply_outcome(outcome);
            }

            if self.busy {
                self.spin_idx = (self.spin_idx + 1) % BRAILLE_FRAMES.len();
                self.dirty = true;
            }

            if self.dirty {
                let snap = self.snapshot();
                view::draw(&mut self.term, &snap)?;
                self.dirty = false;
            }

            tokio::time::sleep(Duration::from_millis(60)).await;
        }
    }

    /// Returns true when the app should exit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        match action_for(&key) {
            Some(Action::Quit) => return true,
            Some(Action::Crawl) => self.trigger_crawl(),
            Some(Action::Reload) => self.reload_report(),
            Some(Action::Move(delta)) => self.move_selection(delta),
            Some(Action::First) => self.select(0),
            Some(Action::Last) => self.select(usize::MAX),
            None => {}
        }
        false
    }

    fn move_selection(&mut self, delta: i64) {
        let target = self.selected as i64 + delta;
        self.select(target.max(0) as usize);
    }

    fn select(&mut self, index: usize) {
        let len = self.rows.as_ref().map(Vec::len).unwrap_or(0);
        if len == 0 {
            return;
        }
        let clamped = index.min(len - 1);
        if clamped != self.selected {
            self.selected = clamped;
            self.dirty = true;
        }
    }

    fn reload_report(&mut self) {
        match report::read_report(&self.config.report_path) {
            Ok(Some(rows)) => {
                self.selected = self.selected.min(rows.len().saturating_sub(1));
                self.set_status(format!("{} creators loaded", rows.len()), false);
                self.rows = Some(rows);
            }
            Ok(None) => {
                self.rows = None;
                self.set_status(String::new(), false);
            }
            Err(err) => {
                self.rows = None;
                self.set_status(format!("failed to read report: {err}"), true);
            }
        }
        self.dirty = true;
    }

    fn trigger_crawl(&mut self) {
        if self.busy {
            return;
        }
        self.busy = true;
        self.set_status(
            format!("crawling \"{}\"...", self.config.request.topic),
            false,
        );

        let source = self.source.clone();
        let request = self.config.request.clone();
        let limits = self.config.limits;
        let path = self.config.report_path.clone();
        let tx = self.tx.clone();

        tokio::spawn(async move {
            let outcome =
                match crawl_and_write(source.as_ref(), &request, limits, &path, |_| {}).await {
                    Ok(rows) => CrawlOutcome::Finished { rows: rows.len() },
                    Err(err) => CrawlOutcome::Failed {
                        message: format!("{err:#}"),
                    },
                };
            // Receiver only disappears when the app is shutting down.
            let _ = tx.send(outcome).await;
        });
    }

    fn apply_outcome(&mut self, outcome: CrawlOutcome) {
        self.busy = false;
        match outcome {
            CrawlOutcome::Finished { rows } => {
                tracing::info!(target: "tui", rows, "viewer.crawl.finished");
                self.reload_report();
                self.set_status(format!("crawl finished: {rows} creators"), false);
            }
            CrawlOutcome::Failed { message } => {
                tracing::warn!(target: "tui", message = %message, "viewer.crawl.failed");
                self.set_status(format!("crawl failed: {message}"), true);
            }
        }
        self.dirty = true;
    }

    fn set_status(&mut self, status: String, is_error: bool) {
        self.status = status;
        self.status_is_error = is_error;
        self.dirty = true;
    }

    fn snapshot(&self) -> ViewSnap {
        ViewSnap {
            rows: self.rows.clone(),
            selected: self.selected,
            status: self.status.clone(),
            status_is_error: self.status_is_error,
            busy: self.busy,
            spinner: BRAILLE_FRAMES[self.spin_idx],
        }
    }
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}

#[derive(Debug, PartialEq, Eq)]
enum Action {
    Quit,
    Crawl,
    Reload,
    Move(i64),
    First,
    Last,
}

/// Key map. Only press events act; terminals that also report release and
/// repeat events would otherwise fire every binding twice.
fn action_for(key: &KeyEvent) -> Option<Action> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), _) | (KeyCode::Esc, _) => Some(Action::Quit),
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Some(Action::Quit),
        (KeyCode::Char('r'), _) => Some(Action::Crawl),
        (KeyCode::Char('l'), _) => Some(Action::Reload),
        (KeyCode::Up, _) | (KeyCode::Char('k'), _) => Some(Action::Move(-1)),
        (KeyCode::Down, _) | (KeyCode::Char('j'), _) => Some(Action::Move(1)),
        (KeyCode::Home, _) => Some(Action::First),
        (KeyCode::End, _) => Some(Action::Last),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_press_events_act() {
        let release =
            KeyEvent::new_with_kind(KeyCode::Char('q'), KeyModifiers::NONE, KeyEventKind::Release);
        assert_eq!(action_for(&release), None);

        let repeat =
            KeyEvent::new_with_kind(KeyCode::Char('r'), KeyModifiers::NONE, KeyEventKind::Repeat);
        assert_eq!(action_for(&repeat), None);
    }

    #[test]
    fn press_events_map_to_actions() {
        let press = |code| KeyEvent::new(code, KeyModifiers::NONE);
        assert_eq!(action_for(&press(KeyCode::Char('q'))), Some(Action::Quit));
        assert_eq!(action_for(&press(KeyCode::Esc)), Some(Action::Quit));
        assert_eq!(action_for(&press(KeyCode::Char('r'))), Some(Action::Crawl));
        assert_eq!(action_for(&press(KeyCode::Char('j'))), Some(Action::Move(1)));
        assert_eq!(action_for(&press(KeyCode::Char('k'))), Some(Action::Move(-1)));
        assert_eq!(
            action_for(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Action::Quit)
        );
        assert_eq!(action_for(&press(KeyCode::Char('x'))), None);
    }
}

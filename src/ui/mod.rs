//! Terminal UI: application state, event loop, and input handling.
//!
//! All mutable state (search text, facet selection, cursors, modals) is
//! owned by [`App`] and touched only from the event loop. Network work runs
//! on tokio tasks and reports back over an mpsc channel drained each tick,
//! so the UI stays responsive while fetches are outstanding.

mod draw;
mod view;

pub use view::{Counters, SheetCard, TagChip, ViewModel, ALL_TAG_LABEL};

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::DefaultTerminal;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::catalog::Catalog;
use crate::client::ShelfClient;
use crate::config::Settings;
use crate::error::ShelfError;
use crate::facets::TagSelection;
use crate::filter;
use crate::models::{CatalogFile, Sheet};
use crate::services::{DownloadEvent, DownloadService};

/// Messages delivered to the event loop from background tasks.
pub enum UiMsg {
    CatalogLoaded(Result<CatalogFile, ShelfError>),
    Download(DownloadEvent),
    PrimaryProbed { file: String, exists: bool },
}

/// Which pane owns key input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Search,
    Tags,
    Cards,
}

/// Modal dialog currently open, if any.
enum Modal {
    None,
    Preview {
        file: String,
        /// `None` while the availability probe is outstanding.
        asset_missing: Option<bool>,
    },
    Solutions {
        file: String,
        cursor: usize,
    },
}

/// Catalog lifecycle at the bootstrap layer.
enum CatalogState {
    Loading,
    Ready(Catalog),
    Failed(String),
}

/// The running application.
pub struct App {
    state: CatalogState,
    selection: TagSelection,
    query: String,
    visible: Vec<usize>,
    focus: Focus,
    tag_cursor: usize,
    card_cursor: usize,
    modal: Modal,
    status: Option<String>,
    settings: Settings,
    client: ShelfClient,
    downloads: DownloadService,
    tx: mpsc::UnboundedSender<UiMsg>,
    rx: mpsc::UnboundedReceiver<UiMsg>,
    should_quit: bool,
}

impl App {
    /// Create an application in the Loading state.
    pub fn new(settings: Settings, client: ShelfClient, downloads: DownloadService) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            state: CatalogState::Loading,
            selection: TagSelection::default(),
            query: String::new(),
            visible: Vec::new(),
            focus: Focus::Search,
            tag_cursor: 0,
            card_cursor: 0,
            modal: Modal::None,
            status: None,
            settings,
            client,
            downloads,
            tx,
            rx,
            should_quit: false,
        }
    }

    /// Run the event loop until the user quits.
    pub async fn run(mut self, terminal: &mut DefaultTerminal) -> anyhow::Result<()> {
        self.spawn_catalog_load();
        while !self.should_quit {
            while let Ok(msg) = self.rx.try_recv() {
                self.on_message(msg);
            }
            terminal.draw(|frame| draw::draw(frame, &self))?;
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.on_key(key);
                    }
                }
            }
        }
        Ok(())
    }

    fn spawn_catalog_load(&self) {
        let client = self.client.clone();
        let url = self.settings.catalog_url.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = client.fetch_catalog(&url).await;
            let _ = tx.send(UiMsg::CatalogLoaded(result));
        });
    }

    fn on_message(&mut self, msg: UiMsg) {
        match msg {
            UiMsg::CatalogLoaded(Ok(raw)) => {
                let catalog = Catalog::load(raw);
                info!(
                    sheets = catalog.len(),
                    tags = catalog.vocabulary().len(),
                    "catalog loaded"
                );
                self.status = Some(format!("loaded {} sheets", catalog.len()));
                self.selection = TagSelection::new(catalog.vocabulary().to_vec());
                self.state = CatalogState::Ready(catalog);
                self.tag_cursor = 0;
                self.card_cursor = 0;
                self.refresh();
            }
            UiMsg::CatalogLoaded(Err(err)) => {
                error!(%err, "catalog load failed");
                self.state = CatalogState::Failed(err.to_string());
            }
            UiMsg::Download(DownloadEvent::Finished(result)) => {
                self.status = Some(format!(
                    "saved {} ({} bytes) to {}",
                    result.filename,
                    result.size,
                    result.path.display()
                ));
            }
            UiMsg::Download(DownloadEvent::Failed { filename, error }) => {
                warn!(%filename, %error, "download failed");
                self.status = Some(format!("download failed: {filename}: {error}"));
            }
            UiMsg::PrimaryProbed { file, exists } => {
                if let Modal::Preview {
                    file: open,
                    asset_missing,
                } = &mut self.modal
                {
                    if *open == file {
                        *asset_missing = Some(!exists);
                    }
                }
            }
        }
    }

    /// Recompute the visible set after any search or facet mutation.
    fn refresh(&mut self) {
        if let CatalogState::Ready(catalog) = &self.state {
            self.visible = filter::filter_indices(catalog, &self.query, self.selection.current());
            if self.card_cursor >= self.visible.len() {
                self.card_cursor = self.visible.len().saturating_sub(1);
            }
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        if !matches!(self.state, CatalogState::Ready(_)) {
            // Only quitting is meaningful while loading or failed.
            if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                self.should_quit = true;
            }
            return;
        }
        match self.modal {
            Modal::None => self.on_browse_key(key),
            Modal::Preview { .. } => self.on_preview_key(key),
            Modal::Solutions { .. } => self.on_solutions_key(key),
        }
    }

    fn on_browse_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Focus::Search => Focus::Tags,
                    Focus::Tags => Focus::Cards,
                    Focus::Cards => Focus::Search,
                };
                return;
            }
            KeyCode::BackTab => {
                self.focus = match self.focus {
                    Focus::Search => Focus::Cards,
                    Focus::Tags => Focus::Search,
                    Focus::Cards => Focus::Tags,
                };
                return;
            }
            _ => {}
        }
        match self.focus {
            Focus::Search => self.on_search_key(key),
            Focus::Tags => self.on_tags_key(key),
            Focus::Cards => self.on_cards_key(key),
        }
    }

    fn on_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(c) => {
                self.query.push(c);
                self.refresh();
            }
            KeyCode::Backspace => {
                self.query.pop();
                self.refresh();
            }
            KeyCode::Esc => {
                if self.query.is_empty() {
                    self.focus = Focus::Cards;
                } else {
                    self.query.clear();
                    self.refresh();
                }
            }
            KeyCode::Enter | KeyCode::Down => self.focus = Focus::Cards,
            _ => {}
        }
    }

    fn on_tags_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('/') => self.focus = Focus::Search,
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Left => self.tag_cursor = self.tag_cursor.saturating_sub(1),
            KeyCode::Right => {
                let max = self.chip_count().saturating_sub(1);
                if self.tag_cursor < max {
                    self.tag_cursor += 1;
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.toggle_at_cursor(),
            KeyCode::Down => self.focus = Focus::Cards,
            _ => {}
        }
    }

    fn on_cards_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('/') => self.focus = Focus::Search,
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Up => {
                if self.card_cursor == 0 {
                    self.focus = Focus::Tags;
                } else {
                    self.card_cursor -= 1;
                }
            }
            KeyCode::Down => {
                if self.card_cursor + 1 < self.visible.len() {
                    self.card_cursor += 1;
                }
            }
            KeyCode::Enter | KeyCode::Char('p') => {
                if let Some(file) = self.file_at_cursor() {
                    self.open_preview(&file);
                }
            }
            KeyCode::Char('d') => {
                if let Some(file) = self.file_at_cursor() {
                    self.download_primary(&file);
                }
            }
            KeyCode::Char('s') => {
                if let Some(file) = self.file_at_cursor() {
                    self.open_solutions(&file);
                }
            }
            _ => {}
        }
    }

    fn on_preview_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.modal = Modal::None,
            KeyCode::Char('d') => {
                let file = match &self.modal {
                    Modal::Preview { file, .. } => file.clone(),
                    _ => return,
                };
                self.download_primary(&file);
            }
            _ => {}
        }
    }

    fn on_solutions_key(&mut self, key: KeyEvent) {
        let (file, cursor) = match &self.modal {
            Modal::Solutions { file, cursor } => (file.clone(), *cursor),
            _ => return,
        };
        let count = self.sheet(&file).map(|s| s.solutions.len()).unwrap_or(0);
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.modal = Modal::None,
            KeyCode::Up => self.set_solutions_cursor(cursor.saturating_sub(1)),
            KeyCode::Down => {
                if cursor + 1 < count {
                    self.set_solutions_cursor(cursor + 1);
                }
            }
            KeyCode::Enter => {
                if let Some(sheet) = self.sheet(&file) {
                    if let Some(filename) = sheet.solutions.get(cursor).cloned() {
                        self.download_solution(sheet, filename);
                    }
                }
            }
            _ => {}
        }
    }

    fn set_solutions_cursor(&mut self, new: usize) {
        if let Modal::Solutions { cursor, .. } = &mut self.modal {
            *cursor = new;
        }
    }

    /// Open the preview dialog for a sheet and probe asset availability.
    ///
    /// An unknown filename is a no-op: log-worthy, not fatal.
    fn open_preview(&mut self, file: &str) {
        let Some(sheet) = self.sheet(file) else {
            warn!(file, "preview requested for unknown sheet");
            return;
        };
        self.modal = Modal::Preview {
            file: sheet.file.clone(),
            asset_missing: None,
        };
        let service = self.downloads.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            match service.primary_exists(&sheet).await {
                Ok(exists) => {
                    let _ = tx.send(UiMsg::PrimaryProbed {
                        file: sheet.file.clone(),
                        exists,
                    });
                }
                Err(err) => warn!(%err, file = %sheet.file, "availability probe failed"),
            }
        });
    }

    /// Open the solutions dialog; a sheet without solutions is a warning,
    /// not an error.
    fn open_solutions(&mut self, file: &str) {
        let Some(sheet) = self.sheet(file) else {
            warn!(file, "solutions requested for unknown sheet");
            return;
        };
        if !sheet.has_solutions() {
            warn!(file = %sheet.file, "no solution files defined");
            self.status = Some(format!("no solutions available for {}", sheet.name));
            return;
        }
        self.modal = Modal::Solutions {
            file: sheet.file.clone(),
            cursor: 0,
        };
    }

    fn download_primary(&mut self, file: &str) {
        let Some(sheet) = self.sheet(file) else {
            warn!(file, "download requested for unknown sheet");
            return;
        };
        self.status = Some(format!("fetching {}...", sheet.file));
        let service = self.downloads.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let event = match service.fetch_primary(&sheet).await {
                Ok(result) => DownloadEvent::Finished(result),
                Err(error) => DownloadEvent::Failed {
                    filename: sheet.file.clone(),
                    error,
                },
            };
            let _ = tx.send(UiMsg::Download(event));
        });
    }

    fn download_solution(&mut self, sheet: Sheet, filename: String) {
        self.status = Some(format!("fetching {filename}..."));
        let service = self.downloads.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let event = match service.fetch_solution(&sheet, &filename).await {
                Ok(result) => DownloadEvent::Finished(result),
                Err(error) => DownloadEvent::Failed { filename, error },
            };
            let _ = tx.send(UiMsg::Download(event));
        });
    }

    fn toggle_at_cursor(&mut self) {
        if self.tag_cursor == 0 {
            self.selection.reset();
        } else {
            let tag = self
                .catalog()
                .and_then(|c| c.vocabulary().get(self.tag_cursor - 1).cloned());
            let Some(tag) = tag else { return };
            if let Err(err) = self.selection.toggle(&tag) {
                // The UI only emits vocabulary tags; treat this defensively.
                warn!(%err, "rejected facet toggle");
            }
        }
        self.refresh();
    }

    fn chip_count(&self) -> usize {
        self.catalog()
            .map(|c| c.vocabulary().len() + 1)
            .unwrap_or(1)
    }

    fn catalog(&self) -> Option<&Catalog> {
        match &self.state {
            CatalogState::Ready(catalog) => Some(catalog),
            _ => None,
        }
    }

    fn sheet(&self, file: &str) -> Option<Sheet> {
        self.catalog().and_then(|c| c.by_file(file)).cloned()
    }

    fn file_at_cursor(&self) -> Option<String> {
        let catalog = self.catalog()?;
        let &idx = self.visible.get(self.card_cursor)?;
        catalog.sheets().get(idx).map(|s| s.file.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn app() -> App {
        let settings =
            Settings::from_base(Url::parse("https://exams.example.org/").unwrap()).unwrap();
        let client = ShelfClient::new(Duration::from_secs(5), None).unwrap();
        let downloads = DownloadService::new(
            client.clone(),
            settings.sheets_root.clone(),
            settings.solutions_root.clone(),
            settings.downloads_dir.clone(),
        );
        App::new(settings, client, downloads)
    }

    fn raw_catalog() -> CatalogFile {
        serde_json::from_value(serde_json::json!({
            "sheets": [
                {
                    "name": "Algebra",
                    "session": "May 2024",
                    "period": "2024-01",
                    "tags": ["math"],
                    "file": "algebra.pdf",
                    "solutions": ["sol 1.pdf", "sol 2.pdf"]
                },
                {
                    "name": "Grammar",
                    "session": "May 2024",
                    "period": "2023-05",
                    "tags": ["language"],
                    "file": "grammar.pdf"
                }
            ]
        }))
        .unwrap()
    }

    fn loaded_app() -> App {
        let mut app = app();
        app.on_message(UiMsg::CatalogLoaded(Ok(raw_catalog())));
        app
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_load_failure_enters_failed_state_without_panicking() {
        let mut app = app();
        app.on_message(UiMsg::CatalogLoaded(Err(ShelfError::data_load("boom"))));
        assert!(matches!(app.state, CatalogState::Failed(_)));
    }

    #[test]
    fn test_load_populates_catalog_and_visible_set() {
        let app = loaded_app();
        assert!(matches!(app.state, CatalogState::Ready(_)));
        assert_eq!(app.visible.len(), 2);
        assert_eq!(app.selection.vocabulary(), &["language", "math"]);
    }

    #[test]
    fn test_search_typing_narrows_visible_set() {
        let mut app = loaded_app();
        for c in "grammar".chars() {
            app.on_key(press(KeyCode::Char(c)));
        }
        assert_eq!(app.query, "grammar");
        assert_eq!(app.visible.len(), 1);
        app.on_key(press(KeyCode::Backspace));
        assert_eq!(app.query, "gramma");
    }

    #[test]
    fn test_tag_toggle_and_all_chip_reset() {
        let mut app = loaded_app();
        app.focus = Focus::Tags;
        // Move to the first vocabulary chip ("language") and toggle it.
        app.on_key(press(KeyCode::Right));
        app.on_key(press(KeyCode::Enter));
        assert_eq!(app.selection.active_count(), 1);
        assert_eq!(app.visible.len(), 1);
        // The "All" chip clears the selection.
        app.on_key(press(KeyCode::Left));
        app.on_key(press(KeyCode::Enter));
        assert!(app.selection.is_empty());
        assert_eq!(app.visible.len(), 2);
    }

    #[test]
    fn test_open_solutions_without_solutions_is_a_warning() {
        let mut app = loaded_app();
        app.open_solutions("grammar.pdf");
        assert!(matches!(app.modal, Modal::None));
        assert!(app.status.as_deref().unwrap().contains("no solutions"));
    }

    #[test]
    fn test_open_solutions_for_unknown_sheet_is_a_noop() {
        let mut app = loaded_app();
        app.open_solutions("missing.pdf");
        assert!(matches!(app.modal, Modal::None));
    }

    #[tokio::test]
    async fn test_open_preview_sets_modal() {
        let mut app = loaded_app();
        app.open_preview("algebra.pdf");
        assert!(matches!(app.modal, Modal::Preview { .. }));
        // The generic dismiss key closes the dialog again.
        app.on_key(press(KeyCode::Esc));
        assert!(matches!(app.modal, Modal::None));
    }

    #[tokio::test]
    async fn test_solutions_cursor_stays_in_bounds() {
        let mut app = loaded_app();
        app.open_solutions("algebra.pdf");
        app.on_key(press(KeyCode::Down));
        app.on_key(press(KeyCode::Down));
        match &app.modal {
            Modal::Solutions { cursor, .. } => assert_eq!(*cursor, 1),
            _ => panic!("solutions modal expected"),
        }
    }

    #[test]
    fn test_quit_keys() {
        let mut app = loaded_app();
        app.focus = Focus::Cards;
        app.on_key(press(KeyCode::Char('q')));
        assert!(app.should_quit);

        let mut app = loaded_app();
        app.on_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }

    #[test]
    fn test_probe_result_updates_open_preview_only() {
        let mut app = loaded_app();
        app.modal = Modal::Preview {
            file: "algebra.pdf".to_string(),
            asset_missing: None,
        };
        app.on_message(UiMsg::PrimaryProbed {
            file: "grammar.pdf".to_string(),
            exists: false,
        });
        match &app.modal {
            Modal::Preview { asset_missing, .. } => assert!(asset_missing.is_none()),
            _ => panic!("preview modal expected"),
        }
        app.on_message(UiMsg::PrimaryProbed {
            file: "algebra.pdf".to_string(),
            exists: false,
        });
        match &app.modal {
            Modal::Preview { asset_missing, .. } => assert_eq!(*asset_missing, Some(true)),
            _ => panic!("preview modal expected"),
        }
    }
}

//! Dashboard application state machine.
//!
//! `App` owns the data store, the page layout, the selection and the
//! banner. Key handling is split the usual way: `handle_key` routes a key
//! according to the current state and either applies it directly (cursor
//! movement, field drafts) or returns an [`AppAction`] that the event loop
//! hands back to [`App::perform`].

use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;

use dashdeck_core::{Change, DataStore, Outcome, PathError, Variant};
use tracing::{debug, error};

use crate::field::{Commit, EditableField};
use crate::input::InputLine;
use crate::notification::{Notification, NotificationCenter, NotificationType};
use crate::pages::{build_pages, Page};


// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    /// Browsing pages and fields.
    Dashboard,
    /// The selected field has an open draft.
    Editing,
    /// Typing the path of a file to import.
    ImportPrompt,
    /// Waiting for y/n before a destructive action.
    Confirm {
        prompt: String,
        action: PendingAction,
    },
    Help,
}

impl AppState {
    pub fn label(&self) -> &str {
        match self {
            AppState::Dashboard => "dashboard",
            AppState::Editing => "edit",
            AppState::ImportPrompt => "import",
            AppState::Confirm { .. } => "confirm",
            AppState::Help => "help",
        }
    }
}


// ---------------------------------------------------------------------------
// PendingAction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum PendingAction {
    Reset,
    /// Quit although edits have not been saved.
    QuitUnsaved,
}

impl PendingAction {
    pub fn prompt(&self) -> &'static str {
        match self {
            PendingAction::Reset => {
                "Reset all data to default values? This cannot be undone. (y/n)"
            }
            PendingAction::QuitUnsaved => "There are unsaved changes. Quit anyway? (y/n)",
        }
    }

    fn into_action(self) -> AppAction {
        match self {
            PendingAction::Reset => AppAction::Reset,
            PendingAction::QuitUnsaved => AppAction::Quit,
        }
    }
}


// ---------------------------------------------------------------------------
// AppAction
// ---------------------------------------------------------------------------

/// Store-level work requested by a key press.
#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    Save,
    Export,
    Import(PathBuf),
    Reset,
    Quit,
}


// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct App {
    pub state: AppState,
    store: DataStore,
    variant: Variant,
    pages: Vec<Page>,
    page: usize,
    selected: usize,
    prompt: InputLine,
    notifications: NotificationCenter,
    export_dir: PathBuf,
    /// Store revision as of the last save, import or reset.
    saved_revision: u64,
    /// Set by the store subscription when the tree was replaced wholesale.
    layout_stale: Rc<Cell<bool>>,
    import_banner: Option<u64>,
}

impl App {
    pub fn new(
        mut store: DataStore,
        variant: Variant,
        export_dir: PathBuf,
        banner_ttl_ms: u64,
    ) -> Result<Self, PathError> {
        let pages = build_pages(variant, &store)?;
        let layout_stale = Rc::new(Cell::new(false));
        let flag = Rc::clone(&layout_stale);
        store.subscribe(move |event| {
            if matches!(event.change, Change::Imported | Change::Reset) {
                flag.set(true);
            }
        });
        Ok(App {
            state: AppState::Dashboard,
            saved_revision: store.revision(),
            store,
            variant,
            pages,
            page: 0,
            selected: 0,
            prompt: InputLine::new(),
            notifications: NotificationCenter::new(banner_ttl_ms),
            export_dir,
            layout_stale,
            import_banner: None,
        })
    }

    // -- accessors ----------------------------------------------------------

    pub fn store(&self) -> &DataStore {
        &self.store
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_index(&self) -> usize {
        self.page
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn current_page(&self) -> Option<&Page> {
        self.pages.get(self.page)
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_field(&self) -> Option<&EditableField> {
        self.current_page()?.field(self.selected)
    }

    pub fn prompt(&self) -> &InputLine {
        &self.prompt
    }

    pub fn has_prev_page(&self) -> bool {
        self.page > 0
    }

    pub fn has_next_page(&self) -> bool {
        self.page + 1 < self.pages.len()
    }

    /// True when the tree differs from what was last saved or loaded.
    pub fn has_unsaved_changes(&self) -> bool {
        self.store.revision() != self.saved_revision
    }

    /// The banner to show at `now_ms`, if any.
    pub fn banner(&self, now_ms: u64) -> Option<&Notification> {
        self.notifications.current(now_ms)
    }

    // -- key routing --------------------------------------------------------

    pub fn handle_key(&mut self, key: Key, now_ms: u64) -> Option<AppAction> {
        match &self.state {
            AppState::Confirm { .. } => self.handle_confirm_key(key),
            AppState::Editing => {
                self.handle_edit_key(key, now_ms);
                None
            }
            AppState::ImportPrompt => self.handle_prompt_key(key),
            AppState::Help => {
                self.state = AppState::Dashboard;
                None
            }
            AppState::Dashboard => self.handle_view_key(key),
        }
    }

    fn handle_confirm_key(&mut self, key: Key) -> Option<AppAction> {
        let AppState::Confirm { action, .. } = &self.state else {
            return None;
        };
        match key {
            Key::Char('y') | Key::Char('Y') | Key::Enter => {
                let action = action.clone();
                self.state = AppState::Dashboard;
                Some(action.into_action())
            }
            Key::Char('n') | Key::Char('N') | Key::Escape => {
                self.state = AppState::Dashboard;
                None
            }
            _ => None,
        }
    }

    fn handle_view_key(&mut self, key: Key) -> Option<AppAction> {
        let busy = self.store.is_busy();
        match key {
            Key::Char('q') => {
                if self.has_unsaved_changes() {
                    self.confirm(PendingAction::QuitUnsaved);
                    None
                } else {
                    Some(AppAction::Quit)
                }
            }
            Key::Ctrl('c') => Some(AppAction::Quit),
            Key::Char('?') => {
                self.state = AppState::Help;
                None
            }
            Key::Char('h') | Key::Left => {
                self.prev_page();
                None
            }
            Key::Char('l') | Key::Right => {
                self.next_page();
                None
            }
            Key::Char('j') | Key::Down | Key::Tab => {
                self.select_next();
                None
            }
            Key::Char('k') | Key::Up => {
                self.select_prev();
                None
            }
            Key::Char('g') | Key::Home => {
                self.selected = 0;
                None
            }
            Key::Char('G') | Key::End => {
                self.selected = self.field_count().saturating_sub(1);
                None
            }

            // Everything below mutates the store and waits for an import.
            _ if busy => None,
            Key::Enter => {
                self.begin_edit();
                None
            }
            Key::Char('s') => Some(AppAction::Save),
            Key::Char('e') => Some(AppAction::Export),
            Key::Char('i') => {
                self.prompt.clear();
                self.state = AppState::ImportPrompt;
                None
            }
            Key::Char('R') => {
                self.confirm(PendingAction::Reset);
                None
            }
            _ => None,
        }
    }

    fn handle_prompt_key(&mut self, key: Key) -> Option<AppAction> {
        match key {
            Key::Escape => {
                self.prompt.clear();
                self.state = AppState::Dashboard;
                None
            }
            Key::Enter => {
                self.state = AppState::Dashboard;
                let text = self.prompt.take();
                let text = text.trim();
                if text.is_empty() {
                    None
                } else {
                    Some(AppAction::Import(PathBuf::from(text)))
                }
            }
            other => {
                edit_line(&mut self.prompt, other);
                None
            }
        }
    }

    fn handle_edit_key(&mut self, key: Key, now_ms: u64) {
        match key {
            Key::Enter => self.commit_edit(now_ms),
            // Leaving the field commits, like losing focus.
            Key::Tab => {
                self.commit_edit(now_ms);
                self.select_next();
            }
            Key::Escape => {
                if let Some(field) = self.selected_field_mut() {
                    field.cancel();
                }
                self.state = AppState::Dashboard;
            }
            other => {
                if let Some(draft) = self.selected_field_mut().and_then(EditableField::draft_mut) {
                    edit_line(draft, other);
                }
            }
        }
    }

    // -- navigation ---------------------------------------------------------

    pub fn next_page(&mut self) {
        if self.has_next_page() {
            self.page += 1;
            self.selected = 0;
        }
    }

    pub fn prev_page(&mut self) {
        if self.has_prev_page() {
            self.page -= 1;
            self.selected = 0;
        }
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.field_count() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn field_count(&self) -> usize {
        self.current_page().map(Page::field_count).unwrap_or(0)
    }

    fn selected_field_mut(&mut self) -> Option<&mut EditableField> {
        let selected = self.selected;
        self.pages.get_mut(self.page)?.field_mut(selected)
    }

    fn confirm(&mut self, action: PendingAction) {
        self.state = AppState::Confirm {
            prompt: action.prompt().to_string(),
            action,
        };
    }

    // -- editing ------------------------------------------------------------

    fn begin_edit(&mut self) {
        let selected = self.selected;
        let Some(field) = self.pages.get_mut(self.page).and_then(|p| p.field_mut(selected)) else {
            return;
        };
        field.activate(&self.store);
        self.state = AppState::Editing;
    }

    fn commit_edit(&mut self, now_ms: u64) {
        self.state = AppState::Dashboard;
        let selected = self.selected;
        let Some(field) = self.pages.get_mut(self.page).and_then(|p| p.field_mut(selected)) else {
            return;
        };
        match field.commit(&mut self.store) {
            Ok(Commit::Committed) => debug!(path = %field.path(), "field committed"),
            Ok(Commit::Discarded(reason)) => debug!(path = %field.path(), %reason, "edit discarded"),
            Ok(Commit::Idle) => {}
            Err(e) => {
                error!(path = %field.path(), error = %e, "field write failed");
                self.notifications.push_outcome(&Outcome::failed(e.to_string()), now_ms);
            }
        }
    }

    // -- actions ------------------------------------------------------------

    /// Run a store operation and show its outcome.
    pub fn perform(&mut self, action: AppAction, now_ms: u64) {
        match action {
            AppAction::Save => {
                let outcome = self.store.save();
                if outcome.success {
                    self.saved_revision = self.store.revision();
                }
                self.notifications.push_outcome(&outcome, now_ms);
            }
            AppAction::Export => {
                let outcome = self.store.export_json(&self.export_dir);
                self.notifications.push_outcome(&outcome, now_ms);
            }
            AppAction::Import(path) => match self.store.begin_import(&path) {
                Ok(()) => {
                    let body = format!("Importing {} ...", path.display());
                    self.import_banner =
                        Some(self.notifications.push(NotificationType::Info, &body, now_ms, None));
                }
                Err(outcome) => {
                    self.notifications.push_outcome(&outcome, now_ms);
                }
            },
            AppAction::Reset => {
                let outcome = self.store.reset();
                self.saved_revision = self.store.revision();
                self.notifications.push_outcome(&outcome, now_ms);
            }
            AppAction::Quit => {}
        }
        self.refresh_layout();
    }

    /// Periodic work: finish a pending import and expire banners.
    pub fn tick(&mut self, now_ms: u64) {
        if let Some(outcome) = self.store.poll_import() {
            if let Some(id) = self.import_banner.take() {
                self.notifications.dismiss(id);
            }
            if outcome.success {
                self.saved_revision = self.store.revision();
            }
            self.notifications.push_outcome(&outcome, now_ms);
            self.refresh_layout();
        }
        self.notifications.prune(now_ms);
    }

    fn refresh_layout(&mut self) {
        if !self.layout_stale.replace(false) {
            return;
        }
        match build_pages(self.variant, &self.store) {
            Ok(pages) => {
                self.pages = pages;
                self.page = self.page.min(self.pages.len().saturating_sub(1));
                self.selected = self.selected.min(self.field_count().saturating_sub(1));
            }
            Err(e) => error!(error = %e, "page layout rebuild failed; keeping previous layout"),
        }
    }
}


/// Apply a line-editing key to `line`.
fn edit_line(line: &mut InputLine, key: Key) {
    match key {
        Key::Char(ch) if !ch.is_control() => line.insert(ch),
        Key::Backspace => line.delete_back(),
        Key::Delete => line.delete_forward(),
        Key::Left => line.move_left(),
        Key::Right => line.move_right(),
        Key::Home | Key::Ctrl('a') => line.move_home(),
        Key::End | Key::Ctrl('e') => line.move_end(),
        Key::Ctrl('w') => line.delete_word_back(),
        Key::Ctrl('u') => line.delete_to_start(),
        Key::Alt('b') => line.move_word_left(),
        Key::Alt('f') => line.move_word_right(),
        _ => {}
    }
}


// ---------------------------------------------------------------------------
// Key
// ---------------------------------------------------------------------------

/// A simplified key event for the TUI.
#[derive(Debug, Clone, PartialEq)]
pub enum Key {
    Char(char),
    Enter,
    Tab,
    Escape,
    Backspace,
    Delete,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    Ctrl(char),
    Alt(char),
    /// A key with no binding (function keys, PageUp, ...).
    Unknown,
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use dashdeck_core::persist::{KeyValueStore, MemoryStore};
    use std::fs;
    use std::time::Duration;

    fn app(variant: Variant) -> (App, MemoryStore) {
        let backend = MemoryStore::new();
        let store = DataStore::open(variant.profile(), backend.clone());
        let app = App::new(store, variant, std::env::temp_dir(), 3000).unwrap();
        (app, backend)
    }

    fn type_str(app: &mut App, s: &str) {
        for ch in s.chars() {
            app.handle_key(Key::Char(ch), 0);
        }
    }

    fn clear_draft(app: &mut App) {
        for _ in 0..32 {
            app.handle_key(Key::Backspace, 0);
        }
    }

    fn wait_for_import(app: &mut App) {
        for _ in 0..400 {
            if !app.store().is_busy() {
                return;
            }
            app.tick(0);
            std::thread::sleep(Duration::from_millis(5));
        }
        panic!("import did not finish");
    }

    // --- Navigation ---

    #[test]
    fn starts_on_first_page() {
        let (app, _) = app(Variant::Brokerage);
        assert_eq!(app.state, AppState::Dashboard);
        assert_eq!(app.page_index(), 0);
        assert_eq!(app.page_count(), 3);
        assert!(!app.has_prev_page());
        assert!(app.has_next_page());
    }

    #[test]
    fn paging_does_not_wrap() {
        let (mut app, _) = app(Variant::Brokerage);
        app.handle_key(Key::Left, 0);
        assert_eq!(app.page_index(), 0);
        app.handle_key(Key::Char('l'), 0);
        app.handle_key(Key::Right, 0);
        app.handle_key(Key::Right, 0);
        assert_eq!(app.page_index(), 2);
        assert!(!app.has_next_page());
        app.handle_key(Key::Char('h'), 0);
        assert_eq!(app.page_index(), 1);
    }

    #[test]
    fn page_change_resets_selection() {
        let (mut app, _) = app(Variant::Brokerage);
        app.handle_key(Key::Char('j'), 0);
        app.handle_key(Key::Char('j'), 0);
        assert_eq!(app.selected_index(), 2);
        app.handle_key(Key::Right, 0);
        assert_eq!(app.selected_index(), 0);
    }

    #[test]
    fn selection_clamps() {
        let (mut app, _) = app(Variant::Brokerage);
        app.handle_key(Key::Up, 0);
        assert_eq!(app.selected_index(), 0);
        app.handle_key(Key::End, 0);
        assert_eq!(app.selected_index(), 14);
        app.handle_key(Key::Down, 0);
        assert_eq!(app.selected_index(), 14);
        app.handle_key(Key::Char('g'), 0);
        assert_eq!(app.selected_index(), 0);
    }

    #[test]
    fn help_closes_on_any_key() {
        let (mut app, _) = app(Variant::Brokerage);
        app.handle_key(Key::Char('?'), 0);
        assert_eq!(app.state, AppState::Help);
        app.handle_key(Key::Char('x'), 0);
        assert_eq!(app.state, AppState::Dashboard);
    }

    // --- Editing ---

    #[test]
    fn edit_and_commit_number() {
        let (mut app, _) = app(Variant::Brokerage);
        app.handle_key(Key::Char('j'), 0);
        app.handle_key(Key::Char('j'), 0);
        assert_eq!(app.selected_field().unwrap().path().to_string(), "page1.metrics.sellSide");

        app.handle_key(Key::Enter, 0);
        assert_eq!(app.state, AppState::Editing);
        clear_draft(&mut app);
        type_str(&mut app, "70");
        app.handle_key(Key::Enter, 0);

        assert_eq!(app.state, AppState::Dashboard);
        assert_eq!(app.store().number("page1.metrics.sellSide", 0.0), 70.0);
        assert_eq!(app.store().number("page1.metrics.buySide", 0.0), 37.0);
        assert!(app.has_unsaved_changes());
    }

    #[test]
    fn edit_keys_q_and_s_are_text_while_editing() {
        let (mut app, _) = app(Variant::Brokerage);
        app.handle_key(Key::Enter, 0);
        clear_draft(&mut app);
        assert_eq!(app.handle_key(Key::Char('q'), 0), None);
        assert_eq!(app.handle_key(Key::Char('s'), 0), None);
        app.handle_key(Key::Enter, 0);
        assert_eq!(app.store().text("page1.closedDeal.value", ""), "qs");
    }

    #[test]
    fn invalid_number_is_silently_dropped() {
        let (mut app, _) = app(Variant::Brokerage);
        app.handle_key(Key::Char('j'), 0);
        app.handle_key(Key::Char('j'), 0);
        app.handle_key(Key::Enter, 0);
        clear_draft(&mut app);
        type_str(&mut app, "abc");
        app.handle_key(Key::Enter, 0);
        assert_eq!(app.store().number("page1.metrics.sellSide", 0.0), 67.0);
        assert!(app.banner(0).is_none());
        assert!(!app.has_unsaved_changes());
    }

    #[test]
    fn escape_cancels_edit() {
        let (mut app, _) = app(Variant::Brokerage);
        app.handle_key(Key::Enter, 0);
        type_str(&mut app, "xyz");
        app.handle_key(Key::Escape, 0);
        assert_eq!(app.state, AppState::Dashboard);
        assert!(!app.selected_field().unwrap().is_editing());
        assert_eq!(app.store().text("page1.closedDeal.value", ""), "69M");
    }

    #[test]
    fn tab_commits_and_moves_on() {
        let (mut app, _) = app(Variant::Brokerage);
        app.handle_key(Key::Enter, 0);
        type_str(&mut app, "!");
        app.handle_key(Key::Tab, 0);
        assert_eq!(app.store().text("page1.closedDeal.value", ""), "69M!");
        assert_eq!(app.selected_index(), 1);
        assert_eq!(app.state, AppState::Dashboard);
    }

    #[test]
    fn negative_net_income_commits() {
        let (mut app, _) = app(Variant::Financial);
        for _ in 0..7 {
            app.handle_key(Key::Down, 0);
        }
        assert_eq!(app.selected_field().unwrap().path().to_string(), "currentQuarter.netIncome");
        app.handle_key(Key::Enter, 0);
        clear_draft(&mut app);
        type_str(&mut app, "-500000");
        app.handle_key(Key::Enter, 0);
        assert_eq!(app.store().number("currentQuarter.netIncome", 0.0), -500000.0);
    }

    #[test]
    fn unbound_keys_do_not_reach_the_draft() {
        let (mut app, _) = app(Variant::Brokerage);
        app.handle_key(Key::Enter, 0);
        app.handle_key(Key::Unknown, 0);
        app.handle_key(Key::Char('\0'), 0);
        app.handle_key(Key::Char('\u{1b}'), 0);
        assert_eq!(app.selected_field().unwrap().draft().unwrap().text(), "69M");
        app.handle_key(Key::Enter, 0);
        assert_eq!(app.store().text("page1.closedDeal.value", ""), "69M");
    }

    #[test]
    fn unbound_keys_in_import_prompt_are_ignored() {
        let (mut app, _) = app(Variant::Brokerage);
        app.handle_key(Key::Char('i'), 0);
        app.handle_key(Key::Unknown, 0);
        type_str(&mut app, "a.json");
        assert_eq!(app.prompt().text(), "a.json");
    }

    // --- Management actions ---

    #[test]
    fn save_key_persists_and_shows_banner() {
        let (mut app, backend) = app(Variant::Brokerage);
        let action = app.handle_key(Key::Char('s'), 0).unwrap();
        assert_eq!(action, AppAction::Save);
        app.perform(action, 1000);
        assert!(backend.contains("dashboardData").unwrap());
        let banner = app.banner(1000).unwrap();
        assert_eq!(banner.body, "Data saved successfully!");
        assert_eq!(banner.notification_type, NotificationType::Success);
        assert!(app.banner(4000).is_none());
    }

    #[test]
    fn export_writes_into_export_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let store = DataStore::open(Variant::Financial.profile(), MemoryStore::new());
        let mut app = App::new(store, Variant::Financial, tmp.path().to_path_buf(), 3000).unwrap();
        let action = app.handle_key(Key::Char('e'), 0).unwrap();
        app.perform(action, 0);
        assert_eq!(app.banner(0).unwrap().body, "Data exported successfully!");
        let names: Vec<_> = fs::read_dir(tmp.path()).unwrap().map(|e| e.unwrap().file_name()).collect();
        assert_eq!(names.len(), 1);
        assert!(names[0].to_string_lossy().starts_with("financial-dashboard-"));
    }

    #[test]
    fn reset_requires_confirmation() {
        let (mut app, _) = app(Variant::Brokerage);
        app.handle_key(Key::Enter, 0);
        type_str(&mut app, "!");
        app.handle_key(Key::Enter, 0);

        assert_eq!(app.handle_key(Key::Char('R'), 0), None);
        assert!(matches!(app.state, AppState::Confirm { action: PendingAction::Reset, .. }));
        assert_eq!(app.handle_key(Key::Char('n'), 0), None);
        assert_eq!(app.state, AppState::Dashboard);
        assert_eq!(app.store().text("page1.closedDeal.value", ""), "69M!");

        app.handle_key(Key::Char('R'), 0);
        let action = app.handle_key(Key::Char('y'), 0).unwrap();
        assert_eq!(action, AppAction::Reset);
        app.perform(action, 0);
        assert_eq!(app.store().text("page1.closedDeal.value", ""), "69M");
        assert_eq!(app.banner(0).unwrap().body, "Data reset to default values!");
        assert!(!app.has_unsaved_changes());
    }

    #[test]
    fn quit_with_unsaved_changes_asks_first() {
        let (mut app, _) = app(Variant::Brokerage);
        assert_eq!(app.handle_key(Key::Char('q'), 0), Some(AppAction::Quit));

        app.handle_key(Key::Enter, 0);
        type_str(&mut app, "!");
        app.handle_key(Key::Enter, 0);
        assert_eq!(app.handle_key(Key::Char('q'), 0), None);
        assert_eq!(app.handle_key(Key::Char('y'), 0), Some(AppAction::Quit));
    }

    // --- Import ---

    #[test]
    fn import_prompt_flow() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("in.json");
        fs::write(&file, r#"{"page1":{"closedDeal":{"value":"1M"}},"page2":{},"page3":{}}"#).unwrap();
        let (mut app, backend) = app(Variant::Brokerage);

        app.handle_key(Key::Char('i'), 0);
        assert_eq!(app.state, AppState::ImportPrompt);
        type_str(&mut app, &file.display().to_string());
        let action = app.handle_key(Key::Enter, 0).unwrap();
        assert_eq!(action, AppAction::Import(file.clone()));
        app.perform(action, 0);
        assert!(app.store().is_busy());
        assert_eq!(app.banner(0).unwrap().notification_type, NotificationType::Info);

        // Mutating keys are ignored while the import runs.
        assert_eq!(app.handle_key(Key::Char('s'), 0), None);
        app.handle_key(Key::Enter, 0);
        assert_eq!(app.state, AppState::Dashboard);

        wait_for_import(&mut app);
        assert_eq!(app.banner(0).unwrap().body, "Data imported successfully!");
        assert_eq!(app.store().text("page1.closedDeal.value", ""), "1M");
        assert!(backend.contains("dashboardData").unwrap());
        assert!(!app.has_unsaved_changes());
    }

    #[test]
    fn import_invalid_shape_shows_error() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("bad.json");
        fs::write(&file, r#"{"foo":1}"#).unwrap();
        let (mut app, _) = app(Variant::Brokerage);
        app.perform(AppAction::Import(file), 0);
        wait_for_import(&mut app);
        let banner = app.banner(0).unwrap();
        assert_eq!(banner.notification_type, NotificationType::Error);
        assert_eq!(banner.body, "Invalid data format. Please check your JSON file.");
        assert_eq!(app.store().number("page1.metrics.sellSide", 0.0), 67.0);
    }

    #[test]
    fn import_non_json_is_refused() {
        let (mut app, _) = app(Variant::Brokerage);
        app.perform(AppAction::Import(PathBuf::from("notes.txt")), 0);
        assert!(!app.store().is_busy());
        assert_eq!(app.banner(0).unwrap().body, "Please select a valid JSON file.");
    }

    #[test]
    fn empty_prompt_or_escape_does_nothing() {
        let (mut app, _) = app(Variant::Brokerage);
        app.handle_key(Key::Char('i'), 0);
        assert_eq!(app.handle_key(Key::Enter, 0), None);
        app.handle_key(Key::Char('i'), 0);
        type_str(&mut app, "x.json");
        assert_eq!(app.handle_key(Key::Escape, 0), None);
        assert_eq!(app.state, AppState::Dashboard);
        assert!(app.prompt().is_empty());
    }

    #[test]
    fn import_rebuilds_office_fields() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("fin.json");
        fs::write(&file, r#"{"topOffices":[{"name":"Solo","revenue":1,"margin":2}]}"#).unwrap();
        let (mut app, _) = app(Variant::Financial);
        let before = app.current_page().unwrap().field_count();
        app.perform(AppAction::Import(file), 0);
        wait_for_import(&mut app);
        assert_eq!(app.current_page().unwrap().field_count(), before - 6);
    }
}

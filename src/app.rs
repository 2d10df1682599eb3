use anyhow::Result;
use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::oneshot::{self, error::TryRecvError};

use crate::config::AppConfig;
use crate::form::SubmitOutcome;
use crate::screens::journal::JournalScreen;
use crate::screens::new_entry::NewEntryScreen;
use crate::screens::signin::SigninScreen;
use crate::screens::{Screen, ScreenEvent};
use crate::store::persist::Persistor;
use crate::store::{Action, PersistAction, RootState, Store};
use crate::theme::Theme;

/// Seconds a status toast stays visible
const STATUS_SECONDS: u64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    None,
    Help,
    Confirm,
}

/// Destructive action waiting on the confirm popup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pending {
    Delete(u64),
    Wipe,
}

type Rehydration = oneshot::Receiver<Result<Option<RootState>>>;

pub struct App {
    pub screen: Screen,
    pub popup: Popup,
    pub should_quit: bool,

    pub config: AppConfig,
    pub theme: Theme,

    // State container and its persistence
    pub store: Store,
    persistor: Arc<Persistor>,
    rehydration: Option<Rehydration>,

    // Screens
    pub signin: SigninScreen,
    pub new_entry: NewEntryScreen,
    pub journal: JournalScreen,

    // Action awaiting confirmation
    pub pending: Option<Pending>,

    // Status message (shown in info line, auto-clears after timeout)
    pub status_message: Option<String>,
    pub status_message_time: Option<Instant>,
}

impl App {
    /// Build the app with empty state and start rehydrating in the background.
    /// The first frame can be drawn before persisted state arrives.
    pub fn new(config: AppConfig, persistor: Arc<Persistor>, screen: Screen) -> Self {
        let mut store = Store::new();
        store.dispatch(Action::Persist(PersistAction::Register));
        if persistor.is_paused() {
            store.dispatch(Action::Persist(PersistAction::Pause));
        } else {
            store.dispatch(Action::Persist(PersistAction::Persist));
        }
        let rehydration = Some(persistor.spawn_rehydrate());

        Self {
            screen,
            popup: Popup::None,
            should_quit: false,

            theme: Theme::from_overrides(&config.theme),
            signin: SigninScreen::new(config.last_user.as_deref(), config.reveal_password),
            new_entry: NewEntryScreen::new(),
            journal: JournalScreen::default(),
            config,

            store,
            persistor,
            rehydration,

            pending: None,
            status_message: None,
            status_message_time: None,
        }
    }

    /// Set a status message (auto-clears after 3 seconds)
    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
        self.status_message_time = Some(Instant::now());
    }

    pub fn signed_in_user(&self) -> Option<&str> {
        self.store.state().session.user.as_deref()
    }

    pub fn saving_paused(&self) -> bool {
        self.persistor.is_paused()
    }

    pub fn navigate(&mut self, screen: Screen) {
        tracing::debug!(path = screen.path(), "navigate");
        self.screen = screen;
        if screen == Screen::Journal {
            self.journal.clamp(self.store.state().journal.entries.len());
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        if ctrl && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q')) {
            self.should_quit = true;
            return Ok(());
        }

        // Handle popups first
        if self.popup != Popup::None {
            return self.handle_popup_key(key);
        }

        match key.code {
            KeyCode::F(1) => {
                self.popup = Popup::Help;
                return Ok(());
            }
            KeyCode::Char('n') if ctrl => {
                self.navigate(Screen::NewEntry);
                return Ok(());
            }
            KeyCode::Char('j') if ctrl => {
                self.navigate(Screen::Journal);
                return Ok(());
            }
            KeyCode::Char('l') if ctrl => {
                self.navigate(Screen::Signin);
                return Ok(());
            }
            KeyCode::Char('o') if ctrl => return self.sign_out(),
            KeyCode::Char('p') if ctrl => {
                self.toggle_persistence();
                return Ok(());
            }
            _ => {}
        }

        let event = match self.screen {
            Screen::Signin => self.signin.handle_key(key),
            Screen::NewEntry => self.new_entry.handle_key(key),
            Screen::Journal => match key.code {
                // The journal has no text inputs, so plain letters are free for commands
                KeyCode::Char('q') => {
                    self.should_quit = true;
                    ScreenEvent::None
                }
                KeyCode::Char('?') | KeyCode::Char('h') => {
                    self.popup = Popup::Help;
                    ScreenEvent::None
                }
                _ => self.journal.handle_key(key, &self.store.state().journal),
            },
        };

        self.apply_event(event)
    }

    fn handle_popup_key(&mut self, key: KeyEvent) -> Result<()> {
        match self.popup {
            Popup::Help => {
                if matches!(
                    key.code,
                    KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('?') | KeyCode::Enter | KeyCode::Char('q')
                ) {
                    self.popup = Popup::None;
                }
            }
            Popup::Confirm => match key.code {
                KeyCode::Char('y') | KeyCode::Enter => {
                    self.popup = Popup::None;
                    self.confirm_pending()?;
                }
                KeyCode::Char('n') | KeyCode::Esc => {
                    self.popup = Popup::None;
                    self.pending = None;
                    self.status_message = None;
                }
                _ => {}
            },
            Popup::None => {}
        }
        Ok(())
    }

    fn apply_event(&mut self, event: ScreenEvent) -> Result<()> {
        match event {
            ScreenEvent::None => {}
            ScreenEvent::Navigate(screen) => self.navigate(screen),
            ScreenEvent::Submit => match self.screen {
                Screen::Signin => self.submit_signin(),
                Screen::NewEntry => self.submit_entry(),
                Screen::Journal => {}
            },
            ScreenEvent::ConfirmDelete(id) => self.ask(Pending::Delete(id), "Delete this entry?"),
            ScreenEvent::ConfirmWipe => self.ask(Pending::Wipe, "Delete the whole journal?"),
        }
        Ok(())
    }

    fn submit_signin(&mut self) {
        let store = &mut self.store;
        let persistor = &self.persistor;
        let mut signed_in = None;

        let outcome = self.signin.form.submit(|creds| {
            commit(
                store,
                persistor,
                Action::SignedIn {
                    full_name: creds.full_name.clone(),
                },
            )?;
            signed_in = Some(creds.full_name.clone());
            Ok::<(), anyhow::Error>(())
        });

        match outcome {
            SubmitOutcome::Accepted => {
                let name = signed_in.unwrap_or_default();
                tracing::info!("Signed in as {}", name);
                self.set_status(format!("Signed in as {}", name));
                self.remember_user(Some(name));
                self.navigate(Screen::NewEntry);
            }
            SubmitOutcome::Rejected(e) => {
                tracing::warn!("Sign-in not saved: {:#}", e);
                self.set_status(format!("Sign-in failed: {}", e));
            }
            SubmitOutcome::Blocked => {}
        }
    }

    fn submit_entry(&mut self) {
        let store = &mut self.store;
        let persistor = &self.persistor;
        let mut saved_title = None;

        let outcome = self.new_entry.form.submit(|entry| {
            commit(
                store,
                persistor,
                Action::EntryAdded {
                    entry: entry.clone(),
                    created_at: Utc::now(),
                },
            )?;
            saved_title = Some(entry.title.clone());
            Ok::<(), anyhow::Error>(())
        });

        match outcome {
            SubmitOutcome::Accepted => {
                let title = saved_title.unwrap_or_default();
                tracing::info!("Saved entry {:?}", title);
                self.set_status(format!("Saved \"{}\"", title));
                self.new_entry = NewEntryScreen::new();
                if self.config.notifications {
                    notify("moodscribe", &format!("Saved \"{}\"", title));
                }
            }
            SubmitOutcome::Rejected(e) => {
                tracing::warn!("Entry not saved: {:#}", e);
                self.set_status(format!("Save failed: {}", e));
            }
            SubmitOutcome::Blocked => {}
        }
    }

    fn ask(&mut self, pending: Pending, question: &str) {
        self.pending = Some(pending);
        self.popup = Popup::Confirm;
        // Confirm popup reads its question from the status line
        self.status_message = Some(question.to_string());
        self.status_message_time = None;
    }

    fn confirm_pending(&mut self) -> Result<()> {
        match self.pending.take() {
            None => return Ok(()),
            Some(Pending::Delete(id)) => {
                commit(&mut self.store, &self.persistor, Action::EntryRemoved { id })?;
                self.set_status("Entry deleted");
            }
            Some(Pending::Wipe) => {
                if !self.store.is_rehydrated() {
                    anyhow::bail!("journal is still loading, try again in a moment");
                }
                self.persistor.purge()?;
                self.store.dispatch(Action::Persist(PersistAction::Purge));
                tracing::info!("Journal wiped");
                self.set_status("Journal wiped");
                self.navigate(Screen::Signin);
            }
        }
        self.journal.clamp(self.store.state().journal.entries.len());
        Ok(())
    }

    /// Pause or resume writing state to storage. While paused, changes stay in memory.
    fn toggle_persistence(&mut self) {
        if self.persistor.is_paused() {
            self.persistor.resume();
            self.store.dispatch(Action::Persist(PersistAction::Persist));
            self.set_status("Saving resumed");
        } else {
            self.persistor.pause();
            self.store.dispatch(Action::Persist(PersistAction::Pause));
            self.set_status("Saving paused, changes stay in memory");
        }
    }

    fn sign_out(&mut self) -> Result<()> {
        if self.signed_in_user().is_none() {
            self.set_status("Not signed in");
            return Ok(());
        }
        commit(&mut self.store, &self.persistor, Action::SignedOut)?;
        // Fresh form, pre-filled with the remembered name
        self.signin = SigninScreen::new(self.config.last_user.as_deref(), self.config.reveal_password);
        self.set_status("Signed out");
        self.navigate(Screen::Signin);
        Ok(())
    }

    fn remember_user(&mut self, name: Option<String>) {
        if self.config.last_user == name {
            return;
        }
        self.config.last_user = name;
        if let Err(e) = self.config.save() {
            tracing::warn!("Could not save config: {}", e);
        }
    }

    /// Periodic housekeeping: pick up rehydrated state and expire the status toast
    pub fn tick(&mut self) {
        self.poll_rehydration();

        if let Some(time) = self.status_message_time {
            if time.elapsed().as_secs() >= STATUS_SECONDS {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }

    fn poll_rehydration(&mut self) {
        let Some(rx) = self.rehydration.as_mut() else {
            return;
        };

        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Closed) => Err(anyhow::anyhow!("rehydration task ended without a result")),
        };
        self.rehydration = None;

        match result {
            Ok(Some(state)) => {
                let user = state.session.user.clone();
                self.store.dispatch(Action::Persist(PersistAction::Rehydrate(Box::new(state))));
                if let Some(user) = user {
                    self.set_status(format!("Welcome back, {}", user));
                }
            }
            Ok(None) => self.store.finish_rehydrate(),
            Err(e) => {
                tracing::error!("Rehydration failed: {:#}", e);
                self.store.finish_rehydrate();
                self.set_status(format!("Could not load journal: {}", e));
            }
        }
        self.journal.clamp(self.store.state().journal.entries.len());
    }
}

/// Apply `action` and persist the result. The store only changes if the write succeeds.
fn commit(store: &mut Store, persistor: &Persistor, action: Action) -> Result<()> {
    if !store.is_rehydrated() {
        anyhow::bail!("journal is still loading, try again in a moment");
    }
    let mut next = store.clone();
    next.dispatch(action);
    next.dispatch(Action::Persist(PersistAction::Flush));
    persistor.save(next.state())?;
    *store = next;
    Ok(())
}

/// Fire-and-forget desktop notification
fn notify(summary: &str, body: &str) {
    let summary = summary.to_string();
    let body = body.to_string();
    tokio::task::spawn_blocking(move || {
        if let Err(e) = notify_rust::Notification::new()
            .summary(&summary)
            .body(&body)
            .icon("accessories-text-editor")
            .show()
        {
            tracing::warn!("Notification failed: {}", e);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mood::MoodSmiley;
    use crate::screens::{ctrl, press, type_text};
    use crate::store::persist::{MemoryStorage, Storage};
    use crate::validation::{EntryField, FieldError};
    use std::time::Duration;

    /// Storage whose writes always fail
    struct ReadOnlyStorage;

    impl Storage for ReadOnlyStorage {
        fn get_item(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }
        fn set_item(&self, _key: &str, _value: &str) -> Result<()> {
            anyhow::bail!("read-only storage")
        }
        fn remove_item(&self, _key: &str) -> Result<()> {
            Ok(())
        }
    }

    async fn ready_app(storage: Arc<dyn Storage>, screen: Screen) -> App {
        let mut app = App::new(AppConfig::default(), Arc::new(Persistor::new(storage)), screen);
        for _ in 0..500 {
            app.tick();
            if app.store.is_rehydrated() {
                return app;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        panic!("rehydration never finished");
    }

    fn send_text(app: &mut App, text: &str) {
        type_text(text, |k| app.handle_key(k).unwrap());
    }

    fn fill_entry(app: &mut App) {
        send_text(app, "2024-07-04");
        app.handle_key(press(KeyCode::Tab)).unwrap(); // -> mood
        app.handle_key(press(KeyCode::Tab)).unwrap(); // -> title
        send_text(app, "Fireworks");
        app.handle_key(press(KeyCode::Tab)).unwrap(); // -> content
        send_text(app, "Loud but lovely.");
    }

    #[tokio::test]
    async fn test_entry_blocked_without_mood_then_saved() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::default());
        let mut app = ready_app(Arc::clone(&storage), Screen::NewEntry).await;
        fill_entry(&mut app);

        app.handle_key(press(KeyCode::F(2))).unwrap();
        assert_eq!(
            app.new_entry.form.error(EntryField::Mood),
            Some(&FieldError::MoodRequired)
        );
        assert!(app.store.state().journal.entries.is_empty());

        app.new_entry.select_mood(MoodSmiley::Sad);
        app.handle_key(press(KeyCode::F(2))).unwrap();

        let entries = &app.store.state().journal.entries;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].entry.mood, MoodSmiley::Sad);
        assert_eq!(entries[0].entry.title, "Fireworks");
        assert!(app.new_entry.form.draft().title.is_empty(), "form reset");
        assert!(storage.get_item("persist:root").unwrap().is_some(), "flushed");
    }

    #[tokio::test]
    async fn test_failed_flush_keeps_form_and_store() {
        let mut app = ready_app(Arc::new(ReadOnlyStorage), Screen::NewEntry).await;
        fill_entry(&mut app);
        app.new_entry.select_mood(MoodSmiley::Happy);

        app.handle_key(press(KeyCode::F(2))).unwrap();
        assert!(app.store.state().journal.entries.is_empty());
        assert_eq!(app.new_entry.form.draft().title, "Fireworks");
        assert!(app.status_message.as_deref().unwrap_or("").starts_with("Save failed"));
    }

    #[tokio::test]
    async fn test_state_survives_restart() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::default());
        let mut app = ready_app(Arc::clone(&storage), Screen::NewEntry).await;
        fill_entry(&mut app);
        app.new_entry.select_mood(MoodSmiley::Neutral);
        app.handle_key(press(KeyCode::F(2))).unwrap();
        let before = app.store.state().clone();
        drop(app);

        let restarted = ready_app(storage, Screen::Journal).await;
        assert_eq!(restarted.store.state(), &before);
    }

    #[tokio::test]
    async fn test_sign_in_flow() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::default());
        let mut app = ready_app(storage, Screen::Signin).await;
        // Keep the test away from the real config file
        app.config.last_user = Some("Ada Lovelace".to_string());

        app.signin.form.reset();
        app.signin.focus = crate::screens::signin::SigninFocus::FullName;
        send_text(&mut app, "Ada Lovelace");
        app.handle_key(press(KeyCode::Tab)).unwrap();
        send_text(&mut app, "abc123!@");
        app.handle_key(press(KeyCode::F(2))).unwrap();
        assert_eq!(app.signed_in_user(), None, "weak password blocks");
        assert_eq!(app.screen, Screen::Signin);

        app.handle_key(ctrl('u')).unwrap();
        send_text(&mut app, "Abc123!@");
        app.handle_key(press(KeyCode::F(2))).unwrap();
        assert_eq!(app.signed_in_user(), Some("Ada Lovelace"));
        assert_eq!(app.screen, Screen::NewEntry);
        assert!(app.signin.form.draft().full_name.is_empty(), "form reset after sign-in");

        app.handle_key(ctrl('o')).unwrap();
        assert_eq!(app.signed_in_user(), None);
        assert_eq!(app.screen, Screen::Signin);
        assert_eq!(app.signin.form.draft().full_name, "Ada Lovelace", "remembered name restored");
        assert!(app.signin.form.draft().password.is_empty());
        assert_eq!(app.signin.focus, crate::screens::signin::SigninFocus::Password);
    }

    #[tokio::test]
    async fn test_delete_requires_confirmation() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::default());
        let mut app = ready_app(storage, Screen::NewEntry).await;
        fill_entry(&mut app);
        app.new_entry.select_mood(MoodSmiley::Angry);
        app.handle_key(press(KeyCode::F(2))).unwrap();

        app.handle_key(ctrl('j')).unwrap();
        assert_eq!(app.screen, Screen::Journal);

        app.handle_key(press(KeyCode::Char('d'))).unwrap();
        assert_eq!(app.popup, Popup::Confirm);
        app.handle_key(press(KeyCode::Char('n'))).unwrap();
        assert_eq!(app.store.state().journal.entries.len(), 1);

        app.handle_key(press(KeyCode::Char('d'))).unwrap();
        app.handle_key(press(KeyCode::Char('y'))).unwrap();
        assert!(app.store.state().journal.entries.is_empty());
        assert_eq!(app.popup, Popup::None);
    }

    #[tokio::test]
    async fn test_wipe_purges_storage() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::default());
        let mut app = ready_app(Arc::clone(&storage), Screen::NewEntry).await;
        fill_entry(&mut app);
        app.new_entry.select_mood(MoodSmiley::Confused);
        app.handle_key(press(KeyCode::F(2))).unwrap();
        assert!(storage.get_item("persist:root").unwrap().is_some());

        app.handle_key(ctrl('j')).unwrap();
        app.handle_key(press(KeyCode::Char('X'))).unwrap();
        assert_eq!(app.pending, Some(Pending::Wipe));
        app.handle_key(press(KeyCode::Char('y'))).unwrap();

        assert_eq!(app.store.state(), &RootState::default());
        assert!(storage.get_item("persist:root").unwrap().is_none());
        assert_eq!(app.screen, Screen::Signin);
    }

    #[tokio::test]
    async fn test_paused_persistence_skips_writes() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::default());
        let mut app = ready_app(Arc::clone(&storage), Screen::NewEntry).await;
        app.handle_key(ctrl('p')).unwrap();
        fill_entry(&mut app);
        app.new_entry.select_mood(MoodSmiley::Shocked);
        app.handle_key(press(KeyCode::F(2))).unwrap();

        assert_eq!(app.store.state().journal.entries.len(), 1);
        assert!(storage.get_item("persist:root").unwrap().is_none());

        app.handle_key(ctrl('p')).unwrap();
        assert!(!app.persistor.is_paused());
    }

    #[tokio::test]
    async fn test_commit_refused_before_rehydration() {
        let mut store = Store::new();
        let persistor = Persistor::new(Arc::new(MemoryStorage::default()));
        let err = commit(&mut store, &persistor, Action::SignedOut).unwrap_err();
        assert!(err.to_string().contains("still loading"));
    }

    #[tokio::test]
    async fn test_quit_keys() {
        let mut app = ready_app(Arc::new(MemoryStorage::default()), Screen::NewEntry).await;
        send_text(&mut app, "q");
        assert!(!app.should_quit, "q is text on form screens");

        app.handle_key(ctrl('j')).unwrap();
        app.handle_key(press(KeyCode::Char('q'))).unwrap();
        assert!(app.should_quit);
    }
}

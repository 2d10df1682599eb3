//! Application state container
//!
//! All state lives in one [`RootState`] owned by the [`Store`]. It only
//! changes through [`Store::dispatch`]. Persistence is handled separately by
//! [`persist::Persistor`], which the app calls at fixed points: rehydrate once
//! at startup, then flush after each accepted submit.

pub mod persist;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::MoodEntry;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// Full name of the signed-in user
    #[serde(default)]
    pub user: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: u64,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub entry: MoodEntry,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalState {
    #[serde(default)]
    pub entries: Vec<JournalEntry>,
    #[serde(default = "first_id")]
    pub next_id: u64,
}

fn first_id() -> u64 {
    1
}

impl Default for JournalState {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id: first_id(),
        }
    }
}

impl JournalState {
    /// Entries newest-date first; same-day entries by creation time
    pub fn sorted(&self) -> Vec<&JournalEntry> {
        let mut entries: Vec<&JournalEntry> = self.entries.iter().collect();
        entries.sort_by(|a, b| {
            b.entry
                .date
                .cmp(&a.entry.date)
                .then(b.created_at.cmp(&a.created_at))
        });
        entries
    }

    /// Entries as export records, newest first
    pub fn export(&self) -> Vec<serde_json::Value> {
        self.sorted()
            .into_iter()
            .map(|e| {
                serde_json::json!({
                    "id": e.id,
                    "createdAt": e.created_at,
                    "date": e.entry.date,
                    "title": e.entry.title,
                    "content": e.entry.content,
                    "moodSmiley": e.entry.mood,
                    "score": e.entry.mood.score(),
                    "icon": e.entry.mood.icon(),
                })
            })
            .collect()
    }

    /// Mean mood score, if there are entries
    pub fn average_score(&self) -> Option<f32> {
        if self.entries.is_empty() {
            return None;
        }
        let total: u32 = self.entries.iter().map(|e| u32::from(e.entry.mood.score())).sum();
        Some(total as f32 / self.entries.len() as f32)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootState {
    #[serde(default)]
    pub session: SessionState,
    #[serde(default)]
    pub journal: JournalState,
}

/// Bookkeeping actions owned by the persistence layer
#[derive(Debug, Clone, PartialEq)]
pub enum PersistAction {
    Flush,
    Rehydrate(Box<RootState>),
    Pause,
    Persist,
    Purge,
    Register,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum Action {
    SignedIn { full_name: String },
    SignedOut,
    EntryAdded { entry: MoodEntry, created_at: DateTime<Utc> },
    EntryRemoved { id: u64 },
    #[serde(skip)]
    Persist(PersistAction),
}

impl Action {
    /// Persistence bookkeeping is exempt from the serializable-payload check
    pub fn is_bookkeeping(&self) -> bool {
        matches!(self, Action::Persist(_))
    }
}

#[derive(Debug, Clone, Default)]
pub struct Store {
    state: RootState,
    rehydrated: bool,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &RootState {
        &self.state
    }

    /// True once persisted state has been restored (or found absent)
    pub fn is_rehydrated(&self) -> bool {
        self.rehydrated
    }

    pub fn dispatch(&mut self, action: Action) {
        if !action.is_bookkeeping() {
            match serde_json::to_string(&action) {
                Ok(json) => tracing::debug!(action = %json, "dispatch"),
                Err(e) => tracing::warn!("Non-serializable action dispatched: {:?} ({})", action, e),
            }
        }

        match action {
            Action::SignedIn { full_name } => {
                self.state.session.user = Some(full_name);
            }
            Action::SignedOut => {
                self.state.session.user = None;
            }
            Action::EntryAdded { entry, created_at } => {
                let journal = &mut self.state.journal;
                let id = journal.next_id;
                journal.next_id += 1;
                journal.entries.push(JournalEntry { id, created_at, entry });
            }
            Action::EntryRemoved { id } => {
                self.state.journal.entries.retain(|e| e.id != id);
            }
            Action::Persist(PersistAction::Rehydrate(inbound)) => {
                // Inbound slices replace the initial ones wholesale
                self.state = *inbound;
                self.rehydrated = true;
            }
            Action::Persist(PersistAction::Purge) => {
                self.state = RootState::default();
            }
            Action::Persist(
                PersistAction::Flush
                | PersistAction::Pause
                | PersistAction::Persist
                | PersistAction::Register,
            ) => {}
        }
    }

    /// Mark rehydration finished without replacing state (nothing was stored)
    pub fn finish_rehydrate(&mut self) {
        self.rehydrated = true;
    }
}

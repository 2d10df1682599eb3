use crossterm::event::{KeyCode, KeyEvent};

use super::{Screen, ScreenEvent};
use crate::store::JournalState;

/// Read-only list of saved entries, newest first
#[derive(Debug, Default)]
pub struct JournalScreen {
    pub selected: usize,
    pub content_scroll: u16,
}

impl JournalScreen {
    /// Keep the selection inside the list after entries come or go
    pub fn clamp(&mut self, len: usize) {
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, journal: &JournalState) -> ScreenEvent {
        let entries = journal.sorted();
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if self.selected + 1 < entries.len() {
                    self.selected += 1;
                    self.content_scroll = 0;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if self.selected > 0 {
                    self.selected -= 1;
                    self.content_scroll = 0;
                }
            }
            KeyCode::PageDown => self.content_scroll = self.content_scroll.saturating_add(5),
            KeyCode::PageUp => self.content_scroll = self.content_scroll.saturating_sub(5),
            KeyCode::Char('n') => return ScreenEvent::Navigate(Screen::NewEntry),
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(entry) = entries.get(self.selected) {
                    return ScreenEvent::ConfirmDelete(entry.id);
                }
            }
            KeyCode::Char('X') if !entries.is_empty() => return ScreenEvent::ConfirmWipe,
            _ => {}
        }
        ScreenEvent::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mood::MoodSmiley;
    use crate::screens::press;
    use crate::store::tests::sample_entry;
    use crate::store::{Action, Store};
    use chrono::Utc;

    fn journal_with(days: &[u32]) -> Store {
        let mut store = Store::new();
        for day in days {
            store.dispatch(Action::EntryAdded {
                entry: sample_entry(*day, MoodSmiley::Happy),
                created_at: Utc::now(),
            });
        }
        store
    }

    #[test]
    fn test_navigation_stays_in_bounds() {
        let store = journal_with(&[1, 2]);
        let journal = &store.state().journal;
        let mut screen = JournalScreen::default();

        screen.handle_key(press(KeyCode::Up), journal);
        assert_eq!(screen.selected, 0);
        screen.handle_key(press(KeyCode::Down), journal);
        screen.handle_key(press(KeyCode::Down), journal);
        assert_eq!(screen.selected, 1);
    }

    #[test]
    fn test_delete_targets_sorted_selection() {
        let store = journal_with(&[1, 20]);
        let mut screen = JournalScreen::default();
        // Newest date first: day 20 was added second and has id 2
        assert_eq!(
            screen.handle_key(press(KeyCode::Char('d')), &store.state().journal),
            ScreenEvent::ConfirmDelete(2)
        );
    }

    #[test]
    fn test_delete_on_empty_journal_does_nothing() {
        let store = Store::new();
        let mut screen = JournalScreen::default();
        assert_eq!(
            screen.handle_key(press(KeyCode::Delete), &store.state().journal),
            ScreenEvent::None
        );
    }

    #[test]
    fn test_wipe_needs_entries() {
        let mut screen = JournalScreen::default();
        let empty = Store::new();
        assert_eq!(
            screen.handle_key(press(KeyCode::Char('X')), &empty.state().journal),
            ScreenEvent::None
        );
        let store = journal_with(&[4]);
        assert_eq!(
            screen.handle_key(press(KeyCode::Char('X')), &store.state().journal),
            ScreenEvent::ConfirmWipe
        );
    }

    #[test]
    fn test_clamp() {
        let mut screen = JournalScreen { selected: 5, content_scroll: 0 };
        screen.clamp(3);
        assert_eq!(screen.selected, 2);
        screen.clamp(0);
        assert_eq!(screen.selected, 0);
    }
}

use chrono::{Days, Local, NaiveDate};
use crossterm::event::{KeyCode, KeyEvent};

use super::{edit_line, edit_multiline, ScreenEvent};
use crate::form::{FormController, NewEntrySchema};
use crate::mood::{MoodSmiley, MOODS};
use crate::validation::{self, EntryField, DATE_INPUT_FORMAT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryFocus {
    Date,
    Mood,
    Title,
    Content,
    Save,
}

impl EntryFocus {
    const ORDER: [EntryFocus; 5] = [
        EntryFocus::Date,
        EntryFocus::Mood,
        EntryFocus::Title,
        EntryFocus::Content,
        EntryFocus::Save,
    ];

    fn position(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    fn next(self) -> Self {
        Self::ORDER[(self.position() + 1) % Self::ORDER.len()]
    }

    fn prev(self) -> Self {
        Self::ORDER[(self.position() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    /// Field validated when focus leaves. The picker is not an input, so it never blurs.
    fn blur_field(self) -> Option<EntryField> {
        match self {
            EntryFocus::Date => Some(EntryField::Date),
            EntryFocus::Title => Some(EntryField::Title),
            EntryFocus::Content => Some(EntryField::Content),
            EntryFocus::Mood | EntryFocus::Save => None,
        }
    }
}

pub struct NewEntryScreen {
    pub form: FormController<NewEntrySchema>,
    pub focus: EntryFocus,
    /// Highlighted position in the mood picker (not the selection)
    pub mood_cursor: usize,
}

impl Default for NewEntryScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl NewEntryScreen {
    pub fn new() -> Self {
        Self {
            form: FormController::new(),
            focus: EntryFocus::Date,
            mood_cursor: 0,
        }
    }

    pub fn selected_mood(&self) -> Option<MoodSmiley> {
        self.form.draft().mood
    }

    /// Select exactly one mood; any "Mood is required" message goes away
    pub fn select_mood(&mut self, mood: MoodSmiley) {
        self.mood_cursor = mood.index();
        self.form.update(EntryField::Mood, |draft| draft.mood = Some(mood));
        self.form.clear_error(EntryField::Mood);
    }

    fn move_focus(&mut self, to: EntryFocus) {
        if let Some(field) = self.focus.blur_field() {
            self.form.blur(field);
        }
        self.focus = to;
    }

    fn shift_date(&mut self, forward: bool) {
        let current = validation::parse_date(&self.form.draft().date)
            .unwrap_or_else(|_| Local::now().date_naive());
        let shifted = if forward {
            current.checked_add_days(Days::new(1))
        } else {
            current.checked_sub_days(Days::new(1))
        };
        if let Some(date) = shifted {
            self.set_date(date);
        }
    }

    fn set_date(&mut self, date: NaiveDate) {
        self.form.update(EntryField::Date, |draft| {
            draft.date = date.format(DATE_INPUT_FORMAT).to_string();
        });
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> ScreenEvent {
        match key.code {
            KeyCode::Tab => {
                self.move_focus(self.focus.next());
                return ScreenEvent::None;
            }
            KeyCode::BackTab => {
                self.move_focus(self.focus.prev());
                return ScreenEvent::None;
            }
            KeyCode::F(2) => return ScreenEvent::Submit,
            _ => {}
        }

        match self.focus {
            EntryFocus::Date => self.handle_date_key(key),
            EntryFocus::Mood => self.handle_mood_key(key),
            EntryFocus::Title => match key.code {
                KeyCode::Enter | KeyCode::Down => self.move_focus(self.focus.next()),
                KeyCode::Up => self.move_focus(self.focus.prev()),
                _ => self.form.update(EntryField::Title, |d| {
                    edit_line(&mut d.title, key);
                }),
            },
            EntryFocus::Content => self.form.update(EntryField::Content, |d| {
                edit_multiline(&mut d.content, key);
            }),
            EntryFocus::Save => match key.code {
                KeyCode::Enter | KeyCode::Char(' ') => return ScreenEvent::Submit,
                KeyCode::Up => self.move_focus(self.focus.prev()),
                KeyCode::Down => self.move_focus(self.focus.next()),
                _ => {}
            },
        }
        ScreenEvent::None
    }

    fn handle_date_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter | KeyCode::Down => self.move_focus(self.focus.next()),
            KeyCode::Up => self.move_focus(self.focus.prev()),
            KeyCode::Char('t') => self.set_date(Local::now().date_naive()),
            KeyCode::PageUp => self.shift_date(true),
            KeyCode::PageDown => self.shift_date(false),
            KeyCode::Char(c) if !(c.is_ascii_digit() || c == '-') => {}
            _ => self.form.update(EntryField::Date, |d| {
                edit_line(&mut d.date, key);
            }),
        }
    }

    fn handle_mood_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Left => {
                self.mood_cursor = (self.mood_cursor + MOODS.len() - 1) % MOODS.len();
            }
            KeyCode::Right => {
                self.mood_cursor = (self.mood_cursor + 1) % MOODS.len();
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                if let Some(mood) = MOODS.get(self.mood_cursor).copied() {
                    self.select_mood(mood);
                }
            }
            KeyCode::Char(c) if c.is_ascii_digit() => {
                // 1-7 picks directly
                let index = c.to_digit(10).map(|d| d as usize).unwrap_or(0);
                if let Some(mood) = index.checked_sub(1).and_then(|i| MOODS.get(i)).copied() {
                    self.select_mood(mood);
                }
            }
            KeyCode::Up => self.move_focus(self.focus.prev()),
            KeyCode::Down => self.move_focus(self.focus.next()),
            _ => {}
        }
    }
}

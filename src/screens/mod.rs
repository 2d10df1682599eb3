//! Screen state and key handling. Rendering lives in `ui`.

pub mod journal;
pub mod new_entry;
pub mod signin;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Screen {
    Signin,
    NewEntry,
    Journal,
}

impl Screen {
    pub fn title(self) -> &'static str {
        match self {
            Screen::Signin => "Existing Account",
            Screen::NewEntry => "New Entry",
            Screen::Journal => "Journal",
        }
    }

    /// Route path, as the web client names it
    pub fn path(self) -> &'static str {
        match self {
            Screen::Signin => "/auth/signin",
            Screen::NewEntry => "/dashboard/new",
            Screen::Journal => "/dashboard",
        }
    }
}

/// What a screen asks the app to do after handling a key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenEvent {
    None,
    Submit,
    Navigate(Screen),
    ConfirmDelete(u64),
    ConfirmWipe,
}

/// Apply a key to a single-line text value. Returns true if the key was consumed.
pub fn edit_line(value: &mut String, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            value.clear();
            true
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            value.push(c);
            true
        }
        KeyCode::Backspace => {
            value.pop();
            true
        }
        _ => false,
    }
}

/// Like [`edit_line`], with Enter inserting a newline
pub fn edit_multiline(value: &mut String, key: KeyEvent) -> bool {
    if key.code == KeyCode::Enter {
        value.push('\n');
        return true;
    }
    edit_line(value, key)
}

#[cfg(test)]
pub(crate) fn press(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

#[cfg(test)]
pub(crate) fn ctrl(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
}

#[cfg(test)]
pub(crate) fn type_text<F: FnMut(KeyEvent)>(text: &str, mut send: F) {
    for c in text.chars() {
        send(press(KeyCode::Char(c)));
    }
}

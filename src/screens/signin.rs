use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::{edit_line, ScreenEvent};
use crate::form::{FormController, SigninSchema};
use crate::validation::{CredentialField, CredentialsDraft};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigninFocus {
    FullName,
    Password,
    Login,
}

impl SigninFocus {
    fn next(self) -> Self {
        match self {
            SigninFocus::FullName => SigninFocus::Password,
            SigninFocus::Password => SigninFocus::Login,
            SigninFocus::Login => SigninFocus::FullName,
        }
    }

    fn prev(self) -> Self {
        match self {
            SigninFocus::FullName => SigninFocus::Login,
            SigninFocus::Password => SigninFocus::FullName,
            SigninFocus::Login => SigninFocus::Password,
        }
    }

    fn field(self) -> Option<CredentialField> {
        match self {
            SigninFocus::FullName => Some(CredentialField::FullName),
            SigninFocus::Password => Some(CredentialField::Password),
            SigninFocus::Login => None,
        }
    }
}

pub struct SigninScreen {
    pub form: FormController<SigninSchema>,
    pub focus: SigninFocus,
    pub show_password: bool,
}

impl SigninScreen {
    pub fn new(last_user: Option<&str>, show_password: bool) -> Self {
        let form = match last_user {
            Some(name) => FormController::with_draft(CredentialsDraft {
                full_name: name.to_string(),
                password: String::new(),
            }),
            None => FormController::new(),
        };
        // Skip straight to the password when the name is remembered
        let focus = if last_user.is_some() { SigninFocus::Password } else { SigninFocus::FullName };
        Self { form, focus, show_password }
    }

    pub fn toggle_password(&mut self) {
        self.show_password = !self.show_password;
    }

    /// Password field shows the success marker
    pub fn password_ok(&self) -> bool {
        self.form.is_valid_field(CredentialField::Password)
    }

    fn move_focus(&mut self, to: SigninFocus) {
        if let Some(field) = self.focus.field() {
            self.form.blur(field);
        }
        self.focus = to;
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> ScreenEvent {
        match key.code {
            KeyCode::Tab | KeyCode::Down => self.move_focus(self.focus.next()),
            KeyCode::BackTab | KeyCode::Up => self.move_focus(self.focus.prev()),
            KeyCode::F(2) => return ScreenEvent::Submit,
            KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.toggle_password();
            }
            KeyCode::Enter => match self.focus {
                SigninFocus::Login => return ScreenEvent::Submit,
                _ => self.move_focus(self.focus.next()),
            },
            _ => {
                if let Some(field) = self.focus.field() {
                    self.form.update(field, |draft| {
                        let value = match field {
                            CredentialField::FullName => &mut draft.full_name,
                            CredentialField::Password => &mut draft.password,
                        };
                        edit_line(value, key);
                    });
                }
            }
        }
        ScreenEvent::None
    }
}

//! Form controller: a live draft, blur-triggered validation and a submit gate

use std::fmt;

use crate::validation::{
    self, CredentialField, Credentials, CredentialsDraft, EntryField, FieldError, FieldErrors,
    MoodEntry, MoodEntryDraft,
};

/// Validation rules for one kind of form
pub trait Schema {
    type Field: Copy + Ord + fmt::Debug;
    type Draft: Default + Clone;
    type Record;

    /// Name the field goes by in logs and exports
    fn field_name(field: Self::Field) -> &'static str;
    fn validate_field(draft: &Self::Draft, field: Self::Field) -> Option<FieldError>;
    fn validate(draft: &Self::Draft) -> Result<Self::Record, FieldErrors<Self::Field>>;
}

pub struct SigninSchema;

impl Schema for SigninSchema {
    type Field = CredentialField;
    type Draft = CredentialsDraft;
    type Record = Credentials;

    fn field_name(field: CredentialField) -> &'static str {
        field.name()
    }

    fn validate_field(draft: &CredentialsDraft, field: CredentialField) -> Option<FieldError> {
        validation::validate_credentials_field(draft, field)
    }

    fn validate(draft: &CredentialsDraft) -> Result<Credentials, FieldErrors<CredentialField>> {
        validation::validate_credentials(draft)
    }
}

pub struct NewEntrySchema;

impl Schema for NewEntrySchema {
    type Field = EntryField;
    type Draft = MoodEntryDraft;
    type Record = MoodEntry;

    fn field_name(field: EntryField) -> &'static str {
        field.name()
    }

    fn validate_field(draft: &MoodEntryDraft, field: EntryField) -> Option<FieldError> {
        validation::validate_entry_field(draft, field)
    }

    fn validate(draft: &MoodEntryDraft) -> Result<MoodEntry, FieldErrors<EntryField>> {
        validation::validate_mood_entry(draft)
    }
}

/// Result of a submit attempt
#[derive(Debug, PartialEq, Eq)]
pub enum SubmitOutcome<E> {
    /// At least one field failed; the handler was not called
    Blocked,
    /// The handler accepted the record and the form was reset
    Accepted,
    /// The handler refused the record; the draft is kept
    Rejected(E),
}

pub struct FormController<S: Schema> {
    draft: S::Draft,
    errors: FieldErrors<S::Field>,
    submitted: bool,
}

impl<S: Schema> Default for FormController<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Schema> FormController<S> {
    pub fn new() -> Self {
        Self::with_draft(S::Draft::default())
    }

    /// Start from pre-filled values (no validation runs until a blur)
    pub fn with_draft(draft: S::Draft) -> Self {
        Self {
            draft,
            errors: FieldErrors::new(),
            submitted: false,
        }
    }

    pub fn draft(&self) -> &S::Draft {
        &self.draft
    }

    /// Edit the value bound to `field`.
    ///
    /// Before the first submit attempt edits never validate. Once a submit
    /// has been tried, the edited field is re-checked straight away so stale
    /// messages disappear as the user fixes them.
    pub fn update(&mut self, field: S::Field, edit: impl FnOnce(&mut S::Draft)) {
        edit(&mut self.draft);
        if self.submitted {
            self.run_rule(field);
        }
    }

    /// The field lost focus
    pub fn blur(&mut self, field: S::Field) {
        self.run_rule(field);
    }

    pub fn error(&self, field: S::Field) -> Option<&FieldError> {
        self.errors.get(&field)
    }

    pub fn errors(&self) -> &FieldErrors<S::Field> {
        &self.errors
    }

    pub fn clear_error(&mut self, field: S::Field) {
        self.errors.remove(&field);
    }

    /// True once the field has passed its rule and shows no error
    pub fn is_valid_field(&self, field: S::Field) -> bool {
        !self.errors.contains_key(&field) && S::validate_field(&self.draft, field).is_none()
    }

    /// Validate everything and hand the record to `handler`.
    ///
    /// The form resets only after the handler returns `Ok`.
    pub fn submit<E>(
        &mut self,
        handler: impl FnOnce(&S::Record) -> Result<(), E>,
    ) -> SubmitOutcome<E> {
        self.submitted = true;
        let record = match S::validate(&self.draft) {
            Ok(record) => record,
            Err(errors) => {
                let fields: Vec<&str> = errors.keys().map(|f| S::field_name(*f)).collect();
                tracing::debug!(fields = ?fields, "submit blocked");
                self.errors = errors;
                return SubmitOutcome::Blocked;
            }
        };
        self.errors.clear();

        match handler(&record) {
            Ok(()) => {
                self.reset();
                SubmitOutcome::Accepted
            }
            Err(e) => SubmitOutcome::Rejected(e),
        }
    }

    pub fn reset(&mut self) {
        self.draft = S::Draft::default();
        self.errors.clear();
        self.submitted = false;
    }

    fn run_rule(&mut self, field: S::Field) {
        match S::validate_field(&self.draft, field) {
            Some(err) => {
                self.errors.insert(field, err);
            }
            None => {
                self.errors.remove(&field);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mood::MoodSmiley;

    fn filled_entry_form() -> FormController<NewEntrySchema> {
        let mut form = FormController::<NewEntrySchema>::new();
        form.update(EntryField::Title, |d| d.title = "Long day".to_string());
        form.update(EntryField::Content, |d| d.content = "Too many meetings".to_string());
        form.update(EntryField::Date, |d| d.date = "2024-05-01".to_string());
        form
    }

    #[test]
    fn test_edits_do_not_validate_before_blur() {
        let mut form = FormController::<SigninSchema>::new();
        form.update(CredentialField::FullName, |d| d.full_name = "Jo".to_string());
        assert!(form.errors().is_empty());

        form.blur(CredentialField::FullName);
        assert_eq!(form.error(CredentialField::FullName), Some(&FieldError::NameTooShort));
    }

    #[test]
    fn test_blur_only_checks_that_field() {
        let mut form = FormController::<SigninSchema>::new();
        form.blur(CredentialField::Password);
        assert!(form.error(CredentialField::FullName).is_none());
        assert_eq!(form.error(CredentialField::Password), Some(&FieldError::PasswordRequired));
    }

    #[test]
    fn test_blur_clears_fixed_error() {
        let mut form = FormController::<SigninSchema>::new();
        form.blur(CredentialField::FullName);
        assert!(form.error(CredentialField::FullName).is_some());

        form.update(CredentialField::FullName, |d| d.full_name = "Grace".to_string());
        form.blur(CredentialField::FullName);
        assert!(form.error(CredentialField::FullName).is_none());
    }

    #[test]
    fn test_submit_without_mood_is_blocked_then_proceeds() {
        let mut form = filled_entry_form();
        let mut received = None;

        let outcome = form.submit(|entry: &MoodEntry| {
            received = Some(entry.clone());
            Ok::<(), ()>(())
        });
        assert_eq!(outcome, SubmitOutcome::Blocked);
        assert!(received.is_none());
        assert_eq!(
            form.error(EntryField::Mood).map(|e| e.to_string()).as_deref(),
            Some("Mood is required")
        );

        form.update(EntryField::Mood, |d| d.mood = Some(MoodSmiley::Sad));
        assert!(form.error(EntryField::Mood).is_none(), "re-validated after submit");

        let outcome = form.submit(|entry: &MoodEntry| {
            received = Some(entry.clone());
            Ok::<(), ()>(())
        });
        assert_eq!(outcome, SubmitOutcome::Accepted);
        let entry = received.unwrap();
        assert_eq!(entry.mood, MoodSmiley::Sad);
        assert_eq!(entry.title, "Long day");
        assert_eq!(form.draft(), &MoodEntryDraft::default(), "reset after acceptance");
        assert!(!form.submitted);
    }

    #[test]
    fn test_rejected_submit_keeps_draft() {
        let mut form = filled_entry_form();
        form.update(EntryField::Mood, |d| d.mood = Some(MoodSmiley::Happy));
        let before = form.draft().clone();

        let outcome = form.submit(|_| Err("disk full"));
        assert_eq!(outcome, SubmitOutcome::Rejected("disk full"));
        assert_eq!(form.draft(), &before);
    }

    #[test]
    fn test_field_names_match_record_keys() {
        assert_eq!(SigninSchema::field_name(CredentialField::FullName), "fullName");
        assert_eq!(NewEntrySchema::field_name(EntryField::Mood), "moodSmiley");
        let names: Vec<&str> = EntryField::ALL.iter().map(|f| NewEntrySchema::field_name(*f)).collect();
        assert_eq!(names, vec!["date", "moodSmiley", "title", "content"]);
    }

    #[test]
    fn test_is_valid_field_requires_a_passing_value() {
        let mut form = FormController::<SigninSchema>::new();
        assert!(!form.is_valid_field(CredentialField::Password));
        form.update(CredentialField::Password, |d| d.password = "Abc123!@".to_string());
        assert!(form.is_valid_field(CredentialField::Password));
    }
}

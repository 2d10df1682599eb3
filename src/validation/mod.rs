//! Field rules for the sign-in and new-entry forms
//!
//! Every rule is a pure function over a draft record. A rule either passes or
//! yields a [`FieldError`] whose `Display` is the message shown under the field.
//! Rules never look at other fields.

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;
use thiserror::Error;

use crate::mood::MoodSmiley;

pub const NAME_MIN_CHARS: usize = 3;
pub const TITLE_MIN_CHARS: usize = 3;
pub const TITLE_MAX_CHARS: usize = 100;
pub const DATE_INPUT_FORMAT: &str = "%Y-%m-%d";

/// Symbols accepted (and one of which is required) in a password
pub const PASSWORD_SYMBOLS: &str = "@$!%?&";

/// A failed field rule
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("Enter your name")]
    NameRequired,
    #[error("Should contain minimum of 3 characters")]
    NameTooShort,
    #[error("Enter your password")]
    PasswordRequired,
    #[error("Password should contain 8 or more characters, at least a symbol, number, uppercase & lower case letters")]
    PasswordTooWeak,
    #[error("A title is required")]
    TitleRequired,
    #[error("Should contain minimum of 3 characters")]
    TitleTooShort,
    #[error("Should contain maximum of 100 characters")]
    TitleTooLong,
    #[error("Content can't be blank")]
    ContentRequired,
    #[error("Date is required")]
    DateRequired,
    #[error("Enter a valid date (YYYY-MM-DD)")]
    DateInvalid,
    #[error("Mood is required")]
    MoodRequired,
}

/// Per-field failures of one validation pass, ordered by field
pub type FieldErrors<F> = BTreeMap<F, FieldError>;

// ---------------------------------------------------------------------------
// Sign-in
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CredentialField {
    FullName,
    Password,
}

impl CredentialField {
    pub const ALL: [CredentialField; 2] = [CredentialField::FullName, CredentialField::Password];

    /// Wire name of the field
    pub fn name(self) -> &'static str {
        match self {
            CredentialField::FullName => "fullName",
            CredentialField::Password => "password",
        }
    }
}

/// Sign-in form values as typed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialsDraft {
    pub full_name: String,
    pub password: String,
}

/// Sign-in values that passed every rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub full_name: String,
    pub password: String,
}

pub fn validate_full_name(value: &str) -> Result<(), FieldError> {
    if value.is_empty() {
        return Err(FieldError::NameRequired);
    }
    if value.chars().count() < NAME_MIN_CHARS {
        return Err(FieldError::NameTooShort);
    }
    Ok(())
}

struct PasswordRules {
    charset: Regex,
    lower: Regex,
    upper: Regex,
    digit: Regex,
    symbol: Regex,
}

fn password_rules() -> &'static PasswordRules {
    static RULES: OnceLock<PasswordRules> = OnceLock::new();
    // The regex crate has no look-ahead, so each required class is its own
    // pattern. `\d` is spelled [0-9] to keep it ASCII-only.
    RULES.get_or_init(|| PasswordRules {
        charset: Regex::new(r"^[A-Za-z0-9@$!%?&]{8,}$").expect("static pattern"),
        lower: Regex::new(r"[a-z]").expect("static pattern"),
        upper: Regex::new(r"[A-Z]").expect("static pattern"),
        digit: Regex::new(r"[0-9]").expect("static pattern"),
        symbol: Regex::new(r"[@$!%?&]").expect("static pattern"),
    })
}

/// Whether `value` satisfies the password complexity rule
pub fn password_is_strong(value: &str) -> bool {
    let rules = password_rules();
    rules.charset.is_match(value)
        && rules.lower.is_match(value)
        && rules.upper.is_match(value)
        && rules.digit.is_match(value)
        && rules.symbol.is_match(value)
}

pub fn validate_password(value: &str) -> Result<(), FieldError> {
    if value.is_empty() {
        return Err(FieldError::PasswordRequired);
    }
    if !password_is_strong(value) {
        return Err(FieldError::PasswordTooWeak);
    }
    Ok(())
}

pub fn validate_credentials_field(
    draft: &CredentialsDraft,
    field: CredentialField,
) -> Option<FieldError> {
    let result = match field {
        CredentialField::FullName => validate_full_name(&draft.full_name),
        CredentialField::Password => validate_password(&draft.password),
    };
    result.err()
}

pub fn validate_credentials(
    draft: &CredentialsDraft,
) -> Result<Credentials, FieldErrors<CredentialField>> {
    let errors = collect_errors(&CredentialField::ALL, |f| {
        validate_credentials_field(draft, f)
    });
    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(Credentials {
        full_name: draft.full_name.clone(),
        password: draft.password.clone(),
    })
}

// ---------------------------------------------------------------------------
// New entry
// ---------------------------------------------------------------------------

/// New-entry fields in on-screen order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntryField {
    Date,
    Mood,
    Title,
    Content,
}

impl EntryField {
    pub const ALL: [EntryField; 4] = [
        EntryField::Date,
        EntryField::Mood,
        EntryField::Title,
        EntryField::Content,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EntryField::Date => "date",
            EntryField::Mood => "moodSmiley",
            EntryField::Title => "title",
            EntryField::Content => "content",
        }
    }
}

/// New-entry form values as typed. `date` is the raw text of the date input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoodEntryDraft {
    pub title: String,
    pub content: String,
    pub date: String,
    pub mood: Option<MoodSmiley>,
}

/// A journal entry that passed every rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodEntry {
    pub title: String,
    pub content: String,
    pub date: NaiveDate,
    #[serde(rename = "moodSmiley")]
    pub mood: MoodSmiley,
}

pub fn validate_title(value: &str) -> Result<(), FieldError> {
    if value.is_empty() {
        return Err(FieldError::TitleRequired);
    }
    let len = value.chars().count();
    if len < TITLE_MIN_CHARS {
        return Err(FieldError::TitleTooShort);
    }
    if len > TITLE_MAX_CHARS {
        return Err(FieldError::TitleTooLong);
    }
    Ok(())
}

pub fn validate_content(value: &str) -> Result<(), FieldError> {
    if value.is_empty() {
        return Err(FieldError::ContentRequired);
    }
    Ok(())
}

pub fn parse_date(value: &str) -> Result<NaiveDate, FieldError> {
    if value.is_empty() {
        return Err(FieldError::DateRequired);
    }
    NaiveDate::parse_from_str(value.trim(), DATE_INPUT_FORMAT).map_err(|_| FieldError::DateInvalid)
}

pub fn validate_mood(value: Option<MoodSmiley>) -> Result<MoodSmiley, FieldError> {
    value.ok_or(FieldError::MoodRequired)
}

pub fn validate_entry_field(draft: &MoodEntryDraft, field: EntryField) -> Option<FieldError> {
    let result = match field {
        EntryField::Date => parse_date(&draft.date).map(|_| ()),
        EntryField::Mood => validate_mood(draft.mood).map(|_| ()),
        EntryField::Title => validate_title(&draft.title),
        EntryField::Content => validate_content(&draft.content),
    };
    result.err()
}

pub fn validate_mood_entry(draft: &MoodEntryDraft) -> Result<MoodEntry, FieldErrors<EntryField>> {
    let errors = collect_errors(&EntryField::ALL, |f| validate_entry_field(draft, f));
    match (errors.is_empty(), parse_date(&draft.date), draft.mood) {
        (true, Ok(date), Some(mood)) => Ok(MoodEntry {
            title: draft.title.clone(),
            content: draft.content.clone(),
            date,
            mood,
        }),
        _ => Err(errors),
    }
}

fn collect_errors<F: Copy + Ord>(
    fields: &[F],
    mut rule: impl FnMut(F) -> Option<FieldError>,
) -> FieldErrors<F> {
    fields
        .iter()
        .filter_map(|&field| rule(field).map(|err| (field, err)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_draft() -> MoodEntryDraft {
        MoodEntryDraft {
            title: "A quiet Sunday".to_string(),
            content: "Walked by the river.".to_string(),
            date: "2024-03-10".to_string(),
            mood: Some(MoodSmiley::Neutral),
        }
    }

    #[test]
    fn test_password_examples() {
        assert_eq!(validate_password("Abc123!@"), Ok(()));
        assert_eq!(validate_password("abc123!@"), Err(FieldError::PasswordTooWeak));
        assert_eq!(validate_password(""), Err(FieldError::PasswordRequired));
    }

    #[test]
    fn test_password_requires_each_class() {
        assert!(!password_is_strong("ABC123!@"), "missing lowercase");
        assert!(!password_is_strong("Abcdef!@"), "missing digit");
        assert!(!password_is_strong("Abc12345"), "missing symbol");
        assert!(!password_is_strong("Ab1!"), "too short");
        assert!(!password_is_strong("Ab1!xyz"), "seven chars");
        assert!(password_is_strong("Ab1!xyzw"));
    }

    #[test]
    fn test_password_rejects_characters_outside_the_set() {
        assert!(!password_is_strong("Abc123!@#"));
        assert!(!password_is_strong("Abc 123!@"));
        assert!(!password_is_strong("Abc١٢٣!@x"), "non-ascii digits");
    }

    #[test]
    fn test_password_accepts_every_listed_symbol() {
        for symbol in PASSWORD_SYMBOLS.chars() {
            let candidate = format!("Abcdef1{}", symbol);
            assert!(password_is_strong(&candidate), "{candidate}");
        }
    }

    #[test]
    fn test_password_message_mentions_character_classes() {
        let message = FieldError::PasswordTooWeak.to_string();
        assert!(message.contains("uppercase"));
        assert!(message.contains("symbol"));
    }

    #[test]
    fn test_full_name_minimum() {
        assert_eq!(validate_full_name(""), Err(FieldError::NameRequired));
        assert_eq!(validate_full_name("Jo"), Err(FieldError::NameTooShort));
        assert_eq!(validate_full_name("Joe"), Ok(()));
        assert_eq!(validate_full_name("Zoë"), Ok(()));
    }

    #[test]
    fn test_title_bounds() {
        assert_eq!(validate_title(&"a".repeat(2)), Err(FieldError::TitleTooShort));
        assert_eq!(validate_title(&"a".repeat(3)), Ok(()));
        assert_eq!(validate_title(&"a".repeat(50)), Ok(()));
        assert_eq!(validate_title(&"a".repeat(100)), Ok(()));
        assert_eq!(validate_title(&"a".repeat(101)), Err(FieldError::TitleTooLong));
        assert_eq!(
            FieldError::TitleTooLong.to_string(),
            "Should contain maximum of 100 characters"
        );
    }

    #[test]
    fn test_title_counts_characters_not_bytes() {
        assert_eq!(validate_title("été"), Ok(()));
        assert_eq!(validate_title(&"é".repeat(100)), Ok(()));
    }

    #[test]
    fn test_content_only_needs_to_be_non_empty() {
        assert_eq!(validate_content(""), Err(FieldError::ContentRequired));
        assert_eq!(validate_content(" "), Ok(()));
        assert_eq!(validate_content("x"), Ok(()));
    }

    #[test]
    fn test_date_parsing() {
        assert_eq!(parse_date(""), Err(FieldError::DateRequired));
        assert_eq!(parse_date("yesterday"), Err(FieldError::DateInvalid));
        assert_eq!(parse_date("2024-02-30"), Err(FieldError::DateInvalid));
        assert_eq!(
            parse_date("2024-02-29"),
            Ok(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap())
        );
    }

    #[test]
    fn test_validate_credentials_collects_every_failure() {
        let errors = validate_credentials(&CredentialsDraft::default()).unwrap_err();
        assert_eq!(errors.get(&CredentialField::FullName), Some(&FieldError::NameRequired));
        assert_eq!(errors.get(&CredentialField::Password), Some(&FieldError::PasswordRequired));
    }

    #[test]
    fn test_validate_credentials_returns_the_record_unchanged() {
        let draft = CredentialsDraft {
            full_name: "Ada Lovelace".to_string(),
            password: "Abc123!@".to_string(),
        };
        let creds = validate_credentials(&draft).unwrap();
        assert_eq!(creds.full_name, draft.full_name);
        assert_eq!(creds.password, draft.password);
    }

    #[test]
    fn test_validate_mood_entry_requires_mood() {
        let draft = MoodEntryDraft { mood: None, ..entry_draft() };
        let errors = validate_mood_entry(&draft).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[&EntryField::Mood].to_string(), "Mood is required");
    }

    #[test]
    fn test_validate_mood_entry_builds_record() {
        let entry = validate_mood_entry(&entry_draft()).unwrap();
        assert_eq!(entry.date, NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
        assert_eq!(entry.mood, MoodSmiley::Neutral);
        assert_eq!(entry.title, "A quiet Sunday");
    }

    #[test]
    fn test_entry_serializes_with_wire_names() {
        let entry = validate_mood_entry(&entry_draft()).unwrap();
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["moodSmiley"], "Neutral");
        assert_eq!(value["date"], "2024-03-10");
    }
}

//! Strict schema validation of the raw config document
//!
//! Validation runs on the untyped TOML tree before anything is decoded, so a
//! wrong type is reported with the field path instead of surfacing as an
//! opaque deserialization failure. Every section is checked and every
//! violation is collected; a user fixing a file sees all problems at once.

use crate::aliases::{self, FieldLocation};
use crate::coerce::{coerce_bool, coerce_int, describe};
use crate::error::{ValidationError, ValidationErrors};
use crate::theme_config::ThemeMode;
use crate::units;
use crate::update_config::UpdateChannel;
use crate::SUPPORTED_VERSIONS;
use toml::{Table, Value};

/// Declared type of a single field
#[derive(Debug, Clone, Copy)]
enum FieldKind {
    Text,
    NonEmptyText,
    Bool,
    PositiveInt,
    NonNegativeInt,
    Size,
    Duration,
    /// Empty string or an RFC 3339 timestamp
    Timestamp,
    OneOf(&'static [&'static str]),
    /// Like `OneOf`, but an empty string means "use the default"
    OneOfOrEmpty(&'static [&'static str]),
}

struct FieldRule {
    key: &'static str,
    kind: FieldKind,
    required: bool,
}

struct SectionRule {
    name: &'static str,
    required: bool,
    fields: &'static [FieldRule],
}

const fn optional(key: &'static str, kind: FieldKind) -> FieldRule {
    FieldRule {
        key,
        kind,
        required: false,
    }
}

const fn required(key: &'static str, kind: FieldKind) -> FieldRule {
    FieldRule {
        key,
        kind,
        required: true,
    }
}

const SECTIONS: &[SectionRule] = &[
    SectionRule {
        name: "general",
        required: true,
        fields: &[optional("default_editor", FieldKind::Text)],
    },
    SectionRule {
        name: "logging",
        required: true,
        fields: &[
            required("log_path", FieldKind::NonEmptyText),
            required("max_log_size", FieldKind::Size),
            required("max_log_files", FieldKind::PositiveInt),
        ],
    },
    SectionRule {
        name: "network",
        required: false,
        fields: &[
            optional("request_timeout", FieldKind::Duration),
            optional("download_timeout", FieldKind::Duration),
        ],
    },
    SectionRule {
        name: "limits",
        required: false,
        fields: &[
            optional("max_source_file_size", FieldKind::Size),
            optional("file_copy_buffer_size", FieldKind::Size),
        ],
    },
    SectionRule {
        name: "search",
        required: false,
        fields: &[
            optional("result_limit", FieldKind::NonNegativeInt),
            optional("enable_popularity_sort", FieldKind::Bool),
        ],
    },
    SectionRule {
        name: "update",
        required: false,
        fields: &[
            optional("auto_check", FieldKind::Bool),
            optional("auto_update", FieldKind::Bool),
            optional("check_interval_hours", FieldKind::PositiveInt),
            optional("last_update_check", FieldKind::Timestamp),
            optional("channel", FieldKind::OneOf(UpdateChannel::ALLOWED)),
        ],
    },
];

const THEME_FIELDS: &[FieldRule] = &[
    optional("name", FieldKind::Text),
    optional("mode", FieldKind::OneOfOrEmpty(ThemeMode::ALLOWED)),
];

/// Checks a raw document against the current schema and returns every violation
pub fn validate_document(doc: &Table) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    validate_version(doc, &mut errors);

    for section in SECTIONS {
        validate_section(doc, section, &mut errors);
    }

    validate_theme(doc, &mut errors);

    if !errors.is_empty() {
        log::debug!("Config document has {} validation error(s)", errors.len());
    }
    errors
}

fn validate_version(doc: &Table, errors: &mut ValidationErrors) {
    let Some((path, value)) = aliases::lookup(doc, (None, "config_version")) else {
        return;
    };

    match value {
        Value::String(version) if version.is_empty() => {}
        Value::String(version) if SUPPORTED_VERSIONS.contains(&version.as_str()) => {}
        Value::String(version) => errors.push(ValidationError::with_value(
            path,
            format!(
                "unknown config version (supported: {})",
                SUPPORTED_VERSIONS.join(", ")
            ),
            format!("'{}'", version),
        )),
        other => errors.push(ValidationError::with_value(
            path,
            "must be a string",
            describe(other),
        )),
    }
}

fn validate_section(doc: &Table, section: &SectionRule, errors: &mut ValidationErrors) {
    let present = match doc.get(section.name) {
        Some(Value::Table(_)) => true,
        Some(other) => {
            errors.push(ValidationError::with_value(
                section.name,
                "must be a table",
                describe(other),
            ));
            return;
        }
        None if section.required => {
            errors.push(ValidationError::new(section.name, "section is required"));
            return;
        }
        None => false,
    };

    // Fields of an absent optional section may still live at a legacy location.
    for field in section.fields {
        let location: FieldLocation = (Some(section.name), field.key);
        match aliases::lookup(doc, location) {
            Some((path, value)) => {
                if let Some(error) = check_field(&path, value, field.kind) {
                    errors.push(error);
                }
            }
            None if field.required && present => {
                errors.push(ValidationError::new(
                    aliases::display_path(location),
                    "field is required",
                ));
            }
            None => {}
        }
    }
}

fn validate_theme(doc: &Table, errors: &mut ValidationErrors) {
    match doc.get("theme") {
        None | Some(Value::String(_)) => {}
        Some(Value::Table(table)) => {
            for field in THEME_FIELDS {
                if let Some(value) = table.get(field.key) {
                    let path = format!("theme.{}", field.key);
                    if let Some(error) = check_field(&path, value, field.kind) {
                        errors.push(error);
                    }
                }
            }
        }
        Some(other) => errors.push(ValidationError::with_value(
            "theme",
            "must be a theme name or a table",
            describe(other),
        )),
    }
}

fn check_field(path: &str, value: &Value, kind: FieldKind) -> Option<ValidationError> {
    match kind {
        FieldKind::Text => expect_str(path, value).err(),
        FieldKind::NonEmptyText => match expect_str(path, value) {
            Ok(s) if s.trim().is_empty() => Some(ValidationError::new(path, "cannot be empty")),
            Ok(_) => None,
            Err(error) => Some(error),
        },
        FieldKind::Bool => match coerce_bool(value) {
            Some(_) => None,
            None => Some(ValidationError::with_value(
                path,
                "must be a boolean",
                describe(value),
            )),
        },
        FieldKind::PositiveInt => check_int(path, value, 1),
        FieldKind::NonNegativeInt => check_int(path, value, 0),
        FieldKind::Size => match expect_str(path, value) {
            Ok(s) if units::parse_size(s).is_some() => None,
            Ok(_) => Some(ValidationError::with_value(
                path,
                "must be a size such as '10MB'",
                describe(value),
            )),
            Err(error) => Some(error),
        },
        FieldKind::Duration => match expect_str(path, value) {
            Ok(s) if units::parse_duration(s).is_some() => None,
            Ok(_) => Some(ValidationError::with_value(
                path,
                "must be a duration such as '10s' or '1m30s'",
                describe(value),
            )),
            Err(error) => Some(error),
        },
        FieldKind::Timestamp => match expect_str(path, value) {
            Ok(s) if s.is_empty() || chrono::DateTime::parse_from_rfc3339(s).is_ok() => None,
            Ok(_) => Some(ValidationError::with_value(
                path,
                "must be empty or an RFC 3339 timestamp",
                describe(value),
            )),
            Err(error) => Some(error),
        },
        FieldKind::OneOf(allowed) => check_one_of(path, value, allowed, false),
        FieldKind::OneOfOrEmpty(allowed) => check_one_of(path, value, allowed, true),
    }
}

fn expect_str<'a>(path: &str, value: &'a Value) -> Result<&'a str, ValidationError> {
    value
        .as_str()
        .ok_or_else(|| ValidationError::with_value(path, "must be a string", describe(value)))
}

fn check_int(path: &str, value: &Value, min: i64) -> Option<ValidationError> {
    let Some(number) = coerce_int(value) else {
        return Some(ValidationError::with_value(
            path,
            "must be an integer",
            describe(value),
        ));
    };

    if number < min {
        let message = if min > 0 {
            "must be greater than 0"
        } else {
            "must not be negative"
        };
        Some(ValidationError::with_value(path, message, number))
    } else if number > i64::from(u32::MAX) {
        Some(ValidationError::with_value(
            path,
            format!("must be at most {}", u32::MAX),
            number,
        ))
    } else {
        None
    }
}

fn check_one_of(
    path: &str,
    value: &Value,
    allowed: &[&str],
    allow_empty: bool,
) -> Option<ValidationError> {
    match expect_str(path, value) {
        Ok(s) if allowed.contains(&s) || (allow_empty && s.is_empty()) => None,
        Ok(_) => Some(ValidationError::with_value(
            path,
            format!("must be one of: {}", allowed.join(", ")),
            describe(value),
        )),
        Err(error) => Some(error),
    }
}

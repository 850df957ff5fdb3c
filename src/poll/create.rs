use super::image::{UploadedImage, ValidImage};
use super::{find_poll_by_code, generate_code, random_string, PollError};
use crate::constants::{IMAGE_NAME_LENGTH, MIN_POLL_OPTIONS, POLL_CODE_ATTEMPTS};
use crate::orm::{poll_options, polls};
use crate::storage::StorageBackend;
use chrono::{NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::{entity::*, DatabaseConnection, DatabaseTransaction, TransactionTrait};
use std::collections::BTreeMap;
use validator::{Validate, ValidationErrors};

/// Validation messages keyed by form field, e.g. `options.0.image`.
pub type FieldErrors = BTreeMap<String, String>;

/// Date-time formats accepted for the poll window. Browsers send the first.
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

static OPTION_FIELD_BRACKETS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^options\[(\d+)\]\[(\w+)\]$").expect("valid regex"));
static OPTION_FIELD_DOTS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^options\.(\d+)\.(\w+)$").expect("valid regex"));

/// Raw poll submission as read from the creation form.
///
/// Text fields are trimmed on the way in and empty values are stored as `None`.
#[derive(Debug, Default, Validate)]
pub struct PollForm {
    #[validate(
        required(message = "The name field is required."),
        length(max = 50, message = "The name may not be greater than 50 characters.")
    )]
    pub name: Option<String>,
    #[validate(required(message = "The starts at field is required."))]
    pub starts_at: Option<String>,
    #[validate(required(message = "The ends at field is required."))]
    pub ends_at: Option<String>,
    /// Options keyed by the index the client submitted them under.
    pub options: BTreeMap<usize, OptionForm>,
}

#[derive(Debug, Default, Validate)]
pub struct OptionForm {
    #[validate(required(message = "The option name field is required."))]
    pub name: Option<String>,
    #[validate(required(message = "The option description field is required."))]
    pub description: Option<String>,
    pub image: Option<UploadedImage>,
}

/// A poll that passed validation and is ready to persist.
#[derive(Debug)]
pub struct NewPoll {
    pub name: String,
    pub starts_at: NaiveDateTime,
    pub ends_at: NaiveDateTime,
    pub options: Vec<NewOption>,
}

#[derive(Debug)]
pub struct NewOption {
    pub name: String,
    pub description: String,
    pub image: ValidImage,
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_owned())
    }
}

/// Splits `options[2][name]` or `options.2.name` into `(2, "name")`.
pub fn parse_option_field(field: &str) -> Option<(usize, &str)> {
    let caps = OPTION_FIELD_BRACKETS
        .captures(field)
        .or_else(|| OPTION_FIELD_DOTS.captures(field))?;
    let index = caps.get(1)?.as_str().parse().ok()?;
    Some((index, caps.get(2)?.as_str()))
}

pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

fn collect_errors(errors: &mut FieldErrors, prefix: &str, result: Result<(), ValidationErrors>) {
    let Err(validation) = result else {
        return;
    };
    for (field, field_errors) in validation.field_errors() {
        if let Some(first) = field_errors.first() {
            let message = first
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("The {} field is invalid.", field.replace('_', " ")));
            errors
                .entry(format!("{}{}", prefix, field))
                .or_insert(message);
        }
    }
}

impl PollForm {
    /// Records a text field. Returns false for names the form does not know.
    pub fn set_text(&mut self, field: &str, value: &str) -> bool {
        match field {
            "name" => self.name = non_empty(value),
            "starts_at" => self.starts_at = non_empty(value),
            "ends_at" => self.ends_at = non_empty(value),
            _ => match parse_option_field(field) {
                Some((index, "name")) => self.option_mut(index).name = non_empty(value),
                Some((index, "description")) => {
                    self.option_mut(index).description = non_empty(value)
                }
                _ => return false,
            },
        }
        true
    }

    /// Records a file field. Only `options[i][image]` carries files.
    pub fn set_image(&mut self, field: &str, image: UploadedImage) -> bool {
        match parse_option_field(field) {
            Some((index, "image")) => {
                self.option_mut(index).image = Some(image);
                true
            }
            _ => false,
        }
    }

    /// True when `field` names an option image, so the caller should read it as a file.
    pub fn is_image_field(field: &str) -> bool {
        matches!(parse_option_field(field), Some((_, "image")))
    }

    fn option_mut(&mut self, index: usize) -> &mut OptionForm {
        self.options.entry(index).or_default()
    }

    /// Validates every field and converts the form into a [`NewPoll`].
    ///
    /// All problems are reported at once, keyed by field name.
    pub fn into_new_poll(self, max_options: usize, max_image_kb: u32) -> Result<NewPoll, FieldErrors> {
        let mut errors = FieldErrors::new();
        collect_errors(&mut errors, "", self.validate());

        let starts_at = self.starts_at.as_deref().and_then(|value| {
            let parsed = parse_datetime(value);
            if parsed.is_none() {
                errors.insert(
                    "starts_at".to_owned(),
                    "The starts at is not a valid date.".to_owned(),
                );
            }
            parsed
        });
        let ends_at = self.ends_at.as_deref().and_then(|value| {
            let parsed = parse_datetime(value);
            if parsed.is_none() {
                errors.insert(
                    "ends_at".to_owned(),
                    "The ends at is not a valid date.".to_owned(),
                );
            }
            parsed
        });
        if let (Some(starts_at), Some(ends_at)) = (starts_at, ends_at) {
            if ends_at <= starts_at {
                errors.insert(
                    "ends_at".to_owned(),
                    "The ends at must be a date after starts at.".to_owned(),
                );
            }
        }

        if self.options.len() < MIN_POLL_OPTIONS {
            errors.insert(
                "options".to_owned(),
                "The options field is required.".to_owned(),
            );
        } else if self.options.len() > max_options {
            errors.insert(
                "options".to_owned(),
                format!("The options may not have more than {} items.", max_options),
            );
        }

        let mut options = Vec::with_capacity(self.options.len());
        for (index, option) in self.options {
            let prefix = format!("options.{}.", index);
            collect_errors(&mut errors, &prefix, option.validate());

            let image = match option.image {
                Some(upload) => match upload.validate(max_image_kb) {
                    Ok(image) => Some(image),
                    Err(rejection) => {
                        errors.insert(format!("{}image", prefix), rejection.to_string());
                        None
                    }
                },
                None => {
                    errors.insert(
                        format!("{}image", prefix),
                        "The image field is required.".to_owned(),
                    );
                    None
                }
            };

            if let (Some(name), Some(description), Some(image)) =
                (option.name, option.description, image)
            {
                options.push(NewOption {
                    name,
                    description,
                    image,
                });
            }
        }

        match (self.name, starts_at, ends_at) {
            (Some(name), Some(starts_at), Some(ends_at)) if errors.is_empty() => Ok(NewPoll {
                name,
                starts_at,
                ends_at,
                options,
            }),
            _ => Err(errors),
        }
    }
}

/// Persists a poll and all of its options in one transaction.
///
/// Images are written to `storage` as each option is inserted. If anything fails
/// the transaction is rolled back and the files written so far are removed.
pub async fn create_poll(
    db: &DatabaseConnection,
    storage: &dyn StorageBackend,
    creator_id: i32,
    poll: NewPoll,
) -> Result<polls::Model, PollError> {
    let txn = db.begin().await?;
    let mut stored = Vec::new();

    match insert_poll(&txn, storage, creator_id, poll, &mut stored).await {
        Ok(model) => match txn.commit().await {
            Ok(()) => {
                log::info!(
                    "poll {} created by user {} with {} options",
                    model.code,
                    creator_id,
                    stored.len()
                );
                Ok(model)
            }
            Err(e) => {
                remove_stored(storage, &stored).await;
                Err(e.into())
            }
        },
        Err(e) => {
            if let Err(rollback) = txn.rollback().await {
                log::error!("create_poll: rollback failed: {}", rollback);
            }
            remove_stored(storage, &stored).await;
            Err(e)
        }
    }
}

async fn insert_poll(
    txn: &DatabaseTransaction,
    storage: &dyn StorageBackend,
    creator_id: i32,
    poll: NewPoll,
    stored: &mut Vec<String>,
) -> Result<polls::Model, PollError> {
    let code = unused_code(txn).await?;
    let now = Utc::now().naive_utc();

    let model = polls::ActiveModel {
        code: Set(code),
        name: Set(poll.name),
        created_by: Set(Some(creator_id)),
        status: Set(polls::Status::Active),
        starts_at: Set(poll.starts_at),
        ends_at: Set(poll.ends_at),
        total_votes: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(txn)
    .await?;

    for option in poll.options {
        let filename = format!(
            "{}.{}",
            random_string(IMAGE_NAME_LENGTH),
            option.image.kind.extension()
        );
        storage.put_object(option.image.data, &filename).await?;
        stored.push(filename.clone());

        poll_options::ActiveModel {
            poll_id: Set(model.id),
            name: Set(option.name),
            description: Set(option.description),
            image: Set(filename),
            ..Default::default()
        }
        .insert(txn)
        .await?;
    }

    Ok(model)
}

async fn unused_code(txn: &DatabaseTransaction) -> Result<String, PollError> {
    for _ in 0..POLL_CODE_ATTEMPTS {
        let code = generate_code();
        if find_poll_by_code(txn, &code).await?.is_none() {
            return Ok(code);
        }
        log::debug!("poll code {} already taken, drawing again", code);
    }
    Err(PollError::CodeExhausted)
}

async fn remove_stored(storage: &dyn StorageBackend, stored: &[String]) {
    for filename in stored {
        if let Err(e) = storage.delete_object(filename).await {
            log::warn!("unable to remove orphaned image {}: {}", filename, e);
        }
    }
}

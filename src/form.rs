//! Authoring and credential forms, validated before anything is sent.
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::model::{parse_day, Batch, Language, Mode};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("Invalid field: {0}")]
    Invalid(&'static str),
}

/// Editable state of the create/edit batch form.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchDraft {
    pub title: String,
    pub description: String,
    pub duration: String,
    pub price: f64,
    pub image: String,
    pub start_date: String,
    pub max_students: u32,
    pub mode: Mode,
    pub language: Language,
}

impl Default for BatchDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            duration: String::new(),
            price: 0.0,
            image: String::new(),
            start_date: String::new(),
            max_students: 50,
            mode: Mode::Online,
            language: Language::English,
        }
    }
}

/// Body of `POST /batches` and `PUT /batches/{id}`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BatchPayload {
    pub batch_name: String,
    pub description: String,
    pub duration: String,
    pub price: f64,
    pub start_date: String,
    pub total_slots: u32,
    pub mode: Mode,
    pub language: Language,
    pub thumbnail: String,
}

impl BatchDraft {
    /// Prefill the edit form from the local copy of a batch.
    pub fn from_batch(batch: &Batch) -> Self {
        let start_date = batch
            .start_day()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| batch.start_date.clone());
        Self {
            title: batch.name.clone(),
            description: batch.description.clone(),
            duration: batch.duration.clone(),
            price: batch.price,
            image: batch.thumbnail_url.clone(),
            start_date,
            max_students: batch.total_slots,
            mode: batch.mode,
            language: batch.language,
        }
    }

    pub fn validate(&self) -> Result<BatchPayload, FormError> {
        let title = required(&self.title, "title")?;
        let description = required(&self.description, "description")?;
        let duration = required(&self.duration, "duration")?;
        let start_date = required(&self.start_date, "start date")?;
        let image = required(&self.image, "image URL")?;

        if !self.price.is_finite() || self.price < 0.0 {
            return Err(FormError::Invalid("price must be a non-negative number"));
        }
        if self.max_students == 0 {
            return Err(FormError::Invalid("total slots must be at least 1"));
        }
        if start_date.len() != 10 || parse_day(start_date).is_none() {
            return Err(FormError::Invalid("start date must be YYYY-MM-DD"));
        }

        Ok(BatchPayload {
            batch_name: title.to_string(),
            description: description.to_string(),
            duration: duration.to_string(),
            price: self.price,
            start_date: start_date.to_string(),
            total_slots: self.max_students,
            mode: self.mode,
            language: self.language,
            thumbnail: image.to_string(),
        })
    }
}

fn required<'a>(value: &'a str, name: &'static str) -> Result<&'a str, FormError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FormError::Missing(name));
    }
    Ok(trimmed)
}

pub fn validate_login(email: &str, password: &str) -> Result<(), FormError> {
    validate_email(email)?;
    if password.is_empty() {
        return Err(FormError::Missing("password"));
    }
    Ok(())
}

pub fn validate_signup(name: &str, email: &str, password: &str) -> Result<(), FormError> {
    required(name, "name")?;
    validate_login(email, password)
}

fn validate_email(email: &str) -> Result<(), FormError> {
    let email = required(email, "email")?;
    if !EMAIL_RE.is_match(email) {
        return Err(FormError::Invalid("email address"));
    }
    Ok(())
}

//! The job posting form, as collected from a multipart request.

use axum::extract::Multipart;
use bytes::Bytes;
use validator::{Validate, ValidationError};

use crate::errors::AppError;
use crate::models::job::NewJob;
use crate::validation::{failure, present, FieldErrors};

pub const PHOTO_FIELD: &str = "photos";

#[derive(Debug)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Bytes,
}

/// Text fields arrive trimmed; blank ones are left unset.
#[derive(Debug, Default, Validate)]
pub struct JobForm {
    #[validate(
        required(message = "The title field is required."),
        length(max = 255, message = "The title field must not be greater than 255 characters.")
    )]
    pub title: Option<String>,
    #[validate(
        required(message = "The category field is required."),
        length(max = 255, message = "The category field must not be greater than 255 characters.")
    )]
    pub category: Option<String>,
    #[validate(
        required(message = "The description field is required."),
        length(min = 30, message = "The description field must be at least 30 characters.")
    )]
    pub description: Option<String>,
    #[validate(
        required(message = "The location field is required."),
        length(max = 255, message = "The location field must not be greater than 255 characters.")
    )]
    pub location: Option<String>,
    #[validate(
        required(message = "The address field is required."),
        length(max = 255, message = "The address field must not be greater than 255 characters.")
    )]
    pub address: Option<String>,
    #[validate(required(message = "The date field is required."))]
    pub date: Option<String>,
    #[validate(
        required(message = "The time preference field is required."),
        length(
            max = 255,
            message = "The time preference field must not be greater than 255 characters."
        )
    )]
    pub time_preference: Option<String>,
    #[validate(
        required(message = "The urgency field is required."),
        length(max = 255, message = "The urgency field must not be greater than 255 characters.")
    )]
    pub urgency: Option<String>,
    #[validate(
        required(message = "The budget field is required."),
        custom(function = "validate_budget")
    )]
    pub budget: Option<String>,
    #[validate(
        required(message = "The contact preference field is required."),
        length(
            max = 255,
            message = "The contact preference field must not be greater than 255 characters."
        )
    )]
    pub contact_preference: Option<String>,
    pub photo: Option<UploadedFile>,
}

fn parse_budget(raw: &str) -> Option<i32> {
    raw.parse::<i32>().ok()
}

fn validate_budget(raw: &str) -> Result<(), ValidationError> {
    match parse_budget(raw) {
        Some(v) if v >= 0 => Ok(()),
        Some(_) => Err(failure("min", "The budget field must be at least 0.")),
        None => Err(failure("integer", "The budget field must be an integer.")),
    }
}

impl JobForm {
    /// Reads every part. Text parts become fields; the first non-empty
    /// `photos` file part becomes the photo.
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = JobForm::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(format!("Invalid multipart data: {e}")))?
        {
            let name = field.name().unwrap_or_default().to_string();
            let file_name = field.file_name().map(str::to_string);

            match file_name {
                Some(file_name) => {
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(format!("Failed to read file data: {e}")))?;
                    let is_photo = name == PHOTO_FIELD || name == "photos[]";
                    let is_blank = bytes.is_empty() && file_name.is_empty();
                    if is_photo && !is_blank && form.photo.is_none() {
                        form.photo = Some(UploadedFile { file_name, bytes });
                    }
                }
                None => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(format!("Failed to read field {name}: {e}")))?;
                    form.insert(&name, text);
                }
            }
        }
        Ok(form)
    }

    /// `adresse` is accepted as a spelling of `address`. Unknown names are ignored.
    pub fn insert(&mut self, name: &str, value: String) {
        let slot = match name {
            "title" => &mut self.title,
            "category" => &mut self.category,
            "description" => &mut self.description,
            "location" => &mut self.location,
            "address" | "adresse" => &mut self.address,
            "date" => &mut self.date,
            "time_preference" => &mut self.time_preference,
            "urgency" => &mut self.urgency,
            "budget" => &mut self.budget,
            "contact_preference" => &mut self.contact_preference,
            _ => return,
        };
        *slot = present(Some(value));
    }

    pub fn to_new_job(&self) -> Result<NewJob, FieldErrors> {
        self.validate()?;
        let text = |value: &Option<String>| value.clone().unwrap_or_default();

        Ok(NewJob {
            title: text(&self.title),
            category: text(&self.category),
            description: text(&self.description),
            location: text(&self.location),
            address: text(&self.address),
            date: text(&self.date),
            time_preference: text(&self.time_preference),
            urgency: text(&self.urgency),
            budget: self.budget.as_deref().and_then(parse_budget).unwrap_or_default(),
            contact_preference: text(&self.contact_preference),
        })
    }
}

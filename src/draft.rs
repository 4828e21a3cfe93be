//! Draft records: the staging area for a new inventory item.
//!
//! A [`DraftRecord`] collects field values from manual edits, a staged
//! image, and/or a recognition result. [`DraftForm`] wraps a draft with the
//! submission lifecycle of the add-item flow: validate locally, post to the
//! API, show a brief success confirmation, then reset.

use std::path::Path;
use std::time::{Duration, Instant};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::api::{ApiClient, ApiError};
use crate::model::{Category, InventoryRecord, Location, NewItem};

/// How long the success confirmation is shown before the form clears.
pub const SUCCESS_CLEAR_DELAY: Duration = Duration::from_secs(2);

/// Local validation failures. These never reach the network.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Item name must be at least 2 characters.")]
    NameTooShort,
    #[error("Please select a category.")]
    MissingCategory,
    #[error("Please enter a storage location.")]
    MissingLocation,
    #[error("Quantity must be at least 1.")]
    QuantityTooLow,
}

/// Submission failures: either the draft failed local validation or the
/// API rejected it.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// An in-progress, unsaved inventory entry.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftRecord {
    pub name: String,
    pub category: Option<Category>,
    pub location: Location,
    pub quantity: u32,
    /// Staged image: a data URL from a captured frame or a local file.
    pub image_reference: Option<String>,
}

impl Default for DraftRecord {
    fn default() -> Self {
        Self {
            name: String::new(),
            category: None,
            location: Location::default(),
            quantity: 1,
            image_reference: None,
        }
    }
}

impl DraftRecord {
    /// Validate the draft and assemble the persistence request.
    ///
    /// New items require quantity >= 1; decrementing an existing record to 0
    /// later is the synchronization store's business, not the draft's.
    pub fn validate(&self) -> Result<NewItem, ValidationError> {
        let name = self.name.trim();
        if name.chars().count() < 2 {
            return Err(ValidationError::NameTooShort);
        }
        let category = self.category.ok_or(ValidationError::MissingCategory)?;
        if self.location.as_str().trim().is_empty() {
            return Err(ValidationError::MissingLocation);
        }
        if self.quantity < 1 {
            return Err(ValidationError::QuantityTooLow);
        }

        Ok(NewItem {
            name: name.to_string(),
            category,
            quantity: self.quantity,
            location: Some(Location::new(self.location.as_str().trim())),
            image_reference: self.image_reference.clone(),
        })
    }

    /// Stage an already-encoded image (data URL or remote URL).
    pub fn stage_image(&mut self, reference: String) {
        self.image_reference = Some(reference);
    }

    /// Stage an image from a local file, encoded as a data URL.
    pub fn stage_image_file(&mut self, path: &Path) -> std::io::Result<()> {
        let bytes = std::fs::read(path)?;
        let mime = match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .as_deref()
        {
            Some("png") => "image/png",
            Some("jpg") | Some("jpeg") => "image/jpeg",
            Some("gif") => "image/gif",
            Some("webp") => "image/webp",
            _ => "application/octet-stream",
        };
        self.image_reference = Some(format!("data:{};base64,{}", mime, BASE64.encode(bytes)));
        Ok(())
    }

    pub fn clear_image(&mut self) {
        self.image_reference = None;
    }

    /// Reset every field to its empty default.
    pub fn clear(&mut self) {
        *self = DraftRecord::default();
    }
}

/// Submission phase of the add-item flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    /// Fields are editable.
    Editing,
    /// A create request is in flight.
    Submitting,
    /// The item was persisted; the confirmation is showing.
    Success { since: Instant },
}

/// The add-item form: a draft plus its submission lifecycle.
#[derive(Debug)]
pub struct DraftForm {
    draft: DraftRecord,
    phase: FormPhase,
    error: Option<String>,
}

impl Default for DraftForm {
    fn default() -> Self {
        Self::new()
    }
}

impl DraftForm {
    pub fn new() -> Self {
        Self {
            draft: DraftRecord::default(),
            phase: FormPhase::Editing,
            error: None,
        }
    }

    pub fn draft(&self) -> &DraftRecord {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut DraftRecord {
        &mut self.draft
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    /// The message shown to the user after a failed submission, verbatim.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Validate and persist the draft.
    ///
    /// On success the form enters the timed confirmation phase; call
    /// [`DraftForm::tick`] to clear it after [`SUCCESS_CLEAR_DELAY`]. On
    /// failure every entered value is retained and the error message is
    /// kept for display, so the user can correct and resubmit without
    /// re-entering data.
    pub async fn submit(&mut self, client: &ApiClient) -> Result<InventoryRecord, SubmitError> {
        let request = match self.draft.validate() {
            Ok(request) => request,
            Err(e) => {
                self.error = Some(e.to_string());
                return Err(e.into());
            }
        };

        self.phase = FormPhase::Submitting;
        self.error = None;

        match client.create_item(&request).await {
            Ok(record) => {
                log::info!("Created item '{}' (id {})", record.name, record.id);
                self.phase = FormPhase::Success {
                    since: Instant::now(),
                };
                Ok(record)
            }
            Err(e) => {
                self.phase = FormPhase::Editing;
                self.error = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Advance the timed confirmation. Once the success phase has been
    /// showing for [`SUCCESS_CLEAR_DELAY`], the draft resets to empty and
    /// the form returns to editing. Returns whether the reset happened.
    pub fn tick(&mut self, now: Instant) -> bool {
        if let FormPhase::Success { since } = self.phase {
            if now.duration_since(since) >= SUCCESS_CLEAR_DELAY {
                self.draft.clear();
                self.error = None;
                self.phase = FormPhase::Editing;
                return true;
            }
        }
        false
    }
}

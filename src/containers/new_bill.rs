use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use mime::Mime;
use thiserror::Error;

use crate::models::{BillDraft, BillStatus};
use crate::router::{Navigate, BILLS_PATH};
use crate::session::Session;
use crate::store::Store;
use crate::ui::bills::{self, ViewState};
use crate::ui::document::{Document, EventKind, FormData, SelectedFile, UiEvent};

pub const FILE_INPUT: &str = "file";
pub const FORM: &str = "form-new-bill";

const DEFAULT_PCT: i32 = 20;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("unsupported receipt format for {0}, expected jpg, jpeg or png")]
    UnsupportedExtension(String),
    #[error("no valid receipt has been selected")]
    MissingReceipt,
    #[error("the signed-in user has no email")]
    MissingEmail,
    #[error("invalid value for {0}")]
    InvalidField(&'static str),
}

/// Outcome of a form submission
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    Sent,
    Blocked(ValidationError),
    Failed(String),
}

/// A receipt that passed the extension check
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    pub file_name: String,
    pub file_url: String,
    pub mime: Mime,
}

/// Map an accepted receipt file name to its image type.
pub fn receipt_mime(file_name: &str) -> Result<Mime, ValidationError> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => Ok(mime::IMAGE_JPEG),
        Some("png") => Ok(mime::IMAGE_PNG),
        _ => Err(ValidationError::UnsupportedExtension(file_name.to_string())),
    }
}

pub struct NewBill {
    document: Rc<dyn Document>,
    navigator: Rc<dyn Navigate>,
    store: Arc<dyn Store>,
    session: Rc<Session>,
    receipt: Option<Receipt>,
    file_error: Option<ValidationError>,
}

impl NewBill {
    pub fn new(
        document: Rc<dyn Document>,
        navigator: Rc<dyn Navigate>,
        store: Arc<dyn Store>,
        session: Rc<Session>,
    ) -> Self {
        document.listen(FILE_INPUT, EventKind::Change);
        document.listen(FORM, EventKind::Submit);

        Self {
            document,
            navigator,
            store,
            session,
            receipt: None,
            file_error: None,
        }
    }

    pub fn receipt(&self) -> Option<&Receipt> {
        self.receipt.as_ref()
    }

    pub fn file_error(&self) -> Option<&ValidationError> {
        self.file_error.as_ref()
    }

    /// Check the selected receipt and keep it for submission.
    ///
    /// A rejected file clears the input and the previously kept receipt.
    pub fn handle_change_file(&mut self, file: Option<SelectedFile>) -> Result<(), ValidationError> {
        let checked = match file {
            Some(file) => receipt_mime(&file.name).map(|mime| Receipt {
                file_name: file.name,
                file_url: file.url,
                mime,
            }),
            None => Err(ValidationError::MissingReceipt),
        };

        match checked {
            Ok(receipt) => {
                tracing::debug!(file_name = %receipt.file_name, mime = %receipt.mime, "receipt selected");
                self.receipt = Some(receipt);
                self.file_error = None;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "receipt rejected");
                self.document.clear_input(FILE_INPUT);
                self.receipt = None;
                self.file_error = Some(err.clone());
                Err(err)
            }
        }
    }

    fn build_draft(&self, form: &FormData) -> Result<BillDraft, ValidationError> {
        let receipt = self.receipt.as_ref().ok_or(ValidationError::MissingReceipt)?;
        let email = self.session.email().ok_or(ValidationError::MissingEmail)?;

        let bill_type = form.value("expense-type");
        if bill_type.is_empty() {
            return Err(ValidationError::InvalidField("expense-type"));
        }
        let amount = form
            .value("amount")
            .parse::<i64>()
            .map_err(|_| ValidationError::InvalidField("amount"))?;
        let date = NaiveDate::parse_from_str(form.value("datepicker"), "%Y-%m-%d")
            .map_err(|_| ValidationError::InvalidField("datepicker"))?;
        // Blank, zero or garbage percentages fall back to the default rate
        let pct = form
            .value("pct")
            .parse::<i32>()
            .ok()
            .filter(|pct| *pct != 0)
            .unwrap_or(DEFAULT_PCT);

        Ok(BillDraft {
            email: email.to_string(),
            bill_type: bill_type.to_string(),
            name: form.value("expense-name").to_string(),
            amount,
            date,
            vat: form.value("vat").to_string(),
            pct,
            commentary: form.value("commentary").to_string(),
            file_url: receipt.file_url.clone(),
            file_name: receipt.file_name.clone(),
            status: BillStatus::Pending,
        })
    }

    /// Send the bill, then go back to the bills list.
    pub async fn handle_submit(&mut self, form: &FormData) -> Result<Submission> {
        let draft = match self.build_draft(form) {
            Ok(draft) => draft,
            Err(err) => {
                tracing::warn!(error = %err, "submission blocked");
                return Ok(Submission::Blocked(err));
            }
        };

        match self.store.post(&draft).await {
            Ok(response) => {
                tracing::info!(count = response.data.len(), name = %draft.name, "bill sent");
                self.navigator.navigate(BILLS_PATH)?;
                Ok(Submission::Sent)
            }
            Err(err) => {
                tracing::warn!(code = err.code(), error = %err, "failed to send bill");
                let message = err.to_string();
                self.document
                    .set_body(bills::render(&ViewState::Error(message.clone())));
                Ok(Submission::Failed(message))
            }
        }
    }

    /// Returns the submission outcome when the event was a form submit.
    pub async fn dispatch(&mut self, event: UiEvent) -> Result<Option<Submission>> {
        match event {
            UiEvent::Change { target, file } if target.test_id == FILE_INPUT => {
                // Rejections are kept in `file_error`, the form stays usable
                let _ = self.handle_change_file(file);
                Ok(None)
            }
            UiEvent::Submit { target, form } if target.test_id == FORM => {
                self.handle_submit(&form).await.map(Some)
            }
            other => {
                tracing::debug!(event = ?other, "event ignored by new bill page");
                Ok(None)
            }
        }
    }
}

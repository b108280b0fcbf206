use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Review state of a bill. Stored as lowercase text.
#[derive(sqlx::Type, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BillStatus {
    Pending,
    Accepted,
    Refused,
}

impl BillStatus {
    /// Label shown in the bills table
    pub fn label(&self) -> &'static str {
        match self {
            BillStatus::Pending => "En attente",
            BillStatus::Accepted => "Accepté",
            BillStatus::Refused => "Refused",
        }
    }
}

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub id: String,
    pub email: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub bill_type: String,
    pub name: String,
    pub amount: i64,
    pub date: NaiveDate,
    pub vat: String,
    pub pct: i32,
    pub commentary: String,
    pub file_url: String,
    pub file_name: String,
    pub status: BillStatus,
    pub comment_admin: Option<String>,
}

/// A bill as submitted from the form, before the store assigns an id.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BillDraft {
    pub email: String,
    #[serde(rename = "type")]
    pub bill_type: String,
    pub name: String,
    pub amount: i64,
    pub date: NaiveDate,
    pub vat: String,
    pub pct: i32,
    pub commentary: String,
    pub file_url: String,
    pub file_name: String,
    pub status: BillStatus,
}

impl BillDraft {
    pub fn into_bill(self, id: String) -> Bill {
        Bill {
            id,
            email: self.email,
            bill_type: self.bill_type,
            name: self.name,
            amount: self.amount,
            date: self.date,
            vat: self.vat,
            pct: self.pct,
            commentary: self.commentary,
            file_url: self.file_url,
            file_name: self.file_name,
            status: self.status,
            comment_admin: None,
        }
    }
}

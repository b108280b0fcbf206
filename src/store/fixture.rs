use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::models::{Bill, BillDraft, BillStatus};
use crate::store::{Store, StoreError, StoreResponse};

/// In-memory store seeded with the demo bills. Used by `--offline` runs and tests.
pub struct FixtureStore {
    bills: Mutex<Vec<Bill>>,
}

impl FixtureStore {
    pub fn new() -> Self {
        Self::with_bills(fixture_bills())
    }

    pub fn with_bills(bills: Vec<Bill>) -> Self {
        Self {
            bills: Mutex::new(bills),
        }
    }

    fn snapshot(&self) -> Result<Vec<Bill>, StoreError> {
        // A poisoned lock means a writer panicked mid-update
        let bills = self.bills.lock().map_err(|_| StoreError::Status(500))?;
        Ok(bills.clone())
    }
}

impl Default for FixtureStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for FixtureStore {
    async fn get(&self) -> Result<StoreResponse, StoreError> {
        let data = self.snapshot()?;
        tracing::debug!(count = data.len(), "fixture store get");
        Ok(StoreResponse { data })
    }

    async fn post(&self, draft: &BillDraft) -> Result<StoreResponse, StoreError> {
        let bill = draft.clone().into_bill(uuid::Uuid::new_v4().simple().to_string());
        {
            let mut bills = self.bills.lock().map_err(|_| StoreError::Status(500))?;
            bills.push(bill);
        }
        let data = self.snapshot()?;
        tracing::debug!(count = data.len(), "fixture store post");
        Ok(StoreResponse { data })
    }
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}

/// The four demo bills, deliberately not in date order.
pub fn fixture_bills() -> Vec<Bill> {
    vec![
        Bill {
            id: "47qAXb6fIm2zOKkLzMro".to_string(),
            email: "a@a".to_string(),
            bill_type: "Hôtel et logement".to_string(),
            name: "encore".to_string(),
            amount: 400,
            date: date(2004, 4, 4),
            vat: "80".to_string(),
            pct: 20,
            commentary: "séminaire billed".to_string(),
            file_url: "https://test.storage.tld/v0/b/billable-677b6.appspot.com/o/justificatifs%2Fpreview-facture-free-201801-pdf-1.jpg?alt=media&token=c1640e12-a24b-4b11-ae52-529112e9602a".to_string(),
            file_name: "preview-facture-free-201801-pdf-1.jpg".to_string(),
            status: BillStatus::Pending,
            comment_admin: Some("ok".to_string()),
        },
        Bill {
            id: "BeKy5Mo4jkmdfPGYpTxZ".to_string(),
            email: "a@a".to_string(),
            bill_type: "Transports".to_string(),
            name: "test1".to_string(),
            amount: 100,
            date: date(2001, 1, 1),
            vat: String::new(),
            pct: 20,
            commentary: "plop".to_string(),
            file_url: "https://test.storage.tld/v0/b/billable-677b6.appspot.com/o/justificatifs%2F1592770761.jpeg?alt=media&token=7685cd61-c112-42bc-9929-8a799bb82d8b".to_string(),
            file_name: "1592770761.jpeg".to_string(),
            status: BillStatus::Refused,
            comment_admin: Some("en fait non".to_string()),
        },
        Bill {
            id: "UIUZtnPQvnbFnB0ozvJh".to_string(),
            email: "a@a".to_string(),
            bill_type: "Services en ligne".to_string(),
            name: "test3".to_string(),
            amount: 300,
            date: date(2003, 3, 3),
            vat: "60".to_string(),
            pct: 20,
            commentary: String::new(),
            file_url: "https://test.storage.tld/v0/b/billable-677b6.appspot.com/o/justificatifs%2Ffacture-client-php-exportee-dans-document-pdf-enregistre-sur-disque-dur.png?alt=media&token=571d34cb-9c8f-430a-af52-66221cae1da3".to_string(),
            file_name: "facture-client-php-exportee-dans-document-pdf-enregistre-sur-disque-dur.png".to_string(),
            status: BillStatus::Accepted,
            comment_admin: Some("bon bah d'accord".to_string()),
        },
        Bill {
            id: "qcCK3SzECmaZAGRrHjaC".to_string(),
            email: "a@a".to_string(),
            bill_type: "Restaurants et bars".to_string(),
            name: "test2".to_string(),
            amount: 200,
            date: date(2002, 2, 2),
            vat: "40".to_string(),
            pct: 20,
            commentary: "test2".to_string(),
            file_url: "https://test.storage.tld/v0/b/billable-677b6.appspot.com/o/justificatifs%2Fpreview-facture-free-201801-pdf-1.jpg?alt=media&token=4df6ed2c-12c8-42a2-b013-346c1346f732".to_string(),
            file_name: "preview-facture-free-201801-pdf-1.jpg".to_string(),
            status: BillStatus::Refused,
            comment_admin: Some("pas la bonne facture".to_string()),
        },
    ]
}

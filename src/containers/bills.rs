use std::rc::Rc;
use std::sync::Arc;

use anyhow::{Context, Result};
use html_escape::encode_double_quoted_attribute;

use crate::models::Bill;
use crate::router::{Navigate, NEW_BILL_PATH};
use crate::session::Session;
use crate::store::{Store, StoreError};
use crate::ui::bills::{self, ViewState};
use crate::ui::document::{Document, Element, EventKind, UiEvent};

pub const NEW_BILL_BUTTON: &str = "btn-new-bill";
pub const EYE_ICON: &str = "icon-eye";
pub const MODAL_ID: &str = "modaleFile";

/// Lifecycle of the bills page
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BillsPhase {
    Idle,
    Loading,
    Loaded,
    Failed,
}

pub struct Bills {
    document: Rc<dyn Document>,
    navigator: Rc<dyn Navigate>,
    store: Arc<dyn Store>,
    session: Rc<Session>,
    phase: BillsPhase,
}

impl Bills {
    pub fn new(
        document: Rc<dyn Document>,
        navigator: Rc<dyn Navigate>,
        store: Arc<dyn Store>,
        session: Rc<Session>,
    ) -> Self {
        let bills = Self {
            document,
            navigator,
            store,
            session,
            phase: BillsPhase::Idle,
        };
        bills.bind();
        bills
    }

    // Listeners are dropped whenever the body is replaced
    fn bind(&self) {
        self.document.listen(NEW_BILL_BUTTON, EventKind::Click);
        self.document.listen(EYE_ICON, EventKind::Click);
    }

    pub fn phase(&self) -> BillsPhase {
        self.phase
    }

    /// Fetch the bills the store exposes to this user, latest first.
    pub async fn get_bills(&self) -> Result<Vec<Bill>, StoreError> {
        tracing::debug!(email = ?self.session.email(), "fetching bills");
        let mut bills = self.store.get().await?.data;

        // Anti-chronological; equal dates keep their store order
        bills.sort_by(|a, b| b.date.cmp(&a.date));

        Ok(bills)
    }

    /// Show the loading page, fetch the bills, then render the list or the error.
    pub async fn load(&mut self) {
        self.phase = BillsPhase::Loading;
        self.document.set_body(bills::render(&ViewState::Loading));

        match self.get_bills().await {
            Ok(data) => {
                tracing::info!(count = data.len(), "bills loaded");
                self.phase = BillsPhase::Loaded;
                self.document.set_body(bills::render(&ViewState::Loaded(data)));
                self.bind();
            }
            Err(err) => {
                // Shown as is, no retry
                tracing::warn!(code = err.code(), error = %err, "failed to load bills");
                self.phase = BillsPhase::Failed;
                self.document
                    .set_body(bills::render(&ViewState::Error(err.to_string())));
            }
        }
    }

    pub fn handle_click_new_bill(&self) -> Result<()> {
        self.navigator.navigate(NEW_BILL_PATH)
    }

    /// Open the receipt modal for the row the icon belongs to.
    pub fn handle_click_icon_eye(&self, icon: &Element) -> Result<()> {
        let bill_url = icon
            .attribute("data-bill-url")
            .context("eye icon has no data-bill-url attribute")?;
        let image_width = self.document.width_of(MODAL_ID).unwrap_or_default() / 2;

        let content = format!(
            r#"<div style="text-align: center;" class="bill-proof-container"><img width="{image_width}" src="{src}" alt="Bill" /></div>"#,
            src = encode_double_quoted_attribute(bill_url),
        );
        self.document.show_modal(MODAL_ID, content)
    }

    pub fn dispatch(&mut self, event: UiEvent) -> Result<()> {
        match event {
            UiEvent::Click(element) if element.test_id == NEW_BILL_BUTTON => {
                self.handle_click_new_bill()
            }
            UiEvent::Click(element) if element.test_id == EYE_ICON => {
                self.handle_click_icon_eye(&element)
            }
            other => {
                tracing::debug!(event = ?other, "event ignored by bills page");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;
    use crate::router::{MockNavigate, Router, RouterNavigator};
    use crate::store::fixture::{fixture_bills, FixtureStore};
    use crate::store::MockStore;
    use crate::ui::document::MemoryDocument;
    use rstest::rstest;

    struct Page {
        document: Rc<MemoryDocument>,
        bills: Bills,
    }

    fn page_with(store: Arc<dyn Store>, session: Session) -> Page {
        let document = Rc::new(MemoryDocument::with_body(
            800,
            bills::render(&ViewState::Loaded(fixture_bills())),
        ));
        let navigator = Rc::new(RouterNavigator::new(document.clone()));
        let bills = Bills::new(document.clone(), navigator, store, Rc::new(session));
        Page { document, bills }
    }

    fn page() -> Page {
        page_with(
            Arc::new(FixtureStore::new()),
            Session::new(User::employee("a@a")),
        )
    }

    fn rendered_dates(document: &MemoryDocument) -> Vec<String> {
        let html = scraper::Html::parse_document(&document.body());
        let cells = scraper::Selector::parse("tbody tr td:nth-child(3)").unwrap();
        html.select(&cells)
            .map(|cell| cell.text().collect::<String>())
            .collect()
    }

    #[tokio::test]
    async fn load_renders_bills_latest_first() {
        let mut page = page();

        page.bills.load().await;

        assert_eq!(page.bills.phase(), BillsPhase::Loaded);
        assert_eq!(
            rendered_dates(&page.document),
            vec!["2004-04-04", "2003-03-03", "2002-02-02", "2001-01-01"]
        );
        assert_eq!(page.document.query_all(EYE_ICON).len(), 4);
    }

    #[tokio::test]
    async fn every_record_from_the_store_is_listed() {
        let mut page = page_with(
            Arc::new(FixtureStore::new()),
            Session::new(User::employee("b@b")),
        );

        page.bills.load().await;

        assert_eq!(page.document.query_all(EYE_ICON).len(), 4);
    }

    #[rstest]
    #[case(404)]
    #[case(500)]
    #[tokio::test]
    async fn store_failure_renders_the_error_page(#[case] code: u16) {
        let mut store = MockStore::new();
        store
            .expect_get()
            .times(1)
            .returning(move || Err(StoreError::Status(code)));
        let mut page = page_with(Arc::new(store), Session::new(User::employee("a@a")));

        page.bills.load().await;

        assert_eq!(page.bills.phase(), BillsPhase::Failed);
        let messages = page.document.query_all("error-message");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].text, format!("Erreur {code}"));
    }

    #[tokio::test]
    async fn clicking_new_bill_shows_the_form() {
        let mut page = page();
        page.bills.load().await;
        assert!(page.document.body().contains("Mes notes de frais"));

        let event = page.document.click(NEW_BILL_BUTTON, 0).unwrap();
        page.bills.dispatch(event).unwrap();

        assert_eq!(page.document.body(), Router.resolve(NEW_BILL_PATH).unwrap());
        assert!(page.document.body().contains("Envoyer une note de frais"));
    }

    #[test]
    fn new_bill_handler_navigates_to_the_form_path() {
        let mut navigator = MockNavigate::new();
        navigator
            .expect_navigate()
            .withf(|pathname: &str| pathname == NEW_BILL_PATH)
            .times(1)
            .returning(|_| Ok(()));
        let document = Rc::new(MemoryDocument::new(800));
        let bills = Bills::new(
            document,
            Rc::new(navigator),
            Arc::new(FixtureStore::new()),
            Rc::new(Session::new(User::employee("a@a"))),
        );

        bills.handle_click_new_bill().unwrap();
    }

    #[tokio::test]
    async fn clicking_each_eye_icon_opens_the_receipt() {
        let mut page = page();
        page.bills.load().await;
        let before = page.bills.get_bills().await.unwrap();

        let icons = page.document.query_all(EYE_ICON);
        for (index, icon) in icons.iter().enumerate() {
            let event = page.document.click(EYE_ICON, index).unwrap();
            page.bills.dispatch(event).unwrap();

            let modal = page.document.modal(MODAL_ID).unwrap();
            assert!(modal.visible);
            let url = icon.attribute("data-bill-url").unwrap();
            assert!(modal.content.contains(&*encode_double_quoted_attribute(url)));
            assert!(modal.content.contains(r#"width="400""#));
        }

        assert_eq!(page.bills.get_bills().await.unwrap(), before);
    }

    #[test]
    fn eye_icon_without_url_is_an_error() {
        let page = page();
        let icon = Element::new(EYE_ICON);

        assert!(page.bills.handle_click_icon_eye(&icon).is_err());
        assert!(page.document.modal(MODAL_ID).is_none());
    }

    #[test]
    fn eye_icon_handler_accepts_a_detached_element() {
        let page = page();
        let icon = Element::new(EYE_ICON).with_attribute("data-bill-url", "https://test.storage.tld/a.png");

        page.bills.handle_click_icon_eye(&icon).unwrap();

        let modal = page.document.modal(MODAL_ID).unwrap();
        assert!(modal.content.contains(r#"src="https://test.storage.tld/a.png""#));
    }
}

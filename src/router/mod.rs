use std::cell::Cell;
use std::rc::Rc;

use anyhow::Result;
use thiserror::Error;

use crate::models::Bill;
use crate::ui::bills::{self, ViewState};
use crate::ui::document::Document;
use crate::ui::new_bill;

pub const BILLS_PATH: &str = "#employee/bills";
pub const NEW_BILL_PATH: &str = "#employee/bill/new";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Bills,
    NewBill,
}

impl Route {
    pub fn from_pathname(pathname: &str) -> Option<Self> {
        match pathname {
            BILLS_PATH => Some(Route::Bills),
            NEW_BILL_PATH => Some(Route::NewBill),
            _ => None,
        }
    }

    pub fn pathname(&self) -> &'static str {
        match self {
            Route::Bills => BILLS_PATH,
            Route::NewBill => NEW_BILL_PATH,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum RouterError {
    #[error("no page is registered for {0}")]
    UnknownPath(String),
}

/// Data handed to the page a pathname resolves to
#[derive(Debug, Clone, Default)]
pub struct RouteParams {
    pub data: Option<Vec<Bill>>,
    pub error: Option<String>,
    pub loading: bool,
}

/// Maps logical pathnames to page markup.
#[derive(Debug, Clone, Copy, Default)]
pub struct Router;

impl Router {
    pub fn resolve(&self, pathname: &str) -> Result<String, RouterError> {
        self.resolve_with(pathname, RouteParams::default())
    }

    pub fn resolve_with(&self, pathname: &str, params: RouteParams) -> Result<String, RouterError> {
        match Route::from_pathname(pathname) {
            Some(Route::Bills) => {
                let state = ViewState::from_parts(params.loading, params.error, params.data);
                Ok(bills::render(&state))
            }
            Some(Route::NewBill) => Ok(new_bill::render()),
            None => Err(RouterError::UnknownPath(pathname.to_string())),
        }
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait Navigate {
    fn navigate(&self, pathname: &str) -> Result<()>;
}

/// Navigator that swaps the document body for the resolved page.
pub struct RouterNavigator {
    document: Rc<dyn Document>,
    router: Router,
    current: Cell<Option<Route>>,
}

impl RouterNavigator {
    pub fn new(document: Rc<dyn Document>) -> Self {
        Self {
            document,
            router: Router,
            current: Cell::new(None),
        }
    }

    /// The last route navigated to
    pub fn current(&self) -> Option<Route> {
        self.current.get()
    }
}

impl Navigate for RouterNavigator {
    fn navigate(&self, pathname: &str) -> Result<()> {
        let markup = self.router.resolve(pathname)?;
        self.document.set_body(markup);
        self.current.set(Route::from_pathname(pathname));
        tracing::debug!(pathname, "navigated");
        Ok(())
    }
}

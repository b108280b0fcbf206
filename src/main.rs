mod config;
mod containers;
mod db;
mod models;
mod router;
mod session;
mod store;
mod ui;

use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;
use crate::containers::bills::{Bills, BillsPhase, EYE_ICON, MODAL_ID};
use crate::containers::new_bill::{NewBill, Submission, FILE_INPUT, FORM};
use crate::models::User;
use crate::router::{Navigate, Route, RouterNavigator};
use crate::session::{Session, SessionStorage};
use crate::store::fixture::FixtureStore;
use crate::store::Store;
use crate::ui::document::{Document, FormData, MemoryDocument, SelectedFile};

/// Employee expense reports
#[derive(Parser)]
#[command(name = "billed", version)]
struct Cli {
    /// Serve the demo bills from memory instead of the database
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the bills page
    Bills,
    /// Print the new bill form
    New,
    /// Print the receipt preview of a row of the bills page
    Preview {
        /// Row index, starting at 0 for the latest bill
        index: usize,
    },
    /// Send a new bill and print the resulting page
    Submit(SubmitArgs),
}

#[derive(Args)]
struct SubmitArgs {
    /// Receipt image (jpg, jpeg or png)
    #[arg(long)]
    file: PathBuf,
    /// Expense category
    #[arg(long = "type")]
    bill_type: String,
    #[arg(long, default_value = "")]
    name: String,
    /// Expense date, YYYY-MM-DD
    #[arg(long)]
    date: String,
    /// Amount including taxes
    #[arg(long)]
    amount: String,
    #[arg(long, default_value = "")]
    vat: String,
    #[arg(long, default_value = "")]
    pct: String,
    #[arg(long, default_value = "")]
    commentary: String,
}

impl SubmitArgs {
    fn form(&self) -> FormData {
        FormData::new()
            .with("expense-type", &self.bill_type)
            .with("expense-name", &self.name)
            .with("datepicker", &self.date)
            .with("amount", &self.amount)
            .with("vat", &self.vat)
            .with("pct", &self.pct)
            .with("commentary", &self.commentary)
    }
}

// Everything the pages share for one run
struct App {
    document: Rc<MemoryDocument>,
    navigator: Rc<RouterNavigator>,
    store: Arc<dyn Store>,
    session: Rc<Session>,
}

impl App {
    fn new(config: &Config, store: Arc<dyn Store>, session: Session) -> Self {
        let document = Rc::new(MemoryDocument::new(config.modal_width));
        let navigator = Rc::new(RouterNavigator::new(document.clone()));

        Self {
            document,
            navigator,
            store,
            session: Rc::new(session),
        }
    }

    async fn open_bills(&self) -> Result<Bills> {
        self.navigator.navigate(Route::Bills.pathname())?;

        let mut bills = Bills::new(
            self.document.clone(),
            self.navigator.clone(),
            self.store.clone(),
            self.session.clone(),
        );
        bills.load().await;

        Ok(bills)
    }

    fn open_new_bill(&self) -> Result<NewBill> {
        self.navigator.navigate(Route::NewBill.pathname())?;

        Ok(NewBill::new(
            self.document.clone(),
            self.navigator.clone(),
            self.store.clone(),
            self.session.clone(),
        ))
    }

    fn print_body(&self) {
        println!("{}", self.document.body());
    }
}

fn load_session(config: &Config) -> Result<Session> {
    let storage = SessionStorage::new(&config.session_path);

    if let Some(session) = Session::load(&storage)? {
        return Ok(session);
    }

    // First run: persist the user described by the configuration
    let session = Session::new(User {
        user_type: config.user_type,
        email: config.user_email.clone(),
    });
    session.save(&storage)?;
    tracing::info!(path = %storage.path().display(), "session created");

    Ok(session)
}

async fn connect_store(config: &Config, offline: bool, session: &Session) -> Result<Arc<dyn Store>> {
    match config.database_url() {
        Some(url) if !offline => {
            let db = db::init(url, session.email().map(str::to_string)).await?;
            tracing::info!("database connection established");
            Ok(Arc::new(db))
        }
        _ => {
            tracing::info!("serving demo bills from memory");
            Ok(Arc::new(FixtureStore::new()))
        }
    }
}

fn receipt_url(path: &Path) -> Result<String> {
    let absolute = std::fs::canonicalize(path)
        .with_context(|| format!("receipt {} not found", path.display()))?;
    Ok(format!("file://{}", absolute.display()))
}

async fn preview(app: &App, index: usize) -> Result<()> {
    let mut bills = app.open_bills().await?;
    if bills.phase() != BillsPhase::Loaded {
        app.print_body();
        return Ok(());
    }

    let event = app
        .document
        .click(EYE_ICON, index)
        .with_context(|| format!("no bill at row {index}"))?;
    bills.dispatch(event)?;

    let modal = app
        .document
        .modal(MODAL_ID)
        .context("receipt preview did not open")?;
    println!("{}", modal.content);

    Ok(())
}

/// Pick the receipt in the form, failing with the reason it was rejected.
async fn select_receipt(
    new_bill: &mut NewBill,
    document: &MemoryDocument,
    file: SelectedFile,
) -> Result<()> {
    let event = document
        .change_file(FILE_INPUT, file)
        .context("new bill form is not listening for receipts")?;
    new_bill.dispatch(event).await?;

    if let Some(err) = new_bill.file_error() {
        bail!("bill not sent: {err}");
    }
    if let Some(receipt) = new_bill.receipt() {
        tracing::info!(file_name = %receipt.file_name, mime = %receipt.mime, "receipt attached");
    }

    Ok(())
}

async fn submit(app: &App, args: &SubmitArgs) -> Result<()> {
    let mut new_bill = app.open_new_bill()?;

    let file = SelectedFile {
        name: args
            .file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default(),
        url: receipt_url(&args.file)?,
    };
    select_receipt(&mut new_bill, &app.document, file).await?;

    let event = app
        .document
        .submit(FORM, args.form())
        .context("new bill form is not listening for submissions")?;

    match new_bill.dispatch(event).await? {
        Some(Submission::Sent) if app.navigator.current() == Some(Route::Bills) => {
            app.open_bills().await?;
            app.print_body();
        }
        Some(Submission::Blocked(err)) => bail!("bill not sent: {err}"),
        _ => app.print_body(),
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr, stdout only carries markup
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .try_init()
    {
        eprintln!("tracing init failed: {e}");
    }

    let cli = Cli::parse();

    // Load configuration
    let config = config::init()?;

    let session = load_session(&config)?;
    if !session.is_employee() {
        bail!("the bills pages are reserved to employees");
    }

    let store = connect_store(&config, cli.offline, &session).await?;
    let app = App::new(&config, store, session);

    match &cli.command {
        Command::Bills => {
            app.open_bills().await?;
            app.print_body();
        }
        Command::New => {
            app.open_new_bill()?;
            app.print_body();
        }
        Command::Preview { index } => preview(&app, *index).await?,
        Command::Submit(args) => submit(&app, args).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::containers::new_bill::ValidationError;
    use crate::models::UserType;

    fn app() -> App {
        let config: Config = envy::from_iter(Vec::<(String, String)>::new()).unwrap();
        let session = Session::new(User {
            user_type: UserType::Employee,
            email: Some("a@a".to_string()),
        });
        App::new(&config, Arc::new(FixtureStore::new()), session)
    }

    fn file(name: &str) -> SelectedFile {
        SelectedFile {
            name: name.to_string(),
            url: format!("file:///tmp/{name}"),
        }
    }

    #[tokio::test]
    async fn rejected_receipt_reports_the_extension_error() {
        let app = app();
        let mut new_bill = app.open_new_bill().unwrap();

        let err = select_receipt(&mut new_bill, &app.document, file("facture.pdf"))
            .await
            .unwrap_err();

        let expected = ValidationError::UnsupportedExtension("facture.pdf".to_string());
        assert_eq!(err.to_string(), format!("bill not sent: {expected}"));
    }

    #[tokio::test]
    async fn accepted_receipt_is_kept() {
        let app = app();
        let mut new_bill = app.open_new_bill().unwrap();

        select_receipt(&mut new_bill, &app.document, file("facture.png"))
            .await
            .unwrap();

        assert_eq!(new_bill.receipt().unwrap().mime, mime::IMAGE_PNG);
    }
}

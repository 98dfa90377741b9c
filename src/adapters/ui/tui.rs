//! Implements InputPort. Inquire-based interactive prompts.
//!
//! Main menu -> composer (client, date, items, preview, submit) or stored quotations.

use super::preview::render_text;
use super::progress::with_spinner;
use crate::domain::aggregator;
use crate::domain::format::{format_date, format_item_price, format_total};
use crate::domain::{
    BillingUnit, ClientSelection, DomainError, ItemEdit, LineItem, LineItemStore, Price,
    QuotationHeader, QuotationRecord,
};
use crate::ports::InputPort;
use crate::usecases::{CatalogService, ClientChoice, ExportService, QuotationService};
use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use inquire::error::InquireError;
use inquire::{Confirm, Select, Text};
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

const MANUAL_TITLE: &str = "--Enter Manually--";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MainAction {
    NewQuotation,
    ListQuotations,
    OpenStored,
    Quit,
}

impl MainAction {
    const ALL: [MainAction; 4] = [
        MainAction::NewQuotation,
        MainAction::ListQuotations,
        MainAction::OpenStored,
        MainAction::Quit,
    ];
}

impl fmt::Display for MainAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MainAction::NewQuotation => "New quotation",
            MainAction::ListQuotations => "List quotations",
            MainAction::OpenStored => "View / export stored quotation",
            MainAction::Quit => "Quit",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ComposerAction {
    AddItem,
    EditItem,
    RemoveItem,
    ChangeClient,
    ChangeDate,
    Preview,
    Generate,
    Discard,
}

impl fmt::Display for ComposerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ComposerAction::AddItem => "Add item",
            ComposerAction::EditItem => "Edit item",
            ComposerAction::RemoveItem => "Remove item",
            ComposerAction::ChangeClient => "Change client",
            ComposerAction::ChangeDate => "Change date",
            ComposerAction::Preview => "Preview",
            ComposerAction::Generate => "Generate quotation",
            ComposerAction::Discard => "Back to main menu",
        })
    }
}

impl ComposerAction {
    const ALL: [ComposerAction; 8] = [
        ComposerAction::AddItem,
        ComposerAction::EditItem,
        ComposerAction::RemoveItem,
        ComposerAction::ChangeClient,
        ComposerAction::ChangeDate,
        ComposerAction::Preview,
        ComposerAction::Generate,
        ComposerAction::Discard,
    ];
}

/// Whether the composer stays open after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Stay,
    Leave,
}

/// A failed or cancelled action reports and keeps the draft; only an explicit close leaves.
fn next_step(outcome: Result<bool, DomainError>) -> Step {
    match outcome {
        Ok(true) => Step::Leave,
        Ok(false) => Step::Stay,
        Err(DomainError::Input(msg)) => {
            warn!(error = %msg, "composer prompt cancelled");
            Step::Stay
        }
        Err(e) => {
            println!("Error: {}. The draft is kept.", e);
            Step::Stay
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ItemField {
    Title,
    Description,
    Price,
    Unit,
}

impl ItemField {
    const ALL: [ItemField; 4] = [
        ItemField::Title,
        ItemField::Description,
        ItemField::Price,
        ItemField::Unit,
    ];
}

impl fmt::Display for ItemField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ItemField::Title => "Title",
            ItemField::Description => "Description",
            ItemField::Price => "Price",
            ItemField::Unit => "Billing unit",
        })
    }
}

fn input_err(e: InquireError) -> DomainError {
    DomainError::Input(e.to_string())
}

/// Esc / Ctrl-C on a prompt.
fn is_cancel(e: &InquireError) -> bool {
    matches!(
        e,
        InquireError::OperationCanceled | InquireError::OperationInterrupted
    )
}

/// Blank input keeps `default`; anything else must be `DD/MM/YYYY` or `YYYY-MM-DD`.
fn parse_date(input: &str, default: NaiveDate) -> Option<NaiveDate> {
    let input = input.trim();
    if input.is_empty() {
        return Some(default);
    }
    NaiveDate::parse_from_str(input, "%d/%m/%Y")
        .or_else(|_| NaiveDate::parse_from_str(input, "%Y-%m-%d"))
        .ok()
}

fn item_label(index: usize, item: &LineItem) -> String {
    let title = if item.title.trim().is_empty() {
        "(untitled)"
    } else {
        item.title.trim()
    };
    format!("{}. {}  {}", index + 1, title, format_item_price(item))
}

fn record_label(record: &QuotationRecord) -> String {
    let date = record
        .date
        .map(format_date)
        .unwrap_or_else(|| "--/--/----".to_string());
    format!(
        "#{} {} | {} | {} | {}",
        record.id,
        record.number,
        record.client_name,
        date,
        format_total(record.effective_total(), "")
    )
}

/// Quotation being composed in the current session.
struct Draft {
    number: String,
    date: NaiveDate,
    client: Option<ClientSelection>,
    store: LineItemStore,
}

impl Draft {
    fn header(&self) -> QuotationHeader {
        let header = QuotationHeader::new(self.number.clone(), self.date);
        match &self.client {
            Some(client) => header.with_client(client.clone()),
            None => header,
        }
    }
}

/// TUI adapter. Inquire prompts.
pub struct TuiInputPort {
    catalog: Arc<CatalogService>,
    quotations: Arc<QuotationService>,
    exports: Arc<ExportService>,
    pending_exports: Mutex<Vec<JoinHandle<Result<PathBuf, DomainError>>>>,
}

impl TuiInputPort {
    pub fn new(
        catalog: Arc<CatalogService>,
        quotations: Arc<QuotationService>,
        exports: Arc<ExportService>,
    ) -> Self {
        Self {
            catalog,
            quotations,
            exports,
            pending_exports: Mutex::new(Vec::new()),
        }
    }

    async fn compose(&self) -> Result<(), DomainError> {
        let choices = match with_spinner("Loading clients...", self.catalog.client_choices()).await
        {
            Ok(choices) => choices,
            Err(e) => {
                warn!(error = %e, "client list unavailable, manual entry only");
                vec![ClientChoice::Manual]
            }
        };
        let titles = match with_spinner("Loading services...", self.catalog.service_titles()).await
        {
            Ok(titles) => titles,
            Err(e) => {
                warn!(error = %e, "service titles unavailable");
                Vec::new()
            }
        };

        let number = Text::new("Quotation number:")
            .with_help_message("Leave blank to let the backend assign one")
            .prompt()
            .map_err(input_err)?;
        let mut draft = Draft {
            number: number.trim().to_string(),
            date: Local::now().date_naive(),
            client: None,
            store: LineItemStore::new(),
        };
        draft.client = Some(self.prompt_client(&choices)?);
        draft.date = self.prompt_date(draft.date)?;

        loop {
            let billable = draft.store.billable();
            let layout = self.quotations.layout();
            let prompt = format!(
                "{} item(s) on {} page(s), total {}",
                billable.len(),
                layout.page_count(billable.len()),
                format_total(
                    aggregator::total(&billable),
                    aggregator::unit_label(&billable)
                )
            );
            let action = match Select::new(&prompt, ComposerAction::ALL.to_vec()).prompt() {
                Ok(action) => action,
                Err(e) if is_cancel(&e) => ComposerAction::Discard,
                Err(e) => return Err(input_err(e)),
            };

            let outcome = self.apply(action, &mut draft, &choices, &titles).await;
            if next_step(outcome) == Step::Leave {
                return Ok(());
            }
        }
    }

    /// Runs one composer action. `Ok(true)` means the composer should close.
    async fn apply(
        &self,
        action: ComposerAction,
        draft: &mut Draft,
        choices: &[ClientChoice],
        titles: &[String],
    ) -> Result<bool, DomainError> {
        match action {
            ComposerAction::AddItem => {
                let item = self.prompt_item(titles)?;
                let index = draft.store.add(item);
                let page = self.quotations.layout().page_number_for(index);
                println!("Added item {} (page {}).", index + 1, page);
            }
            ComposerAction::EditItem => {
                if let Some(index) = self.pick_item(&draft.store, "Edit which item?")? {
                    self.edit_item(&mut draft.store, index, titles)?;
                }
            }
            ComposerAction::RemoveItem => {
                if let Some(index) = self.pick_item(&draft.store, "Remove which item?")? {
                    let removed = draft.store.remove(index)?;
                    println!("Removed \"{}\".", removed.title);
                }
            }
            ComposerAction::ChangeClient => {
                draft.client = Some(self.prompt_client(choices)?);
            }
            ComposerAction::ChangeDate => {
                draft.date = self.prompt_date(draft.date)?;
            }
            ComposerAction::Preview => {
                let document = self.quotations.preview(&draft.header(), &draft.store)?;
                println!("\n{}", render_text(&document));
            }
            ComposerAction::Generate => {
                let (record, document) = with_spinner(
                    "Saving quotation...",
                    self.quotations.submit(&draft.header(), &draft.store),
                )
                .await?;
                println!("\n{}", render_text(&document));
                println!(
                    "Saved as {} (id {}). Exporting to {} in the background.",
                    record.number,
                    record.id,
                    self.exports.output_dir().display()
                );
                let handle = self.exports.spawn_export(document);
                if let Ok(mut pending) = self.pending_exports.lock() {
                    pending.push(handle);
                }
                return Ok(true);
            }
            ComposerAction::Discard => {
                let has_work = draft.store.items().iter().any(|i| !i.is_draft());
                if !has_work {
                    return Ok(true);
                }
                return Confirm::new("Discard this quotation?")
                    .with_default(false)
                    .prompt()
                    .map_err(input_err);
            }
        }
        Ok(false)
    }

    fn prompt_client(&self, choices: &[ClientChoice]) -> Result<ClientSelection, DomainError> {
        let choice = Select::new("Client:", choices.to_vec())
            .prompt()
            .map_err(input_err)?;
        let manual_name = match choice {
            ClientChoice::Manual => Text::new("Client name:").prompt().map_err(input_err)?,
            ClientChoice::Known(_) => String::new(),
        };
        Ok(choice.into_selection(manual_name.trim()))
    }

    fn prompt_date(&self, current: NaiveDate) -> Result<NaiveDate, DomainError> {
        let default = format_date(current);
        loop {
            let input = Text::new("Date (DD/MM/YYYY):")
                .with_default(&default)
                .prompt()
                .map_err(input_err)?;
            match parse_date(&input, current) {
                Some(date) => return Ok(date),
                None => println!("Unrecognised date \"{}\".", input.trim()),
            }
        }
    }

    fn prompt_title(&self, titles: &[String]) -> Result<String, DomainError> {
        if !titles.is_empty() {
            let mut options = vec![MANUAL_TITLE.to_string()];
            options.extend(titles.iter().cloned());
            let picked = Select::new("Service:", options)
                .prompt()
                .map_err(input_err)?;
            if picked != MANUAL_TITLE {
                return Ok(picked);
            }
        }
        Text::new("Service title:").prompt().map_err(input_err)
    }

    fn prompt_price(&self) -> Result<Price, DomainError> {
        let input = Text::new("Price:").prompt().map_err(input_err)?;
        let price = Price::parse(&input);
        if price.is_zero() && !input.trim().is_empty() && input.trim() != "0" {
            println!("\"{}\" is not a valid amount, using 0.", input.trim());
        }
        Ok(price)
    }

    fn prompt_unit(&self) -> Result<BillingUnit, DomainError> {
        Select::new("Billing unit:", BillingUnit::ALL.to_vec())
            .prompt()
            .map_err(input_err)
    }

    fn prompt_item(&self, titles: &[String]) -> Result<LineItem, DomainError> {
        let title = self.prompt_title(titles)?;
        let price = self.prompt_price()?;
        let unit = self.prompt_unit()?;
        let description = Text::new("Description:")
            .with_help_message("Optional")
            .prompt()
            .map_err(input_err)?;
        Ok(LineItem::new(title.trim(), price)
            .with_unit(unit)
            .with_description(description.trim()))
    }

    fn pick_item(
        &self,
        store: &LineItemStore,
        message: &str,
    ) -> Result<Option<usize>, DomainError> {
        if store.is_empty() {
            println!("No items yet.");
            return Ok(None);
        }
        let labels: Vec<String> = store
            .items()
            .iter()
            .enumerate()
            .map(|(i, item)| item_label(i, item))
            .collect();
        match Select::new(message, labels).raw_prompt() {
            Ok(picked) => Ok(Some(picked.index)),
            Err(e) if is_cancel(&e) => Ok(None),
            Err(e) => Err(input_err(e)),
        }
    }

    fn edit_item(
        &self,
        store: &mut LineItemStore,
        index: usize,
        titles: &[String],
    ) -> Result<(), DomainError> {
        let field = Select::new("Field:", ItemField::ALL.to_vec())
            .prompt()
            .map_err(input_err)?;
        let edit = match field {
            ItemField::Title => ItemEdit::Title(self.prompt_title(titles)?.trim().to_string()),
            ItemField::Description => {
                let current = store.get(index).map(|i| i.description.clone()).unwrap_or_default();
                let text = Text::new("Description:")
                    .with_initial_value(&current)
                    .prompt()
                    .map_err(input_err)?;
                ItemEdit::Description(text.trim().to_string())
            }
            ItemField::Price => ItemEdit::Price(self.prompt_price()?),
            ItemField::Unit => ItemEdit::Unit(self.prompt_unit()?),
        };
        store.edit(index, edit)?;
        Ok(())
    }

    async fn list_quotations(&self) -> Result<(), DomainError> {
        let records = with_spinner("Fetching quotations...", self.quotations.list()).await?;
        if records.is_empty() {
            println!("No quotations stored yet.");
        }
        for record in &records {
            println!("{}", record_label(record));
        }
        Ok(())
    }

    async fn open_stored(&self) -> Result<(), DomainError> {
        let records = with_spinner("Fetching quotations...", self.quotations.list()).await?;
        if records.is_empty() {
            println!("No quotations stored yet.");
            return Ok(());
        }
        let labels: Vec<String> = records.iter().map(record_label).collect();
        let index = match Select::new("Quotation:", labels).raw_prompt() {
            Ok(picked) => picked.index,
            Err(e) if is_cancel(&e) => return Ok(()),
            Err(e) => return Err(input_err(e)),
        };
        let id = records[index].id;
        let record = with_spinner("Loading quotation...", self.quotations.get(id)).await?;

        let document = match self.quotations.document_for(&record) {
            Ok(document) => document,
            Err(e) => {
                println!("Cannot open quotation {}: {}", record.number, e);
                return Ok(());
            }
        };
        println!("\n{}", render_text(&document));

        let export = Confirm::new("Export to PDF?")
            .with_default(true)
            .prompt()
            .map_err(input_err)?;
        if export {
            let path = with_spinner("Rendering PDF...", self.exports.export(&document)).await?;
            println!("Saved {}", path.display());
        }
        Ok(())
    }

    /// Wait for background exports started from the composer. Returns how many failed.
    async fn drain_exports(&self) -> usize {
        let pending: Vec<_> = match self.pending_exports.lock() {
            Ok(mut pending) => pending.drain(..).collect(),
            Err(_) => return 0,
        };
        if pending.is_empty() {
            return 0;
        }
        let count = pending.len();
        let mut failed = 0;
        for handle in pending {
            match handle.await {
                Ok(Ok(path)) => println!("Exported {}", path.display()),
                Ok(Err(_)) => failed += 1,
                Err(e) => {
                    error!(error = %e, "background export task did not complete");
                    failed += 1;
                }
            }
        }
        info!(count, failed, "background exports finished");
        failed
    }
}

#[async_trait]
impl InputPort for TuiInputPort {
    async fn run(&self) -> Result<(), DomainError> {
        loop {
            let action = match Select::new("What would you like to do?", MainAction::ALL.to_vec())
                .prompt()
            {
                Ok(action) => action,
                Err(e) if is_cancel(&e) => MainAction::Quit,
                Err(e) => return Err(input_err(e)),
            };

            let result = match action {
                MainAction::NewQuotation => self.compose().await,
                MainAction::ListQuotations => self.list_quotations().await,
                MainAction::OpenStored => self.open_stored().await,
                MainAction::Quit => break,
            };
            match result {
                Ok(()) => {}
                Err(DomainError::Input(msg)) => warn!(error = %msg, "prompt aborted"),
                Err(e) => println!("Error: {}", e),
            }
        }
        self.drain_exports().await;
        Ok(())
    }
}

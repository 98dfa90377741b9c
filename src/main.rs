//! Wiring & DI. Entry point: bootstrap adapters, inject into services, run UI.
//! No business logic here.

use dotenv::dotenv;
use quotedesk::adapters::export::PdfExporter;
use quotedesk::adapters::http::HttpQuotationRepository;
use quotedesk::adapters::persistence::InMemoryQuotationRepository;
use quotedesk::adapters::ui::TuiInputPort;
use quotedesk::ports::{DocumentExporter, InputPort, QuotationRepository};
use quotedesk::shared::config::AppConfig;
use quotedesk::usecases::{CatalogService, ExportService, QuotationService};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    let cfg = AppConfig::load().map_err(|e| anyhow::anyhow!("invalid configuration: {}", e))?;

    // --- Page layout: a zero capacity is fatal, never clamped ---
    let layout = cfg
        .page_layout()
        .map_err(|e| anyhow::anyhow!("invalid page layout: {}", e))?;
    let page_size = cfg.page_size();
    info!(
        first_page_capacity = layout.first_page_capacity(),
        later_page_capacity = layout.later_page_capacity(),
        width_px = page_size.width_px,
        height_px = page_size.height_px,
        "page layout"
    );

    // --- Backend: HTTP API when configured, otherwise in-memory ---
    let repo: Arc<dyn QuotationRepository> = match cfg.api_base_url() {
        Some(url) => {
            info!(url = %url, "using quotation API");
            Arc::new(HttpQuotationRepository::new(url))
        }
        None => {
            warn!("QUOTEDESK_API_BASE_URL not set, quotations are kept in memory for this session");
            Arc::new(InMemoryQuotationRepository::new())
        }
    };

    // --- Export ---
    let output_dir = PathBuf::from(cfg.output_dir_or_default());
    info!(path = %output_dir.display(), "export directory");
    let pdf = PdfExporter::new(cfg.company_profile());
    pdf.check_layout(&layout, &page_size)
        .map_err(|e| anyhow::anyhow!("page layout does not fit page size: {}", e))?;
    let exporter: Arc<dyn DocumentExporter> = Arc::new(pdf);

    // --- Services ---
    let catalog = Arc::new(CatalogService::new(Arc::clone(&repo)));
    let quotations = Arc::new(QuotationService::new(Arc::clone(&repo), layout));
    let exports = Arc::new(ExportService::new(exporter, output_dir, page_size));

    let input_port: Arc<dyn InputPort> = Arc::new(TuiInputPort::new(catalog, quotations, exports));

    // --- Run (main menu -> compose / list / view & export) ---
    input_port
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    Ok(())
}

//! Application configuration. Backend URL, output paths, page layout, company footer.

use crate::domain::{CompanyProfile, PageLayout, PageSize, QuotationError};
use serde::Deserialize;

/// Where exported PDFs land when `QUOTEDESK_OUTPUT_DIR` is unset.
pub const DEFAULT_OUTPUT_DIR: &str = "./exports";

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Quotation API root, e.g. `https://api.example.com/api`. Read from QUOTEDESK_API_BASE_URL.
    /// When unset the app runs against an in-memory backend.
    #[serde(default)]
    pub api_base_url: Option<String>,

    /// Directory for exported files. Read from QUOTEDESK_OUTPUT_DIR.
    #[serde(default)]
    pub output_dir: Option<String>,

    // ─────────────────────────────────────────────────────────────────────────
    // Page layout
    // ─────────────────────────────────────────────────────────────────────────
    /// Items on the cover page (default 3). Read from QUOTEDESK_FIRST_PAGE_CAPACITY.
    #[serde(default)]
    pub first_page_capacity: Option<usize>,

    /// Items on each continuation page (default 5). Read from QUOTEDESK_LATER_PAGE_CAPACITY.
    #[serde(default)]
    pub later_page_capacity: Option<usize>,

    /// Page width in CSS pixels (default 794, A4 at 96 dpi).
    #[serde(default)]
    pub page_width_px: Option<f32>,

    /// Page height in CSS pixels (default 1123).
    #[serde(default)]
    pub page_height_px: Option<f32>,

    /// Page margin in CSS pixels (default 32).
    #[serde(default)]
    pub page_margin_px: Option<f32>,

    // ─────────────────────────────────────────────────────────────────────────
    // Company footer
    // ─────────────────────────────────────────────────────────────────────────
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub company_website: Option<String>,
    #[serde(default)]
    pub company_email: Option<String>,
    #[serde(default)]
    pub company_phone: Option<String>,
    #[serde(default)]
    pub company_address: Option<String>,

    /// Terms line printed under the footer. Read from QUOTEDESK_TERMS.
    #[serde(default)]
    pub terms: Option<String>,
}

impl AppConfig {
    /// Load from `.env`, the optional `QUOTEDESK_CONFIG` file and `QUOTEDESK_*` variables.
    ///
    /// Malformed values (e.g. a negative capacity) are an error, never replaced by defaults.
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        Self::load_from(config::Environment::with_prefix("QUOTEDESK"))
    }

    fn load_from(env: config::Environment) -> Result<Self, config::ConfigError> {
        let mut c = config::Config::builder();
        if let Ok(path) = std::env::var("QUOTEDESK_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        c = c.add_source(env.try_parsing(true));
        c.build()?.try_deserialize()
    }

    /// API base URL, `None` when unset or blank.
    pub fn api_base_url(&self) -> Option<&str> {
        self.api_base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn output_dir_or_default(&self) -> String {
        self.output_dir
            .clone()
            .unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string())
    }

    /// Validated page capacities. A configured 0 is an error, never clamped.
    pub fn page_layout(&self) -> Result<PageLayout, QuotationError> {
        PageLayout::new(
            self.first_page_capacity
                .unwrap_or(PageLayout::DEFAULT_FIRST_PAGE_CAPACITY),
            self.later_page_capacity
                .unwrap_or(PageLayout::DEFAULT_LATER_PAGE_CAPACITY),
        )
    }

    pub fn page_size(&self) -> PageSize {
        let default = PageSize::A4;
        PageSize {
            width_px: self.page_width_px.unwrap_or(default.width_px),
            height_px: self.page_height_px.unwrap_or(default.height_px),
            margin_px: self.page_margin_px.unwrap_or(default.margin_px),
        }
    }

    pub fn company_profile(&self) -> CompanyProfile {
        let default = CompanyProfile::default();
        CompanyProfile {
            name: self.company_name.clone().unwrap_or(default.name),
            website: self.company_website.clone().unwrap_or(default.website),
            email: self.company_email.clone().unwrap_or(default.email),
            phone: self.company_phone.clone().unwrap_or(default.phone),
            address: self.company_address.clone().unwrap_or(default.address),
            terms: self.terms.clone().unwrap_or(default.terms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_a4_cover_layout() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.api_base_url(), None);
        assert_eq!(cfg.output_dir_or_default(), "./exports");
        assert_eq!(cfg.page_layout().unwrap(), PageLayout::default());
        assert_eq!(cfg.page_size(), PageSize::A4);
        assert_eq!(
            cfg.company_profile().terms,
            "This quotation is valid for 7 days only."
        );
    }

    #[test]
    fn zero_capacity_is_a_configuration_error() {
        let cfg = AppConfig {
            later_page_capacity: Some(0),
            ..AppConfig::default()
        };
        assert!(matches!(
            cfg.page_layout(),
            Err(QuotationError::InvalidConfiguration {
                first_page_capacity: 3,
                later_page_capacity: 0,
            })
        ));
    }

    fn env(vars: &[(&str, &str)]) -> config::Environment {
        let source = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        config::Environment::with_prefix("QUOTEDESK").source(Some(source))
    }

    #[test]
    fn negative_capacity_fails_to_load() {
        let loaded = AppConfig::load_from(env(&[
            ("QUOTEDESK_FIRST_PAGE_CAPACITY", "-1"),
            ("QUOTEDESK_API_BASE_URL", "https://api.example.com/api"),
        ]));
        assert!(loaded.is_err());
    }

    #[test]
    fn env_values_are_parsed() {
        let cfg = AppConfig::load_from(env(&[
            ("QUOTEDESK_FIRST_PAGE_CAPACITY", "4"),
            ("QUOTEDESK_PAGE_MARGIN_PX", "40"),
            ("QUOTEDESK_API_BASE_URL", "https://api.example.com/api"),
        ]))
        .unwrap();
        assert_eq!(cfg.api_base_url(), Some("https://api.example.com/api"));
        assert_eq!(cfg.page_layout().unwrap().first_page_capacity(), 4);
        assert_eq!(cfg.page_size().margin_px, 40.0);
    }

    #[test]
    fn zero_capacity_from_env_reaches_layout_validation() {
        let cfg = AppConfig::load_from(env(&[("QUOTEDESK_LATER_PAGE_CAPACITY", "0")])).unwrap();
        assert!(matches!(
            cfg.page_layout(),
            Err(QuotationError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn blank_api_url_means_offline() {
        let cfg = AppConfig {
            api_base_url: Some("   ".to_string()),
            ..AppConfig::default()
        };
        assert_eq!(cfg.api_base_url(), None);
    }

    #[test]
    fn overrides_replace_individual_fields() {
        let cfg = AppConfig {
            page_margin_px: Some(48.0),
            company_email: Some("hello@example.com".to_string()),
            ..AppConfig::default()
        };
        assert_eq!(cfg.page_size().margin_px, 48.0);
        assert_eq!(cfg.page_size().width_px, 794.0);
        assert_eq!(cfg.company_profile().email, "hello@example.com");
    }
}

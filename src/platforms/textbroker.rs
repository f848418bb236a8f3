//! Textbroker author-area integration.
//!
//! Drives the same AJAX endpoints the author web UI uses: the login form,
//! the open-order search and the "take this order" action. Responses are
//! HTML fragments, not JSON.
//!
//! Base URL: https://intern.textbroker.fr
//! Auth: form login, then a session cookie carried by the client's cookie jar.
//! AJAX calls must send `X-Requested-With: XMLHttpRequest` or the server
//! answers with the full page layout instead of the fragment.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use scraper::{Html, Selector};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};

use super::OrderPlatform;
use crate::config::AppConfig;
use crate::types::ListingItem;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

const PLATFORM_NAME: &str = "textbroker";

const LOGIN_PATH: &str = "/login/login/ajax_context:1/";
const SEARCH_PATH: &str = "/a/order-search.ajax.php";
const CLAIM_PATH: &str = "/a/inc/headlines_common/show_headline.php";

/// Open orders of every level, no keyword, no category or client filter.
const SEARCH_QUERY: [(&str, &str); 13] = [
    ("search_headline", "1"),
    ("q", ""),
    ("client_id", ""),
    ("search_cat", "0"),
    ("date_from", ""),
    ("date_through", ""),
    ("which_date", "0"),
    ("order_type_open_order_2", "1"),
    ("order_type_open_order_3", "1"),
    ("order_type_open_order_4", "1"),
    ("fields", "0"),
    ("narrowness", "0"),
    ("", "Débuter la recherche"),
];

const ROW_SELECTOR: &str = r#"div.box-wrapper tr[id*="tr_"]"#;
const ID_SELECTOR: &str = "a.headline_prev";
const PRICE_SELECTOR: &str = "td#earnings > strong";

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Textbroker author-area client. One instance holds one login session.
pub struct TextbrokerClient {
    http: Client,
    base_url: String,
    username: String,
    password: SecretString,
}

impl TextbrokerClient {
    /// Create a client with a fresh cookie jar.
    pub fn new(
        base_url: &str,
        user_agent: &str,
        username: String,
        password: SecretString,
    ) -> Result<Self> {
        let http = Client::builder()
            .cookie_store(true)
            .user_agent(user_agent)
            .build()
            .context("Failed to build HTTP client for Textbroker")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            username,
            password,
        })
    }

    pub fn from_config(cfg: &AppConfig) -> Result<Self> {
        Self::new(
            &cfg.tuning.platform.base_url,
            &cfg.user_agent,
            cfg.author_username.clone(),
            cfg.author_password.clone(),
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Issue the order search and return the raw HTML fragment.
    pub async fn fetch_listing(&self) -> Result<String> {
        let url = self.url(SEARCH_PATH);
        debug!(url = %url, "Fetching Textbroker order listing");

        let resp = self
            .http
            .get(&url)
            .query(&SEARCH_QUERY)
            .header("X-Requested-With", "XMLHttpRequest")
            .send()
            .await
            .context("Textbroker order search request failed")?;

        let resp = ensure_success(resp, "order search").await?;
        resp.text()
            .await
            .context("Failed to read Textbroker order search response")
    }

    /// Extract the order rows from a search response fragment.
    ///
    /// Rows without a preview link get `id: None`; rows without a price
    /// cell get an empty price text. Neither is an error here: the
    /// selector decides what each case means.
    pub fn parse_listing(html: &str) -> Result<Vec<ListingItem>> {
        let rows = parse_selector(ROW_SELECTOR)?;
        let id_link = parse_selector(ID_SELECTOR)?;
        let price = parse_selector(PRICE_SELECTOR)?;

        let doc = Html::parse_fragment(html);
        let items = doc
            .select(&rows)
            .map(|row| {
                let id = row
                    .select(&id_link)
                    .next()
                    .and_then(|a| a.value().attr("id"))
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(String::from);
                let raw_price_text = row
                    .select(&price)
                    .next()
                    .map(|strong| strong.text().collect::<String>())
                    .unwrap_or_default();
                ListingItem { id, raw_price_text }
            })
            .collect();

        Ok(items)
    }
}

fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("Invalid CSS selector {css:?}: {e}"))
}

/// Turn a non-2xx response into an error carrying the status and body.
async fn ensure_success(resp: Response, what: &str) -> Result<Response> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    anyhow::bail!("Textbroker {what} error {status}: {body}");
}

// ---------------------------------------------------------------------------
// OrderPlatform trait implementation
// ---------------------------------------------------------------------------

#[async_trait]
impl OrderPlatform for TextbrokerClient {
    /// Submit the author login form. The session cookie lands in the jar.
    async fn login(&self) -> Result<()> {
        info!(username = %self.username, "Authenticating with Textbroker...");

        let form = [
            ("action", LOGIN_PATH),
            ("params[0][name]", "email"),
            ("params[0][value]", self.username.as_str()),
            ("params[1][name]", "password"),
            ("params[1][value]", self.password.expose_secret().as_str()),
            ("params[2][name]", "userType"),
            ("params[2][value]", "author"),
        ];

        let resp = self
            .http
            .post(self.url(LOGIN_PATH))
            .form(&form)
            .send()
            .await
            .context("Textbroker login request failed")?;

        ensure_success(resp, "login").await?;
        info!("Textbroker authentication successful");
        Ok(())
    }

    async fn list_orders(&self) -> Result<Vec<ListingItem>> {
        let html = self.fetch_listing().await?;
        let items = Self::parse_listing(&html)?;
        debug!(rows = items.len(), "Textbroker listing parsed");
        Ok(items)
    }

    /// Take the order. Only the HTTP status is inspected.
    async fn claim_order(&self, order_id: &str) -> Result<()> {
        info!(order_id, "Claiming Textbroker order");

        let resp = self
            .http
            .post(self.url(CLAIM_PATH))
            .header("X-Requested-With", "XMLHttpRequest")
            .form(&[("id", order_id)])
            .send()
            .await
            .with_context(|| format!("Textbroker claim request for {order_id} failed"))?;

        ensure_success(resp, "claim").await?;
        Ok(())
    }

    fn name(&self) -> &str {
        PLATFORM_NAME
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

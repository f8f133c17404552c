//! Wallet API Client - lookup, lists and freeze transitions
//!
//! The investigation backend owns all wallet state. This module only calls it:
//! - GET  /wallets/search/{address}
//! - GET  /wallets/frozen/list
//! - GET  /wallets/unfrozen/list
//! - POST /wallets/{id}/freeze
//! - POST /wallets/{id}/unfreeze
//!
//! Every non-2xx status and transport failure becomes an [`AppError`]; nothing
//! is retried here.

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::models::config::DeskConfig;
use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::models::types::{
    FreezeAck, FreezeRequest, FrozenWalletEntry, UnfreezeRequest, UnfrozenWalletEntry, WalletData,
};
use crate::utils::constants::{
    PATH_FROZEN_LIST, PATH_UNFROZEN_LIST, PATH_WALLET_SEARCH, SEGMENT_FREEZE, SEGMENT_UNFREEZE,
    SEGMENT_WALLETS, USER_AGENT as USER_AGENT_CONST,
};

/// Operations the desk consumes from the wallet service
#[allow(async_fn_in_trait)]
pub trait WalletApi {
    /// Resolve a free-text wallet identifier to its record and risk aggregate
    async fn search_wallet(&self, address: &str) -> AppResult<WalletData>;

    async fn list_frozen_wallets(&self) -> AppResult<Vec<FrozenWalletEntry>>;

    async fn list_unfrozen_wallets(&self) -> AppResult<Vec<UnfrozenWalletEntry>>;

    async fn freeze_wallet(&self, wallet_id: i64, request: &FreezeRequest) -> AppResult<FreezeAck>;

    async fn unfreeze_wallet(
        &self,
        wallet_id: i64,
        request: &UnfreezeRequest,
    ) -> AppResult<FreezeAck>;
}

/// reqwest-backed implementation of [`WalletApi`]
#[derive(Clone)]
pub struct WalletApiClient {
    client: reqwest::Client,
    base_url: Url,
}

impl WalletApiClient {
    pub fn new(config: &DeskConfig) -> AppResult<Self> {
        let base_url = Url::parse(&config.api_base_url).map_err(|e| {
            AppError::invalid_config(format!("Invalid API base URL '{}': {}", config.api_base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::invalid_config(format!(
                "API base URL '{}' cannot carry a path",
                config.api_base_url
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_CONST));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .gzip(true)
            .build()
            .map_err(AppError::from)?;

        Ok(Self { client, base_url })
    }

    /// Base URL with `segments` appended, each percent-encoded as one path segment
    pub fn endpoint<I>(&self, segments: I) -> Url
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut url = self.base_url.clone();
        // `new` rejects cannot-be-a-base URLs, so the segments are always editable
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> AppResult<T> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        decode(response).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(&self, url: Url, body: &B) -> AppResult<T> {
        debug!("POST {}", url);
        let response = self.client.post(url).json(body).send().await?;
        decode(response).await
    }
}

impl WalletApi for WalletApiClient {
    async fn search_wallet(&self, address: &str) -> AppResult<WalletData> {
        let address = address.trim();
        if address.is_empty() {
            return Err(AppError::blank_wallet());
        }

        info!("🔍 Searching wallet {}", address);
        let url = self.endpoint(PATH_WALLET_SEARCH.iter().copied().chain([address]));
        match self.get_json::<WalletData>(url).await {
            Ok(data) => {
                info!(
                    "📊 Wallet {} (id {}): risk {}, {} evidence, frozen={}",
                    data.wallet.address,
                    data.wallet.id,
                    data.effective_risk_score(),
                    data.evidence.len(),
                    data.wallet.is_frozen
                );
                Ok(data)
            }
            Err(e) if e.code == ErrorCode::WalletNotFound => {
                Err(AppError::wallet_not_found(address))
            }
            Err(e) => Err(e),
        }
    }

    async fn list_frozen_wallets(&self) -> AppResult<Vec<FrozenWalletEntry>> {
        let wallets: Vec<FrozenWalletEntry> = self.get_json(self.endpoint(PATH_FROZEN_LIST)).await?;
        debug!("🔒 {} frozen wallets", wallets.len());
        Ok(wallets)
    }

    async fn list_unfrozen_wallets(&self) -> AppResult<Vec<UnfrozenWalletEntry>> {
        let wallets: Vec<UnfrozenWalletEntry> = self.get_json(self.endpoint(PATH_UNFROZEN_LIST)).await?;
        debug!("🔓 {} unfrozen wallets", wallets.len());
        Ok(wallets)
    }

    async fn freeze_wallet(&self, wallet_id: i64, request: &FreezeRequest) -> AppResult<FreezeAck> {
        info!("🔒 Freeze wallet {} requested by {}", wallet_id, request.frozen_by);
        let id = wallet_id.to_string();
        let url = self.endpoint([SEGMENT_WALLETS, id.as_str(), SEGMENT_FREEZE]);
        self.post_json(url, request).await
    }

    async fn unfreeze_wallet(
        &self,
        wallet_id: i64,
        request: &UnfreezeRequest,
    ) -> AppResult<FreezeAck> {
        info!("🔓 Unfreeze wallet {} requested by {}", wallet_id, request.unfrozen_by);
        let id = wallet_id.to_string();
        let url = self.endpoint([SEGMENT_WALLETS, id.as_str(), SEGMENT_UNFREEZE]);
        self.post_json(url, request).await
    }
}

/// Turn a response into a typed body or a classified error
async fn decode<T: DeserializeOwned>(response: Response) -> AppResult<T> {
    let status = response.status();
    if status.is_success() {
        let bytes = response.bytes().await?;
        return serde_json::from_slice(&bytes).map_err(AppError::from);
    }

    let body = response.text().await.unwrap_or_default();
    let detail = extract_detail(&body);
    let err = classify_status(status, detail);
    warn!("⚠️ API error {}: {}", status.as_u16(), err);
    Err(err)
}

/// Pull the human message out of an error body `{detail}`.
///
/// `detail` is either a string or a list of validation entries with `msg`.
pub fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Array(items) => {
            let msgs: Vec<String> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                .map(str::to_string)
                .collect();
            if msgs.is_empty() {
                None
            } else {
                Some(msgs.join("; "))
            }
        }
        other => Some(other.to_string()),
    }
}

/// Map a non-2xx status (plus server detail) onto the error taxonomy
pub fn classify_status(status: StatusCode, detail: Option<String>) -> AppError {
    let lowered = detail.as_deref().unwrap_or_default().to_lowercase();
    let message = detail
        .clone()
        .unwrap_or_else(|| format!("Server responded with {}", status));

    match status {
        StatusCode::NOT_FOUND => AppError::new(ErrorCode::WalletNotFound, message),
        StatusCode::CONFLICT | StatusCode::BAD_REQUEST if lowered.contains("already frozen") => {
            AppError::already_frozen(message)
        }
        StatusCode::CONFLICT | StatusCode::BAD_REQUEST if lowered.contains("not frozen") => {
            AppError::not_frozen(message)
        }
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            AppError::new(ErrorCode::NetworkTimeout, message)
        }
        s if s.is_server_error() => AppError::new(
            ErrorCode::ApiServerError,
            format!("Server error ({}): {}", s.as_u16(), message),
        ),
        _ => AppError::new(ErrorCode::ApiRejected, message),
    }
}

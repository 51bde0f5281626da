//! ViaCEP postal-code lookup.
//!
//! Used by the signup flow to prefill address fields. Responses are cached:
//! postal data changes rarely and ViaCEP rate-limits aggressive clients.

use moka::future::Cache;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://viacep.com.br/ws";

/// Cache up to this many distinct postal codes
const CACHE_CAPACITY: u64 = 10_000;

/// Postal data is effectively static; refresh daily
const CACHE_TTL_SECS: u64 = 24 * 60 * 60;

#[derive(Clone)]
pub struct ViaCepService {
    client: Client,
    base_url: String,
    cache: Arc<Cache<String, CepAddress>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CepAddress {
    pub street: String,
    pub district: String,
    pub city: String,
    pub state: String,
}

#[derive(Debug, Deserialize)]
struct ViaCepResponse {
    #[serde(default)]
    logradouro: Option<String>,
    #[serde(default)]
    bairro: Option<String>,
    #[serde(default)]
    localidade: Option<String>,
    #[serde(default)]
    uf: Option<String>,
    /// Present (and truthy) when the CEP does not exist
    #[serde(default)]
    erro: Option<serde_json::Value>,
}

#[derive(Debug)]
pub enum CepError {
    /// Input does not contain exactly eight digits
    InvalidCep,
    NotFound,
    Upstream(String),
}

impl fmt::Display for CepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CepError::InvalidCep => write!(f, "CEP must contain eight digits"),
            CepError::NotFound => write!(f, "CEP not found"),
            CepError::Upstream(msg) => write!(f, "ViaCEP error: {msg}"),
        }
    }
}

impl std::error::Error for CepError {}

impl ViaCepService {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(base_url: String) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(Duration::from_secs(CACHE_TTL_SECS))
            .build();

        Self {
            client: Client::new(),
            base_url,
            cache: Arc::new(cache),
        }
    }

    pub async fn lookup(&self, cep: &str) -> Result<CepAddress, CepError> {
        let digits: String = cep.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.len() != 8 {
            return Err(CepError::InvalidCep);
        }

        if let Some(hit) = self.cache.get(&digits).await {
            tracing::debug!("cache hit for CEP {}", digits);
            return Ok(hit);
        }

        tracing::info!("looking up CEP {} on ViaCEP", digits);

        let url = format!("{}/{}/json/", self.base_url, digits);
        let response = self
            .client
            .get(&url)
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| CepError::Upstream(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CepError::Upstream(format!(
                "status {}",
                response.status()
            )));
        }

        let data: ViaCepResponse = response
            .json()
            .await
            .map_err(|e| CepError::Upstream(e.to_string()))?;

        if data.erro.is_some() {
            return Err(CepError::NotFound);
        }

        let address = CepAddress {
            street: data.logradouro.unwrap_or_default(),
            district: data.bairro.unwrap_or_default(),
            city: data.localidade.unwrap_or_default(),
            state: data.uf.unwrap_or_default(),
        };

        self.cache.insert(digits, address.clone()).await;

        Ok(address)
    }
}

impl Default for ViaCepService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rejects_short_and_long_input() {
        let service = ViaCepService::new();
        for cep in ["1809510", "180951000", "", "abc"] {
            let result = service.lookup(cep).await;
            assert!(matches!(result, Err(CepError::InvalidCep)), "cep: {cep}");
        }
    }

    #[tokio::test]
    async fn test_mask_characters_do_not_count_as_digits() {
        let service = ViaCepService::with_base_url("http://127.0.0.1:0".to_string());
        let result = service.lookup("18095-10").await;
        assert!(matches!(result, Err(CepError::InvalidCep)));
    }
}

// Two-tier USD price lookup: market aggregator pairs first, exchange ticker second

use crate::balance_reader::BalanceReader;
use crate::error::{CoreError, CoreResult};
use crate::http_client::HttpClient;
use crate::models::{PriceQuote, QuoteSource};
use crate::rpc_client::RpcClient;
use crate::settings::Settings;
use log::{debug, info, warn};
use serde::Deserialize;

/// Endpoints and matching rules for both quote tiers
#[derive(Debug, Clone)]
pub struct PriceSourceConfig {
    /// Token address is appended
    pub aggregator_api_url: String,
    /// `<SYMBOL>-<STABLECOIN>` is appended
    pub price_api_url: String,
    pub preferred_dex_ids: Vec<String>,
    pub stablecoin_symbol: String,
    /// Lowercase
    pub stablecoin_address: String,
}

impl From<&Settings> for PriceSourceConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            aggregator_api_url: settings.aggregator_api_url.clone(),
            price_api_url: settings.price_api_url.clone(),
            preferred_dex_ids: settings.preferred_dex_ids.clone(),
            stablecoin_symbol: settings.stablecoin_symbol.clone(),
            stablecoin_address: settings.stablecoin_address.to_lowercase(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AggregatorResponse {
    #[serde(default)]
    pairs: Option<Vec<AggregatorPair>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AggregatorPair {
    #[serde(default)]
    dex_id: String,
    quote_token: QuoteToken,
    #[serde(default)]
    price_usd: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QuoteToken {
    #[serde(default)]
    symbol: String,
    #[serde(default)]
    address: String,
}

#[derive(Debug, Deserialize)]
struct TickerResponse {
    code: String,
    #[serde(default)]
    data: Vec<Ticker>,
}

#[derive(Debug, Deserialize)]
struct Ticker {
    #[serde(default)]
    last: Option<String>,
}

/// Accept a quoted price only when it parses as a finite number above zero
fn parse_price(raw: Option<&str>) -> Option<f64> {
    raw?.trim()
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite() && *p > 0.0)
}

pub struct PriceResolver<H> {
    http: H,
    config: PriceSourceConfig,
}

impl<H: HttpClient> PriceResolver<H> {
    pub fn new(http: H, config: PriceSourceConfig) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &PriceSourceConfig {
        &self.config
    }

    /// Run both tiers in order. Transport and decode faults only fail the tier
    /// they occur in; `QuoteUnavailable` means both tiers came up empty.
    pub async fn resolve<R: RpcClient>(&self, reader: &BalanceReader<R>) -> CoreResult<PriceQuote> {
        match self.from_aggregator(reader.token_address()).await {
            Ok(Some(quote)) => {
                info!("Price {} from {}", quote.price, quote.source);
                return Ok(quote);
            }
            Ok(None) => debug!("Aggregator has no usable {} pair", self.config.stablecoin_symbol),
            Err(e) => warn!("Aggregator price lookup failed: {}", e),
        }

        let symbol = match reader.get_symbol().await {
            Ok(symbol) => symbol,
            Err(e) => {
                warn!("Token symbol unavailable, skipping exchange ticker: {}", e);
                return Err(CoreError::QuoteUnavailable);
            }
        };

        match self.from_exchange(&symbol).await {
            Ok(Some(quote)) => {
                info!("Price {} from {}", quote.price, quote.source);
                Ok(quote)
            }
            Ok(None) => {
                warn!("Exchange ticker has no usable price for {}", symbol);
                Err(CoreError::QuoteUnavailable)
            }
            Err(e) => {
                warn!("Exchange price lookup failed: {}", e);
                Err(CoreError::QuoteUnavailable)
            }
        }
    }

    async fn from_aggregator(&self, token_address: &str) -> CoreResult<Option<PriceQuote>> {
        let url = format!("{}{}", self.config.aggregator_api_url, token_address);
        debug!("GET {}", url);
        let body = self.http.fetch_text(&url).await?;
        let response: AggregatorResponse = serde_json::from_str(&body)?;
        let pairs = response.pairs.unwrap_or_default();

        let quoted_in_stable = |pair: &&AggregatorPair| {
            pair.quote_token.symbol == self.config.stablecoin_symbol
                || pair.quote_token.address.to_lowercase() == self.config.stablecoin_address
        };
        let chosen = pairs
            .iter()
            .filter(quoted_in_stable)
            .find(|pair| self.config.preferred_dex_ids.iter().any(|id| *id == pair.dex_id))
            .or_else(|| pairs.iter().find(quoted_in_stable));

        Ok(chosen.and_then(|pair| {
            parse_price(pair.price_usd.as_deref()).map(|price| PriceQuote {
                price,
                source: QuoteSource::Aggregator {
                    dex_id: if pair.dex_id.is_empty() {
                        "unknown".to_string()
                    } else {
                        pair.dex_id.clone()
                    },
                },
            })
        }))
    }

    async fn from_exchange(&self, symbol: &str) -> CoreResult<Option<PriceQuote>> {
        let instrument = format!("{}-{}", symbol, self.config.stablecoin_symbol);
        let url = format!("{}{}", self.config.price_api_url, instrument);
        debug!("GET {}", url);
        let body = self.http.fetch_text(&url).await?;
        let response: TickerResponse = serde_json::from_str(&body)?;

        if response.code != "0" {
            debug!("Exchange ticker answered code {}", response.code);
            return Ok(None);
        }
        Ok(response
            .data
            .first()
            .and_then(|ticker| parse_price(ticker.last.as_deref()))
            .map(|price| PriceQuote {
                price,
                source: QuoteSource::Exchange { instrument },
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::SYMBOL_SELECTOR;
    use crate::test_support::{string_return, MockHttp, MockRpc};
    use std::rc::Rc;

    const TOKEN: &str = "0x327753b71f11df3d6809b2436667475fab8c956e";
    const AGG: &str = "https://agg.test/tokens/";
    const EXCH: &str = "https://exch.test/ticker?instId=";

    fn config() -> PriceSourceConfig {
        PriceSourceConfig {
            aggregator_api_url: AGG.to_string(),
            price_api_url: EXCH.to_string(),
            preferred_dex_ids: vec!["pancakeswap".to_string(), "pancakeswap_v2".to_string()],
            stablecoin_symbol: "USDT".to_string(),
            stablecoin_address: "0x55d398326f99059ff775485246999027b3197955".to_string(),
        }
    }

    fn agg_url() -> String {
        format!("{}{}", AGG, TOKEN)
    }

    fn reader(rpc: MockRpc) -> BalanceReader<MockRpc> {
        BalanceReader::new(rpc, TOKEN.to_string(), 18)
    }

    #[tokio::test]
    async fn test_preferred_exchange_wins_over_order() {
        let body = r#"{"pairs":[
            {"dexId":"biswap","quoteToken":{"symbol":"USDT","address":"0x55d398326f99059ff775485246999027b3197955"},"priceUsd":"0.5"},
            {"dexId":"pancakeswap","quoteToken":{"symbol":"WBNB","address":"0xbb4cdb9cbd36b01bd1cbaebf2de08d9173bc095c"},"priceUsd":"9.0"},
            {"dexId":"pancakeswap_v2","quoteToken":{"symbol":"BSC-USD","address":"0x55D398326f99059fF775485246999027B3197955"},"priceUsd":"0.42"},
            {"dexId":"pancakeswap","quoteToken":{"symbol":"USDT","address":"0x55d398326f99059ff775485246999027b3197955"},"priceUsd":"0.41"}
        ]}"#;
        let resolver = PriceResolver::new(MockHttp::new().with_response(&agg_url(), body), config());

        let quote = resolver.resolve(&reader(MockRpc::new())).await.unwrap();
        assert_eq!(quote.price, 0.42);
        assert_eq!(quote.source, QuoteSource::Aggregator { dex_id: "pancakeswap_v2".to_string() });
    }

    #[tokio::test]
    async fn test_any_stable_pair_when_no_preferred_exchange() {
        let body = r#"{"pairs":[
            {"dexId":"uniswap","quoteToken":{"symbol":"WETH","address":"0x1"},"priceUsd":"3.0"},
            {"dexId":"biswap","quoteToken":{"symbol":"USDT","address":"0x2"},"priceUsd":"0.5"},
            {"dexId":"apeswap","quoteToken":{"symbol":"USDT","address":"0x3"},"priceUsd":"0.6"}
        ]}"#;
        let http = MockHttp::new().with_response(&agg_url(), body);
        let resolver = PriceResolver::new(http, config());
        let rpc = Rc::new(MockRpc::new().with_symbol(string_return("TKN")));

        let quote = resolver.resolve(&BalanceReader::new(rpc.clone(), TOKEN.to_string(), 18)).await.unwrap();
        assert_eq!(quote.price, 0.5);
        assert!(!resolver.http.requested(EXCH));
        assert_eq!(rpc.calls_to(SYMBOL_SELECTOR), 0);
    }

    #[tokio::test]
    async fn test_falls_back_to_exchange_with_symbol() {
        let body = r#"{"pairs":[{"dexId":"pancakeswap","quoteToken":{"symbol":"WBNB","address":"0x1"},"priceUsd":"1.0"}]}"#;
        let ticker = r#"{"code":"0","msg":"","data":[{"instId":"TKN-USDT","last":"0.0123"}]}"#;
        let http = MockHttp::new()
            .with_response(&agg_url(), body)
            .with_response(&format!("{}TKN-USDT", EXCH), ticker);
        let resolver = PriceResolver::new(http, config());
        let rpc = Rc::new(MockRpc::new().with_symbol(string_return("TKN")));

        let quote = resolver.resolve(&BalanceReader::new(rpc.clone(), TOKEN.to_string(), 18)).await.unwrap();
        assert_eq!(quote.price, 0.0123);
        assert_eq!(rpc.calls_to(SYMBOL_SELECTOR), 1);
        assert_eq!(quote.source, QuoteSource::Exchange { instrument: "TKN-USDT".to_string() });
    }

    #[tokio::test]
    async fn test_symbol_failure_skips_exchange() {
        let body = r#"{"pairs":[]}"#;
        let http = MockHttp::new().with_response(&agg_url(), body);
        let resolver = PriceResolver::new(http, config());

        let result = resolver.resolve(&reader(MockRpc::new())).await;
        assert!(matches!(result, Err(CoreError::QuoteUnavailable)));
        assert_eq!(resolver.http.requests(), vec![agg_url()]);
    }

    #[tokio::test]
    async fn test_transport_errors_are_tier_failures() {
        // Neither URL is scripted, so both tiers see an HTTP error
        let resolver = PriceResolver::new(MockHttp::new(), config());
        let rpc = MockRpc::new().with_symbol(string_return("TKN"));

        let result = resolver.resolve(&reader(rpc)).await;
        assert!(matches!(result, Err(CoreError::QuoteUnavailable)));
        assert_eq!(resolver.http.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_rejects_unusable_prices() {
        let body = r#"{"pairs":[{"dexId":"pancakeswap","quoteToken":{"symbol":"USDT","address":"0x1"},"priceUsd":"0"}]}"#;
        let ticker = r#"{"code":"0","data":[{"last":"NaN"}]}"#;
        let http = MockHttp::new()
            .with_response(&agg_url(), body)
            .with_response(&format!("{}TKN-USDT", EXCH), ticker);
        let resolver = PriceResolver::new(http, config());
        let rpc = MockRpc::new().with_symbol(string_return("TKN"));

        assert!(matches!(
            resolver.resolve(&reader(rpc)).await,
            Err(CoreError::QuoteUnavailable)
        ));
    }

    #[tokio::test]
    async fn test_exchange_error_code_and_null_pairs() {
        let http = MockHttp::new()
            .with_response(&agg_url(), r#"{"schemaVersion":"1.0.0","pairs":null}"#)
            .with_response(&format!("{}TKN-USDT", EXCH), r#"{"code":"51001","msg":"Instrument ID does not exist","data":[]}"#);
        let resolver = PriceResolver::new(http, config());
        let rpc = MockRpc::new().with_symbol(string_return("TKN"));

        assert!(matches!(
            resolver.resolve(&reader(rpc)).await,
            Err(CoreError::QuoteUnavailable)
        ));
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price(Some("1.5")), Some(1.5));
        assert_eq!(parse_price(Some(" 2 ")), Some(2.0));
        assert_eq!(parse_price(Some("-1")), None);
        assert_eq!(parse_price(Some("inf")), None);
        assert_eq!(parse_price(Some("abc")), None);
        assert_eq!(parse_price(None), None);
    }
}

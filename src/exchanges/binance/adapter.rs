use async_trait::async_trait;
use reqwest::Client;
use std::collections::BTreeSet;
use tracing::{debug, info};

use super::parser::{BinanceP2pParser, SearchRequest, SearchResponse};
use crate::domain::quote::reduce_both;
use crate::exchanges::http::{with_retries, HttpSettings};
use crate::exchanges::SourceAdapter;
use crate::shared::errors::{AdapterError, AppError};
use crate::shared::types::{BestQuotes, Direction, Observation};

const SEARCH_PATH: &str = "/bapi/c2c/v2/friendly/c2c/adv/search";

/// Binance P2P advertisement search
pub struct BinanceP2pAdapter {
    name: String,
    asset: String,
    currencies: BTreeSet<String>,
    pages: u32,
    rows: u32,
    settings: HttpSettings,
    http: Client,
    parser: BinanceP2pParser,
}

impl BinanceP2pAdapter {
    pub fn new(
        name: String,
        asset: String,
        currencies: BTreeSet<String>,
        pages: u32,
        rows: u32,
        settings: HttpSettings,
    ) -> Result<Self, AppError> {
        let http = settings.build_client()?;
        Ok(Self {
            name,
            asset,
            currencies,
            pages: pages.max(1),
            rows: rows.max(1),
            settings,
            http,
            parser: BinanceP2pParser,
        })
    }

    async fn fetch_side(&self, currency: &str, direction: Direction) -> Result<Vec<Observation>, AdapterError> {
        let url = format!("{}{}", self.settings.base_url.trim_end_matches('/'), SEARCH_PATH);
        let label = format!("{} {} {}", self.name, currency, direction);
        let mut observations = Vec::new();

        for page in 1..=self.pages {
            let request = SearchRequest {
                page,
                rows: self.rows,
                pay_types: Vec::new(),
                asset: &self.asset,
                fiat: currency,
                trade_type: BinanceP2pParser::trade_type(direction),
            };

            let http = &self.http;
            let url = url.as_str();
            let request = &request;
            let response = with_retries(&label, self.settings.retries, self.settings.retry_backoff, move || async move {
                let resp = http.post(url).json(request).send().await?.error_for_status()?;
                resp.json::<SearchResponse>().await.map_err(AdapterError::from)
            })
            .await?;

            // a short page ends the listing, even if some of its ads had no usable price
            let entries = response.data.as_ref().map_or(0, Vec::len);
            let batch = self.parser.parse_observations(response)?;
            debug!("{} page {}: {} advertisements, {} usable", label, page, entries, batch.len());

            let last_page = entries < self.rows as usize;
            observations.extend(batch);
            if last_page {
                break;
            }
        }

        Ok(observations)
    }
}

#[async_trait]
impl SourceAdapter for BinanceP2pAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn supported_currencies(&self) -> &BTreeSet<String> {
        &self.currencies
    }

    async fn fetch_best_quotes(&self, currency: &str) -> Result<BestQuotes, AdapterError> {
        if !self.supports(currency) {
            return Err(AdapterError::UnsupportedCurrency(currency.to_string()));
        }

        let buys = self.fetch_side(currency, Direction::Buy).await?;
        let sells = self.fetch_side(currency, Direction::Sell).await?;
        info!(
            "{} {}: {} buy / {} sell advertisements",
            self.name,
            currency,
            buys.len(),
            sells.len()
        );

        Ok(reduce_both(&self.name, currency, &buys, &sells))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::{json, Value};
    use std::net::SocketAddr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    /// Read one HTTP request and return its JSON body
    async fn read_request(stream: &mut TcpStream) -> Value {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        let header_end = loop {
            let n = stream.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before headers");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let headers = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
        let length: usize = headers
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .map(|v| v.trim().parse().unwrap())
            .unwrap_or(0);
        while buf.len() < header_end + length {
            let n = stream.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before body");
            buf.extend_from_slice(&chunk[..n]);
        }
        serde_json::from_slice(&buf[header_end..header_end + length]).unwrap()
    }

    /// Local search endpoint answering each request with `pages[page - 1]`
    async fn serve_pages(pages: Vec<Value>) -> (SocketAddr, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();

        tokio::spawn(async move {
            loop {
                let (mut stream, _) = listener.accept().await.unwrap();
                let request = read_request(&mut stream).await;
                counter.fetch_add(1, Ordering::SeqCst);

                let page = request["page"].as_u64().unwrap() as usize;
                let data = pages.get(page - 1).cloned().unwrap_or_else(|| json!([]));
                let body = json!({"code": "000000", "success": true, "data": data}).to_string();
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                stream.write_all(response.as_bytes()).await.unwrap();
                stream.shutdown().await.ok();
            }
        });

        (addr, hits)
    }

    fn adapter(addr: SocketAddr, pages: u32, rows: u32) -> BinanceP2pAdapter {
        BinanceP2pAdapter::new(
            "Binance".to_string(),
            "USDT".to_string(),
            BTreeSet::from(["NGN".to_string()]),
            pages,
            rows,
            HttpSettings {
                base_url: format!("http://{}", addr),
                timeout: Duration::from_secs(5),
                retries: 0,
                retry_backoff: Duration::from_millis(1),
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_full_page_with_priceless_ad_keeps_paging() {
        let (addr, hits) = serve_pages(vec![
            json!([
                {"adv": {"price": "100"}, "advertiser": {"nickName": "p1"}},
                {"adv": {}, "advertiser": {"nickName": "no-price"}}
            ]),
            json!([{"adv": {"price": "90"}, "advertiser": {"nickName": "p2"}}]),
        ])
        .await;

        let quotes = adapter(addr, 2, 2).fetch_best_quotes("NGN").await.unwrap();

        // two pages for each side
        assert_eq!(hits.load(Ordering::SeqCst), 4);
        let buy = quotes.buy.unwrap();
        assert_eq!(buy.local_price, dec!(90));
        assert_eq!(buy.merchant, "p2");
        let sell = quotes.sell.unwrap();
        assert_eq!(sell.local_price, dec!(100));
        assert_eq!(sell.merchant, "p1");
    }

    #[tokio::test]
    async fn test_short_page_stops_paging() {
        let (addr, hits) = serve_pages(vec![
            json!([{"adv": {"price": "100"}, "advertiser": {"nickName": "p1"}}]),
            json!([{"adv": {"price": "90"}, "advertiser": {"nickName": "p2"}}]),
        ])
        .await;

        let quotes = adapter(addr, 3, 2).fetch_best_quotes("NGN").await.unwrap();

        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert_eq!(quotes.buy.unwrap().local_price, dec!(100));
    }

    #[tokio::test]
    async fn test_unsupported_currency_makes_no_request() {
        let (addr, hits) = serve_pages(vec![]).await;
        let err = adapter(addr, 1, 2).fetch_best_quotes("KES").await.unwrap_err();

        assert!(matches!(err, AdapterError::UnsupportedCurrency(c) if c == "KES"));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }
}

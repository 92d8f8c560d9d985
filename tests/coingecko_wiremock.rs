use anyhow::Result;
use networth::prices::{CoinGeckoPriceSource, CryptoPriceSource};
use rust_decimal::Decimal;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

#[tokio::test]
async fn coingecko_fetch_quotes_hits_mock_server() -> Result<()> {
    let server = MockServer::start().await;
    let provider = CoinGeckoPriceSource::new().with_base_url(server.uri());

    let body = r#"{
        "bitcoin": {"usd": 42000.0},
        "ethereum": {"usd": 2534.891}
    }"#;

    Mock::given(method("GET"))
        .and(path("/simple/price"))
        .and(query_param("ids", "bitcoin,ethereum,unknown-coin"))
        .and(query_param("vs_currencies", "usd"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
        .mount(&server)
        .await;

    let prices = provider
        .fetch_quotes(&[
            "bitcoin".to_string(),
            "ethereum".to_string(),
            "unknown-coin".to_string(),
        ])
        .await?;

    assert_eq!(prices.len(), 2, "ids the API doesn't know are omitted");
    assert_eq!(prices["bitcoin"], dec("42000.00"));
    assert_eq!(prices["ethereum"], dec("2534.89"));

    Ok(())
}

#[tokio::test]
async fn coingecko_respects_quote_currency() -> Result<()> {
    let server = MockServer::start().await;
    let provider = CoinGeckoPriceSource::new()
        .with_base_url(server.uri())
        .with_quote_currency("EUR");

    Mock::given(method("GET"))
        .and(path("/simple/price"))
        .and(query_param("vs_currencies", "eur"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"bitcoin": {"eur": 39000.5}}"#, "application/json"),
        )
        .mount(&server)
        .await;

    let prices = provider.fetch_quotes(&["bitcoin".to_string()]).await?;
    assert_eq!(prices["bitcoin"], dec("39000.50"));

    Ok(())
}

#[tokio::test]
async fn coingecko_empty_input_makes_no_requests() -> Result<()> {
    let server = MockServer::start().await;
    let provider = CoinGeckoPriceSource::new().with_base_url(server.uri());

    let prices = provider.fetch_quotes(&[]).await?;
    assert!(prices.is_empty());

    let requests = server.received_requests().await.unwrap_or_default();
    assert!(requests.is_empty(), "expected no HTTP requests");

    Ok(())
}

#[tokio::test]
async fn coingecko_rate_limit_is_an_error() {
    let server = MockServer::start().await;
    let provider = CoinGeckoPriceSource::new().with_base_url(server.uri());

    Mock::given(method("GET"))
        .and(path("/simple/price"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let err = provider
        .fetch_quotes(&["bitcoin".to_string()])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("429"), "unexpected error: {err}");
}

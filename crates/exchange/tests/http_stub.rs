//! Order client tests against a stubbed HTTP backend.
//!
//! These cover the transport/status/schema error distinctions and verify
//! that dry-run mode never reaches the network.

use httpmock::prelude::*;

use common::{BinanceConfig, CryptorgConfig, Error, OrderClient};
use exchange::{BinanceClient, CryptorgClient};

fn cryptorg_config(dry_run: bool) -> CryptorgConfig {
    CryptorgConfig {
        access_id: "acc".into(),
        api_key: "key".into(),
        secret: "sec".into(),
        testnet: false,
        dry_run,
    }
}

fn binance_config(dry_run: bool) -> BinanceConfig {
    BinanceConfig {
        api_key: "key".into(),
        secret: "sec".into(),
        testnet: false,
        dry_run,
    }
}

#[tokio::test]
async fn market_buy_returns_order_id_from_backend() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/orders")
            .header("X-Access-ID", "acc")
            .header("X-API-Key", "key")
            .json_body(serde_json::json!({
                "symbol": "BTCUSDT",
                "side": "BUY",
                "type": "MARKET",
                "quantity": 0.01,
            }));
        then.status(200).body(r#"{"id":"abc123"}"#);
    });

    let client = CryptorgClient::with_base_url(cryptorg_config(false), server.base_url());
    let id = client.place_market_buy("BTCUSDT", 0.01).await.unwrap();

    assert_eq!(id, "abc123");
    mock.assert();
}

#[tokio::test]
async fn limit_sell_sends_price_in_payload() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/orders")
            .json_body(serde_json::json!({
                "symbol": "ETHUSDT",
                "side": "SELL",
                "type": "LIMIT",
                "quantity": 1.5,
                "price": 2000.0,
            }));
        then.status(200).body(r#"{"id":"sell-1"}"#);
    });

    let client = CryptorgClient::with_base_url(cryptorg_config(false), server.base_url());
    let id = client
        .place_limit_sell("ETHUSDT", 1.5, 2000.0)
        .await
        .unwrap();

    assert_eq!(id, "sell-1");
    mock.assert();
}

#[tokio::test]
async fn success_without_order_id_is_a_schema_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/orders");
        then.status(200).body("{}");
    });

    let client = CryptorgClient::with_base_url(cryptorg_config(false), server.base_url());
    let err = client.place_market_buy("BTCUSDT", 0.01).await.unwrap_err();

    assert!(matches!(err, Error::MissingOrderId), "got: {err}");
}

#[tokio::test]
async fn backend_rejection_surfaces_status_and_body() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/orders");
        then.status(400).body(r#"{"error":"insufficient funds"}"#);
    });

    let client = CryptorgClient::with_base_url(cryptorg_config(false), server.base_url());
    let err = client
        .place_limit_sell("BTCUSDT", 0.01, 95_000.0)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Status { status: 400, .. }), "got: {err}");
    let msg = err.to_string();
    assert!(msg.contains("400"), "message should carry the status: {msg}");
    assert!(
        msg.contains("insufficient funds"),
        "message should carry the raw body: {msg}"
    );
}

#[tokio::test]
async fn cancel_issues_delete_and_discards_body() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(DELETE)
            .path("/orders/abc123")
            .header("X-Access-ID", "acc")
            .header("X-API-Key", "key");
        then.status(200).body(r#"{"status":"CANCELED"}"#);
    });

    let client = CryptorgClient::with_base_url(cryptorg_config(false), server.base_url());
    client.cancel_order("abc123").await.unwrap();

    mock.assert();
}

#[tokio::test]
async fn cancel_propagates_status_errors() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(DELETE).path("/orders/gone");
        then.status(404).body(r#"{"error":"unknown order"}"#);
    });

    let client = CryptorgClient::with_base_url(cryptorg_config(false), server.base_url());
    let err = client.cancel_order("gone").await.unwrap_err();

    assert!(matches!(err, Error::Status { status: 404, .. }), "got: {err}");
}

#[tokio::test]
async fn dry_run_never_touches_the_backend() {
    let server = MockServer::start();
    let place = server.mock(|when, then| {
        when.method(POST).path("/orders");
        then.status(200).body(r#"{"id":"real-id"}"#);
    });
    let cancel = server.mock(|when, then| {
        when.method(DELETE).path("/orders/dry-order-id");
        then.status(200).body("{}");
    });

    let client = CryptorgClient::with_base_url(cryptorg_config(true), server.base_url());

    let buy = client.place_market_buy("BTCUSDT", 0.01).await.unwrap();
    let sell = client
        .place_limit_sell("BTCUSDT", 0.01, 95_000.0)
        .await
        .unwrap();
    client.cancel_order("dry-order-id").await.unwrap();

    assert_eq!(buy, "dry-order-id");
    assert_eq!(sell, "dry-order-id");
    place.assert_hits(0);
    cancel.assert_hits(0);
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    // Discard port; nothing listens there, so the connection is refused.
    let client =
        CryptorgClient::with_base_url(cryptorg_config(false), "http://127.0.0.1:9");
    let err = client.place_market_buy("BTCUSDT", 0.01).await.unwrap_err();

    assert!(matches!(err, Error::Transport(_)), "got: {err}");
}

#[tokio::test]
async fn binance_placement_returns_composite_id() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/v3/order")
            .header("X-MBX-APIKEY", "key")
            .body_contains("symbol=BTCUSDT")
            .body_contains("side=BUY")
            .body_contains("type=MARKET")
            .body_contains("signature=");
        then.status(200).body(
            r#"{"symbol":"BTCUSDT","orderId":42,"clientOrderId":"my-cid",
                "transactTime":1700000000000,"status":"FILLED","fills":[]}"#,
        );
    });

    let client = BinanceClient::with_base_url(binance_config(false), server.base_url());
    let id = client.place_market_buy("BTCUSDT", 0.01).await.unwrap();

    assert_eq!(id, "BTCUSDT/my-cid");
    mock.assert();
}

#[tokio::test]
async fn binance_success_without_client_order_id_is_a_schema_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/v3/order");
        then.status(200).body("{}");
    });

    let client = BinanceClient::with_base_url(binance_config(false), server.base_url());
    let err = client.place_market_buy("BTCUSDT", 0.01).await.unwrap_err();

    assert!(matches!(err, Error::MissingOrderId), "got: {err}");
}

#[tokio::test]
async fn binance_unparsable_success_body_is_a_serialization_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/v3/order");
        then.status(200).body("not json");
    });

    let client = BinanceClient::with_base_url(binance_config(false), server.base_url());
    let err = client.place_market_buy("BTCUSDT", 0.01).await.unwrap_err();

    assert!(matches!(err, Error::Serialization(_)), "got: {err}");
}

#[tokio::test]
async fn binance_cancel_splits_composite_id_into_params() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(DELETE)
            .path("/api/v3/order")
            .query_param("symbol", "BTCUSDT")
            .query_param("origClientOrderId", "my-cid");
        then.status(200).body(r#"{"status":"CANCELED"}"#);
    });

    let client = BinanceClient::with_base_url(binance_config(false), server.base_url());
    client.cancel_order("BTCUSDT/my-cid").await.unwrap();

    mock.assert();
}

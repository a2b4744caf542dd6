//! Router-level tests: envelope shapes, error statuses, and the admission
//! path through the HTTP surface.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use tokio::sync::RwLock;
use tower::ServiceExt;

use braid_api::{router, ApiContext};
use braid_core::transaction::signing_preimage;
use braid_crypto::KeyPair;
use braid_state::{ChainConfig, ChainEngine};
use braid_sync::PeerClient;

const API_NAME: &str = "braidnet";

fn context_with_genesis(genesis: &KeyPair) -> Arc<ApiContext> {
    let engine = ChainEngine::new(ChainConfig::new(genesis.public_key.clone()));
    Arc::new(ApiContext {
        chain: RwLock::new(engine),
        peers: PeerClient::new(API_NAME).expect("client"),
        own_url: "http://localhost:8000/".into(),
    })
}

fn json_request(method: &str, path: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn balance_endpoint_reports_genesis_endowment() {
    let genesis = KeyPair::generate();
    let app = router(context_with_genesis(&genesis), API_NAME);

    let request = json_request(
        "POST",
        &format!("/api/v1/{API_NAME}/wallets/balance/"),
        serde_json::json!({ "public_key": genesis.public_key.as_str() }),
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["message"], "Wallet balance.");
    assert_eq!(body["data"], 1000.0);
}

#[tokio::test]
async fn unknown_block_is_a_404_with_detail() {
    let genesis = KeyPair::generate();
    let app = router(context_with_genesis(&genesis), API_NAME);

    let request = Request::builder()
        .uri(format!("/api/v1/{API_NAME}/block/deadbeef/"))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_json(response).await;
    assert_eq!(body["detail"], "Block not found.");
}

#[tokio::test]
async fn non_http_neighbor_url_is_a_400() {
    let genesis = KeyPair::generate();
    let app = router(context_with_genesis(&genesis), API_NAME);

    let request = json_request(
        "POST",
        &format!("/api/v1/{API_NAME}/nodes/connect/"),
        serde_json::json!({ "address_url": "ftp://not-a-peer/" }),
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["detail"], "Invalid neighbor URL.");
}

#[tokio::test]
async fn posted_transaction_is_stamped_and_pooled() {
    let genesis = KeyPair::generate();
    let recipient = KeyPair::generate();
    let context = context_with_genesis(&genesis);
    let app = router(context.clone(), API_NAME);

    let preimage = signing_preimage(&genesis.public_key, &recipient.public_key, 1000, 1);
    let signature = genesis.sign(&preimage).unwrap();

    let request = json_request(
        "POST",
        &format!("/api/v1/{API_NAME}/transactions/post/"),
        serde_json::json!({
            "sender": genesis.public_key.as_str(),
            "recipient": recipient.public_key.as_str(),
            "amount": 1000,
            "nonce": 1,
            "signature": signature.as_str(),
        }),
    );
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["message"], "Transaction posted.");
    assert!(body["data"]["timestamp"].is_string());

    let request = Request::builder()
        .uri(format!("/api/v1/{API_NAME}/transactions/unconfirmed/"))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn bad_submission_is_a_400_but_gossip_is_silent() {
    let genesis = KeyPair::generate();
    let stranger = KeyPair::generate();
    let context = context_with_genesis(&genesis);
    let app = router(context, API_NAME);

    let preimage = signing_preimage(&stranger.public_key, &genesis.public_key, 10, 1);
    let signature = stranger.sign(&preimage).unwrap();
    let tx_body = serde_json::json!({
        "sender": stranger.public_key.as_str(),
        "recipient": genesis.public_key.as_str(),
        "amount": 10,
        "nonce": 1,
        "signature": signature.as_str(),
    });

    // Wallet-facing endpoint: the rejection surfaces as a 400.
    let request = json_request(
        "POST",
        &format!("/api/v1/{API_NAME}/transactions/post/"),
        tx_body.clone(),
    );
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Gossip endpoint: same payload, silently dropped.
    let request = json_request(
        "POST",
        &format!("/api/v1/{API_NAME}/nodes/transaction/"),
        tx_body,
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn dag_export_has_node_link_shape() {
    let genesis = KeyPair::generate();
    let app = router(context_with_genesis(&genesis), API_NAME);

    let request = Request::builder()
        .uri(format!("/api/v1/{API_NAME}/dag/"))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let body = body_json(response).await;

    assert_eq!(body["data"]["directed"], true);
    assert_eq!(body["data"]["multigraph"], false);
    assert!(body["data"]["nodes"].as_array().unwrap().is_empty());
    assert!(body["data"]["links"].as_array().unwrap().is_empty());
}

use anyhow::Result;
use httpmock::prelude::*;
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

mod common;

#[tokio::test]
async fn expense_message_is_stored_and_confirmed() -> Result<()> {
    let mock = MockServer::start_async().await;
    let storage = mock
        .mock_async(|when, then| {
            when.method(POST)
                .path("/rest/v1/expenses")
                .header("apikey", "service-key")
                .json_body(json!({
                    "user_id": "321",
                    "category_name": "кофе",
                    "amount_krw": 4800,
                    "merchant": null,
                }));
            then.status(201)
                .header("content-type", "application/json")
                .json_body(json!([{"id": 1}]));
        })
        .await;
    let reply_path = format!("/bot{}/sendMessage", common::TOKEN);
    let reply = mock
        .mock_async(move |when, then| {
            when.method(POST)
                .path(reply_path.as_str())
                .json_body(json!({"chat_id": 555, "text": "💸 кофе: −4800₩ записано."}));
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"ok": true, "result": {"message_id": 1}}));
        })
        .await;

    let server = common::start_server(common::config_for(&mock.base_url(), true)).await?;
    let response = Client::new()
        .post(server.webhook_url(common::SECRET))
        .json(&common::text_update(1, "Кофе 4800"))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body, json!({"ok": true}));

    storage.assert_async().await;
    reply.assert_async().await;
    server.stop().await;
    Ok(())
}

#[tokio::test]
async fn storage_outage_still_confirms_intake() -> Result<()> {
    let mock = MockServer::start_async().await;
    let storage = mock
        .mock_async(|when, then| {
            when.method(POST).path("/rest/v1/intake");
            then.status(503).body("upstream unavailable");
        })
        .await;
    let reply_path = format!("/bot{}/sendMessage", common::TOKEN);
    let reply = mock
        .mock_async(move |when, then| {
            when.method(POST)
                .path(reply_path.as_str())
                .json_body(json!({"chat_id": 555, "text": "🍽️ яйца 2.0шт — записано."}));
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"ok": true, "result": {"message_id": 2}}));
        })
        .await;

    let server = common::start_server(common::config_for(&mock.base_url(), true)).await?;
    let response = Client::new()
        .post(server.webhook_url(common::SECRET))
        .json(&common::text_update(2, "яйца 2шт"))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    storage.assert_hits_async(1).await;
    reply.assert_hits_async(1).await;
    server.stop().await;
    Ok(())
}

#[tokio::test]
async fn unconfigured_storage_never_calls_backend() -> Result<()> {
    let mock = MockServer::start_async().await;
    let storage = mock
        .mock_async(|when, then| {
            when.method(POST).path_contains("/rest/v1/");
            then.status(201);
        })
        .await;
    let reply_path = format!("/bot{}/sendMessage", common::TOKEN);
    let reply = mock
        .mock_async(move |when, then| {
            when.method(POST).path(reply_path.as_str());
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"ok": true, "result": {"message_id": 3}}));
        })
        .await;

    let server = common::start_server(common::config_for(&mock.base_url(), false)).await?;
    let response = Client::new()
        .post(server.webhook_url(common::SECRET))
        .json(&common::text_update(3, "такси 1500 аэропорт"))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    storage.assert_hits_async(0).await;
    reply.assert_hits_async(1).await;
    server.stop().await;
    Ok(())
}

#[tokio::test]
async fn product_form_failure_is_reported_to_user() -> Result<()> {
    let mock = MockServer::start_async().await;
    let storage = mock
        .mock_async(|when, then| {
            when.method(POST)
                .path("/rest/v1/products")
                .json_body_partial(r#"{"name": "Тофу", "base_unit": "г", "image_url": null}"#);
            then.status(409)
                .header("content-type", "application/json")
                .json_body(json!({"code": "23505", "message": "duplicate key"}));
        })
        .await;
    let reply_path = format!("/bot{}/sendMessage", common::TOKEN);
    let reply = mock
        .mock_async(move |when, then| {
            when.method(POST)
                .path(reply_path.as_str())
                .body_contains("duplicate key");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"ok": true, "result": {"message_id": 4}}));
        })
        .await;

    let server = common::start_server(common::config_for(&mock.base_url(), true)).await?;
    let form = json!({"name": "Тофу", "base_unit": "г", "kcal_per_100g": 76});
    let response = Client::new()
        .post(server.webhook_url(common::SECRET))
        .json(&common::form_update(4, &form))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    storage.assert_async().await;
    reply.assert_async().await;
    server.stop().await;
    Ok(())
}

#[tokio::test]
async fn forbidden_secret_has_no_side_effects() -> Result<()> {
    let mock = MockServer::start_async().await;
    let any_call = mock
        .mock_async(|when, then| {
            when.method(POST);
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"ok": true}));
        })
        .await;

    let server = common::start_server(common::config_for(&mock.base_url(), true)).await?;
    let response = Client::new()
        .post(server.webhook_url("guess"))
        .json(&common::text_update(5, "еда 999 ресторан"))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    any_call.assert_hits_async(0).await;
    server.stop().await;
    Ok(())
}

#![allow(clippy::unwrap_used, clippy::panic, clippy::missing_panics_doc, clippy::must_use_candidate, missing_debug_implementations, clippy::clone_on_ref_ptr, unreachable_pub, clippy::print_stderr)]
use reqwest::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;

mod common;

#[tokio::test]
async fn test_route_distance_is_computed_server_side() {
    let app = common::TestApp::spawn().await;
    let (token, _) = app.register_user().await;

    let jfk = app.create_airport(&token, "JFK", "US", 40.6413, -73.7781).await;
    let lhr = app.create_airport(&token, "LHR", "GB", 51.4700, -0.4543).await;
    let airline = app.create_airline(&token, "Transatlantic", "US", &[&jfk, &lhr]).await;

    // A client-supplied distance is ignored.
    let resp = app
        .client
        .post(app.url("/routes"))
        .bearer_auth(&token)
        .json(&json!({
            "fromAirportId": jfk["id"],
            "toAirportId": lhr["id"],
            "airlineId": airline["id"],
            "distanceKm": 1,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let route: Value = resp.json().await.unwrap();
    assert_eq!(route["distanceKm"], 5540);
    assert_eq!(route["fromAirportId"], jfk["id"]);
    assert_eq!(route["toAirportId"], lhr["id"]);
}

#[tokio::test]
async fn test_route_with_missing_airport_or_airline() {
    let app = common::TestApp::spawn().await;
    let (token, _) = app.register_user().await;

    let a = app.create_airport(&token, "A", "US", 0.0, 0.0).await;
    let airline = app.create_airline(&token, "Solo", "US", &[&a]).await;

    let resp = app
        .client
        .post(app.url("/routes"))
        .bearer_auth(&token)
        .json(&json!({ "fromAirportId": a["id"], "toAirportId": Uuid::new_v4(), "airlineId": airline["id"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Could not find one or both airports");

    let resp = app
        .client
        .post(app.url("/routes"))
        .bearer_auth(&token)
        .json(&json!({ "fromAirportId": a["id"], "toAirportId": a["id"], "airlineId": Uuid::new_v4() }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Airline not found");
}

#[tokio::test]
async fn test_route_update_recomputes_distance() {
    let app = common::TestApp::spawn().await;
    let (token, _) = app.register_user().await;

    let jfk = app.create_airport(&token, "JFK", "US", 40.6413, -73.7781).await;
    let lhr = app.create_airport(&token, "LHR", "GB", 51.4700, -0.4543).await;
    let same_spot = app.create_airport(&token, "JFK Twin", "US", 40.6413, -73.7781).await;
    let airline = app.create_airline(&token, "Transatlantic", "US", &[&jfk, &lhr, &same_spot]).await;
    let route = app.create_route(&token, &jfk, &lhr, &airline).await;
    let id = route["id"].as_str().unwrap();

    let resp = app
        .client
        .patch(app.url(&format!("/routes/{id}")))
        .bearer_auth(&token)
        .json(&json!({ "toAirportId": same_spot["id"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["toAirportId"], same_spot["id"]);
    assert_eq!(updated["fromAirportId"], jfk["id"]);
    assert_eq!(updated["distanceKm"], 0);

    let resp = app
        .client
        .patch(app.url(&format!("/routes/{id}")))
        .bearer_auth(&token)
        .json(&json!({ "fromAirportId": Uuid::new_v4() }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = app
        .client
        .patch(app.url(&format!("/routes/{}", Uuid::new_v4())))
        .bearer_auth(&token)
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_route_list_filters_and_includes() {
    let app = common::TestApp::spawn().await;
    let (token, _) = app.register_user().await;

    let a = app.create_airport(&token, "Origin", "US", 0.0, 0.0).await;
    let b = app.create_airport(&token, "Dest One", "US", 0.0, 1.0).await;
    let c = app.create_airport(&token, "Dest Two", "US", 0.0, 2.0).await;
    let airline = app.create_airline(&token, "Hopper", "US", &[&a, &b, &c]).await;
    let near = app.create_route(&token, &a, &b, &airline).await;
    let far = app.create_route(&token, &a, &c, &airline).await;
    app.create_route(&token, &b, &c, &airline).await;

    let from = a["id"].as_str().unwrap();
    let resp = app
        .client
        .get(app.url_with(
            "/routes",
            &[("fromAirportId", from), ("sortBy", "distanceKm"), ("sortOrder", "desc"), ("include", "toAirport,airline")],
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let page: Value = resp.json().await.unwrap();
    assert_eq!(page["meta"]["total"], 2);
    assert_eq!(page["data"][0]["id"], far["id"]);
    assert_eq!(page["data"][1]["id"], near["id"]);
    assert_eq!(page["data"][0]["toAirport"]["name"], "Dest Two");
    assert_eq!(page["data"][0]["airline"]["id"], airline["id"]);
    assert!(page["data"][0].get("fromAirport").is_none());

    let resp = app
        .client
        .get(app.url_with("/routes", &[("fromAirportId", "not-a-uuid")]))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_route_delete() {
    let app = common::TestApp::spawn().await;
    let (token, _) = app.register_user().await;

    let a = app.create_airport(&token, "A", "US", 0.0, 0.0).await;
    let b = app.create_airport(&token, "B", "US", 1.0, 1.0).await;
    let airline = app.create_airline(&token, "Brief", "US", &[&a, &b]).await;
    let route = app.create_route(&token, &a, &b, &airline).await;
    let id = route["id"].as_str().unwrap();

    let resp = app.client.delete(app.url(&format!("/routes/{id}"))).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = app.client.delete(app.url(&format!("/routes/{id}"))).bearer_auth(&token).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let deleted: Value = resp.json().await.unwrap();
    assert_eq!(deleted["id"], route["id"]);

    let resp = app.client.get(app.url(&format!("/routes/{id}"))).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

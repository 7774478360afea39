#![allow(clippy::unwrap_used, clippy::panic, clippy::missing_panics_doc, clippy::must_use_candidate, missing_debug_implementations, clippy::clone_on_ref_ptr, unreachable_pub, clippy::print_stderr)]
use reqwest::StatusCode;
use serde_json::{Value, json};

mod common;

#[tokio::test]
async fn test_airport_crud() {
    let app = common::TestApp::spawn().await;
    let (token, _) = app.register_user().await;

    let airport = app.create_airport(&token, "John F. Kennedy", "US", 40.6413, -73.7781).await;
    let id = airport["id"].as_str().unwrap();
    assert_eq!(airport["name"], "John F. Kennedy");
    assert_eq!(airport["code"].as_str().unwrap().len(), 3);

    let resp = app.client.get(app.url(&format!("/airports/{id}"))).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: Value = resp.json().await.unwrap();
    assert_eq!(fetched["id"], airport["id"]);
    assert!(fetched.get("routesFrom").is_none(), "relations are only present when requested");

    let resp = app
        .client
        .patch(app.url(&format!("/airports/{id}")))
        .bearer_auth(&token)
        .json(&json!({ "name": "JFK International" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["name"], "JFK International");
    assert_eq!(updated["code"], airport["code"]);

    let resp = app.client.delete(app.url(&format!("/airports/{id}"))).bearer_auth(&token).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app.client.get(app.url(&format!("/airports/{id}"))).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = app.client.delete(app.url(&format!("/airports/{id}"))).bearer_auth(&token).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_airport_validation() {
    let app = common::TestApp::spawn().await;
    let (token, _) = app.register_user().await;

    let cases = [
        json!({ "name": "Nowhere", "code": "AB", "country": "US", "latitude": 0.0, "longitude": 0.0 }),
        json!({ "name": "Nowhere", "code": common::random_code(), "country": "US", "latitude": 91.0, "longitude": 0.0 }),
        json!({ "name": "Nowhere", "code": common::random_code(), "country": "US", "latitude": 0.0, "longitude": -181.0 }),
        json!({ "name": "  ", "code": common::random_code(), "country": "US", "latitude": 0.0, "longitude": 0.0 }),
    ];

    for body in cases {
        let resp = app.client.post(app.url("/airports")).bearer_auth(&token).json(&body).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "body: {body}");
    }
}

#[tokio::test]
async fn test_duplicate_code_conflicts() {
    let app = common::TestApp::spawn().await;
    let (token, _) = app.register_user().await;

    let airport = app.create_airport(&token, "Original", "US", 10.0, 10.0).await;
    let resp = app
        .client
        .post(app.url("/airports"))
        .bearer_auth(&token)
        .json(&json!({
            "name": "Copy",
            "code": airport["code"],
            "country": "US",
            "latitude": 11.0,
            "longitude": 11.0,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_list_filters_and_paginates() {
    let app = common::TestApp::spawn().await;
    let (token, _) = app.register_user().await;
    let country = format!("C-{}", common::run_id());

    for name in ["Charlie", "Alpha", "Bravo"] {
        app.create_airport(&token, name, &country, 0.0, 0.0).await;
    }

    let resp = app
        .client
        .get(app.url_with("/airports", &[("country", country.as_str()), ("limit", "2"), ("page", "1"), ("sortBy", "name"), ("sortOrder", "asc")]))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let page: Value = resp.json().await.unwrap();
    let names: Vec<&str> = page["data"].as_array().unwrap().iter().map(|a| a["name"].as_str().unwrap()).collect();
    assert_eq!(names, ["Alpha", "Bravo"]);
    assert_eq!(page["meta"]["total"], 3);
    assert_eq!(page["meta"]["page"], 1);
    assert_eq!(page["meta"]["limit"], 2);
    assert_eq!(page["meta"]["lastPage"], 2);

    let resp = app
        .client
        .get(app.url_with("/airports", &[("country", country.as_str()), ("limit", "2"), ("page", "2"), ("sortBy", "name"), ("sortOrder", "asc")]))
        .send()
        .await
        .unwrap();
    let page: Value = resp.json().await.unwrap();
    assert_eq!(page["data"].as_array().unwrap().len(), 1);
    assert_eq!(page["data"][0]["name"], "Charlie");

    let resp = app
        .client
        .get(app.url_with("/airports", &[("country", country.as_str()), ("search", "rav")]))
        .send()
        .await
        .unwrap();
    let page: Value = resp.json().await.unwrap();
    assert_eq!(page["meta"]["total"], 1);
    assert_eq!(page["data"][0]["name"], "Bravo");
}

#[tokio::test]
async fn test_list_rejects_unknown_sort() {
    let app = common::TestApp::spawn().await;

    let resp = app.client.get(app.url_with("/airports", &[("sortBy", "password")])).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_with_relations() {
    let app = common::TestApp::spawn().await;
    let (token, _) = app.register_user().await;

    let jfk = app.create_airport(&token, "JFK", "US", 40.6413, -73.7781).await;
    let lhr = app.create_airport(&token, "LHR", "GB", 51.4700, -0.4543).await;
    let airline = app.create_airline(&token, "Transatlantic", "US", &[&jfk, &lhr]).await;
    let route = app.create_route(&token, &jfk, &lhr, &airline).await;

    let resp = app
        .client
        .get(app.url_with(
            &format!("/airports/{}", jfk["id"].as_str().unwrap()),
            &[("include", "servicedByAirlines,routesFrom,routesTo")],
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();

    assert_eq!(body["servicedByAirlines"][0]["id"], airline["id"]);
    assert_eq!(body["routesFrom"][0]["id"], route["id"]);
    assert_eq!(body["routesFrom"][0]["toAirport"]["id"], lhr["id"]);
    assert_eq!(body["routesFrom"][0]["airline"]["id"], airline["id"]);
    assert_eq!(body["routesTo"], json!([]));
}

#[tokio::test]
async fn test_moving_airport_remeasures_routes() {
    let app = common::TestApp::spawn().await;
    let (token, _) = app.register_user().await;

    let jfk = app.create_airport(&token, "JFK", "US", 40.6413, -73.7781).await;
    let lhr = app.create_airport(&token, "LHR", "GB", 51.4700, -0.4543).await;
    let airline = app.create_airline(&token, "Transatlantic", "US", &[&jfk, &lhr]).await;
    let route = app.create_route(&token, &jfk, &lhr, &airline).await;
    assert_eq!(route["distanceKm"], 5540);

    let resp = app
        .client
        .patch(app.url(&format!("/airports/{}", lhr["id"].as_str().unwrap())))
        .bearer_auth(&token)
        .json(&json!({ "latitude": 40.6413, "longitude": -73.7781 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app.client.get(app.url(&format!("/routes/{}", route["id"].as_str().unwrap()))).send().await.unwrap();
    let route: Value = resp.json().await.unwrap();
    assert_eq!(route["distanceKm"], 0);
}

#[tokio::test]
async fn test_deleting_airport_cascades_to_routes() {
    let app = common::TestApp::spawn().await;
    let (token, _) = app.register_user().await;

    let a = app.create_airport(&token, "A", "US", 0.0, 0.0).await;
    let b = app.create_airport(&token, "B", "US", 1.0, 1.0).await;
    let airline = app.create_airline(&token, "Cascade Air", "US", &[&a, &b]).await;
    let route = app.create_route(&token, &a, &b, &airline).await;

    let resp = app
        .client
        .delete(app.url(&format!("/airports/{}", a["id"].as_str().unwrap())))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app.client.get(app.url(&format!("/routes/{}", route["id"].as_str().unwrap()))).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#![allow(clippy::unwrap_used, clippy::panic, clippy::missing_panics_doc, clippy::must_use_candidate, missing_debug_implementations, clippy::clone_on_ref_ptr, unreachable_pub, clippy::print_stderr)]
use reqwest::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;

mod common;

fn ids(values: &Value) -> Vec<&str> {
    let mut ids: Vec<&str> = values.as_array().unwrap().iter().map(|v| v["id"].as_str().unwrap()).collect();
    ids.sort_unstable();
    ids
}

#[tokio::test]
async fn test_airline_crud_with_serviced_airports() {
    let app = common::TestApp::spawn().await;
    let (token, _) = app.register_user().await;

    let jfk = app.create_airport(&token, "JFK", "US", 40.6413, -73.7781).await;
    let lhr = app.create_airport(&token, "LHR", "GB", 51.4700, -0.4543).await;
    let cdg = app.create_airport(&token, "CDG", "FR", 49.0097, 2.5479).await;

    let airline = app.create_airline(&token, "Oceanic", "US", &[&jfk, &lhr]).await;
    let id = airline["id"].as_str().unwrap();
    assert_eq!(airline["baseCountry"], "US");

    let resp = app
        .client
        .get(app.url_with(&format!("/airlines/{id}"), &[("include", "servicedAirports")]))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    let mut expected = vec![jfk["id"].as_str().unwrap(), lhr["id"].as_str().unwrap()];
    expected.sort_unstable();
    assert_eq!(ids(&body["servicedAirports"]), expected);
    assert!(body.get("operatedRoutes").is_none());

    // Supplying the list replaces the serviced set wholesale.
    let resp = app
        .client
        .patch(app.url(&format!("/airlines/{id}")))
        .bearer_auth(&token)
        .json(&json!({ "name": "Oceanic Airlines", "servicedAirportIds": [cdg["id"]] }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["name"], "Oceanic Airlines");

    let resp = app
        .client
        .get(app.url_with(&format!("/airlines/{id}"), &[("include", "servicedAirports")]))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(ids(&body["servicedAirports"]), vec![cdg["id"].as_str().unwrap()]);

    // Leaving the list out keeps the serviced set.
    let resp = app
        .client
        .patch(app.url(&format!("/airlines/{id}")))
        .bearer_auth(&token)
        .json(&json!({ "baseCountry": "NZ" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .client
        .get(app.url_with(&format!("/airlines/{id}"), &[("include", "servicedAirports")]))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["baseCountry"], "NZ");
    assert_eq!(ids(&body["servicedAirports"]), vec![cdg["id"].as_str().unwrap()]);

    let resp = app.client.delete(app.url(&format!("/airlines/{id}"))).bearer_auth(&token).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = app.client.get(app.url(&format!("/airlines/{id}"))).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_airline_requires_existing_airports() {
    let app = common::TestApp::spawn().await;
    let (token, _) = app.register_user().await;

    let resp = app
        .client
        .post(app.url("/airlines"))
        .bearer_auth(&token)
        .json(&json!({ "name": "Ghost Air", "baseCountry": "US", "servicedAirportIds": [] }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = app
        .client
        .post(app.url("/airlines"))
        .bearer_auth(&token)
        .json(&json!({ "name": "Ghost Air", "baseCountry": "US", "servicedAirportIds": [Uuid::new_v4()] }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "One or more serviced airports not found");
}

#[tokio::test]
async fn test_airline_operated_routes_and_filters() {
    let app = common::TestApp::spawn().await;
    let (token, _) = app.register_user().await;
    let run = common::run_id();

    let a = app.create_airport(&token, "Alpha Field", "US", 10.0, 10.0).await;
    let b = app.create_airport(&token, "Bravo Field", "US", 11.0, 11.0).await;
    let airline = app.create_airline(&token, &format!("Filter Air {run}"), "ZZ", &[&a, &b]).await;
    app.create_airline(&token, &format!("Other Air {run}"), "YY", &[&a]).await;
    let route = app.create_route(&token, &a, &b, &airline).await;

    let resp = app
        .client
        .get(app.url_with(
            &format!("/airlines/{}", airline["id"].as_str().unwrap()),
            &[("include", "operatedRoutes")],
        ))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["operatedRoutes"][0]["id"], route["id"]);
    assert_eq!(body["operatedRoutes"][0]["fromAirport"]["id"], a["id"]);
    assert_eq!(body["operatedRoutes"][0]["toAirport"]["id"], b["id"]);

    let resp = app
        .client
        .get(app.url_with("/airlines", &[("search", run.as_str()), ("baseCountry", "zz")]))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let page: Value = resp.json().await.unwrap();
    assert_eq!(page["meta"]["total"], 1);
    assert_eq!(page["data"][0]["id"], airline["id"]);

    let resp = app
        .client
        .get(app.url_with("/airlines", &[("search", run.as_str()), ("sortBy", "name"), ("sortOrder", "desc")]))
        .send()
        .await
        .unwrap();
    let page: Value = resp.json().await.unwrap();
    let names: Vec<&str> = page["data"].as_array().unwrap().iter().map(|a| a["name"].as_str().unwrap()).collect();
    assert_eq!(names, [format!("Other Air {run}"), format!("Filter Air {run}")]);
}

#[tokio::test]
async fn test_deleting_airline_removes_its_routes() {
    let app = common::TestApp::spawn().await;
    let (token, _) = app.register_user().await;

    let a = app.create_airport(&token, "A", "US", 0.0, 0.0).await;
    let b = app.create_airport(&token, "B", "US", 1.0, 1.0).await;
    let airline = app.create_airline(&token, "Short Lived", "US", &[&a, &b]).await;
    let route = app.create_route(&token, &a, &b, &airline).await;

    let resp = app
        .client
        .delete(app.url(&format!("/airlines/{}", airline["id"].as_str().unwrap())))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app.client.get(app.url(&format!("/routes/{}", route["id"].as_str().unwrap()))).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // The airports themselves survive.
    let resp = app.client.get(app.url(&format!("/airports/{}", a["id"].as_str().unwrap()))).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

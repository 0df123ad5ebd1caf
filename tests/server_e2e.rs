//! HTTP-level tests against a spawned server.

use std::time::Duration;

mod common;

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
        .unwrap()
}

#[tokio::test]
async fn pages_render_with_a_session_cookie() {
    let addr = common::spawn_server().await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    let res = client()
        .get(format!("http://{addr}/about"))
        .send()
        .await
        .expect("server unreachable");

    assert_eq!(res.status(), 200);
    let cookie = res
        .headers()
        .get("set-cookie")
        .and_then(|v| v.to_str().ok())
        .expect("session cookie missing")
        .to_string();
    assert!(cookie.starts_with("session="));

    let body = res.text().await.unwrap();
    assert!(body.contains("pages/about"));
}

#[tokio::test]
async fn session_cookie_round_trips_state() {
    let addr = common::spawn_server().await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    let client = client();

    let first = client
        .get(format!("http://{addr}/pages/hello"))
        .send()
        .await
        .expect("server unreachable");
    let cookie = first
        .headers()
        .get("set-cookie")
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string();
    assert!(first.text().await.unwrap().contains("\"seen\": false"));

    let second = client
        .get(format!("http://{addr}/pages/hello"))
        .header("cookie", &cookie)
        .send()
        .await
        .unwrap();
    assert!(second.text().await.unwrap().contains("\"seen\": true"));
}

#[tokio::test]
async fn ajax_requests_get_bare_json() {
    let addr = common::spawn_server().await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    let res = client()
        .get(format!("http://{addr}/about"))
        .header("x-requested-with", "XMLHttpRequest")
        .send()
        .await
        .expect("server unreachable");

    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), r#"{"page":"about"}"#);
}

#[tokio::test]
async fn redirect_outcome_sets_location_and_clears_the_cookie() {
    let addr = common::spawn_server().await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    let res = client()
        .get(format!("http://{addr}/pages/leave"))
        .send()
        .await
        .expect("server unreachable");

    assert_eq!(res.status(), 302);
    assert_eq!(
        res.headers().get("location").and_then(|v| v.to_str().ok()),
        Some("/")
    );
    let cookie = res
        .headers()
        .get("set-cookie")
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(cookie.contains("Expires=Thu, 01 Jan 1970"));
}

#[tokio::test]
async fn unknown_uris_serve_the_configured_error_page() {
    let addr = common::spawn_server().await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    let res = client()
        .get(format!("http://{addr}/no/such/page"))
        .send()
        .await
        .expect("server unreachable");

    assert_eq!(res.status(), 404);
    assert!(res.text().await.unwrap().contains("errors/missing"));
}

//! End-to-end dispatch tests driven through `Dispatcher::handle`.

use armature::http::ResponseKind;

mod common;

fn body(kind: &ResponseKind) -> &str {
    match kind {
        ResponseKind::Page(body) => body,
        other => panic!("expected a page, got {other:?}"),
    }
}

#[test]
fn configured_route_wins_and_remainder_becomes_params() {
    let dispatcher = common::dispatcher();
    let response = dispatcher.handle(&common::get("/posts/7"));

    assert_eq!(response.status, 200);
    let body = body(&response.kind);
    assert!(body.contains("blog_post/list"));
    assert!(body.contains("\"7\""));
}

#[test]
fn positional_resolution_joins_prefix_segments() {
    let dispatcher = common::dispatcher();
    let response = dispatcher.handle(&common::get("/blog/post/list/3"));

    assert_eq!(response.status, 200);
    let body = body(&response.kind);
    assert!(body.contains("blog_post/list"));
    assert!(body.contains("\"3\""));
}

#[test]
fn root_uri_falls_back_to_index_index() {
    let dispatcher = common::dispatcher();
    let response = dispatcher.handle(&common::get("/"));

    assert_eq!(response.status, 200);
    assert!(body(&response.kind).contains("index/index"));
}

#[test]
fn unknown_handler_renders_the_not_found_page_with_404() {
    let dispatcher = common::dispatcher();
    let response = dispatcher.handle(&common::get("/nowhere"));

    assert_eq!(response.status, 404);
    assert!(body(&response.kind).contains("errors/missing"));
}

#[test]
fn failed_action_renders_the_not_found_page_with_404() {
    let dispatcher = common::dispatcher();
    let response = dispatcher.handle(&common::get("/pages/broken"));

    assert_eq!(response.status, 404);
    assert!(body(&response.kind).contains("errors/missing"));
}

#[test]
fn access_gate_sends_low_level_sessions_to_the_forbidden_page() {
    let dispatcher = common::dispatcher();
    let response = dispatcher.handle(&common::get("/members"));

    assert_eq!(response.status, 403);
    assert!(body(&response.kind).contains("errors/denied"));
}

#[test]
fn promoted_session_passes_the_gate_on_the_next_request() {
    let dispatcher = common::dispatcher();

    let first = dispatcher.handle(&common::get("/members/promote"));
    let token = first.cookie.as_ref().unwrap().value.clone();

    let second = dispatcher.handle(&common::get("/members").with_session_token(Some(token)));
    assert_eq!(second.status, 200);
    assert!(body(&second.kind).contains("members/index"));
}

#[test]
fn restricted_uri_serves_the_denial_page_to_unlisted_callers() {
    let dispatcher = common::dispatcher();
    let response = dispatcher.handle(&common::get("/admin/panel"));

    assert_eq!(response.status, 200);
    assert!(body(&response.kind).contains("errors/denied"));
}

#[test]
fn restriction_does_not_touch_other_uris() {
    let dispatcher = common::dispatcher();
    let response = dispatcher.handle(&common::get("/about"));

    assert_eq!(response.status, 200);
    assert!(body(&response.kind).contains("pages/about"));
}

#[test]
fn ajax_render_returns_the_bare_model() {
    let dispatcher = common::dispatcher();
    let response = dispatcher.handle(&common::get("/about").with_ajax(true));

    assert_eq!(response.status, 200);
    let body = body(&response.kind);
    assert_eq!(body, r#"{"page":"about"}"#);
}

#[test]
fn session_state_survives_across_requests_with_the_cookie() {
    let dispatcher = common::dispatcher();

    let first = dispatcher.handle(&common::get("/pages/hello"));
    assert!(body(&first.kind).contains("\"seen\": false"));
    let token = first.cookie.as_ref().unwrap().value.clone();

    let second = dispatcher.handle(&common::get("/pages/hello").with_session_token(Some(token)));
    assert!(body(&second.kind).contains("\"seen\": true"));
}

#[test]
fn hijacked_token_expires_the_session() {
    let dispatcher = common::dispatcher();

    let first = dispatcher.handle(&common::get("/pages/hello"));
    let token = first.cookie.as_ref().unwrap().value.clone();

    let hijacker = armature::http::Request::new(
        axum::http::Method::GET,
        "/pages/hello",
        "10.9.9.9".parse().unwrap(),
    )
    .with_session_token(Some(token));

    let response = dispatcher.handle(&hijacker);
    assert_eq!(response.status, 403);
    assert!(body(&response.kind).contains("errors/expired"));
    assert!(response.cookie.as_ref().unwrap().expired);
}

#[test]
fn destroying_the_session_redirects_home_with_an_expired_cookie() {
    let dispatcher = common::dispatcher();
    let response = dispatcher.handle(&common::get("/pages/leave"));

    assert_eq!(response.status, 302);
    assert_eq!(response.kind, ResponseKind::Redirect("/".into()));
    assert!(response.cookie.as_ref().unwrap().expired);
}

#[test]
fn failing_error_page_is_not_retried() {
    let xml = r#"
<Config>
<Site>
    <ShowExceptions>true</ShowExceptions>
    <ErrorRedirects>
        <NotFound controller="ghost" action="index"/>
    </ErrorRedirects>
</Site>
</Config>
"#;
    let dispatcher = common::dispatcher_with(xml);
    let response = dispatcher.handle(&common::get("/nowhere"));

    assert_eq!(response.status, 500);
    assert!(body(&response.kind).contains("ghost"));
}

#[test]
fn unconfigured_error_class_yields_a_plain_500() {
    let xml = r#"
<Config>
<Site>
    <ShowExceptions>false</ShowExceptions>
</Site>
</Config>
"#;
    let dispatcher = common::dispatcher_with(xml);
    let response = dispatcher.handle(&common::get("/nowhere"));

    assert_eq!(response.status, 500);
    assert_eq!(body(&response.kind), "Internal error");
}

#[test]
fn post_without_form_token_never_reaches_the_fields() {
    let dispatcher = common::dispatcher();
    let response = dispatcher.handle(&common::post("/pages/submit", &[("comment", "hello")]));

    assert_eq!(response.status, 500);
    assert!(body(&response.kind).contains("invalid form token"));
}

#[test]
fn form_token_roundtrip_spends_the_token_on_page_posts() {
    let dispatcher = common::dispatcher();
    let store = std::sync::Arc::clone(dispatcher.sessions());
    let mut session = store.open(None, common::client_ip());
    let token = session.issue_form_token().unwrap();
    let cookie = session.id().to_string();
    drop(session);

    let fields = [
        ("comment", "hello <b>world</b>"),
        (armature::dispatch::FORM_TOKEN_FIELD, token.as_str()),
    ];
    let ok = dispatcher.handle(
        &common::post("/pages/submit", &fields).with_session_token(Some(cookie)),
    );
    assert_eq!(ok.status, 200);
    assert!(body(&ok.kind).contains("hello world"));

    // The page submission spent the set; replaying the token fails.
    let cookie = ok.cookie.as_ref().unwrap().value.clone();
    let replay = dispatcher.handle(
        &common::post("/pages/submit", &fields).with_session_token(Some(cookie)),
    );
    assert_eq!(replay.status, 500);
    assert!(body(&replay.kind).contains("invalid form token"));
}

#[test]
fn ajax_posts_keep_the_token_set_alive() {
    let dispatcher = common::dispatcher();
    let store = std::sync::Arc::clone(dispatcher.sessions());
    let mut session = store.open(None, common::client_ip());
    let token = session.issue_form_token().unwrap();
    let mut cookie = session.id().to_string();
    drop(session);

    let fields = [
        ("comment", "hi"),
        (armature::dispatch::FORM_TOKEN_FIELD, token.as_str()),
    ];
    for _ in 0..2 {
        let response = dispatcher.handle(
            &common::post("/pages/submit", &fields)
                .with_ajax(true)
                .with_session_token(Some(cookie)),
        );
        assert_eq!(response.status, 200);
        assert_eq!(body(&response.kind), r#"{"comment":"hi"}"#);
        cookie = response.cookie.as_ref().unwrap().value.clone();
    }

    // A page submission still spends the set afterwards.
    let spend = dispatcher.handle(
        &common::post("/pages/submit", &fields).with_session_token(Some(cookie)),
    );
    assert_eq!(spend.status, 200);

    let cookie = spend.cookie.as_ref().unwrap().value.clone();
    let replay = dispatcher.handle(
        &common::post("/pages/submit", &fields).with_session_token(Some(cookie)),
    );
    assert_eq!(replay.status, 500);
}

#[test]
fn reverse_routes_feed_redirect_locations() {
    let dispatcher = common::dispatcher();
    let routes = dispatcher.routes();

    assert_eq!(routes.href("blog_post", "list", &[]), "/posts");
    assert_eq!(
        routes.href("blog_post", "list", &["7".into()]),
        "/posts/7"
    );
    assert_eq!(routes.href("members", "index", &[]), "/members");
}

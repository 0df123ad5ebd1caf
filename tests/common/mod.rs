//! Shared fixtures for the integration tests.

use std::net::IpAddr;
use std::sync::Arc;

use serde_json::json;

use armature::config::{ConfigDoc, Environment};
use armature::dispatch::{ActionOutcome, Dispatcher, HandlerRegistry};
use armature::http::{FieldFilter, Request};
use armature::session::SessionConfig;
use armature::view::JsonRenderer;
use axum::http::Method;

pub const SITE_XML: &str = r#"
<Config>
<Site>
    <ShowExceptions>true</ShowExceptions>
    <Routes>
        <Route pattern="/posts" controller="blog_post" action="list"/>
        <Route pattern="/about" controller="pages" action="about"/>
    </Routes>
    <Prefixes>
        <Prefix>blog</Prefix>
    </Prefixes>
    <ErrorRedirects>
        <NotFound controller="errors" action="missing"/>
        <Forbidden controller="errors" action="denied"/>
        <SessionExpired controller="errors" action="expired"/>
        <GenericError controller="errors" action="oops"/>
    </ErrorRedirects>
    <IpRestrictions>
        <Restrict pattern="/admin" controller="errors" action="denied">
            <IP>10.0.0.1</IP>
        </Restrict>
    </IpRestrictions>
</Site>
</Config>
"#;

#[derive(Default)]
pub struct PagesHandler;

#[derive(Default)]
pub struct BlogPostHandler;

#[derive(Default)]
pub struct MembersHandler;

#[derive(Default)]
pub struct ErrorsHandler;

pub fn registry() -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();

    registry
        .handler("index", PagesHandler::default)
        .action("index", |_: &mut PagesHandler, _ctx| {
            Ok(ActionOutcome::model(json!({"page": "home"}))?)
        });

    registry
        .handler("pages", PagesHandler::default)
        .action("about", |_: &mut PagesHandler, _ctx| {
            Ok(ActionOutcome::model(json!({"page": "about"}))?)
        })
        .action("aboutAjax", |_: &mut PagesHandler, _ctx| {
            Ok(ActionOutcome::model(json!({"page": "about"}))?)
        })
        .action("hello", |_: &mut PagesHandler, ctx| {
            let seen = ctx.session.read("seen")?.is_some();
            ctx.session.write("seen", json!(true))?;
            Ok(ActionOutcome::model(json!({"seen": seen, "params": ctx.params}))?)
        })
        .action("leave", |_: &mut PagesHandler, ctx| {
            ctx.session.destroy()?;
            Ok(ActionOutcome::redirect("index", "index", Vec::new()))
        })
        .action("broken", |_: &mut PagesHandler, _ctx| {
            Ok(ActionOutcome::Failure("backing store offline".into()))
        })
        .action("form", |_: &mut PagesHandler, ctx| {
            let token = ctx.session.issue_form_token()?;
            Ok(ActionOutcome::model(json!({"token": token}))?)
        })
        .action("submitPost", |_: &mut PagesHandler, ctx| {
            let comment = ctx
                .post_field("comment", FieldFilter::Text)?
                .unwrap_or_default();
            Ok(ActionOutcome::model(json!({"comment": comment}))?)
        })
        .action("submitAjaxPost", |_: &mut PagesHandler, ctx| {
            let comment = ctx
                .post_field("comment", FieldFilter::Text)?
                .unwrap_or_default();
            Ok(ActionOutcome::model(json!({"comment": comment}))?)
        });

    registry
        .handler("blog_post", BlogPostHandler::default)
        .action("list", |_: &mut BlogPostHandler, ctx| {
            Ok(ActionOutcome::model(json!({"posts": ctx.params}))?)
        });

    registry
        .handler("members", MembersHandler::default)
        .access_level(5)
        .action("index", |_: &mut MembersHandler, _ctx| {
            Ok(ActionOutcome::model(json!({"page": "members"}))?)
        })
        .action("promote", |_: &mut MembersHandler, ctx| {
            // Promotion itself is open; the gate protects rendering only.
            ctx.session.set_access_level(5)?;
            Ok(ActionOutcome::Done)
        });

    registry
        .handler("errors", ErrorsHandler::default)
        .action("missing", |_: &mut ErrorsHandler, _ctx| {
            Ok(ActionOutcome::model(json!({"error": "missing"}))?)
        })
        .action("denied", |_: &mut ErrorsHandler, _ctx| {
            Ok(ActionOutcome::model(json!({"error": "denied"}))?)
        })
        .action("expired", |_: &mut ErrorsHandler, _ctx| {
            Ok(ActionOutcome::model(json!({"error": "expired"}))?)
        })
        .action("oops", |_: &mut ErrorsHandler, _ctx| {
            Ok(ActionOutcome::model(json!({"error": "oops"}))?)
        });

    registry
}

pub fn dispatcher() -> Dispatcher {
    dispatcher_with(SITE_XML)
}

pub fn dispatcher_with(xml: &str) -> Dispatcher {
    let config = ConfigDoc::parse(xml, Environment::Production).unwrap();
    Dispatcher::new(config, registry(), JsonRenderer, SessionConfig::default()).unwrap()
}

pub fn client_ip() -> IpAddr {
    "192.168.1.10".parse().unwrap()
}

pub fn get(path: &str) -> Request {
    Request::new(Method::GET, path, client_ip())
}

pub fn post(path: &str, fields: &[(&str, &str)]) -> Request {
    Request::new(Method::POST, path, client_ip()).with_post_fields(
        fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    )
}

/// Spawn an HTTP server over a fresh dispatcher on an OS-assigned port.
pub async fn spawn_server() -> std::net::SocketAddr {
    let dispatcher = Arc::new(dispatcher());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = armature::http::HttpServer::new(dispatcher);
    tokio::spawn(async move {
        let _ = server.run(listener).await;
    });
    addr
}

//! In-process dispatch tests: requests go through the full axum service
//! without opening a socket.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use pageroute::{Context, FormFileError, HttpServer, MatchPolicy, Router, ServerConfig};

mod common;

fn server(router: Router) -> HttpServer {
    HttpServer::new(router, ServerConfig::default())
}

#[tokio::test]
async fn test_single_match_is_returned_unmodified() {
    let server = server(
        Router::new()
            .get("/", |_: &mut Context| (200, "index".to_string()))
            .get("/created", |_: &mut Context| (201, "made".to_string()))
            .post("/created", |_: &mut Context| (500, "wrong method".to_string())),
    );

    let (res, body) = common::send(&server, common::get("/created")).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(body, "made");
    assert!(res.headers().get(header::CONTENT_TYPE).is_none());
}

#[tokio::test]
async fn test_zero_routes_give_default_not_found() {
    let server = server(Router::new());

    for method in ["GET", "POST", "DELETE", "PURGE"] {
        let req = Request::builder()
            .method(method)
            .uri("/any/where")
            .body(Body::empty())
            .unwrap();
        let (res, body) = common::send(&server, req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "method {}", method);
        assert_eq!(body, "404 Not Found");
    }
}

#[tokio::test]
async fn test_not_found_handler_status_is_discarded() {
    let server = server(
        Router::new()
            .get("/", |_: &mut Context| (200, "index".to_string()))
            .not_found(|c: &mut Context| c.to_text(200, "lost?")),
    );

    let (res, body) = common::send(&server, common::get("/missing")).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(body, "lost?");
    assert_eq!(res.headers().get(header::CONTENT_TYPE).unwrap(), "text/plain");
}

#[tokio::test]
async fn test_duplicate_routes_last_registered_wins() {
    let first_calls = Arc::new(AtomicUsize::new(0));
    let counter = first_calls.clone();

    let server = server(
        Router::new()
            .get("/dup", move |c: &mut Context| {
                counter.fetch_add(1, Ordering::SeqCst);
                c.set_header("X-From-A", "yes");
                (200, "A".to_string())
            })
            .get("/dup", |c: &mut Context| {
                c.set_header("X-From-B", "yes");
                (203, "B".to_string())
            }),
    );

    let (res, body) = common::send(&server, common::get("/dup")).await;
    assert_eq!(res.status(), StatusCode::NON_AUTHORITATIVE_INFORMATION);
    assert_eq!(body, "B");
    assert_eq!(res.headers().get("x-from-a").unwrap(), "yes");
    assert_eq!(res.headers().get("x-from-b").unwrap(), "yes");
    assert_eq!(first_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_first_match_policy_from_config() {
    let second_calls = Arc::new(AtomicUsize::new(0));
    let counter = second_calls.clone();

    let mut config = ServerConfig::default();
    config.routing.match_policy = Some(MatchPolicy::FirstMatch);
    let server = HttpServer::new(
        Router::new()
            .get("/dup", |_: &mut Context| (200, "A".to_string()))
            .get("/dup", move |_: &mut Context| {
                counter.fetch_add(1, Ordering::SeqCst);
                (200, "B".to_string())
            }),
        config,
    );

    let (_, body) = common::send(&server, common::get("/dup")).await;
    assert_eq!(body, "A");
    assert_eq!(second_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_to_text_sets_plain_content_type() {
    let server = server(Router::new().get("/ok", |c: &mut Context| c.to_text(200, "ok")));

    let (res, body) = common::send(&server, common::get("/ok")).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body, "ok");
    assert_eq!(res.headers().get(header::CONTENT_TYPE).unwrap(), "text/plain");
}

#[tokio::test]
async fn test_form_values_from_query_and_body() {
    let server = server(
        Router::new()
            .get("/greet", |c: &mut Context| {
                let name = c.get_form_value("name");
                let missing = c.get_form_value("nope");
                c.to_text(200, format!("[{}][{}]", name, missing))
            })
            .post("/login", |c: &mut Context| {
                let user = c.get_form_value("user");
                c.to_text(200, user)
            }),
    );

    let (_, body) = common::send(&server, common::get("/greet?name=Ada%20L")).await;
    assert_eq!(body, "[Ada L][]");

    let req = Request::builder()
        .method("POST")
        .uri("/login?user=from-query")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("user=from-body"))
        .unwrap();
    let (_, body) = common::send(&server, req).await;
    assert_eq!(body, "from-body");
}

#[tokio::test]
async fn test_form_file_errors_reach_handler() {
    let server = server(Router::new().post("/upload", |c: &mut Context| match c.get_form_file("doc") {
        Ok((_, header)) => (200, header.file_name),
        Err(e) => (400, e.to_string()),
    }));

    let req = Request::builder()
        .method("POST")
        .uri("/upload")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let (res, body) = common::send(&server, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body, "request Content-Type isn't multipart/form-data");

    let req = Request::builder()
        .method("POST")
        .uri("/upload")
        .header(header::CONTENT_TYPE, "multipart/form-data; boundary=zz")
        .body(Body::from(
            "--zz\r\nContent-Disposition: form-data; name=\"doc\"; filename=\"r.txt\"\r\n\r\nhi\r\n--zz--\r\n",
        ))
        .unwrap();
    let (res, body) = common::send(&server, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body, "r.txt");
}

#[tokio::test]
async fn test_patch_route_is_not_trace() {
    let server = server(Router::new().patch("/item", |_: &mut Context| (200, "patched".to_string())));

    let patch = Request::builder()
        .method("PATCH")
        .uri("/item")
        .body(Body::empty())
        .unwrap();
    let (res, body) = common::send(&server, patch).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body, "patched");

    let trace = Request::builder()
        .method("TRACE")
        .uri("/item")
        .body(Body::empty())
        .unwrap();
    let (res, _) = common::send(&server, trace).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_oversized_body_still_reaches_handler() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let mut config = ServerConfig::default();
    config.limits.max_body_bytes = 8;
    let server = HttpServer::new(
        Router::new().post("/big", move |c: &mut Context| {
            counter.fetch_add(1, Ordering::SeqCst);
            let tag = c.get_form_value("tag");
            let buffered = c.body().len();
            match c.get_form_file("doc") {
                Err(FormFileError::BodyTooLarge { limit }) => {
                    c.to_text(200, format!("{}:{}:{}", tag, limit, buffered))
                }
                Err(e) => c.to_text(500, e.to_string()),
                Ok(_) => c.to_text(500, "unexpected file"),
            }
        }),
        config,
    );

    let req = Request::builder()
        .method("POST")
        .uri("/big?tag=t1")
        .body(Body::from("this body is too long"))
        .unwrap();
    let (res, body) = common::send(&server, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body, "t1:8:0");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_oversized_body_is_routed_like_any_request() {
    let mut config = ServerConfig::default();
    config.limits.max_body_bytes = 8;

    let empty = HttpServer::new(Router::new(), config.clone());
    let req = Request::builder()
        .method("POST")
        .uri("/nowhere")
        .body(Body::from("this body is too long"))
        .unwrap();
    let (res, body) = common::send(&empty, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(body, "404 Not Found");

    let raw = HttpServer::new(
        Router::new().put("/raw", |_: &mut Context| (200, "stored".to_string())),
        config,
    );
    let req = Request::builder()
        .method("PUT")
        .uri("/raw")
        .body(Body::from("this body is too long"))
        .unwrap();
    let (res, body) = common::send(&raw, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body, "stored");
}

#[tokio::test]
async fn test_invalid_status_code_becomes_server_error() {
    let server = server(Router::new().get("/weird", |_: &mut Context| (7, "seven".to_string())));

    let (res, body) = common::send(&server, common::get("/weird")).await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "seven");
}

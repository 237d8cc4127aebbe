// Pipeline composition: execution ordering, terminal handlers, conditional
// branches and branch isolation.
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use bytes::Bytes;
use dendrite::{
    FetchContext, PipelineBuilder, WorkerConfig, channel_event,
    core::{RequestDelegate, ServiceCollection, delegate, services::ServiceProvider},
    ports::fetch_client::{FetchClient, FetchResult},
};
use http::{Method, Request, Response, StatusCode};

const ORIGIN: &str = "http://www.example.com";

/// Terminal stand-in for the network: echoes the request URL in the body.
struct EchoFetchClient;

#[async_trait]
impl FetchClient for EchoFetchClient {
    async fn fetch(&self, request: Request<Bytes>) -> FetchResult<Response<Bytes>> {
        Ok(Response::builder()
            .status(StatusCode::OK)
            .header("x-upstream", "echo")
            .body(Bytes::from(request.uri().to_string()))
            .unwrap())
    }
}

fn builder() -> PipelineBuilder {
    let services = ServiceProvider::new(
        ServiceCollection::new().into_descriptors(),
        Arc::new(Mutex::new(HashMap::new())),
    );
    PipelineBuilder::new(
        Arc::new(WorkerConfig::new("v1", ORIGIN)),
        services,
        Arc::new(EchoFetchClient),
    )
}

fn request(url: &str) -> Request<Bytes> {
    Request::builder()
        .method(Method::GET)
        .uri(url)
        .body(Bytes::new())
        .unwrap()
}

async fn run_pipeline(handler: &RequestDelegate, url: &str) -> Response<Bytes> {
    let (event, receiver) = channel_event(request(url));
    let services = ServiceProvider::new(
        ServiceCollection::new().into_descriptors(),
        Arc::new(Mutex::new(HashMap::new())),
    );
    handler(FetchContext::new(event, services)).await.unwrap();
    receiver.await.unwrap()
}

fn responding(marker: &'static str) -> RequestDelegate {
    delegate(move |mut ctx: FetchContext| async move {
        ctx.respond(
            Response::builder()
                .status(StatusCode::OK)
                .body(Bytes::from_static(marker.as_bytes()))
                .unwrap(),
        );
        Ok(ctx)
    })
}

#[tokio::test]
async fn test_middleware_execute_in_registration_order() {
    let trace: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));
    let mut app = builder();

    for marker in ["m1", "m2"] {
        let trace = Arc::clone(&trace);
        app.use_next(move |ctx, next| {
            let trace = Arc::clone(&trace);
            async move {
                trace.lock().unwrap().push(marker);
                next(ctx).await
            }
        });
    }

    let terminal_trace = Arc::clone(&trace);
    app.run(delegate(move |mut ctx: FetchContext| {
        let trace = Arc::clone(&terminal_trace);
        async move {
            trace.lock().unwrap().push("terminal");
            ctx.respond(Response::builder().body(Bytes::new()).unwrap());
            Ok(ctx)
        }
    }));

    let handler = app.build();
    run_pipeline(&handler, "http://www.example.com/anything").await;

    assert_eq!(*trace.lock().unwrap(), vec!["m1", "m2", "terminal"]);
}

#[tokio::test]
async fn test_unmatched_request_falls_to_default_handler() {
    let mut app = builder();
    app.map("/testpath", |branch| {
        branch.run(responding("match"));
    })
    .unwrap();

    let handler = app.build();
    let response = run_pipeline(&handler, "http://www.example.com/otherpath").await;

    // Fell through to the pass-through default handler.
    assert_eq!(response.headers().get("x-upstream").unwrap(), "echo");
}

#[tokio::test]
async fn test_first_matching_map_wins() {
    let mut app = builder();
    app.map("/testpath", |branch| {
        branch.run(responding("first"));
    })
    .unwrap();
    app.map(vec!["/testpath", "/testpath2"], |branch| {
        branch.run(responding("second"));
    })
    .unwrap();

    let handler = app.build();

    let response = run_pipeline(&handler, "http://www.example.com/testpath").await;
    assert_eq!(response.body(), &Bytes::from_static(b"first"));

    let response = run_pipeline(&handler, "http://www.example.com/testpath2").await;
    assert_eq!(response.body(), &Bytes::from_static(b"second"));
}

#[tokio::test]
async fn test_map_when_predicate_gates_the_route() {
    let mut app = builder();
    app.map_when(
        "/orders/{id}",
        |_ctx, variables| variables.path.get("id").map(String::as_str) == Some("42"),
        |branch| {
            branch.run(responding("order-42"));
        },
    )
    .unwrap();

    let handler = app.build();

    let accepted = run_pipeline(&handler, "http://www.example.com/orders/42").await;
    assert_eq!(accepted.body(), &Bytes::from_static(b"order-42"));

    // Predicate rejects: falls through to the default handler.
    let rejected = run_pipeline(&handler, "http://www.example.com/orders/7").await;
    assert_eq!(rejected.headers().get("x-upstream").unwrap(), "echo");
}

#[tokio::test]
async fn test_rejected_predicate_still_scans_later_routes() {
    let mut app = builder();
    app.map_when(
        "/orders/{id}",
        |_ctx, _variables| false,
        |branch| {
            branch.run(responding("never"));
        },
    )
    .unwrap();
    app.map("/orders/*", |branch| {
        branch.run(responding("fallback-route"));
    })
    .unwrap();

    let handler = app.build();
    let response = run_pipeline(&handler, "http://www.example.com/orders/42").await;
    assert_eq!(response.body(), &Bytes::from_static(b"fallback-route"));
}

#[tokio::test]
async fn test_rejected_predicate_keeps_scanning_within_one_registration() {
    let mut app = builder();
    // The wildcard route matches first but captures no name, so the
    // predicate rejects it; the variable route right after must still be
    // considered by the same middleware.
    app.map_when(
        vec!["/files/*", "/files/{name}"],
        |_ctx, variables| variables.path.get("name").map(String::as_str) == Some("report"),
        |branch| {
            branch.run(responding("report-branch"));
        },
    )
    .unwrap();

    let handler = app.build();

    let response = run_pipeline(&handler, "http://www.example.com/files/report").await;
    assert_eq!(response.body(), &Bytes::from_static(b"report-branch"));

    let response = run_pipeline(&handler, "http://www.example.com/files/other").await;
    assert_eq!(response.headers().get("x-upstream").unwrap(), "echo");
}

#[tokio::test]
async fn test_use_when_branch_falls_through_to_parent_next() {
    let trace: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));
    let mut app = builder();

    let branch_trace = Arc::clone(&trace);
    app.use_when(
        |ctx| ctx.request.uri().path().starts_with("/guarded"),
        move |branch| {
            let trace = Arc::clone(&branch_trace);
            branch.use_next(move |ctx, next| {
                let trace = Arc::clone(&trace);
                async move {
                    trace.lock().unwrap().push("branch");
                    next(ctx).await
                }
            });
        },
    );

    let terminal_trace = Arc::clone(&trace);
    app.run(delegate(move |mut ctx: FetchContext| {
        let trace = Arc::clone(&terminal_trace);
        async move {
            trace.lock().unwrap().push("after");
            ctx.respond(Response::builder().body(Bytes::new()).unwrap());
            Ok(ctx)
        }
    }));

    let handler = app.build();

    run_pipeline(&handler, "http://www.example.com/guarded/area").await;
    assert_eq!(*trace.lock().unwrap(), vec!["branch", "after"]);

    trace.lock().unwrap().clear();
    run_pipeline(&handler, "http://www.example.com/open/area").await;
    // Predicate false: the branch is skipped but the parent continues.
    assert_eq!(*trace.lock().unwrap(), vec!["after"]);
}

#[tokio::test]
async fn test_branch_builders_share_property_bag_entries() {
    let mut app = builder();
    app.set_property("flavor", "parent".to_string());

    let observed: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));
    let observed_in_branch = Arc::clone(&observed);
    app.map("/testpath", move |branch| {
        *observed_in_branch.lock().unwrap() =
            branch.get_property::<String>("flavor").map(|v| (*v).clone());
        branch.run(responding("ok"));
    })
    .unwrap();

    let handler = app.build();
    run_pipeline(&handler, "http://www.example.com/testpath").await;

    assert_eq!(observed.lock().unwrap().as_deref(), Some("parent"));
}

#[tokio::test]
async fn test_malformed_map_pattern_fails_at_registration() {
    let mut app = builder();
    let result = app.map("/bad/{pattern", |branch| {
        branch.run(responding("unreachable"));
    });
    assert!(result.is_err());
}

//! Discovery driver tests
//!
//! The cluster is replaced by a mocked [`ResourceSource`] that answers per API
//! resource type, so these tests cover fetch orchestration, failure tolerance
//! and the project fallback without a live client.

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{Request, StatusCode, header};
use kube_graph::discovery::Discovery;
use kube_graph::kube::{ResourceSource, SourceError};
use kube_graph::models::{ApiDescriptor, NAMESPACES_API, PROJECTS_API, Project, ResourceKind};
use kube_graph::server::{AppState, GraphQuery, graph_handler, projects_handler, router};
use mockall::mock;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

mock! {
    pub Source {}

    #[async_trait]
    impl ResourceSource for Source {
        async fn list(
            &self,
            api: &ApiDescriptor,
            namespace: &str,
        ) -> Result<Vec<Value>, SourceError>;
    }
}

fn decode_error(api: ApiDescriptor) -> SourceError {
    SourceError::Decode {
        api,
        source: serde_json::from_str::<Value>("{").unwrap_err(),
    }
}

fn api_of(kind: ResourceKind) -> ApiDescriptor {
    kind.api().unwrap()
}

/// Records served per resource type for namespace `shop`
fn fixture(api: &ApiDescriptor) -> Vec<Value> {
    match api.plural {
        "deployments" => vec![json!({ "metadata": { "uid": "d1", "name": "web" } })],
        "replicasets" => vec![json!({
            "metadata": {
                "uid": "rs1",
                "name": "web-1",
                "ownerReferences": [{ "uid": "d1", "kind": "Deployment", "name": "web" }]
            }
        })],
        "configmaps" => vec![
            json!({ "metadata": { "uid": "cm1", "name": "web-config" } }),
            json!({ "metadata": { "uid": "cm2", "name": "kube-root-ca.crt" } }),
        ],
        "pods" => vec![json!({
            "metadata": {
                "uid": "p1",
                "name": "web-1-abc",
                "ownerReferences": [{ "uid": "rs1", "kind": "ReplicaSet", "name": "web-1" }]
            },
            "spec": {
                "containers": [{ "name": "web", "image": "nginx:1.25" }],
                "volumes": [{ "name": "config", "configMap": { "name": "web-config" } }]
            }
        })],
        "services" => vec![json!({ "metadata": { "uid": "svc1", "name": "web" } })],
        "routes" => vec![json!({
            "metadata": { "uid": "r1", "name": "web" },
            "spec": { "to": { "kind": "Service", "name": "web" } }
        })],
        _ => Vec::new(),
    }
}

#[tokio::test]
async fn test_build_graph_from_source() {
    let mut source = MockSource::new();
    source
        .expect_list()
        .withf(|_, namespace| namespace == "shop")
        .times(ResourceKind::collection_order().len())
        .returning(|api, _| Ok(fixture(api)));

    let graph = Discovery::new(source).build_graph("shop").await;

    assert!(graph.link_exists("d1", "rs1"));
    assert!(graph.link_exists("rs1", "p1"));
    assert!(graph.link_exists("p1", "cm1"));
    assert!(graph.link_exists("r1", "svc1"));
    assert_eq!(graph.link_count(), 4);
    assert!(graph.node_exists("cm1"));
    assert!(!graph.node_exists("cm2"));
    assert_eq!(graph.node_count(), 6);
}

#[tokio::test]
async fn test_build_graph_tolerates_failing_kind() {
    let mut source = MockSource::new();
    source.expect_list().returning(|api, _| {
        if api.plural == "replicasets" {
            Err(decode_error(*api))
        } else {
            Ok(fixture(api))
        }
    });

    let graph = Discovery::new(source)
        .with_fetch_concurrency(1)
        .build_graph("shop")
        .await;

    assert!(!graph.node_exists("rs1"));
    assert!(graph.node_exists("p1"));
    assert!(graph.node_exists("d1"));
    assert!(!graph.link_exists("d1", "rs1"));
    assert!(!graph.link_exists("rs1", "p1"));
    assert!(graph.link_exists("p1", "cm1"));
}

#[tokio::test]
async fn test_build_graph_when_everything_fails() {
    let mut source = MockSource::new();
    source
        .expect_list()
        .returning(|api, _| Err(decode_error(*api)));

    let graph = Discovery::new(source).build_graph("shop").await;
    assert!(graph.is_empty());
    assert_eq!(graph.to_json(), json!({ "nodes": [], "links": [] }));
}

#[tokio::test]
async fn test_image_is_never_listed() {
    let mut source = MockSource::new();
    source
        .expect_list()
        .withf(|api, _| api.plural != "images")
        .returning(|_, _| Ok(Vec::new()));

    let graph = Discovery::new(source).build_graph("shop").await;
    assert!(graph.is_empty());
}

#[tokio::test]
async fn test_results_independent_of_concurrency() {
    let build = |concurrency| {
        let mut source = MockSource::new();
        source.expect_list().returning(|api, _| Ok(fixture(api)));
        Discovery::new(source).with_fetch_concurrency(concurrency)
    };

    let sequential = build(0).build_graph("shop").await;
    let concurrent = build(16).build_graph("shop").await;
    assert_eq!(sequential.to_json(), concurrent.to_json());
}

#[tokio::test]
async fn test_list_projects() {
    let mut source = MockSource::new();
    source
        .expect_list()
        .withf(|api, namespace| *api == PROJECTS_API && namespace.is_empty())
        .times(1)
        .returning(|_, _| {
            Ok(vec![
                json!({
                    "metadata": {
                        "name": "shop",
                        "annotations": { "openshift.io/display-name": "Web Shop" }
                    }
                }),
                json!({ "metadata": { "name": "batch" } }),
                json!({ "metadata": {} }),
            ])
        });

    let projects = Discovery::new(source).list_projects().await.unwrap();
    assert_eq!(
        projects,
        vec![Project::new("shop", "Web Shop"), Project::new("batch", "")]
    );
}

#[tokio::test]
async fn test_list_projects_falls_back_to_namespaces() {
    let mut source = MockSource::new();
    source
        .expect_list()
        .withf(|api, _| *api == PROJECTS_API)
        .times(1)
        .returning(|api, _| Err(decode_error(*api)));
    source
        .expect_list()
        .withf(|api, _| *api == NAMESPACES_API)
        .times(1)
        .returning(|_, _| Ok(vec![json!({ "metadata": { "name": "default" } })]));

    let projects = Discovery::new(source).list_projects().await.unwrap();
    assert_eq!(projects, vec![Project::new("default", "")]);
}

#[tokio::test]
async fn test_list_projects_error_when_both_fail() {
    let mut source = MockSource::new();
    source
        .expect_list()
        .times(2)
        .returning(|api, _| Err(decode_error(*api)));

    let err = Discovery::new(source).list_projects().await.unwrap_err();
    assert!(matches!(err, SourceError::Decode { api, .. } if api == NAMESPACES_API));
}

#[tokio::test]
async fn test_graph_handler_uses_default_namespace() {
    let mut source = MockSource::new();
    source
        .expect_list()
        .withf(|_, namespace| namespace == "shop")
        .returning(|api, _| Ok(fixture(api)));
    let state = AppState::new(Discovery::new(source), "shop");

    let graph = graph_handler(State(state.clone()), Query(GraphQuery { namespace: None }))
        .await
        .0;
    assert_eq!(graph.node_count(), 6);

    let graph = graph_handler(
        State(state),
        Query(GraphQuery {
            namespace: Some(String::new()),
        }),
    )
    .await
    .0;
    assert_eq!(graph.node_count(), 6);
}

#[tokio::test]
async fn test_graph_handler_uses_requested_namespace() {
    let mut source = MockSource::new();
    source
        .expect_list()
        .withf(|_, namespace| namespace == "other")
        .returning(|_, _| Ok(Vec::new()));
    let state = AppState::new(Discovery::new(source), "shop");

    let graph = graph_handler(
        State(state),
        Query(GraphQuery {
            namespace: Some("other".to_string()),
        }),
    )
    .await
    .0;
    assert!(graph.is_empty());
}

#[tokio::test]
async fn test_projects_handler_maps_errors_to_bad_gateway() {
    let mut source = MockSource::new();
    source
        .expect_list()
        .returning(|api, _| Err(decode_error(*api)));
    let state = AppState::new(Discovery::new(source), "default");

    match projects_handler(State(state)).await {
        Ok(_) => panic!("expected an error"),
        Err(err) => {
            assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
            assert!(err.message().contains("namespaces"));
        }
    }
}

/// Send a GET through the router and return the status, content type and body
async fn get(app: axum::Router, uri: &str) -> (StatusCode, String, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string())
        .unwrap_or_default();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, content_type, String::from_utf8(body.to_vec()).unwrap())
}

fn failing_app() -> axum::Router {
    let mut source = MockSource::new();
    source
        .expect_list()
        .returning(|api, _| Err(decode_error(*api)));
    router(AppState::new(Discovery::new(source), "default"), None)
}

#[tokio::test]
async fn test_router_projects_error_body() {
    let (status, content_type, body) = get(failing_app(), "/api/projects").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(content_type.starts_with("application/json"));
    let body: Value = serde_json::from_str(&body).unwrap();
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("namespaces"), "{}", error);
    assert_eq!(body.as_object().unwrap().len(), 1);
}

#[tokio::test]
async fn test_router_graph_survives_failing_source() {
    let (status, _, body) = get(failing_app(), "/api/graph?namespace=shop").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        serde_json::from_str::<Value>(&body).unwrap(),
        json!({ "nodes": [], "links": [] })
    );
}

#[tokio::test]
async fn test_router_graph_with_namespace_query() {
    let mut source = MockSource::new();
    source
        .expect_list()
        .withf(|_, namespace| namespace == "shop")
        .returning(|api, _| Ok(fixture(api)));
    let app = router(AppState::new(Discovery::new(source), "default"), None);

    let (status, _, body) = get(app, "/api/graph?namespace=shop").await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["nodes"].as_array().unwrap().len(), 6);
    assert_eq!(body["links"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_router_health_check() {
    let (status, _, body) = get(failing_app(), "/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn test_router_serves_bundled_front_end() {
    let (status, content_type, body) = get(failing_app(), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.starts_with("text/html"));
    assert!(body.contains("app.js"));

    let (status, content_type, _) = get(failing_app(), "/app.js").await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.starts_with("text/javascript"));

    let (status, _, _) = get(failing_app(), "/missing.css").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_router_serves_configured_docroot() {
    let docroot = TempDir::new().unwrap();
    std::fs::write(docroot.path().join("index.html"), "<p>custom</p>").unwrap();

    let mut source = MockSource::new();
    source.expect_list().returning(|_, _| Ok(Vec::new()));
    let app = router(AppState::new(Discovery::new(source), "default"), Some(docroot.path()));

    let (status, _, body) = get(app.clone(), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "<p>custom</p>");

    let (status, _, _) = get(app.clone(), "/app.js").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, body) = get(app, "/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
}

#[test]
fn test_project_wire_shape() {
    let json = serde_json::to_string(&Project::new("shop", "Web Shop")).unwrap();
    insta::assert_snapshot!(json, @r#"{"name":"shop","displayname":"Web Shop"}"#);
}

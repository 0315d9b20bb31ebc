//! GitHub client tests against a mock API server.

use indexmap::IndexMap;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use autolabel::config::LabelSpec;
use autolabel::engine::Operation;
use autolabel::github::{GithubClient, GithubError};

fn client_for(server: &MockServer) -> GithubClient {
    GithubClient::with_base_url(
        "test-token".to_string(),
        "octo".to_string(),
        "hello".to_string(),
        server.uri(),
    )
    .unwrap()
}

fn spec(name: &str, colour: &str, description: &str) -> LabelSpec {
    LabelSpec {
        name: name.to_string(),
        colour: colour.to_string(),
        description: description.to_string(),
    }
}

#[tokio::test]
async fn apply_adds_and_tolerates_already_absent_removal() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/repos/octo/hello/issues/7/labels"))
        .and(body_json(json!({ "labels": ["bug"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/repos/octo/hello/issues/7/labels/needs-triage"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Not Found" })))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    client
        .apply(
            7,
            &[Operation::add("bug"), Operation::remove("needs-triage")],
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn apply_stops_at_the_first_failed_mutation() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/repos/octo/hello/issues/9/labels"))
        .and(body_json(json!({ "labels": ["bug"] })))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({ "message": "Validation Failed" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/repos/octo/hello/issues/9/labels"))
        .and(body_json(json!({ "labels": ["documentation"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    let err = client
        .apply(
            9,
            &[Operation::add("bug"), Operation::add("documentation")],
        )
        .await
        .unwrap_err();

    match err {
        GithubError::Api { status, message } => {
            assert_eq!(status, 422);
            assert_eq!(message, "Validation Failed");
        }
        other => panic!("expected an API error, got {other:?}"),
    }
}

#[tokio::test]
async fn pr_files_returns_changed_paths() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/hello/pulls/3/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "filename": "src/auth/login.rs" },
            { "filename": "docs/auth.md" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    let files = client.pr_files(3).await.unwrap();
    assert_eq!(files, ["src/auth/login.rs", "docs/auth.md"]);
}

#[tokio::test]
async fn sync_creates_missing_labels_and_patches_drift() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/hello/labels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "name": "bug", "color": "d73a4a", "description": "Something broke" },
            { "name": "documentation", "color": "000000", "description": null }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/repos/octo/hello/labels/documentation"))
        .and(body_json(json!({ "color": "0075ca", "description": "" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/repos/octo/hello/labels"))
        .and(body_json(json!({
            "name": "needs-triage",
            "color": "ededed",
            "description": "No substantive label applies"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let mut specs = IndexMap::new();
    specs.insert(
        "bug".to_string(),
        spec("bug", "#D73A4A", "Something broke"),
    );
    specs.insert(
        "docs".to_string(),
        spec("documentation", "0075ca", ""),
    );
    specs.insert(
        "triage".to_string(),
        spec("needs-triage", "ededed", "No substantive label applies"),
    );

    let mut client = client_for(&server);
    client.sync_labels(&specs).await.unwrap();
}

#[tokio::test]
async fn exhausted_rate_limit_surfaces_a_dedicated_error() {
    let server = MockServer::start().await;

    let reset = chrono::Utc::now().timestamp() + 60;
    Mock::given(method("POST"))
        .and(path("/repos/octo/hello/issues/1/labels"))
        .respond_with(
            ResponseTemplate::new(403)
                .insert_header("x-ratelimit-remaining", "0")
                .insert_header("x-ratelimit-reset", reset.to_string().as_str())
                .set_body_json(json!({ "message": "API rate limit exceeded" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    let err = client.add_label(1, "bug").await.unwrap_err();
    assert!(matches!(err, GithubError::RateLimited { .. }));
}

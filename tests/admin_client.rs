use ghost_admin::cleanup::{DeleteFailure, DeleteOutcome};
use ghost_admin::token::AdminClaims;
use ghost_admin::{AdminClient, AdminError};
use httpmock::MockServer;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde_json::json;
use std::io::Write;
use std::sync::{Arc, Mutex};
use tracing::Level;

const KEY_ID: &str = "65f1a2b3c4d5e6f708192a3b";
const SECRET_HEX: &str = "00112233445566778899aabbccddeeff00112233445566778899aabbccddeeff";
const PRESERVED: &str = "jonathan.pares@gmail.com";

fn key() -> String {
    format!("{KEY_ID}:{SECRET_HEX}")
}

fn client(server: &MockServer) -> AdminClient {
    AdminClient::new(&server.base_url(), &key()).expect("client")
}

fn members_body() -> serde_json::Value {
    json!({
        "members": [
            {"id": "1", "email": "a@x.com", "name": "A"},
            {"id": "2", "email": "JONATHAN.PARES@gmail.com", "name": "Jonathan"},
            {"id": "3", "email": "B@X.com", "name": null}
        ],
        "meta": {"pagination": {"page": 1, "limit": 100, "pages": 1, "total": 3}}
    })
}

#[tokio::test]
async fn requests_carry_signed_admin_token() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("GET")
            .path("/ghost/api/admin/members/")
            .query_param("limit", "100")
            .query_param("page", "1")
            .header("content-type", "application/json")
            .header_exists("authorization");
        then.status(200).json_body(json!({"members": []}));
    });

    let client = client(&server);
    let members = client.get_members().await.expect("members");
    assert!(members.is_empty());
    mock.assert();

    let header = client
        .headers()
        .get("authorization")
        .expect("authorization")
        .to_str()
        .expect("ascii");
    let token = header.strip_prefix("Ghost ").expect("Ghost scheme");

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&["/admin/"]);
    let secret = hex::decode(SECRET_HEX).expect("hex");
    let decoded = decode::<AdminClaims>(token, &DecodingKey::from_secret(&secret), &validation)
        .expect("token verifies");
    assert_eq!(decoded.header.kid.as_deref(), Some(KEY_ID));
    assert_eq!(decoded.claims.exp - decoded.claims.iat, 300);
}

#[tokio::test]
async fn get_members_keeps_server_order() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("GET").path("/ghost/api/admin/members/");
        then.status(200).json_body(members_body());
    });

    let members = client(&server).get_members().await.expect("members");
    let emails: Vec<&str> = members.iter().map(|m| m.email.as_str()).collect();
    assert_eq!(emails, ["a@x.com", "JONATHAN.PARES@gmail.com", "B@X.com"]);
    assert_eq!(members[0].extra.get("name"), Some(&json!("A")));
}

#[tokio::test]
async fn cleanup_deletes_everyone_but_the_preserved_address() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("GET").path("/ghost/api/admin/members/");
        then.status(200).json_body(members_body());
    });
    let delete_a = server.mock(|when, then| {
        when.method("DELETE").path("/ghost/api/admin/members/1/");
        then.status(204);
    });
    let delete_preserved = server.mock(|when, then| {
        when.method("DELETE").path("/ghost/api/admin/members/2/");
        then.status(204);
    });
    let delete_b = server.mock(|when, then| {
        when.method("DELETE").path("/ghost/api/admin/members/3/");
        then.status(204);
    });

    let report = client(&server)
        .cleanup_members(PRESERVED)
        .await
        .expect("cleanup");

    delete_a.assert_calls(1);
    delete_b.assert_calls(1);
    delete_preserved.assert_calls(0);

    let ids: Vec<&str> = report.deletions().iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, ["1", "3"]);
    assert_eq!(report.deleted_count(), 2);
    assert_eq!(report.failed_count(), 0);
}

#[tokio::test]
async fn failed_deletion_does_not_abort_cleanup() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("GET").path("/ghost/api/admin/members/");
        then.status(200).json_body(members_body());
    });
    let delete_a = server.mock(|when, then| {
        when.method("DELETE").path("/ghost/api/admin/members/1/");
        then.status(500)
            .json_body(json!({"errors": [{"message": "Internal server error"}]}));
    });
    let delete_b = server.mock(|when, then| {
        when.method("DELETE").path("/ghost/api/admin/members/3/");
        then.status(204);
    });

    let report = client(&server)
        .cleanup_members(PRESERVED)
        .await
        .expect("cleanup still completes");

    delete_a.assert_calls(1);
    delete_b.assert_calls(1);
    assert_eq!(
        report.deletions()[0].outcome,
        DeleteOutcome::Failed(DeleteFailure::Status(500))
    );
    assert_eq!(report.deletions()[1].outcome, DeleteOutcome::Deleted);
    assert_eq!(report.failed_count(), 1);
}

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().expect("log buffer")).into_owned()
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().expect("log buffer").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn cleanup_progress_stays_out_of_info_logs() {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("GET").path("/ghost/api/admin/members/");
        then.status(200).json_body(members_body());
    });
    server.mock(|when, then| {
        when.method("DELETE").path("/ghost/api/admin/members/1/");
        then.status(204);
    });
    server.mock(|when, then| {
        when.method("DELETE").path("/ghost/api/admin/members/3/");
        then.status(500);
    });

    let report = client(&server)
        .cleanup_members(PRESERVED)
        .await
        .expect("cleanup");
    assert_eq!(report.deleted_count(), 1);
    assert_eq!(report.failed_count(), 1);

    let output = logs.contents();
    assert!(!output.contains("Member deleted"), "{output}");
    assert!(!output.contains("Error deleting"), "{output}");
    assert!(!output.contains("a@x.com"), "{output}");
}

#[tokio::test]
async fn delete_member_reports_transport_errors() {
    // Nothing listens on the discard port.
    let client = AdminClient::new("http://127.0.0.1:9", &key()).expect("client");
    let deletion = client.delete_member("1", "a@x.com").await;

    assert!(matches!(
        deletion.outcome,
        DeleteOutcome::Failed(DeleteFailure::Transport(_))
    ));
    assert!(deletion.to_string().starts_with("Error deleting a@x.com: "));
}

#[tokio::test]
async fn cleanup_propagates_member_fetch_failure() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("GET").path("/ghost/api/admin/members/");
        then.status(401).json_body(json!({
            "errors": [{"message": "Invalid token", "type": "UnauthorizedError"}]
        }));
    });

    let err = client(&server)
        .cleanup_members(PRESERVED)
        .await
        .expect_err("fetch failure is fatal");
    match err {
        AdminError::Api { status, message } => {
            assert_eq!(status.as_u16(), 401);
            assert_eq!(message.as_deref(), Some("Invalid token"));
        }
        other => panic!("unexpected error {other}"),
    }
}

#[tokio::test]
async fn get_posts_requests_restricted_fields() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("GET")
            .path("/ghost/api/admin/posts/")
            .query_param("limit", "100")
            .query_param("page", "1")
            .query_param("fields", "id,title,url,status,updated_at");
        then.status(200).json_body(json!({
            "posts": [
                {"id": "p2", "title": "Second", "url": "https://blog.example.com/second/", "status": "draft", "updated_at": "2024-05-02T09:00:00.000Z"},
                {"id": "p1", "title": "First", "url": "https://blog.example.com/first/", "status": "published", "updated_at": "2024-05-01T09:00:00.000Z"}
            ]
        }));
    });

    let posts = client(&server).get_posts().await.expect("posts");
    mock.assert();
    let ids: Vec<&str> = posts.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, ["p2", "p1"]);
    assert_eq!(posts[1].status(), Some("published"));
}

#[tokio::test]
async fn get_post_returns_single_element() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("GET")
            .path("/ghost/api/admin/posts/p1")
            .query_param("fields", "id,title,url,status,updated_at");
        then.status(200).json_body(json!({
            "posts": [{"id": "p1", "title": "First", "status": "published"}]
        }));
    });

    let post = client(&server).get_post("p1").await.expect("post");
    mock.assert();
    assert_eq!(post.id, "p1");
    assert_eq!(post.title(), Some("First"));
}

#[tokio::test]
async fn copy_post_returns_the_new_copy() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("POST").path("/ghost/api/admin/posts/p1/copy");
        then.status(201).json_body(json!({
            "posts": [{"id": "p9", "title": "First (Copy)", "status": "draft", "slug": "first-copy"}]
        }));
    });

    let post = client(&server).copy_post("p1").await.expect("copy");
    mock.assert();
    assert_eq!(post.id, "p9");
    assert_eq!(post.title(), Some("First (Copy)"));
    assert_eq!(post.extra.get("slug"), Some(&json!("first-copy")));
}

#[tokio::test]
async fn copied_post_serializes_as_the_server_sent_it() {
    let server = MockServer::start();
    let returned = json!({
        "id": "p9",
        "title": null,
        "updated_at": "2024-05-01T10:00:00.000Z",
        "slug": "s"
    });
    let body = json!({"posts": [returned.clone()]});
    server.mock(|when, then| {
        when.method("POST").path("/ghost/api/admin/posts/p1/copy");
        then.status(201).json_body(body);
    });

    let post = client(&server).copy_post("p1").await.expect("copy");
    assert_eq!(post.updated_at(), Some("2024-05-01T10:00:00.000Z"));
    assert_eq!(serde_json::to_value(&post).expect("serialize"), returned);
}

#[tokio::test]
async fn update_post_wraps_data_in_posts_envelope() {
    let server = MockServer::start();
    let data = json!({"title": "Renamed", "updated_at": "2024-05-01T09:00:00.000Z"});
    let mock = server.mock(|when, then| {
        when.method("PUT")
            .path("/ghost/api/admin/posts/p1/")
            .header("content-type", "application/json")
            .body(r#"{"posts":[{"title":"Renamed","updated_at":"2024-05-01T09:00:00.000Z"}]}"#);
        then.status(200).json_body(json!({
            "posts": [{"id": "p1", "title": "Renamed", "updated_at": "2024-05-03T10:00:00.000Z"}]
        }));
    });

    let post = client(&server).update_post("p1", &data).await.expect("update");
    mock.assert();
    assert_eq!(post.title(), Some("Renamed"));
}

#[tokio::test]
async fn empty_post_collection_is_reported() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("POST").path("/ghost/api/admin/posts/p1/copy");
        then.status(200).json_body(json!({"posts": []}));
    });

    let err = client(&server).copy_post("p1").await.expect_err("empty");
    assert!(matches!(err, AdminError::EmptyCollection { resource: "posts" }));
}

#[tokio::test]
async fn api_error_without_message_is_tolerated() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("GET").path("/ghost/api/admin/posts/p1");
        then.status(503).body("upstream unavailable");
    });

    let err = client(&server).get_post("p1").await.expect_err("503");
    assert_eq!(err.to_string(), "API error: 503 Service Unavailable");
}

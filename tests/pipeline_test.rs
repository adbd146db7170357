//! 通知流水线集成测试
//!
//! 使用 mockito 同时模拟内容API和 Teams webhook

use chrono::{Duration, Local, NaiveDate, NaiveDateTime};
use mockito::{Matcher, Mock, ServerGuard};
use post_notifier::cli::Args;
use post_notifier::config::{Config, FetchFailurePolicy, RunConfig, TeamsConfig, WordPressConfig};
use post_notifier::{Pipeline, RunSummary};
use serde_json::{json, Value};
use std::io::Write;
use tempfile::NamedTempFile;

const WEBHOOK_PATH: &str = "/webhookb2/abc";

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 6)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

fn timestamp(at: NaiveDateTime) -> String {
    at.format("%Y-%m-%dT%H:%M:%S").to_string()
}

fn post_json(id: u64, status: &str, modified: NaiveDateTime) -> Value {
    json!({
        "id": id,
        "title": {"rendered": format!("Beitrag {id}")},
        "author": 5,
        "date": timestamp(modified - Duration::days(3)),
        "modified": timestamp(modified),
        "link": format!("https://blog.example.com/?p={id}"),
        "status": status
    })
}

fn create_test_config(server_url: &str) -> Config {
    Config {
        wordpress: WordPressConfig {
            base_url: server_url.to_string(),
            username: "user".to_string(),
            application_password: "secret".to_string(),
        },
        teams: TeamsConfig {
            webhook_url: format!("{server_url}{WEBHOOK_PATH}"),
        },
        run: RunConfig {
            delivery_delay_seconds: 0,
            request_timeout_seconds: 5,
            ..RunConfig::default()
        },
    }
}

async fn mock_posts(server: &mut ServerGuard, posts: Value) -> Mock {
    server
        .mock("GET", "/wp-json/wp/v2/posts")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(posts.to_string())
        .create_async()
        .await
}

async fn mock_author(server: &mut ServerGuard) -> Mock {
    server
        .mock("GET", "/wp-json/wp/v2/users/5")
        .with_status(200)
        .with_body(r#"{"id": 5, "name": "Erika Mustermann"}"#)
        .create_async()
        .await
}

#[tokio::test]
async fn test_only_recent_post_is_delivered() {
    let mut server = mockito::Server::new_async().await;
    let posts = json!([
        post_json(1, "draft", now() - Duration::hours(2)),
        post_json(2, "publish", now() - Duration::hours(30)),
    ]);
    let _posts = mock_posts(&mut server, posts).await;
    let _author = mock_author(&mut server).await;
    let admin_uri = format!("{}/wp-admin/edit.php", server.url());
    let webhook = server
        .mock("POST", WEBHOOK_PATH)
        .match_body(Matcher::Json(json!({
            "@type": "MessageCard",
            "@context": "https://schema.org/extensions",
            "title": "Blogpost erstellt/geändert: Beitrag 1",
            "summary": "Blogpost erstellt/geändert: Beitrag 1",
            "themeColor": "3AB660",
            "sections": [{"facts": [
                {"name": "Autor", "value": "Erika Mustermann"},
                {"name": "Datum", "value": "03.03.2024 10:00"},
                {"name": "Modified", "value": "06.03.2024 10:00"},
                {"name": "Link", "value": "[https://blog.example.com/?p=1](https://blog.example.com/?p=1)"},
                {"name": "Status", "value": "Draft"}
            ]}],
            "potentialAction": [{
                "@type": "OpenUri",
                "name": "Blog - Admin",
                "targets": [{"os": "default", "uri": admin_uri}]
            }]
        })))
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let config = create_test_config(&server.url());
    let summary = Pipeline::new(&config)
        .unwrap()
        .run_at(now())
        .await
        .unwrap();

    webhook.assert_async().await;
    assert_eq!(
        summary,
        RunSummary {
            fetched: 1,
            delivered: 1,
            skipped: 0
        }
    );
}

#[tokio::test]
async fn test_one_delivery_per_post() {
    let mut server = mockito::Server::new_async().await;
    let posts = json!([
        post_json(1, "publish", now() - Duration::hours(1)),
        post_json(2, "future", now() - Duration::hours(3)),
        post_json(3, "private", now() - Duration::hours(5)),
    ]);
    let _posts = mock_posts(&mut server, posts).await;
    let author = server
        .mock("GET", "/wp-json/wp/v2/users/5")
        .with_status(200)
        .with_body(r#"{"id": 5, "name": "Erika Mustermann"}"#)
        .expect(3)
        .create_async()
        .await;
    let webhook = server
        .mock("POST", WEBHOOK_PATH)
        .with_status(200)
        .expect(3)
        .create_async()
        .await;

    let config = create_test_config(&server.url());
    let summary = Pipeline::new(&config)
        .unwrap()
        .run_at(now())
        .await
        .unwrap();

    webhook.assert_async().await;
    author.assert_async().await;
    assert_eq!(summary.delivered, 3);
}

#[tokio::test]
async fn test_dry_run_never_calls_webhook() {
    let mut server = mockito::Server::new_async().await;
    let posts = json!([
        post_json(1, "draft", now() - Duration::hours(1)),
        post_json(2, "pending", now() - Duration::hours(2)),
    ]);
    let _posts = mock_posts(&mut server, posts).await;
    let _author = mock_author(&mut server).await;
    let webhook = server
        .mock("POST", WEBHOOK_PATH)
        .expect(0)
        .create_async()
        .await;

    let mut config = create_test_config(&server.url());
    config.run.dry_run = true;
    let summary = Pipeline::new(&config)
        .unwrap()
        .run_at(now())
        .await
        .unwrap();

    webhook.assert_async().await;
    assert_eq!(
        summary,
        RunSummary {
            fetched: 2,
            delivered: 0,
            skipped: 2
        }
    );
}

#[tokio::test]
async fn test_without_author_lookup_no_user_request() {
    let mut server = mockito::Server::new_async().await;
    let _posts = mock_posts(
        &mut server,
        json!([post_json(1, "draft", now() - Duration::hours(1))]),
    )
    .await;
    let author = server
        .mock("GET", Matcher::Regex(r"^/wp-json/wp/v2/users/".to_string()))
        .expect(0)
        .create_async()
        .await;
    let webhook = server
        .mock("POST", WEBHOOK_PATH)
        .match_body(Matcher::Regex("Datum".to_string()))
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let mut config = create_test_config(&server.url());
    config.run.resolve_authors = false;
    Pipeline::new(&config)
        .unwrap()
        .run_at(now())
        .await
        .unwrap();

    author.assert_async().await;
    webhook.assert_async().await;
}

#[tokio::test]
async fn test_delivery_failure_aborts_remaining_posts() {
    let mut server = mockito::Server::new_async().await;
    let posts = json!([
        post_json(1, "draft", now() - Duration::hours(1)),
        post_json(2, "draft", now() - Duration::hours(2)),
    ]);
    let _posts = mock_posts(&mut server, posts).await;
    let _author = mock_author(&mut server).await;
    let webhook = server
        .mock("POST", WEBHOOK_PATH)
        .with_status(500)
        .expect(1)
        .create_async()
        .await;

    let config = create_test_config(&server.url());
    let result = Pipeline::new(&config).unwrap().run_at(now()).await;

    assert!(result.is_err());
    webhook.assert_async().await;
}

#[tokio::test]
async fn test_connection_error_recovers_empty() {
    // 端口1上没有服务，连接会被拒绝
    let config = create_test_config("http://127.0.0.1:1");
    let summary = Pipeline::new(&config)
        .unwrap()
        .run_at(now())
        .await
        .unwrap();

    assert_eq!(summary, RunSummary::default());
}

#[tokio::test]
async fn test_connection_error_propagates_with_abort_policy() {
    let mut config = create_test_config("http://127.0.0.1:1");
    config.run.fetch_failure_policy = FetchFailurePolicy::Abort;

    let result = Pipeline::new(&config).unwrap().run_at(now()).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_app_run_with_config_file() {
    let mut server = mockito::Server::new_async().await;
    let local_now = Local::now().naive_local();
    let posts = json!([
        post_json(1, "draft", local_now - Duration::hours(2)),
        post_json(2, "publish", local_now - Duration::hours(30)),
    ]);
    let _posts = mock_posts(&mut server, posts).await;
    let webhook = server
        .mock("POST", WEBHOOK_PATH)
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let toml = format!(
        r#"
[wordpress]
base_url = "{url}"
username = "user"
application_password = "secret"

[teams]
webhook_url = "{url}{WEBHOOK_PATH}"

[run]
delivery_delay_seconds = 0
"#,
        url = server.url()
    );
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(toml.as_bytes()).unwrap();

    let args = Args {
        config: Some(file.path().to_path_buf()),
        no_author_lookup: true,
        ..Args::default()
    };
    let summary = post_notifier::app::run(&args).await.unwrap();

    webhook.assert_async().await;
    assert_eq!(summary.delivered, 1);
}

#[tokio::test]
async fn test_app_run_fails_on_fetch_error_flag() {
    let toml = r#"
[wordpress]
base_url = "http://127.0.0.1:1"
username = "user"
application_password = "secret"

[teams]
webhook_url = "http://127.0.0.1:1/webhookb2/abc"
"#;
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(toml.as_bytes()).unwrap();

    let args = Args {
        config: Some(file.path().to_path_buf()),
        fail_on_fetch_error: true,
        ..Args::default()
    };
    assert!(post_notifier::app::run(&args).await.is_err());

    let args = Args {
        config: Some(file.path().to_path_buf()),
        ..Args::default()
    };
    let summary = post_notifier::app::run(&args).await.unwrap();
    assert_eq!(summary, RunSummary::default());
}

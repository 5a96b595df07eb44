use devgeeks_client::config::ClientOptions;
use devgeeks_client::JobBoard;
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn job_row(id: &str) -> serde_json::Value {
    json!({
        "id": id,
        "title": "Backend Engineer",
        "company": "Acme",
        "location": "Remote",
        "type": "Full-time",
        "salary": null,
        "description": "Build services",
        "requirements": ["Rust"],
        "posted_date": "2024-05-01T10:00:00Z",
        "featured": false
    })
}

/// Minimal Phoenix-protocol endpoint: waits for the channel join, pushes one
/// insert notification, then keeps the connection open for heartbeats.
async fn change_feed_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let ws = match tokio_tungstenite::accept_async(stream).await {
                    Ok(ws) => ws,
                    Err(_) => return,
                };
                let (mut write, mut read) = ws.split();

                loop {
                    match read.next().await {
                        Some(Ok(Message::Text(text))) if text.contains("phx_join") => break,
                        Some(Ok(_)) => continue,
                        _ => return,
                    }
                }

                let event = json!({
                    "topic": "realtime:public:jobs",
                    "event": "postgres_changes",
                    "payload": {
                        "data": {
                            "type": "INSERT",
                            "table": "jobs",
                            "record": { "id": "j1" }
                        }
                    },
                    "ref": null
                });
                if write.send(Message::Text(event.to_string())).await.is_err() {
                    return;
                }

                while let Some(Ok(_)) = read.next().await {}
            });
        }
    });

    format!("http://{}", addr)
}

#[tokio::test]
async fn watch_reloads_the_list_on_a_change_notification() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([job_row("j1")])))
        .mount(&server)
        .await;

    let realtime_url = change_feed_server().await;
    let options = ClientOptions::default().with_realtime_url(&realtime_url);
    let board = JobBoard::new_with_options(&server.uri(), "anon", options);
    let repo = board.jobs();

    assert!(repo.list().is_empty());
    let watch = repo.watch();

    let mut reloaded = false;
    for _ in 0..100 {
        if !repo.list().is_empty() {
            reloaded = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    drop(watch);

    assert!(reloaded, "change notification did not trigger a reload");
    assert_eq!(repo.list()[0].id, "j1");
    assert!(!repo.loading());
}

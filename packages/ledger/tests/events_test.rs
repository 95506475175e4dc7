use std::time::Duration;

use futures::StreamExt;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use vote_ledger::app::create_app;
use vote_ledger::utils::test_setup::{submission, test_state};

#[tokio::test]
async fn test_vote_cast_is_streamed() {
    let state = test_state();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = create_app(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let (mut socket, _) = connect_async(format!("ws://{addr}/api/events"))
        .await
        .unwrap();

    // The subscription is taken inside the upgrade; wait until it exists.
    tokio::time::timeout(Duration::from_secs(5), async {
        while state.ledger.subscriber_count() == 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    let vote = submission(1, "4242", "judy");
    state.ledger.cast_vote(&vote).await.unwrap();

    let message = tokio::time::timeout(Duration::from_secs(5), socket.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    let Message::Text(text) = message else {
        panic!("expected a text frame, got {message:?}");
    };
    let event: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(
        event,
        json!({
            "messageType": "VoteCast",
            "nullifierHash": vote.public_signals[0],
            "voteHash": vote.public_signals[1],
        })
    );
}

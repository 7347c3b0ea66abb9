//! HTTP integration tests for the session endpoints.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code

use axum::http::StatusCode;
use axum_test::TestServer;
use bingo_testing::seeded;
use bingo_web::{build_router, AppState, CORRELATION_ID_HEADER};
use serde_json::{json, Value};
use std::collections::HashSet;

fn server_with_seed(seed: u64) -> TestServer {
    TestServer::new(build_router(AppState::new(seeded(seed), 64, 100))).unwrap()
}

fn server() -> TestServer {
    server_with_seed(7)
}

async fn bulk(server: &TestServer, names: &[&str]) -> Vec<u64> {
    let response = server
        .post("/session/tickets/bulk")
        .json(&json!({ "names": names }))
        .await;
    response.assert_status_ok();
    response
        .json::<Vec<Value>>()
        .iter()
        .map(|t| t["ticketId"].as_u64().unwrap())
        .collect()
}

async fn numbers_of(server: &TestServer, id: u64) -> Vec<u64> {
    let ticket = server.get(&format!("/session/ticket/{id}")).await.json::<Value>();
    ticket["numbers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n.as_u64().unwrap())
        .collect()
}

#[tokio::test]
async fn issue_ticket_with_and_without_body() {
    let server = server();

    let named = server
        .post("/session/ticket")
        .json(&json!({ "name": "Maria" }))
        .await
        .json::<Value>();
    let id = named["ticketId"].as_u64().unwrap();
    assert!((10_000..=99_999).contains(&id));
    assert_eq!(named["name"], "Maria");

    let anonymous = server.post("/session/ticket").await.json::<Value>();
    let anon_id = anonymous["ticketId"].as_u64().unwrap();
    assert_eq!(anonymous["name"], format!("Player {anon_id}"));

    let ticket = server.get(&format!("/session/ticket/{id}")).await.json::<Value>();
    assert_eq!(ticket["id"], id);
    assert_eq!(ticket["ready"], false);
    assert_eq!(ticket["winner"], false);
    let numbers: HashSet<u64> = numbers_of(&server, id).await.into_iter().collect();
    assert_eq!(numbers.len(), 15);
    assert!(numbers.iter().all(|n| (1..=75).contains(n)));
}

#[tokio::test]
async fn unknown_ticket_is_not_found() {
    let server = server();

    let response = server.get("/session/ticket/12345").await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body = response.json::<Value>();
    assert_eq!(body["code"], "NOT_FOUND");
    assert!(body["error"].as_str().unwrap().contains("12345"));

    server
        .post("/session/ready/12345")
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .post("/session/bingo/12345")
        .json(&json!({ "marked": [] }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_ticket_ids_are_not_found() {
    let server = server();

    for path in ["/session/ticket/abc", "/session/ticket/123", "/session/ticket/99999999999"] {
        let response = server.get(path).await;
        response.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(response.json::<Value>()["code"], "NOT_FOUND");
    }

    let response = server.post("/session/ready/abc").await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(
        response.json::<Value>()["error"],
        "Ticket with id abc not found"
    );
    server
        .post("/session/bingo/-1")
        .json(&json!({ "marked": [] }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn bulk_rejects_bad_input() {
    let server = server();

    for body in [
        json!({ "names": [] }),
        json!({ "names": ["  ", ""] }),
        json!({ "names": "A,B" }),
        json!({}),
    ] {
        let response = server.post("/session/tickets/bulk").json(&body).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["code"], "BAD_REQUEST");
    }
}

#[tokio::test]
async fn bulk_skips_blank_names() {
    let server = server();
    let response = server
        .post("/session/tickets/bulk")
        .json(&json!({ "names": ["A", " ", "B "] }))
        .await
        .json::<Vec<Value>>();

    let names: Vec<&str> = response.iter().map(|t| t["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["A", "B"]);

    let state = server.get("/session/state").await.json::<Value>();
    assert_eq!(state["expectedPlayerCount"], 2);
}

#[tokio::test]
async fn readiness_gate_holds_start() {
    let server = server();
    let ids = bulk(&server, &["A", "B", "C"]).await;

    for id in &ids[..2] {
        let ready = server.post(&format!("/session/ready/{id}")).await.json::<Value>();
        assert_eq!(ready, json!({ "ok": true, "allReady": false }));
    }

    let refused = server.post("/session/start").await;
    refused.assert_status_ok();
    assert_eq!(
        refused.json::<Value>(),
        json!({ "ok": false, "reason": "not_all_ready" })
    );

    let last = server
        .post(&format!("/session/ready/{}", ids[2]))
        .await
        .json::<Value>();
    assert_eq!(last["allReady"], true);

    let started = server.post("/session/start").await.json::<Value>();
    assert_eq!(started, json!({ "ok": true }));
}

#[tokio::test]
async fn draw_requires_running_session() {
    let server = server();

    let response = server.get("/session/draw").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!({ "ok": false }));

    server.post("/session/start").await.assert_status_ok();
    let drawn = server.get("/session/draw").await.json::<Value>();
    let number = drawn["number"].as_u64().unwrap();
    assert_eq!(drawn["drawn"], json!([number]));

    server.post("/session/stop").await.assert_status_ok();
    assert_eq!(server.get("/session/draw").await.json::<Value>(), json!({ "ok": false }));
}

#[tokio::test]
async fn drawing_every_number_reports_done() {
    let server = server();
    server.post("/session/start").await;

    let mut seen = HashSet::new();
    for _ in 0..75 {
        let body = server.get("/session/draw").await.json::<Value>();
        assert!(seen.insert(body["number"].as_u64().unwrap()));
    }
    assert_eq!(seen.len(), 75);

    // Pool drained: the session went idle
    assert_eq!(server.get("/session/draw").await.json::<Value>(), json!({ "ok": false }));
    assert_eq!(server.get("/session/state").await.json::<Value>()["status"], "idle");

    // Restarting with nothing left to draw
    server.post("/session/start").await;
    assert_eq!(server.get("/session/draw").await.json::<Value>(), json!({ "done": true }));
}

#[tokio::test]
async fn claim_is_verified_against_drawn_numbers() {
    let server = server();
    let id = server.post("/session/ticket").await.json::<Value>()["ticketId"]
        .as_u64()
        .unwrap();
    let numbers = numbers_of(&server, id).await;

    server.post("/session/start").await;

    // Claim with every number marked before any draw
    let claim = server
        .post(&format!("/session/bingo/{id}"))
        .json(&json!({ "marked": numbers }))
        .await
        .json::<Value>();
    assert_eq!(claim, json!({ "winner": false }));
    assert_eq!(server.get("/session/state").await.json::<Value>()["status"], "running");
}

#[tokio::test]
async fn full_game_scenario() {
    let server = server_with_seed(2024);
    let ids = bulk(&server, &["A", "B"]).await;
    assert_eq!(ids.len(), 2);

    let first = server
        .post(&format!("/session/ready/{}", ids[0]))
        .await
        .json::<Value>();
    assert_eq!(first["allReady"], false);
    let second = server
        .post(&format!("/session/ready/{}", ids[1]))
        .await
        .json::<Value>();
    assert_eq!(second["allReady"], true);

    assert_eq!(server.post("/session/start").await.json::<Value>(), json!({ "ok": true }));

    let tickets = [numbers_of(&server, ids[0]).await, numbers_of(&server, ids[1]).await];
    let mut drawn: HashSet<u64> = HashSet::new();
    let winner = loop {
        let body = server.get("/session/draw").await.json::<Value>();
        drawn.insert(body["number"].as_u64().unwrap());
        if let Some(index) = tickets
            .iter()
            .position(|numbers| numbers.iter().all(|n| drawn.contains(n)))
        {
            break ids[index];
        }
    };

    let claim = server
        .post(&format!("/session/bingo/{winner}"))
        .json(&json!({ "marked": [] }))
        .await
        .json::<Value>();
    assert_eq!(claim, json!({ "winner": true }));

    let state = server.get("/session/state").await.json::<Value>();
    assert_eq!(state["status"], "over");
    assert_eq!(state["gameOver"], true);

    assert_eq!(server.get("/session/draw").await.json::<Value>(), json!({ "ok": false }));
    assert_eq!(
        server.post("/session/start").await.json::<Value>(),
        json!({ "ok": false, "gameOver": true })
    );

    // Stopping a finished game does not reopen it
    assert_eq!(server.post("/session/stop").await.json::<Value>(), json!({ "ok": true }));
    assert_eq!(server.get("/session/state").await.json::<Value>()["status"], "over");
    assert_eq!(
        server.post("/session/start").await.json::<Value>(),
        json!({ "ok": false, "gameOver": true })
    );
}

#[tokio::test]
async fn reset_keeps_players_new_game_drops_them() {
    let server = server();
    let ids = bulk(&server, &["A"]).await;
    let numbers = numbers_of(&server, ids[0]).await;
    server.post(&format!("/session/ready/{}", ids[0])).await;
    server.post("/session/start").await;
    server.get("/session/draw").await;

    assert_eq!(server.post("/session/reset").await.json::<Value>(), json!({ "ok": true }));
    let ticket = server
        .get(&format!("/session/ticket/{}", ids[0]))
        .await
        .json::<Value>();
    assert_eq!(ticket["name"], "A");
    assert_eq!(ticket["ready"], false);
    assert_eq!(numbers_of(&server, ids[0]).await, numbers);

    let state = server.get("/session/state").await.json::<Value>();
    assert_eq!(state["drawn"], json!([]));
    assert_eq!(state["status"], "idle");

    assert_eq!(server.post("/session/newgame").await.json::<Value>(), json!({ "ok": true }));
    server
        .get(&format!("/session/ticket/{}", ids[0]))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    assert_eq!(
        server.get("/session/state").await.json::<Value>()["expectedPlayerCount"],
        0
    );
}

#[tokio::test]
async fn state_endpoint_matches_push_shape() {
    let server = server();
    server
        .post("/session/ticket")
        .json(&json!({ "name": "A" }))
        .await;

    let state = server.get("/session/state").await.json::<Value>();
    assert_eq!(state["type"], "state");
    assert_eq!(state["status"], "idle");
    assert_eq!(state["gameOver"], false);
    assert_eq!(state["expectedPlayerCount"], 0);

    let player = &state["players"][0];
    assert_eq!(player["name"], "A");
    assert_eq!(player["hits"], 0);
    assert_eq!(player["total"], 15);
    assert_eq!(player["progressPercent"], 0);
}

#[tokio::test]
async fn responses_carry_correlation_id() {
    let server = server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    response.assert_text("ok");
    assert!(!response.header(CORRELATION_ID_HEADER).is_empty());
}

#[tokio::test]
async fn readiness_probe_reports_store() {
    let server = server();
    let body = server.get("/health/ready").await.json::<Value>();
    assert_eq!(body["component"], "store");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn metrics_endpoint() {
    let disabled = server();
    disabled.get("/metrics").await.assert_status(StatusCode::NOT_FOUND);

    let handle = bingo_runtime::metrics::install().unwrap();
    let state = AppState::new(seeded(1), 64, 100).with_metrics(handle);
    let server = TestServer::new(build_router(state)).unwrap();

    server.post("/session/ticket").await;
    server.post("/session/start").await;
    server.get("/session/draw").await;

    let response = server.get("/metrics").await;
    response.assert_status_ok();
    let text = response.text();
    assert!(text.contains("bingo_tickets_issued_total"));
    assert!(text.contains("bingo_numbers_drawn_total"));
}

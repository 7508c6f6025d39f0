use core::num::NonZeroU32;
use std::io::Write as _;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use hyper::StatusCode;
use presentation_voting_backend::{setup_state, VotingState};
use presentation_voting_config::{Config, VotingModeKind};
use presentation_voting_e2e::{Result, TestServer};
use serde_json::{json, Value};

const PASSWORD: &str = "e2e-secret";

const ROSTER: &str = r#"{
    "presentations": [
        { "id": 1, "teamName": "Alpha", "title": "Compilers for fun" },
        { "id": 2, "teamName": "Beta", "title": "Borrowing without tears" },
        { "id": 3, "teamName": "Gamma", "title": "Async all the way down" }
    ]
}"#;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn config(mode: VotingModeKind, required: u32, roster: &tempfile::NamedTempFile) -> Config {
    Config {
        listen_address: SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 0)),
        admin_password: PASSWORD.to_owned(),
        voting_mode: mode,
        required_selections: NonZeroU32::new(required).expect("non-zero"),
        roster_file: Some(roster.path().to_path_buf()),
        max_body_bytes: 64 * 1024,
        selected_theme: 6,
        random_theme: false,
    }
}

fn roster_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(ROSTER.as_bytes()).expect("write roster");
    file
}

async fn start(mode: VotingModeKind, required: u32) -> Result<TestServer> {
    init_tracing();
    let roster = roster_file();
    let state: VotingState =
        setup_state(&config(mode, required, &roster)).map_err(|err| err.to_string())?;
    TestServer::start(state).await
}

async fn new_session(server: &TestServer) -> Result<String> {
    let (status, body) = server.post("/api/session", &json!({})).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(body["sessionId"]
        .as_str()
        .expect("session id is a string")
        .to_owned())
}

async fn config_version(server: &TestServer) -> Result<Value> {
    let (status, body) = server.get("/api/config").await?;
    assert_eq!(status, StatusCode::OK);
    Ok(body["lastConfigUpdate"].clone())
}

fn selection_counts(stats: &Value) -> Vec<(u64, u64)> {
    stats["presentations"]
        .as_array()
        .expect("presentations array")
        .iter()
        .map(|entry| {
            (
                entry["presentationId"].as_u64().expect("id"),
                entry["selectionCount"].as_u64().expect("count"),
            )
        })
        .collect()
}

#[tokio::test]
async fn selection_vote_and_rule_change() -> Result<()> {
    let server = start(VotingModeKind::Selection, 2).await?;

    let (_, presentations) = server.get("/api/presentations").await?;
    assert_eq!(presentations["presentations"].as_array().map(Vec::len), Some(3));

    let session = new_session(&server).await?;
    let version = config_version(&server).await?;
    let (status, body) = server
        .post(
            "/api/votes",
            &json!({
                "sessionId": session,
                "selectedPresentationIds": [1, 2],
                "configTimestamp": version,
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, votes) = server.get(&format!("/api/votes/{session}")).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(votes["votes"], json!([1, 2]));

    let (status, _) = server
        .post(
            "/api/votes",
            &json!({
                "sessionId": " ",
                "selectedPresentationIds": [1, 2],
                "configTimestamp": version,
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, stats) = server.admin_get("/api/admin/stats", PASSWORD).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["totalUsers"], 1);
    assert_eq!(selection_counts(&stats), vec![(1, 1), (2, 1), (3, 0)]);

    let (status, _) = server
        .admin_post(
            "/api/admin/config",
            PASSWORD,
            &json!({ "requiredSelections": 3 }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);

    let (_, stats) = server.admin_get("/api/admin/stats", PASSWORD).await?;
    assert_eq!(stats["totalUsers"], 0);
    assert_eq!(stats["requiredSelections"], 3);
    let (status, _) = server.get(&format!("/api/votes/{session}")).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // the old config version is refused even with the right number of ids
    let (status, body) = server
        .post(
            "/api/votes",
            &json!({
                "sessionId": session,
                "selectedPresentationIds": [1, 2, 3],
                "configTimestamp": version,
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["requireReload"], true);

    server.stop().await
}

#[tokio::test]
async fn rating_vote_overwrites() -> Result<()> {
    let server = start(VotingModeKind::Rating, 1).await?;
    let session = new_session(&server).await?;

    for rating in [4, 2] {
        let (status, _) = server
            .post(
                "/api/votes",
                &json!({ "sessionId": session, "presentationId": 1, "rating": rating }),
            )
            .await?;
        assert_eq!(status, StatusCode::OK);
    }
    let (_, votes) = server.get(&format!("/api/votes/{session}")).await?;
    assert_eq!(votes["votes"], json!([{ "presentationId": 1, "rating": 2 }]));

    let (status, _) = server
        .post(
            "/api/votes",
            &json!({ "sessionId": session, "presentationId": 1, "rating": 6 }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, stats) = server.admin_get("/api/admin/stats", PASSWORD).await?;
    let first = &stats["presentations"][0];
    assert_eq!(first["presentationId"], 1);
    assert_eq!(first["voteCount"], 1);
    assert_eq!(first["totalRating"], 2);
    assert_eq!(first["averageRating"], 2.0);
    assert_eq!(stats["presentations"][1]["averageRating"], Value::Null);

    server.stop().await
}

#[tokio::test]
async fn closed_voting_and_admin_auth() -> Result<()> {
    let server = start(VotingModeKind::Selection, 1).await?;
    let session = new_session(&server).await?;

    let (status, _) = server
        .admin_post("/api/admin/toggle-voting", "wrong", &json!({ "active": false }))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = server
        .admin_post("/api/admin/toggle-voting", PASSWORD, &json!({ "active": false }))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["votingActive"], false);

    let version = config_version(&server).await?;
    let (status, body) = server
        .post(
            "/api/votes",
            &json!({
                "sessionId": session,
                "selectedPresentationIds": [1],
                "configTimestamp": version,
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Voting has ended");

    let (_, all) = server.admin_get("/api/admin/all-votes", PASSWORD).await?;
    assert_eq!(all["votes"], json!([]));

    server.stop().await
}

#[tokio::test]
async fn theme_and_health() -> Result<()> {
    let server = start(VotingModeKind::Selection, 1).await?;

    let (status, health) = server.get("/health").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "ok");

    let (_, theme) = server.get("/api/theme").await?;
    assert_eq!(theme["id"], 6);
    assert_eq!(theme["random"], false);

    let (status, _) = server
        .admin_post(
            "/api/admin/theme",
            PASSWORD,
            &json!({ "selectedTheme": 2, "randomTheme": true }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    let (_, theme) = server.get("/api/theme").await?;
    assert_eq!(theme["random"], true);
    assert!((1..=6).contains(&theme["id"].as_u64().expect("theme id")));

    let (status, _) = server.get("/api/unknown").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    server.stop().await
}

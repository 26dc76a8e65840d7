use std::net::SocketAddr;

use draftleague::api::create_router;
use draftleague::client::{ClientError, LeagueClient};
use draftleague::db::Database;
use draftleague::engine::{draft, league};
use draftleague::models::*;
use uuid::Uuid;

struct Running {
    client: LeagueClient,
    db: Database,
    commissioner: Uuid,
    season: Season,
}

/// Serve a fresh database on an ephemeral port and seed one season.
async fn start(players: usize) -> Running {
    let db = Database::open_memory().expect("Failed to create database");
    db.migrate().expect("Failed to migrate");

    let commissioner = Uuid::new_v4();
    let created = league::create_league(
        &db,
        CreateLeagueInput {
            name: "Client League".to_string(),
            commissioner_id: commissioner,
        },
    )
    .expect("Failed to create league");
    let season = league::create_season(
        &db,
        created.id,
        CreateSeasonInput {
            name: "Autumn".to_string(),
            config: None,
        },
        commissioner,
    )
    .expect("Failed to create season");
    for i in 0..players {
        league::add_player(
            &db,
            season.id,
            AddSeasonPlayerInput {
                user_id: Uuid::new_v4(),
                display_name: format!("Player {}", i + 1),
            },
            commissioner,
        )
        .expect("Failed to add player");
    }

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to read address");
    let app = create_router(db.clone());
    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
    });

    Running {
        client: LeagueClient::new(format!("http://{addr}/api/v1"), None),
        db,
        commissioner,
        season,
    }
}

#[tokio::test]
async fn health_reports_ok() {
    let running = start(0).await;

    let health = running.client.health().await.expect("health");

    assert_eq!(health["status"], "ok");
}

#[tokio::test]
async fn reads_season_and_checkpoints() {
    let running = start(2).await;

    let overview = running.client.season(running.season.id).await.expect("season");
    assert_eq!(overview.standings.len(), 2);
    assert_eq!(overview.season.current_phase, SeasonPhase::Setup);

    let checkpoints = running
        .client
        .checkpoints(running.season.id)
        .await
        .expect("checkpoints");
    let ids: Vec<&str> = checkpoints.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["PRESEASON", "DRAFT", "ADVANTAGE_SELECTION"]);
}

#[tokio::test]
async fn advances_and_rolls_back() {
    let running = start(2).await;
    draft::initialize(&running.db, running.season.id, running.commissioner)
        .expect("Failed to initialize draft");

    let season = running
        .client
        .advance_phase(running.season.id, "ready", running.commissioner)
        .await
        .expect("advance");
    assert_eq!(season.current_phase, SeasonPhase::Ready);

    let report = running
        .client
        .rollback(running.season.id, "DRAFT", running.commissioner)
        .await
        .expect("rollback");
    assert_eq!(report.to.phase, SeasonPhase::Drafting);
    assert_eq!(report.season.current_phase, SeasonPhase::Drafting);

    let events = running
        .client
        .events(running.season.id, None)
        .await
        .expect("events");
    assert!(events
        .iter()
        .any(|e| e.event_type == EventType::CheckpointRollback));
}

#[tokio::test]
async fn maps_error_statuses() {
    let running = start(1).await;

    let missing = running.client.season(Uuid::new_v4()).await;
    assert!(matches!(missing, Err(ClientError::NotFound(_))));

    let forbidden = running
        .client
        .advance_phase(running.season.id, "drafting", Uuid::new_v4())
        .await;
    assert!(matches!(forbidden, Err(ClientError::Forbidden(_))));

    let conflict = running
        .client
        .rollback(running.season.id, "WEEK_3", running.commissioner)
        .await;
    match conflict {
        Err(ClientError::Conflict(message)) => assert!(message.contains("week 3")),
        other => panic!("expected a conflict, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_server_is_an_http_error() {
    let client = LeagueClient::new("http://127.0.0.1:9/api/v1", None);

    let result = client.health().await;

    assert!(matches!(result, Err(ClientError::Http(_))));
}

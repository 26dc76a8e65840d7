use std::time::Duration;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use draftleague::api::middleware::{RateLimiter, SecurityConfig, ACTOR_HEADER};
use draftleague::api::types::{Acting, ActorRequest, AdvancePhase, DraftArtist, ErrorBody, PromptChoice};
use draftleague::api::{create_router, create_router_with_security};
use draftleague::db::Database;
use draftleague::engine::checkpoint::{CheckpointInfo, RollbackReport};
use draftleague::models::*;
use uuid::Uuid;

fn database() -> Database {
    let db = Database::open_memory().expect("Failed to create database");
    db.migrate().expect("Failed to migrate");
    db
}

fn setup() -> TestServer {
    TestServer::new(create_router(database())).expect("Failed to create test server")
}

/// A league with one season in setup and `players` enrolled.
struct LeagueFixture {
    commissioner: Uuid,
    season: Season,
    players: Vec<SeasonPlayer>,
}

async fn create_league(server: &TestServer, players: usize) -> LeagueFixture {
    let commissioner = Uuid::new_v4();
    let league = server
        .post("/api/v1/leagues")
        .json(&CreateLeagueInput {
            name: "Office League".to_string(),
            commissioner_id: commissioner,
        })
        .await
        .json::<League>();

    let season = server
        .post(&format!("/api/v1/leagues/{}/seasons", league.id))
        .json(&Acting::new(
            commissioner,
            CreateSeasonInput {
                name: "Spring".to_string(),
                config: None,
            },
        ))
        .await
        .json::<Season>();

    let mut enrolled = Vec::new();
    for i in 0..players {
        let player = server
            .post(&format!("/api/v1/seasons/{}/players", season.id))
            .json(&Acting::new(
                commissioner,
                AddSeasonPlayerInput {
                    user_id: Uuid::new_v4(),
                    display_name: format!("Player {}", i + 1),
                },
            ))
            .await
            .json::<SeasonPlayer>();
        enrolled.push(player);
    }

    LeagueFixture {
        commissioner,
        season,
        players: enrolled,
    }
}

async fn add_prompts(server: &TestServer, league: &LeagueFixture, count: usize) {
    let category = server
        .post(&format!("/api/v1/seasons/{}/categories", league.season.id))
        .json(&Acting::new(
            league.commissioner,
            CreateCategoryInput {
                name: "Decades".to_string(),
            },
        ))
        .await
        .json::<DraftCategory>();
    for i in 0..count {
        server
            .post(&format!("/api/v1/seasons/{}/prompts", league.season.id))
            .json(&Acting::new(
                league.commissioner,
                CreatePromptInput {
                    category_id: category.id,
                    text: format!("Prompt {}", i + 1),
                },
            ))
            .await
            .assert_status(StatusCode::CREATED);
    }
}

async fn open_prompt(server: &TestServer, season_id: Uuid) -> DraftPrompt {
    server
        .get(&format!("/api/v1/seasons/{}/prompts", season_id))
        .await
        .json::<Vec<DraftPrompt>>()
        .into_iter()
        .find(|p| p.status == PromptStatus::Open)
        .expect("No open prompt left")
}

async fn init_draft(server: &TestServer, league: &LeagueFixture) -> DraftState {
    let response = server
        .post(&format!("/api/v1/seasons/{}/draft", league.season.id))
        .json(&ActorRequest {
            requesting_actor_id: league.commissioner,
        })
        .await;
    response.assert_status_ok();
    response.json::<DraftState>()
}

mod leagues {
    use super::*;

    #[tokio::test]
    async fn health_is_ok() {
        let server = setup();
        server.get("/api/v1/health").await.assert_status_ok();
    }

    #[tokio::test]
    async fn season_overview_lists_players() {
        let server = setup();
        let league = create_league(&server, 3).await;

        let response = server
            .get(&format!("/api/v1/seasons/{}", league.season.id))
            .await;

        response.assert_status_ok();
        let overview: SeasonOverview = response.json();
        assert_eq!(overview.season.current_phase, SeasonPhase::Setup);
        assert_eq!(overview.commissioner_id, league.commissioner);
        assert_eq!(overview.standings.len(), 3);
    }

    #[tokio::test]
    async fn unknown_season_is_404() {
        let server = setup();

        let response = server
            .get(&format!("/api/v1/seasons/{}", Uuid::new_v4()))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(response.json::<ErrorBody>().error, "not_found");
    }

    #[tokio::test]
    async fn non_commissioner_cannot_add_players() {
        let server = setup();
        let league = create_league(&server, 1).await;

        let response = server
            .post(&format!("/api/v1/seasons/{}/players", league.season.id))
            .json(&Acting::new(
                league.players[0].user_id,
                AddSeasonPlayerInput {
                    user_id: Uuid::new_v4(),
                    display_name: "Gatecrasher".to_string(),
                },
            ))
            .await;

        response.assert_status(StatusCode::FORBIDDEN);
        assert_eq!(response.json::<ErrorBody>().error, "unauthorized");
    }
}

mod phases {
    use super::*;

    #[tokio::test]
    async fn backward_advance_is_a_conflict() {
        let server = setup();
        let league = create_league(&server, 2).await;
        add_prompts(&server, &league, 10).await;
        init_draft(&server, &league).await;

        let response = server
            .post(&format!("/api/v1/seasons/{}/phase/advance", league.season.id))
            .json(&Acting::new(
                league.commissioner,
                AdvancePhase {
                    target: "setup".to_string(),
                },
            ))
            .await;

        response.assert_status(StatusCode::CONFLICT);
        assert_eq!(response.json::<ErrorBody>().error, "not_forward");
    }

    #[tokio::test]
    async fn unknown_phase_is_a_conflict() {
        let server = setup();
        let league = create_league(&server, 1).await;

        let response = server
            .post(&format!("/api/v1/seasons/{}/phase/advance", league.season.id))
            .json(&Acting::new(
                league.commissioner,
                AdvancePhase {
                    target: "halftime".to_string(),
                },
            ))
            .await;

        response.assert_status(StatusCode::CONFLICT);
        assert_eq!(response.json::<ErrorBody>().error, "invalid_phase");
    }
}

mod draft {
    use super::*;

    #[tokio::test]
    async fn initializing_moves_the_season_to_drafting() {
        let server = setup();
        let league = create_league(&server, 3).await;

        let state = init_draft(&server, &league).await;

        assert_eq!(state.draft_order.len(), 3);
        let season = server
            .get(&format!("/api/v1/seasons/{}", league.season.id))
            .await
            .json::<SeasonOverview>()
            .season;
        assert_eq!(season.current_phase, SeasonPhase::Drafting);
    }

    #[tokio::test]
    async fn out_of_turn_pick_is_a_conflict() {
        let server = setup();
        let league = create_league(&server, 2).await;
        add_prompts(&server, &league, 10).await;
        let state = init_draft(&server, &league).await;

        let waiting = league
            .players
            .iter()
            .find(|p| p.id == state.draft_order[1])
            .expect("second picker");
        let response = server
            .post(&format!("/api/v1/seasons/{}/draft/prompt", league.season.id))
            .json(&Acting::new(
                waiting.user_id,
                PromptChoice {
                    prompt_id: open_prompt(&server, league.season.id).await.id,
                },
            ))
            .await;

        response.assert_status(StatusCode::CONFLICT);
        assert_eq!(response.json::<ErrorBody>().error, "wrong_turn");
    }

    #[tokio::test]
    async fn picker_drafts_after_selecting_a_prompt() {
        let server = setup();
        let league = create_league(&server, 2).await;
        add_prompts(&server, &league, 10).await;
        let state = init_draft(&server, &league).await;
        let picker = league
            .players
            .iter()
            .find(|p| p.id == state.draft_order[0])
            .expect("first picker");
        let prompt = open_prompt(&server, league.season.id).await;

        server
            .post(&format!("/api/v1/seasons/{}/draft/prompt", league.season.id))
            .json(&Acting::new(picker.user_id, PromptChoice { prompt_id: prompt.id }))
            .await
            .assert_status_ok();
        let response = server
            .post(&format!("/api/v1/seasons/{}/draft/picks", league.season.id))
            .json(&Acting::new(
                picker.user_id,
                DraftArtist {
                    prompt_id: prompt.id,
                    artist_name: "Björk".to_string(),
                },
            ))
            .await;

        response.assert_status(StatusCode::CREATED);
        let pick: DraftPick = response.json();
        assert_eq!(pick.player_id, picker.id);
        assert_eq!(pick.pick_number, 1);

        let board = server
            .get(&format!("/api/v1/seasons/{}/draft", league.season.id))
            .await
            .json::<DraftBoard>();
        assert_eq!(board.picks.len(), 1);
        assert_eq!(board.current_picker_id, Some(state.draft_order[1]));
    }

    #[tokio::test]
    async fn duplicate_artist_is_a_conflict() {
        let server = setup();
        let league = create_league(&server, 2).await;
        add_prompts(&server, &league, 10).await;
        init_draft(&server, &league).await;
        let prompt = open_prompt(&server, league.season.id).await;
        let pick = |name: &str| {
            server
                .post(&format!("/api/v1/seasons/{}/draft/picks", league.season.id))
                .json(&Acting::new(
                    league.commissioner,
                    DraftArtist {
                        prompt_id: prompt.id,
                        artist_name: name.to_string(),
                    },
                ))
        };

        server
            .post(&format!("/api/v1/seasons/{}/draft/prompt", league.season.id))
            .json(&Acting::new(league.commissioner, PromptChoice { prompt_id: prompt.id }))
            .await
            .assert_status_ok();
        pick("Portishead").await.assert_status(StatusCode::CREATED);
        let response = pick("portishead").await;

        response.assert_status(StatusCode::CONFLICT);
        assert_eq!(response.json::<ErrorBody>().error, "duplicate_artist");
    }

    #[tokio::test]
    async fn full_draft_completes_into_advantage_selection() {
        let server = setup();
        let league = create_league(&server, 2).await;
        add_prompts(&server, &league, DRAFT_ROUNDS as usize + 2).await;
        init_draft(&server, &league).await;

        let mut picks = 0;
        loop {
            let board = server
                .get(&format!("/api/v1/seasons/{}/draft", league.season.id))
                .await
                .json::<DraftBoard>();
            if board.state.is_complete {
                break;
            }
            let prompt = match board.round_prompt {
                Some(prompt) => prompt,
                None => {
                    let prompt = open_prompt(&server, league.season.id).await;
                    server
                        .post(&format!("/api/v1/seasons/{}/draft/prompt", league.season.id))
                        .json(&Acting::new(league.commissioner, PromptChoice { prompt_id: prompt.id }))
                        .await
                        .json::<DraftPrompt>()
                }
            };
            picks += 1;
            server
                .post(&format!("/api/v1/seasons/{}/draft/picks", league.season.id))
                .json(&Acting::new(
                    league.commissioner,
                    DraftArtist {
                        prompt_id: prompt.id,
                        artist_name: format!("Artist {picks}"),
                    },
                ))
                .await
                .assert_status(StatusCode::CREATED);
        }

        assert_eq!(picks, DRAFT_ROUNDS * 2);
        let season = server
            .get(&format!("/api/v1/seasons/{}", league.season.id))
            .await
            .json::<SeasonOverview>()
            .season;
        assert_eq!(season.current_phase, SeasonPhase::AdvantageSelection);

        let roster = server
            .get(&format!(
                "/api/v1/seasons/{}/players/{}/roster",
                league.season.id, league.players[0].id
            ))
            .await
            .json::<Vec<RosterSlot>>();
        assert_eq!(roster.len(), DRAFT_ROUNDS as usize);
    }
}

mod advantages {
    use super::*;

    #[tokio::test]
    async fn catalog_round_trips_and_rejects_duplicates() {
        let server = setup();
        let input = CreateAdvantageInput {
            code: "SKIP".to_string(),
            name: "Skip".to_string(),
            tier: 1,
            description: None,
        };

        server
            .post("/api/v1/advantages")
            .json(&input)
            .await
            .assert_status(StatusCode::CREATED);
        server
            .post("/api/v1/advantages")
            .json(&input)
            .await
            .assert_status(StatusCode::CONFLICT);

        let catalog: Vec<Advantage> = server.get("/api/v1/advantages").await.json();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog[0].code, "SKIP");
    }

    #[tokio::test]
    async fn playing_unknown_inventory_is_404() {
        let server = setup();
        let league = create_league(&server, 1).await;

        server
            .post(&format!(
                "/api/v1/seasons/{}/inventory/{}/play",
                league.season.id,
                Uuid::new_v4()
            ))
            .json(&ActorRequest {
                requesting_actor_id: league.commissioner,
            })
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}

mod checkpoints {
    use super::*;

    #[tokio::test]
    async fn rollback_to_preseason_returns_to_setup() {
        let server = setup();
        let league = create_league(&server, 2).await;
        add_prompts(&server, &league, 10).await;
        init_draft(&server, &league).await;

        let listed: Vec<CheckpointInfo> = server
            .get(&format!("/api/v1/seasons/{}/checkpoints", league.season.id))
            .await
            .json();
        assert!(listed.iter().any(|c| c.id == "PRESEASON"));

        let response = server
            .post(&format!(
                "/api/v1/seasons/{}/checkpoints/preseason/rollback",
                league.season.id
            ))
            .json(&ActorRequest {
                requesting_actor_id: league.commissioner,
            })
            .await;

        response.assert_status_ok();
        let report: RollbackReport = response.json();
        assert_eq!(report.checkpoint, "PRESEASON");
        assert_eq!(report.season.current_phase, SeasonPhase::Setup);
    }

    #[tokio::test]
    async fn unknown_checkpoint_is_a_conflict() {
        let server = setup();
        let league = create_league(&server, 1).await;

        server
            .post(&format!(
                "/api/v1/seasons/{}/checkpoints/halftime/rollback",
                league.season.id
            ))
            .json(&ActorRequest {
                requesting_actor_id: league.commissioner,
            })
            .await
            .assert_status(StatusCode::CONFLICT);
    }
}

mod security {
    use super::*;

    fn secured(limit: u32) -> TestServer {
        let security = SecurityConfig {
            api_key: Some("secret".to_string()),
            cors_origins: Some(vec!["https://league.example".to_string()]),
            rate_limiter: Some(RateLimiter::new(limit, Duration::from_secs(60))),
        };
        TestServer::new(create_router_with_security(database(), security))
            .expect("Failed to create test server")
    }

    fn bearer(key: &str) -> HeaderValue {
        HeaderValue::from_str(&format!("Bearer {key}")).expect("valid header")
    }

    #[tokio::test]
    async fn health_needs_no_key() {
        let server = secured(1);
        server.get("/api/v1/health").await.assert_status_ok();
        server.get("/api/v1/health").await.assert_status_ok();
    }

    #[tokio::test]
    async fn missing_or_wrong_key_is_401() {
        let server = secured(10);

        server
            .get("/api/v1/advantages")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        server
            .get("/api/v1/advantages")
            .add_header(HeaderName::from_static("authorization"), bearer("guess"))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        server
            .get("/api/v1/advantages")
            .add_header(HeaderName::from_static("authorization"), bearer("secret"))
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn callers_over_the_limit_get_429_whatever_actor_they_name() {
        let server = secured(2);
        let actor = HeaderName::from_static("x-actor-id");
        assert!(ACTOR_HEADER.eq_ignore_ascii_case(actor.as_str()));

        for _ in 0..2 {
            server
                .get("/api/v1/advantages")
                .add_header(HeaderName::from_static("authorization"), bearer("secret"))
                .add_header(actor.clone(), HeaderValue::from_static("alice"))
                .await
                .assert_status_ok();
        }
        server
            .get("/api/v1/advantages")
            .add_header(HeaderName::from_static("authorization"), bearer("secret"))
            .add_header(actor.clone(), HeaderValue::from_static("alice"))
            .await
            .assert_status(StatusCode::TOO_MANY_REQUESTS);

        server
            .get("/api/v1/advantages")
            .add_header(HeaderName::from_static("authorization"), bearer("secret"))
            .add_header(actor, HeaderValue::from_static("bob"))
            .await
            .assert_status(StatusCode::TOO_MANY_REQUESTS);
    }
}

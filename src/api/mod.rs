pub mod handlers;
pub mod middleware;
pub mod types;

use axum::{
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::db::Database;
use middleware::{auth_middleware, rate_limit_middleware, SecurityConfig};

/// Router without authentication, for local use and tests.
pub fn create_router(db: Database) -> Router {
    create_router_with_security(db, SecurityConfig::disabled())
}

pub fn create_router_with_security(db: Database, security: SecurityConfig) -> Router {
    let mut protected = Router::new()
        // Leagues
        .route("/leagues", post(handlers::create_league))
        .route("/leagues/{id}", get(handlers::get_league))
        .route(
            "/leagues/{id}/seasons",
            get(handlers::list_seasons).post(handlers::create_season),
        )
        // Seasons
        .route("/seasons/{id}", get(handlers::get_season))
        .route(
            "/seasons/{id}/players",
            get(handlers::list_players).post(handlers::add_player),
        )
        .route("/seasons/{id}/players/{player_id}/roster", get(handlers::get_roster))
        .route("/seasons/{id}/standings", get(handlers::standings))
        .route("/seasons/{id}/pool", get(handlers::get_pool))
        .route(
            "/seasons/{id}/categories",
            get(handlers::list_categories).post(handlers::add_category),
        )
        .route(
            "/seasons/{id}/prompts",
            get(handlers::list_prompts).post(handlers::add_prompt),
        )
        .route("/seasons/{id}/phase/advance", post(handlers::advance_phase))
        .route("/seasons/{id}/weeks/start", post(handlers::start_week))
        .route("/seasons/{id}/complete", post(handlers::complete_season))
        .route("/seasons/{id}/events", get(handlers::list_events))
        // Draft
        .route(
            "/seasons/{id}/draft",
            get(handlers::get_draft_board).post(handlers::initialize_draft),
        )
        .route("/seasons/{id}/draft/prompt", post(handlers::select_draft_prompt))
        .route("/seasons/{id}/draft/picks", post(handlers::draft_artist))
        .route("/seasons/{id}/draft/reset", post(handlers::reset_draft))
        // Roster evolution
        .route("/seasons/{id}/evolution", post(handlers::initialize_evolution))
        .route("/seasons/{id}/evolution/{week}", get(handlers::get_evolution))
        .route("/seasons/{id}/evolution/cuts", post(handlers::cut_artist))
        .route("/seasons/{id}/evolution/prompt", post(handlers::select_evolution_prompt))
        .route("/seasons/{id}/evolution/redrafts", post(handlers::redraft_artist))
        .route("/seasons/{id}/evolution/pool-picks", post(handlers::pool_draft))
        .route("/seasons/{id}/evolution/complete", post(handlers::complete_evolution))
        .route(
            "/seasons/{id}/evolution/{week}/rollback",
            post(handlers::rollback_evolution),
        )
        // Advantages
        .route(
            "/advantages",
            get(handlers::list_catalog).post(handlers::register_advantage),
        )
        .route("/seasons/{id}/awards", get(handlers::list_awards))
        .route("/seasons/{id}/weeks/{week}/awards", post(handlers::issue_awards))
        .route(
            "/seasons/{id}/weeks/{week}/awards/revoke",
            post(handlers::revoke_awards),
        )
        .route(
            "/seasons/{id}/awards/{award_id}/selection",
            post(handlers::select_award_code),
        )
        .route(
            "/seasons/{id}/awards/{award_id}/undo",
            post(handlers::undo_award_selection),
        )
        .route("/seasons/{id}/inventory", get(handlers::list_inventory))
        .route(
            "/seasons/{id}/inventory/{inventory_id}/play",
            post(handlers::play_advantage),
        )
        .route(
            "/seasons/{id}/starting-advantages/selector",
            get(handlers::starting_selector),
        )
        .route(
            "/seasons/{id}/starting-advantages",
            post(handlers::select_starting_advantage),
        )
        .route(
            "/seasons/{id}/starting-advantages/reset",
            post(handlers::reset_starting_advantages),
        )
        // Weekly cycle
        .route("/seasons/{id}/challenge", post(handlers::select_challenge))
        .route("/seasons/{id}/challenge/reveal", post(handlers::reveal_challenge))
        .route("/seasons/{id}/submissions", post(handlers::submit_tracks))
        .route(
            "/seasons/{id}/weeks/{week}/submissions",
            get(handlers::list_submissions),
        )
        .route(
            "/seasons/{id}/weeks/{week}/presentation",
            get(handlers::get_presentation),
        )
        .route("/seasons/{id}/presentation/advance", post(handlers::advance_presenter))
        .route("/seasons/{id}/weeks/{week}/voting", get(handlers::get_voting_session))
        .route("/seasons/{id}/votes", post(handlers::cast_vote))
        .route("/seasons/{id}/weeks/finalize", post(handlers::finalize_week))
        .route("/seasons/{id}/weeks/{week}/results", get(handlers::get_results))
        // Checkpoints
        .route("/seasons/{id}/checkpoints", get(handlers::list_checkpoints))
        .route(
            "/seasons/{id}/checkpoints/{checkpoint}/rollback",
            post(handlers::rollback_to_checkpoint),
        );

    // Layers added last run first, so auth rejects before a slot is spent.
    if let Some(limiter) = security.rate_limiter.clone() {
        protected = protected.layer(from_fn_with_state(limiter, rate_limit_middleware));
    }
    if security.api_key.is_some() {
        protected = protected.layer(from_fn_with_state(security.clone(), auth_middleware));
    }

    let api = Router::new()
        .route("/health", get(handlers::health))
        .merge(protected);

    Router::new()
        .nest("/api/v1", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(security.cors_origins.as_deref())),
        )
        .with_state(db)
}

fn cors_layer(origins: Option<&[String]>) -> CorsLayer {
    match origins {
        Some(origins) if !origins.is_empty() => {
            let allowed: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(allowed))
                .allow_methods(Any)
                .allow_headers(Any)
        }
        _ => CorsLayer::permissive(),
    }
}

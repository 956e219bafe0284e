//! Nine Men's Morris Web API
//!
//! Serves a single shared game session over HTTP. Clients resolve pointer
//! events to position letters themselves and post them to `/click`, or post
//! complete actions to `/action`; both return the accepted flag and a fresh
//! snapshot to redraw from.
//!
//! Every mutating request names the player sending it. Requests from the
//! player who holds neither the turn nor the pending removal are refused
//! with 409, since the engine itself trusts its single caller.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use morris_core::{Action, Game, Player, Pos, RuleSet, Setup, Snapshot, Transition};

// =============================================================================
// Command Line
// =============================================================================

/// Nine Men's Morris HTTP server
#[derive(Parser, Debug)]
#[command(name = "morris-api")]
#[command(about = "Serve a Nine Men's Morris game over HTTP", long_about = None)]
#[command(version)]
struct Args {
    /// Host to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to bind to
    #[arg(short, long, default_value = "8000")]
    port: u16,

    /// Allow capturing from a mill when the opponent has no other piece
    #[arg(long)]
    capture_from_full_mills: bool,
}

// =============================================================================
// Session State
// =============================================================================

/// Shared application state
struct AppStateInner {
    game: Mutex<Game>,
    rules: RuleSet,
}

impl AppStateInner {
    fn new(rules: RuleSet) -> Self {
        Self {
            game: Mutex::new(Game::with_rules(rules)),
            rules,
        }
    }

    /// Lock the session. `Game` is `Copy` and every operation is atomic, so
    /// a poisoned lock still guards a consistent value.
    fn game(&self) -> MutexGuard<'_, Game> {
        self.game.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

type AppState = Arc<AppStateInner>;

// =============================================================================
// JSON Models
// =============================================================================

#[derive(Deserialize)]
struct ClickRequest {
    /// 0 (White) or 1 (Black)
    player: u8,
    /// Position letter, or null when the click hit nothing
    position: Option<String>,
}

#[derive(Deserialize)]
struct ActionRequest {
    player: u8,
    action: Action,
}

#[derive(Serialize)]
struct PlayResponse {
    accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    transition: Option<Transition>,
    /// Why the input was ignored, if it was
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    game: Snapshot,
}

#[derive(Serialize)]
struct HealthModel {
    status: String,
}

#[derive(Serialize)]
struct ErrorModel {
    detail: String,
}

type ApiError = (StatusCode, Json<ErrorModel>);

fn api_error(status: StatusCode, detail: impl ToString) -> ApiError {
    (
        status,
        Json(ErrorModel {
            detail: detail.to_string(),
        }),
    )
}

// =============================================================================
// Request Validation
// =============================================================================

fn parse_player(raw: u8) -> Result<Player, ApiError> {
    Player::try_from(raw).map_err(|e| api_error(StatusCode::BAD_REQUEST, e))
}

fn parse_position(label: Option<&str>) -> Result<Option<Pos>, ApiError> {
    label
        .map(|label| label.parse::<Pos>())
        .transpose()
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e))
}

/// Only the player expected to act may change the game.
fn check_actor(game: &Game, player: Player) -> Result<(), ApiError> {
    let actor = game.actor();
    if player == actor {
        Ok(())
    } else {
        warn!(%player, %actor, "request out of turn");
        Err(api_error(
            StatusCode::CONFLICT,
            format!("it is {actor} who must act, not {player}"),
        ))
    }
}

fn play_response<E: ToString>(game: &Game, result: Result<Transition, E>) -> PlayResponse {
    let (transition, reason) = match result {
        Ok(transition) => (Some(transition), None),
        Err(e) => (None, Some(e.to_string())),
    };
    PlayResponse {
        accepted: transition.is_some(),
        transition,
        reason,
        game: game.snapshot(),
    }
}

// =============================================================================
// API Endpoints
// =============================================================================

async fn get_game(State(state): State<AppState>) -> Json<Snapshot> {
    Json(state.game().snapshot())
}

async fn get_moves(State(state): State<AppState>) -> Json<Vec<Action>> {
    Json(state.game().legal_actions())
}

async fn click(
    State(state): State<AppState>,
    Json(req): Json<ClickRequest>,
) -> Result<Json<PlayResponse>, ApiError> {
    let player = parse_player(req.player)?;
    let pos = parse_position(req.position.as_deref())?;

    let mut game = state.game();
    check_actor(&game, player)?;
    let result = game.click(pos);
    Ok(Json(play_response(&game, result)))
}

async fn apply_action(
    State(state): State<AppState>,
    Json(req): Json<ActionRequest>,
) -> Result<Json<PlayResponse>, ApiError> {
    let player = parse_player(req.player)?;

    let mut game = state.game();
    check_actor(&game, player)?;
    let result = game.apply(req.action);
    if let Err(e) = &result {
        info!(%player, action = %req.action, error = %e, "action rejected");
    }
    Ok(Json(play_response(&game, result)))
}

async fn reset_game(State(state): State<AppState>) -> Json<Snapshot> {
    let mut game = state.game();
    *game = Game::with_rules(state.rules);
    info!("game reset");
    Json(game.snapshot())
}

async fn setup_game(
    State(state): State<AppState>,
    Json(setup): Json<Setup>,
) -> Result<Json<Snapshot>, ApiError> {
    let fresh = Game::from_position(&setup, state.rules)
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e))?;

    let mut game = state.game();
    *game = fresh;
    info!(to_move = %setup.to_move, "game set up from position");
    Ok(Json(game.snapshot()))
}

async fn health() -> Json<HealthModel> {
    Json(HealthModel {
        status: "ok".to_string(),
    })
}

fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/game", get(get_game))
        .route("/moves", get(get_moves))
        .route("/click", post(click))
        .route("/action", post(apply_action))
        .route("/reset", post(reset_game))
        .route("/setup", post(setup_game))
        .route("/health", get(health))
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let rules = RuleSet {
        capture_from_full_mills: args.capture_from_full_mills,
    };
    let state: AppState = Arc::new(AppStateInner::new(rules));

    let listener = tokio::net::TcpListener::bind((args.host.as_str(), args.port)).await?;
    let addr = listener.local_addr()?;
    info!(%addr, ?rules, "Morris API listening");
    axum::serve(listener, app(state)).await?;
    Ok(())
}

//! REST host for the bracket engine over the in-memory store.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT.
//! Engine tunables come from BRACKET_* variables (see `EngineConfig::from_env`).

use actix_web::{
    get, post, put,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use bracket_engine::{
    EngineConfig, EngineError, EventId, Format, InMemoryStore, MatchId, MatchResult,
    PhaseRequest, ScoreLedger, StoreError, TeamId, TournamentService,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

struct AppState {
    service: TournamentService<InMemoryStore>,
    /// One score ledger per event, shared by everyone adjusting that event's scores.
    ledgers: Mutex<HashMap<EventId, Arc<Mutex<ScoreLedger>>>>,
}

impl AppState {
    fn ledger(&self, event_id: EventId) -> Arc<Mutex<ScoreLedger>> {
        let mut ledgers = self.ledgers.lock().unwrap_or_else(|e| e.into_inner());
        ledgers.entry(event_id).or_default().clone()
    }
}

type State = Data<AppState>;

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct AddTeamBody {
    name: String,
}

#[derive(Deserialize)]
struct GenerateBody {
    format: Format,
    #[serde(default)]
    shuffle: bool,
}

#[derive(Deserialize)]
struct ScoreDeltaBody {
    delta: i64,
}

/// Path segment: event id (e.g. /api/events/{id})
#[derive(Deserialize)]
struct EventPath {
    id: EventId,
}

/// Path segments: event id and match id
#[derive(Deserialize)]
struct EventMatchPath {
    id: EventId,
    match_id: MatchId,
}

/// Path segments: event id and team id
#[derive(Deserialize)]
struct EventTeamPath {
    id: EventId,
    team_id: TeamId,
}

fn error_response(err: EngineError) -> HttpResponse {
    match &err {
        EngineError::Rejected(r) => HttpResponse::BadRequest()
            .json(serde_json::json!({ "error": r.to_string(), "code": r.code() })),
        EngineError::Store {
            source: StoreError::NotFound(_),
            ..
        } => HttpResponse::NotFound().json(serde_json::json!({ "error": err.to_string() })),
        _ => {
            log::error!("{}", err);
            HttpResponse::ServiceUnavailable().json(serde_json::json!({ "error": err.to_string() }))
        }
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "bracket-engine",
    })
}

/// Create a new event (returns its id; teams and matches hang off it).
#[post("/api/events")]
async fn api_create_event() -> HttpResponse {
    let id: EventId = Uuid::new_v4();
    log::info!("Created event {}", id);
    HttpResponse::Ok().json(serde_json::json!({ "id": id }))
}

/// Teams and matches of an event.
#[get("/api/events/{id}")]
async fn api_get_event(state: State, path: Path<EventPath>) -> HttpResponse {
    match state.service.event(path.id).await {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(e) => error_response(e),
    }
}

/// Register a team.
#[post("/api/events/{id}/teams")]
async fn api_add_team(state: State, path: Path<EventPath>, body: Json<AddTeamBody>) -> HttpResponse {
    let name = body.name.trim();
    if name.is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({ "error": "Team name is empty" }));
    }
    match state.service.store().add_team(path.id, name) {
        Ok(team) => HttpResponse::Ok().json(team),
        Err(e) => error_response(EngineError::Store { operation: "add_team", source: e }),
    }
}

/// Generate the bracket for every team.
#[post("/api/events/{id}/bracket")]
async fn api_generate(state: State, path: Path<EventPath>, body: Json<GenerateBody>) -> HttpResponse {
    match state.service.generate(path.id, body.format, body.shuffle).await {
        Ok(outcome) => HttpResponse::Ok().json(serde_json::json!({
            "report": outcome.report,
            "matches": outcome.matches,
        })),
        Err(e) => error_response(e),
    }
}

/// Delete and regenerate the bracket. Other clients should refetch afterwards.
#[post("/api/events/{id}/bracket/regenerate")]
async fn api_regenerate(state: State, path: Path<EventPath>, body: Json<GenerateBody>) -> HttpResponse {
    match state.service.regenerate(path.id, body.format, body.shuffle).await {
        Ok(outcome) => HttpResponse::Ok().json(serde_json::json!({
            "report": outcome.report,
            "matches": outcome.matches,
        })),
        Err(e) => error_response(e),
    }
}

/// Link matches and resolve byes.
#[post("/api/events/{id}/advance")]
async fn api_advance(state: State, path: Path<EventPath>) -> HttpResponse {
    match state.service.advance(path.id).await {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(e) => error_response(e),
    }
}

/// Start the next round or phase.
#[post("/api/events/{id}/phases")]
async fn api_create_phase(state: State, path: Path<EventPath>, body: Json<PhaseRequest>) -> HttpResponse {
    match state.service.transition(path.id, &body).await {
        Ok(outcome) => HttpResponse::Ok().json(serde_json::json!({
            "report": outcome.report,
            "matches": outcome.matches,
        })),
        Err(e) => error_response(e),
    }
}

/// Report scores, status and winner for one match.
#[put("/api/events/{id}/matches/{match_id}/result")]
async fn api_record_result(
    state: State,
    path: Path<EventMatchPath>,
    body: Json<MatchResult>,
) -> HttpResponse {
    match state.service.record_result(path.id, path.match_id, &body).await {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(e) => error_response(e),
    }
}

/// Add to a team's running score.
#[post("/api/events/{id}/teams/{team_id}/score")]
async fn api_adjust_score(
    state: State,
    path: Path<EventTeamPath>,
    body: Json<ScoreDeltaBody>,
) -> HttpResponse {
    let ledger = state.ledger(path.id);
    match state
        .service
        .adjust_team_score(&ledger, path.id, path.team_id, body.delta)
        .await
    {
        Ok(score) => HttpResponse::Ok().json(serde_json::json!({ "team_id": path.team_id, "score": score })),
        Err(e) => error_response(e),
    }
}

/// Ranked standings of the current phase.
#[get("/api/events/{id}/standings")]
async fn api_standings(state: State, path: Path<EventPath>) -> HttpResponse {
    match state.service.standings(path.id).await {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(e) => error_response(e),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = EngineConfig::from_env()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    log::info!(
        "Store calls: {} attempts, {:?} base delay, {:?} timeout; {} bye passes",
        config.retry.max_attempts,
        config.retry.base_delay,
        config.retry.timeout,
        config.max_bye_passes
    );

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(AppState {
        service: TournamentService::new(Arc::new(InMemoryStore::new()), config),
        ledgers: Mutex::new(HashMap::new()),
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_create_event)
            .service(api_get_event)
            .service(api_add_team)
            .service(api_generate)
            .service(api_regenerate)
            .service(api_advance)
            .service(api_create_phase)
            .service(api_record_result)
            .service(api_adjust_score)
            .service(api_standings)
    })
    .bind(bind)?
    .run()
    .await
}

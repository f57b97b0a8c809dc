//! Single binary web server: JSON REST API over the game night store.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT.
//! State is kept in DATA_FILE (default game-nights.json) and written after every change.

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use game_night::{
    nights_to_csv, GameNight, MatchId, NightError, NightId, NightSummary, ParseMatchIdError, Player, PlayerId,
    SavedState, Storage, TableRow, TeamColor, TeamId, TieBreak, TournamentStore,
};
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Work for the background writer. Writes happen in order, after the in-memory change.
enum PersistCommand {
    Save(SavedState),
    Clear,
}

struct AppState {
    store: TournamentStore,
    persist: UnboundedSender<PersistCommand>,
}

impl AppState {
    fn save(&self) {
        if self.persist.send(PersistCommand::Save(self.store.to_saved())).is_err() {
            log::warn!("Storage writer is gone; change not saved");
        }
    }
}

type SharedState = Data<RwLock<AppState>>;

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

/// The current night with its live table.
#[derive(Serialize)]
struct CurrentNightView<'a> {
    night: &'a GameNight,
    table: Vec<TableRow>,
}

#[derive(Serialize)]
struct StateView<'a> {
    current_night_id: Option<NightId>,
    nights: Vec<NightSummary>,
    library: &'a [Player],
}

#[derive(Deserialize)]
struct StartNightBody {
    title: Option<String>,
    #[serde(default = "default_carry_over_teams")]
    carry_over_teams: bool,
}

fn default_carry_over_teams() -> bool {
    true
}

#[derive(Deserialize)]
struct TitleBody {
    title: String,
}

#[derive(Deserialize)]
struct SelectNightBody {
    night_id: NightId,
}

#[derive(Deserialize)]
struct AddTeamBody {
    name: String,
    color: Option<TeamColor>,
}

#[derive(Deserialize)]
struct UpdateTeamBody {
    name: Option<String>,
    color: Option<TeamColor>,
}

#[derive(Deserialize)]
struct NameBody {
    name: String,
}

#[derive(Deserialize)]
struct ExistingPlayerBody {
    player_id: PlayerId,
}

#[derive(Deserialize)]
struct TransferBody {
    from_team_id: TeamId,
    to_team_id: TeamId,
}

#[derive(Deserialize)]
struct ScoreBody {
    home: Option<u32>,
    away: Option<u32>,
}

#[derive(Deserialize)]
struct TieBreakBody {
    method: TieBreak,
    home: u32,
    away: u32,
}

#[derive(Deserialize)]
struct DurationBody {
    seconds: u32,
}

#[derive(Deserialize)]
struct TimerBody {
    match_id: Option<MatchId>,
}

#[derive(Deserialize)]
struct LibraryBody {
    names: Vec<String>,
}

/// Path segment: team id (e.g. /api/teams/{team_id})
#[derive(Deserialize)]
struct TeamPath {
    team_id: TeamId,
}

/// Path segments: team id and player id
#[derive(Deserialize)]
struct TeamPlayerPath {
    team_id: TeamId,
    player_id: PlayerId,
}

#[derive(Deserialize)]
struct PlayerPath {
    player_id: PlayerId,
}

/// Match ids are either a uuid or a bracket stage key, parsed by hand.
#[derive(Deserialize)]
struct MatchPath {
    match_id: String,
}

impl MatchPath {
    fn parse(&self) -> Result<MatchId, HttpResponse> {
        self.match_id
            .parse()
            .map_err(|e: ParseMatchIdError| bad_request(e.to_string()))
    }
}

fn bad_request(message: String) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({ "error": message }))
}

fn error_response(e: &NightError) -> HttpResponse {
    match e {
        NightError::TeamNotFound(_)
        | NightError::PlayerNotFound(_)
        | NightError::MatchNotFound(_)
        | NightError::NightNotFound(_)
        | NightError::NoCurrentNight => {
            HttpResponse::NotFound().json(serde_json::json!({ "error": e.to_string() }))
        }
        _ => bad_request(e.to_string()),
    }
}

fn current_night_response(store: &TournamentStore) -> HttpResponse {
    match store.current_night() {
        Some(night) => HttpResponse::Ok().json(CurrentNightView {
            night,
            table: night.table(),
        }),
        None => error_response(&NightError::NoCurrentNight),
    }
}

/// Apply one mutation, queue a save and answer with the current night.
fn mutate<F>(state: &SharedState, f: F) -> HttpResponse
where
    F: FnOnce(&mut TournamentStore) -> Result<(), NightError>,
{
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match f(&mut g.store) {
        Ok(()) => {
            g.save();
            current_night_response(&g.store)
        }
        Err(e) => error_response(&e),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "game-night",
    })
}

/// Night history, current night id and the player library.
#[get("/api/state")]
async fn api_state(state: SharedState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    HttpResponse::Ok().json(StateView {
        current_night_id: g.store.current_night_id(),
        nights: g.store.nights().iter().map(GameNight::summary).collect(),
        library: g.store.library(),
    })
}

#[get("/api/nights/current")]
async fn api_current_night(state: SharedState) -> HttpResponse {
    match state.read() {
        Ok(g) => current_night_response(&g.store),
        Err(_) => HttpResponse::InternalServerError().body("lock error"),
    }
}

#[get("/api/nights/current/table")]
async fn api_table(state: SharedState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.store.current_night() {
        Some(night) => HttpResponse::Ok().json(night.table()),
        None => error_response(&NightError::NoCurrentNight),
    }
}

/// Start a new night (becomes current), by default with the current teams.
#[post("/api/nights")]
async fn api_start_night(state: SharedState, body: Option<Json<StartNightBody>>) -> HttpResponse {
    let title = body.as_ref().and_then(|b| b.title.clone());
    let carry_over = body
        .as_ref()
        .map(|b| b.carry_over_teams)
        .unwrap_or_else(default_carry_over_teams);
    mutate(&state, |store| {
        store.start_night(title.as_deref(), carry_over);
        Ok(())
    })
}

/// Switch the current night.
#[put("/api/nights/current")]
async fn api_select_night(state: SharedState, body: Json<SelectNightBody>) -> HttpResponse {
    mutate(&state, |store| store.set_current_night(body.night_id))
}

#[put("/api/nights/current/title")]
async fn api_rename_night(state: SharedState, body: Json<TitleBody>) -> HttpResponse {
    mutate(&state, |store| store.rename_night(&body.title))
}

/// Regenerate fixtures for the current teams, clearing every result.
#[post("/api/nights/current/reset")]
async fn api_reset_night(state: SharedState) -> HttpResponse {
    mutate(&state, |store| store.reset_night())
}

#[post("/api/teams")]
async fn api_add_team(state: SharedState, body: Json<AddTeamBody>) -> HttpResponse {
    mutate(&state, |store| store.add_team(&body.name, body.color).map(|_| ()))
}

/// Rename and/or recolour a team.
#[put("/api/teams/{team_id}")]
async fn api_update_team(state: SharedState, path: Path<TeamPath>, body: Json<UpdateTeamBody>) -> HttpResponse {
    mutate(&state, |store| {
        if body.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(NightError::EmptyName);
        }
        if let Some(color) = body.color {
            store.recolor_team(path.team_id, color)?;
        }
        if let Some(name) = &body.name {
            store.rename_team(path.team_id, name)?;
        }
        Ok(())
    })
}

#[delete("/api/teams/{team_id}")]
async fn api_remove_team(state: SharedState, path: Path<TeamPath>) -> HttpResponse {
    mutate(&state, |store| store.remove_team(path.team_id))
}

#[post("/api/teams/{team_id}/players")]
async fn api_add_player(state: SharedState, path: Path<TeamPath>, body: Json<NameBody>) -> HttpResponse {
    mutate(&state, |store| store.add_player(path.team_id, &body.name).map(|_| ()))
}

/// Add a player from the library (or another team) to a team.
#[post("/api/teams/{team_id}/players/existing")]
async fn api_add_existing_player(
    state: SharedState,
    path: Path<TeamPath>,
    body: Json<ExistingPlayerBody>,
) -> HttpResponse {
    mutate(&state, |store| store.add_existing_player(path.team_id, body.player_id))
}

#[delete("/api/teams/{team_id}/players/{player_id}")]
async fn api_remove_player(state: SharedState, path: Path<TeamPlayerPath>) -> HttpResponse {
    mutate(&state, |store| store.remove_player(path.team_id, path.player_id))
}

#[post("/api/players/{player_id}/transfer")]
async fn api_transfer_player(
    state: SharedState,
    path: Path<PlayerPath>,
    body: Json<TransferBody>,
) -> HttpResponse {
    mutate(&state, |store| {
        store.transfer_player(path.player_id, body.from_team_id, body.to_team_id)
    })
}

/// Enter (or clear, with nulls) a regular-time score.
#[put("/api/matches/{match_id}/score")]
async fn api_record_score(state: SharedState, path: Path<MatchPath>, body: Json<ScoreBody>) -> HttpResponse {
    let match_id = match path.parse() {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    mutate(&state, |store| store.record_score(match_id, body.home, body.away))
}

/// Settle a level knockout match by extra time or penalties.
#[post("/api/matches/{match_id}/tie-break")]
async fn api_resolve_tie(state: SharedState, path: Path<MatchPath>, body: Json<TieBreakBody>) -> HttpResponse {
    let match_id = match path.parse() {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    mutate(&state, |store| store.resolve_tie(match_id, body.method, body.home, body.away))
}

#[put("/api/matches/{match_id}/duration")]
async fn api_set_duration(state: SharedState, path: Path<MatchPath>, body: Json<DurationBody>) -> HttpResponse {
    let match_id = match path.parse() {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    mutate(&state, |store| store.set_match_duration(match_id, body.seconds))
}

/// Attach a match to the timer (`match_id: null` detaches).
#[put("/api/timer")]
async fn api_attach_timer(state: SharedState, body: Json<TimerBody>) -> HttpResponse {
    mutate(&state, |store| store.attach_timer(body.match_id))
}

#[get("/api/library")]
async fn api_library(state: SharedState) -> HttpResponse {
    match state.read() {
        Ok(g) => HttpResponse::Ok().json(g.store.library()),
        Err(_) => HttpResponse::InternalServerError().body("lock error"),
    }
}

/// Add names to the library; answers with the entries that were new.
#[post("/api/library")]
async fn api_add_library_players(state: SharedState, body: Json<LibraryBody>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let added = g.store.add_library_players(&body.names);
    if !added.is_empty() {
        g.save();
    }
    HttpResponse::Ok().json(added)
}

/// Remove a library player, also from every team that has them.
#[delete("/api/library/{player_id}")]
async fn api_remove_library_player(state: SharedState, path: Path<PlayerPath>) -> HttpResponse {
    mutate(&state, |store| store.remove_library_player(path.player_id))
}

#[get("/api/export.csv")]
async fn api_export_csv(state: SharedState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match nights_to_csv(g.store.nights()) {
        Ok(csv) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header(("Content-Disposition", "attachment; filename=\"game-nights.csv\""))
            .body(csv),
        Err(e) => {
            log::error!("CSV export failed: {}", e);
            HttpResponse::InternalServerError().body("export error")
        }
    }
}

/// Wipe every night, the library and the data file.
#[post("/api/reset-all")]
async fn api_reset_all(state: SharedState) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    g.store.reset_all();
    if g.persist.send(PersistCommand::Clear).is_err() {
        log::warn!("Storage writer is gone; data file not cleared");
    }
    current_night_response(&g.store)
}

/// Apply persistence commands in order. Failures are logged, never rolled back.
async fn run_writer(storage: Storage, mut rx: UnboundedReceiver<PersistCommand>) {
    while let Some(cmd) = rx.recv().await {
        let storage = storage.clone();
        let result = tokio::task::spawn_blocking(move || match cmd {
            PersistCommand::Save(saved) => storage.save(&saved),
            PersistCommand::Clear => storage.clear(),
        })
        .await;
        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => log::warn!("Failed saving game nights: {}", e),
            Err(e) => log::warn!("Storage task failed: {}", e),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_data_file() -> String {
    "game-nights.json".to_string()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let data_file = std::env::var("DATA_FILE").unwrap_or_else(|_| default_data_file());
    let bind = (host.as_str(), port);

    let storage = Storage::new(data_file);
    let store = TournamentStore::load(&storage);
    let (tx, rx) = mpsc::unbounded_channel();
    actix_web::rt::spawn(run_writer(storage, rx));

    let state = Data::new(RwLock::new(AppState { store, persist: tx }));

    log::info!("Starting server at http://{}:{}", bind.0, bind.1);
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_state)
            .service(api_current_night)
            .service(api_table)
            .service(api_start_night)
            .service(api_select_night)
            .service(api_rename_night)
            .service(api_reset_night)
            .service(api_add_team)
            .service(api_update_team)
            .service(api_remove_team)
            .service(api_add_player)
            .service(api_add_existing_player)
            .service(api_remove_player)
            .service(api_transfer_player)
            .service(api_record_score)
            .service(api_resolve_tie)
            .service(api_set_duration)
            .service(api_attach_timer)
            .service(api_library)
            .service(api_add_library_players)
            .service(api_remove_library_player)
            .service(api_export_csv)
            .service(api_reset_all)
    })
    .bind(bind)?
    .run()
    .await
}

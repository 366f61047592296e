//! Single binary web server: authenticated JSON API for leagues, teams,
//! coaches, players, scheduled matches, and statistics.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT.
//! Token config: APP_TOKEN_SECRET, APP_TOKEN_TTL_SECS.
//! Seeded admin account: ADMIN_EMAIL, ADMIN_PASSWORD, ADMIN_NAME.

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path},
    App, HttpRequest, HttpResponse, HttpServer, Responder,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use sports_league_web::{
    average_squad_size, record_result, schedule_fixture, teams_per_league, wins_leaderboard,
    Claims, CoachId, LeagueError, LeagueId, LeagueStore, Role, TeamId, TokenSigner, UserDirectory,
};
use std::sync::RwLock;

/// Shared application state: the entity store and the user directory behind
/// their own locks, plus the immutable token signer. A write guard on `store`
/// is the atomic unit for multi-row mutations (result recording).
struct AppState {
    store: RwLock<LeagueStore>,
    users: RwLock<UserDirectory>,
    signer: TokenSigner,
}

type State = Data<AppState>;

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct RegisterBody {
    name: String,
    email: String,
    password: String,
}

#[derive(Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

#[derive(serde::Serialize)]
struct TokenResponse {
    token: String,
}

#[derive(Deserialize)]
struct LeagueBody {
    name: String,
    description: Option<String>,
}

#[derive(Deserialize)]
struct TeamBody {
    name: String,
    league_id: Option<LeagueId>,
    coach_id: Option<CoachId>,
}

#[derive(Deserialize)]
struct CoachBody {
    name: String,
    email: Option<String>,
    phone: Option<String>,
}

#[derive(Deserialize)]
struct PlayerBody {
    name: String,
    age: u32,
    position: Option<String>,
    team_id: Option<TeamId>,
}

#[derive(Deserialize)]
struct FixtureBody {
    scheduled_at: DateTime<Utc>,
    league_id: Option<LeagueId>,
    home_team_id: TeamId,
    away_team_id: TeamId,
}

#[derive(Deserialize)]
struct ResultBody {
    home_score: i64,
    away_score: i64,
}

/// Path segment: entity id (e.g. /api/leagues/{id})
#[derive(Deserialize)]
struct IdPath {
    id: u64,
}

/// Map a domain error to its HTTP response; every error body is
/// `{"error": message}`.
fn error_http(e: &LeagueError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e {
        LeagueError::NotFound(..) => HttpResponse::NotFound().json(body),
        LeagueError::AlreadyFinalized(_)
        | LeagueError::CoachTaken { .. }
        | LeagueError::EmailTaken => HttpResponse::Conflict().json(body),
        LeagueError::BadCredentials | LeagueError::InvalidToken => {
            HttpResponse::Unauthorized().json(body)
        }
        LeagueError::Forbidden => HttpResponse::Forbidden().json(body),
        _ => HttpResponse::BadRequest().json(body),
    }
}

fn lock_error() -> HttpResponse {
    HttpResponse::InternalServerError().json(serde_json::json!({ "error": "lock error" }))
}

/// Extract and verify the bearer token. Every /api route except health and
/// the auth endpoints goes through here before touching the store.
fn authorize(state: &AppState, req: &HttpRequest) -> Result<Claims, LeagueError> {
    let header = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or(LeagueError::InvalidToken)?;
    let token = header
        .strip_prefix("Bearer ")
        .ok_or(LeagueError::InvalidToken)?;
    state.signer.verify(token)
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "sports-league-web",
    })
}

// --- auth --------------------------------------------------------------------

#[post("/api/auth/register")]
async fn api_register(state: State, body: Json<RegisterBody>) -> HttpResponse {
    let mut users = match state.users.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match users.register(&body.name, &body.email, &body.password) {
        Ok(user) => HttpResponse::Created().json(user),
        Err(e) => error_http(&e),
    }
}

#[post("/api/auth/login")]
async fn api_login(state: State, body: Json<LoginBody>) -> HttpResponse {
    let users = match state.users.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match users.verify_credentials(&body.email, &body.password) {
        Ok(user) => {
            let token = state.signer.issue(&user.email, &user.roles);
            HttpResponse::Ok().json(TokenResponse { token })
        }
        Err(e) => error_http(&e),
    }
}

// --- leagues -----------------------------------------------------------------

#[get("/api/leagues")]
async fn api_list_leagues(state: State, req: HttpRequest) -> HttpResponse {
    if let Err(e) = authorize(&state, &req) {
        return error_http(&e);
    }
    let g = match state.store.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    HttpResponse::Ok().json(g.leagues())
}

#[get("/api/leagues/{id}")]
async fn api_get_league(state: State, req: HttpRequest, path: Path<IdPath>) -> HttpResponse {
    if let Err(e) = authorize(&state, &req) {
        return error_http(&e);
    }
    let g = match state.store.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.league(path.id) {
        Ok(league) => HttpResponse::Ok().json(league),
        Err(e) => error_http(&e),
    }
}

#[post("/api/leagues")]
async fn api_create_league(state: State, req: HttpRequest, body: Json<LeagueBody>) -> HttpResponse {
    if let Err(e) = authorize(&state, &req) {
        return error_http(&e);
    }
    let mut g = match state.store.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.create_league(&body.name, body.description.as_deref()) {
        Ok(league) => HttpResponse::Created().json(league),
        Err(e) => error_http(&e),
    }
}

#[put("/api/leagues/{id}")]
async fn api_update_league(
    state: State,
    req: HttpRequest,
    path: Path<IdPath>,
    body: Json<LeagueBody>,
) -> HttpResponse {
    if let Err(e) = authorize(&state, &req) {
        return error_http(&e);
    }
    let mut g = match state.store.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.update_league(path.id, &body.name, body.description.as_deref()) {
        Ok(league) => HttpResponse::Ok().json(league),
        Err(e) => error_http(&e),
    }
}

/// Deleting a league is the one admin-only operation.
#[delete("/api/leagues/{id}")]
async fn api_delete_league(state: State, req: HttpRequest, path: Path<IdPath>) -> HttpResponse {
    let claims = match authorize(&state, &req) {
        Ok(claims) => claims,
        Err(e) => return error_http(&e),
    };
    if !claims.has_role(Role::Admin) {
        return error_http(&LeagueError::Forbidden);
    }
    let mut g = match state.store.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.delete_league(path.id) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => error_http(&e),
    }
}

#[get("/api/leagues/{id}/teams")]
async fn api_league_teams(state: State, req: HttpRequest, path: Path<IdPath>) -> HttpResponse {
    if let Err(e) = authorize(&state, &req) {
        return error_http(&e);
    }
    let g = match state.store.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.teams_in_league(path.id) {
        Ok(teams) => HttpResponse::Ok().json(teams),
        Err(e) => error_http(&e),
    }
}

// --- teams -------------------------------------------------------------------

#[get("/api/teams")]
async fn api_list_teams(state: State, req: HttpRequest) -> HttpResponse {
    if let Err(e) = authorize(&state, &req) {
        return error_http(&e);
    }
    let g = match state.store.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    HttpResponse::Ok().json(g.teams())
}

#[get("/api/teams/{id}")]
async fn api_get_team(state: State, req: HttpRequest, path: Path<IdPath>) -> HttpResponse {
    if let Err(e) = authorize(&state, &req) {
        return error_http(&e);
    }
    let g = match state.store.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.team(path.id) {
        Ok(team) => HttpResponse::Ok().json(team),
        Err(e) => error_http(&e),
    }
}

#[post("/api/teams")]
async fn api_create_team(state: State, req: HttpRequest, body: Json<TeamBody>) -> HttpResponse {
    if let Err(e) = authorize(&state, &req) {
        return error_http(&e);
    }
    let mut g = match state.store.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.create_team(&body.name, body.league_id, body.coach_id) {
        Ok(team) => HttpResponse::Created().json(team),
        Err(e) => error_http(&e),
    }
}

#[put("/api/teams/{id}")]
async fn api_update_team(
    state: State,
    req: HttpRequest,
    path: Path<IdPath>,
    body: Json<TeamBody>,
) -> HttpResponse {
    if let Err(e) = authorize(&state, &req) {
        return error_http(&e);
    }
    let mut g = match state.store.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.update_team(path.id, &body.name, body.league_id, body.coach_id) {
        Ok(team) => HttpResponse::Ok().json(team),
        Err(e) => error_http(&e),
    }
}

#[delete("/api/teams/{id}")]
async fn api_delete_team(state: State, req: HttpRequest, path: Path<IdPath>) -> HttpResponse {
    if let Err(e) = authorize(&state, &req) {
        return error_http(&e);
    }
    let mut g = match state.store.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.delete_team(path.id) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => error_http(&e),
    }
}

#[get("/api/teams/{id}/players")]
async fn api_team_players(state: State, req: HttpRequest, path: Path<IdPath>) -> HttpResponse {
    if let Err(e) = authorize(&state, &req) {
        return error_http(&e);
    }
    let g = match state.store.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.players_in_team(path.id) {
        Ok(players) => HttpResponse::Ok().json(players),
        Err(e) => error_http(&e),
    }
}

// --- coaches -----------------------------------------------------------------

#[get("/api/coaches")]
async fn api_list_coaches(state: State, req: HttpRequest) -> HttpResponse {
    if let Err(e) = authorize(&state, &req) {
        return error_http(&e);
    }
    let g = match state.store.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    HttpResponse::Ok().json(g.coaches())
}

#[get("/api/coaches/{id}")]
async fn api_get_coach(state: State, req: HttpRequest, path: Path<IdPath>) -> HttpResponse {
    if let Err(e) = authorize(&state, &req) {
        return error_http(&e);
    }
    let g = match state.store.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.coach(path.id) {
        Ok(coach) => HttpResponse::Ok().json(coach),
        Err(e) => error_http(&e),
    }
}

#[post("/api/coaches")]
async fn api_create_coach(state: State, req: HttpRequest, body: Json<CoachBody>) -> HttpResponse {
    if let Err(e) = authorize(&state, &req) {
        return error_http(&e);
    }
    let mut g = match state.store.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.create_coach(&body.name, body.email.as_deref(), body.phone.as_deref()) {
        Ok(coach) => HttpResponse::Created().json(coach),
        Err(e) => error_http(&e),
    }
}

#[put("/api/coaches/{id}")]
async fn api_update_coach(
    state: State,
    req: HttpRequest,
    path: Path<IdPath>,
    body: Json<CoachBody>,
) -> HttpResponse {
    if let Err(e) = authorize(&state, &req) {
        return error_http(&e);
    }
    let mut g = match state.store.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.update_coach(path.id, &body.name, body.email.as_deref(), body.phone.as_deref()) {
        Ok(coach) => HttpResponse::Ok().json(coach),
        Err(e) => error_http(&e),
    }
}

#[delete("/api/coaches/{id}")]
async fn api_delete_coach(state: State, req: HttpRequest, path: Path<IdPath>) -> HttpResponse {
    if let Err(e) = authorize(&state, &req) {
        return error_http(&e);
    }
    let mut g = match state.store.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.delete_coach(path.id) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => error_http(&e),
    }
}

// --- players -----------------------------------------------------------------

#[get("/api/players")]
async fn api_list_players(state: State, req: HttpRequest) -> HttpResponse {
    if let Err(e) = authorize(&state, &req) {
        return error_http(&e);
    }
    let g = match state.store.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    HttpResponse::Ok().json(g.players())
}

#[get("/api/players/{id}")]
async fn api_get_player(state: State, req: HttpRequest, path: Path<IdPath>) -> HttpResponse {
    if let Err(e) = authorize(&state, &req) {
        return error_http(&e);
    }
    let g = match state.store.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.player(path.id) {
        Ok(player) => HttpResponse::Ok().json(player),
        Err(e) => error_http(&e),
    }
}

#[post("/api/players")]
async fn api_create_player(state: State, req: HttpRequest, body: Json<PlayerBody>) -> HttpResponse {
    if let Err(e) = authorize(&state, &req) {
        return error_http(&e);
    }
    let mut g = match state.store.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.create_player(&body.name, body.age, body.position.as_deref(), body.team_id) {
        Ok(player) => HttpResponse::Created().json(player),
        Err(e) => error_http(&e),
    }
}

#[put("/api/players/{id}")]
async fn api_update_player(
    state: State,
    req: HttpRequest,
    path: Path<IdPath>,
    body: Json<PlayerBody>,
) -> HttpResponse {
    if let Err(e) = authorize(&state, &req) {
        return error_http(&e);
    }
    let mut g = match state.store.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.update_player(
        path.id,
        &body.name,
        body.age,
        body.position.as_deref(),
        body.team_id,
    ) {
        Ok(player) => HttpResponse::Ok().json(player),
        Err(e) => error_http(&e),
    }
}

#[delete("/api/players/{id}")]
async fn api_delete_player(state: State, req: HttpRequest, path: Path<IdPath>) -> HttpResponse {
    if let Err(e) = authorize(&state, &req) {
        return error_http(&e);
    }
    let mut g = match state.store.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.delete_player(path.id) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => error_http(&e),
    }
}

// --- matches -----------------------------------------------------------------

#[get("/api/matches")]
async fn api_list_matches(state: State, req: HttpRequest) -> HttpResponse {
    if let Err(e) = authorize(&state, &req) {
        return error_http(&e);
    }
    let g = match state.store.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    HttpResponse::Ok().json(g.fixtures())
}

#[get("/api/matches/{id}")]
async fn api_get_match(state: State, req: HttpRequest, path: Path<IdPath>) -> HttpResponse {
    if let Err(e) = authorize(&state, &req) {
        return error_http(&e);
    }
    let g = match state.store.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.fixture(path.id) {
        Ok(fixture) => HttpResponse::Ok().json(fixture),
        Err(e) => error_http(&e),
    }
}

/// Schedule a match between two distinct teams (league rules enforced by the
/// match engine).
#[post("/api/matches")]
async fn api_create_match(state: State, req: HttpRequest, body: Json<FixtureBody>) -> HttpResponse {
    if let Err(e) = authorize(&state, &req) {
        return error_http(&e);
    }
    let mut g = match state.store.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match schedule_fixture(
        &mut g,
        body.scheduled_at,
        body.league_id,
        body.home_team_id,
        body.away_team_id,
    ) {
        Ok(fixture) => HttpResponse::Created().json(fixture),
        Err(e) => error_http(&e),
    }
}

/// Record a final score. Scores, the finalized flag, and the winner's counter
/// are applied under one store write guard; a second call is a 409.
#[put("/api/matches/{id}/result")]
async fn api_record_result(
    state: State,
    req: HttpRequest,
    path: Path<IdPath>,
    body: Json<ResultBody>,
) -> HttpResponse {
    if let Err(e) = authorize(&state, &req) {
        return error_http(&e);
    }
    let mut g = match state.store.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match record_result(&mut g, path.id, body.home_score, body.away_score) {
        Ok(fixture) => HttpResponse::Ok().json(fixture),
        Err(e) => error_http(&e),
    }
}

#[delete("/api/matches/{id}")]
async fn api_delete_match(state: State, req: HttpRequest, path: Path<IdPath>) -> HttpResponse {
    if let Err(e) = authorize(&state, &req) {
        return error_http(&e);
    }
    let mut g = match state.store.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.delete_fixture(path.id) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => error_http(&e),
    }
}

// --- stats -------------------------------------------------------------------

#[get("/api/stats/top-wins")]
async fn api_stats_top_wins(state: State, req: HttpRequest) -> HttpResponse {
    if let Err(e) = authorize(&state, &req) {
        return error_http(&e);
    }
    let g = match state.store.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    HttpResponse::Ok().json(wins_leaderboard(&g))
}

#[get("/api/stats/teams-per-league")]
async fn api_stats_teams_per_league(state: State, req: HttpRequest) -> HttpResponse {
    if let Err(e) = authorize(&state, &req) {
        return error_http(&e);
    }
    let g = match state.store.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    HttpResponse::Ok().json(teams_per_league(&g))
}

#[get("/api/stats/average-squad-size")]
async fn api_stats_average_squad_size(state: State, req: HttpRequest) -> HttpResponse {
    if let Err(e) = authorize(&state, &req) {
        return error_http(&e);
    }
    let g = match state.store.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    HttpResponse::Ok().json(serde_json::json!({ "average": average_squad_size(&g) }))
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

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let bind = (host.as_str(), port);

    let secret = std::env::var("APP_TOKEN_SECRET").unwrap_or_else(|_| {
        log::warn!("APP_TOKEN_SECRET not set, using development default");
        "dev-secret-change-me".to_string()
    });
    let ttl_secs: i64 = std::env::var("APP_TOKEN_TTL_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3600);

    let mut users = UserDirectory::new();
    let admin_email = std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@example.com".into());
    let admin_password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin12345".into());
    let admin_name = std::env::var("ADMIN_NAME").unwrap_or_else(|_| "ADMIN".into());
    match users.add_user(
        &admin_name,
        &admin_email,
        &admin_password,
        vec![Role::Admin, Role::User],
    ) {
        Ok(user) => log::info!("Seeded admin user: {}", user.email),
        Err(e) => log::warn!("Admin seed skipped: {}", e),
    }

    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(AppState {
        store: RwLock::new(LeagueStore::new()),
        users: RwLock::new(users),
        signer: TokenSigner::new(&secret, ttl_secs),
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_register)
            .service(api_login)
            .service(api_list_leagues)
            .service(api_get_league)
            .service(api_create_league)
            .service(api_update_league)
            .service(api_delete_league)
            .service(api_league_teams)
            .service(api_list_teams)
            .service(api_get_team)
            .service(api_create_team)
            .service(api_update_team)
            .service(api_delete_team)
            .service(api_team_players)
            .service(api_list_coaches)
            .service(api_get_coach)
            .service(api_create_coach)
            .service(api_update_coach)
            .service(api_delete_coach)
            .service(api_list_players)
            .service(api_get_player)
            .service(api_create_player)
            .service(api_update_player)
            .service(api_delete_player)
            .service(api_list_matches)
            .service(api_get_match)
            .service(api_create_match)
            .service(api_record_result)
            .service(api_delete_match)
            .service(api_stats_top_wins)
            .service(api_stats_teams_per_league)
            .service(api_stats_average_squad_size)
    })
    .bind(bind)?
    .run()
    .await
}

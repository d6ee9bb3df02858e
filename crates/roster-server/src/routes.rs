use crate::http::Request;
use crate::{AppState, SharedState};
use roster_core::{names, teams};
use serde::Deserialize;
use serde_json::json;

const MIN_COUNT: i64 = 1;
const MAX_COUNT: i64 = 100;
const MIN_TEAMS: i64 = 2;
const MAX_TEAMS: i64 = 10;

/// Outcome of a route handler: a status code plus a JSON body.
#[derive(Debug)]
pub struct Reply {
    pub status: u16,
    pub body: String,
}

impl Reply {
    fn json(status: u16, value: &serde_json::Value) -> Self {
        Self {
            status,
            body: value.to_string(),
        }
    }

    fn message(status: u16, message: &str) -> Self {
        Self::json(status, &json!({ "message": message }))
    }

    fn invalid(errors: serde_json::Value) -> Self {
        Self::json(400, &json!({ "message": "Invalid request", "errors": errors }))
    }

    fn not_found() -> Self {
        Self::message(404, "Not found")
    }
}

// --- Request bodies ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddNameBody {
    full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CountBody {
    count: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TeamCountBody {
    team_count: Option<i64>,
}

/// Parse a JSON request body. An empty body reads as `{}` so that missing
/// fields are reported per field rather than as a parse failure.
fn parse_body<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T, Reply> {
    let body = if body.is_empty() { b"{}" as &[u8] } else { body };
    serde_json::from_slice(body).map_err(|e| Reply::invalid(json!({ "body": e.to_string() })))
}

// --- Dispatch ---

pub async fn dispatch(state: &SharedState, req: &Request) -> Reply {
    match (req.method.as_str(), req.path.as_str()) {
        ("GET", "/names") => list_names(state).await,
        ("POST", "/names") => add_name(state, &req.body).await,
        ("POST", "/names/generate") => generate_names(state, &req.body).await,
        ("POST", "/names/random") => random_names(&req.body),
        ("GET", "/names/history") => history(state).await,
        ("POST", "/teams/generate") => generate_teams(state, &req.body).await,
        ("DELETE", path) => match path
            .strip_prefix("/names/")
            .and_then(|id| id.parse::<u64>().ok())
        {
            Some(id) => remove_name(state, id).await,
            None => Reply::not_found(),
        },
        _ => Reply::not_found(),
    }
}

// --- Handlers ---

async fn list_names(state: &SharedState) -> Reply {
    let state = state.lock().await;
    Reply::json(200, &json!({ "names": state.store.list() }))
}

async fn add_name(state: &SharedState, body: &[u8]) -> Reply {
    let parsed: AddNameBody = match parse_body(body) {
        Ok(p) => p,
        Err(reply) => return reply,
    };
    let full_name = match parsed.full_name.as_deref().map(str::trim) {
        None => return Reply::invalid(json!({ "fullName": "required" })),
        Some("") => return Reply::invalid(json!({ "fullName": "must not be empty" })),
        Some(name) => name.to_string(),
    };

    let mut state = state.lock().await;
    let entry = state.store.add(&full_name);
    Reply::json(201, &json!(entry))
}

async fn remove_name(state: &SharedState, id: u64) -> Reply {
    let mut state = state.lock().await;
    if state.store.remove(id) {
        Reply::message(200, "Name removed")
    } else {
        Reply::message(404, "Name not found")
    }
}

async fn generate_names(state: &SharedState, body: &[u8]) -> Reply {
    let count = match required_count(body, "count", MIN_COUNT, MAX_COUNT) {
        Ok(count) => count,
        Err(reply) => return reply,
    };

    let mut state = state.lock().await;
    let AppState { store, sampler } = &mut *state;
    let all = store.full_names();
    match sampler.generate(&mut rand::rng(), &all, count) {
        Ok(names) => Reply::json(200, &json!({ "names": names })),
        Err(e) => {
            log::error!("history write failed: {}", e);
            Reply::message(500, "Failed to generate names")
        }
    }
}

fn random_names(body: &[u8]) -> Reply {
    let count = match required_count(body, "count", MIN_COUNT, MAX_COUNT) {
        Ok(count) => count,
        Err(reply) => return reply,
    };
    let names = names::random_full_names(&mut rand::rng(), count);
    Reply::json(200, &json!({ "names": names }))
}

async fn history(state: &SharedState) -> Reply {
    let state = state.lock().await;
    Reply::json(200, &json!({ "history": state.sampler.window().selections() }))
}

async fn generate_teams(state: &SharedState, body: &[u8]) -> Reply {
    let parsed: TeamCountBody = match parse_body(body) {
        Ok(p) => p,
        Err(reply) => return reply,
    };
    let team_count = match validate_range(parsed.team_count, "teamCount", MIN_TEAMS, MAX_TEAMS) {
        Ok(count) => count,
        Err(reply) => return reply,
    };

    let state = state.lock().await;
    let entries = state.store.list();
    if entries.len() < team_count {
        return Reply::invalid(
            json!({ "teamCount": "not enough names to create that many teams" }),
        );
    }
    let teams = teams::split_into_teams(&mut rand::rng(), &entries, team_count);
    Reply::json(200, &json!({ "teams": teams }))
}

// --- Validation ---

fn required_count(body: &[u8], field: &str, min: i64, max: i64) -> Result<usize, Reply> {
    let parsed: CountBody = parse_body(body)?;
    validate_range(parsed.count, field, min, max)
}

fn validate_range(value: Option<i64>, field: &str, min: i64, max: i64) -> Result<usize, Reply> {
    match value {
        None => Err(Reply::invalid(json!({ field: "required" }))),
        Some(n) if !(min..=max).contains(&n) => Err(Reply::invalid(
            json!({ field: format!("must be between {} and {}", min, max) }),
        )),
        Some(n) => Ok(n as usize),
    }
}

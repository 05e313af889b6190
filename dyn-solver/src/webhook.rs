//! HTTP entry point that cert-manager calls to present and clean up challenges.
use rocket::{
    figment::Figment, get, http::Status, post, routes, serde::json::Json, Build, Rocket, State,
};
use tracing::{error, info};

use crate::{
    challenge::{ChallengeAction, ChallengePayload},
    error::{Error, Result},
    solver::{Dns01Solver, Solver},
};

struct Registration {
    group_name: String,
    solver_name: String,
}

#[post("/apis/<group>/v1alpha1/<name>", data = "<payload>")]
async fn solve(
    group: &str,
    name: &str,
    registration: &State<Registration>,
    solver: &State<Dns01Solver>,
    payload: Json<ChallengePayload>,
) -> Result<Json<ChallengePayload>, (Status, String)> {
    if group != registration.group_name || name != registration.solver_name {
        return Err((Status::NotFound, format!("no solver {name} in group {group}")));
    }
    let Some(request) = payload.into_inner().request else {
        return Err((
            Status::BadRequest,
            "challenge payload carries no request".into(),
        ));
    };
    info!(
        uid = %request.uid,
        action = ?request.action,
        fqdn = %request.resolved_fqdn,
        "handling challenge"
    );
    let result = match request.action {
        ChallengeAction::Present => solver.present(&request).await,
        ChallengeAction::CleanUp => solver.clean_up(&request).await,
    };
    if let Err(err) = &result {
        error!(uid = %request.uid, "challenge failed: {err}");
    }
    Ok(Json(ChallengePayload::reply(&request, result)))
}

#[get("/healthz")]
fn healthz() -> &'static str {
    "ok"
}

/// Register `solver` under `group_name` and build the server.
pub fn rocket(figment: Figment, group_name: &str, solver: Dns01Solver) -> Result<Rocket<Build>> {
    if group_name.is_empty() {
        return Err(Error::EmptyGroupName);
    }
    let registration = Registration {
        group_name: group_name.to_string(),
        solver_name: solver.name().to_string(),
    };
    info!(
        group = group_name,
        solver = %registration.solver_name,
        "registering solver"
    );
    Ok(rocket::custom(figment)
        .manage(registration)
        .manage(solver)
        .mount("/", routes![solve, healthz]))
}

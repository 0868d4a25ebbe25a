//! Add top-level routes as submodules here.

use crate::state::RocketState;
use chrono::{DateTime, Utc};
use rocket::{get, serde::json::Json, Build, Rocket};
use rocket_okapi::{
    openapi, openapi_get_routes,
    swagger_ui::{make_swagger_ui, DefaultModelRendering, SwaggerUIConfig},
};
use schemars::JsonSchema;
use serde::Serialize;

mod account;
mod user;
mod wallet;

const BASE: &str = "/api";

#[derive(Debug, Serialize, JsonSchema)]
struct HealthResponse {
    status: String,
    timestamp: DateTime<Utc>,
    version: String,
}

/// Service liveness check.
#[openapi(tag = "Health")]
#[get("/health")]
fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_owned(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_owned(),
    })
}

pub fn register(rocket: Rocket<Build>, state: RocketState) -> Rocket<Build> {
    let rocket = rocket.manage(state);
    let rocket = rocket.mount(
        BASE,
        openapi_get_routes![
            health,
            account::register,
            account::login,
            user::get,
            wallet::get,
            wallet::deposit,
        ],
    );
    mount_swagger(rocket)
}

fn mount_swagger(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket.mount(
        format!("{}/swagger", BASE),
        make_swagger_ui(&SwaggerUIConfig {
            url: "../openapi.json".to_owned(),
            default_model_rendering: DefaultModelRendering::Model,
            show_extensions: true,
            ..Default::default()
        }),
    )
}

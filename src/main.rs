#[macro_use]
extern crate rocket;

use rocket::serde::json::Json;
use rocket::{Build, Request, Rocket};
use serde_json::{json, Value};
use std::sync::Arc;

mod boot;
mod color;
mod config;
mod db;
mod error;
mod functions;
mod i18n;
mod models;
mod notify;
mod routes;
mod sections;
mod security;
mod settings;
mod storage;
mod store;
mod tasks;
mod theme;

#[cfg(test)]
mod tests;

use config::AppConfig;
use error::ErrorCategory;
use i18n::Lang;
use notify::NotificationHub;
use settings::{keys, Missing, SettingsClient};
use storage::StorageService;
use store::sqlite::SqliteStore;
use store::Store;
use theme::{ModeChannel, ThemeMode};

fn category_body(req: &Request<'_>, category: ErrorCategory) -> Json<Value> {
    let lang = Lang::from_accept_language(req.headers().get_one("Accept-Language"));
    Json(json!({
        "error": category.message(lang),
        "category": category,
    }))
}

#[catch(400)]
fn bad_request(req: &Request<'_>) -> Json<Value> {
    category_body(req, ErrorCategory::Generic)
}

#[catch(401)]
fn unauthorized(req: &Request<'_>) -> Json<Value> {
    category_body(req, ErrorCategory::Authentication)
}

#[catch(403)]
fn forbidden(req: &Request<'_>) -> Json<Value> {
    category_body(req, ErrorCategory::AccessDenied)
}

#[catch(404)]
fn not_found(req: &Request<'_>) -> Json<Value> {
    category_body(req, ErrorCategory::NotFound)
}

#[catch(422)]
fn unprocessable(req: &Request<'_>) -> Json<Value> {
    category_body(req, ErrorCategory::Generic)
}

#[catch(500)]
fn server_error(req: &Request<'_>) -> Json<Value> {
    category_body(req, ErrorCategory::Generic)
}

/// Everything but the background tasks, so tests can build the same app
/// against their own store.
pub fn app(store: Arc<dyn Store>, config: AppConfig) -> Rocket<Build> {
    let settings = SettingsClient::new(Arc::clone(&store));
    let storage = StorageService::from_config(&config.storage);
    let mode: ThemeMode = settings.load_or_default(keys::THEME_MODE, Missing::UseDefault);

    rocket::build()
        .manage(store)
        .manage(settings)
        .manage(ModeChannel::new(mode))
        .manage(Arc::new(NotificationHub::default()))
        .manage(storage)
        .manage(config)
        .mount("/api", routes::api::routes())
        .mount("/api", routes::storage::api_routes())
        .mount("/api/admin", routes::admin_api::routes())
        .mount("/functions/v1", functions::routes())
        .mount("/", routes::storage::public_routes())
        .register(
            "/",
            catchers![
                bad_request,
                unauthorized,
                forbidden,
                not_found,
                unprocessable,
                server_error
            ],
        )
}

#[launch]
fn rocket() -> _ {
    env_logger::init();

    let config = AppConfig::load().expect("Failed to load configuration");

    // Boot check: create data and bucket directories
    boot::run(&config);

    let store: Arc<dyn Store> = Arc::new(
        SqliteStore::new_at(&config.database.path).expect("Failed to initialize database pool"),
    );
    store
        .run_migrations()
        .expect("Failed to run database migrations");
    store
        .seed_defaults()
        .expect("Failed to seed default settings");

    app(store, config).attach(tasks::BackgroundTasks)
}

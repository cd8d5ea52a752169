use std::path::{Component, PathBuf};
use std::sync::{Mutex, MutexGuard};

use actix_cors::Cors;
use actix_files::NamedFile;
use actix_web::{error, get, http, post, web, HttpRequest, HttpResponse, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};
use tera::Tera;

use crate::error::StoreError;
use crate::message_database::MessageStore;
use crate::render;

const JSON_LIMIT: usize = 100 * 1024;

pub struct AppState {
    pub tera: Tera,
    pub store: Mutex<MessageStore>,
    pub static_dir: PathBuf,
}

#[derive(Serialize)]
struct ErrorTdo {
    error: String,
}

#[derive(Deserialize)]
struct NewMessageTdo {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct FormData {
    message: String,
}

fn lock_store(data: &AppState) -> Result<MutexGuard<'_, MessageStore>> {
    data.store.lock().map_err(|_| {
        log::error!("Message store lock is poisoned");
        error::ErrorInternalServerError("message store unavailable")
    })
}

fn error_json(error: impl ToString) -> ErrorTdo {
    ErrorTdo {
        error: error.to_string(),
    }
}

#[get("/static/{filename:.*}")]
async fn get_static(req: HttpRequest, data: web::Data<AppState>) -> Result<NamedFile> {
    let path = PathBuf::from(req.match_info().query("filename"));
    if path.components().any(|c| !matches!(c, Component::Normal(_))) {
        return Err(error::ErrorNotFound("not found"));
    }
    Ok(NamedFile::open(data.static_dir.join(path))?)
}

#[get("/")]
async fn get_index(data: web::Data<AppState>) -> Result<HttpResponse> {
    let views = {
        let store = lock_store(&data)?;
        render::render_all(store.list(), &Local::now())
    };
    let output = render::render_page(&data.tera, &views).map_err(|e| {
        log::error!("Could not render index: {:?}", e);
        error::ErrorInternalServerError("template error")
    })?;
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(output))
}

#[get("/api/messages")]
async fn list_messages(data: web::Data<AppState>) -> Result<HttpResponse> {
    let store = lock_store(&data)?;
    Ok(HttpResponse::Ok().json(store.list()))
}

#[post("/api/messages")]
async fn create_message(
    body: web::Json<NewMessageTdo>,
    data: web::Data<AppState>,
) -> Result<HttpResponse> {
    let mut store = lock_store(&data)?;
    let text = body.text.as_deref().unwrap_or("");
    match store.append(text) {
        Ok(msg) => {
            log::info!("Got message {} via API", msg.id);
            Ok(HttpResponse::Created().json(msg))
        }
        Err(e @ StoreError::EmptyText) => Ok(HttpResponse::BadRequest().json(error_json(e))),
        Err(e) => {
            log::error!("Failed to store message: {}", e);
            Ok(HttpResponse::InternalServerError().json(error_json(e)))
        }
    }
}

#[post("/message")]
async fn post_message(
    form: web::Form<FormData>,
    data: web::Data<AppState>,
) -> Result<HttpResponse> {
    let mut store = lock_store(&data)?;
    match store.append(&form.message) {
        Ok(msg) => {
            log::info!("Got message {} via form", msg.id);
            Ok(HttpResponse::SeeOther()
                .insert_header((http::header::LOCATION, "/"))
                .finish())
        }
        Err(StoreError::EmptyText) => {
            Ok(HttpResponse::BadRequest().body("Please provide a message"))
        }
        Err(e) => {
            log::error!("Failed to store message: {}", e);
            Err(error::ErrorInternalServerError(e))
        }
    }
}

/// Malformed JSON bodies get the same `{error}` shape as validation failures.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_LIMIT)
        .error_handler(|err, _req| {
            let response = HttpResponse::BadRequest().json(error_json(&err));
            error::InternalError::from_response(err, response).into()
        })
}

/// Any origin may call the API.
pub fn cors() -> Cors {
    Cors::permissive()
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(get_static)
        .service(get_index)
        .service(list_messages)
        .service(create_message)
        .service(post_message);
}

//! HTTP handler functions for the mobility map API.

use std::sync::Arc;

use actix_web::{HttpResponse, web};
use mobility_map_dataset_models::{Basemap, DatasetId};
use mobility_map_render::render_page;
use mobility_map_server_models::{ApiBasemap, ApiDataset, ApiError, ApiHealth, ApiSession};
use mobility_map_session::Message;
use uuid::Uuid;

use crate::sessions::SessionEntry;
use crate::{AppState, ServerError};

/// `GET /api/health`
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        sessions: state.sessions.len(),
    })
}

/// `GET /api/basemaps`
pub async fn basemaps() -> HttpResponse {
    let basemaps: Vec<ApiBasemap> = Basemap::all().iter().copied().map(ApiBasemap::from).collect();
    HttpResponse::Ok().json(basemaps)
}

/// `GET /api/datasets`
///
/// Lists every dataset with its loaded size.
pub async fn datasets(state: web::Data<AppState>) -> HttpResponse {
    let catalog = state.engine.catalog();
    let datasets: Vec<ApiDataset> = DatasetId::all()
        .iter()
        .map(|id| {
            let (feature_count, columns) = if *id == DatasetId::Collisions {
                (catalog.collisions().totals().by_year.values().sum(), Vec::new())
            } else {
                let dataset = catalog.dataset(*id);
                (
                    dataset.len() as u64,
                    dataset.columns().iter().cloned().collect(),
                )
            };
            ApiDataset {
                id: *id,
                name: id.display_name().to_string(),
                feature_count,
                columns,
            }
        })
        .collect();

    HttpResponse::Ok().json(datasets)
}

/// `POST /api/sessions`
///
/// Starts a session in the initial state.
pub async fn create_session(state: web::Data<AppState>) -> HttpResponse {
    let (id, entry) = state.sessions.create();
    match session_view(&state, id, entry).await {
        Ok(session) => HttpResponse::Created().json(session),
        Err(e) => error_response(&e),
    }
}

/// `GET /api/sessions/{id}`
pub async fn get_session(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let result = async {
        let id = parse_id(&path)?;
        let entry = state
            .sessions
            .get(id)
            .ok_or_else(|| ServerError::SessionNotFound { id: id.to_string() })?;
        session_view(&state, id, entry).await
    }
    .await;

    match result {
        Ok(session) => HttpResponse::Ok().json(session),
        Err(e) => error_response(&e),
    }
}

/// `POST /api/sessions/{id}/events`
///
/// Applies one UI event and returns the updated session.
pub async fn post_event(
    state: web::Data<AppState>,
    path: web::Path<String>,
    message: web::Json<Message>,
) -> HttpResponse {
    let result = async {
        let id = parse_id(&path)?;
        let entry = state
            .sessions
            .apply(id, [message.into_inner()])
            .ok_or_else(|| ServerError::SessionNotFound { id: id.to_string() })?;
        session_view(&state, id, entry).await
    }
    .await;

    match result {
        Ok(session) => HttpResponse::Ok().json(session),
        Err(e) => error_response(&e),
    }
}

/// `DELETE /api/sessions/{id}`
pub async fn delete_session(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let result = parse_id(&path).and_then(|id| {
        if state.sessions.remove(id) {
            Ok(())
        } else {
            Err(ServerError::SessionNotFound { id: id.to_string() })
        }
    });

    match result {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => error_response(&e),
    }
}

/// Builds the form and page for `entry` off the async executor.
async fn session_view(
    state: &web::Data<AppState>,
    id: Uuid,
    entry: SessionEntry,
) -> Result<ApiSession, ServerError> {
    let engine = Arc::clone(&state.engine);
    let template = Arc::clone(&state.form);

    let view = tokio::task::spawn_blocking(move || {
        let form = template.render(&entry.state);
        let page = render_page(&entry.state, &engine);
        ApiSession {
            id: id.to_string(),
            created_at: entry.created_at,
            updated_at: entry.updated_at,
            pending_changes: entry.state.has_pending_changes(),
            state: entry.state,
            form,
            page,
        }
    })
    .await?;

    for warning in &view.page.warnings {
        log::warn!("Session {id}: {warning}");
    }
    Ok(view)
}

fn parse_id(raw: &str) -> Result<Uuid, ServerError> {
    Uuid::parse_str(raw).map_err(|_| ServerError::InvalidSessionId { id: raw.to_string() })
}

fn error_response(error: &ServerError) -> HttpResponse {
    let body = ApiError::new(error.to_string());
    match error {
        ServerError::SessionNotFound { .. } => HttpResponse::NotFound().json(body),
        ServerError::InvalidSessionId { .. } => HttpResponse::BadRequest().json(body),
        ServerError::Dataset(_) | ServerError::Render(_) => {
            log::error!("Request failed: {error}");
            HttpResponse::InternalServerError().json(body)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use mobility_map_dataset::progress::null_progress;
    use serde_json::{Value, json};

    use crate::{ServerConfig, configure};

    use super::*;

    fn state() -> web::Data<AppState> {
        let config = ServerConfig {
            data_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../dataset/fixtures"),
            ..ServerConfig::default()
        };
        web::Data::new(AppState::load(&config, &null_progress()).unwrap())
    }

    #[actix_web::test]
    async fn health_and_basemaps() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;

        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["healthy"], json!(true));

        let req = test::TestRequest::get().uri("/api/basemaps").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let names: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|b| b["name"].as_str())
            .collect();
        assert_eq!(names, ["OpenStreetMap", "Light (Positron)", "Dark (Dark Matter)"]);
    }

    #[actix_web::test]
    async fn datasets_report_loaded_sizes() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
        let req = test::TestRequest::get().uri("/api/datasets").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let junctions = body
            .as_array()
            .unwrap()
            .iter()
            .find(|d| d["id"] == json!("junctions"))
            .unwrap();
        assert_eq!(junctions["featureCount"], json!(6));
    }

    #[actix_web::test]
    async fn events_drive_the_session() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;

        let req = test::TestRequest::post().uri("/api/sessions").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        let id = body["id"].as_str().unwrap().to_string();
        assert_eq!(body["page"]["summary"]["total"], json!(0));
        assert_eq!(body["form"]["submitLabel"], json!("Render"));

        let req = test::TestRequest::post()
            .uri(&format!("/api/sessions/{id}/events"))
            .set_json(json!({
                "type": "selection_changed",
                "dimension": "junction_type",
                "values": [1],
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["pendingChanges"], json!(true));
        assert_eq!(body["page"]["summary"]["total"], json!(0));

        let req = test::TestRequest::post()
            .uri(&format!("/api/sessions/{id}/events"))
            .set_json(json!({ "type": "submit" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["pendingChanges"], json!(false));
        assert_eq!(body["page"]["summary"]["total"], json!(3));
        assert_eq!(
            body["page"]["map"]["overlays"][0]["name"],
            json!("JunctionsLayer_1")
        );

        let req = test::TestRequest::delete()
            .uri(&format!("/api/sessions/{id}"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let req = test::TestRequest::get()
            .uri(&format!("/api/sessions/{id}"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn malformed_session_ids_are_rejected() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
        let req = test::TestRequest::get()
            .uri("/api/sessions/not-a-uuid")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], json!("Invalid session id \"not-a-uuid\""));
    }
}

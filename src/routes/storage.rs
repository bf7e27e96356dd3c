use chrono::Utc;
use rocket::fs::{NamedFile, TempFile};
use rocket::serde::json::Json;
use rocket::State;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

use crate::error::AppError;
use crate::security::auth::AuthenticatedUser;
use crate::storage::StorageService;

#[derive(Debug, Deserialize)]
pub struct SignRequest {
    pub bucket: String,
    pub path: String,
}

/// URL for a stored object: direct for public buckets, signed otherwise.
#[post("/storage/sign", format = "json", data = "<req>")]
pub fn sign(
    _auth: AuthenticatedUser,
    req: Json<SignRequest>,
    storage: &State<StorageService>,
) -> Result<Json<Value>, AppError> {
    let url = storage.object_url(&req.bucket, &req.path, Utc::now().timestamp())?;
    Ok(Json(json!({ "url": url })))
}

#[post("/storage/<bucket>", data = "<file>")]
pub async fn upload(
    bucket: &str,
    auth: AuthenticatedUser,
    mut file: TempFile<'_>,
    storage: &State<StorageService>,
) -> Result<Json<Value>, AppError> {
    let path = storage.save(bucket, auth.user.id, &mut file).await?;
    let url = storage.object_url(bucket, &path, Utc::now().timestamp())?;
    Ok(Json(json!({ "path": path, "url": url })))
}

fn segments(path: &Path) -> String {
    path.iter()
        .map(|s| s.to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Object download. Private buckets require a valid, unexpired signature.
#[get("/storage/<bucket>/<path..>?<expires>&<sig>")]
pub async fn serve(
    bucket: &str,
    path: PathBuf,
    expires: Option<i64>,
    sig: Option<&str>,
    storage: &State<StorageService>,
) -> Result<NamedFile, AppError> {
    let path = segments(&path);
    if !storage.bucket(bucket)?.public {
        let (Some(expires), Some(sig)) = (expires, sig) else {
            return Err(AppError::AccessDenied);
        };
        storage.verify(bucket, &path, expires, sig, Utc::now().timestamp())?;
    }
    let file = storage.locate(bucket, &path)?;
    NamedFile::open(&file)
        .await
        .map_err(|_| AppError::NotFound(format!("object '{}/{}'", bucket, path)))
}

/// Mounted under `/api`.
pub fn api_routes() -> Vec<rocket::Route> {
    routes![sign, upload]
}

/// Mounted at the root so object URLs stay short.
pub fn public_routes() -> Vec<rocket::Route> {
    routes![serve]
}

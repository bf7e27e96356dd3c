//! Bucketed object storage on the local filesystem.
//!
//! Public buckets are served directly. Private buckets are only reachable
//! through a signed URL carrying an expiry and an HMAC over
//! `"<bucket>/<path>:<expires>"`.

use hmac::{Hmac, Mac};
use rocket::fs::TempFile;
use sha2::Sha256;
use std::path::PathBuf;

use crate::config::{BucketConfig, StorageConfig};
use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

const PUBLIC_URL_MARKER: &str = "/storage/v1/object/public/";

pub struct StorageService {
    root: PathBuf,
    base_url: String,
    signing_key: Vec<u8>,
    ttl_secs: i64,
    buckets: Vec<BucketConfig>,
}

impl StorageService {
    pub fn from_config(config: &StorageConfig) -> Self {
        StorageService {
            root: PathBuf::from(&config.root),
            base_url: config.public_base_url.trim_end_matches('/').to_string(),
            signing_key: config.signing_key.as_bytes().to_vec(),
            ttl_secs: config.signed_url_ttl_secs.max(1),
            buckets: config.buckets.clone(),
        }
    }

    pub fn bucket(&self, name: &str) -> Result<&BucketConfig, AppError> {
        self.buckets
            .iter()
            .find(|b| b.name == name)
            .ok_or_else(|| AppError::NotFound(format!("bucket '{}'", name)))
    }

    /// URL a client can fetch the object from. `stored` may be a bare path,
    /// a `<bucket>/`-prefixed path or a full public URL.
    pub fn object_url(&self, bucket: &str, stored: &str, now: i64) -> Result<String, AppError> {
        let b = self.bucket(bucket)?;
        let path = clean_path(&object_path(bucket, stored))
            .ok_or_else(|| AppError::Invalid(format!("object path '{}'", stored)))?;
        if b.public {
            return Ok(format!("{}/storage/{}/{}", self.base_url, bucket, path));
        }
        self.signed_url(bucket, &path, now + self.ttl_secs)
    }

    fn mac(&self) -> Result<HmacSha256, AppError> {
        if self.signing_key.is_empty() {
            return Err(AppError::Storage("signing key not configured".to_string()));
        }
        HmacSha256::new_from_slice(&self.signing_key).map_err(|e| AppError::Storage(e.to_string()))
    }

    pub fn signature(&self, bucket: &str, path: &str, expires: i64) -> Result<String, AppError> {
        let mut mac = self.mac()?;
        mac.update(format!("{}/{}:{}", bucket, path, expires).as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    pub fn signed_url(&self, bucket: &str, path: &str, expires: i64) -> Result<String, AppError> {
        let sig = self.signature(bucket, path, expires)?;
        Ok(format!(
            "{}/storage/{}/{}?expires={}&sig={}",
            self.base_url, bucket, path, expires, sig
        ))
    }

    /// Check a private-object request. Tampered paths, bad signatures and
    /// expired links all fail with `AccessDenied`.
    pub fn verify(
        &self,
        bucket: &str,
        path: &str,
        expires: i64,
        sig: &str,
        now: i64,
    ) -> Result<(), AppError> {
        if expires < now {
            return Err(AppError::AccessDenied);
        }
        let expected = hex::decode(sig).map_err(|_| AppError::AccessDenied)?;
        let mut mac = self.mac().map_err(|_| AppError::AccessDenied)?;
        mac.update(format!("{}/{}:{}", bucket, path, expires).as_bytes());
        mac.verify_slice(&expected).map_err(|_| AppError::AccessDenied)
    }

    /// Filesystem location of an object, refusing anything that would
    /// escape the bucket directory.
    pub fn locate(&self, bucket: &str, path: &str) -> Result<PathBuf, AppError> {
        self.bucket(bucket)?;
        let path = clean_path(path)
            .ok_or_else(|| AppError::Invalid(format!("object path '{}'", path)))?;
        Ok(self.root.join(bucket).join(path))
    }

    /// Persist an upload under `<owner>/<uuid>.<ext>` and return its
    /// in-bucket path.
    pub async fn save(
        &self,
        bucket: &str,
        owner: i64,
        file: &mut TempFile<'_>,
    ) -> Result<String, AppError> {
        self.bucket(bucket)?;
        let ext = file
            .content_type()
            .and_then(|ct| ct.extension())
            .map(|e| e.to_string())
            .or_else(|| {
                file.name()
                    .and_then(|n| n.rsplit('.').next())
                    .map(|e| e.to_lowercase())
            })
            .unwrap_or_else(|| "bin".to_string());
        let path = format!("{}/{}.{}", owner, uuid::Uuid::new_v4(), ext);
        let dest = self.locate(bucket, &path)?;
        if let Some(dir) = dest.parent() {
            std::fs::create_dir_all(dir).map_err(|e| AppError::Storage(e.to_string()))?;
        }
        file.persist_to(&dest)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;
        log::info!("[storage] stored {}/{}", bucket, path);
        Ok(path)
    }
}

/// Reduce a stored reference to the path inside `bucket`.
pub fn object_path(bucket: &str, stored: &str) -> String {
    let stored = stored.trim();
    let public_prefix = format!("{}{}/", PUBLIC_URL_MARKER, bucket);
    if let Some(idx) = stored.find(&public_prefix) {
        return stored[idx + public_prefix.len()..].to_string();
    }
    let bucket_prefix = format!("{}/", bucket);
    stored
        .strip_prefix(&bucket_prefix)
        .unwrap_or(stored)
        .trim_start_matches('/')
        .to_string()
}

/// Normalized relative path, or `None` if it is empty or tries to climb.
fn clean_path(path: &str) -> Option<String> {
    let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty() && *p != ".").collect();
    if parts.is_empty() || parts.iter().any(|p| *p == ".." || p.contains('\\')) {
        return None;
    }
    Some(parts.join("/"))
}

use rocket::http::Status;
use rocket::request::Request;
use rocket::response::{self, Responder, Response};
use rocket::serde::json::Json;
use serde::Serialize;
use serde_json::json;

use crate::config::AppConfig;
use crate::i18n::Lang;

/// Every failure the application surfaces. None of these is fatal: callers
/// degrade to default content or return a categorized message.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("duplicate record: {0}")]
    Duplicate(String),
    #[error("access denied")]
    AccessDenied,
    #[error("unauthorized")]
    Unauthorized,
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("database error: {0}")]
    Database(String),
}

/// The only error shapes shown to users outside development mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    AccessDenied,
    Duplicate,
    Authentication,
    NotFound,
    Generic,
}

impl AppError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AppError::AccessDenied => ErrorCategory::AccessDenied,
            AppError::Duplicate(_) => ErrorCategory::Duplicate,
            AppError::Unauthorized => ErrorCategory::Authentication,
            AppError::NotFound(_) => ErrorCategory::NotFound,
            AppError::Invalid(_) | AppError::Storage(_) | AppError::Database(_) => {
                ErrorCategory::Generic
            }
        }
    }

    pub fn status(&self) -> Status {
        match self {
            AppError::NotFound(_) => Status::NotFound,
            AppError::Duplicate(_) => Status::Conflict,
            AppError::AccessDenied => Status::Forbidden,
            AppError::Unauthorized => Status::Unauthorized,
            AppError::Invalid(_) => Status::BadRequest,
            AppError::Storage(_) | AppError::Database(_) => Status::InternalServerError,
        }
    }
}

impl ErrorCategory {
    pub fn message(self, lang: Lang) -> &'static str {
        match (self, lang) {
            (ErrorCategory::AccessDenied, Lang::Ar) => "ليس لديك صلاحية لتنفيذ هذا الإجراء",
            (ErrorCategory::AccessDenied, Lang::En) => "You do not have permission to do this",
            (ErrorCategory::Duplicate, Lang::Ar) => "هذا السجل مسجل بالفعل",
            (ErrorCategory::Duplicate, Lang::En) => "This record is already registered",
            (ErrorCategory::Authentication, Lang::Ar) => "خطأ في المصادقة، يرجى تسجيل الدخول مجددًا",
            (ErrorCategory::Authentication, Lang::En) => "Authentication error, please sign in again",
            (ErrorCategory::NotFound, Lang::Ar) => "العنصر المطلوب غير موجود",
            (ErrorCategory::NotFound, Lang::En) => "The requested item was not found",
            (ErrorCategory::Generic, Lang::Ar) => "حدث خطأ، يرجى المحاولة مرة أخرى",
            (ErrorCategory::Generic, Lang::En) => "Something went wrong, please try again",
        }
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(e: rusqlite::Error) -> Self {
        match &e {
            rusqlite::Error::QueryReturnedNoRows => AppError::NotFound(e.to_string()),
            rusqlite::Error::SqliteFailure(err, _)
                if err.code == rusqlite::ErrorCode::ConstraintViolation
                    && matches!(
                        err.extended_code,
                        rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                            | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                    ) =>
            {
                AppError::Duplicate(e.to_string())
            }
            _ => AppError::Database(e.to_string()),
        }
    }
}

impl From<r2d2::Error> for AppError {
    fn from(e: r2d2::Error) -> Self {
        AppError::Database(e.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Invalid(e.to_string())
    }
}

impl<'r> Responder<'r, 'static> for AppError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        let dev_mode = req
            .rocket()
            .state::<AppConfig>()
            .map(|c| c.server.dev_mode)
            .unwrap_or(false);
        let lang = Lang::from_accept_language(req.headers().get_one("Accept-Language"));
        let category = self.category();

        if dev_mode {
            log::error!("[api] {} {}: {}", req.method(), req.uri(), self);
        } else {
            log::warn!("[api] {} {} failed ({:?})", req.method(), req.uri(), category);
        }

        let mut body = json!({
            "error": category.message(lang),
            "category": category,
        });
        if dev_mode {
            body["detail"] = json!(self.to_string());
        }

        Response::build_from(Json(body).respond_to(req)?)
            .status(self.status())
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_cover_taxonomy() {
        assert_eq!(AppError::AccessDenied.category(), ErrorCategory::AccessDenied);
        assert_eq!(AppError::Duplicate("x".into()).category(), ErrorCategory::Duplicate);
        assert_eq!(AppError::Unauthorized.category(), ErrorCategory::Authentication);
        assert_eq!(AppError::Database("boom".into()).category(), ErrorCategory::Generic);
        assert_eq!(AppError::Duplicate("x".into()).status(), Status::Conflict);
    }

    #[test]
    fn unique_violation_maps_to_duplicate() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (k TEXT PRIMARY KEY); INSERT INTO t VALUES ('a');")
            .unwrap();
        let err = conn.execute("INSERT INTO t VALUES ('a')", []).unwrap_err();
        assert!(matches!(AppError::from(err), AppError::Duplicate(_)));
    }
}

use rocket::request::{FromRequest, Outcome, Request};

use crate::i18n::Lang;

pub mod admin_api;
pub mod api;
pub mod storage;

/// Language from `Accept-Language`, used when no `?lang=` is given.
pub struct AcceptLang(pub Lang);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AcceptLang {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        Outcome::Success(AcceptLang(Lang::from_accept_language(
            request.headers().get_one("Accept-Language"),
        )))
    }
}

impl AcceptLang {
    /// An explicit query parameter wins over the header.
    pub fn or(self, explicit: Option<Lang>) -> Lang {
        explicit.unwrap_or(self.0)
    }
}

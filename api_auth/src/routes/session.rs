use actix_session::Session;
use actix_web::{Responder, get};
use common::error::{AppError, Res};
use common::http::Success;
use db::models::user::User;
use extractor::{SESSION_TOKEN_KEY, SESSION_USER_KEY};

use crate::dtos::auth::AuthResponse;

/// Token and user stored by the web login, 401 when there is no session.
#[get("/session")]
async fn get_session(session: Session) -> Res<impl Responder> {
    let user = session
        .get::<String>(SESSION_USER_KEY)
        .map_err(|_| AppError::BadRequest("Sesión inválida".to_string()))?
        .ok_or_else(|| AppError::Unauthorized("No hay una sesión activa".to_string()))?;
    let token = session
        .get::<String>(SESSION_TOKEN_KEY)
        .map_err(|_| AppError::BadRequest("Sesión inválida".to_string()))?
        .ok_or_else(|| AppError::Unauthorized("No hay una sesión activa".to_string()))?;

    let user = serde_json::from_str::<User>(&user)
        .map_err(|_| AppError::Internal("Failed to parse user json".to_string()))?;
    Success::ok(AuthResponse { token, user })
}

#[cfg(test)]
mod tests {
    use actix_session::{SessionMiddleware, storage::CookieSessionStore};
    use actix_web::{App, cookie::Key, http::StatusCode, test};

    use super::*;

    #[actix_web::test]
    async fn missing_session_is_unauthorized() {
        let app = test::init_service(
            App::new()
                .wrap(SessionMiddleware::new(
                    CookieSessionStore::default(),
                    Key::generate(),
                ))
                .service(get_session),
        )
        .await;

        let res =
            test::call_service(&app, test::TestRequest::get().uri("/session").to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}

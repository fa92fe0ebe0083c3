use std::time::SystemTime;

use actix_web::cookie::Cookie;
use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use tracing::debug;

use crate::auth::jwt::{mint_user_token, verify_user_token};
use crate::error::{ApiResponse, AppError};
use crate::repos::users::UserSummary;
use crate::state::app_state::AppState;
use crate::validation::{SigninForm, SignupForm};

pub const USER_TOKEN_COOKIE: &str = "user_token";

const AUTHENTICATION_FAILED: &str = "Failed to authenticate user";

/// Create a user with a profile and sign them in.
async fn signup(
    form: web::Json<SignupForm>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let new_user = form.validate()?;
    let user = app_state.users.create_user_with_profile(&new_user).await?;
    signed_in(&app_state, user)
}

async fn signin(
    form: web::Json<SigninForm>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let email_address = form.validate()?;
    let user = app_state
        .users
        .signin_user(&email_address, &form.password)
        .await?;
    signed_in(&app_state, user)
}

/// Claims of the user behind the `user_token` cookie.
async fn current_user(
    req: HttpRequest,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let Some(cookie) = req.cookie(USER_TOKEN_COOKIE) else {
        return Err(AppError::unauthorized(AUTHENTICATION_FAILED));
    };

    match verify_user_token(cookie.value(), &app_state.security) {
        Ok(claims) => Ok(HttpResponse::Ok().json(ApiResponse::ok(claims))),
        Err(e) => {
            debug!(error = %e, "Rejected user token");
            let mut removal = Cookie::build(USER_TOKEN_COOKIE, "").path("/").finish();
            removal.make_removal();
            let mut response = AppError::unauthorized(AUTHENTICATION_FAILED).error_response();
            if let Err(e) = response.add_cookie(&removal) {
                debug!(error = %e, "Failed to clear user token cookie");
            }
            Ok(response)
        }
    }
}

/// Mint the user token, set it as an HTTP-only cookie and return the user.
fn signed_in(app_state: &AppState, user: UserSummary) -> Result<HttpResponse, AppError> {
    let token = mint_user_token(&user, SystemTime::now(), &app_state.security)?;
    let cookie = Cookie::build(USER_TOKEN_COOKIE, token)
        .path("/")
        .http_only(true)
        .finish();

    Ok(HttpResponse::Ok().cookie(cookie).json(ApiResponse::ok(user)))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::bad_request(err.to_string()).into()),
    )
    .route("/signup", web::post().to(signup))
    .route("/signin", web::post().to(signin))
    .route("/me", web::get().to(current_user));
}

use crate::flash::{redirect_to, set_flash, Flash};
use crate::middleware::csrf::validate_csrf_token;
use crate::middleware::ClientCtx;
use crate::session::{sign_in, verify_password};
use crate::user::find_user_by_name;
use actix_web::{error, get, post, web, Error, HttpRequest, HttpResponse, Responder};
use askama_actix::{Template, TemplateToResponse};
use sea_orm::{DatabaseConnection, DbErr};
use serde::Deserialize;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(post_login).service(view_login);
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub client: ClientCtx,
}

#[derive(Deserialize)]
pub struct FormData {
    csrf_token: String,
    username: String,
    password: String,
}

#[derive(Debug)]
pub enum LoginResultStatus {
    Success(i32),
    BadName,
    BadPassword,
}

/// Checks a name and password pair.
pub async fn login(
    db: &DatabaseConnection,
    name: &str,
    pass: &str,
) -> Result<LoginResultStatus, DbErr> {
    let user = match find_user_by_name(db, name).await? {
        Some(user) => user,
        None => return Ok(LoginResultStatus::BadName),
    };

    if verify_password(pass, &user.password) {
        Ok(LoginResultStatus::Success(user.id))
    } else {
        Ok(LoginResultStatus::BadPassword)
    }
}

#[post("/login")]
pub async fn post_login(
    req: HttpRequest,
    cookies: actix_session::Session,
    db: web::Data<DatabaseConnection>,
    form: web::Form<FormData>,
) -> Result<HttpResponse, Error> {
    validate_csrf_token(&cookies, &form.csrf_token)?;

    if let Err(e) = crate::rate_limit::check_login_rate_limit(&crate::ip::client_key(&req)) {
        log::warn!("login rate limit hit for {}", crate::ip::client_key(&req));
        set_flash(&cookies, Flash::error(e.to_string()));
        return Ok(redirect_to("/login"));
    }

    let result = login(&db, &form.username, &form.password)
        .await
        .map_err(|e| {
            log::error!("post_login: {}", e);
            error::ErrorInternalServerError("DB error")
        })?;

    match result {
        LoginResultStatus::Success(user_id) => {
            sign_in(&cookies, user_id)?;
            set_flash(&cookies, Flash::success("Welcome back."));
            Ok(redirect_to("/dashboard"))
        }
        LoginResultStatus::BadName | LoginResultStatus::BadPassword => {
            log::debug!("login failure: {:?} for {}", result, form.username);
            // Use generic message to avoid username enumeration
            set_flash(&cookies, Flash::error("Invalid username or password."));
            Ok(redirect_to("/login"))
        }
    }
}

#[get("/login")]
pub async fn view_login(client: ClientCtx) -> impl Responder {
    if client.is_user() {
        return redirect_to("/dashboard");
    }
    LoginTemplate { client }.to_response()
}

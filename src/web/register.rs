use crate::flash::{redirect_to, set_flash, Flash};
use crate::middleware::csrf::validate_csrf_token;
use crate::middleware::ClientCtx;
use crate::session::{hash_password, sign_in};
use crate::user::{find_user_by_name, insert_new_user};
use actix_web::{error, get, post, web, Error, HttpRequest, HttpResponse, Responder};
use askama_actix::{Template, TemplateToResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use std::collections::BTreeMap;
use validator::Validate;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(post_register).service(view_register);
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub client: ClientCtx,
}

#[derive(Deserialize, Validate)]
pub struct RegisterFormData {
    csrf_token: String,
    #[validate(
        length(min = 1, max = 50, message = "The name must be between 1 and 50 characters."),
        custom(function = "validate_username", message = "The name may only contain letters, numbers, dashes and underscores.")
    )]
    username: String,
    #[validate(length(min = 8, max = 1000, message = "The password must be at least 8 characters."))]
    password: String,
    password_confirm: String,
}

fn validate_username(name: &str) -> Result<(), validator::ValidationError> {
    if name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        Ok(())
    } else {
        Err(validator::ValidationError::new("username_chars"))
    }
}

fn form_errors(form: &RegisterFormData) -> BTreeMap<String, String> {
    let mut errors = BTreeMap::new();
    if let Err(validation) = form.validate() {
        for (field, field_errors) in validation.field_errors() {
            if let Some(message) = field_errors.first().and_then(|e| e.message.as_ref()) {
                errors.insert(field.to_string(), message.to_string());
            }
        }
    }
    if form.password != form.password_confirm {
        errors
            .entry("password_confirm".to_owned())
            .or_insert_with(|| "The password confirmation does not match.".to_owned());
    }
    errors
}

#[post("/register")]
pub async fn post_register(
    req: HttpRequest,
    cookies: actix_session::Session,
    db: web::Data<DatabaseConnection>,
    form: web::Form<RegisterFormData>,
) -> Result<HttpResponse, Error> {
    validate_csrf_token(&cookies, &form.csrf_token)?;

    if let Err(e) =
        crate::rate_limit::check_registration_rate_limit(&crate::ip::client_key(&req))
    {
        set_flash(&cookies, Flash::error(e.to_string()));
        return Ok(redirect_to("/register"));
    }

    let mut errors = form_errors(&form);
    if errors.is_empty() {
        let taken = find_user_by_name(db.get_ref(), &form.username)
            .await
            .map_err(|e| {
                log::error!("post_register: {}", e);
                error::ErrorInternalServerError("DB error")
            })?
            .is_some();
        if taken {
            errors.insert(
                "username".to_owned(),
                "The name has already been taken.".to_owned(),
            );
        }
    }
    if !errors.is_empty() {
        set_flash(&cookies, Flash::invalid(errors));
        return Ok(redirect_to("/register"));
    }

    let password_hash = hash_password(&form.password).map_err(|e| {
        log::error!("post_register: unable to hash password: {}", e);
        error::ErrorInternalServerError("Hashing error")
    })?;

    let user = insert_new_user(db.get_ref(), &form.username, &password_hash)
        .await
        .map_err(|e| {
            log::error!("post_register: {}", e);
            error::ErrorInternalServerError("DB error")
        })?;
    log::info!("registered user {} ({})", user.name, user.id);

    sign_in(&cookies, user.id)?;
    set_flash(&cookies, Flash::success("Your account has been created."));
    Ok(redirect_to("/dashboard"))
}

#[get("/register")]
pub async fn view_register(client: ClientCtx) -> impl Responder {
    if client.is_user() {
        return redirect_to("/dashboard");
    }
    RegisterTemplate { client }.to_response()
}

use crate::flash::{redirect_to, set_flash, Flash};
use crate::middleware::csrf::validate_csrf_token;
use crate::session::sign_out;
use actix_web::{post, web, Error, HttpResponse};
use serde::Deserialize;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(post_logout);
}

#[derive(Deserialize)]
pub struct LogoutFormData {
    pub csrf_token: String,
}

#[post("/logout")]
pub async fn post_logout(
    cookies: actix_session::Session,
    form: web::Form<LogoutFormData>,
) -> Result<HttpResponse, Error> {
    validate_csrf_token(&cookies, &form.csrf_token)?;

    sign_out(&cookies);
    set_flash(&cookies, Flash::success("You have been logged out."));
    Ok(redirect_to("/"))
}

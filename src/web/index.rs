use crate::flash::redirect_to;
use crate::middleware::ClientCtx;
use actix_web::{get, web, HttpResponse};
use askama_actix::{Template, TemplateToResponse};
use serde::Deserialize;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_index);
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub client: ClientCtx,
    pub code: String,
    pub code_error: Option<String>,
}

#[derive(Deserialize)]
pub struct SearchQuery {
    pub code: Option<String>,
}

/// Landing page. A submitted code is sent straight to its poll page.
#[get("/")]
pub async fn view_index(client: ClientCtx, query: web::Query<SearchQuery>) -> HttpResponse {
    let code = query.code.as_deref().map(str::trim);

    let code_error = match code {
        None => None,
        Some("") => Some("The code field is required."),
        Some(code) if code.chars().all(|c| c.is_ascii_alphanumeric()) => {
            return redirect_to(&format!("/polls/{}", code));
        }
        Some(_) => Some("The code may only contain letters and numbers."),
    };

    IndexTemplate {
        client,
        code: code.unwrap_or_default().to_owned(),
        code_error: code_error.map(str::to_owned),
    }
    .to_response()
}

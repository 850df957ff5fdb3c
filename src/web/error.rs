//! Rendered pages for error responses that reach the `ErrorHandlers` middleware.

use crate::middleware::ClientCtx;
use actix_web::body::{BoxBody, EitherBody};
use actix_web::dev::ServiceResponse;
use actix_web::http::header::{self, HeaderValue};
use actix_web::middleware::ErrorHandlerResponse;
use actix_web::{HttpMessage, Result};
use askama_actix::Template;

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub client: ClientCtx,
    pub status: u16,
    pub title: &'static str,
    pub message: &'static str,
}

pub fn render_400<B>(res: ServiceResponse<B>) -> Result<ErrorHandlerResponse<B>> {
    render(
        res,
        "Bad Request",
        "The request could not be understood. Please check the form and try again.",
    )
}

pub fn render_404<B>(res: ServiceResponse<B>) -> Result<ErrorHandlerResponse<B>> {
    render(res, "Not Found", "The page you were looking for does not exist.")
}

pub fn render_500<B>(res: ServiceResponse<B>) -> Result<ErrorHandlerResponse<B>> {
    render(
        res,
        "Internal Server Error",
        "Something went wrong on our end. Please try again later.",
    )
}

fn render<B>(
    res: ServiceResponse<B>,
    title: &'static str,
    message: &'static str,
) -> Result<ErrorHandlerResponse<B>> {
    let status = res.status();
    let (req, res) = res.into_parts();
    let client = ClientCtx::get_or_default_from_extensions(&mut req.extensions_mut());

    let body = match (ErrorTemplate {
        client,
        status: status.as_u16(),
        title,
        message,
    })
    .render()
    {
        Ok(html) => html,
        Err(e) => {
            log::error!("render error page: {}", e);
            format!("{} {}", status.as_u16(), title)
        }
    };

    let mut res = res.set_body(body);
    res.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );

    let res: ServiceResponse<EitherBody<B, BoxBody>> = ServiceResponse::new(req, res)
        .map_into_boxed_body()
        .map_into_right_body();
    Ok(ErrorHandlerResponse::Response(res))
}

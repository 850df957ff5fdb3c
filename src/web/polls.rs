//! Poll creation, voting and results pages

use crate::app_config;
use crate::constants::GENERIC_FAILURE_MESSAGE;
use crate::flash::{back_location, redirect_back, redirect_to, set_flash, Flash};
use crate::middleware::csrf::{validate_csrf_token, CSRF_FIELD_NAME};
use crate::middleware::ClientCtx;
use crate::orm::{poll_options, polls};
use crate::poll::image::{max_bytes, UploadedImage};
use crate::poll::{
    cast_vote, create_poll, find_poll_with_options, set_status, tally, PollError, PollForm,
    PollPhase, PollResults, VoteError,
};
use crate::storage::StorageBackend;
use actix_multipart::{Field, Multipart};
use actix_session::Session;
use actix_web::{error, get, post, web, Error, HttpRequest, HttpResponse, Responder};
use askama_actix::{Template, TemplateToResponse};
use futures::{StreamExt, TryStreamExt};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Text parts of the creation form are small; anything bigger is not a browser.
const MAX_TEXT_FIELD_BYTES: usize = 64 * 1024;

/// Option rows shown on a fresh creation form.
const DEFAULT_OPTION_SLOTS: usize = 2;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    // `/polls/create` must be registered before `/polls/{code}`.
    conf.service(view_create_poll)
        .service(create_poll_post)
        .service(view_results)
        .service(vote_on_poll)
        .service(update_status)
        .service(view_poll);
}

/// Option as shown on the voting and results pages.
pub struct OptionRow {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub votes: i64,
    pub percentage: f64,
    pub is_leader: bool,
    pub is_choice: bool,
}

impl OptionRow {
    fn build(
        option: poll_options::Model,
        results: Option<&PollResults>,
        choice: Option<i32>,
    ) -> Self {
        Self {
            image_url: format!("/images/{}", option.image),
            votes: results.map(|r| r.votes_for(option.id)).unwrap_or(0),
            percentage: results.map(|r| r.percentage(option.id)).unwrap_or(0.0),
            is_leader: results.map(|r| r.is_leader(option.id)).unwrap_or(false),
            is_choice: choice == Some(option.id),
            id: option.id,
            name: option.name,
            description: option.description,
        }
    }

    /// Percentage formatted for display and for the bar width.
    pub fn percentage_label(&self) -> String {
        format!("{:.1}", self.percentage)
    }
}

#[derive(Template)]
#[template(path = "polls/create.html")]
pub struct CreatePollTemplate {
    pub client: ClientCtx,
    pub slots: Vec<usize>,
    pub max_options: usize,
    pub max_image_size_kb: u32,
}

impl CreatePollTemplate {
    /// Validation message for `options.{index}.{field}`, or an empty string.
    pub fn option_error<I: std::fmt::Display>(&self, index: I, field: &str) -> String {
        self.client
            .field_error(&format!("options.{}.{}", index, field))
            .unwrap_or_default()
            .to_owned()
    }

    /// Link that re-renders the form with one more option row.
    pub fn more_options_url(&self) -> Option<String> {
        let slots = self.slots.len();
        if slots < self.max_options {
            Some(format!("/polls/create?options={}", slots + 1))
        } else {
            None
        }
    }
}

#[derive(Template)]
#[template(path = "polls/vote.html")]
pub struct VotePollTemplate {
    pub client: ClientCtx,
    pub poll: polls::Model,
    pub phase: PollPhase,
    pub options: Vec<OptionRow>,
    pub voted_option: Option<i32>,
    pub show_results: bool,
    pub total_votes: i64,
    pub share_url: String,
}

#[derive(Template)]
#[template(path = "polls/results.html")]
pub struct ResultsTemplate {
    pub client: ClientCtx,
    pub poll: polls::Model,
    pub phase: PollPhase,
    pub options: Vec<OptionRow>,
    pub total_votes: i64,
    pub leaders: Vec<String>,
}

#[derive(Deserialize)]
pub struct CreateQuery {
    pub options: Option<usize>,
}

#[derive(Deserialize)]
pub struct VoteFormData {
    pub csrf_token: String,
    pub poll_option_id: Option<String>,
}

#[derive(Deserialize)]
pub struct StatusFormData {
    pub csrf_token: String,
    pub status: String,
}

fn voted_session_key(code: &str) -> String {
    format!("voted.{}", code)
}

/// Option id the viewer picked on this poll, if they voted from this session.
fn remembered_vote(session: &Session, code: &str) -> Option<i32> {
    session
        .get::<i32>(&voted_session_key(code))
        .unwrap_or_else(|e| {
            log::warn!("remembered_vote: unreadable session value: {}", e);
            None
        })
}

/// Redirect for an unknown poll code. Never sends the client back to the page
/// that just failed.
fn poll_not_found(req: &HttpRequest, session: &Session) -> HttpResponse {
    let mut location = back_location(req, "/");
    if location == req.path() {
        location = "/".to_owned();
    }
    set_flash(session, Flash::error("poll not found"));
    redirect_to(&location)
}

fn internal_failure(req: &HttpRequest, session: &Session, fallback: &str) -> HttpResponse {
    redirect_back(req, session, Flash::error(GENERIC_FAILURE_MESSAGE), fallback)
}

#[get("/polls/create")]
pub async fn view_create_poll(
    client: ClientCtx,
    query: web::Query<CreateQuery>,
) -> Result<impl Responder, Error> {
    client.require_login()?;

    let limits = app_config::limits();
    let max_options = limits.max_options as usize;
    let slots = query
        .options
        .unwrap_or(DEFAULT_OPTION_SLOTS)
        .clamp(1, max_options.max(1));

    Ok(CreatePollTemplate {
        client,
        slots: (0..slots).collect(),
        max_options,
        max_image_size_kb: limits.max_image_size_kb,
    }
    .to_response())
}

async fn read_text(field: &mut Field) -> Result<String, Error> {
    let mut buf: Vec<u8> = Vec::with_capacity(128);
    while let Some(chunk) = field.next().await {
        let bytes = chunk.map_err(|e| {
            log::error!("read_text: multipart read error: {}", e);
            error::ErrorBadRequest("Error interpreting user input.")
        })?;
        if buf.len() + bytes.len() > MAX_TEXT_FIELD_BYTES {
            return Err(error::ErrorBadRequest("Form field is too large."));
        }
        buf.extend_from_slice(&bytes);
    }
    String::from_utf8(buf).map_err(|_| error::ErrorBadRequest("Form fields must be UTF-8."))
}

/// Upper bound on multipart parts in one creation request: the token, the three
/// poll fields and three parts per option, with a little slack for extras.
fn max_form_parts(max_options: usize) -> usize {
    4 + 3 * max_options + 8
}

/// Reads a file part, keeping at most `limit` bytes. Oversized uploads are
/// drained and flagged rather than buffered.
async fn read_upload(field: &mut Field, limit: usize) -> Result<UploadedImage, Error> {
    let original_name = field
        .content_disposition()
        .get_filename()
        .map(str::to_owned);
    let mut data: Vec<u8> = Vec::new();
    let mut truncated = false;

    while let Some(chunk) = field.next().await {
        let bytes = chunk.map_err(|e| {
            log::error!("read_upload: multipart read error: {}", e);
            error::ErrorBadRequest("Error interpreting user input.")
        })?;
        if truncated {
            continue;
        }
        if data.len() + bytes.len() > limit {
            truncated = true;
            data = Vec::new();
            continue;
        }
        data.extend_from_slice(&bytes);
    }

    Ok(UploadedImage {
        original_name,
        data,
        truncated,
    })
}

#[post("/polls")]
pub async fn create_poll_post(
    req: HttpRequest,
    client: ClientCtx,
    cookies: Session,
    db: web::Data<DatabaseConnection>,
    storage: web::Data<Arc<dyn StorageBackend>>,
    mut fields: Multipart,
) -> Result<HttpResponse, Error> {
    let user_id = client.require_login()?;
    let limits = app_config::limits();
    let upload_limit = max_bytes(limits.max_image_size_kb);
    let max_options = limits.max_options as usize;
    let max_parts = max_form_parts(max_options);

    let mut csrf_token: Option<String> = None;
    let mut form = PollForm::default();
    let mut parts = 0usize;

    loop {
        let mut field = match fields.try_next().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                log::debug!("create_poll_post: malformed multipart body: {}", e);
                return Err(error::ErrorBadRequest("Error interpreting user input."));
            }
        };

        parts += 1;
        if parts > max_parts {
            log::debug!("create_poll_post: more than {} form parts", max_parts);
            return Err(error::ErrorBadRequest("Too many form fields."));
        }

        let name = match field.content_disposition().get_name() {
            Some(name) => name.to_owned(),
            None => continue,
        };

        if name == CSRF_FIELD_NAME {
            csrf_token = Some(read_text(&mut field).await?);
        } else if PollForm::is_image_field(&name) {
            let upload = read_upload(&mut field, upload_limit).await?;
            form.set_image(&name, upload);
        } else {
            let value = read_text(&mut field).await?;
            if !form.set_text(&name, &value) {
                log::debug!("create_poll_post: ignoring unknown field {:?}", name);
            }
        }

        if form.options.len() > max_options {
            return Err(error::ErrorBadRequest(format!(
                "A poll may not have more than {} options.",
                max_options
            )));
        }
    }

    let token = csrf_token.ok_or_else(|| error::ErrorForbidden("CSRF token missing"))?;
    validate_csrf_token(&cookies, &token)?;

    if let Err(e) = crate::rate_limit::check_poll_creation_rate_limit(user_id) {
        return Ok(redirect_back(
            &req,
            &cookies,
            Flash::error(e.to_string()),
            "/polls/create",
        ));
    }

    let new_poll = match form.into_new_poll(max_options, limits.max_image_size_kb) {
        Ok(new_poll) => new_poll,
        Err(errors) => {
            return Ok(redirect_back(
                &req,
                &cookies,
                Flash::invalid(errors),
                "/polls/create",
            ))
        }
    };

    match create_poll(&db, storage.get_ref().as_ref(), user_id, new_poll).await {
        Ok(poll) => {
            let share_url = client.site_url(&format!("/polls/{}", poll.code));
            Ok(redirect_back(
                &req,
                &cookies,
                Flash::success(format!("Poll created. Share it with {}", share_url)),
                "/dashboard",
            ))
        }
        Err(e) => {
            log::error!("create_poll_post: {}", e);
            Ok(internal_failure(&req, &cookies, "/polls/create"))
        }
    }
}

#[get("/polls/{code}")]
pub async fn view_poll(
    req: HttpRequest,
    client: ClientCtx,
    cookies: Session,
    db: web::Data<DatabaseConnection>,
    path: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let code = path.into_inner();
    let (poll, options) = match find_poll_with_options(db.get_ref(), &code).await {
        Ok(Some(found)) => found,
        Ok(None) => return Ok(poll_not_found(&req, &cookies)),
        Err(e) => {
            log::error!("view_poll: {}", e);
            return Err(error::ErrorInternalServerError("DB error"));
        }
    };

    let phase = PollPhase::now(&poll);
    let voted_option = remembered_vote(&cookies, &poll.code);
    let show_results = voted_option.is_some() || phase == PollPhase::Ended;

    let results = if show_results {
        Some(tally(db.get_ref(), poll.id, &options).await.map_err(|e| {
            log::error!("view_poll: tally: {}", e);
            error::ErrorInternalServerError("DB error")
        })?)
    } else {
        None
    };

    let total_votes = results
        .as_ref()
        .map(|r| r.total_votes)
        .unwrap_or(poll.total_votes as i64);
    let options = options
        .into_iter()
        .map(|option| OptionRow::build(option, results.as_ref(), voted_option))
        .collect();

    Ok(VotePollTemplate {
        share_url: client.site_url(&format!("/polls/{}", poll.code)),
        client,
        poll,
        phase,
        options,
        voted_option,
        show_results,
        total_votes,
    }
    .to_response())
}

#[post("/polls/{code}/vote")]
pub async fn vote_on_poll(
    req: HttpRequest,
    cookies: Session,
    db: web::Data<DatabaseConnection>,
    path: web::Path<String>,
    form: web::Form<VoteFormData>,
) -> Result<HttpResponse, Error> {
    validate_csrf_token(&cookies, &form.csrf_token)?;

    let code = path.into_inner();
    let fallback = format!("/polls/{}", code);

    let option_id = match form.poll_option_id.as_deref().map(str::trim) {
        None | Some("") => {
            return Ok(redirect_back(
                &req,
                &cookies,
                Flash::invalid(field_error(
                    "poll_option_id",
                    "The poll option id field is required.",
                )),
                &fallback,
            ))
        }
        Some(raw) => match raw.parse::<i32>() {
            Ok(id) => id,
            Err(_) => {
                return Ok(redirect_back(
                    &req,
                    &cookies,
                    Flash::invalid(field_error(
                        "poll_option_id",
                        "The poll option id must be an integer.",
                    )),
                    &fallback,
                ))
            }
        },
    };

    let ip = crate::ip::extract_client_ip(&req);
    if let Err(e) = crate::rate_limit::check_vote_rate_limit(&crate::ip::client_key(&req)) {
        return Ok(redirect_back(
            &req,
            &cookies,
            Flash::error(e.to_string()),
            &fallback,
        ));
    }

    match cast_vote(&db, &code, option_id, ip).await {
        Ok(vote) => {
            log::debug!("vote {} recorded on poll {}", vote.id, code);
            if let Err(e) = cookies.insert(voted_session_key(&code), option_id) {
                log::warn!("vote_on_poll: unable to remember vote: {}", e);
            }
            Ok(redirect_back(
                &req,
                &cookies,
                Flash::success("Your vote has been recorded."),
                &fallback,
            ))
        }
        Err(VoteError::PollNotFound) => Ok(poll_not_found(&req, &cookies)),
        Err(e) if e.is_user_facing() => Ok(redirect_back(
            &req,
            &cookies,
            Flash::error(e.to_string()),
            &fallback,
        )),
        Err(e) => {
            log::error!("vote_on_poll: {}", e);
            Ok(internal_failure(&req, &cookies, &fallback))
        }
    }
}

fn field_error(field: &str, message: &str) -> BTreeMap<String, String> {
    let mut errors = BTreeMap::new();
    errors.insert(field.to_owned(), message.to_owned());
    errors
}

#[get("/polls/{code}/results")]
pub async fn view_results(
    req: HttpRequest,
    client: ClientCtx,
    cookies: Session,
    db: web::Data<DatabaseConnection>,
    path: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let code = path.into_inner();
    let (poll, options) = match find_poll_with_options(db.get_ref(), &code).await {
        Ok(Some(found)) => found,
        Ok(None) => return Ok(poll_not_found(&req, &cookies)),
        Err(e) => {
            log::error!("view_results: {}", e);
            return Err(error::ErrorInternalServerError("DB error"));
        }
    };

    let results = tally(db.get_ref(), poll.id, &options).await.map_err(|e| {
        log::error!("view_results: tally: {}", e);
        error::ErrorInternalServerError("DB error")
    })?;

    let voted_option = remembered_vote(&cookies, &poll.code);
    let leader_ids = results.leaders();
    let leaders = options
        .iter()
        .filter(|option| leader_ids.contains(&option.id))
        .map(|option| option.name.clone())
        .collect();
    let options = options
        .into_iter()
        .map(|option| OptionRow::build(option, Some(&results), voted_option))
        .collect();

    Ok(ResultsTemplate {
        client,
        phase: PollPhase::now(&poll),
        poll,
        options,
        total_votes: results.total_votes,
        leaders,
    }
    .to_response())
}

#[post("/polls/{code}/status")]
pub async fn update_status(
    req: HttpRequest,
    client: ClientCtx,
    cookies: Session,
    db: web::Data<DatabaseConnection>,
    path: web::Path<String>,
    form: web::Form<StatusFormData>,
) -> Result<HttpResponse, Error> {
    let user_id = client.require_login()?;
    validate_csrf_token(&cookies, &form.csrf_token)?;

    let code = path.into_inner();
    let status = match polls::Status::parse(&form.status) {
        Some(status) => status,
        None => {
            return Ok(redirect_back(
                &req,
                &cookies,
                Flash::invalid(field_error("status", "The selected status is invalid.")),
                "/dashboard",
            ))
        }
    };

    match set_status(db.get_ref(), &code, user_id, status).await {
        Ok(poll) => {
            log::info!("user {} set poll {} to {}", user_id, poll.code, status.as_str());
            Ok(redirect_back(
                &req,
                &cookies,
                Flash::success(format!("Poll is now {}.", status.as_str())),
                "/dashboard",
            ))
        }
        Err(PollError::NotFound) => Ok(poll_not_found(&req, &cookies)),
        Err(PollError::NotCreator) => Ok(redirect_back(
            &req,
            &cookies,
            Flash::error(PollError::NotCreator.to_string()),
            "/dashboard",
        )),
        Err(e) => {
            log::error!("update_status: {}", e);
            Ok(internal_failure(&req, &cookies, "/dashboard"))
        }
    }
}

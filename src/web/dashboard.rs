use crate::middleware::ClientCtx;
use crate::orm::polls;
use crate::poll::{polls_for_creator, PollPhase, PollSummary};
use actix_web::{error, get, web, Error, Responder};
use askama_actix::{Template, TemplateToResponse};
use sea_orm::DatabaseConnection;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_dashboard);
}

/// One poll on the dashboard, with everything the row shows already worked out.
pub struct DashboardRow {
    pub code: String,
    pub name: String,
    pub phase: PollPhase,
    pub window: String,
    pub total_votes: i32,
    pub option_count: i64,
    pub share_url: String,
    /// Status the toggle button switches to.
    pub toggle_to: polls::Status,
}

impl DashboardRow {
    fn build(client: &ClientCtx, summary: PollSummary) -> Self {
        let poll = summary.poll;
        Self {
            share_url: client.site_url(&format!("/polls/{}", poll.code)),
            window: format!(
                "{} to {}",
                poll.starts_at.format("%Y-%m-%d %H:%M"),
                poll.ends_at.format("%Y-%m-%d %H:%M")
            ),
            toggle_to: match poll.status {
                polls::Status::Active => polls::Status::Closed,
                polls::Status::Closed => polls::Status::Active,
            },
            phase: summary.phase,
            total_votes: poll.total_votes,
            option_count: summary.option_count,
            code: poll.code,
            name: poll.name,
        }
    }

    pub fn toggle_label(&self) -> &'static str {
        match self.toggle_to {
            polls::Status::Active => "Reopen",
            polls::Status::Closed => "Close",
        }
    }
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub client: ClientCtx,
    pub rows: Vec<DashboardRow>,
}

/// Polls created by the signed in user, newest first.
#[get("/dashboard")]
pub async fn view_dashboard(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
) -> Result<impl Responder, Error> {
    let user_id = client.require_login()?;
    let limit = crate::app_config::limits().polls_per_page as u64;

    let polls = polls_for_creator(db.get_ref(), user_id, limit)
        .await
        .map_err(|e| {
            log::error!("view_dashboard: {}", e);
            error::ErrorInternalServerError("DB error")
        })?;

    let rows = polls
        .into_iter()
        .map(|summary| DashboardRow::build(&client, summary))
        .collect();

    Ok(DashboardTemplate { client, rows }.to_response())
}

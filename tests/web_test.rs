#[macro_use]
mod common;

use actix_web::http::{header, StatusCode};
use actix_web::test;
use chrono::Duration;
use common::database::setup_test_database;
use common::fixtures::*;
use common::http::{csrf_token, location, Browser, MultipartBody};
use sea_orm::EntityTrait;
use std::sync::Arc;
use votebox::orm::polls;
use votebox::poll::options_for_poll;
use votebox::storage::StorageBackend;

async fn body_of<B: actix_web::body::MessageBody>(resp: actix_web::dev::ServiceResponse<B>) -> String {
    String::from_utf8(test::read_body(resp).await.to_vec()).unwrap()
}

#[actix_rt::test]
async fn test_unknown_poll_redirects_back_with_flash() {
    let ctx = setup_test_database().await.unwrap();
    let app = test_app!(ctx);
    let mut browser = Browser::new();

    let resp = test::call_service(&app, browser.get("/polls/Nope1234").to_request()).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/");
    browser.store(&resp);

    let resp = test::call_service(&app, browser.get("/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    browser.store(&resp);
    assert!(body_of(resp).await.contains("poll not found"));

    // The flash is shown once.
    let resp = test::call_service(&app, browser.get("/").to_request()).await;
    assert!(!body_of(resp).await.contains("poll not found"));
}

#[actix_rt::test]
async fn test_landing_search_redirects_to_poll() {
    let ctx = setup_test_database().await.unwrap();
    let app = test_app!(ctx);
    let browser = Browser::new();

    let resp = test::call_service(&app, browser.get("/?code=AbCd1234").to_request()).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/polls/AbCd1234");

    let resp = test::call_service(&app, browser.get("/?code=").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_of(resp).await.contains("The code field is required."));
}

#[actix_rt::test]
async fn test_guests_are_sent_to_login() {
    let ctx = setup_test_database().await.unwrap();
    let app = test_app!(ctx);
    let browser = Browser::new();

    for path in ["/polls/create", "/dashboard"] {
        let resp = test::call_service(&app, browser.get(path).to_request()).await;
        assert_eq!(resp.status(), StatusCode::FOUND, "{}", path);
        assert_eq!(location(&resp), "/login");
    }
}

/// Signs `$user` in through the login form, keeping the session in `$browser`.
macro_rules! log_in {
    ($app:expr, $browser:expr, $user:expr) => {{
        let resp = test::call_service(&$app, $browser.get("/login").to_request()).await;
        $browser.store(&resp);
        let token = csrf_token(&body_of(resp).await);

        let resp = test::call_service(
            &$app,
            $browser
                .post("/login")
                .set_form(&[
                    ("csrf_token", token.as_str()),
                    ("username", $user.username.as_str()),
                    ("password", $user.password.as_str()),
                ])
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(location(&resp), "/dashboard");
        $browser.store(&resp);
    }};
}

/// Loads `$path` and returns the CSRF token from the rendered page.
macro_rules! fetch_token {
    ($app:expr, $browser:expr, $path:expr) => {{
        let resp = test::call_service(&$app, $browser.get($path).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK, "GET {}", $path);
        $browser.store(&resp);
        csrf_token(&body_of(resp).await)
    }};
}

#[actix_rt::test]
async fn test_polling_presiden_scenario() {
    let ctx = setup_test_database().await.unwrap();
    let user = create_test_user(&ctx.db, "panitia", "password123").await.unwrap();
    let app = test_app!(ctx);
    let mut browser = Browser::new();

    log_in!(app, browser, user);
    let token = fetch_token!(app, browser, "/polls/create");

    let (content_type, body) = MultipartBody::new()
        .text("csrf_token", &token)
        .text("name", "Polling Presiden")
        .text("starts_at", "2024-01-01T08:00")
        .text("ends_at", "2034-01-01T08:00")
        .text("options[0][name]", "Candidate A")
        .text("options[0][description]", "The first candidate")
        .file("options[0][image]", "a.png", "image/png", PNG_BYTES)
        .text("options[1][name]", "Candidate B")
        .text("options[1][description]", "The second candidate")
        .file("options[1][image]", "b.png", "image/png", PNG_BYTES)
        .finish();

    let resp = test::call_service(
        &app,
        browser
            .post("/polls")
            .insert_header((header::CONTENT_TYPE, content_type))
            .insert_header((header::REFERER, "/polls/create"))
            .set_payload(body)
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/polls/create");
    browser.store(&resp);

    let resp = test::call_service(&app, browser.get("/polls/create").to_request()).await;
    browser.store(&resp);
    assert!(body_of(resp).await.contains("Poll created."));

    let created = polls::Entity::find().all(&ctx.db).await.unwrap();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].name, "Polling Presiden");
    assert_eq!(created[0].created_by, Some(user.id));

    let options = options_for_poll(&ctx.db, created[0].id).await.unwrap();
    assert_eq!(options.len(), 2);
    assert_eq!(options[0].name, "Candidate A");
    assert_eq!(options[1].description, "The second candidate");
    assert_eq!(ctx.stored_file_count(), 2);

    // The dashboard lists the new poll with its share link.
    let resp = test::call_service(&app, browser.get("/dashboard").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_of(resp).await;
    assert!(html.contains("Polling Presiden"));
    assert!(html.contains(&created[0].code));
}

#[actix_rt::test]
async fn test_create_with_bad_image_reports_field_errors() {
    let ctx = setup_test_database().await.unwrap();
    let user = create_test_user(&ctx.db, "panitia", "password123").await.unwrap();
    let app = test_app!(ctx);
    let mut browser = Browser::new();

    log_in!(app, browser, user);
    let token = fetch_token!(app, browser, "/polls/create");

    let (content_type, body) = MultipartBody::new()
        .text("csrf_token", &token)
        .text("name", "Polling Presiden")
        .text("starts_at", "2024-01-01T08:00")
        .text("ends_at", "2034-01-01T08:00")
        .text("options[0][name]", "Candidate A")
        .text("options[0][description]", "The first candidate")
        .file("options[0][image]", "a.png", "image/png", PNG_BYTES)
        .text("options[1][name]", "Candidate B")
        .text("options[1][description]", "The second candidate")
        .file("options[1][image]", "b.png", "image/png", b"plain text, not a picture")
        .finish();

    let resp = test::call_service(
        &app,
        browser
            .post("/polls")
            .insert_header((header::CONTENT_TYPE, content_type))
            .insert_header((header::REFERER, "/polls/create"))
            .set_payload(body)
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    browser.store(&resp);

    let resp = test::call_service(&app, browser.get("/polls/create").to_request()).await;
    let html = body_of(resp).await;
    assert!(html.contains("The image must be a file of type: jpg, png, jpeg, svg."));

    assert_eq!(count_polls(&ctx.db).await, 0);
    assert_eq!(count_options(&ctx.db).await, 0);
    assert_eq!(ctx.stored_file_count(), 0);
}

#[actix_rt::test]
async fn test_create_without_csrf_token_is_forbidden() {
    let ctx = setup_test_database().await.unwrap();
    let user = create_test_user(&ctx.db, "panitia", "password123").await.unwrap();
    let app = test_app!(ctx);
    let mut browser = Browser::new();

    log_in!(app, browser, user);

    let (content_type, body) = MultipartBody::new()
        .text("csrf_token", "wrongtokenwrongtokenwrongtoken12")
        .text("name", "Sneaky")
        .finish();
    let resp = test::call_service(
        &app,
        browser
            .post("/polls")
            .insert_header((header::CONTENT_TYPE, content_type))
            .set_payload(body)
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(count_polls(&ctx.db).await, 0);
}

#[actix_rt::test]
async fn test_anonymous_vote_flow() {
    let ctx = setup_test_database().await.unwrap();
    let user = create_test_user(&ctx.db, "panitia", "password123").await.unwrap();
    let (poll, options) = create_test_poll(
        &ctx.db,
        ctx.local_storage(),
        user.id,
        open_poll("Polling Presiden", &["Candidate A", "Candidate B"]),
    )
    .await;
    let app = test_app!(ctx);
    let mut browser = Browser::new();
    let poll_path = format!("/polls/{}", poll.code);

    let token = fetch_token!(app, browser, &poll_path);
    let option_id = options[1].id.to_string();
    let resp = test::call_service(
        &app,
        browser
            .post(&format!("{}/vote", poll_path))
            .insert_header((header::REFERER, poll_path.as_str()))
            .set_form(&[
                ("csrf_token", token.as_str()),
                ("poll_option_id", option_id.as_str()),
            ])
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), poll_path);
    browser.store(&resp);

    let resp = test::call_service(&app, browser.get(&poll_path).to_request()).await;
    let html = body_of(resp).await;
    assert!(html.contains("Your vote has been recorded."));
    assert!(html.contains("(your vote)"));

    assert_eq!(reload_poll(&ctx.db, poll.id).await.total_votes, 1);
    let votes = votes_for_poll(&ctx.db, poll.id).await;
    assert_eq!(votes.len(), 1);
    assert_eq!(votes[0].poll_option_id, Some(options[1].id));
    assert_eq!(votes[0].ip_address.as_deref(), Some(browser.address.as_str()));

    let resp = test::call_service(
        &app,
        browser.get(&format!("{}/results", poll_path)).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_of(resp).await;
    assert!(html.contains("1 vote(s) in total."));
    assert!(html.contains("100.0%"));
}

#[actix_rt::test]
async fn test_vote_for_option_of_other_poll_is_rejected() {
    let ctx = setup_test_database().await.unwrap();
    let user = create_test_user(&ctx.db, "panitia", "password123").await.unwrap();
    let (poll, _) = create_test_poll(
        &ctx.db,
        ctx.local_storage(),
        user.id,
        open_poll("Polling Presiden", &["Candidate A", "Candidate B"]),
    )
    .await;
    let (_, foreign_options) = create_test_poll(
        &ctx.db,
        ctx.local_storage(),
        user.id,
        open_poll("Polling Gubernur", &["Candidate C"]),
    )
    .await;
    let app = test_app!(ctx);
    let mut browser = Browser::new();
    let poll_path = format!("/polls/{}", poll.code);

    let token = fetch_token!(app, browser, &poll_path);
    let foreign_id = foreign_options[0].id.to_string();
    let resp = test::call_service(
        &app,
        browser
            .post(&format!("{}/vote", poll_path))
            .insert_header((header::REFERER, poll_path.as_str()))
            .set_form(&[
                ("csrf_token", token.as_str()),
                ("poll_option_id", foreign_id.as_str()),
            ])
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    browser.store(&resp);

    let resp = test::call_service(&app, browser.get(&poll_path).to_request()).await;
    let html = body_of(resp).await;
    assert!(html.contains("is not part of this poll"));

    assert_eq!(reload_poll(&ctx.db, poll.id).await.total_votes, 0);
    assert!(votes_for_poll(&ctx.db, poll.id).await.is_empty());
}

#[actix_rt::test]
async fn test_vote_requires_integer_option_and_token() {
    let ctx = setup_test_database().await.unwrap();
    let user = create_test_user(&ctx.db, "panitia", "password123").await.unwrap();
    let (poll, options) = create_test_poll(
        &ctx.db,
        ctx.local_storage(),
        user.id,
        open_poll("Polling Presiden", &["Candidate A"]),
    )
    .await;
    let app = test_app!(ctx);
    let mut browser = Browser::new();
    let poll_path = format!("/polls/{}", poll.code);
    let vote_path = format!("{}/vote", poll_path);

    let token = fetch_token!(app, browser, &poll_path);
    let resp = test::call_service(
        &app,
        browser
            .post(&vote_path)
            .set_form(&[("csrf_token", token.as_str()), ("poll_option_id", "abc")])
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    browser.store(&resp);
    let resp = test::call_service(&app, browser.get(&poll_path).to_request()).await;
    browser.store(&resp);
    assert!(body_of(resp)
        .await
        .contains("The poll option id must be an integer."));

    let option_id = options[0].id.to_string();
    let resp = test::call_service(
        &app,
        browser
            .post(&vote_path)
            .set_form(&[
                ("csrf_token", "not-the-token"),
                ("poll_option_id", option_id.as_str()),
            ])
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    assert_eq!(reload_poll(&ctx.db, poll.id).await.total_votes, 0);
}

#[actix_rt::test]
async fn test_ended_poll_shows_results_and_refuses_votes() {
    let ctx = setup_test_database().await.unwrap();
    let user = create_test_user(&ctx.db, "panitia", "password123").await.unwrap();
    let (poll, options) = create_test_poll(
        &ctx.db,
        ctx.local_storage(),
        user.id,
        poll_between(
            "Last year",
            &["Candidate A"],
            now() - Duration::days(400),
            now() - Duration::days(300),
        ),
    )
    .await;
    let app = test_app!(ctx);
    let mut browser = Browser::new();
    let poll_path = format!("/polls/{}", poll.code);

    let resp = test::call_service(&app, browser.get(&poll_path).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    browser.store(&resp);
    let html = body_of(resp).await;
    assert!(html.contains("Ended"));
    assert!(html.contains("0 vote(s) so far."));
    assert!(!html.contains("Vote for Candidate A"));

    // No vote forms are rendered, so take the session's token from another page.
    let token = fetch_token!(app, browser, "/login");

    let option_id = options[0].id.to_string();
    let resp = test::call_service(
        &app,
        browser
            .post(&format!("{}/vote", poll_path))
            .set_form(&[
                ("csrf_token", token.as_str()),
                ("poll_option_id", option_id.as_str()),
            ])
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    browser.store(&resp);

    let resp = test::call_service(&app, browser.get(&poll_path).to_request()).await;
    assert!(body_of(resp).await.contains("this poll has ended"));
    assert_eq!(reload_poll(&ctx.db, poll.id).await.total_votes, 0);
}

#[actix_rt::test]
async fn test_creator_closes_poll_from_dashboard() {
    let ctx = setup_test_database().await.unwrap();
    let owner = create_test_user(&ctx.db, "owner", "password123").await.unwrap();
    let other = create_test_user(&ctx.db, "other", "password123").await.unwrap();
    let (poll, _) = create_test_poll(
        &ctx.db,
        ctx.local_storage(),
        owner.id,
        open_poll("Polling Presiden", &["Candidate A"]),
    )
    .await;
    let app = test_app!(ctx);
    let status_path = format!("/polls/{}/status", poll.code);

    let mut intruder = Browser::new();
    log_in!(app, intruder, other);
    let token = fetch_token!(app, intruder, "/dashboard");
    let resp = test::call_service(
        &app,
        intruder
            .post(&status_path)
            .set_form(&[("csrf_token", token.as_str()), ("status", "closed")])
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(reload_poll(&ctx.db, poll.id).await.status, polls::Status::Active);

    let mut browser = Browser::new();
    log_in!(app, browser, owner);
    let token = fetch_token!(app, browser, "/dashboard");
    let resp = test::call_service(
        &app,
        browser
            .post(&status_path)
            .insert_header((header::REFERER, "/dashboard"))
            .set_form(&[("csrf_token", token.as_str()), ("status", "closed")])
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/dashboard");
    browser.store(&resp);
    assert_eq!(reload_poll(&ctx.db, poll.id).await.status, polls::Status::Closed);

    let resp = test::call_service(&app, browser.get("/dashboard").to_request()).await;
    let html = body_of(resp).await;
    assert!(html.contains("Poll is now closed."));
    assert!(html.contains("Reopen"));
}

#[actix_rt::test]
async fn test_register_then_logout() {
    let ctx = setup_test_database().await.unwrap();
    let app = test_app!(ctx);
    let mut browser = Browser::new();

    let token = fetch_token!(app, browser, "/register");
    let resp = test::call_service(
        &app,
        browser
            .post("/register")
            .set_form(&[
                ("csrf_token", token.as_str()),
                ("username", "Newcomer"),
                ("password", "longenough"),
                ("password_confirm", "longenough"),
            ])
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/dashboard");
    browser.store(&resp);
    assert_eq!(count_users(&ctx.db).await, 1);

    let token = fetch_token!(app, browser, "/dashboard");
    let resp = test::call_service(
        &app,
        browser
            .post("/logout")
            .set_form(&[("csrf_token", token.as_str())])
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    browser.store(&resp);

    let resp = test::call_service(&app, browser.get("/dashboard").to_request()).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/login");
}

#[actix_rt::test]
async fn test_register_rejects_mismatched_passwords() {
    let ctx = setup_test_database().await.unwrap();
    let app = test_app!(ctx);
    let mut browser = Browser::new();

    let token = fetch_token!(app, browser, "/register");
    let resp = test::call_service(
        &app,
        browser
            .post("/register")
            .set_form(&[
                ("csrf_token", token.as_str()),
                ("username", "newcomer"),
                ("password", "longenough"),
                ("password_confirm", "different"),
            ])
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/register");
    browser.store(&resp);

    let resp = test::call_service(&app, browser.get("/register").to_request()).await;
    assert!(body_of(resp)
        .await
        .contains("The password confirmation does not match."));
    assert_eq!(count_users(&ctx.db).await, 0);
}

#[actix_rt::test]
async fn test_create_with_too_many_options_is_refused_while_reading() {
    let ctx = setup_test_database().await.unwrap();
    let user = create_test_user(&ctx.db, "panitia", "password123").await.unwrap();
    let app = test_app!(ctx);
    let mut browser = Browser::new();

    log_in!(app, browser, user);
    let token = fetch_token!(app, browser, "/polls/create");

    let max_options = votebox::app_config::limits().max_options as usize;
    let mut form = MultipartBody::new()
        .text("csrf_token", &token)
        .text("name", "Too many")
        .text("starts_at", "2024-01-01T08:00")
        .text("ends_at", "2034-01-01T08:00");
    for i in 0..=max_options {
        form = form.text(&format!("options[{}][name]", i), "Candidate");
    }
    let (content_type, body) = form.finish();

    let resp = test::call_service(
        &app,
        browser
            .post("/polls")
            .insert_header((header::CONTENT_TYPE, content_type))
            .set_payload(body)
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(count_polls(&ctx.db).await, 0);
    assert_eq!(count_options(&ctx.db).await, 0);
}

#[actix_rt::test]
async fn test_create_storage_failure_shows_generic_error() {
    let ctx = setup_test_database().await.unwrap();
    let user = create_test_user(&ctx.db, "panitia", "password123").await.unwrap();
    // The first image is written, the second write fails.
    let storage: Arc<dyn StorageBackend> = Arc::new(FailingStorage::new(ctx.storage(), 1));
    let app = test_app!(ctx, storage);
    let mut browser = Browser::new();

    log_in!(app, browser, user);
    let token = fetch_token!(app, browser, "/polls/create");

    let (content_type, body) = MultipartBody::new()
        .text("csrf_token", &token)
        .text("name", "Polling Presiden")
        .text("starts_at", "2024-01-01T08:00")
        .text("ends_at", "2034-01-01T08:00")
        .text("options[0][name]", "Candidate A")
        .text("options[0][description]", "The first candidate")
        .file("options[0][image]", "a.png", "image/png", PNG_BYTES)
        .text("options[1][name]", "Candidate B")
        .text("options[1][description]", "The second candidate")
        .file("options[1][image]", "b.png", "image/png", PNG_BYTES)
        .finish();

    let resp = test::call_service(
        &app,
        browser
            .post("/polls")
            .insert_header((header::CONTENT_TYPE, content_type))
            .insert_header((header::REFERER, "/polls/create"))
            .set_payload(body)
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/polls/create");
    browser.store(&resp);

    let resp = test::call_service(&app, browser.get("/polls/create").to_request()).await;
    let html = body_of(resp).await;
    assert!(html.contains("internal server error"));
    assert!(!html.contains("Poll created."));

    assert_eq!(count_polls(&ctx.db).await, 0);
    assert_eq!(count_options(&ctx.db).await, 0);
    assert_eq!(ctx.stored_file_count(), 0);
}

#[actix_rt::test]
async fn test_uploaded_images_are_served_sandboxed() {
    let ctx = setup_test_database().await.unwrap();
    ctx.local_storage()
        .put_object(
            br#"<svg xmlns="http://www.w3.org/2000/svg"><script>alert(1)</script></svg>"#.to_vec(),
            "Ab12Cd34Ef56.svg",
        )
        .await
        .unwrap();

    let images = ctx.images.clone();
    let app = test::init_service(
        actix_web::App::new()
            .configure(|conf| votebox::web::configure_images(conf, &images)),
    )
    .await;

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/images/Ab12Cd34Ef56.svg")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let header_of = |name: header::HeaderName| {
        resp.headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_owned()
    };
    assert_eq!(header_of(header::CONTENT_TYPE), "image/svg+xml");
    let csp = header_of(header::CONTENT_SECURITY_POLICY);
    assert!(csp.contains("default-src 'none'"));
    assert!(csp.contains("sandbox"));
    assert_eq!(header_of(header::X_CONTENT_TYPE_OPTIONS), "nosniff");
}

#[actix_rt::test]
async fn test_login_limit_is_per_client_address() {
    let ctx = setup_test_database().await.unwrap();
    let user = create_test_user(&ctx.db, "panitia", "password123").await.unwrap();
    let app = test_app!(ctx);
    let max_attempts = votebox::app_config::rate_limit().login_max_attempts as usize;

    let mut guesser = Browser::new();
    let token = fetch_token!(app, guesser, "/login");
    for _ in 0..=max_attempts {
        let resp = test::call_service(
            &app,
            guesser
                .post("/login")
                .set_form(&[
                    ("csrf_token", token.as_str()),
                    ("username", "panitia"),
                    ("password", "wrong-guess"),
                ])
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(location(&resp), "/login");
        guesser.store(&resp);
    }
    let resp = test::call_service(&app, guesser.get("/login").to_request()).await;
    assert!(body_of(resp).await.contains("Too many requests."));

    // Another address is unaffected.
    let mut browser = Browser::new();
    log_in!(app, browser, user);
}

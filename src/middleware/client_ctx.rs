use crate::flash::{take_flash, Flash};
use crate::user::Profile;
use actix_session::{Session, SessionExt};
use actix_web::dev::{self, Extensions, Payload, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::Method;
use actix_web::{error::InternalError, web::Data, Error, FromRequest, HttpMessage, HttpRequest};
use futures::future::{ready, LocalBoxFuture, Ready};
use sea_orm::DatabaseConnection;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Client data stored for a single request cycle.
/// Distinct from ClientCtx because it is defined through request data.
#[derive(Clone, Debug)]
pub struct ClientCtxInner {
    /// User data. Optional. None is a guest user.
    pub client: Option<Profile>,
    /// CSRF token for form protection
    pub csrf_token: String,
    /// Flash message left by the previous request. Only taken on GET.
    pub flash: Option<Flash>,
    /// Time the request started for page load statistics.
    pub request_start: Instant,
}

impl Default for ClientCtxInner {
    fn default() -> Self {
        Self {
            client: None,
            csrf_token: String::new(), // Will be populated from session
            flash: None,
            request_start: Instant::now(),
        }
    }
}

impl ClientCtxInner {
    pub async fn from_session(session: &Session, db: &DatabaseConnection, method: &Method) -> Self {
        use crate::middleware::csrf::get_or_create_csrf_token;
        use crate::session::get_session_user_id;

        let client = match get_session_user_id(session) {
            Some(user_id) => match Profile::get_by_id(db, user_id).await {
                Ok(Some(profile)) => Some(profile),
                Ok(None) => {
                    log::debug!("session refers to missing user {}", user_id);
                    None
                }
                Err(e) => {
                    log::error!("ClientCtxInner::from_session: {}", e);
                    None
                }
            },
            None => None,
        };

        // Get or create CSRF token for this session
        let csrf_token = get_or_create_csrf_token(session).unwrap_or_else(|_| String::new());

        let flash = if *method == Method::GET || *method == Method::HEAD {
            take_flash(session)
        } else {
            None
        };

        ClientCtxInner {
            client,
            csrf_token,
            flash,
            ..Default::default()
        }
    }
}

/// Client context passed to routes.
/// Wraps ClientCtxInner, which is set at the beginning of the request.
#[derive(Clone, Debug)]
pub struct ClientCtx(Data<ClientCtxInner>);

impl Default for ClientCtx {
    fn default() -> Self {
        Self(Data::new(ClientCtxInner::default()))
    }
}

impl ClientCtx {
    pub fn get_or_default_from_extensions(extensions: &mut Extensions) -> Self {
        match extensions.get::<Data<ClientCtxInner>>() {
            // Existing record in extensions; pull it and return clone.
            Some(cbox) => Self(cbox.clone()),
            // No existing record; create and insert it.
            None => {
                let cbox = Data::new(ClientCtxInner::default());
                extensions.insert(cbox.clone());
                Self(cbox)
            }
        }
    }

    /// Returns either the user's id or None.
    pub fn get_id(&self) -> Option<i32> {
        self.0.client.as_ref().map(|u| u.id)
    }

    /// Returns either the user's name or the word for guest.
    pub fn get_name(&self) -> String {
        match &self.0.client {
            Some(user) => user.name.to_owned(),
            None => crate::constants::GUEST_USERNAME.to_owned(),
        }
    }

    pub fn get_csrf_token(&self) -> &str {
        &self.0.csrf_token
    }

    pub fn is_user(&self) -> bool {
        self.0.client.is_some()
    }

    pub fn get_flash(&self) -> Option<&Flash> {
        self.0.flash.as_ref()
    }

    /// Validation message for a form field from the pending flash.
    pub fn field_error(&self, field: &str) -> Option<&str> {
        self.0
            .flash
            .as_ref()
            .and_then(|flash| flash.errors.get(field))
            .map(String::as_str)
    }

    pub fn site_name(&self) -> String {
        crate::app_config::site().name
    }

    /// Absolute URL for a path on this site.
    pub fn site_url(&self, path: &str) -> String {
        format!(
            "{}{}",
            crate::app_config::site().base_url.trim_end_matches('/'),
            path
        )
    }

    /// Returns Duration representing request time.
    pub fn request_time(&self) -> Duration {
        Instant::now() - self.0.request_start
    }

    /// Returns human readable representing request time.
    pub fn request_time_as_string(&self) -> String {
        let us = self.request_time().as_micros();
        if us > 5000 {
            format!("{}ms", us / 1000)
        } else {
            format!("{}μs", us)
        }
    }

    /// Require user to be logged in. Guests are redirected to the login page.
    pub fn require_login(&self) -> Result<i32, Error> {
        self.get_id().ok_or_else(|| {
            InternalError::from_response("Login required", crate::flash::redirect_to("/login"))
                .into()
        })
    }
}

/// This implementation is what actually provides the `client: ClientCtx` in the parameters of route functions.
impl FromRequest for ClientCtx {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(ClientCtx::get_or_default_from_extensions(
            &mut req.extensions_mut(),
        )))
    }
}

impl<S: 'static, B> Transform<S, ServiceRequest> for ClientCtx
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = ClientCtxMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ClientCtxMiddleware {
            service: Rc::new(service),
        }))
    }
}

/// Client context middleware
pub struct ClientCtxMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for ClientCtxMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    dev::forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let svc = self.service.clone();

        Box::pin(async move {
            let session = req.get_session();
            let method = req.method().clone();

            // Without a database there is no user to resolve; handlers see a guest.
            match req.app_data::<Data<DatabaseConnection>>() {
                Some(db) => {
                    let db = db.clone();
                    let inner = ClientCtxInner::from_session(&session, &db, &method).await;
                    req.extensions_mut().insert(Data::new(inner));
                }
                None => log::error!("ClientCtxMiddleware: database connection is not loaded"),
            }

            svc.call(req).await
        })
    }
}

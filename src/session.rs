use crate::{
    device_client::DeviceClient,
    http_client::{HttpStatusError, status_error},
    scheduler::Scheduler,
    ui::{BannerKind, PageHandle},
};
use anyhow::{Context, Result};
use log::{error, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::{
    fs,
    path::{Path, PathBuf},
};

pub const LOGIN_PAGE: &str = "./login_page";
const LOGIN_PAGE_PATH: &str = "/login_page";

pub const TEXT_SERVER_ERROR: &str = "Server error";
pub const TEXT_ERROR: &str = "Error";

/// Client-side session state, the counterpart of the browser's `loggedIn` item.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub logged_in: bool,
}

/// JSON file holding the [`Session`].
#[derive(Clone, Debug)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the session; a missing file is a logged-out session.
    pub fn load(&self) -> Result<Session> {
        if !self.path.exists() {
            return Ok(Session::default());
        }

        let content = fs::read_to_string(&self.path)
            .context(format!("failed to read session file {}", self.path.display()))?;

        serde_json::from_str(&content).context("failed to parse session file")
    }

    pub fn set_logged_in(&self, logged_in: bool) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("failed to create session directory")?;
        }

        let content = serde_json::to_string(&Session { logged_in })
            .context("failed to serialize session")?;

        fs::write(&self.path, content)
            .context(format!("failed to write session file {}", self.path.display()))
    }
}

/// React to a failed ajax-style request the way every page does.
///
/// A 401 marks the session logged-out and leaves for the login page unless the page is
/// already there. Every failure then shows a "Server error" banner with the status code,
/// which is 0 when the request never got a response.
pub fn report_request_error<S: Scheduler>(
    error: &anyhow::Error,
    page: &PageHandle<S>,
    store: &SessionStore,
) {
    error!("request failed: {error:#}");

    let status = status_error(error);
    expire_if_unauthorized(status, page, store);

    let code = status.map_or(0, |status| status.status.as_u16());
    page.show_banner(
        TEXT_SERVER_ERROR,
        &format!("{TEXT_ERROR}: {code}"),
        BannerKind::Error,
    );
}

/// Request JSON from the device: a GET without `body`, otherwise a POST of `body`.
///
/// Failures never show a banner. A 401 expires the session like
/// [`report_request_error`] and the reply is a status object instead:
/// `{"status_code": 404, "message": "Not Found, code: 404"}`, with code 0 when the
/// request never got a response or the reply was not JSON.
pub async fn request_json<C, S>(
    client: &C,
    page: &PageHandle<S>,
    store: &SessionStore,
    path: &str,
    body: Option<Value>,
) -> Value
where
    C: DeviceClient,
    S: Scheduler,
{
    let result = match body {
        None => client.get_json(path).await,
        Some(body) => client.post_json(path, body).await.and_then(|reply| {
            serde_json::from_str(&reply).context(format!("failed to parse response of {path}"))
        }),
    };

    match result {
        Ok(value) => value,
        Err(e) => {
            error!("json request failed: {e:#}");

            let status = status_error(&e);
            expire_if_unauthorized(status, page, store);

            let (code, reason) = status.map_or((0, "error"), |status| {
                (
                    status.status.as_u16(),
                    status.status.canonical_reason().unwrap_or("error"),
                )
            });
            json!({
                "status_code": code,
                "message": format!("{reason}, code: {code}"),
            })
        }
    }
}

fn expire_if_unauthorized<S: Scheduler>(
    status: Option<&HttpStatusError>,
    page: &PageHandle<S>,
    store: &SessionStore,
) {
    if !status.is_some_and(HttpStatusError::is_unauthorized) {
        return;
    }

    if let Err(e) = store.set_logged_in(false) {
        warn!("failed to mark session as logged out: {e:#}");
    }

    if !is_login_page(&page.location()) {
        page.redirect(LOGIN_PAGE);
    }
}

fn is_login_page(location: &str) -> bool {
    let path = location.split(['?', '#']).next().unwrap_or_default();
    path == LOGIN_PAGE_PATH || path == LOGIN_PAGE
}

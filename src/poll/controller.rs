use super::{
    CALLBACK_DELAY, LOADING_POLL_DELAY, NOTIFY_DELAY, NextAction, PollOutcome, PollRequest,
    PollSequence, TEXT_SUCCESS, progress_value,
};
use crate::{
    device_client::DeviceClient,
    scheduler::Scheduler,
    ui::{BannerKind, PageHandle},
};
use log::{debug, info, warn};
use std::fmt;

/// UI surface the poll controller touches.
pub trait PollView: Send + Sync {
    fn show_loading(&self, message: &str, show_progress_bar: bool, show_overlay: bool);
    fn show_progress(&self, percentage: f64);
    fn close_loading_banner(&self);
    fn hide_overlay(&self);
    fn show_banner(&self, title: &str, message: &str, kind: BannerKind);
}

impl<S: Scheduler> PollView for PageHandle<S> {
    fn show_loading(&self, message: &str, show_progress_bar: bool, show_overlay: bool) {
        PageHandle::show_loading(self, message, show_progress_bar, show_overlay);
    }

    fn show_progress(&self, percentage: f64) {
        PageHandle::show_progress(self, percentage);
    }

    fn close_loading_banner(&self) {
        PageHandle::close_loading_banner(self);
    }

    fn hide_overlay(&self) {
        PageHandle::hide_overlay(self);
    }

    fn show_banner(&self, title: &str, message: &str, kind: BannerKind) {
        PageHandle::show_banner(self, title, message, kind);
    }
}

/// Collaborators of a poll sequence.
#[derive(Clone)]
pub struct PollContext<C, S, V> {
    pub client: C,
    pub scheduler: S,
    pub view: V,
}

impl<C, S, V> PollContext<C, S, V>
where
    C: DeviceClient,
    S: Scheduler,
    V: PollView,
{
    pub fn new(client: C, scheduler: S, view: V) -> Self {
        Self {
            client,
            scheduler,
            view,
        }
    }
}

/// What runs once the status reports the finished value.
pub enum Completion {
    Notify { title: String, message: String },
    Callback(Box<dyn FnOnce() + Send>),
}

impl Completion {
    pub fn notify(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Notify {
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn callback(f: impl FnOnce() + Send + 'static) -> Self {
        Self::Callback(Box::new(f))
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Notify { title, message } => f
                .debug_struct("Notify")
                .field("title", title)
                .field("message", message)
                .finish(),
            Self::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

/// Loading banner shown by [`show_loading_banner`], optionally followed by a poll.
#[derive(Clone, Debug)]
pub struct LoadingRequest {
    pub message: String,
    pub poll: Option<PollRequest>,
    pub success_title: String,
    pub success_message: String,
    pub show_progress: bool,
    pub show_overlay: bool,
}

impl LoadingRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            poll: None,
            success_title: TEXT_SUCCESS.to_string(),
            success_message: TEXT_SUCCESS.to_string(),
            show_progress: false,
            show_overlay: false,
        }
    }

    pub fn with_poll(mut self, poll: PollRequest) -> Self {
        self.poll = Some(poll);
        self
    }

    pub fn with_success(mut self, title: impl Into<String>, message: impl Into<String>) -> Self {
        self.success_title = title.into();
        self.success_message = message.into();
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn with_overlay(mut self, show_overlay: bool) -> Self {
        self.show_overlay = show_overlay;
        self
    }
}

/// Poll until the status reports the finished value, then close the loading banner and
/// show a success banner with `title` and `message`.
///
/// Returns only once the finished value was seen; a broken backend keeps this polling.
pub async fn wait_until_finished<C, S, V>(
    ctx: &PollContext<C, S, V>,
    request: PollRequest,
    title: &str,
    message: &str,
) where
    C: DeviceClient,
    S: Scheduler,
    V: PollView,
{
    run(ctx, request, Completion::notify(title, message)).await;
}

/// Poll until the status reports the finished value, then invoke `on_finished` once.
pub async fn wait_until_finished_with<C, S, V>(
    ctx: &PollContext<C, S, V>,
    request: PollRequest,
    on_finished: impl FnOnce() + Send + 'static,
) where
    C: DeviceClient,
    S: Scheduler,
    V: PollView,
{
    run(ctx, request, Completion::callback(on_finished)).await;
}

/// Show the loading banner and, when a poll is attached, start it after a short delay.
pub async fn show_loading_banner<C, S, V>(ctx: &PollContext<C, S, V>, loading: LoadingRequest)
where
    C: DeviceClient,
    S: Scheduler,
    V: PollView,
{
    ctx.view
        .show_loading(&loading.message, loading.show_progress, loading.show_overlay);

    let Some(request) = loading.poll else {
        return;
    };

    ctx.scheduler.sleep(LOADING_POLL_DELAY).await;

    let request = request.with_progress(loading.show_progress);
    wait_until_finished(
        ctx,
        request,
        &loading.success_title,
        &loading.success_message,
    )
    .await;
}

/// Drive one poll sequence to its end.
pub async fn run<C, S, V>(ctx: &PollContext<C, S, V>, request: PollRequest, completion: Completion)
where
    C: DeviceClient,
    S: Scheduler,
    V: PollView,
{
    info!(
        "waiting for {} at {} ({:?})",
        request.status_field, request.status_url, request.success
    );

    let mut sequence = PollSequence::new(request);

    loop {
        let outcome = fetch(ctx, sequence.request()).await;

        if sequence.request().show_progress {
            if let Some(percentage) = progress_value(outcome.field()) {
                ctx.view.show_progress(percentage);
            }
        }

        match sequence.transition(&outcome) {
            NextAction::Schedule(delay) => {
                debug!("{:?}: next status request in {delay:?}", sequence.state());
                ctx.scheduler.sleep(delay).await;
            }
            NextAction::Complete => {
                info!("{} reached its finished value", sequence.request().status_url);
                complete(ctx, completion).await;
                return;
            }
            NextAction::Stop => return,
        }
    }
}

async fn fetch<C, S, V>(ctx: &PollContext<C, S, V>, request: &PollRequest) -> PollOutcome
where
    C: DeviceClient,
    S: Scheduler,
    V: PollView,
{
    match ctx
        .client
        .status(&request.status_url, request.request_timeout)
        .await
    {
        Ok(body) => {
            debug!("status of {}: {body}", request.status_url);
            request.evaluate(body)
        }
        Err(e) => {
            warn!("status request failed, retrying in {:?}: {e:#}", request.backoff);
            PollOutcome::TransportError(format!("{e:#}"))
        }
    }
}

async fn complete<C, S, V>(ctx: &PollContext<C, S, V>, completion: Completion)
where
    C: DeviceClient,
    S: Scheduler,
    V: PollView,
{
    match completion {
        Completion::Notify { title, message } => {
            ctx.view.close_loading_banner();
            ctx.view.hide_overlay();
            ctx.scheduler.sleep(NOTIFY_DELAY).await;
            ctx.view.show_banner(&title, &message, BannerKind::Success);
        }
        Completion::Callback(on_finished) => {
            ctx.scheduler.sleep(CALLBACK_DELAY).await;
            on_finished();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        device_client::MockDeviceClient,
        poll::{DEFAULT_INTERVAL, TRANSPORT_BACKOFF},
        scheduler::testing::ManualScheduler,
        ui::{Page, loading::OverlayState},
    };
    use anyhow::anyhow;
    use serde_json::{Value, json};
    use std::{
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
        time::Duration,
    };

    type TestContext = PollContext<MockDeviceClient, ManualScheduler, PageHandle<ManualScheduler>>;

    fn context(client: MockDeviceClient) -> (TestContext, ManualScheduler) {
        let scheduler = ManualScheduler::default();
        let page = PageHandle::new(Page::new("UPDATE", "/update"), scheduler.clone());
        (
            PollContext::new(client, scheduler.clone(), page),
            scheduler,
        )
    }

    /// Mock answering the given responses in order; `None` is a transport failure.
    fn scripted_client(responses: Vec<Option<Value>>) -> MockDeviceClient {
        let count = responses.len();
        let mut responses = responses.into_iter();
        let mut client = MockDeviceClient::default();
        client
            .expect_status()
            .times(count)
            .returning(move |_, _| {
                let response = responses.next().flatten();
                Box::pin(async move {
                    match response {
                        Some(body) => Ok(body),
                        None => Err(anyhow!("operation timed out")),
                    }
                })
            });
        client
    }

    fn success_banners(ctx: &TestContext) -> Vec<(String, String)> {
        ctx.view
            .snapshot()
            .banners
            .iter()
            .filter(|banner| banner.kind() == BannerKind::Success)
            .map(|banner| (banner.title().to_string(), banner.message().to_string()))
            .collect()
    }

    mod notify {
        use super::*;

        #[tokio::test]
        async fn progress_40_then_100_completes_without_third_request() {
            let client = scripted_client(vec![
                Some(json!({"progress": 40})),
                Some(json!({"progress": 100})),
            ]);
            let (ctx, scheduler) = context(client);
            ctx.view.show_loading("Updating firmware", true, true);

            let request = PollRequest::new("/update_status", "progress", json!(100))
                .with_progress(true);
            wait_until_finished(&ctx, request, "Update", "Firmware updated").await;

            assert_eq!(scheduler.sleeps(), vec![DEFAULT_INTERVAL, NOTIFY_DELAY]);
            assert_eq!(
                success_banners(&ctx),
                vec![("Update".to_string(), "Firmware updated".to_string())]
            );

            let page = ctx.view.snapshot();
            assert!(!page.loading_banner.is_shown());
            assert_eq!(page.overlay.state(), OverlayState::FadingOut);
            assert_eq!(page.loading_banner.progress().text(), "100%");
        }

        #[tokio::test]
        async fn immediate_match_needs_single_request() {
            let client = scripted_client(vec![Some(json!({"status": "done"}))]);
            let (ctx, scheduler) = context(client);

            let request = PollRequest::new("/status", "status", json!("done"));
            wait_until_finished(&ctx, request, "Done", "").await;

            assert_eq!(scheduler.sleeps(), vec![NOTIFY_DELAY]);
            assert_eq!(success_banners(&ctx).len(), 1);
        }

        #[tokio::test]
        async fn transport_errors_back_off_without_growth() {
            let client = scripted_client(vec![
                None,
                None,
                None,
                Some(json!({"progress": 100})),
            ]);
            let (ctx, scheduler) = context(client);

            let request = PollRequest::new("/status", "progress", json!(100));
            wait_until_finished(&ctx, request, "Done", "").await;

            assert_eq!(
                scheduler.sleeps(),
                vec![
                    TRANSPORT_BACKOFF,
                    TRANSPORT_BACKOFF,
                    TRANSPORT_BACKOFF,
                    NOTIFY_DELAY
                ]
            );
        }

        #[tokio::test]
        async fn malformed_body_keeps_polling() {
            let client = scripted_client(vec![
                Some(Value::Null),
                Some(json!({"other": 1})),
                Some(json!({"progress": "100"})),
            ]);
            let (ctx, scheduler) = context(client);

            let request = PollRequest::new("/status", "progress", json!(100))
                .with_interval(Duration::from_millis(300));
            wait_until_finished(&ctx, request, "Done", "").await;

            assert_eq!(
                scheduler.sleeps(),
                vec![
                    Duration::from_millis(300),
                    Duration::from_millis(300),
                    NOTIFY_DELAY
                ]
            );
        }

        #[tokio::test]
        async fn progress_is_not_touched_when_disabled() {
            let client = scripted_client(vec![Some(json!({"progress": 100}))]);
            let (ctx, scheduler) = context(client);

            let request = PollRequest::new("/status", "progress", json!(100));
            wait_until_finished(&ctx, request, "Done", "").await;

            assert_eq!(ctx.view.snapshot().loading_banner.progress().text(), "0%");
            assert!(
                !scheduler
                    .deferred_delays()
                    .contains(&crate::ui::progress::PROGRESS_RESET_DELAY)
            );
        }
    }

    mod callback {
        use super::*;

        #[tokio::test]
        async fn callback_runs_once_after_short_delay() {
            let client = scripted_client(vec![
                Some(json!({"state": 0})),
                Some(json!({"state": 1})),
            ]);
            let (ctx, scheduler) = context(client);
            let calls = Arc::new(AtomicUsize::new(0));
            let counter = calls.clone();

            let request = PollRequest::new("/status", "state", json!(true));
            wait_until_finished_with(&ctx, request, move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .await;

            assert_eq!(calls.load(Ordering::SeqCst), 1);
            assert_eq!(scheduler.sleeps(), vec![DEFAULT_INTERVAL, CALLBACK_DELAY]);
            assert!(success_banners(&ctx).is_empty());
        }
    }

    mod loading_banner {
        use super::*;

        #[tokio::test]
        async fn without_poll_only_shows_banner() {
            let mut client = MockDeviceClient::default();
            client.expect_status().times(0);
            let (ctx, scheduler) = context(client);

            show_loading_banner(&ctx, LoadingRequest::new("Saving").with_overlay(true)).await;

            let page = ctx.view.snapshot();
            assert!(page.loading_banner.is_shown());
            assert_eq!(page.loading_banner.message(), "Saving");
            assert!(!page.loading_banner.progress_visible());
            assert!(page.overlay.is_visible());
            assert!(scheduler.sleeps().is_empty());
        }

        #[tokio::test]
        async fn with_poll_starts_after_delay_and_notifies() {
            let client = scripted_client(vec![Some(json!({"progress": 100}))]);
            let (ctx, scheduler) = context(client);

            let loading = LoadingRequest::new("Updating")
                .with_poll(PollRequest::new("/status", "progress", json!(100)))
                .with_progress(true);
            show_loading_banner(&ctx, loading).await;

            assert_eq!(scheduler.sleeps(), vec![LOADING_POLL_DELAY, NOTIFY_DELAY]);
            assert_eq!(
                success_banners(&ctx),
                vec![(TEXT_SUCCESS.to_string(), TEXT_SUCCESS.to_string())]
            );
            assert!(!ctx.view.snapshot().loading_banner.is_shown());
        }
    }
}

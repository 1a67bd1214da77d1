use super::{
    banner::{BANNER_CLOSE_ANIMATION, BannerId, BannerKind, BannerStack, SHOW_BANNER_TIME},
    loading::{LoadingBanner, OVERLAY_FADE_OUT, Overlay},
    modal::{MODAL_CLOSE_ANIMATION, Modals},
    navigation::NavigationBar,
    popup::Popup,
    progress::PROGRESS_RESET_DELAY,
};
use crate::scheduler::Scheduler;
use log::debug;
use serde::Serialize;
use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

/// Complete UI state of one page.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Page {
    pub name: String,
    pub location: String,
    pub banners: BannerStack,
    pub loading_banner: LoadingBanner,
    pub overlay: Overlay,
    pub popup: Option<Popup>,
    pub modals: Modals,
    pub navigation: NavigationBar,
}

impl Page {
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            ..Default::default()
        }
    }

    pub fn render(&self) -> String {
        let mut html = String::new();
        html.push_str(&format!(
            r#"<div id="navigationBarContainer">{}</div>"#,
            self.navigation.render(&self.name)
        ));
        html.push_str(&self.overlay.render());
        html.push_str(&self.banners.render());
        html.push_str(&self.loading_banner.render());
        if let Some(popup) = &self.popup {
            html.push_str(&popup.render());
        }
        html
    }
}

/// Shared handle to a [`Page`]; every poll sequence and form handler of a page holds a clone.
///
/// Animations and auto-close timers go through the injected scheduler.
#[derive(Clone)]
pub struct PageHandle<S: Scheduler> {
    page: Arc<Mutex<Page>>,
    scheduler: S,
    banner_timeout: Duration,
}

impl<S: Scheduler> PageHandle<S> {
    pub fn new(page: Page, scheduler: S) -> Self {
        Self {
            page: Arc::new(Mutex::new(page)),
            scheduler,
            banner_timeout: SHOW_BANNER_TIME,
        }
    }

    pub fn with_banner_timeout(mut self, timeout: Duration) -> Self {
        self.banner_timeout = timeout;
        self
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Run `f` with exclusive access to the page.
    pub fn with_page<R>(&self, f: impl FnOnce(&mut Page) -> R) -> R {
        let mut page = self.page.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut page)
    }

    pub fn snapshot(&self) -> Page {
        self.with_page(|page| page.clone())
    }

    pub fn render(&self) -> String {
        self.with_page(|page| page.render())
    }

    pub fn show_banner(&self, title: &str, message: &str, kind: BannerKind) -> BannerId {
        self.show_banner_with(title, message, kind, self.banner_timeout, None)
    }

    /// Show a banner that closes itself after `timeout`; a zero timeout keeps it open.
    pub fn show_banner_with(
        &self,
        title: &str,
        message: &str,
        kind: BannerKind,
        timeout: Duration,
        on_click: Option<String>,
    ) -> BannerId {
        let id = self.with_page(|page| page.banners.push(title, message, kind, on_click));
        debug!("banner {id} ({kind:?}): {title}: {message}");

        if !timeout.is_zero() {
            let handle = self.clone();
            self.scheduler
                .defer(timeout, Box::new(move || handle.close_banner(id)));
        }

        id
    }

    pub fn close_banner(&self, id: BannerId) {
        if self.with_page(|page| page.banners.hide(id)) {
            let page = self.page.clone();
            self.scheduler.defer(
                BANNER_CLOSE_ANIMATION,
                Box::new(move || {
                    page.lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .banners
                        .remove(id)
                }),
            );
        }
    }

    pub fn show_page_overlay(&self, loading_cursor: bool) {
        self.with_page(|page| page.overlay.show(loading_cursor));
    }

    pub fn hide_overlay(&self) {
        self.with_page(|page| page.overlay.hide());

        let page = self.page.clone();
        self.scheduler.defer(
            OVERLAY_FADE_OUT,
            Box::new(move || {
                page.lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .overlay
                    .finish_hide()
            }),
        );
    }

    /// Display the loading banner, optionally with progress bar and overlay.
    pub fn show_loading(&self, message: &str, show_progress_bar: bool, show_overlay: bool) {
        if show_overlay {
            self.show_page_overlay(true);
        }
        self.with_page(|page| page.loading_banner.show(message, show_progress_bar));
    }

    pub fn close_loading_banner(&self) {
        self.with_page(|page| page.loading_banner.close());
        self.hide_overlay();
    }

    /// Update the loading banner's progress bar; a full bar falls back to 0% later.
    pub fn show_progress(&self, percentage: f64) {
        let reset = self.with_page(|page| page.loading_banner.progress_mut().show(percentage));

        if reset {
            let page = self.page.clone();
            self.scheduler.defer(
                PROGRESS_RESET_DELAY,
                Box::new(move || {
                    page.lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .loading_banner
                        .progress_mut()
                        .show(0.0);
                }),
            );
        }
    }

    pub fn show_popup(&self, popup: Popup) {
        self.with_page(|page| page.popup = Some(popup));
        self.show_page_overlay(false);
    }

    pub fn close_popup(&self) {
        self.with_page(|page| page.popup = None);
        self.hide_overlay();
    }

    pub fn show_modal(&self, id: &str) {
        self.with_page(|page| page.modals.open(id));
        self.show_page_overlay(false);
    }

    pub fn close_modal(&self, id: &str, hide_page_overlay: bool) {
        self.with_page(|page| page.modals.close(id));

        if hide_page_overlay {
            self.hide_overlay();
        }

        let page = self.page.clone();
        let id = id.to_string();
        self.scheduler.defer(
            MODAL_CLOSE_ANIMATION,
            Box::new(move || {
                page.lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .modals
                    .finish_close(&id)
            }),
        );
    }

    /// Escape key on the page; an open native dialog closes itself.
    pub fn escape_pressed(&self) {
        self.with_page(|page| page.modals.escape_pressed());
    }

    pub fn set_navigation(&self, navigation: NavigationBar) {
        self.with_page(|page| page.navigation = navigation);
    }

    pub fn redirect(&self, url: &str) {
        debug!("redirect to {url}");
        self.with_page(|page| page.location = url.to_string());
    }

    pub fn location(&self) -> String {
        self.with_page(|page| page.location.clone())
    }
}

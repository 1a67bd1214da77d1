use super::html::escape;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default lifetime of a banner before it closes itself.
pub const SHOW_BANNER_TIME: Duration = Duration::from_millis(5000);
/// Length of the close animation; the banner is removed afterwards.
pub const BANNER_CLOSE_ANIMATION: Duration = Duration::from_millis(300);

pub const DEFAULT_BANNER_TITLE: &str = "Notification";

pub type BannerId = u64;

/// Severity of a banner or popup.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BannerKind {
    Info,
    #[default]
    Success,
    Warning,
    Error,
}

impl BannerKind {
    pub fn icon_class(self) -> &'static str {
        match self {
            BannerKind::Info => "fa-solid fa-circle-info",
            BannerKind::Success => "fa-solid fa-check-circle",
            BannerKind::Warning => "fa-solid fa-triangle-exclamation",
            BannerKind::Error => "fa-solid fa-circle-xmark",
        }
    }

    pub fn icon_color(self) -> &'static str {
        match self {
            BannerKind::Info => "var(--icon_blue)",
            BannerKind::Success => "var(--icon_green)",
            BannerKind::Warning => "var(--icon_orange)",
            BannerKind::Error => "var(--icon_red)",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Banner {
    id: BannerId,
    title: String,
    message: String,
    kind: BannerKind,
    on_click: Option<String>,
    visible: bool,
}

impl Banner {
    pub fn id(&self) -> BannerId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> BannerKind {
        self.kind
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn render(&self) -> String {
        let click = match &self.on_click {
            Some(on_click) => format!(r#" style="cursor: pointer" onclick="{}""#, escape(on_click)),
            None => String::new(),
        };
        let show = if self.visible { " show" } else { "" };

        format!(
            concat!(
                r#"<div class="banner-container{}" data-banner-id="{}"{}>"#,
                r#"<i class="banner-icon {}" style="color: {}"></i>"#,
                r#"<div class="banner-content">"#,
                r#"<p class="banner-title">{}</p>"#,
                r#"<p class="banner-message">{}</p>"#,
                r#"</div>"#,
                r#"<i class="fa-solid fa-xmark banner-close-button clickable"></i>"#,
                r#"</div>"#
            ),
            show,
            self.id,
            click,
            self.kind.icon_class(),
            self.kind.icon_color(),
            escape(&self.title),
            escape(&self.message),
        )
    }
}

/// Stack of banners in display order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BannerStack {
    banners: Vec<Banner>,
    next_id: BannerId,
}

impl BannerStack {
    /// Append a visible banner and return its id. An empty title falls back to
    /// [`DEFAULT_BANNER_TITLE`].
    pub fn push(
        &mut self,
        title: &str,
        message: &str,
        kind: BannerKind,
        on_click: Option<String>,
    ) -> BannerId {
        let id = self.next_id;
        self.next_id += 1;

        let title = if title.is_empty() {
            DEFAULT_BANNER_TITLE
        } else {
            title
        };

        self.banners.push(Banner {
            id,
            title: title.to_string(),
            message: message.to_string(),
            kind,
            on_click,
            visible: true,
        });

        id
    }

    /// Start the close animation. Returns `false` if the banner is unknown.
    pub fn hide(&mut self, id: BannerId) -> bool {
        match self.banners.iter_mut().find(|b| b.id == id) {
            Some(banner) => {
                banner.visible = false;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: BannerId) {
        self.banners.retain(|b| b.id != id);
    }

    pub fn get(&self, id: BannerId) -> Option<&Banner> {
        self.banners.iter().find(|b| b.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Banner> {
        self.banners.iter()
    }

    pub fn len(&self) -> usize {
        self.banners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.banners.is_empty()
    }

    pub fn render(&self) -> String {
        let banners: String = self.banners.iter().map(Banner::render).collect();
        format!(r#"<div id="bannerStack">{banners}</div>"#)
    }
}

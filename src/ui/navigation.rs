use super::html::escape;
use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NavAction {
    Link(String),
    Button(String),
}

impl NavAction {
    fn same_type(&self, other: &NavAction) -> bool {
        matches!(
            (self, other),
            (NavAction::Link(_), NavAction::Link(_)) | (NavAction::Button(_), NavAction::Button(_))
        )
    }
}

/// Wire form used by page scripts: either `link` or `onclickFunction` must be set.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNavItem {
    #[serde(default)]
    pages: Vec<String>,
    #[serde(default)]
    text: String,
    link: Option<String>,
    onclick_function: Option<String>,
    icon: Option<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
#[serde(try_from = "RawNavItem")]
pub struct NavItem {
    pub pages: Vec<String>,
    pub text: String,
    pub icon: Option<String>,
    pub action: NavAction,
}

impl TryFrom<RawNavItem> for NavItem {
    type Error = anyhow::Error;

    fn try_from(raw: RawNavItem) -> Result<Self> {
        let action = match (raw.link, raw.onclick_function) {
            (Some(link), _) => NavAction::Link(link),
            (None, Some(onclick)) => NavAction::Button(onclick),
            (None, None) => bail!(
                "failed to build navigation item {:?}: neither link nor onclickFunction set",
                raw.text
            ),
        };

        Ok(NavItem {
            pages: raw.pages,
            text: raw.text,
            icon: raw.icon,
            action,
        })
    }
}

impl NavItem {
    pub fn link(pages: &[&str], text: &str, link: &str, icon: &str) -> Self {
        Self {
            pages: pages.iter().map(|p| p.to_string()).collect(),
            text: text.to_string(),
            icon: Some(icon.to_string()),
            action: NavAction::Link(link.to_string()),
        }
    }

    pub fn button(pages: &[&str], text: &str, onclick: &str, icon: &str) -> Self {
        Self {
            pages: pages.iter().map(|p| p.to_string()).collect(),
            text: text.to_string(),
            icon: Some(icon.to_string()),
            action: NavAction::Button(onclick.to_string()),
        }
    }

    fn render(&self, current_page: &str) -> String {
        let mut inner = String::new();
        if let Some(icon) = &self.icon {
            inner.push_str(&format!(r#"<i class="{}"></i>"#, escape(icon)));
        }
        if !self.text.is_empty() {
            inner.push_str(&format!(
                r#"<p class="navigation-item-title">{}</p>"#,
                escape(&self.text)
            ));
        }

        match &self.action {
            NavAction::Link(href) => {
                let selected = if self.pages.iter().any(|p| p == current_page) {
                    r#" class="selected""#
                } else {
                    ""
                };
                format!(r#"<a href="{}"{selected}>{inner}</a>"#, escape(href))
            }
            NavAction::Button(onclick) => format!(
                r#"<div class="button-item" onclick="{}">{inner}</div>"#,
                escape(onclick)
            ),
        }
    }
}

/// Navigation bar contents for one page.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct NavigationBar {
    items: Vec<NavItem>,
}

impl NavigationBar {
    pub fn new(items: Vec<NavItem>) -> Self {
        Self { items }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let items: Vec<NavItem> = serde_json::from_str(json)?;
        Ok(Self::new(items))
    }

    pub fn items(&self) -> &[NavItem] {
        &self.items
    }

    /// Render the bar; a separator goes between neighbours of different types.
    pub fn render(&self, current_page: &str) -> String {
        let mut html = String::new();
        let mut previous: Option<&NavAction> = None;

        for item in &self.items {
            if previous.is_some_and(|prev| !prev.same_type(&item.action)) {
                html.push_str(r#"<div class="separator"></div>"#);
            }
            html.push_str(&item.render(current_page));
            previous = Some(&item.action);
        }

        html
    }
}

use super::html::escape;
use serde::{Deserialize, Serialize};

/// Pixels the menu is shifted towards the pointer so it opens under the cursor.
const POINTER_OFFSET: i32 = 2;

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    Left,
    #[default]
    Right,
}

impl MouseButton {
    /// DOM event that opens the menu.
    pub fn event(self) -> &'static str {
        match self {
            MouseButton::Left => "click",
            MouseButton::Right => "contextmenu",
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub text: String,
    #[serde(default)]
    pub icon: String,
    pub onclick_function: Option<String>,
    pub submenu: Option<Vec<MenuItem>>,
}

impl MenuItem {
    pub fn action(text: &str, icon: &str, onclick: &str) -> Self {
        Self {
            text: text.to_string(),
            icon: icon.to_string(),
            onclick_function: Some(onclick.to_string()),
            submenu: None,
        }
    }

    pub fn submenu(text: &str, icon: &str, items: Vec<MenuItem>) -> Self {
        Self {
            text: text.to_string(),
            icon: icon.to_string(),
            onclick_function: None,
            submenu: Some(items),
        }
    }

    fn render_into(&self, html: &mut String) {
        let onclick = self
            .onclick_function
            .as_deref()
            .map(|f| format!(r#" onclick="{}""#, escape(f)))
            .unwrap_or_default();

        html.push_str(&format!(
            r#"<div class="mouse-context-menu-item"{onclick}><i class="{}"></i><p style="margin: 0px">{}</p>"#,
            escape(&self.icon),
            escape(&self.text)
        ));

        if let Some(items) = &self.submenu {
            html.push_str(r#"<i class="fa-solid fa-caret-right"></i><div class="submenu">"#);
            for item in items {
                item.render_into(html);
            }
            html.push_str("</div>");
        }

        html.push_str("</div>");
    }
}

/// Custom mouse context menu bound to one target.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ContextMenu {
    items: Vec<MenuItem>,
    trigger: MouseButton,
    visible: bool,
    left: i32,
    top: i32,
}

impl ContextMenu {
    pub fn new(items: Vec<MenuItem>, trigger: MouseButton) -> Self {
        Self {
            items,
            trigger,
            visible: false,
            left: 0,
            top: 0,
        }
    }

    pub fn trigger(&self) -> MouseButton {
        self.trigger
    }

    pub fn show(&mut self, client_x: i32, client_y: i32) {
        self.left = client_x - POINTER_OFFSET;
        self.top = client_y - POINTER_OFFSET;
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn position(&self) -> (i32, i32) {
        (self.left, self.top)
    }

    pub fn render(&self) -> String {
        let show = if self.visible { " show" } else { "" };
        let mut html = format!(
            r#"<div class="mouse-context-menu{show}" style="left: {}px; top: {}px">"#,
            self.left, self.top
        );
        for item in &self.items {
            item.render_into(&mut html);
        }
        html.push_str("</div>");
        html
    }
}

use super::{banner::BannerKind, html::escape};
use serde::{Deserialize, Serialize};

pub const TEXT_CANCEL: &str = "Cancel";

#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopupButton {
    pub text: String,
    pub onclick_function: String,
}

impl PopupButton {
    pub fn new(text: impl Into<String>, onclick_function: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            onclick_function: onclick_function.into(),
        }
    }

    /// Button that only closes the popup.
    pub fn cancel() -> Self {
        Self::new(TEXT_CANCEL, "closePopup();")
    }
}

/// Confirmation popup with a typed icon and a row of buttons.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Popup {
    title: String,
    message: String,
    kind: BannerKind,
    buttons: Vec<PopupButton>,
}

impl Popup {
    pub fn new(
        title: impl Into<String>,
        message: impl Into<String>,
        buttons: Vec<PopupButton>,
        kind: BannerKind,
    ) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            kind,
            buttons,
        }
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

    pub fn buttons(&self) -> &[PopupButton] {
        &self.buttons
    }

    pub fn render(&self) -> String {
        let buttons: String = self
            .buttons
            .iter()
            .map(|button| {
                format!(
                    r#"<button onclick="{}">{}</button>"#,
                    escape(&button.onclick_function),
                    escape(&button.text)
                )
            })
            .collect();

        format!(
            concat!(
                r#"<div id="popup" class="popup show">"#,
                r#"<i id="popupIcon" class="popup-icon {}" style="color: {}"></i>"#,
                r#"<p id="popupTitle">{}</p>"#,
                r#"<p id="popupMessageField">{}</p>"#,
                r#"<div id="popupButtonContainer">{}</div>"#,
                r#"</div>"#
            ),
            self.kind.icon_class(),
            self.kind.icon_color(),
            escape(&self.title),
            escape(&self.message),
            buttons
        )
    }
}

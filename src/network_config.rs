use crate::{
    device_client::{DeviceClient, LedstripDeviceClient},
    scheduler::Scheduler,
    session::{SessionStore, report_request_error},
    ui::{BannerKind, PageHandle, Popup, PopupButton, html},
    validation::{contains_any_symbol, contains_critical_symbol, text_length},
};
use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_valid::Validate;
use std::fmt;

pub const MAX_LENGTH_NAME: usize = 50;
pub const MIN_LENGTH_PASSWORD: usize = 8;
pub const MAX_LENGTH_PASSWORD: usize = 64;

pub const TEXT_REQUIRED: &str = "This field is required";
pub const TEXT_NO_SYMBOLS: &str = "This field can not contain any symbols";
pub const TEXT_LENGTH: &str = "At least 8 characters required";
pub const TEXT_TOO_LONG: &str = "The text in this field is too long";
pub const TEXT_CONFIGURATION_SAVED: &str =
    "Network configuration saved. Controller is rebooting and connecting to the configured network.";
pub const TEXT_APPLY_CONFIG: &str = "Are you sure that you want to apply the configuration?";
pub const TEXT_Q_ARE_YOU_SURE: &str = "Are you sure?";
pub const TEXT_UPDATE: &str = "Update";
pub const TEXT_SUCCESS: &str = "Success";

const CONFIRMED_ONCLICK: &str = "updateNetworkConfiguration(true);";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Ssid,
    Password,
    Hostname,
}

impl Field {
    /// Id of the input element the error is shown on.
    pub fn element_id(self) -> &'static str {
        match self {
            Self::Ssid => "ssidTxt",
            Self::Password => "passwordTxt",
            Self::Hostname => "hostnameTxt",
        }
    }
}

/// First failing rule of the form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: Field,
    pub message: &'static str,
}

impl FieldError {
    fn new(field: Field, message: &'static str) -> Self {
        Self { field, message }
    }

    pub fn render(&self) -> String {
        format!(
            r#"<span id="networkConfigErrorMessageField" data-field="{}" style="display: inline-block;">{}</span>"#,
            self.field.element_id(),
            html::escape(self.message)
        )
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.field, self.message)
    }
}

impl std::error::Error for FieldError {}

/// Content of the network-configuration form, posted form-encoded.
///
/// Lengths are bounded by [`NetworkConfig::check`] in UTF-16 units. The grapheme
/// bounds derived here never exceed those, so they only guard against empty fields.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize, Validate)]
pub struct NetworkConfig {
    #[validate(min_length = 1)]
    #[validate(max_length = 50)]
    pub ssid: String,
    #[validate(min_length = 1)]
    #[validate(max_length = 64)]
    pub password: String,
    #[validate(min_length = 1)]
    #[validate(max_length = 50)]
    pub hostname: String,
}

impl NetworkConfig {
    pub fn new(
        ssid: impl Into<String>,
        password: impl Into<String>,
        hostname: impl Into<String>,
    ) -> Self {
        Self {
            ssid: ssid.into(),
            password: password.into(),
            hostname: hostname.into(),
        }
    }

    /// Check the fields in form order; the first failure wins.
    pub fn check(&self) -> Result<(), FieldError> {
        if self.ssid.is_empty() {
            return Err(FieldError::new(Field::Ssid, TEXT_REQUIRED));
        }
        if contains_critical_symbol(&self.ssid) {
            return Err(FieldError::new(Field::Ssid, TEXT_NO_SYMBOLS));
        }
        if text_length(&self.ssid) > MAX_LENGTH_NAME {
            return Err(FieldError::new(Field::Ssid, TEXT_TOO_LONG));
        }

        if self.password.is_empty() {
            return Err(FieldError::new(Field::Password, TEXT_REQUIRED));
        }
        if text_length(&self.password) < MIN_LENGTH_PASSWORD {
            return Err(FieldError::new(Field::Password, TEXT_LENGTH));
        }
        if text_length(&self.password) > MAX_LENGTH_PASSWORD {
            return Err(FieldError::new(Field::Password, TEXT_TOO_LONG));
        }

        if self.hostname.is_empty() {
            return Err(FieldError::new(Field::Hostname, TEXT_REQUIRED));
        }
        if contains_any_symbol(&self.hostname) {
            return Err(FieldError::new(Field::Hostname, TEXT_NO_SYMBOLS));
        }
        if text_length(&self.hostname) > MAX_LENGTH_NAME {
            return Err(FieldError::new(Field::Hostname, TEXT_TOO_LONG));
        }

        Ok(())
    }

    fn form_data(&self) -> Vec<(String, String)> {
        vec![
            ("ssid".to_string(), self.ssid.clone()),
            ("password".to_string(), self.password.clone()),
            ("hostname".to_string(), self.hostname.clone()),
        ]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing was sent; the error belongs on the named field.
    Invalid(FieldError),
    /// The confirmation popup is open; nothing was sent.
    ConfirmationRequested,
    /// The configuration was posted; `delivered` is false when the request failed.
    Submitted { delivered: bool },
}

/// Submission of the network-configuration form
pub struct NetworkConfigService;

impl NetworkConfigService {
    /// Popup asking to confirm the new configuration.
    pub fn confirmation_popup() -> Popup {
        Popup::new(
            TEXT_Q_ARE_YOU_SURE,
            TEXT_APPLY_CONFIG,
            vec![
                PopupButton::new(TEXT_UPDATE, CONFIRMED_ONCLICK),
                PopupButton::cancel(),
            ],
            BannerKind::Warning,
        )
    }

    /// Validate and, once confirmed, submit the configuration
    ///
    /// Called twice in a normal flow: first unconfirmed, which only opens the
    /// confirmation popup, then confirmed from the popup's update button. The
    /// controller reboots after the post; there is no polling for it to come back.
    ///
    /// # Arguments
    /// * `client` - Device client used for the post
    /// * `page` - Page showing popup and banners
    /// * `session` - Session store updated when the device answers 401
    /// * `config` - Content of the form
    /// * `confirmed` - Whether the user confirmed in the popup
    ///
    /// # Returns
    /// What happened, or an error when the configuration fails the final validation guard
    pub async fn update_network_configuration<C, S>(
        client: &C,
        page: &PageHandle<S>,
        session: &SessionStore,
        config: &NetworkConfig,
        confirmed: bool,
    ) -> Result<SubmitOutcome>
    where
        C: DeviceClient,
        S: Scheduler,
    {
        if let Err(e) = config.check() {
            warn!("network configuration rejected: {e}");
            return Ok(SubmitOutcome::Invalid(e));
        }

        if !confirmed {
            page.show_popup(Self::confirmation_popup());
            return Ok(SubmitOutcome::ConfirmationRequested);
        }

        config
            .validate()
            .context("network configuration validation failed")?;

        page.close_popup();

        info!(
            "configure network: ssid {:?}, hostname {:?}",
            config.ssid, config.hostname
        );

        let delivered = match client
            .post_form(
                LedstripDeviceClient::CONFIGURE_NETWORK_ENDPOINT,
                config.form_data(),
            )
            .await
        {
            Ok(_) => true,
            Err(e) => {
                report_request_error(&e, page, session);
                false
            }
        };

        page.show_banner(TEXT_SUCCESS, TEXT_CONFIGURATION_SAVED, BannerKind::Info);

        Ok(SubmitOutcome::Submitted { delivered })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        device_client::MockDeviceClient, http_client::HttpStatusError,
        scheduler::testing::ManualScheduler, session::LOGIN_PAGE, ui::Page,
    };
    use mockall::predicate::eq;
    use reqwest::StatusCode;
    use tempfile::{TempDir, tempdir};

    fn valid_config() -> NetworkConfig {
        NetworkConfig::new("My Home WiFi", "secret-password", "ledstrip1")
    }

    fn page() -> PageHandle<ManualScheduler> {
        PageHandle::new(
            Page::new("NETWORK", "/network_config"),
            ManualScheduler::default(),
        )
    }

    fn session() -> (TempDir, SessionStore) {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        (dir, store)
    }

    fn no_post_client() -> MockDeviceClient {
        let mut client = MockDeviceClient::default();
        client.expect_post_form().times(0);
        client
    }

    mod check {
        use super::*;

        fn error_of(config: NetworkConfig) -> FieldError {
            config.check().unwrap_err()
        }

        #[test]
        fn valid_config_passes() {
            assert!(valid_config().check().is_ok());
        }

        #[test]
        fn ssid_rules_in_order() {
            let mut config = valid_config();

            config.ssid = String::new();
            assert_eq!(
                error_of(config.clone()),
                FieldError::new(Field::Ssid, TEXT_REQUIRED)
            );

            config.ssid = "my;ssid".to_string();
            assert_eq!(
                error_of(config.clone()),
                FieldError::new(Field::Ssid, TEXT_NO_SYMBOLS)
            );

            config.ssid = format!("{};", "a".repeat(60));
            assert_eq!(error_of(config.clone()).message, TEXT_NO_SYMBOLS);

            config.ssid = "a".repeat(51);
            assert_eq!(error_of(config).message, TEXT_TOO_LONG);
        }

        #[test]
        fn ssid_may_contain_spaces_and_dashes() {
            let mut config = valid_config();
            config.ssid = "Guest-Net 5G_2".to_string();
            assert!(config.check().is_ok());

            config.ssid = "a".repeat(50);
            assert!(config.check().is_ok());
        }

        #[test]
        fn password_rules_in_order() {
            let mut config = valid_config();

            config.password = String::new();
            assert_eq!(
                error_of(config.clone()),
                FieldError::new(Field::Password, TEXT_REQUIRED)
            );

            config.password = "short".to_string();
            assert_eq!(
                error_of(config.clone()),
                FieldError::new(Field::Password, TEXT_LENGTH)
            );

            config.password = "x".repeat(65);
            assert_eq!(
                error_of(config.clone()),
                FieldError::new(Field::Password, TEXT_TOO_LONG)
            );

            config.password = "x".repeat(64);
            assert!(config.check().is_ok());
        }

        #[test]
        fn password_length_counts_utf16_units() {
            let mut config = valid_config();

            config.password = "😀😀😀".to_string();
            assert_eq!(error_of(config.clone()).message, TEXT_LENGTH);

            config.password = "😀😀😀😀".to_string();
            assert!(config.check().is_ok());

            config.password = "😀".repeat(33);
            assert_eq!(error_of(config).message, TEXT_TOO_LONG);
        }

        #[test]
        fn hostname_rules_in_order() {
            let mut config = valid_config();

            config.hostname = String::new();
            assert_eq!(
                error_of(config.clone()),
                FieldError::new(Field::Hostname, TEXT_REQUIRED)
            );

            for hostname in ["led-strip", "led strip", "led_strip", "led.strip"] {
                config.hostname = hostname.to_string();
                assert_eq!(
                    error_of(config.clone()),
                    FieldError::new(Field::Hostname, TEXT_NO_SYMBOLS),
                    "{hostname}"
                );
            }

            config.hostname = "l".repeat(51);
            assert_eq!(error_of(config).message, TEXT_TOO_LONG);
        }

        #[test]
        fn first_failing_field_wins() {
            let config = NetworkConfig::new("", "", "");
            assert_eq!(error_of(config).field, Field::Ssid);

            let config = NetworkConfig::new("home", "", "bad host");
            assert_eq!(error_of(config).field, Field::Password);
        }

        #[test]
        fn error_renders_on_its_field() {
            let html = FieldError::new(Field::Hostname, TEXT_NO_SYMBOLS).render();
            assert!(html.contains(r#"data-field="hostnameTxt""#));
            assert!(html.contains(TEXT_NO_SYMBOLS));
        }
    }

    mod submit {
        use super::*;

        #[tokio::test]
        async fn empty_ssid_is_rejected_without_request() {
            let client = no_post_client();
            let page = page();
            let (_dir, store) = session();
            let config = NetworkConfig::new("", "secret-password", "ledstrip1");

            let outcome = NetworkConfigService::update_network_configuration(
                &client, &page, &store, &config, true,
            )
            .await
            .unwrap();

            assert_eq!(
                outcome,
                SubmitOutcome::Invalid(FieldError::new(Field::Ssid, TEXT_REQUIRED))
            );
            assert!(page.snapshot().popup.is_none());
            assert!(page.snapshot().banners.is_empty());
        }

        #[tokio::test]
        async fn critical_symbol_is_rejected_without_request() {
            let client = no_post_client();
            let page = page();
            let (_dir, store) = session();
            let config = NetworkConfig::new("my;ssid", "secret-password", "ledstrip1");

            let outcome = NetworkConfigService::update_network_configuration(
                &client, &page, &store, &config, false,
            )
            .await
            .unwrap();

            assert_eq!(
                outcome,
                SubmitOutcome::Invalid(FieldError::new(Field::Ssid, TEXT_NO_SYMBOLS))
            );
        }

        #[tokio::test]
        async fn short_password_is_rejected_without_request() {
            let client = no_post_client();
            let page = page();
            let (_dir, store) = session();
            let config = NetworkConfig::new("home", "1234567", "ledstrip1");

            let outcome = NetworkConfigService::update_network_configuration(
                &client, &page, &store, &config, false,
            )
            .await
            .unwrap();

            assert_eq!(
                outcome,
                SubmitOutcome::Invalid(FieldError::new(Field::Password, TEXT_LENGTH))
            );
        }

        #[tokio::test]
        async fn unconfirmed_shows_popup_and_sends_nothing() {
            let client = no_post_client();
            let page = page();
            let (_dir, store) = session();

            let outcome = NetworkConfigService::update_network_configuration(
                &client,
                &page,
                &store,
                &valid_config(),
                false,
            )
            .await
            .unwrap();

            assert_eq!(outcome, SubmitOutcome::ConfirmationRequested);

            let snapshot = page.snapshot();
            let popup = snapshot.popup.unwrap();
            assert_eq!(popup.title(), TEXT_Q_ARE_YOU_SURE);
            assert_eq!(popup.message(), TEXT_APPLY_CONFIG);
            assert_eq!(popup.kind(), BannerKind::Warning);
            assert_eq!(popup.buttons()[0].text, TEXT_UPDATE);
            assert_eq!(popup.buttons()[0].onclick_function, CONFIRMED_ONCLICK);
            assert_eq!(popup.buttons()[1], PopupButton::cancel());
            assert!(snapshot.overlay.is_visible());
        }

        #[tokio::test]
        async fn confirmed_posts_form_and_shows_info_banner() {
            let mut client = MockDeviceClient::default();
            client
                .expect_post_form()
                .with(
                    eq(LedstripDeviceClient::CONFIGURE_NETWORK_ENDPOINT),
                    eq(valid_config().form_data()),
                )
                .times(1)
                .returning(|_, _| Box::pin(async { Ok(String::new()) }));
            let page = page();
            let (_dir, store) = session();

            NetworkConfigService::update_network_configuration(
                &client,
                &page,
                &store,
                &valid_config(),
                false,
            )
            .await
            .unwrap();

            let outcome = NetworkConfigService::update_network_configuration(
                &client,
                &page,
                &store,
                &valid_config(),
                true,
            )
            .await
            .unwrap();

            assert_eq!(outcome, SubmitOutcome::Submitted { delivered: true });

            let snapshot = page.snapshot();
            assert!(snapshot.popup.is_none());
            let banner = snapshot.banners.iter().next().unwrap();
            assert_eq!(banner.title(), TEXT_SUCCESS);
            assert_eq!(banner.message(), TEXT_CONFIGURATION_SAVED);
            assert_eq!(banner.kind(), BannerKind::Info);
        }

        #[tokio::test]
        async fn confirmed_emoji_password_is_posted() {
            let config = NetworkConfig::new("home", "😀😀😀😀", "ledstrip1");
            let mut client = MockDeviceClient::default();
            client
                .expect_post_form()
                .with(
                    eq(LedstripDeviceClient::CONFIGURE_NETWORK_ENDPOINT),
                    eq(config.form_data()),
                )
                .times(1)
                .returning(|_, _| Box::pin(async { Ok(String::new()) }));
            let page = page();
            let (_dir, store) = session();
            page.show_popup(NetworkConfigService::confirmation_popup());

            let outcome = NetworkConfigService::update_network_configuration(
                &client, &page, &store, &config, true,
            )
            .await
            .unwrap();

            assert_eq!(outcome, SubmitOutcome::Submitted { delivered: true });
            let snapshot = page.snapshot();
            assert!(snapshot.popup.is_none());
            assert_eq!(
                snapshot.banners.iter().next().unwrap().message(),
                TEXT_CONFIGURATION_SAVED
            );
        }

        #[tokio::test]
        async fn unauthorized_post_redirects_to_login() {
            let mut client = MockDeviceClient::default();
            client.expect_post_form().times(1).returning(|_, _| {
                Box::pin(async {
                    Err(HttpStatusError {
                        status: StatusCode::UNAUTHORIZED,
                        body: String::new(),
                    })
                    .context("POST http://192.168.4.1/configure_network failed")
                })
            });
            let page = page();
            let (_dir, store) = session();
            store.set_logged_in(true).unwrap();

            let outcome = NetworkConfigService::update_network_configuration(
                &client,
                &page,
                &store,
                &valid_config(),
                true,
            )
            .await
            .unwrap();

            assert_eq!(outcome, SubmitOutcome::Submitted { delivered: false });
            assert_eq!(page.location(), LOGIN_PAGE);
            assert!(!store.load().unwrap().logged_in);

            let kinds: Vec<BannerKind> = page
                .snapshot()
                .banners
                .iter()
                .map(|banner| banner.kind())
                .collect();
            assert_eq!(kinds, vec![BannerKind::Error, BannerKind::Info]);
        }
    }

    #[test]
    fn serde_valid_guards_empty_fields() {
        assert!(valid_config().validate().is_ok());
        assert!(NetworkConfig::new("home", "", "ledstrip1").validate().is_err());
        assert!(NetworkConfig::new("", "secret-password", "ledstrip1").validate().is_err());
        assert!(NetworkConfig::new("home", "😀😀😀😀", "ledstrip1").validate().is_ok());
    }
}

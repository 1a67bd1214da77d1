use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use env_logger::{Builder, Env, Target};
use log::{error, info};
use rgbw_ui::{
    config::AppConfig,
    device_client::LedstripDeviceClient,
    network_config::{NetworkConfig, NetworkConfigService, SubmitOutcome},
    poll::{
        LoadingRequest, PollContext, PollRequest, TEXT_SUCCESS, show_loading_banner,
        wait_until_finished,
    },
    scheduler::TokioScheduler,
    session::{SessionStore, request_json},
    ui::{Page, PageHandle, navigation::NavigationBar},
};
use serde_json::Value;
use std::{fs, io::Write, path::PathBuf, time::Duration};

#[derive(Debug, Parser)]
#[command(
    name = "rgbw-ui",
    version,
    about = "Drive the RGBW LED-strip controller's configuration UI from the terminal"
)]
struct Cli {
    /// Address of the controller; overrides DEVICE_URL
    #[arg(long)]
    device_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Poll a status endpoint until a field reports the finished value
    Wait {
        /// Status endpoint, e.g. /update_status
        #[arg(long)]
        status_url: String,

        /// Field of the status body to inspect
        #[arg(long)]
        field: String,

        /// Finished value as JSON; anything else is taken as a string
        #[arg(long, value_parser = parse_json_value)]
        success_value: Value,

        /// Poll interval in milliseconds; defaults to POLL_INTERVAL_MS
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Show the field as progress percentage
        #[arg(long)]
        progress: bool,

        /// Show a loading banner with this message while waiting
        #[arg(long)]
        loading: Option<String>,

        #[arg(long, default_value = TEXT_SUCCESS)]
        title: String,

        #[arg(long, default_value = TEXT_SUCCESS)]
        message: String,
    },

    /// Validate and apply a Wi-Fi configuration; the controller reboots afterwards
    ConfigureNetwork {
        #[arg(long)]
        ssid: String,

        #[arg(long)]
        password: String,

        #[arg(long)]
        hostname: String,

        /// Confirm the configuration instead of only showing the confirmation
        #[arg(long)]
        yes: bool,
    },

    /// Request JSON from the device; with --body the body is posted as JSON
    Request {
        /// Endpoint, e.g. /device_info
        #[arg(long)]
        path: String,

        #[arg(long, value_parser = parse_json_value)]
        body: Option<Value>,
    },

    /// Render the navigation bar of a page
    Nav {
        /// JSON file with the navigation items
        #[arg(long)]
        items: PathBuf,

        /// Page whose link is marked as selected
        #[arg(long)]
        page: String,
    },
}

fn parse_json_value(text: &str) -> Result<Value, String> {
    Ok(serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string())))
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("application error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    initialize();

    let config = AppConfig::get();
    let page = PageHandle::new(Page::new("CLI", "/"), TokioScheduler)
        .with_banner_timeout(config.ui.banner_timeout);

    match cli.command {
        Command::Wait {
            status_url,
            field,
            success_value,
            interval_ms,
            progress,
            loading,
            title,
            message,
        } => {
            let client = device_client(cli.device_url.as_deref())?;
            let ctx = PollContext::new(client, TokioScheduler, page.clone());

            let mut request = PollRequest::new(status_url, field, success_value)
                .with_timing(&config.poll)
                .with_progress(progress);
            if let Some(interval_ms) = interval_ms {
                request = request.with_interval(Duration::from_millis(interval_ms));
            }

            match loading {
                Some(loading_message) => {
                    let loading = LoadingRequest::new(loading_message)
                        .with_poll(request)
                        .with_success(title, message)
                        .with_progress(progress)
                        .with_overlay(true);
                    show_loading_banner(&ctx, loading).await;
                }
                None => wait_until_finished(&ctx, request, &title, &message).await,
            }

            print_banners(&page);
        }
        Command::ConfigureNetwork {
            ssid,
            password,
            hostname,
            yes,
        } => {
            let client = device_client(cli.device_url.as_deref())?;
            let session = SessionStore::new(&config.paths.session_file);
            let network = NetworkConfig::new(ssid, password, hostname);

            let outcome = NetworkConfigService::update_network_configuration(
                &client, &page, &session, &network, yes,
            )
            .await?;

            match outcome {
                SubmitOutcome::Invalid(e) => bail!("invalid network configuration: {e}"),
                SubmitOutcome::ConfirmationRequested => {
                    if let Some(popup) = page.snapshot().popup {
                        println!("{}: {}", popup.title(), popup.message());
                    }
                    println!("run again with --yes to apply the configuration");
                }
                SubmitOutcome::Submitted { delivered } => {
                    print_banners(&page);
                    if !delivered {
                        bail!("failed to deliver network configuration");
                    }
                }
            }
        }
        Command::Request { path, body } => {
            let client = device_client(cli.device_url.as_deref())?;
            let session = SessionStore::new(&config.paths.session_file);

            let reply = request_json(&client, &page, &session, &path, body).await;
            println!(
                "{}",
                serde_json::to_string_pretty(&reply).context("failed to format reply")?
            );
        }
        Command::Nav { items, page: name } => {
            let json = fs::read_to_string(&items)
                .context(format!("failed to read navigation items {}", items.display()))?;
            let navigation =
                NavigationBar::from_json(&json).context("failed to parse navigation items")?;

            page.with_page(|page| page.name = name);
            page.set_navigation(navigation);
            println!(
                "{}",
                page.with_page(|page| page.navigation.render(&page.name))
            );
        }
    }

    Ok(())
}

fn initialize() {
    log_panics::init();

    let mut builder = if cfg!(debug_assertions) {
        Builder::from_env(Env::default().default_filter_or("debug"))
    } else {
        Builder::from_env(Env::default().default_filter_or("info"))
    };

    builder.format(|f, record| match record.level() {
        log::Level::Error => {
            eprintln!("{}", record.args());
            Ok(())
        }
        _ => {
            writeln!(f, "{}", record.args())
        }
    });

    builder.target(Target::Stdout).init();

    info!("module version: {}", env!("CARGO_PKG_VERSION"));
}

fn device_client(device_url: Option<&str>) -> Result<LedstripDeviceClient> {
    match device_url {
        Some(url) => LedstripDeviceClient::with_base_url(url),
        None => LedstripDeviceClient::new(),
    }
    .context("failed to create device client")
}

fn print_banners(page: &PageHandle<TokioScheduler>) {
    for banner in page.snapshot().banners.iter() {
        println!(
            "[{:?}] {}: {}",
            banner.kind(),
            banner.title(),
            banner.message()
        );
    }
}

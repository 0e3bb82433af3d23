// src/analytics.rs

//! Anonymous install/uninstall analytics
//!
//! Pings are best effort. [`AnalyticsNotifier::notify`] only validates and
//! enqueues; a detached worker thread builds the request and sends it. There
//! is no result channel and no retry, and pings still queued when the
//! process exits are lost.
//!
//! Device identifiers are never sent raw: machine-id and serial number are
//! SHA-256 hashed, the rest is OS name, CPU model and word size.

use crate::config::Config;
use crate::error::{Error, Result};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, USER_AGENT};
use sha2::{Digest, Sha256};
use std::fs;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use strum_macros::{AsRefStr, Display, EnumString};
use tracing::debug;

const MACHINE_ID: &str = "/etc/machine-id";
const SERIAL_NUMBER: &str = "/sys/firmware/devicetree/base/serial-number";
const CPUINFO: &str = "/proc/cpuinfo";
const OS_RELEASE: &str = "/etc/os-release";

/// What happened to the app
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Trigger {
    Install,
    Uninstall,
}

/// Receives status transitions; must never block or fail the caller
pub trait Notifier {
    fn notify(&self, app: &str, trigger: Trigger);
}

/// Discards every notification
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, app: &str, trigger: Trigger) {
        debug!("Analytics disabled, dropping {} ping for {}", trigger, app);
    }
}

/// Delivers one ping
pub trait Transport: Send {
    fn send(&self, url: &str, user_agent: &str) -> Result<()>;
}

/// HTTP GET delivery
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::AnalyticsError(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn send(&self, url: &str, user_agent: &str) -> Result<()> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, user_agent)
            .header(ACCEPT, "image/gif")
            .send()
            .map_err(|e| Error::AnalyticsError(format!("GET {url}: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::AnalyticsError(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }
        Ok(())
    }
}

/// Keep ASCII letters and digits only
pub fn sanitize_app_name(app: &str) -> String {
    app.chars().filter(char::is_ascii_alphanumeric).collect()
}

/// Tracking URL for an app and trigger
pub fn ping_url(endpoint: &str, trigger: Trigger, app: &str) -> String {
    format!(
        "{}/pi-apps-{}-{}/track",
        endpoint.trim_end_matches('/'),
        trigger,
        sanitize_app_name(app)
    )
}

/// SHA-256 hex of a file's content; empty when missing or empty
fn hash_file(path: &std::path::Path) -> String {
    match fs::read(path) {
        Ok(content) if !content.is_empty() => hex::encode(Sha256::digest(&content)),
        _ => String::new(),
    }
}

/// Strip a `Key : value` line down to the value
fn field_value(line: &str) -> String {
    line.split_once(':')
        .map(|(_, value)| value)
        .unwrap_or("")
        .trim()
        .trim_matches(|c| c == '"' || c == '\'' || c == ';')
        .to_string()
}

/// Anonymised device description sent in the User-Agent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceInfo {
    pub model: String,
    pub soc_id: String,
    pub machine_id_hash: String,
    pub serial_hash: String,
    pub os_name: String,
    /// Userland word size, `32` or `64`
    pub arch: String,
}

impl DeviceInfo {
    /// Gather device facts from the files under the configured system root
    pub fn collect(config: &Config) -> Self {
        let (model, soc_id) = fs::read_to_string(config.system_path(CPUINFO))
            .map(|text| parse_cpuinfo(&text))
            .unwrap_or_default();
        let os_name = fs::read_to_string(config.system_path(OS_RELEASE))
            .map(|text| parse_os_name(&text))
            .unwrap_or_default();

        Self {
            model,
            soc_id,
            machine_id_hash: hash_file(&config.system_path(MACHINE_ID)),
            serial_hash: hash_file(&config.system_path(SERIAL_NUMBER)),
            os_name,
            arch: if cfg!(target_pointer_width = "64") { "64" } else { "32" }.to_string(),
        }
    }

    pub fn user_agent(&self) -> String {
        format!(
            "Pi-Apps Raspberry Pi app store; {}; {}; {}; {}; {}; {}",
            self.model,
            self.soc_id,
            self.machine_id_hash,
            self.serial_hash,
            self.os_name,
            self.arch
        )
    }
}

/// `Model` and `Hardware` lines of /proc/cpuinfo
fn parse_cpuinfo(text: &str) -> (String, String) {
    let mut model = String::new();
    let mut soc_id = String::new();
    for line in text.lines() {
        if line.starts_with("Model") {
            model = field_value(line);
        } else if line.starts_with("Hardware") {
            soc_id = field_value(line);
        }
    }
    (model, soc_id)
}

/// `ID VERSION_ID` from os-release, first letter capitalised
fn parse_os_name(text: &str) -> String {
    let mut id = "";
    let mut version = "";
    for line in text.lines() {
        if let Some(value) = line.strip_prefix("ID=") {
            id = value.trim_matches('"');
        } else if let Some(value) = line.strip_prefix("VERSION_ID=") {
            version = value.trim_matches('"');
        }
    }

    let name = format!("{} {}", id, version);
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => name,
    }
}

struct Ping {
    app: String,
    trigger: Trigger,
}

/// Queue-backed notifier with one detached worker thread
pub struct AnalyticsNotifier {
    config: Config,
    queue: Sender<Ping>,
    worker: Option<JoinHandle<()>>,
}

impl AnalyticsNotifier {
    /// Start a notifier delivering through `transport`
    pub fn new(config: &Config, transport: impl Transport + 'static) -> Self {
        let (queue, rx) = mpsc::channel();
        let worker_config = config.clone();

        let worker = thread::Builder::new()
            .name("analytics".to_string())
            .spawn(move || run_worker(worker_config, transport, rx))
            .map_err(|e| debug!("Failed to start analytics worker: {}", e))
            .ok();

        Self {
            config: config.clone(),
            queue,
            worker,
        }
    }

    /// Start a notifier delivering over HTTP
    pub fn from_config(config: &Config) -> Result<Self> {
        let transport = HttpTransport::new(config.analytics.timeout)?;
        Ok(Self::new(config, transport))
    }

    /// Close the queue and wait for queued pings to be attempted
    pub fn drain(self) {
        let Self { queue, worker, .. } = self;
        drop(queue);
        if let Some(worker) = worker {
            let _ = worker.join();
        }
    }
}

impl Notifier for AnalyticsNotifier {
    fn notify(&self, app: &str, trigger: Trigger) {
        if app.is_empty() {
            debug!("Analytics ping without an app name, ignoring");
            return;
        }
        if !self.config.analytics_enabled() {
            debug!("Analytics disabled by settings, not sending {} ping", trigger);
            return;
        }

        let ping = Ping {
            app: app.to_string(),
            trigger,
        };
        if self.queue.send(ping).is_err() {
            debug!("Analytics worker gone, dropping {} ping for {}", trigger, app);
        }
    }
}

fn run_worker(config: Config, transport: impl Transport, rx: Receiver<Ping>) {
    let mut device: Option<DeviceInfo> = None;

    for ping in rx {
        let user_agent = device
            .get_or_insert_with(|| DeviceInfo::collect(&config))
            .user_agent();
        let url = ping_url(&config.analytics.endpoint, ping.trigger, &ping.app);

        match transport.send(&url, &user_agent) {
            Ok(()) => debug!("Sent analytics ping {}", url),
            Err(e) => debug!("Analytics ping for {} failed: {}", ping.app, e),
        }
    }
}

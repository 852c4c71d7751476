// Headless host: feeds activation signals from JSON through a home screen
// whose collaborators only log. Used by the binary and for manual testing.

use async_trait::async_trait;
use serde::Serialize;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use crate::home::{Collaborators, ContentHost, HomeScreen};
use crate::modules::default_browser::DefaultBrowserProbe;
use crate::modules::errors::AccountError;
use crate::modules::mode::{BrowsingMode, ThemeSink};
use crate::modules::preferences::MemoryPreferences;
use crate::modules::router::{Destination, NavAction, NavGraph};
use crate::modules::signal::ActivationSignal;
use crate::modules::sync::{Account, AccountManager, SyncReason};
use crate::modules::telemetry::{Telemetry, TelemetryEvent};
use crate::settings::Settings;
use crate::state::Tab;

#[derive(Default)]
struct LogGraph {
    current: Option<Destination>,
}

impl NavGraph for LogGraph {
    fn current_destination(&self) -> Option<Destination> {
        self.current
    }

    fn navigate(&mut self, action: NavAction) {
        log::info!("[Headless] navigate {:?} (anchor {:?}, session {:?})", action.destination, action.anchor, action.session);
        self.current = Some(action.destination);
    }
}

struct LogTheme;

impl ThemeSink for LogTheme {
    fn set_theme(&mut self, mode: BrowsingMode) {
        log::info!("[Headless] theme {:?}", mode);
    }
}

struct LogContent;

impl ContentHost for LogContent {
    fn inflate(&mut self, mode: BrowsingMode) {
        log::info!("[Headless] content view built in {:?} mode", mode);
    }
}

struct LogTelemetry;

impl Telemetry for LogTelemetry {
    fn record(&mut self, event: TelemetryEvent) {
        log::info!("[Headless] telemetry {:?}", event);
    }
}

/// No account on a headless run.
struct SignedOut;

#[async_trait]
impl AccountManager for SignedOut {
    async fn initialize(&self) -> Result<(), AccountError> {
        Ok(())
    }

    async fn authenticated_account(&self) -> Option<Account> {
        None
    }

    async fn request_sync(&self, _reason: SyncReason, _debounce: bool) -> Result<(), AccountError> {
        Err(AccountError::NotInitialized)
    }

    async fn poll_device_events(&self, _account: &Account) -> Result<(), AccountError> {
        Err(AccountError::NotInitialized)
    }
}

struct NeverDefault;

impl DefaultBrowserProbe for NeverDefault {
    fn is_default_browser(&self) -> bool {
        false
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Report {
    mode: BrowsingMode,
    claimed: Vec<bool>,
    tabs: Vec<Tab>,
    active_tab_id: Option<String>,
}

fn read_signals(path: Option<PathBuf>) -> Result<Vec<ActivationSignal>, String> {
    let content = match path {
        Some(path) => std::fs::read_to_string(&path).map_err(|e| format!("{}: {}", path.display(), e))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| e.to_string())?;
            buf
        }
    };
    serde_json::from_str(&content).map_err(|e| e.to_string())
}

/// Replays the signals in `path` (or stdin) and prints the resulting state.
pub async fn run(path: Option<PathBuf>, data_dir: PathBuf) -> Result<(), String> {
    let settings = Settings::load(&data_dir);
    let signals = read_signals(path)?;
    let report = replay(signals, settings).await;
    let json = serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?;
    println!("{}", json);
    Ok(())
}

async fn replay(signals: Vec<ActivationSignal>, settings: Settings) -> Report {
    log::info!("[Headless] {} signal(s) to replay", signals.len());

    let mut screen = HomeScreen::new(
        settings,
        Collaborators {
            graph: Box::new(LogGraph::default()),
            theme: Box::new(LogTheme),
            content: Box::new(LogContent),
            telemetry: Box::new(LogTelemetry),
            accounts: Arc::new(SignedOut),
            preferences: Arc::new(MemoryPreferences::new()),
            default_browser: Arc::new(NeverDefault),
        },
    );

    let mut claimed = Vec::with_capacity(signals.len());
    for (i, signal) in signals.into_iter().enumerate() {
        let was_claimed = if i == 0 {
            screen.on_create(signal)
        } else {
            screen.on_new_signal(signal)
        };
        claimed.push(was_claimed);

        let tasks = screen.on_foreground();
        if let Err(e) = tasks.sync.await {
            log::warn!("[Headless] sync task ended abnormally: {}", e);
        }
        if let Err(e) = tasks.default_browser.await {
            log::warn!("[Headless] default browser task ended abnormally: {}", e);
        }
    }

    Report {
        mode: screen.mode(),
        claimed,
        tabs: screen.tabs().tabs().to_vec(),
        active_tab_id: screen.tabs().active().map(|t| t.id.clone()),
    }
}

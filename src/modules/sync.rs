// Foreground sync kick-off.
//
// Every foreground transition spawns one task: make sure the account manager
// is initialized, then, if someone is signed in, ask for a debounced sync and
// a device-event poll at the same time. Nothing here is awaited by the UI and
// nothing is cancelled when the screen goes to the background.

use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::OnceCell;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::modules::errors::AccountError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub uid: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncReason {
    Startup,
    User,
}

impl SyncReason {
    pub fn as_str(self) -> &'static str {
        match self {
            SyncReason::Startup => "startup",
            SyncReason::User => "user",
        }
    }
}

#[async_trait]
pub trait AccountManager: Send + Sync {
    async fn initialize(&self) -> Result<(), AccountError>;
    async fn authenticated_account(&self) -> Option<Account>;
    async fn request_sync(&self, reason: SyncReason, debounce: bool) -> Result<(), AccountError>;
    async fn poll_device_events(&self, account: &Account) -> Result<(), AccountError>;
}

pub struct SyncCoordinator {
    accounts: Arc<dyn AccountManager>,
    initialized: OnceCell<()>,
    debounce: Duration,
    last_sync: Mutex<Option<Instant>>,
}

impl SyncCoordinator {
    pub fn new(accounts: Arc<dyn AccountManager>, debounce: Duration) -> Self {
        Self {
            accounts,
            initialized: OnceCell::new(),
            debounce,
            last_sync: Mutex::new(None),
        }
    }

    /// Fire and forget. The handle is only useful to tests; dropping it does
    /// not cancel the work.
    pub fn on_foreground(self: &Arc<Self>) -> JoinHandle<()> {
        let coordinator = Arc::clone(self);
        tokio::spawn(async move { coordinator.run().await })
    }

    async fn run(&self) {
        // Concurrent callers share one in-flight initialization.
        let init = self
            .initialized
            .get_or_try_init(|| async { self.accounts.initialize().await })
            .await;
        if let Err(e) = init {
            log::warn!("[Sync] Account manager failed to initialize: {}", e);
            return;
        }

        let Some(account) = self.accounts.authenticated_account().await else {
            log::debug!("[Sync] No signed-in account");
            return;
        };

        let sync = async {
            let Some(claimed) = self.claim_sync_slot() else {
                log::debug!("[Sync] Sync already requested recently, coalescing");
                return;
            };
            if let Err(e) = self.accounts.request_sync(SyncReason::Startup, true).await {
                log::warn!("[Sync] {} sync failed: {}", SyncReason::Startup.as_str(), e);
                // A failed sync does not count against the window.
                self.release_sync_slot(claimed);
            }
        };
        let poll = async {
            if let Err(e) = self.accounts.poll_device_events(&account).await {
                log::warn!("[Sync] Device event poll failed: {}", e);
            }
        };
        tokio::join!(sync, poll);
    }

    fn last_sync(&self) -> MutexGuard<'_, Option<Instant>> {
        match self.last_sync.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Records now and returns it, unless a sync was requested within the
    /// debounce window.
    fn claim_sync_slot(&self) -> Option<Instant> {
        let now = Instant::now();
        let mut last = self.last_sync();
        match *last {
            Some(at) if now.duration_since(at) < self.debounce => None,
            _ => {
                *last = Some(now);
                Some(now)
            }
        }
    }

    /// Gives the slot back, unless a later request has claimed it since.
    fn release_sync_slot(&self, claimed: Instant) {
        let mut last = self.last_sync();
        if *last == Some(claimed) {
            *last = None;
        }
    }
}

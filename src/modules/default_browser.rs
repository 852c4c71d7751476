// Default-browser check run on every resume.
// The task holds only a weak handle to the screen and gives up quietly if
// the screen was torn down before it got to run.

use std::sync::{Arc, Weak};
use tokio::task::JoinHandle;

use crate::modules::preferences::PreferenceStore;

pub const PREF_WAS_DEFAULT_BROWSER: &str = "pref_key_was_default_browser_on_last_resume";

/// Liveness token owned by a screen. Background work holds a `Weak` to it.
#[derive(Debug, Default)]
pub struct ScreenLifetime;

pub trait DefaultBrowserProbe: Send + Sync {
    fn is_default_browser(&self) -> bool;
}

/// Returns `None` if the screen went away, otherwise whether we just became default.
pub fn check_default_browser(
    screen: &Weak<ScreenLifetime>,
    prefs: &dyn PreferenceStore,
    probe: &dyn DefaultBrowserProbe,
) -> Option<bool> {
    let _screen = screen.upgrade()?;

    let was_default = prefs.get_bool(PREF_WAS_DEFAULT_BROWSER).unwrap_or(false);
    let is_default = probe.is_default_browser();
    prefs.set_bool(PREF_WAS_DEFAULT_BROWSER, is_default);

    let became_default = is_default && !was_default;
    if became_default {
        log::info!("[DefaultBrowser] Now the default browser");
    }
    Some(became_default)
}

pub fn spawn_default_browser_check(
    screen: Weak<ScreenLifetime>,
    prefs: Arc<dyn PreferenceStore>,
    probe: Arc<dyn DefaultBrowserProbe>,
) -> JoinHandle<Option<bool>> {
    tokio::spawn(async move {
        let result = check_default_browser(&screen, prefs.as_ref(), probe.as_ref());
        if result.is_none() {
            log::debug!("[DefaultBrowser] Screen gone, skipping check");
        }
        result
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::modules::preferences::MemoryPreferences;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Default)]
    pub(crate) struct FixedProbe(pub AtomicBool);

    impl DefaultBrowserProbe for FixedProbe {
        fn is_default_browser(&self) -> bool {
            self.0.load(Ordering::SeqCst)
        }
    }

    #[test]
    fn reports_transition_to_default_once() {
        let screen = Arc::new(ScreenLifetime);
        let prefs = MemoryPreferences::new();
        let probe = FixedProbe(AtomicBool::new(true));

        assert_eq!(check_default_browser(&Arc::downgrade(&screen), &prefs, &probe), Some(true));
        assert_eq!(prefs.get_bool(PREF_WAS_DEFAULT_BROWSER), Some(true));
        assert_eq!(check_default_browser(&Arc::downgrade(&screen), &prefs, &probe), Some(false));
    }

    #[test]
    fn losing_default_is_recorded() {
        let screen = Arc::new(ScreenLifetime);
        let prefs = MemoryPreferences::new();
        prefs.set_bool(PREF_WAS_DEFAULT_BROWSER, true);
        let probe = FixedProbe(AtomicBool::new(false));

        assert_eq!(check_default_browser(&Arc::downgrade(&screen), &prefs, &probe), Some(false));
        assert_eq!(prefs.get_bool(PREF_WAS_DEFAULT_BROWSER), Some(false));
    }

    #[tokio::test]
    async fn torn_down_screen_is_skipped_silently() {
        let screen = Arc::new(ScreenLifetime);
        let weak = Arc::downgrade(&screen);
        drop(screen);

        let prefs = Arc::new(MemoryPreferences::new());
        let probe = Arc::new(FixedProbe(AtomicBool::new(true)));
        let handle = spawn_default_browser_check(weak, prefs.clone(), probe);

        assert_eq!(handle.await.unwrap(), None);
        assert_eq!(prefs.get_bool(PREF_WAS_DEFAULT_BROWSER), None);
    }
}

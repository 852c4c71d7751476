// The home screen - owns the session context for one application run.
//
// Everything synchronous (mode, pipeline, routing, load decisions) happens
// here through `&mut self`. Background work is handed to tokio and holds only
// a weak handle back to the screen.

use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::modules::default_browser::{spawn_default_browser_check, DefaultBrowserProbe, ScreenLifetime};
use crate::modules::intent::{IntentEffect, IntentPipeline, Navigator};
use crate::modules::load::{LoadDispatcher, LoadOutcome, LoadRequest};
use crate::modules::mode::{self, BrowsingMode, ModeController, ThemeSink};
use crate::modules::preferences::PreferenceStore;
use crate::modules::router::{Destination, NavGraph, NavigationRouter, Origin, SessionRef};
use crate::modules::signal::ActivationSignal;
use crate::modules::sync::{AccountManager, SyncCoordinator};
use crate::modules::telemetry::{OpenedFrom, Telemetry, TelemetryEvent};
use crate::settings::Settings;
use crate::state::TabStore;

/// Builds the main content view. Styling depends on the mode at inflation time.
pub trait ContentHost {
    fn inflate(&mut self, mode: BrowsingMode);
}

pub struct Collaborators {
    pub graph: Box<dyn NavGraph>,
    pub theme: Box<dyn ThemeSink>,
    pub content: Box<dyn ContentHost>,
    pub telemetry: Box<dyn Telemetry>,
    pub accounts: Arc<dyn AccountManager>,
    pub preferences: Arc<dyn PreferenceStore>,
    pub default_browser: Arc<dyn DefaultBrowserProbe>,
}

/// Handles of the work started by a foreground transition.
pub struct ForegroundTasks {
    pub sync: JoinHandle<()>,
    pub default_browser: JoinHandle<Option<bool>>,
}

/// The part of the screen that applies navigation effects.
pub struct BrowserShell {
    mode: ModeController,
    router: NavigationRouter,
    loader: LoadDispatcher,
    tabs: TabStore,
    graph: Box<dyn NavGraph>,
}

impl BrowserShell {
    pub fn open_to_browser(&mut self, origin: Origin, session: Option<SessionRef>) -> bool {
        if let Some(session) = &session {
            match self.tabs.select(session) {
                Ok(()) => {
                    self.session_displayed(session);
                }
                Err(e) => log::warn!("[Home] Cannot select {}: {}", session.as_str(), e),
            }
        }
        self.router.navigate_to_browser(self.graph.as_mut(), origin, session)
    }

    pub fn open_to_browser_and_load(&mut self, request: &LoadRequest, origin: Origin) -> LoadOutcome {
        self.router.navigate_to_browser(self.graph.as_mut(), origin, None);
        self.loader.dispatch(request, &mut self.tabs)
    }

    fn session_displayed(&mut self, session: &SessionRef) -> BrowsingMode {
        if let Some(is_private) = self.tabs.session_is_private(session) {
            let reconciled = mode::reconcile_with_session(self.mode.mode(), is_private);
            self.mode.apply(reconciled);
        }
        self.mode.mode()
    }
}

impl Navigator for BrowserShell {
    fn apply(&mut self, effect: IntentEffect) {
        match effect {
            IntentEffect::OpenBrowser { origin, session } => {
                self.open_to_browser(origin, session);
            }
            IntentEffect::LoadAndBrowse {
                text,
                new_tab,
                force_search,
                origin,
            } => {
                let mut request = LoadRequest::new(text, new_tab, self.mode.mode());
                request.force_search = force_search;
                self.open_to_browser_and_load(&request, origin);
            }
            IntentEffect::Navigate(destination) => {
                self.router.navigate(self.graph.as_mut(), destination);
            }
            IntentEffect::SearchDialog { source } => {
                log::debug!("[Home] Search dialog opened from {:?}", source);
                self.router.navigate(self.graph.as_mut(), Destination::SearchDialog);
            }
            IntentEffect::EnterMode { mode, then } => {
                self.mode.apply(mode);
                self.router.navigate(self.graph.as_mut(), then);
            }
        }
    }
}

pub struct HomeScreen {
    settings: Settings,
    pipeline: IntentPipeline,
    shell: BrowserShell,
    content: Box<dyn ContentHost>,
    content_ready: bool,
    telemetry: Box<dyn Telemetry>,
    sync: Arc<SyncCoordinator>,
    preferences: Arc<dyn PreferenceStore>,
    default_browser: Arc<dyn DefaultBrowserProbe>,
    lifetime: Option<Arc<ScreenLifetime>>,
    /// The activation signal as left after handlers stripped what they consumed.
    signal: ActivationSignal,
}

impl HomeScreen {
    pub fn new(settings: Settings, collaborators: Collaborators) -> Self {
        let sync = Arc::new(SyncCoordinator::new(
            collaborators.accounts,
            settings.sync_debounce(),
        ));
        let shell = BrowserShell {
            mode: ModeController::new(collaborators.theme),
            router: NavigationRouter::new(),
            loader: LoadDispatcher::new(settings.https_only),
            tabs: TabStore::new(settings.search_engine),
            graph: collaborators.graph,
        };
        Self {
            settings,
            pipeline: IntentPipeline::standard(),
            shell,
            content: collaborators.content,
            content_ready: false,
            telemetry: collaborators.telemetry,
            sync,
            preferences: collaborators.preferences,
            default_browser: collaborators.default_browser,
            lifetime: Some(Arc::new(ScreenLifetime)),
            signal: ActivationSignal::default(),
        }
    }

    /// Cold start. Returns whether a handler claimed the signal.
    pub fn on_create(&mut self, mut signal: ActivationSignal) -> bool {
        // Theme must be settled before the view is built.
        let initial = mode::resolve_initial_mode(&mut signal);
        self.shell.mode.apply_initial(initial);
        self.content.inflate(initial);
        self.content_ready = true;

        if self.settings.telemetry_enabled {
            self.telemetry.record(TelemetryEvent::AppOpened {
                source: OpenedFrom::from_signal(&signal),
                origin_app: signal.origin_app.clone(),
                at: chrono::Utc::now(),
            });
        }

        self.process(signal)
    }

    /// Re-activation while already running.
    pub fn on_new_signal(&mut self, signal: ActivationSignal) -> bool {
        let claimed = self.process(signal);
        let current = self.shell.mode.mode();
        let resolved = mode::resolve_mode(&mut self.signal, current);
        self.shell.mode.apply(resolved);
        claimed
    }

    fn process(&mut self, signal: ActivationSignal) -> bool {
        let mut out = signal.clone();
        let claimed = self.pipeline.dispatch(&signal, &mut self.shell, &mut out);
        self.signal = out;
        claimed
    }

    /// Kicks off account sync and the default-browser check. Never blocks.
    /// Must be called from within a tokio runtime.
    pub fn on_foreground(&self) -> ForegroundTasks {
        let screen = self
            .lifetime
            .as_ref()
            .map(Arc::downgrade)
            .unwrap_or_default();
        ForegroundTasks {
            sync: self.sync.on_foreground(),
            default_browser: spawn_default_browser_check(
                screen,
                Arc::clone(&self.preferences),
                Arc::clone(&self.default_browser),
            ),
        }
    }

    /// A session became visible; its privacy flag wins over the current mode.
    pub fn on_session_displayed(&mut self, session: &SessionRef) -> BrowsingMode {
        self.shell.session_displayed(session)
    }

    pub fn open_to_browser_and_load(&mut self, request: &LoadRequest, origin: Origin) -> LoadOutcome {
        self.shell.open_to_browser_and_load(request, origin)
    }

    pub fn on_destroy(&mut self) {
        self.lifetime = None;
        self.content_ready = false;
    }

    pub fn mode(&self) -> BrowsingMode {
        self.shell.mode.mode()
    }

    pub fn is_content_ready(&self) -> bool {
        self.content_ready
    }

    pub fn tabs(&self) -> &TabStore {
        &self.shell.tabs
    }

    pub fn router(&self) -> &NavigationRouter {
        &self.shell.router
    }

    pub fn signal(&self) -> &ActivationSignal {
        &self.signal
    }
}

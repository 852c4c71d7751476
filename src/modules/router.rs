// Navigation routing - maps a logical origin to a concrete navigation action.
// The graph itself is a collaborator; this module only decides what to ask of it.

use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Opaque id of a browsing session (tab).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionRef(pub String);

impl SessionRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Screens of the navigation graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Destination {
    Home,
    Browser,
    SearchDialog,
    Settings,
    SearchEngineSettings,
    LoginsSettings,
    Bookmarks,
    History,
    Downloads,
    SyncedTabs,
    Collections,
    ExceptionList,
    About,
    TrackingProtection,
    DefaultBrowserSettings,
    CrashReporter,
}

impl Destination {
    /// Stable non-zero id of the destination's fragment.
    pub fn fragment_id(self) -> u32 {
        match self {
            Self::Home => 1,
            Self::Browser => 2,
            Self::SearchDialog => 3,
            Self::Settings => 4,
            Self::SearchEngineSettings => 5,
            Self::LoginsSettings => 6,
            Self::Bookmarks => 7,
            Self::History => 8,
            Self::Downloads => 9,
            Self::SyncedTabs => 10,
            Self::Collections => 11,
            Self::ExceptionList => 12,
            Self::About => 13,
            Self::TrackingProtection => 14,
            Self::DefaultBrowserSettings => 15,
            Self::CrashReporter => 16,
        }
    }
}

// Declares `Origin` and `Origin::ALL` from one list, so a new origin can
// never be missing from the table the routing tests walk.
macro_rules! origins {
    ($($variant:ident),+ $(,)?) => {
        /// Which screen asked for the browser.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum Origin {
            $($variant),+
        }

        impl Origin {
            pub const ALL: &'static [Origin] = &[$(Origin::$variant),+];
        }
    };
}

origins! {
    Global,
    Home,
    Search,
    Settings,
    SearchEngineSettings,
    LoginsSettings,
    Bookmarks,
    History,
    Downloads,
    SyncedTabs,
    Collections,
    ExceptionList,
    About,
    TrackingProtection,
    DefaultBrowserSettings,
}

impl Origin {
    /// Screen the request comes from. `None` for global requests.
    fn source(self) -> Option<Destination> {
        match self {
            Origin::Global => None,
            Origin::Home => Some(Destination::Home),
            Origin::Search => Some(Destination::SearchDialog),
            Origin::Settings => Some(Destination::Settings),
            Origin::SearchEngineSettings => Some(Destination::SearchEngineSettings),
            Origin::LoginsSettings => Some(Destination::LoginsSettings),
            Origin::Bookmarks => Some(Destination::Bookmarks),
            Origin::History => Some(Destination::History),
            Origin::Downloads => Some(Destination::Downloads),
            Origin::SyncedTabs => Some(Destination::SyncedTabs),
            Origin::Collections => Some(Destination::Collections),
            Origin::ExceptionList => Some(Destination::ExceptionList),
            Origin::About => Some(Destination::About),
            Origin::TrackingProtection => Some(Destination::TrackingProtection),
            Origin::DefaultBrowserSettings => Some(Destination::DefaultBrowserSettings),
        }
    }

    /// Anchor fragment id, 0 meaning "no anchor".
    pub fn fragment_id(self) -> u32 {
        self.source().map(Destination::fragment_id).unwrap_or(0)
    }

    pub fn browser_action(self, session: Option<SessionRef>) -> NavAction {
        let anchor = match self.fragment_id() {
            0 => None,
            id => Some(id),
        };
        NavAction {
            destination: Destination::Browser,
            anchor,
            session,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavAction {
    pub destination: Destination,
    /// Fragment the transition is anchored to.
    pub anchor: Option<u32>,
    pub session: Option<SessionRef>,
}

/// Navigation graph collaborator.
pub trait NavGraph {
    fn current_destination(&self) -> Option<Destination>;
    fn navigate(&mut self, action: NavAction);
}

/// Watches the sessions shown in the browser. Created on first use.
#[derive(Debug)]
pub struct SessionObserver {
    created_at: DateTime<Utc>,
    shown: AtomicUsize,
}

impl SessionObserver {
    fn new() -> Self {
        log::debug!("[Router] Session observer attached");
        Self {
            created_at: Utc::now(),
            shown: AtomicUsize::new(0),
        }
    }

    fn on_browser_requested(&self, session: Option<&SessionRef>) {
        self.shown.fetch_add(1, Ordering::Relaxed);
        log::debug!("[Router] Browser requested for session {:?}", session);
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn requests(&self) -> usize {
        self.shown.load(Ordering::Relaxed)
    }
}

#[derive(Default)]
pub struct NavigationRouter {
    observer: OnceCell<SessionObserver>,
}

impl NavigationRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observer(&self) -> Option<&SessionObserver> {
        self.observer.get()
    }

    /// Shows the browser for `session`. Returns false when the browser is
    /// already on screen and nothing was pushed.
    pub fn navigate_to_browser(
        &self,
        graph: &mut dyn NavGraph,
        origin: Origin,
        session: Option<SessionRef>,
    ) -> bool {
        let observer = self.observer.get_or_init(SessionObserver::new);
        observer.on_browser_requested(session.as_ref());

        if graph.current_destination() == Some(Destination::Browser) {
            log::debug!("[Router] Browser already showing, ignoring request from {:?}", origin);
            return false;
        }

        let action = origin.browser_action(session);
        log::info!("[Router] {:?} -> {:?}", origin, action);
        graph.navigate(action);
        true
    }

    /// Non-browser destinations (search dialog, settings pages, crash reporter).
    pub fn navigate(&self, graph: &mut dyn NavGraph, destination: Destination) -> bool {
        if destination == Destination::Browser {
            return self.navigate_to_browser(graph, Origin::Global, None);
        }
        let current = graph.current_destination();
        if current == Some(destination) {
            log::debug!("[Router] Already at {:?}", destination);
            return false;
        }
        graph.navigate(NavAction {
            destination,
            anchor: current.map(Destination::fragment_id),
            session: None,
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashSet;

    /// Graph that moves to whatever it was asked to show.
    #[derive(Default)]
    struct FakeGraph {
        current: Option<Destination>,
        actions: Vec<NavAction>,
    }

    impl NavGraph for FakeGraph {
        fn current_destination(&self) -> Option<Destination> {
            self.current
        }

        fn navigate(&mut self, action: NavAction) {
            self.current = Some(action.destination);
            self.actions.push(action);
        }
    }

    #[test]
    fn every_origin_maps_to_the_browser() {
        for &origin in Origin::ALL {
            let action = origin.browser_action(None);
            assert_eq!(action.destination, Destination::Browser);
        }
    }

    #[test]
    fn mapping_is_deterministic() {
        let session = Some(SessionRef::new("tab-1"));
        for &origin in Origin::ALL {
            assert_eq!(
                origin.browser_action(session.clone()),
                origin.browser_action(session.clone())
            );
        }
    }

    #[test]
    fn all_lists_each_origin_once() {
        let unique: HashSet<Origin> = Origin::ALL.iter().copied().collect();
        assert_eq!(unique.len(), Origin::ALL.len());
    }

    #[test]
    fn anchors_are_unique_per_origin() {
        let anchors: HashSet<u32> = Origin::ALL.iter().map(|o| o.fragment_id()).collect();
        assert_eq!(anchors.len(), Origin::ALL.len());
    }

    #[rstest]
    #[case(Origin::Global, None)]
    #[case(Origin::Home, Some(1))]
    #[case(Origin::Search, Some(3))]
    #[case(Origin::ExceptionList, Some(12))]
    #[case(Origin::DefaultBrowserSettings, Some(15))]
    fn anchor_follows_origin(#[case] origin: Origin, #[case] anchor: Option<u32>) {
        assert_eq!(origin.browser_action(None).anchor, anchor);
    }

    #[test]
    fn repeated_request_navigates_once() {
        let router = NavigationRouter::new();
        let mut graph = FakeGraph {
            current: Some(Destination::Home),
            ..Default::default()
        };
        let session = Some(SessionRef::new("tab-7"));

        assert!(router.navigate_to_browser(&mut graph, Origin::Home, session.clone()));
        assert!(!router.navigate_to_browser(&mut graph, Origin::Home, session.clone()));

        assert_eq!(graph.actions.len(), 1);
        assert_eq!(graph.actions[0].session, session);
        assert_eq!(graph.actions[0].anchor, Some(Destination::Home.fragment_id()));
    }

    #[test]
    fn observer_is_created_once() {
        let router = NavigationRouter::new();
        assert!(router.observer().is_none());

        let mut graph = FakeGraph::default();
        router.navigate_to_browser(&mut graph, Origin::Global, None);
        let first = router.observer().unwrap() as *const SessionObserver;
        router.navigate_to_browser(&mut graph, Origin::Global, None);
        let second = router.observer().unwrap() as *const SessionObserver;

        assert_eq!(first, second);
        assert_eq!(router.observer().unwrap().requests(), 2);
    }

    #[test]
    fn navigate_skips_current_destination() {
        let router = NavigationRouter::new();
        let mut graph = FakeGraph {
            current: Some(Destination::Settings),
            ..Default::default()
        };
        assert!(!router.navigate(&mut graph, Destination::Settings));
        assert!(router.navigate(&mut graph, Destination::CrashReporter));
        assert_eq!(graph.actions.len(), 1);
        assert_eq!(graph.actions[0].anchor, Some(Destination::Settings.fragment_id()));
    }
}

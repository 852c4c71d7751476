// Tab/session state shared by the home screen and the load dispatcher.

use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::modules::errors::SessionError;
use crate::modules::load::{SearchParams, SessionUseCases};
use crate::modules::router::SessionRef;
use crate::settings::SearchEngine;

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Tab {
    pub id: String,
    pub title: String,
    pub url: String,
    pub private: bool,
    #[serde(skip)]
    pub last_accessed: Option<Instant>,
}

/// Open tabs plus the selected one. Lives on the UI thread.
pub struct TabStore {
    tabs: Vec<Tab>,
    active_tab_id: Option<String>,
    default_engine: SearchEngine,
    next_id: u64,
}

impl TabStore {
    pub fn new(default_engine: SearchEngine) -> Self {
        Self {
            tabs: Vec::new(),
            active_tab_id: None,
            default_engine,
            next_id: 1,
        }
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn active(&self) -> Option<&Tab> {
        let id = self.active_tab_id.as_deref()?;
        self.tabs.iter().find(|t| t.id == id)
    }

    pub fn get(&self, session: &SessionRef) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.id == session.as_str())
    }

    pub fn session_is_private(&self, session: &SessionRef) -> Option<bool> {
        self.get(session).map(|t| t.private)
    }

    pub fn select(&mut self, session: &SessionRef) -> Result<(), SessionError> {
        let tab = self
            .tabs
            .iter_mut()
            .find(|t| t.id == session.as_str())
            .ok_or_else(|| SessionError::UnknownSession(session.as_str().to_string()))?;
        tab.last_accessed = Some(Instant::now());
        self.active_tab_id = Some(tab.id.clone());
        Ok(())
    }

    fn open_tab(&mut self, url: &str, private: bool) -> SessionRef {
        let id = format!("tab-{}", self.next_id);
        self.next_id += 1;
        self.tabs.push(Tab {
            id: id.clone(),
            title: url.to_string(),
            url: url.to_string(),
            private,
            last_accessed: Some(Instant::now()),
        });
        self.active_tab_id = Some(id.clone());
        log::info!("[Tabs] Opened {} (private: {}) at {}", id, private, url);
        SessionRef(id)
    }
}

impl SessionUseCases for TabStore {
    fn create_private_session(&mut self, url: &str) -> Result<(), SessionError> {
        self.open_tab(url, true);
        Ok(())
    }

    fn create_normal_session(&mut self, url: &str) -> Result<(), SessionError> {
        self.open_tab(url, false);
        Ok(())
    }

    /// Loads into the selected tab, or opens a normal one if there is none.
    fn load_url_in_current(&mut self, url: &str) -> Result<(), SessionError> {
        let active = self.active_tab_id.clone();
        match active.and_then(|id| self.tabs.iter_mut().find(|t| t.id == id)) {
            Some(tab) => {
                tab.url = url.to_string();
                tab.title = url.to_string();
                tab.last_accessed = Some(Instant::now());
                log::info!("[Tabs] {} -> {}", tab.id, url);
            }
            None => {
                self.open_tab(url, false);
            }
        }
        Ok(())
    }

    fn search(&mut self, params: SearchParams) -> Result<(), SessionError> {
        let engine = params.engine.unwrap_or(self.default_engine);
        let url = engine.query_url(&params.term);
        log::debug!("[Tabs] Search from {:?} via {:?}", params.source, engine);
        if params.new_tab {
            self.open_tab(&url, params.private);
            Ok(())
        } else {
            self.load_url_in_current(&url)
        }
    }
}

// Load dispatch - decides whether typed text is a URL to load or a search to run.
// No network access; the session use cases do the actual work.

use std::net::IpAddr;
use url::{Host, Url};

use crate::modules::errors::SessionError;
use crate::modules::mode::BrowsingMode;
use crate::settings::SearchEngine;

/// Where a search term came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchSource {
    UserEntered,
    Shortcut,
    Widget,
    StaticShortcut,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub text: String,
    pub new_tab: bool,
    pub mode: BrowsingMode,
    pub engine_override: Option<SearchEngine>,
    pub force_search: bool,
}

impl LoadRequest {
    pub fn new(text: impl Into<String>, new_tab: bool, mode: BrowsingMode) -> Self {
        Self {
            text: text.into(),
            new_tab,
            mode,
            engine_override: None,
            force_search: false,
        }
    }

    pub fn forcing_search(mut self) -> Self {
        self.force_search = true;
        self
    }

    pub fn with_engine(mut self, engine: SearchEngine) -> Self {
        self.engine_override = Some(engine);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    LoadUrl {
        url: String,
        new_tab: bool,
        mode: BrowsingMode,
    },
    RunSearch {
        term: String,
        new_tab: bool,
        mode: BrowsingMode,
        engine_override: Option<SearchEngine>,
        source: SearchSource,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    pub term: String,
    pub new_tab: bool,
    /// Privacy of the new session. Always false when searching in place.
    pub private: bool,
    pub engine: Option<SearchEngine>,
    pub source: SearchSource,
}

/// Session/tab use cases the dispatcher drives. Results are reported, not branched on.
pub trait SessionUseCases {
    fn create_private_session(&mut self, url: &str) -> Result<(), SessionError>;
    fn create_normal_session(&mut self, url: &str) -> Result<(), SessionError>;
    fn load_url_in_current(&mut self, url: &str) -> Result<(), SessionError>;
    fn search(&mut self, params: SearchParams) -> Result<(), SessionError>;
}

/// Parses `input` into a navigable URL, or `None` when it reads as a search.
///
/// Purely local string heuristics: no DNS lookup, no prefetch, nothing leaves
/// the device until the engine loads the result.
pub fn normalize_url(input: &str, https_only: bool) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Implicit localhost/IP gets plain http.
    if !trimmed.contains("://") && !trimmed.contains(' ') {
        if let Some(u) = local_host_url(trimmed) {
            return Some(u.to_string());
        }
    }

    // Known schemes only, so "google.com" is never read as scheme "google".
    if let Ok(u) = Url::parse(trimmed) {
        let s = u.scheme();
        if s == "http" || s == "https" || s == "file" || s == "about" || s == "data" {
            return Some(u.to_string());
        }
    }

    // A dotted single token is a domain, as long as its last label is not
    // numeric. "3.14" is a search, not the short-form address 3.0.0.14.
    if !trimmed.contains(char::is_whitespace) && trimmed.contains('.') && !trimmed.ends_with('.') {
        let scheme = if https_only { "https" } else { "http" };
        if let Ok(u) = Url::parse(&format!("{}://{}", scheme, trimmed)) {
            if let Some(Host::Domain(domain)) = u.host() {
                if top_label_has_letter(domain) {
                    return Some(u.to_string());
                }
            }
        }
    }

    None
}

/// `http://input` when `input` names localhost or a literal IP address.
fn local_host_url(input: &str) -> Option<Url> {
    if let Ok(ip) = input.parse::<IpAddr>() {
        let authority = match ip {
            IpAddr::V4(v4) => v4.to_string(),
            IpAddr::V6(v6) => format!("[{}]", v6),
        };
        return Url::parse(&format!("http://{}", authority)).ok();
    }

    let url = Url::parse(&format!("http://{}", input)).ok()?;
    let is_local = match url.host()? {
        Host::Domain(domain) => domain == "localhost",
        // The url crate expands short forms; only a literal dotted quad counts.
        Host::Ipv4(addr) => starts_with_host(input, &addr.to_string()),
        Host::Ipv6(_) => input.starts_with('['),
    };
    if is_local {
        Some(url)
    } else {
        None
    }
}

fn starts_with_host(input: &str, host: &str) -> bool {
    match input.strip_prefix(host) {
        Some(rest) => rest.is_empty() || rest.starts_with(|c: char| matches!(c, ':' | '/' | '?' | '#')),
        None => false,
    }
}

fn top_label_has_letter(domain: &str) -> bool {
    domain
        .trim_end_matches('.')
        .rsplit('.')
        .next()
        .map_or(false, |label| label.chars().any(char::is_alphabetic))
}

pub struct LoadDispatcher {
    https_only: bool,
}

impl LoadDispatcher {
    pub fn new(https_only: bool) -> Self {
        Self { https_only }
    }

    pub fn resolve(&self, request: &LoadRequest) -> LoadOutcome {
        if !request.force_search {
            if let Some(url) = normalize_url(&request.text, self.https_only) {
                return LoadOutcome::LoadUrl {
                    url,
                    new_tab: request.new_tab,
                    mode: request.mode,
                };
            }
        }
        LoadOutcome::RunSearch {
            term: request.text.clone(),
            new_tab: request.new_tab,
            mode: request.mode,
            engine_override: request.engine_override,
            source: SearchSource::UserEntered,
        }
    }

    /// Resolves and invokes exactly one use case.
    pub fn dispatch(&self, request: &LoadRequest, sessions: &mut dyn SessionUseCases) -> LoadOutcome {
        let outcome = self.resolve(request);
        let result = match &outcome {
            LoadOutcome::LoadUrl { url, new_tab: true, mode } => {
                if mode.is_private() {
                    sessions.create_private_session(url)
                } else {
                    sessions.create_normal_session(url)
                }
            }
            LoadOutcome::LoadUrl { url, new_tab: false, .. } => sessions.load_url_in_current(url),
            LoadOutcome::RunSearch {
                term,
                new_tab,
                mode,
                engine_override,
                source,
            } => sessions.search(SearchParams {
                term: term.clone(),
                new_tab: *new_tab,
                private: *new_tab && mode.is_private(),
                engine: *engine_override,
                source: *source,
            }),
        };
        if let Err(e) = result {
            log::warn!("[Load] {:?} failed: {}", outcome, e);
        }
        outcome
    }
}

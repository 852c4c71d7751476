// App-scheme deep links, e.g. `sovereign://settings_search_engine`.

use url::Url;

use crate::modules::errors::DispatchError;
use crate::modules::intent::IntentEffect;
use crate::modules::mode::BrowsingMode;
use crate::modules::router::{Destination, Origin};

pub const APP_SCHEME: &str = "sovereign";

pub fn is_app_link(url: &str) -> bool {
    Url::parse(url)
        .map(|u| u.scheme() == APP_SCHEME)
        .unwrap_or(false)
}

/// Maps a deep link to the effect it asks for.
pub fn parse(link: &str) -> Result<IntentEffect, DispatchError> {
    let url = Url::parse(link).map_err(|e| DispatchError::InvalidUrl(format!("{}: {}", link, e)))?;
    if url.scheme() != APP_SCHEME {
        return Err(DispatchError::InvalidUrl(link.to_string()));
    }
    let host = url.host_str().unwrap_or_default();

    let effect = match host {
        "home" => IntentEffect::Navigate(Destination::Home),
        "settings" => IntentEffect::Navigate(Destination::Settings),
        "settings_search_engine" => IntentEffect::Navigate(Destination::SearchEngineSettings),
        "settings_tracking_protection" => IntentEffect::Navigate(Destination::TrackingProtection),
        "settings_logins" => IntentEffect::Navigate(Destination::LoginsSettings),
        "make_default_browser" => IntentEffect::Navigate(Destination::DefaultBrowserSettings),
        "urls_bookmarks" => IntentEffect::Navigate(Destination::Bookmarks),
        "urls_history" => IntentEffect::Navigate(Destination::History),
        "enable_private_browsing" => IntentEffect::EnterMode {
            mode: BrowsingMode::Private,
            then: Destination::Home,
        },
        "open" => {
            let target = url
                .query_pairs()
                .find(|(k, _)| k == "url")
                .map(|(_, v)| v.into_owned())
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| DispatchError::MalformedSignal(format!("{} has no url", link)))?;
            IntentEffect::LoadAndBrowse {
                text: target,
                new_tab: true,
                force_search: false,
                origin: Origin::Global,
            }
        }
        other => return Err(DispatchError::UnknownDeepLink(other.to_string())),
    };
    Ok(effect)
}

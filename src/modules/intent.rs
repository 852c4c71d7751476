// Intent pipeline - an ordered chain of handlers, first match wins.
//
// Handlers only look at the signal and describe an effect; the Navigator
// applies it. Order is fixed: crash reports must be intercepted before any
// other handler gets a chance to interpret a recovery signal.

use crate::modules::deep_link;
use crate::modules::errors::DispatchError;
use crate::modules::load::SearchSource;
use crate::modules::mode::BrowsingMode;
use crate::modules::router::{Destination, Origin, SessionRef};
use crate::modules::signal::{
    ActivationSignal, SignalAction, ACTION_CRASH_REPORT, ACTION_SPEECH_PROCESSING,
    EXTRA_CRASH_ID, EXTRA_OPEN_TO_BROWSER, EXTRA_OPEN_TO_SEARCH, EXTRA_SEARCH_SOURCE,
    EXTRA_SESSION_ID, EXTRA_SPEECH_PROCESSING,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntentEffect {
    OpenBrowser {
        origin: Origin,
        session: Option<SessionRef>,
    },
    /// Load or search `text` in the current mode, then show the browser.
    LoadAndBrowse {
        text: String,
        new_tab: bool,
        force_search: bool,
        origin: Origin,
    },
    Navigate(Destination),
    SearchDialog {
        source: SearchSource,
    },
    EnterMode {
        mode: BrowsingMode,
        then: Destination,
    },
}

/// Applies claimed effects.
pub trait Navigator {
    fn apply(&mut self, effect: IntentEffect);
}

pub trait IntentHandler {
    fn name(&self) -> &'static str;

    /// `Ok(Some(_))` claims the signal. Extras the handler consumed are
    /// stripped from `out` so a re-created screen does not replay them.
    fn process(
        &self,
        signal: &ActivationSignal,
        out: &mut ActivationSignal,
    ) -> Result<Option<IntentEffect>, DispatchError>;
}

pub struct CrashReportHandler;

impl IntentHandler for CrashReportHandler {
    fn name(&self) -> &'static str {
        "crash-report"
    }

    fn process(
        &self,
        signal: &ActivationSignal,
        out: &mut ActivationSignal,
    ) -> Result<Option<IntentEffect>, DispatchError> {
        if !signal.is_custom(ACTION_CRASH_REPORT) && !signal.has_extra(EXTRA_CRASH_ID) {
            return Ok(None);
        }
        out.remove_extra(EXTRA_CRASH_ID);
        Ok(Some(IntentEffect::Navigate(Destination::CrashReporter)))
    }
}

pub struct VoiceSearchHandler;

impl IntentHandler for VoiceSearchHandler {
    fn name(&self) -> &'static str {
        "voice-search"
    }

    fn process(
        &self,
        signal: &ActivationSignal,
        out: &mut ActivationSignal,
    ) -> Result<Option<IntentEffect>, DispatchError> {
        if !signal.is_custom(ACTION_SPEECH_PROCESSING) {
            return Ok(None);
        }
        let text = signal
            .text_extra(EXTRA_SPEECH_PROCESSING)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| DispatchError::MalformedSignal("voice search without text".into()))?;
        out.remove_extra(EXTRA_SPEECH_PROCESSING);
        Ok(Some(IntentEffect::LoadAndBrowse {
            text: text.to_string(),
            new_tab: true,
            force_search: true,
            origin: Origin::Global,
        }))
    }
}

pub struct StartSearchHandler;

impl StartSearchHandler {
    fn source(signal: &ActivationSignal) -> SearchSource {
        match signal.text_extra(EXTRA_SEARCH_SOURCE) {
            Some("shortcut") => SearchSource::Shortcut,
            Some("static_shortcut") => SearchSource::StaticShortcut,
            _ => SearchSource::Widget,
        }
    }
}

impl IntentHandler for StartSearchHandler {
    fn name(&self) -> &'static str {
        "start-search"
    }

    fn process(
        &self,
        signal: &ActivationSignal,
        out: &mut ActivationSignal,
    ) -> Result<Option<IntentEffect>, DispatchError> {
        if signal.bool_extra(EXTRA_OPEN_TO_SEARCH) != Some(true) {
            return Ok(None);
        }
        out.remove_extra(EXTRA_OPEN_TO_SEARCH);
        out.remove_extra(EXTRA_SEARCH_SOURCE);
        Ok(Some(IntentEffect::SearchDialog {
            source: Self::source(signal),
        }))
    }
}

pub struct DeepLinkHandler;

impl IntentHandler for DeepLinkHandler {
    fn name(&self) -> &'static str {
        "deep-link"
    }

    fn process(
        &self,
        signal: &ActivationSignal,
        _out: &mut ActivationSignal,
    ) -> Result<Option<IntentEffect>, DispatchError> {
        if signal.action != SignalAction::View {
            return Ok(None);
        }
        match signal.data.as_deref() {
            Some(link) if deep_link::is_app_link(link) => deep_link::parse(link).map(Some),
            _ => Ok(None),
        }
    }
}

pub struct OpenBrowserHandler;

impl IntentHandler for OpenBrowserHandler {
    fn name(&self) -> &'static str {
        "open-browser"
    }

    fn process(
        &self,
        signal: &ActivationSignal,
        out: &mut ActivationSignal,
    ) -> Result<Option<IntentEffect>, DispatchError> {
        if signal.bool_extra(EXTRA_OPEN_TO_BROWSER) == Some(true) {
            out.extras
                .insert(EXTRA_OPEN_TO_BROWSER.to_string(), false.into());
            let session = signal.text_extra(EXTRA_SESSION_ID).map(SessionRef::new);
            return Ok(Some(IntentEffect::OpenBrowser {
                origin: Origin::Global,
                session,
            }));
        }

        // A link handed over by another app opens in a new tab.
        if signal.action != SignalAction::View {
            return Ok(None);
        }
        match signal.data.as_deref().map(str::trim) {
            Some(link) if !link.is_empty() && !deep_link::is_app_link(link) => {
                log::debug!("[Pipeline] Opening link from {:?}", signal.origin_app);
                let text = link.to_string();
                out.data = None;
                Ok(Some(IntentEffect::LoadAndBrowse {
                    text,
                    new_tab: true,
                    force_search: false,
                    origin: Origin::Global,
                }))
            }
            _ => Ok(None),
        }
    }
}

pub struct IntentPipeline {
    handlers: Vec<Box<dyn IntentHandler>>,
}

impl IntentPipeline {
    pub fn new(handlers: Vec<Box<dyn IntentHandler>>) -> Self {
        Self { handlers }
    }

    /// The production order.
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(CrashReportHandler),
            Box::new(VoiceSearchHandler),
            Box::new(StartSearchHandler),
            Box::new(DeepLinkHandler),
            Box::new(OpenBrowserHandler),
        ])
    }

    pub fn handler_names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    /// Runs the chain. Returns true if a handler claimed the signal.
    ///
    /// A handler error counts as "did not claim" and the next handler runs.
    pub fn dispatch(
        &self,
        signal: &ActivationSignal,
        navigator: &mut dyn Navigator,
        out: &mut ActivationSignal,
    ) -> bool {
        for handler in &self.handlers {
            match handler.process(signal, out) {
                Ok(Some(effect)) => {
                    log::info!("[Pipeline] {} claimed signal: {:?}", handler.name(), effect);
                    navigator.apply(effect);
                    return true;
                }
                Ok(None) => {}
                Err(e) => {
                    log::warn!("[Pipeline] {} failed, skipping: {}", handler.name(), e);
                }
            }
        }
        log::debug!("[Pipeline] Signal unclaimed: {:?}", signal.action);
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingNavigator {
        effects: Vec<IntentEffect>,
    }

    impl Navigator for RecordingNavigator {
        fn apply(&mut self, effect: IntentEffect) {
            self.effects.push(effect);
        }
    }

    struct FailingHandler;

    impl IntentHandler for FailingHandler {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn process(
            &self,
            _signal: &ActivationSignal,
            _out: &mut ActivationSignal,
        ) -> Result<Option<IntentEffect>, DispatchError> {
            Err(DispatchError::MalformedSignal("boom".into()))
        }
    }

    fn run(signal: &ActivationSignal) -> (bool, RecordingNavigator, ActivationSignal) {
        let pipeline = IntentPipeline::standard();
        let mut navigator = RecordingNavigator::default();
        let mut out = signal.clone();
        let claimed = pipeline.dispatch(signal, &mut navigator, &mut out);
        (claimed, navigator, out)
    }

    #[test]
    fn standard_order_is_fixed() {
        assert_eq!(
            IntentPipeline::standard().handler_names(),
            vec!["crash-report", "voice-search", "start-search", "deep-link", "open-browser"]
        );
    }

    #[test]
    fn crash_report_wins_over_later_handlers() {
        let signal = ActivationSignal::new(SignalAction::Main)
            .with_extra(EXTRA_CRASH_ID, "c-42")
            .with_extra(EXTRA_OPEN_TO_BROWSER, true)
            .with_extra(EXTRA_OPEN_TO_SEARCH, true);
        let (claimed, navigator, out) = run(&signal);

        assert!(claimed);
        assert_eq!(navigator.effects, vec![IntentEffect::Navigate(Destination::CrashReporter)]);
        assert!(!out.has_extra(EXTRA_CRASH_ID));
        // Untouched by handlers that never ran.
        assert_eq!(out.bool_extra(EXTRA_OPEN_TO_BROWSER), Some(true));
    }

    #[test]
    fn voice_search_forces_search_in_new_tab() {
        let signal = ActivationSignal::new(SignalAction::Custom(ACTION_SPEECH_PROCESSING.into()))
            .with_extra(EXTRA_SPEECH_PROCESSING, "example.com");
        let (claimed, navigator, out) = run(&signal);

        assert!(claimed);
        assert_eq!(
            navigator.effects,
            vec![IntentEffect::LoadAndBrowse {
                text: "example.com".into(),
                new_tab: true,
                force_search: true,
                origin: Origin::Global,
            }]
        );
        assert!(!out.has_extra(EXTRA_SPEECH_PROCESSING));
    }

    #[test]
    fn voice_search_without_text_falls_through() {
        let signal = ActivationSignal::new(SignalAction::Custom(ACTION_SPEECH_PROCESSING.into()))
            .with_extra(EXTRA_OPEN_TO_BROWSER, true);
        let (claimed, navigator, _) = run(&signal);

        assert!(claimed);
        assert_eq!(
            navigator.effects,
            vec![IntentEffect::OpenBrowser {
                origin: Origin::Global,
                session: None,
            }]
        );
    }

    #[test]
    fn start_search_reads_source() {
        let signal = ActivationSignal::new(SignalAction::Main)
            .with_extra(EXTRA_OPEN_TO_SEARCH, true)
            .with_extra(EXTRA_SEARCH_SOURCE, "static_shortcut");
        let (_, navigator, out) = run(&signal);

        assert_eq!(
            navigator.effects,
            vec![IntentEffect::SearchDialog {
                source: SearchSource::StaticShortcut,
            }]
        );
        assert!(!out.has_extra(EXTRA_OPEN_TO_SEARCH));
        assert!(!out.has_extra(EXTRA_SEARCH_SOURCE));
    }

    #[test]
    fn open_to_search_false_is_ignored() {
        let signal = ActivationSignal::new(SignalAction::Main).with_extra(EXTRA_OPEN_TO_SEARCH, false);
        let (claimed, navigator, _) = run(&signal);
        assert!(!claimed);
        assert!(navigator.effects.is_empty());
    }

    #[test]
    fn deep_link_is_claimed() {
        let (claimed, navigator, _) = run(&ActivationSignal::view("sovereign://settings"));
        assert!(claimed);
        assert_eq!(navigator.effects, vec![IntentEffect::Navigate(Destination::Settings)]);
    }

    #[test]
    fn broken_deep_link_fails_open() {
        let signal = ActivationSignal::view("sovereign://teleport")
            .with_extra(EXTRA_OPEN_TO_BROWSER, true)
            .with_extra(EXTRA_SESSION_ID, "tab-3");
        let (claimed, navigator, out) = run(&signal);

        assert!(claimed);
        assert_eq!(
            navigator.effects,
            vec![IntentEffect::OpenBrowser {
                origin: Origin::Global,
                session: Some(SessionRef::new("tab-3")),
            }]
        );
        assert_eq!(out.bool_extra(EXTRA_OPEN_TO_BROWSER), Some(false));
    }

    #[test]
    fn web_link_from_another_app_opens_in_new_tab() {
        let signal = ActivationSignal::view("https://example.com/article").with_origin_app("org.example.mail");
        let (claimed, navigator, out) = run(&signal);

        assert!(claimed);
        assert_eq!(
            navigator.effects,
            vec![IntentEffect::LoadAndBrowse {
                text: "https://example.com/article".into(),
                new_tab: true,
                force_search: false,
                origin: Origin::Global,
            }]
        );
        assert_eq!(out.data, None);
    }

    #[test]
    fn unknown_deep_link_is_not_loaded_as_a_page() {
        let (claimed, navigator, _) = run(&ActivationSignal::view("sovereign://teleport"));
        assert!(!claimed);
        assert!(navigator.effects.is_empty());
    }

    #[test]
    fn empty_view_is_unclaimed() {
        let (claimed, _, _) = run(&ActivationSignal::view("  "));
        assert!(!claimed);
    }

    #[test]
    fn launcher_signal_is_unclaimed() {
        let (claimed, navigator, _) = run(&ActivationSignal::new(SignalAction::Main));
        assert!(!claimed);
        assert!(navigator.effects.is_empty());
    }

    #[test]
    fn failing_handler_does_not_stop_the_chain() {
        let pipeline = IntentPipeline::new(vec![Box::new(FailingHandler), Box::new(OpenBrowserHandler)]);
        let signal = ActivationSignal::new(SignalAction::Main).with_extra(EXTRA_OPEN_TO_BROWSER, true);
        let mut navigator = RecordingNavigator::default();
        let mut out = signal.clone();

        assert!(pipeline.dispatch(&signal, &mut navigator, &mut out));
        assert_eq!(navigator.effects.len(), 1);
    }

    #[test]
    fn only_failures_means_unclaimed() {
        let pipeline = IntentPipeline::new(vec![Box::new(FailingHandler)]);
        let signal = ActivationSignal::default();
        let mut navigator = RecordingNavigator::default();
        let mut out = signal.clone();
        assert!(!pipeline.dispatch(&signal, &mut navigator, &mut out));
        assert!(navigator.effects.is_empty());
    }
}

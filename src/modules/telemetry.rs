use chrono::{DateTime, Utc};

use crate::modules::signal::{ActivationSignal, SignalAction};

/// How the app was opened on a cold start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenedFrom {
    AppIcon,
    Link,
    Custom,
}

impl OpenedFrom {
    pub fn from_signal(signal: &ActivationSignal) -> Self {
        match signal.action {
            SignalAction::Main => OpenedFrom::AppIcon,
            SignalAction::View => OpenedFrom::Link,
            SignalAction::Custom(_) => OpenedFrom::Custom,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TelemetryEvent {
    AppOpened {
        source: OpenedFrom,
        origin_app: Option<String>,
        at: DateTime<Utc>,
    },
}

pub trait Telemetry {
    fn record(&mut self, event: TelemetryEvent);
}

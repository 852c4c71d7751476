// Module exports for pure logic
pub mod default_browser; // Resume-time default browser check
pub mod deep_link;
pub mod errors;
pub mod intent;          // Ordered intent pipeline
pub mod load;            // URL vs. search decision
pub mod mode;
pub mod preferences;
pub mod router;          // Origin -> navigation action
pub mod signal;
pub mod sync;            // Foreground account sync
pub mod telemetry;

// Sovereign entry router library.
// Exposes the dispatch core so the binary and embedders can drive it,
// and so each piece can be tested on its own.

pub mod settings;
pub mod state;

// Pure logic modules (no host imports)
pub mod modules;

pub mod headless;
pub mod home;

pub use home::{Collaborators, ContentHost, HomeScreen};

pub mod diagrams;
pub mod positions;
pub mod prefs;
pub mod templates;
pub mod watch;

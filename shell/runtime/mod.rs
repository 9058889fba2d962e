pub mod cli;
pub mod diagnostics;
pub mod link_dispatch;
pub mod prefs;

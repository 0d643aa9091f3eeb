pub mod bot;
pub mod cli;
pub mod config;
pub mod error;
pub mod event;
pub mod github;
pub mod handle;
pub mod matcher;
pub mod outcome;
pub mod policy;
pub mod reconcile;
pub mod test_helpers;
pub mod trigger;

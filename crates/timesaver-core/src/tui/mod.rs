//! Interactive front end for `timesaver create`
//!
//! Prompts with cliclack, shows one spinner per orchestration stage and prints
//! the next steps. Compiled only with the `tui` feature.

mod prompts;

pub use prompts::{run, CreateArgs};

//! `envstore` is a small CLI around the `envstore` library. It lists, creates, reorders and
//! patches environments on a server exposing `/api/environment`, using `clap` and `reqwest`
//! under the hood.
//!
//! The command handling can be found in `clap_app.rs`.

mod clap_app;
mod clap_models;

use crate::clap_app::init_cli;

#[tokio::main]
async fn main() {
    // enable logger
    env_logger::init();

    // Enable virtual terminal to correctly colorize output on Windows 10 machines
    #[cfg(target_os = "windows")]
    colored::control::set_virtual_terminal(true).ok();

    init_cli().await;
}

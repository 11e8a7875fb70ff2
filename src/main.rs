mod app;
mod config;
mod error;
mod frames;
mod pet;
mod platform;
mod render;
mod sink;
mod util;
mod wake;

use clap::Parser;

/// Pixel cat for a 2.13" e-paper HAT.
#[derive(Debug, Parser)]
#[command(name = "catmagotchi", version, about)]
struct Cli {
    /// Show frames in a desktop window instead of driving the panel.
    #[arg(long)]
    preview: bool,

    /// Panel without a touch controller: the pet wakes after every nap.
    #[arg(long, conflicts_with = "preview")]
    no_touch: bool,
}

impl Cli {
    fn mode(&self) -> app::Mode {
        if self.preview {
            app::Mode::Preview
        } else {
            app::Mode::Panel {
                touch: !self.no_touch,
            }
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let mode = Cli::parse().mode();
    log::info!("Catmagotchi starting up ({mode:?})");

    if let Err(e) = app::run(mode) {
        log::error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

mod cli;
mod commands;
mod env_loader;
mod error;
mod sync;

use crate::sync::log::{self, Category};

fn main() {
    env_loader::load_dotenv();

    if let Err(err) = cli::run() {
        log::emit(Category::Error, format!("{err:#}"));
        std::process::exit(1);
    }
}

use clap::Parser;

use housing_explorer::app;
use housing_explorer::config::Config;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = Config::parse();
    log::debug!("starting with {config:?}");
    app::run(&config)
}

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cfg = paprika_dream::config::Config::parse();
    let console = paprika_dream::logging::init(&cfg)?;
    paprika_dream::app::run(cfg, console)
}

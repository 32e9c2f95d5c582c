use anyhow::Result;
use tickboy::Options;

fn main() -> Result<()> {
    env_logger::init();

    let options = Options::parse(std::env::args().skip(1))?;
    log::info!("Running ROM: '{}'", options.rom.display());
    tickboy::run(&options)
}

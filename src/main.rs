pub(crate) mod boardconfig;
pub(crate) mod displayscroller;
pub(crate) mod ledanimator;
pub(crate) mod peripherals;
pub(crate) mod rainbow;
pub(crate) mod scheduler;
pub(crate) mod simboard;
pub(crate) mod speakersweep;
pub(crate) mod station;

use clap::Parser;

use crate::boardconfig::BoardConfig;
use crate::scheduler::Scheduler;
use crate::simboard::SimBoard;
use crate::station::Station;

#[derive(Parser)]
struct Cli {
    /// Board configuration file (TOML); built-in defaults are used when omitted
    #[arg(short, long, value_name = "FILE")]
    config: Option<std::path::PathBuf>,
}

fn main() {
    env_logger::init();
    let args = Cli::parse();

    let config = match BoardConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(msg) => panic!("Cannot load board configuration: {}", msg),
    };

    let board = SimBoard::new();
    let mut station = match Station::initialize(&board, &config) {
        Ok(station) => station,
        Err(msg) => panic!("Cannot initialize station: {}", msg),
    };

    let scheduler = Scheduler::new();
    let stop_handle = scheduler.stop_handle();
    if let Err(error) = ctrlc::set_handler(move || stop_handle.stop()) {
        panic!("Failed to install Ctrl-C handler: {}", error);
    }

    let result = station.run(scheduler);

    // The scheduler has stopped by now, so no task can touch a handle while
    // teardown releases them.
    station.shutdown();

    if let Err(msg) = result {
        panic!("Station failed: {}", msg);
    }
}

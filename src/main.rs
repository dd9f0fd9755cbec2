use clap::Parser;
use log::LevelFilter;

use uma_voice_extract::error::UmaVoiceError;

use crate::cli::{UmaVoiceCommand, UmaVoiceTool};

mod cli;
mod commands;

fn main() -> Result<(), UmaVoiceError> {
    let tool = UmaVoiceTool::parse();

    let level = match tool.global.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new().filter_level(level).init();

    tool.command.run(tool.global)
}

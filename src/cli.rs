use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use uma_voice_extract::error::UmaVoiceError;

use crate::commands::{interactive, stress, system, story};

pub trait UmaVoiceCommand {
    fn run(self, global: GlobalArgs) -> Result<(), UmaVoiceError>;
}

#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Path to the JSON key/path configuration.
    #[clap(short, long, default_value = "config/keys.json")]
    pub config: PathBuf,
    /// Verbosity level, repeat to increase.
    #[clap(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Parser, Debug)]
#[clap(about = "Uma voice-line dataset extractor", version)]
pub struct UmaVoiceTool {
    #[clap(flatten)]
    pub global: GlobalArgs,
    #[clap(subcommand)]
    pub command: Command,
}

/// Shared flags for the two scan subcommands (spec §10.4).
#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Re-extract WAVs that already exist on disk.
    #[clap(long)]
    pub overwrite: bool,
    /// Cap the work list to 1000 shuffled items (spec §4.7).
    #[clap(long)]
    pub test_mode: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract system (UI) voice lines.
    System(system::System),
    /// Extract story voice lines.
    Story(story::Story),
    /// Run the infinite checksum stress loop.
    Stress(stress::Stress),
    /// Reproduce the original tool's sequential Y/N prompt menu.
    Interactive(interactive::Interactive),
}

impl UmaVoiceCommand for Command {
    fn run(self, global: GlobalArgs) -> Result<(), UmaVoiceError> {
        match self {
            Command::System(c) => c.run(global),
            Command::Story(c) => c.run(global),
            Command::Stress(c) => c.run(global),
            Command::Interactive(c) => c.run(global),
        }
    }
}

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Args;

use uma_voice_extract::cipher::Cipher;
use uma_voice_extract::config::Config;
use uma_voice_extract::error::UmaVoiceError;
use uma_voice_extract::indexer::Indexer;
use uma_voice_extract::meta_store::MetaStore;
use uma_voice_extract::pool;
use uma_voice_extract::story::StoryPacket;
use uma_voice_extract::stress;

use crate::cli::{GlobalArgs, UmaVoiceCommand};

#[derive(Args, Debug, Clone)]
pub struct Stress;

impl UmaVoiceCommand for Stress {
    fn run(self, global: GlobalArgs) -> Result<(), UmaVoiceError> {
        let config = Config::load(&global.config)?;
        if !config.expose_stress_mode {
            return Err(UmaVoiceError::Config(
                "stress mode is not enabled (EXPOSE_STRESS_MODE is false)".into(),
            ));
        }

        let meta = MetaStore::open(&config)?;
        let indexer = Indexer::build(&meta, &config.paths.dat)?;
        let packets: Vec<StoryPacket> = indexer
            .story_timelines(&meta)?
            .into_iter()
            .map(|(story_id, timeline, ruby)| StoryPacket {
                story_id,
                timeline,
                ruby,
            })
            .collect();
        drop(meta);

        let cipher = Cipher::new(&config);
        let worker_count = pool::default_worker_count();

        let running = Arc::new(AtomicBool::new(true));
        let running_handler = running.clone();
        ctrlc::set_handler(move || running_handler.store(false, Ordering::SeqCst))
            .map_err(|e| UmaVoiceError::Custom(format!("failed to install Ctrl-C handler: {e}")))?;

        log::info!("Running stress baseline over {} storylines...", packets.len());
        let baseline = stress::compute_checksums(packets.clone(), &cipher, worker_count);

        let mut loop_number: u64 = 0;
        let mut total_mismatches: usize = 0;
        while running.load(Ordering::SeqCst) {
            loop_number += 1;
            let summary = stress::run_loop(loop_number, packets.clone(), &cipher, worker_count, &baseline);
            total_mismatches += summary.mismatches.len();
            log::info!("{}", summary.report_line());
        }

        log::info!(
            "Stress loop interrupted after {loop_number} loops, {total_mismatches} total mismatches."
        );
        Ok(())
    }
}

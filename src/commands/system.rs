use clap::Args;
use rayon::prelude::*;

use uma_voice_extract::audio::vgmstream::VgmstreamContainer;
use uma_voice_extract::audio::AudioExtractor;
use uma_voice_extract::config::Config;
use uma_voice_extract::csv_rows::SYSTEM_HEADER;
use uma_voice_extract::error::UmaVoiceError;
use uma_voice_extract::indexer::Indexer;
use uma_voice_extract::master_store::MasterStore;
use uma_voice_extract::meta_store::MetaStore;
use uma_voice_extract::pool::{self, TEST_MODE_CAP};
use uma_voice_extract::system_scan;

use crate::cli::{GlobalArgs, ScanArgs, UmaVoiceCommand};

#[derive(Args, Debug, Clone)]
pub struct System {
    #[clap(flatten)]
    scan: ScanArgs,
}

impl UmaVoiceCommand for System {
    fn run(self, global: GlobalArgs) -> Result<(), UmaVoiceError> {
        let config = Config::load(&global.config)?;
        std::fs::create_dir_all(&config.paths.output)
            .map_err(|e| UmaVoiceError::Io("creating output directory".into(), e))?;

        log::info!("Scanning master database for system voices...");
        let rows = MasterStore::open(&config)?.system_text_rows()?;
        log::info!("Found {} system voice entries.", rows.len());

        log::info!("Building global sound index...");
        let meta = MetaStore::open(&config)?;
        let indexer = Indexer::build(&meta, &config.paths.dat)?;
        drop(meta);

        let entries = system_scan::resolve_system_entries(rows, &indexer.sheet_audio);
        log::info!("{} entries resolved to a usable sheet.", entries.len());
        if self.scan.test_mode && entries.len() > TEST_MODE_CAP {
            log::info!("Test mode: capping to {TEST_MODE_CAP} entries.");
        }

        let overwrite = self.scan.overwrite;
        let worker_count = pool::default_worker_count();
        let shards = pool::shuffle_into_shards(entries, worker_count, self.scan.test_mode);
        let output_dir = config.paths.output.clone();

        let shard_paths: Vec<_> = shards
            .into_par_iter()
            .enumerate()
            .filter_map(|(shard_id, shard)| {
                let extractor = AudioExtractor::<VgmstreamContainer>::new(&config, overwrite);
                let rows: Vec<_> = shard
                    .iter()
                    .filter_map(|entry| system_scan::process_system_entry(entry, &extractor, &output_dir))
                    .collect();
                let path = pool::shard_path(&output_dir, "system", shard_id);
                match pool::write_shard_csv(&rows, &path) {
                    Ok(()) => Some(path),
                    Err(e) => {
                        log::error!("shard {shard_id} failed to write: {e}");
                        None
                    }
                }
            })
            .collect();

        let final_path = config.paths.output.join("global_system_voices.csv");
        pool::merge_shards(&shard_paths, &final_path, &SYSTEM_HEADER)?;
        log::info!("Wrote {}", final_path.display());
        Ok(())
    }
}

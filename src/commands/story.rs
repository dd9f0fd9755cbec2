use clap::Args;
use rayon::prelude::*;

use uma_voice_extract::audio::vgmstream::VgmstreamContainer;
use uma_voice_extract::audio::AudioExtractor;
use uma_voice_extract::cipher::Cipher;
use uma_voice_extract::config::Config;
use uma_voice_extract::console::format_story_asset;
use uma_voice_extract::csv_rows::STORY_HEADER;
use uma_voice_extract::error::UmaVoiceError;
use uma_voice_extract::indexer::Indexer;
use uma_voice_extract::meta_store::MetaStore;
use uma_voice_extract::pool::{self, TEST_MODE_CAP};
use uma_voice_extract::story::{self, StoryPacket};

use crate::cli::{GlobalArgs, ScanArgs, UmaVoiceCommand};

#[derive(Args, Debug, Clone)]
pub struct Story {
    #[clap(flatten)]
    scan: ScanArgs,
}

impl UmaVoiceCommand for Story {
    fn run(self, global: GlobalArgs) -> Result<(), UmaVoiceError> {
        let config = Config::load(&global.config)?;
        std::fs::create_dir_all(&config.paths.output)
            .map_err(|e| UmaVoiceError::Io("creating output directory".into(), e))?;

        log::info!("Building global audio index...");
        let meta = MetaStore::open(&config)?;
        let indexer = Indexer::build(&meta, &config.paths.dat)?;

        log::info!("Collecting story packets...");
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
        log::info!("Found {} storylines.", packets.len());

        if self.scan.test_mode && packets.len() > TEST_MODE_CAP {
            log::info!("Test mode: capping to {TEST_MODE_CAP} storylines.");
        }

        let overwrite = self.scan.overwrite;
        let worker_count = pool::default_worker_count();
        let shards = pool::shuffle_into_shards(packets, worker_count, self.scan.test_mode);
        let output_dir = config.paths.output.clone();

        let shard_paths: Vec<_> = shards
            .into_par_iter()
            .enumerate()
            .filter_map(|(shard_id, shard)| {
                let cipher = Cipher::new(&config);
                let extractor = AudioExtractor::<VgmstreamContainer>::new(&config, overwrite);

                let rows: Vec<_> = shard
                    .into_iter()
                    .flat_map(|packet| {
                        let story_id = packet.story_id.clone();
                        let asset = format_story_asset(&story_id, packet.timeline.resolved_path.display());
                        match story::parse_story_blocks(&packet, &cipher) {
                            Ok(blocks) => {
                                log::debug!("parsed {asset}");
                                story::build_story_rows(
                                    &story_id,
                                    &blocks,
                                    &indexer.voice_sheet_audio,
                                    &extractor,
                                    &output_dir,
                                )
                            }
                            Err(e) => {
                                log::warn!("skipping story {asset}: {e}");
                                Vec::new()
                            }
                        }
                    })
                    .collect();

                let path = pool::shard_path(&output_dir, "story", shard_id);
                match pool::write_shard_csv(&rows, &path) {
                    Ok(()) => Some(path),
                    Err(e) => {
                        log::error!("shard {shard_id} failed to write: {e}");
                        None
                    }
                }
            })
            .collect();

        let final_path = config.paths.output.join("global_story_deep_scan.csv");
        pool::merge_shards(&shard_paths, &final_path, &STORY_HEADER)?;
        log::info!("Wrote {}", final_path.display());
        Ok(())
    }
}

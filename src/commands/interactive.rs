//! Sequential Y/N prompt menu, reproducing the original tool's console UX
//! verbatim (spec §10.4, §10.6).

use std::io::{self, Write};

use clap::Args;

use uma_voice_extract::config::Config;
use uma_voice_extract::error::UmaVoiceError;

use crate::cli::{GlobalArgs, ScanArgs, UmaVoiceCommand};
use crate::commands::stress::Stress;
use crate::commands::story::Story;
use crate::commands::system::System;

#[derive(Args, Debug, Clone)]
pub struct Interactive;

struct Selection {
    do_stress: bool,
    do_system: bool,
    do_story: bool,
    do_test: bool,
}

impl UmaVoiceCommand for Interactive {
    fn run(self, global: GlobalArgs) -> Result<(), UmaVoiceError> {
        let config = Config::load(&global.config)?;

        let selection = loop {
            println!("\n=== UMA VOICE DATASET CREATOR & STRESS TESTER ===");
            let mut qn_num = 1;

            let do_stress = if config.expose_stress_mode {
                let answer = ask_yn(&format!("{qn_num}. Do story scan stress test? (Y/N): "))?;
                qn_num += 1;
                answer
            } else {
                false
            };

            let (do_system, do_story) = if !do_stress {
                let system = ask_yn(&format!("{qn_num}. Do system text scan? (Y/N): "))?;
                qn_num += 1;
                let story = ask_yn(&format!("{qn_num}. Do full story scan? (Y/N): "))?;
                qn_num += 1;
                (system, story)
            } else {
                (false, false)
            };

            if !do_system && !do_story && !do_stress {
                println!("\nAt least system or story has to be selected. Restarting selection...\n");
                continue;
            }

            let do_test = if !do_stress && (do_system || do_story) {
                let answer =
                    ask_yn(&format!("{qn_num}. Enable Test Mode (Limit 1000 rows)? (Y/N): "))?;
                qn_num += 1;
                answer
            } else {
                false
            };
            let _ = qn_num;

            println!("\n--- CONFIRM OPTIONS ---");
            if config.expose_stress_mode {
                let label = if do_stress { "[YES] (Infinite Loop)" } else { "[NO]" };
                println!("  > Stress Test:   {label}");
            }
            if !do_stress {
                println!("  > System Scan:   {}", if do_system { "[YES]" } else { "[NO]" });
                println!("  > Story Scan:    {}", if do_story { "[YES]" } else { "[NO]" });
                println!(
                    "  > Test Mode:     {}",
                    if do_test { "[YES] (Limit 1000)" } else { "[NO] (Full Scan)" }
                );
            }
            println!("-----------------------");

            if ask_yn("Confirm selection? (Y/N): ")? {
                break Selection { do_stress, do_system, do_story, do_test };
            }
            println!("\nRestarting selection...\n");
        };

        println!("\nStarting Engine...");

        if selection.do_stress {
            Stress.run(global.clone())?;
        } else {
            let scan = ScanArgs { overwrite: false, test_mode: selection.do_test };
            if selection.do_system {
                System { scan: scan.clone() }.run(global.clone())?;
            }
            if selection.do_story {
                Story { scan }.run(global.clone())?;
            }
        }

        println!("\nALL OPERATIONS COMPLETE.");
        Ok(())
    }
}

fn ask_yn(prompt: &str) -> Result<bool, UmaVoiceError> {
    print!("{prompt}");
    io::stdout()
        .flush()
        .map_err(|e| UmaVoiceError::Io("flushing stdout".into(), e))?;

    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .map_err(|e| UmaVoiceError::Io("reading stdin".into(), e))?;
    Ok(line.trim().eq_ignore_ascii_case("y"))
}

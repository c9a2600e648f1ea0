use anyhow::Context;
use clap::Parser;
use generator::shots::ShotGenerator;
use gui_bridge::bridge::{spawn_demo, GuiBridge};
use log::info;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::SessionConfig;
use workflow::runner::Runner;

mod generator;
mod gui_bridge;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Laser target tracking server and session driver")]
struct Args {
    /// Replay a batch of synthetic shots offline and emit a summary
    #[arg(long, default_value_t = false)]
    offline: bool,
    /// Load a session config from YAML
    #[arg(long)]
    session: Option<PathBuf>,
    #[arg(long, default_value = "127.0.0.1:8765")]
    bind: SocketAddr,
    /// Number of tracker ticks replayed in offline mode
    #[arg(long, default_value_t = 50)]
    shots: usize,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Host the live feed and display endpoints until Ctrl+C
    #[arg(long, default_value_t = false)]
    serve: bool,
    /// Feed the server from the synthetic tracker
    #[arg(long, default_value_t = false)]
    demo: bool,
    /// Feed the server from the camera with this device index
    #[cfg(feature = "camera")]
    #[arg(long)]
    camera: Option<i32>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let session_config = if let Some(path) = args.session {
        SessionConfig::load(path)?
    } else {
        SessionConfig::from_args(args.bind, args.seed)
    };
    let runner = Runner::new(session_config.clone());

    if args.offline {
        let messages = ShotGenerator::new(session_config.generator.clone(), session_config.geometry)?
            .messages(args.shots)?;
        let summary = runner.replay(messages)?;

        println!(
            "Offline run -> messages {}, scored {}, skipped {}, out of bounds {}, center hits {}, mean score {:.2}, best {}",
            summary.messages,
            summary.scored,
            summary.skipped,
            summary.out_of_bounds,
            summary.center_hits,
            summary.mean_score,
            summary
                .best_score
                .map_or_else(|| "n/a".to_string(), |score| score.to_string())
        );

        let report = format!(
            "seed={} messages={} scored={} skipped={} out_of_bounds={} center_hits={} mean_score={:.3} best_score={:?}\n",
            session_config.generator.seed,
            summary.messages,
            summary.scored,
            summary.skipped,
            summary.out_of_bounds,
            summary.center_hits,
            summary.mean_score,
            summary.best_score
        );
        let report_path = PathBuf::from("tools/data/offline_session.log");
        if let Some(parent) = report_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&report_path)
            .with_context(|| format!("opening {}", report_path.display()))?;
        file.write_all(report.as_bytes())?;
    }

    if args.serve {
        let runtime = TokioBuilder::new_multi_thread()
            .enable_all()
            .build()
            .context("creating runtime for tracking server")?;
        runtime.block_on(async {
            let bridge = GuiBridge::start(runner.session()?);
            let demo = if args.demo {
                let generator = ShotGenerator::new(
                    session_config.generator.clone(),
                    session_config.geometry,
                )?;
                Some(spawn_demo(generator, bridge.frames()))
            } else {
                None
            };
            #[cfg(feature = "camera")]
            if let Some(device_id) = args.camera {
                let _camera = generator::camera::spawn_camera(
                    device_id,
                    session_config.generator.detector,
                    session_config.geometry,
                    bridge.frames(),
                );
            }

            let shutdown = async {
                if let Err(err) = signal::ctrl_c().await {
                    log::error!("awaiting Ctrl+C failed: {err}");
                }
            };
            let snapshot = bridge.serve(session_config.bind, shutdown).await?;
            if let Some(demo) = demo {
                demo.abort();
            }
            let metrics = snapshot.metrics;
            info!(
                "tracking server stopped: scored {}, skipped {}, out of bounds {}, transport errors {}",
                metrics.scored, metrics.skipped, metrics.out_of_bounds, metrics.transport_errors
            );
            Ok::<(), anyhow::Error>(())
        })?;
    }

    Ok(())
}

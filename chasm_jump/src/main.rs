//! chasm_jump — interactive entry point.

use chasm_jump::app::run;
use chasm_jump::config::{AppConfig, CliArgs, USAGE};
use log::{error, info};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║          Chasm Jump — make a fist to leap the gaps           ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    let cli = match CliArgs::parse(std::env::args().skip(1)) {
        Ok(cli) => cli,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };
    if cli.help {
        println!("{}", USAGE);
        return;
    }

    let cfg = match AppConfig::resolve(&cli) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };
    info!(
        "input={:?} seed={} audio={} max gap {:.0} / jump {:.0}",
        cfg.source,
        cfg.seed.map_or_else(|| "random".to_string(), |s| s.to_string()),
        if cfg.audio.enabled { "on" } else { "off" },
        cfg.tuning.max_gap,
        cfg.tuning.max_jump_distance(),
    );

    if let Err(e) = run(cfg) {
        error!("{}", e);
        std::process::exit(1);
    }
}

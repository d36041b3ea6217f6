//! Configuration: built-in defaults, an optional INI file, then
//! command-line overrides.
//!
//! ```ini
//! [physics]
//! gravity = 0.45
//! jump_velocity = -13
//! scroll_speed = 2.5
//! landing_tolerance = 25
//!
//! [world]
//! min_gap = 40
//! max_gap = 110
//! gap_safety_margin = 30
//! min_width = 180
//! max_width = 430
//! first_platform_width = 600
//! lookahead = 5
//!
//! [game]
//! seed = 42
//!
//! [input]
//! source = sim        ; sim | stdin | leap
//!
//! [audio]
//! enabled = true
//! program = 80        ; optional GM program for every cue
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;

use chasm_world::Tuning;
use configparser::ini::Ini;
use log::info;

use crate::error::AppError;

/// Loaded when `--config` is not given and the file exists.
pub const DEFAULT_CONFIG_PATH: &str = "chasm_jump.ini";

pub const USAGE: &str = "\
usage: chasm_jump [--config PATH] [--source sim|stdin|leap] [--seed N] [--mute]

  --config PATH   INI file (default: ./chasm_jump.ini when present)
  --source KIND   sim   = keyboard simulation (Space = fist)
                  stdin = one JSON landmark frame per line on stdin
                  leap  = LeapMotion controller (needs the `leap` feature)
  --seed N        reproducible platform layout
  --mute          no sound cues";

// ════════════════════════════════════════════════════════════════════════════
// SourceKind
// ════════════════════════════════════════════════════════════════════════════

/// Where hand frames come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceKind {
    #[default]
    Sim,
    Stdin,
    Leap,
}

impl FromStr for SourceKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sim" | "keyboard" => Ok(SourceKind::Sim),
            "stdin" | "json"   => Ok(SourceKind::Stdin),
            "leap"             => Ok(SourceKind::Leap),
            other => Err(AppError::Usage(format!("unknown input source '{}'", other))),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct AudioConfig {
    pub enabled: bool,
    /// Overrides every cue's General MIDI program.
    pub program: Option<u8>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        AudioConfig { enabled: true, program: None }
    }
}

/// Configuration for the full application.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppConfig {
    pub tuning: Tuning,
    /// `None` seeds each course from the OS.
    pub seed:   Option<u64>,
    pub source: SourceKind,
    pub audio:  AudioConfig,
}

impl AppConfig {
    /// Defaults overlaid with the INI file at `path`.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let mut ini = Ini::new();
        ini.load(path).map_err(|reason| AppError::ConfigLoad {
            path: path.to_path_buf(),
            reason,
        })?;
        info!("loaded config {}", path.display());
        Self::from_ini(&ini)
    }

    /// Defaults overlaid with INI `text`.
    pub fn from_ini_str(text: &str) -> Result<Self, AppError> {
        let mut ini = Ini::new();
        ini.read(text.to_string()).map_err(|reason| AppError::ConfigLoad {
            path: PathBuf::from("<inline>"),
            reason,
        })?;
        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> Result<Self, AppError> {
        let mut cfg = AppConfig::default();
        let t = &mut cfg.tuning;

        read_f32(ini, "physics", "gravity",           &mut t.gravity)?;
        read_f32(ini, "physics", "jump_velocity",     &mut t.jump_velocity)?;
        read_f32(ini, "physics", "scroll_speed",      &mut t.scroll_speed)?;
        read_f32(ini, "physics", "landing_tolerance", &mut t.landing_tolerance)?;

        read_f32(ini, "world", "min_gap",              &mut t.min_gap)?;
        read_f32(ini, "world", "max_gap",              &mut t.max_gap)?;
        read_f32(ini, "world", "gap_safety_margin",    &mut t.gap_safety_margin)?;
        read_f32(ini, "world", "min_width",            &mut t.min_width)?;
        read_f32(ini, "world", "max_width",            &mut t.max_width)?;
        read_f32(ini, "world", "first_platform_width", &mut t.first_platform_width)?;
        if let Some(n) = read_uint(ini, "world", "lookahead")? {
            t.lookahead_platforms = n as usize;
        }

        cfg.seed = read_uint(ini, "game", "seed")?;

        if let Some(s) = ini.get("input", "source") {
            cfg.source = s.parse()?;
        }

        match ini.getboolcoerce("audio", "enabled") {
            Ok(Some(on)) => cfg.audio.enabled = on,
            Ok(None) => {}
            Err(reason) => {
                return Err(AppError::ConfigValue { section: "audio", key: "enabled", reason })
            }
        }
        if let Some(p) = read_uint(ini, "audio", "program")? {
            let program = u8::try_from(p).ok().filter(|p| *p <= 127).ok_or_else(|| {
                AppError::ConfigValue {
                    section: "audio",
                    key:     "program",
                    reason:  format!("{} is not a MIDI program (0–127)", p),
                }
            })?;
            cfg.audio.program = Some(program);
        }

        Ok(cfg)
    }

    /// Apply command-line overrides.
    pub fn apply(&mut self, cli: &CliArgs) {
        if let Some(seed) = cli.seed {
            self.seed = Some(seed);
        }
        if let Some(source) = cli.source {
            self.source = source;
        }
        if cli.mute {
            self.audio.enabled = false;
        }
    }

    /// Defaults → config file → command line, then validate the tuning.
    pub fn resolve(cli: &CliArgs) -> Result<Self, AppError> {
        let default_path = Path::new(DEFAULT_CONFIG_PATH);
        let mut cfg = match &cli.config {
            Some(path)                   => Self::load(path)?,
            None if default_path.exists() => Self::load(default_path)?,
            None                         => Self::default(),
        };
        cfg.apply(cli);
        cfg.tuning.validate()?;
        Ok(cfg)
    }
}

fn read_f32(ini: &Ini, section: &'static str, key: &'static str, slot: &mut f32) -> Result<(), AppError> {
    match ini.getfloat(section, key) {
        Ok(Some(v)) => {
            *slot = v as f32;
            Ok(())
        }
        Ok(None) => Ok(()),
        Err(reason) => Err(AppError::ConfigValue { section, key, reason }),
    }
}

fn read_uint(ini: &Ini, section: &'static str, key: &'static str) -> Result<Option<u64>, AppError> {
    ini.getuint(section, key)
        .map_err(|reason| AppError::ConfigValue { section, key, reason })
}

// ════════════════════════════════════════════════════════════════════════════
// CliArgs
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Default, PartialEq)]
pub struct CliArgs {
    pub config: Option<PathBuf>,
    pub seed:   Option<u64>,
    pub source: Option<SourceKind>,
    pub mute:   bool,
    pub help:   bool,
}

impl CliArgs {
    /// Parse arguments, excluding the program name.
    pub fn parse<I>(args: I) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut out = CliArgs::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => out.config = Some(PathBuf::from(value_for(&arg, args.next())?)),
                "--seed" => {
                    let v = value_for(&arg, args.next())?;
                    out.seed = Some(v.parse().map_err(|_| {
                        AppError::Usage(format!("--seed expects an integer, got '{}'", v))
                    })?);
                }
                "--source" => out.source = Some(value_for(&arg, args.next())?.parse()?),
                "--mute"   => out.mute = true,
                "-h" | "--help" => out.help = true,
                other => return Err(AppError::Usage(format!("unknown argument '{}'\n\n{}", other, USAGE))),
            }
        }
        Ok(out)
    }
}

fn value_for(flag: &str, value: Option<String>) -> Result<String, AppError> {
    value.ok_or_else(|| AppError::Usage(format!("{} needs a value", flag)))
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use chasm_world::TuningError;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_ini_keeps_defaults() {
        let cfg = AppConfig::from_ini_str("").unwrap();
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn ini_overrides_tuning_and_options() {
        let cfg = AppConfig::from_ini_str(
            "[physics]\ngravity = 0.5\nscroll_speed = 2\n\
             [world]\nmax_gap = 100\nlookahead = 7\n\
             [game]\nseed = 42\n\
             [input]\nsource = stdin\n\
             [audio]\nenabled = false\nprogram = 80\n",
        ).unwrap();
        assert_eq!(cfg.tuning.gravity, 0.5);
        assert_eq!(cfg.tuning.scroll_speed, 2.0);
        assert_eq!(cfg.tuning.max_gap, 100.0);
        assert_eq!(cfg.tuning.lookahead_platforms, 7);
        assert_eq!(cfg.tuning.jump_velocity, -13.0);
        assert_eq!(cfg.seed, Some(42));
        assert_eq!(cfg.source, SourceKind::Stdin);
        assert!(!cfg.audio.enabled);
        assert_eq!(cfg.audio.program, Some(80));
    }

    #[test]
    fn section_and_key_names_are_case_insensitive() {
        let cfg = AppConfig::from_ini_str("[Physics]\nGravity = 0.4\n").unwrap();
        assert_eq!(cfg.tuning.gravity, 0.4);
    }

    #[test]
    fn bad_values_are_reported() {
        let err = AppConfig::from_ini_str("[physics]\ngravity = heavy\n").unwrap_err();
        assert!(matches!(err, AppError::ConfigValue { section: "physics", key: "gravity", .. }));

        let err = AppConfig::from_ini_str("[audio]\nprogram = 300\n").unwrap_err();
        assert!(matches!(err, AppError::ConfigValue { key: "program", .. }));

        let err = AppConfig::from_ini_str("[input]\nsource = webcam\n").unwrap_err();
        assert!(matches!(err, AppError::Usage(_)));
    }

    #[test]
    fn unjumpable_config_fails_validation() {
        let cfg = AppConfig::from_ini_str("[world]\nmax_gap = 140\n").unwrap();
        assert!(cfg.tuning.validate().is_err());
    }

    #[test]
    fn unwinnable_landing_and_start_settings_fail_validation() {
        let cfg = AppConfig::from_ini_str("[physics]\nlanding_tolerance = -1\n").unwrap();
        assert!(matches!(
            cfg.tuning.validate(),
            Err(TuningError::NotPositive { name: "landing_tolerance", .. })
        ));

        let cfg = AppConfig::from_ini_str("[world]\nfirst_platform_width = 50\n").unwrap();
        assert!(matches!(cfg.tuning.validate(), Err(TuningError::ShortFirstPlatform { .. })));
    }

    #[test]
    fn resolve_rejects_a_config_that_cannot_be_won() {
        let path = std::env::temp_dir().join(format!("chasm_jump_slack_{}.ini", std::process::id()));
        std::fs::write(&path, "[physics]\nlanding_tolerance = -1\n").unwrap();

        let cli = CliArgs { config: Some(path.clone()), ..CliArgs::default() };
        let result = AppConfig::resolve(&cli);
        std::fs::remove_file(&path).ok();

        assert!(matches!(result, Err(AppError::Tuning(TuningError::NotPositive { .. }))));
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let cli = CliArgs {
            config: Some(PathBuf::from("/nonexistent/chasm_jump.ini")),
            ..CliArgs::default()
        };
        assert!(matches!(AppConfig::resolve(&cli), Err(AppError::ConfigLoad { .. })));
    }

    #[test]
    fn config_file_then_cli_overrides() {
        let path = std::env::temp_dir().join(format!("chasm_jump_test_{}.ini", std::process::id()));
        std::fs::write(&path, "[game]\nseed = 1\n[input]\nsource = stdin\n").unwrap();

        let cli = CliArgs::parse(args(&["--config", path.to_str().unwrap(), "--seed", "9", "--mute"])).unwrap();
        let cfg = AppConfig::resolve(&cli).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(cfg.seed, Some(9));
        assert_eq!(cfg.source, SourceKind::Stdin);
        assert!(!cfg.audio.enabled);
    }

    #[test]
    fn cli_parsing() {
        let cli = CliArgs::parse(args(&["--source", "leap", "--seed", "7"])).unwrap();
        assert_eq!(cli.source, Some(SourceKind::Leap));
        assert_eq!(cli.seed, Some(7));
        assert!(!cli.mute);

        assert!(CliArgs::parse(args(&["--help"])).unwrap().help);
        assert!(CliArgs::parse(args(&["--seed"])).is_err());
        assert!(CliArgs::parse(args(&["--seed", "abc"])).is_err());
        assert!(CliArgs::parse(args(&["--fast"])).is_err());
    }
}

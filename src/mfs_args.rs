// Command-line options

use thiserror::Error;

use crate::mfs_game::{Config, Difficulty};

pub const USAGE: &str = "\
Usage: mfswpr [--console] [--difficulty easy|medium|hard] [--seed N]

  --console        play in the line-based console instead of the full-screen UI
  --difficulty D   override the saved difficulty for this run
  --seed N         place mines deterministically from seed N
  --help           show this text";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    pub console: bool,
    pub difficulty: Option<Difficulty>,
    pub seed: Option<u64>,
    pub help: bool,
}

impl Options {
    /// Difficulty for this run, `cfg` keeps the saved one
    pub fn difficulty_for(&self, cfg: &Config) -> Difficulty {
        self.difficulty.unwrap_or(cfg.difficulty)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgError {
    #[error("missing value for {0}")]
    MissingValue(&'static str),
    #[error("invalid value for {flag}: {value}")]
    InvalidValue { flag: &'static str, value: String },
    #[error("unknown argument: {0}")]
    Unknown(String),
}

/// Parse arguments, excluding the program name
pub fn parse_args(args: &[String]) -> Result<Options, ArgError> {
    let mut opts = Options::default();
    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--console" => opts.console = true,
            "-h" | "--help" => opts.help = true,
            "--difficulty" => {
                i += 1;
                let v = args.get(i).ok_or(ArgError::MissingValue("--difficulty"))?;
                let d = Difficulty::from_name(v)
                    .filter(|d| !matches!(d, Difficulty::Custom(_, _, _)))
                    .ok_or_else(|| ArgError::InvalidValue { flag: "--difficulty", value: v.clone() })?;
                opts.difficulty = Some(d);
            }
            "--seed" => {
                i += 1;
                let v = args.get(i).ok_or(ArgError::MissingValue("--seed"))?;
                let seed = v
                    .parse::<u64>()
                    .map_err(|_| ArgError::InvalidValue { flag: "--seed", value: v.clone() })?;
                opts.seed = Some(seed);
            }
            other => return Err(ArgError::Unknown(other.to_string())),
        }
        i += 1;
    }
    Ok(opts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn test_parse_args() {
        assert_eq!(parse_args(&[]).unwrap(), Options::default());
        let opts = parse_args(&args("--console --difficulty Hard --seed 42")).unwrap();
        assert!(opts.console);
        assert_eq!(opts.difficulty, Some(Difficulty::Hard));
        assert_eq!(opts.seed, Some(42));
    }

    #[test]
    fn test_parse_args_errors() {
        assert_eq!(parse_args(&args("--seed")), Err(ArgError::MissingValue("--seed")));
        assert!(matches!(parse_args(&args("--seed -1")), Err(ArgError::InvalidValue { .. })));
        assert!(matches!(parse_args(&args("--difficulty custom")), Err(ArgError::InvalidValue { .. })));
        assert_eq!(parse_args(&args("--fast")), Err(ArgError::Unknown("--fast".into())));
    }

    #[test]
    fn test_difficulty_override_is_not_saved() {
        let cfg = Config::default();
        let opts = parse_args(&args("--difficulty hard")).unwrap();
        assert_eq!(opts.difficulty_for(&cfg), Difficulty::Hard);
        assert_eq!(cfg.difficulty, Difficulty::Easy);
        let saved = toml::to_string(&cfg).unwrap();
        assert!(saved.contains("difficulty = \"Easy\""));
        assert_eq!(parse_args(&[]).unwrap().difficulty_for(&cfg), Difficulty::Easy);
    }
}

use crate::error::FilterError;
use crate::parser::{PatternConfig, PatternSet};
use std::fs;
use std::path::{Path, PathBuf};

/// Read a JSON [`PatternConfig`] and compile it.
pub fn load_patterns(path: &Path) -> Result<PatternSet, FilterError> {
    let raw = fs::read_to_string(path).map_err(|source| FilterError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    let config: PatternConfig =
        serde_json::from_str(&raw).map_err(|source| FilterError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::info!(path = %path.display(), version = config.version, "loaded pattern config");
    Ok(PatternSet::from_config(&config)?)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// stdin to stdout through a filter session.
    Filter,
    /// Print the startup settings, one per line.
    PrintInit,
    /// Print the debugger command for an action.
    Command { action: String, args: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliOptions {
    pub mode: Mode,
    pub patterns: Option<PathBuf>,
    pub locations: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
}

pub const USAGE: &str = "usage: lldb-demux [--patterns FILE] [--locations FILE] [--log-file FILE]
       lldb-demux --print-init
       lldb-demux --command ACTION [ARGS...]";

impl CliOptions {
    /// Parse arguments, program name excluded.
    pub fn parse(args: &[String]) -> Result<Self, FilterError> {
        let mut opts = CliOptions {
            mode: Mode::Filter,
            patterns: None,
            locations: None,
            log_file: None,
        };

        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--patterns" => opts.patterns = Some(path_value(arg, iter.next())?),
                "--locations" => opts.locations = Some(path_value(arg, iter.next())?),
                "--log-file" => opts.log_file = Some(path_value(arg, iter.next())?),
                "--print-init" => opts.mode = Mode::PrintInit,
                "--command" => {
                    let action = iter
                        .next()
                        .ok_or_else(|| FilterError::Usage(format!("--command needs an action\n{USAGE}")))?;
                    opts.mode = Mode::Command {
                        action: action.clone(),
                        args: iter.by_ref().cloned().collect(),
                    };
                }
                "-h" | "--help" => return Err(FilterError::Usage(USAGE.to_string())),
                other => {
                    return Err(FilterError::Usage(format!(
                        "unexpected argument: {other}\n{USAGE}"
                    )))
                }
            }
        }
        Ok(opts)
    }
}

fn path_value(flag: &str, value: Option<&String>) -> Result<PathBuf, FilterError> {
    value
        .map(PathBuf::from)
        .ok_or_else(|| FilterError::Usage(format!("{flag} needs a path\n{USAGE}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_default_mode_is_filter() {
        let opts = CliOptions::parse(&[]).unwrap();
        assert_eq!(opts.mode, Mode::Filter);
        assert!(opts.patterns.is_none());
    }

    #[test]
    fn test_paths_and_command() {
        let opts = CliOptions::parse(&args(&[
            "--locations",
            "/tmp/loc",
            "--command",
            "break",
            "main.c",
            "3",
        ]))
        .unwrap();
        assert_eq!(opts.locations, Some(PathBuf::from("/tmp/loc")));
        assert_eq!(
            opts.mode,
            Mode::Command {
                action: "break".to_string(),
                args: args(&["main.c", "3"]),
            }
        );
    }

    #[test]
    fn test_usage_errors() {
        assert!(matches!(
            CliOptions::parse(&args(&["--patterns"])),
            Err(FilterError::Usage(_))
        ));
        assert!(matches!(
            CliOptions::parse(&args(&["--bogus"])),
            Err(FilterError::Usage(_))
        ));
    }

    #[test]
    fn test_load_patterns_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "version": 1, "prompt": "\\(dbg\\) ", "prompt_text": "(dbg) " }}"#
        )
        .unwrap();
        let set = load_patterns(file.path()).unwrap();
        assert_eq!(set.prompt_text(), "(dbg) ");
    }

    #[test]
    fn test_load_patterns_reports_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "promt": "x" }}"#).unwrap();
        assert!(matches!(
            load_patterns(file.path()),
            Err(FilterError::ConfigParse { .. })
        ));

        let missing = Path::new("/nonexistent/patterns.json");
        assert!(matches!(
            load_patterns(missing),
            Err(FilterError::ConfigRead { .. })
        ));
    }
}

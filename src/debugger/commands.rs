//! Literal lldb commands for user actions, and the startup settings the
//! marker patterns depend on.

use crate::error::FilterError;

/// `settings set` commands a launcher must run before handing output to a
/// [`FilterSession`](super::FilterSession): frame and thread-stop lines carry
/// the full source path and line number, and no source snippet follows them.
pub const STARTUP_SETTINGS: &[&str] = &[
    r#"settings set frame-format "frame #${frame.index}: ${frame.pc}{ ${module.file.basename}{`${function.name-with-args}{${frame.no-debug}${function.pc-offset}}}}{ at ${line.file.fullpath}:${line.number}}\n""#,
    r#"settings set thread-stop-format "thread #${thread.index}{, name = '${thread.name}'}{, queue = '${thread.queue}'}{, stop reason = ${thread.stop-reason}}\n""#,
    "settings set stop-line-count-before 0",
    "settings set stop-line-count-after 0",
    "settings set stop-disassembly-display never",
];

/// A user action the display surface can send to the debugger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebuggerAction {
    StepInto,
    StepOver,
    StepOut,
    Continue,
    SetBreakpoint { file: String, line: u32 },
    ClearBreakpoint { file: String, line: u32 },
    Up,
    Down,
    Evaluate(String),
    Backtrace,
    Quit,
}

impl DebuggerAction {
    /// Parse an action name plus its arguments, e.g. `["break", "main.c", "12"]`.
    pub fn parse(name: &str, args: &[String]) -> Result<Self, FilterError> {
        let action = match name {
            "step" | "stepIn" | "stepInto" => DebuggerAction::StepInto,
            "next" | "stepOver" => DebuggerAction::StepOver,
            "finish" | "stepOut" => DebuggerAction::StepOut,
            "continue" | "cont" => DebuggerAction::Continue,
            "break" | "clear" => {
                let (file, line) = file_and_line(name, args)?;
                if name == "break" {
                    DebuggerAction::SetBreakpoint { file, line }
                } else {
                    DebuggerAction::ClearBreakpoint { file, line }
                }
            }
            "up" => DebuggerAction::Up,
            "down" => DebuggerAction::Down,
            "print" | "eval" => {
                if args.is_empty() {
                    return Err(FilterError::Usage(format!("{name} needs an expression")));
                }
                DebuggerAction::Evaluate(args.join(" "))
            }
            "bt" | "backtrace" => DebuggerAction::Backtrace,
            "quit" => DebuggerAction::Quit,
            other => return Err(FilterError::Usage(format!("unknown action: {other}"))),
        };
        Ok(action)
    }

    /// The command line to write to the debugger's stdin.
    pub fn command(&self) -> Result<String, FilterError> {
        let cmd = match self {
            DebuggerAction::StepInto => "thread step-in".to_string(),
            DebuggerAction::StepOver => "thread step-over".to_string(),
            DebuggerAction::StepOut => "thread step-out".to_string(),
            DebuggerAction::Continue => "process continue".to_string(),
            DebuggerAction::SetBreakpoint { file, line } => {
                format!("breakpoint set --file {} --line {line}", quote(file)?)
            }
            DebuggerAction::ClearBreakpoint { file, line } => {
                format!("breakpoint clear --file {} --line {line}", quote(file)?)
            }
            DebuggerAction::Up => "frame select --relative 1".to_string(),
            DebuggerAction::Down => "frame select --relative -1".to_string(),
            DebuggerAction::Evaluate(expr) => format!("expression -- {expr}"),
            DebuggerAction::Backtrace => "thread backtrace".to_string(),
            DebuggerAction::Quit => "quit".to_string(),
        };
        Ok(cmd)
    }
}

fn file_and_line(name: &str, args: &[String]) -> Result<(String, u32), FilterError> {
    match args {
        [file, line] => {
            let line = line
                .parse::<u32>()
                .map_err(|_| FilterError::Usage(format!("{name}: invalid line number {line:?}")))?;
            Ok((file.clone(), line))
        }
        _ => Err(FilterError::Usage(format!("{name} needs FILE LINE"))),
    }
}

fn quote(arg: &str) -> Result<String, FilterError> {
    shlex::try_quote(arg)
        .map(|quoted| quoted.into_owned())
        .map_err(|_| FilterError::Quote(arg.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_step_aliases() {
        assert_eq!(
            DebuggerAction::parse("next", &[]).unwrap(),
            DebuggerAction::StepOver
        );
        assert_eq!(
            DebuggerAction::parse("stepIn", &[]).unwrap(),
            DebuggerAction::StepInto
        );
        assert_eq!(
            DebuggerAction::parse("finish", &[]).unwrap().command().unwrap(),
            "thread step-out"
        );
    }

    #[test]
    fn test_breakpoint_path_is_quoted() {
        let action = DebuggerAction::parse("break", &args(&["/src/my file.c", "12"])).unwrap();
        assert_eq!(
            action.command().unwrap(),
            "breakpoint set --file '/src/my file.c' --line 12"
        );

        let clear = DebuggerAction::parse("clear", &args(&["/src/a.c", "3"])).unwrap();
        assert_eq!(
            clear.command().unwrap(),
            "breakpoint clear --file /src/a.c --line 3"
        );
    }

    #[test]
    fn test_frame_navigation() {
        assert_eq!(
            DebuggerAction::Up.command().unwrap(),
            "frame select --relative 1"
        );
        assert_eq!(
            DebuggerAction::Down.command().unwrap(),
            "frame select --relative -1"
        );
    }

    #[test]
    fn test_evaluate_joins_arguments() {
        let action = DebuggerAction::parse("print", &args(&["x", "+", "1"])).unwrap();
        assert_eq!(action.command().unwrap(), "expression -- x + 1");
    }

    #[test]
    fn test_bad_arguments() {
        assert!(DebuggerAction::parse("break", &args(&["a.c"])).is_err());
        assert!(DebuggerAction::parse("break", &args(&["a.c", "x"])).is_err());
        assert!(DebuggerAction::parse("print", &[]).is_err());
        assert!(DebuggerAction::parse("jump", &[]).is_err());
        let nul = DebuggerAction::SetBreakpoint {
            file: "a\0.c".to_string(),
            line: 1,
        };
        assert!(matches!(nul.command(), Err(FilterError::Quote(_))));
    }

    #[test]
    fn test_startup_settings_use_full_paths() {
        assert!(STARTUP_SETTINGS[0].contains("${line.file.fullpath}"));
        assert!(STARTUP_SETTINGS
            .iter()
            .any(|s| s.ends_with("stop-line-count-before 0")));
    }
}

//! Launch Interpreter
//!
//! The `launch` operation resolves the launch specification of an
//! interpreter, plus the command for either an interactive session or a
//! script. Nothing is spawned; the result describes what the host would
//! execute.

use serde;
use thiserror;
use tracing;

use crate::interpreter::descriptor;

/// Launch Errors
///
/// This is the exhaustive list of possible errors raised by the launch
/// operation. See each error for details.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Interactive mode was requested, but the interpreter has none.
    #[error("interpreter '{0}' has no interactive mode")]
    NoInteractiveMode(String),
    /// Script mode was requested without a script path.
    #[error("script mode requires a script path")]
    MissingScript,
    /// A script path was given for interactive mode.
    #[error("interactive mode does not take a script path, got {0:?}")]
    UnexpectedScript(String),
    /// The script path cannot be placed in a single-quoted Ruby literal.
    #[error("script path {0:?} contains single quotes, backslashes or control characters")]
    UnquotableScript(String),
}

/// Launch Mode
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Start an interactive session.
    Interactive,
    /// Run the script at the given path, if any.
    Script(Option<String>),
}

impl Mode {
    /// Build a launch mode from its name and an optional script path
    ///
    /// `name` is either `interactive` or `script`, matched case-insensitively.
    /// Returns `None` for unknown names. A script path given alongside
    /// `interactive` is refused rather than dropped.
    pub fn from_args(
        name: &str,
        script: Option<String>,
    ) -> Option<Result<Self, Error>> {
        if name.eq_ignore_ascii_case("interactive") {
            Some(match script {
                Some(v) => Err(Error::UnexpectedScript(v)),
                None => Ok(Mode::Interactive),
            })
        } else if name.eq_ignore_ascii_case("script") {
            Some(Ok(Mode::Script(script)))
        } else {
            None
        }
    }
}

/// Launch Report
///
/// The launch specification together with the command passed to the
/// interpreter.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Launch {
    #[serde(flatten)]
    pub spec: descriptor::LaunchSpec,
    pub command: String,
}

/// Resolve the launch of an interpreter
///
/// Resolve the launch of the interpreter selected by the manifest, in the
/// launch context of the manifest.
pub fn launch(
    manifest: &crate::manifest::Manifest,
    mode: Mode,
) -> Result<Launch, Error> {
    let id = manifest.interpreter();
    let context = manifest.context();
    let descriptor = id.provider().descriptor();

    tracing::info!(interpreter = id.as_str(), ?mode, "resolving launch");

    launch_with(descriptor.as_ref(), &context, mode)
}

/// Resolve the launch of a specific descriptor in the given context
pub fn launch_with(
    descriptor: &dyn descriptor::Descriptor,
    context: &descriptor::LaunchContext,
    mode: Mode,
) -> Result<Launch, Error> {
    let command = match mode {
        Mode::Interactive => {
            if !descriptor.has_interactive_mode() {
                return Err(Error::NoInteractiveMode(descriptor.name().to_string()));
            }
            descriptor.interactive_command(context)
        },
        Mode::Script(None) => {
            return Err(Error::MissingScript);
        },
        Mode::Script(Some(script)) => {
            if script.chars().any(|v| v.is_control() || v == '\'' || v == '\\') {
                return Err(Error::UnquotableScript(script));
            }
            descriptor.script_command(context, &script)
        },
    };

    Ok(
        Launch {
            spec: descriptor.launch_spec(context),
            command: command,
        }
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launch_interactive() {
        let l = launch(&crate::manifest::Manifest::default(), Mode::Interactive).unwrap();

        assert_eq!(l.spec.binary, std::path::Path::new("/system/bin/dalvikvm"));
        assert_eq!(l.spec.arguments.len(), 6);
        assert!(l.command.ends_with("IRB.start"));
        assert!(l.command.contains("file:/sdcard/org.ruboto.sl4a/extras/jruby/jruby.jar!"));
    }

    #[test]
    fn launch_script() {
        let l = launch(
            &crate::manifest::Manifest::default(),
            Mode::Script(Some("/sdcard/sl4a/scripts/hello.rb".to_string())),
        ).unwrap();

        assert!(l.command.ends_with("load('/sdcard/sl4a/scripts/hello.rb')"));
        assert_eq!(
            l.spec.environment.get("ANDROID_DATA").map(String::as_str),
            Some("/sdcard/org.ruboto.sl4a"),
        );
    }

    #[test]
    fn mode_from_args() {
        assert_eq!(Mode::from_args("interactive", None), Some(Ok(Mode::Interactive)));
        assert_eq!(
            Mode::from_args("Script", Some("/sdcard/a.rb".to_string())),
            Some(Ok(Mode::Script(Some("/sdcard/a.rb".to_string())))),
        );
        assert_eq!(Mode::from_args("script", None), Some(Ok(Mode::Script(None))));
        assert_eq!(
            Mode::from_args("interactive", Some("/sdcard/a.rb".to_string())),
            Some(Err(Error::UnexpectedScript("/sdcard/a.rb".to_string()))),
        );
        assert_eq!(Mode::from_args("repl", None), None);
    }

    #[test]
    fn launch_script_errors() {
        let manifest = crate::manifest::Manifest::default();

        assert_eq!(launch(&manifest, Mode::Script(None)), Err(Error::MissingScript));
        assert_eq!(
            launch(&manifest, Mode::Script(Some("/sdcard/it's.rb".to_string()))),
            Err(Error::UnquotableScript("/sdcard/it's.rb".to_string())),
        );
        assert!(launch(&manifest, Mode::Script(Some("/sdcard/\"a\".rb".to_string()))).is_ok());
    }

    // Verify the JSON layout
    //
    // The launch specification is flattened into the report, next to the
    // command.
    #[test]
    fn launch_json() {
        let l = launch(&crate::manifest::Manifest::default(), Mode::Interactive).unwrap();
        let v = serde_json::to_value(&l).unwrap();

        assert_eq!(v["binary"], "/system/bin/dalvikvm");
        assert_eq!(v["arguments"][2], "-classpath");
        assert_eq!(v["environment"]["ANDROID_DATA"], "/sdcard/org.ruboto.sl4a");
        assert!(v["command"].as_str().unwrap().starts_with("-e $LOAD_PATH.push("));
    }
}

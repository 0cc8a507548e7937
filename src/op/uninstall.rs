//! Uninstall Interpreter
//!
//! The `uninstall` operation runs the cleanup hook of an interpreter. The
//! host removes the installed archives on its own; this only covers what
//! the interpreter plugin is responsible for.

use serde;
use tracing;

/// Uninstall Report
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Report {
    pub interpreter: String,
    pub cleaned: bool,
}

/// Run the uninstaller
///
/// Create the uninstaller of the interpreter selected by the manifest and
/// run its cleanup hook.
pub fn uninstall(
    manifest: &crate::manifest::Manifest,
) -> Report {
    let id = manifest.interpreter();
    let mut uninstaller = id.provider().uninstaller(manifest.context());

    let cleaned = uninstaller.cleanup();
    if cleaned {
        tracing::info!(interpreter = id.as_str(), "interpreter cleanup finished");
    } else {
        tracing::warn!(interpreter = id.as_str(), "interpreter cleanup incomplete");
    }

    Report {
        interpreter: uninstaller.descriptor().name().to_string(),
        cleaned: cleaned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uninstall_jruby() {
        let r = uninstall(&crate::manifest::Manifest::default());

        assert_eq!(r.interpreter, "jruby");
        assert!(r.cleaned);
    }
}

//! Interpreter Lifecycle Hooks
//!
//! The host drives installation and removal of interpreters itself. Plugins
//! only hook into this process: a provider hands out descriptors, so the host
//! knows what to install, and an uninstaller gets a chance to remove
//! interpreter-specific leftovers once the host removed the archives.

use crate::interpreter::descriptor;

/// Interpreter Provider
///
/// Entry-point of an interpreter plugin. Providers are stateless factories.
pub trait Provider {
    /// Create a fresh descriptor of the provided interpreter.
    fn descriptor(&self) -> Box<dyn descriptor::Descriptor>;

    /// Create the uninstaller of the provided interpreter for the given
    /// context.
    fn uninstaller(
        &self,
        context: descriptor::LaunchContext,
    ) -> Box<dyn Uninstaller>;
}

/// Interpreter Uninstaller
///
/// The host may call `cleanup()` from a background task and report its
/// result to a listener. Failures of the archive removal are handled by the
/// host and never reach the uninstaller.
pub trait Uninstaller {
    /// Descriptor of the interpreter being removed.
    fn descriptor(&self) -> &dyn descriptor::Descriptor;

    /// Context the interpreter was installed with.
    fn context(&self) -> &descriptor::LaunchContext;

    /// Remove interpreter-specific leftovers
    ///
    /// Return `true` if the interpreter is fully removed.
    fn cleanup(&mut self) -> bool;
}

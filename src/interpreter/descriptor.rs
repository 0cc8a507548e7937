//! Interpreter Descriptor Contract
//!
//! The SL4A host describes interpreters via descriptors. A descriptor tells
//! the host which archives to download, where the interpreter ends up on the
//! device, and how to launch it. The host never inspects an interpreter
//! beyond what its descriptor reports.
//!
//! This module defines the contract as the `Descriptor` trait, plus the
//! plain data types passed across it. Default implementations encode the
//! conventions the host applies to every interpreter (archive naming, the
//! extras layout), so implementations only provide their constants and their
//! launch parameters.

use serde;
use tracing;

/// Default storage root of the host.
///
/// Interpreters without a bundled interpreter archive place their extras
/// below this root. Note the trailing slash; paths are concatenated, not
/// joined.
pub const SDCARD_ROOT: &str = "/sdcard/";

/// Extras directory below the storage directory of a plugin.
pub const INTERPRETER_EXTRAS_ROOT: &str = "/extras/";

/// Archive Kind
///
/// The host versions and downloads three archives per interpreter. Each
/// can be present or absent independently.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArchiveKind {
    /// Native interpreter binaries.
    Interpreter,
    /// Additional interpreter files (libraries, jars).
    Extras,
    /// Sample scripts.
    Scripts,
}

impl ArchiveKind {
    /// All archive kinds in the order the host installs them.
    pub const ALL: [ArchiveKind; 3] = [
        ArchiveKind::Interpreter,
        ArchiveKind::Extras,
        ArchiveKind::Scripts,
    ];

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ArchiveKind::Interpreter => "interpreter",
            ArchiveKind::Extras => "extras",
            ArchiveKind::Scripts => "scripts",
        }
    }

    /// Return the suffix appended to the interpreter name to form the
    /// archive file name.
    pub fn suffix(&self) -> &'static str {
        match self {
            ArchiveKind::Interpreter => "",
            ArchiveKind::Extras => "_extras",
            ArchiveKind::Scripts => "_scripts",
        }
    }
}

/// Launch Context
///
/// Host-provided locations an interpreter resolves its files against. The
/// context is owned by the caller; descriptors only borrow it.
///
/// Neither root is validated. Malformed roots yield malformed paths.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LaunchContext {
    /// Private files directory of the plugin. Interpreters with a bundled
    /// interpreter archive are installed into `<install_root>/<name>`.
    pub install_root: std::path::PathBuf,
    /// Storage root of the host, including the trailing separator.
    pub storage_root: String,
}

impl LaunchContext {
    /// Create a new launch context
    pub fn new(
        install_root: impl Into<std::path::PathBuf>,
        storage_root: impl Into<String>,
    ) -> Self {
        Self {
            install_root: install_root.into(),
            storage_root: storage_root.into(),
        }
    }
}

/// Launch Specification
///
/// Everything the host needs to spawn the interpreter process: the binary,
/// its literal argument vector, and environment overrides.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct LaunchSpec {
    pub binary: std::path::PathBuf,
    pub arguments: Vec<String>,
    pub environment: std::collections::BTreeMap<String, String>,
}

/// Resolve the private root of an interpreter
///
/// This is the host's default location of installed interpreters: a
/// directory named after the interpreter in the private files directory.
pub fn interpreter_root(install_root: &std::path::Path, name: &str) -> std::path::PathBuf {
    install_root.join(name)
}

/// Interpreter Descriptor
///
/// The contract between the host and an interpreter plugin. Implementations
/// must be pure: every method returns the same value for the same inputs.
pub trait Descriptor: Send + Sync {
    /// Script file extension, including the leading dot.
    fn extension(&self) -> &str;

    /// Identifier of the interpreter. Used in archive names and paths.
    fn name(&self) -> &str;

    /// Human-readable name of the interpreter.
    fn nice_name(&self) -> &str;

    /// Java-style package namespace of the plugin. Used to derive the
    /// storage directory of the plugin.
    fn package_namespace(&self) -> &str;

    /// URL prefix all archives are downloaded from, including the trailing
    /// separator.
    fn base_install_url(&self) -> &str;

    fn version(&self) -> u32;

    fn interpreter_version(&self) -> u32 {
        self.version()
    }

    fn extras_version(&self) -> u32 {
        self.version()
    }

    fn scripts_version(&self) -> u32;

    fn has_interpreter_archive(&self) -> bool;
    fn has_extras_archive(&self) -> bool;
    fn has_scripts_archive(&self) -> bool;
    fn has_interactive_mode(&self) -> bool;

    /// Whether the archive of the given kind is shipped.
    fn has_archive(&self, kind: ArchiveKind) -> bool {
        match kind {
            ArchiveKind::Interpreter => self.has_interpreter_archive(),
            ArchiveKind::Extras => self.has_extras_archive(),
            ArchiveKind::Scripts => self.has_scripts_archive(),
        }
    }

    /// Version of the archive of the given kind.
    fn archive_version(&self, kind: ArchiveKind) -> u32 {
        match kind {
            ArchiveKind::Interpreter => self.interpreter_version(),
            ArchiveKind::Extras => self.extras_version(),
            ArchiveKind::Scripts => self.scripts_version(),
        }
    }

    /// Return the archive file name
    ///
    /// Archive names follow `<name><suffix>.zip`, see
    /// `ArchiveKind::suffix()`.
    fn archive_name(&self, kind: ArchiveKind) -> String {
        format!("{}{}.zip", self.name(), kind.suffix())
    }

    /// Return the archive download URL
    ///
    /// This is the base install URL with the archive file name appended.
    fn archive_url(&self, kind: ArchiveKind) -> String {
        format!("{}{}", self.base_install_url(), self.archive_name(kind))
    }

    /// Resolve the extras directory
    ///
    /// Interpreters that ship extras but no interpreter archive keep their
    /// extras on shared storage, at
    /// `<storage_root><package_namespace>/extras/<name>`. All other
    /// interpreters keep their extras in their private interpreter root.
    fn resolve_extras_path(
        &self,
        install_root: &std::path::Path,
        storage_root: &str,
    ) -> std::path::PathBuf {
        if !self.has_interpreter_archive() && self.has_extras_archive() {
            tracing::debug!(name = self.name(), "resolving extras on shared storage");

            let base = format!(
                "{}{}{}",
                storage_root,
                self.package_namespace(),
                INTERPRETER_EXTRAS_ROOT,
            );
            std::path::PathBuf::from(base).join(self.name())
        } else {
            tracing::debug!(name = self.name(), "resolving extras in interpreter root");

            interpreter_root(install_root, self.name())
        }
    }

    /// Resolve the extras directory of the given context
    fn extras_path(&self, context: &LaunchContext) -> std::path::PathBuf {
        self.resolve_extras_path(&context.install_root, &context.storage_root)
    }

    /// Path of the executable the host spawns.
    fn binary(&self, context: &LaunchContext) -> std::path::PathBuf;

    /// Argument vector passed to `binary()`, in order.
    fn arguments(&self, context: &LaunchContext) -> Vec<String>;

    /// Environment overrides for the interpreter process.
    fn environment_variables(
        &self,
        context: &LaunchContext,
    ) -> std::collections::BTreeMap<String, String>;

    /// Command starting an interactive session.
    fn interactive_command(&self, context: &LaunchContext) -> String;

    /// Command running the script at `script_path`.
    fn script_command(&self, context: &LaunchContext, script_path: &str) -> String;

    /// Assemble the launch specification
    ///
    /// Collect binary, arguments, and environment of the given context into
    /// a freshly allocated `LaunchSpec`.
    fn launch_spec(&self, context: &LaunchContext) -> LaunchSpec {
        LaunchSpec {
            binary: self.binary(context),
            arguments: self.arguments(context),
            environment: self.environment_variables(context),
        }
    }
}

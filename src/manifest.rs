//! Host Manifest
//!
//! The host manifest describes the host environment the plugin is queried
//! in: where shared storage is mounted and where the plugin keeps its
//! private files. It is a TOML file, usually called `sl4a-jruby.toml`:
//!
//! ```toml
//! version = 1
//!
//! [host]
//! storage-root = "/sdcard/"
//! install-root = "/data/data/org.ruboto.sl4a/files"
//!
//! [interpreter]
//! id = "jruby"
//! ```
//!
//! All tables and keys other than `version` are optional. Missing values
//! fall back to the defaults of the SL4A host.

use serde;
use thiserror;
use toml;
use tracing;

use crate::interpreter;

/// Manifest Errors
///
/// This is the exhaustive list of possible errors raised when parsing a
/// manifest. See each error for details.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The manifest file could not be read.
    #[error("cannot read manifest: {0}")]
    Io(#[from] std::io::Error),
    /// The manifest is not valid TOML, or does not match the manifest
    /// structure.
    #[error("malformed manifest: {0}")]
    Syntax(String),
    /// The manifest format version is not supported.
    #[error("unsupported manifest version {0}")]
    UnsupportedVersion(u32),
    /// The value of the specified key is invalid.
    #[error("invalid value for manifest key '{0}'")]
    InvalidKey(&'static str),
}

/// Raw Manifest Host Table
///
/// Sub-type of `Raw` representing the `Host` table. This contains the
/// locations the host provides to its plugins.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RawHost {
    /// Storage root of the host, including the trailing separator.
    pub storage_root: Option<String>,
    /// Private files directory of the plugin.
    pub install_root: Option<String>,
}

/// Raw Manifest Interpreter Table
///
/// Sub-type of `Raw` selecting the interpreter to operate on.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RawInterpreter {
    /// Interpreter identifier, see `interpreter::Id`.
    pub id: Option<String>,
}

/// Raw Manifest Content
///
/// This type contains the raw manifest content as parsed by `toml` and
/// converted into rust types via `serde`.
///
/// Note that content of the type is not verified other than for syntactic
/// correctness required by the given types. Semantic correctness needs to
/// be verified by the caller.
#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Raw {
    /// Version of the manifest format. Only version `1` is currently
    /// supported.
    pub version: u32,

    /// Host table specifying the host environment.
    pub host: Option<RawHost>,
    /// Interpreter table selecting the interpreter.
    pub interpreter: Option<RawInterpreter>,
}

/// Manifest Abstraction
///
/// This type represents a valid and verified manifest. The manifest content
/// can be directly accessed via the `raw` field. The data is verified for
/// semantic correctness (unlike the `Raw` type).
#[derive(Debug)]
pub struct Manifest {
    /// Raw manifest content as parsed by the TOML module.
    pub raw: Raw,
}

/// Default private files directory of the plugin.
pub fn default_install_root() -> String {
    format!("/data/data/{}/files", interpreter::jruby::PACKAGE_NAMESPACE)
}

impl Raw {
    fn parse_toml(table: toml::Table) -> Result<Self, Error> {
        <Self as serde::Deserialize>::deserialize(table)
            .map_err(|v| Error::Syntax(v.to_string()))
    }

    fn parse_str(content: &str) -> Result<Self, Error> {
        content.parse::<toml::Table>()
            .map_err(|v| Error::Syntax(v.to_string()))
            .and_then(|v| Self::parse_toml(v))
    }
}

impl Manifest {
    // Check whether a string contains no quotes or escapes
    //
    // Host paths end up in single-quoted Ruby literals of the launch
    // commands, which are not escaped. Refuse quotes, backslashes, and any
    // control characters.
    fn is_quotable(s: &str) -> bool {
        s.chars().all(
            |v| !v.is_control()
                && v != '\\'
                && v != '\''
                && v != '"'
        )
    }

    /// Parse manifest from raw
    ///
    /// Take a raw representation of the manifest and perform post-parsing
    /// validation, ensuring the final manifest will not contain invalid
    /// entries.
    fn parse_raw(raw: Raw) -> Result<Self, Error> {
        // Only version '1' is supported. Unknown fields are ignored, so
        // version '1' can be extended without breaking older parsers.
        if raw.version != 1 {
            return Err(Error::UnsupportedVersion(raw.version));
        }

        if let Some(host) = &raw.host {
            // The storage root is concatenated with the plugin namespace,
            // so it must be absolute and carry its trailing separator.
            if let Some(v) = &host.storage_root {
                if !v.starts_with('/') || !v.ends_with('/') || !Self::is_quotable(v) {
                    return Err(Error::InvalidKey("host.storage-root"));
                }
            }

            // Device paths are Unix paths on every build host.
            if let Some(v) = &host.install_root {
                if !v.starts_with('/') || !Self::is_quotable(v) {
                    return Err(Error::InvalidKey("host.install-root"));
                }
            }
        }

        if let Some(v) = raw.interpreter.as_ref().and_then(|v| v.id.as_ref()) {
            if v.parse::<interpreter::Id>().is_err() {
                return Err(Error::InvalidKey("interpreter.id"));
            }
        }

        Ok(
            Self {
                raw: raw,
            }
        )
    }

    /// Parse manifest from string
    ///
    /// Parse the given string as a literal manifest in TOML representation.
    /// Content is verified and invalid manifests are refused.
    pub fn parse_str(content: &str) -> Result<Self, Error> {
        Raw::parse_str(content)
            .and_then(|v| Self::parse_raw(v))
    }

    /// Parse manifest from file-system
    ///
    /// Open the specified file and parse it as a manifest. The content is
    /// verified and invalid manifests are refused. The file is completely
    /// parsed into memory and then closed again before the function returns.
    pub fn parse_path(path: &std::path::Path) -> Result<Self, Error> {
        tracing::debug!(?path, "parsing host manifest");

        let content = std::fs::read_to_string(path)?;
        Self::parse_str(&content)
    }

    /// Selected interpreter
    ///
    /// Return the interpreter selected by the manifest, defaulting to JRuby.
    pub fn interpreter(&self) -> interpreter::Id {
        self.raw.interpreter.as_ref()
            .and_then(|v| v.id.as_ref())
            .and_then(|v| v.parse().ok())
            .unwrap_or(interpreter::Id::Jruby)
    }

    /// Launch context of the host
    ///
    /// Build the launch context from the host table, filling in the host
    /// defaults for missing entries.
    pub fn context(&self) -> interpreter::descriptor::LaunchContext {
        let host = self.raw.host.as_ref();
        let storage_root = host
            .and_then(|v| v.storage_root.clone())
            .unwrap_or_else(|| interpreter::descriptor::SDCARD_ROOT.to_string());
        let install_root = host
            .and_then(|v| v.install_root.clone())
            .unwrap_or_else(default_install_root);

        interpreter::descriptor::LaunchContext::new(install_root, storage_root)
    }
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            raw: Raw {
                version: 1,
                host: None,
                interpreter: None,
            },
        }
    }
}

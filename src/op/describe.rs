//! Describe Interpreter
//!
//! The `describe` operation collects everything the host learns from an
//! interpreter descriptor before installation: identity, capabilities,
//! and the archives to download.

use serde;
use tracing;

use crate::interpreter::descriptor;

/// Archive Entry
///
/// Download information of a single archive kind. Absent archives are
/// listed as well, with `present` cleared, since the host still queries
/// their names.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Archive {
    pub kind: descriptor::ArchiveKind,
    pub present: bool,
    pub version: u32,
    pub file_name: String,
    pub url: String,
}

/// Interpreter Description
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Description {
    pub name: String,
    pub nice_name: String,
    pub extension: String,
    pub version: u32,
    pub interactive: bool,
    pub extras_path: std::path::PathBuf,
    pub archives: Vec<Archive>,
}

/// Describe an interpreter
///
/// Query the descriptor of the interpreter selected by the manifest and
/// collect the answers into a `Description`, resolved against the launch
/// context of the manifest.
pub fn describe(
    manifest: &crate::manifest::Manifest,
) -> Description {
    let id = manifest.interpreter();
    let context = manifest.context();
    let descriptor = id.provider().descriptor();

    tracing::info!(interpreter = id.as_str(), "describing interpreter");

    describe_with(descriptor.as_ref(), &context)
}

/// Describe a specific descriptor in the given context
pub fn describe_with(
    descriptor: &dyn descriptor::Descriptor,
    context: &descriptor::LaunchContext,
) -> Description {
    let archives = descriptor::ArchiveKind::ALL.iter()
        .map(
            |&kind| Archive {
                kind: kind,
                present: descriptor.has_archive(kind),
                version: descriptor.archive_version(kind),
                file_name: descriptor.archive_name(kind),
                url: descriptor.archive_url(kind),
            }
        )
        .collect();

    Description {
        name: descriptor.name().to_string(),
        nice_name: descriptor.nice_name().to_string(),
        extension: descriptor.extension().to_string(),
        version: descriptor.version(),
        interactive: descriptor.has_interactive_mode(),
        extras_path: descriptor.extras_path(context),
        archives: archives,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_jruby() {
        let d = describe(&crate::manifest::Manifest::default());

        assert_eq!(d.name, "jruby");
        assert_eq!(d.nice_name, "JRuby");
        assert_eq!(d.extension, ".rb");
        assert_eq!(d.version, 3);
        assert!(d.interactive);
        assert_eq!(d.extras_path, std::path::Path::new("/sdcard/org.ruboto.sl4a/extras/jruby"));
        assert_eq!(d.archives.len(), 3);

        let interpreter = &d.archives[0];
        assert_eq!(interpreter.kind, descriptor::ArchiveKind::Interpreter);
        assert!(!interpreter.present);
        assert_eq!(interpreter.file_name, "jruby.zip");

        let scripts = &d.archives[2];
        assert!(scripts.present);
        assert_eq!(scripts.version, 1);
        assert!(scripts.url.ends_with("/current/jruby_scripts.zip"));
    }

    // Verify JSON serialization
    //
    // The CLI prints descriptions as JSON; keys use kebab-case.
    #[test]
    fn describe_json() {
        let d = describe(&crate::manifest::Manifest::default());
        let v = serde_json::to_value(&d).unwrap();

        assert_eq!(v["nice-name"], "JRuby");
        assert_eq!(v["archives"][1]["kind"], "extras");
        assert_eq!(v["archives"][1]["file-name"], "jruby_extras.zip");
    }
}

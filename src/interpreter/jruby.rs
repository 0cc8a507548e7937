//! JRuby Interpreter
//!
//! JRuby is shipped as a single jar in the extras archive and runs on the
//! Dalvik virtual machine of the device. There is no native interpreter
//! archive. Consequently, the extras are placed on shared storage below the
//! storage directory of this plugin, and every launch invokes `dalvikvm`
//! with the jar on its class path.
//!
//! Scripts and the interactive shell are started via JRuby's `-e` flag. The
//! command first pushes the Ruby standard library embedded in the jar onto
//! `$LOAD_PATH` and loads the `android` bridge, followed by either an IRB
//! session or a `load()` of the script:
//!
//! ```text
//! -e $LOAD_PATH.push('file:<jar>!/META-INF/jruby.home/lib/ruby/1.8'); require 'android'; <body>
//! ```

use crate::interpreter::descriptor;
use crate::interpreter::lifecycle;

/// URL prefix of all JRuby archives.
pub const BASE_INSTALL_URL: &str =
    "https://github.com/ruboto/sl4a_jruby_interpreter/raw/master/jruby-version-builder/current/";

/// Virtual machine executing the JRuby jar.
pub const DALVIKVM: &str = "/system/bin/dalvikvm";

/// Package namespace of this plugin.
pub const PACKAGE_NAMESPACE: &str = "org.ruboto.sl4a";

/// Name of the jar inside the extras directory.
pub const JRUBY_JAR: &str = "jruby.jar";

/// Environment variable pointing the VM at its data directory.
pub const ENV_DATA: &str = "ANDROID_DATA";

const VERSION: u32 = 3;
const SCRIPTS_VERSION: u32 = 1;

const MAIN_CLASS: &str = "org.jruby.Main";
const BOOT_CLASSPATH: &str = "-Xbootclasspath:/system/framework/core.jar";
const STACK_SIZE: &str = "-Xss128k";
// Disables the JRuby compiler; Dalvik cannot load generated JVM bytecode.
const NO_COMPILE: &str = "-X-C";

const INTERACTIVE_BODY: &str = "require 'irb'; IRB.conf[:USE_READLINE] = false; IRB.start";

// Expand the `-e` command template
//
// Embed the jar path and the trailing Ruby statements into the JRuby
// command template.
fn command(jar: &str, body: &str) -> String {
    format!(
        "-e $LOAD_PATH.push('file:{}!/META-INF/jruby.home/lib/ruby/1.8'); require 'android'; {}",
        jar,
        body,
    )
}

/// Path to the JRuby jar in the given extras directory
pub fn jar_path(extras_path: &std::path::Path) -> std::path::PathBuf {
    extras_path.join(JRUBY_JAR)
}

/// Build the launch arguments
///
/// Return the argument vector passed to `dalvikvm`. The order is fixed and
/// significant: VM flags first, then the class path holding the jar, then
/// the main class and its flags.
pub fn launch_arguments(extras_path: &std::path::Path) -> Vec<String> {
    vec![
        BOOT_CLASSPATH.to_string(),
        STACK_SIZE.to_string(),
        "-classpath".to_string(),
        jar_path(extras_path).to_string_lossy().into_owned(),
        MAIN_CLASS.to_string(),
        NO_COMPILE.to_string(),
    ]
}

/// Build the interactive command
///
/// Return the command starting an IRB session with readline disabled.
pub fn interactive_command(extras_path: &std::path::Path) -> String {
    command(&jar_path(extras_path).to_string_lossy(), INTERACTIVE_BODY)
}

/// Build the script command
///
/// Return the command loading the script at `script_path`. The path is
/// placed in a single-quoted Ruby literal verbatim, without escaping.
pub fn script_command(extras_path: &std::path::Path, script_path: &str) -> String {
    command(
        &jar_path(extras_path).to_string_lossy(),
        &format!("load('{}')", script_path),
    )
}

/// Build the environment overrides
///
/// Points `ANDROID_DATA` at the storage directory of this plugin, which is
/// the plain concatenation of storage root and package namespace.
pub fn environment_variables(storage_root: &str) -> std::collections::BTreeMap<String, String> {
    let mut values = std::collections::BTreeMap::new();
    values.insert(
        ENV_DATA.to_string(),
        format!("{}{}", storage_root, PACKAGE_NAMESPACE),
    );
    values
}

/// JRuby Descriptor
///
/// Stateless descriptor of the JRuby interpreter. All values are constants
/// of this module, or derived from the launch context.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Jruby;

impl descriptor::Descriptor for Jruby {
    fn extension(&self) -> &str {
        ".rb"
    }

    fn name(&self) -> &str {
        "jruby"
    }

    fn nice_name(&self) -> &str {
        "JRuby"
    }

    fn package_namespace(&self) -> &str {
        PACKAGE_NAMESPACE
    }

    fn base_install_url(&self) -> &str {
        BASE_INSTALL_URL
    }

    fn version(&self) -> u32 {
        VERSION
    }

    fn scripts_version(&self) -> u32 {
        SCRIPTS_VERSION
    }

    fn has_interpreter_archive(&self) -> bool {
        false
    }

    fn has_extras_archive(&self) -> bool {
        true
    }

    fn has_scripts_archive(&self) -> bool {
        true
    }

    fn has_interactive_mode(&self) -> bool {
        true
    }

    fn binary(&self, _context: &descriptor::LaunchContext) -> std::path::PathBuf {
        std::path::PathBuf::from(DALVIKVM)
    }

    fn arguments(&self, context: &descriptor::LaunchContext) -> Vec<String> {
        launch_arguments(&descriptor::Descriptor::extras_path(self, context))
    }

    fn environment_variables(
        &self,
        context: &descriptor::LaunchContext,
    ) -> std::collections::BTreeMap<String, String> {
        environment_variables(&context.storage_root)
    }

    fn interactive_command(&self, context: &descriptor::LaunchContext) -> String {
        interactive_command(&descriptor::Descriptor::extras_path(self, context))
    }

    fn script_command(&self, context: &descriptor::LaunchContext, script_path: &str) -> String {
        script_command(&descriptor::Descriptor::extras_path(self, context), script_path)
    }
}

/// JRuby Provider
///
/// Registers JRuby with the host. Every request yields a fresh descriptor.
#[derive(Clone, Copy, Debug, Default)]
pub struct Provider;

impl lifecycle::Provider for Provider {
    fn descriptor(&self) -> Box<dyn descriptor::Descriptor> {
        Box::new(Jruby)
    }

    fn uninstaller(
        &self,
        context: descriptor::LaunchContext,
    ) -> Box<dyn lifecycle::Uninstaller> {
        Box::new(Uninstaller::new(Jruby, context))
    }
}

/// JRuby Uninstaller
///
/// The host removes the installed archives itself. JRuby leaves nothing
/// else behind, so the cleanup hook has no work to do.
#[derive(Clone, Debug)]
pub struct Uninstaller {
    descriptor: Jruby,
    context: descriptor::LaunchContext,
}

impl Uninstaller {
    pub fn new(descriptor: Jruby, context: descriptor::LaunchContext) -> Self {
        Self {
            descriptor: descriptor,
            context: context,
        }
    }
}

impl lifecycle::Uninstaller for Uninstaller {
    fn descriptor(&self) -> &dyn descriptor::Descriptor {
        &self.descriptor
    }

    fn context(&self) -> &descriptor::LaunchContext {
        &self.context
    }

    fn cleanup(&mut self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::descriptor::{ArchiveKind, Descriptor, LaunchContext};
    use crate::interpreter::lifecycle::Provider as _;

    fn context() -> LaunchContext {
        LaunchContext::new("/data/data/org.ruboto.sl4a/files", "/sdcard/")
    }

    #[test]
    fn metadata() {
        assert_eq!(Jruby.extension(), ".rb");
        assert_eq!(Jruby.name(), "jruby");
        assert_eq!(Jruby.nice_name(), "JRuby");
        assert!(!Jruby.has_interpreter_archive());
        assert!(Jruby.has_extras_archive());
        assert!(Jruby.has_scripts_archive());
        assert!(Jruby.has_interactive_mode());
    }

    // Verify the version split
    //
    // Interpreter and extras share the descriptor version, scripts are
    // versioned independently.
    #[test]
    fn versions() {
        assert_eq!(Jruby.version(), 3);
        assert_eq!(Jruby.interpreter_version(), Jruby.version());
        assert_eq!(Jruby.extras_version(), Jruby.version());
        assert_eq!(Jruby.scripts_version(), 1);
    }

    #[test]
    fn archive_urls() {
        assert_eq!(Jruby.archive_name(ArchiveKind::Interpreter), "jruby.zip");
        assert_eq!(Jruby.archive_name(ArchiveKind::Extras), "jruby_extras.zip");
        assert_eq!(Jruby.archive_name(ArchiveKind::Scripts), "jruby_scripts.zip");

        for kind in ArchiveKind::ALL {
            assert_eq!(
                Jruby.archive_url(kind),
                format!("{}{}", BASE_INSTALL_URL, Jruby.archive_name(kind)),
            );
        }

        assert_eq!(
            Jruby.archive_url(ArchiveKind::Extras),
            "https://github.com/ruboto/sl4a_jruby_interpreter/raw/master/jruby-version-builder/current/jruby_extras.zip",
        );
    }

    // Verify the shared-storage branch
    //
    // JRuby has extras but no interpreter archive, so its extras are always
    // placed on shared storage, ignoring the install root.
    #[test]
    fn extras_path_shared_storage() {
        let path = Jruby.resolve_extras_path(
            std::path::Path::new("/data/data/org.ruboto.sl4a/files"),
            "/sdcard/",
        );

        assert_eq!(path, std::path::Path::new("/sdcard/org.ruboto.sl4a/extras/jruby"));
        assert_eq!(Jruby.extras_path(&context()), path);
    }

    #[test]
    fn binary() {
        assert_eq!(Jruby.binary(&context()), std::path::Path::new("/system/bin/dalvikvm"));
        assert_eq!(
            Jruby.binary(&LaunchContext::new("/elsewhere", "/mnt/")),
            Jruby.binary(&context()),
        );
    }

    #[test]
    fn arguments() {
        let args = launch_arguments(std::path::Path::new("/data/jruby"));

        assert_eq!(
            args,
            vec![
                "-Xbootclasspath:/system/framework/core.jar",
                "-Xss128k",
                "-classpath",
                "/data/jruby/jruby.jar",
                "org.jruby.Main",
                "-X-C",
            ],
        );

        let args = Jruby.arguments(&context());
        assert_eq!(args.len(), 6);
        assert_eq!(args[3], "/sdcard/org.ruboto.sl4a/extras/jruby/jruby.jar");
    }

    #[test]
    fn script_command_literal() {
        assert_eq!(
            script_command(std::path::Path::new("/data/jruby"), "/sdcard/foo.rb"),
            "-e $LOAD_PATH.push('file:/data/jruby/jruby.jar!/META-INF/jruby.home/lib/ruby/1.8'); require 'android'; load('/sdcard/foo.rb')",
        );
    }

    // Verify the commands share their prefix
    //
    // Interactive and script commands must only differ in the trailing body,
    // and both must embed the same jar path.
    #[test]
    fn commands_share_prefix() {
        let extras = std::path::Path::new("/data/jruby");
        let interactive = interactive_command(extras);
        let script = script_command(extras, "/sdcard/foo.rb");
        let prefix = "-e $LOAD_PATH.push('file:/data/jruby/jruby.jar!/META-INF/jruby.home/lib/ruby/1.8'); require 'android'; ";

        assert_eq!(interactive.strip_prefix(prefix), Some(INTERACTIVE_BODY));
        assert_eq!(script.strip_prefix(prefix), Some("load('/sdcard/foo.rb')"));
    }

    #[test]
    fn environment() {
        let env = Jruby.environment_variables(&context());

        assert_eq!(env.len(), 1);
        assert_eq!(env.get("ANDROID_DATA").map(String::as_str), Some("/sdcard/org.ruboto.sl4a"));
    }

    // Verify idempotence
    //
    // Every query is a pure function of the context, so repeated calls must
    // yield identical results.
    #[test]
    fn idempotence() {
        let context = context();

        assert_eq!(Jruby.launch_spec(&context), Jruby.launch_spec(&context));
        assert_eq!(Jruby.interactive_command(&context), Jruby.interactive_command(&context));
        assert_eq!(
            Jruby.script_command(&context, "/sdcard/a.rb"),
            Jruby.script_command(&context, "/sdcard/a.rb"),
        );
    }

    #[test]
    fn lifecycle() {
        let provider = Provider;

        assert_eq!(provider.descriptor().name(), "jruby");

        let mut uninstaller = provider.uninstaller(context());
        assert_eq!(uninstaller.descriptor().name(), "jruby");
        assert_eq!(uninstaller.context(), &context());
        assert!(uninstaller.cleanup());
        assert!(uninstaller.cleanup());
    }
}

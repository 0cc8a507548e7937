//! JRuby Interpreter Integration for SL4A
//!
//! This crate registers JRuby as an interpreter of the SL4A scripting host
//! on Android. The host discovers interpreters through plugins, asks each
//! plugin for a descriptor, and then uses that descriptor to download the
//! interpreter archives, install them, and finally launch scripts or an
//! interactive shell. This crate provides the JRuby descriptor, as well as
//! the lifecycle hooks the host invokes on installation and removal.
//!
//! Model
//! -----
//!
//! The descriptor is purely declarative. It does not download, unpack, or
//! spawn anything. Every query returns a constant, a formatted string, or a
//! path derived from the launch context handed in by the host. Given the
//! same context, the descriptor always produces the same answers.
//!
//! JRuby does not ship a native interpreter archive. Instead, the JRuby jar
//! is shipped as an extras archive and executed by the Dalvik virtual
//! machine of the device. Hence, the launch specification always points at
//! `/system/bin/dalvikvm` and passes the jar via `-classpath`. Since the
//! extras of such interpreters are placed on shared storage rather than in
//! the private interpreter root, the descriptor resolves the jar relative to
//! the storage root of the host.
//!
//! The host configuration (storage root and install root) can be provided
//! via a host manifest. The manifest is a TOML-formatted file, see the
//! [manifest] module for details. The `sl4a-jruby` command-line tool reads
//! the manifest and runs the operations in [op] to visualize what the host
//! would see.
//!
//! Supported Interpreters
//! ----------------------
//!
//!  * [JRuby](interpreter::jruby)

pub mod manifest;

/// Plugin Operations
///
/// The `op` module is a collection of all operations that can be performed via
/// the command-line interface. Each operation is implemented in a submodule
/// and can be used independently.
pub mod op {
    pub mod describe;
    pub mod launch;
    pub mod uninstall;
}

/// Interpreter Integration
///
/// The `interpreter` module contains the host contract every interpreter
/// plugin implements, and the descriptors of the interpreters provided by
/// this crate.
pub mod interpreter {
    pub mod descriptor;
    pub mod jruby;
    pub mod lifecycle;

    /// Interpreter Identifier
    ///
    /// This enum is an enumeration of supported interpreters. It implements
    /// `FromStr` to allow creation from string representation. Use `as_str()`
    /// to get a static string-representation back.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum Id {
        Jruby,
    }

    impl Id {
        /// Get string representation
        ///
        /// Return the string representation of the interpreter identifier.
        /// This is guaranteed to be parsable by the `FromStr` implementation,
        /// and matches the name reported by the respective descriptor.
        pub fn as_str(&self) -> &'static str {
            match self {
                Id::Jruby => "jruby",
            }
        }

        /// Get provider
        ///
        /// Return the lifecycle provider of the interpreter. The provider
        /// hands out fresh descriptors on every request.
        pub fn provider(&self) -> Box<dyn lifecycle::Provider> {
            match self {
                Id::Jruby => Box::new(jruby::Provider),
            }
        }
    }

    // Parse interpreter identifiers from strings
    //
    // This implements `FromStr` to allow using `std::str::parse()` and thus
    // get interpreter identifiers from their respective string
    // representation. Note that this uses case-insensitive matching.
    impl std::str::FromStr for Id {
        type Err = ();

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            if s.eq_ignore_ascii_case("jruby") {
                Ok(Self::Jruby)
            } else {
                Err(())
            }
        }
    }

}

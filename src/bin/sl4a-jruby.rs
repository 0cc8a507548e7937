//! SL4A JRuby Tooling
//!
//! This is the entry-point of `sl4a-jruby`, a command-line tool to inspect
//! what the SL4A host sees of the JRuby interpreter plugin. Its optional
//! input is a host manifest describing the host environment. The tool runs
//! the plugin operations against that environment and prints the results
//! as JSON.
//!
//! This CLI is mainly a dispatcher of all the operations available in
//! `sl4a_jruby::op::*`. It is a simple clap-based CLI that forwards the
//! arguments to `sl4a_jruby` and visualizes the results.

use clap;
use serde;
use serde_json;
use sl4a_jruby;
use tracing;
use tracing_subscriber;

struct Cli {
    cmd: clap::Command,
}

fn arg_mode(
    s: &str,
) -> Result<String, clap::error::Error> {
    if s.eq_ignore_ascii_case("interactive") || s.eq_ignore_ascii_case("script") {
        Ok(s.to_ascii_lowercase())
    } else {
        Err(
            clap::error::Error::raw(
                clap::error::ErrorKind::ValueValidation,
                "Invalid launch mode, expected 'interactive' or 'script'",
            )
        )
    }
}

// Install the log subscriber
//
// Logs go to STDERR, so STDOUT only carries the JSON output. `RUST_LOG`
// takes precedence over the verbosity flag.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), u8> {
    match serde_json::to_string_pretty(value) {
        Ok(v) => {
            println!("{}", v);
            Ok(())
        },
        Err(e) => {
            eprintln!("Cannot serialize result: {}", e);
            Err(1)
        },
    }
}

impl Cli {
    fn new() -> Self {
        let mut cmd;

        cmd = clap::Command::new("sl4a-jruby")
            .propagate_version(true)
            .subcommand_required(true)
            .about("SL4A JRuby Tooling")
            .long_about("Inspect the JRuby interpreter plugin of SL4A")
            .version(clap::crate_version!());

        cmd = cmd.arg(
            clap::Arg::new("manifest")
                .long("manifest")
                .value_name("PATH")
                .help("Path to the host manifest relative to the working directory")
                .value_parser(clap::builder::ValueParser::os_string())
        );

        cmd = cmd.arg(
            clap::Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Enable debug logging")
                .action(clap::ArgAction::SetTrue)
        );

        cmd = cmd.subcommand(
            clap::Command::new("describe")
                .about("Show interpreter metadata and archives")
        );

        cmd = cmd.subcommand(
            clap::Command::new("launch")
                .about("Show the launch specification of the interpreter")
                .arg(
                    clap::Arg::new("mode")
                        .long("mode")
                        .value_name("MODE")
                        .help("Launch mode, either 'interactive' or 'script'")
                        .default_value("interactive")
                        .value_parser(arg_mode)
                )
                .arg(
                    clap::Arg::new("script")
                        .long("script")
                        .value_name("PATH")
                        .help("Path of the script to run in script mode")
                )
        );

        cmd = cmd.subcommand(
            clap::Command::new("uninstall")
                .about("Run the interpreter cleanup hook")
        );

        Self {
            cmd: cmd,
        }
    }

    fn manifest(
        &self,
        m: &clap::ArgMatches,
    ) -> Result<sl4a_jruby::manifest::Manifest, u8> {
        let Some(manifest_path) = m.get_one::<std::ffi::OsString>("manifest") else {
            tracing::debug!("no host manifest given, using host defaults");
            return Ok(sl4a_jruby::manifest::Manifest::default());
        };

        match sl4a_jruby::manifest::Manifest::parse_path(
            std::path::Path::new(manifest_path)
        ) {
            Err(e) => {
                eprintln!("Cannot parse host manifest {:?}: {}", manifest_path, e);
                Err(1)
            },
            Ok(v) => {
                Ok(v)
            },
        }
    }

    fn op_describe(
        &self,
        m: &clap::ArgMatches,
    ) -> Result<(), u8> {
        let manifest = self.manifest(m)?;

        print_json(&sl4a_jruby::op::describe::describe(&manifest))
    }

    fn op_launch(
        &self,
        m: &clap::ArgMatches,
        m_op: &clap::ArgMatches,
    ) -> Result<(), u8> {
        let manifest = self.manifest(m)?;
        let mode = m_op.get_one::<String>("mode").expect("Mode-flag lacks a value");
        let script = m_op.get_one::<String>("script").cloned();

        let mode = match sl4a_jruby::op::launch::Mode::from_args(mode, script) {
            Some(Ok(v)) => v,
            Some(Err(e)) => {
                eprintln!("Invalid launch arguments: {}", e);
                return Err(2);
            },
            None => std::unreachable!(),
        };

        match sl4a_jruby::op::launch::launch(&manifest, mode) {
            Err(e) => {
                eprintln!("Cannot resolve interpreter launch: {}", e);
                Err(1)
            },
            Ok(v) => {
                print_json(&v)
            },
        }
    }

    fn op_uninstall(
        &self,
        m: &clap::ArgMatches,
    ) -> Result<(), u8> {
        let manifest = self.manifest(m)?;
        let report = sl4a_jruby::op::uninstall::uninstall(&manifest);

        print_json(&report)?;
        if report.cleaned {
            Ok(())
        } else {
            Err(1)
        }
    }

    fn run(mut self) -> Result<(), u8> {
        let (m, r);

        r = self.cmd.try_get_matches_from_mut(
            std::env::args_os(),
        );

        match r {
            Ok(v) => m = v,
            Err(e) => {
                return match e.kind() {
                    clap::error::ErrorKind::DisplayHelp |
                    clap::error::ErrorKind::DisplayVersion => {
                        e.print().expect("Cannot write to STDERR");
                        Ok(())
                    },
                    _ => {
                        e.print().expect("Cannot write to STDERR");
                        Err(2)
                    }
                }
            }
        }

        init_logging(m.get_flag("verbose"));

        match m.subcommand() {
            Some(("describe", _)) => self.op_describe(&m),
            Some(("launch", m_op)) => self.op_launch(&m, m_op),
            Some(("uninstall", _)) => self.op_uninstall(&m),
            _ => std::unreachable!(),
        }
    }
}

fn main() -> std::process::ExitCode {
    match Cli::new().run() {
        Ok(()) => 0.into(),
        Err(v) => v.into(),
    }
}

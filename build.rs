// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Common flag: report without changing anything
fn dry_run_arg(what: &str) -> Arg {
    Arg::new("dry_run")
        .short('n')
        .long("dry-run")
        .action(ArgAction::SetTrue)
        .help(format!("Only report what would be {what}"))
}

/// Common flag: partially installed selection
fn partial_arg() -> Arg {
    Arg::new("partial")
        .short('p')
        .long("partial")
        .action(ArgAction::SetTrue)
        .help("Partially installed modules or packages")
}

fn build_cli() -> Command {
    Command::new("bpm")
        .version(env!("CARGO_PKG_VERSION"))
        .author("bpm Contributors")
        .about("Installer for modular source-library collections")
        .subcommand_required(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .global(true)
                .help("More output (repeatable)"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .action(ArgAction::Count)
                .global(true)
                .help("Less output (repeatable)"),
        )
        .arg(
            Arg::new("root")
                .short('C')
                .long("root")
                .value_name("DIR")
                .default_value(".")
                .global(true)
                .help("Working root"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .global(true)
                .help("Configuration file (default: bpm.conf in the working root)"),
        )
        .subcommand(
            Command::new("install")
                .about("Install modules and their dependencies")
                .arg(dry_run_arg("installed"))
                .arg(
                    Arg::new("no_deps")
                        .long("no-deps")
                        .action(ArgAction::SetTrue)
                        .help("Do not install dependencies"),
                )
                .arg(
                    Arg::new("keep")
                        .short('k')
                        .long("keep")
                        .action(ArgAction::SetTrue)
                        .help("Do not remove partial installations on error"),
                )
                .arg(
                    Arg::new("all")
                        .short('a')
                        .long("all")
                        .action(ArgAction::SetTrue)
                        .help("All modules"),
                )
                .arg(
                    Arg::new("installed")
                        .short('i')
                        .long("installed")
                        .action(ArgAction::SetTrue)
                        .help("Modules that are already installed"),
                )
                .arg(partial_arg())
                .arg(Arg::new("modules").num_args(0..).help("Modules to install")),
        )
        .subcommand(
            Command::new("remove")
                .about("Remove packages")
                .arg(dry_run_arg("removed"))
                .arg(
                    Arg::new("force")
                        .short('f')
                        .long("force")
                        .action(ArgAction::SetTrue)
                        .help("Remove even when installed packages depend on these"),
                )
                .arg(
                    Arg::new("dependents")
                        .short('d')
                        .long("dependents")
                        .action(ArgAction::SetTrue)
                        .help("Remove dependents as well; requires -f unless -n"),
                )
                .arg(
                    Arg::new("all")
                        .short('a')
                        .long("all")
                        .action(ArgAction::SetTrue)
                        .help("All packages; requires -f unless -n"),
                )
                .arg(partial_arg())
                .arg(Arg::new("packages").num_args(0..).help("Packages to remove")),
        )
        .subcommand(
            Command::new("list")
                .about("List modules")
                .arg(
                    Arg::new("all")
                        .short('a')
                        .long("all")
                        .action(ArgAction::SetTrue)
                        .help("All modules (default without -b)"),
                )
                .arg(
                    Arg::new("installed")
                        .short('i')
                        .long("installed")
                        .action(ArgAction::SetTrue)
                        .help("Installed modules (default with -b)"),
                )
                .arg(partial_arg())
                .arg(
                    Arg::new("buildable")
                        .short('b')
                        .long("buildable")
                        .action(ArgAction::SetTrue)
                        .help("Modules that require building"),
                )
                .arg(Arg::new("prefix").help("Only modules whose name starts with this")),
        )
        .subcommand(Command::new("headers").about("Recreate the unified include tree"))
        .subcommand(Command::new("index").about("Recreate index.html"))
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("bpm.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}

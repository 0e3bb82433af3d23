// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Common argument: app name
fn app_arg() -> Arg {
    Arg::new("app").required(true).help("App name")
}

fn build_cli() -> Command {
    Command::new("pkgapp")
        .version(env!("CARGO_PKG_VERSION"))
        .author("pkgapp Contributors")
        .about("Keep package-app status in sync with the system package manager")
        .arg(
            Arg::new("dir")
                .short('d')
                .long("dir")
                .value_name("PATH")
                .global(true)
                .help("App store directory (PI_APPS_DIR)"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .global(true)
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Enable debug logging"),
        )
        .subcommand_required(true)
        .subcommand(
            Command::new("refresh")
                .about("Refresh the status of one package app, or of every package app")
                .arg(Arg::new("app").help("App to refresh (all package apps when omitted)"))
                .arg(
                    Arg::new("package")
                        .long("package")
                        .requires("app")
                        .help("Check this package instead of the app's packages file"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the result as JSON"),
                ),
        )
        .subcommand(Command::new("status").about("Show an app's status").arg(app_arg()))
        .subcommand(
            Command::new("set-status")
                .about("Write an app's status")
                .arg(app_arg())
                .arg(
                    Arg::new("status")
                        .required(true)
                        .value_parser(["installed", "uninstalled", "disabled", "corrupted"])
                        .help("New status"),
                ),
        )
        .subcommand(
            Command::new("list").about("List apps").arg(
                Arg::new("filter")
                    .default_value("local")
                    .value_parser([
                        "local",
                        "package",
                        "standard",
                        "installed",
                        "uninstalled",
                        "disabled",
                        "corrupted",
                        "have-status",
                        "hidden",
                        "visible",
                    ])
                    .help("Filter"),
            ),
        )
        .subcommand(
            Command::new("category")
                .about("Category management")
                .subcommand_required(true)
                .subcommand(Command::new("get").about("Show an app's effective category").arg(app_arg()))
                .subcommand(
                    Command::new("set")
                        .about("Move an app to a category")
                        .arg(app_arg())
                        .arg(Arg::new("category").required(true).help("Category name")),
                )
                .subcommand(
                    Command::new("apps")
                        .about("List the apps in a category")
                        .arg(Arg::new("category").required(true).help("Category name")),
                ),
        )
        .subcommand(
            Command::new("required-packages")
                .about("Show the packages that installing a package app would pull in")
                .arg(app_arg()),
        )
        .subcommand(
            Command::new("query")
                .about("Show whether packages are installed and available")
                .arg(
                    Arg::new("packages")
                        .required(true)
                        .num_args(1..)
                        .help("Package names"),
                ),
        )
        .subcommand(
            Command::new("ping")
                .about("Send an analytics ping and wait for it to be attempted")
                .arg(app_arg())
                .arg(
                    Arg::new("trigger")
                        .required(true)
                        .value_parser(["install", "uninstall"])
                        .help("Trigger"),
                ),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completion scripts")
                .arg(
                    Arg::new("shell")
                        .required(true)
                        .value_parser(["bash", "zsh", "fish", "powershell", "elvish"])
                        .help("Shell type"),
                ),
        )
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

    let man_path = man_dir.join("pkgapp.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}

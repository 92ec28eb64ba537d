//! bindfs-plan CLI
//!
//! Entry point for the `bindfs-plan` command-line tool.

use bindfs_plan::config::{
    load_layer, merge_layers, ConfigLayer, LayerDefaults, LayerOrigin, LayerSource, LoadedLayer,
};
use bindfs_plan::install::DryRunInstaller;
use bindfs_plan::plan::{PlanError, Planner};
use bindfs_plan::validate::{AccountDatabase, Collaborators, LocalFilesystem, ValidationError};
use bindfs_plan::{logging, OptionSet, OptionValue, ToolVersion, ValidationCheck};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "bindfs-plan")]
#[command(about = "Merge layered bindfs folder declarations into mount plans", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge, validate and print the mount plan
    Plan {
        /// Global layer file
        #[arg(long)]
        global: Option<PathBuf>,

        /// Box layer file
        #[arg(long = "box")]
        box_layer: Option<PathBuf>,

        /// Project layer file
        #[arg(long)]
        project: Option<PathBuf>,

        /// Enable debug output
        #[arg(long)]
        debug: bool,

        /// Build bindfs from source
        #[arg(long)]
        install_from_source: bool,

        /// bindfs version ("latest" or e.g. 1.14.1)
        #[arg(long)]
        tool_version: Option<ToolVersion>,

        /// Skip a validation check (source_path, user, group, ownership)
        #[arg(long = "skip")]
        skip: Vec<ValidationCheck>,

        /// passwd file used to resolve user names
        #[arg(long, default_value = "/etc/passwd")]
        passwd: PathBuf,

        /// group file used to resolve group names
        #[arg(long, default_value = "/etc/group")]
        group_file: PathBuf,

        /// Package name the dry-run installer reports as available
        #[arg(long)]
        package: Option<String>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,

        /// Also write the JSON plan to this file
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Compile KEY=VALUE options into bindfs arguments
    Options {
        /// Layer the pairs over the baseline defaults
        #[arg(long)]
        defaults: bool,

        /// Options such as create_as_user=true or user=vagrant
        #[arg(required = true)]
        pairs: Vec<String>,
    },

    /// List known bindfs options and their aliases
    Catalog,

    /// Print the built-in layer defaults as JSON
    Defaults,
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Plan {
            global,
            box_layer,
            project,
            debug,
            install_from_source,
            tool_version,
            skip,
            passwd,
            group_file,
            package,
            json,
            output,
        } => {
            let files = [
                (LayerOrigin::Global, global),
                (LayerOrigin::Box, box_layer),
                (LayerOrigin::Project, project),
            ];
            let cli_layer = match build_cli_layer(debug, install_from_source, tool_version, &skip) {
                Ok(layer) => layer,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    process::exit(1);
                }
            };
            run_plan(&files, cli_layer, &passwd, &group_file, package, json, output);
        }
        Commands::Options { defaults, pairs } => run_options(defaults, &pairs),
        Commands::Catalog => run_catalog(),
        Commands::Defaults => run_defaults(),
    }
}

fn build_cli_layer(
    debug: bool,
    install_from_source: bool,
    tool_version: Option<ToolVersion>,
    skip: &[ValidationCheck],
) -> Result<ConfigLayer, bindfs_plan::config::LayerError> {
    let mut layer = ConfigLayer::for_origin(LayerOrigin::Cli);
    // Flags only switch things on; leave unset otherwise so files decide.
    if debug {
        layer.set_debug(true)?;
    }
    if install_from_source {
        layer.set_install_from_source(true)?;
    }
    if let Some(version) = tool_version {
        layer.set_tool_version(version)?;
    }
    for check in skip {
        layer.skip_validation(*check)?;
    }
    Ok(layer)
}

fn run_plan(
    files: &[(LayerOrigin, Option<PathBuf>)],
    cli_layer: ConfigLayer,
    passwd: &Path,
    group_file: &Path,
    package: Option<String>,
    json: bool,
    output: Option<PathBuf>,
) {
    let mut layers = Vec::new();
    for (origin, path) in files {
        if let Some(path) = path {
            match load_layer(path, *origin) {
                Ok(loaded) => layers.push(loaded),
                Err(e) => {
                    eprintln!("Error loading layer: {}", e);
                    process::exit(1);
                }
            }
        }
    }
    layers.push(LoadedLayer {
        source: LayerSource::in_memory(LayerOrigin::Cli),
        layer: cli_layer,
    });

    let debug = merge_layers(layers.iter().map(|l| &l.layer)).debug();
    if let Err(e) = logging::init(logging::level_for(debug)) {
        eprintln!("Error installing logger: {}", e);
        process::exit(1);
    }

    let users = load_accounts(passwd);
    let groups = load_accounts(group_file);
    let filesystem = LocalFilesystem;
    let installer = DryRunInstaller { package };

    let planner = Planner::new(Collaborators {
        filesystem: &filesystem,
        users: &users,
        groups: &groups,
    })
    .with_installer(&installer);

    match planner.plan(&layers) {
        Ok(plan) => {
            if let Some(path) = output {
                if let Err(e) = plan.write_to_file(&path) {
                    eprintln!("Error writing {}: {}", path.display(), e);
                    process::exit(1);
                }
            }
            if json {
                match plan.to_json() {
                    Ok(out) => println!("{}", out),
                    Err(e) => {
                        eprintln!("Error serializing output: {}", e);
                        process::exit(1);
                    }
                }
            } else {
                print!("{}", plan.to_human());
            }
        }
        Err(PlanError::Validation(ValidationError::Invalid(report))) => {
            if json {
                match serde_json::to_string_pretty(&report) {
                    Ok(out) => println!("{}", out),
                    Err(e) => eprintln!("Error serializing output: {}", e),
                }
            } else {
                eprint!("{}", report.to_human());
            }
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn load_accounts(path: &Path) -> AccountDatabase {
    match AccountDatabase::from_file(path) {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Error reading {}: {}", path.display(), e);
            process::exit(1);
        }
    }
}

fn parse_pair(pair: &str) -> Result<(String, OptionValue), String> {
    let (key, raw) = pair
        .split_once('=')
        .ok_or_else(|| format!("Expected KEY=VALUE, got '{}'", pair))?;

    let value = match raw {
        "true" => OptionValue::Bool(true),
        "false" => OptionValue::Bool(false),
        _ => match raw.parse::<i64>() {
            Ok(i) => OptionValue::Integer(i),
            Err(_) => OptionValue::String(raw.to_string()),
        },
    };
    Ok((key.trim().to_string(), value))
}

fn run_options(defaults: bool, pairs: &[String]) {
    let parsed: Result<Vec<_>, String> = pairs.iter().map(|p| parse_pair(p)).collect();
    let parsed = match parsed {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let options = match OptionSet::from_pairs(parsed) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let options = if defaults {
        LayerDefaults::options().merge(&options)
    } else {
        options
    };

    for token in options.to_tokens() {
        println!("{}", token);
    }
}

fn run_catalog() {
    for def in bindfs_options::definitions() {
        if def.aliases.is_empty() {
            println!("{:<24} {}", def.name, def.kind.as_str());
        } else {
            println!(
                "{:<24} {:<6} aliases: {}",
                def.name,
                def.kind.as_str(),
                def.aliases.join(", ")
            );
        }
    }
}

fn run_defaults() {
    match serde_json::to_string_pretty(&LayerDefaults::default()) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            process::exit(1);
        }
    }
}

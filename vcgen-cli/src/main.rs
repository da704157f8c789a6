use clap::{ArgAction, ArgMatches, Command, command};
use clap_complete::{Shell, generate};
use std::io;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;
use vcgen::{VsVersion, WorkspaceDescription};
use vcgen_cli::summary::Summary;
use vcgen_cli::ux;

#[macro_use]
extern crate clap;

const DESCRIPTION: &str = "DESCRIPTION";

fn main() {
    let app = build_cli();
    let matches = app.get_matches();
    init_logging(matches.get_count("verbose"));

    let result = match matches.subcommand() {
        Some(("generate", cmd)) => generate_workspace(cmd),
        Some(("guid", cmd)) => {
            print_guid(cmd);
            Ok(())
        }
        Some(("completion", cmd)) => {
            print_completions(cmd);
            Ok(())
        }
        _ => Ok(()),
    };

    if let Err(e) = result {
        ux::print_error_title("Generation failed:");
        eprintln!("{e:?}");
        std::process::exit(exitcode::DATAERR);
    }
}

fn init_logging(verbosity: u8) {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(log_filter(verbosity, env.as_deref()))
        .init();
}

/// `RUST_LOG` wins when set and valid. Otherwise `-v` raises the default `warn` to `debug`
fn log_filter(verbosity: u8, env: Option<&str>) -> EnvFilter {
    if let Some(filter) = env
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
    {
        return filter;
    }
    let level = if verbosity == 0 {
        tracing::Level::WARN
    } else {
        tracing::Level::DEBUG
    };
    EnvFilter::default().add_directive(level.into())
}

fn generate_workspace(cmd: &ArgMatches) -> miette::Result<()> {
    let Some(path) = cmd.get_one::<String>(DESCRIPTION) else {
        return Ok(());
    };
    let now = Instant::now();

    let file = std::fs::File::open(path)
        .map_err(vcgen::Error::from)
        .map_err(|e| miette::Report::new(e).wrap_err(format!("Failed to read {path}")))?;
    let mut description = WorkspaceDescription::from_reader(file)?;
    if let Some(version) = cmd.get_one::<VsVersion>("version") {
        description.version = *version;
    }
    let workspace = description.into_workspace()?;

    let out_dir = vcgen_cli::output_dir(path, cmd.get_one::<String>("output").map(String::as_str));
    let mut summary = Summary::new(&workspace);
    if !cmd.get_flag("dry-run") {
        summary.add_written(vcgen::write_workspace(&workspace, &out_dir)?);
    }

    if cmd.get_flag("json") {
        let json = summary
            .to_json(cmd.get_flag("pretty"))
            .map_err(vcgen::Error::from)?;
        println!("{json}");
        return Ok(());
    }

    ux::print_path(path);
    println!();
    print!("{summary}");

    let duration = u64::try_from(now.elapsed().as_millis()).unwrap_or(u64::MAX);
    let duration = Duration::from_millis(duration);
    println!("{:>2} {}", "elapsed:", humantime::format_duration(duration));
    Ok(())
}

fn print_guid(cmd: &ArgMatches) {
    if let (Some(path), Some(name)) = (cmd.get_one::<String>("PATH"), cmd.get_one::<String>("NAME")) {
        println!("{}", vcgen::guid::generate(path, name));
    }
}

fn print_completions(matches: &ArgMatches) {
    let mut cmd = build_cli();
    let bin_name = cmd.get_name().to_string();
    if let Some(generator) = matches.get_one::<Shell>("generator") {
        generate(*generator, &mut cmd, bin_name, &mut io::stdout());
    }
}

fn build_cli() -> Command {
    command!(crate_name!())
        .arg_required_else_help(true)
        .version(crate_version!())
        .author(crate_authors!("\n"))
        .about(crate_description!())
        .arg(
            arg!(-v --verbose ...)
                .global(true)
                .help("Increases logging verbosity. Repeat for more details"),
        )
        .subcommand(
            Command::new("generate")
                .aliases(["g", "gen"])
                .about("Generates solution and projects from workspace description")
                .arg(
                    arg!([DESCRIPTION])
                        .help("Sets workspace description (JSON) path")
                        .required(true),
                )
                .arg(
                    arg!(-o --output <DIR>)
                        .required(false)
                        .help("Output directory. Description's directory by default"),
                )
                .arg(
                    arg!(--version <VS>)
                        .required(false)
                        .value_parser(value_parser!(VsVersion))
                        .help("Overrides Visual Studio version of the description, i.e. 9.0 or 17"),
                )
                .arg(
                    arg!(-n --"dry-run")
                        .required(false)
                        .action(ArgAction::SetTrue)
                        .help("Validate description and show what would be generated without writing files"),
                )
                .arg(
                    arg!(-j --json)
                        .required(false)
                        .action(ArgAction::SetTrue)
                        .help("Output projects as JSON instead of table"),
                )
                .arg(
                    arg!(-p --pretty)
                        .required(false)
                        .requires("json")
                        .action(ArgAction::SetTrue)
                        .help("Pretty print JSON"),
                ),
        )
        .subcommand(
            Command::new("guid")
                .about("Prints identifier generated for the path and the name specified")
                .arg(arg!([PATH]).help("Project or solution path").required(true))
                .arg(arg!([NAME]).help("Project or filter name").required(true)),
        )
        .subcommand(
            Command::new("completion")
                .about("Generate the autocompletion script for the specified shell")
                .arg(
                    arg!([generator])
                        .value_parser(value_parser!(Shell))
                        .required(true)
                        .index(1),
                ),
        )
}

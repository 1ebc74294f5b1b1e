use clap::{crate_version, App, AppSettings, Arg, ArgMatches, SubCommand};
use dssb::build::{self, build_site};
use dssb::config::Config;
use dssb::exit;
use dssb::scaffold;
use log::LevelFilter;
use simple_logger::SimpleLogger;
use std::path::{Path, PathBuf};
use std::process;

fn main() {
    let matches = App::new("dssb")
        .version(crate_version!())
        .about("A dead simple static site builder")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .global(true)
                .help("Log every file read and written"),
        )
        .subcommand(
            SubCommand::with_name("init")
                .about("initialize a new site in a new folder")
                .arg(
                    Arg::with_name("site_name")
                        .required(true)
                        .help("name of new site directory to create"),
                ),
        )
        .subcommand(
            SubCommand::with_name("build")
                .about("build a site given a folder")
                .arg(
                    Arg::with_name("dir")
                        .short("d")
                        .long("dir")
                        .value_name("site_dir")
                        .default_value(".")
                        .help("location of site folder (defaults to current folder)"),
                )
                .arg(
                    Arg::with_name("clean")
                        .long("clean")
                        .help("delete the build directory before building"),
                ),
        )
        .subcommand(
            SubCommand::with_name("page")
                .about("create a new generic markdown page")
                .arg(
                    Arg::with_name("page_name")
                        .required(true)
                        .help("name of new page to create. Use a markdown (.md) extension."),
                ),
        )
        .subcommand(
            SubCommand::with_name("post")
                .about("create a new blog post markdown page")
                .arg(
                    Arg::with_name("post_name")
                        .required(true)
                        .help("name of new post to create. Use a markdown (.md) extension."),
                ),
        )
        .get_matches();

    init_logging(&matches);

    let code = match matches.subcommand() {
        ("init", Some(sub)) => init(sub),
        ("build", Some(sub)) => build(sub),
        ("page", Some(sub)) => page(sub),
        ("post", Some(sub)) => post(sub),
        _ => {
            eprintln!("[E] Command not recognized. Use either init, build, page, or post.");
            exit::USAGE
        }
    };
    process::exit(code);
}

fn init_logging(matches: &ArgMatches) {
    let verbose = matches.is_present("verbose")
        || matches
            .subcommand()
            .1
            .map_or(false, |sub| sub.is_present("verbose"));
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let _ = SimpleLogger::new()
        .with_level(level)
        .without_timestamps()
        .init();
}

fn cwd() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

fn init(matches: &ArgMatches) -> i32 {
    let name = matches.value_of("site_name").unwrap_or_default();
    match scaffold::new_site(&cwd(), name) {
        Ok(_) => {
            println!(
                "Initialized new site {}.\nTo build, run the following command:\ndssb build -d {}",
                name, name
            );
            exit::SUCCESS
        }
        Err(e) => {
            log::error!("Aborted initializing new site: {}", e);
            e.exit_code()
        }
    }
}

fn build(matches: &ArgMatches) -> i32 {
    let dir = Path::new(matches.value_of("dir").unwrap_or("."));
    let config = match Config::from_directory(dir) {
        Ok(config) => config,
        Err(e) => {
            log::error!("Aborted building site: {:#}", e);
            return exit::CONFIG;
        }
    };

    let result = if matches.is_present("clean") {
        build::clean(&config).and_then(|_| build_site(&config))
    } else {
        build_site(&config)
    };

    match result {
        Ok(report) => {
            if !report.skipped.is_empty() {
                log::warn!("Skipped {} content file(s):", report.skipped.len());
                for skipped in report.skipped.iter() {
                    log::warn!("  {}: {}", skipped.file_name, skipped.reason);
                }
            }
            log::info!(
                "{} posts, {} pages, {} tags, {} static files",
                report.posts,
                report.pages,
                report.tags,
                report.static_files
            );
            println!(
                "Finished building {}.\nContents in '{}'.\nTo test locally run the following:",
                config.site_name,
                report.output_directory.display()
            );
            println!(
                "python3 -m http.server --directory {}",
                report.output_directory.display()
            );
            exit::SUCCESS
        }
        Err(e) => {
            log::error!("Aborted building site: {}", e);
            e.exit_code()
        }
    }
}

fn page(matches: &ArgMatches) -> i32 {
    let name = matches.value_of("page_name").unwrap_or_default();
    report_new_file(name, scaffold::new_page(&cwd().join(name)))
}

fn post(matches: &ArgMatches) -> i32 {
    let name = matches.value_of("post_name").unwrap_or_default();
    let today = chrono::Local::now().date_naive();
    report_new_file(name, scaffold::new_post(&cwd().join(name), today))
}

fn report_new_file(name: &str, result: scaffold::Result<()>) -> i32 {
    match result {
        Ok(()) => {
            println!("Created {}", name);
            exit::SUCCESS
        }
        Err(e) => {
            log::error!("Aborted creating {}: {}", name, e);
            e.exit_code()
        }
    }
}

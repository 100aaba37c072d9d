extern crate clap;
extern crate env_logger;
extern crate fs_history;
extern crate glob;

use clap::{App, Arg, ArgMatches, SubCommand};
use fs_history::history_db::{HistoryDB, HistoryDBError, PathFilter, VersionFilter};
use fs_history::observer;
use std::error::Error;
use std::process;

type CmdResult = Result<(), Box<dyn Error>>;

fn main() {
    env_logger::init();

    let location_arg = Arg::with_name("location")
        .long("location")
        .short("l")
        .help("Only include entries in this parent directory.")
        .takes_value(true);
    let name_arg = Arg::with_name("name")
        .long("name")
        .short("n")
        .help("Only include entries with this name.")
        .takes_value(true);

    let setup_cmd = SubCommand::with_name("setup")
        .about("creates the history relations (safe to run on an existing database)");
    let drop_cmd = SubCommand::with_name("drop")
        .about("drops the history relations including ALL recorded history");
    let optimize_cmd = SubCommand::with_name("optimize")
        .about("optimizes the underlying SQLite database (can save space after purging paths)");

    let observe_cmd = SubCommand::with_name("observe")
        .about("records a new version for every filesystem entry matching the given patterns")
        .arg(
            Arg::with_name("PATTERN")
                .required(true)
                .multiple(true)
                .help("Paths or glob patterns of the entries to observe"),
        );

    let paths_cmd = SubCommand::with_name("paths")
        .about("lists tracked paths")
        .arg(location_arg.clone())
        .arg(name_arg.clone());
    let versions_cmd = SubCommand::with_name("versions")
        .about("lists recorded versions")
        .arg(
            Arg::with_name("path-id")
                .long("path-id")
                .short("p")
                .help("Only include versions of the path with this id.")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("version")
                .long("version")
                .short("v")
                .help("Only include versions with this number.")
                .takes_value(true),
        );
    let history_cmd = SubCommand::with_name("history")
        .about("lists the full history (paths joined with their versions)")
        .arg(location_arg)
        .arg(name_arg);

    let purge_cmd = SubCommand::with_name("purge")
        .about("removes a tracked path together with its complete history")
        .arg(Arg::with_name("LOCATION").required(true).index(1))
        .arg(Arg::with_name("NAME").required(true).index(2));

    let db_path_arg = Arg::with_name("DB_PATH")
        .required(true)
        .index(1)
        .help("Path of the history database file (created if missing)");
    let cli = App::new("FsHistory")
        .version(env!("CARGO_PKG_VERSION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about("Records the metadata history of filesystem entries")
        .arg(db_path_arg)
        .subcommand(setup_cmd)
        .subcommand(drop_cmd)
        .subcommand(optimize_cmd)
        .subcommand(observe_cmd)
        .subcommand(paths_cmd)
        .subcommand(versions_cmd)
        .subcommand(history_cmd)
        .subcommand(purge_cmd)
        .get_matches();

    let db_path = cli.value_of("DB_PATH").unwrap_or_default();
    let result = match cli.subcommand() {
        ("setup", Some(_)) => open_history_db(db_path).and_then(|db| setup(&db, db_path)),
        ("drop", Some(_)) => open_history_db(db_path).and_then(|db| drop_all(&db)),
        ("optimize", Some(_)) => open_history_db(db_path).and_then(|db| optimize(&db)),
        ("observe", Some(cmd_cli)) => open_history_db(db_path).and_then(|db| observe(&db, cmd_cli)),
        ("paths", Some(cmd_cli)) => open_history_db(db_path).and_then(|db| list_paths(&db, cmd_cli)),
        ("versions", Some(cmd_cli)) => {
            open_history_db(db_path).and_then(|db| list_versions(&db, cmd_cli))
        }
        ("history", Some(cmd_cli)) => {
            open_history_db(db_path).and_then(|db| list_history(&db, cmd_cli))
        }
        ("purge", Some(cmd_cli)) => open_history_db(db_path).and_then(|db| purge(&db, cmd_cli)),
        _ => {
            println!("Please specify the command you want to perform on the history database.");
            println!("See --help for more information.");
            Ok(())
        }
    };

    if let Err(error) = result {
        eprintln!("{}", error);
        process::exit(1);
    }
}

fn open_history_db(db_path: &str) -> Result<HistoryDB, Box<dyn Error>> {
    Ok(HistoryDB::open(db_path)?)
}

fn path_filter(cmd_cli: &ArgMatches) -> PathFilter {
    PathFilter {
        location: cmd_cli.value_of("location").map(String::from),
        name: cmd_cli.value_of("name").map(String::from),
    }
}

fn parse_id(cmd_cli: &ArgMatches, arg: &str) -> Result<Option<i64>, Box<dyn Error>> {
    match cmd_cli.value_of(arg) {
        Some(value) => Ok(Some(value.parse::<i64>()?)),
        None => Ok(None),
    }
}

fn setup(history_db: &HistoryDB, db_path: &str) -> CmdResult {
    history_db.setup()?;
    println!("History database at '{}' is ready.", db_path);
    Ok(())
}

fn drop_all(history_db: &HistoryDB) -> CmdResult {
    history_db.drop_all()?;
    println!("Dropped all recorded history.");
    Ok(())
}

fn optimize(history_db: &HistoryDB) -> CmdResult {
    println!("Optimizing database file...");
    history_db.optimize()?;
    println!("Optimization done!");
    Ok(())
}

fn observe(history_db: &HistoryDB, cmd_cli: &ArgMatches) -> CmdResult {
    for pattern in cmd_cli.values_of("PATTERN").into_iter().flatten() {
        let mut matched = false;
        for fs_path in glob::glob(pattern)? {
            matched = true;
            let (entry, observation) = observer::observe(fs_path?)?;
            let (path, version) = history_db.upsert_version(
                &entry.location,
                &entry.name,
                &observation.to_attributes()?,
            )?;
            println!("{} v{}", path, version.version_no);
        }
        if !matched {
            eprintln!("No entries match '{}'.", pattern);
        }
    }
    Ok(())
}

fn list_paths(history_db: &HistoryDB, cmd_cli: &ArgMatches) -> CmdResult {
    for path in history_db.list_paths(path_filter(cmd_cli)) {
        let path = path?;
        println!("{}\t{}", path.id, path);
    }
    Ok(())
}

fn list_versions(history_db: &HistoryDB, cmd_cli: &ArgMatches) -> CmdResult {
    let filter = VersionFilter {
        path_id: parse_id(cmd_cli, "path-id")?,
        version_no: parse_id(cmd_cli, "version")?,
    };
    for version in history_db.list_versions(filter) {
        let version = version?;
        println!(
            "{}\tv{}\t{}",
            version.path_id, version.version_no, version.attrs
        );
    }
    Ok(())
}

fn list_history(history_db: &HistoryDB, cmd_cli: &ArgMatches) -> CmdResult {
    for entry in history_db.list_history(path_filter(cmd_cli)) {
        let entry = entry?;
        println!(
            "{}\tv{}\t{}",
            entry.path, entry.version.version_no, entry.version.attrs
        );
    }
    Ok(())
}

fn purge(history_db: &HistoryDB, cmd_cli: &ArgMatches) -> CmdResult {
    let location = cmd_cli.value_of("LOCATION").unwrap_or_default();
    let name = cmd_cli.value_of("NAME").unwrap_or_default();

    match history_db.find_path(location, name)? {
        Some(path) => {
            history_db.delete_path(path.id)?;
            println!("Purged '{}' and its history.", path);
            Ok(())
        }
        None => Err(HistoryDBError::NotFound.into()),
    }
}

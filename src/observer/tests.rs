use super::*;
use std::io::Write;

fn create_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    let mut file = fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

#[test]
fn split_paths_into_location_and_name() {
    let entry = EntryPath::from_path("/some/dir/file.txt").unwrap();
    assert_eq!(entry.location, "/some/dir");
    assert_eq!(entry.name, "file.txt");
    assert_eq!(entry.to_path_buf(), PathBuf::from("/some/dir/file.txt"));

    let entry = EntryPath::from_path("/top").unwrap();
    assert_eq!(entry.location, "/");
    assert_eq!(entry.name, "top");

    let entry = EntryPath::from_path("/").unwrap();
    assert_eq!(entry.location, "");
    assert_eq!(entry.name, "/");
}

#[test]
fn dot_components_resolve_to_the_same_entry() {
    let plain = EntryPath::from_path("/tmp").unwrap();
    assert_eq!(EntryPath::from_path("/tmp/x/..").unwrap(), plain);
    assert_eq!(EntryPath::from_path("/tmp/./x/../.").unwrap(), plain);
    assert_eq!(EntryPath::from_path("/tmp/x/../").unwrap(), plain);

    let entry = EntryPath::from_path("/some/./dir/../file.txt").unwrap();
    assert_eq!(entry.location, "/some");
    assert_eq!(entry.name, "file.txt");

    // Never climbs above the root.
    let entry = EntryPath::from_path("/../..").unwrap();
    assert_eq!(entry.location, "");
    assert_eq!(entry.name, "/");

    let working_dir = env::current_dir().unwrap();
    assert_eq!(
        EntryPath::from_path(".").unwrap(),
        EntryPath::from_path(&working_dir).unwrap()
    );
    if let Some(parent) = working_dir.parent() {
        assert_eq!(
            EntryPath::from_path("..").unwrap(),
            EntryPath::from_path(parent).unwrap()
        );
    }
}

#[test]
fn relative_paths_resolve_against_working_dir() {
    let entry = EntryPath::from_path("file.txt").unwrap();
    let working_dir = env::current_dir().unwrap();
    assert_eq!(entry.location, working_dir.to_str().unwrap());
    assert_eq!(entry.name, "file.txt");
}

#[test]
fn observe_files() {
    let test_dir = tempfile::tempdir().unwrap();
    let path = create_file(test_dir.path(), "a.txt", "abc");

    let (entry, observation) = observe(&path).unwrap();
    assert_eq!(entry.name, "a.txt");
    assert_eq!(observation.entry_type, EntryType::File);
    assert_eq!(observation.size, 3);
    assert!(observation.mod_time.is_some());
    // sha256("abc")
    assert_eq!(
        observation.hash.as_ref().unwrap(),
        "BA7816BF8F01CFEA414140DE5DAE2223B00361A396177A9CB410FF61F20015AD"
    );

    let attrs = observation.to_attributes().unwrap();
    let value = attrs.as_value();
    assert_eq!(value["entry_type"], "file");
    assert_eq!(value["size"], 3);
    assert_eq!(value["read_only"], false);
}

#[test]
fn observe_directories_without_hash() {
    let test_dir = tempfile::tempdir().unwrap();
    let sub_dir = test_dir.path().join("sub");
    fs::create_dir(&sub_dir).unwrap();

    let (entry, observation) = observe(&sub_dir).unwrap();
    assert_eq!(entry.name, "sub");
    assert_eq!(observation.entry_type, EntryType::Directory);
    assert_eq!(observation.hash, None);
    assert!(observation.to_attributes().unwrap().as_value().get("hash").is_none());
}

#[test]
fn changed_content_changes_the_observation() {
    let test_dir = tempfile::tempdir().unwrap();
    let path = create_file(test_dir.path(), "a.txt", "abc");
    let (_, first) = observe(&path).unwrap();

    create_file(test_dir.path(), "a.txt", "abcd");
    let (_, second) = observe(&path).unwrap();

    assert_ne!(first.hash, second.hash);
    assert_eq!(second.size, 4);
}

#[test]
fn report_missing_entries() {
    let test_dir = tempfile::tempdir().unwrap();

    match observe(test_dir.path().join("missing")) {
        Err(ref error) if error.is_io_not_found() => (),
        _ => panic!("Must report missing entries as not found!"),
    }
}

#[test]
fn mod_time_matches_the_filesystem() {
    let test_dir = tempfile::tempdir().unwrap();
    let path = create_file(test_dir.path(), "a.txt", "abc");
    let mod_time = FileTime::from_unix_time(1_600_000_000, 500);
    filetime::set_file_mtime(&path, mod_time).unwrap();

    let (_, observation) = observe(&path).unwrap();
    let recorded = observation.mod_time.unwrap().and_utc();
    assert_eq!(recorded.timestamp(), 1_600_000_000);
    assert_eq!(recorded.timestamp_subsec_nanos(), 500);
}

#[test]
fn serialization_errors_keep_their_source() {
    use std::error::Error;

    let error: ObserverError = serde_json::from_str::<serde_json::Value>("{")
        .unwrap_err()
        .into();
    match error {
        ObserverError::Serialization { .. } => assert!(error.source().is_some()),
        _ => panic!("JSON failures must be reported as serialization errors!"),
    }
}

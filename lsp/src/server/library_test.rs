use tempfile::TempDir;

use super::library::LibraryIndex;

#[test]
fn indexes_sibling_scripts() {
    let dir = TempDir::new().unwrap();
    let lib = dir.path().join("lib");
    std::fs::create_dir(&lib).unwrap();
    std::fs::write(lib.join("deploy.pps"), "def rollout(env) {\n  return env\n}\n").unwrap();
    std::fs::write(lib.join("notes.txt"), "ignored").unwrap();

    let index = LibraryIndex::build(dir.path(), "lib");

    let (path, loc) = index.find_method("rollout").expect("rollout indexed");
    assert!(path.ends_with("deploy.pps"));
    assert_eq!((loc.line, loc.column), (0, 4));

    assert!(index.script("deploy").is_some());
    assert!(index.find_method("missing").is_none());
}

#[test]
fn class_methods_are_indexed_without_constructors() {
    let dir = TempDir::new().unwrap();
    let lib = dir.path().join("lib");
    std::fs::create_dir(&lib).unwrap();
    std::fs::write(
        lib.join("tools.pps"),
        "class Tools {\n  Tools() { }\n  def sweep() { }\n}\n",
    )
    .unwrap();

    let index = LibraryIndex::build(dir.path(), "lib");
    assert!(index.find_method("sweep").is_some());
    assert!(index.find_method("Tools").is_none());
}

#[test]
fn missing_directory_yields_empty_index() {
    let dir = TempDir::new().unwrap();
    let index = LibraryIndex::build(dir.path(), "lib");
    assert!(index.find_method("anything").is_none());
}

use super::*;

fn assets() -> tempfile::TempDir {
    let tmp = tempfile::tempdir().unwrap();
    let art = tmp.path().join("artwork");
    std::fs::create_dir_all(art.join("fonts")).unwrap();
    std::fs::write(art.join("intro.svg"), "<svg/>").unwrap();
    std::fs::write(art.join("fonts").join("a.ttf"), b"font").unwrap();
    std::fs::create_dir_all(art.join(".frames")).unwrap();
    std::fs::write(art.join(".gen.svg"), "<svg/>").unwrap();
    tmp
}

#[test]
fn acquire_copies_the_tree_without_scratch_files() {
    let src = assets();
    let ws = Workspace::acquire(&src.path().join("artwork")).unwrap();

    assert!(ws.path().ends_with("artwork"));
    assert!(ws.path().starts_with(ws.temp_dir()));
    assert_eq!(
        std::fs::read_to_string(ws.path().join("intro.svg")).unwrap(),
        "<svg/>"
    );
    assert!(ws.path().join("fonts").join("a.ttf").is_file());
    assert!(!ws.path().join(".frames").exists());
    assert!(!ws.path().join(".gen.svg").exists());
}

#[test]
fn workspaces_are_private_and_removed_on_drop() {
    let src = assets();
    let a = Workspace::acquire(&src.path().join("artwork")).unwrap();
    let b = Workspace::acquire(&src.path().join("artwork")).unwrap();
    assert_ne!(a.path(), b.path());

    std::fs::write(a.path().join("intro.svg"), "changed").unwrap();
    assert_eq!(
        std::fs::read_to_string(b.path().join("intro.svg")).unwrap(),
        "<svg/>"
    );

    let a_dir = a.temp_dir().to_path_buf();
    drop(a);
    assert!(!a_dir.exists());

    let b_dir = b.temp_dir().to_path_buf();
    b.release().unwrap();
    assert!(!b_dir.exists());
}

#[test]
fn missing_asset_directory_is_a_config_error() {
    let tmp = tempfile::tempdir().unwrap();
    let err = Workspace::acquire(&tmp.path().join("nope")).unwrap_err();
    assert!(err.to_string().contains("does not exist"));
}

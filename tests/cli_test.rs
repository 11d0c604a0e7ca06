use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn run_cursa(cwd: &Path, home: &Path, install: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cursa"))
        .args(args)
        .current_dir(cwd)
        .env("CURSA_HOME", home)
        .env("CURSA_PATH", install)
        .env("RUST_LOG", "info")
        .output()
        .expect("Failed to execute cursa")
}

fn setup() -> (TempDir, std::path::PathBuf, std::path::PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let home = dir.path().join("cursa");
    let install = dir.path().join("install");
    fs::create_dir_all(&home).expect("Failed to create home");
    fs::create_dir_all(&install).expect("Failed to create install dir");
    for name in cursa::resources::BASE_CSS
        .iter()
        .chain(cursa::resources::BASE_JS.iter())
    {
        fs::write(install.join(name), "").expect("Failed to write asset");
    }
    (dir, home, install)
}

#[test]
fn test_scaffold_module_and_topic() {
    let (_dir, home, install) = setup();

    let output = run_cursa(&home, &home, &install, &["scaffold", "m1", "-t", "Module One"]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "scaffold failed: {}", stderr);
    assert!(stderr.contains("Scaffold completed"));

    let module = home.join("m1");
    let metadata = fs::read_to_string(module.join("index.yaml")).expect("Failed to read metadata");
    assert!(metadata.contains("Module One"));
    assert!(module.join("assets").join("css").join("cursa.css").is_file());

    let output = run_cursa(&module.join("topics"), &home, &install, &["scaffold", "t1", "--rich"]);
    assert!(output.status.success());
    assert!(module.join("topics").join("t1").join("media").is_dir());
}

#[test]
fn test_scaffold_in_wrong_folder_fails() {
    let (_dir, home, install) = setup();
    let elsewhere = home.join("m1").join("notes");
    fs::create_dir_all(&elsewhere).expect("Failed to create folder");

    let output = run_cursa(&elsewhere, &home, &install, &["scaffold", "x"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error while attempting scaffold"));
    assert!(stderr.contains("Please move to a valid folder"));
}

#[test]
fn test_build_outside_course_fails() {
    let (dir, home, install) = setup();

    let output = run_cursa(dir.path(), &home, &install, &["build"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error while attempting build"));
    assert!(stderr.contains("index.yaml"));
}

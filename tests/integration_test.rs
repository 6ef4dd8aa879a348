use assert_cmd::Command;
use assert_cmd::cargo;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

/// Install a gem into `root`: a spec file plus the listed files under its gem directory.
fn install_gem(root: &Path, name: &str, version: &str, deps: &[(&str, &str)], files: &[&str]) {
    let full_name = format!("{}-{}", name, version);

    let spec_dir = root.join("specifications");
    fs::create_dir_all(&spec_dir).unwrap();
    let dependencies: serde_json::Map<String, serde_json::Value> = deps
        .iter()
        .map(|(n, r)| (n.to_string(), serde_json::Value::from(*r)))
        .collect();
    let spec = serde_json::json!({
        "name": name,
        "version": version,
        "dependencies": dependencies,
    });
    fs::write(
        spec_dir.join(format!("{}.json", full_name)),
        serde_json::to_string_pretty(&spec).unwrap(),
    )
    .unwrap();

    let gem_dir = root.join("gems").join(&full_name);
    for file in files {
        let path = gem_dir.join(file);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, format!("# {}\n", full_name)).unwrap();
    }
}

fn gemlazy(root: &Path) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("gemlazy"));
    cmd.arg("--root")
        .arg(root)
        .env_remove("GEMLAZY_LOAD_PATH")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_list_installed_gems() {
    let root_dir = tempdir().unwrap();
    let root = root_dir.path();
    install_gem(root, "b", "10", &[], &["lib/b.rb"]);
    install_gem(root, "b", "9", &[], &["lib/b.rb"]);
    install_gem(root, "a", "1", &[("b", ">= 1")], &["lib/a.rb"]);

    gemlazy(root)
        .arg("list")
        .assert()
        .success()
        .stdout("a-1\nb-9\nb-10\n");
}

#[test]
fn test_list_empty_root() {
    let root_dir = tempdir().unwrap();

    gemlazy(root_dir.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No gems installed."));
}

#[test]
fn test_list_skips_malformed_spec() {
    let root_dir = tempdir().unwrap();
    let root = root_dir.path();
    install_gem(root, "b", "1", &[], &["lib/b.rb"]);
    fs::write(root.join("specifications").join("broken-1.json"), "{not json").unwrap();

    gemlazy(root)
        .arg("list")
        .assert()
        .success()
        .stdout("b-1\n")
        .stderr(predicate::str::contains("broken-1.json"));
}

#[test]
fn test_which_lists_providers() {
    let root_dir = tempdir().unwrap();
    let root = root_dir.path();
    install_gem(root, "b", "1", &[], &["lib/ib.rb"]);
    install_gem(root, "x", "1", &[], &["lib/ib.rb"]);
    install_gem(root, "c", "1", &[], &["lib/c.rb"]);

    gemlazy(root)
        .args(["which", "ib.rb"])
        .assert()
        .success()
        .stdout("b-1\nx-1\n");

    gemlazy(root)
        .args(["which", "nothing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No installed gem provides nothing"));
}

#[test]
fn test_require_resolves_lazily() {
    let root_dir = tempdir().unwrap();
    let root = root_dir.path();
    install_gem(root, "a", "1", &[("b", ">= 1")], &["lib/a.rb"]);
    install_gem(root, "b", "1", &[], &["lib/b/c.rb"]);
    install_gem(root, "b", "2", &[], &["lib/b/c.rb"]);

    gemlazy(root)
        .args(["require", "--activate", "a-1", "b/c", "b/c.rb"])
        .assert()
        .success()
        .stdout("loaded b/c\nalready loaded b/c.rb\nactive a-1\nactive b-2\n");
}

#[test]
fn test_require_leaves_unneeded_dependencies_pending() {
    let root_dir = tempdir().unwrap();
    let root = root_dir.path();
    install_gem(root, "a", "1", &[("b", ">= 1")], &["lib/a.rb"]);
    install_gem(root, "b", "1", &[], &["lib/b/c.rb"]);
    install_gem(root, "b", "2", &[], &["lib/b/c.rb"]);

    gemlazy(root)
        .args(["require", "--activate", "a-1", "a"])
        .assert()
        .success()
        .stdout("loaded a\nactive a-1\npending b (>= 1)\n");
}

#[test]
fn test_require_with_gem_requirement() {
    let root_dir = tempdir().unwrap();
    let root = root_dir.path();
    install_gem(root, "b", "1", &[], &["lib/b/c.rb"]);
    install_gem(root, "b", "2", &[], &["lib/b/c.rb"]);

    gemlazy(root)
        .args(["require", "--gem", "b:< 2", "b/c"])
        .assert()
        .success()
        .stdout("loaded b/c\nactive b-1\n");
}

#[test]
fn test_require_falls_back_to_include_dirs() {
    let root_dir = tempdir().unwrap();
    let root = root_dir.path();
    install_gem(root, "a", "1", &[("b", ">= 1")], &["lib/a.rb"]);
    install_gem(root, "b", "1", &[], &["lib/benchmark.rb"]);
    install_gem(root, "b", "2", &[], &["lib/benchmark.rb"]);

    let site_dir = tempdir().unwrap();
    fs::write(site_dir.path().join("json.rb"), "").unwrap();

    gemlazy(root)
        .arg("-I")
        .arg(site_dir.path())
        .args(["require", "--activate", "a-1", "json"])
        .assert()
        .success()
        .stdout("loaded json\nactive a-1\npending b (>= 1)\n");
}

#[test]
fn test_require_ambiguous_path_fails() {
    let root_dir = tempdir().unwrap();
    let root = root_dir.path();
    install_gem(root, "a", "1", &[("b", "> 0"), ("x", "> 0")], &["lib/a.rb"]);
    install_gem(root, "b", "1", &[], &["lib/ib.rb"]);
    install_gem(root, "b", "2", &[], &["lib/ib.rb"]);
    install_gem(root, "x", "1", &[], &["lib/ib.rb"]);
    install_gem(root, "x", "2", &[], &["lib/ib.rb"]);

    gemlazy(root)
        .args(["require", "--activate", "a-1", "ib"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("ib found in multiple gems: b, x"));
}

#[test]
fn test_require_conflict_fails() {
    let root_dir = tempdir().unwrap();
    let root = root_dir.path();
    install_gem(root, "c", "1", &[], &["lib/c.rb"]);
    install_gem(root, "c", "2", &[], &["lib/c.rb"]);

    gemlazy(root)
        .args(["require", "--activate", "c-1", "--activate", "c-2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "can't activate c-2, already activated c-1",
        ));
}

#[test]
fn test_require_missing_file_fails() {
    let root_dir = tempdir().unwrap();

    gemlazy(root_dir.path())
        .args(["require", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot load such file -- nope"));
}

// SPDX-License-Identifier: MIT

use super::*;
use tempfile::TempDir;

fn fake_home() -> TempDir {
    let home = TempDir::new().unwrap();
    let claude = home.path().join(".claude");
    std::fs::create_dir_all(&claude).unwrap();
    std::fs::write(claude.join("settings.json"), "{}").unwrap();
    std::fs::write(claude.join("mcp.json"), "{}").unwrap();
    std::fs::create_dir_all(claude.join("statsig")).unwrap();
    std::fs::write(home.path().join(".claude.json"), "{}").unwrap();
    home
}

#[test]
fn setup_symlinks_shared_files_and_creates_mutable_dirs() {
    let home = fake_home();
    let repo = TempDir::new().unwrap();
    std::fs::create_dir_all(repo.path().join(".loom")).unwrap();

    let config_dir =
        setup_agent_config_dir_with_home("builder-1", repo.path(), home.path()).unwrap();

    assert!(config_dir.join("settings.json").is_symlink());
    assert!(config_dir.join("mcp.json").is_symlink());
    assert!(config_dir.join(".claude.json").is_symlink());
    assert!(config_dir.join("statsig").is_symlink());
    assert!(!config_dir.join("config.json").exists());

    for dirname in MUTABLE_DIRS {
        assert!(config_dir.join(dirname).is_dir(), "missing mutable dir {dirname}");
    }
}

#[test]
fn setup_is_idempotent() {
    let home = fake_home();
    let repo = TempDir::new().unwrap();
    std::fs::create_dir_all(repo.path().join(".loom")).unwrap();

    let first = setup_agent_config_dir_with_home("builder-1", repo.path(), home.path()).unwrap();
    let second = setup_agent_config_dir_with_home("builder-1", repo.path(), home.path()).unwrap();
    assert_eq!(first, second);
    assert!(first.join("settings.json").is_symlink());
}

#[test]
fn setup_prefers_dot_claude_config_json_state_file_when_present() {
    let home = fake_home();
    std::fs::write(home.path().join(".claude").join(".config.json"), "{}").unwrap();
    let repo = TempDir::new().unwrap();
    std::fs::create_dir_all(repo.path().join(".loom")).unwrap();

    let config_dir =
        setup_agent_config_dir_with_home("builder-1", repo.path(), home.path()).unwrap();
    let target = std::fs::read_link(config_dir.join(".claude.json")).unwrap();
    assert_eq!(target, home.path().join(".claude").join(".config.json"));
}

#[test]
fn cleanup_agent_config_dir_removes_directory() {
    let home = fake_home();
    let repo = TempDir::new().unwrap();
    std::fs::create_dir_all(repo.path().join(".loom")).unwrap();
    setup_agent_config_dir_with_home("builder-1", repo.path(), home.path()).unwrap();

    assert!(cleanup_agent_config_dir("builder-1", repo.path()).unwrap());
    assert!(!cleanup_agent_config_dir("builder-1", repo.path()).unwrap());
}

#[test]
fn cleanup_all_agent_config_dirs_removes_every_agent() {
    let home = fake_home();
    let repo = TempDir::new().unwrap();
    std::fs::create_dir_all(repo.path().join(".loom")).unwrap();
    setup_agent_config_dir_with_home("builder-1", repo.path(), home.path()).unwrap();
    setup_agent_config_dir_with_home("shepherd-2", repo.path(), home.path()).unwrap();

    let removed = cleanup_all_agent_config_dirs(repo.path()).unwrap();
    assert_eq!(removed, 2);
    assert_eq!(cleanup_all_agent_config_dirs(repo.path()).unwrap(), 0);
}

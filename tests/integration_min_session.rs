// Drives the compiled binary through a PTY so the real event loop and
// crossterm input handling run end to end.
//
// Requires a pseudo terminal, so it is Unix-only and ignored by default.
// Run manually via: `cargo test --test integration_min_session -- --ignored`.

#![cfg(unix)]

use std::time::Duration;

use expectrl::{spawn, Eof};

#[test]
#[ignore]
fn word_chain_session_starts_and_exits() -> Result<(), Box<dyn std::error::Error>> {
    let home = tempfile::tempdir()?;
    let bin = assert_cmd::cargo::cargo_bin("mindplay");
    let cmd = format!(
        "env HOME={} {} word-chain --theme fruits",
        home.path().display(),
        bin.display()
    );

    let mut p = spawn(cmd)?;
    std::thread::sleep(Duration::from_millis(200));

    p.send("apple\r")?;
    std::thread::sleep(Duration::from_millis(200));

    p.send("\x1b")?; // ESC
    p.expect(Eof)?;
    Ok(())
}

#[test]
fn levels_lists_every_level() {
    let home = tempfile::tempdir().unwrap();
    let output = assert_cmd::Command::cargo_bin("mindplay")
        .unwrap()
        .env("HOME", home.path())
        .env("XDG_DATA_HOME", home.path().join("data"))
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .arg("levels")
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 11);
    assert!(stdout.lines().nth(1).unwrap().contains("open"));
    assert!(stdout.lines().nth(2).unwrap().contains("locked"));
}

use std::path::PathBuf;
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before unix epoch")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("fgl-{prefix}-{}-{nanos}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn fgl(args: &[&str], cwd: &PathBuf) -> Output {
    Command::new(env!("CARGO_BIN_EXE_fgl"))
        .args(args)
        .current_dir(cwd)
        .output()
        .expect("run fgl")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn check_reports_diagnostics_with_locations() {
    let dir = unique_temp_dir("check");
    std::fs::create_dir_all(dir.join("src")).unwrap();
    std::fs::write(dir.join("src/good.4gl"), "MAIN\n  DISPLAY \"ok\"\nEND MAIN\n").unwrap();
    std::fs::write(dir.join("src/bad.4GL"), "MAIN\n  LET x = \nEND MAIN\n").unwrap();
    std::fs::write(dir.join("src/notes.txt"), "not 4gl at all )))").unwrap();

    let output = fgl(&["check", "src"], &dir);
    let text = stdout(&output);
    assert_eq!(output.status.code(), Some(1), "{text}");
    let bad = dir.join("src").join("bad.4GL");
    assert!(
        text.contains(&format!("{}:2:", PathBuf::from("src/bad.4GL").display()))
            || text.contains(&format!("{}:2:", bad.display())),
        "{text}"
    );
    assert!(text.contains(": error: unexpected "), "{text}");
    assert!(!text.contains("good.4gl:"), "{text}");
    assert!(text.contains("2 file(s) checked, 1 error(s), 0 warning(s)"), "{text}");

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn check_succeeds_on_clean_files() {
    let dir = unique_temp_dir("clean");
    std::fs::write(dir.join("a.4gl"), "FUNCTION f()\n  RETURN 1\nEND FUNCTION\n").unwrap();
    let output = fgl(&["check", "a.4gl"], &dir);
    assert!(output.status.success(), "{}", stdout(&output));
    assert!(stdout(&output).contains("1 file(s) checked, 0 error(s)"));
    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn check_continues_past_a_bad_pattern() {
    let dir = unique_temp_dir("pattern");
    std::fs::write(dir.join("a.4gl"), "MAIN\nEND MAIN\n").unwrap();
    let output = fgl(&["check", "src/[", "a.4gl"], &dir);
    let text = stdout(&output);
    assert_eq!(output.status.code(), Some(1), "{text}");
    assert!(text.contains("src/[: error: invalid pattern"), "{text}");
    assert!(text.contains("1 file(s) checked, 1 error(s), 0 warning(s)"), "{text}");
    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn check_uses_configured_extensions() {
    let dir = unique_temp_dir("config");
    std::fs::write(dir.join("fgl.toml"), "[files]\nextensions = [\"4gs\"]\n").unwrap();
    std::fs::write(dir.join("menu.4gs"), "MAIN\nEND MAIN\n").unwrap();
    std::fs::write(dir.join("main.4gl"), "MAIN\nEND MAIN\n").unwrap();
    let output = fgl(&["check", "."], &dir);
    assert!(output.status.success());
    assert!(stdout(&output).contains("1 file(s) checked"));

    let output = fgl(&["check", "--config", "missing.toml", "."], &dir);
    assert_eq!(output.status.code(), Some(2));
    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn tokens_in_both_modes() {
    let dir = unique_temp_dir("tokens");
    std::fs::write(dir.join("t.4gl"), "LET s = 'a\nb' # done\n").unwrap();

    let output = fgl(&["tokens", "t.4gl"], &dir);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("1:1 LET Keyword \"LET\""), "{text}");
    assert!(text.contains("\"'a\\nb'\""), "{text}");

    let output = fgl(&["tokens", "t.4gl", "--lines"], &dir);
    let text = stdout(&output);
    assert!(text.contains("line 1: state 0 -> 2"), "{text}");
    assert!(text.contains("line 2: state 2 -> 0"), "{text}");
    assert!(text.contains("\"'a\" incomplete"), "{text}");
    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn grammar_lists_conflicts() {
    let dir = std::env::temp_dir();
    let output = fgl(&["grammar", "--conflicts"], &dir);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("grammar:      informix-4gl"), "{text}");
    assert!(text.contains("conflicts:    27 (27 shift/reduce, 0 reduce/reduce)"), "{text}");
    assert_eq!(text.matches("shift/reduce conflict on").count(), 27);
}

use assert_cmd::cargo::cargo_bin_cmd;

fn help_output(args: &[&str]) -> String {
    let assert = cargo_bin_cmd!("pywf").args(args).assert().success();
    String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 help")
}

#[test]
fn top_level_help_groups_commands() {
    let output = help_output(&["--help"]);
    for needle in ["venv", "deps", "docs", "publish", "bump", "saas", "--dry-run"] {
        assert!(output.contains(needle), "help missing {needle}: {output}");
    }
}

#[test]
fn deps_install_help_lists_groups() {
    let output = help_output(&["deps", "install", "--help"]);
    assert!(output.contains("--only-root"), "missing --only-root: {output}");
    assert!(output.contains("--group"), "missing --group: {output}");
    assert!(output.contains("auto"), "missing automation group: {output}");
}

#[test]
fn bump_help_mentions_floors() {
    let output = help_output(&["bump", "--help"]);
    assert!(output.contains("--minor-start"), "missing --minor-start: {output}");
    assert!(output.contains("--patch-start"), "missing --patch-start: {output}");
}

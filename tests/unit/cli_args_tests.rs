//! Unit tests for CLI argument parsing

use nasbak::cli::args::{Command, parse_args};

fn args(list: &[&str]) -> Vec<String> {
    std::iter::once("nasbak")
        .chain(list.iter().copied())
        .map(String::from)
        .collect()
}

#[test]
fn test_parse_run() {
    let parsed = parse_args(&args(&["run", "/mnt/nas", "/media/usb", "--quiet"])).unwrap();
    let Command::Run(run) = parsed.command else {
        panic!("expected run command");
    };
    assert_eq!(run.source, "/mnt/nas");
    assert_eq!(run.destination, "/media/usb");
    assert!(run.quiet);
    assert!(run.config.is_none());
}

#[test]
fn test_parse_run_with_config() {
    let parsed =
        parse_args(&args(&["run", "--config", "/tmp/c.json", "/mnt/nas", "/media/usb"])).unwrap();
    let Command::Run(run) = parsed.command else {
        panic!("expected run command");
    };
    assert_eq!(run.config.as_deref(), Some("/tmp/c.json"));
    assert_eq!(run.source, "/mnt/nas");
}

#[test]
fn test_parse_plan_json() {
    let parsed = parse_args(&args(&["plan", "src", "dst", "--json"])).unwrap();
    let Command::Plan(plan) = parsed.command else {
        panic!("expected plan command");
    };
    assert_eq!((plan.source.as_str(), plan.destination.as_str()), ("src", "dst"));
    assert!(plan.json);
}

#[test]
fn test_parse_history_limit() {
    let parsed = parse_args(&args(&["history", "--limit", "5", "--json"])).unwrap();
    let Command::History(history) = parsed.command else {
        panic!("expected history command");
    };
    assert_eq!(history.limit, Some(5));
    assert!(history.json);
}

#[test]
fn test_missing_positionals() {
    assert_eq!(
        parse_args(&args(&["run"])).unwrap_err(),
        "Missing required argument: SOURCE"
    );
    assert_eq!(
        parse_args(&args(&["plan", "src"])).unwrap_err(),
        "Missing required argument: DEST"
    );
}

#[test]
fn test_rejects_bad_input() {
    assert_eq!(parse_args(&args(&[])).unwrap_err(), "No command specified");
    assert_eq!(
        parse_args(&args(&["sync"])).unwrap_err(),
        "Unknown command: sync"
    );
    assert_eq!(
        parse_args(&args(&["run", "a", "b", "c"])).unwrap_err(),
        "Unexpected argument: c"
    );
    assert_eq!(
        parse_args(&args(&["run", "a", "b", "--fast"])).unwrap_err(),
        "Unknown option: --fast"
    );
    assert_eq!(
        parse_args(&args(&["run", "a", "b", "--config"])).unwrap_err(),
        "--config requires a value"
    );
    assert_eq!(
        parse_args(&args(&["history", "--limit", "x"])).unwrap_err(),
        "--limit must be a number"
    );
    assert_eq!(
        parse_args(&args(&["history", "--limit", "0"])).unwrap_err(),
        "--limit must be greater than zero"
    );
}

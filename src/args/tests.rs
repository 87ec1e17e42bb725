use clap::Parser;

use super::MonitorArgs;

fn parse(args: &[&str]) -> Result<MonitorArgs, clap::Error> {
    let mut full = vec!["httpmon"];
    full.extend_from_slice(args);
    MonitorArgs::try_parse_from(full)
}

#[test]
fn defaults_match_the_documented_startup_configuration() -> Result<(), clap::Error> {
    let args = parse(&[])?;
    assert_eq!(args.url, None);
    assert_eq!(args.concurrency, 100);
    assert_eq!(args.timeout, 0.0);
    assert_eq!(args.thinktime, 0.0);
    assert_eq!(args.interval, 1.0);
    assert!(!args.open);
    assert_eq!(args.count, None);
    Ok(())
}

#[test]
fn all_flags_parse() -> Result<(), clap::Error> {
    let args = parse(&[
        "--url",
        "http://localhost:8080/",
        "--concurrency",
        "8",
        "--timeout",
        "2.5",
        "--thinktime",
        "0.1",
        "--interval",
        "0.5",
        "--open",
        "--count",
        "1000",
    ])?;
    assert_eq!(args.url.as_deref(), Some("http://localhost:8080/"));
    assert_eq!(args.concurrency, 8);
    assert_eq!(args.timeout, 2.5);
    assert_eq!(args.thinktime, 0.1);
    assert_eq!(args.interval, 0.5);
    assert!(args.open);
    assert_eq!(args.count, Some(1000));
    Ok(())
}

#[test]
fn negative_thinktime_is_rejected() {
    assert!(parse(&["--thinktime", "-1"]).is_err());
}

#[test]
fn zero_interval_is_rejected() {
    assert!(parse(&["--interval", "0"]).is_err());
}

#[test]
fn non_numeric_timeout_is_rejected() {
    assert!(parse(&["--timeout", "soon"]).is_err());
}

#[test]
fn negative_concurrency_is_accepted_at_startup() -> Result<(), clap::Error> {
    // No bounds validation: a negative value simply yields an empty pool.
    let args = parse(&["--concurrency", "-2"])?;
    assert_eq!(args.concurrency, -2);
    Ok(())
}

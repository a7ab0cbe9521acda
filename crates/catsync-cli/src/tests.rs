use super::*;

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["catsync"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn parses_sync_defaults() {
    let cli = Cli::try_parse_from(["catsync", "sync"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Sync(SyncArgs {
            csv: None,
            dry_run: false,
            yes: false,
            series: None,
            skip_definitions: false,
        }))
    ));
}

#[test]
fn parses_sync_flags() {
    let cli = Cli::try_parse_from([
        "catsync",
        "sync",
        "--csv",
        "sheet.csv",
        "--series",
        "8L.1001",
        "--yes",
        "--skip-definitions",
    ])
    .expect("expected valid cli args");

    match cli.command {
        Some(Commands::Sync(args)) => {
            assert_eq!(args.csv.as_deref(), Some(std::path::Path::new("sheet.csv")));
            assert_eq!(args.series.as_deref(), Some("8L.1001"));
            assert!(args.yes);
            assert!(args.skip_definitions);
            assert!(!args.dry_run);
        }
        other => panic!("expected sync command, got {other:?}"),
    }
}

#[test]
fn dry_run_conflicts_with_yes() {
    let result = Cli::try_parse_from(["catsync", "sync", "--dry-run", "--yes"]);
    assert!(result.is_err());
}

#[test]
fn parses_definitions_command() {
    let cli = Cli::try_parse_from(["catsync", "definitions"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Some(Commands::Definitions)));
}

#[test]
fn check_defaults_to_five_variants() {
    let cli = Cli::try_parse_from(["catsync", "check"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Check(CheckArgs {
            sku: None,
            first: 5,
            variant: None,
        }))
    ));
}

#[test]
fn parses_check_with_sku_and_count() {
    let cli = Cli::try_parse_from([
        "catsync",
        "check",
        "--sku",
        "8L.1001-300X3.2Z72",
        "--first",
        "10",
    ])
    .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Check(CheckArgs {
            sku: Some(ref sku),
            first: 10,
            variant: None,
        })) if sku == "8L.1001-300X3.2Z72"
    ));
}

#[test]
fn variant_conflicts_with_sku() {
    let result = Cli::try_parse_from(["catsync", "check", "--variant", "42", "--sku", "AB-1"]);
    assert!(result.is_err());
}

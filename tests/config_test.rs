use clap::Parser;
use copydesk::cli::Cli;
use copydesk::config::Settings;
use std::path::PathBuf;

#[test]
fn test_defaults_without_config_file() {
    let cli = Cli::parse_from(["copydesk", "--config", "does-not-exist.toml"]);
    let settings = Settings::new_with_cli(&cli).unwrap();

    assert_eq!(settings.server.host, "127.0.0.1");
    assert_eq!(settings.server.port, 4000);
    assert_eq!(settings.content.dir, PathBuf::from("content/json"));
    assert_eq!(
        settings.content.domains,
        ["home", "about", "packages", "testimonials", "results", "misc"]
    );
    assert_eq!(settings.repository.branch, "main");
    assert_eq!(settings.repository.base_url, "https://api.github.com");
    assert_eq!(
        settings.repository.content_base_path,
        "app/_lib/content/json"
    );
    assert_eq!(settings.repository.asset_base_path, "public");
    assert!(!settings.repository.is_configured());
    assert!(settings.deploy.hook_url.is_none());
}

#[test]
fn test_config_file_with_cli_overrides() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("copydesk.toml");
    std::fs::write(
        &config_path,
        r#"
[server]
host = "0.0.0.0"
port = 9000

[content]
domains = ["about", "home"]

[repository]
owner = "acme"
name = "tutoring-site"
branch = "production"

[deploy]
hook_url = "https://deploy.example/hook"
"#,
    )
    .unwrap();

    let cli = Cli::parse_from([
        "copydesk",
        "--config",
        config_path.to_str().unwrap(),
        "--port",
        "9100",
        "--repo-branch",
        "staging",
    ]);
    let settings = Settings::new_with_cli(&cli).unwrap();

    assert_eq!(settings.server.host, "0.0.0.0");
    // CLI wins over the file
    assert_eq!(settings.server.port, 9100);
    assert_eq!(settings.repository.branch, "staging");
    assert_eq!(settings.content.domains, ["about", "home"]);
    assert_eq!(settings.repository.owner.as_deref(), Some("acme"));
    assert_eq!(
        settings.deploy.hook_url.as_deref(),
        Some("https://deploy.example/hook")
    );
}

#[test]
fn test_unknown_domain_fails_validation() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("copydesk.toml");
    std::fs::write(
        &config_path,
        r#"
[content]
domains = ["blog"]
"#,
    )
    .unwrap();

    let cli = Cli::parse_from(["copydesk", "--config", config_path.to_str().unwrap()]);
    assert!(Settings::new_with_cli(&cli).is_err());
}

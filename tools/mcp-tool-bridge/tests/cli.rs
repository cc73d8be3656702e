use anyhow::Result;
use assert_cmd::Command;
use std::fs;
use tempfile::TempDir;

/// Binary with config discovery pointed at an empty directory and no
/// inherited bridge overrides.
fn bridge(config_dir: &TempDir) -> Result<Command> {
    let mut cmd = Command::cargo_bin("mcp-tool-bridge")?;
    cmd.env("APP_CONFIG_DIR", config_dir.path())
        .env_remove("APP_CONFIG_PROFILE")
        .env_remove("BRIDGE_AGENT_PROFILE")
        .env_remove("BRIDGE_STRICT_SCHEMAS")
        .env_remove("BRIDGE_CACHE_TOOLS_LIST")
        .env_remove("BRIDGE_HANDSHAKE_TIMEOUT_MS")
        .env("RUST_LOG", "off");
    Ok(cmd)
}

#[test]
fn help_lists_subcommands() -> Result<()> {
    let dir = TempDir::new()?;
    let output = bridge(&dir)?.arg("--help").output()?;
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for word in ["list", "call", "metrics", "--stdio", "--config"] {
        assert!(stdout.contains(word), "help is missing {word}: {stdout}");
    }
    Ok(())
}

#[test]
fn list_without_servers_is_rejected() -> Result<()> {
    let dir = TempDir::new()?;
    let output = bridge(&dir)?.arg("list").output()?;
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no tool servers configured"));
    Ok(())
}

#[test]
fn unreachable_server_fails_list_with_discovery_error() -> Result<()> {
    let dir = TempDir::new()?;
    let profile = dir.path().join("agent.json");
    fs::write(
        &profile,
        r#"{
            "systemPrompt": "You are a helpful assistant.",
            "mcpServers": [
                {"command": "mcp-tool-bridge-no-such-server", "args": ["--token", "$TOKEN"], "name": "Ghost"}
            ],
            "secrets": {"TOKEN": "s3cret"}
        }"#,
    )?;

    let output = bridge(&dir)?
        .arg("--config")
        .arg(&profile)
        .arg("list")
        .output()?;
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("tool discovery failed for server 'Ghost'"),
        "{stderr}"
    );
    Ok(())
}

#[test]
fn profile_with_blank_command_is_a_configuration_error() -> Result<()> {
    let dir = TempDir::new()?;
    let profile = dir.path().join("agent.json");
    fs::write(&profile, r#"{"mcpServers": [{"command": " ", "name": "Broken"}]}"#)?;

    let output = bridge(&dir)?
        .env("BRIDGE_AGENT_PROFILE", &profile)
        .arg("list")
        .output()?;
    assert!(!output.status.success());
    assert!(
        String::from_utf8_lossy(&output.stderr).contains("invalid tool server configuration")
    );
    Ok(())
}

#[test]
fn metrics_reports_discovery_failures() -> Result<()> {
    let dir = TempDir::new()?;
    let output = bridge(&dir)?
        .args(["--stdio", "mcp-tool-bridge-no-such-server --verbose", "metrics"])
        .output()?;
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("bridge_discovery_failures_total 1"), "{stdout}");
    assert!(String::from_utf8_lossy(&output.stderr).contains("stdio-1"));
    Ok(())
}

//! The commented config file written on first run

/// Default config file contents with explanatory comments
///
/// Must decode to exactly `Config::default()`.
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# fontdock configuration
#
# Booleans accept true/false (or "yes"/"no"). Sizes look like "10MB" or "32KB",
# durations like "10s", "500ms" or "1m30s". Run `fontdock config validate`
# after editing to see every problem at once.

config_version = "2.0"

[general]
# Editor used by `fontdock config edit` (e.g. "code", "notepad.exe", "nano").
# Empty uses $EDITOR, then the platform default.
default_editor = ""

[logging]
# $home and ~ are expanded to your home directory.
log_path = "$home/.fontdock/logs/fontdock.log"
max_log_size = "10MB"
max_log_files = 5

[network]
# Quick HTTP requests and checks.
request_timeout = "10s"
# Cancel a download if no data arrives for this long.
download_timeout = "30s"

[search]
# Maximum number of results to show; 0 means unlimited.
result_limit = 0
# Rank matches by popularity first, then alphabetically.
enable_popularity_sort = true

[update]
# Check for updates on startup.
auto_check = true
# Install updates automatically (off by default).
auto_update = false
check_interval_hours = 24
# Updated automatically after each check.
last_update_check = ""
# One of: stable, beta, nightly.
channel = "stable"

[theme]
# Theme name (e.g. "catppuccin", "gruvbox"); empty uses the built-in theme.
name = ""
# One of: auto (detect from terminal), dark, light.
mode = "auto"
"#;

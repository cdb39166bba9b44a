//! Persisted default flags.
//!
//! A flag file holds command-line tokens separated by whitespace, with `#`
//! comment lines. The global file is merged with a local `.mdv2exrc`, and
//! flags given on the command line win over both.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::convert::{ConvertOptions, HeadingSeparator, LinkMode, ParseOptionError, TableMode};

const APP_DIR: &str = "mdv2ex";
const LOCAL_FILE: &str = ".mdv2exrc";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub no_bold: bool,
    pub warnings: bool,
    pub links: Option<LinkMode>,
    pub table: Option<TableMode>,
    pub heading_separator: Option<HeadingSeparator>,
}

impl ConfigFlags {
    /// Merge two flag sets; `other` is the more specific source.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            no_bold: self.no_bold || other.no_bold,
            warnings: self.warnings || other.warnings,
            links: other.links.or(self.links),
            table: other.table.or(self.table),
            heading_separator: other.heading_separator.or(self.heading_separator),
        }
    }

    /// Resolve into conversion options, filling unset values with defaults.
    pub fn to_options(&self) -> ConvertOptions {
        let defaults = ConvertOptions::default();
        ConvertOptions {
            bold: !self.no_bold,
            links: self.links.unwrap_or(defaults.links),
            table: self.table.unwrap_or(defaults.table),
            heading_separator: self.heading_separator.unwrap_or(defaults.heading_separator),
        }
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join(APP_DIR).join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join(APP_DIR)
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join(APP_DIR).join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(".config").join(APP_DIR).join("config");
        }
    }

    PathBuf::from(LOCAL_FILE)
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(LOCAL_FILE)
}

pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = Vec::new();
    lines.push("# mdv2ex defaults (saved with --save)".to_string());
    if flags.no_bold {
        lines.push("--no-bold".to_string());
    }
    if flags.warnings {
        lines.push("--warnings".to_string());
    }
    if let Some(links) = flags.links {
        lines.push(format!("--links {links}"));
    }
    if let Some(table) = flags.table {
        lines.push(format!("--table {table}"));
    }
    if let Some(separator) = flags.heading_separator {
        lines.push(format!("--heading-separator {separator}"));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Extract known flags from a token list. Unknown tokens are skipped and
/// invalid values are logged and ignored.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        if token == "--no-bold" {
            flags.no_bold = true;
        } else if token == "--warnings" {
            flags.warnings = true;
        } else if let Some((value, consumed)) = flag_value(tokens, i, "--links") {
            flags.links = parse_value(value).or(flags.links);
            i += consumed;
        } else if let Some((value, consumed)) = flag_value(tokens, i, "--table") {
            flags.table = parse_value(value).or(flags.table);
            i += consumed;
        } else if let Some((value, consumed)) = flag_value(tokens, i, "--heading-separator") {
            flags.heading_separator = parse_value(value).or(flags.heading_separator);
            i += consumed;
        }
        i += 1;
    }
    flags
}

/// Value of `name` at `tokens[i]`, given as `name=value` or `name value`,
/// plus the number of extra tokens it took.
fn flag_value<'a>(tokens: &'a [String], i: usize, name: &str) -> Option<(&'a str, usize)> {
    let token = tokens[i].as_str();
    if token == name {
        return tokens.get(i + 1).map(|next| (next.as_str(), 1));
    }
    token
        .strip_prefix(name)
        .and_then(|rest| rest.strip_prefix('='))
        .map(|value| (value, 0))
}

fn parse_value<T>(value: &str) -> Option<T>
where
    T: FromStr<Err = ParseOptionError>,
{
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            tracing::warn!(%err, "ignoring saved flag");
            None
        }
    }
}

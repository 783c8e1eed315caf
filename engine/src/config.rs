use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use encoding_rs::Encoding;

use crate::battle::BattleConfig;
use crate::content::Catalog;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    pub fn from_path(path: &Path) -> Result<Self> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("json") => Ok(Format::Json),
            Some("yaml") | Some("yml") => Ok(Format::Yaml),
            _ => bail!(
                "cannot tell the format of '{}' (expected .json, .yaml or .yml)",
                path.display()
            ),
        }
    }
}

/// Read a text file, decoding it per its byte-order mark when one is present.
pub fn read_text_auto(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    if let Some((enc, bom_len)) = Encoding::for_bom(&bytes) {
        let (cow, _, _) = enc.decode(&bytes[bom_len..]);
        Ok(cow.into_owned())
    } else {
        String::from_utf8(bytes).with_context(|| format!("{} is not valid UTF-8", path.display()))
    }
}

/// Parse and validate a full catalog override.
pub fn parse_catalog(text: &str, format: Format) -> Result<Catalog> {
    let catalog: Catalog = match format {
        Format::Json => serde_json::from_str(text).context("failed to parse catalog JSON")?,
        Format::Yaml => serde_yaml::from_str(text).context("failed to parse catalog YAML")?,
    };
    catalog.validate().context("catalog failed validation")?;
    Ok(catalog)
}

pub fn load_catalog(path: &Path) -> Result<Catalog> {
    let format = Format::from_path(path)?;
    let text = read_text_auto(path)?;
    parse_catalog(&text, format).with_context(|| format!("in catalog file {}", path.display()))
}

pub fn parse_battle_config(text: &str, format: Format) -> Result<BattleConfig> {
    let cfg = match format {
        Format::Json => serde_json::from_str(text).context("failed to parse battle config JSON")?,
        Format::Yaml => serde_yaml::from_str(text).context("failed to parse battle config YAML")?,
    };
    Ok(cfg)
}

pub fn load_battle_config(path: &Path) -> Result<BattleConfig> {
    let format = Format::from_path(path)?;
    let text = read_text_auto(path)?;
    parse_battle_config(&text, format)
        .with_context(|| format!("in battle config file {}", path.display()))
}

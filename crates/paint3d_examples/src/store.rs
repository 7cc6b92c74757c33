use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use paint3d::options::{OptionStore, OptionValue};
use tracing::{info, warn};

/// [`OptionStore`] kept in memory and saved to a RON file on demand.
///
/// Writes through [`OptionStore::set`] (including every
/// `ToolSession::update_option`) only reach the file on the next
/// [`RonOptionStore::save`], so a burst of edits costs one write. Call
/// `save` after each UI edit to persist it immediately.
///
/// A file that cannot be parsed is treated as empty, so the session falls
/// back to defaults and overwrites it on the next save.
pub struct RonOptionStore {
    path: PathBuf,
    values: BTreeMap<String, OptionValue>,
}

impl RonOptionStore {
    pub fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let values = if path.exists() {
            let text = fs::read_to_string(&path)
                .with_context(|| format!("reading options from {}", path.display()))?;
            match ron::from_str(&text) {
                Ok(values) => values,
                Err(err) => {
                    warn!("Ignoring unreadable options file {}: {}", path.display(), err);
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, values })
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let text = ron::ser::to_string_pretty(&self.values, ron::ser::PrettyConfig::default())
            .map_err(|e| anyhow::anyhow!(e))?;
        fs::write(&self.path, text)
            .with_context(|| format!("writing options to {}", self.path.display()))?;
        info!("Saved {} option(s) to {}.", self.values.len(), self.path.display());
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl OptionStore for RonOptionStore {
    fn get(&self, name: &str) -> Option<OptionValue> {
        self.values.get(name).copied()
    }

    fn set(&mut self, name: &str, value: OptionValue) {
        self.values.insert(name.to_string(), value);
    }
}

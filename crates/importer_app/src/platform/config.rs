use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use importer_core::ImportConfig;
use importer_engine::AtomicFileWriter;
use importer_logging::{importer_info, importer_warn};

/// Reads the run switches from a RON file.
///
/// A missing file yields the defaults, which are then written to `path` so
/// they can be edited for the next run. A file that does not parse is an error.
pub(crate) fn load_config(path: &Path) -> Result<ImportConfig> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            importer_info!("No config at {:?}, using defaults", path);
            let config = ImportConfig::default();
            save_config(path, &config);
            return Ok(config);
        }
        Err(err) => {
            return Err(err).with_context(|| format!("reading config {}", path.display()));
        }
    };

    let config: ImportConfig =
        ron::from_str(&content).with_context(|| format!("parsing config {}", path.display()))?;
    importer_info!("Loaded config from {:?}", path);
    Ok(config)
}

fn save_config(path: &Path, config: &ImportConfig) {
    let Some(filename) = path.file_name().and_then(|name| name.to_str()) else {
        importer_warn!("Config path {:?} has no file name, not saving defaults", path);
        return;
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let pretty = ron::ser::PrettyConfig::new();
    let content = match ron::ser::to_string_pretty(config, pretty) {
        Ok(text) => text,
        Err(err) => {
            importer_warn!("Failed to serialize default config: {}", err);
            return;
        }
    };

    let writer = AtomicFileWriter::new(dir);
    match writer.write(filename, content.as_bytes()) {
        Ok(written) => importer_info!("Wrote default config to {:?}", written),
        Err(err) => importer_warn!("Failed to write default config to {:?}: {}", path, err),
    }
}

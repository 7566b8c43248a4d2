use crate::error::DisplayError;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// Decoded RGBA button icon
#[derive(Debug, Clone)]
pub struct Icon {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl Icon {
    pub fn new(name: impl Into<String>, width: u32, height: u32, rgba: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            rgba,
        }
    }

    /// Decode a PNG; the icon is named after the file stem
    pub fn load(path: &Path) -> Result<Self, DisplayError> {
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .ok_or_else(|| DisplayError::Icon {
                path: path.display().to_string(),
                details: "Missing file name".to_string(),
            })?;

        let image = image::open(path)
            .map_err(|e| DisplayError::Icon {
                path: path.display().to_string(),
                details: e.to_string(),
            })?
            .to_rgba8();

        Ok(Self::new(name, image.width(), image.height(), image.into_raw()))
    }
}

/// Icons by name, loaded once at startup
#[derive(Debug, Clone, Default)]
pub struct IconSet {
    icons: HashMap<String, Icon>,
}

impl IconSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_icons(icons: impl IntoIterator<Item = Icon>) -> Self {
        Self {
            icons: icons
                .into_iter()
                .map(|icon| (icon.name.clone(), icon))
                .collect(),
        }
    }

    /// Load every *.png in `dir`. Unreadable files are skipped.
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Icon directory {} unavailable: {}", dir.display(), e);
                return Self::new();
            }
        };

        let mut icons = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            let is_png = path
                .extension()
                .map(|ext| ext.eq_ignore_ascii_case("png"))
                .unwrap_or(false);
            if !is_png {
                continue;
            }

            match Icon::load(&path) {
                Ok(icon) => {
                    debug!("Loaded icon '{}' ({}x{})", icon.name, icon.width, icon.height);
                    icons.push(icon);
                }
                Err(e) => warn!("Skipping icon: {}", e),
            }
        }

        let set = Self::from_icons(icons);
        info!("Loaded {} icons from {}", set.len(), dir.display());
        set
    }

    pub fn get(&self, name: &str) -> Option<&Icon> {
        self.icons.get(name)
    }

    pub fn len(&self) -> usize {
        self.icons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }
}

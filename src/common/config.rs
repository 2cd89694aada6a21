use std::path::{Path, PathBuf};

/// Editor constants plus where files live on disk.
///
/// Binaries start from [`Settings::default`] and override individual fields from the
/// command line.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    /// Circumradius of a hex in world units
    pub hex_size: f64,
    /// Scale multiplier applied per zoom step
    pub zoom_step: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Extra cells drawn around the visible rectangle
    pub render_margin: i32,
    /// Brush selected at startup, when the registry has it
    pub default_brush: String,
    /// Directory relative image and data paths resolve against
    pub base_dir: PathBuf,
    pub terrains_file: String,
    pub map_file: String,
    pub characters_file: String,
    pub export_file: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            hex_size: 30.,
            zoom_step: 1.1,
            min_zoom: 0.1,
            max_zoom: 5.0,
            render_margin: 2,
            default_brush: "1".to_owned(),
            base_dir: PathBuf::from("."),
            terrains_file: "terrains.json".to_owned(),
            map_file: "map_data.json".to_owned(),
            characters_file: "characters.json".to_owned(),
            export_file: "pyhexforge_characters.json".to_owned(),
        }
    }
}

impl Settings {
    /// Absolute paths pass through; relative ones hang off `base_dir`.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() { path.to_owned() } else { self.base_dir.join(path) }
    }

    pub fn terrains_path(&self) -> PathBuf { self.resolve(&self.terrains_file) }
    pub fn map_path(&self) -> PathBuf { self.resolve(&self.map_file) }
    pub fn characters_path(&self) -> PathBuf { self.resolve(&self.characters_file) }
    pub fn export_path(&self) -> PathBuf { self.resolve(&self.export_file) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_editor_constants() {
        let settings = Settings::default();
        assert_eq!(settings.hex_size, 30.);
        assert_eq!((settings.min_zoom, settings.max_zoom), (0.1, 5.0));
        assert_eq!(settings.render_margin, 2);
        assert_eq!(settings.default_brush, "1");
    }

    #[test]
    fn test_resolve_relative_and_absolute() {
        let settings = Settings { base_dir: PathBuf::from("/data/maps"), ..Settings::default() };
        assert_eq!(settings.resolve("tiles/grass.png"), PathBuf::from("/data/maps/tiles/grass.png"));
        assert_eq!(settings.resolve("/tmp/wall.png"), PathBuf::from("/tmp/wall.png"));
        assert_eq!(settings.map_path(), PathBuf::from("/data/maps/map_data.json"));
    }
}

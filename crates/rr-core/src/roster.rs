//! Candidate rosters: the built-in default set, the preset custom list,
//! and candidates synthesized from uploaded image files.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::candidate::Candidate;

/// Size of the generated default set
pub const DEFAULT_SET_SIZE: u32 = 30;

/// Generated-avatar service; `{seed}` is replaced by the candidate number
pub const DEFAULT_AVATAR_TEMPLATE: &str =
    "https://api.dicebear.com/9.x/avataaars/svg?seed={seed}&backgroundColor=b6e3f4,c0aede,d1d4f9";

/// Participant names of the preset custom list
pub const PRESET_NAMES: [&str; 30] = [
    "Ahmed", "Mohammed", "Sara", "Leen", "Omar", "Khalid", "Yousef", "Ibrahim", "Nour", "Huda",
    "Ali", "Salma", "Rami", "Layla", "Zaid", "Hassan", "Muna", "Tamer", "Dina", "Samer", "Ran",
    "Suha", "Fadi", "Hala", "Majed", "Rola", "Nader", "Samia", "Tareq", "Wala",
];

/// Roster settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    /// Number of generated default candidates
    pub default_set_size: u32,
    /// Avatar URI template for the default set
    pub avatar_template: String,
    /// Names of the preset custom list
    pub custom_names: Vec<String>,
    /// Static asset directory holding `<Name>.<ext>` images
    pub custom_image_dir: String,
    /// Image extension for the preset custom list
    pub custom_image_ext: String,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            default_set_size: DEFAULT_SET_SIZE,
            avatar_template: DEFAULT_AVATAR_TEMPLATE.to_string(),
            custom_names: PRESET_NAMES.iter().map(|n| n.to_string()).collect(),
            custom_image_dir: "/participants".to_string(),
            custom_image_ext: "png".to_string(),
        }
    }
}

impl RosterConfig {
    /// The generated default set: ids "1".."N", names "Person N"
    pub fn default_candidates(&self) -> Vec<Candidate> {
        (1..=self.default_set_size.max(1))
            .map(|n| {
                Candidate::new(
                    n,
                    format!("Person {}", n),
                    self.avatar_template.replace("{seed}", &n.to_string()),
                )
            })
            .collect()
    }

    /// The preset custom list: ids "custom-<index>", images from the asset directory.
    ///
    /// Falls back to the built-in names when the configured list is empty.
    pub fn custom_candidates(&self) -> Vec<Candidate> {
        let dir = self.custom_image_dir.trim_end_matches('/');
        let build = |index: usize, name: &str| {
            Candidate::new(
                format!("custom-{}", index),
                name,
                format!("{}/{}.{}", dir, name, self.custom_image_ext),
            )
        };

        if self.custom_names.is_empty() {
            log::warn!("[Roster] Custom name list is empty, using built-in names");
            return PRESET_NAMES.iter().enumerate().map(|(i, n)| build(i, n)).collect();
        }
        self.custom_names
            .iter()
            .enumerate()
            .map(|(i, n)| build(i, n))
            .collect()
    }
}

/// Built-in default set
pub fn default_candidates() -> Vec<Candidate> {
    RosterConfig::default().default_candidates()
}

/// Built-in preset custom list
pub fn custom_candidates() -> Vec<Candidate> {
    RosterConfig::default().custom_candidates()
}

/// Synthesize candidates from uploaded image files.
///
/// Ids are `custom-<stamp_ms>-<index>`; the name is the file name up to its
/// first `.`; the image is a local `file://` URI.
pub fn uploaded_candidates<P: AsRef<Path>>(files: &[P], stamp_ms: i64) -> Vec<Candidate> {
    files
        .iter()
        .enumerate()
        .map(|(index, file)| {
            let path = file.as_ref();
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let name = file_name.split('.').next().unwrap_or_default().to_string();

            Candidate::new(
                format!("custom-{}-{}", stamp_ms, index),
                name,
                file_uri(path),
            )
        })
        .collect()
}

fn file_uri(path: &Path) -> String {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };
    let text = absolute.to_string_lossy().replace('\\', "/");
    if text.starts_with('/') {
        format!("file://{}", text)
    } else {
        format!("file:///{}", text)
    }
}

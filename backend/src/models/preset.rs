use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Preset used when a campaign does not pick one
pub const DEFAULT_PRESET_ID: i64 = 4;

/// A named background gradient and animation the frontend renders behind a board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundPreset {
    pub id: i64,
    pub name: String,
    pub gradient: String,
    pub animation: String,
}

pub static BACKGROUND_PRESETS: Lazy<Vec<BackgroundPreset>> = Lazy::new(|| {
    [
        (1, "Ocean Waves", "from-blue-400 via-blue-600 to-purple-700", "wave"),
        (2, "Sunset Glow", "from-orange-400 via-pink-500 to-purple-600", "glow"),
        (3, "Forest Mystery", "from-green-400 via-teal-500 to-blue-600", "float"),
        (4, "Cherry Blossom", "from-pink-300 via-purple-400 to-indigo-500", "drift"),
        (5, "Golden Hour", "from-yellow-400 via-orange-500 to-red-600", "pulse"),
        (6, "Arctic Aurora", "from-cyan-300 via-blue-400 to-indigo-600", "shimmer"),
    ]
    .into_iter()
    .map(|(id, name, gradient, animation)| BackgroundPreset {
        id,
        name: name.to_string(),
        gradient: gradient.to_string(),
        animation: animation.to_string(),
    })
    .collect()
});

pub fn preset_by_id(id: i64) -> Option<&'static BackgroundPreset> {
    BACKGROUND_PRESETS.iter().find(|preset| preset.id == id)
}

/// Look up a stored preset id, falling back to the default for rows
/// written with an id that no longer exists.
pub fn preset_or_default(id: i64) -> &'static BackgroundPreset {
    preset_by_id(id)
        .or_else(|| preset_by_id(DEFAULT_PRESET_ID))
        .unwrap_or(&BACKGROUND_PRESETS[0])
}

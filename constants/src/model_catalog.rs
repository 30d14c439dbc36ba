/// Remote root that every model file is fetched from in web builds.
pub const ASSET_BASE_URL: &str = "https://wjs-dev.github.io/3dwebserver/assets";

/// Local asset root used by native builds.
pub const NATIVE_ASSET_DIR: &str = "assets";

/// Well-known name carried by the root entity of the loaded model.
pub const MODEL_ROOT_NAME: &str = "3dmodel";

/// Prefix for part identifiers synthesized when a mesh has no name.
pub const SYNTHETIC_PART_PREFIX: &str = "Mesh_";

/// Length of the random suffix appended to synthesized part identifiers.
pub const SYNTHETIC_PART_SUFFIX_LEN: usize = 9;

pub struct ModelInfo {
    pub subject: &'static str,
    pub variant: &'static str,
    pub file: &'static str,
}

/// One model file per subject and variant combination.
pub const MODEL_CATALOG: &[ModelInfo] = &[
    ModelInfo {
        subject: "male",
        variant: "normal",
        file: "man_normal.glb",
    },
    ModelInfo {
        subject: "male",
        variant: "colored",
        file: "man_colored.glb",
    },
    ModelInfo {
        subject: "female",
        variant: "normal",
        file: "woman_normal.glb",
    },
    ModelInfo {
        subject: "female",
        variant: "colored",
        file: "woman_colored.glb",
    },
];

/// Look up the model file for a subject and variant pair.
pub fn model_file(subject: &str, variant: &str) -> Option<&'static str> {
    MODEL_CATALOG
        .iter()
        .find(|info| info.subject == subject && info.variant == variant)
        .map(|info| info.file)
}

//! File persistence configuration

/// Configuration for the annotation store
pub struct AnnotationPersistenceConfig {
    /// Directory holding one file per store key
    pub directory: &'static str,
    /// Key the committed shape list is saved under
    pub key: &'static str,
    /// Extension appended to each key's file
    pub extension: &'static str,
}

/// Configuration for Application State Persistence
pub struct AppPersistenceConfig {
    /// Path for saving/loading host UI state (display flags, active tool)
    pub state_path: &'static str,
}

/// The Master Persistence Configuration
pub struct PersistenceConfig {
    pub annotations: AnnotationPersistenceConfig,
    pub app: AppPersistenceConfig,
}

pub const PERSISTENCE: PersistenceConfig = PersistenceConfig {
    annotations: AnnotationPersistenceConfig {
        directory: "chart_data",
        key: "chart_annotations",
        extension: "json",
    },
    app: AppPersistenceConfig {
        state_path: ".states.json",
    },
};

/// Example: "chart_annotations.json"
pub fn store_filename(key: &str) -> String {
    format!("{}.{}", key, PERSISTENCE.annotations.extension)
}

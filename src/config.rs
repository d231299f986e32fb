use std::path::PathBuf;

/// Crash export read at startup, relative to the working directory.
pub const DEFAULT_DATA_PATH: &str = "Vancouver_data - Vancouver_Full Data_data.csv";

/// Viewer settings. Fixed at build time; there are no flags or config files.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub data_path: PathBuf,
    pub window_title: String,
    pub inner_size: [f32; 2],
    pub min_inner_size: [f32; 2],
    /// Source rows shown in the side-panel preview.
    pub preview_rows: usize,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            window_title: "Crash Viewer – Traffic Crash Analysis".to_string(),
            inner_size: [1500.0, 800.0],
            min_inner_size: [800.0, 500.0],
            preview_rows: 5,
        }
    }
}

use std::path::PathBuf;

/// Fixed application settings. There are no flags or environment overrides;
/// the data file lives next to the working directory.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Source dataset read at startup and on reload.
    pub data_path: PathBuf,
    /// File name offered by the download action.
    pub export_file_name: String,
    /// Rows shown before the first search.
    pub preview_rows: usize,
    pub window_title: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("updated_spotify_data.csv"),
            export_file_name: "filtered_spotify_songs.csv".to_string(),
            preview_rows: 10,
            window_title: "Spotify Songs Search".to_string(),
        }
    }
}

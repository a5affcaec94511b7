//! Well-known names of a Spotify data export.
//!
//! Folder names, file keys and column names are carried here and passed
//! explicitly to the modules that need them.

use std::path::PathBuf;

pub const DEFAULT_DATA_DIR: &str = "data_to_analyze";
pub const DEFAULT_TOP_K: usize = 50;

/// Layout of an extracted export on disk.
#[derive(Debug, Clone)]
pub struct ExportLayout {
    pub streaming_folder: String,
    pub account_folder: String,
    /// Substring marking audio history file keys (case-sensitive).
    pub audio_marker: String,
    /// Substring marking video history file keys (case-sensitive).
    pub video_marker: String,
}

impl Default for ExportLayout {
    fn default() -> Self {
        Self {
            streaming_folder: "Spotify Extended Streaming History".to_string(),
            account_folder: "Spotify Account Data".to_string(),
            audio_marker: "Audio".to_string(),
            video_marker: "Video".to_string(),
        }
    }
}

/// File keys and field keys inside the account data.
#[derive(Debug, Clone)]
pub struct AccountKeys {
    pub identity_file: String,
    pub userdata_file: String,
    pub playlists_file: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub creation_time: String,
    pub birthdate: String,
    pub playlists: String,
}

impl Default for AccountKeys {
    fn default() -> Self {
        Self {
            identity_file: "Identity".to_string(),
            userdata_file: "Userdata".to_string(),
            playlists_file: "Playlist1".to_string(),
            username: "displayName".to_string(),
            first_name: "firstName".to_string(),
            last_name: "lastName".to_string(),
            creation_time: "creationTime".to_string(),
            birthdate: "birthdate".to_string(),
            playlists: "playlists".to_string(),
        }
    }
}

/// Column names of a playback history table.
#[derive(Debug, Clone)]
pub struct HistoryColumns {
    /// Raw combined timestamp, split into `date` and `time` by normalization.
    pub timestamp: String,
    pub date: String,
    pub time: String,
    pub duration: String,
    pub track: String,
    pub artist: String,
}

impl HistoryColumns {
    pub fn audio() -> Self {
        Self {
            timestamp: "ts".to_string(),
            date: "date".to_string(),
            time: "time".to_string(),
            duration: "ms_played".to_string(),
            track: "master_metadata_track_name".to_string(),
            artist: "master_metadata_album_artist_name".to_string(),
        }
    }

    pub fn video() -> Self {
        Self {
            track: "episode_name".to_string(),
            artist: "episode_show_name".to_string(),
            ..Self::audio()
        }
    }
}

impl Default for HistoryColumns {
    fn default() -> Self {
        Self::audio()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub layout: ExportLayout,
    pub account: AccountKeys,
    pub audio_columns: HistoryColumns,
    pub video_columns: HistoryColumns,
    pub top_k: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            layout: ExportLayout::default(),
            account: AccountKeys::default(),
            audio_columns: HistoryColumns::audio(),
            video_columns: HistoryColumns::video(),
            top_k: DEFAULT_TOP_K,
        }
    }
}

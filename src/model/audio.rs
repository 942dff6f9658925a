//! Audio features and audio analysis of tracks.

use crate::util::duration_millis;
use serde::Deserialize;
use std::time::Duration;

/// High-level acoustic attributes of a track, such as danceability, energy and valence.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AudioFeatures {
    pub id: String,
    pub danceability: f32,
    pub energy: f32,
    pub key: i32,
    pub loudness: f32,
    pub mode: i32,
    pub speechiness: f32,
    pub acousticness: f32,
    pub instrumentalness: f32,
    pub liveness: f32,
    pub valence: f32,
    pub tempo: f32,
    #[serde(rename = "duration_ms", with = "duration_millis")]
    pub duration: Duration,
    pub time_signature: i32,
    pub uri: Option<String>,
    pub track_href: Option<String>,
    pub analysis_url: Option<String>,
}

/// Low-level audio analysis of a track: its structure and musical content.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AudioAnalysis {
    pub meta: Option<AnalysisMeta>,
    pub track: AnalysisTrack,
    #[serde(default)]
    pub bars: Vec<TimeInterval>,
    #[serde(default)]
    pub beats: Vec<TimeInterval>,
    #[serde(default)]
    pub tatums: Vec<TimeInterval>,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnalysisMeta {
    pub analyzer_version: Option<String>,
    pub platform: Option<String>,
    pub detailed_status: Option<String>,
    pub status_code: Option<i32>,
    pub timestamp: Option<u64>,
    pub analysis_time: Option<f32>,
    pub input_process: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnalysisTrack {
    pub num_samples: Option<u64>,
    /// Length of the track in seconds.
    pub duration: f32,
    pub loudness: f32,
    pub tempo: f32,
    pub tempo_confidence: Option<f32>,
    pub time_signature: i32,
    pub time_signature_confidence: Option<f32>,
    pub key: i32,
    pub key_confidence: Option<f32>,
    pub mode: i32,
    pub mode_confidence: Option<f32>,
    pub end_of_fade_in: Option<f32>,
    pub start_of_fade_out: Option<f32>,
}

/// A bar, beat or tatum.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct TimeInterval {
    pub start: f32,
    pub duration: f32,
    pub confidence: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Section {
    pub start: f32,
    pub duration: f32,
    pub confidence: f32,
    pub loudness: f32,
    pub tempo: f32,
    pub tempo_confidence: f32,
    pub key: i32,
    pub key_confidence: f32,
    pub mode: i32,
    pub mode_confidence: f32,
    pub time_signature: i32,
    pub time_signature_confidence: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Segment {
    pub start: f32,
    pub duration: f32,
    pub confidence: f32,
    pub loudness_start: f32,
    pub loudness_max: f32,
    pub loudness_max_time: f32,
    pub loudness_end: Option<f32>,
    #[serde(default)]
    pub pitches: Vec<f32>,
    #[serde(default)]
    pub timbre: Vec<f32>,
}

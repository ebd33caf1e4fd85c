//! Configuration module for Kikitori.
//!
//! Handles loading and managing application settings.

mod settings;

pub use settings::{
    CollectionSettings, EmbeddingProvider, EmbeddingSettings, Settings, TranscriptSettings,
    YoutubeSettings,
};

//! Dictation preferences
//!
//! In-memory only; nothing here is persisted.

/// Slowest supported speech rate
pub const MIN_SPEECH_RATE: f32 = 0.5;
/// Fastest supported speech rate
pub const MAX_SPEECH_RATE: f32 = 2.0;

/// Preferences used while dictating
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    auto_shuffle: bool,
    speech_rate: f32,
    speech_lang: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_shuffle: true,
            speech_rate: 0.8,
            speech_lang: "zh-CN".to_string(),
        }
    }
}

impl Settings {
    /// Shuffle the word order when a session starts
    pub fn auto_shuffle(&self) -> bool {
        self.auto_shuffle
    }

    pub fn set_auto_shuffle(&mut self, enabled: bool) {
        self.auto_shuffle = enabled;
    }

    /// Text-to-speech rate, within 0.5..=2.0
    pub fn speech_rate(&self) -> f32 {
        self.speech_rate
    }

    /// Set the speech rate, clamped to the supported range
    ///
    /// Non-finite values leave the rate unchanged.
    pub fn set_speech_rate(&mut self, rate: f32) {
        if rate.is_finite() {
            self.speech_rate = rate.clamp(MIN_SPEECH_RATE, MAX_SPEECH_RATE);
        }
    }

    /// BCP 47 language tag for text-to-speech
    pub fn speech_lang(&self) -> &str {
        &self.speech_lang
    }

    pub fn set_speech_lang(&mut self, lang: impl Into<String>) {
        self.speech_lang = lang.into();
    }
}

//! Phrase lookup
//!
//! Every piece of display text is a [`Phrase`], a closed set of keys with an
//! English and a Japanese rendering. Lookups by phrase are total; lookups by
//! string key fall back to echoing the key.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Supported display languages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ja,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::En, Language::Ja];

    /// Locale code ("en" / "ja")
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ja => "ja",
        }
    }

    /// Name of the language in that language
    pub fn native_name(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Ja => "日本語",
        }
    }

    /// Parse a locale code
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "en" => Some(Language::En),
            "ja" => Some(Language::Ja),
            _ => None,
        }
    }

    /// Format a timestamp the way this locale displays dates
    pub fn format_datetime(&self, at: &DateTime<Local>) -> String {
        match self {
            Language::En => at.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string(),
            Language::Ja => at.format("%Y/%-m/%-d %-H:%M:%S").to_string(),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

macro_rules! phrases {
    ($($variant:ident => $key:literal, $en:literal, $ja:literal;)+) => {
        /// Symbolic display-text keys
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Phrase {
            $($variant,)+
        }

        impl Phrase {
            /// Every phrase, in declaration order
            pub const ALL: &'static [Phrase] = &[$(Phrase::$variant,)+];

            /// Stable string key for this phrase
            pub fn key(&self) -> &'static str {
                match self {
                    $(Phrase::$variant => $key,)+
                }
            }

            /// Resolve a string key
            pub fn from_key(key: &str) -> Option<Phrase> {
                match key {
                    $($key => Some(Phrase::$variant),)+
                    _ => None,
                }
            }

            fn text(&self, language: Language) -> &'static str {
                match (self, language) {
                    $(
                        (Phrase::$variant, Language::En) => $en,
                        (Phrase::$variant, Language::Ja) => $ja,
                    )+
                }
            }
        }
    };
}

phrases! {
    BackButton => "back_button", "Back", "戻る";
    HomeButton => "home_button", "Home", "ホーム";
    ContinueButton => "continue_button", "Continue", "続ける";
    OnboardingNameTitle => "onboarding_name_title", "What should I call you?", "お名前を教えてください";
    OnboardingNameSubtitle => "onboarding_name_subtitle",
        "Using your name can make this feel more personal.", "よりパーソナルな体験のために";
    OnboardingNamePlaceholder => "onboarding_name_placeholder",
        "Enter your name or a nickname", "名前やニックネームを入力";
    EmotionSelectionTitle => "emotion_selection_title", "How do you feel right now?", "いま、どんな気持ち？";
    EmotionSelectionSubtitle => "emotion_selection_subtitle",
        "Tap an emotion, or if you're not sure...", "感情をタップするか、もしわからなければ…";
    UnsureButton => "unsure_button", "I'm not sure what I'm feeling", "うまく言えない・わからない";
    IntensityTitle => "intensity_title", "How strong is this feeling?", "どのくらい強い？";
    IntensitySubtitle => "intensity_subtitle",
        "1 is very mild, 10 is very intense.", "1が最も弱く、10が最も強い感覚です。";
    UnsurePathTitle => "unsure_path_title", "Let's explore what's happening.", "何が起きているか、探ってみましょう";
    UnsurePathSubtitle => "unsure_path_subtitle",
        "Select any feelings or situations that apply.", "当てはまる感覚や状況を選んでください。";
    UnsurePathPlaceholder => "unsure_path_placeholder",
        "You can also describe what's on your mind... (e.g., I have to sleep but I can't)",
        "気になっていることを書いてもいいですよ (例：寝ないといけないのに眠れない)";
    InitialQuestion => "initial_question",
        "What's the story behind this feeling?", "この気持ちの背景には、何がありますか？";
    FallbackQuestion => "fallback_question",
        "Thank you for sharing. Could you tell me a little more?",
        "共有してくれてありがとう。もう少し詳しく教えてもらえますか？";
    AnalyzingText => "analyzing_text", "Thinking...", "考えています…";
    ReframeTitle => "reframe_title", "A New Perspective", "新しい視点";
    GroundingButton => "grounding_button", "Breathe with me", "一緒に呼吸する";
    GroundingTitle => "grounding_title", "A Moment to Pause", "少し、立ち止まる時間";
    GroundingInstruction => "grounding_instruction",
        "Take a slow, deep breath, and feel your chest gently rise and fall.",
        "ゆっくりと深呼吸をして、胸が優しく上下するのを感じてみましょう。";
    GroundingSubInstruction => "grounding_sub_instruction", "Follow the circle's rhythm.", "円のリズムに合わせて。";
    BreatheInInstruction => "breathe_in_instruction", "Breathe In...", "吸って…";
    BreatheOutInstruction => "breathe_out_instruction", "Breathe Out...", "吐いて…";
    SkipButton => "skip_button", "Skip", "スキップ";
    JournalTitle => "journal_title", "Your Reflections", "あなたのジャーナル";
    JournalSavePrompt => "journal_save_prompt",
        "Feel free to copy this to your notes or save it with a screenshot.",
        "良かったらコピーしてメモに保存するか、スクリーンショットで保存してね。";
    JournalEmpty => "journal_empty", "Your saved reflections will appear here.", "あなたの記録はここに表示されます。";
    JournalNewButton => "journal_new_button", "Start New Reflection", "新しく始める";
    Anger => "anger", "Anger", "怒り";
    Anxiety => "anxiety", "Anxiety", "不安";
    Sadness => "sadness", "Sadness", "悲しみ";
    GuiltShame => "guilt_shame", "Guilt / Shame", "罪悪感・羞恥心";
    Irritated => "irritated", "Irritated", "イライラ";
    Overwhelmed => "overwhelmed", "Overwhelmed", "圧倒されている";
    NumbBlank => "numb_blank", "Numb / Blank", "無感覚・からっぽ";
    Joy => "joy", "Joy", "喜び";
    ChestTight => "chest_tight", "Chest tight", "胸がぎゅっとする";
    WantToCry => "want_to_cry", "Want to cry", "涙が出そう";
    Restless => "restless", "Restless", "そわそわする";
    Exhausted => "exhausted", "Exhausted", "ぐったりしている";
    FeelNothing => "feel_nothing", "Feel nothing", "何も感じない";
    WasCriticized => "was_criticized", "Was criticized", "否定された";
    FeltIgnored => "felt_ignored", "Felt ignored", "無視された気がする";
}

/// Display text for a phrase in the given language
pub fn translate(phrase: Phrase, language: Language) -> &'static str {
    phrase.text(language)
}

/// Display text for a string key; unknown keys are echoed back unchanged
pub fn translate_key(key: &str, language: Language) -> String {
    match Phrase::from_key(key) {
        Some(phrase) => translate(phrase, language).to_string(),
        None => {
            debug!(%key, "translate_key: unknown key, echoing");
            key.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_every_phrase_has_both_languages() {
        for phrase in Phrase::ALL {
            assert!(!translate(*phrase, Language::En).is_empty(), "{:?} en", phrase);
            assert!(!translate(*phrase, Language::Ja).is_empty(), "{:?} ja", phrase);
        }
    }

    #[test]
    fn test_keys_round_trip() {
        for phrase in Phrase::ALL {
            assert_eq!(Phrase::from_key(phrase.key()), Some(*phrase));
        }
    }

    #[test]
    fn test_translate_key_known() {
        assert_eq!(translate_key("anxiety", Language::Ja), "不安");
        assert_eq!(translate_key("anxiety", Language::En), "Anxiety");
    }

    #[test]
    fn test_translate_key_unknown_echoes() {
        assert_eq!(translate_key("no_such_key", Language::En), "no_such_key");
        assert_eq!(translate_key("", Language::Ja), "");
    }

    #[test]
    fn test_language_codes() {
        assert_eq!(Language::from_code("JA"), Some(Language::Ja));
        assert_eq!(Language::from_code("en"), Some(Language::En));
        assert_eq!(Language::from_code("fr"), None);
        assert_eq!(serde_json::to_string(&Language::Ja).unwrap(), "\"ja\"");
    }

    #[test]
    fn test_format_datetime() {
        let at = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(Language::En.format_datetime(&at), "3/9/2024, 2:05:07 PM");
        assert_eq!(Language::Ja.format_datetime(&at), "2024/3/9 14:05:07");
    }
}

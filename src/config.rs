use crate::engine::{RecognitionConfig, RecognitionLevel};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "docscan-ocr-server")]
#[command(about = "Document scanning OCR server with business card extraction")]
#[command(version)]
pub struct Args {
    /// Host address to bind to
    #[arg(long, env = "OCR_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "OCR_PORT", default_value = "9292")]
    pub port: u16,

    /// Languages the recognizer may use, comma separated (e.g. "en-US,de-DE")
    #[arg(long, env = "OCR_LANGUAGES", default_value = "en-US", value_delimiter = ',')]
    pub languages: Vec<String>,

    /// Minimum text height as a fraction of image height
    #[arg(long, env = "OCR_MIN_TEXT_HEIGHT", default_value = "0.01")]
    pub min_text_height: f32,

    /// Maximum file size in bytes (default: 50MB)
    #[arg(long, env = "OCR_MAX_FILE_SIZE", default_value = "52428800")]
    pub max_file_size: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub languages: Vec<String>,
    pub min_text_height: f32,
    pub max_file_size: usize,
}

impl Config {
    /// Recognition settings handed to the engine on every OCR call.
    pub fn recognition_config(&self) -> RecognitionConfig {
        RecognitionConfig {
            level: RecognitionLevel::Accurate,
            automatic_language_detection: true,
            language_correction: true,
            minimum_text_height: self.min_text_height.clamp(0.0, 1.0),
            languages: self.languages.clone(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 9292,
            languages: vec!["en-US".to_string()],
            min_text_height: 0.01,
            max_file_size: 52_428_800,
        }
    }
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        let languages = args
            .languages
            .into_iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();

        Self {
            host: args.host,
            port: args.port,
            languages,
            min_text_height: args.min_text_height,
            max_file_size: args.max_file_size,
        }
    }
}

//! Text recognition engine implementations
//!
//! Engines are conditionally compiled based on feature flags.

#[cfg(feature = "engine-ocrs")]
pub mod ocrs;

use crate::config::Config;
use crate::engine::TextRecognitionEngine;
use crate::error::OcrError;
use serde::Serialize;
use std::sync::Arc;

/// Information about an available engine
#[derive(Debug, Clone, Serialize)]
pub struct EngineInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub supported_languages: Vec<String>,
}

/// Registry of available recognition engines
pub struct EngineRegistry {
    engines: Vec<Arc<dyn TextRecognitionEngine>>,
    default_engine: String,
}

impl EngineRegistry {
    /// Create a registry with every compiled-in engine initialized
    pub fn new(config: &Config) -> Result<Self, OcrError> {
        #[allow(unused_mut)]
        let mut engines: Vec<Arc<dyn TextRecognitionEngine>> = Vec::new();

        #[cfg(feature = "engine-ocrs")]
        {
            tracing::info!("Initializing ocrs engine...");
            engines.push(Arc::new(ocrs::OcrsEngine::new(config)?));
        }
        #[cfg(not(feature = "engine-ocrs"))]
        let _ = config;

        Self::from_engines(engines)
    }

    /// Registry over already constructed engines; the first one is the default
    pub fn from_engines(engines: Vec<Arc<dyn TextRecognitionEngine>>) -> Result<Self, OcrError> {
        let default_engine = engines
            .first()
            .map(|e| e.name().to_string())
            .ok_or_else(|| {
                OcrError::InitializationError(
                    "No OCR engines available. Build with --features engine-ocrs".to_string(),
                )
            })?;

        Ok(Self {
            engines,
            default_engine,
        })
    }

    /// Get an engine by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn TextRecognitionEngine>> {
        self.engines.iter().find(|e| e.name() == name).cloned()
    }

    pub fn default_engine(&self) -> Option<Arc<dyn TextRecognitionEngine>> {
        self.get(&self.default_engine)
    }

    pub fn default_name(&self) -> &str {
        &self.default_engine
    }

    /// List all available engine names
    pub fn list(&self) -> Vec<&str> {
        self.engines.iter().map(|e| e.name()).collect()
    }

    pub fn info(&self) -> Vec<EngineInfo> {
        self.engines
            .iter()
            .map(|e| EngineInfo {
                name: e.name(),
                description: e.description(),
                supported_languages: e.supported_languages(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{RecognitionConfig, TextBlock};
    use image::DynamicImage;

    struct Named(&'static str);

    impl TextRecognitionEngine for Named {
        fn name(&self) -> &'static str {
            self.0
        }

        fn description(&self) -> &'static str {
            "test engine"
        }

        fn recognize(
            &self,
            _image: &DynamicImage,
            _config: &RecognitionConfig,
        ) -> Result<Vec<TextBlock>, OcrError> {
            Ok(Vec::new())
        }

        fn supported_languages(&self) -> Vec<String> {
            vec!["en-US".to_string()]
        }
    }

    #[test]
    fn test_first_engine_is_default() {
        let engines: Vec<Arc<dyn TextRecognitionEngine>> =
            vec![Arc::new(Named("alpha")), Arc::new(Named("beta"))];
        let registry = EngineRegistry::from_engines(engines).unwrap();
        assert_eq!(registry.default_name(), "alpha");
        assert_eq!(registry.list(), vec!["alpha", "beta"]);
        assert!(registry.get("beta").is_some());
        assert!(registry.get("gamma").is_none());
        assert_eq!(registry.info()[1].name, "beta");
    }

    #[test]
    fn test_empty_registry_is_an_error() {
        assert!(matches!(
            EngineRegistry::from_engines(Vec::new()),
            Err(OcrError::InitializationError(_))
        ));
    }
}

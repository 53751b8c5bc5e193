use crate::config::Config;
use crate::error::{DocketError, Result, ValidationError};

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration
    pub fn validate(config: &Config) -> Result<()> {
        let mut errors = Vec::new();

        // Validate schema version
        Self::validate_schema_version(config, &mut errors);

        // Validate retrieval settings
        Self::validate_retrieval(config, &mut errors);

        // Validate resolver settings
        Self::validate_resolver(config, &mut errors);

        // Validate citation settings
        Self::validate_citation(config, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(DocketError::ConfigValidation { errors })
        }
    }

    fn validate_schema_version(config: &Config, errors: &mut Vec<ValidationError>) {
        let version = &config.meta.schema_version;
        if version != "1.0.0" {
            errors.push(ValidationError::new(
                "_meta.schema_version",
                format!("Unsupported schema version: {}", version),
            ));
        }
    }

    fn validate_retrieval(config: &Config, errors: &mut Vec<ValidationError>) {
        let r = &config.retrieval;

        if !r.rrf_k.is_finite() || r.rrf_k <= 0.0 {
            errors.push(ValidationError::new(
                "retrieval.rrf_k",
                format!("RRF constant must be positive, got {}", r.rrf_k),
            ));
        }

        // Weights need not sum to 1, but each must be positive
        if !r.lexical_weight.is_finite() || r.lexical_weight <= 0.0 {
            errors.push(ValidationError::new(
                "retrieval.lexical_weight",
                format!("Weight must be positive, got {}", r.lexical_weight),
            ));
        }

        if !r.vector_weight.is_finite() || r.vector_weight <= 0.0 {
            errors.push(ValidationError::new(
                "retrieval.vector_weight",
                format!("Weight must be positive, got {}", r.vector_weight),
            ));
        }

        if r.top_k == 0 {
            errors.push(ValidationError::new(
                "retrieval.top_k",
                "top_k must be greater than 0",
            ));
        }

        if r.candidate_multiplier == 0 {
            errors.push(ValidationError::new(
                "retrieval.candidate_multiplier",
                "Candidate multiplier must be greater than 0",
            ));
        }

        if r.backend_timeout_ms == 0 {
            errors.push(ValidationError::new(
                "retrieval.backend_timeout_ms",
                "Backend timeout must be greater than 0",
            ));
        }
    }

    fn validate_resolver(config: &Config, errors: &mut Vec<ValidationError>) {
        let r = &config.resolver;

        if !(0.0..=1.0).contains(&r.confidence_floor) {
            errors.push(ValidationError::new(
                "resolver.confidence_floor",
                format!(
                    "Confidence floor must be between 0.0 and 1.0, got {}",
                    r.confidence_floor
                ),
            ));
        }

        if !(0.0..=1.0).contains(&r.location_boost) {
            errors.push(ValidationError::new(
                "resolver.location_boost",
                format!(
                    "Location boost must be between 0.0 and 1.0, got {}",
                    r.location_boost
                ),
            ));
        }

        if r.location_scan_chars == 0 {
            errors.push(ValidationError::new(
                "resolver.location_scan_chars",
                "Location scan window must be greater than 0",
            ));
        }

        if r.location_candidate_cap == 0 {
            errors.push(ValidationError::new(
                "resolver.location_candidate_cap",
                "Location candidate cap must be greater than 0",
            ));
        }
    }

    fn validate_citation(config: &Config, errors: &mut Vec<ValidationError>) {
        let c = &config.citation;

        if c.max_excerpt_chars == 0 {
            errors.push(ValidationError::new(
                "citation.max_excerpt_chars",
                "Excerpt cap must be greater than 0",
            ));
        }

        if c.boundary_tolerance >= c.max_excerpt_chars {
            errors.push(ValidationError::new(
                "citation.boundary_tolerance",
                "Boundary tolerance must be smaller than the excerpt cap",
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        let config = Config::default();
        assert!(ConfigValidator::validate(&config).is_ok());
    }

    #[test]
    fn test_zero_weight_rejected() {
        let mut config = Config::default();
        config.retrieval.lexical_weight = 0.0;
        assert!(ConfigValidator::validate(&config).is_err());
    }

    #[test]
    fn test_negative_weight_rejected() {
        let mut config = Config::default();
        config.retrieval.vector_weight = -1.0;
        assert!(ConfigValidator::validate(&config).is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = Config::default();
        config.retrieval.backend_timeout_ms = 0;
        assert!(ConfigValidator::validate(&config).is_err());
    }

    #[test]
    fn test_floor_out_of_range_rejected() {
        let mut config = Config::default();
        config.resolver.confidence_floor = 1.5;
        let err = ConfigValidator::validate(&config).unwrap_err();
        match err {
            DocketError::ConfigValidation { errors } => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].path, "resolver.confidence_floor");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_tolerance_must_fit_under_cap() {
        let mut config = Config::default();
        config.citation.max_excerpt_chars = 50;
        config.citation.boundary_tolerance = 80;
        assert!(ConfigValidator::validate(&config).is_err());
    }
}

use credit_risk::config::ModelConfig;
use credit_risk::error::AppError;
use credit_risk::scoring::{
    Education, FormVariant, Gender, MaritalStatus, ModelCell, RiskAssessmentService,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Model overrides shared by every command that scores.
#[derive(clap::Args, Debug, Default, Clone)]
pub(crate) struct ModelArgs {
    /// Path to the model artifact (overrides RISK_MODEL_PATH)
    #[arg(long = "model")]
    pub(crate) model_path: Option<PathBuf>,
    /// Form variant the model was trained on: basic or extended (overrides RISK_FORM_VARIANT)
    #[arg(long, value_parser = parse_variant)]
    pub(crate) variant: Option<FormVariant>,
}

impl ModelArgs {
    pub(crate) fn apply(self, config: &mut ModelConfig) {
        if let Some(path) = self.model_path {
            config.path = path;
        }
        if let Some(variant) = self.variant {
            config.variant = variant;
        }
    }
}

/// Loads the configured artifact once and wraps it in a service for its variant.
pub(crate) fn build_service(config: &ModelConfig) -> Result<Arc<RiskAssessmentService>, AppError> {
    let cell = ModelCell::new(config.path.clone());
    let classifier = cell.get_or_load()?;
    info!(
        path = %cell.path().display(),
        variant = config.variant.label(),
        "credit risk model ready"
    );
    Ok(Arc::new(RiskAssessmentService::new(classifier, config.variant)))
}

pub(crate) fn parse_variant(raw: &str) -> Result<FormVariant, String> {
    FormVariant::parse(raw).ok_or_else(|| format!("unknown form variant '{raw}' (basic|extended)"))
}

pub(crate) fn parse_education(raw: &str) -> Result<Education, String> {
    parse_code(raw).and_then(|code| Education::try_from(code).map_err(|err| err.to_string()))
}

pub(crate) fn parse_marital_status(raw: &str) -> Result<MaritalStatus, String> {
    parse_code(raw).and_then(|code| MaritalStatus::try_from(code).map_err(|err| err.to_string()))
}

pub(crate) fn parse_gender(raw: &str) -> Result<Gender, String> {
    parse_code(raw).and_then(|code| Gender::try_from(code).map_err(|err| err.to_string()))
}

fn parse_code(raw: &str) -> Result<u8, String> {
    raw.trim()
        .parse::<u8>()
        .map_err(|err| format!("'{raw}' is not a numeric option code ({err})"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_variant_aliases() {
        assert_eq!(parse_variant("v1"), Ok(FormVariant::Basic));
        assert_eq!(parse_variant(" Extended "), Ok(FormVariant::Extended));
        assert!(parse_variant("premium").is_err());
    }

    #[test]
    fn parses_option_codes() {
        assert_eq!(parse_education("3"), Ok(Education::HighSchool));
        assert_eq!(parse_marital_status("1"), Ok(MaritalStatus::Married));
        assert_eq!(parse_gender("2"), Ok(Gender::Female));
        assert_eq!(
            parse_education("7"),
            Err("education code 7 is not a recognised option".to_string())
        );
        assert!(parse_gender("male").is_err());
    }

    #[test]
    fn model_args_override_config() {
        let mut config = ModelConfig {
            path: PathBuf::from("models/credit_risk_model.json"),
            variant: FormVariant::Extended,
        };
        ModelArgs {
            model_path: Some(PathBuf::from("/tmp/basic.json")),
            variant: Some(FormVariant::Basic),
        }
        .apply(&mut config);

        assert_eq!(config.path, PathBuf::from("/tmp/basic.json"));
        assert_eq!(config.variant, FormVariant::Basic);
    }

    #[test]
    fn build_service_reports_missing_artifact() {
        let config = ModelConfig {
            path: PathBuf::from("/nonexistent/credit_risk_model.json"),
            variant: FormVariant::Extended,
        };
        assert!(matches!(build_service(&config), Err(AppError::Model(_))));
    }
}

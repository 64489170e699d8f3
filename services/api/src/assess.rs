use crate::infra::{build_service, parse_education, parse_gender, parse_marital_status, ModelArgs};
use clap::Args;
use credit_risk::config::AppConfig;
use credit_risk::error::AppError;
use credit_risk::scoring::{
    batch, default_input, AssessmentReport, Education, FormDefinition, FormVariant, Gender,
    MaritalStatus, RawInput, RepaymentStatus,
};
use credit_risk::telemetry;
use std::fmt::Write as _;
use std::io::Write as _;
use std::path::PathBuf;

/// Applicant fields; anything omitted takes the form's default for the variant.
#[derive(Args, Debug, Default)]
pub(crate) struct AssessArgs {
    #[command(flatten)]
    pub(crate) model: ModelArgs,
    /// Credit limit in NT$
    #[arg(long)]
    pub(crate) credit_limit: Option<u32>,
    #[arg(long)]
    pub(crate) age: Option<u8>,
    /// Education code (1 graduate, 2 university, 3 high school, 4-6 other)
    #[arg(long, value_parser = parse_education)]
    pub(crate) education: Option<Education>,
    /// Marital status code (1 married, 2 single, 3 other)
    #[arg(long, value_parser = parse_marital_status)]
    pub(crate) marital_status: Option<MaritalStatus>,
    /// Sex code (1 male, 2 female)
    #[arg(long, value_parser = parse_gender)]
    pub(crate) gender: Option<Gender>,
    /// Repayment status codes, most recent month first (-2 to 8)
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub(crate) repayment_status: Option<Vec<i8>>,
    /// Bill amounts in NT$, most recent month first
    #[arg(long, value_delimiter = ',')]
    pub(crate) bill_amount: Option<Vec<u32>>,
    /// Payment amounts in NT$, most recent month first
    #[arg(long, value_delimiter = ',')]
    pub(crate) payment_amount: Option<Vec<u32>>,
    /// Print the report as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

impl AssessArgs {
    fn into_input(self, variant: FormVariant) -> RawInput {
        let defaults = default_input(variant);
        RawInput {
            credit_limit: self.credit_limit.unwrap_or(defaults.credit_limit),
            age: self.age.unwrap_or(defaults.age),
            education: self.education.unwrap_or(defaults.education),
            marital_status: self.marital_status.unwrap_or(defaults.marital_status),
            gender: self.gender.unwrap_or(defaults.gender),
            repayment_status: self
                .repayment_status
                .map(|codes| codes.into_iter().map(RepaymentStatus).collect())
                .unwrap_or(defaults.repayment_status),
            bill_amounts: self.bill_amount.unwrap_or(defaults.bill_amounts),
            payment_amounts: self.payment_amount.unwrap_or(defaults.payment_amounts),
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    #[command(flatten)]
    pub(crate) model: ModelArgs,
    /// CSV of applicants with LIMIT_BAL, SEX, EDUCATION, ... headers
    pub(crate) input: PathBuf,
    /// Destination for the scored CSV
    #[arg(long, short)]
    pub(crate) output: PathBuf,
}

#[derive(Args, Debug, Default)]
pub(crate) struct FormArgs {
    /// Form variant to describe (overrides RISK_FORM_VARIANT)
    #[arg(long, value_parser = crate::infra::parse_variant)]
    pub(crate) variant: Option<FormVariant>,
}

pub(crate) fn run_assess(mut args: AssessArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    std::mem::take(&mut args.model).apply(&mut config.model);
    telemetry::init_for_cli(&config.telemetry)?;

    let service = build_service(&config.model)?;
    let json = args.json;
    let report = service.assess(args.into_input(config.model.variant))?;

    let mut stdout = std::io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut stdout, &report).map_err(std::io::Error::from)?;
        writeln!(stdout)?;
    } else {
        write!(stdout, "{}", render_report(&report))?;
    }
    Ok(())
}

pub(crate) fn run_batch(args: BatchArgs) -> Result<(), AppError> {
    let BatchArgs {
        model,
        input,
        output,
    } = args;

    let mut config = AppConfig::load()?;
    model.apply(&mut config.model);
    telemetry::init_for_cli(&config.telemetry)?;

    let service = build_service(&config.model)?;
    let summary = batch::score_path(&service, &input, &output)?;
    println!(
        "Scored {} of {} rows ({} failed) -> {}",
        summary.scored,
        summary.rows,
        summary.failed,
        output.display()
    );
    Ok(())
}

pub(crate) fn run_form(args: FormArgs) -> Result<(), AppError> {
    let variant = match args.variant {
        Some(variant) => variant,
        None => AppConfig::load()?.model.variant,
    };

    let form = FormDefinition::for_variant(variant);
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &form).map_err(std::io::Error::from)?;
    writeln!(stdout)?;
    Ok(())
}

pub(crate) fn render_report(report: &AssessmentReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Credit risk assessment ({} form)", report.variant.label());
    let _ = writeln!(
        out,
        "- Default probability: {:.1}%",
        report.probability * 100.0
    );
    let _ = writeln!(
        out,
        "- Credit score: {} ({})",
        report.pseudo_score, report.risk_label
    );
    let _ = writeln!(out, "Key factors:");
    for reason in &report.reasons {
        let _ = writeln!(out, "  - {reason}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use credit_risk::scoring::RiskTier;

    #[test]
    fn omitted_fields_take_form_defaults() {
        let input = AssessArgs::default().into_input(FormVariant::Basic);
        assert_eq!(input, default_input(FormVariant::Basic));
    }

    #[test]
    fn provided_fields_override_defaults() {
        let args = AssessArgs {
            credit_limit: Some(50_000),
            education: Some(Education::HighSchool),
            repayment_status: Some(vec![2, -1]),
            bill_amount: Some(vec![45_000]),
            payment_amount: Some(vec![500]),
            ..AssessArgs::default()
        };

        let input = args.into_input(FormVariant::Extended);
        assert_eq!(input.credit_limit, 50_000);
        assert_eq!(input.age, 35);
        assert_eq!(input.education, Education::HighSchool);
        assert_eq!(
            input.repayment_status,
            vec![RepaymentStatus(2), RepaymentStatus(-1)]
        );
        assert_eq!(input.bill_amounts, vec![45_000]);
    }

    #[test]
    fn renders_text_report() {
        let report = AssessmentReport {
            variant: FormVariant::Extended,
            probability: 0.2381,
            pseudo_score: 762,
            risk_tier: RiskTier::Medium,
            risk_label: "Medium Risk".to_string(),
            risk_color: "orange".to_string(),
            reasons: vec!["Low credit limit".to_string()],
            assessed_at: Utc::now(),
        };

        assert_eq!(
            render_report(&report),
            "Credit risk assessment (extended form)\n\
             - Default probability: 23.8%\n\
             - Credit score: 762 (Medium Risk)\n\
             Key factors:\n  - Low credit limit\n"
        );
    }
}

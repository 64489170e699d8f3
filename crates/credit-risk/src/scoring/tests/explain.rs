use super::common::*;
use crate::scoring::domain::{FormVariant, RepaymentStatus};
use crate::scoring::explain::{Explainer, ExplainerConfig, RecentPaymentRule, FALLBACK_REASONS};
use crate::scoring::features::{AVG_PAYMENT_RATIO, MAX_UTILIZATION};

fn explain(variant: FormVariant, input: &crate::scoring::RawInput) -> Vec<String> {
    let record = derive(variant, input);
    Explainer::for_variant(variant)
        .explain(input, &record)
        .into_vec()
}

#[test]
fn healthy_profile_falls_back_to_positive_reasons() {
    let input = healthy_input();
    let record = derive(FormVariant::Extended, &input);
    let reasons = Explainer::for_variant(FormVariant::Extended).explain(&input, &record);

    assert!(reasons.is_fallback());
    assert_eq!(reasons.reasons(), FALLBACK_REASONS);
}

#[test]
fn basic_fallback_when_nothing_fires() {
    let reasons = explain(FormVariant::Basic, &healthy_basic_input());
    assert_eq!(reasons, FALLBACK_REASONS);
}

#[test]
fn rules_fire_in_display_order_and_are_capped() {
    let reasons = explain(FormVariant::Extended, &stressed_input());

    assert_eq!(
        reasons,
        vec![
            "Recent payment 2 month(s) late",
            "Payment delay 2 months ago",
            "History of late payments",
            "Low credit limit",
            "Very low recent payments",
        ]
    );
}

#[test]
fn basic_variant_caps_at_four() {
    let mut input = stressed_input();
    input.bill_amounts = vec![45_000, 44_000];
    input.payment_amounts = vec![500, 500];

    let reasons = explain(FormVariant::Basic, &input);
    assert_eq!(reasons.len(), 4);
    assert_eq!(reasons[3], "Low credit limit");
}

#[test]
fn high_utilization_is_reported() {
    let mut input = healthy_input();
    input.credit_limit = 50_000;
    input.bill_amounts = vec![45_000];
    input.payment_amounts = vec![5_000];

    let reasons = explain(FormVariant::Extended, &input);
    assert_eq!(
        reasons,
        vec![
            "Low credit limit",
            "High credit utilization (90%)",
            "Minimal payment history",
        ]
    );
}

#[test]
fn moderate_utilization_between_thresholds() {
    let mut input = healthy_input();
    input.bill_amounts = vec![120_000];
    input.payment_amounts = vec![20_000];

    let reasons = explain(FormVariant::Extended, &input);
    assert_eq!(reasons, vec!["Moderate credit utilization (60%)"]);
}

#[test]
fn recent_payment_rules_differ_between_variants() {
    let low_payment = |reasons: Vec<String>| {
        reasons
            .iter()
            .any(|reason| reason == "Very low recent payments")
    };

    let mut basic = healthy_basic_input();
    basic.payment_amounts = vec![2_400, 2_700];
    assert!(!low_payment(explain(FormVariant::Basic, &basic)));
    basic.payment_amounts = vec![3_000, 1_500];
    assert!(low_payment(explain(FormVariant::Basic, &basic)));

    let mut extended = healthy_input();
    extended.payment_amounts = vec![2_400];
    assert_eq!(
        explain(FormVariant::Extended, &extended),
        vec!["Very low recent payments"]
    );
    extended.payment_amounts = vec![2_500];
    assert!(!low_payment(explain(FormVariant::Extended, &extended)));
}

#[test]
fn late_status_reason_reports_month_count() {
    let mut input = healthy_input();
    input.repayment_status = vec![RepaymentStatus(6)];

    let reasons = explain(FormVariant::Extended, &input);
    assert_eq!(reasons, vec!["Recent payment 6 month(s) late"]);
}

#[test]
fn early_payment_codes_are_not_late() {
    let mut input = healthy_input();
    input.repayment_status = vec![RepaymentStatus(-2), RepaymentStatus(-1), RepaymentStatus(0)];

    assert_eq!(explain(FormVariant::Extended, &input), FALLBACK_REASONS);
}

#[test]
fn reason_list_is_never_empty_and_respects_custom_cap() {
    let config = ExplainerConfig {
        max_reasons: 2,
        recent_payment_rule: RecentPaymentRule::LastMonth { floor: 10_000 },
        ..ExplainerConfig::for_variant(FormVariant::Extended)
    };
    let explainer = Explainer::new(config);

    for input in [healthy_input(), stressed_input()] {
        let record = derive(FormVariant::Extended, &input);
        let reasons = explainer.explain(&input, &record);
        assert!(!reasons.is_empty());
        assert!(reasons.len() <= 2);
    }

    let input = stressed_input();
    let reasons = explainer.explain(&input, &derive(FormVariant::Extended, &input));
    assert_eq!(reasons.len(), 2);
}

fn utilization_input(bill: u32) -> crate::scoring::RawInput {
    let mut input = healthy_input();
    input.credit_limit = 100_000;
    input.bill_amounts = vec![bill];
    input.payment_amounts = vec![20_000];
    input
}

#[test]
fn utilization_at_high_threshold_is_only_moderate() {
    let input = utilization_input(80_000);
    assert_eq!(
        derive(FormVariant::Extended, &input).get(MAX_UTILIZATION),
        Some(80.0)
    );

    let reasons = explain(FormVariant::Extended, &input);
    assert_eq!(reasons, vec!["Moderate credit utilization (80%)"]);
}

#[test]
fn utilization_at_moderate_threshold_is_not_reported() {
    let input = utilization_input(50_000);
    assert_eq!(
        derive(FormVariant::Extended, &input).get(MAX_UTILIZATION),
        Some(50.0)
    );

    assert_eq!(explain(FormVariant::Extended, &input), FALLBACK_REASONS);
}

#[test]
fn payment_ratio_at_threshold_is_not_minimal() {
    let input = healthy_input();
    let record = derive(FormVariant::Extended, &input);
    let avg_ratio = record.get(AVG_PAYMENT_RATIO).expect("aggregate present");

    let at_threshold = Explainer::new(ExplainerConfig {
        minimal_payment_ratio: avg_ratio,
        ..ExplainerConfig::for_variant(FormVariant::Extended)
    });
    let reasons = at_threshold.explain(&input, &record).into_vec();
    assert!(!reasons.iter().any(|r| r == "Minimal payment history"));

    let above = Explainer::new(ExplainerConfig {
        minimal_payment_ratio: avg_ratio + 1e-9,
        ..ExplainerConfig::for_variant(FormVariant::Extended)
    });
    let reasons = above.explain(&input, &record).into_vec();
    assert_eq!(reasons, vec!["Minimal payment history"]);
}


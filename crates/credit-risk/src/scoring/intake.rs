//! Input surface definition and the guard that re-checks values arriving over the wire.

use serde::Serialize;

use super::domain::{
    Education, FormVariant, Gender, MaritalStatus, RawInput, RepaymentStatus, StatementMonth,
};
use super::features::FeatureLayout;

/// Validation errors raised by the intake guard.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntakeViolation {
    #[error("{field} must be between {min} and {max} (found {found})")]
    OutOfRange {
        field: String,
        min: i64,
        max: i64,
        found: i64,
    },
    #[error("{field} expects between {min} and {max} month(s), found {found}")]
    MonthCount {
        field: &'static str,
        min: usize,
        max: usize,
        found: usize,
    },
}

/// Slider or number input bounds published by the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NumericBounds {
    pub min: i64,
    pub max: i64,
    pub step: i64,
}

impl NumericBounds {
    fn check(&self, field: impl Into<String>, value: i64) -> Result<(), IntakeViolation> {
        if (self.min..=self.max).contains(&value) {
            return Ok(());
        }
        Err(IntakeViolation::OutOfRange {
            field: field.into(),
            min: self.min,
            max: self.max,
            found: value,
        })
    }
}

pub const CREDIT_LIMIT: NumericBounds = NumericBounds {
    min: 10_000,
    max: 1_000_000,
    step: 10_000,
};
pub const AGE: NumericBounds = NumericBounds {
    min: 20,
    max: 80,
    step: 1,
};
pub const REPAYMENT_STATUS: NumericBounds = NumericBounds {
    min: RepaymentStatus::MIN as i64,
    max: RepaymentStatus::MAX as i64,
    step: 1,
};
pub const BILL_AMOUNT: NumericBounds = NumericBounds {
    min: 0,
    max: 800_000,
    step: 1,
};
pub const PAYMENT_AMOUNT: NumericBounds = NumericBounds {
    min: 0,
    max: 500_000,
    step: 1,
};

/// Repayment status codes the form collects.
pub const OBSERVED_STATUS_MONTHS: usize = 3;

const DEFAULT_CREDIT_LIMIT: u32 = 200_000;
const DEFAULT_AGE: u8 = 35;
const DEFAULT_BILLS: [u32; 2] = [50_000, 48_000];
const DEFAULT_PAYMENTS: [u32; 2] = [3_000, 3_000];

/// How many statement months of each kind the surface collects for a layout.
fn observed_statement_months(layout: &FeatureLayout) -> (usize, usize) {
    if layout.backfill {
        (1, layout.statement_months)
    } else {
        (layout.statement_months, layout.statement_months)
    }
}

/// Guard that admits only inputs the form itself could have produced.
#[derive(Debug, Clone)]
pub struct IntakeGuard {
    layout: FeatureLayout,
}

impl IntakeGuard {
    pub fn new(layout: FeatureLayout) -> Self {
        Self { layout }
    }

    pub fn for_variant(variant: FormVariant) -> Self {
        Self::new(FeatureLayout::for_variant(variant))
    }

    pub fn admit(&self, input: RawInput) -> Result<RawInput, IntakeViolation> {
        CREDIT_LIMIT.check("credit_limit", input.credit_limit as i64)?;
        AGE.check("age", input.age as i64)?;

        let status_max = OBSERVED_STATUS_MONTHS.min(self.layout.status_months);
        check_months("repayment_status", 0, status_max, input.repayment_status.len())?;
        for (offset, status) in input.repayment_status.iter().enumerate() {
            REPAYMENT_STATUS.check(format!("repayment_status[{offset}]"), status.code() as i64)?;
        }

        let (min, max) = observed_statement_months(&self.layout);
        check_months("bill_amounts", min, max, input.bill_amounts.len())?;
        check_months("payment_amounts", min, max, input.payment_amounts.len())?;
        for (offset, amount) in input.bill_amounts.iter().enumerate() {
            BILL_AMOUNT.check(format!("bill_amounts[{offset}]"), *amount as i64)?;
        }
        for (offset, amount) in input.payment_amounts.iter().enumerate() {
            PAYMENT_AMOUNT.check(format!("payment_amounts[{offset}]"), *amount as i64)?;
        }

        Ok(input)
    }
}

fn check_months(
    field: &'static str,
    min: usize,
    max: usize,
    found: usize,
) -> Result<(), IntakeViolation> {
    if (min..=max).contains(&found) {
        return Ok(());
    }
    Err(IntakeViolation::MonthCount {
        field,
        min,
        max,
        found,
    })
}

/// The form's initial state for a variant.
pub fn default_input(variant: FormVariant) -> RawInput {
    let layout = FeatureLayout::for_variant(variant);
    let (months, _) = observed_statement_months(&layout);
    let take = |values: &[u32]| values.iter().copied().take(months).collect::<Vec<_>>();

    RawInput {
        credit_limit: DEFAULT_CREDIT_LIMIT,
        age: DEFAULT_AGE,
        education: Education::Graduate,
        marital_status: MaritalStatus::Married,
        gender: Gender::Male,
        repayment_status: vec![RepaymentStatus::ON_TIME; OBSERVED_STATUS_MONTHS],
        bill_amounts: take(&DEFAULT_BILLS),
        payment_amounts: take(&DEFAULT_PAYMENTS),
    }
}

/// Widget definitions a client renders to collect a [`RawInput`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormDefinition {
    pub variant: FormVariant,
    pub fields: Vec<FormField>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormField {
    pub name: String,
    pub label: String,
    #[serde(flatten)]
    pub widget: Widget,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "widget", rename_all = "snake_case")]
pub enum Widget {
    Slider {
        min: i64,
        max: i64,
        step: i64,
        default: i64,
    },
    Number {
        min: i64,
        max: i64,
        default: i64,
    },
    Select {
        options: Vec<SelectOption>,
        default: i64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub code: i64,
    pub label: String,
}

impl FormDefinition {
    pub fn for_variant(variant: FormVariant) -> Self {
        let defaults = default_input(variant);
        let mut fields = vec![
            FormField {
                name: "credit_limit".to_string(),
                label: "Credit Limit (NT$)".to_string(),
                widget: slider(CREDIT_LIMIT, defaults.credit_limit as i64),
            },
            FormField {
                name: "age".to_string(),
                label: "Age".to_string(),
                widget: slider(AGE, defaults.age as i64),
            },
            FormField {
                name: "education".to_string(),
                label: "Education Level".to_string(),
                widget: select(
                    Education::ALL.map(|e| (e.code() as i64, e.label())),
                    defaults.education.code() as i64,
                ),
            },
            FormField {
                name: "marital_status".to_string(),
                label: "Marital Status".to_string(),
                widget: select(
                    MaritalStatus::ALL.map(|m| (m.code() as i64, m.label())),
                    defaults.marital_status.code() as i64,
                ),
            },
            FormField {
                name: "gender".to_string(),
                label: "Sex".to_string(),
                widget: select(
                    Gender::ALL.map(|g| (g.code() as i64, g.label())),
                    defaults.gender.code() as i64,
                ),
            },
        ];

        let status_options: Vec<SelectOption> = (RepaymentStatus::MIN..=RepaymentStatus::MAX)
            .map(|code| SelectOption {
                code: code as i64,
                label: RepaymentStatus(code).label(),
            })
            .collect();
        for month in StatementMonth::ALL.into_iter().take(OBSERVED_STATUS_MONTHS) {
            fields.push(FormField {
                name: format!("repayment_status[{}]", month.offset()),
                label: format!("Repayment {}", months_ago(month)),
                widget: Widget::Select {
                    options: status_options.clone(),
                    default: 0,
                },
            });
        }

        for (month, default) in StatementMonth::ALL.into_iter().zip(&defaults.bill_amounts) {
            fields.push(FormField {
                name: format!("bill_amounts[{}]", month.offset()),
                label: format!("Bill Amount {} (NT$)", months_ago(month)),
                widget: number(BILL_AMOUNT, *default as i64),
            });
        }
        for (month, default) in StatementMonth::ALL
            .into_iter()
            .zip(&defaults.payment_amounts)
        {
            fields.push(FormField {
                name: format!("payment_amounts[{}]", month.offset()),
                label: format!("Amount Paid {} (NT$)", months_ago(month)),
                widget: number(PAYMENT_AMOUNT, *default as i64),
            });
        }

        Self { variant, fields }
    }
}

fn months_ago(month: StatementMonth) -> String {
    match month.offset() {
        0 => "Last Month".to_string(),
        offset => format!("{} Months Ago", offset + 1),
    }
}

fn slider(bounds: NumericBounds, default: i64) -> Widget {
    Widget::Slider {
        min: bounds.min,
        max: bounds.max,
        step: bounds.step,
        default,
    }
}

fn number(bounds: NumericBounds, default: i64) -> Widget {
    Widget::Number {
        min: bounds.min,
        max: bounds.max,
        default,
    }
}

fn select<const N: usize>(options: [(i64, &'static str); N], default: i64) -> Widget {
    Widget::Select {
        options: options
            .into_iter()
            .map(|(code, label)| SelectOption {
                code,
                label: label.to_string(),
            })
            .collect(),
        default,
    }
}

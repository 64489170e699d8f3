//! CSV batch scoring using the training data's column headers.

use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::domain::{Education, Gender, MaritalStatus, RawInput, RepaymentStatus, UnknownCode};
use super::intake::{IntakeViolation, NumericBounds, BILL_AMOUNT, PAYMENT_AMOUNT};
use super::service::RiskAssessmentService;

#[derive(Debug)]
pub enum BatchError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for BatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchError::Io(err) => write!(f, "failed to access batch file: {}", err),
            BatchError::Csv(err) => write!(f, "invalid batch CSV data: {}", err),
        }
    }
}

impl std::error::Error for BatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BatchError::Io(err) => Some(err),
            BatchError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for BatchError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for BatchError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Counts reported once a batch has been written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub rows: usize,
    pub scored: usize,
    pub failed: usize,
}

pub fn score_path<P: AsRef<Path>, Q: AsRef<Path>>(
    service: &RiskAssessmentService,
    input: P,
    output: Q,
) -> Result<BatchSummary, BatchError> {
    let reader = std::fs::File::open(input)?;
    let writer = std::fs::File::create(output)?;
    score_reader(service, reader, writer)
}

/// Scores every row; rows that fail parsing, intake or scoring are written with an error
/// column. Output is written only once the whole input has been read.
pub fn score_reader<R: Read, W: Write>(
    service: &RiskAssessmentService,
    reader: R,
    writer: W,
) -> Result<BatchSummary, BatchError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut outcomes = Vec::new();
    let mut summary = BatchSummary::default();

    for (index, record) in csv_reader.records().enumerate() {
        let record = record?;
        let row_number = index + 1;
        summary.rows += 1;

        let input = record
            .deserialize::<BatchRow>(Some(&headers))
            .map_err(|err| err.to_string())
            .and_then(|row| row.into_input().map_err(|err| err.to_string()));
        let outcome = match input {
            Ok(input) => match service.assess(input) {
                Ok(report) => BatchOutcome {
                    row: row_number,
                    probability: Some(report.probability),
                    pseudo_score: Some(report.pseudo_score),
                    risk_tier: Some(report.risk_label),
                    reasons: report.reasons.join("; "),
                    error: None,
                },
                Err(err) => BatchOutcome::failed(row_number, err.to_string()),
            },
            Err(error) => BatchOutcome::failed(row_number, error),
        };

        if let Some(error) = &outcome.error {
            warn!(row = row_number, %error, "batch row not scored");
            summary.failed += 1;
        } else {
            summary.scored += 1;
        }
        outcomes.push(outcome);
    }

    let mut csv_writer = csv::Writer::from_writer(writer);
    for outcome in outcomes {
        csv_writer.serialize(outcome)?;
    }
    csv_writer.flush()?;
    info!(
        rows = summary.rows,
        scored = summary.scored,
        failed = summary.failed,
        "batch scoring finished"
    );
    Ok(summary)
}

/// Reasons a parsed row cannot become a [`RawInput`].
#[derive(Debug, thiserror::Error)]
enum RowError {
    #[error(transparent)]
    Code(#[from] UnknownCode),
    #[error(transparent)]
    Range(#[from] IntakeViolation),
    #[error("{column} is filled but earlier month {missing} is blank")]
    MonthGap {
        column: &'static str,
        missing: &'static str,
    },
}

const STATUS_COLUMNS: [&str; 3] = ["PAY_0", "PAY_2", "PAY_3"];
const BILL_COLUMNS: [&str; 6] = [
    "BILL_AMT1",
    "BILL_AMT2",
    "BILL_AMT3",
    "BILL_AMT4",
    "BILL_AMT5",
    "BILL_AMT6",
];
const PAYMENT_COLUMNS: [&str; 6] = [
    "PAY_AMT1", "PAY_AMT2", "PAY_AMT3", "PAY_AMT4", "PAY_AMT5", "PAY_AMT6",
];

// Amounts are signed: the training data records credit balances as negative bills.
#[derive(Debug, Deserialize)]
struct BatchRow {
    #[serde(rename = "LIMIT_BAL")]
    limit_bal: u32,
    #[serde(rename = "SEX")]
    sex: u8,
    #[serde(rename = "EDUCATION")]
    education: u8,
    #[serde(rename = "MARRIAGE")]
    marriage: u8,
    #[serde(rename = "AGE")]
    age: u8,
    #[serde(rename = "PAY_0", default)]
    pay_0: Option<i8>,
    #[serde(rename = "PAY_2", default)]
    pay_2: Option<i8>,
    #[serde(rename = "PAY_3", default)]
    pay_3: Option<i8>,
    #[serde(rename = "BILL_AMT1", default)]
    bill_amt1: Option<i64>,
    #[serde(rename = "BILL_AMT2", default)]
    bill_amt2: Option<i64>,
    #[serde(rename = "BILL_AMT3", default)]
    bill_amt3: Option<i64>,
    #[serde(rename = "BILL_AMT4", default)]
    bill_amt4: Option<i64>,
    #[serde(rename = "BILL_AMT5", default)]
    bill_amt5: Option<i64>,
    #[serde(rename = "BILL_AMT6", default)]
    bill_amt6: Option<i64>,
    #[serde(rename = "PAY_AMT1", default)]
    pay_amt1: Option<i64>,
    #[serde(rename = "PAY_AMT2", default)]
    pay_amt2: Option<i64>,
    #[serde(rename = "PAY_AMT3", default)]
    pay_amt3: Option<i64>,
    #[serde(rename = "PAY_AMT4", default)]
    pay_amt4: Option<i64>,
    #[serde(rename = "PAY_AMT5", default)]
    pay_amt5: Option<i64>,
    #[serde(rename = "PAY_AMT6", default)]
    pay_amt6: Option<i64>,
}

impl BatchRow {
    fn into_input(self) -> Result<RawInput, RowError> {
        let statuses = leading(STATUS_COLUMNS, [self.pay_0, self.pay_2, self.pay_3])?;
        let bills = leading(
            BILL_COLUMNS,
            [
                self.bill_amt1,
                self.bill_amt2,
                self.bill_amt3,
                self.bill_amt4,
                self.bill_amt5,
                self.bill_amt6,
            ],
        )?;
        let payments = leading(
            PAYMENT_COLUMNS,
            [
                self.pay_amt1,
                self.pay_amt2,
                self.pay_amt3,
                self.pay_amt4,
                self.pay_amt5,
                self.pay_amt6,
            ],
        )?;

        Ok(RawInput {
            credit_limit: self.limit_bal,
            age: self.age,
            education: Education::try_from(self.education)?,
            marital_status: MaritalStatus::try_from(self.marriage)?,
            gender: Gender::try_from(self.sex)?,
            repayment_status: statuses.into_iter().map(RepaymentStatus).collect(),
            bill_amounts: amounts(&BILL_COLUMNS, bills, BILL_AMOUNT)?,
            payment_amounts: amounts(&PAYMENT_COLUMNS, payments, PAYMENT_AMOUNT)?,
        })
    }
}

/// Values up to the first blank column. A later month filled after a blank one is an error,
/// since it cannot be placed in the history without the months before it.
fn leading<T: Copy, const N: usize>(
    columns: [&'static str; N],
    values: [Option<T>; N],
) -> Result<Vec<T>, RowError> {
    let observed = values.iter().take_while(|value| value.is_some()).count();
    if let Some(gap) = values[observed..].iter().position(Option::is_some) {
        return Err(RowError::MonthGap {
            column: columns[observed + gap],
            missing: columns[observed],
        });
    }
    Ok(values.into_iter().flatten().collect())
}

fn amounts(
    columns: &[&'static str],
    values: Vec<i64>,
    bounds: NumericBounds,
) -> Result<Vec<u32>, IntakeViolation> {
    columns
        .iter()
        .zip(values)
        .map(|(column, value)| {
            u32::try_from(value).map_err(|_| IntakeViolation::OutOfRange {
                field: column.to_string(),
                min: bounds.min,
                max: bounds.max,
                found: value,
            })
        })
        .collect()
}

#[derive(Debug, Serialize)]
struct BatchOutcome {
    row: usize,
    probability: Option<f64>,
    pseudo_score: Option<u16>,
    risk_tier: Option<String>,
    reasons: String,
    error: Option<String>,
}

impl BatchOutcome {
    fn failed(row: usize, error: String) -> Self {
        Self {
            row,
            probability: None,
            pseudo_score: None,
            risk_tier: None,
            reasons: String::new(),
            error: Some(error),
        }
    }
}

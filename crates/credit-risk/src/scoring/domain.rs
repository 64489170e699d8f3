use serde::{Deserialize, Serialize};

/// Form layout that produced an input, and therefore the schema the model was trained on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormVariant {
    /// Two observed statement months, copied straight into the record.
    Basic,
    /// One observed statement month expanded into a six month history with aggregates.
    #[default]
    Extended,
}

impl FormVariant {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "basic" | "v1" | "1" => Some(Self::Basic),
            "extended" | "v2" | "2" => Some(Self::Extended),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FormVariant::Basic => "basic",
            FormVariant::Extended => "extended",
        }
    }
}

/// Raised when an enumerated field carries a code the form never offers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field} code {code} is not a recognised option")]
pub struct UnknownCode {
    pub field: &'static str,
    pub code: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Education {
    Graduate,
    University,
    HighSchool,
    Others,
    Unknown5,
    Unknown6,
}

impl Education {
    pub const ALL: [Education; 6] = [
        Education::Graduate,
        Education::University,
        Education::HighSchool,
        Education::Others,
        Education::Unknown5,
        Education::Unknown6,
    ];

    pub fn code(self) -> u8 {
        match self {
            Education::Graduate => 1,
            Education::University => 2,
            Education::HighSchool => 3,
            Education::Others => 4,
            Education::Unknown5 => 5,
            Education::Unknown6 => 6,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Education::Graduate => "Graduate",
            Education::University => "University",
            Education::HighSchool => "High School",
            Education::Others => "Others",
            Education::Unknown5 | Education::Unknown6 => "Unknown",
        }
    }
}

impl TryFrom<u8> for Education {
    type Error = UnknownCode;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Education::ALL
            .into_iter()
            .find(|education| education.code() == code)
            .ok_or(UnknownCode {
                field: "education",
                code: code as i64,
            })
    }
}

impl From<Education> for u8 {
    fn from(value: Education) -> Self {
        value.code()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum MaritalStatus {
    Married,
    Single,
    Others,
}

impl MaritalStatus {
    pub const ALL: [MaritalStatus; 3] = [
        MaritalStatus::Married,
        MaritalStatus::Single,
        MaritalStatus::Others,
    ];

    pub fn code(self) -> u8 {
        match self {
            MaritalStatus::Married => 1,
            MaritalStatus::Single => 2,
            MaritalStatus::Others => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MaritalStatus::Married => "Married",
            MaritalStatus::Single => "Single",
            MaritalStatus::Others => "Others",
        }
    }
}

impl TryFrom<u8> for MaritalStatus {
    type Error = UnknownCode;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        MaritalStatus::ALL
            .into_iter()
            .find(|status| status.code() == code)
            .ok_or(UnknownCode {
                field: "marital_status",
                code: code as i64,
            })
    }
}

impl From<MaritalStatus> for u8 {
    fn from(value: MaritalStatus) -> Self {
        value.code()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

    pub fn code(self) -> u8 {
        match self {
            Gender::Male => 1,
            Gender::Female => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

impl TryFrom<u8> for Gender {
    type Error = UnknownCode;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Gender::ALL
            .into_iter()
            .find(|gender| gender.code() == code)
            .ok_or(UnknownCode {
                field: "gender",
                code: code as i64,
            })
    }
}

impl From<Gender> for u8 {
    fn from(value: Gender) -> Self {
        value.code()
    }
}

/// Repayment status code as recorded by the issuer: `<= 0` is on time, `n > 0` is n months late.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepaymentStatus(pub i8);

impl RepaymentStatus {
    pub const MIN: i8 = -2;
    pub const MAX: i8 = 8;
    pub const ON_TIME: RepaymentStatus = RepaymentStatus(0);

    pub fn code(self) -> i8 {
        self.0
    }

    pub fn is_late(self) -> bool {
        self.0 > 0
    }

    pub fn months_late(self) -> Option<u8> {
        if self.is_late() {
            Some(self.0 as u8)
        } else {
            None
        }
    }

    pub fn label(self) -> String {
        match self.months_late() {
            Some(months) => format!("{months} months late"),
            None => "On time/Paid early".to_string(),
        }
    }
}

/// Statement months covered by the six month history window, most recent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementMonth {
    September,
    August,
    July,
    June,
    May,
    April,
}

impl StatementMonth {
    pub const ALL: [StatementMonth; 6] = [
        StatementMonth::September,
        StatementMonth::August,
        StatementMonth::July,
        StatementMonth::June,
        StatementMonth::May,
        StatementMonth::April,
    ];

    /// Months back from the most recent statement.
    pub fn offset(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            StatementMonth::September => "September",
            StatementMonth::August => "August",
            StatementMonth::July => "July",
            StatementMonth::June => "June",
            StatementMonth::May => "May",
            StatementMonth::April => "April",
        }
    }

    /// Repayment status column. The training data has no `PAY_1`.
    pub fn status_column(self) -> String {
        match self.offset() {
            0 => "PAY_0".to_string(),
            offset => format!("PAY_{}", offset + 1),
        }
    }

    pub fn bill_column(self) -> String {
        format!("BILL_AMT{}", self.offset() + 1)
    }

    pub fn payment_column(self) -> String {
        format!("PAY_AMT{}", self.offset() + 1)
    }
}

/// Customer snapshot collected from the input surface. Month-indexed vectors are most recent first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawInput {
    pub credit_limit: u32,
    pub age: u8,
    pub education: Education,
    pub marital_status: MaritalStatus,
    pub gender: Gender,
    #[serde(default)]
    pub repayment_status: Vec<RepaymentStatus>,
    pub bill_amounts: Vec<u32>,
    pub payment_amounts: Vec<u32>,
}

impl RawInput {
    /// Observed status for the month, or on time when the form did not collect it.
    pub fn repayment(&self, month: StatementMonth) -> RepaymentStatus {
        self.repayment_status
            .get(month.offset())
            .copied()
            .unwrap_or(RepaymentStatus::ON_TIME)
    }

    pub fn bill(&self, month: StatementMonth) -> Option<u32> {
        self.bill_amounts.get(month.offset()).copied()
    }

    pub fn payment(&self, month: StatementMonth) -> Option<u32> {
        self.payment_amounts.get(month.offset()).copied()
    }

    pub fn latest_bill(&self) -> u32 {
        self.bill(StatementMonth::September).unwrap_or(0)
    }

    pub fn latest_payment(&self) -> u32 {
        self.payment(StatementMonth::September).unwrap_or(0)
    }
}

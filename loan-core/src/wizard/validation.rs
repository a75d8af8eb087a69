//! Per-step validation rules.
//!
//! Each step maps to a pure check of the form that returns an [`ErrorMap`]
//! of field name to message. An empty map means the step may be left.
//! Field names use the form's JSON paths (`businessInfo.pincode`,
//! `requirements.land`).

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::steps::WizardStep;
use crate::calculations::common::parse_amount;
use crate::models::{CostEntry, FormAggregate};

/// Largest cost accepted for a single entry (one lakh crore).
pub const MAX_COST: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

// ASCII digits only; `\d` would also match other scripts' digits.
static PINCODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{6}$").expect("pincode pattern is valid"));
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{10}$").expect("phone pattern is valid"));
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

/// Validation failures keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorMap(BTreeMap<String, String>);

impl ErrorMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        field: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.0.insert(field.into(), message.into());
    }

    pub fn get(
        &self,
        field: &str,
    ) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(
        &self,
        field: &str,
    ) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn extend(
        &mut self,
        other: ErrorMap,
    ) {
        self.0.extend(other.0);
    }
}

/// Runs the validator for one step.
pub fn validate_step(
    step: WizardStep,
    form: &FormAggregate,
) -> ErrorMap {
    let mut errors = ErrorMap::new();

    match step {
        WizardStep::BusinessName => {
            require(&mut errors, "fullName", &form.full_name, "Business name is required");
        }
        WizardStep::BusinessType => {
            require(
                &mut errors,
                "businessType",
                &form.business_type,
                "Business type is required",
            );
        }
        WizardStep::Industry => {
            require(&mut errors, "industry", &form.industry, "Select an industry");
        }
        WizardStep::LoanType => {
            if form.loan.is_none() {
                errors.insert("loan", "Select a loan type");
            }
        }
        WizardStep::Requirements => validate_cost_entries(
            &mut errors,
            "requirements",
            form.requirements
                .iter()
                .map(|(key, entry)| (key.as_str(), entry)),
            "Select at least one project requirement",
        ),
        WizardStep::MonthlyExpenses => validate_cost_entries(
            &mut errors,
            "monthlyExpenses",
            form.monthly_expenses
                .iter()
                .map(|(key, entry)| (key.as_str(), entry)),
            "Select at least one monthly expense",
        ),
        WizardStep::PersonalInfo => {
            let info = &form.personal_info;
            require(
                &mut errors,
                "personalInfo.ownerName",
                &info.owner_name,
                "Owner name is required",
            );
            require(&mut errors, "personalInfo.gender", &info.gender, "Gender is required");
            require(
                &mut errors,
                "personalInfo.education",
                &info.education,
                "Education is required",
            );
            require(
                &mut errors,
                "personalInfo.category",
                &info.category,
                "Category is required",
            );
        }
        WizardStep::BusinessInfo => {
            let info = &form.business_info;
            require(
                &mut errors,
                "businessInfo.address",
                &info.address,
                "Address is required",
            );
            require(
                &mut errors,
                "businessInfo.locality",
                &info.locality,
                "Locality is required",
            );
            if !PINCODE_RE.is_match(info.pincode.trim()) {
                errors.insert("businessInfo.pincode", "Pincode must be 6 digits");
            }
            if !PHONE_RE.is_match(info.phone.trim()) {
                errors.insert("businessInfo.phone", "Phone number must be 10 digits");
            }
            if !EMAIL_RE.is_match(info.email.trim()) {
                errors.insert("businessInfo.email", "Enter a valid email address");
            }
        }
        WizardStep::Address | WizardStep::Review => {}
    }

    errors
}

/// Runs every step's validator; used before accepting a whole submission.
pub fn validate_all(form: &FormAggregate) -> ErrorMap {
    let mut errors = ErrorMap::new();
    for step in WizardStep::ALL {
        errors.extend(validate_step(step, form));
    }
    errors
}

fn require(
    errors: &mut ErrorMap,
    field: &str,
    value: &str,
    message: &str,
) {
    if value.trim().is_empty() {
        errors.insert(field, message);
    }
}

fn validate_cost_entries<'a>(
    errors: &mut ErrorMap,
    section: &str,
    entries: impl Iterator<Item = (&'a str, &'a CostEntry)>,
    none_selected: &str,
) {
    let mut any_selected = false;

    for (key, entry) in entries.filter(|(_, entry)| entry.selected) {
        any_selected = true;
        let cost = parse_amount(&entry.cost);
        if cost <= Decimal::ZERO {
            errors.insert(format!("{section}.{key}"), "Enter a cost greater than zero");
        } else if cost > MAX_COST {
            errors.insert(
                format!("{section}.{key}"),
                "Cost cannot exceed 10,00,00,00,00,000",
            );
        }
    }

    if !any_selected {
        errors.insert(section, none_selected);
    }
}

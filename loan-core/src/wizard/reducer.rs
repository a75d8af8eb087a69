//! Single update path for the form aggregate.
//!
//! Every change a wizard step makes is expressed as a [`FormAction`] and
//! applied through [`FormAggregate::apply`].

use serde::{Deserialize, Serialize};

use crate::models::{
    FormAggregate, LoanCategory, MonthlyExpenseKey, RegistrationType, RequirementKey,
    WorkingCapitalEntry,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PersonalField {
    OwnerName,
    Gender,
    Education,
    Category,
    BusinessStart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BusinessField {
    Address,
    Locality,
    Panchayath,
    Town,
    Pincode,
    Phone,
    Email,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FinancingField {
    InterestRatePercent,
    TenureYears,
    Subsidy,
    OwnContributionPercent,
    WorkingCapitalMarginPercent,
}

/// A change to the form aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum FormAction {
    SetFullName {
        value: String,
    },
    SetBusinessType {
        value: String,
    },
    SetIndustry {
        value: String,
    },
    SetLoan {
        value: Option<LoanCategory>,
    },
    SelectRequirement {
        key: RequirementKey,
        selected: bool,
    },
    SetRequirementCost {
        key: RequirementKey,
        cost: String,
    },
    SelectMonthlyExpense {
        key: MonthlyExpenseKey,
        selected: bool,
    },
    SetMonthlyExpenseCost {
        key: MonthlyExpenseKey,
        cost: String,
    },
    SetPersonalInfo {
        field: PersonalField,
        value: String,
    },
    SetBusinessInfo {
        field: BusinessField,
        value: String,
    },
    SetRegistrationType {
        value: Option<RegistrationType>,
    },
    SetFinancing {
        field: FinancingField,
        value: String,
    },
    SetWorkingCapital {
        entry: WorkingCapitalEntry,
    },
    SetNotes {
        value: String,
    },
    /// Replaces the whole aggregate, e.g. when editing a stored report.
    Load {
        form: Box<FormAggregate>,
    },
    Reset,
}

impl FormAggregate {
    /// Applies one action in place.
    pub fn apply(
        &mut self,
        action: FormAction,
    ) {
        match action {
            FormAction::SetFullName { value } => self.full_name = value,
            FormAction::SetBusinessType { value } => self.business_type = value,
            FormAction::SetIndustry { value } => self.industry = value,
            FormAction::SetLoan { value } => self.loan = value,
            FormAction::SelectRequirement { key, selected } => {
                self.requirements.entry(key).or_default().selected = selected;
            }
            FormAction::SetRequirementCost { key, cost } => {
                self.requirements.entry(key).or_default().cost = cost;
            }
            FormAction::SelectMonthlyExpense { key, selected } => {
                self.monthly_expenses.entry(key).or_default().selected = selected;
            }
            FormAction::SetMonthlyExpenseCost { key, cost } => {
                self.monthly_expenses.entry(key).or_default().cost = cost;
            }
            FormAction::SetPersonalInfo { field, value } => {
                let info = &mut self.personal_info;
                let slot = match field {
                    PersonalField::OwnerName => &mut info.owner_name,
                    PersonalField::Gender => &mut info.gender,
                    PersonalField::Education => &mut info.education,
                    PersonalField::Category => &mut info.category,
                    PersonalField::BusinessStart => &mut info.business_start,
                };
                *slot = value;
            }
            FormAction::SetBusinessInfo { field, value } => {
                let info = &mut self.business_info;
                let slot = match field {
                    BusinessField::Address => &mut info.address,
                    BusinessField::Locality => &mut info.locality,
                    BusinessField::Panchayath => &mut info.panchayath,
                    BusinessField::Town => &mut info.town,
                    BusinessField::Pincode => &mut info.pincode,
                    BusinessField::Phone => &mut info.phone,
                    BusinessField::Email => &mut info.email,
                };
                *slot = value;
            }
            FormAction::SetRegistrationType { value } => {
                self.business_info.registration_type = value;
            }
            FormAction::SetFinancing { field, value } => {
                let terms = &mut self.financing;
                let slot = match field {
                    FinancingField::InterestRatePercent => &mut terms.interest_rate_percent,
                    FinancingField::TenureYears => &mut terms.tenure_years,
                    FinancingField::Subsidy => &mut terms.subsidy,
                    FinancingField::OwnContributionPercent => &mut terms.own_contribution_percent,
                    FinancingField::WorkingCapitalMarginPercent => {
                        &mut terms.working_capital_margin_percent
                    }
                };
                *slot = value;
            }
            FormAction::SetWorkingCapital { entry } => self.financing.working_capital = entry,
            FormAction::SetNotes { value } => self.notes = value,
            FormAction::Load { form } => *self = *form,
            FormAction::Reset => *self = FormAggregate::default(),
        }
    }

    /// Applies a sequence of actions in order.
    pub fn apply_all(
        &mut self,
        actions: impl IntoIterator<Item = FormAction>,
    ) {
        for action in actions {
            self.apply(action);
        }
    }
}

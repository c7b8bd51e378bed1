//! Savings calculator models
//!
//! Compares a fleet's current monthly diesel spend against the cost of
//! running the same fleet electric under one of three financing models.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::error::{ValidationError, ValidationErrorKind, ValidationErrors};
use super::validation::{parse_whole_number, validate_range};

/// Accepted monthly diesel spend per vehicle, KES
pub const DIESEL_COST_RANGE: (i64, i64) = (50_000, 1_000_000);
/// Accepted monthly distance per vehicle, km
pub const MONTHLY_KM_RANGE: (i64, i64) = (100, 10_000);
/// Accepted fleet size
pub const VEHICLE_COUNT_RANGE: (i64, i64) = (1, 50);

/// Battery-swap subscription, per vehicle per month
pub const EXCHANGE_MONTHLY_FEE: i64 = 120_000;
/// Ownership financing, per vehicle per month
pub const TRADITIONAL_MONTHLY_FEE: i64 = 95_000;
/// Charging cost under ownership financing, per km
pub const TRADITIONAL_COST_PER_KM: i64 = 14;
/// Full-service lease, per vehicle per month
pub const LEASE_MONTHLY_FEE: i64 = 175_000;

/// How the electric fleet is paid for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinancingModel {
    /// Battery-swap subscription
    #[default]
    Exchange,
    /// Buy the vehicle, pay for charging
    Traditional,
    /// All-inclusive lease
    Lease,
}

impl FinancingModel {
    /// Parse a model name, case-insensitive
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "exchange" => Some(FinancingModel::Exchange),
            "traditional" => Some(FinancingModel::Traditional),
            "lease" => Some(FinancingModel::Lease),
            _ => None,
        }
    }

    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            FinancingModel::Exchange => "exchange",
            FinancingModel::Traditional => "traditional",
            FinancingModel::Lease => "lease",
        }
    }

    /// Monthly cost of running `vehicles` vehicles for `monthly_km` km each
    pub fn monthly_cost(&self, vehicles: i64, monthly_km: i64) -> i64 {
        match self {
            FinancingModel::Exchange => EXCHANGE_MONTHLY_FEE * vehicles,
            FinancingModel::Traditional => {
                TRADITIONAL_MONTHLY_FEE * vehicles + TRADITIONAL_COST_PER_KM * monthly_km * vehicles
            },
            FinancingModel::Lease => LEASE_MONTHLY_FEE * vehicles,
        }
    }
}

impl std::fmt::Display for FinancingModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Calculator input fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculatorField {
    DieselCost,
    MonthlyKm,
    VehicleCount,
    Model,
}

impl CalculatorField {
    /// Every field, in form order
    pub const ALL: [CalculatorField; 4] = [
        CalculatorField::DieselCost,
        CalculatorField::MonthlyKm,
        CalculatorField::VehicleCount,
        CalculatorField::Model,
    ];

    /// Field name as used in markup
    pub fn as_str(&self) -> &'static str {
        match self {
            CalculatorField::DieselCost => "diesel_cost",
            CalculatorField::MonthlyKm => "monthly_km",
            CalculatorField::VehicleCount => "vehicle_count",
            CalculatorField::Model => "model",
        }
    }

    /// Parse a field name
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == raw.trim())
    }
}

/// Calculator inputs as typed, before validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCalculatorInputs {
    pub diesel_cost: String,
    pub monthly_km: String,
    pub vehicle_count: String,
    pub model: String,
}

impl Default for RawCalculatorInputs {
    fn default() -> Self {
        Self {
            diesel_cost: "250000".to_string(),
            monthly_km: "2000".to_string(),
            vehicle_count: "1".to_string(),
            model: FinancingModel::default().as_str().to_string(),
        }
    }
}

impl RawCalculatorInputs {
    /// Replace one field's value
    pub fn set(&mut self, field: CalculatorField, value: impl Into<String>) {
        let value = value.into();
        match field {
            CalculatorField::DieselCost => self.diesel_cost = value,
            CalculatorField::MonthlyKm => self.monthly_km = value,
            CalculatorField::VehicleCount => self.vehicle_count = value,
            CalculatorField::Model => self.model = value,
        }
    }

    /// Current value of one field
    pub fn get(&self, field: CalculatorField) -> &str {
        match field {
            CalculatorField::DieselCost => &self.diesel_cost,
            CalculatorField::MonthlyKm => &self.monthly_km,
            CalculatorField::VehicleCount => &self.vehicle_count,
            CalculatorField::Model => &self.model,
        }
    }
}

/// Validated calculator inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct CalculationInputs {
    /// Monthly diesel spend per vehicle, KES
    #[validate(range(min = 50000, max = 1000000))]
    pub diesel_cost: i64,

    /// Monthly distance per vehicle, km
    #[validate(range(min = 100, max = 10000))]
    pub monthly_km: i64,

    /// Number of vehicles in the fleet
    #[validate(range(min = 1, max = 50))]
    pub vehicle_count: i64,

    /// Financing model to compare against
    pub model: FinancingModel,
}

impl CalculationInputs {
    /// Validate numeric inputs against their accepted ranges
    pub fn new(
        diesel_cost: i64,
        monthly_km: i64,
        vehicle_count: i64,
        model: FinancingModel,
    ) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let (lo, hi) = DIESEL_COST_RANGE;
        errors.check(validate_range(diesel_cost, CalculatorField::DieselCost.as_str(), lo, hi));
        let (lo, hi) = MONTHLY_KM_RANGE;
        errors.check(validate_range(monthly_km, CalculatorField::MonthlyKm.as_str(), lo, hi));
        let (lo, hi) = VEHICLE_COUNT_RANGE;
        errors.check(validate_range(vehicle_count, CalculatorField::VehicleCount.as_str(), lo, hi));

        errors.into_result(Self {
            diesel_cost,
            monthly_km,
            vehicle_count,
            model,
        })
    }

    /// Parse and validate typed inputs, reporting every bad field
    pub fn from_raw(raw: &RawCalculatorInputs) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let mut number = |field: CalculatorField, range: (i64, i64)| {
            let name = field.as_str();
            errors.check(
                parse_whole_number(raw.get(field), name)
                    .and_then(|value| validate_range(value, name, range.0, range.1)),
            )
        };
        let diesel_cost = number(CalculatorField::DieselCost, DIESEL_COST_RANGE);
        let monthly_km = number(CalculatorField::MonthlyKm, MONTHLY_KM_RANGE);
        let vehicle_count = number(CalculatorField::VehicleCount, VEHICLE_COUNT_RANGE);

        let model = errors.check(FinancingModel::parse(&raw.model).ok_or_else(|| {
            ValidationError::with_context(
                ValidationErrorKind::InvalidChoice,
                CalculatorField::Model.as_str(),
                format!("Unknown financing model: {}", raw.model),
            )
        }));

        match (diesel_cost, monthly_km, vehicle_count, model) {
            (Some(diesel_cost), Some(monthly_km), Some(vehicle_count), Some(model)) => Ok(Self {
                diesel_cost,
                monthly_km,
                vehicle_count,
                model,
            }),
            _ => Err(errors),
        }
    }
}

/// Monthly and annual savings of switching a fleet to electric
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub current_monthly_cost: i64,
    pub new_monthly_cost: i64,
    /// Negative when the electric option costs more
    pub monthly_savings: i64,
    /// Share of current cost saved, never below 0
    pub savings_percent: f64,
    pub annual_savings: i64,
}

/// Compute the savings breakdown for validated inputs
pub fn calculate_savings(inputs: &CalculationInputs) -> CalculationResult {
    let current_monthly_cost = inputs.diesel_cost * inputs.vehicle_count;
    let new_monthly_cost = inputs
        .model
        .monthly_cost(inputs.vehicle_count, inputs.monthly_km);
    let monthly_savings = current_monthly_cost - new_monthly_cost;

    let savings_percent = if current_monthly_cost > 0 {
        (monthly_savings as f64 / current_monthly_cost as f64 * 100.0).max(0.0)
    } else {
        0.0
    };

    CalculationResult {
        current_monthly_cost,
        new_monthly_cost,
        monthly_savings,
        savings_percent,
        annual_savings: monthly_savings * 12,
    }
}

//! # History & Payments
//!
//! Stamped calculation results and the payments made against them, kept in a
//! single JSON document. The engine never touches this module: callers stamp
//! a snapshot with [`CalculationResult::stamp`] and record it here.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::Currency;
use crate::inputs::IntoZakatDecimal;
use crate::types::{CalculationResult, ZakatError};

/// A payment made towards a stored calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: String,
    pub calculation_id: String,
    pub amount: Decimal,
    pub currency: Currency,
    pub paid_date: DateTime<Utc>,
    #[serde(default)]
    pub notes: String,
}

/// Caller-supplied fields of a new payment.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentDraft {
    pub calculation_id: String,
    pub amount: Decimal,
    pub currency: Currency,
    pub paid_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl PaymentDraft {
    pub fn new(
        calculation_id: impl Into<String>,
        amount: impl IntoZakatDecimal,
        currency: Currency,
    ) -> Result<Self, ZakatError> {
        let amount = amount.into_zakat_decimal()?;
        if amount <= Decimal::ZERO {
            return Err(ZakatError::invalid_input("amount", "Payment amount must be positive"));
        }
        Ok(Self {
            calculation_id: calculation_id.into(),
            amount,
            currency,
            paid_date: None,
            notes: None,
        })
    }

    pub fn paid_on(mut self, date: DateTime<Utc>) -> Self {
        self.paid_date = Some(date);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ZakatHistory {
    pub calculations: Vec<CalculationResult>,
    pub payments: Vec<Payment>,
}

impl ZakatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `result` unless a calculation with the same id is already stored.
    ///
    /// Returns `true` when the result was added.
    pub fn ensure_saved(&mut self, result: CalculationResult) -> bool {
        if self.calculation(&result.id).is_some() {
            debug!(id = %result.id, "Calculation already in history");
            return false;
        }
        self.calculations.push(result);
        true
    }

    pub fn calculation(&self, id: &str) -> Option<&CalculationResult> {
        self.calculations.iter().find(|calc| calc.id == id)
    }

    /// Records a payment against a stored calculation.
    pub fn add_payment(&mut self, draft: PaymentDraft) -> Result<&Payment, ZakatError> {
        if self.calculation(&draft.calculation_id).is_none() {
            return Err(ZakatError::invalid_input(
                "calculation_id",
                format!("No calculation '{}' in history", draft.calculation_id),
            ));
        }
        if draft.amount <= Decimal::ZERO {
            return Err(ZakatError::invalid_input("amount", "Payment amount must be positive"));
        }

        let payment = Payment {
            id: format!("pay_{}", Uuid::new_v4().simple()),
            calculation_id: draft.calculation_id,
            amount: draft.amount,
            currency: draft.currency,
            paid_date: draft.paid_date.unwrap_or_else(Utc::now),
            notes: draft.notes.unwrap_or_default(),
        };
        debug!(id = %payment.id, calculation = %payment.calculation_id, amount = %payment.amount, "Payment recorded");
        self.payments.push(payment);

        self.payments
            .last()
            .ok_or_else(|| ZakatError::Storage("Payment was not recorded".to_string()))
    }

    pub fn payments_for<'a>(&'a self, calculation_id: &'a str) -> impl Iterator<Item = &'a Payment> + 'a {
        self.payments
            .iter()
            .filter(move |payment| payment.calculation_id == calculation_id)
    }

    /// Sum of payments made in the calculation's base currency.
    ///
    /// Payments in any other currency are not converted and do not count.
    /// Zero for an unknown calculation.
    pub fn total_paid(&self, calculation_id: &str) -> Decimal {
        let Some(calc) = self.calculation(calculation_id) else {
            return Decimal::ZERO;
        };
        let base = calc.base_currency();

        self.payments_for(calculation_id)
            .filter(|payment| {
                let matches = payment.currency == base;
                if !matches {
                    warn!(id = %payment.id, currency = %payment.currency, %base, "Payment currency differs from base; ignored in totals");
                }
                matches
            })
            .fold(Decimal::ZERO, |acc, payment| acc.saturating_add(payment.amount))
    }

    /// `max(0, zakat_due - total_paid)`, or `None` for an unknown calculation.
    pub fn outstanding(&self, calculation_id: &str) -> Option<Decimal> {
        let calc = self.calculation(calculation_id)?;
        let remaining = calc.snapshot.zakat_due.saturating_sub(self.total_paid(calculation_id));
        Some(remaining.max(Decimal::ZERO))
    }
}

/// JSON file persistence for [`ZakatHistory`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the history file. A missing file is an empty history.
    pub fn load(&self) -> Result<ZakatHistory, ZakatError> {
        if !self.path.exists() {
            debug!(path = ?self.path, "No history file yet");
            return Ok(ZakatHistory::default());
        }

        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| ZakatError::Storage(format!("Failed to read {}: {}", self.path.display(), e)))?;
        let history = serde_json::from_str(&content)
            .map_err(|e| ZakatError::Storage(format!("Failed to parse {}: {}", self.path.display(), e)))?;

        debug!(path = ?self.path, "Loaded history");
        Ok(history)
    }

    /// Writes the history as pretty JSON, creating parent directories.
    pub fn save(&self, history: &ZakatHistory) -> Result<(), ZakatError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| ZakatError::Storage(format!("Failed to create {}: {}", parent.display(), e)))?;
        }

        let content = serde_json::to_string_pretty(history)
            .map_err(|e| ZakatError::Storage(format!("Failed to serialize history: {}", e)))?;
        std::fs::write(&self.path, content)
            .map_err(|e| ZakatError::Storage(format!("Failed to write {}: {}", self.path.display(), e)))?;

        debug!(path = ?self.path, calculations = history.calculations.len(), payments = history.payments.len(), "Saved history");
        Ok(())
    }
}

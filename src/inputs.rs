use rust_decimal::Decimal;
use std::str::FromStr;
use crate::types::ZakatError;

/// Trait for converting various types into `Decimal` for Zakat inputs.
///
/// This lets callers pass `i32`, `f64`, `&str`, etc. directly into
/// constructors such as `InventoryItem::with_amount` without wrapping them
/// in `dec!()` or `Decimal::from()`.
pub trait IntoZakatDecimal {
    fn into_zakat_decimal(self) -> Result<Decimal, ZakatError>;
}

impl IntoZakatDecimal for Decimal {
    fn into_zakat_decimal(self) -> Result<Decimal, ZakatError> {
        Ok(self)
    }
}

macro_rules! impl_into_zakat_decimal_int {
    ($($t:ty),*) => {
        $(
            impl IntoZakatDecimal for $t {
                fn into_zakat_decimal(self) -> Result<Decimal, ZakatError> {
                    Ok(Decimal::from(self))
                }
            }
        )*
    };
}

impl_into_zakat_decimal_int!(i32, u32, i64, u64, isize, usize);

// Floats go through their shortest textual form so 0.9999 stays 0.9999
// instead of picking up binary noise.
macro_rules! impl_into_zakat_decimal_float {
    ($($t:ty),*) => {
        $(
            impl IntoZakatDecimal for $t {
                fn into_zakat_decimal(self) -> Result<Decimal, ZakatError> {
                    if !self.is_finite() {
                        return Err(ZakatError::invalid_input("number", format!("Invalid float value: {}", self)));
                    }
                    Decimal::from_str(&self.to_string())
                        .or_else(|_| Decimal::from_scientific(&format!("{:e}", self)))
                        .map_err(|e| ZakatError::invalid_input("number", format!("Invalid float value {}: {}", self, e)))
                }
            }
        )*
    };
}

impl_into_zakat_decimal_float!(f32, f64);

impl IntoZakatDecimal for &str {
    fn into_zakat_decimal(self) -> Result<Decimal, ZakatError> {
        Decimal::from_str(self.trim())
            .map_err(|e| ZakatError::invalid_input("number", format!("Invalid string format: {}", e)))
    }
}

impl IntoZakatDecimal for String {
    fn into_zakat_decimal(self) -> Result<Decimal, ZakatError> {
        self.as_str().into_zakat_decimal()
    }
}

//! Fixed-point decimal values as stored by the engine.

use std::fmt;

use colview_result::{Error, Result};
use rust_decimal::Decimal;

/// Decimal stored as a scaled integer: the value is `value / 10^scale`.
///
/// The engine keeps the integer in 2, 4, 8 or 16 bytes depending on the column
/// width; this type always widens to `i128`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DecimalValue {
    pub value: i128,
    pub scale: u8,
}

impl DecimalValue {
    pub const fn new(value: i128, scale: u8) -> Self {
        Self { value, scale }
    }

    pub fn to_f64(self) -> f64 {
        self.value as f64 / 10f64.powi(i32::from(self.scale))
    }

    /// Convert into `rust_decimal::Decimal`, which holds 96-bit mantissas with
    /// up to 28 fractional digits.
    pub fn to_decimal(self) -> Result<Decimal> {
        Decimal::try_from_i128_with_scale(self.value, u32::from(self.scale))
            .map_err(|e| Error::domain(format!("DECIMAL {self} does not fit: {e}")))
    }
}

impl fmt::Display for DecimalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.value.unsigned_abs().to_string();
        let scale = usize::from(self.scale);
        let sign = if self.value < 0 { "-" } else { "" };
        if scale == 0 {
            return write!(f, "{sign}{digits}");
        }
        let padded = format!("{digits:0>width$}", width = scale + 1);
        let (int_part, frac_part) = padded.split_at(padded.len() - scale);
        write!(f, "{sign}{int_part}.{frac_part}")
    }
}

//! Flight deck calculators.
//!
//! Pure functions over plain numbers. Inputs are validated and rejected
//! with [`Error::InvalidInput`]; nothing here touches session state.

pub mod duty;
pub mod performance;
pub mod units;

pub use duty::{check_cumulative, check_fdp, CumulativeHours, Exceedance, FdpPlan};
pub use performance::{
    density_altitude, isa_deviation, isa_temperature, rate_one_turn, wind_components, Altimeter,
    DensityAltitude, IsaDeviation, RateOneTurn, WindComponents,
};
pub use units::{Distance, FuelQuantity, Temperature};

use crate::error::{Error, Result};

/// Reject NaN and infinities.
fn finite(calculator: &'static str, field: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::invalid_input(
            calculator,
            format!("{field} must be a finite number"),
        ))
    }
}

/// Reject negative, NaN and infinite values.
fn non_negative(calculator: &'static str, field: &str, value: f64) -> Result<f64> {
    let value = finite(calculator, field, value)?;
    if value < 0.0 {
        return Err(Error::invalid_input(
            calculator,
            format!("{field} cannot be negative"),
        ));
    }
    Ok(value)
}

/// Round to the nearest whole number.
#[allow(clippy::cast_possible_truncation)]
fn whole(value: f64) -> i64 {
    value.round() as i64
}

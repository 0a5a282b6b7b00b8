//! Fuel, distance and temperature conversions.
//!
//! Each quantity is built from any one of its units and carries all of them.

use super::{finite, non_negative};
use crate::error::Result;

/// Pounds per kilogram.
pub const LB_PER_KG: f64 = 2.204_62;

/// Kilometres per nautical mile.
pub const KM_PER_NM: f64 = 1.852;

/// Statute miles per nautical mile.
pub const SM_PER_NM: f64 = 1.150_78;

/// Statute miles per kilometre.
pub const SM_PER_KM: f64 = 0.621_371;

/// A fuel mass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuelQuantity {
    /// Kilograms.
    pub kg: f64,
    /// Pounds.
    pub lb: f64,
    /// Metric tonnes.
    pub tonnes: f64,
}

impl FuelQuantity {
    /// From kilograms.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidInput`] for a negative or non-finite mass.
    pub fn from_kg(kg: f64) -> Result<Self> {
        let kg = non_negative("fuel", "kilograms", kg)?;
        Ok(Self {
            kg,
            lb: kg * LB_PER_KG,
            tonnes: kg / 1000.0,
        })
    }

    /// From pounds.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidInput`] for a negative or non-finite mass.
    pub fn from_lb(lb: f64) -> Result<Self> {
        let lb = non_negative("fuel", "pounds", lb)?;
        Ok(Self {
            kg: lb / LB_PER_KG,
            lb,
            tonnes: lb / (LB_PER_KG * 1000.0),
        })
    }

    /// From metric tonnes.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidInput`] for a negative or non-finite mass.
    pub fn from_tonnes(tonnes: f64) -> Result<Self> {
        let tonnes = non_negative("fuel", "tonnes", tonnes)?;
        Ok(Self {
            kg: tonnes * 1000.0,
            lb: tonnes * LB_PER_KG * 1000.0,
            tonnes,
        })
    }
}

/// A distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Distance {
    /// Nautical miles.
    pub nm: f64,
    /// Kilometres.
    pub km: f64,
    /// Statute miles.
    pub sm: f64,
}

impl Distance {
    /// From nautical miles.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidInput`] for a negative or non-finite distance.
    pub fn from_nm(nm: f64) -> Result<Self> {
        let nm = non_negative("distance", "nautical miles", nm)?;
        Ok(Self {
            nm,
            km: nm * KM_PER_NM,
            sm: nm * SM_PER_NM,
        })
    }

    /// From kilometres.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidInput`] for a negative or non-finite distance.
    pub fn from_km(km: f64) -> Result<Self> {
        let km = non_negative("distance", "kilometres", km)?;
        Ok(Self {
            nm: km / KM_PER_NM,
            km,
            sm: km * SM_PER_KM,
        })
    }

    /// From statute miles.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidInput`] for a negative or non-finite distance.
    pub fn from_sm(sm: f64) -> Result<Self> {
        let sm = non_negative("distance", "statute miles", sm)?;
        Ok(Self {
            nm: sm / SM_PER_NM,
            km: sm / SM_PER_KM,
            sm,
        })
    }
}

/// A temperature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Temperature {
    /// Degrees Celsius.
    pub celsius: f64,
    /// Degrees Fahrenheit.
    pub fahrenheit: f64,
}

impl Temperature {
    /// From °C.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidInput`] for a non-finite value.
    pub fn from_celsius(celsius: f64) -> Result<Self> {
        let celsius = finite("temperature", "celsius", celsius)?;
        Ok(Self {
            celsius,
            fahrenheit: celsius * 9.0 / 5.0 + 32.0,
        })
    }

    /// From °F.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidInput`] for a non-finite value.
    pub fn from_fahrenheit(fahrenheit: f64) -> Result<Self> {
        let fahrenheit = finite("temperature", "fahrenheit", fahrenheit)?;
        Ok(Self {
            celsius: (fahrenheit - 32.0) * 5.0 / 9.0,
            fahrenheit,
        })
    }
}

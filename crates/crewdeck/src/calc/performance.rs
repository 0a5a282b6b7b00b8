//! Wind, turn, ISA and density altitude rules of thumb.

use std::f64::consts::PI;

use super::{finite, whole};
use crate::error::{Error, Result};

/// Hectopascals per inch of mercury.
pub const HPA_PER_IN_HG: f64 = 33.8639;

/// Standard sea level pressure, inches of mercury.
pub const STANDARD_PRESSURE_IN_HG: f64 = 29.92;

/// ISA sea level temperature, °C.
pub const ISA_SEA_LEVEL_C: f64 = 15.0;

/// ISA lapse rate, °C per 1000 ft.
pub const ISA_LAPSE_C_PER_1000_FT: f64 = 1.98;

/// Headwind and crosswind on a runway, in whole knots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindComponents {
    /// Along the runway; negative is a tailwind.
    pub headwind: i64,
    /// Across the runway, magnitude only.
    pub crosswind: i64,
}

impl WindComponents {
    /// Whether the along-runway component is behind the aircraft.
    #[must_use]
    pub fn is_tailwind(&self) -> bool {
        self.headwind < 0
    }
}

/// Resolve a wind into runway components.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] for non-finite values or a negative speed.
pub fn wind_components(
    runway_heading_deg: f64,
    wind_direction_deg: f64,
    wind_speed_kt: f64,
) -> Result<WindComponents> {
    let runway = finite("wind", "runway heading", runway_heading_deg)?;
    let direction = finite("wind", "wind direction", wind_direction_deg)?;
    let speed = super::non_negative("wind", "wind speed", wind_speed_kt)?;

    let angle = ((direction - runway) + 180.0).rem_euclid(360.0) - 180.0;
    let radians = angle.to_radians();

    Ok(WindComponents {
        headwind: whole(speed * radians.cos()),
        crosswind: whole((speed * radians.sin()).abs()),
    })
}

/// Bank angle and radius of a standard rate (3°/s) turn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateOneTurn {
    /// Approximate bank angle, whole degrees.
    pub bank_angle_deg: i64,
    /// Turn radius, nautical miles.
    pub radius_nm: f64,
}

/// Rate one turn at `tas_kt` true airspeed.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] unless the airspeed is a positive number.
pub fn rate_one_turn(tas_kt: f64) -> Result<RateOneTurn> {
    let tas = finite("rate one turn", "true airspeed", tas_kt)?;
    if tas <= 0.0 {
        return Err(Error::invalid_input(
            "rate one turn",
            "true airspeed must be positive",
        ));
    }

    let turn_rate = 3.0 * (PI / 180.0);
    Ok(RateOneTurn {
        bank_angle_deg: whole(tas / 10.0 + 7.0),
        radius_nm: tas / (turn_rate * 60.0),
    })
}

/// ISA temperature at a pressure altitude, °C.
#[must_use]
pub fn isa_temperature(altitude_ft: f64) -> f64 {
    ISA_SEA_LEVEL_C - altitude_ft / 1000.0 * ISA_LAPSE_C_PER_1000_FT
}

/// ISA reference and deviation at one altitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IsaDeviation {
    /// Standard temperature, °C.
    pub isa_temp_c: f64,
    /// Outside air temperature minus standard; positive is warmer.
    pub deviation_c: f64,
}

/// Compare outside air temperature with ISA.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] for non-finite values.
pub fn isa_deviation(altitude_ft: f64, oat_c: f64) -> Result<IsaDeviation> {
    let altitude = finite("ISA", "altitude", altitude_ft)?;
    let oat = finite("ISA", "outside air temperature", oat_c)?;
    let isa_temp_c = isa_temperature(altitude);
    Ok(IsaDeviation {
        isa_temp_c,
        deviation_c: oat - isa_temp_c,
    })
}

/// An altimeter setting in either unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Altimeter {
    /// Inches of mercury.
    InHg(f64),
    /// Hectopascals.
    Hpa(f64),
}

impl Altimeter {
    /// Setting in inches of mercury.
    #[must_use]
    pub fn in_hg(self) -> f64 {
        match self {
            Self::InHg(value) => value,
            Self::Hpa(value) => value / HPA_PER_IN_HG,
        }
    }

    /// Setting in hectopascals.
    #[must_use]
    pub fn hpa(self) -> f64 {
        match self {
            Self::InHg(value) => value * HPA_PER_IN_HG,
            Self::Hpa(value) => value,
        }
    }
}

/// Pressure and density altitude of an aerodrome.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DensityAltitude {
    /// Pressure altitude, whole feet.
    pub pressure_altitude_ft: i64,
    /// Density altitude, whole feet.
    pub density_altitude_ft: i64,
    /// The altimeter setting used, inches of mercury.
    pub altimeter_in_hg: f64,
    /// The altimeter setting used, hectopascals.
    pub altimeter_hpa: f64,
}

/// Density altitude by the 1 inHg ≈ 1000 ft and 120 ft/°C rules.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] for non-finite values or a non-positive
/// altimeter setting.
#[allow(clippy::cast_precision_loss)]
pub fn density_altitude(
    field_elevation_ft: f64,
    altimeter: Altimeter,
    oat_c: f64,
) -> Result<DensityAltitude> {
    let elevation = finite("density altitude", "field elevation", field_elevation_ft)?;
    let oat = finite("density altitude", "outside air temperature", oat_c)?;
    let in_hg = finite("density altitude", "altimeter setting", altimeter.in_hg())?;
    if in_hg <= 0.0 {
        return Err(Error::invalid_input(
            "density altitude",
            "altimeter setting must be positive",
        ));
    }

    let pressure_altitude_ft = whole(elevation + (STANDARD_PRESSURE_IN_HG - in_hg) * 1000.0);
    let isa = isa_temperature(pressure_altitude_ft as f64);
    let density_altitude_ft = whole(pressure_altitude_ft as f64 + 120.0 * (oat - isa));

    Ok(DensityAltitude {
        pressure_altitude_ft,
        density_altitude_ft,
        altimeter_in_hg: in_hg,
        altimeter_hpa: altimeter.hpa(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_wind_straight_down_runway() {
        let wind = wind_components(270.0, 270.0, 20.0).unwrap();
        assert_eq!(wind, WindComponents { headwind: 20, crosswind: 0 });
        assert!(!wind.is_tailwind());
    }

    #[test]
    fn test_wind_tailwind() {
        let wind = wind_components(90.0, 270.0, 15.0).unwrap();
        assert_eq!(wind.headwind, -15);
        assert_eq!(wind.crosswind, 0);
        assert!(wind.is_tailwind());
    }

    #[test]
    fn test_wind_crosswind_either_side() {
        let right = wind_components(360.0, 90.0, 12.0).unwrap();
        let left = wind_components(360.0, 270.0, 12.0).unwrap();
        assert_eq!(right, WindComponents { headwind: 0, crosswind: 12 });
        assert_eq!(left, right);
    }

    #[test]
    fn test_wind_thirty_degrees_off() {
        let wind = wind_components(270.0, 300.0, 20.0).unwrap();
        assert_eq!(wind, WindComponents { headwind: 17, crosswind: 10 });
    }

    #[test]
    fn test_wind_wraps_through_north() {
        let wind = wind_components(10.0, 350.0, 20.0).unwrap();
        assert_eq!(wind, WindComponents { headwind: 19, crosswind: 7 });
    }

    #[test]
    fn test_wind_invalid() {
        assert!(wind_components(f64::NAN, 0.0, 10.0).is_err());
        assert!(wind_components(90.0, 90.0, -5.0).is_err());
    }

    #[test]
    fn test_rate_one_turn() {
        let turn = rate_one_turn(250.0).unwrap();
        assert_eq!(turn.bank_angle_deg, 32);
        assert!((turn.radius_nm - 250.0 / PI).abs() < 1e-9);
    }

    #[test]
    fn test_rate_one_turn_rejects_non_positive() {
        assert!(rate_one_turn(0.0).is_err());
        assert!(rate_one_turn(-120.0).is_err());
        assert!(rate_one_turn(f64::INFINITY).is_err());
    }

    #[test]
    fn test_isa_temperature() {
        assert!(close(isa_temperature(0.0), 15.0));
        assert!(close(isa_temperature(10_000.0), -4.8));
    }

    #[test]
    fn test_isa_deviation() {
        let isa = isa_deviation(35_000.0, -45.0).unwrap();
        assert!(close(isa.isa_temp_c, -54.3));
        assert!(close(isa.deviation_c, 9.3));
    }

    #[test]
    fn test_altimeter_conversions() {
        assert!(close(Altimeter::InHg(29.92).hpa(), 29.92 * 33.8639));
        assert!(close(Altimeter::Hpa(1013.25).in_hg(), 1013.25 / 33.8639));
    }

    #[test]
    fn test_density_altitude_standard_day() {
        let result = density_altitude(0.0, Altimeter::InHg(29.92), 15.0).unwrap();
        assert_eq!(result.pressure_altitude_ft, 0);
        assert_eq!(result.density_altitude_ft, 0);
    }

    #[test]
    fn test_density_altitude_hot_and_high() {
        let result = density_altitude(5_000.0, Altimeter::InHg(29.92), 30.0).unwrap();
        assert_eq!(result.pressure_altitude_ft, 5_000);
        // ISA at 5000 ft is 5.1 °C, so 24.9 °C above.
        assert_eq!(result.density_altitude_ft, 7_988);
    }

    #[test]
    fn test_density_altitude_low_pressure_in_hpa() {
        let result = density_altitude(0.0, Altimeter::Hpa(29.42 * HPA_PER_IN_HG), 15.0).unwrap();
        assert_eq!(result.pressure_altitude_ft, 500);
        assert!(close(result.altimeter_in_hg, 29.42));
    }

    #[test]
    fn test_density_altitude_invalid() {
        assert!(density_altitude(0.0, Altimeter::InHg(0.0), 15.0).is_err());
        assert!(density_altitude(0.0, Altimeter::Hpa(f64::NAN), 15.0).is_err());
        assert!(density_altitude(0.0, Altimeter::InHg(29.92), f64::NAN).is_err());
    }
}

//! Flight time limitation checks.
//!
//! Limits follow the operator's flight time limitation scheme: FDP
//! extensions, commander's discretion, and rolling duty and flying totals.

use super::non_negative;
use crate::error::Result;

/// Longest extended FDP with a crew rest bunk, hours.
pub const FDP_EXTENSION_WITH_BUNK_HOURS: f64 = 18.0;

/// Longest extended FDP without a bunk, hours.
pub const FDP_EXTENSION_WITHOUT_BUNK_HOURS: f64 = 15.0;

/// Most the commander may extend at their discretion, hours.
pub const COMMANDERS_DISCRETION_HOURS: f64 = 3.0;

/// A cumulative limit over a rolling period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CumulativeLimit {
    /// Human-readable name.
    pub name: &'static str,
    /// Maximum hours in the period.
    pub max_hours: f64,
}

/// Duty hours in any 7 consecutive days.
pub const DUTY_7_DAYS: CumulativeLimit = CumulativeLimit {
    name: "duty hours in 7 days",
    max_hours: 55.0,
};

/// Duty hours in any 14 consecutive days.
pub const DUTY_14_DAYS: CumulativeLimit = CumulativeLimit {
    name: "duty hours in 14 days",
    max_hours: 90.0,
};

/// Duty hours in any 28 consecutive days.
pub const DUTY_28_DAYS: CumulativeLimit = CumulativeLimit {
    name: "duty hours in 28 days",
    max_hours: 190.0,
};

/// Flying hours in 28 days.
pub const FLYING_28_DAYS: CumulativeLimit = CumulativeLimit {
    name: "flying hours in 28 days",
    max_hours: 100.0,
};

/// Flying hours in 12 months.
pub const FLYING_12_MONTHS: CumulativeLimit = CumulativeLimit {
    name: "flying hours in 12 months",
    max_hours: 900.0,
};

/// A limit that was broken.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Exceedance {
    /// Which limit.
    pub limit: &'static str,
    /// The limit, hours.
    pub max_hours: f64,
    /// The value checked, hours.
    pub actual_hours: f64,
}

impl Exceedance {
    /// Hours over the limit.
    #[must_use]
    pub fn excess_hours(&self) -> f64 {
        self.actual_hours - self.max_hours
    }
}

/// Rolling totals to check against the cumulative limits.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CumulativeHours {
    /// Duty in the last 7 days.
    pub duty_7_days: f64,
    /// Duty in the last 14 days.
    pub duty_14_days: f64,
    /// Duty in the last 28 days.
    pub duty_28_days: f64,
    /// Flying in the last 28 days.
    pub flying_28_days: f64,
    /// Flying in the last 12 months.
    pub flying_12_months: f64,
}

/// Every cumulative limit that `hours` breaks.
///
/// Reaching a limit exactly is allowed.
///
/// # Errors
///
/// Returns [`crate::Error::InvalidInput`] for negative or non-finite totals.
pub fn check_cumulative(hours: &CumulativeHours) -> Result<Vec<Exceedance>> {
    let checks = [
        (DUTY_7_DAYS, hours.duty_7_days),
        (DUTY_14_DAYS, hours.duty_14_days),
        (DUTY_28_DAYS, hours.duty_28_days),
        (FLYING_28_DAYS, hours.flying_28_days),
        (FLYING_12_MONTHS, hours.flying_12_months),
    ];

    let mut exceeded = Vec::new();
    for (limit, actual) in checks {
        let actual = non_negative("duty limits", limit.name, actual)?;
        if actual > limit.max_hours {
            exceeded.push(Exceedance {
                limit: limit.name,
                max_hours: limit.max_hours,
                actual_hours: actual,
            });
        }
    }
    Ok(exceeded)
}

/// Longest FDP reachable by extension.
#[must_use]
pub fn max_extended_fdp(bunk_available: bool) -> f64 {
    if bunk_available {
        FDP_EXTENSION_WITH_BUNK_HOURS
    } else {
        FDP_EXTENSION_WITHOUT_BUNK_HOURS
    }
}

/// A planned flight duty period.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FdpPlan {
    /// Total FDP including any discretion, hours.
    pub fdp_hours: f64,
    /// Whether a crew rest bunk is on board.
    pub bunk_available: bool,
    /// Part of the FDP taken as commander's discretion, hours.
    pub discretion_hours: f64,
}

/// Every FDP limit that `plan` breaks.
///
/// Discretion is checked against its own cap; the rest of the FDP is
/// checked against the extension cap.
///
/// # Errors
///
/// Returns [`crate::Error::InvalidInput`] for negative or non-finite hours,
/// or discretion longer than the FDP itself.
pub fn check_fdp(plan: &FdpPlan) -> Result<Vec<Exceedance>> {
    let fdp = non_negative("duty limits", "FDP", plan.fdp_hours)?;
    let discretion = non_negative("duty limits", "discretion", plan.discretion_hours)?;
    if discretion > fdp {
        return Err(crate::Error::invalid_input(
            "duty limits",
            "discretion cannot exceed the FDP",
        ));
    }

    let mut exceeded = Vec::new();
    if discretion > COMMANDERS_DISCRETION_HOURS {
        exceeded.push(Exceedance {
            limit: "commander's discretion",
            max_hours: COMMANDERS_DISCRETION_HOURS,
            actual_hours: discretion,
        });
    }

    let extension_cap = max_extended_fdp(plan.bunk_available);
    let base = fdp - discretion;
    if base > extension_cap {
        exceeded.push(Exceedance {
            limit: "extended FDP",
            max_hours: extension_cap,
            actual_hours: base,
        });
    }
    Ok(exceeded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_within_all_cumulative_limits() {
        let hours = CumulativeHours {
            duty_7_days: 55.0,
            duty_14_days: 80.0,
            duty_28_days: 150.0,
            flying_28_days: 90.0,
            flying_12_months: 800.0,
        };
        assert!(check_cumulative(&hours).unwrap().is_empty());
    }

    #[test]
    fn test_reports_every_exceeded_limit() {
        let hours = CumulativeHours {
            duty_7_days: 56.5,
            duty_14_days: 80.0,
            duty_28_days: 191.0,
            flying_28_days: 101.0,
            flying_12_months: 500.0,
        };

        let exceeded = check_cumulative(&hours).unwrap();

        let names: Vec<_> = exceeded.iter().map(|e| e.limit).collect();
        assert_eq!(
            names,
            vec![
                "duty hours in 7 days",
                "duty hours in 28 days",
                "flying hours in 28 days"
            ]
        );
        assert!((exceeded[0].excess_hours() - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_cumulative_rejects_negative() {
        let hours = CumulativeHours {
            flying_12_months: -1.0,
            ..CumulativeHours::default()
        };
        assert!(check_cumulative(&hours).is_err());
    }

    #[test]
    fn test_extension_caps() {
        assert!((max_extended_fdp(true) - 18.0).abs() < f64::EPSILON);
        assert!((max_extended_fdp(false) - 15.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_fdp_within_limits() {
        let plan = FdpPlan {
            fdp_hours: 17.0,
            bunk_available: true,
            discretion_hours: 2.0,
        };
        assert!(check_fdp(&plan).unwrap().is_empty());
    }

    #[test]
    fn test_fdp_without_bunk_exceeded() {
        let plan = FdpPlan {
            fdp_hours: 16.0,
            bunk_available: false,
            discretion_hours: 0.0,
        };

        let exceeded = check_fdp(&plan).unwrap();

        assert_eq!(exceeded.len(), 1);
        assert_eq!(exceeded[0].limit, "extended FDP");
        assert!((exceeded[0].max_hours - 15.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_discretion_over_cap() {
        let plan = FdpPlan {
            fdp_hours: 19.5,
            bunk_available: true,
            discretion_hours: 3.5,
        };

        let exceeded = check_fdp(&plan).unwrap();

        assert_eq!(exceeded.len(), 1);
        assert_eq!(exceeded[0].limit, "commander's discretion");
    }

    #[test]
    fn test_fdp_invalid() {
        let plan = FdpPlan {
            fdp_hours: 2.0,
            bunk_available: true,
            discretion_hours: 3.0,
        };
        assert!(check_fdp(&plan).is_err());
        assert!(check_fdp(&FdpPlan {
            fdp_hours: f64::NAN,
            ..FdpPlan::default()
        })
        .is_err());
    }
}

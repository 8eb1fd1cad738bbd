//! Bottle and 9-liter case conversions
//!
//! A standard case holds 9000 mL: 12 × 750 mL or 6 × 1500 mL. Other bottle
//! sizes convert proportionally. Neither the form nor the server applies these
//! automatically; submitted quantities are used verbatim.

/// Volume of one 9-liter case in milliliters
pub const CASE_VOLUME_ML: f64 = 9000.0;

/// Standard 750 mL bottle
pub const STANDARD_BOTTLE_ML: u32 = 750;

/// Magnum (1.5 L) bottle
pub const MAGNUM_BOTTLE_ML: u32 = 1500;

/// Bottles per case for the two standard sizes, `None` for anything else
pub fn bottles_per_case(volume_ml: u32) -> Option<u32> {
    match volume_ml {
        STANDARD_BOTTLE_ML => Some(12),
        MAGNUM_BOTTLE_ML => Some(6),
        _ => None,
    }
}

/// True for the sizes whose case quantity the form accepts
pub fn is_case_volume(volume_ml: u32) -> bool {
    bottles_per_case(volume_ml).is_some()
}

/// Convert a bottle count into 9L cases
pub fn calculate_cases(bottles: f64, volume_ml: u32) -> f64 {
    match bottles_per_case(volume_ml) {
        Some(per_case) => bottles / per_case as f64,
        None => (bottles * volume_ml as f64) / CASE_VOLUME_ML,
    }
}

/// Convert a 9L case count into bottles
///
/// Returns infinity for a zero volume, like any division by zero would.
pub fn calculate_bottles(cases: f64, volume_ml: u32) -> f64 {
    match bottles_per_case(volume_ml) {
        Some(per_case) => cases * per_case as f64,
        None => (cases * CASE_VOLUME_ML) / volume_ml as f64,
    }
}

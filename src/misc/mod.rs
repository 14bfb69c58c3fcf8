use std::collections::HashMap as OriginalHashMap;
use std::hash::BuildHasherDefault;
use twox_hash::XxHash64;
use nohash_hasher::IntMap;

/// Arbitrary HashMap using more performant hashing algorithm
pub type FullHashMap<K, V> = OriginalHashMap<K, V, BuildHasherDefault<XxHash64>>;

/// HashMap for Int Types using more performant hashing algorithm
pub type HashMap<K, V> = IntMap<K, V>;

/// Integer tolerance. Same as gurobi
pub const INT_FEAS_TOL: f64 = 1e-5;

/// Tolerance used when checking a 0/1 vector against a row
pub const ROW_FEAS_TOL: f64 = 1e-9;

/// Returns the integer value of `value` if it is integral within `INT_FEAS_TOL`
pub fn as_integer(value: f64) -> Option<u64> {
    let rounded = value.round();
    if value >= 0.0 && (value - rounded).abs() < INT_FEAS_TOL {
        Some(rounded as u64)
    } else {
        None
    }
}

/// `2^exponent` as float
pub fn power_of_two(exponent: u32) -> f64 {
    debug_assert!(exponent < 64);
    (1u64 << exponent) as f64
}

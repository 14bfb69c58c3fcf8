use thiserror::Error;

/// Result type alias for the pricing core
pub type Result<T> = std::result::Result<T, PricingError>;

/// Errors raised by the pricing core.
///
/// Everything here is fatal for the current instance. A pricing call that
/// simply finds no improving column returns `Ok` with an empty list instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PricingError {
    #[error("instance has no items")]
    EmptyInstance,

    #[error("roll length must be positive")]
    InvalidRollLength,

    #[error("widths and demands differ in length ({widths} widths, {demands} demands)")]
    MismatchedItemData { widths: usize, demands: usize },

    #[error("item {item} has width zero")]
    InvalidWidth { item: usize },

    #[error("item {item} of width {width} does not fit a roll of length {roll_length}")]
    ItemTooWide {
        item: usize,
        width: u32,
        roll_length: u32,
    },

    #[error("perturbation factor {factor} must lie in (0, 1)")]
    InvalidPerturbation { factor: f64 },

    #[error("pattern references unknown item {item}")]
    UnknownItem { item: usize },

    #[error("count {count} of item {item} is not representable in {bits} bits")]
    PatternNotRepresentable { item: usize, count: f64, bits: u32 },

    #[error("pricing used before an instance was configured")]
    NotConfigured,

    #[error("expected {expected} dual prices, got {got}")]
    DualLengthMismatch { expected: usize, got: usize },

    /// The knapsack search did not terminate within its ceiling.
    /// This is a bug in the bounding rule, never a property of the input.
    #[error("knapsack oracle exceeded {limit} iterations on {num_vars} variables")]
    OracleIterationLimit { limit: u64, num_vars: usize },
}

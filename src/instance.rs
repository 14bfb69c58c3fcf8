use crate::error::{PricingError, Result};

/// Immutable description of a cutting stock instance.
///
/// The knife limit caps the number of parallel cuts per roll,
/// `None` means the machine has no such restriction.
#[derive(Debug, Clone, PartialEq)]
pub struct CuttingStockInstance {
    pub roll_length: u32,
    pub widths: Vec<u32>,
    pub demands: Vec<u32>,
    pub knife_limit: Option<u32>,

    /// Emit parity rows for every pair of excluded patterns
    pub combine_exclusions: bool,
    /// Emit Chvatal-Gomory rounded parity rows for every pair of excluded patterns
    pub round_parity: bool,
    /// Emit MIR rows derived from the capacity row
    pub add_knapsack_mir: bool,
    /// Emit MIR rows derived from the knife row
    pub add_knife_mir: bool,
}

impl CuttingStockInstance {
    pub fn new(roll_length: u32, widths: Vec<u32>, demands: Vec<u32>) -> Self {
        CuttingStockInstance {
            roll_length,
            widths,
            demands,
            knife_limit: None,
            combine_exclusions: false,
            round_parity: false,
            add_knapsack_mir: false,
            add_knife_mir: false,
        }
    }

    /// Negative limits disable the knife row
    pub fn with_knife_limit(mut self, knives: i32) -> Self {
        self.knife_limit = u32::try_from(knives).ok();
        self
    }

    pub fn with_combined_exclusions(mut self, enabled: bool) -> Self {
        self.combine_exclusions = enabled;
        self
    }

    pub fn with_rounded_parity(mut self, enabled: bool) -> Self {
        self.round_parity = enabled;
        self
    }

    pub fn with_knapsack_mir(mut self, enabled: bool) -> Self {
        self.add_knapsack_mir = enabled;
        self
    }

    pub fn with_knife_mir(mut self, enabled: bool) -> Self {
        self.add_knife_mir = enabled;
        self
    }

    pub fn num_items(&self) -> usize {
        self.widths.len()
    }

    pub fn roll(&self) -> f64 {
        f64::from(self.roll_length)
    }

    /// Right hand side of the knife row, `S * L`
    pub fn knife_capacity(&self) -> Option<f64> {
        self.knife_limit.map(|s| f64::from(s) * self.roll())
    }

    /// Slack a single copy of `item` leaves on its cut
    pub fn knife_slack(&self, item: usize) -> f64 {
        f64::from(self.roll_length - self.widths[item])
    }

    /// Largest number of copies of `item` that fit a single roll
    pub fn max_copies(&self, item: usize) -> u32 {
        self.roll_length / self.widths[item]
    }

    /// Reject instances the binary expansion cannot represent
    pub fn validate(&self) -> Result<()> {
        if self.widths.is_empty() {
            return Err(PricingError::EmptyInstance);
        }
        if self.roll_length == 0 {
            return Err(PricingError::InvalidRollLength);
        }
        if self.widths.len() != self.demands.len() {
            return Err(PricingError::MismatchedItemData {
                widths: self.widths.len(),
                demands: self.demands.len(),
            });
        }

        for (item, &width) in self.widths.iter().enumerate() {
            if width == 0 {
                return Err(PricingError::InvalidWidth { item });
            }
            if width > self.roll_length {
                return Err(PricingError::ItemTooWide {
                    item,
                    width,
                    roll_length: self.roll_length,
                });
            }
        }

        Ok(())
    }
}

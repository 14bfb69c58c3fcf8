use crate::error::{PricingError, Result};
use crate::instance::CuttingStockInstance;
use crate::misc::{as_integer, power_of_two};
use crate::pattern::Pattern;

/// A single knapsack variable: bit `bit` of the count of `item`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BitVar {
    pub item: usize,
    pub bit: u32,
}

/// Binary encoding of per-item counts.
///
/// Item `i` gets `ceil(log2(1 + floor(L / w_i)))` bits. Variables of one item
/// are contiguous and ordered by increasing bit.
#[derive(Debug, Clone, PartialEq)]
pub struct BitExpansion {
    bits: Vec<u32>,
    offsets: Vec<usize>,
    vars: Vec<BitVar>,
    max_bits: u32,
    // per variable, cached for the pricing loop
    weights: Vec<f64>,
    knife_weights: Vec<f64>,
}

/// Number of bits needed to count up to `floor(roll_length / width)` copies
pub fn bits_for(roll_length: u32, width: u32) -> u32 {
    let copies = roll_length / width;
    (f64::from(copies) + 1.0).log2().ceil() as u32
}

impl BitExpansion {
    pub fn build(instance: &CuttingStockInstance) -> Result<Self> {
        instance.validate()?;

        let mut bits = Vec::with_capacity(instance.num_items());
        let mut offsets = Vec::with_capacity(instance.num_items() + 1);
        let mut vars = Vec::new();
        let mut weights = Vec::new();
        let mut knife_weights = Vec::new();

        offsets.push(0);
        for (item, &width) in instance.widths.iter().enumerate() {
            let item_bits = bits_for(instance.roll_length, width);
            debug_assert!(item_bits >= 1);

            for bit in 0..item_bits {
                vars.push(BitVar { item, bit });
                weights.push(f64::from(width) * power_of_two(bit));
                knife_weights.push(instance.knife_slack(item) * power_of_two(bit));
            }

            bits.push(item_bits);
            offsets.push(vars.len());
        }

        let max_bits = bits.iter().copied().max().unwrap_or(0);

        Ok(BitExpansion {
            bits,
            offsets,
            vars,
            max_bits,
            weights,
            knife_weights,
        })
    }

    pub fn num_vars(&self) -> usize {
        self.vars.len()
    }

    pub fn num_items(&self) -> usize {
        self.bits.len()
    }

    pub fn max_bits(&self) -> u32 {
        self.max_bits
    }

    pub fn bits(&self, item: usize) -> u32 {
        self.bits[item]
    }

    pub fn var(&self, v: usize) -> BitVar {
        self.vars[v]
    }

    pub fn vars(&self) -> &[BitVar] {
        &self.vars
    }

    pub fn var_index(&self, item: usize, bit: u32) -> usize {
        debug_assert!(bit < self.bits[item]);
        self.offsets[item] + bit as usize
    }

    /// Number of copies variable `v` stands for
    pub fn value(&self, v: usize) -> f64 {
        power_of_two(self.vars[v].bit)
    }

    /// Capacity row coefficient, `w_i * 2^bit`
    pub fn weight(&self, v: usize) -> f64 {
        self.weights[v]
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Knife row coefficient, `(L - w_i) * 2^bit`
    pub fn knife_weight(&self, v: usize) -> f64 {
        self.knife_weights[v]
    }

    pub fn knife_weights(&self) -> &[f64] {
        &self.knife_weights
    }

    /// Writes the binary encoding of `count` copies of `item` into `x`.
    pub fn encode(&self, item: usize, count: f64, x: &mut [bool]) -> Result<()> {
        let bits = *self.bits.get(item).ok_or(PricingError::UnknownItem { item })?;
        let not_representable = PricingError::PatternNotRepresentable { item, count, bits };

        let value = as_integer(count).ok_or_else(|| not_representable.clone())?;
        if value >> bits != 0 {
            return Err(not_representable);
        }

        for bit in 0..bits {
            x[self.var_index(item, bit)] = value & (1 << bit) != 0;
        }
        Ok(())
    }

    /// Dense 0/1 encoding of a whole pattern
    pub fn encode_pattern(&self, pattern: &Pattern) -> Result<Vec<bool>> {
        let mut x = vec![false; self.num_vars()];
        for (&item, &count) in pattern.counts() {
            self.encode(item, count, &mut x)?;
        }
        Ok(x)
    }

    /// Per-item counts of a dense 0/1 solution
    pub fn decode_counts(&self, x: &[bool]) -> Vec<f64> {
        let mut counts = vec![0.0; self.num_items()];
        for (v, _) in x.iter().enumerate().filter(|(_, set)| **set) {
            counts[self.vars[v].item] += self.value(v);
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_are_tight() {
        for roll in [1u32, 7, 8, 9, 100, 255, 256, 1000] {
            for width in 1..=roll.min(300) {
                let copies = u64::from(roll / width);
                let bits = bits_for(roll, width);
                assert!((1u64 << bits) - 1 >= copies, "roll {} width {}", roll, width);
                assert!(copies > (1u64 << (bits - 1)) - 1, "roll {} width {}", roll, width);
            }
        }
    }

    #[test]
    fn longest_roll_does_not_overflow() {
        assert_eq!(bits_for(u32::MAX, 1), 32);
        assert_eq!(bits_for(u32::MAX, u32::MAX), 1);
    }

    #[test]
    fn encode_rejects_oversized_counts() {
        let instance = CuttingStockInstance::new(100, vec![45, 36], vec![3, 5]);
        let expansion = BitExpansion::build(&instance).unwrap();
        let mut x = vec![false; expansion.num_vars()];

        assert!(expansion.encode(0, 3.0, &mut x).is_ok());
        assert!(matches!(
            expansion.encode(0, 4.0, &mut x),
            Err(PricingError::PatternNotRepresentable { item: 0, bits: 2, .. })
        ));
        assert!(matches!(
            expansion.encode(1, 1.5, &mut x),
            Err(PricingError::PatternNotRepresentable { .. })
        ));
        assert!(matches!(
            expansion.encode(5, 1.0, &mut x),
            Err(PricingError::UnknownItem { item: 5 })
        ));
    }
}

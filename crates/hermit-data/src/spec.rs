//! Resource specification vectors.

use serde::{Deserialize, Serialize};

/// A resource vector in fixed-precision integers.
///
/// Dual use: attached to a [`crate::ResourceOffer`] it is an absolute
/// capacity; attached to a [`crate::Module`] it is a minimum requirement.
/// Partial GPUs rarely make sense, but fixing the precision to 1/1000
/// avoids floats on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spec {
    /// Milli-GPU.
    pub gpu: u64,
    /// Milli-CPU.
    pub cpu: u64,
    /// Megabytes of RAM.
    pub ram: u64,
}

impl Spec {
    /// Creates a spec from its three components.
    #[must_use]
    pub const fn new(gpu: u64, cpu: u64, ram: u64) -> Self {
        Self { gpu, cpu, ram }
    }

    /// Component-wise dominance: true iff this capacity covers `required`
    /// on every axis. No substitution across dimensions.
    #[must_use]
    pub const fn satisfies(&self, required: &Self) -> bool {
        self.gpu >= required.gpu && self.cpu >= required.cpu && self.ram >= required.ram
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(Spec::new(1000, 2000, 4096), Spec::new(500, 1000, 2048), true; "dominates on all axes")]
    #[test_case(Spec::new(0, 0, 0), Spec::new(1, 0, 0), false; "zero capacity fails nonzero requirement")]
    #[test_case(Spec::new(0, 0, 0), Spec::new(0, 0, 0), true; "all-zero satisfies all-zero")]
    #[test_case(Spec::new(1000, 1000, 1024), Spec::new(1000, 1000, 2048), false; "short on ram")]
    #[test_case(Spec::new(500, 4000, 8192), Spec::new(1000, 1000, 1024), false; "no substitution across axes")]
    fn dominance(offered: Spec, required: Spec, expected: bool) {
        assert_eq!(offered.satisfies(&required), expected);
    }

    #[test]
    fn json_field_names() {
        let spec = Spec::new(1, 2, 3);
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json, serde_json::json!({"gpu": 1, "cpu": 2, "ram": 3}));
    }
}

//! Flag engine: one ordered pass of `when -> setFlags` rules over inventory
//! data. Flag rules see no flags, only inventory fields and repeat blocks.

use riskmap_interchange::{FlagMap, InventorySchema, Record, RepeatingBlockSet};
use tracing::debug;

use crate::condition::{eval_when, ConditionContext};

/// Compute flags: declared defaults, then every firing rule in order
/// (last write wins).
pub fn compute_flags(
    schema: &InventorySchema,
    inventory: &Record,
    blocks: &RepeatingBlockSet,
) -> FlagMap {
    let mut flags = schema.flag_defaults.clone();
    let ctx = ConditionContext::new(inventory, blocks);

    for (index, rule) in schema.rules.iter().enumerate() {
        let (Some(when), Some(set_flags)) = (&rule.when, &rule.set_flags) else {
            continue;
        };
        if eval_when(when, &ctx) {
            debug!(rule = %rule.label(index), flags = ?set_flags.0.keys().collect::<Vec<_>>(), "flag rule fired");
            flags.merge(set_flags);
        }
    }

    flags
}

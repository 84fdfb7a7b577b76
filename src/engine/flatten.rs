use super::{AssetCycles, FlattenedCycle};

/// Merge per-asset cycle lists into one list, newest first.
///
/// Global sequence numbers are assigned in enumeration order (asset order, then cycle
/// sequence) before sorting; the sort is stable, so cycles sharing a `start_date` keep that
/// relative order.
pub fn flatten_cycles(assets: &[AssetCycles]) -> Vec<FlattenedCycle> {
    let mut flattened: Vec<FlattenedCycle> = assets
        .iter()
        .flat_map(|asset| asset.cycles.iter())
        .zip(1u32..)
        .map(|(cycle, global_sequence)| FlattenedCycle {
            global_sequence,
            cycle: cycle.clone(),
        })
        .collect();

    flattened.sort_by(|a, b| b.cycle.start_date.cmp(&a.cycle.start_date));
    flattened
}

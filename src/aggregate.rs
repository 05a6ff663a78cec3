//! Reduction of the collected inventory into the channel tally.

use crate::inventory::Inventory;
use indexmap::IndexMap;

/// Histogram of access-point counts per channel identifier, in first-seen
/// order. Consumers must not rely on numeric or lexical ordering.
pub type ChannelTally = IndexMap<String, u64>;

/// Reduce the inventory's radio observations into a channel tally. Channels
/// outside `allowlist` (narrower-bandwidth identifiers among them) are
/// ignored entirely. Pure over an unmodified inventory: calling it twice
/// yields identical tallies.
pub fn aggregate(inventory: &Inventory, allowlist: &[String]) -> ChannelTally {
    let mut tally = ChannelTally::new();
    for radio in inventory.radios() {
        if allowlist.iter().any(|channel| *channel == radio.channel) {
            *tally.entry(radio.channel).or_insert(0) += 1;
        }
    }
    tally
}

/// One `channel,count` line per entry, no header.
pub fn to_csv(tally: &ChannelTally) -> String {
    tally
        .iter()
        .map(|(channel, count)| format!("{channel},{count}\n"))
        .collect()
}

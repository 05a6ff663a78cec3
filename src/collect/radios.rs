//! Radio summary collection from the controller tier.

use crate::{
    api::{
        ApiError,
        DeviceQuery,
        SessionCredential,
    },
    inventory::{
        Inventory,
        RadioObservation,
    },
};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

const SHOW_RADIO_SUMMARY: &str = "show ap radio-summary";

/// Band strings for the 6 GHz spectrum start with this prefix ("6GHz",
/// "6GHz (secondary)", ...).
const SIX_GHZ_PREFIX: &str = "6";

#[derive(Debug, Deserialize)]
struct RadioSummaryDocument {
    #[serde(rename = "APs Radios information")]
    radios: Vec<RadioSummaryEntry>,
}

#[derive(Debug, Deserialize)]
struct RadioSummaryEntry {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Band")]
    band: String,
    #[serde(rename = "AP Type")]
    model: String,
    #[serde(rename = "Group")]
    group: String,
    #[serde(rename = "Mode")]
    mode: String,
}

/// Query a controller's radio summary and record every 6 GHz radio of an AP
/// this controller owns. Must run after AP collection has completed for all
/// controllers: the owning AP record is the join point. Returns the number
/// of observations inserted.
pub async fn collect_radios(
    client: &dyn DeviceQuery,
    credential: &SessionCredential,
    inventory: &Inventory,
) -> Result<usize, ApiError> {
    let document = client.show_command(credential, SHOW_RADIO_SUMMARY).await?;
    ingest_radio_summary(&credential.host, document, inventory)
        .map_err(|source| ApiError::unexpected_shape(&credential.host, SHOW_RADIO_SUMMARY, source))
}

/// The primary-controller match guards against double-counting an AP that
/// briefly appears reachable from more than one controller. The mode string
/// packs `<bandwidth-class>:<primary-channel>:<channel-id>`; only the
/// channel id is consumed here.
fn ingest_radio_summary(host: &str, document: Value, inventory: &Inventory) -> Result<usize, serde_json::Error> {
    let document: RadioSummaryDocument = serde_json::from_value(document)?;
    let mut inserted = 0;

    for entry in document.radios {
        // Radios without a matching AP record are unmatched; drop them.
        let Some(ap) = inventory.ap(&entry.name) else {
            continue;
        };
        if ap.primary != host || !entry.band.starts_with(SIX_GHZ_PREFIX) {
            continue;
        }
        let Some(channel) = entry.mode.split(':').nth(2) else {
            debug!(ap = %entry.name, mode = %entry.mode, "census: mode string without a channel field");
            continue;
        };
        let channel = channel.to_string();
        inventory.insert_radio(RadioObservation {
            ap: entry.name,
            band: entry.band,
            model: entry.model,
            group: entry.group,
            channel,
        });
        inserted += 1;
    }

    Ok(inserted)
}

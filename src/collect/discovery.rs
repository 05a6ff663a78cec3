//! Controller discovery from the conductor tier.

use crate::api::{
    ApiError,
    DeviceQuery,
    SessionCredential,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

const SHOW_SWITCHES: &str = "show switches debug";

/// Role tag conductors use for the mobility controllers they manage.
const MANAGED_CONTROLLER_TYPE: &str = "MD";

#[derive(Debug, Deserialize)]
struct SwitchesDocument {
    #[serde(rename = "All Switches")]
    switches: Vec<SwitchEntry>,
}

#[derive(Debug, Deserialize)]
struct SwitchEntry {
    #[serde(rename = "IP Address")]
    ip_address: String,
    #[serde(rename = "Type")]
    switch_type: String,
}

/// Ask a conductor for its managed-switch table and return the addresses of
/// the controllers it manages. A controller reported by more than one
/// conductor is returned once per conductor; the pipeline treats the
/// duplicates as distinct work items.
pub async fn discover_controllers(
    client: &dyn DeviceQuery,
    credential: &SessionCredential,
) -> Result<Vec<String>, ApiError> {
    let document = client.show_command(credential, SHOW_SWITCHES).await?;
    let controllers = managed_controllers(document)
        .map_err(|source| ApiError::unexpected_shape(&credential.host, SHOW_SWITCHES, source))?;
    debug!(
        conductor = %credential.host,
        count = controllers.len(),
        "census: conductor reported managed controllers"
    );
    Ok(controllers)
}

fn managed_controllers(document: Value) -> Result<Vec<String>, serde_json::Error> {
    let document: SwitchesDocument = serde_json::from_value(document)?;
    Ok(document
        .switches
        .into_iter()
        .filter(|switch| switch.switch_type == MANAGED_CONTROLLER_TYPE)
        .map(|switch| switch.ip_address)
        .collect())
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn only_md_entries_are_selected() {
        let document = json!({
            "All Switches": [
                { "IP Address": "10.0.1.1", "Type": "MD", "Name": "wc-01" },
                { "IP Address": "10.0.0.1", "Type": "master", "Name": "mm-01" },
                { "IP Address": "10.0.1.2", "Type": "MD", "Name": "wc-02" },
            ]
        });

        let controllers = managed_controllers(document).unwrap();
        assert_eq!(controllers, vec!["10.0.1.1", "10.0.1.2"]);
    }

    #[test]
    fn an_empty_switch_table_yields_no_controllers() {
        let controllers = managed_controllers(json!({ "All Switches": [] })).unwrap();
        assert!(controllers.is_empty());
    }

    #[test]
    fn a_document_without_the_switch_table_is_an_error() {
        assert!(managed_controllers(json!({ "_data": [] })).is_err());
    }
}

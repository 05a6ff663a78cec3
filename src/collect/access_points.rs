//! AP database collection from the controller tier.

use crate::{
    api::{
        ApiError,
        DeviceQuery,
        SessionCredential,
    },
    inventory::{
        AccessPoint,
        Inventory,
    },
};
use serde::Deserialize;
use serde_json::Value;

const SHOW_AP_DATABASE: &str = "show ap database long";

#[derive(Debug, Deserialize)]
struct ApDatabaseDocument {
    #[serde(rename = "AP Database")]
    access_points: Vec<ApDatabaseEntry>,
}

#[derive(Debug, Deserialize)]
struct ApDatabaseEntry {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Wired MAC Address")]
    mac: String,
    #[serde(rename = "Serial #")]
    serial: String,
    #[serde(rename = "AP Type")]
    model: String,
    #[serde(rename = "IP Address")]
    ip: String,
    #[serde(rename = "Status")]
    status: String,
    #[serde(rename = "Flags", default)]
    flags: Option<String>,
    #[serde(rename = "Group")]
    group: String,
    #[serde(rename = "Switch IP")]
    switch_ip: String,
    // Absent for APs without a standby controller.
    #[serde(rename = "Standby IP", default)]
    standby_ip: Option<String>,
}

/// Query a controller's full AP database and insert every AP it reports as
/// up and owns. Returns the number of records inserted.
pub async fn collect_access_points(
    client: &dyn DeviceQuery,
    credential: &SessionCredential,
    inventory: &Inventory,
) -> Result<usize, ApiError> {
    let document = client.show_command(credential, SHOW_AP_DATABASE).await?;
    ingest_ap_database(&credential.host, document, inventory)
        .map_err(|source| ApiError::unexpected_shape(&credential.host, SHOW_AP_DATABASE, source))
}

/// The status filter drops inactive and unreachable APs; the `Switch IP`
/// match keeps a controller from claiming APs that merely list it as a
/// standby.
fn ingest_ap_database(host: &str, document: Value, inventory: &Inventory) -> Result<usize, serde_json::Error> {
    let document: ApDatabaseDocument = serde_json::from_value(document)?;
    let mut inserted = 0;

    for entry in document.access_points {
        if !entry.status.starts_with("Up") || entry.switch_ip != host {
            continue;
        }
        inventory.insert_ap(AccessPoint {
            name: entry.name,
            mac: entry.mac,
            serial: entry.serial,
            model: entry.model,
            ip: entry.ip,
            status: entry.status,
            flags: entry.flags.unwrap_or_default(),
            group: entry.group,
            primary: entry.switch_ip,
            secondary: entry.standby_ip.unwrap_or_default(),
        });
        inserted += 1;
    }

    Ok(inserted)
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    fn entry(name: &str, status: &str, switch_ip: &str) -> Value {
        json!({
            "Name": name,
            "Wired MAC Address": "aa:bb:cc:dd:ee:ff",
            "Serial #": "CN12345678",
            "AP Type": "655",
            "IP Address": "10.5.0.10",
            "Status": status,
            "Flags": null,
            "Group": "campus",
            "Switch IP": switch_ip,
            "Standby IP": "10.0.1.9",
        })
    }

    #[test]
    fn up_and_owned_aps_are_inserted_with_the_inserting_host_as_primary() {
        let inventory = Inventory::new();
        let document = json!({
            "AP Database": [entry("ap1", "Up 12d:3h:44m", "10.0.1.1")]
        });

        let inserted = ingest_ap_database("10.0.1.1", document, &inventory).unwrap();
        assert_eq!(inserted, 1);

        let ap = inventory.ap("ap1").unwrap();
        assert_eq!(ap.primary, "10.0.1.1");
        assert_eq!(ap.secondary, "10.0.1.9");
        assert_eq!(ap.serial, "CN12345678");
    }

    #[test]
    fn down_aps_are_filtered_out() {
        let inventory = Inventory::new();
        let document = json!({
            "AP Database": [entry("ap2", "Down", "10.0.1.1")]
        });

        let inserted = ingest_ap_database("10.0.1.1", document, &inventory).unwrap();
        assert_eq!(inserted, 0);
        assert!(inventory.ap("ap2").is_none());
    }

    #[test]
    fn aps_owned_by_another_controller_are_filtered_out() {
        let inventory = Inventory::new();
        let document = json!({
            "AP Database": [entry("ap3", "Up 2m:10s", "10.0.1.2")]
        });

        let inserted = ingest_ap_database("10.0.1.1", document, &inventory).unwrap();
        assert_eq!(inserted, 0);
        assert!(inventory.ap("ap3").is_none());
    }

    #[test]
    fn a_document_without_the_ap_table_is_an_error() {
        let inventory = Inventory::new();
        assert!(ingest_ap_database("10.0.1.1", json!({}), &inventory).is_err());
    }
}

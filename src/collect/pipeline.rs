//! The staged sweep across both tiers of the hierarchy.
//!
//! Stages run in strict order, each behind a full barrier: conductor login,
//! discovery, controller login, AP collection, radio collection, logout.
//! Work items within a stage run concurrently; a failing host is reported
//! and never aborts its siblings.

use crate::{
    aggregate::{
        aggregate,
        ChannelTally,
    },
    api::DeviceQuery,
    collect::{
        access_points::collect_access_points,
        discovery::discover_controllers,
        radios::collect_radios,
    },
    config::CensusConfig,
    inventory::Inventory,
    session::{
        authenticate,
        revoke,
        SessionStore,
    },
};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{
    error,
    info,
};

/// Run one full sweep: authenticate both tiers, collect AP and radio records
/// from every reachable controller, revoke the sessions, and reduce the
/// inventory into a channel tally.
///
/// Per-host failures are logged with host attribution and shrink the result
/// instead of failing the run; a host whose login failed holds no credential
/// and is skipped by every dependent stage.
pub async fn run_census(config: &CensusConfig, client: Arc<dyn DeviceQuery>) -> ChannelTally {
    let sessions = SessionStore::new();
    let inventory = Inventory::new();

    info!(conductors = config.conductors.len(), "census: starting sweep");

    login_stage(&client, &sessions, &config.conductors, config, "conductor").await;

    // Discovery runs one conductor at a time. The union is not deduplicated:
    // a controller known to two conductors becomes two work items.
    let mut controllers = Vec::new();
    for conductor in &config.conductors {
        let Some(credential) = sessions.get(conductor) else {
            continue;
        };
        match discover_controllers(client.as_ref(), &credential).await {
            Ok(found) => controllers.extend(found),
            Err(error) => error!(%conductor, %error, "census: discovery failed"),
        }
    }
    info!(controllers = controllers.len(), "census: discovery complete");

    login_stage(&client, &sessions, &controllers, config, "controller").await;

    ap_stage(&client, &sessions, &inventory, &controllers).await;
    radio_stage(&client, &sessions, &inventory, &controllers).await;

    logout_stage(&client, &sessions, &config.conductors).await;
    logout_stage(&client, &sessions, &controllers).await;

    aggregate(&inventory, &config.channels)
}

async fn login_stage(
    client: &Arc<dyn DeviceQuery>,
    sessions: &SessionStore,
    hosts: &[String],
    config: &CensusConfig,
    tier: &'static str,
) {
    let mut handles = Vec::new();
    for host in hosts {
        let client = Arc::clone(client);
        let sessions = sessions.clone();
        let host = host.clone();
        let username = config.username.clone();
        let password = config.password.clone();
        handles.push(tokio::spawn(async move {
            authenticate(client.as_ref(), &sessions, &host, &username, &password)
                .await
                .map_err(|error| (host, error))
        }));
    }

    let mut failed = 0;
    for outcome in join_all(handles).await {
        match outcome {
            Ok(Ok(())) => {}
            Ok(Err((host, error))) => {
                failed += 1;
                error!(%host, %error, tier, "census: login failed; host drops out of later stages");
            }
            Err(join_error) => {
                failed += 1;
                error!(%join_error, tier, "census: login task panicked");
            }
        }
    }
    info!(tier, hosts = hosts.len(), failed, "census: login stage complete");
}

async fn ap_stage(
    client: &Arc<dyn DeviceQuery>,
    sessions: &SessionStore,
    inventory: &Inventory,
    controllers: &[String],
) {
    let mut handles = Vec::new();
    for controller in controllers {
        let Some(credential) = sessions.get(controller) else {
            continue;
        };
        let client = Arc::clone(client);
        let inventory = inventory.clone();
        handles.push(tokio::spawn(async move {
            collect_access_points(client.as_ref(), &credential, &inventory)
                .await
                .map_err(|error| (credential.host.clone(), error))
        }));
    }

    let mut failed = 0;
    for outcome in join_all(handles).await {
        match outcome {
            Ok(Ok(_inserted)) => {}
            Ok(Err((host, error))) => {
                failed += 1;
                error!(%host, %error, "census: AP collection failed");
            }
            Err(join_error) => {
                failed += 1;
                error!(%join_error, "census: AP collection task panicked");
            }
        }
    }
    info!(aps = inventory.ap_count(), failed, "census: AP collection stage complete");
}

async fn radio_stage(
    client: &Arc<dyn DeviceQuery>,
    sessions: &SessionStore,
    inventory: &Inventory,
    controllers: &[String],
) {
    let mut handles = Vec::new();
    for controller in controllers {
        let Some(credential) = sessions.get(controller) else {
            continue;
        };
        let client = Arc::clone(client);
        let inventory = inventory.clone();
        handles.push(tokio::spawn(async move {
            collect_radios(client.as_ref(), &credential, &inventory)
                .await
                .map_err(|error| (credential.host.clone(), error))
        }));
    }

    let mut failed = 0;
    for outcome in join_all(handles).await {
        match outcome {
            Ok(Ok(_inserted)) => {}
            Ok(Err((host, error))) => {
                failed += 1;
                error!(%host, %error, "census: radio collection failed");
            }
            Err(join_error) => {
                failed += 1;
                error!(%join_error, "census: radio collection task panicked");
            }
        }
    }
    info!(radios = inventory.radio_count(), failed, "census: radio collection stage complete");
}

async fn logout_stage(client: &Arc<dyn DeviceQuery>, sessions: &SessionStore, hosts: &[String]) {
    let mut handles = Vec::new();
    for host in hosts {
        let client = Arc::clone(client);
        let sessions = sessions.clone();
        let host = host.clone();
        handles.push(tokio::spawn(async move {
            revoke(client.as_ref(), &sessions, &host).await;
        }));
    }
    join_all(handles).await;
}

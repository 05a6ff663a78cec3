//! Shared inventory written by the collection stages.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        Mutex,
    },
};

/// One access point owned by a controller, as reported by
/// `show ap database long`. Never mutated after insertion.
#[derive(Debug, Clone)]
pub struct AccessPoint {
    pub name: String,
    pub mac: String,
    pub serial: String,
    pub model: String,
    pub ip: String,
    pub status: String,
    pub flags: String,
    pub group: String,
    /// Controller that owns the AP. Always equals the host whose query
    /// produced the record.
    pub primary: String,
    /// Standby controller, if any.
    pub secondary: String,
}

/// One 6 GHz radio, keyed by its owning AP.
#[derive(Debug, Clone)]
pub struct RadioObservation {
    pub ap: String,
    pub band: String,
    pub model: String,
    pub group: String,
    /// Channel identifier, e.g. "149E". Third field of the compound mode
    /// string reported by the controller.
    pub channel: String,
}

#[derive(Debug, Default)]
struct Records {
    aps: HashMap<String, AccessPoint>,
    radios: HashMap<String, RadioObservation>,
}

/// Shared target of the collection stages. Many workers insert within a
/// stage; one coarse lock suffices since critical sections are a single map
/// insert and keys rarely collide.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    inner: Arc<Mutex<Records>>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_ap(&self, ap: AccessPoint) {
        self.inner.lock().unwrap().aps.insert(ap.name.clone(), ap);
    }

    pub fn ap(&self, name: &str) -> Option<AccessPoint> {
        self.inner.lock().unwrap().aps.get(name).cloned()
    }

    pub fn ap_count(&self) -> usize {
        self.inner.lock().unwrap().aps.len()
    }

    pub fn insert_radio(&self, radio: RadioObservation) {
        self.inner.lock().unwrap().radios.insert(radio.ap.clone(), radio);
    }

    pub fn radio_count(&self) -> usize {
        self.inner.lock().unwrap().radios.len()
    }

    /// Snapshot of all radio observations, for the aggregation step.
    pub fn radios(&self) -> Vec<RadioObservation> {
        self.inner.lock().unwrap().radios.values().cloned().collect()
    }
}

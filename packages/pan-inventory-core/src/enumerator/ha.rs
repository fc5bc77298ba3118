//! High-availability state of management peers.

use crate::api::{ApiFactory, DeviceApi, commands};
use crate::error::{InventoryError, Result};
use crate::facts::state_value;
use serde::{Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HaStatus {
    Active,
    Passive,
    Suspended,
    /// Any other status after the role, e.g. `initial` or `non-functional`
    Other(String),
}

impl std::fmt::Display for HaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HaStatus::Active => write!(f, "active"),
            HaStatus::Passive => write!(f, "passive"),
            HaStatus::Suspended => write!(f, "suspended"),
            HaStatus::Other(status) => write!(f, "{}", status),
        }
    }
}

impl Serialize for HaStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Parse a `<role>-<status>` HA prompt such as `secondary-passive`.
///
/// Accepts either the bare prompt or the full state filter response. The
/// role is discarded; only a missing role is an error.
pub fn parse_ha_state(raw: &str) -> Result<HaStatus> {
    let prompt = state_value(raw).unwrap_or(raw).trim();
    let unrecognized = || InventoryError::UnrecognizedHaState(prompt.to_string());

    let status = prompt
        .strip_prefix("primary-")
        .or_else(|| prompt.strip_prefix("secondary-"))
        .ok_or_else(unrecognized)?;

    match status {
        "active" => Ok(HaStatus::Active),
        "passive" => Ok(HaStatus::Passive),
        "suspended" => Ok(HaStatus::Suspended),
        other => Ok(HaStatus::Other(other.to_string())),
    }
}

/// Query a peer's HA status
pub async fn ha_status(api: &dyn DeviceApi) -> Result<HaStatus> {
    let raw = api.op(&commands::ha_state()).await?;
    let status = parse_ha_state(&raw)?;
    tracing::debug!("{} HA status: {}", api.host(), status);
    Ok(status)
}

/// Pick the management peer to enumerate devices from.
///
/// A single configured peer is used without asking for its HA state.
/// Otherwise peers are asked in order and the first `active` one wins; an
/// unreachable peer is skipped since its partner is then expected to be the
/// active one.
pub async fn select_active_peer<F>(factory: &F, hosts: &[String]) -> Result<Box<dyn DeviceApi>>
where
    F: ApiFactory + ?Sized,
{
    match hosts {
        [] => Err(InventoryError::Config(
            "no management peers configured".to_string(),
        )),
        [only] => {
            tracing::info!("Single management peer {}, treating it as active", only);
            factory.connect(only)
        }
        _ => {
            for host in hosts {
                let api = factory.connect(host)?;
                match ha_status(api.as_ref()).await {
                    Ok(HaStatus::Active) => {
                        tracing::info!("Active management peer: {}", host);
                        return Ok(api);
                    }
                    Ok(status @ HaStatus::Other(_)) => {
                        tracing::warn!("Management peer {} reports HA status {}", host, status);
                    }
                    Ok(status) => {
                        tracing::info!("Management peer {} is {}", host, status);
                    }
                    Err(e @ InventoryError::RemoteQuery { .. }) => {
                        tracing::warn!("Could not query HA state of {}: {}", host, e);
                    }
                    Err(e) => return Err(e),
                }
            }

            Err(InventoryError::NoActivePeer {
                peers: hosts.to_vec(),
            })
        }
    }
}

/// HA status of every configured peer, for display
pub async fn peer_statuses<F>(factory: &F, hosts: &[String]) -> Vec<(String, Result<HaStatus>)>
where
    F: ApiFactory + ?Sized,
{
    let mut statuses = Vec::with_capacity(hosts.len());
    for host in hosts {
        let status = match factory.connect(host) {
            Ok(api) => ha_status(api.as_ref()).await,
            Err(e) => Err(e),
        };
        statuses.push((host.clone(), status));
    }
    statuses
}

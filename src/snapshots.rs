//! SnapshotIQ snapshots.

use crate::error::{Error, Result};
use crate::rest_client::{join_path, Payload, RestClient};
use crate::types::Snapshot;
use crate::volumes;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const SNAPSHOTS_PATH: &str = "/platform/1/snapshot/snapshots";

#[derive(Debug, Default, Deserialize)]
struct SnapshotListResponse {
    #[serde(default)]
    snapshots: Vec<Snapshot>,
}

#[derive(Debug, Serialize)]
struct CreateSnapshotRequest<'a> {
    name: &'a str,
    path: &'a str,
}

/// Every snapshot on the appliance.
pub async fn list_snapshots(client: &RestClient) -> Result<Vec<Snapshot>> {
    let resp: Option<SnapshotListResponse> = client.get(SNAPSHOTS_PATH, "", None, &[]).await?;
    Ok(resp.unwrap_or_default().snapshots)
}

/// Snapshot with the given id.
pub async fn get_snapshot(client: &RestClient, id: i64) -> Result<Snapshot> {
    let resp: Option<SnapshotListResponse> = client
        .get(SNAPSHOTS_PATH, &id.to_string(), None, &[])
        .await?;
    resp.unwrap_or_default()
        .snapshots
        .into_iter()
        .next()
        .ok_or_else(|| Error::NotFound(format!("snapshot {id}")))
}

/// Look a snapshot up by id, falling back to a name scan of the full listing.
///
/// Without a usable id and with an empty `name`, the id lookup error is
/// returned as-is. A name that matches nothing yields `Ok(None)`.
pub async fn find_snapshot(
    client: &RestClient,
    id: Option<i64>,
    name: &str,
) -> Result<Option<Snapshot>> {
    let id_err = match id {
        Some(id) => match get_snapshot(client, id).await {
            Ok(snapshot) => return Ok(Some(snapshot)),
            Err(err) => err,
        },
        None => Error::NotFound("no snapshot id given".to_string()),
    };

    if name.is_empty() {
        return Err(id_err);
    }
    debug!(?id, name, error = %id_err, "snapshot id lookup failed, scanning by name");

    Ok(list_snapshots(client)
        .await?
        .into_iter()
        .find(|s| s.name == name))
}

/// Snapshot `path` under `name`.
pub async fn create_snapshot(client: &RestClient, path: &str, name: &str) -> Result<Snapshot> {
    let req = CreateSnapshotRequest { name, path };
    let resp: Option<Snapshot> = client
        .post(SNAPSHOTS_PATH, "", None, &[], Payload::json(&req)?)
        .await?;
    resp.ok_or_else(|| Error::InvalidResponse("empty snapshot create response".to_string()))
}

pub async fn remove_snapshot(client: &RestClient, id: i64) -> Result<()> {
    client
        .execute(
            Method::DELETE,
            SNAPSHOTS_PATH,
            &id.to_string(),
            None,
            &[],
            Payload::Empty,
        )
        .await?;
    Ok(())
}

/// Namespace path of a volume as seen inside a snapshot:
/// `/namespace/<fs root>/.snapshot/<snapshot>/<rest of volumes root>/<volume>`.
pub fn snapshot_source_path(volumes_path: &str, snapshot_name: &str, volume: &str) -> String {
    let trimmed = volumes_path.trim_matches('/');
    let (fs_root, rest) = trimmed.split_once('/').unwrap_or((trimmed, ""));
    let snap_root = join_path(&format!("/namespace/{fs_root}/.snapshot"), snapshot_name);
    join_path(&join_path(&snap_root, rest), volume)
}

/// Copy the volume captured by `snapshot` into a new volume `destination`.
pub async fn copy_snapshot(client: &RestClient, snapshot: &Snapshot, destination: &str) -> Result<()> {
    let volume = snapshot
        .path
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();
    let source = snapshot_source_path(client.volumes_path(), &snapshot.name, volume);
    volumes::copy_path_to_volume(client, &source, destination).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_source_path() {
        assert_eq!(
            snapshot_source_path("/ifs/volumes", "snap1", "v1"),
            "/namespace/ifs/.snapshot/snap1/volumes/v1"
        );
        assert_eq!(
            snapshot_source_path("/ifs/data/k8s/", "s", "pv"),
            "/namespace/ifs/.snapshot/s/data/k8s/pv"
        );
        assert_eq!(
            snapshot_source_path("/ifs", "s", "pv"),
            "/namespace/ifs/.snapshot/s/pv"
        );
    }

    #[test]
    fn test_create_request_shape() {
        let req = CreateSnapshotRequest {
            name: "nightly",
            path: "/ifs/volumes/v1",
        };
        assert_eq!(
            serde_json::to_string(&req).unwrap(),
            r#"{"name":"nightly","path":"/ifs/volumes/v1"}"#
        );
    }
}

use crate::acls;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::quotas;
use crate::rest_client::RestClient;
use crate::snapshots;
use crate::types::*;
use crate::volumes;
use bytes::Bytes;

/// High-level client addressing volumes by name.
///
/// Names are resolved against the configured volumes root before calling the
/// resource functions. Clones share one connection pool.
#[derive(Clone)]
pub struct IsilonClient {
    api: RestClient,
}

impl IsilonClient {
    /// Connect using the `ISILON_*` environment variables.
    pub async fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?).await
    }

    /// Connect with an explicit configuration.
    pub async fn new(config: ClientConfig) -> Result<Self> {
        Ok(Self {
            api: RestClient::new(config).await?,
        })
    }

    /// Wrap an already built API client.
    pub fn from_api(api: RestClient) -> Self {
        Self { api }
    }

    /// Underlying API client.
    pub fn api(&self) -> &RestClient {
        &self.api
    }

    /// Absolute appliance path of a volume.
    pub fn volume_path(&self, name: &str) -> String {
        self.api.volume_path(name)
    }

    // Volumes

    /// List every volume under the volumes root.
    pub async fn get_volumes(&self) -> Result<Vec<Volume>> {
        volumes::list_volumes(&self.api).await
    }

    /// Volume `name` with its attributes. An empty `id` falls back to `name`.
    pub async fn get_volume(&self, id: &str, name: &str) -> Result<Volume> {
        let id = if id.is_empty() { name } else { id };
        let attributes = volumes::get_volume_attributes(&self.api, id).await?;
        Ok(Volume {
            name: id.to_string(),
            attributes,
        })
    }

    /// Whether volume `name` exists.
    pub async fn volume_exists(&self, name: &str) -> Result<bool> {
        volumes::volume_exists(&self.api, name).await
    }

    /// Create a volume owned by the configured user and group.
    ///
    /// If assigning ownership fails the new directory is left in place and
    /// the error is returned.
    pub async fn create_volume(&self, name: &str) -> Result<Volume> {
        volumes::create_volume(&self.api, name).await?;
        Ok(Volume::named(name))
    }

    /// Create a volume with the given access control instead of the default.
    pub async fn create_volume_with_acl(&self, name: &str, acl: &str) -> Result<Volume> {
        volumes::create_volume_with_acl(&self.api, name, acl).await?;
        Ok(Volume::named(name))
    }

    /// Delete a volume and its contents.
    pub async fn delete_volume(&self, name: &str) -> Result<()> {
        volumes::delete_volume(&self.api, name).await
    }

    /// Copy `source` into a new volume and return it.
    pub async fn copy_volume(&self, source: &str, destination: &str) -> Result<Volume> {
        volumes::copy_volume(&self.api, source, destination).await?;
        Ok(Volume::named(destination))
    }

    /// Store `body` as `file_name` inside `volume`.
    pub async fn upload_file(
        &self,
        volume: &str,
        file_name: &str,
        body: impl Into<reqwest::Body>,
    ) -> Result<()> {
        volumes::upload_file(&self.api, volume, file_name, body).await
    }

    /// Read `file_name` from `volume`.
    pub async fn download_file(&self, volume: &str, file_name: &str) -> Result<Bytes> {
        volumes::download_file(&self.api, volume, file_name).await
    }

    // Quotas

    /// Quota set on volume `name`.
    pub async fn get_quota(&self, name: &str) -> Result<Quota> {
        quotas::get_quota(&self.api, &self.volume_path(name)).await
    }

    /// Create a hard directory quota of `size` bytes on a volume.
    pub async fn create_quota(&self, name: &str, container: bool, size: i64) -> Result<()> {
        quotas::create_quota(&self.api, &self.volume_path(name), container, size).await
    }

    /// Put a hard threshold of `size` bytes on a volume.
    pub async fn set_quota_size(&self, name: &str, size: i64) -> Result<()> {
        quotas::set_quota_hard_threshold(&self.api, &self.volume_path(name), size).await
    }

    /// Change the hard threshold of a volume's existing quota.
    pub async fn update_quota_size(&self, name: &str, size: i64) -> Result<()> {
        quotas::update_quota_hard_threshold(&self.api, &self.volume_path(name), size).await
    }

    /// Remove the quota from a volume.
    pub async fn clear_quota(&self, name: &str) -> Result<()> {
        quotas::delete_quota(&self.api, &self.volume_path(name)).await
    }

    // Snapshots

    /// List every snapshot on the appliance.
    pub async fn get_snapshots(&self) -> Result<Vec<Snapshot>> {
        snapshots::list_snapshots(&self.api).await
    }

    /// Snapshots taken of volume `name`.
    pub async fn get_snapshots_by_path(&self, name: &str) -> Result<Vec<Snapshot>> {
        let path = self.volume_path(name);
        Ok(self
            .get_snapshots()
            .await?
            .into_iter()
            .filter(|s| s.path == path)
            .collect())
    }

    /// Snapshot by id, or failing that by name.
    pub async fn get_snapshot(&self, id: Option<i64>, name: &str) -> Result<Option<Snapshot>> {
        snapshots::find_snapshot(&self.api, id, name).await
    }

    /// Snapshot volume `name` as `snapshot_name`.
    pub async fn create_snapshot(&self, name: &str, snapshot_name: &str) -> Result<Snapshot> {
        snapshots::create_snapshot(&self.api, &self.volume_path(name), snapshot_name).await
    }

    /// Delete the snapshot found by id or name.
    pub async fn remove_snapshot(&self, id: Option<i64>, name: &str) -> Result<()> {
        let snapshot = self.require_snapshot(id, name).await?;
        snapshots::remove_snapshot(&self.api, snapshot.id).await
    }

    /// Restore a snapshot's volume into the new volume `destination`.
    pub async fn copy_snapshot(
        &self,
        source_id: Option<i64>,
        source_name: &str,
        destination: &str,
    ) -> Result<Volume> {
        let snapshot = self.require_snapshot(source_id, source_name).await?;
        snapshots::copy_snapshot(&self.api, &snapshot, destination).await?;
        self.get_volume(destination, destination).await
    }

    async fn require_snapshot(&self, id: Option<i64>, name: &str) -> Result<Snapshot> {
        self.get_snapshot(id, name).await?.ok_or_else(|| {
            Error::NotFound(format!("Snapshot doesn't exist: ({id:?}, {name})"))
        })
    }

    // ACLs

    /// Owner, group and mode of a volume.
    pub async fn get_volume_acl(&self, name: &str) -> Result<Acl> {
        acls::get_acl(&self.api, name).await
    }

    /// Make the user this client authenticates as the owner of a volume.
    pub async fn set_volume_owner_to_current_user(&self, name: &str) -> Result<()> {
        self.set_volume_owner(name, self.api.user()).await
    }

    /// Make `user` the owner of a volume and reset its mode to 0777.
    pub async fn set_volume_owner(&self, name: &str, user: &str) -> Result<()> {
        acls::update_acl(&self.api, name, &acls::owner_acl(user)).await
    }

    /// chmod a volume.
    pub async fn set_volume_mode(&self, name: &str, mode: u32) -> Result<()> {
        acls::update_acl(&self.api, name, &acls::mode_acl(FileMode(mode))).await
    }
}

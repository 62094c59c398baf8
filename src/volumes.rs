//! Volumes: directories under the volumes root, driven through the namespace API.

use crate::error::{Error, Result};
use crate::ordered_values::OrderedValues;
use crate::rest_client::{join_path, Payload, RestClient};
use crate::types::{Volume, VolumeAttribute};
use bytes::Bytes;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Access control applied to newly created volumes.
pub const DEFAULT_ACL: &str = "public_read_write";

const HEADER_TARGET_TYPE: &str = "x-isi-ifs-target-type";
const HEADER_ACCESS_CONTROL: &str = "x-isi-ifs-access-control";
const HEADER_COPY_SOURCE: &str = "x-isi-ifs-copy-source";

#[derive(Debug, Default, Deserialize)]
struct VolumeListResponse {
    #[serde(default)]
    children: Vec<VolumeChild>,
}

#[derive(Debug, Deserialize)]
struct VolumeChild {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct VolumeAttributesResponse {
    #[serde(default)]
    attrs: Vec<VolumeAttribute>,
}

#[derive(Debug, Serialize)]
struct Ownership<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
}

#[derive(Debug, Serialize)]
struct OwnershipRequest<'a> {
    authoritative: &'a str,
    action: &'a str,
    owner: Ownership<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    group: Option<Ownership<'a>>,
}

fn flag(key: &str) -> OrderedValues {
    let mut values = OrderedValues::new();
    values.add_flag(key);
    values
}

/// `namespace/<volumes root>`, the base path of every volume call.
pub fn namespace_path(client: &RestClient) -> String {
    join_path("namespace", client.volumes_path())
}

/// List the volumes under the volumes root.
pub async fn list_volumes(client: &RestClient) -> Result<Vec<Volume>> {
    let resp: Option<VolumeListResponse> =
        client.get(&namespace_path(client), "", None, &[]).await?;
    Ok(resp
        .unwrap_or_default()
        .children
        .into_iter()
        .map(|c| Volume::named(c.name))
        .collect())
}

/// Fetch the `?metadata` attributes of a volume.
pub async fn get_volume_attributes(client: &RestClient, name: &str) -> Result<Vec<VolumeAttribute>> {
    let resp: Option<VolumeAttributesResponse> = client
        .get(&namespace_path(client), name, Some(&flag("metadata")), &[])
        .await?;
    Ok(resp.unwrap_or_default().attrs)
}

/// Create a volume with [`DEFAULT_ACL`].
pub async fn create_volume(client: &RestClient, name: &str) -> Result<()> {
    create_volume_with_acl(client, name, DEFAULT_ACL).await
}

/// Create a volume, then hand its ownership to the configured user and group.
///
/// The two calls are not atomic: if the ownership call fails the directory
/// stays on the appliance and the ownership error is returned.
pub async fn create_volume_with_acl(client: &RestClient, name: &str, acl: &str) -> Result<()> {
    let namespace = namespace_path(client);

    client
        .execute(
            Method::PUT,
            &namespace,
            name,
            None,
            &[(HEADER_TARGET_TYPE, "container"), (HEADER_ACCESS_CONTROL, acl)],
            Payload::Empty,
        )
        .await?;

    let ownership = OwnershipRequest {
        authoritative: "acl",
        action: "update",
        owner: Ownership {
            name: client.user(),
            kind: "user",
        },
        group: client.group().map(|g| Ownership {
            name: g,
            kind: "group",
        }),
    };

    if let Err(err) = client
        .execute(
            Method::PUT,
            &namespace,
            name,
            Some(&flag("acl")),
            &[],
            Payload::json(&ownership)?,
        )
        .await
    {
        debug!(volume = name, error = %err, "volume created but setting ownership failed");
        return Err(err);
    }

    Ok(())
}

/// Delete a volume and everything below it.
pub async fn delete_volume(client: &RestClient, name: &str) -> Result<()> {
    let params = OrderedValues::from([("recursive", "true")]);
    client
        .execute(
            Method::DELETE,
            &namespace_path(client),
            name,
            Some(&params),
            &[],
            Payload::Empty,
        )
        .await?;
    Ok(())
}

/// Server-side copy of `source` into a new volume `destination`.
pub async fn copy_volume(client: &RestClient, source: &str, destination: &str) -> Result<()> {
    let namespace = namespace_path(client);
    let copy_source = format!("/{}", join_path(&namespace, source));
    client
        .execute(
            Method::PUT,
            &namespace,
            destination,
            None,
            &[(HEADER_COPY_SOURCE, copy_source.as_str())],
            Payload::Empty,
        )
        .await?;
    Ok(())
}

/// Copy `source_path` (absolute, e.g. inside `.snapshot`) into a new volume.
pub(crate) async fn copy_path_to_volume(
    client: &RestClient,
    source_path: &str,
    destination: &str,
) -> Result<()> {
    client
        .execute(
            Method::PUT,
            &namespace_path(client),
            destination,
            None,
            &[(HEADER_COPY_SOURCE, source_path)],
            Payload::Empty,
        )
        .await?;
    Ok(())
}

/// Whether a volume exists. A 404 is `false`; any other failure is an error.
pub async fn volume_exists(client: &RestClient, name: &str) -> Result<bool> {
    match get_volume_attributes(client, name).await {
        Ok(_) => Ok(true),
        Err(err) if err.is_not_found() => Ok(false),
        Err(err) => Err(err),
    }
}

/// Upload `body` as file `file_name` inside volume `volume`.
pub async fn upload_file(
    client: &RestClient,
    volume: &str,
    file_name: &str,
    body: impl Into<reqwest::Body>,
) -> Result<()> {
    let id = file_id(volume, file_name)?;
    client
        .execute(
            Method::PUT,
            &namespace_path(client),
            &id,
            None,
            &[(HEADER_TARGET_TYPE, "object")],
            Payload::stream(body),
        )
        .await?;
    Ok(())
}

/// Download file `file_name` from volume `volume`.
pub async fn download_file(client: &RestClient, volume: &str, file_name: &str) -> Result<Bytes> {
    let id = file_id(volume, file_name)?;
    client
        .execute(
            Method::GET,
            &namespace_path(client),
            &id,
            None,
            &[],
            Payload::Empty,
        )
        .await
}

fn file_id(volume: &str, file_name: &str) -> Result<String> {
    let file_name = file_name.trim_matches('/');
    if file_name.is_empty() {
        return Err(Error::Configuration("empty file name".to_string()));
    }
    Ok(join_path(volume, file_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;

    fn client() -> RestClient {
        RestClient::without_probe(ClientConfig::new("https://h", "admin", "pw").with_group("wheel"))
            .unwrap()
    }

    #[test]
    fn test_namespace_path() {
        assert_eq!(namespace_path(&client()), "namespace/ifs/volumes");
    }

    #[test]
    fn test_ownership_request_shape() {
        let req = OwnershipRequest {
            authoritative: "acl",
            action: "update",
            owner: Ownership {
                name: "admin",
                kind: "user",
            },
            group: None,
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            serde_json::json!({
                "authoritative": "acl",
                "action": "update",
                "owner": {"name": "admin", "type": "user"}
            })
        );
    }

    #[test]
    fn test_file_id() {
        assert_eq!(file_id("v1", "/dir/a.txt").unwrap(), "v1/dir/a.txt");
        assert!(file_id("v1", "/").is_err());
    }
}

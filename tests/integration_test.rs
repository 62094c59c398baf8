use bytes::Bytes;
use isilon_papi::{ClientConfig, FileMode, IsilonClient};
use std::env;

// Connection settings come from the ISILON_* environment variables.
async fn connect() -> IsilonClient {
    let config = ClientConfig::from_env().expect("ISILON_* environment variables");
    IsilonClient::new(config).await.expect("connect to appliance")
}

fn volume_name(suffix: &str) -> String {
    let prefix = env::var("ISILON_TEST_PREFIX").unwrap_or_else(|_| "isilon-papi-test".to_string());
    format!("{prefix}-{suffix}")
}

// Volume Tests

#[tokio::test]
#[ignore = "Requires a live appliance"]
async fn test_volume_lifecycle() {
    let client = connect().await;
    let name = volume_name("lifecycle");

    let volume = client.create_volume(&name).await.unwrap();
    assert_eq!(volume.name, name);
    assert!(client.volume_exists(&name).await.unwrap());

    let volumes = client.get_volumes().await.unwrap();
    assert!(volumes.iter().any(|v| v.name == name));

    let volume = client.get_volume("", &name).await.unwrap();
    assert!(!volume.attributes.is_empty());

    client.delete_volume(&name).await.unwrap();
    assert!(!client.volume_exists(&name).await.unwrap());
}

#[tokio::test]
#[ignore = "Requires a live appliance"]
async fn test_copy_volume_and_files() {
    let client = connect().await;
    let source = volume_name("copy-src");
    let destination = volume_name("copy-dst");

    client.create_volume(&source).await.unwrap();
    let data = Bytes::from_static(b"hello from isilon-papi");
    client.upload_file(&source, "hello.txt", data.clone()).await.unwrap();

    client.copy_volume(&source, &destination).await.unwrap();
    let copied = client.download_file(&destination, "hello.txt").await.unwrap();
    assert_eq!(copied, data);

    client.delete_volume(&destination).await.unwrap();
    client.delete_volume(&source).await.unwrap();
}

// Quota Tests

#[tokio::test]
#[ignore = "Requires a live appliance"]
async fn test_quota_lifecycle() {
    let client = connect().await;
    let name = volume_name("quota");

    client.create_volume(&name).await.unwrap();
    client.create_quota(&name, true, 1 << 30).await.unwrap();

    let quota = client.get_quota(&name).await.unwrap();
    assert_eq!(quota.thresholds.hard, Some(1 << 30));

    client.update_quota_size(&name, 2 << 30).await.unwrap();
    let quota = client.get_quota(&name).await.unwrap();
    assert_eq!(quota.thresholds.hard, Some(2 << 30));

    client.clear_quota(&name).await.unwrap();
    assert!(client.get_quota(&name).await.unwrap_err().is_not_found());

    client.delete_volume(&name).await.unwrap();
}

// Snapshot Tests

#[tokio::test]
#[ignore = "Requires a live appliance"]
async fn test_snapshot_lifecycle() {
    let client = connect().await;
    let name = volume_name("snap");
    let restored = volume_name("snap-restored");
    let snapshot_name = volume_name("snapshot");

    client.create_volume(&name).await.unwrap();
    let snapshot = client.create_snapshot(&name, &snapshot_name).await.unwrap();

    let by_id = client.get_snapshot(Some(snapshot.id), "").await.unwrap();
    assert_eq!(by_id.map(|s| s.name), Some(snapshot_name.clone()));

    let by_path = client.get_snapshots_by_path(&name).await.unwrap();
    assert!(by_path.iter().any(|s| s.id == snapshot.id));

    let volume = client.copy_snapshot(Some(snapshot.id), "", &restored).await.unwrap();
    assert_eq!(volume.name, restored);

    client.remove_snapshot(Some(snapshot.id), "").await.unwrap();
    assert!(client.get_snapshot(None, &snapshot_name).await.unwrap().is_none());

    client.delete_volume(&restored).await.unwrap();
    client.delete_volume(&name).await.unwrap();
}

// ACL Tests

#[tokio::test]
#[ignore = "Requires a live appliance"]
async fn test_volume_acl() {
    let client = connect().await;
    let name = volume_name("acl");

    client.create_volume(&name).await.unwrap();

    client.set_volume_mode(&name, 0o750).await.unwrap();
    let acl = client.get_volume_acl(&name).await.unwrap();
    assert_eq!(acl.mode, Some(FileMode(0o750)));

    client.set_volume_owner_to_current_user(&name).await.unwrap();
    let acl = client.get_volume_acl(&name).await.unwrap();
    assert_eq!(acl.mode, Some(FileMode(0o777)));
    assert_eq!(
        acl.owner.and_then(|o| o.name).as_deref(),
        Some(client.api().user())
    );

    client.delete_volume(&name).await.unwrap();
}

use anyhow::Context;
use bytes::Bytes;
use isilon_papi::IsilonClient;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG=isilon_papi=debug dumps every request and response
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("==> Volume walkthrough");

    let client = IsilonClient::from_env()
        .await
        .context("connecting with ISILON_* settings")?;
    println!(
        "✓ Connected to {} (Platform API {}.{})",
        client.api().endpoint(),
        client.api().api_version(),
        client.api().api_minor_version()
    );

    let name = "walkthrough";
    let restored = "walkthrough-restored";

    client.create_volume(name).await?;
    println!("✓ Created volume {} at {}", name, client.volume_path(name));

    client.create_quota(name, true, 1 << 30).await?;
    let quota = client.get_quota(name).await?;
    println!("✓ Quota {}: hard limit {:?}", quota.id, quota.thresholds.hard);

    client
        .upload_file(name, "readme.txt", Bytes::from("Hello from isilon-papi!"))
        .await?;
    let data = client.download_file(name, "readme.txt").await?;
    println!("✓ Round-tripped {} bytes", data.len());

    let snapshot = client.create_snapshot(name, "walkthrough-snap").await?;
    println!("✓ Snapshot {} created at {:?}", snapshot.id, snapshot.created_at());

    client.copy_snapshot(Some(snapshot.id), "", restored).await?;
    println!("✓ Restored snapshot into {}", restored);

    let acl = client.get_volume_acl(restored).await?;
    println!("✓ {} mode: {:?}", restored, acl.mode.map(|m| m.to_string()));

    // Cleanup
    client.remove_snapshot(Some(snapshot.id), "").await?;
    client.clear_quota(name).await?;
    client.delete_volume(restored).await?;
    client.delete_volume(name).await?;
    println!("✓ Cleaned up");

    println!("\n==> Walkthrough completed successfully!");

    Ok(())
}

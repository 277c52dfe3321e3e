//! Download and release endpoints.

use crate::*;

#[tokio::test]
async fn download_streams_the_archive_under_the_fixed_name() -> Result<()> {
    let server = spawn_server(ServerOptions::default()).await?;
    write_archive(&server, "agent-linux.zip", b"linux-archive-payload")?;

    let resp = http_get(server.addr, "/api/updates/download/linux/dl-1").await?;
    assert_eq!(resp.status, 200);
    assert!(resp.header_contains("application/octet-stream"));
    assert!(resp.header_contains("RemotelyUpdate.zip"));
    assert!(resp.body_contains(b"linux-archive-payload"));

    // The slot stays held until the client clears it.
    assert_eq!(active_downloads(&server).await?, 1);

    let cleared = http_get(server.addr, "/api/updates/clear/dl-1").await?;
    assert_eq!(cleared.status, 200);
    assert_eq!(active_downloads(&server).await?, 0);

    // Clearing again (or clearing an unknown id) is still a success.
    let again = http_get(server.addr, "/api/updates/clear/dl-1").await?;
    assert_eq!(again.status, 200);
    let unknown = http_get(server.addr, "/api/updates/clear/no-such-id").await?;
    assert_eq!(unknown.status, 200);
    Ok(())
}

#[tokio::test]
async fn platform_matching_is_case_insensitive() -> Result<()> {
    let server = spawn_server(ServerOptions::default()).await?;
    write_archive(&server, "agent-win-x64.zip", b"win-bytes")?;

    let resp = http_get(server.addr, "/api/updates/download/WIN-X64/dl-1").await?;
    assert_eq!(resp.status, 200);
    assert!(resp.body_contains(b"win-bytes"));
    Ok(())
}

#[tokio::test]
async fn unknown_platform_is_rejected_without_holding_a_slot() -> Result<()> {
    let server = spawn_server(ServerOptions::default()).await?;

    assert_eq!(active_downloads(&server).await?, 0);
    let resp = http_get(server.addr, "/api/updates/download/bogus/dl-1").await?;
    assert_eq!(resp.status, 400);
    assert_eq!(active_downloads(&server).await?, 0);
    Ok(())
}

#[tokio::test]
async fn missing_archive_fails_and_frees_the_slot() -> Result<()> {
    // Recognized platform, but no archive on disk.
    let server = spawn_server(ServerOptions::default()).await?;

    let resp = http_get(server.addr, "/api/updates/download/macos-x64/dl-1").await?;
    assert_eq!(resp.status, 500);
    assert_eq!(active_downloads(&server).await?, 0);
    Ok(())
}

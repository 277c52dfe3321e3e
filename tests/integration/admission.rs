//! Admission behavior over the live HTTP surface.

use crate::*;

#[tokio::test]
async fn reservation_expires_without_explicit_clear() -> Result<()> {
    let server = spawn_server(ServerOptions {
        reservation_ttl: Duration::from_secs(1),
        ..Default::default()
    })
    .await?;
    write_archive(&server, "agent-linux.zip", b"archive-bytes")?;

    let resp = http_get(server.addr, "/api/updates/download/linux/dl-ttl").await?;
    assert_eq!(resp.status, 200);
    assert_eq!(active_downloads(&server).await?, 1);

    // Past the TTL the next count evicts the entry.
    tokio::time::sleep(Duration::from_millis(1300)).await;
    assert_eq!(active_downloads(&server).await?, 0);
    Ok(())
}

#[tokio::test]
async fn waiter_is_granted_only_after_a_release() -> Result<()> {
    let server = spawn_server(ServerOptions {
        max_concurrent: 1,
        ..Default::default()
    })
    .await?;
    write_archive(&server, "agent-linux.zip", b"archive-bytes")?;

    let first = http_get(server.addr, "/api/updates/download/linux/dl-1").await?;
    assert_eq!(first.status, 200);
    assert_eq!(active_downloads(&server).await?, 1);

    let addr = server.addr;
    let second =
        tokio::spawn(async move { http_get(addr, "/api/updates/download/linux/dl-2").await });

    // The slot is held, so the second request is still polling.
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(!second.is_finished());

    let cleared = http_get(server.addr, "/api/updates/clear/dl-1").await?;
    assert_eq!(cleared.status, 200);

    // The waiter's next poll (jitter is at most 10s) sees the free slot.
    let resp = tokio::time::timeout(Duration::from_secs(30), second)
        .await
        .expect("waiter should be granted after the release")??;
    assert_eq!(resp.status, 200);
    assert_eq!(active_downloads(&server).await?, 1);
    Ok(())
}

#[tokio::test]
async fn bounded_wait_surfaces_service_unavailable() -> Result<()> {
    let server = spawn_server(ServerOptions {
        max_concurrent: 1,
        max_wait: Some(Duration::from_millis(300)),
        ..Default::default()
    })
    .await?;
    write_archive(&server, "agent-linux.zip", b"archive-bytes")?;

    let first = http_get(server.addr, "/api/updates/download/linux/dl-1").await?;
    assert_eq!(first.status, 200);

    let resp = http_get(server.addr, "/api/updates/download/linux/dl-2").await?;
    assert_eq!(resp.status, 503);

    // The timed-out request reserved nothing.
    assert_eq!(active_downloads(&server).await?, 1);
    assert!(!server.state.reservations.contains("dl-2"));
    Ok(())
}

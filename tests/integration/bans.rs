//! Ban enforcement over the live HTTP surface.
//!
//! Test requests arrive from 127.0.0.1, so banning that address lets
//! the tests observe the full deny-and-uninstall path.

use crate::*;
use outpost_services::{Device, Directive};

fn device(id: &str, addr: &str) -> Device {
    Device {
        id: id.to_string(),
        public_address: addr.to_string(),
    }
}

#[tokio::test]
async fn banned_address_is_rejected_and_agents_told_to_uninstall() -> Result<()> {
    let server = spawn_server(ServerOptions {
        banned: vec!["127.0.0.1".to_string()],
        ..Default::default()
    })
    .await?;
    write_archive(&server, "agent-linux.zip", b"archive-bytes")?;

    // Two connected devices share the banned address.
    server
        .sessions
        .register(device("d1", "127.0.0.1"), Some("c1".into()));
    server
        .sessions
        .register(device("d2", "127.0.0.1"), Some("c2".into()));
    let mut rx1 = server.directives.attach("c1");
    let mut rx2 = server.directives.attach("c2");

    let resp = http_get(server.addr, "/api/updates/download/linux/dl-1").await?;
    assert_eq!(resp.status, 400);

    // Both connections got exactly one uninstall directive.
    assert_eq!(rx1.recv().await, Some(Directive::UninstallAgent));
    assert_eq!(rx2.recv().await, Some(Directive::UninstallAgent));
    assert!(rx1.try_recv().is_err());
    assert!(rx2.try_recv().is_err());

    // A denied request never consumes a slot.
    assert_eq!(active_downloads(&server).await?, 0);
    Ok(())
}

#[tokio::test]
async fn banned_address_with_no_live_agents_still_denies() -> Result<()> {
    let server = spawn_server(ServerOptions {
        banned: vec!["127.0.0.1".to_string()],
        ..Default::default()
    })
    .await?;
    write_archive(&server, "agent-linux.zip", b"archive-bytes")?;

    let resp = http_get(server.addr, "/api/updates/download/linux/dl-1").await?;
    assert_eq!(resp.status, 400);
    assert_eq!(active_downloads(&server).await?, 0);
    Ok(())
}

#[tokio::test]
async fn unrelated_ban_does_not_block_downloads() -> Result<()> {
    let server = spawn_server(ServerOptions {
        banned: vec!["203.0.113.9".to_string()],
        ..Default::default()
    })
    .await?;
    write_archive(&server, "agent-linux.zip", b"archive-bytes")?;

    let resp = http_get(server.addr, "/api/updates/download/linux/dl-1").await?;
    assert_eq!(resp.status, 200);
    Ok(())
}

#[tokio::test]
async fn agents_endpoint_lists_connection_state() -> Result<()> {
    let server = spawn_server(ServerOptions::default()).await?;
    server
        .sessions
        .register(device("d1", "198.51.100.4"), Some("c1".into()));
    server.sessions.register(device("d2", "198.51.100.5"), None);

    let resp = http_get(server.addr, "/api/agents").await?;
    assert_eq!(resp.status, 200);

    let json = resp.json()?;
    let agents = json.as_array().expect("array of agents");
    assert_eq!(agents.len(), 2);
    let connected = agents
        .iter()
        .filter(|a| a["connected"].as_bool() == Some(true))
        .count();
    assert_eq!(connected, 1);
    Ok(())
}

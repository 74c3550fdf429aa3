//! Headless lobby simulation.
//!
//! Three avatars walk into `Alpha`, the first one starts a countdown
//! through the wire protocol, and everyone is relocated when it runs out.
//! Each notification is printed as one JSON line.
//!
//! ```text
//! cargo run -p lobby-sim                 # defaults
//! cargo run -p lobby-sim -- lobby.json   # LobbyConfig overrides
//! RUST_LOG=warpzone_area=debug cargo run -p lobby-sim
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use warpzone::prelude::*;

// ---------------------------------------------------------------------------
// Simulated world
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Plaza {
    standing_in: HashMap<PlayerId, AreaId>,
    spawned: HashSet<PlayerId>,
}

/// The world is shared between the lobby actor and the script driving
/// the avatars around.
#[derive(Clone, Default)]
struct SimWorld(Arc<Mutex<Plaza>>);

impl SimWorld {
    fn walk_into(&self, player: PlayerId, area: &str) {
        if let Ok(mut plaza) = self.0.lock() {
            plaza.spawned.insert(player);
            plaza.standing_in.insert(player, area.into());
        }
    }
}

impl Containment for SimWorld {
    fn is_inside(&self, player: PlayerId, area: &Area) -> bool {
        self.0
            .lock()
            .is_ok_and(|plaza| plaza.standing_in.get(&player) == Some(&area.id))
    }
}

impl Presence for SimWorld {
    fn move_to(&mut self, player: PlayerId, to: Vec3) -> bool {
        let Ok(mut plaza) = self.0.lock() else {
            return false;
        };
        if !plaza.spawned.contains(&player) {
            return false;
        }
        plaza.standing_in.remove(&player);
        tracing::debug!(%player, x = to.x, y = to.y, z = to.z, "avatar moved");
        true
    }
}

// ---------------------------------------------------------------------------
// Scenario
// ---------------------------------------------------------------------------

/// Runs the scenario to completion and returns every notification sent.
async fn simulate(config: LobbyConfig) -> Result<Vec<Outbound>, WarpzoneError> {
    let countdown = config.countdown;
    let world = SimWorld::default();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let lobby = LobbyServer::builder()
        .config(config)
        .area("Alpha")
        .area_with_capacity("Beta", 2)
        .destination("Alpha", Vec3::new(100.0, 0.0, 50.0))
        .spawn(world.clone(), tx);

    for id in 1..=3 {
        let player = PlayerId(id);
        lobby.connect(player).await?;
        world.walk_into(player, "Alpha");
    }
    tokio::time::sleep(Duration::from_secs(1)).await;

    let start = ClientRequest::StartCountdown {
        area: "Alpha".into(),
        party_size: 3,
    };
    let outcome = lobby.submit(PlayerId(1), JsonCodec.encode(&start)?).await?;
    tracing::info!(?outcome, "start submitted");

    // Logic ticks land on frame boundaries, so real time runs a little
    // ahead of countdown time.
    tokio::time::sleep(countdown + countdown / 5 + Duration::from_secs(1)).await;
    lobby.shutdown().await?;

    let mut sent = Vec::new();
    while let Some(msg) = rx.recv().await {
        sent.push(msg);
    }
    Ok(sent)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    warpzone::init_tracing("info");

    let config = match std::env::args().nth(1) {
        Some(path) => {
            tracing::info!(%path, "loading lobby config");
            LobbyConfig::from_json(&std::fs::read_to_string(path)?)?
        }
        None => LobbyConfig::default(),
    };

    for (to, notification) in simulate(config).await? {
        let line = serde_json::json!({ "to": to, "notification": notification });
        println!("{line}");
    }
    Ok(())
}

use std::net::SocketAddr;
use std::time::Duration;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use seabattle::{
    read_frame, write_frame, AttackStatus, Coord, ErrorCode, Event, Orientation, PlayerId,
    Request, Router, Server, Ship, ShipKind,
};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

async fn start_server() -> anyhow::Result<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let server = Server::new(Router::with_rng(SmallRng::seed_from_u64(3)));
    tokio::spawn(async move {
        let _ = server.serve(listener).await;
    });
    Ok(addr)
}

async fn next_event(stream: &mut TcpStream) -> anyhow::Result<Event> {
    timeout(Duration::from_secs(5), read_frame::<_, Event>(stream))
        .await
        .map_err(|_| anyhow::anyhow!("timed out waiting for an event"))?
}

/// Scan incoming events until `pick` accepts one.
async fn wait_for<F, T>(stream: &mut TcpStream, mut pick: F) -> anyhow::Result<T>
where
    F: FnMut(Event) -> Option<T>,
{
    for _ in 0..64 {
        if let Some(found) = pick(next_event(stream).await?) {
            return Ok(found);
        }
    }
    anyhow::bail!("event did not arrive within 64 frames")
}

async fn register(stream: &mut TcpStream, name: &str) -> anyhow::Result<PlayerId> {
    write_frame(
        stream,
        &Request::Register {
            name: name.to_string(),
            password: "pw".to_string(),
        },
    )
    .await?;
    wait_for(stream, |event| match event {
        Event::Registered { player, .. } => Some(player),
        _ => None,
    })
    .await
}

#[tokio::test(flavor = "multi_thread")]
async fn test_snapshot_and_registration_over_tcp() -> anyhow::Result<()> {
    let addr = start_server().await?;
    let mut stream = TcpStream::connect(addr).await?;

    match next_event(&mut stream).await? {
        Event::RoomList(rooms) => assert!(rooms.is_empty()),
        other => panic!("expected the room list first, got {other:?}"),
    }
    match next_event(&mut stream).await? {
        Event::Leaderboard(entries) => assert!(entries.is_empty()),
        other => panic!("expected the leaderboard second, got {other:?}"),
    }

    let player = register(&mut stream, "alice").await?;
    assert_eq!(player, PlayerId(1));

    let entries = wait_for(&mut stream, |event| match event {
        Event::Leaderboard(entries) => Some(entries),
        _ => None,
    })
    .await?;
    assert!(entries
        .iter()
        .any(|entry| entry.name == "alice" && entry.wins == 0));
    Ok(())
}

// A Register frame sized exactly at the frame cap passes the codec, but the
// name inside would bloat every later leaderboard past the cap and kill the
// writers; validation has to bounce it before it reaches the registry.
#[tokio::test(flavor = "multi_thread")]
async fn test_oversized_name_rejected_without_breaking_delivery() -> anyhow::Result<()> {
    let addr = start_server().await?;
    let mut stream = TcpStream::connect(addr).await?;

    write_frame(
        &mut stream,
        &Request::Register {
            name: "a".repeat(65_514),
            password: "pw".to_string(),
        },
    )
    .await?;
    let code = wait_for(&mut stream, |event| match event {
        Event::Rejected { code, .. } => Some(code),
        _ => None,
    })
    .await?;
    assert_eq!(code, ErrorCode::Validation);

    // the same connection still registers and still receives broadcasts
    let player = register(&mut stream, "alice").await?;
    assert_eq!(player, PlayerId(1));
    let entries = wait_for(&mut stream, |event| match event {
        Event::Leaderboard(entries) => Some(entries),
        _ => None,
    })
    .await?;
    assert!(entries
        .iter()
        .any(|entry| entry.name == "alice" && entry.wins == 0));

    // and a fresh connection gets its snapshot instead of a dead socket
    let mut late = TcpStream::connect(addr).await?;
    match next_event(&mut late).await? {
        Event::RoomList(rooms) => assert!(rooms.is_empty()),
        other => panic!("expected the room list first, got {other:?}"),
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_full_match_over_tcp() -> anyhow::Result<()> {
    let addr = start_server().await?;

    let mut alice = TcpStream::connect(addr).await?;
    let p1 = register(&mut alice, "alice").await?;
    write_frame(&mut alice, &Request::CreateRoom).await?;
    let room = wait_for(&mut alice, |event| match event {
        Event::RoomList(rooms) => rooms.last().map(|room| room.id),
        _ => None,
    })
    .await?;

    let mut bob = TcpStream::connect(addr).await?;
    let p2 = register(&mut bob, "bob").await?;
    write_frame(&mut bob, &Request::JoinRoom { room }).await?;

    let (game, handed_to) = wait_for(&mut alice, |event| match event {
        Event::GameCreated { game, player } => Some((game, player)),
        _ => None,
    })
    .await?;
    assert_eq!(handed_to, p1);
    let (game_b, handed_to) = wait_for(&mut bob, |event| match event {
        Event::GameCreated { game, player } => Some((game, player)),
        _ => None,
    })
    .await?;
    assert_eq!(game_b, game);
    assert_eq!(handed_to, p2);

    let ships = vec![Ship::new(0, 0, Orientation::Horizontal, ShipKind::Small)];
    write_frame(
        &mut alice,
        &Request::PlaceShips {
            game,
            ships: ships.clone(),
            player: p1,
        },
    )
    .await?;
    write_frame(
        &mut bob,
        &Request::PlaceShips {
            game,
            ships,
            player: p2,
        },
    )
    .await?;

    let turn = wait_for(&mut alice, |event| match event {
        Event::GameStarted { turn, .. } => Some(turn),
        _ => None,
    })
    .await?;
    let (attacker, defender, attacker_id) = if turn == p1 {
        (&mut alice, &mut bob, p1)
    } else {
        (&mut bob, &mut alice, p2)
    };

    write_frame(
        attacker,
        &Request::Attack {
            game,
            target: Coord::new(0, 0),
            player: attacker_id,
        },
    )
    .await?;

    // wire order on a winning kill: halo misses, leaderboard, finish, kill
    let entries = wait_for(attacker, |event| match event {
        Event::Leaderboard(entries) if entries.iter().any(|entry| entry.wins == 1) => Some(entries),
        _ => None,
    })
    .await?;
    assert_eq!(entries.len(), 2);

    let winner = wait_for(attacker, |event| match event {
        Event::GameFinished { winner } => Some(winner),
        _ => None,
    })
    .await?;
    assert_eq!(winner, attacker_id);

    let status = wait_for(attacker, |event| match event {
        Event::AttackResult {
            status, position, ..
        } if position == Coord::new(0, 0) => Some(status),
        _ => None,
    })
    .await?;
    assert_eq!(status, AttackStatus::Killed);

    let seen_by_defender = wait_for(defender, |event| match event {
        Event::GameFinished { winner } => Some(winner),
        _ => None,
    })
    .await?;
    assert_eq!(seen_by_defender, attacker_id);
    Ok(())
}

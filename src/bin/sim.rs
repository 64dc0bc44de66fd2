//! Headless simulation: two scripted clients play one full match through the
//! router with random fleets and random attacks, printing a JSON summary.

use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde_json::json;

use seabattle::{
    random_fleet, ConnectionId, Event, GameId, Outbox, PlayerId, Request, RoomId, Router,
};

/// Collects router output; a `None` destination marks a broadcast.
#[derive(Default)]
struct Mailbox {
    events: Vec<(Option<ConnectionId>, Event)>,
}

impl Mailbox {
    fn drain(&mut self) -> Vec<(Option<ConnectionId>, Event)> {
        std::mem::take(&mut self.events)
    }
}

impl Outbox for Mailbox {
    fn send(&mut self, to: ConnectionId, event: Event) {
        self.events.push((Some(to), event));
    }

    fn broadcast(&mut self, event: Event) {
        self.events.push((None, event));
    }
}

fn register(
    router: &mut Router,
    mail: &mut Mailbox,
    conn: ConnectionId,
    name: &str,
) -> anyhow::Result<PlayerId> {
    router.handle(
        conn,
        Request::Register {
            name: name.to_string(),
            password: "secret".to_string(),
        },
        mail,
    );
    mail.drain()
        .into_iter()
        .find_map(|(_, event)| match event {
            Event::Registered { player, .. } => Some(player),
            _ => None,
        })
        .ok_or_else(|| anyhow::anyhow!("registration failed for {name}"))
}

fn last_listed_room(mail: &mut Mailbox) -> anyhow::Result<RoomId> {
    mail.drain()
        .into_iter()
        .rev()
        .find_map(|(_, event)| match event {
            Event::RoomList(rooms) => rooms.last().map(|room| room.id),
            _ => None,
        })
        .ok_or_else(|| anyhow::anyhow!("no open room listed"))
}

fn created_game(mail: &mut Mailbox) -> anyhow::Result<GameId> {
    mail.drain()
        .into_iter()
        .find_map(|(_, event)| match event {
            Event::GameCreated { game, .. } => Some(game),
            _ => None,
        })
        .ok_or_else(|| anyhow::anyhow!("room join did not start a game"))
}

fn first_turn(mail: &mut Mailbox) -> anyhow::Result<PlayerId> {
    mail.drain()
        .into_iter()
        .find_map(|(_, event)| match event {
            Event::GameStarted { turn, .. } => Some(turn),
            _ => None,
        })
        .ok_or_else(|| anyhow::anyhow!("match did not start"))
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <seed>", args[0]);
        std::process::exit(1);
    }
    let seed: u64 = args[1].parse()?;

    let mut fleet_rng = SmallRng::seed_from_u64(seed);
    let mut router = Router::with_rng(SmallRng::seed_from_u64(seed.wrapping_add(1)));
    let mut mail = Mailbox::default();

    let alice = ConnectionId(1);
    let bob = ConnectionId(2);
    router.connection_opened(alice, &mut mail);
    router.connection_opened(bob, &mut mail);

    let p1 = register(&mut router, &mut mail, alice, "alice")?;
    let p2 = register(&mut router, &mut mail, bob, "bob")?;

    router.handle(alice, Request::CreateRoom, &mut mail);
    let room = last_listed_room(&mut mail)?;
    router.handle(bob, Request::JoinRoom { room }, &mut mail);
    let game = created_game(&mut mail)?;

    let ships = random_fleet(&mut fleet_rng)?;
    router.handle(
        alice,
        Request::PlaceShips {
            game,
            ships,
            player: p1,
        },
        &mut mail,
    );
    let ships = random_fleet(&mut fleet_rng)?;
    router.handle(
        bob,
        Request::PlaceShips {
            game,
            ships,
            player: p2,
        },
        &mut mail,
    );

    let mut turn = first_turn(&mut mail)?;
    let mut attacks = 0u32;
    let winner = loop {
        let (conn, player) = if turn == p1 { (alice, p1) } else { (bob, p2) };
        router.handle(conn, Request::RandomAttack { game, player }, &mut mail);
        attacks += 1;
        let mut finished = None;
        for (_, event) in mail.drain() {
            match event {
                Event::TurnChanged { player } => turn = player,
                Event::GameFinished { winner } => finished = Some(winner),
                Event::Rejected { code, message } => {
                    anyhow::bail!("attack rejected ({code:?}): {message}")
                }
                _ => {}
            }
        }
        if let Some(winner) = finished {
            break winner;
        }
    };

    let result = json!({
        "seed": seed,
        "winner": if winner == p1 { "alice" } else { "bob" },
        "attacks": attacks,
    });
    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}

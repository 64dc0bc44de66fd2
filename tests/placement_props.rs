use proptest::collection::vec;
use proptest::prelude::*;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use seabattle::{random_fleet, Board, Cell, Coord, Orientation, Ship, ShipKind, BOARD_SIZE};

fn arb_kind() -> impl Strategy<Value = ShipKind> {
    prop_oneof![
        Just(ShipKind::Small),
        Just(ShipKind::Medium),
        Just(ShipKind::Large),
        Just(ShipKind::Huge),
    ]
}

fn arb_ship() -> impl Strategy<Value = Ship> {
    (
        0..BOARD_SIZE as u8,
        0..BOARD_SIZE as u8,
        any::<bool>(),
        arb_kind(),
    )
        .prop_map(|(x, y, horizontal, kind)| {
            let orientation = if horizontal {
                Orientation::Horizontal
            } else {
                Orientation::Vertical
            };
            Ship::new(x, y, orientation, kind)
        })
}

fn ship_cell_count(board: &Board) -> usize {
    let mut count = 0;
    for y in 0..BOARD_SIZE {
        for x in 0..BOARD_SIZE {
            if board.cell(Coord::new(x as u8, y as u8)).unwrap() == Cell::Ship {
                count += 1;
            }
        }
    }
    count
}

/// Smallest Chebyshev distance between any two footprint cells.
fn min_chebyshev(a: &Ship, b: &Ship) -> i32 {
    a.cells()
        .flat_map(|(ax, ay)| {
            b.cells().map(move |(bx, by)| {
                let dx = (ax as i32 - bx as i32).abs();
                let dy = (ay as i32 - by as i32).abs();
                dx.max(dy)
            })
        })
        .min()
        .unwrap_or(i32::MAX)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn placement_is_all_or_nothing(fleet in vec(arb_ship(), 1..6)) {
        let mut board = Board::new();
        match board.place_fleet(&fleet) {
            Ok(()) => {
                let expected: usize = fleet.iter().map(|s| s.length as usize).sum();
                prop_assert_eq!(ship_cell_count(&board), expected);
            }
            Err(_) => prop_assert_eq!(board, Board::new()),
        }
    }

    #[test]
    fn accepted_fleets_keep_their_distance(fleet in vec(arb_ship(), 2..6)) {
        let mut board = Board::new();
        if board.place_fleet(&fleet).is_ok() {
            for (i, a) in fleet.iter().enumerate() {
                for b in fleet.iter().skip(i + 1) {
                    prop_assert!(
                        min_chebyshev(a, b) >= 2,
                        "ships {:?} and {:?} ended up adjacent",
                        a,
                        b
                    );
                }
            }
        }
    }

    #[test]
    fn random_fleets_always_place(seed in any::<u64>()) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let fleet = random_fleet(&mut rng).unwrap();
        let mut board = Board::new();
        prop_assert!(board.place_fleet(&fleet).is_ok());
    }
}

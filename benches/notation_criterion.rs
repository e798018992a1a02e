use std::hint::black_box;
use std::time::Duration;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use chess_session::game_state::game_state::GameState;
use chess_session::game_state::position::Position;
use chess_session::notation::fan::{NotationFormatter, NotationStyle};
use chess_session::notation::terminal_state::TerminalStateClassifier;

struct GameCase {
    name: &'static str,
    fen: &'static str,
    moves: &'static [&'static str],
}

const CASES: &[GameCase] = &[
    GameCase {
        name: "ruy_lopez",
        fen: "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        moves: &[
            "e2e4", "e7e5", "g1f3", "b8c6", "f1b5", "a7a6", "b5a4", "g8f6", "e1g1", "f8e7",
            "f1e1", "b7b5", "a4b3", "d7d6", "c2c3", "e8g8", "h2h3", "c6a5", "b3c2", "c7c5",
        ],
    },
    GameCase {
        name: "rook_pair",
        fen: "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1",
        moves: &[
            "a1d1", "a8d8", "h1f1", "h8f8", "d1d2", "f8f2", "f1f2", "d8d2", "e1d2", "e8e7",
        ],
    },
];

fn play(case: &GameCase) -> Vec<GameState> {
    let mut history = vec![GameState::from_fen(case.fen).expect("benchmark FEN should parse")];
    for lan in case.moves {
        let next = history
            .last()
            .and_then(|position| position.make_move_lan(lan))
            .unwrap_or_else(|| panic!("{lan} should be legal in {}", case.name));
        history.push(next);
    }
    history
}

fn bench_notation(c: &mut Criterion) {
    let mut group = c.benchmark_group("notation");
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(3));

    for case in CASES {
        let history = play(case);
        group.throughput(Throughput::Elements(case.moves.len() as u64));

        for style in [NotationStyle::Figurine, NotationStyle::Letters] {
            let formatter = NotationFormatter::new(style);
            group.bench_with_input(
                BenchmarkId::new(format!("{style:?}"), case.name),
                &history,
                |b, history| {
                    b.iter(|| {
                        let tokens = formatter
                            .format_all(black_box(history))
                            .expect("every scripted position records its move");
                        black_box(tokens)
                    });
                },
            );
        }

        group.bench_with_input(BenchmarkId::new("classify", case.name), &history, |b, history| {
            b.iter(|| {
                for position in history {
                    black_box(TerminalStateClassifier::result(black_box(position)));
                }
            });
        });
    }

    group.finish();
}

criterion_group!(notation_benches, bench_notation);
criterion_main!(notation_benches);

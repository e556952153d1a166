use criterion::{black_box, criterion_group, criterion_main, Criterion};
use memory_match::cards::{Deck, InstanceIdAllocator};
use memory_match::core::{Difficulty, GameConfig, GameRng};
use memory_match::session::SessionController;

fn bench_deck_build(c: &mut Criterion) {
    let config = GameConfig::default();
    let tokens = config.profile(Difficulty::Hard).unwrap().tokens();
    let mut rng = GameRng::new(12345);
    let mut ids = InstanceIdAllocator::new();

    c.bench_function("deck_build_hard", |b| {
        b.iter(|| Deck::build(black_box(&tokens), &mut rng, &mut ids).unwrap())
    });
}

fn bench_reveal_pair(c: &mut Criterion) {
    let mut game = SessionController::new(GameConfig::default().with_seed(12345)).unwrap();

    c.bench_function("reveal_matching_pair", |b| {
        b.iter(|| {
            game.start(Difficulty::Easy).unwrap();
            let deck = game.deck().unwrap();
            let token = deck.at(0).unwrap().token;
            let ids = deck.instances_of(token);
            game.reveal(black_box(ids[0]));
            game.reveal(black_box(ids[1]));
        })
    });
}

fn bench_clock(c: &mut Criterion) {
    let mut game = SessionController::new(GameConfig::default().with_seed(12345)).unwrap();
    game.start(Difficulty::Medium).unwrap();

    c.bench_function("advance_one_second", |b| {
        b.iter(|| {
            game.advance(black_box(1_000));
        })
    });
}

criterion_group!(benches, bench_deck_build, bench_reveal_pair, bench_clock);
criterion_main!(benches);

pub mod constants;
pub mod prize_sequencer;
pub mod roulette;
pub mod seeded_rng;
pub mod selector;
pub mod shared_draw;
pub mod validation;

use backend::config::Config;
use backend::driver::play_draw;
use backend::logging;
use backend::observer::LogObserver;
use backend::session::DrawSession;
use backend::store::MemoryStore;
use shared::shared_draw::{Entry, Prize, PrizeAssignment};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    logging::setup();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let entries: Vec<Entry> = config.entries.iter().map(Entry::new).collect();
    let mut prizes = Vec::new();
    let mut assignments = Vec::new();
    for (name, count) in &config.prizes {
        let prize = Prize::new(name.as_str());
        assignments.push(PrizeAssignment::new(prize.id, *count));
        prizes.push(prize);
    }
    info!(
        "Loaded {} entries and {} prize(s), layout: {}",
        entries.len(),
        prizes.len(),
        config.spin.layout
    );

    let store = MemoryStore::new(entries, prizes, assignments);
    let mut session = DrawSession::new(store, LogObserver::default(), config.spin.clone(), config.draw_options());

    if let Err(e) = session.start_or_continue_session().await {
        error!("Cannot start the draw: {}", e);
        std::process::exit(1);
    }

    while session.is_active() {
        let outcome = match session.draw_next_winner().await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Draw stopped: {}", e);
                std::process::exit(1);
            }
        };

        let (clock, observer) = session.animation_parts();
        play_draw(clock, observer, &outcome, config.frame_interval).await;

        if let Err(e) = session.confirm_present(outcome.winner.id).await {
            error!("Could not confirm {}: {}", outcome.entry.name, e);
            std::process::exit(1);
        }
    }

    match session.history().await {
        Ok(draws) => match serde_json::to_string_pretty(&draws) {
            Ok(json) => println!("{}", json),
            Err(e) => error!("Failed to serialize draw history: {}", e),
        },
        Err(e) => error!("Failed to load draw history: {}", e),
    }
}

//! Memory Dungeon entry point
//!
//! The web build starts from `web::wasm_start`. Natively this runs an
//! auto-played climb against an in-memory save and logs what happens.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Memory Dungeon (native) starting...");
    log::info!("Native mode has no UI - run the web build for the real game");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or_else(rand::random);
    demo::run(seed, 3);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is web::wasm_start, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use memory_dungeon::platform::now_ms;
    use memory_dungeon::sim::{Phase, Session, SessionEvent, SessionInput, SlotStatus};
    use memory_dungeon::{KeyValueStore, MemoryStore};

    /// Frame step for the simulated clock (ms)
    const FRAME_MS: u32 = 100;
    /// Safety cap on simulated frames per run
    const MAX_FRAMES: u32 = 10_000;

    /// Play `runs` runs, spelling every word correctly except the last word of odd runs
    pub fn run(seed: u64, runs: u32) {
        log::info!("Demo seed {}", seed);
        let mut session = Session::new(MemoryStore::new(), seed, now_ms());
        session.handle(SessionInput::Start);

        for run in 0..runs {
            if session.phase() != Phase::Memo {
                break;
            }
            let words: Vec<&str> = session.run_words().iter().map(|w| w.word.as_str()).collect();
            log::info!("Run {}: memorize {:?}", run + 1, words);
            session.handle(SessionInput::Ready);

            let fumble_last = run % 2 == 1;
            play_combat(&mut session, fumble_last);

            for event in session.drain_events() {
                if let SessionEvent::Settled(settlement) = event {
                    println!(
                        "Run {}: {} B{}F -> B{}F, +{} soul fire",
                        run + 1,
                        if settlement.success { "ASCENSION" } else { "THE FALL" },
                        settlement.start_floor,
                        settlement.target_floor,
                        settlement.soul_fire_gained
                    );
                }
            }
            session.handle(SessionInput::Continue);
        }

        let save = session.saves().read();
        println!(
            "Final: B{}F, soul fire {}, {} words mastered",
            save.current_floor,
            save.soul_fire,
            save.mastered_words.len()
        );
    }

    fn play_combat<S: KeyValueStore>(session: &mut Session<S>, fumble_last: bool) {
        let mut frames = 0;
        while session.phase() == Phase::Combat && frames < MAX_FRAMES {
            frames += 1;

            let picks: Vec<u32> = match session.combat() {
                Some(combat) if combat.status() == SlotStatus::Normal => {
                    let last_word = combat.level() + 1 == combat.words().len();
                    match combat.board() {
                        Some(board) if board.filled.is_empty() => {
                            let mut ids: Vec<u32> = (0..board.slot_count())
                                .filter_map(|slot| {
                                    board
                                        .bubbles
                                        .iter()
                                        .find(|b| b.slot_index == Some(slot))
                                        .map(|b| b.id)
                                })
                                .collect();
                            if fumble_last && last_word {
                                ids.reverse();
                            }
                            ids
                        }
                        _ => Vec::new(),
                    }
                }
                _ => Vec::new(),
            };

            for id in picks {
                session.handle(SessionInput::Pick(id));
            }
            session.tick(FRAME_MS);
        }

        if session.phase() == Phase::Combat {
            log::warn!("Combat did not finish within {} frames", MAX_FRAMES);
        }
    }
}

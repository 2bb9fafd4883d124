use std::time::Duration;

use minesweeper_common::{
    models::{CellView, Difficulty, Outcome, Pos, RevealOutcome},
    protocol::SessionMessage,
};
use minesweeper_engine::{EngineError, Session};
use minesweeper_host::{HostConfig, HostError, runtime};
use rand::{SeedableRng, rngs::StdRng};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_test::assert_ok;

fn config(difficulty: &str, seed: u64) -> HostConfig {
    HostConfig {
        difficulty: difficulty.to_string(),
        seed: Some(seed),
        tick_interval: Duration::from_secs(1),
    }
}

/// Next message that is not a clock tick.
async fn next_event(messages: &mut UnboundedReceiver<SessionMessage>) -> SessionMessage {
    loop {
        match messages.recv().await.expect("runtime stopped") {
            SessionMessage::Tick { .. } => continue,
            other => return other,
        }
    }
}

#[tokio::test(start_paused = true)]
async fn first_message_is_init() {
    let (handle, mut messages) = runtime::spawn(&config("Intermediate", 5)).unwrap();

    match messages.recv().await {
        Some(SessionMessage::Init { snapshot }) => {
            assert_eq!(snapshot.difficulty, Difficulty::Intermediate);
            assert_eq!((snapshot.rows, snapshot.cols, snapshot.mines), (18, 12, 36));
            assert_eq!(snapshot.outcome, Outcome::InProgress);
            assert_eq!(snapshot.elapsed_secs, 0);
        }
        other => panic!("expected init, got {other:?}"),
    }

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn unknown_difficulty_fails_to_spawn() {
    match runtime::spawn(&config("Expert", 1)) {
        Err(HostError::Engine(EngineError::InvalidDifficulty(name))) => {
            assert_eq!(name, "Expert")
        }
        Err(other) => panic!("unexpected error {other:?}"),
        Ok(_) => panic!("Expert is not a preset"),
    }
}

#[tokio::test(start_paused = true)]
async fn clock_times_the_game_out_and_stops() {
    let (handle, mut messages) = runtime::spawn(&config("Beginner", 11)).unwrap();
    assert!(matches!(
        messages.recv().await,
        Some(SessionMessage::Init { .. })
    ));

    let mut ticks = 0;
    loop {
        match messages.recv().await.expect("runtime stopped") {
            SessionMessage::Tick {
                elapsed_secs,
                remaining_secs,
            } => {
                ticks += 1;
                assert_eq!(elapsed_secs, ticks);
                assert_eq!(remaining_secs, 60 - ticks);
            }
            SessionMessage::Update {
                updates,
                signal,
                outcome,
            } => {
                assert_eq!(outcome, Outcome::TimedOut);
                assert_eq!(signal, None);
                assert_eq!(updates.len(), 11);
                break;
            }
            other => panic!("unexpected message {other:?}"),
        }
    }
    assert_eq!(ticks, 60);

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert!(messages.try_recv().is_err(), "ticker should be stopped");

    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.outcome, Outcome::TimedOut);
    assert_eq!(snapshot.elapsed_secs, 60);

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn reveal_matches_a_local_session_with_the_same_seed() {
    let seed = 21;
    let mut rng = StdRng::seed_from_u64(seed);
    let mut expected = Session::new(Difficulty::Beginner, &mut rng).unwrap();
    let safe = (0..9)
        .flat_map(|row| (0..6).map(move |col| Pos::new(row, col)))
        .find(|pos| !expected.board().cell(*pos).unwrap().has_mine)
        .unwrap();
    let expected_update = expected.on_reveal(safe).unwrap();

    let (handle, mut messages) = runtime::spawn(&config("Beginner", seed)).unwrap();
    assert!(matches!(
        next_event(&mut messages).await,
        SessionMessage::Init { .. }
    ));

    assert_ok!(handle.reveal(safe));

    match next_event(&mut messages).await {
        SessionMessage::Update {
            updates, signal, ..
        } => {
            let changed: Vec<Pos> = updates.iter().map(|update| update.pos).collect();
            assert_eq!(changed, expected_update.changed);
            assert_eq!(signal, expected_update.signal);
            assert_ne!(signal, Some(RevealOutcome::HitMine));
        }
        other => panic!("expected update, got {other:?}"),
    }

    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.field, expected.snapshot().field);

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn flag_then_reveal_is_ignored() {
    let (handle, mut messages) = runtime::spawn(&config("Beginner", 4)).unwrap();
    next_event(&mut messages).await;

    let pos = Pos::new(4, 2);
    assert_ok!(handle.toggle_flag(pos));
    assert_ok!(handle.reveal(pos));

    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.flags, 1);
    assert_eq!(snapshot.outcome, Outcome::InProgress);
    assert_eq!(snapshot.get_cell(pos), Some(CellView::Flagged));

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn bad_commands_are_rejected_without_ending_the_game() {
    let (handle, mut messages) = runtime::spawn(&config("Beginner", 8)).unwrap();
    next_event(&mut messages).await;

    assert_ok!(handle.reveal(Pos::new(9, 0)));
    match next_event(&mut messages).await {
        SessionMessage::Rejected { reason } => assert!(reason.contains("outside"), "{reason}"),
        other => panic!("expected rejection, got {other:?}"),
    }

    assert_ok!(handle.restart("Expert"));
    match next_event(&mut messages).await {
        SessionMessage::Rejected { reason } => assert!(reason.contains("Expert"), "{reason}"),
        other => panic!("expected rejection, got {other:?}"),
    }

    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.difficulty, Difficulty::Beginner);
    assert_eq!(snapshot.outcome, Outcome::InProgress);

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn restart_replaces_the_session_and_restarts_the_clock() {
    let (handle, mut messages) = runtime::spawn(&config("Beginner", 2)).unwrap();
    let first_id = match next_event(&mut messages).await {
        SessionMessage::Init { snapshot } => snapshot.id,
        other => panic!("expected init, got {other:?}"),
    };

    tokio::time::sleep(Duration::from_millis(5500)).await;
    assert_eq!(handle.snapshot().await.unwrap().elapsed_secs, 5);

    assert_ok!(handle.restart("Advanced"));
    match next_event(&mut messages).await {
        SessionMessage::Init { snapshot } => {
            assert_ne!(snapshot.id, first_id);
            assert_eq!(snapshot.difficulty, Difficulty::Advanced);
            assert_eq!((snapshot.rows, snapshot.cols), (26, 21));
            assert_eq!(snapshot.elapsed_secs, 0);
            assert_eq!(snapshot.time_limit_secs, 660);
        }
        other => panic!("expected init, got {other:?}"),
    }

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn restart_on_a_tick_boundary_starts_the_clock_at_zero() {
    for seed in 0..20 {
        let (handle, mut messages) = runtime::spawn(&config("Beginner", seed)).unwrap();
        next_event(&mut messages).await;

        // The old ticker fires at this instant, before the restart is handled.
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_ok!(handle.restart("Advanced"));

        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.difficulty, Difficulty::Advanced);
        assert_eq!(
            snapshot.elapsed_secs, 0,
            "seed {seed}: old tick reached the new game"
        );

        handle.shutdown().await;
    }
}

#[tokio::test(start_paused = true)]
async fn shutdown_closes_the_message_stream() {
    let (handle, mut messages) = runtime::spawn(&config("Beginner", 3)).unwrap();
    next_event(&mut messages).await;

    handle.shutdown().await;

    while let Some(message) = messages.recv().await {
        assert!(matches!(message, SessionMessage::Tick { .. }));
    }
}

#[tokio::test(start_paused = true)]
async fn dropping_the_handle_stops_the_runtime() {
    let (handle, mut messages) = runtime::spawn(&config("Beginner", 3)).unwrap();
    next_event(&mut messages).await;

    drop(handle);

    while let Some(message) = messages.recv().await {
        assert!(matches!(message, SessionMessage::Tick { .. }));
    }
}

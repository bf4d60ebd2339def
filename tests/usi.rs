use tsubame::movetypes::*;
use tsubame::position::*;
use tsubame::stack_size::STACK_SIZE;
use tsubame::types::*;
use tsubame::usi::*;
use tsubame::usioption::*;

fn run_on_large_stack(f: impl FnOnce() + Send + 'static) {
    std::thread::Builder::new()
        .stack_size(STACK_SIZE)
        .spawn(f)
        .unwrap()
        .join()
        .unwrap();
}

fn new_engine() -> UsiEngine {
    let mut engine = UsiEngine::new().unwrap();
    engine.set_hide_output(true);
    engine.execute("setoption name Book_Enable value false").unwrap();
    engine.execute("setoption name USI_Hash value 4").unwrap();
    engine
}

#[test]
fn test_session() {
    run_on_large_stack(|| {
        let mut engine = new_engine();
        assert!(engine.execute("usi").unwrap());
        assert!(!engine.is_ready());
        engine.execute("setoption name Threads value 2").unwrap();
        engine.execute("isready").unwrap();
        assert!(engine.is_ready());
        assert_eq!(engine.thread_pool().thread_num(), 2);
        assert_eq!(engine.thread_pool().tt().mega_byte_size(), 4);
        assert_eq!(engine.usi_options().get_i64(UsiOptions::THREADS), 2);

        engine.execute("usinewgame").unwrap();
        engine.execute("position startpos moves 7g7f 3c3d").unwrap();
        engine.execute("go depth 3").unwrap();
        engine.execute("wait").unwrap();
        let outcome = engine.thread_pool().last_outcome().unwrap();
        let best_move = outcome.best_move.unwrap();
        let pos = engine.position();
        assert!(pos.pseudo_legal(best_move) && pos.is_legal(best_move));
        assert!(!engine.execute("quit").unwrap());
    });
}

#[test]
fn test_mate_in_one() {
    run_on_large_stack(|| {
        let mut engine = new_engine();
        engine.execute("isready").unwrap();
        engine.execute("position sfen 4k4/9/4P4/9/9/9/9/9/4K4 b G2r2b3g4s4n4l17p 1").unwrap();
        engine.execute("go depth 3").unwrap();
        engine.execute("wait").unwrap();
        let outcome = engine.thread_pool().last_outcome().unwrap();
        let best_move = outcome.best_move.unwrap();
        assert_eq!(best_move.to_usi_string(), "G*5b");
        assert_eq!(outcome.result.unwrap().score, Value::mate_in(1));
    });
}

#[test]
fn test_resign_when_mated() {
    run_on_large_stack(|| {
        let mut engine = new_engine();
        engine.execute("isready").unwrap();
        engine.execute("position sfen 4k4/4G4/4P4/9/9/9/9/9/4K4 w 2r2b3g4s4n4l17p 2").unwrap();
        assert!(engine.position().is_checkmate());
        engine.execute("go btime 1000 wtime 1000 byoyomi 1000").unwrap();
        engine.execute("wait").unwrap();
        let outcome = engine.thread_pool().last_outcome().unwrap();
        assert_eq!(outcome.best_move, None);
        assert_eq!(outcome.to_usi_string(false), "bestmove resign");
    });
}

#[test]
fn test_go_infinite_and_stop() {
    run_on_large_stack(|| {
        let mut engine = new_engine();
        engine.execute("isready").unwrap();
        engine.execute("position startpos").unwrap();
        engine.execute("go infinite").unwrap();
        std::thread::sleep(std::time::Duration::from_millis(100));
        assert!(engine.thread_pool().is_searching());
        engine.execute("stop").unwrap();
        engine.execute("wait").unwrap();
        let best_move = engine.thread_pool().last_outcome().unwrap().best_move.unwrap();
        assert!(engine.position().is_legal(best_move));
    });
}

#[test]
fn test_node_limit() {
    run_on_large_stack(|| {
        let mut engine = new_engine();
        engine.execute("isready").unwrap();
        engine.execute("position startpos").unwrap();
        engine.execute("go nodes 5000").unwrap();
        engine.execute("wait").unwrap();
        assert!(engine.thread_pool().last_outcome().unwrap().best_move.is_some());
        // The budget is only checked now and then.
        assert!(engine.thread_pool().nodes_searched() < 5000 * 2);
    });
}

#[test]
fn test_repetition_count_option() {
    run_on_large_stack(|| {
        let mut engine = new_engine();
        engine.execute("setoption name Repetition_Count value 2").unwrap();
        engine
            .execute("position startpos moves 5i5h 5a5b 5h5i 5b5a")
            .unwrap();
        assert_eq!(engine.position().game_status(), GameStatus::Repetition);
        engine.execute("setoption name Repetition_Count value 4").unwrap();
        assert_eq!(engine.position().game_status(), GameStatus::InProgress);
    });
}

#[test]
fn test_bad_commands_keep_state() {
    run_on_large_stack(|| {
        let mut engine = new_engine();
        engine.execute("position startpos moves 2g2f").unwrap();
        let sfen = engine.position().to_sfen();
        assert!(engine.execute("position startpos moves 2g2f 2g2f").is_err());
        assert!(engine.execute("position sfen lnsgkgsnl b - 1").is_err());
        assert!(engine.execute("go depth 1").is_err());
        assert!(engine.execute("unknown_command").is_err());
        assert_eq!(engine.position().to_sfen(), sfen);
        let m = Move::new_from_usi_str("8c8d", engine.position()).unwrap();
        assert!(engine.position().is_legal(m));
    });
}

#[test]
fn test_go_ponder_and_ponderhit() {
    run_on_large_stack(|| {
        let mut engine = new_engine();
        engine.execute("setoption name USI_Ponder value true").unwrap();
        engine.execute("isready").unwrap();
        engine.execute("position startpos moves 7g7f").unwrap();
        engine.execute("go ponder btime 0 wtime 0 byoyomi 600").unwrap();
        std::thread::sleep(std::time::Duration::from_millis(300));
        // byoyomi minus the 500 ms margin is long gone, but pondering goes on.
        assert!(engine.thread_pool().is_searching());
        engine.execute("ponderhit").unwrap();
        engine.execute("wait").unwrap();
        let best_move = engine.thread_pool().last_outcome().unwrap().best_move.unwrap();
        assert!(engine.position().is_legal(best_move));

        // "stop" ends a ponder search too.
        engine.execute("go ponder btime 0 wtime 0 byoyomi 600").unwrap();
        engine.execute("stop").unwrap();
        engine.execute("wait").unwrap();
        assert!(engine.thread_pool().last_outcome().unwrap().best_move.is_some());
    });
}

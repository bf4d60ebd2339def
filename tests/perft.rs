use tsubame::movegen::*;
use tsubame::position::*;
use tsubame::stack_size::STACK_SIZE;

fn run_on_large_stack(f: impl FnOnce() + Send + 'static) {
    std::thread::Builder::new()
        .stack_size(STACK_SIZE)
        .spawn(f)
        .unwrap()
        .join()
        .unwrap();
}

#[test]
fn test_perft_startpos() {
    run_on_large_stack(|| {
        tsubame::init();
        let mut pos = Position::new();
        let expected = [1, 30, 900, 25470, 719_731];
        for (depth, &nodes) in expected.iter().enumerate() {
            assert_eq!(perft(&mut pos, depth as i32), nodes, "depth {}", depth);
        }
        // perft leaves the position as it was.
        assert_eq!(pos.key(), Position::new().key());
    });
}

#[test]
fn test_perft_divide_sums_up() {
    run_on_large_stack(|| {
        let mut pos = Position::new_from_sfen("l6nl/5+P1gk/2np1S3/p1p4Pp/3P2Sp1/1PPb2P1P/P5GS1/R8/LN4bKL w RGgsn5p 1").unwrap();
        let divided = perft_divide(&mut pos, 2);
        let total: u64 = divided.iter().map(|(_, n)| n).sum();
        assert_eq!(total, perft(&mut pos, 2));
        let mut mlist = MoveList::new();
        mlist.generate::<LegalType>(&pos, 0);
        assert_eq!(divided.len(), mlist.len());
    });
}

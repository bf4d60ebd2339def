use crate::book::*;
use crate::movegen::*;
use crate::movepick::*;
use crate::movetypes::*;
use crate::position::*;
use crate::search::*;
use crate::timeman::*;
use crate::tt::*;
use crate::types::*;
use crate::usioption::*;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct WorkerState {
    search_requested: bool,
    searching: bool,
    exit: bool,
}

/// An OS thread idling until asked to run its body once.
pub struct Worker {
    state: Arc<(Mutex<WorkerState>, Condvar)>,
    stop: Arc<AtomicBool>,
    handle: Option<std::thread::JoinHandle<()>>,
}

impl Worker {
    pub fn new(id: usize, stop: Arc<AtomicBool>, mut body: Box<dyn FnMut() + Send>) -> std::io::Result<Worker> {
        let state = Arc::new((
            Mutex::new(WorkerState {
                search_requested: false,
                searching: false,
                exit: false,
            }),
            Condvar::new(),
        ));
        let state_cloned = state.clone();
        let handle = std::thread::Builder::new()
            .name(format!("worker-{}", id))
            .stack_size(crate::stack_size::STACK_SIZE)
            .spawn(move || {
                let (mutex, condvar) = &*state_cloned;
                loop {
                    {
                        let mut st = lock(mutex);
                        while !st.search_requested && !st.exit {
                            st = condvar.wait(st).unwrap_or_else(PoisonError::into_inner);
                        }
                        if st.exit {
                            return;
                        }
                        st.search_requested = false;
                    }
                    body();
                    let mut st = lock(mutex);
                    st.searching = false;
                    condvar.notify_all();
                }
            })?;
        Ok(Worker {
            state,
            stop,
            handle: Some(handle),
        })
    }
    pub fn start_searching(&self) {
        let (mutex, condvar) = &*self.state;
        let mut st = lock(mutex);
        st.searching = true;
        st.search_requested = true;
        condvar.notify_all();
    }
    pub fn abort_search(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }
    pub fn wait_search_finished(&self) {
        let (mutex, condvar) = &*self.state;
        let mut st = lock(mutex);
        while st.searching {
            st = condvar.wait(st).unwrap_or_else(PoisonError::into_inner);
        }
    }
    pub fn is_searching(&self) -> bool {
        lock(&self.state.0).searching
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.wait_search_finished();
        {
            let (mutex, condvar) = &*self.state;
            lock(mutex).exit = true;
            condvar.notify_all();
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("a worker thread panicked");
            }
        }
    }
}

/// Everything one worker needs for one search.
struct SearchJob {
    pos: Position,
    limits: LimitsType,
    options: SearchOptions,
    root_moves: Vec<Move>,
    tt: Arc<TranspositionTable>,
    clear_history: bool,
}

/// The final answer of a search: `None` as best move means resign.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchOutcome {
    pub best_move: Option<Move>,
    pub result: Option<IterationResult>,
}

impl SearchOutcome {
    pub fn to_usi_string(&self, with_ponder: bool) -> String {
        match self.best_move {
            None => "bestmove resign".to_string(),
            Some(m) => {
                let ponder = self
                    .result
                    .as_ref()
                    .filter(|result| with_ponder && result.best_move == m && result.pv.len() >= 2)
                    .map(|result| format!(" ponder {}", result.pv[1].to_usi_string()))
                    .unwrap_or_default();
                format!("bestmove {}{}", m.to_usi_string(), ponder)
            }
        }
    }
}

/// Each worker adds 2^depth to the best move of its last complete iteration.
/// The first root move with the largest total wins.
pub fn vote(root_moves: &[Move], results: &[Option<IterationResult>]) -> Option<Move> {
    let mut best: Option<(Move, u128)> = None;
    for &m in root_moves {
        let total: u128 = results
            .iter()
            .flatten()
            .filter(|result| result.best_move == m)
            .map(|result| 1u128 << result.depth.0.clamp(0, 127))
            .sum();
        if best.map_or(true, |(_, best_total)| total > best_total) {
            best = Some((m, total));
        }
    }
    best.map(|(m, _)| m)
}

struct PoolShared {
    jobs: Vec<Mutex<Option<SearchJob>>>,
    reports: Vec<Arc<Mutex<Option<IterationResult>>>>,
    nodes: Vec<Arc<AtomicU64>>,
    timeman: Mutex<TimeManagement>,
    outcome: Mutex<Option<SearchOutcome>>,
    hide_output: AtomicBool,
    usi_ponder: AtomicBool,
    ponder: Arc<AtomicBool>,
    stop_requested: AtomicBool,
}

fn run_search_job(
    id: usize,
    job: SearchJob,
    history: &mut ButterflyHistory,
    stop: &AtomicBool,
    shared: &PoolShared,
    control: Option<TimeControl>,
) -> Option<IterationResult> {
    if job.clear_history {
        history.fill(0);
    }
    let tt = job.tt;
    let pos = Position::new_from_position(&job.pos, shared.nodes[id].clone());
    let mut worker = SearchWorker::new(pos, &tt, history, stop, job.limits, id);
    worker.set_options(job.options);
    worker.set_root_moves(job.root_moves);
    worker.set_report(shared.reports[id].clone());
    if let Some(control) = control {
        worker.set_time_control(control);
    }
    worker.iterative_deepening()
}

fn helper_body(id: usize, stop: Arc<AtomicBool>, shared: Arc<PoolShared>) -> Box<dyn FnMut() + Send> {
    let mut history = ButterflyHistory::new();
    Box::new(move || {
        if let Some(job) = lock(&shared.jobs[id]).take() {
            run_search_job(id, job, &mut history, &stop, &shared, None);
        }
    })
}

fn main_body(stop: Arc<AtomicBool>, shared: Arc<PoolShared>, helpers: Arc<Vec<Worker>>) -> Box<dyn FnMut() + Send> {
    let mut history = ButterflyHistory::new();
    Box::new(move || {
        let job = match lock(&shared.jobs[0]).take() {
            Some(job) => job,
            None => return,
        };
        let infinite = job.limits.infinite;
        let root_moves = job.root_moves.clone();
        let print_info = !shared.hide_output.load(Ordering::Relaxed);
        let outcome = if root_moves.is_empty() {
            shared.jobs.iter().for_each(|job| *lock(job) = None);
            SearchOutcome {
                best_move: None,
                result: None,
            }
        } else {
            helpers.iter().for_each(|helper| helper.start_searching());
            let mut control = TimeControl::new(lock(&shared.timeman).clone(), shared.nodes.clone(), print_info);
            control.set_ponder(shared.ponder.clone());
            let result = run_search_job(0, job, &mut history, &stop, &shared, Some(control));
            stop.store(true, Ordering::Relaxed);
            helpers.iter().for_each(|helper| helper.wait_search_finished());
            let mut results: Vec<Option<IterationResult>> = shared.reports.iter().map(|report| lock(report).clone()).collect();
            results[0] = result;
            let best_move = vote(&root_moves, &results).or_else(|| root_moves.first().copied());
            let result = results
                .iter()
                .flatten()
                .filter(|result| Some(result.best_move) == best_move)
                .max_by_key(|result| result.depth)
                .cloned();
            SearchOutcome { best_move, result }
        };
        // An infinite search answers only after "stop", a pondering one after "stop" or "ponderhit".
        while (infinite || shared.ponder.load(Ordering::Relaxed)) && !shared.stop_requested.load(Ordering::Relaxed) {
            std::thread::sleep(std::time::Duration::from_millis(1));
        }
        if print_info {
            println!("{}", outcome.to_usi_string(shared.usi_ponder.load(Ordering::Relaxed)));
        }
        *lock(&shared.outcome) = Some(outcome);
    })
}

/// Lazy SMP: the main worker runs iterative deepening, helpers search the
/// same root independently and share only the transposition table.
pub struct ThreadPool {
    main: Option<Worker>,
    helpers: Arc<Vec<Worker>>,
    shared: Arc<PoolShared>,
    stop: Arc<AtomicBool>,
    tt: Arc<TranspositionTable>,
    clear_history: bool,
    pub book: Option<Book>,
}

impl ThreadPool {
    pub fn new(thread_num: usize, hash_mega_byte_size: usize) -> std::io::Result<ThreadPool> {
        let mut thread_pool = ThreadPool {
            main: None,
            helpers: Arc::new(Vec::new()),
            shared: ThreadPool::new_shared(1),
            stop: Arc::new(AtomicBool::new(false)),
            tt: Arc::new(TranspositionTable::new(hash_mega_byte_size)),
            clear_history: false,
            book: None,
        };
        thread_pool.set_threads(thread_num)?;
        Ok(thread_pool)
    }
    fn new_shared(thread_num: usize) -> Arc<PoolShared> {
        Arc::new(PoolShared {
            jobs: (0..thread_num).map(|_| Mutex::new(None)).collect(),
            reports: (0..thread_num).map(|_| Arc::new(Mutex::new(None))).collect(),
            nodes: (0..thread_num).map(|_| Arc::new(AtomicU64::new(0))).collect(),
            timeman: Mutex::new(TimeManagement::new()),
            outcome: Mutex::new(None),
            hide_output: AtomicBool::new(false),
            usi_ponder: AtomicBool::new(false),
            ponder: Arc::new(AtomicBool::new(false)),
            stop_requested: AtomicBool::new(false),
        })
    }
    pub fn thread_num(&self) -> usize {
        self.helpers.len() + 1
    }
    /// Replaces every worker. Histories start over.
    pub fn set_threads(&mut self, requested: usize) -> std::io::Result<()> {
        self.wait_for_search_finished();
        let hide_output = self.shared.hide_output.load(Ordering::Relaxed);
        self.main = None;
        self.helpers = Arc::new(Vec::new());
        let requested = requested.max(1);
        self.shared = ThreadPool::new_shared(requested);
        self.shared.hide_output.store(hide_output, Ordering::Relaxed);
        let helpers = (1..requested)
            .map(|id| Worker::new(id, self.stop.clone(), helper_body(id, self.stop.clone(), self.shared.clone())))
            .collect::<std::io::Result<Vec<_>>>()?;
        self.helpers = Arc::new(helpers);
        self.main = Some(Worker::new(
            0,
            self.stop.clone(),
            main_body(self.stop.clone(), self.shared.clone(), self.helpers.clone()),
        )?);
        log::info!("threads: {}", requested);
        Ok(())
    }
    pub fn resize_tt(&mut self, mega_byte_size: usize) {
        self.wait_for_search_finished();
        match Arc::get_mut(&mut self.tt) {
            Some(tt) => tt.resize(mega_byte_size),
            None => self.tt = Arc::new(TranspositionTable::new(mega_byte_size)),
        }
    }
    pub fn clear_tt(&mut self) {
        self.wait_for_search_finished();
        match Arc::get_mut(&mut self.tt) {
            Some(tt) => tt.clear(),
            None => self.tt = Arc::new(TranspositionTable::new(self.tt.mega_byte_size())),
        }
    }
    pub fn tt(&self) -> &TranspositionTable {
        &self.tt
    }
    /// Forgets the previous game: histories of every worker and the hash table.
    pub fn clear(&mut self) {
        self.clear_tt();
        self.clear_history = true;
        *lock(&self.shared.outcome) = None;
    }
    pub fn set_hide_output(&self, hide_output: bool) {
        self.shared.hide_output.store(hide_output, Ordering::Relaxed);
    }
    pub fn stop(&self) {
        self.shared.stop_requested.store(true, Ordering::Relaxed);
        if let Some(main) = &self.main {
            main.abort_search();
        }
    }
    /// The opponent played the expected move: the search goes on under the normal budget.
    pub fn ponderhit(&self) {
        self.shared.ponder.store(false, Ordering::Relaxed);
    }
    pub fn is_searching(&self) -> bool {
        self.main.as_ref().map_or(false, |main| main.is_searching())
    }
    pub fn wait_for_search_finished(&self) {
        if let Some(main) = &self.main {
            main.wait_search_finished();
        }
    }
    pub fn last_outcome(&self) -> Option<SearchOutcome> {
        lock(&self.shared.outcome).clone()
    }
    pub fn nodes_searched(&self) -> u64 {
        self.shared.nodes.iter().map(|nodes| nodes.load(Ordering::Relaxed)).sum()
    }
    /// Starts searching `pos` and returns at once. "bestmove" is printed by the main worker.
    pub fn start_thinking(&mut self, pos: &Position, limits: LimitsType, usi_options: &UsiOptions) {
        self.wait_for_search_finished();
        let main = match &self.main {
            Some(main) => main,
            None => return,
        };
        self.stop.store(false, Ordering::Relaxed);
        self.shared.stop_requested.store(false, Ordering::Relaxed);
        let mut limits = limits;
        if limits.start_time.is_none() {
            limits.start_time = Some(std::time::Instant::now());
        }
        lock(&self.shared.timeman).init(usi_options, &limits, pos.side_to_move(), pos.game_ply());
        self.shared
            .usi_ponder
            .store(usi_options.get_bool(UsiOptions::USI_PONDER), Ordering::Relaxed);
        self.shared.ponder.store(limits.ponder, Ordering::Relaxed);
        *lock(&self.shared.outcome) = None;
        self.tt.new_search();

        let book_move = if usi_options.get_bool(UsiOptions::BOOK_ENABLE) {
            self.book.as_ref().and_then(|book| book.probe(pos, &mut rand::thread_rng()))
        } else {
            None
        };
        let root_moves = match book_move {
            Some(m) => {
                log::info!("book move: {}", m.to_usi_string());
                vec![m]
            }
            None => {
                let mut mlist = MoveList::new();
                mlist.generate::<LegalType>(pos, 0);
                mlist.slice(0).iter().map(|x| x.mv).collect()
            }
        };
        let options = SearchOptions {
            null_move: usi_options.get_bool(UsiOptions::NULL_MOVE),
            ..SearchOptions::default()
        };
        log::debug!("start thinking on {} with {:?}", pos.to_sfen(), limits);
        for (id, job) in self.shared.jobs.iter().enumerate() {
            self.shared.nodes[id].store(0, Ordering::Relaxed);
            *lock(&self.shared.reports[id]) = None;
            *lock(job) = Some(SearchJob {
                pos: pos.clone(),
                limits: limits.clone(),
                options,
                root_moves: root_moves.clone(),
                tt: self.tt.clone(),
                clear_history: self.clear_history,
            });
        }
        self.clear_history = false;
        main.start_searching();
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.stop();
        self.wait_for_search_finished();
    }
}

#[test]
fn test_worker_runs_body_once_per_start() {
    let counter = Arc::new(AtomicU64::new(0));
    let counter_cloned = counter.clone();
    let stop = Arc::new(AtomicBool::new(false));
    let worker = Worker::new(
        0,
        stop.clone(),
        Box::new(move || {
            counter_cloned.fetch_add(1, Ordering::Relaxed);
        }),
    )
    .unwrap();
    for i in 1..=3 {
        worker.start_searching();
        worker.wait_search_finished();
        assert!(!worker.is_searching());
        assert_eq!(counter.load(Ordering::Relaxed), i);
    }
    worker.abort_search();
    assert!(stop.load(Ordering::Relaxed));
}

#[test]
fn test_worker_abort() {
    let stop = Arc::new(AtomicBool::new(false));
    let stop_cloned = stop.clone();
    let worker = Worker::new(
        0,
        stop.clone(),
        Box::new(move || {
            while !stop_cloned.load(Ordering::Relaxed) {
                std::thread::sleep(std::time::Duration::from_millis(1));
            }
        }),
    )
    .unwrap();
    worker.start_searching();
    assert!(worker.is_searching());
    worker.abort_search();
    worker.wait_search_finished();
    assert!(!worker.is_searching());
}

#[test]
fn test_vote() {
    let a = Move::new_unpromote(Square::SQ77, Square::SQ76);
    let b = Move::new_unpromote(Square::SQ27, Square::SQ26);
    let c = Move::new_unpromote(Square::SQ59, Square::SQ58);
    let result = |m: Move, depth: i32| {
        Some(IterationResult {
            best_move: m,
            score: Value(0),
            depth: Depth(depth),
            pv: vec![m],
            nodes: 0,
        })
    };
    let root_moves = [a, b, c];
    // 2^5 + 2^5 < 2^7
    assert_eq!(vote(&root_moves, &[result(a, 5), result(a, 5), result(b, 7)]), Some(b));
    // A tie goes to the first root move.
    assert_eq!(vote(&root_moves, &[result(c, 6), result(b, 6)]), Some(b));
    // A best move outside the root moves gets no vote.
    let illegal = Move::new_unpromote(Square::SQ11, Square::SQ12);
    assert_eq!(vote(&root_moves, &[result(illegal, 20), result(c, 1), None]), Some(c));
    assert_eq!(vote(&[], &[result(a, 3)]), None);
}

#[test]
fn test_start_thinking() {
    std::thread::Builder::new()
        .stack_size(crate::stack_size::STACK_SIZE)
        .spawn(|| {
            let mut thread_pool = ThreadPool::new(3, 4).unwrap();
            thread_pool.set_hide_output(true);
            let usi_options = UsiOptions::new();
            let pos = Position::new();
            let mut limits = LimitsType::new();
            limits.depth = Some(4);
            thread_pool.start_thinking(&pos, limits, &usi_options);
            thread_pool.wait_for_search_finished();
            let outcome = thread_pool.last_outcome().unwrap();
            let best_move = outcome.best_move.unwrap();
            assert!(pos.pseudo_legal(best_move) && pos.is_legal(best_move));
            assert!(thread_pool.nodes_searched() > 0);
            // The root entry is left in the shared table.
            let (found, data, _) = thread_pool.tt().probe(pos.key());
            assert!(found);
            assert!(data.mv.is_some());
            assert!(outcome.to_usi_string(false).starts_with("bestmove "));
        })
        .unwrap()
        .join()
        .unwrap();
}

#[test]
fn test_start_thinking_without_legal_moves() {
    std::thread::Builder::new()
        .stack_size(crate::stack_size::STACK_SIZE)
        .spawn(|| {
            let mut thread_pool = ThreadPool::new(2, 1).unwrap();
            thread_pool.set_hide_output(true);
            // Black is mated.
            let pos = Position::new_from_sfen("4k4/9/9/9/9/9/4p4/4g4/4K4 b 2R2B3G4S4N4L17P 1").unwrap();
            thread_pool.start_thinking(&pos, LimitsType::new(), &UsiOptions::new());
            thread_pool.wait_for_search_finished();
            let outcome = thread_pool.last_outcome().unwrap();
            assert_eq!(outcome.best_move, None);
            assert_eq!(outcome.to_usi_string(false), "bestmove resign");
        })
        .unwrap()
        .join()
        .unwrap();
}

#[test]
fn test_stop_infinite_search() {
    std::thread::Builder::new()
        .stack_size(crate::stack_size::STACK_SIZE)
        .spawn(|| {
            let mut thread_pool = ThreadPool::new(2, 1).unwrap();
            thread_pool.set_hide_output(true);
            let mut limits = LimitsType::new();
            limits.infinite = true;
            thread_pool.start_thinking(&Position::new(), limits, &UsiOptions::new());
            std::thread::sleep(std::time::Duration::from_millis(50));
            assert!(thread_pool.is_searching());
            thread_pool.stop();
            thread_pool.wait_for_search_finished();
            assert!(thread_pool.last_outcome().unwrap().best_move.is_some());
        })
        .unwrap()
        .join()
        .unwrap();
}

#[test]
fn test_finished_infinite_search_waits_for_stop() {
    std::thread::Builder::new()
        .stack_size(crate::stack_size::STACK_SIZE)
        .spawn(|| {
            let mut thread_pool = ThreadPool::new(2, 1).unwrap();
            thread_pool.set_hide_output(true);
            let usi_options = UsiOptions::new();
            for ponder in [false, true] {
                let mut limits = LimitsType::new();
                limits.infinite = !ponder;
                limits.ponder = ponder;
                limits.depth = Some(1);
                thread_pool.start_thinking(&Position::new(), limits, &usi_options);
                // Depth 1 is done long before this, yet no answer is given.
                std::thread::sleep(std::time::Duration::from_millis(200));
                assert!(thread_pool.is_searching());
                assert!(thread_pool.last_outcome().is_none());
                thread_pool.stop();
                thread_pool.wait_for_search_finished();
                assert!(thread_pool.last_outcome().unwrap().best_move.is_some());
            }
        })
        .unwrap()
        .join()
        .unwrap();
}

#[test]
fn test_ponder_and_ponderhit() {
    std::thread::Builder::new()
        .stack_size(crate::stack_size::STACK_SIZE)
        .spawn(|| {
            let mut thread_pool = ThreadPool::new(2, 1).unwrap();
            thread_pool.set_hide_output(true);
            let mut limits = LimitsType::new();
            limits.ponder = true;
            limits.movetime = Some(std::time::Duration::from_millis(10));
            thread_pool.start_thinking(&Position::new(), limits, &UsiOptions::new());
            // The clock does not count while pondering.
            std::thread::sleep(std::time::Duration::from_millis(100));
            assert!(thread_pool.is_searching());
            assert!(thread_pool.last_outcome().is_none());
            // The budget is already spent, so the search ends by itself.
            thread_pool.ponderhit();
            thread_pool.wait_for_search_finished();
            let outcome = thread_pool.last_outcome().unwrap();
            let best_move = outcome.best_move.unwrap();
            assert!(Position::new().is_legal(best_move));
            let bestmove = format!("bestmove {}", best_move.to_usi_string());
            match outcome.result.as_ref().and_then(|result| result.pv.get(1)) {
                Some(reply) => assert_eq!(
                    outcome.to_usi_string(true),
                    format!("{} ponder {}", bestmove, reply.to_usi_string())
                ),
                None => assert_eq!(outcome.to_usi_string(true), bestmove),
            }
            assert_eq!(outcome.to_usi_string(false), bestmove);
        })
        .unwrap()
        .join()
        .unwrap();
}

use crate::search::*;
use crate::types::*;
use crate::usioption::*;

const DEFAULT_MOVES_TO_GO: u64 = 40;
const MAXIMUM_SCALE: u64 = 5;

#[derive(Clone, Debug)]
pub struct TimeManagement {
    start_time: Option<std::time::Instant>,
    optimum_time_milli: std::time::Duration,
    maximum_time_milli: std::time::Duration,
}

impl TimeManagement {
    pub fn new() -> TimeManagement {
        TimeManagement {
            start_time: None,
            optimum_time_milli: std::time::Duration::from_millis(0),
            maximum_time_milli: std::time::Duration::from_millis(0),
        }
    }
    /// With a fixed time per move both budgets are that time. Otherwise the
    /// remaining time is spread over `movestogo` moves (40 by default).
    pub fn init(&mut self, usi_options: &UsiOptions, limits: &LimitsType, us: Color, ply: i32) {
        self.start_time = limits.start_time;
        let minimum = usi_options.get_i64(UsiOptions::MINIMUM_THINKING_TIME).max(0) as u64;
        let (optimum, maximum) = match limits.movetime {
            Some(movetime) => {
                let movetime = movetime.as_millis() as u64;
                (movetime, movetime)
            }
            None => {
                let slow_mover = usi_options.get_i64(UsiOptions::SLOW_MOVER).max(1) as u64;
                let moves_to_go = limits.movestogo.map_or(DEFAULT_MOVES_TO_GO, |n| u64::from(n.max(1)));
                let remaining = limits.time[us.0 as usize].as_millis() as u64;
                let time_left = remaining + limits.inc[us.0 as usize].as_millis() as u64;
                let optimum = time_left / moves_to_go * slow_mover / 100;
                let maximum = std::cmp::min(MAXIMUM_SCALE * optimum, remaining * 8 / 10);
                (std::cmp::min(optimum, maximum), maximum)
            }
        };
        self.optimum_time_milli = std::time::Duration::from_millis(optimum.max(minimum));
        self.maximum_time_milli = std::time::Duration::from_millis(maximum.max(minimum));
        log::debug!(
            "time management at ply {}: optimum {} ms, maximum {} ms",
            ply,
            self.optimum_millis(),
            self.maximum_millis()
        );
    }
    pub fn optimum_millis(&self) -> u64 {
        self.optimum_time_milli.as_millis() as u64
    }
    pub fn maximum_millis(&self) -> u64 {
        self.maximum_time_milli.as_millis() as u64
    }
    pub fn elapsed(&self) -> u64 {
        self.start_time.map_or(0, |start_time| start_time.elapsed().as_millis() as u64)
    }
}

#[cfg(test)]
fn limits_with_clock(black_millis: u64, black_inc: u64) -> LimitsType {
    let mut limits = LimitsType::new();
    limits.time[Color::BLACK.0 as usize] = std::time::Duration::from_millis(black_millis);
    limits.inc[Color::BLACK.0 as usize] = std::time::Duration::from_millis(black_inc);
    limits.start_time = Some(std::time::Instant::now());
    limits
}

#[test]
fn test_movetime() {
    let mut limits = LimitsType::new();
    limits.movetime = Some(std::time::Duration::from_millis(1500));
    let mut timeman = TimeManagement::new();
    timeman.init(&UsiOptions::new(), &limits, Color::BLACK, 1);
    assert_eq!(timeman.optimum_millis(), 1500);
    assert_eq!(timeman.maximum_millis(), 1500);
}

#[test]
fn test_sudden_death() {
    let mut timeman = TimeManagement::new();
    timeman.init(&UsiOptions::new(), &limits_with_clock(60_000, 0), Color::BLACK, 1);
    assert_eq!(timeman.optimum_millis(), 1500);
    assert_eq!(timeman.maximum_millis(), 7500);

    // Little time left. The maximum is capped by the remaining time.
    timeman.init(&UsiOptions::new(), &limits_with_clock(1000, 2000), Color::BLACK, 1);
    assert_eq!(timeman.optimum_millis(), 75);
    assert_eq!(timeman.maximum_millis(), 375);
    timeman.init(&UsiOptions::new(), &limits_with_clock(100, 8000), Color::BLACK, 1);
    assert_eq!(timeman.maximum_millis(), 80);
    assert_eq!(timeman.optimum_millis(), 80);
}

#[test]
fn test_minimum_thinking_time_and_slow_mover() {
    let mut timeman = TimeManagement::new();
    timeman.init(&UsiOptions::new(), &limits_with_clock(0, 0), Color::BLACK, 1);
    assert_eq!(timeman.optimum_millis(), 20);
    assert_eq!(timeman.maximum_millis(), 20);

    let mut usi_options = UsiOptions::new();
    usi_options.set_value(UsiOptions::SLOW_MOVER, "200").unwrap();
    timeman.init(&usi_options, &limits_with_clock(60_000, 0), Color::BLACK, 1);
    assert_eq!(timeman.optimum_millis(), 3000);
}

use crate::position::*;
use crate::thread::*;
use crate::usi::UsiError;

#[derive(Clone, Debug)]
enum UsiOptionValue {
    StringOption {
        default: String,
        current: String,
    },
    Spin {
        default: i64,
        current: i64,
        min: i64,
        max: i64,
    },
    Check {
        default: bool,
        current: bool,
    },
    Button,
}

impl UsiOptionValue {
    fn string(default: &str) -> UsiOptionValue {
        UsiOptionValue::StringOption {
            default: default.to_string(),
            current: default.to_string(),
        }
    }
    fn spin(default: i64, min: i64, max: i64) -> UsiOptionValue {
        UsiOptionValue::Spin {
            default,
            current: default,
            min,
            max,
        }
    }
    fn check(default: bool) -> UsiOptionValue {
        UsiOptionValue::Check {
            default,
            current: default,
        }
    }
}

#[derive(Clone, Debug)]
pub struct UsiOptions {
    v: std::collections::HashMap<&'static str, UsiOptionValue>,
}

impl UsiOptions {
    pub const BOOK_ENABLE: &'static str = "Book_Enable";
    pub const BOOK_FILE: &'static str = "Book_File";
    pub const BYOYOMI_MARGIN: &'static str = "Byoyomi_Margin";
    pub const CLEAR_HASH: &'static str = "Clear_Hash";
    pub const MINIMUM_THINKING_TIME: &'static str = "Minimum_Thinking_Time";
    pub const NULL_MOVE: &'static str = "Null_Move";
    pub const REPETITION_COUNT: &'static str = "Repetition_Count";
    pub const SLOW_MOVER: &'static str = "Slow_Mover";
    pub const THREADS: &'static str = "Threads";
    pub const TIME_MARGIN: &'static str = "Time_Margin";
    pub const USI_HASH: &'static str = "USI_Hash";
    pub const USI_PONDER: &'static str = "USI_Ponder";

    pub fn new() -> UsiOptions {
        let mut options = std::collections::HashMap::new();

        // The following are all options.
        options.insert(UsiOptions::BOOK_ENABLE, UsiOptionValue::check(true));
        options.insert(UsiOptions::BOOK_FILE, UsiOptionValue::string("book/book.json"));
        options.insert(UsiOptions::BYOYOMI_MARGIN, UsiOptionValue::spin(500, 0, i64::from(i32::MAX)));
        options.insert(UsiOptions::CLEAR_HASH, UsiOptionValue::Button);
        options.insert(UsiOptions::MINIMUM_THINKING_TIME, UsiOptionValue::spin(20, 0, 5000));
        options.insert(UsiOptions::NULL_MOVE, UsiOptionValue::check(true));
        options.insert(
            UsiOptions::REPETITION_COUNT,
            UsiOptionValue::spin(i64::from(RepetitionTable::DEFAULT_THRESHOLD), 2, 16),
        );
        options.insert(UsiOptions::SLOW_MOVER, UsiOptionValue::spin(100, 10, 1000));
        options.insert(UsiOptions::THREADS, UsiOptionValue::spin(1, 1, 256));
        options.insert(UsiOptions::TIME_MARGIN, UsiOptionValue::spin(500, 0, i64::from(i32::MAX)));
        options.insert(UsiOptions::USI_HASH, UsiOptionValue::spin(64, 1, 1024 * 1024));
        options.insert(UsiOptions::USI_PONDER, UsiOptionValue::check(false));

        UsiOptions { v: options }
    }
    fn key_of(&self, name: &str) -> Result<&'static str, UsiError> {
        self.v
            .keys()
            .find(|key| **key == name)
            .copied()
            .ok_or_else(|| UsiError::UnknownOption(name.to_string()))
    }
    pub fn push_button(&self, name: &str, thread_pool: &mut ThreadPool) -> Result<(), UsiError> {
        let key = self.key_of(name)?;
        match &self.v[key] {
            UsiOptionValue::Button => {
                if key == UsiOptions::CLEAR_HASH {
                    thread_pool.clear_tt();
                }
                Ok(())
            }
            _ => Err(UsiError::NotButton(key.to_string())),
        }
    }
    /// Stores `value` without side effects. Spin values are clamped to their range.
    pub fn set_value(&mut self, name: &str, value: &str) -> Result<(), UsiError> {
        let key = self.key_of(name)?;
        let invalid = || UsiError::InvalidOptionValue {
            name: key.to_string(),
            value: value.to_string(),
        };
        let new_value = match &self.v[key] {
            UsiOptionValue::StringOption { default, .. } => UsiOptionValue::StringOption {
                default: default.clone(),
                current: value.to_string(),
            },
            &UsiOptionValue::Spin { default, min, max, .. } => {
                let n = value.parse::<i64>().map_err(|_| invalid())?;
                UsiOptionValue::Spin {
                    default,
                    current: n.clamp(min, max),
                    min,
                    max,
                }
            }
            // "true" or "false" is ok. You can only use lowercase.
            &UsiOptionValue::Check { default, .. } => UsiOptionValue::Check {
                default,
                current: value.parse::<bool>().map_err(|_| invalid())?,
            },
            UsiOptionValue::Button => return Err(invalid()),
        };
        self.v.insert(key, new_value);
        Ok(())
    }
    /// Stores `value` and applies what the option controls.
    pub fn set(&mut self, name: &str, value: &str, thread_pool: &mut ThreadPool, pos: &mut Position) -> Result<(), UsiError> {
        self.set_value(name, value)?;
        match self.key_of(name)? {
            UsiOptions::THREADS => thread_pool.set_threads(self.get_i64(UsiOptions::THREADS) as usize)?,
            UsiOptions::USI_HASH => thread_pool.resize_tt(self.get_i64(UsiOptions::USI_HASH) as usize),
            UsiOptions::REPETITION_COUNT => {
                pos.set_repetition_threshold(self.get_i64(UsiOptions::REPETITION_COUNT) as u32);
            }
            UsiOptions::BOOK_FILE | UsiOptions::BOOK_ENABLE => thread_pool.book = None,
            _ => {}
        }
        Ok(())
    }
    pub fn to_usi_string(&self) -> String {
        let mut s = self
            .v
            .iter()
            .map(|(key, opt)| match opt {
                UsiOptionValue::StringOption { default, .. } => {
                    format!("option name {} type string default {}", key, default)
                }
                UsiOptionValue::Spin { default, min, max, .. } => {
                    format!("option name {} type spin default {} min {} max {}", key, default, min, max)
                }
                UsiOptionValue::Check { default, .. } => format!("option name {} type check default {}", key, default),
                UsiOptionValue::Button => format!("option name {} type button", key),
            })
            .collect::<Vec<_>>();
        s.sort_unstable();
        s.join("\n") // The last line has no "\n".
    }
    pub fn get_i64(&self, key: &str) -> i64 {
        match self.v.get(key) {
            Some(UsiOptionValue::Spin { current, .. }) => *current,
            _ => panic!("Error: illegal option name: {}", key),
        }
    }
    pub fn get_string(&self, key: &str) -> String {
        match self.v.get(key) {
            Some(UsiOptionValue::StringOption { current, .. }) => current.clone(),
            _ => panic!("Error: illegal option name: {}", key),
        }
    }
    pub fn get_bool(&self, key: &str) -> bool {
        match self.v.get(key) {
            Some(UsiOptionValue::Check { current, .. }) => *current,
            _ => panic!("Error: illegal option name: {}", key),
        }
    }
}

#[test]
fn test_usi_options_defaults() {
    let options = UsiOptions::new();
    assert_eq!(options.get_i64(UsiOptions::USI_HASH), 64);
    assert_eq!(options.get_i64(UsiOptions::THREADS), 1);
    assert_eq!(options.get_i64(UsiOptions::REPETITION_COUNT), 4);
    assert_eq!(options.get_i64(UsiOptions::SLOW_MOVER), 100);
    assert_eq!(options.get_string(UsiOptions::BOOK_FILE), "book/book.json");
    assert!(options.get_bool(UsiOptions::BOOK_ENABLE));
    assert!(options.get_bool(UsiOptions::NULL_MOVE));
    assert!(!options.get_bool(UsiOptions::USI_PONDER));
}

#[test]
fn test_usi_options_to_usi_string_is_sorted() {
    let s = UsiOptions::new().to_usi_string();
    let lines: Vec<&str> = s.lines().collect();
    assert_eq!(lines.len(), 12);
    let mut sorted = lines.clone();
    sorted.sort_unstable();
    assert_eq!(lines, sorted);
    assert!(lines.contains(&"option name Threads type spin default 1 min 1 max 256"));
    assert!(lines.contains(&"option name Clear_Hash type button"));
    assert!(lines.contains(&"option name Book_File type string default book/book.json"));
}

#[test]
fn test_usi_options_set_value() {
    let mut options = UsiOptions::new();
    options.set_value(UsiOptions::THREADS, "1000").unwrap();
    assert_eq!(options.get_i64(UsiOptions::THREADS), 256);
    options.set_value(UsiOptions::REPETITION_COUNT, "0").unwrap();
    assert_eq!(options.get_i64(UsiOptions::REPETITION_COUNT), 2);
    options.set_value(UsiOptions::NULL_MOVE, "false").unwrap();
    assert!(!options.get_bool(UsiOptions::NULL_MOVE));
    options.set_value(UsiOptions::BOOK_FILE, "other.json").unwrap();
    assert_eq!(options.get_string(UsiOptions::BOOK_FILE), "other.json");
    assert!(options.set_value(UsiOptions::NULL_MOVE, "False").is_err());
    assert!(options.set_value(UsiOptions::USI_HASH, "many").is_err());
    assert!(matches!(options.set_value("No_Such_Option", "1"), Err(UsiError::UnknownOption(_))));
    // A failed set keeps the old value.
    assert_eq!(options.get_i64(UsiOptions::USI_HASH), 64);
}

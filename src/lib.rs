#![cfg_attr(
    feature = "cargo-clippy",
    allow(
        clippy::cognitive_complexity,
        clippy::too_many_arguments,
        clippy::new_without_default
    )
)]
#[macro_use]
extern crate custom_derive;
#[macro_use]
extern crate derive_more;
#[macro_use]
extern crate enum_derive;
pub mod bitboard;
pub mod book;
pub mod evaluate;
pub mod hand;
pub mod movegen;
pub mod movepick;
pub mod movetypes;
pub mod piecevalue;
pub mod position;
pub mod search;
pub mod sfen;
pub mod stack_size;
pub mod thread;
pub mod timeman;
pub mod tt;
pub mod types;
pub mod usi;
pub mod usioption;

/// Builds the attack, line and zobrist tables. Calling it is optional, but
/// doing it at startup keeps the first "position" command fast.
pub fn init() {
    once_cell::sync::Lazy::force(&bitboard::ATTACK_TABLE);
    once_cell::sync::Lazy::force(&bitboard::BETWEEN);
    once_cell::sync::Lazy::force(&bitboard::LINE);
    once_cell::sync::Lazy::force(&position::ZOBRIST);
}

use crate::types::*;
use thiserror::Error;

pub const START_SFEN: &str = "lnsgkgsnl/1r5b1/ppppppppp/9/9/9/PPPPPPPPP/1B5R1/LNSGKGSNL b - 1";

#[rustfmt::skip]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SfenError {
    #[error("invalid number of sections. found {sections} sections.")]
    InvalidNumberOfSections { sections: usize },
    #[error("invalid number of files. found {files} files.")]
    InvalidNumberOfFiles { files: usize },
    #[error("invalid number of ranks. found {ranks} ranks.")]
    InvalidNumberOfRanks { ranks: usize },
    #[error("invalid number of empty squares. found {empty_squares} empty squares.")]
    InvalidNumberOfEmptySquares { empty_squares: i64 },
    #[error(r##"invalid piece characters. found "{token}"."##)]
    InvalidPieceCharacters { token: String },
    #[error(r##"invalid hand piece characters. found "{token}"."##)]
    InvalidHandPieceCharacters { token: String },
    #[error("invalid number of hand pieces. found {number}.")]
    InvalidNumberOfHandPieces { number: i64 },
    #[error(r##"end with hand piece num "{last_number}"."##)]
    EndWithHandPieceNumber { last_number: i64 },
    #[error("too many {piece}s. found {number}.")]
    TooManyPieces { piece: &'static str, number: i64 },
    #[error("invalid side to move characters. found {chars}.")]
    InvalidSideToMoveCharacters { chars: String },
    #[error("invalid game ply. found {chars}.")]
    InvalidGamePly { chars: String },
    #[error(r##"same hand piece twice. found "{token}"."##)]
    SameHandPieceTwice { token: String },
    #[error("{c:?} king is nothing.")]
    KingIsNothing { c: Color },
    #[error("{c:?} has more than one king.")]
    TooManyKings { c: Color },
    #[error("{c:?} has two pawns on file {file}.")]
    TwoPawnsOnFile { c: Color, file: char },
    #[error(r##"piece "{token}" on {square} can never move."##)]
    DeadPiece { token: String, square: String },
    #[error("the side not to move is in check.")]
    SideNotToMoveInCheck,
}

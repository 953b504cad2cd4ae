//! Shared helpers for the integration test suite.
#![allow(dead_code)]

use amsel_chess::game_state::chess_types::Position;

/// Standard test positions with known properties.
pub mod positions {
    pub const STARTING: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
    pub const KIWIPETE: &str =
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
    pub const ENDGAME_ROOKS: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";
    pub const PROMOTION_HEAVY: &str =
        "r2q1rk1/pP1p2pp/Q4n2/bbp1p3/Np6/1B3NBn/pPPP1PPP/R3K2R b KQ - 0 1";
    pub const CASTLING_BOTH: &str = "r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1";
    pub const MATE_IN_1_WHITE: &str = "6k1/5ppp/8/8/8/8/8/4R1K1 w - - 0 1"; // Re8#
    pub const MATE_IN_1_BLACK: &str = "4r1k1/8/8/8/8/8/5PPP/6K1 b - - 0 1"; // Re1#
    pub const STALEMATE: &str = "k7/1R6/K7/8/8/8/8/8 b - - 0 1";
    pub const ITALIAN: &str =
        "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4";
}

pub fn position(fen: &str) -> Position {
    Position::from_fen(fen).expect("test FEN should parse")
}

/// Plays long-algebraic moves from `start`, panicking on any rejection.
pub fn play(start: &Position, moves: &[&str]) -> Position {
    moves.iter().fold(start.clone(), |current, text| {
        let mv = current.parse_move(text).expect("move text should parse");
        current
            .apply_move(mv)
            .unwrap_or_else(|err| panic!("{text} should be legal: {err}"))
    })
}

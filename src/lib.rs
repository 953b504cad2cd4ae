//! Crate root module declarations for the Amsel chess engine.
//!
//! This file exposes the position model, move generation and legality rules,
//! evaluation and alpha-beta search, the engine front ends, and text-format
//! helpers so tests, benches and external tooling can import stable paths.

pub mod errors;

pub mod game_state {
    pub mod chess_rules;
    pub mod chess_types;
    pub mod position;
    pub mod undo_state;
}

pub mod moves {
    pub mod attack_tables;
    pub mod chess_move;
    pub mod piece_moves;
}

pub mod move_generation {
    pub mod game_termination;
    pub mod legal_move_apply;
    pub mod legal_move_checks;
    pub mod legal_move_generator;
    pub mod perft;
}

pub mod search {
    pub mod alpha_beta;
    pub mod board_scoring;
    pub mod game_phase;
    pub mod iterative_deepening;
    pub mod king_safety;
    pub mod move_ordering;
    pub mod pawn_structure;
    pub mod piece_square_tables;
    pub mod threading;
    pub mod zobrist;
}

pub mod engines {
    pub mod engine_alpha_beta;
    pub mod engine_random;
    pub mod engine_trait;
}

pub mod utils {
    pub mod algebraic;
    pub mod fen_generator;
    pub mod fen_parser;
    pub mod long_algebraic;
}

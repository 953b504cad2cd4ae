use rayon::prelude::*;

use crate::errors::ChessResult;
use crate::game_state::chess_types::*;
use crate::moves::chess_move::Move;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerftCounts {
    pub nodes: usize,
    pub captures: usize,
    pub en_passant: usize,
    pub castles: usize,
    pub promotions: usize,
    pub checks: usize,
    pub discovery_checks: usize,
    pub double_checks: usize,
    pub checkmates: usize,
}

impl PerftCounts {
    fn merge(&mut self, rhs: PerftCounts) {
        self.nodes += rhs.nodes;
        self.captures += rhs.captures;
        self.en_passant += rhs.en_passant;
        self.castles += rhs.castles;
        self.promotions += rhs.promotions;
        self.checks += rhs.checks;
        self.discovery_checks += rhs.discovery_checks;
        self.double_checks += rhs.double_checks;
        self.checkmates += rhs.checkmates;
    }
}

pub fn perft(position: &Position, depth: u8) -> ChessResult<PerftCounts> {
    perft_single_thread(position, depth)
}

pub fn perft_single_thread(position: &Position, depth: u8) -> ChessResult<PerftCounts> {
    if depth == 0 {
        return Ok(PerftCounts {
            nodes: 1,
            ..PerftCounts::default()
        });
    }

    let mut scratch = position.clone();
    let mut total = PerftCounts::default();
    perft_recurse(&mut scratch, depth, &mut total)?;
    Ok(total)
}

/// Root moves are split across the rayon pool; each worker owns its copy.
pub fn perft_multi_threaded(position: &Position, depth: u8) -> ChessResult<PerftCounts> {
    if depth <= 1 {
        return perft_single_thread(position, depth);
    }

    let root_moves = position.legal_moves(position.side_to_move());
    let per_move: Vec<ChessResult<PerftCounts>> = root_moves
        .par_iter()
        .map(|&mv| -> ChessResult<PerftCounts> {
            let mut scratch = position.clone();
            scratch.make_move(mv)?;
            let mut local = PerftCounts::default();
            perft_recurse(&mut scratch, depth - 1, &mut local)?;
            Ok(local)
        })
        .collect();

    let mut total = PerftCounts::default();
    for counts in per_move {
        total.merge(counts?);
    }
    Ok(total)
}

/// Leaf count below each root move, in generation order.
pub fn perft_divide(position: &Position, depth: u8) -> ChessResult<Vec<(Move, usize)>> {
    let mut scratch = position.clone();
    let mut out = Vec::new();
    for mv in position.legal_moves(position.side_to_move()) {
        let undo = scratch.make_move(mv)?;
        let nodes = perft_single_thread(&scratch, depth.saturating_sub(1))?.nodes;
        scratch.unmake_move(undo);
        out.push((mv, nodes));
    }
    Ok(out)
}

fn perft_recurse(position: &mut Position, depth: u8, counts: &mut PerftCounts) -> ChessResult<()> {
    let side = position.side_to_move();
    for mv in position.legal_moves(side) {
        let undo = position.make_move(mv)?;
        if depth == 1 {
            tally_leaf(position, &undo, counts);
        } else {
            perft_recurse(position, depth - 1, counts)?;
        }
        position.unmake_move(undo);
    }
    Ok(())
}

fn tally_leaf(position: &Position, undo: &UndoState, counts: &mut PerftCounts) {
    counts.nodes += 1;

    if undo.is_capture() {
        counts.captures += 1;
    }
    if undo.is_en_passant() {
        counts.en_passant += 1;
    }
    if undo.is_castle() {
        counts.castles += 1;
    }
    if undo.is_promotion() {
        counts.promotions += 1;
    }

    let defender = position.side_to_move();
    let checkers = position.attackers(defender);
    if checkers == 0 {
        return;
    }

    counts.checks += 1;
    let moved_to = undo.mv.to.bit() | undo.rook_move.map_or(0, |(_, rook_to)| rook_to.bit());
    if checkers & !moved_to != 0 {
        counts.discovery_checks += 1;
    }
    if checkers.count_ones() > 1 {
        counts.double_checks += 1;
    }
    if !position.has_legal_move(defender) {
        counts.checkmates += 1;
    }
}

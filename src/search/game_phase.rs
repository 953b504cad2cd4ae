use crate::game_state::chess_types::*;

/// Coarse stage of the game used to switch evaluation terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Opening,
    MiddleGame,
    Endgame,
}

/// Minor pieces that must have left their setup squares for the middle game.
const DEVELOPED_MINORS_FOR_MIDDLE_GAME: u32 = 3;

/// Endgame: at most six pieces on the board (kings included), fewer than three
/// pawns, or no queens. Otherwise middle game once three knights or bishops
/// have moved, else opening.
pub fn game_phase(position: &Position) -> GamePhase {
    if is_endgame(position) {
        return GamePhase::Endgame;
    }

    let minors = Color::BOTH.into_iter().fold(0u64, |acc, color| {
        acc | position.pieces(color, PieceKind::Knight) | position.pieces(color, PieceKind::Bishop)
    });
    let developed = (minors & !position.unmoved_mask()).count_ones();

    if developed >= DEVELOPED_MINORS_FOR_MIDDLE_GAME {
        GamePhase::MiddleGame
    } else {
        GamePhase::Opening
    }
}

#[inline]
pub fn is_endgame(position: &Position) -> bool {
    position.occupied().count_ones() <= 6
        || position.count(PieceKind::Pawn) < 3
        || position.count(PieceKind::Queen) == 0
}

//! FEN-to-Position parser.
//!
//! Builds a fully-populated position from a Forsyth-Edwards Notation string,
//! including piece bitboards, rights, clocks, occupancies and the derived
//! caches, and rejects layouts that break the position invariants.

use crate::errors::{ChessError, ChessResult};
use crate::game_state::chess_types::*;
use crate::move_generation::game_termination::classify;
use crate::utils::algebraic::algebraic_to_square;

pub fn parse_fen(fen: &str) -> ChessResult<Position> {
    let mut parts = fen.split_whitespace();

    let board_part = parts.next().ok_or_else(|| invalid("missing board layout"))?;
    let side_part = parts.next().ok_or_else(|| invalid("missing side to move"))?;
    let castling_part = parts.next().ok_or_else(|| invalid("missing castling rights"))?;
    let en_passant_part = parts.next().ok_or_else(|| invalid("missing en-passant square"))?;
    // Clocks are optional in much hand-written FEN.
    let halfmove_part = parts.next().unwrap_or("0");
    let fullmove_part = parts.next().unwrap_or("1");

    if parts.next().is_some() {
        return Err(invalid("extra trailing fields"));
    }

    let mut position = Position::new_empty();

    parse_board(board_part, &mut position)?;
    position.side_to_move = parse_side_to_move(side_part)?;
    position.castling_rights = parse_castling_rights(castling_part)?;
    position.en_passant_target = parse_en_passant_square(en_passant_part)?;
    position.halfmove_clock = halfmove_part
        .parse::<u16>()
        .map_err(|_| invalid(&format!("halfmove clock '{halfmove_part}'")))?;
    position.fullmove_number = fullmove_part
        .parse::<u16>()
        .map_err(|_| invalid(&format!("fullmove number '{fullmove_part}'")))?
        .max(1);

    position.check_invariants()?;
    validate_pawn_ranks(&position)?;
    validate_en_passant(&position)?;

    position.refresh_derived();
    position.unmoved = home_square_mask(&position);

    if position.is_in_check(position.side_to_move.opposite()) {
        return Err(invalid("the side not to move is in check"));
    }

    position.result = classify(&position);
    Ok(position)
}

#[inline]
fn invalid(detail: &str) -> ChessError {
    ChessError::InvalidFen(detail.to_owned())
}

fn parse_board(board_part: &str, position: &mut Position) -> ChessResult<()> {
    let ranks: Vec<&str> = board_part.split('/').collect();
    if ranks.len() != 8 {
        return Err(invalid("board layout must contain 8 ranks"));
    }

    for (fen_rank_idx, rank_str) in ranks.iter().enumerate() {
        let board_rank = 7 - fen_rank_idx as u8;
        let mut file = 0u8;

        for ch in rank_str.chars() {
            if let Some(empty_count) = ch.to_digit(10) {
                if !(1..=8).contains(&empty_count) {
                    return Err(invalid(&format!("empty-square count '{ch}'")));
                }
                file += empty_count as u8;
                if file > 8 {
                    return Err(invalid(&format!("rank {} has too many files", board_rank + 1)));
                }
                continue;
            }

            let piece = Piece::from_fen_char(ch)
                .ok_or_else(|| invalid(&format!("piece character '{ch}'")))?;
            let square = Square::from_coords(file, board_rank)
                .ok_or_else(|| invalid(&format!("rank {} has too many files", board_rank + 1)))?;

            position.pieces[piece.color.index()][piece.kind.index()] |= square.bit();
            file += 1;
        }

        if file != 8 {
            return Err(invalid(&format!(
                "rank {} does not sum to 8 files",
                board_rank + 1
            )));
        }
    }

    Ok(())
}

fn parse_side_to_move(side_part: &str) -> ChessResult<Color> {
    match side_part {
        "w" => Ok(Color::White),
        "b" => Ok(Color::Black),
        _ => Err(invalid(&format!("side-to-move field '{side_part}'"))),
    }
}

fn parse_castling_rights(castling_part: &str) -> ChessResult<CastlingRights> {
    let mut rights = CastlingRights::NONE;
    if castling_part == "-" {
        return Ok(rights);
    }

    for ch in castling_part.chars() {
        match ch {
            'K' => rights.grant(Color::White, CastleSide::KingSide),
            'Q' => rights.grant(Color::White, CastleSide::QueenSide),
            'k' => rights.grant(Color::Black, CastleSide::KingSide),
            'q' => rights.grant(Color::Black, CastleSide::QueenSide),
            _ => return Err(invalid(&format!("castling rights character '{ch}'"))),
        }
    }

    Ok(rights)
}

fn parse_en_passant_square(en_passant_part: &str) -> ChessResult<Option<Square>> {
    if en_passant_part == "-" {
        return Ok(None);
    }

    algebraic_to_square(en_passant_part)
        .map(Some)
        .map_err(|_| invalid(&format!("en-passant square '{en_passant_part}'")))
}

fn validate_pawn_ranks(position: &Position) -> ChessResult<()> {
    const BACK_RANKS: Bitboard = 0xFF00_0000_0000_00FF;
    let pawns = position.pieces[0][PieceKind::Pawn.index()] | position.pieces[1][PieceKind::Pawn.index()];
    if pawns & BACK_RANKS != 0 {
        return Err(invalid("pawn on the first or last rank"));
    }
    Ok(())
}

/// The target must be the square a double-stepping pawn of the side not to
/// move just skipped.
fn validate_en_passant(position: &Position) -> ChessResult<()> {
    let Some(target) = position.en_passant_target else {
        return Ok(());
    };

    let pusher = position.side_to_move.opposite();
    let skipped_rank = match pusher {
        Color::White => 2,
        Color::Black => 5,
    };
    let forward = pusher.forward();
    let occupied = position.pieces.iter().flatten().fold(0u64, |acc, bb| acc | bb);

    let consistent = target.rank() == skipped_rank
        && occupied & target.bit() == 0
        && target
            .offset(0, -forward)
            .is_some_and(|origin| occupied & origin.bit() == 0)
        && target.offset(0, forward).is_some_and(|landing| {
            position.pieces[pusher.index()][PieceKind::Pawn.index()] & landing.bit() != 0
        });

    if consistent {
        Ok(())
    } else {
        Err(invalid(&format!(
            "en-passant target {target} could not follow a double step"
        )))
    }
}

/// Pieces standing on a square where their kind starts the game count as
/// unmoved.
fn home_square_mask(position: &Position) -> Bitboard {
    let mut mask = 0u64;
    for color in Color::BOTH {
        let home = color.home_rank();
        for kind in PieceKind::ALL {
            let files: &[u8] = match kind {
                PieceKind::Pawn => &[0, 1, 2, 3, 4, 5, 6, 7],
                PieceKind::Knight => &[1, 6],
                PieceKind::Bishop => &[2, 5],
                PieceKind::Rook => &[0, 7],
                PieceKind::Queen => &[3],
                PieceKind::King => &[4],
            };
            let rank = if kind == PieceKind::Pawn {
                color.pawn_start_rank()
            } else {
                home
            };
            for &file in files {
                if let Some(square) = Square::from_coords(file, rank) {
                    mask |= position.pieces(color, kind) & square.bit();
                }
            }
        }
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::parse_fen;
    use crate::errors::ChessError;
    use crate::game_state::chess_rules::STARTING_POSITION_FEN;
    use crate::game_state::chess_types::*;

    #[test]
    fn parse_starting_fen() {
        let position = parse_fen(STARTING_POSITION_FEN).expect("starting FEN should parse");

        assert_eq!(position.side_to_move(), Color::White);
        assert_eq!(position.fullmove_number(), 1);
        assert_eq!(position.halfmove_clock(), 0);
        assert_eq!(position.unmoved_mask(), position.occupied());
    }

    #[test]
    fn clocks_may_be_omitted() {
        let position = parse_fen("4k3/8/8/8/8/8/8/4K3 b -  -").expect("FEN should parse");
        assert_eq!(position.halfmove_clock(), 0);
        assert_eq!(position.fullmove_number(), 1);
    }

    #[test]
    fn king_count_is_an_invariant_violation() {
        let err = parse_fen("8/8/8/8/8/8/8/4K3 w - - 0 1").expect_err("missing black king");
        assert!(err.is_invariant_violation());
        let err = parse_fen("4k3/8/8/8/8/8/8/3KK3 w - - 0 1").expect_err("two white kings");
        assert!(err.is_invariant_violation());
    }

    #[test]
    fn over_long_empty_rank_is_rejected() {
        for repeat in [2, 33, 40] {
            let fen = format!("{}/8/8/8/8/8/8/4K2k w - - 0 1", "8".repeat(repeat));
            let err = parse_fen(&fen).expect_err("rank wider than the board");
            assert!(matches!(err, ChessError::InvalidFen(_)), "{fen}: {err}");
        }
        let err = parse_fen("4k3/8/8/8/8/8/8/4K2k1 w - - 0 1").expect_err("nine files");
        assert!(matches!(err, ChessError::InvalidFen(_)));
    }

    #[test]
    fn malformed_layouts_are_rejected() {
        for fen in [
            "4k3/8/8/8/8/8/4K3 w - - 0 1",
            "4k3/8/8/8/8/8/8/4K4 w - - 0 1",
            "4k3/8/8/8/8/8/8/4X3 w - - 0 1",
            "4k3/8/8/8/8/8/8/4K3 x - - 0 1",
            "4k3/8/8/8/8/8/8/4K3 w Z - 0 1",
            "P3k3/8/8/8/8/8/8/4K3 w - - 0 1",
        ] {
            assert!(
                matches!(parse_fen(fen), Err(ChessError::InvalidFen(_))),
                "{fen} should be rejected"
            );
        }
    }

    #[test]
    fn en_passant_target_must_follow_a_double_step() {
        assert!(parse_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1").is_ok());
        assert!(parse_fen("4k3/8/8/3pP3/8/8/8/4K3 w - e6 0 1").is_err());
        assert!(parse_fen("4k3/8/8/3pP3/8/8/8/4K3 b - d6 0 1").is_err());
    }

    #[test]
    fn side_not_to_move_may_not_be_in_check() {
        assert!(parse_fen("4k3/8/8/8/8/8/8/4RK2 w - - 0 1").is_err());
        assert!(parse_fen("4k3/8/8/8/8/8/8/4RK2 b - - 0 1").is_ok());
    }

    #[test]
    fn finished_positions_carry_their_result() {
        let mate = parse_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3")
            .expect("FEN should parse");
        assert_eq!(
            mate.result(),
            Some(GameResult::Checkmate {
                loser: Color::White
            })
        );
    }
}

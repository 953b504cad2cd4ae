//! Move application: in-place make/unmake and the copying `apply_move`.

use log::trace;

use crate::errors::{ChessError, ChessResult, RejectReason};
use crate::game_state::chess_types::*;
use crate::move_generation::game_termination::classify;
use crate::move_generation::legal_move_checks::refresh_check_caches;
use crate::move_generation::legal_move_generator::legal_moves_from;
use crate::moves::chess_move::Move;
use crate::moves::piece_moves::moves_for_piece;
use crate::search::zobrist::{castling_key, en_passant_key, side_to_move_key};

impl Position {
    /// Validate `mv` against the legal moves and return the resulting position.
    ///
    /// `self` is never modified. A move onto the last rank without a promotion
    /// piece promotes to a queen. The returned position carries its game
    /// result if the move ended the game.
    pub fn apply_move(&self, mv: Move) -> ChessResult<Position> {
        let reject = |reason: RejectReason| {
            trace!("rejected {mv}: {reason}");
            ChessError::rejected(mv, reason)
        };

        if self.result.is_some() {
            return Err(reject(RejectReason::GameOver));
        }
        let piece = self
            .piece_at(mv.from)
            .ok_or_else(|| reject(RejectReason::EmptyOrigin))?;
        if piece.color != self.side_to_move {
            return Err(reject(RejectReason::WrongSide));
        }

        let mv = normalize_promotion(mv, piece);
        if !legal_moves_from(self, mv.from).contains(&mv) {
            return Err(reject(RejectReason::IllegalDestination));
        }

        let mut next = self.clone();
        next.make_move(mv)?;
        next.trim_history();
        next.result = classify(&next);
        Ok(next)
    }

    /// Play `mv` in place and return what is needed to take it back.
    ///
    /// The move must be pseudo-legal for the side to move (debug builds assert
    /// it); whether it leaves the mover in check is not tested. Any stored
    /// game result is cleared, so this also plays on from a finished game.
    /// Use `apply_move` for validated play.
    pub fn make_move(&mut self, mv: Move) -> ChessResult<UndoState> {
        let mover = self.side_to_move;
        let enemy = mover.opposite();

        let piece = self
            .piece_at(mv.from)
            .ok_or_else(|| ChessError::rejected(mv, RejectReason::EmptyOrigin))?;
        if piece.color != mover {
            return Err(ChessError::rejected(mv, RejectReason::WrongSide));
        }
        debug_assert!(
            moves_for_piece(self, piece, mv.from, true).targets & mv.to.bit() != 0,
            "{mv} is not a pseudo-legal move"
        );
        let mv = normalize_promotion(mv, piece);
        let placed_piece = match mv.promotion {
            Some(promotion) if piece.kind == PieceKind::Pawn && mv.to.rank() == mover.promotion_rank() => promotion,
            Some(_) => return Err(ChessError::rejected(mv, RejectReason::IllegalDestination)),
            None => piece.kind,
        };

        let en_passant = piece.kind == PieceKind::Pawn
            && self.en_passant_target == Some(mv.to)
            && mv.from.file() != mv.to.file()
            && self.piece_at(mv.to).is_none();
        let captured = if en_passant {
            Square::from_coords(mv.to.file(), mv.from.rank()).map(|sq| (PieceKind::Pawn, sq))
        } else {
            self.piece_at(mv.to).map(|victim| (victim.kind, mv.to))
        };
        if let Some((kind, square)) = captured {
            if kind == PieceKind::King || self.occupancy(enemy) & square.bit() == 0 {
                return Err(ChessError::InvariantViolation(format!(
                    "{mv} would capture {kind:?} on {square}"
                )));
            }
        }

        let castle_side = if piece.kind == PieceKind::King && mv.from.file().abs_diff(mv.to.file()) == 2 {
            Some(if mv.to.file() > mv.from.file() {
                CastleSide::KingSide
            } else {
                CastleSide::QueenSide
            })
        } else {
            None
        };
        let rook_move = castle_side.map(|side| (side.rook_home(mover), side.rook_target(mover)));

        let undo = UndoState {
            mv,
            moved_piece: piece.kind,
            placed_piece,
            captured,
            rook_move,
            prev_side_to_move: mover,
            prev_castling_rights: self.castling_rights,
            prev_en_passant_target: self.en_passant_target,
            prev_halfmove_clock: self.halfmove_clock,
            prev_fullmove_number: self.fullmove_number,
            prev_unmoved: self.unmoved,
            prev_king_squares: self.king_squares,
            prev_attackers: self.attackers,
            prev_defenders: self.defenders,
            prev_zobrist_key: self.zobrist_key,
            prev_result: self.result,
        };

        self.history.push(self.zobrist_key);
        self.zobrist_key ^= castling_key(self.castling_rights) ^ en_passant_key(self.en_passant_target);

        if let Some((kind, square)) = captured {
            self.toggle_piece(enemy, kind, square);
        }
        self.toggle_piece(mover, piece.kind, mv.from);
        self.toggle_piece(mover, placed_piece, mv.to);
        if let Some((rook_from, rook_to)) = rook_move {
            self.toggle_piece(mover, PieceKind::Rook, rook_from);
            self.toggle_piece(mover, PieceKind::Rook, rook_to);
            self.unmoved &= !rook_from.bit();
        }

        update_castling_rights(&mut self.castling_rights, mover, piece.kind, mv);

        self.en_passant_target = if piece.kind == PieceKind::Pawn && mv.from.rank().abs_diff(mv.to.rank()) == 2 {
            mv.from.offset(0, mover.forward())
        } else {
            None
        };

        if piece.kind == PieceKind::Pawn || captured.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock = self.halfmove_clock.saturating_add(1);
        }
        if mover == Color::Black {
            self.fullmove_number = self.fullmove_number.saturating_add(1);
        }

        self.unmoved &= !(mv.from.bit() | mv.to.bit());
        if piece.kind == PieceKind::King {
            self.king_squares[mover.index()] = mv.to;
        }

        self.side_to_move = enemy;
        self.zobrist_key ^= side_to_move_key()
            ^ castling_key(self.castling_rights)
            ^ en_passant_key(self.en_passant_target);

        refresh_check_caches(self);
        self.result = None;

        Ok(undo)
    }

    /// Take back the move recorded in `undo`, restoring the position exactly.
    pub fn unmake_move(&mut self, undo: UndoState) {
        let mover = undo.prev_side_to_move;

        if let Some((rook_from, rook_to)) = undo.rook_move {
            self.toggle_piece(mover, PieceKind::Rook, rook_to);
            self.toggle_piece(mover, PieceKind::Rook, rook_from);
        }
        self.toggle_piece(mover, undo.placed_piece, undo.mv.to);
        self.toggle_piece(mover, undo.moved_piece, undo.mv.from);
        if let Some((kind, square)) = undo.captured {
            self.toggle_piece(mover.opposite(), kind, square);
        }

        self.side_to_move = mover;
        self.castling_rights = undo.prev_castling_rights;
        self.en_passant_target = undo.prev_en_passant_target;
        self.halfmove_clock = undo.prev_halfmove_clock;
        self.fullmove_number = undo.prev_fullmove_number;
        self.unmoved = undo.prev_unmoved;
        self.king_squares = undo.prev_king_squares;
        self.attackers = undo.prev_attackers;
        self.defenders = undo.prev_defenders;
        self.zobrist_key = undo.prev_zobrist_key;
        self.result = undo.prev_result;
        self.history.pop();
    }

    /// Hand the move to `color` on a scratch copy, dropping an en-passant
    /// target that belonged to the other side.
    pub(crate) fn pass_turn_to(&mut self, color: Color) {
        if self.side_to_move == color {
            return;
        }
        self.zobrist_key ^= side_to_move_key() ^ en_passant_key(self.en_passant_target);
        self.side_to_move = color;
        self.en_passant_target = None;
    }
}

/// A pawn move onto the last rank with no promotion piece becomes a queen
/// promotion.
#[inline]
fn normalize_promotion(mv: Move, piece: Piece) -> Move {
    if mv.promotion.is_none()
        && piece.kind == PieceKind::Pawn
        && mv.to.rank() == piece.color.promotion_rank()
    {
        Move::with_promotion(mv.from, mv.to, PieceKind::Queen)
    } else {
        mv
    }
}

fn update_castling_rights(rights: &mut CastlingRights, mover: Color, moved: PieceKind, mv: Move) {
    if moved == PieceKind::King {
        rights.revoke_all(mover);
    }

    // A rook leaving its corner, or anything landing on a corner, ends that right.
    for color in Color::BOTH {
        for side in CastleSide::BOTH {
            let corner = side.rook_home(color);
            if mv.from == corner || mv.to == corner {
                rights.revoke(color, side);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::{ChessError, RejectReason};
    use crate::game_state::chess_types::*;
    use crate::moves::chess_move::Move;
    use crate::search::zobrist::compute_zobrist_key;

    fn play(position: &Position, text: &str) -> Position {
        let mv = position.parse_move(text).expect("move should parse");
        position.apply_move(mv).expect("move should apply")
    }

    fn reason(err: ChessError) -> RejectReason {
        match err {
            ChessError::RejectedMove { reason, .. } => reason,
            other => panic!("expected a rejected move, got {other}"),
        }
    }

    #[test]
    fn rejections_leave_the_position_untouched() {
        let start = Position::new_game();
        let snapshot = start.clone();

        let empty = Move::new("e4".parse().expect("e4"), "e5".parse().expect("e5"));
        assert_eq!(reason(start.apply_move(empty).expect_err("empty origin")), RejectReason::EmptyOrigin);

        let black = Move::new("e7".parse().expect("e7"), "e5".parse().expect("e5"));
        assert_eq!(reason(start.apply_move(black).expect_err("wrong side")), RejectReason::WrongSide);

        let too_far: Move = "e2e5".parse().expect("move text");
        assert_eq!(
            reason(start.apply_move(too_far).expect_err("illegal")),
            RejectReason::IllegalDestination
        );

        assert_eq!(start, snapshot);
    }

    #[test]
    fn clocks_and_side_advance() {
        let start = Position::new_game();
        let after_e4 = play(&start, "e2e4");
        assert_eq!(after_e4.side_to_move(), Color::Black);
        assert_eq!(after_e4.en_passant_target(), Some("e3".parse().expect("e3")));
        assert_eq!(after_e4.fullmove_number(), 1);

        let after_nf6 = play(&after_e4, "g8f6");
        assert_eq!(after_nf6.en_passant_target(), None);
        assert_eq!(after_nf6.halfmove_clock(), 1);
        assert_eq!(after_nf6.fullmove_number(), 2);
        assert_eq!(after_nf6.history(), &[after_e4.zobrist_key()]);
    }

    #[test]
    fn irreversible_moves_drop_older_history() {
        let mut position = Position::new_game();
        for text in ["g1f3", "g8f6", "f3g1", "f6g8"] {
            position = play(&position, text);
        }
        assert_eq!(position.history().len(), 4);

        let pushed = play(&position, "e2e4");
        assert!(pushed.history().is_empty());
        let replied = play(&pushed, "b8c6");
        assert_eq!(replied.history(), &[pushed.zobrist_key()]);
    }

    #[test]
    fn en_passant_removes_the_passed_pawn() {
        let position =
            Position::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1").expect("FEN should parse");
        let next = play(&position, "e5d6");
        assert_eq!(next.piece_at("d5".parse().expect("d5")), None);
        assert_eq!(
            next.piece_at("d6".parse().expect("d6")),
            Some(Piece::new(PieceKind::Pawn, Color::White))
        );
        assert_eq!(next.halfmove_clock(), 0);
    }

    #[test]
    fn castling_moves_the_rook_and_drops_rights() {
        let position =
            Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").expect("FEN should parse");
        let next = play(&position, "e1c1");
        assert_eq!(
            next.piece_at(Square::D1),
            Some(Piece::new(PieceKind::Rook, Color::White))
        );
        assert_eq!(next.piece_at(Square::A1), None);
        assert!(!next.castling_rights().has(Color::White, CastleSide::KingSide));
        assert!(next.castling_rights().has(Color::Black, CastleSide::QueenSide));

        let rook_capture = play(&position, "a1a8");
        assert!(!rook_capture.castling_rights().has(Color::Black, CastleSide::QueenSide));
        assert!(!rook_capture.castling_rights().has(Color::White, CastleSide::QueenSide));
        assert!(rook_capture.castling_rights().has(Color::Black, CastleSide::KingSide));
    }

    #[test]
    fn promotion_without_piece_defaults_to_queen() {
        let position = Position::from_fen("8/P3k3/8/8/8/8/8/4K3 w - - 0 1").expect("FEN should parse");
        let mv = Move::new("a7".parse().expect("a7"), Square::A8);
        let next = position.apply_move(mv).expect("promotion should apply");
        assert_eq!(
            next.piece_at(Square::A8),
            Some(Piece::new(PieceKind::Queen, Color::White))
        );

        let under = position.parse_move("a7a8n").expect("move should parse");
        let next = position.apply_move(under).expect("underpromotion should apply");
        assert_eq!(
            next.piece_at(Square::A8),
            Some(Piece::new(PieceKind::Knight, Color::White))
        );
    }

    #[test]
    fn make_then_unmake_restores_every_field() {
        let position = Position::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .expect("FEN should parse");
        let mut scratch = position.clone();
        for mv in position.legal_moves(Color::White) {
            let undo = scratch.make_move(mv).expect("legal move should make");
            assert_eq!(scratch.zobrist_key(), compute_zobrist_key(&scratch), "after {mv}");
            scratch.unmake_move(undo);
            assert_eq!(scratch, position, "after taking back {mv}");
        }
    }

    #[test]
    fn finished_game_rejects_further_moves() {
        let mut position = Position::new_game();
        for text in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            position = play(&position, text);
        }
        assert!(position.is_game_over());
        let mv: Move = "e1f2".parse().expect("move text");
        assert_eq!(reason(position.apply_move(mv).expect_err("game over")), RejectReason::GameOver);
    }

    #[test]
    fn make_move_plays_on_from_a_finished_game() {
        let mut position = Position::new_game();
        for text in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            position = play(&position, text);
        }
        assert!(position.is_game_over());

        let mut scratch = position.clone();
        let undo = scratch
            .make_move("a2a3".parse().expect("move text"))
            .expect("pseudo-legal move makes");
        assert_eq!(scratch.result(), None);
        scratch.unmake_move(undo);
        assert_eq!(scratch, position);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "not a pseudo-legal move")]
    fn make_move_asserts_on_a_blocked_slide() {
        let mut scratch = Position::new_game();
        let _ = scratch.make_move("a1a5".parse().expect("move text"));
    }
}

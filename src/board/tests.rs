use super::*;

#[test]
fn new_board_has_expected_occupancy() {
    let board = Board::new();
    assert_eq!(board.occupied().count_ones(), 32);
    assert_eq!(board.occupancy(Color::White).count_ones(), 16);
    assert_eq!(board.occupancy(Color::Black).count_ones(), 16);
    assert_eq!(board.side_to_move, Color::White);
    assert_eq!(
        board.castling_rights,
        CASTLE_WK | CASTLE_WQ | CASTLE_BK | CASTLE_BQ
    );
    assert_eq!(board.en_passant, None);
}

#[test]
fn new_empty_board_has_no_pieces() {
    let board = Board::new_empty();
    assert_eq!(board.occupied(), 0);
    assert!(board.validate().is_ok());
}

#[test]
fn piece_at_matches_set_bb() {
    let mut board = Board::new_empty();
    let sq = Square::from_file_rank(4, 3);
    board.set_bb(Color::White, Piece::Knight, 1u64 << sq.index());
    assert_eq!(board.piece_at(sq), Some((Color::White, Piece::Knight)));
    assert_eq!(board.piece_type_at(sq), Some(Piece::Knight));
    assert_eq!(board.color_at(sq), Some(Color::White));
}

#[test]
fn set_bb_updates_occupancy_and_zobrist() {
    let mut board = Board::new_empty();
    let before = board.zobrist;
    let sq = Square::from_file_rank(0, 0);
    board.set_bb(Color::White, Piece::Rook, 1u64 << sq.index());
    assert_ne!(board.zobrist, before);
    assert_eq!(board.occ_white, 1u64 << sq.index());
    board.assert_hash();
}

#[test]
fn king_square_finds_the_king() {
    let board = Board::new();
    assert_eq!(board.king_square(Color::White), Square::from_file_rank(4, 0));
    assert_eq!(board.king_square(Color::Black), Square::from_file_rank(4, 7));
}

#[test]
#[should_panic]
fn king_square_panics_when_king_missing() {
    let board = Board::new_empty();
    board.king_square(Color::White);
}

#[test]
fn validate_rejects_overlapping_bitboards() {
    let mut board = Board::new_empty();
    let sq = Square::from_index(10);
    board.set_bb(Color::White, Piece::Pawn, 1u64 << sq.index());
    board.set_bb(Color::White, Piece::Knight, 1u64 << sq.index());
    assert!(board.validate().is_err());
}

#[test]
fn repetition_count_starts_at_one_for_fresh_position() {
    let board = Board::new();
    assert_eq!(board.repetition_count(), 1);
    assert!(!board.is_threefold());
    assert!(!board.is_repetition());
}

#[test]
fn repetition_count_includes_history_matches() {
    let mut board = Board::new();
    let start_hash = board.zobrist;
    board.history.push(start_hash);
    board.history.push(start_hash);
    assert_eq!(board.repetition_count(), 3);
    assert!(board.is_threefold());
}

#[test]
fn color_opposite_and_not_agree() {
    assert_eq!(Color::White.opposite(), Color::Black);
    assert_eq!(!Color::White, Color::Black);
    assert_eq!(!Color::Black, Color::White);
}

#[test]
fn piece_value_ordering_is_sane() {
    assert!(Piece::Queen.value() > Piece::Rook.value());
    assert!(Piece::Rook.value() > Piece::Bishop.value());
    assert!(Piece::Bishop.value() >= Piece::Knight.value());
    assert!(Piece::Knight.value() > Piece::Pawn.value());
}

#[test]
fn display_and_from_str_round_trip() {
    let board = Board::new();
    let rendered = board.to_string();
    let parsed: Board = rendered.parse().unwrap();
    assert_eq!(parsed, board);
}

#[test]
fn default_board_is_empty() {
    let board = Board::default();
    assert_eq!(board.occupied(), 0);
}

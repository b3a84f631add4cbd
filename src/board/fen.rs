// src/board/fen.rs
// FEN parsing and serialization for `Board`.

use super::fen_tables::{CHAR_TO_PC, PC_TO_CHAR};
use super::{CASTLE_BK, CASTLE_BQ, CASTLE_WK, CASTLE_WQ, Color, Piece};
use crate::square::Square;

use super::Board;

impl Board {
    /// Replace this board's state with the position described by `fen`.
    ///
    /// Accepts both full six-field FEN and the shortened four-field form
    /// (piece placement, side to move, castling, en passant) some tools emit
    /// — halfmove clock and fullmove number default to 0 and 1 when absent.
    pub fn set_fen(&mut self, fen: &str) -> Result<(), String> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() < 4 {
            return Err(format!("FEN needs at least 4 fields, got {}", fields.len()));
        }

        let mut board = Board::new_empty();

        // 1. Piece placement
        let mut rank = 7i32;
        let mut file = 0i32;
        for c in fields[0].chars() {
            match c {
                '/' => {
                    if file != 8 {
                        return Err(format!("rank {} has {} files, expected 8", rank + 1, file));
                    }
                    rank -= 1;
                    file = 0;
                }
                '1'..='8' => {
                    file += c.to_digit(10).unwrap() as i32;
                }
                _ => {
                    let (piece, color) = CHAR_TO_PC[c as usize]
                        .ok_or_else(|| format!("invalid piece glyph '{c}' in FEN"))?;
                    if !(0..8).contains(&file) || !(0..8).contains(&rank) {
                        return Err(format!("piece glyph '{c}' falls outside the board"));
                    }
                    let sq = Square::from_file_rank(file as u8, rank as u8);
                    let bb = board.bb(color, piece) | (1u64 << sq.index());
                    board.set_bb(color, piece, bb);
                    file += 1;
                }
            }
        }
        if rank != 0 || file != 8 {
            return Err("FEN piece placement does not cover all 8 ranks".to_string());
        }

        // 2. Side to move
        board.side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(format!("invalid side-to-move field '{other}'")),
        };

        // 3. Castling rights
        board.castling_rights = 0;
        if fields[2] != "-" {
            for c in fields[2].chars() {
                board.castling_rights |= match c {
                    'K' => CASTLE_WK,
                    'Q' => CASTLE_WQ,
                    'k' => CASTLE_BK,
                    'q' => CASTLE_BQ,
                    other => return Err(format!("invalid castling glyph '{other}'")),
                };
            }
        }

        // 4. En passant target
        board.en_passant = match fields[3] {
            "-" => None,
            sq => Some(parse_square(sq)?),
        };

        // 5. Halfmove clock (optional)
        board.halfmove_clock = match fields.get(4) {
            Some(s) => s
                .parse()
                .map_err(|_| format!("invalid halfmove clock '{s}'"))?,
            None => 0,
        };

        // 6. Fullmove number (optional)
        board.fullmove_number = match fields.get(5) {
            Some(s) => s
                .parse()
                .map_err(|_| format!("invalid fullmove number '{s}'"))?,
            None => 1,
        };

        board.validate()?;
        board.refresh_zobrist();
        board.history.clear();

        *self = board;
        Ok(())
    }

    /// Serialize the current position to a full six-field FEN string.
    pub fn to_fen(&self) -> String {
        let mut placement = String::new();
        for rank in (0..8).rev() {
            let mut empty_run = 0u32;
            for file in 0..8 {
                let sq = Square::from_file_rank(file, rank);
                match self.piece_at(sq) {
                    Some((color, piece)) => {
                        if empty_run > 0 {
                            placement.push_str(&empty_run.to_string());
                            empty_run = 0;
                        }
                        let idx = (color as usize) * 6 + (piece as usize);
                        placement.push(PC_TO_CHAR[idx]);
                    }
                    None => empty_run += 1,
                }
            }
            if empty_run > 0 {
                placement.push_str(&empty_run.to_string());
            }
            if rank != 0 {
                placement.push('/');
            }
        }

        let side = match self.side_to_move {
            Color::White => "w",
            Color::Black => "b",
        };

        let mut castling = String::new();
        if self.castling_rights & CASTLE_WK != 0 {
            castling.push('K');
        }
        if self.castling_rights & CASTLE_WQ != 0 {
            castling.push('Q');
        }
        if self.castling_rights & CASTLE_BK != 0 {
            castling.push('k');
        }
        if self.castling_rights & CASTLE_BQ != 0 {
            castling.push('q');
        }
        if castling.is_empty() {
            castling.push('-');
        }

        let ep = match self.en_passant {
            Some(sq) => sq.to_string(),
            None => "-".to_string(),
        };

        format!(
            "{placement} {side} {castling} {ep} {} {}",
            self.halfmove_clock, self.fullmove_number
        )
    }
}

fn parse_square(s: &str) -> Result<Square, String> {
    let mut chars = s.chars();
    let file_c = chars.next().ok_or("empty square string")?;
    let rank_c = chars.next().ok_or("square string missing rank")?;
    if chars.next().is_some() {
        return Err(format!("square string '{s}' too long"));
    }
    if !('a'..='h').contains(&file_c) || !('1'..='8').contains(&rank_c) {
        return Err(format!("invalid square '{s}'"));
    }
    let file = file_c as u8 - b'a';
    let rank = rank_c as u8 - b'1';
    Ok(Square::from_file_rank(file, rank))
}

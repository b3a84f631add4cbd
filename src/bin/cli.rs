//! UCI front-end: reads newline-delimited commands from stdin, drives the
//! search core, and writes `info`/`bestmove` lines to stdout. This binary is
//! a thin collaborator — it owns no chess logic beyond command parsing and
//! time-budget arithmetic; everything else lives in `corvus::search` and
//! `corvus::moves`.

use corvus::board::{Board, Color};
use corvus::moves::execute::{generate_legal, make_move_basic};
use corvus::moves::magic::MagicTables;
use corvus::moves::magic::loader::load_magic_tables;
use corvus::moves::perft::perft_divide;
use corvus::moves::types::Move;
use corvus::search::search::{TimeManager, search_with_time};
use corvus::search::tt::TranspositionTable;
use std::io::{self, BufRead};
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

const DEFAULT_HASH_MB: usize = 64;
const MIN_HASH_MB: usize = 2;
const MAX_HASH_MB: usize = 3000;
const MAX_SEARCH_DEPTH: i32 = 64;

/// State that must survive a `go` search and be handed back once the search
/// thread finishes — the TT persists across searches by design (see
/// `corvus::search::search_with_time`'s doc comment).
struct EngineState {
    tt: TranspositionTable,
}

impl EngineState {
    fn new(hash_mb: usize) -> Self {
        Self {
            tt: TranspositionTable::new(hash_mb),
        }
    }
}

fn main() -> ExitCode {
    let tables = Arc::new(load_magic_tables());
    let mut board = Board::new();
    let mut hash_mb = DEFAULT_HASH_MB;
    let mut state = Some(EngineState::new(hash_mb));
    let mut stop_flag = Arc::new(AtomicBool::new(false));
    let mut search_thread: Option<thread::JoinHandle<EngineState>> = None;

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l.trim().to_string(),
            Err(_) => return ExitCode::FAILURE,
        };
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts[0] {
            "uci" => handle_uci(),
            "isready" => {
                wait_for_search(&mut search_thread, &mut state);
                println!("readyok");
            }
            "ucinewgame" => {
                wait_for_search(&mut search_thread, &mut state);
                board = Board::new();
                if let Some(ref mut s) = state {
                    s.tt.clear();
                }
            }
            "setoption" => {
                wait_for_search(&mut search_thread, &mut state);
                handle_setoption(&parts, &mut hash_mb, &mut state);
            }
            "position" => {
                wait_for_search(&mut search_thread, &mut state);
                if let Some(new_board) = handle_position(&parts, &tables) {
                    board = new_board;
                } else {
                    eprintln!("info string invalid position command, keeping prior position");
                }
            }
            "go" => {
                wait_for_search(&mut search_thread, &mut state);
                let engine_state = state.take().expect("search state missing");
                let flag = Arc::new(AtomicBool::new(false));
                stop_flag = flag.clone();
                search_thread = Some(spawn_search(
                    &parts,
                    board.clone(),
                    Arc::clone(&tables),
                    engine_state,
                    flag,
                ));
            }
            "stop" => {
                stop_flag.store(true, Ordering::Relaxed);
                wait_for_search(&mut search_thread, &mut state);
            }
            "perft" => {
                wait_for_search(&mut search_thread, &mut state);
                handle_perft(&parts, &mut board, &tables);
            }
            "print" | "d" => {
                wait_for_search(&mut search_thread, &mut state);
                println!("{}", board);
                println!("Fen: {}", board.to_fen());
                println!("Hash: {:016x}", board.zobrist);
            }
            "quit" => {
                stop_flag.store(true, Ordering::Relaxed);
                wait_for_search(&mut search_thread, &mut state);
                return ExitCode::SUCCESS;
            }
            _ => {}
        }
    }

    // Stdin closed without `quit`: stop any in-flight search and exit
    // non-zero per the UCI contract's exit-code rule.
    stop_flag.store(true, Ordering::Relaxed);
    wait_for_search(&mut search_thread, &mut state);
    ExitCode::FAILURE
}

fn handle_uci() {
    println!("id name Corvus");
    println!("id author Corvus Contributors");
    println!(
        "option name Hash type spin default {} min {} max {}",
        DEFAULT_HASH_MB, MIN_HASH_MB, MAX_HASH_MB
    );
    println!("option name Clear Hash type button");
    println!("uciok");
}

fn handle_setoption(parts: &[&str], hash_mb: &mut usize, state: &mut Option<EngineState>) {
    // `setoption name <N...> value <V...>` — option names may contain spaces
    // ("Clear Hash"), so both the name and value are joined token ranges
    // rather than single tokens.
    let Some(name_idx) = parts.iter().position(|&p| p.eq_ignore_ascii_case("name")) else {
        return;
    };
    let value_idx = parts.iter().position(|&p| p.eq_ignore_ascii_case("value"));
    let name_end = value_idx.unwrap_or(parts.len());
    let name = parts[name_idx + 1..name_end].join(" ");

    if name.eq_ignore_ascii_case("Hash") {
        if let Some(vi) = value_idx
            && let Some(raw) = parts.get(vi + 1)
            && let Ok(mb) = raw.parse::<usize>()
        {
            *hash_mb = mb.clamp(MIN_HASH_MB, MAX_HASH_MB);
            *state = Some(EngineState::new(*hash_mb));
        }
        // Malformed integer: UCI tradition is to ignore the option silently.
    } else if name.eq_ignore_ascii_case("Clear Hash")
        && let Some(s) = state.as_mut()
    {
        s.tt.clear();
    }
    // Unknown options are ignored.
}

fn handle_position(parts: &[&str], tables: &MagicTables) -> Option<Board> {
    let mut board = if parts.len() > 1 && parts[1] == "startpos" {
        Board::new()
    } else if parts.len() > 1 && parts[1] == "fen" {
        let fen_start = 2;
        let fen_end = parts
            .iter()
            .enumerate()
            .skip(fen_start)
            .find(|(_, &p)| p == "moves")
            .map(|(i, _)| i)
            .unwrap_or(parts.len());
        let fen_string = parts[fen_start..fen_end].join(" ");
        Board::from_str(&fen_string).ok()?
    } else {
        return None;
    };

    if let Some(moves_idx) = parts.iter().position(|&p| p == "moves") {
        for move_str in &parts[moves_idx + 1..] {
            let mv = parse_uci_move(&board, move_str, tables)?;
            make_move_basic(&mut board, mv);
        }
    }

    Some(board)
}

fn parse_uci_move(board: &Board, move_str: &str, tables: &MagicTables) -> Option<Move> {
    if move_str.len() < 4 {
        return None;
    }
    let chars: Vec<char> = move_str.chars().collect();

    let from_file = (chars[0] as u8).wrapping_sub(b'a');
    let from_rank = (chars[1] as u8).wrapping_sub(b'1');
    let to_file = (chars[2] as u8).wrapping_sub(b'a');
    let to_rank = (chars[3] as u8).wrapping_sub(b'1');
    if from_file > 7 || from_rank > 7 || to_file > 7 || to_rank > 7 {
        return None;
    }
    let from_square = (from_rank * 8 + from_file) as usize;
    let to_square = (to_rank * 8 + to_file) as usize;

    let promo_piece = if move_str.len() >= 5 {
        match chars[4] {
            'q' => Some(corvus::board::Piece::Queen),
            'r' => Some(corvus::board::Piece::Rook),
            'b' => Some(corvus::board::Piece::Bishop),
            'n' => Some(corvus::board::Piece::Knight),
            _ => None,
        }
    } else {
        None
    };

    let mut moves = Vec::with_capacity(256);
    let mut scratch = Vec::with_capacity(256);
    let mut board_copy = board.clone();
    generate_legal(&mut board_copy, tables, &mut moves, &mut scratch);

    moves.into_iter().find(|mv| {
        mv.from.index() as usize == from_square
            && mv.to.index() as usize == to_square
            && mv.promotion == promo_piece
    })
}

struct GoLimits {
    depth: i32,
    movetime: Option<u64>,
    wtime: Option<u64>,
    btime: Option<u64>,
    winc: u64,
    binc: u64,
    movestogo: Option<u64>,
}

fn parse_go(parts: &[&str]) -> GoLimits {
    let mut limits = GoLimits {
        depth: MAX_SEARCH_DEPTH,
        movetime: None,
        wtime: None,
        btime: None,
        winc: 0,
        binc: 0,
        movestogo: None,
    };

    let mut i = 1;
    while i < parts.len() {
        match parts[i] {
            "depth" => {
                if let Some(v) = parts.get(i + 1).and_then(|s| s.parse().ok()) {
                    limits.depth = v;
                }
                i += 2;
            }
            "movetime" => {
                limits.movetime = parts.get(i + 1).and_then(|s| s.parse().ok());
                i += 2;
            }
            "wtime" => {
                limits.wtime = parts.get(i + 1).and_then(|s| s.parse().ok());
                i += 2;
            }
            "btime" => {
                limits.btime = parts.get(i + 1).and_then(|s| s.parse().ok());
                i += 2;
            }
            "winc" => {
                limits.winc = parts.get(i + 1).and_then(|s| s.parse().ok()).unwrap_or(0);
                i += 2;
            }
            "binc" => {
                limits.binc = parts.get(i + 1).and_then(|s| s.parse().ok()).unwrap_or(0);
                i += 2;
            }
            "movestogo" => {
                limits.movestogo = parts.get(i + 1).and_then(|s| s.parse().ok());
                i += 2;
            }
            "infinite" => {
                limits.depth = MAX_SEARCH_DEPTH;
                i += 1;
            }
            _ => i += 1,
        }
    }
    limits
}

/// Allocates a per-move time budget from the clock state in a `go` command.
/// Reserves a safety margin against the reported clock so the engine always
/// returns before the GUI's own flag falls.
fn allocate_time(limits: &GoLimits, side: Color) -> Option<Duration> {
    if let Some(ms) = limits.movetime {
        return Some(Duration::from_millis(ms));
    }

    let (my_time, my_inc) = match side {
        Color::White => (limits.wtime, limits.winc),
        Color::Black => (limits.btime, limits.binc),
    };
    let t = my_time?;

    let safety_buffer = (t * 15 / 100).min(500);
    let usable = t.saturating_sub(safety_buffer);

    let mut alloc = if let Some(mtg) = limits.movestogo {
        let moves_to_plan = mtg.max(2);
        usable / moves_to_plan + (my_inc * 3) / 4
    } else if usable > 5000 {
        usable / 40 + (my_inc * 9) / 10
    } else if usable > 2000 {
        usable / 30 + (my_inc * 3) / 4
    } else if usable > 500 {
        usable / 20 + my_inc / 2
    } else {
        my_inc / 2 + 20
    };

    let hard_cap = usable / 5;
    alloc = alloc.min(hard_cap).min(usable);
    if alloc < 10 && usable >= 10 {
        alloc = 10;
    }
    Some(Duration::from_millis(alloc))
}

fn spawn_search(
    parts: &[&str],
    mut board: Board,
    tables: Arc<MagicTables>,
    mut engine_state: EngineState,
    stop: Arc<AtomicBool>,
) -> thread::JoinHandle<EngineState> {
    let limits = parse_go(parts);
    let side = board.side_to_move;
    let time_limit = allocate_time(&limits, side);
    let depth = limits.depth.clamp(1, MAX_SEARCH_DEPTH);

    thread::spawn(move || {
        let time = TimeManager::with_stop_flag(time_limit, stop);
        let (_score, best_move) =
            search_with_time(&mut board, &tables, &mut engine_state.tt, depth, time);

        match best_move {
            Some(m) => println!("bestmove {}", m.to_uci()),
            None => println!("bestmove 0000"),
        }
        engine_state
    })
}

fn wait_for_search(
    handle: &mut Option<thread::JoinHandle<EngineState>>,
    state: &mut Option<EngineState>,
) {
    if let Some(h) = handle.take() {
        match h.join() {
            Ok(s) => *state = Some(s),
            Err(_) => *state = Some(EngineState::new(DEFAULT_HASH_MB)),
        }
    }
}

fn handle_perft(parts: &[&str], board: &mut Board, tables: &MagicTables) {
    let depth: u32 = match parts.get(1).and_then(|s| s.parse().ok()) {
        Some(d) => d,
        None => {
            eprintln!("info string perft requires a depth argument");
            return;
        }
    };

    let start = Instant::now();
    let nodes = perft_divide(board, tables, depth);
    let elapsed = start.elapsed();
    println!("nodes: {}", nodes);
    println!("time: {} ms", elapsed.as_millis());
}

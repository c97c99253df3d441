//! 走法排序
//!
//! 分数 = 历史分 × 10 + MVV-LVA × 2 + 将军 300 + 位置分变化 / 2

use shisan_core::{apply_move, BoardState, Move, PieceKind, Rules};

use crate::evaluate::Evaluator;
use crate::history::HistoryTable;

const HISTORY_WEIGHT: i32 = 10;
const MVV_LVA_WEIGHT: i32 = 2;
const CHECK_BONUS: i32 = 300;

/// 单个走法的排序分数
pub fn score_move(state: &BoardState, mv: Move, rules: &Rules, history: &HistoryTable) -> i32 {
    let Some(piece) = state.board.get(mv.from) else {
        return i32::MIN;
    };

    let mut score = history.score(mv) * HISTORY_WEIGHT;

    // 甲和刺的吃子不在落点，需要模拟
    let victim_value = match state.board.get(mv.to) {
        Some(target) => target.value(),
        None if matches!(piece.kind, PieceKind::Armor | PieceKind::Spike) => {
            let mut scratch = state.board.clone();
            apply_move(&mut scratch, mv.from, mv.to)
                .map(|effects| effects.captured_value())
                .unwrap_or(0)
        }
        None => 0,
    };
    if victim_value > 0 {
        score += (victim_value - piece.value() / 10) * MVV_LVA_WEIGHT;
    }

    // 只看走动的棋子能否直接攻击对方帅/将
    if let Some(general) = state.board.find_general(piece.side.opponent()) {
        let mut scratch = state.board.clone();
        if let Some(effects) = apply_move(&mut scratch, mv.from, mv.to) {
            if !effects.mover_destroyed && rules.attacks(&scratch, mv.to, general) {
                score += CHECK_BONUS;
            }
        }
    }

    let positional =
        Evaluator::position_value(mv.to, piece) - Evaluator::position_value(mv.from, piece);
    score + positional / 2
}

/// 按分数从高到低排序；`first` 存在时放在最前
pub fn order_moves(
    state: &BoardState,
    moves: Vec<Move>,
    rules: &Rules,
    history: &HistoryTable,
    first: Option<Move>,
) -> Vec<Move> {
    let mut scored: Vec<(i32, Move)> = moves
        .into_iter()
        .map(|mv| {
            let score = if Some(mv) == first {
                i32::MAX
            } else {
                score_move(state, mv, rules, history)
            };
            (score, mv)
        })
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().map(|(_, mv)| mv).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shisan_core::{Board, Position, Side};

    fn pos(row: u8, col: u8) -> Position {
        Position::new_unchecked(row, col)
    }

    fn state_with(board: Board) -> BoardState {
        BoardState::from_board(board, Side::Red)
    }

    #[test]
    fn test_capture_ordered_first() {
        let mut board = Board::empty();
        board.place(pos(0, 6), PieceKind::General, Side::Red);
        board.place(pos(12, 0), PieceKind::General, Side::Black);
        board.place(pos(4, 2), PieceKind::Chariot, Side::Red);
        board.place(pos(8, 2), PieceKind::Horse, Side::Black);
        let state = state_with(board);
        let rules = Rules::default();

        let moves = rules.legal_moves(&state);
        let ordered = order_moves(&state, moves, &rules, &HistoryTable::new(), None);
        assert_eq!(ordered[0], Move::new(pos(4, 2), pos(8, 2)));
    }

    #[test]
    fn test_history_raises_quiet_move() {
        let mut board = Board::empty();
        board.place(pos(0, 6), PieceKind::General, Side::Red);
        board.place(pos(12, 0), PieceKind::General, Side::Black);
        board.place(pos(4, 2), PieceKind::Chariot, Side::Red);
        let state = state_with(board);
        let rules = Rules::default();

        let quiet = Move::new(pos(4, 2), pos(4, 3));
        let mut history = HistoryTable::new();
        let before = score_move(&state, quiet, &rules, &history);
        history.record(quiet, 4);
        assert_eq!(score_move(&state, quiet, &rules, &history) - before, 16 * HISTORY_WEIGHT);
    }

    #[test]
    fn test_check_bonus() {
        let mut board = Board::empty();
        board.place(pos(0, 6), PieceKind::General, Side::Red);
        board.place(pos(12, 0), PieceKind::General, Side::Black);
        board.place(pos(4, 2), PieceKind::Chariot, Side::Red);
        let state = state_with(board);
        let rules = Rules::default();

        let history = HistoryTable::new();
        let checking = score_move(&state, Move::new(pos(4, 2), pos(4, 0)), &rules, &history);
        let quiet = score_move(&state, Move::new(pos(4, 2), pos(5, 2)), &rules, &history);
        assert!(checking > quiet + 200, "将军走法应该排在前面: {} vs {}", checking, quiet);
    }

    #[test]
    fn test_first_move_pinned() {
        let state = BoardState::initial();
        let rules = Rules::default();
        let moves = rules.legal_moves(&state);
        let pinned = *moves.last().unwrap();

        let history = HistoryTable::new();
        let ordered = order_moves(&state, moves.clone(), &rules, &history, Some(pinned));
        assert_eq!(ordered[0], pinned);
        assert_eq!(ordered.len(), moves.len());
    }
}

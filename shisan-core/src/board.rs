//! 棋盘状态

use serde::{Deserialize, Serialize};

use crate::constants::{BOARD_SIZE, MAX_COORD, SQUARE_COUNT};
use crate::piece::{Piece, PieceKind, Position, Side};

/// 红方底线布局（黑方按河界镜像）
const BACK_RANK: [PieceKind; BOARD_SIZE] = [
    PieceKind::Chariot,
    PieceKind::Horse,
    PieceKind::Elephant,
    PieceKind::Armor,
    PieceKind::Archer,
    PieceKind::Advisor,
    PieceKind::General,
    PieceKind::Advisor,
    PieceKind::Archer,
    PieceKind::Armor,
    PieceKind::Elephant,
    PieceKind::Horse,
    PieceKind::Chariot,
];

/// 红方其余棋子（相对行, 列, 类型）
const RED_EXTRAS: [(u8, u8, PieceKind); 8] = [
    (1, 3, PieceKind::Spike),
    (1, 6, PieceKind::Shield),
    (1, 9, PieceKind::Spike),
    (2, 1, PieceKind::Cannon),
    (2, 4, PieceKind::Guard),
    (2, 6, PieceKind::Bombard),
    (2, 8, PieceKind::Guard),
    (2, 11, PieceKind::Cannon),
];

/// 棋盘
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    /// 13x13 棋盘，索引为 row * 13 + col
    squares: Vec<Option<Piece>>,
    /// 下一个可分配的棋子 id
    next_id: u8,
}

impl Board {
    /// 创建空棋盘
    pub fn empty() -> Self {
        Self {
            squares: vec![None; SQUARE_COUNT],
            next_id: 0,
        }
    }

    /// 创建初始棋盘
    pub fn initial() -> Self {
        let mut board = Self::empty();

        for side in [Side::Red, Side::Black] {
            let row = |relative: u8| match side {
                Side::Red => relative,
                Side::Black => MAX_COORD - relative,
            };

            for (col, kind) in BACK_RANK.iter().enumerate() {
                board.place(Position::new_unchecked(row(0), col as u8), *kind, side);
            }
            for (relative, col, kind) in RED_EXTRAS {
                board.place(Position::new_unchecked(row(relative), col), kind, side);
            }
            for col in (0..BOARD_SIZE as u8).step_by(2) {
                board.place(
                    Position::new_unchecked(side.soldier_row(), col),
                    PieceKind::Soldier,
                    side,
                );
            }
        }

        board
    }

    /// 放置一枚新棋子（分配新 id），返回该棋子
    pub fn place(&mut self, pos: Position, kind: PieceKind, side: Side) -> Piece {
        let piece = Piece::new(self.next_id, kind, side);
        self.next_id = self.next_id.wrapping_add(1);
        self.set(pos, Some(piece));
        piece
    }

    /// 获取指定位置的棋子
    pub fn get(&self, pos: Position) -> Option<Piece> {
        if pos.is_valid() {
            self.squares[pos.to_index()]
        } else {
            None
        }
    }

    /// 设置指定位置的棋子
    pub fn set(&mut self, pos: Position, piece: Option<Piece>) {
        if pos.is_valid() {
            self.squares[pos.to_index()] = piece;
        }
    }

    /// 移除指定位置的棋子
    pub fn remove(&mut self, pos: Position) -> Option<Piece> {
        let piece = self.get(pos);
        self.set(pos, None);
        piece
    }

    /// 移动棋子（不检查规则）
    pub fn move_piece(&mut self, from: Position, to: Position) -> Option<Piece> {
        let piece = self.get(from);
        let captured = self.get(to);
        self.set(from, None);
        self.set(to, piece);
        captured
    }

    /// 是否为空格
    pub fn is_empty(&self, pos: Position) -> bool {
        self.get(pos).is_none()
    }

    /// 查找指定阵营的帅/将位置
    pub fn find_general(&self, side: Side) -> Option<Position> {
        self.occupied()
            .find(|(_, piece)| piece.kind == PieceKind::General && piece.side == side)
            .map(|(pos, _)| pos)
    }

    /// 获取指定阵营的所有棋子位置
    pub fn pieces(&self, side: Side) -> Vec<(Position, Piece)> {
        self.occupied().filter(|(_, piece)| piece.side == side).collect()
    }

    /// 获取所有棋子
    pub fn all_pieces(&self) -> Vec<(Position, Piece)> {
        self.occupied().collect()
    }

    fn occupied(&self) -> impl Iterator<Item = (Position, Piece)> + '_ {
        self.squares.iter().enumerate().filter_map(|(index, square)| {
            let piece = (*square)?;
            Position::from_index(index).map(|pos| (pos, piece))
        })
    }

    /// 沿方向走，返回遇到的第一枚棋子
    pub fn first_piece_along(&self, from: Position, dir: (i8, i8)) -> Option<(Position, Piece)> {
        let mut current = from;
        while let Some(next) = current.offset(dir.0, dir.1) {
            if let Some(piece) = self.get(next) {
                return Some((next, piece));
            }
            current = next;
        }
        None
    }

    /// 两点之间（不含端点）同一直线上的棋子数；不在同一直线返回 None
    pub fn count_between(&self, a: Position, b: Position) -> Option<usize> {
        let dr = b.row as i8 - a.row as i8;
        let dc = b.col as i8 - a.col as i8;
        if a == b || !(dr == 0 || dc == 0 || dr.abs() == dc.abs()) {
            return None;
        }
        let step = (dr.signum(), dc.signum());
        let mut count = 0;
        let mut current = a;
        while let Some(next) = current.offset(step.0, step.1) {
            if next == b {
                break;
            }
            if self.get(next).is_some() {
                count += 1;
            }
            current = next;
        }
        Some(count)
    }

    /// 检查两个帅/将是否在同一行或同一列直接照面（飞将）
    pub fn generals_facing(&self) -> bool {
        let (Some(red), Some(black)) = (
            self.find_general(Side::Red),
            self.find_general(Side::Black),
        ) else {
            return false;
        };

        if red.row != black.row && red.col != black.col {
            return false;
        }

        self.count_between(red, black) == Some(0)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::initial()
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in (0..BOARD_SIZE as u8).rev() {
            write!(f, "{:>2} ", row)?;
            for col in 0..BOARD_SIZE as u8 {
                match self.get(Position::new_unchecked(row, col)) {
                    Some(piece) => write!(f, "{}", piece.display_char())?,
                    None => write!(f, "・")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// 完整的棋盘状态（包含走子方、无吃子步数）
///
/// 搜索时克隆的就是这个结构
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardState {
    /// 棋盘
    pub board: Board,
    /// 当前走子方
    pub current_turn: Side,
    /// 自上次吃子以来的半回合数（用于和棋判定）
    pub quiet_plies: u32,
}

impl BoardState {
    /// 创建初始状态
    pub fn initial() -> Self {
        Self::from_board(Board::initial(), Side::Red)
    }

    /// 从棋盘创建状态
    pub fn from_board(board: Board, current_turn: Side) -> Self {
        Self {
            board,
            current_turn,
            quiet_plies: 0,
        }
    }

    /// 切换走子方
    pub fn switch_turn(&mut self) {
        self.current_turn = self.current_turn.opponent();
    }

    /// 规范化局面键：按 (类型, 阵营, 行, 列) 排序后拼接，再加走子方
    pub fn canonical_key(&self) -> String {
        let mut entries: Vec<(PieceKind, Side, u8, u8)> = self
            .board
            .all_pieces()
            .into_iter()
            .map(|(pos, piece)| (piece.kind, piece.side, pos.row, pos.col))
            .collect();
        entries.sort_unstable();

        let mut key = String::with_capacity(entries.len() * 6 + 2);
        for (kind, side, row, col) in entries {
            key.push(kind.to_char());
            key.push(side.to_char());
            key.push_str(&format!("{:02}{:02}", row, col));
        }
        key.push('|');
        key.push(self.current_turn.to_char());
        key
    }
}

impl Default for BoardState {
    fn default() -> Self {
        Self::initial()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_board() {
        let board = Board::initial();

        // 检查红方帅
        let general = board.get(Position::new_unchecked(0, 6)).unwrap();
        assert_eq!(general.kind, PieceKind::General);
        assert_eq!(general.side, Side::Red);

        // 检查黑方将
        let general = board.get(Position::new_unchecked(12, 6)).unwrap();
        assert_eq!(general.kind, PieceKind::General);
        assert_eq!(general.side, Side::Black);

        // 检查黑方盾
        let shield = board.get(Position::new_unchecked(11, 6)).unwrap();
        assert_eq!(shield.kind, PieceKind::Shield);
        assert_eq!(shield.side, Side::Black);

        // 检查红方兵
        let soldier = board.get(Position::new_unchecked(3, 0)).unwrap();
        assert_eq!(soldier.kind, PieceKind::Soldier);

        // 每方 13 + 8 + 7 = 28 子
        assert_eq!(board.pieces(Side::Red).len(), 28);
        assert_eq!(board.pieces(Side::Black).len(), 28);
    }

    #[test]
    fn test_initial_ids_unique() {
        let board = Board::initial();
        let mut ids: Vec<u8> = board.all_pieces().iter().map(|(_, p)| p.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 56);
    }

    #[test]
    fn test_initial_mirrored() {
        let board = Board::initial();
        for (pos, piece) in board.pieces(Side::Red) {
            let mirror = Position::new_unchecked(MAX_COORD - pos.row, pos.col);
            let other = board.get(mirror).unwrap();
            assert_eq!(other.kind, piece.kind);
            assert_eq!(other.side, Side::Black);
        }
    }

    #[test]
    fn test_move_piece() {
        let mut board = Board::initial();

        let from = Position::new_unchecked(2, 1);
        let to = Position::new_unchecked(4, 1);
        let cannon = board.get(from);

        let captured = board.move_piece(from, to);
        assert!(captured.is_none());
        assert!(board.get(from).is_none());
        assert_eq!(board.get(to), cannon);
    }

    #[test]
    fn test_find_general() {
        let board = Board::initial();
        assert_eq!(board.find_general(Side::Red), Some(Position::new_unchecked(0, 6)));
        assert_eq!(board.find_general(Side::Black), Some(Position::new_unchecked(12, 6)));
    }

    #[test]
    fn test_generals_facing_file() {
        let mut board = Board::empty();
        board.place(Position::new_unchecked(1, 6), PieceKind::General, Side::Red);
        board.place(Position::new_unchecked(11, 6), PieceKind::General, Side::Black);
        assert!(board.generals_facing());

        // 放一个棋子在中间
        board.place(Position::new_unchecked(6, 6), PieceKind::Soldier, Side::Red);
        assert!(!board.generals_facing());
    }

    #[test]
    fn test_generals_facing_rank() {
        let mut board = Board::empty();
        board.place(Position::new_unchecked(6, 2), PieceKind::General, Side::Red);
        board.place(Position::new_unchecked(6, 9), PieceKind::General, Side::Black);
        assert!(board.generals_facing());
    }

    #[test]
    fn test_initial_not_facing() {
        assert!(!Board::initial().generals_facing());
    }

    #[test]
    fn test_count_between() {
        let mut board = Board::empty();
        board.place(Position::new_unchecked(0, 0), PieceKind::Cannon, Side::Red);
        board.place(Position::new_unchecked(0, 3), PieceKind::Soldier, Side::Red);
        assert_eq!(
            board.count_between(Position::new_unchecked(0, 0), Position::new_unchecked(0, 5)),
            Some(1)
        );
        assert_eq!(
            board.count_between(Position::new_unchecked(0, 0), Position::new_unchecked(2, 1)),
            None
        );
    }

    #[test]
    fn test_canonical_key_ignores_ids() {
        let mut a = Board::empty();
        a.place(Position::new_unchecked(0, 6), PieceKind::General, Side::Red);
        a.place(Position::new_unchecked(12, 6), PieceKind::General, Side::Black);

        let mut b = Board::empty();
        b.place(Position::new_unchecked(12, 6), PieceKind::General, Side::Black);
        b.place(Position::new_unchecked(0, 6), PieceKind::General, Side::Red);

        let ka = BoardState::from_board(a, Side::Red).canonical_key();
        let kb = BoardState::from_board(b.clone(), Side::Red).canonical_key();
        assert_eq!(ka, kb);

        let kc = BoardState::from_board(b, Side::Black).canonical_key();
        assert_ne!(ka, kc, "走子方不同，键应不同");
    }

    #[test]
    fn test_display_has_all_rows() {
        let text = Board::initial().to_string();
        assert_eq!(text.lines().count(), BOARD_SIZE);
    }
}

//! 走法生成
//!
//! 每种棋子的几何规则集中在一个 `match` 分发中。这里只生成伪合法走法，
//! 自将检测见 [`crate::rules::Rules`]。

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::config::RuleConfig;
use crate::constants::{ALL_DIRECTIONS, DIAGONAL, ORTHOGONAL};
use crate::effects;
use crate::piece::{Piece, PieceKind, Position, Side};

/// 走法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// 起始位置
    pub from: Position,
    /// 目标位置
    pub to: Position,
}

impl Move {
    /// 创建新走法
    pub fn new(from: Position, to: Position) -> Self {
        Self { from, to }
    }

    /// 编码为 u16: from_row << 12 | from_col << 8 | to_row << 4 | to_col
    ///
    /// 起点与终点不同，所以合法走法的编码不会是 0
    pub fn encode(&self) -> u16 {
        ((self.from.row as u16) << 12)
            | ((self.from.col as u16) << 8)
            | ((self.to.row as u16) << 4)
            | (self.to.col as u16)
    }

    /// 解码；0 表示无走法
    pub fn decode(code: u16) -> Option<Self> {
        if code == 0 {
            return None;
        }
        let from = Position::new(((code >> 12) & 0xF) as u8, ((code >> 8) & 0xF) as u8)?;
        let to = Position::new(((code >> 4) & 0xF) as u8, (code & 0xF) as u8)?;
        Some(Self { from, to })
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// 单个棋子的可达格子，分为普通走法和吃子走法
///
/// 甲和刺的"吃子走法"落点本身是空格，吃子在走完之后结算
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destinations {
    pub ordinary: Vec<Position>,
    pub captures: Vec<Position>,
}

impl Destinations {
    /// 是否包含目标格
    pub fn contains(&self, to: Position) -> bool {
        self.ordinary.contains(&to) || self.captures.contains(&to)
    }

    /// 全部目标格
    pub fn all(&self) -> impl Iterator<Item = Position> + '_ {
        self.ordinary.iter().chain(self.captures.iter()).copied()
    }

    pub fn len(&self) -> usize {
        self.ordinary.len() + self.captures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordinary.is_empty() && self.captures.is_empty()
    }
}

/// 走法生成器
pub struct MoveGenerator;

impl MoveGenerator {
    /// 生成指定阵营的所有伪合法走法（不考虑将军）
    pub fn generate_pseudo_legal(board: &Board, side: Side, config: &RuleConfig) -> Vec<Move> {
        let mut moves = Vec::with_capacity(128);

        for (pos, _) in board.pieces(side) {
            let destinations = Self::generate_piece_moves(board, pos, config);
            moves.extend(destinations.all().map(|to| Move::new(pos, to)));
        }

        moves
    }

    /// 生成指定位置棋子的所有伪合法走法
    pub fn generate_piece_moves(board: &Board, pos: Position, config: &RuleConfig) -> Destinations {
        let mut dest = Destinations::default();
        let Some(piece) = board.get(pos) else {
            return dest;
        };

        // 被敌方卫照面的棋子不能动
        if Self::is_frozen(board, pos, piece.side, config) {
            return dest;
        }

        let side = piece.side;
        match piece.kind {
            PieceKind::General => Self::generate_general_moves(board, pos, side, config, &mut dest),
            PieceKind::Advisor => Self::generate_advisor_moves(board, pos, side, config, &mut dest),
            PieceKind::Elephant => Self::generate_elephant_moves(board, pos, side, &mut dest),
            PieceKind::Horse => Self::generate_horse_moves(board, pos, side, config, &mut dest),
            PieceKind::Chariot => Self::generate_chariot_moves(board, pos, side, &mut dest),
            PieceKind::Cannon => Self::generate_cannon_moves(board, pos, side, &mut dest),
            PieceKind::Soldier => Self::generate_soldier_moves(board, pos, side, &mut dest),
            PieceKind::Guard | PieceKind::Shield => {
                Self::generate_jump_moves(board, pos, &mut dest)
            }
            PieceKind::Archer => Self::generate_archer_moves(board, pos, side, &mut dest),
            PieceKind::Bombard => Self::generate_bombard_moves(board, pos, side, &mut dest),
            PieceKind::Armor => Self::generate_armor_moves(board, pos, piece, &mut dest),
            PieceKind::Spike => Self::generate_spike_moves(board, pos, side, &mut dest),
        }

        dest
    }

    /// 检查 `pos` 上属于 `side` 的棋子是否被敌方卫照面（冻结）
    pub fn is_frozen(board: &Board, pos: Position, side: Side, config: &RuleConfig) -> bool {
        let diagonal: &[(i8, i8)] = if config.guard_faces_diagonally {
            &DIAGONAL
        } else {
            &[]
        };

        ORTHOGONAL.iter().chain(diagonal).any(|&dir| {
            matches!(
                board.first_piece_along(pos, dir),
                Some((_, p)) if p.kind == PieceKind::Guard && p.side != side
            )
        })
    }

    /// 检查棋子是否孤立（无同色棋子正交相邻）
    pub fn is_isolated(board: &Board, pos: Position, side: Side) -> bool {
        !ORTHOGONAL.iter().any(|&(dr, dc)| {
            pos.offset(dr, dc)
                .and_then(|n| board.get(n))
                .is_some_and(|p| p.side == side)
        })
    }

    /// 生成帅/将的走法
    fn generate_general_moves(
        board: &Board,
        pos: Position,
        side: Side,
        config: &RuleConfig,
        dest: &mut Destinations,
    ) {
        let diagonal = if pos.is_in_palace(side) {
            config.general_diagonal_in_palace
        } else {
            config.general_diagonal_outside_palace
        };
        let directions: &[(i8, i8)] = if diagonal { &ALL_DIRECTIONS } else { &ORTHOGONAL };

        for &(dr, dc) in directions {
            if let Some(to) = pos.offset(dr, dc) {
                Self::try_add_step(board, to, side, dest);
            }
        }
    }

    /// 生成仕/士的走法
    fn generate_advisor_moves(
        board: &Board,
        pos: Position,
        side: Side,
        config: &RuleConfig,
        dest: &mut Destinations,
    ) {
        // 宫内只能斜走；出宫后增加直走
        let directions: &[(i8, i8)] = if pos.is_in_palace(side) {
            &DIAGONAL
        } else {
            &ALL_DIRECTIONS
        };

        for &(dr, dc) in directions {
            if let Some(to) = pos.offset(dr, dc) {
                if !config.advisor_leaves_palace && !to.is_in_palace(side) {
                    continue;
                }
                Self::try_add_step(board, to, side, dest);
            }
        }
    }

    /// 生成相/象的走法
    fn generate_elephant_moves(board: &Board, pos: Position, side: Side, dest: &mut Destinations) {
        // 田字，检查象眼
        for (dr, dc) in DIAGONAL {
            let Some(eye) = pos.offset(dr, dc) else {
                continue;
            };
            if !board.is_empty(eye) {
                continue;
            }
            if let Some(to) = pos.offset(dr * 2, dc * 2) {
                Self::try_add_step(board, to, side, dest);
            }
        }

        // 过河后可直跳两格吃子
        if !pos.has_crossed_river(side) {
            return;
        }
        for (dr, dc) in ORTHOGONAL {
            let (Some(mid), Some(to)) = (pos.offset(dr, dc), pos.offset(dr * 2, dc * 2)) else {
                continue;
            };
            if !board.is_empty(mid) {
                continue;
            }
            let Some(target) = board.get(to) else {
                continue;
            };
            if Self::can_capture(target, side)
                && !Self::is_double_guarded(board, mid, (dr, dc), target.side)
            {
                dest.captures.push(to);
            }
        }
    }

    /// 跳吃的中点两侧（垂直于跳跃方向）都有受害方棋子
    fn is_double_guarded(board: &Board, mid: Position, dir: (i8, i8), victim_side: Side) -> bool {
        let flank = (dir.1, dir.0);
        [flank, (-flank.0, -flank.1)].iter().all(|&(dr, dc)| {
            mid.offset(dr, dc)
                .and_then(|p| board.get(p))
                .is_some_and(|p| p.side == victim_side)
        })
    }

    /// 生成马的走法
    fn generate_horse_moves(
        board: &Board,
        pos: Position,
        side: Side,
        config: &RuleConfig,
        dest: &mut Destinations,
    ) {
        // 马的8个方向和对应的蹩马腿位置
        let horse_moves = [
            ((2, 1), (1, 0)),
            ((2, -1), (1, 0)),
            ((-2, 1), (-1, 0)),
            ((-2, -1), (-1, 0)),
            ((1, 2), (0, 1)),
            ((-1, 2), (0, 1)),
            ((1, -2), (0, -1)),
            ((-1, -2), (0, -1)),
        ];

        for ((dr, dc), (lr, lc)) in horse_moves {
            let Some(leg) = pos.offset(lr, lc) else {
                continue;
            };
            if !board.is_empty(leg) {
                continue;
            }
            if let Some(to) = pos.offset(dr, dc) {
                Self::try_add_step(board, to, side, dest);
            }
        }

        if !config.horse_straight_jump {
            return;
        }

        // 直跳三格，中间两格必须为空
        for (dr, dc) in ORTHOGONAL {
            let path_clear = (1..=2).all(|i| {
                pos.offset(dr * i, dc * i)
                    .is_some_and(|p| board.is_empty(p))
            });
            if !path_clear {
                continue;
            }
            if let Some(to) = pos.offset(dr * 3, dc * 3) {
                Self::try_add_step(board, to, side, dest);
            }
        }
    }

    /// 生成车的走法
    fn generate_chariot_moves(board: &Board, pos: Position, side: Side, dest: &mut Destinations) {
        for (dr, dc) in ORTHOGONAL {
            let mut current = pos;
            while let Some(to) = current.offset(dr, dc) {
                if let Some(target) = board.get(to) {
                    if Self::can_capture(target, side) {
                        dest.captures.push(to);
                    }
                    break;
                }
                dest.ordinary.push(to);
                current = to;
            }
        }
    }

    /// 生成炮的走法
    fn generate_cannon_moves(board: &Board, pos: Position, side: Side, dest: &mut Destinations) {
        for (dr, dc) in ORTHOGONAL {
            let mut current = pos;
            let mut jumped = false;

            while let Some(to) = current.offset(dr, dc) {
                if let Some(target) = board.get(to) {
                    if jumped {
                        // 已经跳过一个棋子，可以吃
                        if Self::can_capture(target, side) {
                            dest.captures.push(to);
                        }
                        break;
                    }
                    // 第一个棋子，作为炮架
                    jumped = true;
                } else if !jumped {
                    dest.ordinary.push(to);
                }
                current = to;
            }
        }
    }

    /// 生成兵/卒的走法
    fn generate_soldier_moves(board: &Board, pos: Position, side: Side, dest: &mut Destinations) {
        let forward = side.forward();

        // 到达对方底线：四个方向
        if pos.row == side.last_rank() {
            for (dr, dc) in ORTHOGONAL {
                if let Some(to) = pos.offset(dr, dc) {
                    Self::try_add_step(board, to, side, dest);
                }
            }
            return;
        }

        if let Some(to) = pos.offset(forward, 0) {
            Self::try_add_step(board, to, side, dest);
        }

        if pos.has_crossed_river(side) {
            // 过河后可以左右移动，不能后退
            for dc in [-1i8, 1i8] {
                if let Some(to) = pos.offset(0, dc) {
                    Self::try_add_step(board, to, side, dest);
                }
            }
        } else if pos.row == side.soldier_row() {
            // 初始行可以前进两格，两格都必须为空，且不能吃子
            if let (Some(one), Some(two)) = (pos.offset(forward, 0), pos.offset(forward * 2, 0)) {
                if board.is_empty(one) && board.is_empty(two) {
                    dest.ordinary.push(two);
                }
            }
        }
    }

    /// 生成卫/盾的走法：正交方向隔一子跳，落在其后的空格上
    fn generate_jump_moves(board: &Board, pos: Position, dest: &mut Destinations) {
        for (dr, dc) in ORTHOGONAL {
            let Some((screen, _)) = board.first_piece_along(pos, (dr, dc)) else {
                continue;
            };
            let mut current = screen;
            while let Some(to) = current.offset(dr, dc) {
                if !board.is_empty(to) {
                    break;
                }
                dest.ordinary.push(to);
                current = to;
            }
        }
    }

    /// 生成弓的走法：斜行至多三格
    fn generate_archer_moves(board: &Board, pos: Position, side: Side, dest: &mut Destinations) {
        for (dr, dc) in DIAGONAL {
            for distance in 1..=3 {
                let Some(to) = pos.offset(dr * distance, dc * distance) else {
                    break;
                };
                if let Some(target) = board.get(to) {
                    if Self::can_capture(target, side) {
                        dest.captures.push(to);
                    }
                    break;
                }
                dest.ordinary.push(to);
            }
        }
    }

    /// 生成砲台的走法：八向滑行，只吃相邻孤子
    fn generate_bombard_moves(board: &Board, pos: Position, side: Side, dest: &mut Destinations) {
        for (dr, dc) in ALL_DIRECTIONS {
            let mut current = pos;
            while let Some(to) = current.offset(dr, dc) {
                if !board.is_empty(to) {
                    break;
                }
                dest.ordinary.push(to);
                current = to;
            }

            let Some(adjacent) = pos.offset(dr, dc) else {
                continue;
            };
            if let Some(target) = board.get(adjacent) {
                if Self::can_capture(target, side)
                    && Self::is_isolated(board, adjacent, target.side)
                {
                    dest.captures.push(adjacent);
                }
            }
        }
    }

    /// 生成甲的走法：直线滑行到空格，走完后可能夹吃
    fn generate_armor_moves(board: &Board, pos: Position, piece: Piece, dest: &mut Destinations) {
        for (dr, dc) in ORTHOGONAL {
            let mut current = pos;
            while let Some(to) = current.offset(dr, dc) {
                if !board.is_empty(to) {
                    break;
                }
                let mut scratch = board.clone();
                scratch.move_piece(pos, to);
                if effects::armor_line_victims(&scratch, to, piece.side).is_empty() {
                    dest.ordinary.push(to);
                } else {
                    dest.captures.push(to);
                }
                current = to;
            }
        }
    }

    /// 生成刺的走法：直线滑行到空格，身后有敌子时同归于尽
    fn generate_spike_moves(board: &Board, pos: Position, side: Side, dest: &mut Destinations) {
        for (dr, dc) in ORTHOGONAL {
            let exchange = effects::spike_exchange_victim(board, pos, side, (dr, dc)).is_some();
            let mut current = pos;
            while let Some(to) = current.offset(dr, dc) {
                if !board.is_empty(to) {
                    break;
                }
                if exchange {
                    dest.captures.push(to);
                } else {
                    dest.ordinary.push(to);
                }
                current = to;
            }
        }
    }

    /// 尝试添加一步走法（检查目标位置是否可以移动）
    fn try_add_step(board: &Board, to: Position, side: Side, dest: &mut Destinations) {
        match board.get(to) {
            None => dest.ordinary.push(to),
            Some(target) if Self::can_capture(target, side) => dest.captures.push(to),
            Some(_) => {}
        }
    }

    /// 是否可以直接吃掉目标棋子（盾不可被吃）
    fn can_capture(target: Piece, side: Side) -> bool {
        target.is_enemy_of(side) && target.kind.is_capturable()
    }
}

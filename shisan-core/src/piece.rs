//! 棋子定义

use serde::{Deserialize, Serialize};

use crate::constants::{
    BLACK_PALACE_ROWS, BOARD_SIZE, MAX_COORD, PALACE_COLS, RED_PALACE_ROWS, RED_SOLDIER_ROW,
    RIVER_ROW,
};

/// 棋子类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PieceKind {
    /// 帅/将
    General,
    /// 仕/士
    Advisor,
    /// 相/象（可过河）
    Elephant,
    /// 马
    Horse,
    /// 车
    Chariot,
    /// 炮
    Cannon,
    /// 兵/卒
    Soldier,
    /// 卫：隔子跳，冻结所照面的敌子
    Guard,
    /// 弓：斜行至多三格
    Archer,
    /// 砲台：八向滑行，只吃相邻的孤子
    Bombard,
    /// 甲：只走空格，三连夹吃
    Armor,
    /// 刺：后撤时与身后敌子同归于尽
    Spike,
    /// 盾：隔子跳，不能吃子也不可被吃
    Shield,
}

impl PieceKind {
    /// 全部棋子类型
    pub const ALL: [PieceKind; 13] = [
        PieceKind::General,
        PieceKind::Advisor,
        PieceKind::Elephant,
        PieceKind::Horse,
        PieceKind::Chariot,
        PieceKind::Cannon,
        PieceKind::Soldier,
        PieceKind::Guard,
        PieceKind::Archer,
        PieceKind::Bombard,
        PieceKind::Armor,
        PieceKind::Spike,
        PieceKind::Shield,
    ];

    /// 获取棋子的基础分值（用于 AI 评估）
    pub fn value(&self) -> i32 {
        match self {
            PieceKind::General => 10000,
            PieceKind::Chariot => 900,
            PieceKind::Bombard => 500,
            PieceKind::Cannon => 450,
            PieceKind::Horse => 400,
            PieceKind::Armor => 350,
            PieceKind::Spike => 300,
            PieceKind::Archer => 300,
            PieceKind::Elephant => 250,
            PieceKind::Guard => 250,
            PieceKind::Advisor => 200,
            PieceKind::Shield => 150,
            PieceKind::Soldier => 100,
        }
    }

    /// 单字符编码（用于局面键）
    pub fn to_char(&self) -> char {
        match self {
            PieceKind::General => 'k',
            PieceKind::Advisor => 'a',
            PieceKind::Elephant => 'e',
            PieceKind::Horse => 'h',
            PieceKind::Chariot => 'r',
            PieceKind::Cannon => 'c',
            PieceKind::Soldier => 'p',
            PieceKind::Guard => 'g',
            PieceKind::Archer => 'x',
            PieceKind::Bombard => 'b',
            PieceKind::Armor => 'm',
            PieceKind::Spike => 's',
            PieceKind::Shield => 'd',
        }
    }

    /// 是否可以被任何方式吃掉
    pub fn is_capturable(&self) -> bool {
        !matches!(self, PieceKind::Shield)
    }
}

/// 阵营
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    /// 红方（先手，在下方）
    Red,
    /// 黑方（后手，在上方）
    Black,
}

impl Side {
    /// 获取对方阵营
    pub fn opponent(&self) -> Side {
        match self {
            Side::Red => Side::Black,
            Side::Black => Side::Red,
        }
    }

    /// 数组下标
    pub fn index(&self) -> usize {
        match self {
            Side::Red => 0,
            Side::Black => 1,
        }
    }

    /// 前进方向（行增量）
    pub fn forward(&self) -> i8 {
        match self {
            Side::Red => 1,
            Side::Black => -1,
        }
    }

    /// 对方底线（本方兵的最后一行）
    pub fn last_rank(&self) -> u8 {
        match self {
            Side::Red => MAX_COORD,
            Side::Black => 0,
        }
    }

    /// 本方兵的初始行
    pub fn soldier_row(&self) -> u8 {
        match self {
            Side::Red => RED_SOLDIER_ROW,
            Side::Black => MAX_COORD - RED_SOLDIER_ROW,
        }
    }

    /// 单字符编码
    pub fn to_char(&self) -> char {
        match self {
            Side::Red => 'r',
            Side::Black => 'b',
        }
    }
}

/// 棋子
///
/// `id` 在一局中唯一，棋子移动时保持不变
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub id: u8,
    pub kind: PieceKind,
    pub side: Side,
}

impl Piece {
    /// 创建新棋子
    pub fn new(id: u8, kind: PieceKind, side: Side) -> Self {
        Self { id, kind, side }
    }

    /// 获取棋子显示的汉字
    pub fn display_char(&self) -> char {
        match (self.kind, self.side) {
            (PieceKind::General, Side::Red) => '帥',
            (PieceKind::General, Side::Black) => '將',
            (PieceKind::Advisor, Side::Red) => '仕',
            (PieceKind::Advisor, Side::Black) => '士',
            (PieceKind::Elephant, Side::Red) => '相',
            (PieceKind::Elephant, Side::Black) => '象',
            (PieceKind::Horse, Side::Red) => '傌',
            (PieceKind::Horse, Side::Black) => '馬',
            (PieceKind::Chariot, Side::Red) => '俥',
            (PieceKind::Chariot, Side::Black) => '車',
            (PieceKind::Cannon, Side::Red) => '炮',
            (PieceKind::Cannon, Side::Black) => '砲',
            (PieceKind::Soldier, Side::Red) => '兵',
            (PieceKind::Soldier, Side::Black) => '卒',
            (PieceKind::Guard, _) => '衛',
            (PieceKind::Archer, _) => '弓',
            (PieceKind::Bombard, _) => '礮',
            (PieceKind::Armor, _) => '甲',
            (PieceKind::Spike, _) => '刺',
            (PieceKind::Shield, _) => '盾',
        }
    }

    /// 获取棋子分值
    pub fn value(&self) -> i32 {
        self.kind.value()
    }

    /// 是否为 `side` 的敌子
    pub fn is_enemy_of(&self, side: Side) -> bool {
        self.side != side
    }
}

/// 棋盘位置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    /// 行 (0-12)，红方在 0 行一侧
    pub row: u8,
    /// 列 (0-12)
    pub col: u8,
}

impl Position {
    /// 创建新位置
    pub fn new(row: u8, col: u8) -> Option<Self> {
        if (row as usize) < BOARD_SIZE && (col as usize) < BOARD_SIZE {
            Some(Self { row, col })
        } else {
            None
        }
    }

    /// 创建新位置（不检查边界，内部使用）
    pub const fn new_unchecked(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// 检查位置是否在棋盘内
    pub fn is_valid(&self) -> bool {
        (self.row as usize) < BOARD_SIZE && (self.col as usize) < BOARD_SIZE
    }

    /// 检查位置是否在指定阵营的九宫格内
    pub fn is_in_palace(&self, side: Side) -> bool {
        let rows = match side {
            Side::Red => RED_PALACE_ROWS,
            Side::Black => BLACK_PALACE_ROWS,
        };
        PALACE_COLS.contains(&self.col) && rows.contains(&self.row)
    }

    /// 是否在本方半场（不含河界行）
    pub fn is_own_half(&self, side: Side) -> bool {
        match side {
            Side::Red => self.row < RIVER_ROW,
            Side::Black => self.row > RIVER_ROW,
        }
    }

    /// 是否已过河（河界行算作已过河）
    pub fn has_crossed_river(&self, side: Side) -> bool {
        !self.is_own_half(side)
    }

    /// 以 `side` 视角的行号（己方底线为 0）
    pub fn relative_row(&self, side: Side) -> u8 {
        match side {
            Side::Red => self.row,
            Side::Black => MAX_COORD - self.row,
        }
    }

    /// 获取偏移后的位置
    pub fn offset(&self, drow: i8, dcol: i8) -> Option<Position> {
        let row = self.row as i8 + drow;
        let col = self.col as i8 + dcol;
        if row >= 0 && (row as usize) < BOARD_SIZE && col >= 0 && (col as usize) < BOARD_SIZE {
            Some(Position {
                row: row as u8,
                col: col as u8,
            })
        } else {
            None
        }
    }

    /// 转换为数组索引
    pub fn to_index(&self) -> usize {
        self.row as usize * BOARD_SIZE + self.col as usize
    }

    /// 从数组索引转换
    pub fn from_index(index: usize) -> Option<Self> {
        if index < BOARD_SIZE * BOARD_SIZE {
            Some(Position {
                row: (index / BOARD_SIZE) as u8,
                col: (index % BOARD_SIZE) as u8,
            })
        } else {
            None
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

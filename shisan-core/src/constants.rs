//! 棋盘与规则常量

/// 棋盘边长（行数 = 列数）
pub const BOARD_SIZE: usize = 13;

/// 格子总数
pub const SQUARE_COUNT: usize = BOARD_SIZE * BOARD_SIZE;

/// 最大行/列下标
pub const MAX_COORD: u8 = (BOARD_SIZE - 1) as u8;

/// 河界所在行（双方都视为"已过河"）
pub const RIVER_ROW: u8 = 6;

/// 九宫格的列范围
pub const PALACE_COLS: std::ops::RangeInclusive<u8> = 5..=7;

/// 红方九宫格的行范围
pub const RED_PALACE_ROWS: std::ops::RangeInclusive<u8> = 0..=2;

/// 黑方九宫格的行范围
pub const BLACK_PALACE_ROWS: std::ops::RangeInclusive<u8> = 10..=12;

/// 红方兵的初始行（黑方为 `MAX_COORD - 3`）
pub const RED_SOLDIER_ROW: u8 = 3;

/// 终局分值（胜 +，负 -）
pub const WIN_SCORE: i32 = 10000;

/// 默认无吃子和棋步数（半回合）
pub const DEFAULT_QUIET_PLY_LIMIT: u32 = 200;

/// 正交方向
pub const ORTHOGONAL: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// 斜向方向
pub const DIAGONAL: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// 八个方向
pub const ALL_DIRECTIONS: [(i8, i8); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

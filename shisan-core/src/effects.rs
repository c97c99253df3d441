//! 走子结算
//!
//! 普通吃子发生在落点；甲的夹吃和刺的同归于尽在走完之后结算，
//! 被吃的棋子可能不在落点上。

use serde::{Deserialize, Serialize};

use crate::board::{Board, BoardState};
use crate::constants::{ALL_DIRECTIONS, DIAGONAL, ORTHOGONAL};
use crate::piece::{Piece, PieceKind, Position, Side};

/// 一步棋造成的全部变化
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveEffects {
    /// 走动的棋子
    pub piece: Piece,
    pub from: Position,
    pub to: Position,
    /// 被移除的敌子及其所在位置
    pub captured: Vec<(Position, Piece)>,
    /// 走子方自身是否被移除（刺的同归于尽）
    pub mover_destroyed: bool,
}

impl MoveEffects {
    /// 是否吃子
    pub fn is_capture(&self) -> bool {
        !self.captured.is_empty()
    }

    /// 被吃棋子分值之和
    pub fn captured_value(&self) -> i32 {
        self.captured.iter().map(|(_, p)| p.value()).sum()
    }

    /// 是否吃掉了帅/将
    pub fn captured_general(&self) -> bool {
        self.captured.iter().any(|(_, p)| p.kind == PieceKind::General)
    }
}

/// 甲走到 `at` 后形成的三连夹吃：返回被夹住的敌子位置
///
/// 只检查包含 `at` 的三格窗口。窗口三格都有子、其中两枚为 `side`、
/// 一枚为敌子、且没有盾时，敌子被吃。
pub fn armor_line_victims(board: &Board, at: Position, side: Side) -> Vec<Position> {
    let mut victims = Vec::new();

    for (dr, dc) in [(0i8, 1i8), (1, 0), (1, 1), (1, -1)] {
        for start in -2i8..=0 {
            let cells: Option<Vec<Position>> = (start..start + 3)
                .map(|i| at.offset(dr * i, dc * i))
                .collect();
            let Some(cells) = cells else {
                continue;
            };
            let pieces: Option<Vec<(Position, Piece)>> = cells
                .iter()
                .map(|&c| board.get(c).map(|p| (c, p)))
                .collect();
            let Some(pieces) = pieces else {
                continue;
            };

            if pieces.iter().any(|(_, p)| p.kind == PieceKind::Shield) {
                continue;
            }

            let allies = pieces.iter().filter(|(_, p)| p.side == side).count();
            if allies != 2 {
                continue;
            }
            if let Some(&(victim, _)) = pieces.iter().find(|(_, p)| p.side != side) {
                if !victims.contains(&victim) {
                    victims.push(victim);
                }
            }
        }
    }

    victims
}

/// 刺从 `from` 沿 `dir` 离开时，身后一格的敌子位置
///
/// 身后敌子是盾，或者刺的八邻域里有敌方盾时不结算
pub fn spike_exchange_victim(
    board: &Board,
    from: Position,
    side: Side,
    dir: (i8, i8),
) -> Option<Position> {
    let behind = from.offset(-dir.0, -dir.1)?;
    let target = board.get(behind)?;
    if target.side == side || !target.kind.is_capturable() {
        return None;
    }

    let shielded = ALL_DIRECTIONS.iter().any(|&(dr, dc)| {
        from.offset(dr, dc)
            .and_then(|p| board.get(p))
            .is_some_and(|p| p.kind == PieceKind::Shield && p.side != side)
    });
    if shielded {
        return None;
    }

    Some(behind)
}

/// 单位方向；起点终点不在同一直线或斜线上时返回 None
fn unit_direction(from: Position, to: Position) -> Option<(i8, i8)> {
    let dr = to.row as i8 - from.row as i8;
    let dc = to.col as i8 - from.col as i8;
    let dir = (dr.signum(), dc.signum());
    if dir == (0, 0) {
        return None;
    }
    let straight = ORTHOGONAL.contains(&dir) && (dr == 0 || dc == 0);
    let diagonal = DIAGONAL.contains(&dir) && dr.abs() == dc.abs();
    (straight || diagonal).then_some(dir)
}

/// 在棋盘上执行一步棋并结算全部效果（不检查规则）
///
/// `from` 没有棋子时返回 None，棋盘不变
pub fn apply_move(board: &mut Board, from: Position, to: Position) -> Option<MoveEffects> {
    let piece = board.get(from)?;

    // 刺的同归于尽看的是出发前身后的格子
    let spike_victim = match piece.kind {
        PieceKind::Spike => unit_direction(from, to)
            .and_then(|dir| spike_exchange_victim(board, from, piece.side, dir)),
        _ => None,
    };

    let mut captured = Vec::new();
    if let Some(target) = board.move_piece(from, to) {
        captured.push((to, target));
    }

    if piece.kind == PieceKind::Armor {
        for victim in armor_line_victims(board, to, piece.side) {
            if let Some(removed) = board.remove(victim) {
                captured.push((victim, removed));
            }
        }
    }

    let mut mover_destroyed = false;
    if let Some(victim) = spike_victim {
        if let Some(removed) = board.remove(victim) {
            captured.push((victim, removed));
            board.remove(to);
            mover_destroyed = true;
        }
    }

    Some(MoveEffects {
        piece,
        from,
        to,
        captured,
        mover_destroyed,
    })
}

/// 在完整状态上走一步：结算效果、更新无吃子计数、切换走子方
pub fn play(state: &mut BoardState, from: Position, to: Position) -> Option<MoveEffects> {
    let effects = apply_move(&mut state.board, from, to)?;
    if effects.is_capture() {
        state.quiet_plies = 0;
    } else {
        state.quiet_plies += 1;
    }
    state.switch_turn();
    Some(effects)
}

/// 撤销 [`apply_move`]：把棋子放回原处并恢复所有被吃的棋子
pub fn revert_move(board: &mut Board, effects: &MoveEffects) {
    board.set(effects.to, None);
    board.set(effects.from, Some(effects.piece));
    for &(pos, piece) in &effects.captured {
        board.set(pos, Some(piece));
    }
}

//! 棋局评估函数

use shisan_core::{
    Board, BoardState, MoveGenerator, Piece, PieceKind, Position, Rules, Side, ALL_DIRECTIONS,
    BOARD_SIZE, DIAGONAL, ORTHOGONAL,
};

/// 评估器
pub struct Evaluator;

/// 中心区域加分
const CENTER_BONUS: i32 = 8;
/// 被将军扣分
const IN_CHECK_PENALTY: i32 = 50;
/// 帅/将在本方九宫内加分
const PALACE_SAFETY_BONUS: i32 = 30;
/// 相/象过河加分
const ELEPHANT_CROSSED_BONUS: i32 = 25;
/// 砲台每个可吃的孤子加分
const BOMBARD_TARGET_BONUS: i32 = 15;
/// 卫每冻结一个敌子加分
const GUARD_FREEZE_BONUS: i32 = 10;
/// 甲每个相邻的己方甲加分
const ARMOR_PAIR_BONUS: i32 = 12;
/// 每个伪合法走法的机动性加分
const MOBILITY_WEIGHT: i32 = 2;

/// 棋子位置分值表（本方视角，行号为相对行，黑方需要镜像）
/// 索引为 relative_row * 13 + col，左右对称
mod position_tables {
    /// 兵的位置分值
    #[rustfmt::skip]
    pub const SOLDIER: [i32; 169] = [
        0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,
        0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,
        0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,
        0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,
        2,  2,  4,  4,  6,  6,  8,  6,  6,  4,  4,  2,  2,
        4,  6,  8, 10, 12, 14, 14, 14, 12, 10,  8,  6,  4,
       10, 15, 20, 25, 30, 35, 40, 35, 30, 25, 20, 15, 10,  // 河界，可以横走
       20, 30, 40, 50, 60, 65, 70, 65, 60, 50, 40, 30, 20,
       30, 40, 55, 70, 80, 90, 95, 90, 80, 70, 55, 40, 30,
       40, 50, 65, 80, 95,105,110,105, 95, 80, 65, 50, 40,
       40, 55, 70, 90,105,115,120,115,105, 90, 70, 55, 40,
       30, 45, 60, 80, 95,105,110,105, 95, 80, 60, 45, 30,
       10, 20, 30, 40, 50, 60, 60, 60, 50, 40, 30, 20, 10,  // 底线
    ];

    /// 马的位置分值
    #[rustfmt::skip]
    pub const HORSE: [i32; 169] = [
        0,  5, 10, 15, 20, 20, 20, 20, 20, 15, 10,  5,  0,
        5, 15, 20, 25, 30, 30, 30, 30, 30, 25, 20, 15,  5,
       10, 20, 30, 35, 40, 40, 40, 40, 40, 35, 30, 20, 10,
       15, 25, 35, 45, 50, 50, 50, 50, 50, 45, 35, 25, 15,
       20, 30, 40, 50, 60, 60, 60, 60, 60, 50, 40, 30, 20,
       20, 35, 45, 55, 65, 70, 70, 70, 65, 55, 45, 35, 20,
       25, 40, 50, 60, 70, 75, 75, 75, 70, 60, 50, 40, 25,
       25, 40, 55, 65, 75, 80, 80, 80, 75, 65, 55, 40, 25,
       25, 40, 55, 65, 75, 85, 85, 85, 75, 65, 55, 40, 25,
       20, 35, 50, 60, 70, 80, 85, 80, 70, 60, 50, 35, 20,
       15, 30, 40, 50, 60, 70, 75, 70, 60, 50, 40, 30, 15,
       10, 20, 30, 40, 50, 55, 60, 55, 50, 40, 30, 20, 10,
        0, 10, 20, 25, 30, 35, 40, 35, 30, 25, 20, 10,  0,
    ];

    /// 车的位置分值
    #[rustfmt::skip]
    pub const CHARIOT: [i32; 169] = [
       10, 15, 15, 20, 25, 25, 25, 25, 25, 20, 15, 15, 10,
       15, 20, 25, 30, 35, 35, 35, 35, 35, 30, 25, 20, 15,
       15, 20, 25, 30, 35, 35, 35, 35, 35, 30, 25, 20, 15,
       20, 30, 35, 40, 45, 45, 45, 45, 45, 40, 35, 30, 20,
       25, 35, 40, 45, 50, 55, 55, 55, 50, 45, 40, 35, 25,
       30, 40, 45, 50, 55, 60, 60, 60, 55, 50, 45, 40, 30,
       35, 45, 50, 55, 60, 65, 65, 65, 60, 55, 50, 45, 35,
       35, 45, 55, 60, 65, 70, 70, 70, 65, 60, 55, 45, 35,
       35, 45, 55, 60, 65, 70, 75, 70, 65, 60, 55, 45, 35,
       30, 45, 55, 60, 70, 75, 80, 75, 70, 60, 55, 45, 30,
       30, 40, 50, 60, 70, 75, 80, 75, 70, 60, 50, 40, 30,
       30, 40, 50, 60, 70, 80, 85, 80, 70, 60, 50, 40, 30,
       20, 30, 40, 50, 60, 70, 70, 70, 60, 50, 40, 30, 20,
    ];

    /// 炮的位置分值
    #[rustfmt::skip]
    pub const CANNON: [i32; 169] = [
       10, 10, 10, 15, 20, 25, 30, 25, 20, 15, 10, 10, 10,
       10, 15, 20, 25, 30, 30, 30, 30, 30, 25, 20, 15, 10,
       10, 20, 25, 30, 35, 40, 40, 40, 35, 30, 25, 20, 10,
       10, 20, 30, 35, 40, 45, 50, 45, 40, 35, 30, 20, 10,
       10, 25, 35, 40, 45, 50, 55, 50, 45, 40, 35, 25, 10,
       10, 25, 35, 45, 50, 55, 60, 55, 50, 45, 35, 25, 10,
       10, 25, 35, 45, 50, 55, 60, 55, 50, 45, 35, 25, 10,
       10, 25, 35, 40, 45, 50, 55, 50, 45, 40, 35, 25, 10,
       10, 20, 30, 35, 40, 45, 50, 45, 40, 35, 30, 20, 10,
       10, 20, 25, 30, 35, 40, 45, 40, 35, 30, 25, 20, 10,
       10, 15, 20, 25, 30, 40, 45, 40, 30, 25, 20, 15, 10,
       10, 15, 20, 25, 30, 35, 40, 35, 30, 25, 20, 15, 10,
       10, 10, 10, 15, 20, 25, 30, 25, 20, 15, 10, 10, 10,
    ];
}

impl Evaluator {
    /// 评估局面（当前走子方视角，正值对走子方有利）
    ///
    /// `with_mobility` 为 true 时计入双方伪合法走法数
    pub fn evaluate(state: &BoardState, rules: &Rules, with_mobility: bool) -> i32 {
        let side = state.current_turn;
        Self::side_score(&state.board, side, rules, with_mobility)
            - Self::side_score(&state.board, side.opponent(), rules, with_mobility)
    }

    /// 某一方的总分
    pub fn side_score(board: &Board, side: Side, rules: &Rules, with_mobility: bool) -> i32 {
        let mut score = 0;

        for (pos, piece) in board.pieces(side) {
            score += piece.value() + Self::position_value(pos, piece);
            score += Self::special_bonus(board, pos, piece, rules);

            if piece.kind != PieceKind::General && Self::is_center(pos) {
                score += CENTER_BONUS;
            }
        }

        if let Some(general) = board.find_general(side) {
            if general.is_in_palace(side) {
                score += PALACE_SAFETY_BONUS;
            }
        }

        if rules.is_in_check(board, side) {
            score -= IN_CHECK_PENALTY;
        }

        if with_mobility {
            score += rules.pseudo_legal_moves(board, side).len() as i32 * MOBILITY_WEIGHT;
        }

        score
    }

    /// 棋子在某格的位置分
    pub fn position_value(pos: Position, piece: Piece) -> i32 {
        let index = pos.relative_row(piece.side) as usize * BOARD_SIZE + pos.col as usize;
        let advance = pos.relative_row(piece.side) as i32;
        let centrality = 6 - (pos.col as i32 - 6).abs();

        match piece.kind {
            PieceKind::Soldier => position_tables::SOLDIER[index],
            PieceKind::Horse => position_tables::HORSE[index],
            PieceKind::Chariot => position_tables::CHARIOT[index],
            PieceKind::Cannon => position_tables::CANNON[index],
            PieceKind::Archer | PieceKind::Spike => advance.min(8) * 3 + centrality,
            PieceKind::Bombard => centrality * 4 + advance.min(6) * 2,
            PieceKind::Armor => advance.min(7) * 2,
            // 卫和盾留在本方半场
            PieceKind::Guard | PieceKind::Shield => {
                if pos.is_own_half(piece.side) {
                    10
                } else {
                    0
                }
            }
            PieceKind::General | PieceKind::Advisor | PieceKind::Elephant => 0,
        }
    }

    /// 棋子类型相关的特殊加分
    fn special_bonus(board: &Board, pos: Position, piece: Piece, rules: &Rules) -> i32 {
        match piece.kind {
            PieceKind::Elephant if pos.has_crossed_river(piece.side) => ELEPHANT_CROSSED_BONUS,
            PieceKind::Bombard => {
                Self::bombard_targets(board, pos, piece.side) as i32 * BOMBARD_TARGET_BONUS
            }
            PieceKind::Guard => {
                let diagonal: &[(i8, i8)] = if rules.config().guard_faces_diagonally {
                    &DIAGONAL
                } else {
                    &[]
                };
                let frozen = ORTHOGONAL
                    .iter()
                    .chain(diagonal)
                    .filter(|&&dir| {
                        matches!(
                            board.first_piece_along(pos, dir),
                            Some((_, p)) if p.side != piece.side
                        )
                    })
                    .count() as i32;
                frozen * GUARD_FREEZE_BONUS
            }
            PieceKind::Armor => {
                let pairs = ORTHOGONAL
                    .iter()
                    .filter_map(|&(dr, dc)| pos.offset(dr, dc))
                    .filter_map(|p| board.get(p))
                    .filter(|p| p.kind == PieceKind::Armor && p.side == piece.side)
                    .count() as i32;
                pairs * ARMOR_PAIR_BONUS
            }
            _ => 0,
        }
    }

    fn is_center(pos: Position) -> bool {
        (4..=8).contains(&pos.row) && (4..=8).contains(&pos.col)
    }

    /// 砲台可以吃掉的孤子数量
    pub fn bombard_targets(board: &Board, pos: Position, side: Side) -> usize {
        ALL_DIRECTIONS
            .iter()
            .filter_map(|&(dr, dc)| pos.offset(dr, dc))
            .filter(|&adj| {
                board.get(adj).is_some_and(|p| {
                    p.side != side
                        && p.kind.is_capturable()
                        && MoveGenerator::is_isolated(board, adj, p.side)
                })
            })
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn pos(row: u8, col: u8) -> Position {
        Position::new_unchecked(row, col)
    }

    fn with_generals() -> Board {
        let mut board = Board::empty();
        board.place(pos(0, 6), PieceKind::General, Side::Red);
        board.place(pos(12, 6), PieceKind::General, Side::Black);
        board.place(pos(11, 6), PieceKind::Shield, Side::Black);
        board
    }

    #[test]
    fn test_initial_evaluation() {
        let rules = Rules::default();
        let state = BoardState::initial();
        // 初始局面对称，分数为 0
        assert_eq!(Evaluator::evaluate(&state, &rules, true), 0);
    }

    #[test]
    fn test_tables_symmetric() {
        for table in [
            &position_tables::SOLDIER,
            &position_tables::HORSE,
            &position_tables::CHARIOT,
            &position_tables::CANNON,
        ] {
            for row in 0..BOARD_SIZE {
                for col in 0..BOARD_SIZE {
                    assert_eq!(
                        table[row * BOARD_SIZE + col],
                        table[row * BOARD_SIZE + (BOARD_SIZE - 1 - col)],
                        "位置表应左右对称"
                    );
                }
            }
        }
    }

    #[test]
    fn test_anti_symmetric() {
        let rules = Rules::default();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut state = BoardState::initial();

        for _ in 0..20 {
            let moves = rules.legal_moves(&state);
            let Some(&mv) = moves.choose(&mut rng) else {
                break;
            };
            rules.play(&mut state, mv).unwrap();

            let mut flipped = state.clone();
            flipped.switch_turn();
            for mobility in [false, true] {
                assert_eq!(
                    Evaluator::evaluate(&state, &rules, mobility),
                    -Evaluator::evaluate(&flipped, &rules, mobility),
                    "评估应为零和"
                );
            }
        }
    }

    #[test]
    fn test_material_advantage() {
        let rules = Rules::default();
        let mut board = with_generals();
        board.place(pos(4, 0), PieceKind::Chariot, Side::Red);
        let state = BoardState::from_board(board, Side::Red);

        assert!(Evaluator::evaluate(&state, &rules, false) > 500, "多一车应该大幅领先");
    }

    #[test]
    fn test_crossed_soldier_worth_more() {
        let rules = Rules::default();
        let mut crossed = with_generals();
        crossed.place(pos(8, 4), PieceKind::Soldier, Side::Red);
        let mut home = with_generals();
        home.place(pos(3, 4), PieceKind::Soldier, Side::Red);

        let a = Evaluator::side_score(&crossed, Side::Red, &rules, false);
        let b = Evaluator::side_score(&home, Side::Red, &rules, false);
        assert!(a > b, "过河兵应该比未过河兵价值高: {} vs {}", a, b);
    }

    #[test]
    fn test_center_horse_worth_more() {
        let center = Piece::new(0, PieceKind::Horse, Side::Red);
        let middle = Evaluator::position_value(pos(6, 6), center);
        let corner = Evaluator::position_value(pos(0, 0), center);
        assert!(middle > corner);
    }

    #[test]
    fn test_black_mirror() {
        let red = Piece::new(0, PieceKind::Cannon, Side::Red);
        let black = Piece::new(1, PieceKind::Cannon, Side::Black);
        assert_eq!(
            Evaluator::position_value(pos(3, 2), red),
            Evaluator::position_value(pos(9, 2), black)
        );
    }

    #[test]
    fn test_bombard_bonus() {
        let rules = Rules::default();
        let mut near = Board::empty();
        near.place(pos(6, 6), PieceKind::Bombard, Side::Red);
        near.place(pos(7, 6), PieceKind::Soldier, Side::Black);
        let mut far = Board::empty();
        far.place(pos(6, 6), PieceKind::Bombard, Side::Red);
        far.place(pos(9, 6), PieceKind::Soldier, Side::Black);

        assert_eq!(Evaluator::bombard_targets(&near, pos(6, 6), Side::Red), 1);
        assert_eq!(
            Evaluator::side_score(&near, Side::Red, &rules, false)
                - Evaluator::side_score(&far, Side::Red, &rules, false),
            BOMBARD_TARGET_BONUS
        );
    }

    #[test]
    fn test_guard_bonus() {
        let rules = Rules::default();
        let mut facing = Board::empty();
        facing.place(pos(4, 6), PieceKind::Guard, Side::Red);
        facing.place(pos(4, 10), PieceKind::Chariot, Side::Black);
        let mut blocked = facing.clone();
        blocked.place(pos(4, 8), PieceKind::Soldier, Side::Black);

        // 挡住后卫面对的是卒，仍然冻结一个敌子
        assert_eq!(
            Evaluator::side_score(&facing, Side::Red, &rules, false),
            Evaluator::side_score(&blocked, Side::Red, &rules, false)
        );

        let mut alone = Board::empty();
        alone.place(pos(4, 6), PieceKind::Guard, Side::Red);
        assert_eq!(
            Evaluator::side_score(&facing, Side::Red, &rules, false)
                - Evaluator::side_score(&alone, Side::Red, &rules, false),
            GUARD_FREEZE_BONUS
        );
    }

    #[test]
    fn test_check_penalty() {
        let rules = Rules::default();
        let mut board = with_generals();
        board.place(pos(5, 0), PieceKind::Chariot, Side::Black);
        let quiet = Evaluator::side_score(&board, Side::Red, &rules, false);

        board.remove(pos(5, 0));
        board.place(pos(5, 6), PieceKind::Chariot, Side::Black);
        let checked = Evaluator::side_score(&board, Side::Red, &rules, false);
        assert_eq!(quiet - checked, IN_CHECK_PENALTY);
    }
}

//! 规则开关
//!
//! 以不可变值的形式传入规则引擎，不使用全局可变状态

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_QUIET_PLY_LIMIT;
use crate::error::ConfigError;

/// 规则配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    /// 帅在本方九宫内可斜走
    pub general_diagonal_in_palace: bool,
    /// 帅在九宫外仍可斜走
    pub general_diagonal_outside_palace: bool,
    /// 仕可以走出九宫（出宫后增加直走一步）
    pub advisor_leaves_palace: bool,
    /// 马可以直跳三格
    pub horse_straight_jump: bool,
    /// 卫的照面冻结也作用于斜线
    pub guard_faces_diagonally: bool,
    /// 连续无吃子达到该半回合数判和；None 表示不限
    pub draw_after_quiet_plies: Option<u32>,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            general_diagonal_in_palace: true,
            general_diagonal_outside_palace: false,
            advisor_leaves_palace: true,
            horse_straight_jump: true,
            guard_faces_diagonally: false,
            draw_after_quiet_plies: Some(DEFAULT_QUIET_PLY_LIMIT),
        }
    }
}

impl RuleConfig {
    /// 从 JSON 字符串解析（缺省字段取默认值）
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// 从文件加载
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// 序列化为 JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = RuleConfig::from_json(r#"{ "horse_straight_jump": false }"#).unwrap();
        assert!(!config.horse_straight_jump);
        assert!(config.general_diagonal_in_palace);
        assert_eq!(config.draw_after_quiet_plies, Some(DEFAULT_QUIET_PLY_LIMIT));
    }

    #[test]
    fn test_invalid_json() {
        let err = RuleConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "draw_after_quiet_plies": null, "guard_faces_diagonally": true }}"#)
            .unwrap();

        let config = RuleConfig::load(file.path()).unwrap();
        assert_eq!(config.draw_after_quiet_plies, None);
        assert!(config.guard_faces_diagonally);
    }

    #[test]
    fn test_load_missing_file() {
        let err = RuleConfig::load("/nonexistent/shisan/rules.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_json_roundtrip_default() {
        let json = RuleConfig::default().to_json().unwrap();
        assert_eq!(RuleConfig::from_json(&json).unwrap(), RuleConfig::default());
    }
}

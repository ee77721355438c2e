// ==========================================
// 外贸统计导入管道 - 领域类型
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// TradeDirection - 贸易方向
// ==========================================
// 用途: 进出口事实表共用一个构建器，以方向参数区分
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeDirection {
    Export, // 出口：对方国家为目的国
    Import, // 进口：对方国家为原产国，额外有 CIF
}

impl TradeDirection {
    pub fn is_import(&self) -> bool {
        matches!(self, TradeDirection::Import)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TradeDirection::Export => "export",
            TradeDirection::Import => "import",
        }
    }
}

impl fmt::Display for TradeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 产品编码标准长度（10 位税则号）
pub const PRODUCT_CODE_LEN: usize = 10;

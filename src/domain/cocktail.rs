// ==========================================
// 酒吧库存分析 - 鸡尾酒目录领域模型
// ==========================================
// 对齐: cocktails 表
// 说明: str_glass 用于把饮品映射到所消耗的杯具类型
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// CocktailRecord - 鸡尾酒参考目录
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CocktailRecord {
    #[serde(rename = "idDrink")]
    pub id_drink: i64,
    #[serde(rename = "strDrink")]
    pub str_drink: String,
    #[serde(rename = "strCategory")]
    pub str_category: Option<String>,
    #[serde(rename = "strIBA")]
    pub str_iba: Option<String>,
    #[serde(rename = "strAlcoholic")]
    pub str_alcoholic: Option<String>,
    #[serde(rename = "strGlass")]
    pub str_glass: Option<String>,
    #[serde(rename = "dateModified")]
    pub date_modified: Option<NaiveDateTime>,
}

impl CocktailRecord {
    /// 仅含名称与杯具的最小记录
    pub fn new(id_drink: i64, str_drink: impl Into<String>, str_glass: Option<&str>) -> Self {
        Self {
            id_drink,
            str_drink: str_drink.into(),
            str_category: None,
            str_iba: None,
            str_alcoholic: None,
            str_glass: str_glass.map(str::to_string),
            date_modified: None,
        }
    }

    /// 除 date_modified 以外字段相同视为同一条目录（去重口径）
    pub fn same_identity(&self, other: &CocktailRecord) -> bool {
        self.id_drink == other.id_drink
            && self.str_drink == other.str_drink
            && self.str_category == other.str_category
            && self.str_iba == other.str_iba
            && self.str_alcoholic == other.str_alcoholic
            && self.str_glass == other.str_glass
    }
}

//! 平台配置与统计模型
//!
//! 平台目录是费率与成色兼容规则的唯一配置来源，
//! 各服务通过注入目录取得配置，不得各自复制平台表

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::phone::Condition;

/// 平台手续费模型
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "fee_type", rename_all = "snake_case")]
pub enum FeeModel {
    /// 纯比例费：price = base * (1 + rate)
    Percentage { rate: f64 },
    /// 比例费加固定费：price = base * (1 + rate) + fixed
    PercentagePlusFixed { rate: f64, fixed: f64 },
}

/// 单个平台的配置
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    /// 平台标识（如 "X"）
    pub id: String,
    /// 平台展示名
    pub name: String,
    /// 手续费模型
    pub fee_model: FeeModel,
    /// 本平台支持的成色及其平台侧叫法；不在表中的成色不能挂牌
    pub condition_labels: HashMap<Condition, String>,
}

impl PlatformConfig {
    /// 成色在该平台的叫法，不支持时返回 None
    pub fn listing_condition(&self, condition: Condition) -> Option<&str> {
        self.condition_labels.get(&condition).map(|s| s.as_str())
    }

    /// 该平台是否接受此成色
    pub fn supports(&self, condition: Condition) -> bool {
        self.condition_labels.contains_key(&condition)
    }

    /// 费率结构描述，如 "10%"、"8% + $2"
    pub fn fee_description(&self) -> String {
        match self.fee_model {
            FeeModel::Percentage { rate } => format!("{}%", (rate * 1000.0).round() / 10.0),
            FeeModel::PercentagePlusFixed { rate, fixed } => {
                format!("{}% + ${}", (rate * 1000.0).round() / 10.0, fixed)
            }
        }
    }
}

/// 平台目录
///
/// 持有全部平台配置，遍历顺序即固定平台顺序 [X, Y, Z]，
/// 最优平台选择按此顺序破平
#[derive(Debug, Clone)]
pub struct PlatformCatalog {
    platforms: Vec<PlatformConfig>,
}

impl PlatformCatalog {
    /// 内置的三平台配置
    pub fn standard() -> Self {
        let x = PlatformConfig {
            id: "X".to_string(),
            name: "Platform X".to_string(),
            fee_model: FeeModel::Percentage { rate: 0.10 },
            condition_labels: [
                (Condition::New, "New"),
                (Condition::Excellent, "Good"),
                (Condition::Good, "Good"),
                (Condition::Fair, "Good"),
                (Condition::Poor, "Scrap"),
            ]
            .into_iter()
            .map(|(c, label)| (c, label.to_string()))
            .collect(),
        };

        let y = PlatformConfig {
            id: "Y".to_string(),
            name: "Platform Y".to_string(),
            fee_model: FeeModel::PercentagePlusFixed { rate: 0.08, fixed: 2.0 },
            condition_labels: [
                (Condition::New, "3 stars (Excellent)"),
                (Condition::Excellent, "3 stars (Excellent)"),
                (Condition::Good, "2 stars (Good)"),
                (Condition::Fair, "1 star (Usable)"),
                (Condition::Poor, "1 star (Usable)"),
            ]
            .into_iter()
            .map(|(c, label)| (c, label.to_string()))
            .collect(),
        };

        // Z 不收 Poor 成色
        let z = PlatformConfig {
            id: "Z".to_string(),
            name: "Platform Z".to_string(),
            fee_model: FeeModel::Percentage { rate: 0.12 },
            condition_labels: [
                (Condition::New, "New"),
                (Condition::Excellent, "As New"),
                (Condition::Good, "Good"),
                (Condition::Fair, "Good"),
            ]
            .into_iter()
            .map(|(c, label)| (c, label.to_string()))
            .collect(),
        };

        Self { platforms: vec![x, y, z] }
    }

    /// 按标识查找平台配置
    pub fn get(&self, id: &str) -> Option<&PlatformConfig> {
        self.platforms.iter().find(|p| p.id == id)
    }

    /// 按固定顺序遍历平台
    pub fn iter(&self) -> impl Iterator<Item = &PlatformConfig> {
        self.platforms.iter()
    }
}

/// 平台汇总统计
#[derive(Debug, Serialize)]
pub struct PlatformSummary {
    /// 平台展示名
    pub name: String,
    /// 库存总数
    pub total_phones: usize,
    /// 已挂牌数量
    pub listed_phones: usize,
    /// 已挂牌记录的平均挂牌价
    pub avg_price: f64,
    /// 费率结构描述
    pub fee_structure: String,
}

/// 单台手机在单个平台上的收益测算
#[derive(Debug, Serialize)]
pub struct PlatformProfit {
    /// 平台挂牌价
    pub price: f64,
    /// 利润（挂牌价减底价）
    pub profit: f64,
    /// 利润率（百分比）
    pub profit_margin: f64,
    /// 是否已挂牌
    pub listed: bool,
    /// 利润率是否达到最低要求
    pub profitable: bool,
}

/// 收益分析条目：一台手机的全平台测算
#[derive(Debug, Serialize)]
pub struct PhoneProfitability {
    pub id: u64,
    pub model_name: String,
    pub brand: String,
    pub base_price: f64,
    pub condition: Condition,
    /// 平台标识 -> 收益测算
    pub platforms: BTreeMap<String, PlatformProfit>,
}

/// 指定平台挂牌的请求体
#[derive(Debug, Deserialize)]
pub struct ListPhoneRequest {
    /// 手机记录编号
    pub phone_id: u64,
    /// 目标平台标识
    pub platform: String,
}

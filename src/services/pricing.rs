//! 平台定价与收益评估
//!
//! 纯函数实现：挂牌价、利润率、可挂牌判定与最优平台选择，
//! 不做任何 IO，平台配置由调用方注入

use std::collections::BTreeMap;

use crate::models::{
    FeeModel, Phone, PhoneProfitability, PlatformCatalog, PlatformConfig, PlatformProfit,
};

/// 金额归整到分
pub(crate) fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// 按平台费率计算挂牌价
pub fn platform_price(base_price: f64, config: &PlatformConfig) -> f64 {
    let price = match config.fee_model {
        FeeModel::Percentage { rate } => base_price * (1.0 + rate),
        FeeModel::PercentagePlusFixed { rate, fixed } => base_price * (1.0 + rate) + fixed,
    };
    round_cents(price)
}

/// 目录级查价：未知平台按原价返回，不视为错误
#[allow(dead_code)]
pub fn platform_price_by_id(base_price: f64, catalog: &PlatformCatalog, platform_id: &str) -> f64 {
    match catalog.get(platform_id) {
        Some(config) => platform_price(base_price, config),
        None => base_price,
    }
}

/// 利润率：利润除以底价，底价非正时记 0
pub fn profit_margin(base_price: f64, price: f64) -> f64 {
    if base_price > 0.0 {
        (price - base_price) / base_price
    } else {
        0.0
    }
}

/// 挂牌是否满足最低利润率
pub fn is_profitable(base_price: f64, config: &PlatformConfig, min_margin: f64) -> bool {
    let price = platform_price(base_price, config);
    profit_margin(base_price, price) >= min_margin
}

/// 是否可在该平台挂牌：成色兼容、利润达标、有库存，三者缺一不可
pub fn can_list(phone: &Phone, config: &PlatformConfig, min_margin: f64) -> bool {
    config.supports(phone.condition)
        && is_profitable(phone.base_price, config, min_margin)
        && phone.stock_quantity > 0
}

/// 在可挂牌平台中选利润最高者
///
/// 利润严格更高才替换，利润相同时保留目录顺序靠前的平台；
/// 没有任何平台满足条件时返回 None
pub fn best_platform<'a>(
    phone: &Phone,
    catalog: &'a PlatformCatalog,
    min_margin: f64,
) -> Option<&'a PlatformConfig> {
    let mut best: Option<(&PlatformConfig, f64)> = None;

    for config in catalog.iter() {
        if !can_list(phone, config, min_margin) {
            continue;
        }
        let profit = platform_price(phone.base_price, config) - phone.base_price;
        match best {
            Some((_, best_profit)) if profit <= best_profit => {}
            _ => best = Some((config, profit)),
        }
    }

    best.map(|(config, _)| config)
}

/// 生成单台手机的全平台收益测算
pub fn phone_profitability(
    phone: &Phone,
    catalog: &PlatformCatalog,
    min_margin: f64,
) -> PhoneProfitability {
    let mut platforms = BTreeMap::new();

    for config in catalog.iter() {
        let price = platform_price(phone.base_price, config);
        let profit = round_cents(price - phone.base_price);
        let margin = profit_margin(phone.base_price, price);
        let listed = phone
            .platforms
            .get(&config.id)
            .map(|listing| listing.listed)
            .unwrap_or(false);

        platforms.insert(
            config.id.clone(),
            PlatformProfit {
                price,
                profit,
                profit_margin: margin * 100.0,
                listed,
                profitable: margin >= min_margin,
            },
        );
    }

    PhoneProfitability {
        id: phone.id,
        model_name: phone.model_name.clone(),
        brand: phone.brand.clone(),
        base_price: phone.base_price,
        condition: phone.condition,
        platforms,
    }
}

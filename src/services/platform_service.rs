//! 平台运营服务
//!
//! 汇总统计、单台/批量挂牌、价格刷新与收益分析。
//! 挂牌判定全部走 pricing 评估器，本模块只负责编排与落账

use anyhow::Result;
use std::collections::BTreeMap;

use crate::models::{PhoneProfitability, PlatformCatalog, PlatformSummary};
use crate::services::inventory_service::PhoneStore;
use crate::services::pricing;

/// 挂牌操作结果
#[derive(Debug, PartialEq, Eq)]
pub enum ListOutcome {
    /// 已挂牌到指定平台
    Listed {
        platform_id: String,
        platform_name: String,
    },
    /// 手机不存在
    PhoneNotFound,
    /// 平台不存在
    UnknownPlatform,
    /// 不满足挂牌条件（成色不兼容、利润不足或无库存）
    NotListable,
}

/// 各平台汇总统计：库存总数、挂牌数量、已挂牌均价与费率描述
pub fn platform_summary(
    store: &PhoneStore,
    catalog: &PlatformCatalog,
) -> Result<BTreeMap<String, PlatformSummary>> {
    let phones = store.all()?;
    let mut summary = BTreeMap::new();

    for config in catalog.iter() {
        let mut listed = 0usize;
        let mut price_sum = 0.0;

        for phone in &phones {
            if let Some(listing) = phone.platforms.get(&config.id) {
                if listing.listed {
                    listed += 1;
                    price_sum += listing.platform_price;
                }
            }
        }

        let avg_price = if listed > 0 {
            pricing::round_cents(price_sum / listed as f64)
        } else {
            0.0
        };

        summary.insert(
            config.id.clone(),
            PlatformSummary {
                name: config.name.clone(),
                total_phones: phones.len(),
                listed_phones: listed,
                avg_price,
                fee_structure: config.fee_description(),
            },
        );
    }

    Ok(summary)
}

/// 将一台手机挂牌到指定平台，先过评估器再落账
pub fn list_phone(
    store: &PhoneStore,
    catalog: &PlatformCatalog,
    min_margin: f64,
    phone_id: u64,
    platform_id: &str,
) -> Result<ListOutcome> {
    let config = match catalog.get(platform_id) {
        Some(config) => config,
        None => return Ok(ListOutcome::UnknownPlatform),
    };

    let phone = match store.get(phone_id)? {
        Some(phone) => phone,
        None => return Ok(ListOutcome::PhoneNotFound),
    };

    if !pricing::can_list(&phone, config, min_margin) {
        return Ok(ListOutcome::NotListable);
    }

    if !store.mark_listed(phone_id, platform_id)? {
        return Ok(ListOutcome::PhoneNotFound);
    }

    Ok(ListOutcome::Listed {
        platform_id: config.id.clone(),
        platform_name: config.name.clone(),
    })
}

/// 一键挂牌：在可挂牌平台中选利润最高者落账
pub fn quick_list(
    store: &PhoneStore,
    catalog: &PlatformCatalog,
    min_margin: f64,
    phone_id: u64,
) -> Result<ListOutcome> {
    let phone = match store.get(phone_id)? {
        Some(phone) => phone,
        None => return Ok(ListOutcome::PhoneNotFound),
    };

    let best = match pricing::best_platform(&phone, catalog, min_margin) {
        Some(config) => config,
        None => return Ok(ListOutcome::NotListable),
    };

    if !store.mark_listed(phone_id, &best.id)? {
        return Ok(ListOutcome::PhoneNotFound);
    }

    Ok(ListOutcome::Listed {
        platform_id: best.id.clone(),
        platform_name: best.name.clone(),
    })
}

/// 批量挂牌：把所有未挂牌且满足条件的手机挂到指定平台。
/// 平台不存在时返回 Ok(None)
pub fn bulk_list(
    store: &PhoneStore,
    catalog: &PlatformCatalog,
    min_margin: f64,
    platform_id: &str,
) -> Result<Option<usize>> {
    let config = match catalog.get(platform_id) {
        Some(config) => config,
        None => return Ok(None),
    };

    let mut listed = 0usize;
    for phone in store.all()? {
        let already_listed = phone
            .platforms
            .get(platform_id)
            .map(|listing| listing.listed)
            .unwrap_or(false);
        if already_listed {
            continue;
        }
        if !pricing::can_list(&phone, config, min_margin) {
            continue;
        }
        if store.mark_listed(phone.id, platform_id)? {
            listed += 1;
        }
    }

    log::info!("批量挂牌 {} 台到平台 {}", listed, platform_id);
    Ok(Some(listed))
}

/// 按当前底价刷新指定平台全部挂牌价。
/// 平台不存在时返回 Ok(None)
pub fn update_prices(
    store: &PhoneStore,
    catalog: &PlatformCatalog,
    platform_id: &str,
) -> Result<Option<usize>> {
    if catalog.get(platform_id).is_none() {
        return Ok(None);
    }
    let updated = store.refresh_platform_prices(platform_id, catalog)?;
    log::info!("刷新平台 {} 挂牌价 {} 条", platform_id, updated);
    Ok(Some(updated))
}

/// 全库存收益分析，按型号排序
pub fn profitability_analysis(
    store: &PhoneStore,
    catalog: &PlatformCatalog,
    min_margin: f64,
) -> Result<Vec<PhoneProfitability>> {
    let mut phones = store.all()?;
    phones.sort_by(|a, b| a.model_name.cmp(&b.model_name));

    Ok(phones
        .iter()
        .map(|phone| pricing::phone_profitability(phone, catalog, min_margin))
        .collect())
}

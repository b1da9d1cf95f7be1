//! 库存存取服务
//!
//! 进程内存储：启动时建立，互斥锁保护，不落盘。
//! 写操作完成后由调用方整表重新拉取，没有增量同步

use anyhow::{anyhow, Result};
use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::models::response::beijing_now;
use crate::models::{Phone, PhoneInput, PhoneQuery, PlatformCatalog, PlatformListing};
use crate::services::pricing;

/// 手机库存仓库
pub struct PhoneStore {
    inner: Mutex<StoreInner>,
}

struct StoreInner {
    phones: BTreeMap<u64, Phone>,
    next_id: u64,
}

impl PhoneStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(StoreInner {
                phones: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, StoreInner>> {
        self.inner.lock().map_err(|_| anyhow!("库存锁已损坏"))
    }

    /// 校验新增/更新请求
    fn validate(input: &PhoneInput) -> Result<()> {
        if input.model_name.trim().is_empty() {
            return Err(anyhow!("model_name is required"));
        }
        if input.brand.trim().is_empty() {
            return Err(anyhow!("brand is required"));
        }
        if !(input.base_price > 0.0) {
            return Err(anyhow!("base_price must be a positive number"));
        }
        Ok(())
    }

    /// 按目录为一台手机生成/刷新全平台挂牌记录，保留已有挂牌状态
    fn refresh_listings(phone: &mut Phone, catalog: &PlatformCatalog) {
        for config in catalog.iter() {
            let price = pricing::platform_price(phone.base_price, config);
            let label = config
                .listing_condition(phone.condition)
                .map(|s| s.to_string());

            let entry = phone
                .platforms
                .entry(config.id.clone())
                .or_insert_with(|| PlatformListing {
                    listed: false,
                    platform_price: price,
                    platform_condition: None,
                    listing_date: None,
                });
            entry.platform_price = price;
            entry.platform_condition = label;
        }
    }

    /// 新增一台手机，分配编号并生成各平台初始挂牌记录
    pub fn add(&self, input: &PhoneInput, catalog: &PlatformCatalog) -> Result<Phone> {
        Self::validate(input)?;

        let mut inner = self.lock()?;
        let id = inner.next_id;
        inner.next_id += 1;

        let mut phone = Phone {
            id,
            model_name: input.model_name.trim().to_string(),
            brand: input.brand.trim().to_string(),
            condition: input.condition,
            storage: input.storage.trim().to_string(),
            color: input.color.trim().to_string(),
            stock_quantity: input.stock_quantity,
            base_price: input.base_price,
            specifications: input.specifications.trim().to_string(),
            tags: input.tags.trim().to_string(),
            created_at: beijing_now(),
            platforms: BTreeMap::new(),
        };
        Self::refresh_listings(&mut phone, catalog);

        inner.phones.insert(id, phone.clone());
        Ok(phone)
    }

    /// 更新一台手机；重新计算各平台挂牌价与成色叫法，挂牌状态保留。
    /// 记录不存在时返回 Ok(None)
    pub fn update(
        &self,
        id: u64,
        input: &PhoneInput,
        catalog: &PlatformCatalog,
    ) -> Result<Option<Phone>> {
        Self::validate(input)?;

        let mut inner = self.lock()?;
        let phone = match inner.phones.get_mut(&id) {
            Some(phone) => phone,
            None => return Ok(None),
        };

        phone.model_name = input.model_name.trim().to_string();
        phone.brand = input.brand.trim().to_string();
        phone.condition = input.condition;
        phone.storage = input.storage.trim().to_string();
        phone.color = input.color.trim().to_string();
        phone.stock_quantity = input.stock_quantity;
        phone.base_price = input.base_price;
        phone.specifications = input.specifications.trim().to_string();
        phone.tags = input.tags.trim().to_string();
        Self::refresh_listings(phone, catalog);

        Ok(Some(phone.clone()))
    }

    /// 删除一台手机，返回是否存在
    pub fn remove(&self, id: u64) -> Result<bool> {
        let mut inner = self.lock()?;
        Ok(inner.phones.remove(&id).is_some())
    }

    /// 按编号取单条记录
    pub fn get(&self, id: u64) -> Result<Option<Phone>> {
        let inner = self.lock()?;
        Ok(inner.phones.get(&id).cloned())
    }

    /// 全量快照，按编号升序
    pub fn all(&self) -> Result<Vec<Phone>> {
        let inner = self.lock()?;
        Ok(inner.phones.values().cloned().collect())
    }

    /// 条件查询，新记录在前
    pub fn list(&self, query: &PhoneQuery) -> Result<Vec<Phone>> {
        let inner = self.lock()?;
        let mut phones: Vec<Phone> = inner.phones.values().cloned().collect();

        if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
            let needle = search.trim().to_lowercase();
            phones.retain(|phone| {
                phone.model_name.to_lowercase().contains(&needle)
                    || phone.brand.to_lowercase().contains(&needle)
            });
        }

        if let Some(condition) = query.condition {
            phones.retain(|phone| phone.condition == condition);
        }

        if let Some(platform) = query.platform.as_deref().filter(|s| !s.is_empty()) {
            phones.retain(|phone| {
                phone
                    .platforms
                    .get(platform)
                    .map(|listing| listing.listed)
                    .unwrap_or(false)
            });
        }

        phones.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(phones)
    }

    /// 标记已挂牌并记录挂牌时间。
    /// 手机或平台挂牌记录不存在时返回 Ok(false)
    pub fn mark_listed(&self, id: u64, platform_id: &str) -> Result<bool> {
        let mut inner = self.lock()?;
        let phone = match inner.phones.get_mut(&id) {
            Some(phone) => phone,
            None => return Ok(false),
        };
        match phone.platforms.get_mut(platform_id) {
            Some(listing) => {
                listing.listed = true;
                listing.listing_date = Some(beijing_now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// 按当前底价刷新指定平台的全部挂牌价，返回刷新条数
    pub fn refresh_platform_prices(
        &self,
        platform_id: &str,
        catalog: &PlatformCatalog,
    ) -> Result<usize> {
        let config = match catalog.get(platform_id) {
            Some(config) => config,
            None => return Ok(0),
        };

        let mut inner = self.lock()?;
        let mut updated = 0;
        for phone in inner.phones.values_mut() {
            let price = pricing::platform_price(phone.base_price, config);
            if let Some(listing) = phone.platforms.get_mut(platform_id) {
                listing.platform_price = price;
                updated += 1;
            }
        }
        Ok(updated)
    }
}

impl Default for PhoneStore {
    fn default() -> Self {
        Self::new()
    }
}

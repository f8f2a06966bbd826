use crate::database::PartnerRepository;
use crate::models::BankConfig;
use crate::{InquiryError, Result};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info};

/// In-memory partner configs keyed by bank code.
///
/// Populated only through [`BankConfigCache::reload`]. Lookups of unknown
/// codes fall back to the default bank code.
pub struct BankConfigCache {
    repository: Arc<dyn PartnerRepository>,
    default_bank_code: String,
    configs: RwLock<HashMap<String, Arc<BankConfig>>>,
}

impl BankConfigCache {
    pub fn new(repository: Arc<dyn PartnerRepository>, default_bank_code: impl Into<String>) -> Self {
        BankConfigCache {
            repository,
            default_bank_code: default_bank_code.into(),
            configs: RwLock::new(HashMap::new()),
        }
    }

    /// Replace the whole map with the current partner list
    pub async fn reload(&self) -> Result<usize> {
        let rows = self.repository.find_all_partner_configs().await.map_err(|e| {
            error!("Failed to load partner bank configs: {}", e);
            InquiryError::ConfigLoad(e.to_string())
        })?;

        let fresh: HashMap<String, Arc<BankConfig>> = rows
            .into_iter()
            .map(|cfg| (cfg.bank_code.clone(), Arc::new(cfg)))
            .collect();
        let count = fresh.len();

        *self.configs.write() = fresh;

        info!("Loaded {} partner bank configs", count);
        Ok(count)
    }

    /// Config for `bank_code`, or the default bank's config
    pub fn lookup(&self, bank_code: &str) -> Arc<BankConfig> {
        let configs = self.configs.read();

        if let Some(cfg) = configs.get(bank_code) {
            return Arc::clone(cfg);
        }

        match configs.get(&self.default_bank_code) {
            Some(cfg) => Arc::clone(cfg),
            None => {
                error!(
                    "No config for bank {} nor default bank {}",
                    bank_code, self.default_bank_code
                );
                Arc::new(BankConfig {
                    bank_code: self.default_bank_code.clone(),
                    ..BankConfig::default()
                })
            }
        }
    }

    pub fn default_bank_code(&self) -> &str {
        &self.default_bank_code
    }

    pub fn len(&self) -> usize {
        self.configs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.read().is_empty()
    }

    /// Loaded configs, sorted by bank code
    pub fn loaded(&self) -> Vec<Arc<BankConfig>> {
        let mut configs: Vec<_> = self.configs.read().values().cloned().collect();
        configs.sort_by(|a, b| a.bank_code.cmp(&b.bank_code));
        configs
    }
}

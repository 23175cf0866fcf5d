use std::sync::Arc;

use anyhow::{bail, Result};
use dashmap::DashMap;

use crate::{notify, Notifier, NotifierSetting};

pub type NotifierRegistry = DashMap<String, Arc<dyn Notifier>>;

pub fn config_notifiers(
    config: notify::Config,
    setting: &NotifierSetting,
) -> Result<NotifierRegistry> {
    let mut configured: Vec<Arc<dyn Notifier>> = vec![];
    for mut n in config.log {
        n.config(setting)?;
        configured.push(Arc::new(n));
    }
    for mut n in config.webhook {
        n.config(setting)?;
        configured.push(Arc::new(n));
    }
    for mut n in config.email {
        n.config(setting)?;
        configured.push(Arc::new(n));
    }

    let registry = NotifierRegistry::new();
    for n in configured {
        if registry.contains_key(n.name()) {
            bail!("notifier [{} - {}] name is duplicated", n.kind(), n.name());
        }
        registry.insert(n.name().to_string(), n);
    }
    Ok(registry)
}

// an empty list selects every notifier
pub fn select_notifiers(
    registry: &NotifierRegistry,
    names: &[String],
) -> Result<Vec<Arc<dyn Notifier>>> {
    if names.is_empty() {
        let mut all: Vec<Arc<dyn Notifier>> =
            registry.iter().map(|e| Arc::clone(e.value())).collect();
        all.sort_by(|a, b| a.name().cmp(b.name()));
        return Ok(all);
    }

    names
        .iter()
        .map(|name| match registry.get(name) {
            Some(n) => Ok(Arc::clone(n.value())),
            None => bail!("unknown notifier {}", name),
        })
        .collect()
}

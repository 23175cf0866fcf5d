use anyhow::{Context, Result};

use super::{select_notifiers, NotifierRegistry};
use crate::{conf, Fleet, Monitor};

pub fn build_fleet(c: &conf::Conf, registry: &NotifierRegistry) -> Result<Fleet> {
    let mut fleet = Fleet::new();
    for mc in &c.monitor {
        log::debug!("Adding monitor {} for url: {}", mc.name, mc.url);
        let notifiers = select_notifiers(registry, &mc.notify)
            .with_context(|| format!("bad notify list for monitor {}", mc.name))?;
        let settings = mc.settings(&c.settings.monitor);
        let prober = mc.prober(settings.timeout)?;
        let monitor = Monitor::new(&mc.name, &mc.url, settings, prober).with_notifiers(notifiers);
        fleet.add(monitor);
    }
    Ok(fleet)
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use super::*;
    use crate::new_dummy_notifier;

    #[test]
    fn test_build_fleet() {
        let c = conf::Conf::from_yaml(
            r#"
settings:
  monitor: { period: 15s }
monitor:
  - { name: web, url: "https://example.com" }
  - { name: db, url: "127.0.0.1:5432", kind: tcp, notify: [ops] }
"#,
        )
        .unwrap();
        let registry = NotifierRegistry::new();
        registry.insert("ops".to_string(), Arc::new(new_dummy_notifier("ops")));

        let fleet = build_fleet(&c, &registry).unwrap();
        assert_eq!(fleet.len(), 2);
        assert_eq!(fleet.monitors()[0].settings().period, Duration::from_secs(15));
        assert_eq!(fleet.monitors()[1].target(), "127.0.0.1:5432");
    }

    #[test]
    fn test_unknown_notifier() {
        let c = conf::Conf::from_yaml(
            r#"
monitor:
  - { name: web, url: "https://example.com", notify: [nobody] }
"#,
        )
        .unwrap();
        assert!(build_fleet(&c, &NotifierRegistry::new()).is_err());
    }
}

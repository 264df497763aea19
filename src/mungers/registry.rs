use clap::Command;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, error, info};

use super::traits::{Munger, MungerError};
use crate::github::MungeConfig;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("a munger with that name ({0}) already exists")]
    Duplicate(String),
    #[error("couldn't find a munger named: {0}")]
    NotFound(String),
    #[error("munger {name} failed to initialize: {source}")]
    Initialize {
        name: String,
        #[source]
        source: MungerError,
    },
    #[error("munger {name} failed its per-cycle hook: {source}")]
    EachLoop {
        name: String,
        #[source]
        source: MungerError,
    },
    #[error("registry is sealed, cannot register {0} after activation")]
    Sealed(String),
}

/// Table of every known munger plus the ordered list selected for this run
///
/// Lifecycle is register-all, activate once, then read-only dispatch. The
/// registry does no locking of its own; callers finish registration before
/// activation and activation before processing items.
#[derive(Default)]
pub struct MungerRegistry {
    mungers: BTreeMap<String, Box<dyn Munger>>,
    active: Vec<String>,
    sealed: bool,
}

impl MungerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, munger: Box<dyn Munger>) -> Result<(), RegistryError> {
        let name = munger.name().to_string();
        if self.sealed {
            return Err(RegistryError::Sealed(name));
        }
        if self.mungers.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }

        self.mungers.insert(name.clone(), munger);
        info!(munger = %name, "Registered munger");
        Ok(())
    }

    /// Register or terminate the process; an ambiguous registry must not run
    pub fn register_or_fatal(&mut self, munger: Box<dyn Munger>) {
        if let Err(e) = self.register(munger) {
            error!(error = %e, "Failed to register munger");
            std::process::exit(1);
        }
    }

    /// Every registered munger, regardless of what is activated
    pub fn all_registered(&self) -> Vec<&dyn Munger> {
        self.mungers.values().map(|m| m.as_ref()).collect()
    }

    /// Active mungers in activation order
    pub fn active(&self) -> Vec<&dyn Munger> {
        self.active
            .iter()
            .filter_map(|name| self.mungers.get(name))
            .map(|m| m.as_ref())
            .collect()
    }

    pub fn active_names(&self) -> &[String] {
        &self.active
    }

    pub fn registered_names(&self) -> Vec<String> {
        self.mungers.keys().cloned().collect()
    }

    pub fn has_munger(&self, name: &str) -> bool {
        self.mungers.contains_key(name)
    }

    /// Let every registered munger declare its flags on the command
    pub fn add_flags(&self, cmd: Command) -> Command {
        self.mungers
            .values()
            .fold(cmd, |cmd, munger| munger.add_flags(cmd))
    }

    /// Resolve `names` in order, appending each to the active list and initializing it
    ///
    /// Stops at the first unknown name or failed initialization. Any error is
    /// fatal to startup; the active list is left as far as it got.
    pub async fn activate(
        &mut self,
        names: &[String],
        config: &MungeConfig,
    ) -> Result<(), RegistryError> {
        self.sealed = true;

        for name in names {
            let Some(munger) = self.mungers.get_mut(name) else {
                return Err(RegistryError::NotFound(name.clone()));
            };

            self.active.push(name.clone());
            munger
                .initialize(config)
                .await
                .map_err(|source| RegistryError::Initialize {
                    name: name.clone(),
                    source,
                })?;
            info!(munger = %name, "Activated munger");
        }

        Ok(())
    }

    /// Run the per-cycle hook of each active munger in order, stopping at the first error
    pub async fn run_each_loop(&mut self, config: &MungeConfig) -> Result<(), RegistryError> {
        for name in &self.active {
            let Some(munger) = self.mungers.get_mut(name) else {
                continue;
            };

            debug!(munger = %name, "Running per-cycle hook");
            munger
                .each_loop(config)
                .await
                .map_err(|source| RegistryError::EachLoop {
                    name: name.clone(),
                    source,
                })?;
        }

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::github::{FakeClient, MungeObject};
    use async_trait::async_trait;
    use clap::Arg;
    use std::sync::{Arc, Mutex};

    pub(crate) type CallLog = Arc<Mutex<Vec<String>>>;

    /// Munger that records every call into a shared log
    pub(crate) struct RecordingMunger {
        name: String,
        tag: u32,
        log: CallLog,
        fail_init: bool,
        fail_each_loop: bool,
    }

    impl RecordingMunger {
        pub(crate) fn new(name: &str, log: &CallLog) -> Self {
            Self {
                name: name.to_string(),
                tag: 0,
                log: log.clone(),
                fail_init: false,
                fail_each_loop: false,
            }
        }

        fn tagged(mut self, tag: u32) -> Self {
            self.tag = tag;
            self
        }

        fn failing_init(mut self) -> Self {
            self.fail_init = true;
            self
        }

        fn failing_each_loop(mut self) -> Self {
            self.fail_each_loop = true;
            self
        }

        fn record(&self, call: &str) {
            self.log
                .lock()
                .unwrap()
                .push(format!("{}:{}#{}", call, self.name, self.tag));
        }
    }

    #[async_trait]
    impl Munger for RecordingMunger {
        fn name(&self) -> &str {
            &self.name
        }

        fn add_flags(&self, cmd: Command) -> Command {
            let flag = format!("{}-enabled", self.name);
            cmd.arg(Arg::new(flag.clone()).long(flag))
        }

        async fn initialize(&mut self, _config: &MungeConfig) -> Result<(), MungerError> {
            self.record("init");
            if self.fail_init {
                return Err(MungerError::InvalidConfig("missing token".to_string()));
            }
            Ok(())
        }

        async fn each_loop(&mut self, _config: &MungeConfig) -> Result<(), MungerError> {
            self.record("loop");
            if self.fail_each_loop {
                return Err(MungerError::Other("cache refresh failed".to_string()));
            }
            Ok(())
        }

        async fn munge_pull_request(&self, _config: &MungeConfig, _obj: &MungeObject) {
            self.record("munge");
        }
    }

    pub(crate) fn new_log() -> CallLog {
        Arc::new(Mutex::new(Vec::new()))
    }

    pub(crate) fn test_config() -> MungeConfig {
        MungeConfig::new(Arc::new(FakeClient::new())).with_repo("kubernetes", "contrib")
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn entries(log: &CallLog) -> Vec<String> {
        log.lock().unwrap().clone()
    }

    #[test]
    fn test_duplicate_registration_keeps_first() {
        let log = new_log();
        let mut registry = MungerRegistry::new();

        registry
            .register(Box::new(RecordingMunger::new("lgtm", &log).tagged(1)))
            .unwrap();
        let result = registry.register(Box::new(RecordingMunger::new("lgtm", &log).tagged(2)));

        assert!(matches!(result, Err(RegistryError::Duplicate(name)) if name == "lgtm"));
        assert_eq!(registry.all_registered().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_registration_retains_original_instance() {
        let log = new_log();
        let mut registry = MungerRegistry::new();
        registry
            .register(Box::new(RecordingMunger::new("lgtm", &log).tagged(1)))
            .unwrap();
        let _ = registry.register(Box::new(RecordingMunger::new("lgtm", &log).tagged(2)));

        registry
            .activate(&names(&["lgtm"]), &test_config())
            .await
            .unwrap();

        assert_eq!(entries(&log), vec!["init:lgtm#1"]);
    }

    #[test]
    fn test_builtin_registry_rejects_second_summary() {
        use crate::mungers::{SummaryMunger, builtin_registry};

        let mut registry = builtin_registry();
        let result = registry.register(Box::new(SummaryMunger::new()));

        assert!(matches!(
            result,
            Err(RegistryError::Duplicate(ref name)) if name == SummaryMunger::NAME
        ));
        assert_eq!(registry.registered_names(), vec![SummaryMunger::NAME.to_string()]);
    }

    #[tokio::test]
    async fn test_activate_preserves_request_order() {
        let log = new_log();
        let mut registry = MungerRegistry::new();
        for name in ["alpha", "bravo", "charlie"] {
            registry
                .register(Box::new(RecordingMunger::new(name, &log)))
                .unwrap();
        }

        registry
            .activate(&names(&["charlie", "alpha"]), &test_config())
            .await
            .unwrap();

        let active: Vec<&str> = registry.active().iter().map(|m| m.name()).collect();
        assert_eq!(active, vec!["charlie", "alpha"]);
        assert_eq!(entries(&log), vec!["init:charlie#0", "init:alpha#0"]);
        assert_eq!(registry.all_registered().len(), 3);
    }

    #[tokio::test]
    async fn test_activate_unknown_name_stops_before_later_names() {
        let log = new_log();
        let mut registry = MungerRegistry::new();
        registry
            .register(Box::new(RecordingMunger::new("alpha", &log)))
            .unwrap();
        registry
            .register(Box::new(RecordingMunger::new("bravo", &log)))
            .unwrap();

        let result = registry
            .activate(&names(&["alpha", "missing", "bravo"]), &test_config())
            .await;

        assert!(matches!(result, Err(RegistryError::NotFound(name)) if name == "missing"));
        assert_eq!(entries(&log), vec!["init:alpha#0"]);
    }

    #[tokio::test]
    async fn test_activate_init_failure_aborts() {
        let log = new_log();
        let mut registry = MungerRegistry::new();
        registry
            .register(Box::new(RecordingMunger::new("alpha", &log).failing_init()))
            .unwrap();
        registry
            .register(Box::new(RecordingMunger::new("bravo", &log)))
            .unwrap();

        let result = registry
            .activate(&names(&["alpha", "bravo"]), &test_config())
            .await;

        assert!(matches!(
            result,
            Err(RegistryError::Initialize { ref name, .. }) if name == "alpha"
        ));
        assert_eq!(entries(&log), vec!["init:alpha#0"]);
        assert_eq!(registry.active_names(), &["alpha".to_string()]);
    }

    #[tokio::test]
    async fn test_register_after_activation_is_rejected() {
        let log = new_log();
        let mut registry = MungerRegistry::new();
        registry
            .activate(&names(&[]), &test_config())
            .await
            .unwrap();

        let result = registry.register(Box::new(RecordingMunger::new("late", &log)));
        assert!(matches!(result, Err(RegistryError::Sealed(_))));
        assert!(!registry.has_munger("late"));
    }

    #[tokio::test]
    async fn test_each_loop_runs_in_order_and_stops_at_first_error() {
        let log = new_log();
        let mut registry = MungerRegistry::new();
        registry
            .register(Box::new(RecordingMunger::new("alpha", &log)))
            .unwrap();
        registry
            .register(Box::new(RecordingMunger::new("bravo", &log).failing_each_loop()))
            .unwrap();
        registry
            .register(Box::new(RecordingMunger::new("charlie", &log)))
            .unwrap();

        let config = test_config();
        registry
            .activate(&names(&["alpha", "bravo", "charlie"]), &config)
            .await
            .unwrap();
        log.lock().unwrap().clear();

        let result = registry.run_each_loop(&config).await;

        assert!(matches!(result, Err(RegistryError::EachLoop { ref name, .. }) if name == "bravo"));
        assert_eq!(entries(&log), vec!["loop:alpha#0", "loop:bravo#0"]);
    }

    #[tokio::test]
    async fn test_each_loop_skips_inactive_mungers() {
        let log = new_log();
        let mut registry = MungerRegistry::new();
        registry
            .register(Box::new(RecordingMunger::new("alpha", &log)))
            .unwrap();
        registry
            .register(Box::new(RecordingMunger::new("bravo", &log)))
            .unwrap();

        let config = test_config();
        registry
            .activate(&names(&["bravo"]), &config)
            .await
            .unwrap();
        registry.run_each_loop(&config).await.unwrap();

        assert_eq!(entries(&log), vec!["init:bravo#0", "loop:bravo#0"]);
    }

    #[test]
    fn test_add_flags_collects_every_registered_munger() {
        let log = new_log();
        let mut registry = MungerRegistry::new();
        registry
            .register(Box::new(RecordingMunger::new("alpha", &log)))
            .unwrap();
        registry
            .register(Box::new(RecordingMunger::new("bravo", &log)))
            .unwrap();

        let cmd = registry.add_flags(Command::new("mungehub"));
        let ids: Vec<String> = cmd.get_arguments().map(|a| a.get_id().to_string()).collect();

        assert!(ids.contains(&"alpha-enabled".to_string()));
        assert!(ids.contains(&"bravo-enabled".to_string()));
    }
}

//! Direction state manager.
//!
//! Owns the persisted language preference and reconciles it with the layout
//! direction the running process was launched with. The host's direction
//! flag is frozen at launch, so switching between an LTR and an RTL language
//! takes exactly one restart:
//!
//! 1. Persist the new language
//! 2. Set the restart guard (prevents a restart loop on the next launch)
//! 3. Ask the host to adopt the new direction for the next launch
//! 4. Restart after a short grace delay
//!
//! On the next launch `initialize` sees the guard and clears it.

use crate::config::DirectionConfig;
use crate::error::{DirectionError, StoreError};
use crate::host::{HostDirection, Restart};
use crate::i18n::{resolve_language, DirectionMetrics, Language, LayoutDirection, MetricsReport};
use crate::retry::with_retry_if;
use crate::store::PreferenceStore;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

/// Lifecycle of the manager within one process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectionState {
    /// `initialize` has not completed yet
    Uninitialized,

    /// Running; language changes are accepted
    Synced,

    /// A restart was handed to the restart primitive. Terminal for this process.
    RestartPending,

    /// The restart primitive failed; the user has to relaunch manually
    RelaunchRequired,
}

/// Result of `initialize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InitOutcome {
    pub language: Language,

    /// The stored language needs a different direction than the process was
    /// launched with and no restart had been attempted for it yet
    pub mismatch_detected: bool,

    /// A restart was already attempted but the process still runs in the
    /// wrong direction. No further restart is made; the UI may offer the
    /// manual relaunch notice.
    pub fix_unverified: bool,
}

/// Result of a language change request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LanguageChange {
    /// `false`: the change is already applied in-process.
    /// `true`: the process is restarting; keep rendering the old language.
    pub restart_scheduled: bool,
}

/// What the UI renders with: the active language and the actual direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LanguageState {
    pub language: Language,
    pub direction: LayoutDirection,
}

/// Debug snapshot of the manager.
#[derive(Debug, Clone, Serialize)]
pub struct DirectionStatus {
    pub language: Language,
    pub desired_direction: LayoutDirection,
    pub actual_direction: LayoutDirection,
    pub in_sync: bool,
    pub state: DirectionState,
}

/// Single authority over language preference and direction restarts.
///
/// Construct one per process and share it (e.g. behind an `Arc`). All
/// mutating operations are serialized; a request that arrives while another
/// is in flight waits for it and then sees its outcome.
pub struct DirectionManager {
    config: DirectionConfig,
    store: Arc<dyn PreferenceStore>,
    host: Arc<dyn HostDirection>,
    restarter: Arc<dyn Restart>,

    // Held for the whole of every mutating operation. `Some` once
    // `initialize` has completed.
    init_latch: Mutex<Option<InitOutcome>>,

    language: watch::Sender<LanguageState>,
    state: watch::Sender<DirectionState>,
    metrics: DirectionMetrics,
}

impl DirectionManager {
    pub fn new(
        config: DirectionConfig,
        store: Arc<dyn PreferenceStore>,
        host: Arc<dyn HostDirection>,
        restarter: Arc<dyn Restart>,
    ) -> Self {
        let initial = LanguageState {
            language: config.fallback_language,
            direction: LayoutDirection::from_rtl(host.is_rtl()),
        };

        Self {
            config,
            store,
            host,
            restarter,
            init_latch: Mutex::new(None),
            language: watch::Sender::new(initial),
            state: watch::Sender::new(DirectionState::Uninitialized),
            metrics: DirectionMetrics::new(),
        }
    }

    /// Load the stored language and reconcile it with the host direction.
    ///
    /// Never fails: storage problems fall back to the default language with
    /// no mismatch. Calling it again in the same process returns the first
    /// outcome without touching storage or restarting.
    pub async fn initialize(&self) -> InitOutcome {
        let mut latch = self.init_latch.lock().await;

        if let Some(outcome) = *latch {
            debug!("Direction manager already initialized");
            return outcome;
        }

        let outcome = self.reconcile_on_launch().await;
        *latch = Some(outcome);
        outcome
    }

    async fn reconcile_on_launch(&self) -> InitOutcome {
        let fallback = self.config.fallback_language;

        let stored = match self.read_preference(&self.config.language_key).await {
            Ok(stored) => stored,
            Err(e) => {
                warn!("Preference store unreadable, using {}: {}", fallback, e);
                self.metrics.record_store_failure();
                return self.finish_launch(fallback, false, false);
            }
        };

        let language = self.resolve_launch_language(stored.as_deref()).await;

        let guard_set = match self.read_preference(&self.config.guard_key).await {
            Ok(guard) => {
                if let Some(attempted_at) = &guard {
                    debug!("Restart guard present (set {})", attempted_at);
                }
                guard.is_some()
            }
            Err(e) => {
                warn!("Restart guard unreadable, skipping direction check: {}", e);
                self.metrics.record_store_failure();
                return self.finish_launch(language, false, false);
            }
        };

        let desired = language.direction();
        let actual = self.current_direction();

        info!(
            "Launch - language: {}, desired: {}, actual: {}, guard: {}",
            language, desired, actual, guard_set
        );

        if desired == actual {
            if guard_set {
                self.clear_guard().await;
            }
            return self.finish_launch(language, false, false);
        }

        if guard_set {
            // A restart was already attempted for this mismatch; restarting
            // again could loop forever
            warn!(
                "Direction still {} after restart for {}, not restarting again",
                actual, language
            );
            self.metrics.record_unverified_fix();
            self.clear_guard().await;
            return self.finish_launch(language, false, true);
        }

        info!("Direction mismatch detected, restarting into {}", desired);
        self.metrics.record_mismatch();
        self.language.send_replace(LanguageState {
            language,
            direction: actual,
        });

        if let Err(e) = self.schedule_restart(desired).await {
            warn!("Could not restart to fix direction: {}", e);
        }

        if self.state() == DirectionState::Uninitialized {
            // Nothing was handed to the restart primitive
            self.state.send_replace(DirectionState::Synced);
        }

        InitOutcome {
            language,
            mismatch_detected: true,
            fix_unverified: false,
        }
    }

    /// Resolve the launch language. A language taken from the device locale
    /// becomes the stored preference.
    async fn resolve_launch_language(&self, stored: Option<&str>) -> Language {
        let device_locale = self.config.device_locale.as_deref();
        let language = resolve_language(stored, device_locale, self.config.fallback_language);

        if stored == Some(language.code()) {
            return language;
        }
        if let Some(code) = stored {
            warn!("Ignoring unsupported stored language '{}'", code);
        }

        if device_locale.and_then(Language::normalize) == Some(language) {
            info!("No stored language, using device locale {}", language);
            if let Err(e) = self
                .write_preference(&self.config.language_key, language.code())
                .await
            {
                warn!("Failed to persist device language: {}", e);
                self.metrics.record_store_failure();
            }
        }
        language
    }

    fn finish_launch(&self, language: Language, mismatch: bool, unverified: bool) -> InitOutcome {
        self.language.send_replace(LanguageState {
            language,
            direction: self.current_direction(),
        });
        self.state.send_replace(DirectionState::Synced);

        InitOutcome {
            language,
            mismatch_detected: mismatch,
            fix_unverified: unverified,
        }
    }

    /// Switch to `language`, restarting when its direction differs from the
    /// one the process is rendering with.
    ///
    /// With `restart_scheduled: false` the new language is already active and
    /// published to subscribers. With `true` the active language is left
    /// unchanged until the relaunch.
    pub async fn request_language_change(
        &self,
        language: Language,
    ) -> Result<LanguageChange, DirectionError> {
        let latch = self.init_latch.lock().await;
        if latch.is_none() {
            return Err(DirectionError::NotInitialized);
        }

        let state = self.state();
        if state == DirectionState::RestartPending {
            return Err(DirectionError::RestartPending);
        }

        let current = self.language();
        if language == current {
            debug!("Language {} already active", language);
            return Ok(LanguageChange {
                restart_scheduled: false,
            });
        }

        // Compare against what is rendered now, not the previous preference
        let desired = language.direction();
        let actual = self.current_direction();
        let needs_restart = desired != actual;

        if needs_restart && state == DirectionState::RelaunchRequired {
            return Err(DirectionError::RelaunchRequired);
        }

        self.write_preference(&self.config.language_key, language.code())
            .await
            .map_err(|e| {
                self.metrics.record_store_failure();
                DirectionError::StoreWrite(e)
            })?;

        if !needs_restart {
            if state == DirectionState::RelaunchRequired {
                self.cancel_failed_restart(actual, current).await?;
            }

            info!("Language changed {} -> {} without restart", current, language);
            self.language.send_replace(LanguageState {
                language,
                direction: actual,
            });
            return Ok(LanguageChange {
                restart_scheduled: false,
            });
        }

        info!(
            "Direction change {} -> {} for {}, restarting",
            actual, desired, language
        );
        if let Err(e) = self.schedule_restart(desired).await {
            if !matches!(e, DirectionError::Restart(_)) {
                // Nothing reached the restart primitive, so the change is void
                self.restore_preference(current).await;
            }
            return Err(e);
        }

        Ok(LanguageChange {
            restart_scheduled: true,
        })
    }

    /// Undo the pending direction of a restart that never happened: the host
    /// keeps the running direction and the guard is dropped.
    async fn cancel_failed_restart(
        &self,
        actual: LayoutDirection,
        previous: Language,
    ) -> Result<(), DirectionError> {
        if let Err(e) = self.host.adopt_for_next_launch(actual).await {
            warn!("Could not keep next launch {}: {}", actual, e);
            self.restore_preference(previous).await;
            return Err(e.into());
        }

        self.clear_guard().await;
        self.state.send_replace(DirectionState::Synced);
        info!("Cancelled pending restart, next launch stays {}", actual);
        Ok(())
    }

    /// Best effort: put the previous language back after a failed change.
    async fn restore_preference(&self, previous: Language) {
        match self
            .write_preference(&self.config.language_key, previous.code())
            .await
        {
            Ok(()) => debug!("Restored language preference {}", previous),
            Err(e) => {
                warn!("Failed to restore language preference {}: {}", previous, e);
                self.metrics.record_store_failure();
            }
        }
    }

    /// Change to a language given by code.
    pub async fn request_language_code(
        &self,
        code: &str,
    ) -> Result<LanguageChange, DirectionError> {
        let language = Language::from_code(code)?;
        self.request_language_change(language).await
    }

    /// Switch to the next available language.
    pub async fn toggle_language(&self) -> Result<LanguageChange, DirectionError> {
        self.request_language_change(self.language().toggled())
            .await
    }

    /// Guard, adopt, wait, restart. Callers hold `init_latch`.
    async fn schedule_restart(&self, direction: LayoutDirection) -> Result<(), DirectionError> {
        let attempted_at = Utc::now().to_rfc3339();
        self.write_preference(&self.config.guard_key, &attempted_at)
            .await
            .map_err(|e| {
                self.metrics.record_store_failure();
                DirectionError::StoreWrite(e)
            })?;

        if let Err(e) = self.host.adopt_for_next_launch(direction).await {
            // Without the host change a restart would come back in the old
            // direction and consume the guard
            self.clear_guard().await;
            return Err(e.into());
        }

        self.state.send_replace(DirectionState::RestartPending);
        self.metrics.record_restart_requested();

        tokio::time::sleep(self.config.restart_grace).await;

        match self.restarter.restart().await {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!("Restart failed, waiting for manual relaunch: {}", e);
                self.metrics.record_restart_failure();
                self.state.send_replace(DirectionState::RelaunchRequired);
                Err(e.into())
            }
        }
    }

    async fn clear_guard(&self) {
        let guard_key = &self.config.guard_key;
        let result = with_retry_if(
            &self.config.storage_retry,
            "clear restart guard",
            || self.store.remove(guard_key),
            StoreError::is_transient,
        )
        .await;

        match result {
            Ok(()) => {
                self.metrics.record_guard_clear();
                info!("Cleared restart guard");
            }
            Err(e) => {
                warn!("Failed to clear restart guard: {}", e);
                self.metrics.record_store_failure();
            }
        }
    }

    async fn read_preference(&self, key: &str) -> Result<Option<String>, StoreError> {
        with_retry_if(
            &self.config.storage_retry,
            "read preference",
            || self.store.get(key),
            StoreError::is_transient,
        )
        .await
    }

    async fn write_preference(&self, key: &str, value: &str) -> Result<(), StoreError> {
        with_retry_if(
            &self.config.storage_retry,
            "write preference",
            || self.store.set(key, value),
            StoreError::is_transient,
        )
        .await
    }

    /// Direction the process is actually rendering with. Read from the host
    /// on every call.
    pub fn current_direction(&self) -> LayoutDirection {
        LayoutDirection::from_rtl(self.host.is_rtl())
    }

    /// Active language (the fallback until `initialize` completes).
    pub fn language(&self) -> Language {
        self.language.borrow().language
    }

    pub fn state(&self) -> DirectionState {
        *self.state.borrow()
    }

    /// Observe the active language. Updated only when a change is applied
    /// in-process.
    pub fn subscribe(&self) -> watch::Receiver<LanguageState> {
        self.language.subscribe()
    }

    /// Observe lifecycle transitions (e.g. to show a relaunch notice).
    pub fn subscribe_state(&self) -> watch::Receiver<DirectionState> {
        self.state.subscribe()
    }

    pub fn status(&self) -> DirectionStatus {
        let language = self.language();
        let desired_direction = language.direction();
        let actual_direction = self.current_direction();

        DirectionStatus {
            language,
            desired_direction,
            actual_direction,
            in_sync: desired_direction == actual_direction,
            state: self.state(),
        }
    }

    pub fn available_languages(&self) -> Vec<Language> {
        Language::available()
    }

    pub fn metrics(&self) -> MetricsReport {
        self.metrics.report()
    }
}

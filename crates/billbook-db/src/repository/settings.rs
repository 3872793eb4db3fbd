//! # Settings Repository
//!
//! The settings form's load/save path.

use billbook_core::validation::validate_settings;
use billbook_core::Settings;
use tracing::{debug, info};

use crate::backend::KvBackend;
use crate::error::DbResult;
use crate::store::{RecordStore, SETTINGS_KEY};

/// Attempts before a save that keeps colliding with settlements gives up.
const SAVE_ATTEMPTS: u32 = 3;

#[derive(Debug)]
pub struct SettingsRepository<'a, B> {
    store: &'a RecordStore<B>,
}

impl<'a, B: KvBackend> SettingsRepository<'a, B> {
    pub fn new(store: &'a RecordStore<B>) -> Self {
        SettingsRepository { store }
    }

    /// Stored settings, or the defaults on a fresh install.
    pub async fn load(&self) -> DbResult<Settings> {
        self.store.settings().await
    }

    /// Validates and saves the settings form.
    ///
    /// The invoice counter is never moved backwards here: a form that was
    /// loaded before an invoice was settled would otherwise reissue its number.
    ///
    /// ```text
    /// ┌─────────────────────────────────────────────────────────────────────┐
    /// │  load settings ──► raw + counter                                    │
    /// │        │                                                            │
    /// │        ▼                                                            │
    /// │  counter = max(form, stored)                                        │
    /// │        │                                                            │
    /// │        ▼                                                            │
    /// │  write IF settings still == raw ──► conflict? reload and retry      │
    /// └─────────────────────────────────────────────────────────────────────┘
    /// ```
    ///
    /// A settlement that lands between the read and the write makes the
    /// write fail its expectation; the save then starts over from the fresh
    /// counter. After `SAVE_ATTEMPTS` collisions the conflict is returned.
    pub async fn save(&self, settings: &Settings) -> DbResult<Settings> {
        validate_settings(settings)?;

        let mut attempt = 0;
        loop {
            attempt += 1;

            let current = self.store.load::<Settings>(SETTINGS_KEY).await?;
            let mut merged = settings.clone();
            if merged.invoice_prefix == current.value.invoice_prefix {
                merged.current_invoice = merged.current_invoice.max(current.value.current_invoice);
            }

            match self.store.replace_settings(current.raw, &merged).await {
                Ok(()) => {
                    info!(
                        prefix = %merged.invoice_prefix,
                        next = merged.current_invoice,
                        "Settings saved"
                    );
                    return Ok(merged);
                }
                Err(err) if err.is_conflict() && attempt < SAVE_ATTEMPTS => {
                    debug!(attempt, "Settings changed during save, retrying");
                }
                Err(err) => return Err(err),
            }
        }
    }
}

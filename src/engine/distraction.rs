use crate::config::BlockingConfig;
use crate::db::store::{KeyValueStore, DISTRACTIONS_KEY};
use crate::error::Result;

/// Counts focus-loss events while a focus session is running.
///
/// Nothing is actually blocked: the terminal reports losing focus and the
/// tracker tallies it.
pub struct DistractionTracker<'a> {
    store: &'a dyn KeyValueStore,
    enabled: bool,
    active: bool,
    count: u32,
    session_count: u32,
    whitelist: Vec<String>,
}

impl<'a> DistractionTracker<'a> {
    pub fn load(store: &'a dyn KeyValueStore, config: &BlockingConfig) -> Result<Self> {
        let count = store
            .get(DISTRACTIONS_KEY)?
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(0);
        Ok(Self {
            store,
            enabled: config.enabled,
            active: false,
            count,
            session_count: 0,
            whitelist: config.whitelist.iter().map(|s| s.to_lowercase()).collect(),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Lifetime total.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Distractions since the last `start`.
    pub fn session_count(&self) -> u32 {
        self.session_count
    }

    pub fn start(&mut self) {
        self.active = true;
        self.session_count = 0;
    }

    /// Stops watching and returns the distractions counted during the session.
    pub fn stop(&mut self) -> u32 {
        self.active = false;
        self.session_count
    }

    /// Call when the app loses the foreground. Returns whether it was counted.
    pub fn record_focus_lost(&mut self) -> Result<bool> {
        if !(self.enabled && self.active) {
            return Ok(false);
        }
        let next = self.count.saturating_add(1);
        self.store.set(DISTRACTIONS_KEY, &next.to_string())?;
        self.count = next;
        self.session_count = self.session_count.saturating_add(1);
        log::debug!("Distraction recorded ({} this session)", self.session_count);
        Ok(true)
    }

    pub fn reset(&mut self) -> Result<()> {
        self.store.remove(DISTRACTIONS_KEY)?;
        self.count = 0;
        self.session_count = 0;
        Ok(())
    }

    /// Whether `app` would count as a distraction right now.
    pub fn is_blocked(&self, app: &str) -> bool {
        let app = app.trim().to_lowercase();
        self.enabled && self.active && !self.whitelist.contains(&app)
    }
}

//! Traffic-driven slowmode.
//!
//! Each tracked channel keeps the timestamps of its most recent messages. When
//! the number of messages inside the trailing window reaches the high
//! threshold the channel is slowed down; it is released once the count drops
//! to the low threshold. The gap between the two thresholds keeps a channel
//! hovering around a single value from flapping.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use anyhow::bail;
use warden_database::model::guild_config::SlowmodeConfig;

pub const WINDOW_SECONDS_RANGE: (u32, u32) = (1, 300);
pub const HIGH_THRESHOLD_RANGE: (u32, u32) = (2, 100);
pub const DELAY_SECONDS_RANGE: (u32, u32) = (1, 21_600);

/// How often the background sweeper runs.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(5);

/// Validated per-guild controller parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlowmodeSettings {
    window: Duration,
    high_threshold: usize,
    low_threshold: usize,
    delay_seconds: u16,
}

impl SlowmodeSettings {
    pub fn new(
        window_seconds: u32,
        high_threshold: u32,
        low_threshold: u32,
        delay_seconds: u32,
    ) -> anyhow::Result<Self> {
        let in_range = |value: u32, (min, max): (u32, u32)| (min..=max).contains(&value);

        if !in_range(window_seconds, WINDOW_SECONDS_RANGE) {
            bail!(
                "window must be between {} and {} seconds",
                WINDOW_SECONDS_RANGE.0,
                WINDOW_SECONDS_RANGE.1
            );
        }
        if !in_range(high_threshold, HIGH_THRESHOLD_RANGE) {
            bail!(
                "high threshold must be between {} and {} messages",
                HIGH_THRESHOLD_RANGE.0,
                HIGH_THRESHOLD_RANGE.1
            );
        }
        if low_threshold >= high_threshold {
            bail!("low threshold must be below the high threshold");
        }
        if !in_range(delay_seconds, DELAY_SECONDS_RANGE) {
            bail!(
                "delay must be between {} and {} seconds",
                DELAY_SECONDS_RANGE.0,
                DELAY_SECONDS_RANGE.1
            );
        }

        Ok(Self {
            window: Duration::from_secs(u64::from(window_seconds)),
            high_threshold: high_threshold as usize,
            low_threshold: low_threshold as usize,
            delay_seconds: delay_seconds as u16,
        })
    }

    /// Settings for a guild row, or `None` when auto slowmode is off.
    pub fn from_config(config: &SlowmodeConfig) -> anyhow::Result<Option<Self>> {
        if !config.enabled {
            return Ok(None);
        }

        Self::new(
            config.window_seconds,
            config.high_threshold,
            config.low_threshold,
            config.delay_seconds,
        )
        .map(Some)
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn delay_seconds(&self) -> u16 {
        self.delay_seconds
    }
}

impl Default for SlowmodeSettings {
    fn default() -> Self {
        let defaults = SlowmodeConfig::default();
        Self {
            window: Duration::from_secs(u64::from(defaults.window_seconds)),
            high_threshold: defaults.high_threshold as usize,
            low_threshold: defaults.low_threshold as usize,
            delay_seconds: defaults.delay_seconds as u16,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlowmodeChange {
    /// Set the channel's per-user rate limit to this many seconds.
    Engage(u16),
    /// Remove the rate limit.
    Release,
}

#[derive(Debug)]
struct ChannelTraffic {
    guild_id: u64,
    hits: VecDeque<Instant>,
    engaged: bool,
}

impl ChannelTraffic {
    fn new(guild_id: u64) -> Self {
        Self {
            guild_id,
            hits: VecDeque::new(),
            engaged: false,
        }
    }

    fn evict_expired(&mut self, now: Instant, window: Duration) {
        while self
            .hits
            .front()
            .is_some_and(|hit| now.saturating_duration_since(*hit) > window)
        {
            self.hits.pop_front();
        }
    }
}

#[derive(Debug, Default)]
pub struct SlowmodeController {
    channels: HashMap<u64, ChannelTraffic>,
    /// `Some(None)` caches "auto slowmode disabled" for the guild.
    guild_settings: HashMap<u64, Option<SlowmodeSettings>>,
}

impl SlowmodeController {
    /// Record one message and report whether the channel's slowmode should change.
    pub fn record(
        &mut self,
        guild_id: u64,
        channel_id: u64,
        now: Instant,
        settings: &SlowmodeSettings,
    ) -> Option<SlowmodeChange> {
        let traffic = self
            .channels
            .entry(channel_id)
            .or_insert_with(|| ChannelTraffic::new(guild_id));

        traffic.evict_expired(now, settings.window);
        traffic.hits.push_back(now);
        while traffic.hits.len() > settings.high_threshold {
            traffic.hits.pop_front();
        }

        let count = traffic.hits.len();
        if !traffic.engaged && count >= settings.high_threshold {
            traffic.engaged = true;
            return Some(SlowmodeChange::Engage(settings.delay_seconds));
        }
        if traffic.engaged && count <= settings.low_threshold {
            traffic.engaged = false;
            return Some(SlowmodeChange::Release);
        }

        None
    }

    /// Evict expired traffic everywhere and return the `(guild, channel)` pairs to release.
    ///
    /// Channels whose guild has no settings are released when engaged and then
    /// forgotten, as are idle channels that are not engaged.
    pub fn sweep<F>(&mut self, now: Instant, settings_lookup: F) -> Vec<(u64, u64)>
    where
        F: Fn(u64) -> Option<SlowmodeSettings>,
    {
        sweep_channels(&mut self.channels, now, settings_lookup)
    }

    /// [`SlowmodeController::sweep`] using the cached guild settings.
    pub fn sweep_cached(&mut self, now: Instant) -> Vec<(u64, u64)> {
        let guild_settings = &self.guild_settings;
        sweep_channels(&mut self.channels, now, |guild_id| {
            guild_settings.get(&guild_id).copied().flatten()
        })
    }

    /// Undo the state change of a slowmode edit that Discord rejected.
    pub fn rollback(&mut self, guild_id: u64, channel_id: u64, change: SlowmodeChange) {
        let traffic = self
            .channels
            .entry(channel_id)
            .or_insert_with(|| ChannelTraffic::new(guild_id));
        traffic.engaged = matches!(change, SlowmodeChange::Release);
    }

    pub fn is_engaged(&self, channel_id: u64) -> bool {
        self.channels
            .get(&channel_id)
            .is_some_and(|traffic| traffic.engaged)
    }

    /// Cached settings; the outer `None` means the guild has not been loaded yet.
    pub fn guild_settings(&self, guild_id: u64) -> Option<Option<SlowmodeSettings>> {
        self.guild_settings.get(&guild_id).copied()
    }

    /// Replace the cached settings for a guild.
    pub fn update_guild_settings(&mut self, guild_id: u64, settings: Option<SlowmodeSettings>) {
        self.guild_settings.insert(guild_id, settings);
    }

    /// Drop every trace of a channel, e.g. after a manual slowmode override.
    pub fn forget_channel(&mut self, channel_id: u64) {
        self.channels.remove(&channel_id);
    }

    pub fn tracked_channels(&self) -> usize {
        self.channels.len()
    }
}

fn sweep_channels<F>(
    channels: &mut HashMap<u64, ChannelTraffic>,
    now: Instant,
    settings_lookup: F,
) -> Vec<(u64, u64)>
where
    F: Fn(u64) -> Option<SlowmodeSettings>,
{
    let mut released = Vec::new();

    channels.retain(|&channel_id, traffic| {
        let Some(settings) = settings_lookup(traffic.guild_id) else {
            if traffic.engaged {
                released.push((traffic.guild_id, channel_id));
            }
            return false;
        };

        traffic.evict_expired(now, settings.window);
        if traffic.engaged && traffic.hits.len() <= settings.low_threshold {
            traffic.engaged = false;
            released.push((traffic.guild_id, channel_id));
        }

        traffic.engaged || !traffic.hits.is_empty()
    });

    released
}

#[cfg(test)]
mod tests {
    use super::*;

    const GUILD: u64 = 1;
    const CHANNEL: u64 = 10;

    fn settings() -> SlowmodeSettings {
        SlowmodeSettings::new(10, 4, 1, 5).expect("valid settings")
    }

    fn burst(
        controller: &mut SlowmodeController,
        start: Instant,
        count: usize,
        settings: &SlowmodeSettings,
    ) -> Vec<SlowmodeChange> {
        (0..count)
            .filter_map(|offset| {
                let at = start + Duration::from_millis(offset as u64 * 100);
                controller.record(GUILD, CHANNEL, at, settings)
            })
            .collect()
    }

    #[test]
    fn engages_once_at_high_threshold() {
        let settings = settings();
        let mut controller = SlowmodeController::default();
        let start = Instant::now();

        assert!(burst(&mut controller, start, 3, &settings).is_empty());
        let changes = burst(&mut controller, start + Duration::from_millis(300), 5, &settings);
        assert_eq!(changes, vec![SlowmodeChange::Engage(5)]);
        assert!(controller.is_engaged(CHANNEL));
    }

    #[test]
    fn queue_is_bounded_by_high_threshold() {
        let settings = settings();
        let mut controller = SlowmodeController::default();
        burst(&mut controller, Instant::now(), 50, &settings);

        let traffic = controller.channels.get(&CHANNEL).expect("tracked");
        assert_eq!(traffic.hits.len(), 4);
    }

    #[test]
    fn stays_engaged_between_thresholds() {
        let settings = SlowmodeSettings::new(10, 4, 1, 5).expect("valid");
        let mut controller = SlowmodeController::default();
        let start = Instant::now();
        burst(&mut controller, start, 4, &settings);

        // Only the last burst message is still in the window; with the new one that is 2 > low.
        let later = start + Duration::from_millis(10_250);
        assert_eq!(controller.record(GUILD, CHANNEL, later, &settings), None);
        assert!(controller.is_engaged(CHANNEL));
    }

    #[test]
    fn releases_at_low_threshold_on_record() {
        let settings = settings();
        let mut controller = SlowmodeController::default();
        let start = Instant::now();
        burst(&mut controller, start, 4, &settings);

        let quiet = start + Duration::from_secs(60);
        assert_eq!(
            controller.record(GUILD, CHANNEL, quiet, &settings),
            Some(SlowmodeChange::Release)
        );
        assert!(!controller.is_engaged(CHANNEL));
    }

    #[test]
    fn sweep_releases_when_traffic_stops() {
        let settings = settings();
        let mut controller = SlowmodeController::default();
        let start = Instant::now();
        burst(&mut controller, start, 4, &settings);

        let released = controller.sweep(start + Duration::from_secs(1), |_| Some(settings));
        assert!(released.is_empty());

        let released = controller.sweep(start + Duration::from_secs(30), |_| Some(settings));
        assert_eq!(released, vec![(GUILD, CHANNEL)]);
        assert!(!controller.is_engaged(CHANNEL));
        assert_eq!(controller.tracked_channels(), 0);
    }

    #[test]
    fn sweep_releases_channels_of_disabled_guilds() {
        let settings = settings();
        let mut controller = SlowmodeController::default();
        controller.update_guild_settings(GUILD, Some(settings));
        burst(&mut controller, Instant::now(), 4, &settings);

        controller.update_guild_settings(GUILD, None);
        let released = controller.sweep_cached(Instant::now());
        assert_eq!(released, vec![(GUILD, CHANNEL)]);
        assert_eq!(controller.tracked_channels(), 0);
    }

    #[test]
    fn rollback_restores_previous_state() {
        let settings = settings();
        let mut controller = SlowmodeController::default();
        let changes = burst(&mut controller, Instant::now(), 4, &settings);
        assert_eq!(changes, vec![SlowmodeChange::Engage(5)]);

        controller.rollback(GUILD, CHANNEL, SlowmodeChange::Engage(5));
        assert!(!controller.is_engaged(CHANNEL));

        controller.rollback(GUILD, CHANNEL, SlowmodeChange::Release);
        assert!(controller.is_engaged(CHANNEL));
    }

    #[test]
    fn settings_validation() {
        assert!(SlowmodeSettings::new(10, 8, 3, 5).is_ok());
        assert!(SlowmodeSettings::new(0, 8, 3, 5).is_err());
        assert!(SlowmodeSettings::new(301, 8, 3, 5).is_err());
        assert!(SlowmodeSettings::new(10, 1, 0, 5).is_err());
        assert!(SlowmodeSettings::new(10, 101, 3, 5).is_err());
        assert!(SlowmodeSettings::new(10, 8, 8, 5).is_err());
        assert!(SlowmodeSettings::new(10, 8, 9, 5).is_err());
        assert!(SlowmodeSettings::new(10, 8, 3, 0).is_err());
        assert!(SlowmodeSettings::new(10, 8, 3, 21_601).is_err());
        assert_eq!(SlowmodeSettings::default(), SlowmodeSettings::new(10, 8, 3, 5).expect("valid"));
    }

    #[test]
    fn disabled_config_yields_no_settings() {
        let config = SlowmodeConfig::default();
        assert_eq!(SlowmodeSettings::from_config(&config).expect("valid"), None);

        let enabled = SlowmodeConfig {
            enabled: true,
            ..SlowmodeConfig::default()
        };
        assert_eq!(
            SlowmodeSettings::from_config(&enabled).expect("valid"),
            Some(SlowmodeSettings::default())
        );
    }
}

//! Three-channel temperature sampler (DS18B20 probes on one bus).
//!
//! The probes sit on the collector inlet, the collector outlet, and inside
//! the controller enclosure.  They are polled no more often than the
//! configured interval.  A probe that drops off the bus reports the
//! [`DISCONNECTED_C`] sentinel; that channel simply keeps its previous
//! good value for the cycle, and the other channels update normally.
//!
//! The very first poll after boot may see no completed conversion, so a
//! probe that has still produced nothing by the second poll is reported
//! once as absent.

use heapless::Vec;
use log::{debug, info, warn};
use serde::Serialize;

use crate::app::ports::SensorPort;
use crate::config::SystemConfig;
use crate::timing::has_elapsed;

/// Reading a probe returns this value when it does not respond.
pub const DISCONNECTED_C: f32 = -127.0;

/// Scratchpad value of a DS18B20 that has powered up but not converted.
pub const POWER_ON_C: f32 = 85.0;

/// 64-bit one-wire ROM code of a probe.
pub type SensorAddress = [u8; 8];

/// The three measurement points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Input,
    Output,
    Enclosure,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Input, Channel::Output, Channel::Enclosure];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Output => "output",
            Self::Enclosure => "enclosure",
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Input => 0,
            Self::Output => 1,
            Self::Enclosure => 2,
        }
    }
}

/// One channel's state as seen downstream.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChannelReading {
    /// Last known-good value (°C).  `None` until the first good read.
    pub celsius: Option<f32>,
    /// Whether the most recent poll of this channel succeeded.
    pub valid: bool,
}

/// Latest readings for all three channels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TemperatureReading {
    pub input: ChannelReading,
    pub output: ChannelReading,
    pub enclosure: ChannelReading,
}

impl TemperatureReading {
    pub fn channel(&self, ch: Channel) -> ChannelReading {
        match ch {
            Channel::Input => self.input,
            Channel::Output => self.output,
            Channel::Enclosure => self.enclosure,
        }
    }

    fn channel_mut(&mut self, ch: Channel) -> &mut ChannelReading {
        match ch {
            Channel::Input => &mut self.input,
            Channel::Output => &mut self.output,
            Channel::Enclosure => &mut self.enclosure,
        }
    }
}

/// What a call to [`TemperatureSampler::poll`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// Interval not yet elapsed; nothing read.
    Skipped,
    /// All channels were read.
    Sampled {
        /// Channels that were valid before this poll and returned the sentinel.
        lost: Vec<Channel, 3>,
        /// Channels that were invalid before this poll and read fine now.
        recovered: Vec<Channel, 3>,
        /// Channels that have not produced a reading since boot.  Reported
        /// once, from the second poll on.
        absent: Vec<Channel, 3>,
    },
}

fn is_disconnected(raw: f32) -> bool {
    !raw.is_finite() || (raw - DISCONNECTED_C).abs() < f32::EPSILON
}

/// Rate-limited poller holding the last known-good value per channel.
pub struct TemperatureSampler {
    addresses: [SensorAddress; 3],
    poll_interval_ms: u32,
    last_poll_ms: Option<u32>,
    reading: TemperatureReading,
    /// Whether each channel has ever produced a good value (for edge reports).
    seen: [bool; 3],
    absent_reported: [bool; 3],
    polls: u32,
}

impl TemperatureSampler {
    /// `addresses` are ordered input, output, enclosure.
    pub fn new(config: &SystemConfig, addresses: [SensorAddress; 3]) -> Self {
        Self {
            addresses,
            poll_interval_ms: config.temp_poll_interval_ms,
            last_poll_ms: None,
            reading: TemperatureReading::default(),
            seen: [false; 3],
            absent_reported: [false; 3],
            polls: 0,
        }
    }

    /// Poll the bus if the interval has passed (the first call always polls).
    pub fn poll(&mut self, now_ms: u32, bus: &mut impl SensorPort) -> PollOutcome {
        if let Some(last) = self.last_poll_ms {
            if !has_elapsed(now_ms, last, self.poll_interval_ms) {
                return PollOutcome::Skipped;
            }
        }
        self.last_poll_ms = Some(now_ms);
        self.polls = self.polls.saturating_add(1);

        bus.request_conversions();

        // Capacity equals the channel count, so pushes below cannot fail.
        let mut lost = Vec::new();
        let mut recovered = Vec::new();
        let mut absent = Vec::new();

        for ch in Channel::ALL {
            let i = ch.index();
            let raw = bus.read_channel(&self.addresses[i]);
            let was_valid = self.reading.channel(ch).valid;
            let slot = self.reading.channel_mut(ch);

            if is_disconnected(raw) {
                slot.valid = false;
                if was_valid {
                    warn!(
                        "temperature: {} probe disconnected, holding {:?}",
                        ch.name(),
                        slot.celsius
                    );
                    let _ = lost.push(ch);
                }
            } else if !was_valid && (raw - POWER_ON_C).abs() < f32::EPSILON {
                // A probe that just (re)joined the bus has not converted yet.
                debug!("temperature: {} probe reads power-on value", ch.name());
            } else {
                slot.celsius = Some(raw);
                slot.valid = true;
                if !was_valid && (self.seen[i] || self.absent_reported[i]) {
                    info!("temperature: {} probe reconnected ({:.2} C)", ch.name(), raw);
                    let _ = recovered.push(ch);
                }
                self.seen[i] = true;
            }

            if self.polls >= 2 && !self.seen[i] && !self.absent_reported[i] {
                warn!("temperature: {} probe has not answered since boot", ch.name());
                self.absent_reported[i] = true;
                let _ = absent.push(ch);
            }
        }

        PollOutcome::Sampled {
            lost,
            recovered,
            absent,
        }
    }

    /// Latest readings (last known-good values, never the sentinel).
    pub fn reading(&self) -> TemperatureReading {
        self.reading
    }
}

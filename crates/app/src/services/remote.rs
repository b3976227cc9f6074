//! Remote: the key-pressing vocabulary callers use on one device port.
//!
//! A [`Remote`] is bound to a device, a port and a keyset. Every operation
//! validates its input first, builds a [`Command`] tree and sends it as one
//! unit, so no IR is sent when the input is rejected.

use std::sync::Arc;
use std::time::Duration;

use irhub_domain::command::{Command, Hold};
use irhub_domain::error::{InvalidArgumentError, IrHubError};
use irhub_domain::keypad::{
    self, KeyStep, SELECT_KEY, TEXT_DELAY_MS, TUNE_DELAY_MS, channel_keys, shorthand_keys,
    text_keys, verify_delay,
};

use crate::ports::{ConnectionFactory, Dispatcher};
use crate::services::device::Device;

/// Default hub read timeout, which bounds the repeat count of a held key.
const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(15);

/// Key-level operations on one port of one device.
pub struct Remote<F: ConnectionFactory, D: Dispatcher> {
    device: Arc<Device<F, D>>,
    port: u16,
    keyset: String,
    delay: Duration,
    auto_tune: bool,
    read_timeout: Duration,
}

impl<F: ConnectionFactory, D: Dispatcher> Remote<F, D> {
    /// Bind a remote to `port` of `device`.
    ///
    /// # Errors
    ///
    /// [`InvalidArgumentError::EmptyKeyset`] for a blank keyset, or
    /// [`ConfigurationError::PortOutOfRange`](irhub_domain::error::ConfigurationError::PortOutOfRange).
    pub fn new(
        device: Arc<Device<F, D>>,
        port: u16,
        keyset: impl Into<String>,
    ) -> Result<Self, IrHubError> {
        let keyset = keyset.into().trim().to_string();
        if keyset.is_empty() {
            return Err(InvalidArgumentError::EmptyKeyset.into());
        }
        device.require_port(port)?;
        Ok(Self {
            device,
            port,
            keyset,
            delay: Duration::ZERO,
            auto_tune: false,
            read_timeout: DEFAULT_READ_TIMEOUT,
        })
    }

    /// Hub read timeout used to cap repeat counts.
    #[must_use]
    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    /// Pause applied after every successful operation.
    ///
    /// # Errors
    ///
    /// [`InvalidArgumentError::DelayOutOfRange`] outside `0..=30000` ms.
    pub fn set_delay(&mut self, delay_ms: i64) -> Result<(), IrHubError> {
        self.delay = verify_delay(delay_ms)?;
        Ok(())
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// When set, tuning does not append `SELECT`.
    pub fn set_auto_tune(&mut self, enabled: bool) {
        self.auto_tune = enabled;
    }

    #[must_use]
    pub fn auto_tune(&self) -> bool {
        self.auto_tune
    }

    #[must_use]
    pub fn keyset(&self) -> &str {
        &self.keyset
    }

    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    #[must_use]
    pub fn device(&self) -> &Arc<Device<F, D>> {
        &self.device
    }

    fn press(&self, key: &str) -> Result<Command, InvalidArgumentError> {
        let key = key.trim();
        if key.is_empty() {
            return Err(InvalidArgumentError::EmptyKey);
        }
        Ok(Command::press(key, self.keyset.as_str()))
    }

    fn hold(&self, key: &str, hold: Hold) -> Result<Command, InvalidArgumentError> {
        let key = key.trim();
        if key.is_empty() {
            return Err(InvalidArgumentError::EmptyKey);
        }
        Ok(Command::hold(key, self.keyset.as_str(), hold))
    }

    async fn send(&self, command: &Command) -> Result<(), IrHubError> {
        self.device.require_port(self.port)?.send(command).await?;
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(())
    }

    /// Press one key.
    ///
    /// # Errors
    ///
    /// Validation errors, or whatever the port reports.
    pub async fn press_key(&self, key: &str) -> Result<(), IrHubError> {
        let command = self.press(key)?;
        self.send(&command).await
    }

    /// Press one key, then wait `delay_ms`.
    ///
    /// # Errors
    ///
    /// Validation errors, or whatever the port reports.
    pub async fn press_key_then_wait(&self, key: &str, delay_ms: i64) -> Result<(), IrHubError> {
        let pause = verify_delay(delay_ms)?;
        let command = Command::group("PressKey")
            .with(self.press(key)?)
            .with(Command::Delay(pause));
        self.send(&command.into()).await
    }

    /// Hold a key for `count` repeats.
    ///
    /// # Errors
    ///
    /// Validation errors, or whatever the port reports.
    pub async fn press_key_and_hold(&self, key: &str, count: i64) -> Result<(), IrHubError> {
        let command = self.hold(key, Hold::repeats(count))?;
        self.send(&command).await
    }

    /// Hold a key for `seconds`.
    ///
    /// # Errors
    ///
    /// Validation errors, or whatever the port reports.
    pub async fn press_key_and_hold_for(&self, key: &str, seconds: i64) -> Result<(), IrHubError> {
        let command = self.hold(key, Hold::seconds(seconds))?;
        self.send(&command).await
    }

    /// Press several keys with `delay_ms` after each.
    ///
    /// # Errors
    ///
    /// Validation errors, or whatever the port reports.
    pub async fn press_keys<K: AsRef<str>>(&self, keys: &[K], delay_ms: i64) -> Result<(), IrHubError> {
        let command = self.key_sequence(keys, verify_delay(delay_ms)?)?;
        self.send(&command).await
    }

    fn key_sequence<K: AsRef<str>>(&self, keys: &[K], pause: Duration) -> Result<Command, IrHubError> {
        let mut group = Command::group("PressKeys");
        for key in keys {
            group
                .add(self.press(key.as_ref())?)
                .add(Command::Delay(pause));
        }
        Ok(group.into())
    }

    /// Press the same key `count` times, `delay_ms` apart, stopping at the
    /// first failure.
    ///
    /// # Errors
    ///
    /// Validation errors, or the first failure the port reports.
    pub async fn press_key_times(&self, count: u32, key: &str, delay_ms: i64) -> Result<(), IrHubError> {
        verify_delay(delay_ms)?;
        self.press(key)?;
        for _ in 0..count {
            self.press_key_then_wait(key, delay_ms).await?;
        }
        Ok(())
    }

    /// Tune to `channel` with the default gap between digits.
    ///
    /// # Errors
    ///
    /// [`InvalidArgumentError::InvalidChannel`] unless the channel is one to
    /// four digits, or whatever the port reports.
    pub async fn tune(&self, channel: &str) -> Result<(), IrHubError> {
        self.tune_digits(channel, Duration::from_millis(TUNE_DELAY_MS))
            .await
    }

    /// Tune to `channel`, `delay_ms` between digits.
    ///
    /// # Errors
    ///
    /// See [`tune`](Self::tune); also rejects out-of-range delays.
    pub async fn tune_with_delay(&self, channel: &str, delay_ms: i64) -> Result<(), IrHubError> {
        let pause = verify_delay(delay_ms)?;
        self.tune_digits(channel, pause).await
    }

    async fn tune_digits(&self, channel: &str, pause: Duration) -> Result<(), IrHubError> {
        let mut keys = channel_keys(channel)?;
        if !self.auto_tune {
            keys.push(SELECT_KEY);
        }
        let command = self.key_sequence(&keys, pause)?;
        self.send(&command).await
    }

    /// Enter `text` one character per key press.
    ///
    /// Every character is sent as-is, spaces included.
    ///
    /// # Errors
    ///
    /// [`InvalidArgumentError::EmptyText`], or whatever the port reports.
    pub async fn send_text(&self, text: &str) -> Result<(), IrHubError> {
        let pause = Duration::from_millis(TEXT_DELAY_MS);
        let mut group = Command::group("SendText");
        for key in text_keys(text)? {
            group
                .add(Command::press(key, self.keyset.as_str()))
                .add(Command::Delay(pause));
        }
        self.send(&group.into()).await
    }

    /// Expand a shorthand sequence (see [`keypad::shorthand_keys`]) and press it.
    ///
    /// # Errors
    ///
    /// Validation errors, or whatever the port reports.
    pub async fn send_shorthand(&self, sequence: &str, delay_ms: i64) -> Result<(), IrHubError> {
        let keys = shorthand_keys(sequence);
        self.press_keys(&keys, delay_ms).await
    }

    /// Run a custom sequence of presses and holds.
    ///
    /// The whole sequence is validated before anything is sent.
    ///
    /// # Errors
    ///
    /// [`InvalidArgumentError::RepeatCountTooLarge`] when a step repeats more
    /// than the hub read timeout allows, delay and key validation errors, or
    /// whatever the port reports.
    pub async fn custom_sequence(&self, steps: &[KeyStep]) -> Result<(), IrHubError> {
        let max = keypad::max_repeat_count(self.read_timeout);
        let mut group = Command::group("CustomKeySequence");
        for step in steps {
            let pause = verify_delay(step.delay_ms)?;
            if step.repeats > max {
                return Err(InvalidArgumentError::RepeatCountTooLarge {
                    count: step.repeats,
                    max,
                }
                .into());
            }
            let leaf = if step.repeats > 0 {
                self.hold(&step.key, Hold::Repeats(step.repeats))?
            } else {
                self.press(&step.key)?
            };
            group.add(leaf).add(Command::Delay(pause));
        }
        self.send(&group.into()).await
    }
}

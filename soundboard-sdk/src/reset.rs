//! Hardware reset through the board's RST pin

use std::time::Duration;

use serial_link::{LinkError, ResetLine, Transport};
use soundboard_api::BootBanner;

use crate::board::pause;
use crate::Soundboard;

impl<T: Transport, R: ResetLine> Soundboard<T, R> {
    /// Pulse the reset line and wait for the board to come back
    ///
    /// Succeeds only when the board prints a complete boot banner whose
    /// identity line names an Adafruit FX Sound Board. After a successful
    /// reset the volume that was set beforehand is stepped back into place
    /// and no track is current. On failure session state is left alone.
    ///
    /// Returns `false` straight away when no reset line is wired.
    pub fn reset(&mut self) -> bool {
        self.operation(Self::restart)
    }

    fn restart(&mut self) -> bool {
        let banner = match self.reboot() {
            Some(Ok(banner)) => banner,
            Some(Err(error)) => {
                tracing::warn!(%error, "reset failed");
                return false;
            }
            None => {
                tracing::debug!("no reset line wired");
                return false;
            }
        };
        tracing::info!(identity = %banner.identity, files = ?banner.file_count, "board reset");
        self.banner = Some(banner);

        // The volume restore below must not start a second reset
        self.session.reset_attempted = true;

        if let Some(volume) = self.session.current_volume.take() {
            self.set_volume(volume);
        }
        self.session.current_track = None;
        true
    }

    fn reboot(&mut self) -> Option<soundboard_api::Result<BootBanner>> {
        let line = self.reset_line.as_mut()?;
        let pulse = self.config.reset_pulse();
        let boot = self.config.boot_delay();

        Some(
            pulse_line(line, pulse, boot)
                .map_err(Into::into)
                .and_then(|()| self.client.read_boot_banner()),
        )
    }
}

fn pulse_line<R: ResetLine>(line: &mut R, pulse: Duration, boot: Duration) -> Result<(), LinkError> {
    line.assert_reset()?;
    pause(pulse);
    line.deassert_reset()?;
    pause(boot);
    Ok(())
}

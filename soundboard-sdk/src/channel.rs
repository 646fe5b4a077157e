//! Command channel with one reset-and-retry per public call

use serial_link::{ResetLine, Transport};
use soundboard_api::{Command, Outcome, ResponseMatch};

use crate::Soundboard;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChannelState {
    Sending,
    Recovering,
    Retrying,
}

impl<T: Transport, R: ResetLine> Soundboard<T, R> {
    /// Run `call` as a single public operation
    ///
    /// Every send made inside `call`, however deeply nested, shares one
    /// reset budget. Only the outermost operation clears it again.
    pub(crate) fn operation<O>(&mut self, call: impl FnOnce(&mut Self) -> O) -> O {
        let outermost = !self.session.in_operation;
        self.session.in_operation = true;

        let result = call(self);

        if outermost {
            self.session.in_operation = false;
            self.session.reset_attempted = false;
        }
        result
    }

    /// Send `command` and interpret the reply with `matcher`
    ///
    /// A missing reply or link failure triggers a reset followed by a retry,
    /// unless the enclosing operation already reset the board. Sends issued
    /// while that recovery runs (the volume restore inside
    /// [`Soundboard::reset`]) never reset again; they report
    /// [`ResponseMatch::failure`] instead.
    pub(crate) fn send(&mut self, command: &Command, matcher: ResponseMatch) -> Outcome {
        self.operation(|board| board.send_with_recovery(command, matcher))
    }

    fn send_with_recovery(&mut self, command: &Command, matcher: ResponseMatch) -> Outcome {
        let mut state = ChannelState::Sending;

        loop {
            board_debug!(self.log, op = command.name(), command = %command, ?state, "sending");

            let error = match self.client.exchange(command) {
                Ok(line) => {
                    board_debug!(self.log, reply = %String::from_utf8_lossy(&line), "received");
                    return matcher.interpret(command, line);
                }
                Err(error) => error,
            };

            match state {
                ChannelState::Sending if error.is_recoverable() && !self.session.reset_attempted => {
                    self.session.reset_attempted = true;
                    state = ChannelState::Recovering;
                    tracing::warn!(op = command.name(), %error, ?state, "no reply, resetting board");
                    if !self.reset() {
                        tracing::warn!("reset failed, retrying anyway");
                    }
                    state = ChannelState::Retrying;
                }
                _ => {
                    tracing::warn!(op = command.name(), %error, ?state, "command failed");
                    return matcher.failure();
                }
            }
        }
    }
}

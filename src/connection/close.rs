use crate::error::Result;
use crate::protocol::text::Quit;

use super::MySqlConnection;

impl MySqlConnection {
    /// Gracefully close the session: COM_QUIT, then stream shutdown.
    pub fn close(mut self) -> Result<()> {
        self.close_with_quit()
    }

    /// Every teardown path may run more than once; only the first does
    /// anything.
    ///
    /// COM_QUIT is sent only once the handshake has completed: a server
    /// that rejected authentication has already closed its end.
    pub(super) fn close_with_quit(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        self.closed = true;

        let quit = if self.handshake_complete { self.send_command(Quit) } else { Ok(()) };
        let shutdown = self.stream.shutdown();

        quit?;
        shutdown?;

        Ok(())
    }

    /// Tear the transport down without COM_QUIT, for failures before the
    /// handshake completed.
    pub(super) fn close_hard(&mut self) {
        if self.closed {
            return;
        }

        self.closed = true;

        let _ = self.stream.shutdown();
    }
}

use std::io::Write;

use focusmate_core::{Reply, Transport, TransportError, UserId};

use crate::render::render;

/// Prints unsolicited replies (focus notifications) to stdout.
pub struct ConsoleTransport;

impl Transport for ConsoleTransport {
    fn deliver(&self, user: UserId, reply: Reply) -> Result<(), TransportError> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "\n{}", render(&reply))
            .and_then(|()| stdout.flush())
            .map_err(|e| TransportError::DeliveryFailed {
                user,
                message: e.to_string(),
            })
    }
}

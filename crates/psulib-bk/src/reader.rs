//! Resynchronizing frame reader.
//!
//! The supply never sends anything but 26-byte frames, yet the byte stream
//! can still slip out of phase: a half-read frame left behind by an earlier
//! timeout, line noise at power-up, or a response that arrives late. The
//! reader fills a 26-byte window and, if it does not open with the start
//! byte, slides it forward one byte at a time until it does or until the
//! resync window is used up.

use psulib_core::{Error, Result, Transport};
use tracing::{debug, trace};

use crate::frame::{FRAME_LEN, Frame, START_BYTE};

/// Read one frame from `transport`, resynchronizing on the start byte.
///
/// At most `resync_window` bytes beyond the first 26 are consumed while
/// hunting for the start byte. If none turns up, or the transport times
/// out first, [`Frame::zeroed`] is returned: it will fail every check the
/// dispatcher applies, so the exchange counts as a failed attempt.
///
/// Transport errors other than [`Error::Timeout`] are returned as-is.
pub fn read_frame(transport: &mut dyn Transport, resync_window: usize) -> Result<Frame> {
    let mut window = [0u8; FRAME_LEN];

    let mut filled = 0;
    while filled < FRAME_LEN {
        match transport.receive(&mut window[filled..]) {
            Ok(0) | Err(Error::Timeout) => {
                debug!(filled, "timed out before a full frame arrived");
                return Ok(Frame::zeroed());
            }
            Ok(n) => filled += n,
            Err(e) => return Err(e),
        }
    }

    let mut skipped = 0;
    while window[0] != START_BYTE {
        if skipped >= resync_window {
            debug!(skipped, "no start byte within resync window");
            return Ok(Frame::zeroed());
        }
        let mut next = [0u8; 1];
        match transport.receive(&mut next) {
            Ok(0) | Err(Error::Timeout) => {
                debug!(skipped, "timed out while resynchronizing");
                return Ok(Frame::zeroed());
            }
            Ok(_) => {
                window.rotate_left(1);
                window[FRAME_LEN - 1] = next[0];
                skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }

    if skipped > 0 {
        debug!(skipped, "resynchronized on start byte");
    }
    trace!(frame = ?window, "received frame");

    Ok(Frame::from_bytes(window))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::encode_frame;
    use psulib_test_harness::MockTransport;

    const REQUEST: &[u8] = &[0x01];

    fn ack() -> Frame {
        encode_frame(0x00, &[0x12, 0x80]).unwrap()
    }

    fn mock_with(response: &[u8]) -> MockTransport {
        let mut mock = MockTransport::new();
        mock.expect(REQUEST, response);
        mock.send(REQUEST).unwrap();
        mock
    }

    #[test]
    fn aligned_frame_is_returned_unchanged() {
        let mut mock = mock_with(ack().as_bytes());
        let frame = read_frame(&mut mock, 64).unwrap();
        assert_eq!(frame, ack());
    }

    #[test]
    fn resyncs_past_leading_garbage() {
        let mut stream = vec![0x01, 0x02, 0x03, 0x04, 0x05];
        stream.extend_from_slice(ack().as_bytes());
        let mut mock = mock_with(&stream);

        let frame = read_frame(&mut mock, 64).unwrap();
        assert_eq!(frame, ack());
    }

    #[test]
    fn resyncs_when_garbage_equals_window() {
        let mut stream = vec![0x55; 5];
        stream.extend_from_slice(ack().as_bytes());
        let mut mock = mock_with(&stream);

        let frame = read_frame(&mut mock, 5).unwrap();
        assert_eq!(frame, ack());
    }

    #[test]
    fn gives_up_beyond_resync_window() {
        let mut stream = vec![0x55; 10];
        stream.extend_from_slice(ack().as_bytes());
        let mut mock = mock_with(&stream);

        let frame = read_frame(&mut mock, 4).unwrap();
        assert_eq!(frame, Frame::zeroed());
    }

    #[test]
    fn noise_without_start_byte_yields_zero_frame() {
        let stream = vec![0x42; 200];
        let mut mock = mock_with(&stream);

        let frame = read_frame(&mut mock, 64).unwrap();
        assert_eq!(frame, Frame::zeroed());
    }

    #[test]
    fn short_read_yields_zero_frame() {
        let mut mock = mock_with(&ack().as_bytes()[..10]);
        let frame = read_frame(&mut mock, 64).unwrap();
        assert!(!frame.is_framed());
    }

    #[test]
    fn silence_yields_zero_frame() {
        let mut mock = MockTransport::new();
        let frame = read_frame(&mut mock, 64).unwrap();
        assert_eq!(frame, Frame::zeroed());
    }

    #[test]
    fn garbage_then_timeout_yields_zero_frame() {
        // Stream runs dry while still hunting for the start byte.
        let stream = vec![0x11; 30];
        let mut mock = mock_with(&stream);
        let frame = read_frame(&mut mock, 64).unwrap();
        assert_eq!(frame, Frame::zeroed());
    }

    #[test]
    fn disconnected_transport_propagates() {
        let mut mock = MockTransport::new();
        mock.set_connected(false);
        assert!(matches!(read_frame(&mut mock, 64), Err(Error::NotConnected)));
    }

    #[test]
    fn stale_start_byte_is_taken_at_face_value() {
        // A start byte in the garbage wins; the address/checksum checks in
        // the dispatcher are what reject it.
        let mut stream = vec![0x00, START_BYTE, 0x00];
        stream.extend_from_slice(ack().as_bytes());
        let mut mock = mock_with(&stream);

        let frame = read_frame(&mut mock, 64).unwrap();
        assert!(frame.is_framed());
        assert_ne!(frame, ack());
    }
}

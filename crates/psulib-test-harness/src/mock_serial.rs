//! Mock transport for deterministic testing of protocol engines.
//!
//! [`MockTransport`] implements the [`Transport`] trait with pre-loaded
//! request/response pairs. This lets you test frame encoding, retry
//! behaviour, resynchronization, and status decoding without a real supply.
//!
//! # Example
//!
//! ```
//! use psulib_test_harness::MockTransport;
//!
//! let mut mock = MockTransport::new();
//! // Pre-load: when the protocol engine sends this request, return this response.
//! mock.expect(&[0xAA, 0x00, 0x20, 0x01], &[0xAA, 0x00, 0x12, 0x80]);
//! ```

use std::collections::VecDeque;

use psulib_core::error::{Error, Result};
use psulib_core::transport::Transport;

/// A pre-loaded request/response pair for the mock transport.
#[derive(Debug, Clone)]
struct Expectation {
    /// The exact bytes we expect to be sent.
    request: Vec<u8>,
    /// The bytes to return when the matching request is received.
    response: Vec<u8>,
}

/// A mock [`Transport`] for testing protocol engines without hardware.
///
/// Expectations are consumed in order. When `send()` is called, the sent
/// data is recorded and matched against the next expectation. The
/// corresponding response is then handed out by subsequent `receive()`
/// calls. Once the response is drained, `receive()` reports
/// [`Error::Timeout`], the same way a quiet serial line does.
///
/// Unread bytes of a response are discarded when the next request is sent.
///
/// If no expectation matches or the queue is exhausted, `send()` returns an
/// error.
#[derive(Debug)]
pub struct MockTransport {
    /// Ordered queue of expected request/response pairs.
    expectations: VecDeque<Expectation>,
    /// The response data pending for the next `receive()` call.
    pending_response: Option<Vec<u8>>,
    /// Cursor into the pending response (how many bytes have been read so far).
    response_cursor: usize,
    /// Whether the transport is "connected".
    connected: bool,
    /// Log of all bytes sent through this transport.
    sent_log: Vec<Vec<u8>>,
}

impl MockTransport {
    /// Create a new mock transport in the connected state.
    pub fn new() -> Self {
        MockTransport {
            expectations: VecDeque::new(),
            pending_response: None,
            response_cursor: 0,
            connected: true,
            sent_log: Vec::new(),
        }
    }

    /// Add an expected request/response pair.
    ///
    /// When `send()` is called with data matching `request`, the subsequent
    /// `receive()` calls will return `response`.
    pub fn expect(&mut self, request: &[u8], response: &[u8]) {
        self.expectations.push_back(Expectation {
            request: request.to_vec(),
            response: response.to_vec(),
        });
    }

    /// Add the same request/response pair `times` times in a row.
    ///
    /// Handy for retry tests where every attempt gets the same answer.
    pub fn expect_repeated(&mut self, request: &[u8], response: &[u8], times: usize) {
        for _ in 0..times {
            self.expect(request, response);
        }
    }

    /// Return a reference to all data that has been sent through this transport.
    ///
    /// Each element is the byte slice from one `send()` call.
    pub fn sent_data(&self) -> &[Vec<u8>] {
        &self.sent_log
    }

    /// Return the number of expectations that have not yet been consumed.
    pub fn remaining_expectations(&self) -> usize {
        self.expectations.len()
    }

    /// Set the connected state of the mock transport.
    ///
    /// When set to `false`, subsequent `send()` and `receive()` calls will
    /// return [`Error::NotConnected`].
    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for MockTransport {
    fn send(&mut self, data: &[u8]) -> Result<()> {
        if !self.connected {
            return Err(Error::NotConnected);
        }

        self.sent_log.push(data.to_vec());

        if let Some(expectation) = self.expectations.pop_front() {
            if data != expectation.request.as_slice() {
                return Err(Error::Protocol(format!(
                    "unexpected send data: expected {:02X?}, got {:02X?}",
                    expectation.request, data
                )));
            }
            self.pending_response = Some(expectation.response);
            self.response_cursor = 0;
            Ok(())
        } else {
            Err(Error::Protocol(
                "no more expectations in mock transport".into(),
            ))
        }
    }

    fn receive(&mut self, buf: &mut [u8]) -> Result<usize> {
        if !self.connected {
            return Err(Error::NotConnected);
        }

        if let Some(ref response) = self.pending_response {
            let remaining = &response[self.response_cursor..];
            if remaining.is_empty() {
                self.pending_response = None;
                self.response_cursor = 0;
                return Err(Error::Timeout);
            }
            let n = remaining.len().min(buf.len());
            buf[..n].copy_from_slice(&remaining[..n]);
            self.response_cursor += n;
            if self.response_cursor >= response.len() {
                self.pending_response = None;
                self.response_cursor = 0;
            }
            Ok(n)
        } else {
            Err(Error::Timeout)
        }
    }

    fn close(&mut self) -> Result<()> {
        self.connected = false;
        self.pending_response = None;
        self.response_cursor = 0;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_transport_basic_send_receive() {
        let mut mock = MockTransport::new();
        let request = &[0xAA, 0x00, 0x26];
        let response = &[0xAA, 0x00, 0x26, 0x10, 0x27];

        mock.expect(request, response);
        mock.send(request).unwrap();

        let mut buf = [0u8; 64];
        let n = mock.receive(&mut buf).unwrap();

        assert_eq!(n, response.len());
        assert_eq!(&buf[..n], response);
    }

    #[test]
    fn mock_transport_tracks_sent_data() {
        let mut mock = MockTransport::new();
        let req1 = &[0x01, 0x02];
        let req2 = &[0x03, 0x04];

        mock.expect(req1, &[0xFF]);
        mock.expect(req2, &[0xFE]);

        mock.send(req1).unwrap();
        mock.send(req2).unwrap();

        assert_eq!(mock.sent_data().len(), 2);
        assert_eq!(mock.sent_data()[0], req1);
        assert_eq!(mock.sent_data()[1], req2);
    }

    #[test]
    fn mock_transport_wrong_data_errors() {
        let mut mock = MockTransport::new();
        mock.expect(&[0x01], &[0xFF]);

        let result = mock.send(&[0x99]);
        assert!(matches!(result.unwrap_err(), Error::Protocol(_)));
    }

    #[test]
    fn mock_transport_no_expectations_errors() {
        let mut mock = MockTransport::new();

        let result = mock.send(&[0x01]);
        assert!(matches!(result.unwrap_err(), Error::Protocol(_)));
    }

    #[test]
    fn mock_transport_receive_without_send_times_out() {
        let mut mock = MockTransport::new();
        let mut buf = [0u8; 64];

        let result = mock.receive(&mut buf);
        assert!(matches!(result.unwrap_err(), Error::Timeout));
    }

    #[test]
    fn mock_transport_drained_response_times_out() {
        let mut mock = MockTransport::new();
        mock.expect(&[0x01], &[0xAA]);
        mock.send(&[0x01]).unwrap();

        let mut buf = [0u8; 4];
        assert_eq!(mock.receive(&mut buf).unwrap(), 1);
        assert!(matches!(mock.receive(&mut buf).unwrap_err(), Error::Timeout));
    }

    #[test]
    fn mock_transport_disconnect() {
        let mut mock = MockTransport::new();
        assert!(mock.is_connected());

        mock.close().unwrap();
        assert!(!mock.is_connected());

        let result = mock.send(&[0x01]);
        assert!(matches!(result.unwrap_err(), Error::NotConnected));
    }

    #[test]
    fn mock_transport_set_connected() {
        let mut mock = MockTransport::new();
        mock.set_connected(false);
        assert!(!mock.is_connected());

        let mut buf = [0u8; 8];
        let result = mock.receive(&mut buf);
        assert!(matches!(result.unwrap_err(), Error::NotConnected));
    }

    #[test]
    fn mock_transport_expect_repeated() {
        let mut mock = MockTransport::new();
        mock.expect_repeated(&[0x01], &[0xFF], 3);
        assert_eq!(mock.remaining_expectations(), 3);

        mock.send(&[0x01]).unwrap();
        mock.send(&[0x01]).unwrap();
        assert_eq!(mock.remaining_expectations(), 1);
    }

    #[test]
    fn mock_transport_partial_receive() {
        let mut mock = MockTransport::new();
        let request = &[0x01];
        let response = &[0xAA, 0xBB, 0xCC, 0xDD];
        mock.expect(request, response);

        mock.send(request).unwrap();

        let mut buf = [0u8; 2];
        let n = mock.receive(&mut buf).unwrap();
        assert_eq!(n, 2);
        assert_eq!(&buf[..n], &[0xAA, 0xBB]);

        let n = mock.receive(&mut buf).unwrap();
        assert_eq!(n, 2);
        assert_eq!(&buf[..n], &[0xCC, 0xDD]);
    }
}

//! Command dispatch: request/acknowledge exchanges with bounded retries.
//!
//! Every operation writes one frame, reads one response through the
//! resynchronizing reader, and checks it. A failed check resends the
//! identical frame, up to [`RetryPolicy::max_attempts`] writes in total.
//! Only running out of attempts is reported to the caller, as
//! [`Error::TransmitFailed`] carrying the reason the last attempt failed.
//!
//! Two checks exist:
//!
//! - [`check_ack`] for one-shot commands: the response must be an
//!   acknowledgement (`0x12`) from the configured address with ack code
//!   `0x80`.
//! - [`check_status`] for the read-config query: the response carries
//!   telemetry instead of an ack code, so it must come from the configured
//!   address with a valid checksum.

use std::thread;

use psulib_core::{AttemptFailure, Error, Result, RetryPolicy, Transport};
use tracing::{debug, trace, warn};

use crate::commands::{ACK_SUCCESS, Opcode};
use crate::frame::Frame;
use crate::reader::read_frame;

/// Check a response to a one-shot command.
pub fn check_ack(response: &Frame, address: u8) -> std::result::Result<(), AttemptFailure> {
    if !response.is_framed() {
        return Err(AttemptFailure::FramingLoss);
    }
    if response.address() != address || response.command() != Opcode::ReturnInfo.code() {
        return Err(AttemptFailure::Mismatch {
            address: response.address(),
            command: response.command(),
        });
    }
    match response.ack_code() {
        ACK_SUCCESS => Ok(()),
        code => Err(AttemptFailure::Nak(code)),
    }
}

/// Check a response to the read-config query.
pub fn check_status(response: &Frame, address: u8) -> std::result::Result<Frame, AttemptFailure> {
    if !response.is_framed() {
        return Err(AttemptFailure::FramingLoss);
    }
    if response.address() != address {
        return Err(AttemptFailure::Mismatch {
            address: response.address(),
            command: response.command(),
        });
    }
    if !response.checksum_valid() {
        return Err(AttemptFailure::BadChecksum {
            expected: response.computed_checksum(),
            received: response.checksum(),
        });
    }
    Ok(*response)
}

/// Send `request` until `check` accepts a response or attempts run out.
///
/// Transport errors other than read timeouts abort immediately.
pub fn exchange<T, F>(
    transport: &mut dyn Transport,
    request: &Frame,
    policy: &RetryPolicy,
    check: F,
) -> Result<T>
where
    F: Fn(&Frame) -> std::result::Result<T, AttemptFailure>,
{
    let mut last = AttemptFailure::NotAttempted;

    for attempt in 1..=policy.max_attempts {
        if attempt > 1 && !policy.delay.is_zero() {
            thread::sleep(policy.delay);
        }

        trace!(attempt, frame = ?request, "sending frame");
        transport.send(request.as_bytes())?;

        let response = read_frame(transport, policy.resync_window)?;
        match check(&response) {
            Ok(value) => {
                if attempt > 1 {
                    debug!(attempt, "exchange succeeded after retry");
                }
                return Ok(value);
            }
            Err(failure) => {
                debug!(attempt, %failure, "exchange attempt failed");
                last = failure;
            }
        }
    }

    warn!(
        attempts = policy.max_attempts,
        command = request.command(),
        last = %last,
        "transmit failed"
    );
    Err(Error::TransmitFailed {
        attempts: policy.max_attempts,
        last,
    })
}

/// Send a one-shot command and wait for a successful acknowledgement.
pub fn execute_ack_command(
    transport: &mut dyn Transport,
    address: u8,
    request: &Frame,
    policy: &RetryPolicy,
) -> Result<()> {
    exchange(transport, request, policy, |response| {
        check_ack(response, address)
    })
}

/// Send a read-config query and return the first checksum-valid response.
pub fn execute_status_query(
    transport: &mut dyn Transport,
    address: u8,
    request: &Frame,
    policy: &RetryPolicy,
) -> Result<Frame> {
    exchange(transport, request, policy, |response| {
        check_status(response, address)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{cmd_read_config, cmd_set_output_voltage};
    use crate::frame::{FRAME_LEN, encode_frame};
    use psulib_test_harness::MockTransport;
    use std::time::Duration;

    const ADDR: u8 = 0x00;

    fn ack(address: u8, code: u8) -> Frame {
        encode_frame(address, &[0x12, code]).unwrap()
    }

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            ..RetryPolicy::default()
        }
    }

    // -------------------------------------------------------------------
    // check_ack
    // -------------------------------------------------------------------

    #[test]
    fn check_ack_accepts_success() {
        assert_eq!(check_ack(&ack(ADDR, 0x80), ADDR), Ok(()));
    }

    #[test]
    fn check_ack_reports_nak() {
        assert_eq!(
            check_ack(&ack(ADDR, 0x90), ADDR),
            Err(AttemptFailure::Nak(0x90))
        );
    }

    #[test]
    fn check_ack_reports_wrong_address() {
        assert_eq!(
            check_ack(&ack(0x01, 0x80), ADDR),
            Err(AttemptFailure::Mismatch {
                address: 0x01,
                command: 0x12
            })
        );
    }

    #[test]
    fn check_ack_reports_wrong_command() {
        let response = encode_frame(ADDR, &[0x26, 0x80]).unwrap();
        assert!(matches!(
            check_ack(&response, ADDR),
            Err(AttemptFailure::Mismatch { command: 0x26, .. })
        ));
    }

    #[test]
    fn check_ack_reports_framing_loss() {
        assert_eq!(
            check_ack(&Frame::zeroed(), ADDR),
            Err(AttemptFailure::FramingLoss)
        );
    }

    #[test]
    fn check_ack_ignores_checksum() {
        let mut bytes = *ack(ADDR, 0x80).as_bytes();
        bytes[FRAME_LEN - 1] ^= 0xFF;
        assert_eq!(check_ack(&Frame::from_bytes(bytes), ADDR), Ok(()));
    }

    // -------------------------------------------------------------------
    // check_status
    // -------------------------------------------------------------------

    #[test]
    fn check_status_accepts_valid_frame() {
        let response = encode_frame(ADDR, &[0x26, 0x10, 0x27]).unwrap();
        assert_eq!(check_status(&response, ADDR), Ok(response));
    }

    #[test]
    fn check_status_rejects_bad_checksum() {
        let mut bytes = *encode_frame(ADDR, &[0x26, 0x10, 0x27]).unwrap().as_bytes();
        let good = bytes[FRAME_LEN - 1];
        bytes[FRAME_LEN - 1] = good.wrapping_add(1);
        assert_eq!(
            check_status(&Frame::from_bytes(bytes), ADDR),
            Err(AttemptFailure::BadChecksum {
                expected: good,
                received: good.wrapping_add(1),
            })
        );
    }

    #[test]
    fn check_status_rejects_wrong_address() {
        let response = encode_frame(0x02, &[0x26]).unwrap();
        assert!(matches!(
            check_status(&response, ADDR),
            Err(AttemptFailure::Mismatch { address: 0x02, .. })
        ));
    }

    #[test]
    fn check_status_rejects_zero_frame() {
        assert_eq!(
            check_status(&Frame::zeroed(), ADDR),
            Err(AttemptFailure::FramingLoss)
        );
    }

    // -------------------------------------------------------------------
    // retry loop
    // -------------------------------------------------------------------

    #[test]
    fn first_ack_sends_once() {
        let request = cmd_set_output_voltage(ADDR, 12.0).unwrap();
        let mut mock = MockTransport::new();
        mock.expect(request.as_bytes(), ack(ADDR, 0x80).as_bytes());

        execute_ack_command(&mut mock, ADDR, &request, &policy(10)).unwrap();
        assert_eq!(mock.sent_data().len(), 1);
        assert_eq!(mock.sent_data()[0], request.as_bytes());
    }

    #[test]
    fn retries_until_ack() {
        let request = cmd_set_output_voltage(ADDR, 5.0).unwrap();
        let mut mock = MockTransport::new();
        mock.expect(request.as_bytes(), ack(ADDR, 0x90).as_bytes());
        mock.expect(request.as_bytes(), &[0x00, 0x01, 0x02]);
        mock.expect(request.as_bytes(), ack(ADDR, 0x80).as_bytes());

        execute_ack_command(&mut mock, ADDR, &request, &policy(10)).unwrap();
        assert_eq!(mock.sent_data().len(), 3);
        assert!(mock.sent_data().iter().all(|s| s == request.as_bytes()));
        assert_eq!(mock.remaining_expectations(), 0);
    }

    #[test]
    fn mismatched_address_exhausts_attempts() {
        let request = cmd_set_output_voltage(ADDR, 12.0).unwrap();
        let mut mock = MockTransport::new();
        mock.expect_repeated(request.as_bytes(), ack(0x05, 0x80).as_bytes(), 10);

        let err = execute_ack_command(&mut mock, ADDR, &request, &policy(10)).unwrap_err();
        assert!(matches!(
            err,
            Error::TransmitFailed {
                attempts: 10,
                last: AttemptFailure::Mismatch { address: 0x05, .. }
            }
        ));
        assert_eq!(mock.sent_data().len(), 10);
    }

    #[test]
    fn nak_every_time_reports_last_nak() {
        let request = cmd_read_config(ADDR).unwrap();
        let mut mock = MockTransport::new();
        mock.expect_repeated(request.as_bytes(), ack(ADDR, 0xA0).as_bytes(), 3);

        let err = execute_ack_command(&mut mock, ADDR, &request, &policy(3)).unwrap_err();
        assert!(matches!(
            err,
            Error::TransmitFailed {
                attempts: 3,
                last: AttemptFailure::Nak(0xA0)
            }
        ));
    }

    #[test]
    fn silence_reports_framing_loss() {
        let request = cmd_read_config(ADDR).unwrap();
        let mut mock = MockTransport::new();
        mock.expect_repeated(request.as_bytes(), &[], 2);

        let err = execute_status_query(&mut mock, ADDR, &request, &policy(2)).unwrap_err();
        assert!(matches!(
            err,
            Error::TransmitFailed {
                attempts: 2,
                last: AttemptFailure::FramingLoss
            }
        ));
        assert_eq!(mock.sent_data().len(), 2);
    }

    #[test]
    fn zero_attempts_sends_nothing() {
        let request = cmd_read_config(ADDR).unwrap();
        let mut mock = MockTransport::new();

        let err = execute_ack_command(&mut mock, ADDR, &request, &policy(0)).unwrap_err();
        assert!(matches!(
            err,
            Error::TransmitFailed {
                attempts: 0,
                last: AttemptFailure::NotAttempted
            }
        ));
        assert!(mock.sent_data().is_empty());
    }

    #[test]
    fn transport_error_aborts_without_retry() {
        let request = cmd_read_config(ADDR).unwrap();
        let mut mock = MockTransport::new();
        mock.set_connected(false);

        let err = execute_ack_command(&mut mock, ADDR, &request, &policy(10)).unwrap_err();
        assert!(matches!(err, Error::NotConnected));
    }

    #[test]
    fn status_query_retries_bad_checksum() {
        let request = cmd_read_config(ADDR).unwrap();
        let good = encode_frame(ADDR, &[0x26, 0x10, 0x27]).unwrap();
        let mut corrupt = *good.as_bytes();
        corrupt[4] ^= 0x01;

        let mut mock = MockTransport::new();
        mock.expect(request.as_bytes(), &corrupt);
        mock.expect(request.as_bytes(), good.as_bytes());

        let frame = execute_status_query(&mut mock, ADDR, &request, &policy(10)).unwrap();
        assert_eq!(frame, good);
        assert_eq!(mock.sent_data().len(), 2);
    }

    #[test]
    fn retry_delay_is_applied_between_attempts() {
        let request = cmd_read_config(ADDR).unwrap();
        let mut mock = MockTransport::new();
        mock.expect(request.as_bytes(), ack(ADDR, 0x90).as_bytes());
        mock.expect(request.as_bytes(), ack(ADDR, 0x80).as_bytes());

        let policy = RetryPolicy {
            max_attempts: 2,
            delay: Duration::from_millis(20),
            ..RetryPolicy::default()
        };
        let start = std::time::Instant::now();
        execute_ack_command(&mut mock, ADDR, &request, &policy).unwrap();
        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}

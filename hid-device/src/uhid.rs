// Copyright 2025 DeskSpan Authors
// SPDX-License-Identifier: Apache-2.0

//! Kernel uhid channel
//!
//! `/dev/uhid` speaks a record-oriented binary protocol: every exchange is
//! one fixed-size `uhid_event` record, a 4-byte type tag followed by a
//! request union. This module owns the file descriptor and the record
//! marshalling; this subsystem only ever writes CREATE2, INPUT2 and DESTROY
//! and only ever reads START (everything else is discarded).

use crate::{HidError, Result};

/// Largest payload a single record can carry (report descriptor or report).
pub const UHID_DATA_MAX: usize = 4096;

#[cfg(target_os = "linux")]
pub use linux::UhidChannel;

#[cfg(not(target_os = "linux"))]
pub use stub::UhidChannel;

#[cfg(target_os = "linux")]
mod linux {
    use std::ffi::CString;
    use std::io;
    use std::mem;
    use std::os::unix::io::RawFd;
    use std::ptr;
    use std::time::{Duration, Instant};

    use log::warn;

    use super::*;
    use crate::descriptor::{
        DEFAULT_DEVICE_NAME, DEVICE_COUNTRY, DEVICE_PRODUCT, DEVICE_VENDOR, DEVICE_VERSION,
        REPORT_DESCRIPTOR,
    };

    const UHID_PATH: &str = "/dev/uhid";

    /// Startup handshake budget.
    const START_TIMEOUT: Duration = Duration::from_millis(3000);

    // Record type tags, from linux/uhid.h.
    const UHID_DESTROY: u32 = 1;
    const UHID_START: u32 = 2;
    const UHID_CREATE2: u32 = 11;
    const UHID_INPUT2: u32 = 12;

    const BUS_USB: u16 = 0x03;

    const UHID_NAME_LEN: usize = 128;
    const UHID_PHYS_LEN: usize = 64;
    const UHID_UNIQ_LEN: usize = 64;

    /// CREATE2 request body (uhid_create2_req).
    #[repr(C, packed)]
    #[allow(dead_code)] // fields reach the kernel through the byte view
    struct UhidCreate2Req {
        name: [u8; UHID_NAME_LEN],
        phys: [u8; UHID_PHYS_LEN],
        uniq: [u8; UHID_UNIQ_LEN],
        rd_size: u16,
        bus: u16,
        vendor: u32,
        product: u32,
        version: u32,
        country: u32,
        rd_data: [u8; UHID_DATA_MAX],
    }

    /// INPUT2 request body (uhid_input2_req).
    #[repr(C, packed)]
    #[allow(dead_code)] // fields reach the kernel through the byte view
    struct UhidInput2Req {
        size: u16,
        data: [u8; UHID_DATA_MAX],
    }

    /// One full record: type tag plus the largest union member.
    const UHID_EVENT_SIZE: usize = 4 + mem::size_of::<UhidCreate2Req>();

    fn as_bytes<T>(value: &T) -> &[u8] {
        // SAFETY: T is a packed C struct of plain integers and byte arrays;
        // any bit pattern is a valid byte view.
        unsafe { std::slice::from_raw_parts(value as *const T as *const u8, mem::size_of::<T>()) }
    }

    /// Channel to an in-kernel uhid device.
    ///
    /// Owns the file descriptor exclusively; dropping the channel issues a
    /// best-effort DESTROY whenever a descriptor was obtained.
    pub struct UhidChannel {
        fd: RawFd,
        running: bool,
    }

    impl UhidChannel {
        /// Open the uhid node and issue CREATE2 for a device with the given
        /// name (the default display name if empty).
        pub fn create(device_name: &str) -> Result<Self> {
            let path = CString::new(UHID_PATH).expect("static path");
            let fd = unsafe { libc::open(path.as_ptr(), libc::O_RDWR | libc::O_CLOEXEC) };
            if fd < 0 {
                let err = io::Error::last_os_error();
                warn!("uhid: open {} failed ({})", UHID_PATH, err);
                return Err(HidError::Open(err));
            }

            let chan = UhidChannel { fd, running: false };

            let name = if device_name.is_empty() {
                DEFAULT_DEVICE_NAME
            } else {
                device_name
            };

            let mut req = UhidCreate2Req {
                name: [0; UHID_NAME_LEN],
                phys: [0; UHID_PHYS_LEN],
                uniq: [0; UHID_UNIQ_LEN],
                rd_size: REPORT_DESCRIPTOR.len() as u16,
                bus: BUS_USB,
                vendor: DEVICE_VENDOR,
                product: DEVICE_PRODUCT,
                version: DEVICE_VERSION,
                country: DEVICE_COUNTRY,
                rd_data: [0; UHID_DATA_MAX],
            };

            // Truncate to the kernel's field width, leaving the final NUL.
            let name_bytes = name.as_bytes();
            let len = name_bytes.len().min(UHID_NAME_LEN - 1);
            req.name[..len].copy_from_slice(&name_bytes[..len]);
            req.rd_data[..REPORT_DESCRIPTOR.len()].copy_from_slice(REPORT_DESCRIPTOR);

            if let Err(err) = chan.write_event(UHID_CREATE2, as_bytes(&req)) {
                warn!("uhid: create failed ({})", err);
                return Err(HidError::Create(err));
            }

            Ok(chan)
        }

        /// Consume kernel events until START arrives.
        ///
        /// Unrelated events read during the wait are discarded; interrupted
        /// waits resume against the same deadline.
        pub fn await_start(&mut self) -> Result<()> {
            let deadline = Instant::now() + START_TIMEOUT;

            loop {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    warn!("uhid: timed out waiting for UHID_START");
                    return Err(HidError::StartTimeout);
                }

                let mut tv = libc::timeval {
                    tv_sec: remaining.as_secs() as libc::time_t,
                    tv_usec: remaining.subsec_micros() as libc::suseconds_t,
                };
                let mut rfds: libc::fd_set = unsafe { mem::zeroed() };
                unsafe {
                    libc::FD_ZERO(&mut rfds);
                    libc::FD_SET(self.fd, &mut rfds);
                }

                let ret = unsafe {
                    libc::select(self.fd + 1, &mut rfds, ptr::null_mut(), ptr::null_mut(), &mut tv)
                };
                if ret < 0 {
                    let err = io::Error::last_os_error();
                    if err.raw_os_error() == Some(libc::EINTR) {
                        continue;
                    }
                    return Err(HidError::Start(err));
                }
                if ret == 0 {
                    warn!("uhid: timed out waiting for UHID_START");
                    return Err(HidError::StartTimeout);
                }

                let mut buf = [0u8; UHID_EVENT_SIZE];
                let n = unsafe {
                    libc::read(self.fd, buf.as_mut_ptr() as *mut libc::c_void, buf.len())
                };
                if n < 0 {
                    let err = io::Error::last_os_error();
                    if err.raw_os_error() == Some(libc::EINTR) {
                        continue;
                    }
                    return Err(HidError::Start(err));
                }
                if n as usize >= 4 {
                    let ev_type = u32::from_ne_bytes([buf[0], buf[1], buf[2], buf[3]]);
                    if ev_type == UHID_START {
                        self.running = true;
                        return Ok(());
                    }
                }
            }
        }

        /// Whether the START handshake has completed.
        pub fn is_running(&self) -> bool {
            self.running
        }

        /// Embed a report into an INPUT2 record and write it. No retry.
        pub fn write_input(&mut self, report: &[u8]) -> Result<()> {
            debug_assert!(report.len() <= UHID_DATA_MAX);

            let mut req = UhidInput2Req {
                size: report.len() as u16,
                data: [0; UHID_DATA_MAX],
            };
            req.data[..report.len()].copy_from_slice(report);

            self.write_event(UHID_INPUT2, as_bytes(&req))
                .map_err(HidError::Write)
        }

        /// Write DESTROY best-effort and close the descriptor. Idempotent.
        pub fn destroy(&mut self) {
            if self.fd < 0 {
                return;
            }
            let _ = self.write_event(UHID_DESTROY, &[]);
            unsafe {
                libc::close(self.fd);
            }
            self.fd = -1;
            self.running = false;
        }

        fn write_event(&self, ev_type: u32, payload: &[u8]) -> io::Result<()> {
            let mut buf = [0u8; UHID_EVENT_SIZE];
            buf[..4].copy_from_slice(&ev_type.to_ne_bytes());
            buf[4..4 + payload.len()].copy_from_slice(payload);

            let n = unsafe {
                libc::write(self.fd, buf.as_ptr() as *const libc::c_void, buf.len())
            };
            if n < 0 {
                return Err(io::Error::last_os_error());
            }
            // The protocol is record-oriented; a short write is a failure.
            if n as usize != buf.len() {
                return Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "partial uhid record write",
                ));
            }
            Ok(())
        }
    }

    impl Drop for UhidChannel {
        fn drop(&mut self) {
            self.destroy();
        }
    }
}

/// Hosts without a uhid facility: construction deterministically reports
/// unavailable without attempting any syscall, so the backend selector can
/// fall back to screen synthesis.
#[cfg(not(target_os = "linux"))]
mod stub {
    use super::*;

    pub struct UhidChannel;

    impl UhidChannel {
        pub fn create(_device_name: &str) -> Result<Self> {
            Err(HidError::Unsupported)
        }

        pub fn await_start(&mut self) -> Result<()> {
            Err(HidError::Unsupported)
        }

        pub fn is_running(&self) -> bool {
            false
        }

        pub fn write_input(&mut self, _report: &[u8]) -> Result<()> {
            Err(HidError::NotRunning)
        }

        pub fn destroy(&mut self) {}
    }
}

// Copyright 2025 DeskSpan Authors
// SPDX-License-Identifier: Apache-2.0

//! hid-console: debugging aid for the virtual HID device
//!
//! Creates the uhid device and accepts line-oriented commands on a TCP
//! socket (and stdin):
//!
//! - `ALT_TAB`          presses alt+tab to switch windows
//! - `M dx dy [btns]`   relative mouse move with an optional button mask
//! - anything else      is typed as literal text
//!
//! Not part of the production input path; handy for checking that reports
//! reach the host input stack.

use std::io::{self, BufRead, BufReader};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::{Arg, Command};
use log::{debug, error, info, warn, LevelFilter};
use simple_logger::SimpleLogger;

use deskspan_hid::keymap::{keys, mask};
use deskspan_hid::report::buttons;
use deskspan_hid::{ButtonId, KeyId, VirtualHidDevice};

/// Concurrent TCP clients served at once.
const MAX_CLIENTS: usize = 4;

/// Lines longer than this are dropped, matching the wire protocol's cap.
const MAX_LINE_LEN: usize = 1024;

/// Button-mask bits accepted by the `M` command.
const BUTTON_BITS: [(u8, ButtonId); 5] = [
    (0x01, buttons::LEFT),
    (0x02, buttons::RIGHT),
    (0x04, buttons::MIDDLE),
    (0x08, buttons::EXTRA0),
    (0x10, buttons::EXTRA1),
];

fn main() -> io::Result<()> {
    let matches = Command::new("hid-console")
        .version("0.1.0")
        .about("TCP console driving the DeskSpan virtual HID device")
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .default_value("5555")
                .help("TCP port to listen on"),
        )
        .arg(
            Arg::new("name")
                .short('n')
                .long("name")
                .value_name("NAME")
                .default_value("")
                .help("Device name presented to the host (empty for default)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(clap::ArgAction::SetTrue)
                .help("Enable verbose logging"),
        )
        .get_matches();

    let log_level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    SimpleLogger::new()
        .with_level(log_level)
        .init()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;

    let port: u16 = matches
        .get_one::<String>("port")
        .unwrap()
        .parse()
        .map_err(|e: std::num::ParseIntError| {
            io::Error::new(io::ErrorKind::InvalidInput, e.to_string())
        })?;

    let name = matches.get_one::<String>("name").unwrap();

    let mut device = match VirtualHidDevice::new(name) {
        Ok(device) => device,
        Err(err) => {
            error!("cannot create virtual HID device: {}", err);
            error!("try: sudo modprobe uhid");
            std::process::exit(1);
        }
    };

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;

    let (tx, rx) = mpsc::channel::<String>();

    spawn_stdin_reader(tx.clone());
    match TcpListener::bind(("0.0.0.0", port)) {
        Ok(listener) => {
            info!("listening on 0.0.0.0:{} for keyboard/mouse input", port);
            spawn_listener(listener, tx);
        }
        Err(err) => {
            warn!("network input disabled (bind failed: {})", err);
        }
    }

    // Small wiggle so a watching host confirms the device is live.
    let _ = device.mouse_relative_move(30, 10);

    let mut held_buttons = 0u8;
    while running.load(Ordering::SeqCst) {
        match rx.recv_timeout(Duration::from_millis(200)) {
            Ok(line) => process_line(&mut device, &mut held_buttons, line.trim_end()),
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }

    info!("shutting down");
    device.stop();
    Ok(())
}

fn spawn_stdin_reader(tx: Sender<String>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });
}

fn spawn_listener(listener: TcpListener, tx: Sender<String>) {
    let clients = Arc::new(AtomicUsize::new(0));

    thread::spawn(move || {
        for stream in listener.incoming() {
            let stream = match stream {
                Ok(stream) => stream,
                Err(err) => {
                    warn!("accept failed: {}", err);
                    continue;
                }
            };

            if clients.load(Ordering::SeqCst) >= MAX_CLIENTS {
                debug!("rejecting connection, {} clients already", MAX_CLIENTS);
                continue;
            }

            clients.fetch_add(1, Ordering::SeqCst);
            let tx = tx.clone();
            let clients = clients.clone();
            thread::spawn(move || {
                serve_client(stream, tx);
                clients.fetch_sub(1, Ordering::SeqCst);
            });
        }
    });
}

fn serve_client(stream: TcpStream, tx: Sender<String>) {
    if let Ok(peer) = stream.peer_addr() {
        info!("client connected: {}", peer);
    }

    let reader = BufReader::new(stream);
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(_) => break,
        };
        if line.len() > MAX_LINE_LEN {
            debug!("dropping overlong line ({} bytes)", line.len());
            continue;
        }
        if tx.send(line).is_err() {
            break;
        }
    }
}

fn process_line(device: &mut VirtualHidDevice, held_buttons: &mut u8, line: &str) {
    if line.is_empty() {
        return;
    }

    if line == "ALT_TAB" {
        let _ = device.key_down(keys::TAB, mask::ALT);
        let _ = device.key_up(keys::TAB, mask::ALT);
        return;
    }

    // M dx dy [buttons]
    if let Some(rest) = line.strip_prefix('M') {
        let mut fields = rest.split_whitespace();
        let dx: Option<i32> = fields.next().and_then(|f| f.parse().ok());
        let dy: Option<i32> = fields.next().and_then(|f| f.parse().ok());
        let btns: u8 = fields.next().and_then(|f| f.parse().ok()).unwrap_or(0);

        if let (Some(dx), Some(dy)) = (dx, dy) {
            sync_buttons(device, held_buttons, btns);
            if let Err(err) = device.mouse_relative_move(dx, dy) {
                warn!("mouse move failed: {}", err);
            }
        } else {
            debug!("ignoring malformed mouse command: {:?}", line);
        }
        return;
    }

    // Anything else is literal text.
    for c in line.chars() {
        if !c.is_ascii() {
            continue;
        }
        let id = c as KeyId;
        let _ = device.key_down(id, 0);
        let _ = device.key_up(id, 0);
    }
}

/// Press/release buttons so the device's button byte matches `target`.
fn sync_buttons(device: &mut VirtualHidDevice, held: &mut u8, target: u8) {
    for (bit, button) in BUTTON_BITS {
        let was_down = *held & bit != 0;
        let is_down = target & bit != 0;
        if is_down && !was_down {
            let _ = device.mouse_down(button);
        } else if !is_down && was_down {
            let _ = device.mouse_up(button);
        }
    }
    *held = target & 0x1f;
}

//! End-to-end: scripted serial bytes through the session into the buffer

use embedded_hal::delay::DelayNs;
use m8_core::config::{DisplayConfig, SessionConfig};
use m8_core::{DeviceSession, SessionState};
use m8_display::{DisplayBuffer, DisplayEvent, FontKind};
use m8_hal::mock::{MockDevice, MockEnumerator};
use m8_hal::PortInfo;
use m8_protocol::{encode_frame, EscapePolicy, FontSelector, HardwareModel, Rgb};

const PORT: &str = "/dev/ttyACM0";

struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

type Session = DeviceSession<MockEnumerator, DisplayBuffer, NoDelay>;

fn connect(config: SessionConfig) -> (MockDevice, Session) {
    let device = MockDevice::new();
    device.add_port(PortInfo::usb(PORT, 0x16C0, 0x048A));
    let mut session = DeviceSession::new(
        device.enumerator(),
        DisplayBuffer::new(&DisplayConfig::default()),
        NoDelay,
        config,
    );
    session.connect(PORT, false).unwrap();
    (device, session)
}

fn frame(payload: &[u8]) -> Vec<u8> {
    let mut out = [0u8; 1024];
    let n = encode_frame(payload, &mut out).unwrap();
    out[..n].to_vec()
}

fn pump(session: &mut Session, device: &MockDevice) {
    while device.pending_reads() > 0 {
        session.read().unwrap();
    }
}

#[test]
fn test_draw_rect_scenario() {
    let (device, mut session) = connect(SessionConfig::default());
    device.push_bytes(&frame(&[0xFE, 10, 0, 20, 0, 5, 0, 5, 0, 255, 0, 0]));
    pump(&mut session, &device);

    let buffer = session.sink();
    assert_eq!((buffer.width(), buffer.height()), (320, 240));
    for y in 20..25 {
        for x in 10..15 {
            assert_eq!(buffer.get_pixel(x, y), Rgb::new(255, 0, 0));
            assert_eq!(buffer.get_alpha(x, y), 255);
        }
    }
    assert_eq!(buffer.get_pixel(9, 20), Rgb::BLACK);
}

#[test]
fn test_system_info_scenario() {
    let (device, mut session) = connect(SessionConfig::default());
    device.push_bytes(&frame(&[0xFF, 3, 1, 2, 3, 0]));
    pump(&mut session, &device);

    assert_eq!(session.model(), Some(HardwareModel::Model02));
    assert_eq!(session.font(), Some(FontSelector::Small));
    let buffer = session.sink();
    assert_eq!((buffer.width(), buffer.height()), (480, 320));
    assert_eq!(buffer.font_kind(), FontKind::Model02Small);
    assert_eq!(buffer.geometry().y_offset, -2);
    assert_eq!(buffer.geometry().baseline, 5);
}

#[test]
fn test_stream_split_across_reads() {
    let (device, mut session) = connect(SessionConfig::default());
    let bytes = frame(&[0xFE, 0, 0, 0, 0, 0x40, 0x01, 0xF0, 0x00, 1, 2, 3]);
    for chunk in bytes.chunks(3) {
        device.push_bytes(chunk);
        session.read().unwrap();
    }

    let buffer = session.sink_mut();
    assert_eq!(buffer.background(), Rgb::new(1, 2, 3));
    let events: Vec<_> = buffer.drain_events().collect();
    assert_eq!(events, [DisplayEvent::BackgroundChanged(Rgb::new(1, 2, 3))]);
}

#[test]
fn test_escaped_color_bytes() {
    let (device, mut session) = connect(SessionConfig::default());
    // color components equal to END and ESC must survive escaping
    device.push_bytes(&frame(&[0xFE, 1, 0, 1, 0, 0xC0, 0xDB, 0x00]));
    pump(&mut session, &device);

    assert_eq!(session.sink().get_pixel(1, 1), Rgb::new(0xC0, 0xDB, 0x00));
}

#[test]
fn test_idle_disconnect_scenario() {
    let (device, mut session) = connect(SessionConfig::default());
    device.push_bytes(&frame(&[0xFE, 0, 0, 0, 0, 9, 9, 9]));
    pump(&mut session, &device);
    device.remove_port(PORT);

    for _ in 0..1024 {
        session.read().unwrap();
    }

    assert_eq!(session.state(), SessionState::Disconnected);
    let buffer = session.sink_mut();
    assert!(buffer.pixels().chunks_exact(4).all(|px| px == [0, 0, 0, 255]));
    let disconnects = buffer
        .drain_events()
        .filter(|e| *e == DisplayEvent::Disconnected)
        .count();
    assert_eq!(disconnects, 1);
}

#[test]
fn test_resync_policy_recovers_after_bad_escape() {
    let config = SessionConfig {
        escape_policy: EscapePolicy::Resync,
        ..SessionConfig::default()
    };
    let (device, mut session) = connect(config);

    // broken frame, then a good one
    device.push_bytes(&[0xFE, 0xDB, 0x01, 0x02, 0xC0]);
    device.push_bytes(&frame(&[0xFE, 2, 0, 2, 0, 7, 7, 7]));
    pump(&mut session, &device);

    assert_eq!(session.sink().get_pixel(2, 2), Rgb::new(7, 7, 7));
    assert!(session.is_connected());
}

#[test]
fn test_theme_capture_through_session() {
    let (device, mut session) = connect(SessionConfig::default());
    for i in 0..14u8 {
        device.push_bytes(&frame(&[0xFE, 0, 0, i, 0, 36, 0, 11, 0, i, i, i]));
    }
    pump(&mut session, &device);

    let buffer = session.sink_mut();
    let colors = buffer.theme_colors();
    assert_eq!(colors[0], Rgb::new(0, 0, 0));
    assert_eq!(colors[12], Rgb::new(12, 12, 12));
    let captured = buffer
        .drain_events()
        .filter(|e| matches!(e, DisplayEvent::ThemeCaptured(_)))
        .count();
    assert_eq!(captured, 1);
}

#[test]
fn test_into_sink_after_session() {
    let (device, mut session) = connect(SessionConfig::default());
    device.push_bytes(&frame(&[0xFB, 0x08, 0]));
    pump(&mut session, &device);

    let mut buffer = session.into_sink();
    let events: Vec<_> = buffer.drain_events().collect();
    assert!(events.contains(&DisplayEvent::Disconnected));
    assert!(events.iter().any(|e| matches!(
        e,
        DisplayEvent::KeyChanged {
            pressed: true,
            ..
        }
    )));
    assert_eq!(device.open_port(), None);
}

//! # Wire Format Tests
//!
//! Byte-exact scenarios and the no-over-read guarantee.

use simulo_core::{Pose, Viewport};
use simulo_protocol::{
    decode_events, decode_into, DecodeError, EventDecoder, EventEncoder, HostEvent, POSE_DELETE_LEN, POSE_UPSERT_LEN,
    VIEWPORT_RESIZE_LEN,
};

#[test]
fn test_upsert_id_42_with_zero_keypoints() {
    let mut bytes = vec![0x00, 0, 0, 0, 0x2A];
    bytes.extend_from_slice(&[0u8; 68]);

    let events = decode_events(&bytes).unwrap();

    assert_eq!(events.len(), 1);
    let HostEvent::PoseUpsert { id, pose } = events[0] else {
        panic!("expected upsert, got {:?}", events[0]);
    };
    assert_eq!(id, 42);
    assert!(pose.iter().all(|(_, point)| point.x == 0.0 && point.y == 0.0));
}

#[test]
fn test_delete_id_42() {
    let events = decode_events(&[0x01, 0, 0, 0, 0x2A]).unwrap();
    assert_eq!(events, vec![HostEvent::PoseDelete { id: 42 }]);
}

#[test]
fn test_resize_800_by_600() {
    let events = decode_events(&[0x02, 0x03, 0x20, 0x02, 0x58]).unwrap();
    assert_eq!(events, vec![HostEvent::ViewportResize(Viewport::new(800, 600))]);
}

#[test]
fn test_unknown_tag_ff() {
    assert_eq!(
        decode_events(&[0xFF]),
        Err(DecodeError::UnknownTag { offset: 0, tag: 0xFF })
    );
}

#[test]
fn test_every_short_prefix_fails_without_events() {
    let mut encoder = EventEncoder::new();
    encoder.write_pose_upsert(5, &Pose::zeroed());
    let full = encoder.into_bytes();

    for len in 1..POSE_UPSERT_LEN {
        let mut out = Vec::new();
        let err = decode_into(&full[..len], &mut out).unwrap_err();
        assert_eq!(
            err,
            DecodeError::Truncated {
                offset: 0,
                tag: 0,
                needed: POSE_UPSERT_LEN,
                available: len,
            }
        );
        assert!(out.is_empty());
    }
}

#[test]
fn test_decoder_never_reads_past_valid_length() {
    // Poll buffer larger than the valid span; the tail holds stale bytes.
    let mut buffer = vec![0xAAu8; 64];
    buffer[..3].copy_from_slice(&[0x02, 0x00, 0x10]);

    let err = decode_events(&buffer[..3]).unwrap_err();
    assert_eq!(
        err,
        DecodeError::Truncated {
            offset: 0,
            tag: 2,
            needed: VIEWPORT_RESIZE_LEN,
            available: 3,
        }
    );
}

#[test]
fn test_back_to_back_records_in_order() {
    let mut pose = Pose::zeroed();
    let mut data = *pose.data();
    for (i, value) in data.iter_mut().enumerate() {
        *value = i as f32 * 10.0 - 100.0;
    }
    pose = Pose::from_data(data);

    let sent = vec![
        HostEvent::ViewportResize(Viewport::new(1280, 720)),
        HostEvent::PoseUpsert { id: 1, pose },
        HostEvent::PoseUpsert { id: u32::MAX, pose },
        HostEvent::PoseDelete { id: 1 },
    ];
    let mut encoder = EventEncoder::new();
    for event in &sent {
        encoder.write_event(event);
    }
    assert_eq!(
        encoder.len(),
        VIEWPORT_RESIZE_LEN + 2 * POSE_UPSERT_LEN + POSE_DELETE_LEN
    );

    let mut decoder = EventDecoder::new(encoder.as_slice());
    let received: Vec<_> = decoder.by_ref().collect::<Result<_, _>>().unwrap();
    assert_eq!(received, sent);
    assert_eq!(decoder.remaining(), 0);
}

//! Property-based tests for the FT element and frame codec.
//!
//! Verifies round-trip correctness for generated elements, not just the
//! hand-written examples in the unit tests.

use proptest::prelude::{Just, Strategy, any, prop, prop_oneof, proptest};
use roamkey_proto::{
    FtAction, FtActionFrame, FtElements, FtIe, GtkSubElement, MacAddr, MdIe, MobilityDomainId,
    Rsne, StatusCode, mic_zeroed,
};

fn arbitrary_ftie() -> impl Strategy<Value = FtIe> {
    (
        any::<u8>(),
        any::<[u8; 16]>(),
        any::<[u8; 32]>(),
        any::<[u8; 32]>(),
        prop::option::of(prop::collection::vec(any::<u8>(), 1..=48)),
        prop::option::of(any::<[u8; 6]>()),
        prop::option::of((0u8..4, any::<u8>(), any::<[u8; 8]>()).prop_map(
            |(key_id, key_len, rsc)| GtkSubElement::new(key_id, key_len, rsc, vec![0x5C; 24]),
        )),
    )
        .prop_map(|(element_count, mic, anonce, snonce, r0kh_id, r1kh_id, gtk)| FtIe {
            element_count,
            mic,
            anonce,
            snonce,
            r0kh_id,
            r1kh_id,
            gtk,
        })
}

fn arbitrary_action() -> impl Strategy<Value = FtAction> {
    prop_oneof![
        Just(FtAction::Request),
        Just(FtAction::Response),
        Just(FtAction::Confirm),
        Just(FtAction::Ack),
    ]
}

proptest! {
    #[test]
    fn ftie_round_trips(ftie in arbitrary_ftie()) {
        let mut buf = Vec::new();
        if ftie.write_into(&mut buf).is_ok() {
            let parsed = FtIe::parse(&buf).unwrap();
            assert_eq!(parsed, ftie);
        }
    }

    #[test]
    fn ftie_mic_zeroing_preserves_everything_else(ftie in arbitrary_ftie()) {
        let mut buf = Vec::new();
        if ftie.write_into(&mut buf).is_ok() {
            let zeroed = mic_zeroed(&buf).unwrap();
            let parsed = FtIe::parse(&zeroed).unwrap();
            assert_eq!(parsed.mic, [0u8; 16]);
            assert_eq!(parsed.anonce, ftie.anonce);
            assert_eq!(parsed.snonce, ftie.snonce);
            assert_eq!(parsed.r0kh_id, ftie.r0kh_id);
            assert_eq!(parsed.r1kh_id, ftie.r1kh_id);
        }
    }

    #[test]
    fn action_frame_round_trips(
        action in arbitrary_action(),
        sta in any::<[u8; 6]>(),
        target in any::<[u8; 6]>(),
        status_value in any::<u16>(),
        md_id in any::<[u8; 2]>(),
        capabilities in any::<u8>(),
    ) {
        let mut elements = FtElements::default();
        elements.set_mdie(&MdIe::new(MobilityDomainId(md_id), capabilities));
        elements.set_rsne(&Rsne::default()).unwrap();

        let frame = FtActionFrame {
            action,
            sta_mac: MacAddr(sta),
            target_ap: MacAddr(target),
            status: action.carries_status().then(|| StatusCode::from_u16(status_value)),
            elements,
        };

        let parsed = FtActionFrame::parse(&frame.to_bytes()).unwrap();
        assert_eq!(parsed, frame);
    }
}

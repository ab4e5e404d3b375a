pub mod ascii;
pub mod base256;
pub mod c40;
pub mod context;
pub mod edifact;
pub mod encoder;
pub mod lookahead;
pub mod text;
pub mod types;
pub mod x12;

pub use base256::{randomize_255, unrandomize_255};
pub use c40::{pack_triplet, unpack_triplet};
pub use encoder::{
    eci_designator, encode_high_level, randomize_253, EncodeOptions, HighLevelEncoding,
};
pub use types::*;

// Codec proptesting
//------------------------------------------------------------------------------

#[cfg(test)]
mod codec_proptests {
    use proptest::prelude::*;

    use super::context::EncoderContext;
    use super::{encode_high_level, EncodeOptions, Encodation, ENCODATIONS};
    use crate::metadata::{SymbolConstraints, SymbolShape};
    use crate::utils::DMError;

    pub fn shape_strategy() -> BoxedStrategy<SymbolShape> {
        prop_oneof![Just(SymbolShape::Any), Just(SymbolShape::Square), Just(SymbolShape::Rectangle)]
            .boxed()
    }

    pub fn forced_strategy() -> BoxedStrategy<Option<Encodation>> {
        prop_oneof![Just(None), prop::sample::select(ENCODATIONS.to_vec()).prop_map(Some)].boxed()
    }

    // Mostly C40/Text/X12/EDIFACT friendly bytes with some extended ones
    pub fn message_strategy() -> impl Strategy<Value = Vec<u8>> {
        let byte = prop_oneof![
            4 => prop::sample::select(b"ABCXYZ0123456789 *>\r".to_vec()),
            2 => prop::sample::select(b"abcxyz.,;:@^!".to_vec()),
            1 => any::<u8>(),
        ];
        prop::collection::vec(byte, 1..40)
    }

    // Characters taking a single value in each encodation
    fn single_value_pool(encodation: Encodation) -> &'static [u8] {
        match encodation {
            Encodation::Ascii | Encodation::C40 => b"ABCXYZ 0123",
            Encodation::Text => b"abcxyz 0123",
            Encodation::X12 => b"ABCXYZ*>\r 0123",
            Encodation::Edifact => b"ABC.:/-+@^ 0123",
            Encodation::Base256 => b"\x80\xAB\xFFabc!",
        }
    }

    // A run in the encodation followed by digits, which always pull back to ASCII
    pub fn switching_message_strategy() -> impl Strategy<Value = (Encodation, Vec<u8>)> {
        prop::sample::select(ENCODATIONS.to_vec()).prop_flat_map(|encodation| {
            let pool = single_value_pool(encodation).to_vec();
            let run = prop::collection::vec(prop::sample::select(pool), 0..30);
            (Just(encodation), run.prop_map(|mut msg| {
                msg.extend_from_slice(b"12345678901234567890");
                msg
            }))
        })
    }

    proptest! {
        #[test]
        fn proptest_switch_keeps_alignment((encodation, msg) in switching_message_strategy()) {
            let mut ctx = EncoderContext::new(&msg, SymbolConstraints::default());
            if let Some(latch) = encodation.latch() {
                ctx.write_codeword(latch).unwrap();
            }
            encodation.encode(&mut ctx).unwrap();
            if ctx.take_encoder_signal().is_some() {
                prop_assert!(ctx.has_more_characters());
                prop_assert_eq!(ctx.pos() % encodation.alignment(), 0);
            }
        }

        #[test]
        fn proptest_capacity_invariant(
            msg in message_strategy(),
            shape in shape_strategy(),
            forced in forced_strategy(),
        ) {
            let opts = EncodeOptions {
                constraints: SymbolConstraints { shape, ..Default::default() },
                forced,
                eci: None,
            };
            let res = encode_high_level(&msg, &opts);
            prop_assume!(!matches!(res, Err(DMError::DataTooLong { .. })));
            let res = res.unwrap();
            let capacity = res.symbol.data_capacity();
            prop_assert_eq!(res.codewords.len(), capacity);
            prop_assert!(res.data_len <= capacity);
            prop_assert_eq!(opts.constraints.resolve(res.data_len).unwrap().data_capacity(), capacity);
            if shape == SymbolShape::Square {
                prop_assert!(!res.symbol.is_rectangular());
            }
        }
    }
}

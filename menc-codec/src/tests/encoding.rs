use super::{MockModel, rng};
use crate::Reason;
use crate::encoding::{decode, encode};
use crate::packing::BYTES_PER_WEIGHT;

#[test]
fn missing_boundaries_are_appended() {
    let model = MockModel::uniform();
    let mut rng = rng(31);

    for (message, expected) in [("", "0"), ("0", "0"), ("1", "10")] {
        let data = encode(&model, message, BYTES_PER_WEIGHT, &mut rng).unwrap();
        assert_eq!(decode(&model, &data).unwrap(), expected, "encode({message:?})");
    }
}

#[test]
fn boundary_terminated_messages_round_trip() {
    let model = MockModel::uniform();
    let mut rng = rng(32);

    for length in 0..30 {
        let mut message: String = model.random_message(length, &mut rng).into_iter().collect();
        message.push('0');

        let data = encode(&model, &message, BYTES_PER_WEIGHT, &mut rng).unwrap();
        assert_eq!(decode(&model, &data).unwrap(), message);
    }
}

#[test]
fn prefixed_models_round_trip() {
    let model = MockModel::binary();
    let mut rng = rng(33);

    for length in 0..30 {
        let mut message: String = model.random_message(length, &mut rng).into_iter().collect();
        message.push('1');

        let data = encode(&model, &message, 16, &mut rng).unwrap();
        assert_eq!(decode(&model, &data).unwrap(), message);
    }
}

#[test]
fn window_dependent_models_round_trip() {
    let model = MockModel::skewed();
    let mut rng = rng(34);

    for length in 0..30 {
        let mut message: String = model.random_message(length, &mut rng).into_iter().collect();
        message.push('0');

        let data = encode(&model, &message, 16, &mut rng).unwrap();
        assert_eq!(decode(&model, &data).unwrap(), message);
    }
}

#[test]
fn encoded_payloads_fill_whole_blocks() {
    let model = MockModel::binary();
    let mut rng = rng(35);

    for block_size in [4, 8, 16, 32] {
        let data = encode(&model, "0110", block_size, &mut rng).unwrap();
        assert_eq!(data.len() % block_size, 0);
    }
}

#[test]
fn foreign_plaintext_characters_are_rejected() {
    let model = MockModel::uniform();
    let mut rng = rng(36);

    assert!(matches!(
        encode(&model, "19", BYTES_PER_WEIGHT, &mut rng),
        Err(Reason::NonAlphabetChar('9'))
    ));
}

#[test]
fn ragged_buffers_are_rejected() {
    let model = MockModel::uniform();
    assert!(matches!(
        decode(&model, &[0u8; 5]),
        Err(Reason::BadLength(5))
    ));
}

#[test]
fn arbitrary_weight_streams_decode_to_something() {
    // Weight tables cover the whole 32-bit range, so any aligned byte
    // string decodes without error. This is what keeps wrong-key
    // decryptions indistinguishable from real ones.
    let model = MockModel::binary();
    let mut rng = rng(37);

    for length in [0, 4, 32, 160] {
        let mut data = vec![0u8; length];
        rand::RngCore::fill_bytes(&mut rng, &mut data);
        let decoded = decode(&model, &data).unwrap();
        assert!(decoded.chars().all(|value| value == '0' || value == '1'));
    }
}

//! End-to-end workflows through the public API.

use secded::ecc::format::{parse_word, to_bit_string};
use secded::sim::{Operation, Session, MAX_ADDRESS};
use secded::{DataWidth, Error, ErrorKind, HammingCodec};

#[test]
fn test_write_damage_repair_cycle() {
    let mut session = Session::new(DataWidth::Bits16);
    let outcome = session.write(42, "0x1A").unwrap();

    session.inject(3).unwrap();
    assert_ne!(session.memory().read(42).unwrap().encoded, outcome.encoded);

    let decoded = session.check().unwrap();
    assert_eq!(decoded.kind, ErrorKind::Single { position: 3 });
    assert_eq!(decoded.corrected, outcome.encoded);
    assert_eq!(decoded.data, 0x1A);

    let cell = session.memory().read(42).unwrap();
    assert_eq!(cell.encoded, outcome.encoded);
    assert_eq!(cell.original, 0x1A);

    // A second check finds nothing left to fix
    assert_eq!(session.check().unwrap().kind, ErrorKind::None);
}

#[test]
fn test_history_follows_operations() {
    let mut session = Session::new(DataWidth::Bits8);
    session.write(1, "1011 0001").unwrap();
    session.write(2, "0xFF").unwrap();
    session.read(1).unwrap();
    session.inject(7).unwrap();
    session.inject(2).unwrap();
    session.check().unwrap();

    let operations: Vec<Operation> = session
        .history()
        .entries()
        .iter()
        .map(|entry| entry.operation)
        .collect();

    assert_eq!(operations.len(), 6);
    assert!(matches!(operations[0], Operation::Write { address: 1, data: 0xB1, .. }));
    assert!(matches!(operations[2], Operation::Read { address: 1, original: 0xB1, .. }));
    assert_eq!(operations[3], Operation::Inject { position: 7 });
    assert_eq!(operations[5], Operation::DoubleDetected);

    let sequences: Vec<usize> = session.history().entries().iter().map(|e| e.sequence).collect();
    assert_eq!(sequences, vec![1, 2, 3, 4, 5, 6]);
}

#[test]
fn test_reading_other_address_discards_damage_view() {
    let mut session = Session::new(DataWidth::Bits32);
    session.write_value(0, 0xCAFE_F00D).unwrap();
    session.write_value(MAX_ADDRESS, 0).unwrap();

    session.read(0).unwrap();
    session.inject(38).unwrap();
    session.read(MAX_ADDRESS).unwrap();
    assert_eq!(session.check().unwrap().kind, ErrorKind::None);

    // The damage stays stored at address 0 until it is checked
    session.read(0).unwrap();
    assert_eq!(
        session.check().unwrap().kind,
        ErrorKind::Single { position: 38 }
    );
}

#[test]
fn test_errors_surface_to_caller() {
    let mut session = Session::new(DataWidth::Bits16);
    assert_eq!(session.read(5), Err(Error::EmptyAddress(5)));
    assert!(matches!(
        session.write_value(MAX_ADDRESS + 1, 1),
        Err(Error::AddressOutOfRange { .. })
    ));
    session.write_value(5, 1).unwrap();
    assert_eq!(
        session.inject(22),
        Err(Error::OutOfRange {
            position: 22,
            total_bits: 22
        })
    );
}

#[test]
fn test_parsed_codeword_decodes() {
    let codec = HammingCodec::new(8).unwrap();
    let encoded = codec.encode(0xB1).unwrap();
    let typed = parse_word(&to_bit_string(encoded, codec.total_bits())).unwrap();
    let decoded = codec.detect_and_correct(typed);
    assert_eq!(decoded.kind, ErrorKind::None);
    assert_eq!(decoded.data, 0xB1);
}

//! Snapshot interchange with chain-state readers
//!
//! Readers hand over balances as raw integer strings in JSON; the snapshot
//! must survive that boundary without any float conversion.

use yieldspace_types::{BaseUnits, FixedPointError, PoolSnapshot, Reserves};

#[test]
fn test_snapshot_from_reader_json() {
    let json = r#"{
        "reserves": {
            "base": "1450000000000000000000000",
            "principal": "1023400000000000000000001"
        },
        "supply": "1023400000000000000000000",
        "time_to_maturity": 31536000
    }"#;

    let snapshot: PoolSnapshot = serde_json::from_str(json).unwrap();

    assert_eq!(snapshot.reserves.base, BaseUnits::from_whole(1_450_000));
    assert_eq!(
        snapshot.reserves.principal,
        BaseUnits::from_whole(1_023_400)
            .checked_add(BaseUnits::ONE_UNIT)
            .unwrap()
    );
    assert_eq!(snapshot.supply.to_decimal_string(), "1023400");
    assert!(!snapshot.is_mature());

    let rendered = serde_json::to_value(snapshot).unwrap();
    assert_eq!(rendered["reserves"]["principal"], "1023400000000000000000001");
}

#[test]
fn test_reader_numbers_are_rejected() {
    // A JSON number would already have passed through f64
    let json = r#"{"base": 1.45e24, "principal": "1"}"#;
    assert!(serde_json::from_str::<Reserves>(json).is_err());

    let json = r#"{"base": "-5", "principal": "1"}"#;
    assert!(serde_json::from_str::<Reserves>(json).is_err());
}

#[test]
fn test_nominal_and_raw_inputs_agree() {
    let nominal = BaseUnits::from_decimal_str("10223.000000000000000001").unwrap();
    let raw: BaseUnits = "10223000000000000000001".parse().unwrap();
    assert_eq!(nominal, raw);

    assert_eq!(
        BaseUnits::from_decimal_str("1e18"),
        Err(FixedPointError::InvalidDecimal {
            input: "1e18".to_string()
        })
    );
}

#[test]
fn test_reserve_total_overflow() {
    let max = BaseUnits::from_raw(yieldspace_types::U256::MAX);
    let reserves = Reserves::new(max, BaseUnits::ONE_UNIT);
    assert_eq!(
        reserves.total(),
        Err(FixedPointError::OutOfRange {
            operation: "addition"
        })
    );
}

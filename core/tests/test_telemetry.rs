mod common;

#[cfg(test)]
mod telemetry_tests {
    use manifest_core::prelude::*;
    use manifest_core::telemetry::{CodecCounters, TelemetrySnapshot};

    use super::common::*;

    fn make_counters() -> CodecCounters {
        CodecCounters {
            cbor_encoded: 3,
            cbor_decoded: 2,
            json_encoded: 1,
            json_decoded: 1,
            bytes_produced: 400,
            bytes_consumed: 300,
            encode_failures: 1,
            decode_failures: 1,
            unknown_fields_skipped: 0,
        }
    }

    #[test]
    fn codec_updates_counters() {
        let reg = Registry::with_builtins();
        let cx = reg.codec();

        let bin = cx.to_cbor(&test_comid()).unwrap();
        let text = cx.to_json(&test_comid()).unwrap();
        let _: Comid = cx.from_cbor(&bin).unwrap();
        let _: Comid = cx.from_json(&text).unwrap();
        assert!(cx.to_cbor(&Comid::new()).is_err());
        assert!(cx.from_cbor::<Comid>(&[]).is_err());

        let c = reg.telemetry().snapshot();
        assert_eq!(c.cbor_encoded, 1);
        assert_eq!(c.json_encoded, 1);
        assert_eq!(c.cbor_decoded, 1);
        assert_eq!(c.json_decoded, 1);
        assert_eq!(c.encode_failures, 1);
        assert_eq!(c.decode_failures, 1);
        assert_eq!(c.bytes_produced, (bin.len() + text.len()) as u64);
        assert_eq!(c.bytes_consumed, (bin.len() + text.len()) as u64);
    }

    #[test]
    fn nested_records_are_not_counted_separately() {
        let reg = Registry::with_builtins();
        reg.codec().to_cbor(&test_comid()).unwrap();
        assert_eq!(reg.telemetry().snapshot().records_encoded(), 1);
    }

    #[test]
    fn snapshot_ratios() {
        let snap = TelemetrySnapshot::from(&make_counters());
        assert!(snap.sanity_check());
        assert_eq!(snap.encode_failure_rate, 0.2);
        assert_eq!(snap.decode_failure_rate, 0.25);
        assert_eq!(snap.mean_encoded_len, 100.0);

        let empty = TelemetrySnapshot::from(&CodecCounters::default());
        assert_eq!(empty.encode_failure_rate, 0.0);
        assert_eq!(empty.mean_encoded_len, 0.0);
    }

    #[test]
    fn counters_merge() {
        let mut total = make_counters();
        total += make_counters();
        assert_eq!(total.cbor_encoded, 6);
        assert_eq!(total.records_decoded(), 6);
        assert_eq!(total.bytes_produced, 800);
    }

    #[test]
    fn counters_export() {
        let counters = make_counters();

        let cfg = bincode::config::standard();
        let bytes = bincode::encode_to_vec(&counters, cfg).unwrap();
        let (decoded, _): (CodecCounters, usize) = bincode::decode_from_slice(&bytes, cfg).unwrap();
        assert_eq!(decoded, counters);

        let json = serde_json::to_value(TelemetrySnapshot::from(&counters)).unwrap();
        assert_eq!(json["counters"]["cbor_encoded"], 3);
    }
}

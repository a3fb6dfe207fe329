//! Byte layouts of the supported devices (source of truth for offsets).
//!
//! Field names are consumed verbatim by downstream dashboards and must not
//! change.

use super::{FieldCodec, FieldSpec, Layout, Scale};

/// Raw words carry hundredths of a unit.
pub const HUNDREDTHS: Scale = Scale::Div(100.0);
/// Semi-floats carry the reading divided by 100.
pub const SEMI_FLOAT_PERCENT: Scale = Scale::Mul(100.0);

pub const DHT22_CELSIUS_OFFSET: usize = 0;
pub const DHT22_HUMID_OFFSET: usize = 2;

pub const DHT22_SEMI_FLOAT_DEGREES_OFFSET: usize = 0;
pub const DHT22_SEMI_FLOAT_HUMIDITY_OFFSET: usize = 2;

pub const BME280_FEATHER_ID_OFFSET: usize = 0;
pub const BME280_CELSIUS_OFFSET: usize = 1;
pub const BME280_HUMID_OFFSET: usize = 3;

pub const CPU_LOAD_OFFSET: usize = 0;

/// DHT22 temperature/humidity as raw hundredths.
pub static DHT22: Layout = Layout {
    name: "dht22",
    fields: &[
        FieldSpec {
            name: "celsius",
            offset: DHT22_CELSIUS_OFFSET,
            codec: FieldCodec::RawScaled(HUNDREDTHS),
        },
        FieldSpec {
            name: "humid",
            offset: DHT22_HUMID_OFFSET,
            codec: FieldCodec::RawScaled(HUNDREDTHS),
        },
    ],
};

/// DHT22 temperature/humidity as semi-floats of `reading / 100`.
pub static DHT22_SEMI_FLOAT: Layout = Layout {
    name: "dht22-semifloat",
    fields: &[
        FieldSpec {
            name: "degreesC",
            offset: DHT22_SEMI_FLOAT_DEGREES_OFFSET,
            codec: FieldCodec::SemiFloat(SEMI_FLOAT_PERCENT),
        },
        FieldSpec {
            name: "humidity",
            offset: DHT22_SEMI_FLOAT_HUMIDITY_OFFSET,
            codec: FieldCodec::SemiFloat(SEMI_FLOAT_PERCENT),
        },
    ],
};

/// BME280 Feather node: one-byte node id followed by raw hundredths.
pub static BME280: Layout = Layout {
    name: "bme280",
    fields: &[
        FieldSpec {
            name: "featherID",
            offset: BME280_FEATHER_ID_OFFSET,
            codec: FieldCodec::RawByte,
        },
        FieldSpec {
            name: "celsius",
            offset: BME280_CELSIUS_OFFSET,
            codec: FieldCodec::RawScaled(HUNDREDTHS),
        },
        FieldSpec {
            name: "humid",
            offset: BME280_HUMID_OFFSET,
            codec: FieldCodec::RawScaled(HUNDREDTHS),
        },
    ],
};

/// Host CPU load reading, raw hundredths.
pub static CPU_LOAD: Layout = Layout {
    name: "cpu-load",
    fields: &[FieldSpec {
        name: "CPU_Load",
        offset: CPU_LOAD_OFFSET,
        codec: FieldCodec::RawScaled(HUNDREDTHS),
    }],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_lengths_match_device_payloads() {
        assert_eq!(DHT22.min_len(), 4);
        assert_eq!(DHT22_SEMI_FLOAT.min_len(), 4);
        assert_eq!(BME280.min_len(), 5);
        assert_eq!(CPU_LOAD.min_len(), 2);
    }

    #[test]
    fn fields_do_not_overlap() {
        for layout in [&DHT22, &DHT22_SEMI_FLOAT, &BME280, &CPU_LOAD] {
            let mut ranges: Vec<_> = layout.fields.iter().map(FieldSpec::range).collect();
            ranges.sort_by_key(|range| range.start);
            for pair in ranges.windows(2) {
                assert!(pair[0].end <= pair[1].start, "overlap in {}", layout.name);
            }
        }
    }

    #[test]
    fn field_names_are_unique() {
        for layout in [&DHT22, &DHT22_SEMI_FLOAT, &BME280, &CPU_LOAD] {
            let mut names: Vec<_> = layout.fields.iter().map(|field| field.name).collect();
            names.sort_unstable();
            names.dedup();
            assert_eq!(names.len(), layout.fields.len(), "duplicate in {}", layout.name);
        }
    }
}

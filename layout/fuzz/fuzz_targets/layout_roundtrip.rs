#![no_main]

use arbitrary::Arbitrary;
use bytes::Bytes;
use commonware_layout::{
    padding,
    scalar::{CHAR, F32_LE, I16_LE, U16_BE, U32_BE, U8},
    Array, Codec, Config, Enum, Struct, Value,
};
use libfuzzer_sys::fuzz_target;
use std::sync::OnceLock;

#[derive(Arbitrary, Debug)]
enum FuzzInput {
    Message {
        kind: u8,
        id: u16,
        deltas: Vec<i16>,
        name: Vec<u8>,
        payload: Vec<u8>,
    },
    Sample {
        value: f32,
    },
    Raw(Vec<u8>),
    Lenient(Vec<u8>),
}

struct Layouts {
    kind: Enum,
    message: Struct,
    sample: Struct,
}

fn layouts() -> &'static Layouts {
    static LAYOUTS: OnceLock<Layouts> = OnceLock::new();
    LAYOUTS.get_or_init(|| {
        let kind = Enum::builder("Kind", U8)
            .next("PING")
            .next("PONG")
            .literal("DATA", 10)
            .build()
            .unwrap();
        let header = Struct::builder("Header")
            .field("kind", &kind)
            .field("reserved", padding(1, 0).unwrap())
            .field("id", U16_BE)
            .build()
            .unwrap();
        let message = Struct::builder("Message")
            .extend(&header)
            .field("deltas", Array::fixed(4, I16_LE).unwrap())
            .field("name", Array::fixed(8, CHAR).unwrap())
            .field("payload", Array::variable(0..=64, U8).unwrap())
            .build()
            .unwrap();
        let sample = Struct::builder("Sample")
            .field("value", F32_LE)
            .field("crc", U32_BE)
            .build()
            .unwrap();
        Layouts {
            kind,
            message,
            sample,
        }
    })
}

fn roundtrip(layout: &Struct, value: &Value) {
    let encoded = layout.encode(value).expect("Failed to encode a valid value!");
    assert_eq!(encoded.len(), layout.encode_size(value).unwrap());
    let decoded = layout
        .decode(encoded.clone())
        .expect("Failed to decode a successfully encoded input!");
    assert_eq!(&decoded, value);
    assert_eq!(layout.encode(&decoded).unwrap(), encoded);
}

fn fuzz(input: FuzzInput) {
    let layouts = layouts();
    match input {
        FuzzInput::Message {
            kind,
            id,
            mut deltas,
            mut name,
            mut payload,
        } => {
            let literals: Vec<_> = layouts.kind.literals().collect();
            let (_, kind) = literals[kind as usize % literals.len()];
            deltas.truncate(4);
            name.retain(|c| c.is_ascii() && *c != 0);
            name.truncate(8);
            payload.truncate(64);

            let record = layouts
                .message
                .record([
                    ("kind", Value::Unsigned(kind as u64)),
                    ("id", Value::from(id)),
                    (
                        "deltas",
                        Value::List(deltas.into_iter().map(Value::from).collect()),
                    ),
                    ("name", Value::Text(name.into_iter().map(char::from).collect())),
                    ("payload", Value::from(Bytes::from(payload))),
                ])
                .expect("Failed to build a valid record!");
            roundtrip(&layouts.message, &Value::Record(record));
        }
        FuzzInput::Sample { value } => {
            if value.is_nan() {
                return;
            }
            let record = layouts
                .sample
                .record([("value", value)])
                .expect("Failed to build a valid record!");
            roundtrip(&layouts.sample, &Value::Record(record));
        }
        FuzzInput::Raw(raw) => {
            // Anything that decodes must re-encode to the same bytes
            if let Ok(value) = layouts.message.decode(raw.as_slice()) {
                assert_eq!(layouts.message.encode(&value).unwrap(), raw.as_slice());
                assert!(layouts.message.validate(&value).is_ok());
            }
        }
        FuzzInput::Lenient(raw) => {
            let cfg = Config::default().with_strict_enums(false);
            if let Ok(value) = layouts.message.decode_cfg(raw.as_slice(), &cfg) {
                assert_eq!(layouts.message.encode(&value).unwrap(), raw.as_slice());
                let _ = layouts.message.render(&value);
            }
        }
    }
}

fuzz_target!(|input: FuzzInput| {
    fuzz(input);
});

use commonware_layout::{
    padding,
    scalar::{CHAR, F64_LE, I16_LE, U16_BE, U32, U32_BE, U8},
    Array, Codec, Config, Enum, Error, Instance, Layout, Record, SchemaError, Struct, Validator,
    Value,
};

fn init() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

fn record(layout: &Struct, pairs: Vec<(&str, Value)>) -> Value {
    Value::Record(layout.record(pairs).unwrap())
}

#[test]
fn test_fixed_struct() {
    init();
    let layout = Struct::builder("Pair")
        .field("a", U8)
        .field("b", U16_BE)
        .build()
        .unwrap();
    assert_eq!(layout.fixed_size(), Some(3));

    let value = record(&layout, vec![("a", 1u8.into()), ("b", 0x0203u16.into())]);
    assert_eq!(layout.encode(&value).unwrap(), &[0x01, 0x02, 0x03][..]);
}

#[test]
fn test_array_padding() {
    let layout = Array::fixed(3, U8).unwrap();
    let value = Value::List(vec![1u8.into(), 2u8.into()]);
    assert_eq!(layout.encode(&value).unwrap(), &[0x01, 0x02, 0x00][..]);
}

#[test]
fn test_array_bounds() {
    init();
    let layout = Array::variable(2..=5, U8).unwrap();
    assert!(layout.decode(&[0x01, 0x02, 0x03][..]).is_ok());
    let err = layout.decode(&[0x01][..]).unwrap_err();
    assert!(err.is_decode());
    assert!(!err.is_validation());
}

#[test]
fn test_enum() {
    let color = Enum::builder("Color", U8)
        .literal("RED", 0)
        .literal("GREEN", 1)
        .build()
        .unwrap();
    assert!(Instance::with_value(&color, 2u8)
        .unwrap_err()
        .is_validation());

    let red = Instance::with_value(&color, color.value_of("RED").unwrap()).unwrap();
    assert_eq!(red.render().unwrap(), "Color.RED (0)");
}

#[test]
fn test_variable_tail() {
    init();
    let s = Struct::builder("S")
        .field("header", U32)
        .field("payload", Array::variable(0..=16, U8).unwrap())
        .build()
        .unwrap();
    assert_eq!(s.metadata().size, 4);

    for n in 0..=16usize {
        let raw: Vec<u8> = (0..4 + n).map(|i| i as u8).collect();
        let value = s.decode(raw.as_slice()).unwrap();
        assert_eq!(s.encode_size(&value).unwrap(), 4 + n);
        assert_eq!(s.encode(&value).unwrap(), raw.as_slice());
    }
    assert!(s.decode(&[0u8; 21][..]).unwrap_err().is_decode());
    assert!(s.decode(&[0u8; 3][..]).unwrap_err().is_decode());

    // No member may follow a variable base
    assert!(matches!(
        Struct::builder("T").extend(&s).field("trailer", U8).build(),
        Err(SchemaError::VariableNotLast(..))
    ));
}

#[test]
fn test_padding_region() {
    let layout = Struct::builder("Padded")
        .field("id", U8)
        .field("pad", padding(4, 0xaa).unwrap())
        .build()
        .unwrap();
    let value = record(&layout, vec![("id", 9u8.into())]);
    let encoded = layout.encode(&value).unwrap();
    assert_eq!(encoded, &[0x09, 0xaa, 0xaa, 0xaa, 0xaa][..]);

    let err = layout
        .decode(&[0x09, 0xaa, 0x00, 0xaa, 0xaa][..])
        .unwrap_err();
    assert!(err.is_validation());

    let rendered = layout.render(&value).unwrap();
    assert!(!rendered.contains("pad:"));
    assert_eq!(
        rendered,
        "Padded {\n    id: u8(9)\n    u8[4] {u8(170), u8(170), u8(170), u8(170)}\n}"
    );
}

#[test]
fn test_fixed_size_invariant() {
    let inner = Struct::builder("Inner")
        .field("x", I16_LE)
        .field("y", F64_LE)
        .build()
        .unwrap();
    let outer = Struct::builder("Outer")
        .field("tag", Array::fixed(4, CHAR).unwrap())
        .field("inner", &inner)
        .field("points", Array::fixed(2, &inner).unwrap())
        .field("crc", U32_BE)
        .build()
        .unwrap();

    let sum: usize = outer
        .fields()
        .iter()
        .map(|f| f.layout().metadata().size)
        .sum();
    assert_eq!(outer.fixed_size(), Some(sum));
    assert_eq!(sum, 4 + 10 + 20 + 4);

    let point = |x: i16, y: f64| record(&inner, vec![("x", x.into()), ("y", y.into())]);
    let values = [
        outer.default_value(),
        record(
            &outer,
            vec![
                ("tag", "ab".into()),
                ("inner", point(-1, 0.5)),
                ("points", Value::List(vec![point(3, -2.25)])),
                ("crc", 0xdeadbeefu32.into()),
            ],
        ),
    ];
    for value in values {
        let encoded = outer.encode(&value).unwrap();
        assert_eq!(encoded.len(), sum);
        assert_eq!(outer.decode(encoded).unwrap(), value);
    }
}

#[test]
fn test_inheritance_chain() {
    let base = Struct::builder("Base")
        .field("version", U8)
        .padding(Array::fixed(3, U8.hidden()).unwrap())
        .build()
        .unwrap();
    let middle = Struct::builder("Middle")
        .extend(&base)
        .field("length", U16_BE)
        .build()
        .unwrap();
    let leaf = Struct::builder("Leaf")
        .extend(&middle)
        .field("body", Array::variable(0..=8, CHAR).unwrap())
        .build()
        .unwrap();

    let names: Vec<_> = leaf.fields().iter().filter_map(|f| f.name()).collect();
    assert_eq!(names, ["version", "length", "body"]);
    assert_eq!(leaf.offset_of("length"), Some(4));
    assert_eq!(leaf.offset_of("body"), Some(6));

    let value = record(
        &leaf,
        vec![
            ("version", 2u8.into()),
            ("length", 5u16.into()),
            ("body", "hello".into()),
        ],
    );
    let encoded = leaf.encode(&value).unwrap();
    assert_eq!(encoded, &b"\x02\x00\x00\x00\x00\x05hello"[..]);
    let decoded = leaf.decode(encoded).unwrap();
    assert_eq!(decoded, value);
    assert_eq!(
        decoded.as_record().and_then(|r| r.get("body")),
        Some(&Value::from("hello"))
    );
}

#[test]
fn test_hidden_exclusion() {
    let layout = Struct::builder("Flags")
        .field("a", U8)
        .padding(U8.with_default(0xffu8).unwrap())
        .field("b", U8)
        .build()
        .unwrap();

    // Hidden fields cannot be named
    assert!(layout.field("").is_none());
    let value = layout.record([("a", 1u8), ("b", 2)]).unwrap();
    let fields: Vec<_> = value.fields().collect();
    assert_eq!(
        fields,
        [("a", &Value::Unsigned(1)), ("b", &Value::Unsigned(2))]
    );

    // Hidden fields never take part in comparisons
    let encoded = layout.encode(&Value::Record(value.clone())).unwrap();
    assert_eq!(encoded, &[1, 0xff, 2][..]);
    let decoded = layout.decode(&[1, 0x00, 2][..]).unwrap();
    assert_eq!(decoded, Value::Record(value));
}

#[test]
fn test_record_errors() {
    let layout = Struct::builder("Point")
        .field("x", U8)
        .field("y", U8)
        .build()
        .unwrap();
    let other = Struct::builder("Other").field("x", U8).build().unwrap();

    assert!(matches!(
        layout.record([("z", 1u8)]),
        Err(Error::UnknownFields(ref names)) if names == &["z"]
    ));

    let foreign: Record = other.default_record();
    assert!(matches!(
        layout.validate(&Value::Record(foreign.clone())),
        Err(Error::TypeMismatch { .. })
    ));
    assert!(matches!(
        layout.encode(&Value::Record(foreign)),
        Err(Error::TypeMismatch { .. })
    ));
    assert!(matches!(
        layout.encode(&Value::Unsigned(1)),
        Err(Error::TypeMismatch { .. })
    ));
}

#[test]
fn test_validate_on_encode() {
    let layout = Struct::builder("Reading")
        .field("level", U8.with_validator(Validator::range(0, 10)))
        .build()
        .unwrap();
    let mut reading = layout.default_record();
    assert!(reading.set("level", 11u8).unwrap_err().is_validation());
    reading.set("level", 10u8).unwrap();

    let cfg = Config::default().with_validate_on_encode(true);
    let value = Value::Record(reading);
    assert_eq!(layout.encode_cfg(&value, &cfg).unwrap(), &[10][..]);

    // Only reachable by decoding without enum checks
    let mode = Enum::builder("Mode", U8).next("OFF").next("ON").build().unwrap();
    let device = Struct::builder("Device").field("mode", &mode).build().unwrap();
    let lenient = Config::default().with_strict_enums(false);
    let value = device.decode_cfg(&[7][..], &lenient).unwrap();
    assert_eq!(device.encode(&value).unwrap(), &[7][..]);
    assert!(device.encode_cfg(&value, &cfg).unwrap_err().is_validation());
}

#[test]
fn test_layout_dispatch() {
    let layouts: Vec<Layout> = vec![
        U8.into(),
        Array::variable(1..=3, U16_BE).unwrap().into(),
        Enum::builder("E", U8).next("A").build().unwrap().into(),
        Struct::builder("S").field("x", U8).build().unwrap().into(),
    ];
    for layout in layouts {
        let value = layout.default_value();
        let encoded = layout.encode(&value).unwrap();
        assert_eq!(encoded.len(), layout.metadata().size);
        assert!(layout.compare(&layout.decode(encoded).unwrap(), &value).unwrap());
    }
}

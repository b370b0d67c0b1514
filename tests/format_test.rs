//! Tests for the document format codecs

use std::path::Path;

use rstest::rstest;

use refmt::application::{ApplicationError, EncodeOptions, Format};
use refmt::domain::{Node, Scalar};

#[rstest]
#[case("values.json", Some(Format::Json))]
#[case("terraform.tfstate", Some(Format::Json))]
#[case("values.yaml", Some(Format::Yaml))]
#[case("values.yml", Some(Format::Yaml))]
#[case("Cargo.toml", Some(Format::Toml))]
#[case(".prod.env", Some(Format::Env))]
#[case("main.tf", None)]
#[case("config.hcl", None)]
#[case("README", None)]
#[case("-", None)]
fn given_path_when_inferring_format_then_uses_extension(
    #[case] path: &str,
    #[case] expected: Option<Format>,
) {
    assert_eq!(Format::from_path(Path::new(path)), expected);
}

#[test]
fn given_yaml_with_non_string_keys_when_decoding_then_keys_stringified() {
    let node = Format::Yaml
        .decode(b"1: one\ntrue: yes\nnested:\n  2.5: x\n")
        .unwrap();

    assert_eq!(node.pointer(&["1"]), Some(&Node::from("one")));
    assert_eq!(node.pointer(&["true"]), Some(&Node::from("yes")));
    assert_eq!(node.pointer(&["nested", "2.5"]), Some(&Node::from("x")));
}

#[test]
fn given_toml_when_decoding_then_typed_scalars() {
    let node = Format::Toml
        .decode(b"name = \"svc\"\nport = 8080\nratio = 0.5\n[tls]\nenabled = true\n")
        .unwrap();

    assert_eq!(node.pointer(&["name"]), Some(&Node::from("svc")));
    assert_eq!(node.pointer(&["port"]), Some(&Node::from(8080_i64)));
    assert_eq!(node.pointer(&["ratio"]), Some(&Node::from(0.5)));
    assert_eq!(node.pointer(&["tls", "enabled"]), Some(&Node::from(true)));
}

#[test]
fn given_toml_datetime_when_decoding_then_kept_as_string() {
    let node = Format::Toml.decode(b"at = 1979-05-27T07:32:00Z\n").unwrap();

    assert_eq!(node.pointer(&["at"]), Some(&Node::from("1979-05-27T07:32:00Z")));
}

#[test]
fn given_env_content_when_decoding_then_flat_strings() {
    let node = Format::Env
        .decode(b"# app\nexport DB_HOST=localhost\nDB_PORT=5432\n")
        .unwrap();

    assert_eq!(node.pointer(&["DB_HOST"]), Some(&Node::from("localhost")));
    assert_eq!(node.pointer(&["DB_PORT"]), Some(&Node::from("5432")));
}

#[test]
fn given_invalid_json_when_decoding_then_decode_error_names_format() {
    let err = Format::Json.decode(b"{not json").unwrap_err();

    assert!(matches!(err, ApplicationError::Decode { format: Format::Json, .. }));
    assert!(err.to_string().starts_with("cannot decode json input"));
}

#[test]
fn given_nested_document_when_encoding_env_then_prefixed_upper_case_lines() {
    let node = Format::Json
        .decode(br#"{"db": {"host": "localhost", "port": 5432}, "list": ["a", "b"], "off": null}"#)
        .unwrap();
    let options = EncodeOptions {
        env_prefix: "APP_".into(),
        ..EncodeOptions::default()
    };

    let out = Format::Env.encode(node, &options).unwrap();

    assert_eq!(
        String::from_utf8(out).unwrap(),
        "APP_DB_HOST=localhost\nAPP_DB_PORT=5432\nAPP_LIST_0=a\nAPP_LIST_1=b\nAPP_OFF=\n"
    );
}

#[test]
fn given_custom_separator_when_encoding_env_then_used_between_segments() {
    let node = Format::Json.decode(br#"{"a": {"b": "c"}}"#).unwrap();
    let options = EncodeOptions {
        env_separator: "__".into(),
        ..EncodeOptions::default()
    };

    let out = Format::Env.encode(node, &options).unwrap();

    assert_eq!(out, b"A__B=c\n");
}

#[test]
fn given_mapping_when_encoding_yaml_then_block_style() {
    let node = Format::Json.decode(br#"{"a": {"b": 1}, "c": "x"}"#).unwrap();

    let out = Format::Yaml.encode(node, &EncodeOptions::default()).unwrap();

    assert_eq!(String::from_utf8(out).unwrap(), "a:\n  b: 1\nc: x\n");
}

#[rstest]
#[case(Format::Json)]
#[case(Format::Yaml)]
#[case(Format::Toml)]
fn given_document_when_encoding_and_decoding_then_tree_preserved(#[case] format: Format) {
    let original = Format::Json
        .decode(br#"{"name": "svc", "port": 8080, "tags": ["a", "b"], "tls": {"enabled": true, "ratio": 0.25}}"#)
        .unwrap();

    let bytes = format
        .encode(original.clone(), &EncodeOptions::default())
        .unwrap();
    let decoded = format.decode(&bytes).unwrap();

    assert_eq!(decoded, original);
}

#[test]
fn given_b64_key_when_encoding_then_value_encoded_and_annotation_dropped() {
    let node = Format::Yaml
        .decode(b"db:\n  password[b64]: aHVudGVyMg==\n")
        .unwrap();
    assert_eq!(node.pointer(&["db", "password"]), Some(&Node::from("hunter2")));

    let mut root = node.into_mapping().unwrap();
    if let Some(Node::Mapping(db)) = root.get_mut("db") {
        db.insert("token[b64]".into(), Node::Scalar(Scalar::String("s3cret".into())));
    }

    let out = Format::Json
        .encode(
            Node::Mapping(root),
            &EncodeOptions {
                json_compact: true,
                ..EncodeOptions::default()
            },
        )
        .unwrap();

    assert_eq!(
        String::from_utf8(out).unwrap(),
        r#"{"db":{"password":"hunter2","token":"czNjcmV0"}}"#
    );
}

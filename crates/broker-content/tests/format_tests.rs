use broker_content::{EnvFile, Error, Format, parse_json};
use rstest::rstest;

fn error_format(err: Error) -> String {
    match err {
        Error::Parse { format, .. } => format,
        other => panic!("expected a parse error, got {other:?}"),
    }
}

#[rstest]
#[case::missing_equals("SAP_URL https://a\n")]
#[case::blank_key("=value\n")]
fn test_env_errors_name_env_format(#[case] content: &str) {
    let err = EnvFile::parse(content, "TRIAL.env").unwrap_err();
    assert_eq!(error_format(err), Format::Env.name());
}

#[test]
fn test_json_errors_name_json_format() {
    let err = parse_json("Getting key...\nno braces here", "TRIAL.json").unwrap_err();
    assert!(err.to_string().contains("JSON content from TRIAL.json"), "{err}");
    assert_eq!(error_format(err), Format::Json.name());
}

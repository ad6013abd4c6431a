use assertables::*;
use rstest::*;

use crate::logging;

#[rstest]
#[case::level("debug")]
#[case::targets("ss_engine=trace,warn")]
fn test_parse_filter(#[case] directives: &str) {
    assert!(logging::parse_filter(directives).is_ok());
}

#[rstest]
#[case::bad_level("ss_engine=loud")]
fn test_malformed_filter_rejected(#[case] directives: &str) {
    let err = logging::setup(directives).unwrap_err();
    assert_contains!(err.to_string(), "invalid log filter");
}

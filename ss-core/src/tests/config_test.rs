use assertables::*;
use rstest::*;

use crate::config::ConfigError;
use crate::Configuration;

#[fixture]
fn two_by_three() -> Configuration {
    Configuration::new(
        0.5,
        vec![vec![1.0, 1.0, 3.0], vec![2.0, 2.0, 1.0]],
        vec![1.0, 1.0],
        vec![0.2, 0.2],
        vec![1.0, 2.0, 1.0],
        vec![vec![true, true, false], vec![false, true, true]],
    )
    .unwrap()
}

#[rstest]
fn test_accessors(two_by_three: Configuration) {
    assert_eq!(two_by_three.nclients(), 2);
    assert_eq!(two_by_three.nservers(), 3);
    assert_eq!(two_by_three.eligible_servers(0), vec![0, 1]);
    assert_eq!(two_by_three.eligible_servers(1), vec![1, 2]);
}

#[rstest]
#[case::zero(0.0)]
#[case::one(1.0)]
#[case::negative(-0.3)]
#[case::nan(f64::NAN)]
fn test_chi_out_of_range(#[case] chi: f64) {
    let err = Configuration::new(chi, vec![vec![0.0]], vec![1.0], vec![0.1], vec![1.0], vec![vec![true]]).unwrap_err();
    assert!(matches!(err.downcast_ref::<ConfigError>(), Some(ConfigError::ChiOutOfRange(_))));
}

#[rstest]
fn test_ragged_tau() {
    let err = Configuration::new(
        0.1,
        vec![vec![0.0, 0.0], vec![0.0]],
        vec![1.0, 1.0],
        vec![0.1, 0.1],
        vec![1.0, 1.0],
        vec![vec![true, true], vec![true, true]],
    )
    .unwrap_err();
    assert!(matches!(err.downcast_ref::<ConfigError>(), Some(ConfigError::InvalidShape(_))));
}

#[rstest]
fn test_vector_length_mismatch() {
    let err = Configuration::new(
        0.1,
        vec![vec![0.0, 0.0]],
        vec![1.0, 1.0],
        vec![0.1],
        vec![1.0, 1.0],
        vec![vec![true, true]],
    )
    .unwrap_err();
    assert_contains!(err.to_string(), "x has length 2");
}

#[rstest]
fn test_non_positive_mu() {
    let err = Configuration::new(0.1, vec![vec![0.0]], vec![1.0], vec![0.1], vec![0.0], vec![vec![true]]).unwrap_err();
    assert!(matches!(err.downcast_ref::<ConfigError>(), Some(ConfigError::InvalidValue(_))));
}

#[rstest]
fn test_no_clients() {
    let err = Configuration::new(0.1, vec![], vec![], vec![], vec![1.0], vec![]).unwrap_err();
    assert!(matches!(err.downcast_ref::<ConfigError>(), Some(ConfigError::InvalidShape(_))));
}

#[rstest]
fn test_mutators_keep_shape(mut two_by_three: Configuration) {
    two_by_three.mu_mut().copy_from_slice(&[3.0, 4.0, 5.0]);
    two_by_three.tau_mut(1)[2] = 7.0;
    assert_eq!(two_by_three.mu(), &[3.0, 4.0, 5.0]);
    assert_eq!(two_by_three.tau()[1][2], 7.0);

    assert!(two_by_three.set_chi(1.5).is_err());
    assert_eq!(two_by_three.chi(), 0.5);
    two_by_three.set_chi(0.25).unwrap();
    assert_eq!(two_by_three.chi(), 0.25);
}

#[rstest]
fn test_deserialize_integer_association() {
    let yaml = r"
chi: 0.1
tau: [[0, 0], [0, 0]]
x: [1, 1]
load: [0.1, 0.1]
mu: [1, 12]
association: [[1, 1], [1, 1]]
";
    let config: Configuration = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.association(), &[vec![true, true], vec![true, true]]);
    assert_eq!(config.mu(), &[1.0, 12.0]);
}

#[rstest]
fn test_deserialize_validates() {
    let json = r#"{"chi": 2.0, "tau": [[0.0]], "x": [1.0], "load": [0.1], "mu": [1.0], "association": [[true]]}"#;
    let res: Result<Configuration, _> = serde_json::from_str(json);
    assert_contains!(res.unwrap_err().to_string(), "chi must lie");
}

#[rstest]
fn test_serde_round_trip(two_by_three: Configuration) {
    let json = serde_json::to_string(&two_by_three).unwrap();
    let back: Configuration = serde_json::from_str(&json).unwrap();
    assert_eq!(back, two_by_three);
}

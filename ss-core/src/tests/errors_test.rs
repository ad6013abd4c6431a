use crate::err_impl;
use crate::errors::*;

err_impl! {SampleError,
    #[error("draw {0} failed")]
    DrawFailed(usize),

    #[error("sampler gave up: {0}")]
    GaveUp(String),
}

#[test]
fn test_err_impl_constructors_downcast() {
    let err = SampleError::draw_failed(3usize);
    assert_eq!(err.to_string(), "draw 3 failed");
    assert!(matches!(err.downcast_ref::<SampleError>(), Some(SampleError::DrawFailed(3))));

    let err = SampleError::gave_up("timeout");
    assert_eq!(err.to_string(), "sampler gave up: timeout");
}

err_impl! {
    /// Errors with documented variants.
    QuotaError,
    /// Too many requests; carries the limit.
    #[error("over quota: {0}")]
    OverQuota(u32),
}

#[test]
fn test_err_impl_with_docs() {
    let err = QuotaError::over_quota(5u32);
    assert_eq!(err.to_string(), "over quota: 5");
    assert!(matches!(err.downcast_ref::<QuotaError>(), Some(QuotaError::OverQuota(5))));
}

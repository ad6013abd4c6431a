pub use anyhow::{
    anyhow,
    bail,
    ensure,
};
pub use paste::paste;
pub use thiserror::Error;

pub type EmptyResult = anyhow::Result<()>;

// Declares a `thiserror` enum whose variants each carry a single payload, plus one snake-case
// constructor per variant that returns the variant wrapped in an `anyhow::Error`.  Doc comments on
// the type and on each variant are passed through.  Callers need `use ss_core::errors::*;` in
// scope so that `Error` resolves to the thiserror derive.
#[macro_export]
macro_rules! err_impl {
    ($(#[$typeinfo:meta])* $errtype:ident,
        $($(#[$errinfo:meta])+ $item:ident($dtype:ty),)+
    ) => {
        $(#[$typeinfo])*
        #[derive(Debug, Error)]
        pub enum $errtype {
            $($(#[$errinfo])+ $item($dtype)),+
        }

        impl $errtype {
            $($crate::errors::paste! {
                #[doc = concat!("Wrap [`", stringify!($errtype), "::", stringify!($item), "`] in an [`anyhow::Error`].")]
                #[allow(dead_code)]
                pub fn [<$item:snake>](in_: impl Into<$dtype>) -> anyhow::Error {
                    anyhow::Error::new($errtype::$item(in_.into()))
                }
            })+
        }
    };
}

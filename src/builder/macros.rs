//! Macros for declaring signal-state vocabularies.

/// Declare a signal-state enum and implement [`State`](crate::core::State)
/// for it.
///
/// Variants listed under `transient:` may only be shown while approaching
/// another state.
///
/// # Example
///
/// ```
/// use signalbox::core::State;
/// use signalbox::state_enum;
///
/// state_enum! {
///     pub enum Crossing {
///         Idle,
///         Lowering,
///         Lowered,
///         Raising,
///     }
///     transient: [Lowering, Raising]
/// }
///
/// assert_eq!(Crossing::Lowered.name(), "Lowered");
/// assert!(Crossing::Raising.is_transient());
/// assert_eq!(Crossing::Idle.to_string(), "Idle");
/// ```
#[macro_export]
macro_rules! state_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }

        $(transient: [$($transient:ident),* $(,)?])?
    ) => {
        $(#[$meta])*
        #[derive(
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            Debug,
            serde::Serialize,
            serde::Deserialize
        )]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $crate::core::State for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }

            fn is_transient(&self) -> bool {
                match self {
                    $($(Self::$transient => true,)*)?
                    _ => false,
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str($crate::core::State::name(self))
            }
        }
    };
}

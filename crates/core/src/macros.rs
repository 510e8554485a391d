// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Small declarative helpers shared by the core types.

/// Generate a `Display` impl that maps enum variants to string literals.
///
/// Tuple variants are written `Name(..)`.
#[macro_export]
macro_rules! simple_display {
    ($enum:ty { $( $variant:ident $(( $($ignore:tt)* ))? => $str:expr ),+ $(,)? }) => {
        impl std::fmt::Display for $enum {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(match self {
                    $( Self::$variant $(( $($ignore)* ))? => $str, )+
                })
            }
        }
    };
}

/// Builder-style setters for optional request fields, placed inside an
/// existing `impl` block.
///
/// `set` setters take the field type as-is; `option` setters fill an
/// `Option` field with `Some(v.into())`.
///
/// ```ignore
/// impl ExecuteRequest {
///     crate::setters! {
///         set { config: serde_json::Value }
///         option { input_filename: String }
///     }
/// }
/// ```
#[macro_export]
macro_rules! setters {
    (
        $(set { $( $field:ident : $ty:ty ),* $(,)? })?
        $(option { $( $opt_field:ident : $opt_ty:ty ),* $(,)? })?
    ) => {
        $($(
            pub fn $field(mut self, v: $ty) -> Self {
                self.$field = v;
                self
            }
        )*)?

        $($(
            pub fn $opt_field(mut self, v: impl Into<$opt_ty>) -> Self {
                self.$opt_field = Some(v.into());
                self
            }
        )*)?
    };
}

//! Extra arguments forwarded to chained methods.
//!
//! Methods are dispatched by name, so their extra arguments travel as
//! dynamically typed JSON values. The engine never inspects them: a functor
//! body or method body is free to fail on arguments it does not expect.

use smallvec::SmallVec;

pub use serde_json::Value;

/// The extra arguments of one chained call.
pub type Arguments = SmallVec<[Value; 4]>;

/// Builds an [`Arguments`] list from anything convertible into a [`Value`].
///
/// # Syntax
///
/// - `args![]` - No extra arguments
/// - `args![a, b, ...]` - Each item goes through `Value::from`
///
/// # Examples
///
/// ```rust
/// use chainfuse::{Value, args};
///
/// let arguments = args!["first", 2, true];
/// assert_eq!(arguments.len(), 3);
/// assert_eq!(arguments[0], Value::from("first"));
/// assert_eq!(arguments[1], Value::from(2));
///
/// assert!(args![].is_empty());
/// ```
#[macro_export]
macro_rules! args {
    () => {
        $crate::Arguments::new()
    };
    ($($argument:expr),+ $(,)?) => {{
        let mut arguments = $crate::Arguments::new();
        $(
            arguments.push($crate::Value::from($argument));
        )+
        arguments
    }};
}

//! Declarative helpers shared by the per-architecture tables.

/// Declares a fieldless enum whose discriminants are the stable numeric ids handed out to
/// callers, along with the printable name of every variant.
///
/// ```ignore
/// registry! {
///     pub enum EvmInsn: u16 {
///         Stop => "stop",
///         Add => "add",
///     }
/// }
/// assert_eq!(EvmInsn::Add.name(), "add");
/// assert_eq!(EvmInsn::from_id(1), Some(EvmInsn::Add));
/// ```
macro_rules! registry {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident: $repr:ident {
            $($variant:ident => $text:literal),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr($repr)]
        $vis enum $name {
            $($variant),*
        }

        #[allow(dead_code)]
        impl $name {
            /// Every variant, in id order.
            pub const ALL: &'static [$name] = &[$($name::$variant),*];
            /// Printable names, indexed by id.
            pub const NAMES: &'static [&'static str] = &[$($text),*];

            #[inline]
            pub const fn id(self) -> $repr {
                self as $repr
            }

            #[inline]
            pub fn name(self) -> &'static str {
                Self::NAMES[self as usize]
            }

            pub fn from_id(id: u32) -> Option<Self> {
                Self::ALL.get(id as usize).copied()
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

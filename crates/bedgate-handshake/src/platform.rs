//! Bedrock client platform identifiers, as sent by the client in its login chain.
//!
//! Ids are stable on the wire; unknown ids fall back to the first variant.

use serde::Serialize;
use std::fmt;

macro_rules! id_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($variant:ident = $id:literal => $display:literal,)+ }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            /// Resolve a wire id, falling back to the first variant.
            pub fn from_id(id: i32) -> Self {
                match id {
                    $($id => $name::$variant,)+
                    _ => Self::ALL[0],
                }
            }

            pub fn id(self) -> i32 {
                match self {
                    $($name::$variant => $id,)+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::ALL[0]
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(match self {
                    $($name::$variant => $display,)+
                })
            }
        }
    };
}

id_enum! {
    /// Operating system of the Bedrock client
    pub enum DeviceOs {
        Unknown = 0 => "Unknown",
        Android = 1 => "Android",
        Ios = 2 => "iOS",
        MacOs = 3 => "macOS",
        Amazon = 4 => "Amazon",
        GearVr = 5 => "Gear VR",
        Hololens = 6 => "Hololens",
        Uwp = 7 => "Windows 10",
        Win32 = 8 => "Windows x86",
        Dedicated = 9 => "Dedicated",
        TvOs = 10 => "Apple TV",
        Ps4 = 11 => "PS4",
        Nx = 12 => "Switch",
        Xbox = 13 => "Xbox One",
        WindowsPhone = 14 => "Windows Phone",
    }
}

id_enum! {
    pub enum UiProfile {
        Classic = 0 => "Classic",
        Pocket = 1 => "Pocket",
    }
}

id_enum! {
    pub enum InputMode {
        Unknown = 0 => "Unknown",
        KeyboardMouse = 1 => "Keyboard and mouse",
        Touch = 2 => "Touch",
        Controller = 3 => "Controller",
        Vr = 4 => "VR",
    }
}

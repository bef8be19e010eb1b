use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

macro_rules! string_id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id_newtype!(CityId);

macro_rules! regions {
    ($($variant:ident),+ $(,)?) => {
        /// Brazilian federative unit used to scope municipality lookups.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum Region {
            $($variant),+
        }

        impl Region {
            pub const ALL: &'static [Region] = &[$(Region::$variant),+];

            pub fn code(self) -> &'static str {
                match self {
                    $(Region::$variant => stringify!($variant)),+
                }
            }
        }
    };
}

regions!(
    AC, AL, AP, AM, BA, CE, ES, GO, MA, MT, MS, MG, PA, PB, PR, PE, PI, RJ, RN, RS, RO, RR, SC, SP,
    SE, TO, DF,
);

impl Default for Region {
    fn default() -> Self {
        Region::BA
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown region code: {0:?}")]
pub struct UnknownRegion(pub String);

impl FromStr for Region {
    type Err = UnknownRegion;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let code = raw.trim();
        Region::ALL
            .iter()
            .copied()
            .find(|region| region.code().eq_ignore_ascii_case(code))
            .ok_or_else(|| UnknownRegion(raw.to_string()))
    }
}

/// Municipality as returned by the geography service. Accepts both the plain
/// `{id, name}` shape and the IBGE `{codigo_ibge, nome}` shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    #[serde(alias = "codigo_ibge")]
    pub id: CityId,
    #[serde(alias = "nome")]
    pub name: String,
}

impl City {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: CityId::new(id),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Course {
    pub name: String,
}

impl Course {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

use derive_more::Display;
use serde::{Deserialize, Serialize};
use serde_json::Value;

///
/// UnitId
///
/// Foreign reference to a unit of measure. Only positive ids are valid;
/// anything else read from the outside world collapses to "no unit".
///

#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(transparent)]
pub struct UnitId(u64);

impl UnitId {
    #[must_use]
    pub const fn new(id: u64) -> Option<Self> {
        if id == 0 { None } else { Some(Self(id)) }
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Coerce a loosely typed JSON reference into a unit id.
    ///
    /// Accepts positive integral numbers and numeric strings; null, zero,
    /// negative, fractional, non-finite and non-numeric values become `None`.
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n
                .as_u64()
                .or_else(|| n.as_f64().and_then(integral_u64))
                .and_then(Self::new),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(integral_u64)
                .and_then(Self::new),
            _ => None,
        }
    }
}

#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn integral_u64(n: f64) -> Option<u64> {
    // 2^53: beyond this f64 no longer represents every integer
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;

    (n.is_finite() && n > 0.0 && n.fract() == 0.0 && n <= MAX_EXACT).then_some(n as u64)
}

///
/// Unit
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Unit {
    pub id: UnitId,
    pub symbol: String,
    pub name: String,
}

impl Unit {
    /// Short human label: symbol, then name, then the bare id.
    #[must_use]
    pub fn label(&self) -> String {
        let symbol = self.symbol.trim();
        if !symbol.is_empty() {
            return symbol.to_string();
        }

        let name = self.name.trim();
        if !name.is_empty() {
            return name.to_string();
        }

        format!("#{}", self.id)
    }
}

///
/// UnitCatalog
///
/// Lookup table used only to render a human label for a `UnitId`.
///

#[derive(Clone, Debug, Default)]
pub struct UnitCatalog {
    units: Vec<Unit>,
}

impl UnitCatalog {
    #[must_use]
    pub const fn new(units: Vec<Unit>) -> Self {
        Self { units }
    }

    /// Build a catalog from raw `{ id, symbol, name }` rows.
    /// Rows without a usable id are skipped.
    #[must_use]
    pub fn from_json(rows: &Value) -> Self {
        let Some(rows) = rows.as_array() else {
            return Self::default();
        };

        let units = rows
            .iter()
            .filter_map(|row| {
                let obj = row.as_object()?;
                let id = obj
                    .get("id")
                    .or_else(|| obj.get("unit_id"))
                    .and_then(UnitId::from_json)?;
                let text = |field: &str| {
                    obj.get(field)
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string()
                };

                Some(Unit {
                    id,
                    symbol: text("symbol"),
                    name: text("name"),
                })
            })
            .collect();

        Self { units }
    }

    #[must_use]
    pub fn get(&self, id: UnitId) -> Option<&Unit> {
        self.units.iter().find(|unit| unit.id == id)
    }

    /// Human label for a unit reference; unknown ids render as `#<id>`.
    #[must_use]
    pub fn label(&self, id: UnitId) -> String {
        self.get(id).map_or_else(|| format!("#{id}"), Unit::label)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

///
/// TESTS
///

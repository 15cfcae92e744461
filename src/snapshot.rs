//! Wire types for the yard backend's JSON snapshots.
//!
//! The backend builds its grid from a text manifest and serialises every
//! field of a grid row as a string (`["03","05","01200","ABCDEFG","red"]`),
//! while steps and counters arrive as numbers. Decoding accepts both forms.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// The single buffer/park slot beside the yard
pub const PARK_CELL: Coord = Coord::new(9, 1);

/// 1-indexed (row, column) position; y grows upwards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    pub y: i64,
    pub x: i64,
}

impl Coord {
    pub const fn new(y: i64, x: i64) -> Self {
        Self { y, x }
    }

    pub fn is_park(self) -> bool {
        self == PARK_CELL
    }
}

/// Highlight colour the backend puts on a source/target cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Highlight {
    Red,
    Green,
}

impl Highlight {
    /// Parse a colour name; anything but red/green (including "") means none
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "red" => Some(Highlight::Red),
            "green" => Some(Highlight::Green),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Highlight::Red => "red",
            Highlight::Green => "green",
        }
    }

    /// CSS class hook, `highlight-<colour>`
    pub fn class(self) -> &'static str {
        match self {
            Highlight::Red => "highlight-red",
            Highlight::Green => "highlight-green",
        }
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().and_then(Self::from_name)
    }
}

impl Serialize for Highlight {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Container weight as sent: a number or a (usually zero-padded) string
#[derive(Debug, Clone, PartialEq)]
pub enum Weight {
    Number(serde_json::Number),
    Text(String),
}

impl Weight {
    /// Integer value when it parses, otherwise the text as sent
    pub fn display(&self) -> String {
        match self {
            Weight::Number(n) => match n.as_i64() {
                Some(i) => i.to_string(),
                None => n
                    .as_f64()
                    .filter(|f| f.is_finite())
                    .map(|f| (f.trunc() as i64).to_string())
                    .unwrap_or_else(|| n.to_string()),
            },
            Weight::Text(text) => parse_leading_int(text)
                .map(|i| i.to_string())
                .unwrap_or_else(|| text.clone()),
        }
    }

    fn from_value(value: Value) -> Self {
        match value {
            Value::Number(n) => Weight::Number(n),
            Value::String(s) => Weight::Text(s),
            Value::Null => Weight::Text(String::new()),
            other => Weight::Text(other.to_string()),
        }
    }

    fn into_value(self) -> Value {
        match self {
            Weight::Number(n) => Value::Number(n),
            Weight::Text(s) => Value::String(s),
        }
    }
}

/// One manifest row: `(y, x, weight, name, color)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Value>", into = "Vec<Value>")]
pub struct GridRow {
    pub coord: Coord,
    pub weight: Weight,
    pub name: String,
    pub color: Option<Highlight>,
}

impl GridRow {
    pub fn new(coord: Coord, weight: Weight, name: impl Into<String>, color: Option<Highlight>) -> Self {
        Self {
            coord,
            weight,
            name: name.into(),
            color,
        }
    }
}

impl TryFrom<Vec<Value>> for GridRow {
    type Error = String;

    fn try_from(fields: Vec<Value>) -> Result<Self, Self::Error> {
        if fields.len() < 4 {
            return Err(format!("grid row needs at least 4 fields, got {}", fields.len()));
        }
        let y = int_from_value(&fields[0]).ok_or_else(|| format!("bad row coordinate {}", fields[0]))?;
        let x = int_from_value(&fields[1]).ok_or_else(|| format!("bad column coordinate {}", fields[1]))?;
        let color = fields.get(4).and_then(Highlight::from_value);

        let mut fields = fields.into_iter().skip(2);
        let weight = Weight::from_value(fields.next().unwrap_or(Value::Null));
        let name = match fields.next().unwrap_or(Value::Null) {
            Value::String(s) => s,
            Value::Null => String::new(),
            other => other.to_string(),
        };

        Ok(GridRow {
            coord: Coord::new(y, x),
            weight,
            name,
            color,
        })
    }
}

impl From<GridRow> for Vec<Value> {
    fn from(row: GridRow) -> Self {
        vec![
            Value::from(row.coord.y),
            Value::from(row.coord.x),
            row.weight.into_value(),
            Value::String(row.name),
            row.color
                .map(|c| Value::String(c.name().to_string()))
                .unwrap_or(Value::Null),
        ]
    }
}

/// One crane relocation `(fromY, fromX, toY, toX)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Value>", into = "Vec<i64>")]
pub struct Move {
    pub from: Coord,
    pub to: Coord,
}

impl Move {
    pub fn new(from: Coord, to: Coord) -> Self {
        Self { from, to }
    }
}

impl TryFrom<Vec<Value>> for Move {
    type Error = String;

    fn try_from(fields: Vec<Value>) -> Result<Self, Self::Error> {
        if fields.len() != 4 {
            return Err(format!("step needs 4 fields, got {}", fields.len()));
        }
        let mut coords = [0i64; 4];
        for (slot, field) in coords.iter_mut().zip(&fields) {
            *slot = int_from_value(field).ok_or_else(|| format!("bad step coordinate {}", field))?;
        }
        Ok(Move::new(
            Coord::new(coords[0], coords[1]),
            Coord::new(coords[2], coords[3]),
        ))
    }
}

impl From<Move> for Vec<i64> {
    fn from(step: Move) -> Self {
        vec![step.from.y, step.from.x, step.to.y, step.to.x]
    }
}

/// Full state the backend returns from both grid endpoints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default, deserialize_with = "lenient_count")]
    pub current_step_num: u32,
    #[serde(default, deserialize_with = "lenient_count")]
    pub num_steps: u32,
    #[serde(default)]
    pub all_done: bool,
    #[serde(default, deserialize_with = "lenient_highlight")]
    pub park_cell: Option<Highlight>,
    #[serde(default)]
    pub grid: Vec<GridRow>,
    #[serde(default)]
    pub steps: Vec<Move>,
    #[serde(default)]
    pub total_time: Value,
}

impl Snapshot {
    pub fn from_json(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }

    /// Display text for the time-display element
    pub fn total_time_display(&self) -> String {
        match &self.total_time {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

fn lenient_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Null => Ok(0),
        ref v => int_from_value(v)
            .map(|n| n.clamp(0, u32::MAX as i64) as u32)
            .ok_or_else(|| serde::de::Error::custom(format!("expected a step counter, got {}", v))),
    }
}

fn lenient_highlight<'de, D>(deserializer: D) -> Result<Option<Highlight>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(Highlight::from_value))
}

fn int_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => parse_leading_int(s),
        _ => None,
    }
}

/// Leading-integer parse: optional whitespace and sign, then digits; the rest is ignored
pub fn parse_leading_int(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let magnitude = digits[..end].parse::<i64>().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}
